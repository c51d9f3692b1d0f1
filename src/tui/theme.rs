//! Board Theme - Visual Design System
//!
//! Space violet/blue + amber/gold palette, shared by every widget.

use ratatui::style::{Color, Modifier, Style};

use crate::controller::{BannerTone, LinkStatus};
use crate::markdown::MarkdownStyles;

/// Board color palette
pub struct BoardTheme {
    // Primary palette
    pub space_violet: Color,
    pub amber_gold: Color,
    pub cyan_teal: Color,
    pub deep_space: Color,
    pub star_white: Color,

    // Status colors
    pub success_green: Color,
    pub warning_orange: Color,
    pub error_red: Color,

    // Dimmed versions
    pub dim_violet: Color,
    pub dim_amber: Color,
    pub dim_cyan: Color,
}

impl Default for BoardTheme {
    fn default() -> Self {
        Self {
            space_violet: Color::Rgb(138, 43, 226), // #8A2BE2
            amber_gold: Color::Rgb(255, 191, 0),    // #FFBF00
            cyan_teal: Color::Rgb(0, 255, 255),     // #00FFFF
            deep_space: Color::Rgb(13, 17, 23),     // #0D1117
            star_white: Color::Rgb(230, 237, 243),  // #E6EDF3

            success_green: Color::Rgb(63, 185, 80), // #3FB950
            warning_orange: Color::Rgb(210, 153, 34), // #D29922
            error_red: Color::Rgb(248, 81, 73),     // #F85149

            dim_violet: Color::Rgb(88, 28, 143),
            dim_amber: Color::Rgb(153, 115, 0),
            dim_cyan: Color::Rgb(0, 153, 153),
        }
    }
}

impl BoardTheme {
    pub fn new() -> Self {
        Self::default()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Styles
    // ─────────────────────────────────────────────────────────────────────

    pub fn text(&self) -> Style {
        Style::default().fg(self.star_white)
    }

    pub fn dimmed(&self) -> Style {
        Style::default().fg(Color::Rgb(128, 128, 128))
    }

    pub fn header(&self) -> Style {
        Style::default()
            .fg(self.space_violet)
            .add_modifier(Modifier::BOLD)
    }

    pub fn accent(&self) -> Style {
        Style::default().fg(self.amber_gold)
    }

    pub fn highlight(&self) -> Style {
        Style::default()
            .fg(self.cyan_teal)
            .add_modifier(Modifier::BOLD)
    }

    pub fn success(&self) -> Style {
        Style::default().fg(self.success_green)
    }

    pub fn warning(&self) -> Style {
        Style::default().fg(self.warning_orange)
    }

    pub fn error(&self) -> Style {
        Style::default()
            .fg(self.error_red)
            .add_modifier(Modifier::BOLD)
    }

    pub fn panel_border(&self) -> Style {
        Style::default().fg(self.dim_violet)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Domain styles
    // ─────────────────────────────────────────────────────────────────────

    /// Status indicator color per link state
    pub fn indicator(&self, status: &LinkStatus) -> Style {
        match status {
            LinkStatus::Connected => self.success(),
            LinkStatus::Connecting => self.accent(),
            LinkStatus::Disconnected => self.warning(),
            LinkStatus::Error => self.error(),
            LinkStatus::Server(_) => self.highlight(),
        }
    }

    pub fn banner(&self, tone: BannerTone) -> Style {
        match tone {
            BannerTone::Info => Style::default().fg(self.cyan_teal),
            BannerTone::Success => Style::default().fg(self.success_green),
            BannerTone::Warning => Style::default().fg(self.warning_orange),
            BannerTone::Error => Style::default().fg(self.error_red),
        }
    }

    /// Series colors cycle through the palette
    pub fn series(&self, index: usize) -> Color {
        const CYCLE: usize = 6;
        match index % CYCLE {
            0 => self.amber_gold,
            1 => self.cyan_teal,
            2 => self.space_violet,
            3 => self.success_green,
            4 => self.error_red,
            _ => self.warning_orange,
        }
    }

    pub fn markdown(&self) -> MarkdownStyles {
        MarkdownStyles {
            text: self.text(),
            heading: self.header(),
            subheading: Style::default()
                .fg(self.amber_gold)
                .add_modifier(Modifier::BOLD),
            code: Style::default().fg(self.cyan_teal),
            quote: Style::default()
                .fg(self.dim_cyan)
                .add_modifier(Modifier::ITALIC),
            link: Style::default()
                .fg(self.cyan_teal)
                .add_modifier(Modifier::UNDERLINED),
            marker: self.accent(),
            rule: Style::default().fg(self.dim_violet),
        }
    }

    /// Logo color for a pulse scale around 1.0
    pub fn logo(&self, scale: f32) -> Style {
        match scale {
            s if s >= 1.02 => Style::default()
                .fg(self.amber_gold)
                .add_modifier(Modifier::BOLD),
            s if s <= 0.98 => Style::default().fg(self.dim_amber),
            _ => Style::default().fg(self.amber_gold),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Icons and Symbols
// ─────────────────────────────────────────────────────────────────────────────

pub mod icons {
    pub const APP: &str = "◉";
    pub const INDICATOR: &str = "●";
    pub const CALL: &str = "☎";
    pub const CHART: &str = "▣";
    pub const ERROR: &str = "✖";
    pub const LEGEND: &str = "■";

    /// Idle presentation logo
    pub const LOGO: [&str; 5] = [
        "  ╭──────────────╮  ",
        "  │  ◉ CALLBOARD  │  ",
        "  ╰──────┬───────╯  ",
        "         │          ",
        "      ───┴───       ",
    ];
}
