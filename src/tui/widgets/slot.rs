//! Display slot bodies: idle logo, error block, raw message

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};

use crate::controller::{ErrorBlock, LogoPose};
use crate::tui::theme::{icons, BoardTheme};

const IDLE_CAPTION: &str = "Waiting for the next update";

/// The idle presentation, posed by the controller every frame
pub struct IdleLogo<'a> {
    pose: LogoPose,
    theme: &'a BoardTheme,
}

impl<'a> IdleLogo<'a> {
    pub fn new(pose: LogoPose, theme: &'a BoardTheme) -> Self {
        Self { pose, theme }
    }

    /// Rows the logo is shifted by; positive lift moves it up
    pub fn row_offset(&self) -> i32 {
        -(self.pose.lift.round() as i32)
    }
}

impl Widget for IdleLogo<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let logo_height = icons::LOGO.len() as u16 + 2;
        if area.height < logo_height {
            Paragraph::new(Line::from(Span::styled(
                IDLE_CAPTION,
                self.theme.dimmed(),
            )))
            .alignment(Alignment::Center)
            .render(area, buf);
            return;
        }

        let base = i32::from(area.y) + i32::from((area.height - logo_height) / 2);
        let min_y = i32::from(area.y);
        let max_y = i32::from(area.y + area.height - logo_height);
        let top = (base + self.row_offset()).clamp(min_y, max_y) as u16;

        let style = self.theme.logo(self.pose.scale);
        let mut lines: Vec<Line> = icons::LOGO
            .iter()
            .map(|row| Line::from(Span::styled(*row, style)))
            .collect();
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(IDLE_CAPTION, self.theme.dimmed())));

        let logo_area = Rect {
            x: area.x,
            y: top,
            width: area.width,
            height: logo_height,
        };
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .render(logo_area, buf);
    }
}

/// Processing error with the offending frame underneath
pub struct ErrorWidget<'a> {
    block: &'a ErrorBlock,
    theme: &'a BoardTheme,
}

impl<'a> ErrorWidget<'a> {
    pub fn new(block: &'a ErrorBlock, theme: &'a BoardTheme) -> Self {
        Self { block, theme }
    }
}

impl Widget for ErrorWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut lines = vec![
            Line::from(vec![
                Span::styled(format!("{} ", icons::ERROR), self.theme.error()),
                Span::styled(self.block.message.clone(), self.theme.error()),
            ]),
            Line::default(),
        ];
        if let Some(raw) = &self.block.raw {
            lines.push(Line::from(Span::styled(
                "Raw data:",
                self.theme.dimmed(),
            )));
            lines.extend(
                raw.lines()
                    .map(|l| Line::from(Span::styled(format!("  {}", l), self.theme.warning()))),
            );
        }
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}

/// Pretty-printed payload of a message type the display does not know
pub struct RawWidget<'a> {
    message_type: &'a str,
    body: &'a str,
    theme: &'a BoardTheme,
}

impl<'a> RawWidget<'a> {
    pub fn new(message_type: &'a str, body: &'a str, theme: &'a BoardTheme) -> Self {
        Self {
            message_type,
            body,
            theme,
        }
    }
}

impl Widget for RawWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut lines = vec![
            Line::from(vec![
                Span::styled("Message type: ", self.theme.dimmed()),
                Span::styled(self.message_type.to_string(), self.theme.accent()),
            ]),
            Line::default(),
        ];
        lines.extend(
            self.body
                .lines()
                .map(|l| Line::from(Span::styled(l.to_string(), self.theme.text()))),
        );
        Paragraph::new(lines).render(area, buf);
    }
}
