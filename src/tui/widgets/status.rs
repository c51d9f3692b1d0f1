//! Status bar and key hints

use std::time::Duration;

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use super::utils::{format_duration, truncate};
use crate::controller::ControllerStats;
use crate::tui::state::ViewState;
use crate::tui::theme::{icons, BoardTheme};

/// App-level facts shown next to the indicator
#[derive(Debug, Clone)]
pub struct StatusLine {
    pub endpoint: String,
    pub stats: ControllerStats,
    pub uptime: Duration,
}

pub struct StatusBar<'a> {
    view: &'a ViewState,
    status: &'a StatusLine,
    theme: &'a BoardTheme,
}

impl<'a> StatusBar<'a> {
    pub fn new(view: &'a ViewState, status: &'a StatusLine, theme: &'a BoardTheme) -> Self {
        Self {
            view,
            status,
            theme,
        }
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let theme = self.theme;
        let since = self.view.indicator_since.elapsed().as_secs();
        let stats = self.status.stats;

        let line = Line::from(vec![
            Span::styled(format!(" {} CALLBOARD ", icons::APP), theme.header()),
            Span::styled("│ ", theme.dimmed()),
            Span::styled(
                format!("{} {}", icons::INDICATOR, self.view.indicator),
                theme.indicator(&self.view.indicator),
            ),
            Span::styled(format!(" {} ", format_duration(since)), theme.dimmed()),
            Span::styled("│ ", theme.dimmed()),
            Span::styled(truncate(&self.status.endpoint, 48), theme.text()),
            Span::styled(" │ ", theme.dimmed()),
            Span::styled(
                format!(
                    "shown {} · errors {} · ignored {}",
                    stats.rendered, stats.errors, stats.ignored
                ),
                theme.dimmed(),
            ),
            Span::styled(" │ ", theme.dimmed()),
            Span::styled(
                format!("⏱ {}", format_duration(self.status.uptime.as_secs())),
                theme.accent(),
            ),
        ]);

        Paragraph::new(line).render(area, buf);
    }
}

pub struct KeyHints<'a> {
    theme: &'a BoardTheme,
}

impl<'a> KeyHints<'a> {
    pub fn new(theme: &'a BoardTheme) -> Self {
        Self { theme }
    }
}

impl Widget for KeyHints<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let key = self.theme.highlight();
        let text = self.theme.dimmed();
        let line = Line::from(vec![
            Span::styled(" q", key),
            Span::styled(" quit  ", text),
            Span::styled("i", key),
            Span::styled(" idle  ", text),
            Span::styled("r", key),
            Span::styled(" reconnect", text),
        ]);
        Paragraph::new(line).render(area, buf);
    }
}
