//! Connection and call-update banners

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use crate::controller::{Banner, BannerKind};
use crate::tui::theme::{icons, BoardTheme};

pub struct BannerWidget<'a> {
    banner: &'a Banner,
    theme: &'a BoardTheme,
}

impl<'a> BannerWidget<'a> {
    pub fn new(banner: &'a Banner, theme: &'a BoardTheme) -> Self {
        Self { banner, theme }
    }
}

impl Widget for BannerWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let tone = self.theme.banner(self.banner.tone);
        let icon = match self.banner.kind {
            BannerKind::Connection => icons::INDICATOR,
            BannerKind::CallUpdate => icons::CALL,
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(tone)
            .style(ratatui::style::Style::default().bg(self.theme.deep_space));

        let mut lines = vec![Line::from(vec![
            Span::styled(format!("{} ", icon), tone),
            Span::styled(self.banner.title.clone(), self.theme.highlight()),
        ])];
        if let Some(body) = &self.banner.body {
            lines.push(Line::from(Span::styled(body.clone(), self.theme.text())));
        }

        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: true })
            .render(area, buf);
    }
}
