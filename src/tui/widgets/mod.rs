//! TUI Widgets - UI Components
//!
//! Each widget is a renderer over [`ViewState`] data. Business logic stays
//! in the controller; the only thing mutated here is fade progress.
//!
//! ```text
//! ┌ status bar ─────────────────────────────────────────────┐
//! │┌ DISPLAY ─────────────────────────── [connection banner]┐│
//! ││                                                        ││
//! ││            idle logo / markdown / chart / error        ││
//! ││                                                        ││
//! ││ [call update banner]                                   ││
//! │└────────────────────────────────────────────────────────┘│
//! └ key hints ──────────────────────────────────────────────┘
//! ```

mod banner;
mod chart;
mod slot;
mod status;

pub use banner::BannerWidget;
pub use chart::ChartWidget;
pub use slot::{ErrorWidget, IdleLogo, RawWidget};
pub use status::{KeyHints, StatusBar, StatusLine};

use std::time::Duration;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use tachyonfx::{EffectRenderer, Shader};

use super::state::{BannerView, SlotBody, ViewState};
use super::theme::{icons, BoardTheme};
use crate::controller::{BannerKind, SlotKind};

/// Draw one frame. `delta` is the time since the previous frame and drives
/// the fade effects.
pub fn draw(
    frame: &mut Frame,
    view: &mut ViewState,
    status: &StatusLine,
    theme: &BoardTheme,
    delta: Duration,
) {
    let area = frame.area();
    frame.render_widget(
        Block::default().style(Style::default().bg(theme.deep_space)),
        area,
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Status bar
            Constraint::Min(5),    // Display slot
            Constraint::Length(1), // Key hints
        ])
        .split(area);

    frame.render_widget(StatusBar::new(view, status, theme), chunks[0]);
    draw_slot(frame, view, theme, chunks[1], delta);
    draw_banner(frame, view, BannerKind::Connection, theme, chunks[1], delta);
    draw_banner(frame, view, BannerKind::CallUpdate, theme, chunks[1], delta);
    frame.render_widget(KeyHints::new(theme), chunks[2]);
}

fn slot_title(kind: Option<SlotKind>) -> String {
    match kind {
        Some(SlotKind::Chart) => format!(" {} CHART ", icons::CHART),
        Some(SlotKind::Error) => format!(" {} ERROR ", icons::ERROR),
        Some(SlotKind::Raw) => " RAW MESSAGE ".to_string(),
        _ => " DISPLAY ".to_string(),
    }
}

fn draw_slot(
    frame: &mut Frame,
    view: &mut ViewState,
    theme: &BoardTheme,
    area: Rect,
    delta: Duration,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.panel_border())
        .title(slot_title(view.slot().map(|s| s.kind)))
        .title_style(theme.header());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(slot) = view.slot() else {
        return;
    };
    if slot.is_hidden() {
        return;
    }

    match &slot.body {
        SlotBody::Idle => frame.render_widget(IdleLogo::new(view.logo_pose(), theme), inner),
        SlotBody::Markdown(lines) => frame.render_widget(
            Paragraph::new(lines.clone())
                .style(theme.text())
                .wrap(Wrap { trim: false }),
            inner,
        ),
        SlotBody::Chart(handle) => match view.charts().get(*handle) {
            Some(chart) => frame.render_widget(ChartWidget::new(chart, theme), inner),
            None => frame.render_widget(
                Paragraph::new("Chart resource missing.").style(theme.error()),
                inner,
            ),
        },
        SlotBody::Error(block) => frame.render_widget(ErrorWidget::new(block, theme), inner),
        SlotBody::Raw { message_type, body } => {
            frame.render_widget(RawWidget::new(message_type, body, theme), inner)
        }
    }

    if let Some(slot) = view.slot.as_mut() {
        if let Some(effect) = slot.effect.as_mut() {
            frame.render_effect(effect, inner, delta.into());
            if effect.done() {
                slot.effect = None;
            }
        }
    }
}

/// Where a banner of this kind sits inside the slot area
pub fn banner_area(kind: BannerKind, banner: &BannerView, slot: Rect) -> Rect {
    let inner = Rect {
        x: slot.x.saturating_add(1),
        y: slot.y.saturating_add(1),
        width: slot.width.saturating_sub(2),
        height: slot.height.saturating_sub(2),
    };
    let height = (if banner.banner.body.is_some() { 4 } else { 3 }).min(inner.height);

    match kind {
        BannerKind::Connection => {
            let width = 44.min(inner.width);
            Rect {
                x: inner.x + inner.width - width,
                y: inner.y,
                width,
                height,
            }
        }
        BannerKind::CallUpdate => Rect {
            x: inner.x,
            y: inner.y + inner.height - height,
            width: inner.width,
            height,
        },
    }
}

fn draw_banner(
    frame: &mut Frame,
    view: &mut ViewState,
    kind: BannerKind,
    theme: &BoardTheme,
    slot: Rect,
    delta: Duration,
) {
    let slot_ref = match kind {
        BannerKind::Connection => &mut view.connection_banner,
        BannerKind::CallUpdate => &mut view.call_banner,
    };
    let Some(banner) = slot_ref.as_mut() else {
        return;
    };

    let area = banner_area(kind, banner, slot);
    frame.render_widget(Clear, area);
    frame.render_widget(BannerWidget::new(&banner.banner, theme), area);

    if let Some(effect) = banner.effect.as_mut() {
        frame.render_effect(effect, area, delta.into());
        if effect.done() {
            banner.effect = None;
        }
    }
    if banner.hiding && banner.effect.is_none() {
        *slot_ref = None;
    }
}

/// Common widget utilities
pub mod utils {
    /// Format duration as HH:MM:SS
    pub fn format_duration(secs: u64) -> String {
        format!(
            "{:02}:{:02}:{:02}",
            secs / 3600,
            (secs % 3600) / 60,
            secs % 60
        )
    }

    /// Truncate string with ellipsis, on char boundaries
    pub fn truncate(s: &str, max_len: usize) -> String {
        if s.chars().count() <= max_len {
            s.to_string()
        } else if max_len <= 3 {
            s.chars().take(max_len).collect()
        } else {
            let head: String = s.chars().take(max_len - 3).collect();
            format!("{}...", head)
        }
    }

    /// Chart value label: integers without decimals, others to two places
    pub fn format_value(value: f64) -> String {
        if value.fract() == 0.0 && value.abs() < 1e15 {
            format!("{:.0}", value)
        } else {
            let text = format!("{:.2}", value);
            text.trim_end_matches('0').trim_end_matches('.').to_string()
        }
    }
}
