//! Rendering tests on ratatui's TestBackend
//!
//! The view is driven through `RenderService` exactly as the controller
//! would, then drawn and read back as text.

use std::time::{Duration, Instant};

use ratatui::{backend::TestBackend, buffer::Buffer, layout::Rect, widgets::Widget, Terminal};
use serde_json::json;

use callboard::chart::{ChartKind, ChartSpec, LiveChart};
use callboard::controller::{
    Banner, BannerKind, ControllerStats, ErrorBlock, LinkStatus, RenderService, SlotContent,
};
use callboard::markdown::{compose, MarkdownPayload};
use callboard::tui::widgets::{draw, ChartWidget, StatusLine};
use callboard::tui::{BoardTheme, ViewState};

const FRAME: Duration = Duration::from_millis(33);

struct Screen {
    terminal: Terminal<TestBackend>,
    view: ViewState,
    theme: BoardTheme,
}

impl Screen {
    fn new() -> Self {
        let theme = BoardTheme::new();
        let view = ViewState::new(&theme, Duration::from_millis(500));
        Self {
            terminal: Terminal::new(TestBackend::new(120, 30)).unwrap(),
            view,
            theme,
        }
    }

    fn draw(&mut self, delta: Duration) -> String {
        let status = StatusLine {
            endpoint: "ws://localhost:8001/ws".to_string(),
            stats: ControllerStats::default(),
            uptime: Duration::from_secs(75),
        };
        let view = &mut self.view;
        let theme = &self.theme;
        self.terminal
            .draw(|frame| draw(frame, view, &status, theme, delta))
            .unwrap();

        let buffer = self.terminal.backend().buffer();
        buffer
            .content
            .chunks(usize::from(buffer.area.width))
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn mount(&mut self, content: SlotContent) {
        self.view.clear();
        let chart = match &content {
            SlotContent::Chart(spec) => Some(self.view.create_chart(spec)),
            _ => None,
        };
        self.view.mount(&content, chart);
    }
}

fn chart(kind: ChartKind, payload: serde_json::Value) -> SlotContent {
    SlotContent::Chart(ChartSpec::new(kind, serde_json::from_value(payload).unwrap()))
}

#[test]
fn test_status_bar_shows_indicator_and_endpoint() {
    let mut screen = Screen::new();
    screen.view.set_indicator(&LinkStatus::Connected);
    let text = screen.draw(FRAME);

    assert!(text.contains("CALLBOARD"));
    assert!(text.contains("● Connected"));
    assert!(text.contains("ws://localhost:8001/ws"));
    assert!(text.contains("00:01:15"));
    assert!(text.contains("reconnect"));
}

#[test]
fn test_idle_shows_logo_and_caption() {
    let mut screen = Screen::new();
    screen.mount(SlotContent::Idle);
    let text = screen.draw(FRAME);

    assert!(text.contains("DISPLAY"));
    assert!(text.contains("Waiting for the next update"));
    assert!(text.contains("╭──────────────╮"));
}

#[test]
fn test_markdown_slot() {
    let mut screen = Screen::new();
    let source = compose(&MarkdownPayload::new(
        "Morning Briefing",
        "# Morning Briefing\n\n- Acme renewal\n- Globex escalation",
    ));
    screen.mount(SlotContent::Markdown { source });
    let text = screen.draw(FRAME);

    assert_eq!(text.matches("Morning Briefing").count(), 1);
    assert!(text.contains("• Acme renewal"));
    assert!(text.contains("• Globex escalation"));
}

#[test]
fn test_error_block_shows_raw_frame() {
    let mut screen = Screen::new();
    screen.mount(SlotContent::Error(ErrorBlock {
        message: "Error processing message from server.".to_string(),
        raw: Some("{oops".to_string()),
    }));
    let text = screen.draw(FRAME);

    assert!(text.contains("ERROR"));
    assert!(text.contains("Error processing message from server."));
    assert!(text.contains("{oops"));
}

#[test]
fn test_raw_view_for_unknown_type() {
    let mut screen = Screen::new();
    screen.mount(SlotContent::Raw {
        message_type: "weather".to_string(),
        body: "{\n  \"temp\": 21\n}".to_string(),
    });
    let text = screen.draw(FRAME);

    assert!(text.contains("RAW MESSAGE"));
    assert!(text.contains("Message type: weather"));
    assert!(text.contains("\"temp\": 21"));
}

#[test]
fn test_bar_chart_labels_and_values() {
    let mut screen = Screen::new();
    screen.mount(chart(
        ChartKind::Bar,
        json!({
            "title": "Calls per region",
            "labels": ["North", "South"],
            "datasets": [{"label": "Calls", "values": [12, 7]}],
            "options": {"animated": false, "y_axis_label": "Calls"}
        }),
    ));
    let text = screen.draw(FRAME);

    assert!(text.contains("CHART"));
    assert!(text.contains("Calls per region"));
    assert!(text.contains("North"));
    assert!(text.contains("South"));
    assert!(text.contains("12"));
    assert_eq!(screen.view.charts().live(), 1);
}

#[test]
fn test_line_chart_legend_for_multiple_series() {
    let mut screen = Screen::new();
    screen.mount(chart(
        ChartKind::Line,
        json!({
            "labels": ["09:00", "10:00", "11:00"],
            "datasets": [
                {"label": "Inbound", "values": [4, 9, 6]},
                {"label": "Outbound", "values": [2, 3, 8]}
            ],
            "options": {"animated": false}
        }),
    ));
    let text = screen.draw(FRAME);

    assert!(text.contains("Inbound"));
    assert!(text.contains("Outbound"));
    assert!(text.contains("09:00"));
}

#[test]
fn test_pie_chart_legend_percentages() {
    let mut screen = Screen::new();
    screen.mount(chart(
        ChartKind::Pie,
        json!({
            "labels": ["Resolved", "Escalated"],
            "datasets": [{"label": "Outcomes", "values": [75, 25]}],
            "options": {"animated": false}
        }),
    ));
    let text = screen.draw(FRAME);

    assert!(text.contains("Resolved 75.0%"));
    assert!(text.contains("Escalated 25.0%"));
}

#[test]
fn test_pie_chart_with_huge_label_still_draws() {
    let mut screen = Screen::new();
    screen.mount(chart(
        ChartKind::Pie,
        json!({
            "labels": ["x".repeat(65530), "B"],
            "datasets": [{"label": "Share", "values": [1, 2]}],
            "options": {"animated": false}
        }),
    ));
    let text = screen.draw(FRAME);

    assert!(text.contains("CHART"));
    assert!(text.contains("xxxxxxxx"));
}

fn braille_dots(buf: &Buffer) -> usize {
    buf.content
        .iter()
        .filter(|cell| {
            cell.symbol()
                .chars()
                .any(|c| ('\u{2801}'..='\u{28FF}').contains(&c))
        })
        .count()
}

#[test]
fn test_pie_grow_in_follows_pinned_progress() {
    let theme = BoardTheme::new();
    let spec = ChartSpec::new(
        ChartKind::Pie,
        serde_json::from_value(json!({
            "labels": ["Resolved", "Escalated"],
            "datasets": [{"label": "Outcomes", "values": [75, 25]}]
        }))
        .unwrap(),
    );
    assert!(spec.animated);
    let live = LiveChart {
        spec,
        created_at: Instant::now(),
    };
    let area = Rect::new(0, 0, 60, 20);

    let mut start = Buffer::empty(area);
    ChartWidget::new(&live, &theme)
        .with_progress(0.0)
        .render(area, &mut start);
    let mut half = Buffer::empty(area);
    ChartWidget::new(&live, &theme)
        .with_progress(0.5)
        .render(area, &mut half);
    let mut done = Buffer::empty(area);
    ChartWidget::new(&live, &theme)
        .with_progress(1.0)
        .render(area, &mut done);

    assert_eq!(braille_dots(&start), 0);
    assert!(braille_dots(&half) > 0);
    assert!(braille_dots(&done) > braille_dots(&half));
}

#[test]
fn test_destroyed_chart_released() {
    let mut screen = Screen::new();
    let content = chart(
        ChartKind::Bar,
        json!({"labels": ["A"], "datasets": [{"label": "s", "values": [1]}]}),
    );
    screen.mount(content.clone());
    let first = screen.view.charts().created();

    if let Some(handle) = screen.view.slot().and_then(|slot| match slot.body {
        callboard::tui::SlotBody::Chart(h) => Some(h),
        _ => None,
    }) {
        screen.view.destroy_chart(handle);
    }
    screen.mount(content);

    assert_eq!(screen.view.charts().live(), 1);
    assert_eq!(screen.view.charts().created(), first + 1);
}

#[test]
fn test_banners_render_and_fade_away() {
    let mut screen = Screen::new();
    screen.mount(SlotContent::Idle);
    screen.view.show_banner(&Banner::connected());
    screen
        .view
        .show_banner(&Banner::call_update("Acme", "Customer asked for a callback"));

    let text = screen.draw(FRAME);
    assert!(text.contains("Connected"));
    assert!(text.contains("Call update: Acme"));
    assert!(text.contains("Customer asked for a callback"));

    screen.view.hide_banner(BannerKind::Connection);
    screen.view.hide_banner(BannerKind::CallUpdate);
    screen.draw(Duration::from_secs(1));
    let text = screen.draw(FRAME);

    assert!(!text.contains("Call update: Acme"));
    assert!(screen.view.banner(BannerKind::Connection).is_none());
    assert!(screen.view.banner(BannerKind::CallUpdate).is_none());
}

#[test]
fn test_faded_out_slot_draws_nothing() {
    let mut screen = Screen::new();
    screen.mount(SlotContent::Markdown {
        source: "## Leaving\n\nsoon".to_string(),
    });
    screen.draw(FRAME);

    screen.view.fade_out();
    screen.draw(Duration::from_secs(1));
    let text = screen.draw(FRAME);

    assert!(screen.view.slot().unwrap().is_hidden());
    assert!(!text.contains("Leaving"));
}
