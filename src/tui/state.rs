//! View State - Render Surface
//!
//! [`ViewState`] is what the controller drives through [`RenderService`]. It
//! holds everything the widgets draw: indicator, banners, the display slot,
//! live charts and the logo pose. Fades are tachyonfx effects that the
//! widgets advance on every frame.

use std::time::{Duration, Instant};

use ratatui::style::Color;
use ratatui::text::Line;
use tachyonfx::{fx, Effect, Interpolation};
use tracing::{debug, warn};

use super::theme::BoardTheme;
use crate::chart::{ChartHandle, ChartRegistry, ChartSpec};
use crate::controller::{
    Banner, BannerKind, ErrorBlock, LinkStatus, LogoPose, RenderService, SlotContent, SlotKind,
};
use crate::markdown::{render_markdown, MarkdownStyles};

const BANNER_FADE_IN_MS: u32 = 250;
const BANNER_FADE_OUT_MS: u32 = 400;

/// A banner on screen
pub struct BannerView {
    pub banner: Banner,
    pub(crate) effect: Option<Effect>,
    pub(crate) hiding: bool,
}

impl BannerView {
    pub fn is_hiding(&self) -> bool {
        self.hiding
    }
}

/// What the slot draws, prepared at mount time
pub enum SlotBody {
    Idle,
    Markdown(Vec<Line<'static>>),
    Chart(ChartHandle),
    Error(ErrorBlock),
    Raw {
        message_type: String,
        body: String,
    },
}

pub struct SlotView {
    pub kind: SlotKind,
    pub body: SlotBody,
    pub(crate) effect: Option<Effect>,
    pub(crate) fading_out: bool,
}

impl SlotView {
    pub fn is_fading_out(&self) -> bool {
        self.fading_out
    }

    /// Fade-out finished; nothing to draw until the next mount
    pub fn is_hidden(&self) -> bool {
        self.fading_out && self.effect.is_none()
    }
}

pub struct ViewState {
    pub indicator: LinkStatus,
    pub indicator_since: Instant,
    pub(crate) connection_banner: Option<BannerView>,
    pub(crate) call_banner: Option<BannerView>,
    pub(crate) slot: Option<SlotView>,
    charts: ChartRegistry,
    logo: LogoPose,
    styles: MarkdownStyles,
    fade: Duration,
    backdrop: Color,
}

impl ViewState {
    pub fn new(theme: &BoardTheme, fade: Duration) -> Self {
        Self {
            indicator: LinkStatus::Connecting,
            indicator_since: Instant::now(),
            connection_banner: None,
            call_banner: None,
            slot: None,
            charts: ChartRegistry::new(),
            logo: LogoPose::default(),
            styles: theme.markdown(),
            fade,
            backdrop: theme.deep_space,
        }
    }

    pub fn slot(&self) -> Option<&SlotView> {
        self.slot.as_ref()
    }

    pub fn banner(&self, kind: BannerKind) -> Option<&BannerView> {
        match kind {
            BannerKind::Connection => self.connection_banner.as_ref(),
            BannerKind::CallUpdate => self.call_banner.as_ref(),
        }
    }

    fn banner_mut(&mut self, kind: BannerKind) -> &mut Option<BannerView> {
        match kind {
            BannerKind::Connection => &mut self.connection_banner,
            BannerKind::CallUpdate => &mut self.call_banner,
        }
    }

    pub fn charts(&self) -> &ChartRegistry {
        &self.charts
    }

    pub fn logo_pose(&self) -> LogoPose {
        self.logo
    }

    fn fade_ms(&self) -> u32 {
        u32::try_from(self.fade.as_millis()).unwrap_or(u32::MAX)
    }

    fn fade_in(&self, millis: u32) -> Effect {
        fx::fade_from_fg(self.backdrop, (millis, Interpolation::QuadIn))
    }

    fn fade_away(&self, millis: u32) -> Effect {
        fx::fade_to_fg(self.backdrop, (millis, Interpolation::QuadOut))
    }
}

impl RenderService for ViewState {
    fn set_indicator(&mut self, status: &LinkStatus) {
        if &self.indicator != status {
            self.indicator = status.clone();
            self.indicator_since = Instant::now();
        }
    }

    fn show_banner(&mut self, banner: &Banner) {
        let effect = self.fade_in(BANNER_FADE_IN_MS);
        *self.banner_mut(banner.kind) = Some(BannerView {
            banner: banner.clone(),
            effect: Some(effect),
            hiding: false,
        });
    }

    fn hide_banner(&mut self, kind: BannerKind) {
        let effect = self.fade_away(BANNER_FADE_OUT_MS);
        match self.banner_mut(kind) {
            Some(view) if !view.hiding => {
                view.hiding = true;
                view.effect = Some(effect);
            }
            Some(_) => {}
            None => debug!(?kind, "no banner to hide"),
        }
    }

    fn fade_out(&mut self) {
        let effect = self.fade_away(self.fade_ms());
        if let Some(slot) = self.slot.as_mut() {
            slot.fading_out = true;
            slot.effect = Some(effect);
        }
    }

    fn clear(&mut self) {
        self.slot = None;
    }

    fn mount(&mut self, content: &SlotContent, chart: Option<ChartHandle>) {
        let body = match content {
            SlotContent::Idle => SlotBody::Idle,
            SlotContent::Markdown { source } => {
                SlotBody::Markdown(render_markdown(source, &self.styles))
            }
            SlotContent::Chart(_) => match chart {
                Some(handle) => SlotBody::Chart(handle),
                None => {
                    warn!("chart content mounted without a live chart");
                    SlotBody::Error(ErrorBlock {
                        message: "Chart could not be created.".to_string(),
                        raw: None,
                    })
                }
            },
            SlotContent::Error(block) => SlotBody::Error(block.clone()),
            SlotContent::Raw { message_type, body } => SlotBody::Raw {
                message_type: message_type.clone(),
                body: body.clone(),
            },
        };

        let effect = self.fade_in(self.fade_ms());
        self.slot = Some(SlotView {
            kind: content.kind(),
            body,
            effect: Some(effect),
            fading_out: false,
        });
        if content.kind() == SlotKind::Idle {
            self.logo = LogoPose::default();
        }
    }

    fn create_chart(&mut self, spec: &ChartSpec) -> ChartHandle {
        self.charts.create(spec.clone())
    }

    fn destroy_chart(&mut self, chart: ChartHandle) {
        if !self.charts.destroy(chart) {
            warn!(?chart, "chart was already released");
        }
    }

    fn logo_present(&self) -> bool {
        matches!(
            self.slot,
            Some(SlotView {
                kind: SlotKind::Idle,
                ..
            })
        )
    }

    fn pose_logo(&mut self, pose: LogoPose) {
        self.logo = pose;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::line_text;

    fn view() -> ViewState {
        ViewState::new(&BoardTheme::new(), Duration::from_millis(500))
    }

    #[test]
    fn test_mount_markdown_renders_lines() {
        let mut view = view();
        view.mount(
            &SlotContent::Markdown {
                source: "## Hello\n\nWorld".to_string(),
            },
            None,
        );
        match &view.slot().unwrap().body {
            SlotBody::Markdown(lines) => {
                let text: Vec<String> = lines.iter().map(line_text).collect();
                assert_eq!(text[0], "Hello");
                assert!(text.contains(&"World".to_string()));
            }
            _ => panic!("expected markdown body"),
        }
    }

    #[test]
    fn test_logo_present_only_for_idle() {
        let mut view = view();
        assert!(!view.logo_present());
        view.mount(&SlotContent::Idle, None);
        assert!(view.logo_present());
        view.clear();
        assert!(!view.logo_present());
    }

    #[test]
    fn test_fade_out_marks_slot() {
        let mut view = view();
        view.mount(&SlotContent::Idle, None);
        view.fade_out();
        let slot = view.slot().unwrap();
        assert!(slot.is_fading_out());
        assert!(!slot.is_hidden());
    }

    #[test]
    fn test_banner_replaced_by_kind() {
        let mut view = view();
        view.show_banner(&Banner::call_update("Acme", "first"));
        view.show_banner(&Banner::call_update("Acme", "second"));
        view.show_banner(&Banner::connected());

        let call = view.banner(BannerKind::CallUpdate).unwrap();
        assert_eq!(call.banner.body.as_deref(), Some("second"));
        assert!(view.banner(BannerKind::Connection).is_some());

        view.hide_banner(BannerKind::CallUpdate);
        assert!(view.banner(BannerKind::CallUpdate).unwrap().is_hiding());
    }

    #[test]
    fn test_indicator_change_resets_since() {
        let mut view = view();
        let before = view.indicator_since;
        std::thread::sleep(Duration::from_millis(2));
        view.set_indicator(&LinkStatus::Connecting);
        assert_eq!(view.indicator_since, before);
        view.set_indicator(&LinkStatus::Connected);
        assert!(view.indicator_since > before);
    }
}
