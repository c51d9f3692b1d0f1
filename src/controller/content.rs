//! What the controller asks a surface to show

use std::time::Duration;

use crate::chart::ChartSpec;
use crate::error::DisplayError;
use crate::markdown::{compose, MarkdownPayload};

// ─────────────────────────────────────────────────────────────────────────────
// Status indicator
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkStatus {
    Connecting,
    Connected,
    Disconnected,
    Error,
    /// Status text reported by the server that has no local meaning
    Server(String),
}

impl LinkStatus {
    /// Map a `connection_status` value onto the indicator
    pub fn from_server(status: &str) -> Self {
        match status.trim().to_lowercase().as_str() {
            "connected" | "open" => Self::Connected,
            "connecting" => Self::Connecting,
            "disconnected" | "closed" => Self::Disconnected,
            "error" | "failed" => Self::Error,
            _ => Self::Server(status.trim().to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Connecting => "Connecting",
            Self::Connected => "Connected",
            Self::Disconnected => "Disconnected",
            Self::Error => "Error",
            Self::Server(text) => text,
        }
    }
}

impl std::fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Banners
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BannerKind {
    Connection,
    CallUpdate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerTone {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub kind: BannerKind,
    pub tone: BannerTone,
    pub title: String,
    pub body: Option<String>,
}

impl Banner {
    pub fn connected() -> Self {
        Self {
            kind: BannerKind::Connection,
            tone: BannerTone::Success,
            title: "Connected".to_string(),
            body: None,
        }
    }

    pub fn connection(status: &LinkStatus, message: Option<&str>) -> Self {
        let tone = match status {
            LinkStatus::Connected => BannerTone::Success,
            LinkStatus::Error => BannerTone::Error,
            LinkStatus::Disconnected => BannerTone::Warning,
            _ => BannerTone::Info,
        };
        Self {
            kind: BannerKind::Connection,
            tone,
            title: status.label().to_string(),
            body: message.map(str::to_string),
        }
    }

    pub fn call_update(contact_name: &str, status_summary: &str) -> Self {
        Self {
            kind: BannerKind::CallUpdate,
            tone: BannerTone::Info,
            title: format!("Call update: {}", contact_name),
            body: Some(status_summary.to_string()),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Display slot
// ─────────────────────────────────────────────────────────────────────────────

pub const PROCESSING_ERROR: &str = "Error processing message from server.";
pub const MALFORMED_DATA: &str = "Received malformed data from server.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorBlock {
    pub message: String,
    /// Offending frame, when there is one worth showing
    pub raw: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    Idle,
    Markdown,
    Chart,
    Error,
    Raw,
}

/// Content of the single display slot
#[derive(Debug, Clone, PartialEq)]
pub enum SlotContent {
    Idle,
    /// Composed markdown source
    Markdown { source: String },
    Chart(ChartSpec),
    Error(ErrorBlock),
    /// Debug view of a message type the display does not know
    Raw {
        message_type: String,
        body: String,
    },
}

impl SlotContent {
    pub fn markdown(payload: &MarkdownPayload) -> Self {
        Self::Markdown {
            source: compose(payload),
        }
    }

    /// Error surfaced through the markdown path
    pub fn markdown_error(message: impl Into<String>) -> Self {
        Self::markdown(&MarkdownPayload::error(message))
    }

    /// Markdown error for a `graph_*` message that cannot be drawn
    pub fn chart_error(error: &DisplayError) -> Self {
        let text = match error {
            DisplayError::UnknownChartType { message_type } => {
                format!("Cannot render unknown graph type: {}", message_type)
            }
            DisplayError::InvalidPayload {
                message_type,
                details,
            } => format!("Invalid chart data for {}: {}", message_type, details),
            other => other.to_string(),
        };
        Self::markdown_error(text)
    }

    pub fn processing_error(raw: impl Into<String>) -> Self {
        Self::Error(ErrorBlock {
            message: PROCESSING_ERROR.to_string(),
            raw: Some(raw.into()),
        })
    }

    pub fn kind(&self) -> SlotKind {
        match self {
            Self::Idle => SlotKind::Idle,
            Self::Markdown { .. } => SlotKind::Markdown,
            Self::Chart(_) => SlotKind::Chart,
            Self::Error(_) => SlotKind::Error,
            Self::Raw { .. } => SlotKind::Raw,
        }
    }

    /// Everything but the idle presentation arms the idle timer
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Idle)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Idle logo animation
// ─────────────────────────────────────────────────────────────────────────────

const PULSE_PERIOD: f32 = 2.4;
const FLOAT_PERIOD: f32 = 3.6;

/// Pulse/float pose for the idle logo
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogoPose {
    /// Around 1.0, between 0.95 and 1.05
    pub scale: f32,
    /// Vertical offset between -1.0 and 1.0
    pub lift: f32,
}

impl Default for LogoPose {
    fn default() -> Self {
        Self {
            scale: 1.0,
            lift: 0.0,
        }
    }
}

/// Per-frame animation state, advanced by frame ticks
#[derive(Debug, Clone, Default)]
pub struct LogoAnimation {
    elapsed: Duration,
    frames: u64,
}

impl LogoAnimation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, delta: Duration) {
        self.elapsed += delta;
        self.frames += 1;
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn pose(&self) -> LogoPose {
        let t = self.elapsed.as_secs_f32();
        let tau = std::f32::consts::TAU;
        LogoPose {
            scale: 1.0 + 0.05 * (t * tau / PULSE_PERIOD).sin(),
            lift: (t * tau / FLOAT_PERIOD).sin(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_status_from_server() {
        assert_eq!(LinkStatus::from_server("Connected"), LinkStatus::Connected);
        assert_eq!(LinkStatus::from_server("closed"), LinkStatus::Disconnected);
        assert_eq!(LinkStatus::from_server("error"), LinkStatus::Error);
        assert_eq!(
            LinkStatus::from_server("Dialing"),
            LinkStatus::Server("Dialing".to_string())
        );
    }

    #[test]
    fn test_chart_error_text() {
        let content = SlotContent::chart_error(&DisplayError::UnknownChartType {
            message_type: "graph_hexagon".to_string(),
        });
        match content {
            SlotContent::Markdown { source } => {
                assert!(source.starts_with("## Error"));
                assert!(source.contains("Cannot render unknown graph type: graph_hexagon"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_pose_stays_in_range() {
        let mut anim = LogoAnimation::new();
        for _ in 0..500 {
            anim.advance(Duration::from_millis(16));
            let pose = anim.pose();
            assert!((0.95..=1.05).contains(&pose.scale));
            assert!((-1.0..=1.0).contains(&pose.lift));
        }
        assert_eq!(anim.frames(), 500);
    }
}
