//! Collaborator seams of the controller
//!
//! The controller never touches a socket, a clock or the terminal directly.
//! It talks to these three traits and receives everything back as
//! [`ControllerEvent`] values.

use std::time::Duration;

use url::Url;

use super::content::{Banner, BannerKind, LinkStatus, LogoPose, SlotContent};
use crate::chart::{ChartHandle, ChartSpec};
use crate::error::Result;

/// Identity of one connection attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub u64);

/// Identity of one scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

/// Timer kinds; at most one of each is armed at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timer {
    Reconnect,
    Idle,
    Transition,
    ConnectionBanner,
    CallBanner,
}

/// What a transport reports about one connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Opened,
    Message(String),
    Closed {
        code: Option<u16>,
        reason: Option<String>,
    },
    Error(String),
}

/// Every stimulus the controller reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    Transport {
        connection: ConnectionId,
        event: TransportEvent,
    },
    Timer {
        timer: Timer,
        id: TimerId,
    },
    /// Animation frame; `elapsed` since the previous one
    Frame {
        elapsed: Duration,
    },
    /// Operator asked for the idle presentation now
    GoIdle,
    /// Operator asked for a connection attempt now
    Reconnect,
}

/// Opens and closes WebSocket connections
pub trait TransportService {
    /// Start a connection attempt. Progress arrives later as
    /// [`ControllerEvent::Transport`] tagged with the returned id.
    fn open(&mut self, url: &Url) -> Result<ConnectionId>;

    /// Close a connection. Nothing more is reported for it afterwards.
    fn close(&mut self, connection: ConnectionId);
}

/// One-shot timers that come back as [`ControllerEvent::Timer`]
pub trait TimerService {
    fn schedule(&mut self, timer: Timer, after: Duration) -> TimerId;

    /// Cancelling an already-fired timer is a no-op
    fn cancel(&mut self, id: TimerId);
}

/// The screen: indicator, banners, display slot, chart resources, logo
pub trait RenderService {
    fn set_indicator(&mut self, status: &LinkStatus);

    /// Show a banner, replacing any banner of the same kind
    fn show_banner(&mut self, banner: &Banner);

    /// Fade the banner of this kind away
    fn hide_banner(&mut self, kind: BannerKind);

    /// Start fading the mounted content out
    fn fade_out(&mut self);

    /// Remove the mounted content entirely
    fn clear(&mut self);

    /// Insert new content with a fade-in. `chart` is set for chart content.
    fn mount(&mut self, content: &SlotContent, chart: Option<ChartHandle>);

    fn create_chart(&mut self, spec: &ChartSpec) -> ChartHandle;

    fn destroy_chart(&mut self, chart: ChartHandle);

    /// Whether the idle logo is currently on screen
    fn logo_present(&self) -> bool;

    fn pose_logo(&mut self, pose: LogoPose);
}
