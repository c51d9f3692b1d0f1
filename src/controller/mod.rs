//! Display Controller - Domain Layer
//!
//! One explicit state machine owns the connection, the display slot, the
//! banners and every timer. It is synchronous and does no IO: stimuli come in
//! through [`DisplayController::handle`] and effects go out through the
//! injected [`TransportService`], [`TimerService`] and [`RenderService`].
//!
//! ```text
//!  Transport ──┐                          ┌──► TransportService (open/close)
//!  Timers   ───┼─► ControllerEvent ─► handle ─┼──► TimerService     (schedule/cancel)
//!  Frames   ───┘                          └──► RenderService    (indicator, banners, slot)
//! ```
//!
//! Content changes go through a fade-out → clear → mount cycle. Every
//! resource handle (chart, timers, logo animation) is released before it is
//! replaced.

mod content;
mod services;

pub use content::{
    Banner, BannerKind, BannerTone, ErrorBlock, LinkStatus, LogoAnimation, LogoPose,
    SlotContent, SlotKind, MALFORMED_DATA, PROCESSING_ERROR,
};
pub use services::{
    ConnectionId, ControllerEvent, RenderService, Timer, TimerId, TimerService,
    TransportEvent, TransportService,
};

use std::collections::HashMap;
use std::time::Duration;

use tracing::{debug, error, info, warn};
use url::Url;

use crate::chart::ChartHandle;
use crate::config::UnknownTypePolicy;
use crate::message::{Inbound, InvalidFrame};

/// Timings and policies the controller runs with
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerSettings {
    pub endpoint: Url,
    pub reconnect_delay: Duration,
    pub idle_timeout: Duration,
    pub transition: Duration,
    pub connection_banner: Duration,
    pub call_banner: Duration,
    pub unknown_types: UnknownTypePolicy,
}

impl ControllerSettings {
    /// Reference timings: 5 s reconnect, 5 min idle, 500 ms fade
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            reconnect_delay: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(300),
            transition: Duration::from_millis(500),
            connection_banner: Duration::from_secs(5),
            call_banner: Duration::from_secs(30),
            unknown_types: UnknownTypePolicy::Ignore,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentState {
    Idle,
    Active,
    Transitioning,
}

/// Counters for the status line and `check` output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControllerStats {
    pub frames: u64,
    pub rendered: u64,
    pub errors: u64,
    pub ignored: u64,
    pub connect_attempts: u64,
}

pub struct DisplayController<T, S, R> {
    settings: ControllerSettings,
    transport: T,
    timers: S,
    render: R,

    connection: ConnectionState,
    connection_id: Option<ConnectionId>,

    content: ContentState,
    mounted: Option<SlotKind>,
    pending: Option<SlotContent>,
    chart: Option<ChartHandle>,
    logo: Option<LogoAnimation>,

    armed: HashMap<Timer, TimerId>,
    shut_down: bool,
    stats: ControllerStats,
}

impl<T, S, R> DisplayController<T, S, R>
where
    T: TransportService,
    S: TimerService,
    R: RenderService,
{
    pub fn new(settings: ControllerSettings, transport: T, timers: S, render: R) -> Self {
        Self {
            settings,
            transport,
            timers,
            render,
            connection: ConnectionState::Closed,
            connection_id: None,
            content: ContentState::Idle,
            mounted: None,
            pending: None,
            chart: None,
            logo: None,
            armed: HashMap::new(),
            shut_down: false,
            stats: ControllerStats::default(),
        }
    }

    /// Mount the idle presentation and open the first connection
    pub fn start(&mut self) {
        info!(endpoint = %self.settings.endpoint, "display starting");
        self.show(SlotContent::Idle);
        self.connect();
    }

    /// Release every resource. No reconnect happens afterwards.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;

        for (_, id) in self.armed.drain() {
            self.timers.cancel(id);
        }
        if let Some(id) = self.connection_id.take() {
            self.transport.close(id);
        }
        self.connection = ConnectionState::Closed;
        self.pending = None;
        self.release_slot_resources();
        info!("display shut down");
    }

    /// Handle one event. Events are processed one at a time, in order.
    pub fn handle(&mut self, event: ControllerEvent) {
        if self.shut_down {
            debug!(?event, "event after shutdown ignored");
            return;
        }

        match event {
            ControllerEvent::Transport { connection, event } => {
                if self.connection_id != Some(connection) {
                    debug!(?connection, "event from a discarded connection ignored");
                    return;
                }
                match event {
                    TransportEvent::Opened => self.on_open(),
                    TransportEvent::Message(raw) => self.on_message(&raw),
                    TransportEvent::Closed { code, reason } => {
                        self.on_close(code, reason.as_deref())
                    }
                    TransportEvent::Error(error) => self.on_error(&error),
                }
            }
            ControllerEvent::Timer { timer, id } => {
                if self.armed.get(&timer) != Some(&id) {
                    debug!(?timer, ?id, "stale timer firing ignored");
                    return;
                }
                self.armed.remove(&timer);
                self.on_timer(timer);
            }
            ControllerEvent::Frame { elapsed } => self.animate_logo(elapsed),
            ControllerEvent::GoIdle => self.show(SlotContent::Idle),
            ControllerEvent::Reconnect => self.connect(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Connection manager
    // ─────────────────────────────────────────────────────────────────────

    /// Open a connection unless one is already open or connecting
    pub fn connect(&mut self) {
        if self.shut_down {
            return;
        }
        if matches!(
            self.connection,
            ConnectionState::Open | ConnectionState::Connecting
        ) {
            debug!(state = ?self.connection, "connection already open or connecting");
            return;
        }

        self.disarm(Timer::Reconnect);
        self.connection = ConnectionState::Connecting;
        self.stats.connect_attempts += 1;
        self.render.set_indicator(&LinkStatus::Connecting);
        info!(
            endpoint = %self.settings.endpoint,
            attempt = self.stats.connect_attempts,
            "connecting"
        );

        match self.transport.open(&self.settings.endpoint) {
            Ok(id) => self.connection_id = Some(id),
            Err(e) => {
                warn!(error = %e, "connection attempt could not start");
                self.closed(LinkStatus::Error);
            }
        }
    }

    fn on_open(&mut self) {
        info!(endpoint = %self.settings.endpoint, "connection established");
        self.connection = ConnectionState::Open;
        self.render.set_indicator(&LinkStatus::Connected);
        self.render.show_banner(&Banner::connected());
        self.arm(Timer::ConnectionBanner, self.settings.connection_banner);
    }

    fn on_close(&mut self, code: Option<u16>, reason: Option<&str>) {
        let mut detail = String::new();
        if let Some(code) = code {
            detail.push_str(&format!("Code: {}", code));
        }
        if let Some(reason) = reason.filter(|r| !r.is_empty()) {
            if !detail.is_empty() {
                detail.push(' ');
            }
            detail.push_str(&format!("Reason: {}", reason));
        }
        if detail.is_empty() {
            detail.push_str("No specific reason given by server.");
        }
        info!(%detail, "connection closed");

        self.closed(LinkStatus::Disconnected);
    }

    /// Errors are normalized into an explicit close
    fn on_error(&mut self, error: &str) {
        warn!(%error, "transport error");
        if self.connection != ConnectionState::Closed {
            if let Some(id) = self.connection_id {
                self.transport.close(id);
            }
        }
        self.closed(LinkStatus::Error);
    }

    /// The single reconnect path. The display slot is left alone.
    fn closed(&mut self, status: LinkStatus) {
        self.connection = ConnectionState::Closed;
        self.connection_id = None;
        self.render.set_indicator(&status);
        if !self.shut_down {
            debug!(delay = ?self.settings.reconnect_delay, "reconnect scheduled");
            self.arm(Timer::Reconnect, self.settings.reconnect_delay);
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Message dispatcher
    // ─────────────────────────────────────────────────────────────────────

    fn on_message(&mut self, raw: &str) {
        self.stats.frames += 1;
        debug!(bytes = raw.len(), "frame received");

        match Inbound::parse(raw) {
            Inbound::ConnectionStatus(notice) => {
                let status = LinkStatus::from_server(&notice.status);
                self.render.set_indicator(&status);
                self.render
                    .show_banner(&Banner::connection(&status, notice.message.as_deref()));
                self.arm(Timer::ConnectionBanner, self.settings.connection_banner);
            }
            Inbound::CallUpdate(update) => {
                info!(contact = %update.contact_name, "call update available");
                self.render.show_banner(&Banner::call_update(
                    &update.contact_name,
                    &update.status_summary,
                ));
                self.arm(Timer::CallBanner, self.settings.call_banner);
            }
            Inbound::Markdown(payload) => self.show(SlotContent::markdown(&payload)),
            Inbound::Chart(spec) => {
                debug!(summary = %spec.summary(), "chart received");
                self.show(SlotContent::Chart(spec));
            }
            Inbound::Ignored {
                message_type,
                reason,
            } => {
                self.stats.ignored += 1;
                warn!(%message_type, %reason, "message ignored");
            }
            Inbound::Unknown {
                message_type,
                payload,
            } => match self.settings.unknown_types {
                UnknownTypePolicy::Ignore => {
                    self.stats.ignored += 1;
                    warn!(%message_type, "unknown message type ignored");
                }
                UnknownTypePolicy::ShowRaw => {
                    let body = serde_json::to_string_pretty(&payload)
                        .unwrap_or_else(|_| payload.to_string());
                    self.show(SlotContent::Raw { message_type, body });
                }
            },
            Inbound::Invalid(invalid) => {
                self.stats.errors += 1;
                let content = match invalid {
                    InvalidFrame::Unparseable { raw, error } => {
                        error!(%error, "unparseable frame");
                        SlotContent::processing_error(raw)
                    }
                    InvalidFrame::Malformed(error) => {
                        error!(%error, "malformed message");
                        SlotContent::markdown_error(MALFORMED_DATA)
                    }
                    InvalidFrame::Chart(error) => {
                        error!(%error, "chart cannot be rendered");
                        SlotContent::chart_error(&error)
                    }
                };
                self.show(content);
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Content transitions
    // ─────────────────────────────────────────────────────────────────────

    /// Replace the slot content through the fade protocol
    pub fn show(&mut self, content: SlotContent) {
        if self.shut_down {
            return;
        }

        if !content.is_active() && self.content == ContentState::Idle && self.mounted.is_some()
        {
            debug!("already idle");
            return;
        }

        match self.content {
            ContentState::Transitioning => {
                debug!(kind = ?content.kind(), "transition pending, replacing next content");
                self.pending = Some(content);
            }
            _ if self.mounted.is_none() => self.mount_now(content),
            _ => {
                // re-armed on mount when the next content is active
                self.disarm(Timer::Idle);
                self.content = ContentState::Transitioning;
                self.render.fade_out();
                self.pending = Some(content);
                self.arm(Timer::Transition, self.settings.transition);
            }
        }
    }

    fn on_timer(&mut self, timer: Timer) {
        match timer {
            Timer::Reconnect => self.connect(),
            Timer::Idle => {
                info!(after = ?self.settings.idle_timeout, "no new content, returning to idle");
                self.show(SlotContent::Idle);
            }
            Timer::Transition => {
                if let Some(content) = self.pending.take() {
                    self.mount_now(content);
                }
            }
            Timer::ConnectionBanner => self.render.hide_banner(BannerKind::Connection),
            Timer::CallBanner => self.render.hide_banner(BannerKind::CallUpdate),
        }
    }

    fn mount_now(&mut self, content: SlotContent) {
        self.render.clear();
        self.release_slot_resources();

        if let SlotContent::Chart(spec) = &content {
            self.chart = Some(self.render.create_chart(spec));
        }
        self.render.mount(&content, self.chart);
        self.mounted = Some(content.kind());
        self.stats.rendered += 1;

        if content.is_active() {
            self.content = ContentState::Active;
            self.arm(Timer::Idle, self.settings.idle_timeout);
        } else {
            self.content = ContentState::Idle;
            self.disarm(Timer::Idle);
            self.logo = Some(LogoAnimation::new());
        }
    }

    fn release_slot_resources(&mut self) {
        if let Some(chart) = self.chart.take() {
            self.render.destroy_chart(chart);
        }
        self.logo = None;
    }

    fn animate_logo(&mut self, elapsed: Duration) {
        let Some(logo) = self.logo.as_mut() else {
            return;
        };
        if !self.render.logo_present() {
            debug!("idle logo gone, animation stopped");
            self.logo = None;
            return;
        }
        logo.advance(elapsed);
        self.render.pose_logo(logo.pose());
    }

    // ─────────────────────────────────────────────────────────────────────
    // Timer ownership
    // ─────────────────────────────────────────────────────────────────────

    fn arm(&mut self, timer: Timer, after: Duration) {
        self.disarm(timer);
        let id = self.timers.schedule(timer, after);
        self.armed.insert(timer, id);
    }

    fn disarm(&mut self, timer: Timer) {
        if let Some(id) = self.armed.remove(&timer) {
            self.timers.cancel(id);
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────

    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.connection
    }

    pub fn content_state(&self) -> ContentState {
        self.content
    }

    pub fn mounted(&self) -> Option<SlotKind> {
        self.mounted
    }

    pub fn chart(&self) -> Option<ChartHandle> {
        self.chart
    }

    pub fn is_armed(&self, timer: Timer) -> bool {
        self.armed.contains_key(&timer)
    }

    pub fn is_animating(&self) -> bool {
        self.logo.is_some()
    }

    pub fn stats(&self) -> ControllerStats {
        self.stats
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn timers(&self) -> &S {
        &self.timers
    }

    pub fn render(&self) -> &R {
        &self.render
    }

    pub fn render_mut(&mut self) -> &mut R {
        &mut self.render
    }
}
