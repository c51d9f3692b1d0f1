//! TUI Application - Main entry point and run loop

use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use crossterm::{
    event::{Event, EventStream},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::time::MissedTickBehavior;
use tracing::info;

use super::events::{handle_key_event, Action};
use super::runtime::{event_channel, EventReceiver, MockTransport, TokioTimers, WsTransport};
use super::state::ViewState;
use super::theme::BoardTheme;
use super::widgets::{draw, StatusLine};
use crate::config::DisplayConfig;
use crate::controller::{ControllerEvent, DisplayController, TransportService};

type Board<T> = DisplayController<T, TokioTimers, ViewState>;

/// TUI Application
pub struct TuiApp<T: TransportService> {
    controller: Board<T>,
    events: EventReceiver,
    theme: BoardTheme,
    frame_interval: Duration,
    started: Instant,
}

impl TuiApp<WsTransport> {
    /// Display connected to the configured server
    pub fn connect(config: &DisplayConfig) -> anyhow::Result<Self> {
        let (tx, rx) = event_channel();
        let transport = WsTransport::new(tx.clone());
        Self::assemble(config, transport, TokioTimers::new(tx), rx)
    }
}

impl TuiApp<MockTransport> {
    /// Display fed by the scripted demo session
    pub fn demo(config: &DisplayConfig) -> anyhow::Result<Self> {
        let (tx, rx) = event_channel();
        let transport = MockTransport::new(tx.clone());
        Self::assemble(config, transport, TokioTimers::new(tx), rx)
    }
}

impl<T: TransportService> TuiApp<T> {
    fn assemble(
        config: &DisplayConfig,
        transport: T,
        timers: TokioTimers,
        events: EventReceiver,
    ) -> anyhow::Result<Self> {
        let settings = config.controller_settings()?;
        let theme = BoardTheme::new();
        let view = ViewState::new(&theme, settings.transition);

        Ok(Self {
            controller: DisplayController::new(settings, transport, timers, view),
            events,
            theme,
            frame_interval: config.frame_interval(),
            started: Instant::now(),
        })
    }

    /// Run the TUI application
    pub async fn run(mut self) -> anyhow::Result<()> {
        // Setup terminal
        let mut terminal = self.setup_terminal()?;

        self.controller.start();

        // Main loop
        let result = self.main_loop(&mut terminal).await;

        self.controller.shutdown();

        // Restore terminal
        self.restore_terminal(&mut terminal)?;

        result
    }

    /// Setup terminal for TUI
    fn setup_terminal(&self) -> anyhow::Result<Terminal<CrosstermBackend<Stdout>>> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(terminal)
    }

    /// Restore terminal to normal state
    fn restore_terminal(
        &self,
        terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    ) -> anyhow::Result<()> {
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;
        Ok(())
    }

    /// Main event loop
    async fn main_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    ) -> anyhow::Result<()> {
        let mut keys = EventStream::new();
        let mut ticker = tokio::time::interval(self.frame_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut last_frame = Instant::now();

        loop {
            tokio::select! {
                Some(event) = self.events.recv() => self.controller.handle(event),

                _ = ticker.tick() => {
                    let delta = last_frame.elapsed();
                    last_frame = Instant::now();
                    self.controller.handle(ControllerEvent::Frame { elapsed: delta });

                    let status = StatusLine {
                        endpoint: self.controller.settings().endpoint.to_string(),
                        stats: self.controller.stats(),
                        uptime: self.started.elapsed(),
                    };
                    let theme = &self.theme;
                    let view = self.controller.render_mut();
                    terminal.draw(|frame| draw(frame, view, &status, theme, delta))?;
                }

                input = keys.next() => match input {
                    Some(Ok(Event::Key(key))) => match handle_key_event(key) {
                        Action::Quit => {
                            info!("quit requested");
                            break;
                        }
                        Action::GoIdle => self.controller.handle(ControllerEvent::GoIdle),
                        Action::Reconnect => self.controller.handle(ControllerEvent::Reconnect),
                        Action::None => {}
                    },
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                    None => break,
                },
            }
        }

        Ok(())
    }
}
