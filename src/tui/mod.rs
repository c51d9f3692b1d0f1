//! TUI Module - Wallboard Display
//!
//! Terminal rendition of the call-center display.
//!
//! Architecture:
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                        UI LAYER (widgets/)                          │
//! │  Pure rendering over ViewState. Advances fade effects only.         │
//! └─────────────────────────────────────────────────────────────────────┘
//!                               ▲
//!                               │ RenderService (ViewState)
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                 DOMAIN LAYER (crate::controller)                    │
//! │  DisplayController state machine. Synchronous, no IO.               │
//! └─────────────────────────────────────────────────────────────────────┘
//!                               ▲
//!                               │ ControllerEvent channel
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    CONNECTOR LAYER (runtime/)                       │
//! │  WsTransport + MockTransport, TokioTimers. Async IO.                │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

mod app;
mod events;
mod state;
mod theme;

pub mod runtime;
pub mod widgets;

pub use app::TuiApp;
pub use events::{handle_key_event, Action};
pub use state::{BannerView, SlotBody, SlotView, ViewState};
pub use theme::{icons, BoardTheme};

use crate::config::DisplayConfig;

/// Run the display against the configured server
pub async fn run(config: &DisplayConfig) -> anyhow::Result<()> {
    let app = TuiApp::connect(config)?;
    app.run().await
}

/// Run the display on the scripted demo session
pub async fn demo(config: &DisplayConfig) -> anyhow::Result<()> {
    let app = TuiApp::demo(config)?;
    app.run().await
}
