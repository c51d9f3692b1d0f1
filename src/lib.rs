//! Callboard - terminal wallboard for a call-center display server

pub mod chart;
pub mod config;
pub mod controller;
pub mod endpoint;
pub mod error;
pub mod markdown;
pub mod message;
pub mod tui;

pub use chart::{ChartHandle, ChartKind, ChartRegistry, ChartSpec};
pub use config::{DisplayConfig, UnknownTypePolicy};
pub use controller::{
    ControllerEvent, ControllerSettings, DisplayController, RenderService, TimerService,
    TransportService,
};
pub use error::{DisplayError, FixSuggestion};
pub use message::Inbound;
