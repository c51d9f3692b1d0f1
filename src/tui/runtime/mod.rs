//! Runtime Services - Connector Layer
//!
//! Async IO behind the controller's service traits. Every service reports
//! back through one unbounded channel of [`ControllerEvent`]s, which the app
//! loop drains into the controller.

mod mock;
mod timers;
mod ws;

pub use mock::{demo_frames, MockTransport};
pub use timers::TokioTimers;
pub use ws::WsTransport;

use tokio::sync::mpsc;

use crate::controller::ControllerEvent;

pub type EventSender = mpsc::UnboundedSender<ControllerEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<ControllerEvent>;

/// Channel shared by the runtime services and the app loop
pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}
