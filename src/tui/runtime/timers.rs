//! One-shot timers on the tokio clock

use std::collections::HashMap;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::trace;

use super::EventSender;
use crate::controller::{ControllerEvent, Timer, TimerId, TimerService};

/// Each timer is a sleeping task; cancelling aborts it
pub struct TokioTimers {
    tx: EventSender,
    next: u64,
    tasks: HashMap<TimerId, JoinHandle<()>>,
}

impl TokioTimers {
    pub fn new(tx: EventSender) -> Self {
        Self {
            tx,
            next: 0,
            tasks: HashMap::new(),
        }
    }

    /// Timers scheduled and not yet fired or cancelled
    pub fn pending(&self) -> usize {
        self.tasks.values().filter(|t| !t.is_finished()).count()
    }

    fn reap(&mut self) {
        self.tasks.retain(|_, task| !task.is_finished());
    }
}

impl TimerService for TokioTimers {
    fn schedule(&mut self, timer: Timer, after: Duration) -> TimerId {
        self.reap();
        self.next += 1;
        let id = TimerId(self.next);
        let tx = self.tx.clone();

        trace!(?timer, ?id, ?after, "timer scheduled");
        let task = tokio::spawn(async move {
            tokio::time::sleep(after).await;
            // receiver gone means the app is exiting
            let _ = tx.send(ControllerEvent::Timer { timer, id });
        });
        self.tasks.insert(id, task);
        id
    }

    fn cancel(&mut self, id: TimerId) {
        if let Some(task) = self.tasks.remove(&id) {
            trace!(?id, "timer cancelled");
            task.abort();
        }
    }
}

impl Drop for TokioTimers {
    fn drop(&mut self) {
        for (_, task) in self.tasks.drain() {
            task.abort();
        }
    }
}
