//! Mock Transport - For demo purposes
//!
//! Replays a scripted session of server frames so the display can be shown
//! without a server. After the last frame the "server" drops the connection,
//! which exercises the reconnect path; the next connection replays the script.

use std::collections::HashMap;

use serde_json::json;
use tokio::time::{self, Duration};
use tokio_util::sync::CancellationToken;
use url::Url;

use super::EventSender;
use crate::controller::{ConnectionId, ControllerEvent, TransportEvent, TransportService};
use crate::error::Result;

/// Scripted transport for `callboard demo`
pub struct MockTransport {
    tx: EventSender,
    next: u64,
    frame_gap: Duration,
    live: HashMap<ConnectionId, CancellationToken>,
}

impl MockTransport {
    pub fn new(tx: EventSender) -> Self {
        Self {
            tx,
            next: 0,
            frame_gap: Duration::from_secs(4),
            live: HashMap::new(),
        }
    }

    pub fn with_frame_gap(mut self, gap: Duration) -> Self {
        self.frame_gap = gap;
        self
    }
}

impl TransportService for MockTransport {
    fn open(&mut self, _url: &Url) -> Result<ConnectionId> {
        self.next += 1;
        let id = ConnectionId(self.next);
        let token = CancellationToken::new();
        let tx = self.tx.clone();
        let gap = self.frame_gap;
        let cancel = token.clone();

        tokio::spawn(async move {
            let emit = |event: TransportEvent| {
                let _ = tx.send(ControllerEvent::Transport {
                    connection: id,
                    event,
                });
            };

            time::sleep(Duration::from_millis(300)).await;
            if cancel.is_cancelled() {
                return;
            }
            emit(TransportEvent::Opened);

            for frame in demo_frames() {
                tokio::select! {
                    _ = cancel.cancelled() => return,
                    _ = time::sleep(gap) => emit(TransportEvent::Message(frame)),
                }
            }

            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = time::sleep(gap) => emit(TransportEvent::Closed {
                    code: Some(1001),
                    reason: Some("demo session over".to_string()),
                }),
            }
        });

        self.live.insert(id, token);
        Ok(id)
    }

    fn close(&mut self, connection: ConnectionId) {
        if let Some(token) = self.live.remove(&connection) {
            token.cancel();
        }
    }
}

impl Drop for MockTransport {
    fn drop(&mut self) {
        for (_, token) in self.live.drain() {
            token.cancel();
        }
    }
}

/// The frames a demo session replays, in order
pub fn demo_frames() -> Vec<String> {
    vec![
        json!({"type": "connection_status", "payload": {"status": "connected", "message": "Demo server ready"}}),
        json!({"type": "markdown", "payload": {
            "title": "Morning Briefing",
            "content": "# Morning Briefing\n\nThree calls are **in progress**.\n\n- Acme Corp: renewal\n- Globex: escalation\n- Initech: onboarding\n\n> Next stand-up at 10:30"
        }}),
        json!({"type": "new_call_update_available", "payload": {"contact_name": "Globex", "status_summary": "Customer asked for a callback at 14:00"}}),
        json!({"type": "graph_bar", "payload": {
            "title": "Calls per agent",
            "labels": ["Ana", "Ben", "Chloe", "Dev"],
            "datasets": [{"label": "Calls", "values": [12, 7, 15, 9]}],
            "options": {"x_axis_label": "Agent", "y_axis_label": "Calls"}
        }}),
        json!({"type": "graph_line", "payload": {
            "title": "Queue length",
            "labels": ["09:00", "10:00", "11:00", "12:00", "13:00"],
            "datasets": [
                {"label": "Inbound", "values": [4, 9, 6, 11, 5]},
                {"label": "Outbound", "values": [2, 3, 8, 4, 6]}
            ]
        }}),
        json!({"type": "graph_pie", "payload": {
            "title": "Call outcomes",
            "labels": ["Resolved", "Escalated", "Callback"],
            "datasets": [{"label": "Outcomes", "values": [62, 13, 25]}]
        }}),
        json!({"type": "graph_hexagon", "payload": {"labels": [], "datasets": []}}),
        json!({"type": "markdown", "payload": {"title": "All clear", "content": "No open escalations."}}),
    ]
    .into_iter()
    .map(|frame| frame.to_string())
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Inbound;
    use crate::tui::runtime::event_channel;

    #[test]
    fn test_demo_frames_are_all_understood() {
        for frame in demo_frames() {
            let inbound = Inbound::parse(&frame);
            assert!(
                !matches!(inbound, Inbound::Unknown { .. } | Inbound::Ignored { .. }),
                "demo frame not displayable: {}",
                frame
            );
        }
    }

    #[tokio::test]
    async fn test_mock_transport_opens_then_replays() {
        let (tx, mut rx) = event_channel();
        let mut transport = MockTransport::new(tx).with_frame_gap(Duration::from_millis(1));
        let url = Url::parse("ws://demo.invalid/ws").unwrap();
        let id = transport.open(&url).unwrap();

        let first = rx.recv().await.unwrap();
        assert_eq!(
            first,
            ControllerEvent::Transport {
                connection: id,
                event: TransportEvent::Opened
            }
        );

        let second = rx.recv().await.unwrap();
        assert!(matches!(
            second,
            ControllerEvent::Transport {
                event: TransportEvent::Message(_),
                ..
            }
        ));
    }
}
