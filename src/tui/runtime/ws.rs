//! WebSocket transport over tokio-tungstenite

use std::collections::HashMap;

use futures::{SinkExt, StreamExt};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

use super::EventSender;
use crate::controller::{ConnectionId, ControllerEvent, TransportEvent, TransportService};
use crate::error::Result;

/// One task per connection attempt, stopped through its cancellation token
pub struct WsTransport {
    tx: EventSender,
    next: u64,
    live: HashMap<ConnectionId, CancellationToken>,
}

impl WsTransport {
    pub fn new(tx: EventSender) -> Self {
        Self {
            tx,
            next: 0,
            live: HashMap::new(),
        }
    }

    /// Connections whose task has not been told to stop
    pub fn live(&self) -> usize {
        self.live.len()
    }
}

impl TransportService for WsTransport {
    fn open(&mut self, url: &Url) -> Result<ConnectionId> {
        self.next += 1;
        let id = ConnectionId(self.next);
        let token = CancellationToken::new();

        tokio::spawn(run_connection(
            id,
            url.clone(),
            token.clone(),
            self.tx.clone(),
        ));
        self.live.insert(id, token);
        Ok(id)
    }

    fn close(&mut self, connection: ConnectionId) {
        if let Some(token) = self.live.remove(&connection) {
            debug!(?connection, "closing connection");
            token.cancel();
        }
    }
}

impl Drop for WsTransport {
    fn drop(&mut self) {
        for (_, token) in self.live.drain() {
            token.cancel();
        }
    }
}

async fn run_connection(
    id: ConnectionId,
    url: Url,
    token: CancellationToken,
    tx: EventSender,
) {
    let emit = |event: TransportEvent| {
        let _ = tx.send(ControllerEvent::Transport {
            connection: id,
            event,
        });
    };

    let connected = tokio::select! {
        _ = token.cancelled() => return,
        result = connect_async(url.as_str()) => result,
    };
    let (mut stream, _) = match connected {
        Ok(pair) => pair,
        Err(e) => {
            emit(TransportEvent::Error(e.to_string()));
            return;
        }
    };
    emit(TransportEvent::Opened);

    loop {
        tokio::select! {
            _ = token.cancelled() => {
                let _ = stream.close(None).await;
                return;
            }
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    emit(TransportEvent::Message(text.as_str().to_owned()));
                }
                Some(Ok(Message::Binary(bytes))) => match String::from_utf8(bytes.to_vec()) {
                    Ok(text) => emit(TransportEvent::Message(text)),
                    Err(_) => warn!(?id, len = bytes.len(), "non-UTF-8 binary frame dropped"),
                },
                Some(Ok(Message::Ping(payload))) => {
                    if let Err(e) = stream.send(Message::Pong(payload)).await {
                        emit(TransportEvent::Error(e.to_string()));
                        return;
                    }
                }
                Some(Ok(Message::Close(frame))) => {
                    emit(TransportEvent::Closed {
                        code: frame.as_ref().map(|f| u16::from(f.code)),
                        reason: frame.as_ref().map(|f| f.reason.as_str().to_owned()),
                    });
                    return;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    emit(TransportEvent::Error(e.to_string()));
                    return;
                }
                None => {
                    emit(TransportEvent::Closed {
                        code: None,
                        reason: None,
                    });
                    return;
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::runtime::event_channel;

    #[tokio::test]
    async fn test_refused_connection_reports_error() {
        let (tx, mut rx) = event_channel();
        let mut transport = WsTransport::new(tx);

        // port 9 (discard) is closed on any sane test host
        let url = Url::parse("ws://127.0.0.1:9/ws").unwrap();
        let id = transport.open(&url).unwrap();

        match rx.recv().await.unwrap() {
            ControllerEvent::Transport {
                connection,
                event: TransportEvent::Error(_),
            } => assert_eq!(connection, id),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_close_forgets_connection() {
        let (tx, _rx) = event_channel();
        let mut transport = WsTransport::new(tx);
        let url = Url::parse("ws://127.0.0.1:9/ws").unwrap();

        let a = transport.open(&url).unwrap();
        let b = transport.open(&url).unwrap();
        assert_ne!(a, b);
        assert_eq!(transport.live(), 2);

        transport.close(a);
        transport.close(a);
        assert_eq!(transport.live(), 1);
    }
}
