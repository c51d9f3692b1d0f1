//! Inbound message classification
//!
//! Every frame is turned into exactly one [`Inbound`] value. Parsing never
//! fails outward: bad input becomes [`Inbound::Invalid`] so the caller can
//! show a readable error block instead of dropping the frame.

use serde_json::Value;

use crate::chart::{ChartKind, ChartPayload, ChartSpec};
use crate::error::DisplayError;
use crate::markdown::MarkdownPayload;

pub const CONNECTION_STATUS: &str = "connection_status";
pub const CALL_UPDATE: &str = "new_call_update_available";
pub const MARKDOWN: &str = "markdown";
pub const GRAPH_PREFIX: &str = "graph_";

/// Server-side connection notice (indicator + banner only)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusNotice {
    pub status: String,
    pub message: Option<String>,
}

/// "A call has new information" notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallUpdate {
    pub contact_name: String,
    pub status_summary: String,
}

/// Why a frame could not be displayed as intended
#[derive(Debug)]
pub enum InvalidFrame {
    /// Not JSON at all; the raw text is kept for the error block
    Unparseable {
        raw: String,
        error: DisplayError,
    },
    /// JSON, but without a usable `type` / `payload`
    Malformed(DisplayError),
    /// A `graph_*` message that cannot become a chart
    Chart(DisplayError),
}

/// A classified inbound frame
#[derive(Debug)]
pub enum Inbound {
    ConnectionStatus(StatusNotice),
    CallUpdate(CallUpdate),
    Markdown(MarkdownPayload),
    Chart(ChartSpec),
    /// Recognised family but unusable content; logged and dropped
    Ignored {
        message_type: String,
        reason: String,
    },
    /// Unrecognised `type`
    Unknown {
        message_type: String,
        payload: Value,
    },
    Invalid(InvalidFrame),
}

impl Inbound {
    /// Parse and classify one text frame
    pub fn parse(raw: &str) -> Self {
        let message: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => {
                return Inbound::Invalid(InvalidFrame::Unparseable {
                    raw: raw.to_string(),
                    error: DisplayError::MalformedFrame {
                        details: e.to_string(),
                    },
                })
            }
        };
        Self::classify(&message)
    }

    /// Classify an already-decoded message
    pub fn classify(message: &Value) -> Self {
        let message_type = match message.get("type").and_then(Value::as_str) {
            Some(t) if !t.trim().is_empty() => t,
            _ => {
                return Inbound::Invalid(InvalidFrame::Malformed(DisplayError::MissingField {
                    field: "type".to_string(),
                }))
            }
        };

        match message_type {
            CONNECTION_STATUS => status_notice(loose_payload(message)),
            CALL_UPDATE => call_update(loose_payload(message)),
            MARKDOWN => match strict_payload(message) {
                Some(payload) => match serde_json::from_value(payload.clone()) {
                    Ok(md) => Inbound::Markdown(md),
                    Err(e) => Inbound::Invalid(InvalidFrame::Malformed(
                        DisplayError::InvalidPayload {
                            message_type: message_type.to_string(),
                            details: e.to_string(),
                        },
                    )),
                },
                None => missing_payload(),
            },
            t if t.starts_with(GRAPH_PREFIX) => {
                let kind = match ChartKind::from_message_type(t) {
                    Ok(kind) => kind,
                    Err(e) => return Inbound::Invalid(InvalidFrame::Chart(e)),
                };
                let Some(payload) = strict_payload(message) else {
                    return missing_payload();
                };
                match serde_json::from_value::<ChartPayload>(payload.clone()) {
                    Ok(chart) => Inbound::Chart(ChartSpec::new(kind, chart)),
                    Err(e) => Inbound::Invalid(InvalidFrame::Chart(DisplayError::InvalidPayload {
                        message_type: t.to_string(),
                        details: e.to_string(),
                    })),
                }
            }
            other => Inbound::Unknown {
                message_type: other.to_string(),
                payload: message.get("payload").cloned().unwrap_or(Value::Null),
            },
        }
    }
}

/// `payload`, then `status` (when it is an object), then the message itself.
///
/// Earlier servers sent notices flat or nested under `status`.
fn loose_payload(message: &Value) -> &Value {
    if let Some(payload) = message.get("payload").filter(|p| p.is_object()) {
        return payload;
    }
    if let Some(status) = message.get("status").filter(|s| s.is_object()) {
        return status;
    }
    message
}

fn strict_payload(message: &Value) -> Option<&Value> {
    message.get("payload").filter(|p| p.is_object())
}

fn missing_payload() -> Inbound {
    Inbound::Invalid(InvalidFrame::Malformed(DisplayError::MissingField {
        field: "payload".to_string(),
    }))
}

fn non_empty_str<'a>(value: &'a Value, field: &str) -> Option<&'a str> {
    value
        .get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn status_notice(payload: &Value) -> Inbound {
    match non_empty_str(payload, "status") {
        Some(status) => Inbound::ConnectionStatus(StatusNotice {
            status: status.to_string(),
            message: non_empty_str(payload, "message").map(str::to_string),
        }),
        None => Inbound::Ignored {
            message_type: CONNECTION_STATUS.to_string(),
            reason: "no 'status' field".to_string(),
        },
    }
}

fn call_update(payload: &Value) -> Inbound {
    match (
        non_empty_str(payload, "contact_name"),
        non_empty_str(payload, "status_summary"),
    ) {
        (Some(contact_name), Some(status_summary)) => Inbound::CallUpdate(CallUpdate {
            contact_name: contact_name.to_string(),
            status_summary: status_summary.to_string(),
        }),
        _ => Inbound::Ignored {
            message_type: CALL_UPDATE.to_string(),
            reason: "requires both 'contact_name' and 'status_summary'".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_invalid_json_keeps_raw_text() {
        match Inbound::parse("{not json") {
            Inbound::Invalid(InvalidFrame::Unparseable { raw, .. }) => assert_eq!(raw, "{not json"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_missing_type_is_malformed() {
        let inbound = Inbound::parse(r#"{"payload":{"content":"x"}}"#);
        assert!(matches!(
            inbound,
            Inbound::Invalid(InvalidFrame::Malformed(DisplayError::MissingField { .. }))
        ));
    }

    #[test]
    fn test_non_string_type_is_malformed() {
        let inbound = Inbound::classify(&json!({"type": 7, "payload": {}}));
        assert!(matches!(inbound, Inbound::Invalid(InvalidFrame::Malformed(_))));
    }

    #[test]
    fn test_status_from_payload() {
        let inbound = Inbound::classify(&json!({
            "type": "connection_status",
            "payload": {"status": "connected", "message": "Line up"}
        }));
        match inbound {
            Inbound::ConnectionStatus(notice) => {
                assert_eq!(notice.status, "connected");
                assert_eq!(notice.message.as_deref(), Some("Line up"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_status_nested_under_status_key() {
        let inbound = Inbound::classify(&json!({
            "type": "connection_status",
            "status": {"status": "error", "message": "Upstream lost"}
        }));
        assert!(matches!(inbound, Inbound::ConnectionStatus(n) if n.status == "error"));
    }

    #[test]
    fn test_status_flat_on_message() {
        let inbound = Inbound::classify(&json!({
            "type": "connection_status",
            "status": "disconnected"
        }));
        assert!(matches!(inbound, Inbound::ConnectionStatus(n) if n.status == "disconnected"));
    }

    #[test]
    fn test_call_update_requires_both_fields() {
        let full = Inbound::classify(&json!({
            "type": "new_call_update_available",
            "payload": {"contact_name": "Ada", "status_summary": "Callback booked"}
        }));
        assert!(matches!(full, Inbound::CallUpdate(c) if c.contact_name == "Ada"));

        let partial = Inbound::classify(&json!({
            "type": "new_call_update_available",
            "payload": {"contact_name": "Ada"}
        }));
        assert!(matches!(partial, Inbound::Ignored { .. }));

        let blank = Inbound::classify(&json!({
            "type": "new_call_update_available",
            "contact_name": "Ada",
            "status_summary": "   "
        }));
        assert!(matches!(blank, Inbound::Ignored { .. }));
    }

    #[test]
    fn test_markdown_requires_payload_object() {
        assert!(matches!(
            Inbound::classify(&json!({"type": "markdown"})),
            Inbound::Invalid(InvalidFrame::Malformed(_))
        ));
        assert!(matches!(
            Inbound::classify(&json!({"type": "markdown", "payload": {}})),
            Inbound::Markdown(_)
        ));
    }

    #[test]
    fn test_unknown_graph_suffix() {
        let inbound = Inbound::classify(&json!({"type": "graph_hexagon", "payload": {}}));
        assert!(matches!(
            inbound,
            Inbound::Invalid(InvalidFrame::Chart(DisplayError::UnknownChartType { .. }))
        ));
    }

    #[test]
    fn test_bad_chart_payload() {
        let inbound = Inbound::classify(&json!({"type": "graph_line", "payload": {"labels": []}}));
        assert!(matches!(
            inbound,
            Inbound::Invalid(InvalidFrame::Chart(DisplayError::InvalidPayload { .. }))
        ));
    }

    #[test]
    fn test_unknown_type_keeps_payload() {
        let inbound = Inbound::classify(&json!({"type": "weather", "payload": {"temp": 21}}));
        match inbound {
            Inbound::Unknown {
                message_type,
                payload,
            } => {
                assert_eq!(message_type, "weather");
                assert_eq!(payload["temp"], 21);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
