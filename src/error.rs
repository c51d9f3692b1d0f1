//! Error types with fix suggestions
//!
//! Every failure the display client can report carries a stable `CB-0xx` code
//! so log lines and the CLI output can be grepped.

use thiserror::Error;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

pub type Result<T> = std::result::Result<T, DisplayError>;

#[derive(Error, Debug)]
pub enum DisplayError {
    // ─────────────────────────────────────────────────────────────
    // Endpoint / config errors (CB-001 to CB-009)
    // ─────────────────────────────────────────────────────────────
    #[error("CB-001: Invalid server URL '{url}': {reason}")]
    InvalidServerUrl {
        url: String,
        reason: String,
    },

    #[error("CB-002: Unsupported URL scheme '{scheme}' (expected http, https, ws or wss)")]
    UnsupportedScheme { scheme: String },

    #[error("CB-003: Config error: {reason}")]
    Config { reason: String },

    // ─────────────────────────────────────────────────────────────
    // Inbound message errors (CB-010 to CB-019)
    // ─────────────────────────────────────────────────────────────
    #[error("CB-010: Malformed frame: {details}")]
    MalformedFrame { details: String },

    #[error("CB-011: Missing required field '{field}'")]
    MissingField { field: String },

    #[error("CB-012: Cannot render unknown graph type: {message_type}")]
    UnknownChartType { message_type: String },

    #[error("CB-013: Invalid payload for '{message_type}': {details}")]
    InvalidPayload {
        message_type: String,
        details: String,
    },

    // ─────────────────────────────────────────────────────────────
    // Transport errors (CB-020 to CB-029)
    // ─────────────────────────────────────────────────────────────
    #[error("CB-020: Transport error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FixSuggestion for DisplayError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            DisplayError::InvalidServerUrl { .. } => {
                Some("Use a full base URL such as http://localhost:8001")
            }
            DisplayError::UnsupportedScheme { .. } => {
                Some("Switch the server URL scheme to http, https, ws or wss")
            }
            DisplayError::Config { .. } => Some("Check config.yaml syntax and field names"),
            DisplayError::MalformedFrame { .. } => {
                Some("The server must send one JSON object per frame")
            }
            DisplayError::MissingField { .. } => {
                Some("Messages need a string 'type' and an object 'payload'")
            }
            DisplayError::UnknownChartType { .. } => {
                Some("Use graph_bar, graph_line or graph_pie")
            }
            DisplayError::InvalidPayload { .. } => {
                Some("Charts need 'labels' and 'datasets: [{label, values}]'")
            }
            DisplayError::Transport(_) => Some("Check that the server is running and reachable"),
            DisplayError::Io(_) => Some("Check file path and permissions"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_chart_message_matches_error_block_text() {
        let err = DisplayError::UnknownChartType {
            message_type: "graph_hexagon".to_string(),
        };
        assert!(err
            .to_string()
            .ends_with("Cannot render unknown graph type: graph_hexagon"));
    }

    #[test]
    fn test_every_variant_has_a_suggestion() {
        let errors = vec![
            DisplayError::InvalidServerUrl {
                url: "x".into(),
                reason: "y".into(),
            },
            DisplayError::UnsupportedScheme { scheme: "ftp".into() },
            DisplayError::Config { reason: "bad".into() },
            DisplayError::MalformedFrame { details: "eof".into() },
            DisplayError::MissingField { field: "type".into() },
            DisplayError::UnknownChartType {
                message_type: "graph_x".into(),
            },
            DisplayError::InvalidPayload {
                message_type: "graph_bar".into(),
                details: "missing labels".into(),
            },
            DisplayError::Transport("refused".into()),
        ];
        for err in errors {
            assert!(err.fix_suggestion().is_some(), "no suggestion for {err}");
        }
    }
}
