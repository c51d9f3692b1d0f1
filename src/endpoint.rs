//! WebSocket endpoint derivation
//!
//! The display connects to the same host it was configured with, on a fixed
//! path, with the scheme mirrored: `http → ws`, `https → wss`.

use url::Url;

use crate::error::{DisplayError, Result};

/// Default socket path on the server
pub const DEFAULT_WS_PATH: &str = "/ws";

/// Derive the socket URL from a server base URL.
///
/// `ws` and `wss` are accepted unchanged. Query and fragment are dropped.
pub fn websocket_url(base: &str, path: &str) -> Result<Url> {
    let mut url = Url::parse(base.trim()).map_err(|e| DisplayError::InvalidServerUrl {
        url: base.to_string(),
        reason: e.to_string(),
    })?;

    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => {
            return Err(DisplayError::UnsupportedScheme {
                scheme: other.to_string(),
            })
        }
    };

    if url.host_str().is_none() {
        return Err(DisplayError::InvalidServerUrl {
            url: base.to_string(),
            reason: "missing host".to_string(),
        });
    }

    // http(s) → ws(s) is a permitted special-scheme switch for `url`
    url.set_scheme(scheme)
        .map_err(|_| DisplayError::InvalidServerUrl {
            url: base.to_string(),
            reason: format!("cannot switch scheme to {}", scheme),
        })?;

    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    };
    url.set_path(&path);
    url.set_query(None);
    url.set_fragment(None);

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_becomes_ws() {
        let url = websocket_url("http://localhost:8001", DEFAULT_WS_PATH).unwrap();
        assert_eq!(url.as_str(), "ws://localhost:8001/ws");
    }

    #[test]
    fn test_https_becomes_wss() {
        let url = websocket_url("https://board.example.com/dashboard?x=1#top", "/ws").unwrap();
        assert_eq!(url.as_str(), "wss://board.example.com/ws");
    }

    #[test]
    fn test_ws_schemes_pass_through() {
        let url = websocket_url("wss://board.example.com:9000", "stream").unwrap();
        assert_eq!(url.as_str(), "wss://board.example.com:9000/stream");
    }

    #[test]
    fn test_unsupported_scheme() {
        let err = websocket_url("ftp://example.com", "/ws").unwrap_err();
        assert!(matches!(err, DisplayError::UnsupportedScheme { scheme } if scheme == "ftp"));
    }

    #[test]
    fn test_garbage_is_invalid() {
        let err = websocket_url("not a url", "/ws").unwrap_err();
        assert!(matches!(err, DisplayError::InvalidServerUrl { .. }));
    }
}
