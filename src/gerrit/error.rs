//! Gerrit API error types.
//!
//! Every remote operation returns an explicit error carrying a kind, so the
//! dispatcher can decide per call what to do with a failure instead of
//! conflating all failure modes. Current policy: any failure abandons the
//! remaining actions for the event; the stream watcher separately recovers
//! transport failures by reconnecting.

use std::fmt;
use thiserror::Error;

/// The kind of Gerrit API error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GerritErrorKind {
    /// The request never produced an HTTP response (connect failure,
    /// timeout, DNS).
    Transport,

    /// The server answered with a non-success status.
    Http,

    /// The response body could not be decoded as the expected JSON.
    Decode,
}

/// An error from a Gerrit REST call.
#[derive(Debug, Error)]
pub struct GerritApiError {
    /// The kind of error.
    pub kind: GerritErrorKind,

    /// The HTTP status code, when a response was received.
    pub status: Option<u16>,

    /// A human-readable description.
    pub message: String,

    /// The underlying error, if any.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for GerritApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(code) => write!(f, "Gerrit API error (HTTP {}): {}", code, self.message),
            None => write!(f, "Gerrit API error: {}", self.message),
        }
    }
}

impl GerritApiError {
    /// Creates a transport-level error from a reqwest error.
    pub fn transport(source: reqwest::Error) -> Self {
        Self {
            kind: GerritErrorKind::Transport,
            status: source.status().map(|s| s.as_u16()),
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates an HTTP-status error. The body is truncated: Gerrit error
    /// bodies are plain text and short, but a proxy can hand back a page.
    pub fn http(status: u16, body: &str) -> Self {
        let snippet: String = body.trim().chars().take(200).collect();
        Self {
            kind: GerritErrorKind::Http,
            status: Some(status),
            message: snippet,
            source: None,
        }
    }

    /// Creates a decode error from a serde failure.
    pub fn decode(source: serde_json::Error) -> Self {
        Self {
            kind: GerritErrorKind::Decode,
            status: None,
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    /// Returns true if the failure is plausibly resolved by trying again
    /// later (transport failures, rate limiting, server errors).
    ///
    /// The dispatcher does not retry within an event; this drives logging
    /// severity and the alert side channel.
    pub fn is_transient(&self) -> bool {
        match self.kind {
            GerritErrorKind::Transport => true,
            GerritErrorKind::Http => matches!(self.status, Some(429) | Some(500..=599)),
            GerritErrorKind::Decode => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_errors_classify_by_status() {
        assert!(GerritApiError::http(503, "unavailable").is_transient());
        assert!(GerritApiError::http(429, "slow down").is_transient());
        assert!(!GerritApiError::http(404, "Not found: zz").is_transient());
        assert!(!GerritApiError::http(403, "forbidden").is_transient());
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(5000);
        let err = GerritApiError::http(500, &body);
        assert_eq!(err.message.len(), 200);
    }

    #[test]
    fn display_includes_status_when_present() {
        let err = GerritApiError::http(409, "conflict");
        assert_eq!(err.to_string(), "Gerrit API error (HTTP 409): conflict");
    }
}
