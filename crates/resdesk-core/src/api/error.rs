//! Request errors surfaced by the API client.

use std::fmt;

/// Categories of request errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestErrorKind {
    /// Connection refused, DNS failure, timeout, broken body stream
    Transport,
    /// Non-2xx status (message from the server envelope when present)
    HttpStatus,
    /// Body could not be decoded into the expected shape
    Parse,
    /// The request was aborted through its cancellation token
    Cancelled,
}

impl fmt::Display for RequestErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestErrorKind::Transport => write!(f, "transport"),
            RequestErrorKind::HttpStatus => write!(f, "http_status"),
            RequestErrorKind::Parse => write!(f, "parse"),
            RequestErrorKind::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Structured error from an API call.
///
/// `Display` prints only the human-readable message, so a server-provided
/// `error` string reaches the user verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestError {
    pub kind: RequestErrorKind,
    /// HTTP status, when a response was received
    pub status: Option<u16>,
    pub message: String,
}

impl RequestError {
    pub fn new(kind: RequestErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: None,
            message: message.into(),
        }
    }

    /// Creates a transport error from a reqwest failure.
    pub fn transport(err: &reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            format!("Request timed out: {err}")
        } else {
            format!("Network error: {err}")
        };
        Self {
            kind: RequestErrorKind::Transport,
            status: err.status().map(|s| s.as_u16()),
            message,
        }
    }

    /// Creates an HTTP status error carrying the server's own message.
    pub fn http_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            kind: RequestErrorKind::HttpStatus,
            status: Some(status),
            message: message.into(),
        }
    }

    /// Creates a generic HTTP status error (no server message available).
    pub fn generic_status(status: u16) -> Self {
        Self::http_status(status, format!("Error {status}"))
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(RequestErrorKind::Parse, message)
    }

    pub fn cancelled() -> Self {
        Self::new(RequestErrorKind::Cancelled, "Request cancelled")
    }

    pub fn is_cancelled(&self) -> bool {
        self.kind == RequestErrorKind::Cancelled
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for RequestError {}

/// Result type for API operations.
pub type ApiResult<T> = std::result::Result<T, RequestError>;
