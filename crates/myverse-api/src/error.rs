use myverse_core::validation::ValidationErrors;
use thiserror::Error;

/// Generic text shown when the server gave no reason.
pub const CONNECTION_ERROR: &str = "Connection error";

/// Errors from the MyVerse API client.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid input: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Client-observed failure classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Auth,
    Validation,
    Conflict,
    NotFound,
    Server,
    Decode,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Http(e) if e.is_decode() => ErrorKind::Decode,
            Self::Http(_) => ErrorKind::Network,
            Self::Unauthorized(_) => ErrorKind::Auth,
            Self::Api { status: 409, .. } => ErrorKind::Conflict,
            Self::Api { status: 404, .. } => ErrorKind::NotFound,
            Self::Api { status, .. } if *status >= 500 => ErrorKind::Server,
            Self::Api { .. } | Self::Validation(_) => ErrorKind::Validation,
            Self::Parse(_) => ErrorKind::Decode,
            Self::Url(_) => ErrorKind::Network,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Unauthorized(_) => Some(401),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_conflict(&self) -> bool {
        self.kind() == ErrorKind::Conflict
    }

    /// Text to surface to the user: the server's reason verbatim when it
    /// gave one, otherwise a generic message.
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthorized(m) | Self::Api { message: m, .. } if !m.is_empty() => m.clone(),
            Self::Validation(errors) => errors.to_string(),
            Self::Parse(_) => "Unexpected response from server".into(),
            _ => CONNECTION_ERROR.into(),
        }
    }
}

/// Pull a human-readable reason out of an error body.
///
/// The API answers `{"error": "..."}`; some endpoints use `message`.
pub(crate) fn extract_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .or_else(|| v.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_default()
}
