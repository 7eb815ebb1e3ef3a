// ── Core error types ──
//
// User-facing errors from warden-core. Consumers never see raw HTTP
// statuses or JSON parse failures; the `From<warden_api::Error>` impl
// translates transport-layer errors into domain variants.

use thiserror::Error;

/// Fallback text when an error carries nothing worth showing.
pub const GENERIC_FAILURE: &str = "Something went wrong";

/// Unified error type for the core crate.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    // ── Session errors ───────────────────────────────────────────────
    #[error("Not authenticated: {message}")]
    NotAuthenticated { message: String },

    #[error("No session found")]
    NoSession,

    /// Login rejected; `message` is the backend's explanation.
    #[error("{message}")]
    LoginFailed { message: String },

    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach API at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    Timeout,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("{entity} not found: {identifier}")]
    NotFound { entity: String, identifier: String },

    // ── Operation errors ─────────────────────────────────────────────
    /// The backend refused the request; `message` is its `detail`.
    #[error("{message}")]
    Rejected { message: String, status: u16 },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Token storage error: {message}")]
    TokenStorage { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// `true` when the session is gone and the user has to log in again.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::NotAuthenticated { .. } | Self::NoSession)
    }

    /// Text suitable for an inline error slot: the server's detail when
    /// there is one, otherwise the error message, otherwise a generic line.
    pub fn display_message(&self) -> String {
        let text = match self {
            Self::Rejected { message, .. }
            | Self::LoginFailed { message }
            | Self::ValidationFailed { message } => message.clone(),
            other => other.to_string(),
        };
        if text.trim().is_empty() {
            GENERIC_FAILURE.to_owned()
        } else {
            text
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            message: message.into(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<warden_api::Error> for CoreError {
    fn from(err: warden_api::Error) -> Self {
        match err {
            warden_api::Error::MissingToken => CoreError::NotAuthenticated {
                message: "No access token found".into(),
            },
            warden_api::Error::Unauthorized { detail } => {
                CoreError::NotAuthenticated { message: detail }
            }
            warden_api::Error::LoginRejected { detail } => {
                CoreError::LoginFailed { message: detail }
            }
            warden_api::Error::TokenStore(e) => CoreError::TokenStorage {
                message: e.to_string(),
            },
            warden_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Rejected {
                        message: e.to_string(),
                        status: e.status().map_or(0, |s| s.as_u16()),
                    }
                }
            }
            warden_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            warden_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            warden_api::Error::Api {
                status: 404,
                detail,
            } => CoreError::NotFound {
                entity: "resource".into(),
                identifier: detail,
            },
            warden_api::Error::Api { status, detail } => CoreError::Rejected {
                message: detail,
                status,
            },
            warden_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
