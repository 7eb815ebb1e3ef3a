use thiserror::Error;

/// Top-level error type for the `warden-api` crate.
///
/// Covers every failure mode of the HTTP surface: token handling,
/// transport, backend rejections, and payload decoding.
/// `warden-core` maps these into user-facing errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// No access token in cookie storage. Raised before any request is sent.
    #[error("No access token found")]
    MissingToken,

    /// The backend rejected the bearer token (HTTP 401).
    #[error("Not authenticated: {detail}")]
    Unauthorized { detail: String },

    /// Login rejected (wrong credentials, inactive account, too many tries).
    #[error("{detail}")]
    LoginRejected { detail: String },

    // ── Token storage ───────────────────────────────────────────────
    /// Reading or writing the cookie file failed.
    #[error("Token storage error: {0}")]
    TokenStore(#[from] std::io::Error),

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Backend ─────────────────────────────────────────────────────
    /// Non-success response, with the backend's `detail` text when present.
    #[error("API error (HTTP {status}): {detail}")]
    Api { status: u16, detail: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the session is missing or was rejected and
    /// logging in again might resolve it.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::MissingToken | Self::Unauthorized { .. })
    }

    /// Returns `true` if this is a transient error worth retrying by hand.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Api { status: 404, .. } => true,
            _ => false,
        }
    }

    /// The backend's `detail` text, if the error carries one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Api { detail, .. }
            | Self::Unauthorized { detail }
            | Self::LoginRejected { detail } => Some(detail),
            _ => None,
        }
    }
}
