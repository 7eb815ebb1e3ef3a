// ── Runtime connection configuration ──
//
// These types describe how to reach a warden backend and where the session
// cookie lives. They never touch the config file; the CLI/TUI builds a
// `ConsoleConfig` and hands it in.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use url::Url;
use warden_api::transport::{TlsMode, TransportConfig};
use warden_api::{CookieFileStore, MemoryTokenStore, TokenStore};

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed certs on a lab backend).
    DangerAcceptInvalid,
}

impl TlsVerification {
    fn to_mode(&self) -> TlsMode {
        match self {
            Self::SystemDefaults => TlsMode::System,
            Self::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            Self::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        }
    }
}

/// Where the `access_token` cookie is kept between runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenStorage {
    /// Cookie file on disk, shared by every process using the profile.
    CookieFile(PathBuf),
    /// Process-local; forgotten on exit.
    Memory,
}

impl TokenStorage {
    pub(crate) fn open(&self) -> Arc<dyn TokenStore> {
        match self {
            Self::CookieFile(path) => Arc::new(CookieFileStore::new(path.clone())),
            Self::Memory => Arc::new(MemoryTokenStore::new()),
        }
    }
}

/// Configuration for talking to one warden backend.
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// API base URL (e.g. `http://localhost:8000/api`).
    pub url: Url,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
    /// Token cookie location.
    pub token_storage: TokenStorage,
}

impl ConsoleConfig {
    pub fn new(url: Url, token_storage: TokenStorage) -> Self {
        Self {
            url,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            token_storage,
        }
    }

    pub(crate) fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: self.tls.to_mode(),
            timeout: self.timeout,
        }
    }
}
