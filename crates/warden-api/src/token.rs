// Access-token persistence.
//
// The bearer token lives in a cookie named `access_token`. On disk that is a
// small cookie file of `name=value` lines; unrelated cookies in the same file
// are preserved across writes.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, trace};

use crate::error::Error;

/// Name of the cookie holding the bearer token.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Storage for the session's bearer token.
pub trait TokenStore: Send + Sync {
    /// Current token, or `None` when no session cookie exists.
    fn load(&self) -> Result<Option<SecretString>, Error>;

    /// Persist a freshly issued token, replacing any previous one.
    fn save(&self, token: &SecretString) -> Result<(), Error>;

    /// Forget the token (logout).
    fn clear(&self) -> Result<(), Error>;
}

// ── Cookie file ─────────────────────────────────────────────────────

/// Cookie-file backed token store.
#[derive(Debug, Clone)]
pub struct CookieFileStore {
    path: PathBuf,
}

impl CookieFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_lines(&self) -> Result<Vec<String>, Error> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(contents.lines().map(String::from).collect()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_lines(&self, lines: &[String]) -> Result<(), Error> {
        if lines.iter().all(|l| l.trim().is_empty()) {
            return match std::fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            };
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut contents = lines.join("\n");
        contents.push('\n');
        std::fs::write(&self.path, contents)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }
}

/// Split a cookie line into `(name, value)`. Comments and blanks yield `None`.
fn parse_cookie_line(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let (name, value) = line.split_once('=')?;
    Some((name.trim(), value.trim()))
}

impl TokenStore for CookieFileStore {
    fn load(&self) -> Result<Option<SecretString>, Error> {
        let lines = self.read_lines()?;
        let token = lines
            .iter()
            .filter_map(|l| parse_cookie_line(l))
            .find(|(name, _)| *name == ACCESS_TOKEN_COOKIE)
            .map(|(_, value)| value)
            .filter(|value| !value.is_empty())
            .map(|value| SecretString::from(value.to_owned()));

        trace!(path = %self.path.display(), found = token.is_some(), "loaded token cookie");
        Ok(token)
    }

    fn save(&self, token: &SecretString) -> Result<(), Error> {
        let mut lines: Vec<String> = self
            .read_lines()?
            .into_iter()
            .filter(|l| parse_cookie_line(l).is_none_or(|(name, _)| name != ACCESS_TOKEN_COOKIE))
            .collect();
        lines.push(format!("{ACCESS_TOKEN_COOKIE}={}", token.expose_secret()));

        debug!(path = %self.path.display(), "storing token cookie");
        self.write_lines(&lines)
    }

    fn clear(&self) -> Result<(), Error> {
        let lines: Vec<String> = self
            .read_lines()?
            .into_iter()
            .filter(|l| parse_cookie_line(l).is_none_or(|(name, _)| name != ACCESS_TOKEN_COOKIE))
            .collect();

        debug!(path = %self.path.display(), "removing token cookie");
        self.write_lines(&lines)
    }
}

// ── In-memory ───────────────────────────────────────────────────────

/// Process-local token store. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<SecretString>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `token`.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(SecretString::from(token.into()))),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<SecretString>, Error> {
        let guard = self.token.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(guard.clone())
    }

    fn save(&self, token: &SecretString) -> Result<(), Error> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), Error> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}
