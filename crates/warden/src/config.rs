//! CLI configuration: thin wrapper around `warden_config` shared types.
//!
//! Re-exports the shared types and adds CLI-specific resolution that
//! respects `GlobalOpts` flag overrides (--api-url, --insecure, ...).

use std::time::Duration;

use warden_core::{ConsoleConfig, TlsVerification, TokenStorage};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use warden_config::{
    Config, Profile, config_path, cookie_path, load_config_or_default, save_config,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.active_profile_name(global.profile.as_deref())
}

/// The active profile, or an empty one when only flags are given.
pub fn active_profile(global: &GlobalOpts, config: &Config) -> (String, Profile) {
    let name = active_profile_name(global, config);
    let profile = config.profiles.get(&name).cloned().unwrap_or_default();
    (name, profile)
}

/// Translate a `Profile` + global flags into a `ConsoleConfig`.
///
/// CLI flag overrides take priority over profile values.
pub fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    global: &GlobalOpts,
) -> Result<ConsoleConfig, CliError> {
    // 1. API URL (flag > env > profile)
    let url_str = global
        .api_url
        .as_deref()
        .filter(|u| !u.is_empty())
        .unwrap_or(&profile.api_url);
    if url_str.is_empty() {
        return Err(CliError::NoConfig {
            path: config_path().display().to_string(),
        });
    }
    let url: url::Url = url_str.parse().map_err(|_| CliError::Validation {
        field: "api_url".into(),
        reason: format!("invalid URL: {url_str}"),
    })?;

    // 2. TLS verification
    let tls = if global.insecure || profile.insecure.unwrap_or(false) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    // 3. Timeout (profile value unless the flag moved off its default)
    let timeout_secs = match profile.timeout {
        Some(secs) if global.timeout == 30 => secs,
        _ => global.timeout,
    };

    Ok(ConsoleConfig {
        url,
        tls,
        timeout: Duration::from_secs(timeout_secs),
        token_storage: TokenStorage::CookieFile(cookie_path(profile, profile_name)),
    })
}

/// Load the config file and resolve the active profile against the flags.
pub fn console_config(global: &GlobalOpts) -> Result<ConsoleConfig, CliError> {
    let cfg = load_config_or_default();
    let (name, profile) = active_profile(global, &cfg);
    if global.profile.is_some() && !cfg.profiles.contains_key(&name) && global.api_url.is_none() {
        return Err(CliError::ProfileNotFound {
            available: available_profiles(&cfg),
            name,
        });
    }
    resolve_profile(&profile, &name, global)
}

/// Comma-separated profile names for help text.
pub fn available_profiles(cfg: &Config) -> String {
    if cfg.profiles.is_empty() {
        "(none)".into()
    } else {
        cfg.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}
