//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text and process exit codes.

use miette::Diagnostic;
use thiserror::Error;

use warden_config::ConfigError;
use warden_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach the API at {url}")]
    #[diagnostic(
        code(warden::connection_failed),
        help(
            "{reason}\n\
             Check the api_url of your profile, or pass --api-url.\n\
             Self-signed certificate? Try --insecure (-k) or set ca_cert."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(warden::timeout),
        help("Increase the timeout with --timeout or check the backend's responsiveness.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────

    #[error("Not signed in: {reason}")]
    #[diagnostic(code(warden::not_authenticated), help("Run: warden login"))]
    NotAuthenticated { reason: String },

    #[error("Login failed: {message}")]
    #[diagnostic(
        code(warden::login_failed),
        help("Check the username and password, then run warden login again.")
    )]
    LoginFailed { message: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(warden::no_credentials),
        help(
            "Pass the username to warden login, set username in the profile,\n\
             or store a password with: warden config set-password"
        )
    )]
    NoCredentials { profile: String },

    #[error("Could not access the token cookie: {message}")]
    #[diagnostic(code(warden::token_storage))]
    TokenStorage { message: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(warden::not_found),
        help("Run: warden {list_command} to see available records")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── API ──────────────────────────────────────────────────────────

    #[error("{message}")]
    #[diagnostic(code(warden::api_error), help("The backend answered with HTTP {status}."))]
    ApiError { status: u16, message: String },

    #[error("Internal error: {0}")]
    #[diagnostic(code(warden::internal))]
    Internal(String),

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(warden::validation))]
    Validation { field: String, reason: String },

    #[error("{form}: {count} invalid field(s), nothing was sent")]
    #[diagnostic(code(warden::invalid_form), help("{details}"))]
    InvalidForm {
        form: String,
        count: usize,
        details: String,
    },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(warden::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: warden config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No API URL configured")]
    #[diagnostic(
        code(warden::no_config),
        help(
            "Create a profile with: warden config init\n\
             Or pass --api-url / set WARDEN_API_URL.\n\
             Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(warden::config))]
    Config(ConfigError),

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(warden::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO ───────────────────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Could not serialize output: {0}")]
    #[diagnostic(code(warden::output))]
    Output(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::NotAuthenticated { .. }
            | Self::LoginFailed { .. }
            | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::ApiError { status: 403, .. } => exit_code::PERMISSION,
            Self::ApiError { status: 409, .. } => exit_code::CONFLICT,
            Self::Validation { .. }
            | Self::InvalidForm { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

fn list_command_for(entity: &str) -> &'static str {
    match entity {
        "user" => "users list",
        "firewall rule" => "firewall-rules list",
        _ => "rules list",
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotAuthenticated { message } => {
                CliError::NotAuthenticated { reason: message }
            }

            CoreError::NoSession => CliError::NotAuthenticated {
                reason: CoreError::NoSession.to_string(),
            },

            CoreError::LoginFailed { message } => CliError::LoginFailed { message },

            CoreError::ConnectionFailed { url, reason } => {
                CliError::ConnectionFailed { url, reason }
            }

            CoreError::Timeout => CliError::Timeout,

            CoreError::NotFound { entity, identifier } => CliError::NotFound {
                list_command: list_command_for(&entity).into(),
                resource_type: entity,
                identifier,
            },

            CoreError::Rejected { message, status } => CliError::ApiError { status, message },

            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::Config { message } => CliError::Validation {
                field: "configuration".into(),
                reason: message,
            },

            CoreError::TokenStorage { message } => CliError::TokenStorage { message },

            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::UnknownProfile { name } => CliError::ProfileNotFound {
                name,
                available: "(see: warden config profiles)".into(),
            },
            other => CliError::Config(other),
        }
    }
}
