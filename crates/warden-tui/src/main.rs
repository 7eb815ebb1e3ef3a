//! `warden-tui`: terminal console for the warden rule administration API.
//!
//! Pages are reached through the same auth guard as the web console: the
//! dashboard, critical rules (create, edit, bulk delete), read-only firewall
//! rules, and users. Number keys 1-4 switch pages; `L` signs out.
//!
//! Logs go to a file (default `warden-tui.log` in the data directory) so
//! they never corrupt the terminal.

mod action;
mod app;
mod component;
mod event;
mod screen;
mod screens;
mod theme;
mod tui;
mod widgets;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Result, bail};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use warden_core::{Console, ConsoleConfig, Route};

use crate::app::App;

/// Terminal console for critical rules, firewall rules and users.
#[derive(Parser, Debug)]
#[command(name = "warden-tui", version, about)]
struct Cli {
    /// Backend profile to use
    #[arg(short = 'p', long, env = "WARDEN_PROFILE")]
    profile: Option<String>,

    /// API base URL (overrides profile), e.g. http://localhost:8000/api
    #[arg(short = 'u', long, env = "WARDEN_API_URL")]
    api_url: Option<url::Url>,

    /// Accept self-signed TLS certificates
    #[arg(short = 'k', long)]
    insecure: bool,

    /// Page to open first (`/`, `/critical-rules`, `/firewall-rules`, `/users`, ...)
    #[arg(long, default_value = "/")]
    route: String,

    /// Log file path (defaults to warden-tui.log in the data directory)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// File-based tracing. Nothing may reach stdout/stderr while the terminal
/// is in raw mode. Hold the returned guard until exit so the log flushes.
fn setup_tracing(cli: &Cli) -> Result<WorkerGuard> {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("warden_tui={log_level},warden_core={log_level}"))
    });

    let log_file = cli
        .log_file
        .clone()
        .unwrap_or_else(|| warden_config::data_dir().join("warden-tui.log"));
    let log_dir = log_file
        .parent()
        .map_or_else(warden_config::data_dir, PathBuf::from);
    std::fs::create_dir_all(&log_dir)?;
    let log_filename = log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("warden-tui.log"));

    let file_appender = tracing_appender::rolling::never(&log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .init();

    Ok(guard)
}

/// Resolve the active profile with flag overrides applied, plus the
/// profile's username for prefilling the login form.
fn console_config(cli: &Cli) -> Result<(ConsoleConfig, Option<String>)> {
    let cfg = warden_config::load_config_or_default();
    let name = cfg.active_profile_name(cli.profile.as_deref());
    let mut profile = cfg.profiles.get(&name).cloned().unwrap_or_default();

    if let Some(url) = &cli.api_url {
        profile.api_url = url.to_string();
    }
    if cli.insecure {
        profile.insecure = Some(true);
    }
    if profile.api_url.is_empty() {
        bail!(
            "no API URL for profile '{name}'; run `warden config init` or pass --api-url"
        );
    }

    let config = warden_config::profile_to_console_config(&profile, &name)?;
    let username = warden_config::resolve_username(&profile, &name).ok();
    Ok((config, username))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Hooks first so startup failures restore the terminal too
    tui::install_hooks()?;
    let _log_guard = setup_tracing(&cli)?;

    let (config, username) = console_config(&cli)?;
    let start = Route::parse(&cli.route);
    info!(api = %config.url, route = start.path(), "starting warden-tui");

    let console = Console::new(&config)?;
    App::new(console, start, username).run().await
}
