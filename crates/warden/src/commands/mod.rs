//! Command handlers, one module per resource.
//!
//! Handlers validate their input locally, then go through
//! [`Console::oneshot`](warden_core::Console::oneshot), which restores the
//! session from the token cookie before anything else is requested.

pub mod auth;
pub mod config_cmd;
pub mod critical_rules;
pub mod dashboard;
pub mod firewall_rules;
pub mod users;
pub mod util;

use warden_core::ConsoleConfig;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Route a backend command to its handler.
pub async fn dispatch(
    cmd: Command,
    config: &ConsoleConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Login(args) => auth::login(args, config, global).await,
        Command::Logout => auth::logout(config, global).await,
        Command::Whoami => auth::whoami(config, global).await,
        Command::Dashboard => dashboard::handle(config, global).await,
        Command::Rules(args) => critical_rules::handle(args, config, global).await,
        Command::FirewallRules(args) => firewall_rules::handle(args, config, global).await,
        Command::Users(args) => users::handle(args, config, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
