//! Session commands: login, logout, whoami.

use secrecy::ExposeSecret;

use warden_core::forms::{login_credentials, login_form};
use warden_core::{Console, ConsoleConfig, User};

use crate::cli::{GlobalOpts, LoginArgs};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::util;

fn user_detail(u: &User) -> String {
    [
        format!("ID:          {}", u.id),
        format!("Username:    {}", u.username),
        format!("Name:        {}", u.full_name()),
        format!("Email:       {}", u.email),
        format!("Active:      {}", util::yes_no(u.active)),
        format!(
            "Last login:  {}",
            u.last_login
                .map_or_else(|| "-".into(), |t| t.format("%Y-%m-%d %H:%M").to_string())
        ),
    ]
    .join("\n")
}

/// Username from the argument, else the profile (or `WARDEN_USERNAME`).
fn resolve_username(args: &LoginArgs, global: &GlobalOpts) -> Result<String, CliError> {
    if let Some(ref username) = args.username {
        return Ok(username.clone());
    }
    let cfg = config::load_config_or_default();
    let (name, profile) = config::active_profile(global, &cfg);
    Ok(warden_config::resolve_username(&profile, &name)?)
}

/// Password from stdin, else the credential chain, else a prompt.
fn resolve_password(args: &LoginArgs, global: &GlobalOpts) -> Result<String, CliError> {
    if args.password_stdin {
        return Ok(util::read_secret("", true)?.expose_secret().to_owned());
    }
    let cfg = config::load_config_or_default();
    let (name, profile) = config::active_profile(global, &cfg);
    match warden_config::resolve_password(&profile, &name) {
        Ok(secret) => Ok(secret.expose_secret().to_owned()),
        Err(_) => Ok(util::read_secret("Password: ", false)?
            .expose_secret()
            .to_owned()),
    }
}

pub async fn login(
    args: LoginArgs,
    config: &ConsoleConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mut form = login_form();
    let username = resolve_username(&args, global)?;
    let password = resolve_password(&args, global)?;
    util::fill(
        &mut form,
        &[
            ("username", Some(username.as_str())),
            ("password", Some(password.as_str())),
        ],
    );
    let values = util::validated(&mut form)?;
    let (username, password) = login_credentials(&values);

    let console = Console::new(config)?;
    let spinner = util::spinner(global, "Signing in...");
    let result = console.login(&username, &password).await;
    spinner.finish_and_clear();
    let user = result?;

    if !global.quiet {
        eprintln!("✓ Signed in as {} ({})", user.username, user.full_name());
    }
    Ok(())
}

pub async fn logout(config: &ConsoleConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let console = Console::new(config)?;
    console.logout().await?;
    if !global.quiet {
        eprintln!("✓ Signed out");
    }
    Ok(())
}

pub async fn whoami(config: &ConsoleConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let user = Console::oneshot(config, |console| async move {
        console.require_session().await
    })
    .await?;
    let out = output::render_single(&global.output, &user, user_detail, |u| u.username.clone())?;
    output::print_output(&out, global.quiet);
    Ok(())
}
