//! User command handlers.

use secrecy::ExposeSecret;
use tabled::Tabled;

use warden_core::forms::{
    user_create_form, user_create_payload, user_update_form, user_update_payload,
};
use warden_core::{Command as CoreCommand, CommandResult, Console, ConsoleConfig, User};

use crate::cli::{GlobalOpts, UsersArgs, UsersCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Username")]
    username: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Last Login")]
    last_login: String,
}

impl UserRow {
    fn new(u: &User, color: bool) -> Self {
        Self {
            id: u.id,
            username: u.username.clone(),
            name: u.full_name(),
            email: u.email.clone(),
            status: output::active_cell(u.active, color),
            last_login: u
                .last_login
                .map_or_else(|| "never".into(), |t| t.format("%Y-%m-%d %H:%M").to_string()),
        }
    }
}

fn user_detail(u: &User) -> String {
    [
        format!("ID:        {}", u.id),
        format!("Username:  {}", u.username),
        format!("Name:      {}", u.full_name()),
        format!("Email:     {}", u.email),
        format!("Active:    {}", util::yes_no(u.active)),
        format!("Created:   {}", u.created_at.format("%Y-%m-%d %H:%M")),
    ]
    .join("\n")
}

fn print_user(global: &GlobalOpts, result: &CommandResult) -> Result<(), CliError> {
    if let CommandResult::User(user) = result {
        let out = output::render_single(&global.output, user, user_detail, |u| u.id.to_string())?;
        output::print_output(&out, global.quiet);
    }
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub async fn handle(
    args: UsersArgs,
    config: &ConsoleConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        UsersCommand::List(page) => {
            let spinner = util::spinner(global, "Loading users...");
            let result = Console::oneshot(config, |console| async move {
                util::fetch_page(&page, |m| console.list_users(m)).await
            })
            .await;
            spinner.finish_and_clear();
            let paginator = result?;

            let color = output::should_color(&global.color);
            util::print_page(
                global,
                &paginator,
                |u| UserRow::new(u, color),
                |u| u.id.to_string(),
            )
        }

        UsersCommand::Create {
            email,
            username,
            first_name,
            last_name,
            password_stdin,
        } => {
            let mut form = user_create_form();
            util::fill(
                &mut form,
                &[
                    ("email", email.as_deref()),
                    ("username", username.as_deref()),
                    ("firstName", first_name.as_deref()),
                    ("lastName", last_name.as_deref()),
                ],
            );
            // Prompt only once the other fields are known to be valid
            form.validate();
            if form.errors().keys().all(|name| name == "password") {
                let password = util::read_secret("Password: ", password_stdin)?;
                form.set_value("password", password.expose_secret());
            }
            let values = util::validated(&mut form)?;
            let payload = user_create_payload(&values);

            let result = Console::oneshot(config, |console| async move {
                console.execute(CoreCommand::CreateUser(payload)).await
            })
            .await?;
            print_user(global, &result)
        }

        UsersCommand::Update {
            id,
            email,
            first_name,
            last_name,
            set_password,
        } => {
            let password = if set_password {
                Some(util::read_secret("New password: ", false)?)
            } else {
                None
            };
            let result = Console::oneshot(config, |console| async move {
                let user = console.find_user(id).await?;
                let mut form = user_update_form(&user);
                util::fill(
                    &mut form,
                    &[
                        ("email", email.as_deref()),
                        ("firstName", first_name.as_deref()),
                        ("lastName", last_name.as_deref()),
                        ("password", password.as_ref().map(ExposeSecret::expose_secret)),
                    ],
                );
                let values = util::validated(&mut form)?;
                let update = user_update_payload(&user, &values)?;
                console
                    .execute(CoreCommand::UpdateUser { id, update })
                    .await
                    .map_err(CliError::from)
            })
            .await?;
            print_user(global, &result)
        }

        UsersCommand::Toggle { id } => {
            let result = Console::oneshot(config, |console| async move {
                console.execute(CoreCommand::ToggleUser { id }).await
            })
            .await?;
            if let CommandResult::User(ref user) = result {
                if !global.quiet {
                    let state = if user.active { "activated" } else { "deactivated" };
                    eprintln!("✓ User {} {state}", user.username);
                }
            }
            print_user(global, &result)
        }

        UsersCommand::Delete { id } => {
            if !util::confirm(&format!("Delete user {id}?"), "users delete", global.yes)? {
                return Ok(());
            }
            Console::oneshot(config, |console| async move {
                console.execute(CoreCommand::DeleteUser { id }).await
            })
            .await?;
            if !global.quiet {
                eprintln!("✓ Deleted user {id}");
            }
            Ok(())
        }
    }
}
