//! Screen implementations. Each console page is a top-level Component.

pub mod critical_rules;
pub mod dashboard;
pub mod firewall_rules;
pub mod login;
pub mod not_found;
pub mod users;

use std::future::Future;

use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;
use warden_core::{Console, CoreError, Route};

use crate::action::Action;
use crate::component::Component;

/// One screen per distinct page. `Home` shares the dashboard.
pub fn create_screens(
    console: &Console,
    username: Option<String>,
) -> Vec<(Route, Box<dyn Component>)> {
    vec![
        (
            Route::Login,
            Box::new(login::LoginScreen::new(console.clone(), username)),
        ),
        (
            Route::Dashboard,
            Box::new(dashboard::DashboardScreen::new(console.clone())),
        ),
        (
            Route::CriticalRules,
            Box::new(critical_rules::CriticalRulesScreen::new(console.clone())),
        ),
        (
            Route::FirewallRules,
            Box::new(firewall_rules::FirewallRulesScreen::new(console.clone())),
        ),
        (
            Route::Users,
            Box::new(users::UsersScreen::new(console.clone())),
        ),
        (Route::NotFound, Box::new(not_found::NotFoundScreen)),
    ]
}

/// Run `fut` on the runtime and send the action it resolves to.
pub(crate) fn spawn_action<F>(action_tx: Option<&UnboundedSender<Action>>, fut: F)
where
    F: Future<Output = Action> + Send + 'static,
{
    let Some(tx) = action_tx.cloned() else {
        debug!("screen not initialized; dropping background request");
        return;
    };
    tokio::spawn(async move {
        let action = fut.await;
        if tx.send(action).is_err() {
            debug!("app closed before a background result arrived");
        }
    });
}

/// `SessionExpired` when `result` failed because the session is gone.
pub(crate) fn expired<T>(result: &Result<T, CoreError>) -> Option<Action> {
    match result {
        Err(e) if e.is_auth() => Some(Action::SessionExpired(e.display_message())),
        _ => None,
    }
}

/// A console pointed at a closed port with an in-memory token store.
#[cfg(test)]
pub(crate) fn offline_console() -> Console {
    use warden_core::{ConsoleConfig, TokenStorage};

    let url = url::Url::parse("http://127.0.0.1:9/api/")
        .unwrap_or_else(|e| panic!("test url: {e}"));
    Console::new(&ConsoleConfig::new(url, TokenStorage::Memory))
        .unwrap_or_else(|e| panic!("console: {e}"))
}
