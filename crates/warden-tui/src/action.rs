//! Every state change in the TUI travels as an [`Action`].
//!
//! Key handlers return actions, and spawned requests send them back over
//! the app's channel. Results of background calls carry the request that
//! produced them so late arrivals can be recognized.

use std::fmt;

use warden_core::{
    Command, CommandResult, CoreError, CriticalRule, DashboardSummary, FetchRequest,
    FirewallRule, GuardDecision, Page, Route, User,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

/// A toast in the bottom-right corner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn success(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Success,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Error,
        }
    }

    pub fn info(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Info,
        }
    }
}

/// A destructive operation waiting for a yes/no.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteCriticalRules { ids: Vec<i64> },
    DeleteUser { id: i64, username: String },
}

impl ConfirmAction {
    pub fn command(&self) -> Command {
        match self {
            Self::DeleteCriticalRules { ids } => match ids.as_slice() {
                [id] => Command::DeleteCriticalRule { id: *id },
                _ => Command::DeleteCriticalRules { ids: ids.clone() },
            },
            Self::DeleteUser { id, .. } => Command::DeleteUser { id: *id },
        }
    }

    /// Screen whose list changes when this goes through.
    pub fn route(&self) -> Route {
        match self {
            Self::DeleteCriticalRules { .. } => Route::CriticalRules,
            Self::DeleteUser { .. } => Route::Users,
        }
    }

    /// Toast for a finished command. Rule deletes count the ids actually
    /// sent, which leaves out ids another delete already had in flight.
    pub fn success_message(&self, result: &CommandResult) -> String {
        match (self, result) {
            (Self::DeleteCriticalRules { .. }, CommandResult::Deleted { ids }) if ids.is_empty() => {
                "Those critical rules are already being deleted".into()
            }
            (Self::DeleteCriticalRules { .. }, CommandResult::Deleted { ids })
            | (Self::DeleteCriticalRules { ids }, _) => {
                format!("Deleted {} critical rule(s)", ids.len())
            }
            (Self::DeleteUser { username, .. }, _) => format!("Deleted user {username}"),
        }
    }
}

impl fmt::Display for ConfirmAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeleteCriticalRules { ids } => {
                let listed: Vec<String> = ids.iter().map(|id| format!("#{id}")).collect();
                write!(
                    f,
                    "Delete {} critical rule(s) {}?",
                    ids.len(),
                    listed.join(", ")
                )
            }
            Self::DeleteUser { username, .. } => write!(f, "Delete user {username}?"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Action {
    // ── Lifecycle ──────────────────────────────────────────────────
    Quit,
    Tick,
    Render,
    Resize(u16, u16),

    // ── Navigation ────────────────────────────────────────────────
    /// Ask the auth guard for a route.
    Navigate(Route),
    /// The guard's answer for `requested`.
    RouteResolved {
        requested: Route,
        decision: GuardDecision,
    },

    // ── Session ───────────────────────────────────────────────────
    LoginFinished(Result<User, CoreError>),
    Logout,
    LoggedOut(Result<(), CoreError>),
    /// The backend rejected the token mid-session.
    SessionExpired(String),

    // ── Data ──────────────────────────────────────────────────────
    DashboardLoaded(Result<DashboardSummary, CoreError>),
    CriticalRulesLoaded(FetchRequest, Result<Page<CriticalRule>, CoreError>),
    FirewallRulesLoaded(FetchRequest, Result<Page<FirewallRule>, CoreError>),
    UsersLoaded(FetchRequest, Result<Page<User>, CoreError>),
    /// Refetch the list shown on `Route`.
    Refresh(Route),

    // ── Mutations ─────────────────────────────────────────────────
    CriticalRuleSaved(Result<CommandResult, CoreError>),
    UserSaved(Result<CommandResult, CoreError>),
    UserToggled(Result<CommandResult, CoreError>),

    // ── Confirm dialog ────────────────────────────────────────────
    ShowConfirm(ConfirmAction),
    ConfirmYes,
    ConfirmNo,
    ConfirmFinished(Result<CommandResult, CoreError>),

    // ── Overlays ──────────────────────────────────────────────────
    ToggleHelp,
    Notify(Notification),
    DismissNotification,
}
