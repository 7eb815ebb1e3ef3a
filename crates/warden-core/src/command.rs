// ── Command API ──
//
// All write operations flow through a unified `Command` enum, executed by
// `Console::execute`. Reads bypass it through the list methods.

use warden_api::{CriticalRule, CriticalRuleCreate, CriticalRuleUpdate, User, UserCreate, UserUpdate};

/// All write operations against the backend.
#[derive(Debug, Clone)]
pub enum Command {
    // ── Critical rules ───────────────────────────────────────────────
    CreateCriticalRule(CriticalRuleCreate),
    UpdateCriticalRule {
        id: i64,
        update: CriticalRuleUpdate,
    },
    DeleteCriticalRule {
        id: i64,
    },
    DeleteCriticalRules {
        ids: Vec<i64>,
    },

    // ── Users ────────────────────────────────────────────────────────
    CreateUser(UserCreate),
    UpdateUser {
        id: i64,
        update: UserUpdate,
    },
    ToggleUser {
        id: i64,
    },
    DeleteUser {
        id: i64,
    },
}

impl Command {
    /// Short verb for logs and notifications.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::CreateCriticalRule(_) => "create critical rule",
            Self::UpdateCriticalRule { .. } => "update critical rule",
            Self::DeleteCriticalRule { .. } | Self::DeleteCriticalRules { .. } => {
                "delete critical rules"
            }
            Self::CreateUser(_) => "create user",
            Self::UpdateUser { .. } => "update user",
            Self::ToggleUser { .. } => "toggle user",
            Self::DeleteUser { .. } => "delete user",
        }
    }
}

/// Outcome of a [`Command`].
#[derive(Debug, Clone, PartialEq)]
pub enum CommandResult {
    Ok,
    CriticalRule(CriticalRule),
    User(User),
    /// Ids actually sent for deletion. Ids already being deleted by an
    /// overlapping request are left out.
    Deleted { ids: Vec<i64> },
}
