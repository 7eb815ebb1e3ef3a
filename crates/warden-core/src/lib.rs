//! Console logic between `warden-api` and the front-ends (CLI / TUI).
//!
//! - **[`Console`]**: facade owning the API client and the session. Lists
//!   resources, executes [`Command`]s and serializes overlapping deletes.
//!   [`Console::oneshot()`] restores the session and runs one closure, for
//!   single CLI invocations.
//!
//! - **[`Session`] / [`AuthGuard`]**: login, session restore from the
//!   token cookie, logout, and the per-[`Route`] render-or-redirect decision.
//!
//! - **[`Paginator`]**: page model, rows and fetch bookkeeping for one list.
//!   Responses to superseded requests are dropped; fetch errors are kept
//!   for display.
//!
//! - **[`form`] / [`forms`]**: declarative fields with a validation
//!   [`Schema`], the submit contract in [`FormState`], and the concrete
//!   resource dialogs with their payload builders.
//!
//! - **[`modal`]**: open/closed state for create, update and delete dialogs.

pub mod command;
pub mod config;
pub mod console;
pub mod dashboard;
pub mod error;
pub mod form;
pub mod forms;
pub mod modal;
pub mod pagination;
pub mod route;
pub mod session;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::{Command, CommandResult};
pub use config::{ConsoleConfig, TlsVerification, TokenStorage};
pub use console::Console;
pub use dashboard::DashboardSummary;
pub use error::CoreError;
pub use form::{FieldConfig, FieldKind, FieldOption, FieldValue, FormState, FormValues, Schema, SubmitOutcome};
pub use modal::{ModalState, UpdateModalState};
pub use pagination::{FetchRequest, PaginationModel, Paginator};
pub use route::Route;
pub use session::{AuthGuard, AuthState, GuardDecision, Session};

// Wire types, re-exported so front-ends depend on one crate for models.
pub use warden_api::{
    Action, CriticalRule, CriticalRuleCreate, CriticalRuleUpdate, FirewallRule, Page, User,
    UserCreate, UserUpdate,
};
