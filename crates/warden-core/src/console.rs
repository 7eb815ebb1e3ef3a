// ── Console facade ──
//
// Owns the API client and the session. Front-ends list resources, run
// mutation commands and watch the auth state through a `Console`.
// Concurrent deletes of the same ids are coalesced: an id already being
// deleted is never sent again by an overlapping request.

use std::collections::HashSet;
use std::future::Future;
use std::sync::{Arc, Mutex as SyncMutex, PoisonError};

use secrecy::SecretString;
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};
use warden_api::{ApiClient, CriticalRule, FirewallRule, Page, User};

use crate::command::{Command, CommandResult};
use crate::config::ConsoleConfig;
use crate::dashboard::{DASHBOARD_SAMPLE, DashboardSummary};
use crate::error::CoreError;
use crate::pagination::PaginationModel;
use crate::route::Route;
use crate::session::{AuthGuard, AuthState, GuardDecision, Session};

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<ConsoleInner>`.
#[derive(Clone)]
pub struct Console {
    inner: Arc<ConsoleInner>,
}

struct ConsoleInner {
    api: ApiClient,
    guard: AuthGuard,
    session: Mutex<Session>,
    auth_state: watch::Sender<AuthState>,
    deletes_in_flight: SyncMutex<HashSet<i64>>,
}

/// Ids claimed for deletion; released when dropped.
struct DeleteClaim<'a> {
    in_flight: &'a SyncMutex<HashSet<i64>>,
    ids: Vec<i64>,
}

impl Drop for DeleteClaim<'_> {
    fn drop(&mut self) {
        let mut in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        for id in &self.ids {
            in_flight.remove(id);
        }
    }
}

impl Console {
    /// Build a console from configuration. Does not contact the backend.
    pub fn new(config: &ConsoleConfig) -> Result<Self, CoreError> {
        let api = ApiClient::new(
            config.url.as_str(),
            &config.transport(),
            config.token_storage.open(),
        )?;
        Ok(Self::from_client(api))
    }

    /// Wrap an existing client.
    pub fn from_client(api: ApiClient) -> Self {
        Self::with_guard(api, AuthGuard::new())
    }

    pub fn with_guard(api: ApiClient, guard: AuthGuard) -> Self {
        let (auth_state, _) = watch::channel(AuthState::default());
        Self {
            inner: Arc::new(ConsoleInner {
                api,
                guard,
                session: Mutex::new(Session::new()),
                auth_state,
                deletes_in_flight: SyncMutex::new(HashSet::new()),
            }),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    // ── Session ──────────────────────────────────────────────────────

    fn publish(&self, session: &Session) {
        self.inner.auth_state.send_replace(session.state().clone());
    }

    pub async fn login(&self, username: &str, password: &SecretString) -> Result<User, CoreError> {
        let mut session = self.inner.session.lock().await;
        let result = session.login(&self.inner.api, username, password).await;
        self.publish(&session);
        result
    }

    pub async fn initialize(&self) -> Result<User, CoreError> {
        let mut session = self.inner.session.lock().await;
        let result = session.initialize(&self.inner.api).await;
        self.publish(&session);
        result
    }

    pub async fn logout(&self) -> Result<(), CoreError> {
        let mut session = self.inner.session.lock().await;
        let result = session.logout(&self.inner.api);
        self.publish(&session);
        result
    }

    /// Snapshot of the current auth state.
    pub fn auth_state(&self) -> AuthState {
        self.inner.auth_state.borrow().clone()
    }

    /// Subscribe to auth state changes.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.inner.auth_state.subscribe()
    }

    /// Run the auth guard for `route`.
    pub async fn guard(&self, route: Route) -> GuardDecision {
        let mut session = self.inner.session.lock().await;
        let decision = self
            .inner
            .guard
            .resolve(&mut session, &self.inner.api, route)
            .await;
        self.publish(&session);
        decision
    }

    /// The authenticated user, restoring the session from the stored token
    /// when needed.
    pub async fn require_session(&self) -> Result<User, CoreError> {
        {
            let session = self.inner.session.lock().await;
            if let Some(user) = session.user() {
                return Ok(user.clone());
            }
        }
        self.initialize().await
    }

    /// Convert an API result, expiring the session on auth failures.
    async fn observe<T>(&self, result: Result<T, warden_api::Error>) -> Result<T, CoreError> {
        match result {
            Ok(value) => Ok(value),
            Err(e) => {
                let err = CoreError::from(e);
                if err.is_auth() {
                    warn!(error = %err, "session rejected by backend");
                    let mut session = self.inner.session.lock().await;
                    session.expire(err.display_message());
                    self.publish(&session);
                }
                Err(err)
            }
        }
    }

    // ── One-shot convenience ─────────────────────────────────────────

    /// One-shot: build a console, check the session, run the closure.
    ///
    /// Fails with an auth error before `f` runs when no session can be
    /// restored.
    pub async fn oneshot<F, Fut, T, E>(config: &ConsoleConfig, f: F) -> Result<T, E>
    where
        F: FnOnce(Console) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<CoreError>,
    {
        let console = Console::new(config)?;
        console.require_session().await?;
        f(console).await
    }

    // ── Reads ────────────────────────────────────────────────────────

    pub async fn list_critical_rules(
        &self,
        model: PaginationModel,
    ) -> Result<Page<CriticalRule>, CoreError> {
        let result = self
            .inner
            .api
            .list_critical_rules(model.page, model.page_size)
            .await;
        self.observe(result).await
    }

    pub async fn list_firewall_rules(
        &self,
        model: PaginationModel,
    ) -> Result<Page<FirewallRule>, CoreError> {
        let result = self
            .inner
            .api
            .list_firewall_rules(model.page, model.page_size)
            .await;
        self.observe(result).await
    }

    /// Users paginate by offset; the page model is translated to
    /// `skip`/`limit`.
    pub async fn list_users(&self, model: PaginationModel) -> Result<Page<User>, CoreError> {
        let result = self
            .inner
            .api
            .list_users(model.offset(), model.page_size)
            .await;
        self.observe(result).await
    }

    /// Locate a critical rule by id. The backend has no single-record
    /// read, so the list is walked a page at a time.
    pub async fn find_critical_rule(&self, id: i64) -> Result<CriticalRule, CoreError> {
        find_paged(
            "critical rule",
            id,
            |m| self.list_critical_rules(m),
            |r: &CriticalRule| r.id,
        )
        .await
    }

    pub async fn find_user(&self, id: i64) -> Result<User, CoreError> {
        find_paged("user", id, |m| self.list_users(m), |u: &User| u.id).await
    }

    /// Figures for the dashboard, fetched concurrently.
    pub async fn dashboard(&self) -> Result<DashboardSummary, CoreError> {
        let sample = PaginationModel {
            page: 0,
            page_size: DASHBOARD_SAMPLE,
        };
        let (critical, firewall, users) = tokio::try_join!(
            self.list_critical_rules(sample),
            self.list_firewall_rules(sample),
            self.list_users(sample),
        )?;
        Ok(DashboardSummary::from_pages(&critical, &firewall, &users))
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Execute a mutation.
    pub async fn execute(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        debug!(command = cmd.describe(), "executing");
        let api = &self.inner.api;
        match cmd {
            Command::CreateCriticalRule(rule) => {
                let created = self.observe(api.create_critical_rule(&rule).await).await?;
                info!(id = created.id, "critical rule created");
                Ok(CommandResult::CriticalRule(created))
            }
            Command::UpdateCriticalRule { id, update } => {
                if !update.has_updates() {
                    return Err(CoreError::validation("No updates provided"));
                }
                let updated = self
                    .observe(api.update_critical_rule(id, &update).await)
                    .await?;
                Ok(CommandResult::CriticalRule(updated))
            }
            Command::DeleteCriticalRule { id } => self.delete_critical_rules(&[id]).await,
            Command::DeleteCriticalRules { ids } => self.delete_critical_rules(&ids).await,
            Command::CreateUser(user) => {
                let created = self.observe(api.create_user(&user).await).await?;
                info!(id = created.id, "user created");
                Ok(CommandResult::User(created))
            }
            Command::UpdateUser { id, update } => {
                if !update.has_updates() {
                    return Err(CoreError::validation("No updates provided"));
                }
                let updated = self.observe(api.update_user(id, &update).await).await?;
                Ok(CommandResult::User(updated))
            }
            Command::ToggleUser { id } => {
                let toggled = self.observe(api.toggle_user(id).await).await?;
                info!(id, active = toggled.active, "user toggled");
                Ok(CommandResult::User(toggled))
            }
            Command::DeleteUser { id } => {
                self.observe(api.delete_user(id).await).await?;
                info!(id, "user deleted");
                Ok(CommandResult::Ok)
            }
        }
    }

    /// Claim the ids not already being deleted.
    fn claim(&self, ids: &[i64]) -> DeleteClaim<'_> {
        let mut in_flight = self
            .inner
            .deletes_in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let mut claimed = Vec::with_capacity(ids.len());
        for id in ids {
            if in_flight.insert(*id) {
                claimed.push(*id);
            }
        }
        DeleteClaim {
            in_flight: &self.inner.deletes_in_flight,
            ids: claimed,
        }
    }

    async fn delete_critical_rules(&self, ids: &[i64]) -> Result<CommandResult, CoreError> {
        let claim = self.claim(ids);
        if claim.ids.is_empty() {
            debug!(?ids, "every id already has a delete in flight");
            return Ok(CommandResult::Deleted { ids: Vec::new() });
        }
        if claim.ids.len() < ids.len() {
            debug!(requested = ?ids, sending = ?claim.ids, "skipping ids already being deleted");
        }

        let api = &self.inner.api;
        let result = match claim.ids.as_slice() {
            [id] => api.delete_critical_rule(*id).await,
            many => api.delete_critical_rules(many).await,
        };
        self.observe(result).await?;
        info!(ids = ?claim.ids, "critical rules deleted");
        Ok(CommandResult::Deleted {
            ids: claim.ids.clone(),
        })
    }
}

async fn find_paged<T, F, Fut>(
    entity: &str,
    id: i64,
    mut fetch: F,
    id_of: impl Fn(&T) -> i64,
) -> Result<T, CoreError>
where
    F: FnMut(PaginationModel) -> Fut,
    Fut: Future<Output = Result<Page<T>, CoreError>>,
{
    let mut model = PaginationModel {
        page: 0,
        page_size: DASHBOARD_SAMPLE,
    };
    loop {
        let page = fetch(model).await?;
        // User lists carry no total; a short page marks the end.
        let exhausted = !u32::try_from(page.data.len()).is_ok_and(|n| n >= model.page_size);
        if let Some(found) = page.data.into_iter().find(|item| id_of(item) == id) {
            return Ok(found);
        }
        if exhausted {
            return Err(CoreError::NotFound {
                entity: entity.into(),
                identifier: id.to_string(),
            });
        }
        model.page += 1;
    }
}
