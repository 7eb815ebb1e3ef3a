// ── Session and auth guard ──
//
// The session is authenticated once `GET /users/me` succeeds with the
// stored token. Login stores a fresh token first; logout drops it. The
// guard decides, per route, whether to render or bounce to the login page.

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, warn};
use warden_api::{ApiClient, User};

use crate::error::CoreError;
use crate::route::Route;

/// Observable session state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    pub is_authenticated: bool,
    pub user: Option<User>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Session slice: owns the [`AuthState`] and the transitions on it.
#[derive(Debug, Default)]
pub struct Session {
    state: AuthState,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated
    }

    pub fn user(&self) -> Option<&User> {
        self.state.user.as_ref()
    }

    fn authenticated(&mut self, user: User) {
        self.state = AuthState {
            is_authenticated: true,
            user: Some(user),
            loading: false,
            error: None,
        };
    }

    /// Log in, store the token cookie, then load the profile.
    ///
    /// On failure the session stays unauthenticated and `error` holds the
    /// backend's explanation. A token whose profile cannot be loaded is
    /// discarded again.
    pub async fn login(
        &mut self,
        api: &ApiClient,
        username: &str,
        password: &SecretString,
    ) -> Result<User, CoreError> {
        self.state.loading = true;
        self.state.error = None;

        match Self::login_inner(api, username, password).await {
            Ok(user) => {
                info!(username = %user.username, "logged in");
                self.authenticated(user.clone());
                Ok(user)
            }
            Err(e) => {
                warn!(username, error = %e, "login failed");
                self.state = AuthState {
                    error: Some(e.display_message()),
                    ..AuthState::default()
                };
                Err(e)
            }
        }
    }

    async fn login_inner(
        api: &ApiClient,
        username: &str,
        password: &SecretString,
    ) -> Result<User, CoreError> {
        let token = api.login(username, password.expose_secret()).await?;
        api.tokens().save(&token.access_token)?;
        match api.get_me().await {
            Ok(user) => Ok(user),
            Err(e) => {
                if let Err(clear_err) = api.tokens().clear() {
                    warn!(error = %clear_err, "could not discard unusable token");
                }
                Err(e.into())
            }
        }
    }

    /// Restore a session from the stored token.
    ///
    /// Any failure, including a missing token, is reported as
    /// [`CoreError::NoSession`].
    pub async fn initialize(&mut self, api: &ApiClient) -> Result<User, CoreError> {
        self.state.loading = true;
        self.state.error = None;

        match api.get_me().await {
            Ok(user) => {
                debug!(username = %user.username, "session restored");
                self.authenticated(user.clone());
                Ok(user)
            }
            Err(e) => {
                debug!(error = %e, "no usable session");
                self.state.loading = false;
                self.state.is_authenticated = false;
                self.state.user = None;
                Err(CoreError::NoSession)
            }
        }
    }

    /// Drop the token cookie and forget the user.
    pub fn logout(&mut self, api: &ApiClient) -> Result<(), CoreError> {
        api.tokens().clear()?;
        self.state = AuthState::default();
        info!("logged out");
        Ok(())
    }

    /// Mark the session as gone after the backend rejected the token.
    pub fn expire(&mut self, message: impl Into<String>) {
        self.state = AuthState {
            error: Some(message.into()),
            ..AuthState::default()
        };
    }
}

// ── Guard ────────────────────────────────────────────────────────────

/// What to show for a requested route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Render(Route),
    Redirect(Route),
}

impl GuardDecision {
    /// The route that ends up on screen.
    pub fn route(self) -> Route {
        match self {
            Self::Render(r) | Self::Redirect(r) => r,
        }
    }
}

/// Gate for protected routes.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthGuard {
    test_mode: bool,
}

impl AuthGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// A guard that lets everything through without checking the session.
    pub fn test_mode() -> Self {
        Self { test_mode: true }
    }

    /// Decide whether `route` may render.
    ///
    /// Public routes and authenticated sessions render directly. Otherwise
    /// the session is initialized from the stored token; failure redirects
    /// to the login page.
    pub async fn resolve(&self, session: &mut Session, api: &ApiClient, route: Route) -> GuardDecision {
        if self.test_mode || !route.requires_auth() || session.is_authenticated() {
            return GuardDecision::Render(route);
        }
        match session.initialize(api).await {
            Ok(_) => GuardDecision::Render(route),
            Err(_) => {
                debug!(route = route.path(), "redirecting to login");
                GuardDecision::Redirect(Route::Login)
            }
        }
    }
}
