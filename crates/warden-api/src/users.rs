// User endpoints
//
// Login is the only anonymous call: it posts an OAuth2 password-grant form
// and answers with a bearer token. Everything else needs the token cookie.
// The user list paginates by offset (`skip`, `limit`).

use secrecy::SecretString;
use serde::Deserialize;
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{Page, User, UserCreate, UserUpdate};

/// Token issued by `POST /users/login`.
#[derive(Debug, Clone)]
pub struct TokenResponse {
    pub access_token: SecretString,
    pub token_type: String,
}

#[derive(Deserialize)]
struct RawTokenResponse {
    access_token: String,
    #[serde(default = "default_token_type")]
    token_type: String,
}

fn default_token_type() -> String {
    "bearer".into()
}

impl ApiClient {
    /// Exchange credentials for a bearer token.
    ///
    /// `POST /users/login` with form fields `grant_type=password`,
    /// `username`, `password`. No token is attached. A rejected login maps
    /// to [`Error::LoginRejected`] carrying the backend's `detail`.
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenResponse, Error> {
        debug!(username, "logging in");
        let raw: RawTokenResponse = self
            .post_form_anonymous(
                "users/login",
                &[
                    ("grant_type", "password"),
                    ("username", username),
                    ("password", password),
                ],
            )
            .await
            .map_err(|e| match e {
                Error::Api { detail, .. } | Error::Unauthorized { detail } => {
                    Error::LoginRejected { detail }
                }
                other => other,
            })?;

        Ok(TokenResponse {
            access_token: SecretString::from(raw.access_token),
            token_type: raw.token_type,
        })
    }

    /// Profile of the user owning the current token.
    ///
    /// `GET /users/me`
    pub async fn get_me(&self) -> Result<User, Error> {
        self.get("users/me").await
    }

    /// List users by offset.
    ///
    /// `GET /users?skip={skip}&limit={limit}`
    pub async fn list_users(&self, skip: u64, limit: u32) -> Result<Page<User>, Error> {
        self.get_with_params(
            "users",
            &[("skip", skip.to_string()), ("limit", limit.to_string())],
        )
        .await
    }

    /// Create a user.
    ///
    /// `POST /users`
    pub async fn create_user(&self, user: &UserCreate) -> Result<User, Error> {
        debug!(username = %user.username, "creating user");
        self.post("users", user).await
    }

    /// Update a user. Only fields present in `update` change.
    ///
    /// `PUT /users/{id}`
    pub async fn update_user(&self, id: i64, update: &UserUpdate) -> Result<User, Error> {
        debug!(id, "updating user");
        self.put(&format!("users/{id}"), update).await
    }

    /// Flip a user's active flag.
    ///
    /// `PUT /users/{id}/toggle`
    pub async fn toggle_user(&self, id: i64) -> Result<User, Error> {
        debug!(id, "toggling user");
        self.put_empty(&format!("users/{id}/toggle")).await
    }

    /// Delete a user. The backend refuses to delete active users.
    ///
    /// `DELETE /users/{id}`
    pub async fn delete_user(&self, id: i64) -> Result<(), Error> {
        debug!(id, "deleting user");
        self.delete(&format!("users/{id}")).await
    }
}
