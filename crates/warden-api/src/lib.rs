// warden-api: Async Rust client for the warden firewall rule and user API

pub mod client;
pub mod critical_rules;
pub mod error;
pub mod firewall_rules;
pub mod models;
pub mod token;
pub mod transport;
pub mod users;

pub use client::ApiClient;
pub use error::Error;
pub use models::{
    Action, CriticalRule, CriticalRuleCreate, CriticalRuleUpdate, FirewallRule, Page, User,
    UserCreate, UserUpdate,
};
pub use token::{ACCESS_TOKEN_COOKIE, CookieFileStore, MemoryTokenStore, TokenStore};
pub use transport::{TlsMode, TransportConfig};
pub use users::TokenResponse;
