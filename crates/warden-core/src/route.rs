// ── Console routes ──
//
// The console's page table. Every page except login sits behind the
// auth guard; unknown paths land on the not-found page.

use strum::{EnumIter, IntoEnumIterator};

/// A console page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Route {
    Login,
    Home,
    Dashboard,
    Users,
    CriticalRules,
    FirewallRules,
    NotFound,
}

impl Route {
    /// Resolve a path. Trailing slashes and query strings are ignored;
    /// anything unknown is [`Route::NotFound`].
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        let normalized = if trimmed.is_empty() { "/" } else { trimmed };
        Self::iter()
            .filter(|r| *r != Self::NotFound)
            .find(|r| r.path() == normalized)
            .unwrap_or(Self::NotFound)
    }

    pub fn path(self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Home => "/",
            Self::Dashboard => "/dashboard",
            Self::Users => "/users",
            Self::CriticalRules => "/critical-rules",
            Self::FirewallRules => "/firewall-rules",
            Self::NotFound => "/404",
        }
    }

    /// Everything but the login page needs an authenticated session.
    pub fn requires_auth(self) -> bool {
        self != Self::Login
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Login => "Login",
            Self::Home | Self::Dashboard => "Dashboard",
            Self::Users => "Users",
            Self::CriticalRules => "Critical Rules",
            Self::FirewallRules => "Firewall Rules",
            Self::NotFound => "Not Found",
        }
    }

    /// Pages listed in the navigation bar, in order.
    pub fn navigation() -> [Self; 4] {
        [
            Self::Dashboard,
            Self::CriticalRules,
            Self::FirewallRules,
            Self::Users,
        ]
    }
}
