//! Navigation order of the console routes.

use warden_core::Route;

/// Tab-bar routes, in order. Number keys select them (1-based).
pub fn navigation() -> [Route; 4] {
    Route::navigation()
}

/// Screen that renders `route`. `/` shows the dashboard.
pub fn screen_for(route: Route) -> Route {
    match route {
        Route::Home => Route::Dashboard,
        other => other,
    }
}

pub fn from_number(n: u8) -> Option<Route> {
    let idx = usize::from(n.checked_sub(1)?);
    navigation().get(idx).copied()
}

pub fn number(route: Route) -> Option<u8> {
    let route = screen_for(route);
    navigation()
        .iter()
        .position(|r| *r == route)
        .and_then(|i| u8::try_from(i + 1).ok())
}

/// Next tab-bar route, wrapping. Routes outside the bar start at the first.
pub fn next(route: Route) -> Route {
    let nav = navigation();
    let next = number(route).map_or(0, |n| usize::from(n) % nav.len());
    nav.get(next).copied().unwrap_or(Route::Dashboard)
}

pub fn prev(route: Route) -> Route {
    let nav = navigation();
    let prev = number(route).map_or(0, |n| (usize::from(n) + nav.len() - 2) % nav.len());
    nav.get(prev).copied().unwrap_or(Route::Dashboard)
}
