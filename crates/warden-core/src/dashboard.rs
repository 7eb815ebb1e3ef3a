// ── Dashboard figures ──
//
// Counts shown on the dashboard, computed from the first page of each list
// endpoint. Totals come from the backend; per-action and per-state
// breakdowns cover the rows fetched.

use indexmap::IndexMap;
use serde::Serialize;
use strum::IntoEnumIterator;
use warden_api::{Action, CriticalRule, FirewallRule, Page, User};

/// Rows fetched per list when building the dashboard.
pub const DASHBOARD_SAMPLE: u32 = 150;

/// Summary figures for the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub critical_rules_total: u64,
    /// Critical rules per action, every action present.
    pub critical_by_action: IndexMap<Action, u64>,
    pub firewall_rules_total: u64,
    pub firewall_by_action: IndexMap<Action, u64>,
    /// Users seen. A lower bound when `users_more` is set.
    pub users_total: u64,
    /// The user list reports no total and the sample came back full.
    pub users_more: bool,
    pub active_users: u64,
    pub inactive_users: u64,
    /// `true` when a breakdown covers only part of its list.
    pub partial: bool,
}

fn by_action(actions: impl Iterator<Item = Action>) -> IndexMap<Action, u64> {
    let mut counts: IndexMap<Action, u64> = Action::iter().map(|a| (a, 0)).collect();
    for action in actions {
        *counts.entry(action).or_default() += 1;
    }
    counts
}

/// The sample holds the whole list. Without a total, only a short sample
/// proves that.
fn covers<T>(page: &Page<T>) -> bool {
    let received = u64::try_from(page.data.len()).unwrap_or(u64::MAX);
    if page.total_known {
        received >= page.total
    } else {
        received < u64::from(DASHBOARD_SAMPLE)
    }
}

impl DashboardSummary {
    pub fn from_pages(
        critical: &Page<CriticalRule>,
        firewall: &Page<FirewallRule>,
        users: &Page<User>,
    ) -> Self {
        let active = users.data.iter().filter(|u| u.active).count();
        let inactive = users.data.len() - active;
        Self {
            critical_rules_total: critical.total,
            critical_by_action: by_action(critical.data.iter().map(|r| r.action)),
            firewall_rules_total: firewall.total,
            firewall_by_action: by_action(firewall.data.iter().map(|r| r.action)),
            users_total: users.total,
            users_more: !covers(users) && !users.total_known,
            active_users: u64::try_from(active).unwrap_or(u64::MAX),
            inactive_users: u64::try_from(inactive).unwrap_or(u64::MAX),
            partial: !(covers(critical) && covers(firewall) && covers(users)),
        }
    }

    /// Share of critical rules with `action`, in percent of the rows seen.
    #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
    pub fn critical_share(&self, action: Action) -> f64 {
        let seen: u64 = self.critical_by_action.values().sum();
        if seen == 0 {
            return 0.0;
        }
        let count = self.critical_by_action.get(&action).copied().unwrap_or(0);
        count as f64 * 100.0 / seen as f64
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    use super::*;

    fn rule(id: i64, action: Action) -> CriticalRule {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        CriticalRule {
            id,
            protocol: None,
            src_address: None,
            des_address: None,
            src_port: None,
            des_port: None,
            nat_src_port: None,
            nat_des_port: None,
            action,
            title: format!("rule {id}"),
            description: None,
            start_time: None,
            end_time: None,
            created_at: ts,
            updated_at: ts,
        }
    }

    fn user(id: i64, active: bool) -> User {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        User {
            id,
            username: format!("u{id}"),
            email: format!("u{id}@example.com"),
            first_name: "U".into(),
            last_name: id.to_string(),
            active,
            last_login: None,
            login_attempts: 0,
            created_at: ts,
            updated_at: ts,
        }
    }

    #[test]
    fn counts_by_action_and_state() {
        let critical = Page::new(
            vec![rule(1, Action::Block), rule(2, Action::Block), rule(3, Action::Drop)],
            3,
        );
        let users = Page::new(vec![user(1, true), user(2, false), user(3, true)], 3);
        let summary = DashboardSummary::from_pages(&critical, &Page::empty(), &users);

        assert_eq!(summary.critical_rules_total, 3);
        assert_eq!(summary.critical_by_action[&Action::Allow], 0);
        assert_eq!(summary.critical_by_action[&Action::Block], 2);
        assert_eq!(summary.critical_by_action[&Action::Drop], 1);
        assert_eq!((summary.active_users, summary.inactive_users), (2, 1));
        assert!(!summary.partial);
        assert!((summary.critical_share(Action::Block) - 66.666).abs() < 0.01);
    }

    #[test]
    fn partial_when_totals_exceed_rows() {
        let critical = Page::new(vec![rule(1, Action::Allow)], 400);
        let summary = DashboardSummary::from_pages(&critical, &Page::empty(), &Page::empty());
        assert!(summary.partial);
        assert!(!summary.users_more);
        assert!(DashboardSummary::default().critical_share(Action::Drop).abs() < f64::EPSILON);
    }

    #[test]
    fn full_user_sample_without_total_is_partial() {
        let sample = usize::try_from(DASHBOARD_SAMPLE).unwrap();
        let users = Page::unbounded((1..=150).map(|id| user(id, id % 2 == 0)).collect());
        assert_eq!(users.data.len(), sample);

        let summary = DashboardSummary::from_pages(&Page::empty(), &Page::empty(), &users);
        assert!(summary.partial);
        assert!(summary.users_more);
        assert_eq!(summary.users_total, 150);

        let few = Page::unbounded(vec![user(1, true), user(2, false)]);
        let summary = DashboardSummary::from_pages(&Page::empty(), &Page::empty(), &few);
        assert!(!summary.partial);
        assert!(!summary.users_more);
        assert_eq!(summary.users_total, 2);
    }
}
