//! Dashboard summary.

use std::fmt::Write as _;

use warden_core::{Console, ConsoleConfig, DashboardSummary};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::util;

fn summary_detail(s: &DashboardSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Critical rules:  {}", s.critical_rules_total);
    for (action, count) in &s.critical_by_action {
        let _ = writeln!(
            out,
            "  {:<6}         {count} ({:.0}%)",
            action.label(),
            s.critical_share(*action)
        );
    }
    let _ = writeln!(out, "Firewall rules:  {}", s.firewall_rules_total);
    for (action, count) in &s.firewall_by_action {
        let _ = writeln!(out, "  {:<6}         {count}", action.label());
    }
    let more = if s.users_more { "+" } else { "" };
    let _ = writeln!(out, "Users:           {}{more}", s.users_total);
    let _ = writeln!(out, "  Active         {}", s.active_users);
    let _ = write!(out, "  Inactive       {}", s.inactive_users);
    if s.partial {
        let _ = write!(out, "\n\nBreakdowns cover the most recent rows only.");
    }
    out
}

pub async fn handle(config: &ConsoleConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let spinner = util::spinner(global, "Collecting figures...");
    let result =
        Console::oneshot(config, |console| async move { console.dashboard().await }).await;
    spinner.finish_and_clear();
    let summary = result?;

    let out = output::render_single(&global.output, &summary, summary_detail, |s| {
        format!(
            "{} {} {}",
            s.critical_rules_total, s.firewall_rules_total, s.users_total
        )
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
