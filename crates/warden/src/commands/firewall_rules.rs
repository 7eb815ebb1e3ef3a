//! Firewall rule command handlers (read-only).

use tabled::Tabled;

use warden_core::{Console, ConsoleConfig, FirewallRule};

use crate::cli::{FirewallRulesArgs, FirewallRulesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct FirewallRuleRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Protocol")]
    protocol: String,
    #[tabled(rename = "Src Address")]
    src_address: String,
    #[tabled(rename = "Src Port")]
    src_port: String,
    #[tabled(rename = "Dst Address")]
    des_address: String,
    #[tabled(rename = "Dst Port")]
    des_port: String,
    #[tabled(rename = "Created")]
    created: String,
}

impl FirewallRuleRow {
    fn new(r: &FirewallRule, color: bool) -> Self {
        let port = |p: Option<u16>| p.map_or_else(|| "-".into(), |p| p.to_string());
        Self {
            id: r.id,
            action: output::action_cell(r.action, color),
            protocol: util::or_dash(r.protocol.as_deref()).to_owned(),
            src_address: util::or_dash(r.src_address.as_deref()).to_owned(),
            src_port: port(r.src_port),
            des_address: util::or_dash(r.des_address.as_deref()).to_owned(),
            des_port: port(r.des_port),
            created: r.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

pub async fn handle(
    args: FirewallRulesArgs,
    config: &ConsoleConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        FirewallRulesCommand::List(page) => {
            let spinner = util::spinner(global, "Loading firewall rules...");
            let result = Console::oneshot(config, |console| async move {
                util::fetch_page(&page, |m| console.list_firewall_rules(m)).await
            })
            .await;
            spinner.finish_and_clear();
            let paginator = result?;

            let color = output::should_color(&global.color);
            util::print_page(
                global,
                &paginator,
                |r| FirewallRuleRow::new(r, color),
                |r| r.id.to_string(),
            )
        }
    }
}
