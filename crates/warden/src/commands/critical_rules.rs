//! Critical rule command handlers.

use chrono::{DateTime, Utc};
use tabled::Tabled;

use warden_core::forms::{
    critical_rule_create_form, critical_rule_create_payload, critical_rule_update_form,
    critical_rule_update_payload,
};
use warden_core::{
    Command as CoreCommand, CommandResult, Console, ConsoleConfig, CriticalRule, FormState,
};

use crate::cli::{GlobalOpts, PageArgs, RuleAction, RuleFields, RulesArgs, RulesCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct RuleRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Protocol")]
    protocol: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Destination")]
    destination: String,
    #[tabled(rename = "NAT Ports")]
    nat_ports: String,
    #[tabled(rename = "Start")]
    start: String,
    #[tabled(rename = "End")]
    end: String,
    #[tabled(rename = "Updated")]
    updated: String,
}

/// `address:port`, either side optional.
fn endpoint(address: Option<&str>, port: Option<u16>) -> String {
    match (address, port) {
        (Some(a), Some(p)) => format!("{a}:{p}"),
        (Some(a), None) => a.to_owned(),
        (None, Some(p)) => format!("*:{p}"),
        (None, None) => "*".into(),
    }
}

fn day(ts: Option<DateTime<Utc>>) -> String {
    ts.map_or_else(|| "-".into(), |t| t.format("%Y-%m-%d").to_string())
}

fn port(p: Option<u16>) -> String {
    p.map_or_else(|| "-".into(), |p| p.to_string())
}

impl RuleRow {
    fn new(r: &CriticalRule, color: bool) -> Self {
        Self {
            id: r.id,
            title: r.title.clone(),
            action: output::action_cell(r.action, color),
            protocol: util::or_dash(r.protocol.as_deref()).to_owned(),
            source: endpoint(r.src_address.as_deref(), r.src_port),
            destination: endpoint(r.des_address.as_deref(), r.des_port),
            nat_ports: format!("{} → {}", port(r.nat_src_port), port(r.nat_des_port)),
            start: day(r.start_time),
            end: day(r.end_time),
            updated: r.updated_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

fn rule_detail(r: &CriticalRule) -> String {
    [
        format!("ID:           {}", r.id),
        format!("Title:        {}", r.title),
        format!("Action:       {}", r.action.label()),
        format!("Protocol:     {}", util::or_dash(r.protocol.as_deref())),
        format!("Source:       {}", endpoint(r.src_address.as_deref(), r.src_port)),
        format!("Destination:  {}", endpoint(r.des_address.as_deref(), r.des_port)),
        format!("NAT Src Port: {}", port(r.nat_src_port)),
        format!("NAT Dst Port: {}", port(r.nat_des_port)),
        format!("Start:        {}", day(r.start_time)),
        format!("End:          {}", day(r.end_time)),
        format!("Description:  {}", util::or_dash(r.description.as_deref())),
        format!("Created:      {}", r.created_at.format("%Y-%m-%d %H:%M")),
        format!("Updated:      {}", r.updated_at.format("%Y-%m-%d %H:%M")),
    ]
    .join("\n")
}

/// Flag values keyed by form field name.
fn field_values(fields: &RuleFields) -> [(&'static str, Option<&str>); 12] {
    [
        ("title", fields.title.as_deref()),
        ("action", fields.action.map(RuleAction::as_str)),
        ("protocol", fields.protocol.as_deref()),
        ("srcAddress", fields.src_address.as_deref()),
        ("desAddress", fields.des_address.as_deref()),
        ("srcPort", fields.src_port.as_deref()),
        ("desPort", fields.des_port.as_deref()),
        ("natSrcPort", fields.nat_src_port.as_deref()),
        ("natDesPort", fields.nat_des_port.as_deref()),
        ("startTime", fields.start_time.as_deref()),
        ("endTime", fields.end_time.as_deref()),
        ("description", fields.description.as_deref()),
    ]
}

fn filled(mut form: FormState, fields: &RuleFields) -> FormState {
    util::fill(&mut form, &field_values(fields));
    form
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    args: RulesArgs,
    config: &ConsoleConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        RulesCommand::List(page) => list(page, config, global).await,

        RulesCommand::Create(fields) => {
            // Invalid input never reaches the backend
            let mut form = filled(critical_rule_create_form(), &fields);
            let values = util::validated(&mut form)?;
            let payload = critical_rule_create_payload(&values)?;

            let result = Console::oneshot(config, |console| async move {
                console
                    .execute(CoreCommand::CreateCriticalRule(payload))
                    .await
            })
            .await?;
            if let CommandResult::CriticalRule(rule) = result {
                let out = output::render_single(&global.output, &rule, rule_detail, |r| {
                    r.id.to_string()
                })?;
                output::print_output(&out, global.quiet);
            }
            Ok(())
        }

        RulesCommand::Update { id, fields } => {
            let result = Console::oneshot(config, |console| async move {
                let rule = console.find_critical_rule(id).await?;
                let mut form = filled(critical_rule_update_form(&rule), &fields);
                let values = util::validated(&mut form)?;
                let update = critical_rule_update_payload(&rule, &values)?;
                console
                    .execute(CoreCommand::UpdateCriticalRule { id, update })
                    .await
                    .map_err(CliError::from)
            })
            .await?;
            if let CommandResult::CriticalRule(rule) = result {
                let out = output::render_single(&global.output, &rule, rule_detail, |r| {
                    r.id.to_string()
                })?;
                output::print_output(&out, global.quiet);
            }
            Ok(())
        }

        RulesCommand::Delete { ids } => {
            let listed = ids
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            let prompt = format!("Delete {} critical rule(s): {listed}?", ids.len());
            if !util::confirm(&prompt, "rules delete", global.yes)? {
                return Ok(());
            }

            let result = Console::oneshot(config, |console| async move {
                console
                    .execute(CoreCommand::DeleteCriticalRules { ids })
                    .await
            })
            .await?;
            if let CommandResult::Deleted { ids } = result {
                if !global.quiet {
                    eprintln!("✓ Deleted {} critical rule(s)", ids.len());
                }
            }
            Ok(())
        }
    }
}

async fn list(
    page: PageArgs,
    config: &ConsoleConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let spinner = util::spinner(global, "Loading critical rules...");
    let result = Console::oneshot(config, |console| async move {
        util::fetch_page(&page, |m| console.list_critical_rules(m)).await
    })
    .await;
    spinner.finish_and_clear();
    let paginator = result?;

    let color = output::should_color(&global.color);
    util::print_page(
        global,
        &paginator,
        |r| RuleRow::new(r, color),
        |r| r.id.to_string(),
    )
}
