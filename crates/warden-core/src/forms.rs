//! Resource forms.
//!
//! Field declarations, validation rules and initial values for each
//! resource dialog, plus the translation of submitted [`FormValues`] into
//! API payloads. Update payloads only carry fields whose value changed.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use secrecy::SecretString;
use strum::IntoEnumIterator;
use warden_api::{
    Action, CriticalRule, CriticalRuleCreate, CriticalRuleUpdate, User, UserCreate, UserUpdate,
};

use crate::error::CoreError;
use crate::form::{FieldConfig, FieldOption, FieldRules, FormState, FormValues, Schema};

const NO_UPDATES: &str = "No updates provided";
const MAX_PORT: i64 = 65535;

// ── Critical rules ──────────────────────────────────────────────────

/// Fields of the critical-rule dialogs, in display order.
pub fn critical_rule_fields() -> Vec<FieldConfig> {
    vec![
        FieldConfig::text("title", "Title"),
        FieldConfig::enumeration(
            "action",
            "Action",
            Action::iter().map(|a| FieldOption::new(a.to_string(), a.label())),
        ),
        FieldConfig::text("protocol", "Protocol"),
        FieldConfig::text("srcAddress", "Source Address"),
        FieldConfig::text("desAddress", "Destination Address"),
        FieldConfig::number("srcPort", "Source Port"),
        FieldConfig::number("desPort", "Destination Port"),
        FieldConfig::number("natSrcPort", "NAT Source Port"),
        FieldConfig::number("natDesPort", "NAT Destination Port"),
        FieldConfig::date("startTime", "Start Time"),
        FieldConfig::date("endTime", "End Time"),
        FieldConfig::textarea("description", "Description"),
    ]
}

fn port(rules: FieldRules, label: &str) -> FieldRules {
    rules.label(label).integer(0, MAX_PORT)
}

fn critical_rule_schema(title_required: bool) -> Schema {
    Schema::new()
        .field("title", |f| {
            let f = f.label("Title");
            let f = if title_required { f.required() } else { f };
            f.max_len(100)
        })
        .field("action", |f| {
            f.label("Action")
                .required()
                .one_of(Action::iter().map(|a| a.to_string()))
        })
        .field("protocol", |f| f.label("Protocol").max_len(250))
        .field("srcAddress", |f| f.label("Source Address").max_len(250))
        .field("desAddress", |f| f.label("Destination Address").max_len(250))
        .field("srcPort", |f| port(f, "Source Port"))
        .field("desPort", |f| port(f, "Destination Port"))
        .field("natSrcPort", |f| port(f, "NAT Source Port"))
        .field("natDesPort", |f| port(f, "NAT Destination Port"))
        .field("startTime", |f| f.label("Start Time").date())
        .field("endTime", |f| f.label("End Time").date())
        .field("description", |f| f.label("Description").max_len(400))
}

pub fn critical_rule_create_form() -> FormState {
    FormState::new(
        "Create Critical Rule",
        critical_rule_fields(),
        critical_rule_schema(true),
        &FormValues::new(),
    )
}

fn action_value(values: &FormValues) -> Result<Action, CoreError> {
    values
        .text("action")
        .parse()
        .map_err(|_| CoreError::validation(format!("Unknown action: {}", values.text("action"))))
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn date_string(ts: Option<DateTime<Utc>>) -> String {
    ts.map(|t| t.date_naive().format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn number_string(n: Option<u16>) -> String {
    n.map(|n| n.to_string()).unwrap_or_default()
}

/// Body of a create request from a validated form.
pub fn critical_rule_create_payload(values: &FormValues) -> Result<CriticalRuleCreate, CoreError> {
    Ok(CriticalRuleCreate {
        title: values.text("title").trim().to_owned(),
        action: action_value(values)?,
        protocol: values.optional_text("protocol"),
        src_address: values.optional_text("srcAddress"),
        des_address: values.optional_text("desAddress"),
        src_port: values.number("srcPort"),
        des_port: values.number("desPort"),
        nat_src_port: values.number("natSrcPort"),
        nat_des_port: values.number("natDesPort"),
        description: values.optional_text("description"),
        start_time: values.date("startTime").map(midnight),
        end_time: values.date("endTime").map(midnight),
    })
}

/// Update dialog pre-filled from `rule`.
pub fn critical_rule_update_form(rule: &CriticalRule) -> FormState {
    let initial = FormValues::new()
        .with("title", rule.title.clone())
        .with("action", rule.action.to_string())
        .with("protocol", rule.protocol.clone().unwrap_or_default())
        .with("srcAddress", rule.src_address.clone().unwrap_or_default())
        .with("desAddress", rule.des_address.clone().unwrap_or_default())
        .with("srcPort", number_string(rule.src_port))
        .with("desPort", number_string(rule.des_port))
        .with("natSrcPort", number_string(rule.nat_src_port))
        .with("natDesPort", number_string(rule.nat_des_port))
        .with("startTime", date_string(rule.start_time))
        .with("endTime", date_string(rule.end_time))
        .with("description", rule.description.clone().unwrap_or_default());
    FormState::new(
        format!("Update Critical Rule #{}", rule.id),
        critical_rule_fields(),
        critical_rule_schema(false),
        &initial,
    )
}

/// `Some(new)` when `new` is set and differs from `old`. Cleared values are
/// not sent; the backend ignores absent fields.
fn changed<T: PartialEq>(old: Option<&T>, new: Option<T>) -> Option<T> {
    new.filter(|n| old != Some(n))
}

/// Body of an update request carrying only what changed.
///
/// Fails with "No updates provided" when nothing did.
pub fn critical_rule_update_payload(
    rule: &CriticalRule,
    values: &FormValues,
) -> Result<CriticalRuleUpdate, CoreError> {
    let update = CriticalRuleUpdate {
        title: changed(Some(&rule.title), values.optional_text("title")),
        action: changed(Some(&rule.action), Some(action_value(values)?)),
        protocol: changed(rule.protocol.as_ref(), values.optional_text("protocol")),
        src_address: changed(rule.src_address.as_ref(), values.optional_text("srcAddress")),
        des_address: changed(rule.des_address.as_ref(), values.optional_text("desAddress")),
        src_port: changed(rule.src_port.as_ref(), values.number("srcPort")),
        des_port: changed(rule.des_port.as_ref(), values.number("desPort")),
        nat_src_port: changed(rule.nat_src_port.as_ref(), values.number("natSrcPort")),
        nat_des_port: changed(rule.nat_des_port.as_ref(), values.number("natDesPort")),
        description: changed(rule.description.as_ref(), values.optional_text("description")),
        start_time: changed(
            rule.start_time.map(|t| t.date_naive()).as_ref(),
            values.date("startTime"),
        )
        .map(midnight),
        end_time: changed(
            rule.end_time.map(|t| t.date_naive()).as_ref(),
            values.date("endTime"),
        )
        .map(midnight),
    };
    if update.has_updates() {
        Ok(update)
    } else {
        Err(CoreError::validation(NO_UPDATES))
    }
}

// ── Users ───────────────────────────────────────────────────────────

fn user_create_schema() -> Schema {
    Schema::new()
        .field("email", |f| {
            f.required()
                .message("Email is required")
                .email()
                .message("Must be a valid email")
                .max_len(255)
        })
        .field("username", |f| {
            f.required().message("Username is required").max_len(255)
        })
        .field("firstName", |f| {
            f.required().message("First name is required").max_len(255)
        })
        .field("lastName", |f| {
            f.required().message("Last name is required").max_len(255)
        })
        .field("password", |f| {
            f.required().message("Password is required").max_len(255)
        })
}

pub fn user_create_form() -> FormState {
    FormState::new(
        "Create User",
        vec![
            FieldConfig::text("email", "Email"),
            FieldConfig::text("username", "Username"),
            FieldConfig::text("firstName", "First Name"),
            FieldConfig::text("lastName", "Last Name"),
            FieldConfig::password("password", "Password"),
        ],
        user_create_schema(),
        &FormValues::new(),
    )
}

/// Body of a create request. New users start active.
pub fn user_create_payload(values: &FormValues) -> UserCreate {
    UserCreate {
        email: values.text("email").trim().to_owned(),
        username: values.text("username").trim().to_owned(),
        first_name: values.text("firstName").trim().to_owned(),
        last_name: values.text("lastName").trim().to_owned(),
        password: values.text("password").to_owned(),
        active: true,
    }
}

fn user_update_schema() -> Schema {
    Schema::new()
        .field("email", |f| {
            f.email().message("Must be a valid email").max_len(255)
        })
        .field("firstName", |f| f.label("First name").max_len(255))
        .field("lastName", |f| f.label("Last name").max_len(255))
        .field("password", |f| f.label("Password").max_len(255))
}

/// Update dialog pre-filled from `user`. The password starts blank and is
/// only sent when typed.
pub fn user_update_form(user: &User) -> FormState {
    let initial = FormValues::new()
        .with("email", user.email.clone())
        .with("firstName", user.first_name.clone())
        .with("lastName", user.last_name.clone())
        .with("password", "");
    FormState::new(
        format!("Update User {}", user.username),
        vec![
            FieldConfig::text("email", "Email"),
            FieldConfig::text("firstName", "First Name"),
            FieldConfig::text("lastName", "Last Name"),
            FieldConfig::password("password", "New Password"),
        ],
        user_update_schema(),
        &initial,
    )
}

/// Body of a user update carrying only what changed.
pub fn user_update_payload(user: &User, values: &FormValues) -> Result<UserUpdate, CoreError> {
    let password = values.text("password");
    let update = UserUpdate {
        email: changed(Some(&user.email), values.optional_text("email")),
        first_name: changed(Some(&user.first_name), values.optional_text("firstName")),
        last_name: changed(Some(&user.last_name), values.optional_text("lastName")),
        password: (!password.is_empty()).then(|| password.to_owned()),
        ..UserUpdate::default()
    };
    if update.has_updates() {
        Ok(update)
    } else {
        Err(CoreError::validation(NO_UPDATES))
    }
}

// ── Login ───────────────────────────────────────────────────────────

pub fn login_form() -> FormState {
    FormState::new(
        "Sign in",
        vec![
            FieldConfig::text("username", "Username or Email"),
            FieldConfig::password("password", "Password"),
        ],
        Schema::new()
            .field("username", |f| f.required().message("Username is required"))
            .field("password", |f| f.required().message("Password is required")),
        &FormValues::new(),
    )
}

/// Credentials from a validated login form.
pub fn login_credentials(values: &FormValues) -> (String, SecretString) {
    (
        values.text("username").trim().to_owned(),
        SecretString::from(values.text("password").to_owned()),
    )
}
