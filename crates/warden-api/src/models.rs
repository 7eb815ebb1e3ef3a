//! Wire types for the warden backend.
//!
//! All JSON uses camelCase field names. Stored records carry `id`,
//! `createdAt` and `updatedAt`; the backend emits naive UTC timestamps
//! (no offset), which [`timestamp`] accepts alongside RFC 3339.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumIter, EnumString};

// ── Pagination ───────────────────────────────────────────────────────

/// One page of a list endpoint: `{ "data": [...], "total": N }`.
///
/// Endpoints that answer with a bare JSON array are accepted too. Those
/// carry no total: `total` is then the number of rows received and
/// `total_known` is `false`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: u64,
    #[serde(skip)]
    pub total_known: bool,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, total: u64) -> Self {
        Self {
            data,
            total,
            total_known: true,
        }
    }

    /// A page from an endpoint that reports no total.
    pub fn unbounded(data: Vec<T>) -> Self {
        let total = u64::try_from(data.len()).unwrap_or(u64::MAX);
        Self {
            data,
            total,
            total_known: false,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), 0)
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self::empty()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PageRepr<T> {
    Envelope { data: Vec<T>, total: u64 },
    Bare(Vec<T>),
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Page<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match PageRepr::deserialize(deserializer)? {
            PageRepr::Envelope { data, total } => Self::new(data, total),
            PageRepr::Bare(data) => Self::unbounded(data),
        })
    }
}

// ── Rule action ──────────────────────────────────────────────────────

/// What a rule does with matching traffic.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Action {
    #[default]
    Allow,
    Block,
    Drop,
}

impl Action {
    /// Title-case label for display.
    pub fn label(self) -> &'static str {
        match self {
            Self::Allow => "Allow",
            Self::Block => "Block",
            Self::Drop => "Drop",
        }
    }
}

// ── Critical rules ───────────────────────────────────────────────────

/// Critical rule record, from `GET /critical-rules`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriticalRule {
    pub id: i64,
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default)]
    pub src_address: Option<String>,
    #[serde(default)]
    pub des_address: Option<String>,
    #[serde(default)]
    pub src_port: Option<u16>,
    #[serde(default)]
    pub des_port: Option<u16>,
    #[serde(default)]
    pub nat_src_port: Option<u16>,
    #[serde(default)]
    pub nat_des_port: Option<u16>,
    pub action: Action,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "timestamp::optional")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp::optional")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "timestamp::required")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "timestamp::required")]
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /critical-rules`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CriticalRuleCreate {
    pub protocol: Option<String>,
    pub src_address: Option<String>,
    pub des_address: Option<String>,
    pub src_port: Option<u16>,
    pub des_port: Option<u16>,
    pub nat_src_port: Option<u16>,
    pub nat_des_port: Option<u16>,
    pub action: Action,
    pub title: String,
    pub description: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

/// Body of `PUT /critical-rules/{id}`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CriticalRuleUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub des_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub des_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nat_src_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nat_des_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<Action>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
}

impl CriticalRuleUpdate {
    /// `true` when at least one field would change.
    pub fn has_updates(&self) -> bool {
        *self != Self::default()
    }
}

// ── Firewall rules ───────────────────────────────────────────────────

/// Firewall rule record, from `GET /firewall-rules`. Read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirewallRule {
    pub id: i64,
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default)]
    pub src_address: Option<String>,
    #[serde(default)]
    pub des_address: Option<String>,
    #[serde(default)]
    pub src_port: Option<u16>,
    #[serde(default)]
    pub des_port: Option<u16>,
    pub action: Action,
    #[serde(deserialize_with = "timestamp::required")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "timestamp::required")]
    pub updated_at: DateTime<Utc>,
}

// ── Users ────────────────────────────────────────────────────────────

/// User account, from `GET /users` and `GET /users/me`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub active: bool,
    #[serde(default, deserialize_with = "timestamp::optional")]
    pub last_login: Option<DateTime<Utc>>,
    #[serde(default)]
    pub login_attempts: u32,
    #[serde(deserialize_with = "timestamp::required")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "timestamp::required")]
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Body of `POST /users`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCreate {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub active: bool,
}

/// Body of `PUT /users/{id}`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl UserUpdate {
    /// `true` when at least one field would change.
    pub fn has_updates(&self) -> bool {
        *self != Self::default()
    }
}

// ── Timestamps ───────────────────────────────────────────────────────

/// Lenient timestamp parsing: RFC 3339, or naive `YYYY-MM-DDTHH:MM:SS[.f]`
/// interpreted as UTC.
pub mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, de::Error as _};

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
            .ok()
            .map(|naive| naive.and_utc())
    }

    pub fn required<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp: {raw:?}")))
    }

    pub fn optional<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) if raw.is_empty() => Ok(None),
            Some(raw) => parse(&raw)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid timestamp: {raw:?}"))),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn page_accepts_envelope_and_bare_array() {
        let envelope: Page<i64> = serde_json::from_value(json!({"data": [1, 2], "total": 40})).unwrap();
        assert_eq!(envelope, Page::new(vec![1, 2], 40));

        let bare: Page<i64> = serde_json::from_value(json!([1, 2, 3])).unwrap();
        assert_eq!(bare, Page::unbounded(vec![1, 2, 3]));
        assert_eq!(bare.total, 3);
        assert!(!bare.total_known);
        assert!(envelope.total_known);
    }

    #[test]
    fn naive_timestamps_are_utc() {
        let ts = timestamp::parse("2024-03-01T10:20:30.123456").unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-03-01T10:20:30.123456+00:00");
        assert!(timestamp::parse("2024-03-01T10:20:30Z").is_some());
        assert!(timestamp::parse("yesterday").is_none());
    }

    #[test]
    fn update_omits_absent_fields() {
        let update = CriticalRuleUpdate {
            title: Some("renamed".into()),
            des_port: Some(443),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({"title": "renamed", "desPort": 443})
        );
        assert!(update.has_updates());
        assert!(!CriticalRuleUpdate::default().has_updates());
    }

    #[test]
    fn action_parses_case_insensitively() {
        assert_eq!("BLOCK".parse::<Action>().unwrap(), Action::Block);
        assert_eq!(Action::Drop.to_string(), "drop");
        assert_eq!(Action::Drop.label(), "Drop");
    }
}
