//! Declarative forms.
//!
//! A form is a list of [`FieldConfig`]s, a validation [`Schema`] and the
//! current [`FormValues`]. [`FormState`] ties them together and runs the
//! submit contract: validate everything, and call the submit callback only
//! when every field passes.

mod schema;
mod state;

use std::str::FromStr;

use chrono::NaiveDate;
use indexmap::IndexMap;

pub use schema::{FieldRules, Rule, Schema};
pub use state::{FormState, SubmitOutcome};

/// Name of the form-level error slot.
pub const SUBMIT_SLOT: &str = "submit";

// ── Field declarations ──────────────────────────────────────────────

/// Input widget kind of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Password,
    TextArea,
    /// `YYYY-MM-DD`.
    Date,
    Boolean,
    Enum,
}

/// One choice of an [`FieldKind::Enum`] field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldOption {
    pub value: String,
    pub label: String,
}

impl FieldOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// A declared form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldConfig {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub options: Vec<FieldOption>,
}

impl FieldConfig {
    fn of(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            kind,
            options: Vec::new(),
        }
    }

    pub fn text(name: &'static str, label: &'static str) -> Self {
        Self::of(name, label, FieldKind::Text)
    }

    pub fn number(name: &'static str, label: &'static str) -> Self {
        Self::of(name, label, FieldKind::Number)
    }

    pub fn password(name: &'static str, label: &'static str) -> Self {
        Self::of(name, label, FieldKind::Password)
    }

    pub fn textarea(name: &'static str, label: &'static str) -> Self {
        Self::of(name, label, FieldKind::TextArea)
    }

    pub fn date(name: &'static str, label: &'static str) -> Self {
        Self::of(name, label, FieldKind::Date)
    }

    pub fn boolean(name: &'static str, label: &'static str) -> Self {
        Self::of(name, label, FieldKind::Boolean)
    }

    pub fn enumeration(
        name: &'static str,
        label: &'static str,
        options: impl IntoIterator<Item = FieldOption>,
    ) -> Self {
        Self {
            options: options.into_iter().collect(),
            ..Self::of(name, label, FieldKind::Enum)
        }
    }

    /// Value an empty form starts with for this field.
    pub fn empty_value(&self) -> FieldValue {
        match self.kind {
            FieldKind::Boolean => FieldValue::Bool(false),
            FieldKind::Enum => FieldValue::Text(
                self.options
                    .first()
                    .map(|o| o.value.clone())
                    .unwrap_or_default(),
            ),
            _ => FieldValue::Text(String::new()),
        }
    }

    /// Label of the option whose value is `value`.
    pub fn option_label(&self, value: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|o| o.value == value)
            .map(|o| o.label.as_str())
    }
}

// ── Values ──────────────────────────────────────────────────────────

/// Current value of a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Bool(bool),
}

impl FieldValue {
    fn raw(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Bool(b) => b.to_string(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// Field values keyed by field name, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues(IndexMap<String, FieldValue>);

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: &str, value: impl Into<FieldValue>) {
        self.0.insert(name.to_owned(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// String form of a value; empty when absent.
    pub fn raw(&self, name: &str) -> String {
        self.0.get(name).map(FieldValue::raw).unwrap_or_default()
    }

    /// Text value as typed; empty for absent or boolean fields.
    pub fn text(&self, name: &str) -> &str {
        match self.0.get(name) {
            Some(FieldValue::Text(s)) => s,
            _ => "",
        }
    }

    /// Trimmed text, or `None` when blank.
    pub fn optional_text(&self, name: &str) -> Option<String> {
        let trimmed = self.text(name).trim();
        (!trimmed.is_empty()).then(|| trimmed.to_owned())
    }

    pub fn bool(&self, name: &str) -> bool {
        matches!(self.0.get(name), Some(FieldValue::Bool(true)))
    }

    /// Parsed number, or `None` when blank or unparseable.
    pub fn number<T: FromStr>(&self, name: &str) -> Option<T> {
        self.text(name).trim().parse().ok()
    }

    /// Parsed `YYYY-MM-DD` date, or `None` when blank or invalid.
    pub fn date(&self, name: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.text(name).trim(), "%Y-%m-%d").ok()
    }
}

impl<'a> FromIterator<(&'a str, FieldValue)> for FormValues {
    fn from_iter<I: IntoIterator<Item = (&'a str, FieldValue)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.to_owned(), v))
                .collect(),
        )
    }
}
