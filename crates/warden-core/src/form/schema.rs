// Field validation rules.
//
// A `Schema` maps field names to ordered rule lists. Rules run in order and
// the first failure wins. Empty values only fail `Required`; every other
// rule skips them, so optional fields may be left blank.

use chrono::NaiveDate;
use indexmap::IndexMap;

use super::FormValues;

/// A single validation rule.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    Required,
    MaxLen(usize),
    Email,
    Integer { min: i64, max: i64 },
    /// `YYYY-MM-DD`.
    Date,
    OneOf(Vec<String>),
}

impl Rule {
    fn default_message(&self, label: &str) -> String {
        match self {
            Self::Required => format!("{label} is required"),
            Self::MaxLen(n) => format!("{label} must be at most {n} characters"),
            Self::Email => format!("{label} must be a valid email"),
            Self::Integer { min, max } => {
                format!("{label} must be a whole number between {min} and {max}")
            }
            Self::Date => format!("{label} must be a date (YYYY-MM-DD)"),
            Self::OneOf(values) => format!("{label} must be one of: {}", values.join(", ")),
        }
    }

    /// `true` when `value` passes. `Required` is the only rule that looks at
    /// empty values.
    fn check(&self, value: &str) -> bool {
        let value = value.trim();
        if value.is_empty() {
            return !matches!(self, Self::Required);
        }
        match self {
            Self::Required => true,
            Self::MaxLen(n) => value.chars().count() <= *n,
            Self::Email => is_email(value),
            Self::Integer { min, max } => value
                .parse::<i64>()
                .is_ok_and(|n| (*min..=*max).contains(&n)),
            Self::Date => NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok(),
            Self::OneOf(values) => values.iter().any(|v| v == value),
        }
    }
}

fn is_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !value.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

#[derive(Debug, Clone, PartialEq)]
struct CheckedRule {
    rule: Rule,
    message: Option<String>,
}

/// Rules for one field, built fluently.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldRules {
    label: Option<String>,
    rules: Vec<CheckedRule>,
}

impl FieldRules {
    fn push(mut self, rule: Rule) -> Self {
        self.rules.push(CheckedRule {
            rule,
            message: None,
        });
        self
    }

    /// Name used in default messages; the field name otherwise.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn required(self) -> Self {
        self.push(Rule::Required)
    }

    #[must_use]
    pub fn max_len(self, n: usize) -> Self {
        self.push(Rule::MaxLen(n))
    }

    #[must_use]
    pub fn email(self) -> Self {
        self.push(Rule::Email)
    }

    #[must_use]
    pub fn integer(self, min: i64, max: i64) -> Self {
        self.push(Rule::Integer { min, max })
    }

    #[must_use]
    pub fn date(self) -> Self {
        self.push(Rule::Date)
    }

    #[must_use]
    pub fn one_of<I, S>(self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(Rule::OneOf(values.into_iter().map(Into::into).collect()))
    }

    /// Override the message of the rule added last.
    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        if let Some(last) = self.rules.last_mut() {
            last.message = Some(message.into());
        }
        self
    }

    pub fn is_required(&self) -> bool {
        self.rules.iter().any(|r| r.rule == Rule::Required)
    }

    fn check(&self, name: &str, value: &str) -> Option<String> {
        let label = self.label.as_deref().unwrap_or(name);
        self.rules
            .iter()
            .find(|r| !r.rule.check(value))
            .map(|r| {
                r.message
                    .clone()
                    .unwrap_or_else(|| r.rule.default_message(label))
            })
    }
}

/// Validation rules for a whole form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    fields: IndexMap<String, FieldRules>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or extend) the rules of `name`.
    #[must_use]
    pub fn field(mut self, name: &str, build: impl FnOnce(FieldRules) -> FieldRules) -> Self {
        let existing = self.fields.shift_remove(name).unwrap_or_default();
        self.fields.insert(name.to_owned(), build(existing));
        self
    }

    pub fn rules(&self, name: &str) -> Option<&FieldRules> {
        self.fields.get(name)
    }

    /// Error for a single field value, if it fails.
    pub fn validate_field(&self, name: &str, value: &str) -> Option<String> {
        self.fields.get(name)?.check(name, value)
    }

    /// Errors for every failing field, in schema order. Boolean values are
    /// checked as `"true"`/`"false"`.
    pub fn validate(&self, values: &FormValues) -> IndexMap<String, String> {
        self.fields
            .iter()
            .filter_map(|(name, rules)| {
                let raw = values.raw(name);
                rules.check(name, &raw).map(|msg| (name.clone(), msg))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_rejects_blank() {
        let schema = Schema::new().field("title", |f| f.label("Title").required().max_len(5));
        assert_eq!(
            schema.validate_field("title", "   "),
            Some("Title is required".into())
        );
        assert_eq!(
            schema.validate_field("title", "toolong"),
            Some("Title must be at most 5 characters".into())
        );
        assert_eq!(schema.validate_field("title", "ok"), None);
    }

    #[test]
    fn optional_fields_accept_empty_values() {
        let schema = Schema::new()
            .field("srcPort", |f| f.integer(0, 65535))
            .field("startTime", |f| f.date());
        assert_eq!(schema.validate_field("srcPort", ""), None);
        assert_eq!(schema.validate_field("startTime", ""), None);
        assert!(schema.validate_field("srcPort", "70000").is_some());
        assert!(schema.validate_field("srcPort", "-1").is_some());
        assert!(schema.validate_field("startTime", "2024-02-30").is_some());
        assert_eq!(schema.validate_field("startTime", "2024-02-29"), None);
    }

    #[test]
    fn custom_message_overrides_default() {
        let schema = Schema::new().field("email", |f| {
            f.required()
                .message("Email is required")
                .email()
                .message("Must be a valid email")
        });
        assert_eq!(
            schema.validate_field("email", ""),
            Some("Email is required".into())
        );
        assert_eq!(
            schema.validate_field("email", "not-an-email"),
            Some("Must be a valid email".into())
        );
        assert_eq!(schema.validate_field("email", "a@b.io"), None);
    }

    #[test]
    fn email_shapes() {
        assert!(is_email("ops@example.com"));
        assert!(!is_email("ops@example"));
        assert!(!is_email("@example.com"));
        assert!(!is_email("a b@example.com"));
        assert!(!is_email("a@b@c.com"));
    }

    #[test]
    fn one_of_checks_membership() {
        let schema = Schema::new().field("action", |f| f.one_of(["allow", "block", "drop"]));
        assert_eq!(schema.validate_field("action", "drop"), None);
        assert_eq!(
            schema.validate_field("action", "reject"),
            Some("action must be one of: allow, block, drop".into())
        );
    }

    #[test]
    fn unknown_fields_have_no_rules() {
        assert_eq!(Schema::new().validate_field("anything", ""), None);
    }
}
