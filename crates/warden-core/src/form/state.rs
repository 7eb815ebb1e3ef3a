// Live form state: values, touched fields, errors and the submit slot.

use std::collections::HashSet;
use std::future::Future;

use indexmap::IndexMap;
use tracing::debug;

use super::{FieldConfig, FieldKind, FieldValue, FormValues, Schema};
use crate::error::CoreError;

/// Result of a submit attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome<T> {
    /// At least one field failed validation; nothing was sent.
    Invalid,
    /// The submit callback failed; the message is in the submit slot.
    Failed(String),
    Submitted(T),
}

impl<T> SubmitOutcome<T> {
    pub fn is_submitted(&self) -> bool {
        matches!(self, Self::Submitted(_))
    }
}

/// A form being edited.
#[derive(Debug, Clone)]
pub struct FormState {
    title: String,
    fields: Vec<FieldConfig>,
    schema: Schema,
    initial: FormValues,
    values: FormValues,
    touched: HashSet<String>,
    errors: IndexMap<String, String>,
    submit_error: Option<String>,
    submitting: bool,
}

impl FormState {
    /// Build a form. Fields missing from `initial` start empty.
    pub fn new(
        title: impl Into<String>,
        fields: Vec<FieldConfig>,
        schema: Schema,
        initial: &FormValues,
    ) -> Self {
        let values: FormValues = fields
            .iter()
            .map(|f| {
                let value = initial
                    .get(f.name)
                    .cloned()
                    .unwrap_or_else(|| f.empty_value());
                (f.name, value)
            })
            .collect();
        Self {
            title: title.into(),
            fields,
            schema,
            initial: values.clone(),
            values,
            touched: HashSet::new(),
            errors: IndexMap::new(),
            submit_error: None,
            submitting: false,
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn fields(&self) -> &[FieldConfig] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldConfig> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.schema.rules(name).is_some_and(super::FieldRules::is_required)
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// `true` once any value differs from the initial values.
    pub fn is_dirty(&self) -> bool {
        self.values != self.initial
    }

    // ── Editing ──────────────────────────────────────────────────────

    /// Change a value and revalidate that field.
    pub fn set_value(&mut self, name: &str, value: impl Into<FieldValue>) {
        self.values.set(name, value);
        self.revalidate(name);
    }

    /// Flip a boolean field.
    pub fn toggle(&mut self, name: &str) {
        let current = self.values.bool(name);
        self.set_value(name, !current);
    }

    /// Move an enum field to the next (or previous) option, wrapping.
    pub fn cycle_option(&mut self, name: &str, forward: bool) {
        let Some(field) = self.field(name) else {
            return;
        };
        if field.kind != FieldKind::Enum || field.options.is_empty() {
            return;
        }
        let len = field.options.len();
        let current = self.values.text(name);
        let pos = field.options.iter().position(|o| o.value == current);
        let next = match (pos, forward) {
            (None, _) => 0,
            (Some(i), true) => (i + 1) % len,
            (Some(i), false) => (i + len - 1) % len,
        };
        if let Some(option) = field.options.get(next) {
            let value = option.value.clone();
            self.set_value(name, value);
        }
    }

    /// Mark a field as visited so its error becomes visible.
    pub fn blur(&mut self, name: &str) {
        self.touched.insert(name.to_owned());
        self.revalidate(name);
    }

    fn revalidate(&mut self, name: &str) {
        let raw = self.values.raw(name);
        match self.schema.validate_field(name, &raw) {
            Some(msg) => {
                self.errors.insert(name.to_owned(), msg);
            }
            None => {
                self.errors.shift_remove(name);
            }
        }
    }

    /// Restore the initial values and clear every error.
    pub fn reset(&mut self) {
        self.values = self.initial.clone();
        self.touched.clear();
        self.errors.clear();
        self.submit_error = None;
        self.submitting = false;
    }

    // ── Errors ───────────────────────────────────────────────────────

    /// Current error of a field, visible only once the field is touched.
    pub fn visible_error(&self, name: &str) -> Option<&str> {
        if self.touched.contains(name) {
            self.errors.get(name).map(String::as_str)
        } else {
            None
        }
    }

    /// Form-level error from the last submit.
    pub fn submit_error(&self) -> Option<&str> {
        self.submit_error.as_deref()
    }

    /// All failing fields after the last full validation, in schema order.
    pub fn errors(&self) -> &IndexMap<String, String> {
        &self.errors
    }

    /// Touch every field and validate the whole form.
    pub fn validate(&mut self) -> bool {
        self.touched
            .extend(self.fields.iter().map(|f| f.name.to_owned()));
        self.errors = self.schema.validate(&self.values);
        self.errors.is_empty()
    }

    // ── Submit ───────────────────────────────────────────────────────

    /// Validate and hand out the values to send, or `None` when invalid
    /// or a submit is already running.
    pub fn begin_submit(&mut self) -> Option<FormValues> {
        if self.submitting {
            debug!(form = %self.title, "submit already in progress");
            return None;
        }
        if !self.validate() {
            debug!(form = %self.title, errors = self.errors.len(), "form invalid");
            return None;
        }
        self.submitting = true;
        self.submit_error = None;
        Some(self.values.clone())
    }

    /// Record the result of a submit started with [`begin_submit`](Self::begin_submit).
    pub fn finish_submit<T>(&mut self, result: Result<T, CoreError>) -> SubmitOutcome<T> {
        self.submitting = false;
        match result {
            Ok(value) => {
                self.submit_error = None;
                SubmitOutcome::Submitted(value)
            }
            Err(e) => {
                let message = e.display_message();
                self.submit_error = Some(message.clone());
                SubmitOutcome::Failed(message)
            }
        }
    }

    /// Validate, then call `f` once with the values. `f` never runs when a
    /// field is invalid.
    pub async fn submit<F, Fut, T>(&mut self, f: F) -> SubmitOutcome<T>
    where
        F: FnOnce(FormValues) -> Fut,
        Fut: Future<Output = Result<T, CoreError>>,
    {
        let Some(values) = self.begin_submit() else {
            return SubmitOutcome::Invalid;
        };
        let result = f(values).await;
        self.finish_submit(result)
    }
}
