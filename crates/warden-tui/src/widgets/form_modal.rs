//! A [`FormState`] in a popup: one row per field, Tab to move, Enter to
//! submit, Esc to cancel.
//!
//! Text-like fields are edited through `tui-input`; booleans flip with
//! Space and enums cycle with ←/→. Field errors show under their field
//! once it was visited, and the submit slot sits above the key hints.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Position, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph};
use throbber_widgets_tui::{Throbber, ThrobberState};
use tui_input::{Input, InputRequest};
use warden_core::{CoreError, FieldConfig, FieldKind, FormState, FormValues, SubmitOutcome};

use crate::theme;

use super::centered;

const LABEL_WIDTH: u16 = 22;
const MAX_WIDTH: u16 = 76;
/// Focus marker, label column and the gap after it.
const VALUE_COLUMN: u16 = 2 + LABEL_WIDTH + 1;

/// What a key press did to the form.
#[derive(Debug, Clone, PartialEq)]
pub enum FormEvent {
    Ignored,
    Changed,
    Cancel,
    /// Every field passed; the caller sends these and reports back through
    /// [`FormModal::finish`].
    Submit(FormValues),
}

pub struct FormModal {
    form: FormState,
    inputs: Vec<Input>,
    focus: usize,
    throbber: ThrobberState,
}

impl FormModal {
    pub fn new(form: FormState) -> Self {
        let inputs = form
            .fields()
            .iter()
            .map(|f| Input::new(form.values().raw(f.name)))
            .collect();
        Self {
            form,
            inputs,
            focus: 0,
            throbber: ThrobberState::default(),
        }
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn is_submitting(&self) -> bool {
        self.form.is_submitting()
    }

    /// Replace a value from outside, keeping the editor in step.
    pub fn set_value(&mut self, name: &str, value: &str) {
        if let Some(idx) = self.form.fields().iter().position(|f| f.name == name) {
            self.form.set_value(name, value);
            if let Some(input) = self.inputs.get_mut(idx) {
                *input = Input::new(value.to_owned());
            }
        }
    }

    /// Move focus to the named field.
    pub fn focus_field(&mut self, name: &str) {
        if let Some(idx) = self.form.fields().iter().position(|f| f.name == name) {
            self.focus = idx;
        }
    }

    /// Record the result of a submit handed out as [`FormEvent::Submit`].
    pub fn finish<T>(&mut self, result: Result<T, CoreError>) -> SubmitOutcome<T> {
        self.form.finish_submit(result)
    }

    /// Tick the spinner while a submit runs.
    pub fn tick(&mut self) {
        if self.form.is_submitting() {
            self.throbber.calc_next();
        }
    }

    fn focused(&self) -> Option<&FieldConfig> {
        self.form.fields().get(self.focus)
    }

    fn move_focus(&mut self, forward: bool) {
        let len = self.form.fields().len();
        if len == 0 {
            return;
        }
        if let Some(name) = self.focused().map(|f| f.name) {
            self.form.blur(name);
        }
        self.focus = if forward {
            (self.focus + 1) % len
        } else {
            (self.focus + len - 1) % len
        };
    }

    // ── Keys ─────────────────────────────────────────────────────────

    pub fn handle_key(&mut self, key: KeyEvent) -> FormEvent {
        if self.form.is_submitting() {
            return FormEvent::Ignored;
        }
        let kind = self.focused().map(|f| f.kind);
        let newline = key.modifiers.contains(KeyModifiers::ALT) && kind == Some(FieldKind::TextArea);
        match key.code {
            KeyCode::Esc => return FormEvent::Cancel,
            KeyCode::Tab | KeyCode::Down => {
                self.move_focus(true);
                return FormEvent::Changed;
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.move_focus(false);
                return FormEvent::Changed;
            }
            KeyCode::Enter if !newline => {
                return match self.form.begin_submit() {
                    Some(values) => FormEvent::Submit(values),
                    None => FormEvent::Changed,
                };
            }
            _ => {}
        }

        let Some(field) = self.focused().cloned() else {
            return FormEvent::Ignored;
        };
        match field.kind {
            FieldKind::Boolean => match key.code {
                KeyCode::Char(' ') => {
                    self.form.toggle(field.name);
                    FormEvent::Changed
                }
                _ => FormEvent::Ignored,
            },
            FieldKind::Enum => match key.code {
                KeyCode::Left => {
                    self.form.cycle_option(field.name, false);
                    FormEvent::Changed
                }
                KeyCode::Right | KeyCode::Char(' ') => {
                    self.form.cycle_option(field.name, true);
                    FormEvent::Changed
                }
                _ => FormEvent::Ignored,
            },
            _ => self.edit_text(field.name, key),
        }
    }

    fn edit_text(&mut self, name: &str, key: KeyEvent) -> FormEvent {
        let Some(request) = input_request(key) else {
            return FormEvent::Ignored;
        };
        let Some(input) = self.inputs.get_mut(self.focus) else {
            return FormEvent::Ignored;
        };
        match input.handle(request) {
            Some(change) if change.value => {
                let value = input.value().to_owned();
                self.form.set_value(name, value);
                FormEvent::Changed
            }
            Some(_) => FormEvent::Changed,
            None => FormEvent::Ignored,
        }
    }

    // ── Rendering ────────────────────────────────────────────────────

    /// Rows of the body and the index of the focused field's row.
    fn body_lines(&self, value_width: usize) -> (Vec<Line<'static>>, usize) {
        let mut lines = Vec::with_capacity(self.form.fields().len() * 2);
        let mut focus_line = 0;
        for (idx, field) in self.form.fields().iter().enumerate() {
            let focused = idx == self.focus;
            if focused {
                focus_line = lines.len();
            }
            let marker = if self.form.is_required(field.name) { " *" } else { "" };
            let label = format!("{}{marker}", field.label);
            let label_style = if focused {
                theme::field_label_focused()
            } else {
                theme::field_label()
            };
            let mut spans = vec![
                Span::styled(if focused { "▸ " } else { "  " }, label_style),
                Span::styled(
                    format!("{label:<width$} ", width = usize::from(LABEL_WIDTH)),
                    label_style,
                ),
            ];
            spans.push(self.value_span(idx, field, value_width));
            lines.push(Line::from(spans));

            if let Some(err) = self.form.visible_error(field.name) {
                lines.push(Line::from(vec![
                    Span::raw(" ".repeat(usize::from(VALUE_COLUMN))),
                    Span::styled(format!("✗ {err}"), theme::error_text()),
                ]));
            }
        }
        (lines, focus_line)
    }

    fn value_span(&self, idx: usize, field: &FieldConfig, width: usize) -> Span<'static> {
        let values = self.form.values();
        match field.kind {
            FieldKind::Boolean => {
                let text = if values.bool(field.name) { "[x] yes" } else { "[ ] no" };
                Span::styled(text, theme::field_value())
            }
            FieldKind::Enum => {
                let current = values.text(field.name);
                let label = field.option_label(current).unwrap_or(current);
                Span::styled(format!("< {label} >"), theme::field_value())
            }
            kind => {
                let Some(input) = self.inputs.get(idx) else {
                    return Span::raw("");
                };
                if input.value().is_empty() {
                    let placeholder = if kind == FieldKind::Date { "YYYY-MM-DD" } else { "" };
                    return Span::styled(placeholder, theme::muted());
                }
                let scroll = input.visual_scroll(width);
                let shown: String = display_text(kind, input.value())
                    .chars()
                    .skip(scroll)
                    .take(width)
                    .collect();
                Span::styled(shown, theme::field_value())
            }
        }
    }

    fn hints(&self) -> Line<'static> {
        let mut spans = vec![
            Span::styled(" Tab ", theme::key_hint_key()),
            Span::styled("next  ", theme::key_hint()),
            Span::styled("Enter ", theme::key_hint_key()),
            Span::styled("save  ", theme::key_hint()),
            Span::styled("Esc ", theme::key_hint_key()),
            Span::styled("cancel  ", theme::key_hint()),
        ];
        match self.focused().map(|f| f.kind) {
            Some(FieldKind::Boolean) => {
                spans.push(Span::styled("Space ", theme::key_hint_key()));
                spans.push(Span::styled("toggle", theme::key_hint()));
            }
            Some(FieldKind::Enum) => {
                spans.push(Span::styled("←/→ ", theme::key_hint_key()));
                spans.push(Span::styled("choose", theme::key_hint()));
            }
            Some(FieldKind::TextArea) => {
                spans.push(Span::styled("Alt+Enter ", theme::key_hint_key()));
                spans.push(Span::styled("new line", theme::key_hint()));
            }
            _ => {}
        }
        Line::from(spans)
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let width = MAX_WIDTH.min(area.width.saturating_sub(4));
        let value_width = usize::from(width.saturating_sub(VALUE_COLUMN + 3)).max(1);
        let (lines, focus_line) = self.body_lines(value_width);
        let body_rows = u16::try_from(lines.len()).unwrap_or(u16::MAX);
        let height = body_rows
            .saturating_add(5)
            .min(area.height.saturating_sub(2));
        let popup = centered(area, width, height);
        frame.render_widget(Clear, popup);

        let block = Block::default()
            .title(format!(" {} ", self.form.title()))
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused())
            .style(Style::default().bg(theme::BG_DARK));
        let inner = block.inner(popup);
        frame.render_widget(block, popup);

        let [body, _, status, hints] = Layout::vertical([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(inner);

        let focus_row = u16::try_from(focus_line).unwrap_or(u16::MAX);
        let offset = scroll_offset(focus_row, body.height);
        frame.render_widget(Paragraph::new(lines).scroll((offset, 0)), body);

        if self.form.is_submitting() {
            let throbber = Throbber::default()
                .label("Saving…")
                .style(theme::muted())
                .throbber_style(Style::default().fg(theme::ELECTRIC_PURPLE));
            frame.render_stateful_widget(throbber, status, &mut self.throbber.clone());
        } else if let Some(err) = self.form.submit_error() {
            frame.render_widget(
                Paragraph::new(Span::styled(format!(" ✗ {err}"), theme::error_text())),
                status,
            );
        }
        frame.render_widget(Paragraph::new(self.hints()), hints);

        if let Some(pos) = self.cursor_position(body, focus_row, offset, value_width) {
            frame.set_cursor_position(pos);
        }
    }

    fn cursor_position(
        &self,
        body: Rect,
        focus_row: u16,
        offset: u16,
        value_width: usize,
    ) -> Option<Position> {
        let field = self.focused()?;
        if matches!(field.kind, FieldKind::Boolean | FieldKind::Enum) || self.is_submitting() {
            return None;
        }
        let row = focus_row.checked_sub(offset)?;
        if row >= body.height {
            return None;
        }
        let input = self.inputs.get(self.focus)?;
        let column = input
            .visual_cursor()
            .saturating_sub(input.visual_scroll(value_width));
        let column = u16::try_from(column).unwrap_or(u16::MAX);
        Some(Position::new(
            body.x.saturating_add(VALUE_COLUMN).saturating_add(column),
            body.y + row,
        ))
    }
}

/// What a text-like value looks like on screen.
fn display_text(kind: FieldKind, value: &str) -> String {
    match kind {
        FieldKind::Password => "•".repeat(value.chars().count()),
        FieldKind::TextArea => value.replace('\n', "↵"),
        _ => value.to_owned(),
    }
}

/// First visible body row so that `focus_row` stays in view.
fn scroll_offset(focus_row: u16, height: u16) -> u16 {
    if height == 0 {
        return 0;
    }
    // Keep one row under the focus for its error line.
    focus_row.saturating_add(2).saturating_sub(height)
}

fn input_request(key: KeyEvent) -> Option<InputRequest> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);
    match key.code {
        KeyCode::Enter if alt => Some(InputRequest::InsertChar('\n')),
        KeyCode::Char('u') if ctrl => Some(InputRequest::DeleteLine),
        KeyCode::Char('w') if ctrl => Some(InputRequest::DeletePrevWord),
        KeyCode::Char('a') if ctrl => Some(InputRequest::GoToStart),
        KeyCode::Char('e') if ctrl => Some(InputRequest::GoToEnd),
        KeyCode::Char(_) if ctrl || alt => None,
        KeyCode::Char(c) => Some(InputRequest::InsertChar(c)),
        KeyCode::Backspace => Some(InputRequest::DeletePrevChar),
        KeyCode::Delete => Some(InputRequest::DeleteNextChar),
        KeyCode::Left if ctrl => Some(InputRequest::GoToPrevWord),
        KeyCode::Right if ctrl => Some(InputRequest::GoToNextWord),
        KeyCode::Left => Some(InputRequest::GoToPrevChar),
        KeyCode::Right => Some(InputRequest::GoToNextChar),
        KeyCode::Home => Some(InputRequest::GoToStart),
        KeyCode::End => Some(InputRequest::GoToEnd),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use warden_core::Schema;
    use warden_core::forms::{critical_rule_create_form, login_form};

    use super::*;

    fn press(modal: &mut FormModal, code: KeyCode) -> FormEvent {
        modal.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(modal: &mut FormModal, text: &str) {
        for c in text.chars() {
            press(modal, KeyCode::Char(c));
        }
    }

    #[test]
    fn typing_updates_the_form() {
        let mut modal = FormModal::new(login_form());
        type_text(&mut modal, "admin");
        press(&mut modal, KeyCode::Backspace);
        assert_eq!(modal.form().values().text("username"), "admi");
    }

    #[test]
    fn enter_with_missing_fields_shows_errors_without_submitting() {
        let mut modal = FormModal::new(login_form());
        assert_eq!(press(&mut modal, KeyCode::Enter), FormEvent::Changed);
        assert!(!modal.is_submitting());
        assert_eq!(
            modal.form().visible_error("username"),
            Some("Username is required")
        );
    }

    #[test]
    fn enter_with_valid_fields_hands_out_values() {
        let mut modal = FormModal::new(login_form());
        type_text(&mut modal, "admin");
        press(&mut modal, KeyCode::Tab);
        type_text(&mut modal, "hunter2");

        let FormEvent::Submit(values) = press(&mut modal, KeyCode::Enter) else {
            panic!("expected a submit");
        };
        assert_eq!(values.text("password"), "hunter2");
        assert!(modal.is_submitting());
        assert_eq!(press(&mut modal, KeyCode::Enter), FormEvent::Ignored);
    }

    #[test]
    fn failed_submit_fills_the_submit_slot() {
        let mut modal = FormModal::new(login_form());
        modal.set_value("username", "admin");
        modal.set_value("password", "pw");
        assert!(matches!(
            press(&mut modal, KeyCode::Enter),
            FormEvent::Submit(_)
        ));

        let outcome = modal.finish::<()>(Err(CoreError::LoginFailed {
            message: "Incorrect username or password".into(),
        }));
        assert!(!outcome.is_submitted());
        assert!(!modal.is_submitting());
        assert_eq!(
            modal.form().submit_error(),
            Some("Incorrect username or password")
        );
    }

    #[test]
    fn enum_and_boolean_fields_cycle() {
        let mut modal = FormModal::new(critical_rule_create_form());
        modal.focus_field("action");
        let before = modal.form().values().text("action").to_owned();
        press(&mut modal, KeyCode::Right);
        assert_ne!(modal.form().values().text("action"), before);
        press(&mut modal, KeyCode::Left);
        assert_eq!(modal.form().values().text("action"), before);

        let mut flags = FormModal::new(FormState::new(
            "Flags",
            vec![FieldConfig::boolean("active", "Active")],
            Schema::new(),
            &FormValues::new(),
        ));
        press(&mut flags, KeyCode::Char(' '));
        assert!(flags.form().values().bool("active"));
        press(&mut flags, KeyCode::Char('x'));
        assert!(flags.form().values().bool("active"));
    }

    #[test]
    fn leaving_a_field_reveals_its_error() {
        let mut modal = FormModal::new(critical_rule_create_form());
        modal.focus_field("srcPort");
        type_text(&mut modal, "70000");
        assert_eq!(modal.form().visible_error("srcPort"), None);
        press(&mut modal, KeyCode::Tab);
        assert!(modal.form().visible_error("srcPort").is_some());
    }

    #[test]
    fn esc_cancels() {
        let mut modal = FormModal::new(login_form());
        assert_eq!(press(&mut modal, KeyCode::Esc), FormEvent::Cancel);
    }

    #[test]
    fn passwords_are_masked() {
        assert_eq!(display_text(FieldKind::Password, "abc"), "•••");
        assert_eq!(display_text(FieldKind::TextArea, "a\nb"), "a↵b");
        assert_eq!(display_text(FieldKind::Text, "a b"), "a b");
    }

    #[test]
    fn scroll_keeps_focus_visible() {
        assert_eq!(scroll_offset(0, 10), 0);
        assert_eq!(scroll_offset(8, 10), 0);
        assert_eq!(scroll_offset(20, 10), 12);
    }
}
