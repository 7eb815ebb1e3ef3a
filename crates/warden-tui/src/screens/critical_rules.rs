//! Critical rules screen: paged table with ticks for bulk delete, create
//! and edit dialogs.

use chrono::{DateTime, Utc};
use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::Span;
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph};
use tokio::sync::mpsc::UnboundedSender;

use warden_core::forms::{
    critical_rule_create_form, critical_rule_create_payload, critical_rule_update_form,
    critical_rule_update_payload,
};
use warden_core::{
    Command, CommandResult, Console, CoreError, CriticalRule, FetchRequest, FormValues,
    ModalState, Route, SubmitOutcome, UpdateModalState,
};

use crate::action::{Action, ConfirmAction, Notification};
use crate::component::Component;
use crate::theme;
use crate::widgets::form_modal::{FormEvent, FormModal};
use crate::widgets::or_dash;
use crate::widgets::paged_table::{ListKey, PagedList};
use crate::widgets::toolbar::{ToolItem, pager_line, toolbar_line};

use super::{expired, spawn_action};

const PAGE_SIZES: [u32; 3] = [50, 100, 150];

const HEADER: [&str; 14] = [
    "ID",
    "Title",
    "Action",
    "Protocol",
    "Src Address",
    "Src Port",
    "Dest Address",
    "Dest Port",
    "NAT Src",
    "NAT Dest",
    "Start",
    "End",
    "Last Update",
    "Created",
];

fn day(ts: Option<DateTime<Utc>>) -> String {
    or_dash(ts.map(|t| t.format("%Y-%m-%d")))
}

fn stamp(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M").to_string()
}

pub struct CriticalRulesScreen {
    console: Console,
    action_tx: Option<UnboundedSender<Action>>,
    list: PagedList<CriticalRule>,
    create: ModalState,
    update: UpdateModalState<CriticalRule>,
    form: Option<FormModal>,
}

impl CriticalRulesScreen {
    pub fn new(console: Console) -> Self {
        Self {
            console,
            action_tx: None,
            list: PagedList::new(&PAGE_SIZES).multi_select(),
            create: ModalState::new(),
            update: UpdateModalState::new(),
            form: None,
        }
    }

    fn fetch(&self, request: FetchRequest) {
        let console = self.console.clone();
        spawn_action(self.action_tx.as_ref(), async move {
            let result = console.list_critical_rules(request.model()).await;
            Action::CriticalRulesLoaded(request, result)
        });
    }

    fn reload(&mut self) {
        let request = self.list.refresh();
        self.fetch(request);
    }

    fn open_create(&mut self) {
        self.update.close();
        self.create.open();
        self.form = Some(FormModal::new(critical_rule_create_form()));
    }

    fn open_update(&mut self) {
        let Some(rule) = self.list.selected().cloned() else {
            return;
        };
        self.create.close();
        self.form = Some(FormModal::new(critical_rule_update_form(&rule)));
        self.update.open(rule);
    }

    fn close_form(&mut self) {
        self.create.close();
        self.update.close();
        self.form = None;
    }

    fn submit(&mut self, values: &FormValues) {
        let command = match self.update.data() {
            Some(rule) => critical_rule_update_payload(rule, values).map(|update| {
                Command::UpdateCriticalRule {
                    id: rule.id,
                    update,
                }
            }),
            None => critical_rule_create_payload(values).map(Command::CreateCriticalRule),
        };
        match command {
            Ok(command) => {
                let console = self.console.clone();
                spawn_action(self.action_tx.as_ref(), async move {
                    Action::CriticalRuleSaved(console.execute(command).await)
                });
            }
            Err(e) => {
                if let Some(form) = self.form.as_mut() {
                    form.finish::<()>(Err(e));
                }
            }
        }
    }

    fn saved(&mut self, result: &Result<CommandResult, CoreError>) -> Option<Action> {
        let form = self.form.as_mut()?;
        let creating = self.create.is_open();
        match form.finish(result.clone()) {
            SubmitOutcome::Submitted(_) => {
                self.close_form();
                self.reload();
                let message = if creating {
                    "Critical rule created"
                } else {
                    "Critical rule updated"
                };
                Some(Action::Notify(Notification::success(message)))
            }
            SubmitOutcome::Failed(message) => {
                if self.update.is_open() {
                    self.update.set_error(message);
                }
                expired(result)
            }
            SubmitOutcome::Invalid => None,
        }
    }

    fn confirm_delete(ids: Vec<i64>) -> Option<Action> {
        if ids.is_empty() {
            return Some(Action::Notify(Notification::info(
                "Tick rows with Space to delete them",
            )));
        }
        Some(Action::ShowConfirm(ConfirmAction::DeleteCriticalRules {
            ids,
        }))
    }

    fn row_cells(rule: &CriticalRule) -> Vec<Cell<'_>> {
        vec![
            Cell::from(rule.id.to_string()),
            Cell::from(rule.title.as_str()).style(Style::default().fg(theme::NEON_CYAN)),
            Cell::from(rule.action.label())
                .style(Style::default().fg(theme::action_color(rule.action))),
            Cell::from(or_dash(rule.protocol.as_deref())),
            Cell::from(or_dash(rule.src_address.as_deref())),
            Cell::from(or_dash(rule.src_port)),
            Cell::from(or_dash(rule.des_address.as_deref())),
            Cell::from(or_dash(rule.des_port)),
            Cell::from(or_dash(rule.nat_src_port)),
            Cell::from(or_dash(rule.nat_des_port)),
            Cell::from(day(rule.start_time)),
            Cell::from(day(rule.end_time)),
            Cell::from(stamp(rule.updated_at)),
            Cell::from(stamp(rule.created_at)),
        ]
    }
}

impl Component for CriticalRulesScreen {
    fn init(&mut self, action_tx: UnboundedSender<Action>) -> Result<()> {
        self.action_tx = Some(action_tx);
        Ok(())
    }

    fn mount(&mut self) -> Result<()> {
        self.close_form();
        self.reload();
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if let Some(form) = self.form.as_mut() {
            match form.handle_key(key) {
                FormEvent::Cancel => self.close_form(),
                FormEvent::Submit(values) => self.submit(&values),
                FormEvent::Changed | FormEvent::Ignored => {}
            }
            return Ok(None);
        }

        match self.list.handle_key(key) {
            ListKey::Fetch(request) => {
                self.fetch(request);
                return Ok(None);
            }
            ListKey::Handled => return Ok(None),
            ListKey::Unhandled => {}
        }

        let action = match key.code {
            KeyCode::Char('n' | 'c') => {
                self.open_create();
                None
            }
            KeyCode::Char('e') | KeyCode::Enter => {
                self.open_update();
                None
            }
            KeyCode::Char('d') => Self::confirm_delete(self.list.marked_ids()),
            KeyCode::Char('x') => self
                .list
                .selected()
                .and_then(|rule| Self::confirm_delete(vec![rule.id])),
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        let follow_up = match action {
            Action::Tick => {
                if let Some(form) = self.form.as_mut() {
                    form.tick();
                }
                None
            }
            Action::CriticalRulesLoaded(request, result) => {
                self.list.apply(*request, result.clone());
                expired(result)
            }
            Action::CriticalRuleSaved(result) => self.saved(result),
            Action::Refresh(Route::CriticalRules) => {
                self.list.clear_marks();
                self.reload();
                None
            }
            _ => None,
        };
        Ok(follow_up)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(format!(
                " Critical Rules ({}) ",
                self.list.paginator().total_label()
            ))
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [toolbar_area, table_area, pager_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .areas(inner);

        let marked = self.list.marked_ids().len();
        let mut toolbar = toolbar_line(&[
            ToolItem::new("n", "create"),
            ToolItem::new("r", "refresh"),
            ToolItem::new("d", "delete").enabled(marked > 0),
        ]);
        if marked > 0 {
            toolbar.spans.push(Span::styled(
                format!("  {marked} selected"),
                theme::table_marked(),
            ));
        }
        frame.render_widget(Paragraph::new(toolbar), toolbar_area);

        let widths = [
            Constraint::Length(6),
            Constraint::Min(16),
            Constraint::Length(7),
            Constraint::Length(9),
            Constraint::Length(16),
            Constraint::Length(8),
            Constraint::Length(16),
            Constraint::Length(9),
            Constraint::Length(8),
            Constraint::Length(8),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(16),
            Constraint::Length(16),
        ];
        self.list
            .render_table(frame, table_area, &HEADER, &widths, Self::row_cells);
        frame.render_widget(Paragraph::new(pager_line(self.list.paginator())), pager_area);

        if let Some(form) = &self.form {
            form.render(frame, area);
        }
    }

    fn captures_input(&self) -> bool {
        self.form.is_some()
    }

    fn key_hints(&self) -> &'static str {
        if self.form.is_some() {
            ""
        } else {
            "Space tick  e edit  x delete row  ]/[ page  s size"
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use crossterm::event::KeyModifiers;
    use pretty_assertions::assert_eq;
    use warden_core::{Action as RuleAction, Page};

    use super::*;
    use crate::screens::offline_console;

    fn rule(id: i64) -> CriticalRule {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).single().unwrap_or_default();
        CriticalRule {
            id,
            protocol: Some("tcp".into()),
            src_address: None,
            des_address: Some("10.0.0.1".into()),
            src_port: None,
            des_port: Some(443),
            nat_src_port: None,
            nat_des_port: None,
            action: RuleAction::Block,
            title: format!("rule {id}"),
            description: None,
            start_time: None,
            end_time: None,
            created_at: at,
            updated_at: at,
        }
    }

    fn screen_with(ids: &[i64]) -> CriticalRulesScreen {
        let mut screen = CriticalRulesScreen::new(offline_console());
        let request = screen.list.refresh();
        let page = Page::new(ids.iter().map(|id| rule(*id)).collect(), 60);
        screen.list.apply(request, Ok(page));
        screen
    }

    fn press(screen: &mut CriticalRulesScreen, code: KeyCode) -> Option<Action> {
        screen
            .handle_key_event(KeyEvent::new(code, KeyModifiers::NONE))
            .unwrap_or_else(|e| panic!("key: {e}"))
    }

    #[test]
    fn delete_asks_for_the_ticked_rows() {
        let mut screen = screen_with(&[3, 4, 5]);
        press(&mut screen, KeyCode::Char(' '));
        press(&mut screen, KeyCode::Char('j'));
        press(&mut screen, KeyCode::Char('j'));
        press(&mut screen, KeyCode::Char(' '));

        let action = press(&mut screen, KeyCode::Char('d'));
        assert!(matches!(
            action,
            Some(Action::ShowConfirm(ConfirmAction::DeleteCriticalRules { ref ids })) if ids == &[3, 5]
        ));
    }

    #[test]
    fn delete_without_ticks_only_hints() {
        let mut screen = screen_with(&[3]);
        let action = press(&mut screen, KeyCode::Char('d'));
        assert!(matches!(action, Some(Action::Notify(_))));
    }

    #[test]
    fn row_delete_targets_the_highlighted_rule() {
        let mut screen = screen_with(&[3, 4]);
        press(&mut screen, KeyCode::Char('j'));
        let action = press(&mut screen, KeyCode::Char('x'));
        assert!(matches!(
            action,
            Some(Action::ShowConfirm(ConfirmAction::DeleteCriticalRules { ref ids })) if ids == &[4]
        ));
    }

    #[test]
    fn edit_opens_a_prefilled_form() {
        let mut screen = screen_with(&[3, 4]);
        press(&mut screen, KeyCode::Char('e'));
        assert!(screen.captures_input());
        assert_eq!(screen.update.data().map(|r| r.id), Some(3));
        let title = screen.form.as_ref().map(|f| f.form().values().text("title").to_owned());
        assert_eq!(title.as_deref(), Some("rule 3"));

        press(&mut screen, KeyCode::Esc);
        assert!(!screen.captures_input());
        assert!(!screen.update.is_open());
    }

    #[test]
    fn unchanged_update_is_refused_in_the_form() {
        let mut screen = screen_with(&[3]);
        press(&mut screen, KeyCode::Char('e'));
        press(&mut screen, KeyCode::Enter);

        let form = screen.form.as_ref().map(FormModal::form);
        assert_eq!(
            form.and_then(|f| f.submit_error()),
            Some("No updates provided")
        );
        assert!(form.is_some_and(|f| !f.is_submitting()));
    }

    #[test]
    fn invalid_create_never_submits() {
        let mut screen = screen_with(&[]);
        press(&mut screen, KeyCode::Char('n'));
        assert!(screen.create.is_open());
        press(&mut screen, KeyCode::Enter);
        let form = screen.form.as_ref().map(FormModal::form);
        assert!(form.is_some_and(|f| !f.is_submitting()));
        assert_eq!(
            form.and_then(|f| f.visible_error("title")),
            Some("Title is required")
        );
    }

    #[test]
    fn successful_save_closes_the_form_and_notifies() {
        let mut screen = screen_with(&[3]);
        press(&mut screen, KeyCode::Char('e'));
        let saved = Ok(CommandResult::CriticalRule(rule(3)));
        let follow_up = screen
            .update(&Action::CriticalRuleSaved(saved))
            .unwrap_or_else(|e| panic!("update: {e}"));
        assert!(matches!(
            follow_up,
            Some(Action::Notify(ref n)) if n.message == "Critical rule updated"
        ));
        assert!(screen.form.is_none());
    }

    #[test]
    fn rejected_save_stays_open_with_the_detail() {
        let mut screen = screen_with(&[3]);
        press(&mut screen, KeyCode::Char('e'));
        let rejected = Err(CoreError::Rejected {
            message: "Rule not found".into(),
            status: 404,
        });
        let follow_up = screen
            .update(&Action::CriticalRuleSaved(rejected))
            .unwrap_or_else(|e| panic!("update: {e}"));
        assert!(follow_up.is_none());
        assert_eq!(screen.update.error(), Some("Rule not found"));
        let slot = screen.form.as_ref().and_then(|f| f.form().submit_error());
        assert_eq!(slot, Some("Rule not found"));
    }

    #[test]
    fn auth_failure_while_listing_expires_the_session() {
        let mut screen = CriticalRulesScreen::new(offline_console());
        let request = screen.list.refresh();
        let follow_up = screen
            .update(&Action::CriticalRulesLoaded(
                request,
                Err(CoreError::NotAuthenticated {
                    message: "Not authenticated".into(),
                }),
            ))
            .unwrap_or_else(|e| panic!("update: {e}"));
        assert!(matches!(follow_up, Some(Action::SessionExpired(_))));
        assert_eq!(screen.list.paginator().error(), Some("Not authenticated"));
    }
}
