//! Users screen: paged table with per-row toggle, edit and delete.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph};
use tokio::sync::mpsc::UnboundedSender;

use warden_core::forms::{
    user_create_form, user_create_payload, user_update_form, user_update_payload,
};
use warden_core::{
    Command, CommandResult, Console, CoreError, FetchRequest, FormValues, ModalState, Route,
    SubmitOutcome, UpdateModalState, User,
};

use crate::action::{Action, ConfirmAction, Notification};
use crate::component::Component;
use crate::theme;
use crate::widgets::form_modal::{FormEvent, FormModal};
use crate::widgets::or_dash;
use crate::widgets::paged_table::{ListKey, PagedList};
use crate::widgets::toolbar::{ToolItem, pager_line, toolbar_line};

use super::{expired, spawn_action};

const PAGE_SIZES: [u32; 3] = [25, 50, 100];

const HEADER: [&str; 8] = [
    "ID",
    "Username",
    "Name",
    "Email",
    "Active",
    "Last Login",
    "Attempts",
    "Created",
];

pub struct UsersScreen {
    console: Console,
    action_tx: Option<UnboundedSender<Action>>,
    list: PagedList<User>,
    create: ModalState,
    update: UpdateModalState<User>,
    form: Option<FormModal>,
    /// A toggle request is running.
    toggling: bool,
}

impl UsersScreen {
    pub fn new(console: Console) -> Self {
        Self {
            console,
            action_tx: None,
            list: PagedList::new(&PAGE_SIZES),
            create: ModalState::new(),
            update: UpdateModalState::new(),
            form: None,
            toggling: false,
        }
    }

    fn fetch(&self, request: FetchRequest) {
        let console = self.console.clone();
        spawn_action(self.action_tx.as_ref(), async move {
            let result = console.list_users(request.model()).await;
            Action::UsersLoaded(request, result)
        });
    }

    fn reload(&mut self) {
        let request = self.list.refresh();
        self.fetch(request);
    }

    fn execute(&self, command: Command, done: fn(Result<CommandResult, CoreError>) -> Action) {
        let console = self.console.clone();
        spawn_action(self.action_tx.as_ref(), async move {
            done(console.execute(command).await)
        });
    }

    fn open_create(&mut self) {
        self.update.close();
        self.create.open();
        self.form = Some(FormModal::new(user_create_form()));
    }

    fn open_update(&mut self) {
        let Some(user) = self.list.selected().cloned() else {
            return;
        };
        self.create.close();
        self.form = Some(FormModal::new(user_update_form(&user)));
        self.update.open(user);
    }

    fn close_form(&mut self) {
        self.create.close();
        self.update.close();
        self.form = None;
    }

    fn submit(&mut self, values: &FormValues) {
        let command = match self.update.data() {
            Some(user) => user_update_payload(user, values)
                .map(|update| Command::UpdateUser { id: user.id, update }),
            None => Ok(Command::CreateUser(user_create_payload(values))),
        };
        match command {
            Ok(command) => self.execute(command, Action::UserSaved),
            Err(e) => {
                if let Some(form) = self.form.as_mut() {
                    form.finish::<()>(Err(e));
                }
            }
        }
    }

    fn toggle(&mut self) {
        if self.toggling {
            return;
        }
        let Some(id) = self.list.selected().map(|u| u.id) else {
            return;
        };
        self.toggling = true;
        self.execute(Command::ToggleUser { id }, Action::UserToggled);
    }

    fn saved(&mut self, result: &Result<CommandResult, CoreError>) -> Option<Action> {
        let form = self.form.as_mut()?;
        let creating = self.create.is_open();
        match form.finish(result.clone()) {
            SubmitOutcome::Submitted(_) => {
                self.close_form();
                self.reload();
                let message = if creating {
                    "User created"
                } else {
                    "User updated"
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

    fn toggled(&mut self, result: &Result<CommandResult, CoreError>) -> Option<Action> {
        self.toggling = false;
        match result {
            Ok(CommandResult::User(user)) => {
                self.reload();
                let state = if user.active {
                    "activated"
                } else {
                    "deactivated"
                };
                Some(Action::Notify(Notification::success(format!(
                    "User {} {state}",
                    user.username
                ))))
            }
            Ok(_) => {
                self.reload();
                None
            }
            Err(e) => expired(result)
                .or_else(|| Some(Action::Notify(Notification::error(e.display_message())))),
        }
    }

    fn row_cells(user: &User) -> Vec<Cell<'_>> {
        let active = if user.active { "● yes" } else { "○ no" };
        vec![
            Cell::from(user.id.to_string()),
            Cell::from(user.username.as_str()).style(Style::default().fg(theme::NEON_CYAN)),
            Cell::from(user.full_name()),
            Cell::from(user.email.as_str()),
            Cell::from(active).style(Style::default().fg(theme::active_color(user.active))),
            Cell::from(or_dash(
                user.last_login.map(|t| t.format("%Y-%m-%d %H:%M")),
            )),
            Cell::from(user.login_attempts.to_string()),
            Cell::from(user.created_at.format("%Y-%m-%d").to_string()),
        ]
    }
}

impl Component for UsersScreen {
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
            KeyCode::Char('t') => {
                self.toggle();
                None
            }
            KeyCode::Char('d' | 'x') => self.list.selected().map(|user| {
                Action::ShowConfirm(ConfirmAction::DeleteUser {
                    id: user.id,
                    username: user.username.clone(),
                })
            }),
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
            Action::UsersLoaded(request, result) => {
                self.list.apply(*request, result.clone());
                expired(result)
            }
            Action::UserSaved(result) => self.saved(result),
            Action::UserToggled(result) => self.toggled(result),
            Action::Refresh(Route::Users) => {
                self.reload();
                None
            }
            _ => None,
        };
        Ok(follow_up)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(format!(" Users ({}) ", self.list.paginator().total_label()))
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

        let has_row = self.list.selected().is_some();
        let toolbar = toolbar_line(&[
            ToolItem::new("n", "create"),
            ToolItem::new("r", "refresh"),
            ToolItem::new("t", "toggle").enabled(has_row && !self.toggling),
            ToolItem::new("d", "delete").enabled(has_row),
        ]);
        frame.render_widget(Paragraph::new(toolbar), toolbar_area);

        let widths = [
            Constraint::Length(6),
            Constraint::Length(16),
            Constraint::Min(18),
            Constraint::Min(22),
            Constraint::Length(7),
            Constraint::Length(16),
            Constraint::Length(9),
            Constraint::Length(10),
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
            "e edit  t toggle  d delete  ]/[ page  s size"
        }
    }
}
