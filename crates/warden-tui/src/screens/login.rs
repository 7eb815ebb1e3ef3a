//! Login screen: the sign-in form, centered on an otherwise empty frame.

use color_eyre::eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};
use tokio::sync::mpsc::UnboundedSender;

use warden_core::Console;
use warden_core::forms::{login_credentials, login_form};

use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets::form_modal::{FormEvent, FormModal};

use super::spawn_action;

pub struct LoginScreen {
    console: Console,
    action_tx: Option<UnboundedSender<Action>>,
    /// Profile username used to prefill the form.
    username: Option<String>,
    modal: FormModal,
}

fn fresh_form(username: Option<&str>) -> FormModal {
    let mut modal = FormModal::new(login_form());
    if let Some(username) = username {
        modal.set_value("username", username);
        modal.focus_field("password");
    }
    modal
}

impl LoginScreen {
    pub fn new(console: Console, username: Option<String>) -> Self {
        let modal = fresh_form(username.as_deref());
        Self {
            console,
            action_tx: None,
            username,
            modal,
        }
    }
}

impl Component for LoginScreen {
    fn init(&mut self, action_tx: UnboundedSender<Action>) -> Result<()> {
        self.action_tx = Some(action_tx);
        Ok(())
    }

    fn mount(&mut self) -> Result<()> {
        if !self.modal.is_submitting() {
            self.modal = fresh_form(self.username.as_deref());
        }
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if let FormEvent::Submit(values) = self.modal.handle_key(key) {
            let (username, password) = login_credentials(&values);
            let console = self.console.clone();
            spawn_action(self.action_tx.as_ref(), async move {
                Action::LoginFinished(console.login(&username, &password).await)
            });
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::Tick => self.modal.tick(),
            Action::LoginFinished(result) if self.modal.is_submitting() => {
                if self.modal.finish(result.clone()).is_submitted() {
                    self.modal = fresh_form(self.username.as_deref());
                }
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [banner, form_area] =
            Layout::vertical([Constraint::Length(3), Constraint::Min(1)]).areas(inner);
        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                "warden",
                theme::title_style().add_modifier(Modifier::ITALIC),
            )),
            Line::from(Span::styled("rule administration console", theme::muted())),
        ];
        frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), banner);

        self.modal.render(frame, form_area);
    }

    fn captures_input(&self) -> bool {
        true
    }

    fn key_hints(&self) -> &'static str {
        "Ctrl+C quit"
    }
}
