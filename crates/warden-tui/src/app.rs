//! Application core: event loop, routing through the auth guard, overlays.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Tabs},
};
use throbber_widgets_tui::{Throbber, ThrobberState};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use warden_core::{Console, GuardDecision, Route, UpdateModalState};

use crate::action::{Action, ConfirmAction, Notification, NotificationLevel};
use crate::component::Component;
use crate::event::{Event, EventReader};
use crate::screen;
use crate::screens::{create_screens, spawn_action};
use crate::theme;
use crate::tui::Tui;
use crate::widgets::centered;
use crate::widgets::confirm::ConfirmDialog;

/// How long a toast stays up.
const NOTIFICATION_TTL: Duration = Duration::from_secs(3);

/// Top-level application state and event loop.
pub struct App {
    console: Console,
    /// Route requested on startup.
    start: Route,
    /// Route on screen. `None` until the guard answers the first request.
    active: Option<Route>,
    /// Route waiting on the guard. Answers for anything else are stale.
    pending: Option<Route>,
    /// Where to go after a successful login.
    return_to: Route,
    /// One component per screen route (see [`screen::screen_for`]).
    screens: HashMap<Route, Box<dyn Component>>,
    confirm: UpdateModalState<ConfirmAction>,
    /// The confirmed command is running.
    confirm_busy: bool,
    throbber_state: ThrobberState,
    notification: Option<(Notification, Instant)>,
    running: bool,
    help_visible: bool,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
}

impl App {
    pub fn new(console: Console, start: Route, username: Option<String>) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let screens: HashMap<Route, Box<dyn Component>> =
            create_screens(&console, username).into_iter().collect();

        Self {
            console,
            start,
            active: None,
            pending: None,
            return_to: Route::Dashboard,
            screens,
            confirm: UpdateModalState::new(),
            confirm_busy: false,
            throbber_state: ThrobberState::default(),
            notification: None,
            running: true,
            help_visible: false,
            action_tx,
            action_rx,
        }
    }

    fn init_screens(&mut self) -> Result<()> {
        for screen in self.screens.values_mut() {
            screen.init(self.action_tx.clone())?;
        }
        Ok(())
    }

    /// Run the main event loop until the user quits.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;
        let (width, height) = tui.size()?;
        debug!(width, height, "terminal ready");
        self.init_screens()?;

        let mut events = EventReader::new(
            Duration::from_millis(250), // 4 Hz tick
            Duration::from_millis(33),  // ~30 FPS render
        );

        info!(route = self.start.path(), "TUI event loop started");
        self.action_tx.send(Action::Navigate(self.start))?;

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Resize(w, h) => self.action_tx.send(Action::Resize(w, h))?,
                Event::Tick => self.action_tx.send(Action::Tick)?,
                Event::Render => self.action_tx.send(Action::Render)?,
            }

            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;

                if let Action::Render = action {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        events.stop();
        info!("TUI event loop ended");
        Ok(())
    }

    fn active_screen(&self) -> Option<&dyn Component> {
        let route = screen::screen_for(self.active?);
        self.screens.get(&route).map(|s| &**s)
    }

    fn active_screen_mut(&mut self) -> Option<&mut Box<dyn Component>> {
        let route = screen::screen_for(self.active?);
        self.screens.get_mut(&route)
    }

    /// Map a key to an action. Modal overlays take keys first, then global
    /// bindings (unless the screen is taking text), then the screen.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::Quit));
        }

        if self.confirm.is_open() {
            if self.confirm_busy {
                return Ok(None);
            }
            return Ok(match key.code {
                KeyCode::Char('y' | 'Y') => Some(Action::ConfirmYes),
                KeyCode::Char('n' | 'N') | KeyCode::Esc => Some(Action::ConfirmNo),
                _ => None,
            });
        }

        if self.help_visible {
            return Ok(match key.code {
                KeyCode::Esc | KeyCode::Char('?') => Some(Action::ToggleHelp),
                _ => None,
            });
        }

        let Some(active) = self.active else {
            return Ok((key.code == KeyCode::Char('q')).then_some(Action::Quit));
        };

        let capturing = self.active_screen().is_some_and(Component::captures_input);
        if !capturing {
            let plain = !key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);
            match key.code {
                KeyCode::Char('q') if plain => return Ok(Some(Action::Quit)),
                KeyCode::Char('?') if plain => return Ok(Some(Action::ToggleHelp)),
                KeyCode::Char('L') if plain => return Ok(Some(Action::Logout)),
                KeyCode::Char(c @ '1'..='9') if plain => {
                    let target = c
                        .to_digit(10)
                        .and_then(|n| u8::try_from(n).ok())
                        .and_then(screen::from_number);
                    if let Some(route) = target {
                        return Ok(Some(Action::Navigate(route)));
                    }
                }
                KeyCode::Tab if plain => {
                    return Ok(Some(Action::Navigate(screen::next(active))));
                }
                KeyCode::BackTab => return Ok(Some(Action::Navigate(screen::prev(active)))),
                KeyCode::Esc if self.notification.is_some() => {
                    return Ok(Some(Action::DismissNotification));
                }
                _ => {}
            }
        }

        match self.active_screen_mut() {
            Some(screen) => screen.handle_key_event(key),
            None => Ok(None),
        }
    }

    fn notify(&mut self, notification: Notification) {
        self.notification = Some((notification, Instant::now()));
    }

    /// Put the guard's answer on screen.
    fn show(&mut self, route: Route) -> Result<()> {
        if self.active != Some(route) {
            debug!(
                from = self.active.map_or("-", Route::path),
                to = route.path(),
                "switching screen"
            );
        }
        self.active = Some(route);
        self.help_visible = false;
        if let Some(screen) = self.active_screen_mut() {
            screen.mount()?;
        }
        Ok(())
    }

    /// Hand `action` to every screen and queue their follow-ups.
    fn broadcast(&mut self, action: &Action) -> Result<()> {
        for screen in self.screens.values_mut() {
            if let Some(follow_up) = screen.update(action)? {
                self.action_tx.send(follow_up)?;
            }
        }
        Ok(())
    }

    /// Update app state for one action and propagate it to the screens.
    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => self.running = false,
            Action::Render => {}
            Action::Resize(w, h) => debug!(width = w, height = h, "terminal resized"),

            Action::Tick => {
                if self.confirm_busy || self.pending.is_some() || self.active.is_none() {
                    self.throbber_state.calc_next();
                }
                if self
                    .notification
                    .as_ref()
                    .is_some_and(|(_, at)| at.elapsed() >= NOTIFICATION_TTL)
                {
                    self.notification = None;
                }
                if let Some(screen) = self.active_screen_mut() {
                    if let Some(follow_up) = screen.update(action)? {
                        self.action_tx.send(follow_up)?;
                    }
                }
            }

            // ── Navigation ────────────────────────────────────────
            Action::Navigate(route) => {
                let route = *route;
                self.pending = Some(route);
                let console = self.console.clone();
                spawn_action(Some(&self.action_tx), async move {
                    let decision = console.guard(route).await;
                    Action::RouteResolved {
                        requested: route,
                        decision,
                    }
                });
            }

            Action::RouteResolved {
                requested,
                decision,
            } => {
                if self.pending != Some(*requested) {
                    debug!(route = requested.path(), "ignoring stale guard answer");
                    return Ok(());
                }
                self.pending = None;
                if let GuardDecision::Redirect(Route::Login) = decision {
                    if *requested != Route::Login {
                        self.return_to = *requested;
                    }
                    self.notify(Notification::info("Please sign in to continue"));
                }
                self.show(decision.route())?;
            }

            // ── Session ───────────────────────────────────────────
            Action::LoginFinished(result) => {
                if let Ok(user) = result {
                    info!(user = %user.username, "signed in");
                    self.notify(Notification::success(format!(
                        "Signed in as {}",
                        user.username
                    )));
                    let target = std::mem::replace(&mut self.return_to, Route::Dashboard);
                    self.action_tx.send(Action::Navigate(target))?;
                }
                self.broadcast(action)?;
            }

            Action::Logout => {
                let console = self.console.clone();
                spawn_action(Some(&self.action_tx), async move {
                    Action::LoggedOut(console.logout().await)
                });
            }

            Action::LoggedOut(result) => {
                match result {
                    Ok(()) => self.notify(Notification::info("Signed out")),
                    Err(e) => {
                        warn!(error = %e, "logout failed");
                        self.notify(Notification::error(e.display_message()));
                    }
                }
                self.return_to = Route::Dashboard;
                self.action_tx.send(Action::Navigate(Route::Login))?;
            }

            Action::SessionExpired(message) => {
                if self.active == Some(Route::Login) || self.pending == Some(Route::Login) {
                    return Ok(());
                }
                warn!(%message, "session expired");
                if let Some(active) = self.active {
                    self.return_to = active;
                }
                self.confirm.close();
                self.confirm_busy = false;
                self.notify(Notification::error(format!("Session expired: {message}")));
                self.action_tx.send(Action::Navigate(Route::Login))?;
            }

            // ── Confirm dialog ────────────────────────────────────
            Action::ShowConfirm(pending) => {
                self.confirm.open(pending.clone());
                self.confirm_busy = false;
            }

            Action::ConfirmNo => {
                if !self.confirm_busy {
                    self.confirm.close();
                }
            }

            Action::ConfirmYes => {
                let Some(pending) = self.confirm.data() else {
                    return Ok(());
                };
                if self.confirm_busy {
                    return Ok(());
                }
                self.confirm_busy = true;
                let command = pending.command();
                let console = self.console.clone();
                spawn_action(Some(&self.action_tx), async move {
                    Action::ConfirmFinished(console.execute(command).await)
                });
            }

            Action::ConfirmFinished(result) => {
                self.confirm_busy = false;
                match result {
                    Ok(outcome) => {
                        if let Some(done) = self.confirm.close() {
                            self.notify(Notification::success(done.success_message(outcome)));
                            self.action_tx.send(Action::Refresh(done.route()))?;
                        }
                    }
                    Err(e) if e.is_auth() => {
                        self.confirm.close();
                        self.action_tx
                            .send(Action::SessionExpired(e.display_message()))?;
                    }
                    Err(e) => self.confirm.set_error(e.display_message()),
                }
            }

            // ── Overlays ──────────────────────────────────────────
            Action::ToggleHelp => self.help_visible = !self.help_visible,
            Action::Notify(notification) => self.notify(notification.clone()),
            Action::DismissNotification => self.notification = None,

            other => self.broadcast(other)?,
        }

        Ok(())
    }

    // ── Rendering ─────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let Some(active) = self.active else {
            self.render_checking(frame, area);
            return;
        };

        if active == Route::Login {
            let [content, status] =
                Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(area);
            if let Some(screen) = self.active_screen() {
                screen.render(frame, content);
            }
            self.render_status_bar(frame, status);
        } else {
            let [content, tabs, status] = Layout::vertical([
                Constraint::Min(1),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .areas(area);
            if let Some(screen) = self.active_screen() {
                screen.render(frame, content);
            }
            Self::render_tab_bar(frame, tabs, active);
            self.render_status_bar(frame, status);
        }

        if let Some(pending) = self.confirm.data() {
            let message = pending.to_string();
            ConfirmDialog {
                message: &message,
                error: self.confirm.error(),
                busy: self.confirm_busy,
            }
            .render(frame, area, &self.throbber_state);
        }
        if self.help_visible {
            Self::render_help_overlay(frame, area);
        }
        if let Some((notification, _)) = &self.notification {
            Self::render_notification(frame, area, notification);
        }
    }

    fn render_checking(&self, frame: &mut Frame, area: Rect) {
        let line_area = centered(area, 24, 1);
        let throbber = Throbber::default()
            .label("Checking session…")
            .style(theme::muted())
            .throbber_style(Style::default().fg(theme::ELECTRIC_PURPLE));
        frame.render_stateful_widget(throbber, line_area, &mut self.throbber_state.clone());
    }

    fn render_tab_bar(frame: &mut Frame, area: Rect, active: Route) {
        let active = screen::screen_for(active);
        let routes = screen::navigation();
        let titles: Vec<Line> = routes
            .iter()
            .map(|&route| {
                let style = if route == active {
                    theme::tab_active()
                } else {
                    theme::tab_inactive()
                };
                let number = screen::number(route).unwrap_or_default();
                Line::from(Span::styled(format!(" {number} {} ", route.title()), style))
            })
            .collect();

        let mut tabs = Tabs::new(titles).divider(Span::styled(" ", theme::key_hint()));
        if let Some(selected) = routes.iter().position(|&r| r == active) {
            tabs = tabs.select(selected);
        }
        frame.render_widget(tabs, area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let auth = self.console.auth_state();
        let who = match &auth.user {
            Some(user) if auth.is_authenticated => Span::styled(
                format!("● {}", user.username),
                Style::default().fg(theme::SUCCESS_GREEN),
            ),
            _ => Span::styled("○ signed out", Style::default().fg(theme::ERROR_RED)),
        };

        let mut spans = vec![Span::raw(" "), who];
        if self.pending.is_some() {
            spans.push(Span::styled("  ◐ loading", Style::default().fg(theme::ELECTRIC_YELLOW)));
        }
        let screen_hints = self.active_screen().map_or("", Component::key_hints);
        if !screen_hints.is_empty() {
            spans.push(Span::styled(format!(" │ {screen_hints}"), theme::key_hint()));
        }
        if self.active != Some(Route::Login) {
            spans.push(Span::styled(
                " │ ? help  L logout  q quit",
                theme::key_hint(),
            ));
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_help_overlay(frame: &mut Frame, area: Rect) {
        let help_area = centered(area, 60, 27);
        frame.render_widget(Clear, help_area);

        let block = Block::default()
            .title(" Keyboard Shortcuts ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused())
            .style(Style::default().bg(theme::BG_DARK));
        let inner = block.inner(help_area);
        frame.render_widget(block, help_area);

        let section = |title: &'static str| {
            [
                Line::from(Span::styled(
                    format!("  {title}"),
                    Style::default().fg(theme::NEON_CYAN),
                )),
                Line::from(Span::styled(
                    format!("  {}", "─".repeat(title.chars().count())),
                    theme::key_hint(),
                )),
            ]
        };
        let entry = |keys: &'static str, what: &'static str| {
            Line::from(vec![
                Span::styled(format!("  {keys:<10}"), theme::key_hint_key()),
                Span::styled(what, theme::key_hint()),
            ])
        };

        let mut lines = vec![Line::from("")];
        lines.extend(section("Navigation"));
        lines.push(entry("1-4", "Jump to page"));
        lines.push(entry("Tab", "Next page"));
        lines.push(entry("j/k ↑/↓", "Move up/down"));
        lines.push(entry("]/[", "Next / previous page of rows"));
        lines.push(entry("s", "Rows per page"));
        lines.push(entry("r", "Refresh"));
        lines.push(Line::from(""));
        lines.extend(section("Editing"));
        lines.push(entry("n", "New"));
        lines.push(entry("e / Enter", "Edit selected row"));
        lines.push(entry("Space / a", "Tick row / all rows"));
        lines.push(entry("d / x", "Delete ticked / selected"));
        lines.push(entry("t", "Activate / deactivate user"));
        lines.push(Line::from(""));
        lines.extend(section("Global"));
        lines.push(entry("Esc", "Dismiss notification"));
        lines.push(entry("L", "Sign out"));
        lines.push(entry("q", "Quit"));
        lines.push(Line::from(Span::styled(
            "Esc or ? to close",
            theme::key_hint(),
        )));

        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn render_notification(frame: &mut Frame, area: Rect, notification: &Notification) {
        let (icon, color) = match notification.level {
            NotificationLevel::Success => ("✓", theme::SUCCESS_GREEN),
            NotificationLevel::Error => ("✗", theme::ERROR_RED),
            NotificationLevel::Info => ("●", theme::NEON_CYAN),
        };
        let text = format!("{icon} {}", notification.message);
        let wanted = u16::try_from(text.chars().count()).unwrap_or(u16::MAX).saturating_add(4);
        let width = wanted.min(area.width.saturating_sub(2)).min(60);
        let height = 3.min(area.height);
        let toast = Rect {
            x: area.x + area.width.saturating_sub(width + 1),
            y: area.y + area.height.saturating_sub(height + 2),
            width,
            height,
        };
        frame.render_widget(Clear, toast);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(color))
            .style(Style::default().bg(theme::BG_DARK));
        frame.render_widget(
            Paragraph::new(Span::styled(text, Style::default().fg(color)))
                .alignment(Alignment::Left)
                .block(block),
            toast,
        );
    }
}
