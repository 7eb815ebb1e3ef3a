//! Dashboard screen: rule and user totals plus the attack-type breakdown.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use indexmap::IndexMap;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};
use throbber_widgets_tui::{Throbber, ThrobberState};
use tokio::sync::mpsc::UnboundedSender;

use warden_core::dashboard::DASHBOARD_SAMPLE;
use warden_core::{Action as RuleAction, Console, DashboardSummary, Route};

use crate::action::Action;
use crate::component::Component;
use crate::theme;

use super::{expired, spawn_action};

const BAR_WIDTH: usize = 24;

pub struct DashboardScreen {
    console: Console,
    action_tx: Option<UnboundedSender<Action>>,
    summary: Option<DashboardSummary>,
    loading: bool,
    error: Option<String>,
    throbber_state: ThrobberState,
}

/// Percent of `counts` that is `action`.
#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
fn share(counts: &IndexMap<RuleAction, u64>, action: RuleAction) -> f64 {
    let seen: u64 = counts.values().sum();
    if seen == 0 {
        return 0.0;
    }
    counts.get(&action).copied().unwrap_or(0) as f64 * 100.0 / seen as f64
}

/// `percent` of `width` cells, rounded to the nearest cell.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::as_conversions
)]
fn bar(percent: f64, width: usize) -> String {
    let cells = ((percent.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    format!("{}{}", "█".repeat(cells), "░".repeat(width - cells.min(width)))
}

/// User count for the stat card, `"150+"` when the list goes on.
fn users_value(summary: &DashboardSummary) -> String {
    if summary.users_more {
        format!("{}+", summary.users_total)
    } else {
        summary.users_total.to_string()
    }
}

fn breakdown_lines(counts: &IndexMap<RuleAction, u64>) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from("")];
    for (action, count) in counts {
        let percent = share(counts, *action);
        let color = theme::action_color(*action);
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<7}", action.label()), Style::default().fg(color)),
            Span::styled(bar(percent, BAR_WIDTH), Style::default().fg(color)),
            Span::styled(
                format!(" {count:>5}  {percent:>5.1}%"),
                Style::default().fg(theme::DIM_WHITE),
            ),
        ]));
    }
    lines
}

impl DashboardScreen {
    pub fn new(console: Console) -> Self {
        Self {
            console,
            action_tx: None,
            summary: None,
            loading: false,
            error: None,
            throbber_state: ThrobberState::default(),
        }
    }

    fn load(&mut self) {
        self.loading = true;
        let console = self.console.clone();
        spawn_action(self.action_tx.as_ref(), async move {
            Action::DashboardLoaded(console.dashboard().await)
        });
    }

    fn stat_card(frame: &mut Frame, area: Rect, title: &str, value: String, detail: Line<'static>) {
        let block = Block::default()
            .title(format!(" {title} "))
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let lines = vec![
            Line::from(Span::styled(
                value,
                Style::default()
                    .fg(theme::NEON_CYAN)
                    .add_modifier(Modifier::BOLD),
            )),
            detail,
        ];
        frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);
    }

    fn render_stats(frame: &mut Frame, area: Rect, summary: &DashboardSummary) {
        let [critical, firewall, users] = Layout::horizontal([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .areas(area);

        let drops = summary
            .critical_by_action
            .get(&RuleAction::Drop)
            .copied()
            .unwrap_or(0);
        Self::stat_card(
            frame,
            critical,
            "Critical Rules",
            summary.critical_rules_total.to_string(),
            Line::from(Span::styled(format!("{drops} drop"), theme::muted())),
        );
        Self::stat_card(
            frame,
            firewall,
            "Firewall Rules",
            summary.firewall_rules_total.to_string(),
            Line::from(Span::styled("read-only", theme::muted())),
        );
        Self::stat_card(
            frame,
            users,
            "Users",
            users_value(summary),
            Line::from(vec![
                Span::styled(
                    format!("● {} active  ", summary.active_users),
                    Style::default().fg(theme::active_color(true)),
                ),
                Span::styled(
                    format!("○ {} inactive", summary.inactive_users),
                    Style::default().fg(theme::active_color(false)),
                ),
            ]),
        );
    }

    fn render_breakdown(
        frame: &mut Frame,
        area: Rect,
        title: &str,
        counts: &IndexMap<RuleAction, u64>,
    ) {
        let block = Block::default()
            .title(format!(" {title} "))
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default());
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Paragraph::new(breakdown_lines(counts)), inner);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        if self.loading {
            let throbber = Throbber::default()
                .label("Loading dashboard…")
                .style(theme::muted())
                .throbber_style(Style::default().fg(theme::ELECTRIC_PURPLE));
            frame.render_stateful_widget(throbber, area, &mut self.throbber_state.clone());
            return;
        }
        let line = if let Some(err) = &self.error {
            Line::from(Span::styled(format!(" ✗ {err}"), theme::error_text()))
        } else if self.summary.as_ref().is_some_and(|s| s.partial) {
            Line::from(Span::styled(
                format!(" Breakdowns cover the first {DASHBOARD_SAMPLE} rows of each list"),
                theme::muted(),
            ))
        } else {
            Line::from("")
        };
        frame.render_widget(Paragraph::new(line), area);
    }
}

impl Component for DashboardScreen {
    fn init(&mut self, action_tx: UnboundedSender<Action>) -> Result<()> {
        self.action_tx = Some(action_tx);
        Ok(())
    }

    fn mount(&mut self) -> Result<()> {
        self.load();
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.code == KeyCode::Char('r') {
            self.load();
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::Tick if self.loading => {
                self.throbber_state.calc_next();
                Ok(None)
            }
            Action::DashboardLoaded(result) => {
                self.loading = false;
                match result {
                    Ok(summary) => {
                        self.summary = Some(summary.clone());
                        self.error = None;
                    }
                    Err(e) => self.error = Some(e.display_message()),
                }
                Ok(expired(result))
            }
            Action::Refresh(Route::Dashboard | Route::Home) => {
                self.load();
                Ok(None)
            }
            _ => Ok(None),
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Dashboard ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [stats, charts, status] = Layout::vertical([
            Constraint::Length(4),
            Constraint::Min(6),
            Constraint::Length(1),
        ])
        .areas(inner);

        if let Some(summary) = &self.summary {
            Self::render_stats(frame, stats, summary);
            let [attacks, firewall] =
                Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                    .areas(charts);
            Self::render_breakdown(
                frame,
                attacks,
                "Attack Types (critical rules)",
                &summary.critical_by_action,
            );
            Self::render_breakdown(
                frame,
                firewall,
                "Firewall Actions",
                &summary.firewall_by_action,
            );
        }
        self.render_status(frame, status);
    }

    fn key_hints(&self) -> &'static str {
        "r refresh"
    }
}
