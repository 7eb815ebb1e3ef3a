//! Firewall rules screen: a read-only paged table.

use color_eyre::eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph};
use tokio::sync::mpsc::UnboundedSender;

use warden_core::{Console, FetchRequest, FirewallRule, Route};

use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets::or_dash;
use crate::widgets::paged_table::{ListKey, PagedList};
use crate::widgets::toolbar::{ToolItem, pager_line, toolbar_line};

use super::{expired, spawn_action};

const PAGE_SIZES: [u32; 3] = [25, 50, 100];

const HEADER: [&str; 9] = [
    "ID",
    "Action",
    "Protocol",
    "Src Address",
    "Src Port",
    "Dest Address",
    "Dest Port",
    "Last Update",
    "Created",
];

pub struct FirewallRulesScreen {
    console: Console,
    action_tx: Option<UnboundedSender<Action>>,
    list: PagedList<FirewallRule>,
}

impl FirewallRulesScreen {
    pub fn new(console: Console) -> Self {
        Self {
            console,
            action_tx: None,
            list: PagedList::new(&PAGE_SIZES),
        }
    }

    fn fetch(&self, request: FetchRequest) {
        let console = self.console.clone();
        spawn_action(self.action_tx.as_ref(), async move {
            let result = console.list_firewall_rules(request.model()).await;
            Action::FirewallRulesLoaded(request, result)
        });
    }

    fn reload(&mut self) {
        let request = self.list.refresh();
        self.fetch(request);
    }

    fn row_cells(rule: &FirewallRule) -> Vec<Cell<'_>> {
        vec![
            Cell::from(rule.id.to_string()),
            Cell::from(rule.action.label())
                .style(Style::default().fg(theme::action_color(rule.action))),
            Cell::from(or_dash(rule.protocol.as_deref())),
            Cell::from(or_dash(rule.src_address.as_deref()))
                .style(Style::default().fg(theme::CORAL)),
            Cell::from(or_dash(rule.src_port)),
            Cell::from(or_dash(rule.des_address.as_deref()))
                .style(Style::default().fg(theme::CORAL)),
            Cell::from(or_dash(rule.des_port)),
            Cell::from(rule.updated_at.format("%Y-%m-%d %H:%M").to_string()),
            Cell::from(rule.created_at.format("%Y-%m-%d %H:%M").to_string()),
        ]
    }
}

impl Component for FirewallRulesScreen {
    fn init(&mut self, action_tx: UnboundedSender<Action>) -> Result<()> {
        self.action_tx = Some(action_tx);
        Ok(())
    }

    fn mount(&mut self) -> Result<()> {
        self.reload();
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if let ListKey::Fetch(request) = self.list.handle_key(key) {
            self.fetch(request);
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::FirewallRulesLoaded(request, result) => {
                self.list.apply(*request, result.clone());
                Ok(expired(result))
            }
            Action::Refresh(Route::FirewallRules) => {
                self.reload();
                Ok(None)
            }
            _ => Ok(None),
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(format!(
                " Firewall Rules ({}) ",
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

        frame.render_widget(
            Paragraph::new(toolbar_line(&[ToolItem::new("r", "refresh")])),
            toolbar_area,
        );

        let widths = [
            Constraint::Length(6),
            Constraint::Length(7),
            Constraint::Length(9),
            Constraint::Min(16),
            Constraint::Length(9),
            Constraint::Min(16),
            Constraint::Length(9),
            Constraint::Length(16),
            Constraint::Length(16),
        ];
        self.list
            .render_table(frame, table_area, &HEADER, &widths, Self::row_cells);
        frame.render_widget(Paragraph::new(pager_line(self.list.paginator())), pager_area);
    }

    fn key_hints(&self) -> &'static str {
        "j/k move  ]/[ page  s size"
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use crossterm::event::{KeyCode, KeyModifiers};
    use pretty_assertions::assert_eq;
    use warden_core::{Action as RuleAction, CoreError, Page};

    use super::*;
    use crate::screens::offline_console;

    fn rule(id: i64) -> FirewallRule {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).single().unwrap_or_default();
        FirewallRule {
            id,
            protocol: None,
            src_address: Some("192.168.1.0/24".into()),
            des_address: None,
            src_port: None,
            des_port: Some(22),
            action: RuleAction::Drop,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn starts_with_twenty_five_rows_per_page() {
        let screen = FirewallRulesScreen::new(offline_console());
        assert_eq!(screen.list.paginator().model().page_size, 25);
    }

    #[test]
    fn stale_page_is_ignored() {
        let mut screen = FirewallRulesScreen::new(offline_console());
        let first = screen.list.refresh();
        let second = screen.list.refresh();

        let fresh = Page::new(vec![rule(2)], 2);
        screen
            .update(&Action::FirewallRulesLoaded(second, Ok(fresh)))
            .unwrap_or_else(|e| panic!("update: {e}"));
        let stale = Page::new(vec![rule(1)], 1);
        screen
            .update(&Action::FirewallRulesLoaded(first, Ok(stale)))
            .unwrap_or_else(|e| panic!("update: {e}"));

        assert_eq!(screen.list.rows().len(), 1);
        assert_eq!(screen.list.rows()[0].id, 2);
        assert_eq!(screen.list.paginator().total(), 2);
    }

    #[test]
    fn fetch_error_keeps_rows() {
        let mut screen = FirewallRulesScreen::new(offline_console());
        let request = screen.list.refresh();
        screen.list.apply(request, Ok(Page::new(vec![rule(1)], 1)));

        let request = screen.list.refresh();
        let follow_up = screen
            .update(&Action::FirewallRulesLoaded(request, Err(CoreError::Timeout)))
            .unwrap_or_else(|e| panic!("update: {e}"));
        assert!(follow_up.is_none());
        assert_eq!(screen.list.rows().len(), 1);
        assert!(screen.list.paginator().error().is_some());
    }

    #[test]
    fn no_mutation_keys() {
        let mut screen = FirewallRulesScreen::new(offline_console());
        for code in [KeyCode::Char('n'), KeyCode::Char('d'), KeyCode::Char('x')] {
            let action = screen
                .handle_key_event(KeyEvent::new(code, KeyModifiers::NONE))
                .unwrap_or_else(|e| panic!("key: {e}"));
            assert!(action.is_none());
        }
    }
}
