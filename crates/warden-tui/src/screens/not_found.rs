//! Not-found screen for unknown routes.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};
use warden_core::Route;

use crate::action::Action;
use crate::component::Component;
use crate::theme;

pub struct NotFoundScreen;

impl Component for NotFoundScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        Ok(match key.code {
            KeyCode::Enter | KeyCode::Char('d') => Some(Action::Navigate(Route::Dashboard)),
            _ => None,
        })
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Not Found ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let lines = vec![
            Line::from(Span::styled(
                "404",
                Style::default()
                    .fg(theme::ELECTRIC_PURPLE)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled("Page Not Found", theme::title_style())),
            Line::from(""),
            Line::from(vec![
                Span::styled("Enter ", theme::key_hint_key()),
                Span::styled("go to dashboard", theme::key_hint()),
            ]),
        ];
        let y_offset = inner.height.saturating_sub(4) / 2;
        let text_area = Rect {
            x: inner.x,
            y: inner.y + y_offset,
            width: inner.width,
            height: 4.min(inner.height),
        };
        frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), text_area);
    }

    fn key_hints(&self) -> &'static str {
        "Enter dashboard"
    }
}
