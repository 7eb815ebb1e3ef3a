//! Yes/no dialog for destructive operations.

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap};
use throbber_widgets_tui::{Throbber, ThrobberState};

use crate::theme;

use super::centered;

/// What the dialog shows.
pub struct ConfirmDialog<'a> {
    pub message: &'a str,
    pub error: Option<&'a str>,
    /// The operation is running; keys are ignored until it settles.
    pub busy: bool,
}

impl ConfirmDialog<'_> {
    pub fn render(&self, frame: &mut Frame, area: Rect, throbber: &ThrobberState) {
        let width = 56.min(area.width.saturating_sub(4));
        let popup = centered(area, width, 9);
        frame.render_widget(Clear, popup);

        let block = Block::default()
            .title(" Confirm ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_warning())
            .style(Style::default().bg(theme::BG_DARK));
        let inner = block.inner(popup);
        frame.render_widget(block, popup);

        let mut lines = vec![
            Line::from(""),
            Line::from(Span::styled(self.message, theme::field_value())),
            Line::from(""),
        ];
        if let Some(err) = self.error {
            lines.push(Line::from(Span::styled(format!("✗ {err}"), theme::error_text())));
        }
        if !self.busy {
            lines.push(Line::from(vec![
                Span::styled("y ", theme::key_hint_key()),
                Span::styled("confirm  ", theme::key_hint()),
                Span::styled("n/Esc ", theme::key_hint_key()),
                Span::styled("cancel", theme::key_hint()),
            ]));
        }
        frame.render_widget(
            Paragraph::new(lines)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            inner,
        );

        if self.busy && inner.height > 0 {
            let row = Rect::new(inner.x + 2, inner.bottom() - 1, inner.width.saturating_sub(4), 1);
            let throbber_widget = Throbber::default()
                .label("Deleting…")
                .style(theme::muted())
                .throbber_style(Style::default().fg(theme::ELECTRIC_PURPLE));
            frame.render_stateful_widget(throbber_widget, row, &mut throbber.clone());
        }
    }
}
