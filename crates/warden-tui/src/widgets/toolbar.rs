//! Toolbar and pager lines above and below a list.

use ratatui::text::{Line, Span};
use warden_core::Paginator;

use crate::theme;

/// One toolbar entry: a key and what it does.
#[derive(Debug, Clone, Copy)]
pub struct ToolItem {
    pub key: &'static str,
    pub label: &'static str,
    pub enabled: bool,
}

impl ToolItem {
    pub const fn new(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            enabled: true,
        }
    }

    pub const fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

pub fn toolbar_line(items: &[ToolItem]) -> Line<'static> {
    let mut spans = Vec::with_capacity(items.len() * 3);
    for item in items {
        spans.push(Span::raw(" "));
        if item.enabled {
            spans.push(Span::styled(item.key, theme::key_hint_key()));
            spans.push(Span::styled(format!(" {} ", item.label), theme::tab_inactive()));
        } else {
            spans.push(Span::styled(
                format!("{} {}", item.key, item.label),
                theme::key_hint_disabled(),
            ));
            spans.push(Span::raw(" "));
        }
    }
    Line::from(spans)
}

/// `"51-75 of 312 · page 3/13 · 25 per page"`, plus the loading state or
/// the last fetch error.
pub fn pager_line<T>(paginator: &Paginator<T>) -> Line<'static> {
    let model = paginator.model();
    let mut spans = vec![
        Span::styled(format!(" {}", paginator.range_label()), theme::field_value()),
        Span::styled(
            format!(
                " · page {}/{}{} · {} per page",
                model.page + 1,
                paginator.page_count().max(1),
                if paginator.is_open_ended() { "+" } else { "" },
                model.page_size
            ),
            theme::muted(),
        ),
    ];
    if paginator.is_loading() {
        spans.push(Span::styled("  loading…", theme::muted()));
    } else if let Some(err) = paginator.error() {
        spans.push(Span::styled(format!("  ✗ {err}"), theme::error_text()));
    }
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use warden_core::{Page, PaginationModel};

    use super::*;

    fn text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn pager_shows_range_and_page() {
        let mut paginator = Paginator::new(PaginationModel {
            page: 2,
            page_size: 25,
        });
        let request = paginator.refresh();
        paginator.apply(
            request,
            Ok(Page::new(vec![1, 2], 312)),
        );
        assert_eq!(
            text(&pager_line(&paginator)),
            " 51-52 of 312 · page 3/13 · 25 per page"
        );
    }

    #[test]
    fn pager_without_total_shows_more_pages() {
        let mut paginator = Paginator::default();
        let request = paginator.refresh();
        paginator.apply(request, Ok(Page::unbounded((0..25).collect::<Vec<u32>>())));
        assert_eq!(
            text(&pager_line(&paginator)),
            " 1-25 · page 1/2+ · 25 per page"
        );
    }

    #[test]
    fn disabled_items_are_not_highlighted() {
        let line = toolbar_line(&[
            ToolItem::new("n", "create"),
            ToolItem::new("d", "delete").enabled(false),
        ]);
        assert_eq!(text(&line), " n create  d delete ");
        assert_eq!(line.spans[4].style, theme::key_hint_disabled());
    }
}
