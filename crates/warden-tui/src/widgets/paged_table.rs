//! A server-paginated list: one page of rows, a highlighted row and, for
//! lists with bulk actions, ticked rows.

use std::collections::BTreeSet;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::widgets::{Cell, Row, Table, TableState};
use warden_core::{
    CoreError, CriticalRule, FetchRequest, FirewallRule, Page, PaginationModel, Paginator, User,
};

use crate::theme;

/// Rows with a backend id.
pub trait Identified {
    fn id(&self) -> i64;
}

impl Identified for CriticalRule {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Identified for FirewallRule {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Identified for User {
    fn id(&self) -> i64 {
        self.id
    }
}

/// What a key did to the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKey {
    Unhandled,
    Handled,
    /// The page model changed; run this fetch.
    Fetch(FetchRequest),
}

pub struct PagedList<T> {
    paginator: Paginator<T>,
    table_state: TableState,
    marked: BTreeSet<i64>,
    multi_select: bool,
}

impl<T: Identified> PagedList<T> {
    /// Starts on the first page with the first of `page_sizes`.
    pub fn new(page_sizes: &[u32]) -> Self {
        let model = PaginationModel {
            page: 0,
            page_size: page_sizes.first().copied().unwrap_or_default(),
        };
        Self {
            paginator: Paginator::new(model).with_page_sizes(page_sizes),
            table_state: TableState::default(),
            marked: BTreeSet::new(),
            multi_select: false,
        }
    }

    /// Enable the tick column.
    pub fn multi_select(mut self) -> Self {
        self.multi_select = true;
        self
    }

    pub fn paginator(&self) -> &Paginator<T> {
        &self.paginator
    }

    pub fn rows(&self) -> &[T] {
        self.paginator.rows()
    }

    // ── Highlight ────────────────────────────────────────────────────

    pub fn selected_index(&self) -> usize {
        self.table_state.selected().unwrap_or(0)
    }

    pub fn selected(&self) -> Option<&T> {
        self.rows().get(self.selected_index())
    }

    fn select(&mut self, idx: usize) {
        let len = self.rows().len();
        self.table_state.select(Some(idx.min(len.saturating_sub(1))));
    }

    pub fn move_selection(&mut self, delta: isize) {
        let next = self.selected_index().saturating_add_signed(delta);
        self.select(next);
    }

    pub fn select_first(&mut self) {
        self.select(0);
    }

    pub fn select_last(&mut self) {
        self.select(usize::MAX);
    }

    // ── Ticks ────────────────────────────────────────────────────────

    /// Tick or untick the highlighted row.
    pub fn toggle_mark(&mut self) {
        if !self.multi_select {
            return;
        }
        let Some(id) = self.selected().map(Identified::id) else {
            return;
        };
        if !self.marked.remove(&id) {
            self.marked.insert(id);
        }
    }

    /// Tick every row on the page, or untick them all when they already are.
    pub fn toggle_all(&mut self) {
        if !self.multi_select {
            return;
        }
        let ids: Vec<i64> = self.rows().iter().map(Identified::id).collect();
        if ids.iter().all(|id| self.marked.contains(id)) {
            for id in &ids {
                self.marked.remove(id);
            }
        } else {
            self.marked.extend(ids);
        }
    }

    pub fn is_marked(&self, id: i64) -> bool {
        self.marked.contains(&id)
    }

    /// Ticked ids in ascending order.
    pub fn marked_ids(&self) -> Vec<i64> {
        self.marked.iter().copied().collect()
    }

    pub fn clear_marks(&mut self) {
        self.marked.clear();
    }

    // ── Paging ───────────────────────────────────────────────────────

    pub fn refresh(&mut self) -> FetchRequest {
        self.paginator.refresh()
    }

    pub fn next_page(&mut self) -> Option<FetchRequest> {
        self.paginator.next_page()
    }

    pub fn prev_page(&mut self) -> Option<FetchRequest> {
        self.paginator.prev_page()
    }

    pub fn cycle_page_size(&mut self) -> FetchRequest {
        self.paginator.cycle_page_size()
    }

    /// Record a fetch result. Ticks on rows that left the page are dropped.
    pub fn apply(&mut self, request: FetchRequest, result: Result<Page<T>, CoreError>) -> bool {
        let applied = self.paginator.apply(request, result);
        if applied {
            let present: BTreeSet<i64> = self.rows().iter().map(Identified::id).collect();
            self.marked.retain(|id| present.contains(id));
            let idx = self.selected_index();
            self.select(idx);
        }
        applied
    }

    /// Row movement, paging, refresh and ticks.
    pub fn handle_key(&mut self, key: KeyEvent) -> ListKey {
        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('d')) => self.move_selection(10),
            (KeyModifiers::CONTROL, KeyCode::Char('u')) => self.move_selection(-10),
            (_, KeyCode::Char('j') | KeyCode::Down) => self.move_selection(1),
            (_, KeyCode::Char('k') | KeyCode::Up) => self.move_selection(-1),
            (_, KeyCode::Char('g') | KeyCode::Home) => self.select_first(),
            (_, KeyCode::Char('G') | KeyCode::End) => self.select_last(),
            (_, KeyCode::Char(']') | KeyCode::Right | KeyCode::PageDown) => {
                return self.next_page().map_or(ListKey::Handled, ListKey::Fetch);
            }
            (_, KeyCode::Char('[') | KeyCode::Left | KeyCode::PageUp) => {
                return self.prev_page().map_or(ListKey::Handled, ListKey::Fetch);
            }
            (_, KeyCode::Char('s')) => return ListKey::Fetch(self.cycle_page_size()),
            (_, KeyCode::Char('r')) => return ListKey::Fetch(self.refresh()),
            (_, KeyCode::Char(' ')) if self.multi_select => self.toggle_mark(),
            (_, KeyCode::Char('a')) if self.multi_select => self.toggle_all(),
            _ => return ListKey::Unhandled,
        }
        ListKey::Handled
    }

    // ── Rendering ────────────────────────────────────────────────────

    /// Draw the page. `cells` renders the data columns of one row; the
    /// tick column is prepended when enabled.
    pub fn render_table<'a>(
        &'a self,
        frame: &mut Frame,
        area: Rect,
        header: &[&'static str],
        widths: &[Constraint],
        cells: impl Fn(&'a T) -> Vec<Cell<'a>>,
    ) {
        let mut header_cells = Vec::with_capacity(header.len() + 1);
        let mut all_widths = Vec::with_capacity(widths.len() + 1);
        if self.multi_select {
            header_cells.push(Cell::from(" ").style(theme::table_header()));
            all_widths.push(Constraint::Length(3));
        }
        header_cells.extend(
            header
                .iter()
                .map(|h| Cell::from(*h).style(theme::table_header())),
        );
        all_widths.extend_from_slice(widths);

        let rows: Vec<Row> = self
            .rows()
            .iter()
            .map(|item| {
                let marked = self.is_marked(item.id());
                let mut row_cells = Vec::with_capacity(all_widths.len());
                if self.multi_select {
                    row_cells.push(Cell::from(if marked { "[x]" } else { "[ ]" }));
                }
                row_cells.extend(cells(item));
                let style = if marked {
                    theme::table_marked()
                } else {
                    theme::table_row()
                };
                Row::new(row_cells).style(style)
            })
            .collect();

        let table = Table::new(rows, all_widths)
            .header(Row::new(header_cells))
            .row_highlight_style(theme::table_selected())
            .highlight_symbol("▸");

        let mut state = self.table_state;
        if !self.rows().is_empty() && state.selected().is_none() {
            state.select(Some(0));
        }
        frame.render_stateful_widget(table, area, &mut state);
    }
}
