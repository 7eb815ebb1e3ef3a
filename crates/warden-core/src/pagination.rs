// ── Paginated list state ──
//
// A `Paginator` owns the page model and the last page of rows for one list
// screen. State changes hand back a `FetchRequest`; the caller runs the fetch
// (inline or on a spawned task) and feeds the result to `apply`. Requests
// are numbered, and only the latest one may change the rows.

use std::future::Future;

use tracing::{debug, warn};
use warden_api::Page;

use crate::error::CoreError;

/// Default number of rows per page.
pub const DEFAULT_PAGE_SIZE: u32 = 25;

/// Current page (zero-based) and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationModel {
    pub page: u32,
    pub page_size: u32,
}

impl Default for PaginationModel {
    fn default() -> Self {
        Self {
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PaginationModel {
    /// Row offset of the first row on this page.
    pub fn offset(self) -> u64 {
        u64::from(self.page) * u64::from(self.page_size)
    }
}

/// One fetch to run on behalf of a [`Paginator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchRequest {
    pub page: u32,
    pub page_size: u32,
    pub generation: u64,
}

impl FetchRequest {
    pub fn model(self) -> PaginationModel {
        PaginationModel {
            page: self.page,
            page_size: self.page_size,
        }
    }
}

/// Page state, rows and fetch bookkeeping for one list.
#[derive(Debug, Clone)]
pub struct Paginator<T> {
    model: PaginationModel,
    rows: Vec<T>,
    total: u64,
    /// The total is a lower bound: the list reports none and the last page
    /// came back full, so more rows may follow.
    open_ended: bool,
    loading: bool,
    error: Option<String>,
    generation: u64,
    page_sizes: Vec<u32>,
}

impl<T> Default for Paginator<T> {
    fn default() -> Self {
        Self::new(PaginationModel::default())
    }
}

impl<T> Paginator<T> {
    pub fn new(model: PaginationModel) -> Self {
        Self {
            model,
            rows: Vec::new(),
            total: 0,
            open_ended: false,
            loading: false,
            error: None,
            generation: 0,
            page_sizes: vec![DEFAULT_PAGE_SIZE, 50, 100],
        }
    }

    /// Restrict the selectable page sizes. The first entry becomes the
    /// current size when the current one is not among them.
    #[must_use]
    pub fn with_page_sizes(mut self, sizes: &[u32]) -> Self {
        let sizes: Vec<u32> = sizes.iter().copied().filter(|s| *s > 0).collect();
        if let Some(first) = sizes.first() {
            if !sizes.contains(&self.model.page_size) {
                self.model.page_size = *first;
            }
            self.page_sizes = sizes;
        }
        self
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn model(&self) -> PaginationModel {
        self.model
    }

    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    /// Rows in the list. A lower bound while [`is_open_ended`](Self::is_open_ended).
    pub fn total(&self) -> u64 {
        self.total
    }

    /// `true` when the list reports no total and more rows may follow.
    pub fn is_open_ended(&self) -> bool {
        self.open_ended
    }

    /// `"312"`, or `"50+"` while the total is open-ended.
    pub fn total_label(&self) -> String {
        if self.open_ended {
            format!("{}+", self.total)
        } else {
            self.total.to_string()
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Message from the last failed fetch, cleared by the next success.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn page_sizes(&self) -> &[u32] {
        &self.page_sizes
    }

    /// Number of pages for the current total; zero when empty. While the
    /// total is open-ended this counts one page past the rows seen.
    pub fn page_count(&self) -> u32 {
        let size = u64::from(self.model.page_size.max(1));
        let known = u32::try_from(self.total.div_ceil(size)).unwrap_or(u32::MAX);
        known.saturating_add(u32::from(self.open_ended))
    }

    /// `"26-50 of 312"` style label for the rows on screen; just `"26-50"`
    /// while the total is open-ended.
    pub fn range_label(&self) -> String {
        if self.total == 0 || self.rows.is_empty() {
            return format!("0 of {}", self.total);
        }
        let start = self.model.offset() + 1;
        let shown = u64::try_from(self.rows.len()).unwrap_or(u64::MAX);
        let end = (start + shown - 1).min(self.total);
        if self.open_ended {
            format!("{start}-{end}")
        } else {
            format!("{start}-{end} of {}", self.total)
        }
    }

    // ── State changes ────────────────────────────────────────────────

    fn request(&mut self) -> FetchRequest {
        self.generation += 1;
        self.loading = true;
        FetchRequest {
            page: self.model.page,
            page_size: self.model.page_size,
            generation: self.generation,
        }
    }

    /// Refetch the current page.
    pub fn refresh(&mut self) -> FetchRequest {
        self.request()
    }

    pub fn set_page(&mut self, page: u32) -> FetchRequest {
        self.model.page = page;
        self.request()
    }

    /// Change the page size; the page resets to the first one.
    pub fn set_page_size(&mut self, page_size: u32) -> FetchRequest {
        self.model = PaginationModel {
            page: 0,
            page_size: page_size.max(1),
        };
        self.request()
    }

    /// Replace the whole model, as a table widget reports it.
    pub fn set_model(&mut self, model: PaginationModel) -> FetchRequest {
        if model.page_size == self.model.page_size {
            self.set_page(model.page)
        } else {
            self.set_page_size(model.page_size)
        }
    }

    pub fn next_page(&mut self) -> Option<FetchRequest> {
        let next = self.model.page + 1;
        (next < self.page_count()).then(|| self.set_page(next))
    }

    pub fn prev_page(&mut self) -> Option<FetchRequest> {
        let prev = self.model.page.checked_sub(1)?;
        Some(self.set_page(prev))
    }

    /// Step to the next selectable page size, wrapping around.
    pub fn cycle_page_size(&mut self) -> FetchRequest {
        let pos = self
            .page_sizes
            .iter()
            .position(|s| *s == self.model.page_size)
            .map_or(0, |i| (i + 1) % self.page_sizes.len());
        let size = self
            .page_sizes
            .get(pos)
            .copied()
            .unwrap_or(DEFAULT_PAGE_SIZE);
        self.set_page_size(size)
    }

    /// Record a fetch result. Returns `false` when the result belongs to a
    /// superseded request and was dropped.
    ///
    /// Failures keep the previous rows.
    pub fn apply(&mut self, request: FetchRequest, result: Result<Page<T>, CoreError>) -> bool {
        if request.generation != self.generation {
            debug!(
                stale = request.generation,
                latest = self.generation,
                "dropping stale page response"
            );
            return false;
        }
        self.loading = false;
        match result {
            Ok(page) => {
                if page.total_known {
                    self.total = page.total;
                    self.open_ended = false;
                } else {
                    // Without a total, a short page marks the end.
                    let received = u64::try_from(page.data.len()).unwrap_or(u64::MAX);
                    self.total = request.model().offset().saturating_add(received);
                    self.open_ended = received >= u64::from(request.page_size);
                }
                self.rows = page.data;
                self.error = None;
            }
            Err(e) => {
                warn!(
                    page = request.page,
                    page_size = request.page_size,
                    error = %e,
                    "page fetch failed"
                );
                self.error = Some(e.display_message());
            }
        }
        true
    }

    /// Run `fetch` for `request` and apply the result.
    pub async fn run<F, Fut>(&mut self, request: FetchRequest, fetch: F) -> bool
    where
        F: FnOnce(PaginationModel) -> Fut,
        Fut: Future<Output = Result<Page<T>, CoreError>>,
    {
        let result = fetch(request.model()).await;
        self.apply(request, result)
    }

    /// Refetch the current page with `fetch`.
    pub async fn load<F, Fut>(&mut self, fetch: F) -> bool
    where
        F: FnOnce(PaginationModel) -> Fut,
        Fut: Future<Output = Result<Page<T>, CoreError>>,
    {
        let request = self.refresh();
        self.run(request, fetch).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn page(ids: std::ops::Range<u64>, total: u64) -> Page<u64> {
        Page::new(ids.collect(), total)
    }

    #[test]
    fn defaults_to_first_page_of_25() {
        let paginator = Paginator::<u64>::default();
        assert_eq!(
            paginator.model(),
            PaginationModel {
                page: 0,
                page_size: 25
            }
        );
        assert_eq!(paginator.range_label(), "0 of 0");
    }

    #[test]
    fn page_change_applies_rows_and_total() {
        let mut paginator = Paginator::default();
        let req = paginator.set_page(2);
        assert_eq!((req.page, req.page_size), (2, 25));
        assert!(paginator.is_loading());

        assert!(paginator.apply(req, Ok(page(50..75, 312))));
        assert!(!paginator.is_loading());
        assert_eq!(paginator.rows().len(), 25);
        assert_eq!(paginator.total(), 312);
        assert_eq!(paginator.page_count(), 13);
        assert_eq!(paginator.range_label(), "51-75 of 312");
    }

    #[test]
    fn stale_response_is_dropped() {
        let mut paginator = Paginator::default();
        let first = paginator.set_page(1);
        let second = paginator.set_page(2);

        assert!(paginator.apply(second, Ok(page(50..75, 100))));
        assert!(!paginator.apply(first, Ok(page(25..50, 100))));
        assert_eq!(paginator.rows().first(), Some(&50));
        assert_eq!(paginator.model().page, 2);
    }

    #[test]
    fn failure_keeps_rows_and_surfaces_error() {
        let mut paginator = Paginator::default();
        let req = paginator.refresh();
        paginator.apply(req, Ok(page(0..3, 3)));

        let req = paginator.refresh();
        let err = CoreError::Rejected {
            message: "backend down".into(),
            status: 503,
        };
        assert!(paginator.apply(req, Err(err)));
        assert_eq!(paginator.rows(), &[0, 1, 2]);
        assert_eq!(paginator.error(), Some("backend down"));

        let req = paginator.refresh();
        paginator.apply(req, Ok(page(0..1, 1)));
        assert_eq!(paginator.error(), None);
    }

    #[test]
    fn page_size_change_resets_page() {
        let mut paginator = Paginator::<u64>::default().with_page_sizes(&[50, 100, 150]);
        assert_eq!(paginator.model().page_size, 50);
        paginator.set_page(3);

        let req = paginator.set_page_size(100);
        assert_eq!((req.page, req.page_size), (0, 100));
        let req = paginator.cycle_page_size();
        assert_eq!(req.page_size, 150);
        let req = paginator.cycle_page_size();
        assert_eq!(req.page_size, 50);
    }

    #[test]
    fn next_and_prev_respect_bounds() {
        let mut paginator = Paginator::default();
        assert!(paginator.prev_page().is_none());
        let req = paginator.refresh();
        paginator.apply(req, Ok(page(0..25, 30)));

        let next = paginator.next_page().unwrap();
        assert_eq!(next.page, 1);
        paginator.apply(next, Ok(page(25..30, 30)));
        assert!(paginator.next_page().is_none());
        assert_eq!(paginator.prev_page().unwrap().page, 0);
    }

    #[test]
    fn full_page_without_total_allows_next_page() {
        let mut paginator = Paginator::default();
        let req = paginator.refresh();
        paginator.apply(req, Ok(Page::unbounded((0..25).collect())));

        assert!(paginator.is_open_ended());
        assert_eq!(paginator.range_label(), "1-25");
        assert_eq!(paginator.total_label(), "25+");
        assert_eq!(paginator.page_count(), 2);

        let next = paginator.next_page().unwrap();
        assert_eq!((next.page, next.page_size), (1, 25));
        paginator.apply(next, Ok(Page::unbounded((25..50).collect())));
        assert_eq!(paginator.range_label(), "26-50");
        assert_eq!(paginator.page_count(), 3);

        let last = paginator.next_page().unwrap();
        paginator.apply(last, Ok(Page::unbounded((50..60).collect())));
        assert!(!paginator.is_open_ended());
        assert_eq!(paginator.total(), 60);
        assert_eq!(paginator.range_label(), "51-60 of 60");
        assert_eq!(paginator.page_count(), 3);
        assert!(paginator.next_page().is_none());
    }

    #[test]
    fn short_page_without_total_is_complete() {
        let mut paginator = Paginator::default();
        let req = paginator.refresh();
        paginator.apply(req, Ok(Page::unbounded((0..3).collect())));
        assert!(!paginator.is_open_ended());
        assert_eq!(paginator.range_label(), "1-3 of 3");
        assert!(paginator.next_page().is_none());
    }

    #[tokio::test]
    async fn load_passes_the_model_to_fetch() {
        let mut paginator = Paginator::default();
        paginator.set_page(2);
        let applied = paginator
            .load(|model| async move {
                assert_eq!(model, PaginationModel { page: 2, page_size: 25 });
                Ok(page(50..75, 80))
            })
            .await;
        assert!(applied);
        assert_eq!(paginator.range_label(), "51-75 of 80");
    }
}
