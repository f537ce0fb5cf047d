//! List/table protocol
//!
//! A `ListView` is the state behind every paged, sortable, filterable table in
//! the console. The resource-specific part is a `ListSource`: given a
//! `ListRequest` it returns one page of rows and the token of the next page.
//!
//! Contract of a reload:
//! - exactly one `ListSource::list` call per reload, with the request
//!   forwarded unchanged
//! - a successful response replaces the row snapshot wholesale
//! - a failed response goes to the error sink, keeps the previous rows and
//!   yields an empty next-page token; reloads never fail
//! - only the most recently issued reload may write state; responses that
//!   land after a newer reload started are discarded

mod browser;
mod sources;

pub use browser::PipelineBrowser;
pub use sources::{
    ExperimentSource, JobSource, PipelineSource, PipelineVersionSource, RunSource,
};

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Result;
use async_trait::async_trait;
use pipedeck_core::domain::pipeline::Timestamp;
use pipedeck_core::list::{Filter, ListRequest, SortBy, SortOrder, sort_keys};
use tracing::{debug, warn};

/// A row with a stable server-side identity
pub trait TableRow: Clone + Send + Sync + 'static {
    /// Server resource id, used for selection and expansion
    fn id(&self) -> &str;

    /// Creation time, when the resource has one
    fn created_at(&self) -> Option<Timestamp> {
        None
    }
}

/// One page returned by a source
#[derive(Debug, Clone)]
pub struct ListPage<R> {
    pub rows: Vec<R>,
    /// Empty when there are no further pages
    pub next_page_token: String,
}

impl<R> ListPage<R> {
    pub fn new(rows: Vec<R>, next_page_token: impl Into<String>) -> Self {
        Self {
            rows,
            next_page_token: next_page_token.into(),
        }
    }
}

/// Supplies rows for a `ListView`
#[async_trait]
pub trait ListSource: Send + Sync {
    type Row: TableRow;

    /// Fetch the page described by `request`
    async fn list(&self, request: &ListRequest) -> Result<ListPage<Self::Row>>;
}

/// Callback receiving list errors (the page's error banner)
pub type ErrorSink = Box<dyn Fn(&str, &anyhow::Error) + Send + Sync>;

/// Loading state of a view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    Idle,
    Loading,
    Loaded,
    Errored(String),
}

/// Whether a row shows its nested content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpandState {
    #[default]
    Collapsed,
    Expanded,
}

impl ExpandState {
    pub fn toggled(self) -> Self {
        match self {
            ExpandState::Collapsed => ExpandState::Expanded,
            ExpandState::Expanded => ExpandState::Collapsed,
        }
    }
}

struct ViewInner<R> {
    rows: Arc<[R]>,
    state: ViewState,
    generation: u64,
    /// `page_tokens[i]` fetches page `i`; index 0 is always ""
    page_tokens: Vec<String>,
    page: usize,
    sort: Option<SortBy>,
    filter_text: String,
    selection: BTreeSet<String>,
    expansion: HashMap<String, ExpandState>,
}

/// Paged, sortable, filterable view over a `ListSource`
pub struct ListView<S: ListSource> {
    source: S,
    on_error: ErrorSink,
    error_message: String,
    page_size: u32,
    base_filter: Filter,
    inner: Mutex<ViewInner<S::Row>>,
}

impl<S: ListSource> ListView<S> {
    /// Create an idle view
    ///
    /// The initial sort is `created_at desc`, matching the console's tables.
    pub fn new(source: S, page_size: u32, on_error: ErrorSink) -> Self {
        Self {
            source,
            on_error,
            error_message: "Error: failed to retrieve list.".to_string(),
            page_size,
            base_filter: Filter::default(),
            inner: Mutex::new(ViewInner {
                rows: Arc::from(Vec::new()),
                state: ViewState::Idle,
                generation: 0,
                page_tokens: vec![String::new()],
                page: 0,
                sort: Some(SortBy::new(sort_keys::CREATED_AT, SortOrder::Desc)),
                filter_text: String::new(),
                selection: BTreeSet::new(),
                expansion: HashMap::new(),
            }),
        }
    }

    /// Message passed to the error sink when a reload fails
    pub fn with_error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = message.into();
        self
    }

    /// Predicates sent with every request, ahead of the name filter
    pub fn with_base_filter(mut self, filter: Filter) -> Self {
        self.base_filter = filter;
        self
    }

    /// Start with a name filter already applied
    pub fn with_filter(self, text: impl Into<String>) -> Self {
        self.lock().filter_text = text.into();
        self
    }

    /// Replace the initial sort; `None` leaves ordering to the source
    pub fn with_sort(self, sort: Option<SortBy>) -> Self {
        self.lock().sort = sort;
        self
    }

    fn lock(&self) -> MutexGuard<'_, ViewInner<S::Row>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Banner title used when a reload fails
    pub fn error_message(&self) -> &str {
        &self.error_message
    }

    // =============================================================================
    // Fetching
    // =============================================================================

    /// The request the next `reload` would issue
    pub fn current_request(&self) -> ListRequest {
        let inner = self.lock();
        self.request_for(&inner, inner.page)
    }

    fn request_for(&self, inner: &ViewInner<S::Row>, page: usize) -> ListRequest {
        let mut filter = self.base_filter.clone();
        if !inner.filter_text.is_empty() {
            filter
                .predicates
                .extend(Filter::name_contains(inner.filter_text.clone()).predicates);
        }

        ListRequest {
            page_token: inner.page_tokens.get(page).cloned().unwrap_or_default(),
            page_size: self.page_size,
            sort_by: inner.sort.as_ref().map(|s| s.to_string()).unwrap_or_default(),
            filter: filter.encode(),
        }
    }

    /// Issue one list call with `request` and apply its result
    ///
    /// Returns the next-page token, or an empty string when the call failed,
    /// when there are no more pages, or when a newer reload superseded this
    /// one.
    pub async fn reload_with(&self, request: ListRequest) -> String {
        self.fetch(request, None).await.unwrap_or_default()
    }

    /// Reload the current page
    pub async fn reload(&self) -> String {
        let (request, page) = {
            let inner = self.lock();
            (self.request_for(&inner, inner.page), inner.page)
        };
        self.fetch(request, Some(page)).await.unwrap_or_default()
    }

    /// Move to the next page, if the last fetch reported one
    pub async fn next_page(&self) -> Option<String> {
        let (request, page) = {
            let inner = self.lock();
            let page = inner.page + 1;
            if page >= inner.page_tokens.len() {
                return None;
            }
            (self.request_for(&inner, page), page)
        };
        Some(self.fetch(request, Some(page)).await.unwrap_or_default())
    }

    /// Move to the previous page
    pub async fn previous_page(&self) -> Option<String> {
        let (request, page) = {
            let inner = self.lock();
            let page = inner.page.checked_sub(1)?;
            (self.request_for(&inner, page), page)
        };
        Some(self.fetch(request, Some(page)).await.unwrap_or_default())
    }

    /// Sort by `key` and go back to the first page
    ///
    /// Clicking the active column flips its order; a new column starts
    /// descending.
    pub async fn sort_by_column(&self, key: &str) -> String {
        {
            let mut inner = self.lock();
            let order = match &inner.sort {
                Some(current) if current.field == key => current.order.flipped(),
                _ => SortOrder::Desc,
            };
            inner.sort = Some(SortBy::new(key, order));
            reset_paging(&mut inner);
        }
        self.reload().await
    }

    /// Filter rows by name and go back to the first page
    pub async fn set_filter(&self, text: impl Into<String>) -> String {
        {
            let mut inner = self.lock();
            inner.filter_text = text.into();
            reset_paging(&mut inner);
        }
        self.reload().await
    }

    async fn fetch(&self, request: ListRequest, page: Option<usize>) -> Option<String> {
        let generation = {
            let mut inner = self.lock();
            inner.generation += 1;
            inner.state = ViewState::Loading;
            inner.generation
        };

        let result = self.source.list(&request).await;

        let mut inner = self.lock();
        if inner.generation != generation {
            debug!(
                generation,
                latest = inner.generation,
                "discarding superseded list response"
            );
            return None;
        }

        match result {
            Ok(list_page) => {
                debug!(rows = list_page.rows.len(), "list page loaded");
                inner.rows = Arc::from(list_page.rows);
                inner.expansion.clear();
                inner.state = ViewState::Loaded;
                if let Some(page) = page {
                    inner.page = page;
                    inner.page_tokens.truncate(page + 1);
                    if !list_page.next_page_token.is_empty() {
                        inner.page_tokens.push(list_page.next_page_token.clone());
                    }
                }
                Some(list_page.next_page_token)
            }
            Err(err) => {
                inner.state = ViewState::Errored(format!("{:#}", err));
                drop(inner);

                warn!(error = %format!("{:#}", err), "{}", self.error_message);
                (self.on_error)(&self.error_message, &err);
                Some(String::new())
            }
        }
    }

    // =============================================================================
    // Snapshot Accessors
    // =============================================================================

    /// Rows of the last successful fetch
    pub fn rows(&self) -> Arc<[S::Row]> {
        self.lock().rows.clone()
    }

    pub fn state(&self) -> ViewState {
        self.lock().state.clone()
    }

    /// Zero-based index of the displayed page
    pub fn page_index(&self) -> usize {
        self.lock().page
    }

    pub fn has_next_page(&self) -> bool {
        let inner = self.lock();
        inner.page + 1 < inner.page_tokens.len()
    }

    pub fn sort(&self) -> Option<SortBy> {
        self.lock().sort.clone()
    }

    pub fn filter_text(&self) -> String {
        self.lock().filter_text.clone()
    }

    // =============================================================================
    // Selection
    // =============================================================================

    /// Select a displayed row; returns false when no row has that id
    pub fn select(&self, id: &str) -> bool {
        let mut inner = self.lock();
        if !inner.rows.iter().any(|r| r.id() == id) {
            return false;
        }
        inner.selection.insert(id.to_string());
        true
    }

    pub fn deselect(&self, id: &str) -> bool {
        self.lock().selection.remove(id)
    }

    /// Flip selection of a displayed row; returns whether it is now selected
    pub fn toggle_selection(&self, id: &str) -> bool {
        if self.deselect(id) {
            false
        } else {
            self.select(id)
        }
    }

    /// Replace the selection, e.g. with ids kept by the host page
    pub fn set_selection<I, T>(&self, ids: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.lock().selection = ids.into_iter().map(Into::into).collect();
    }

    pub fn clear_selection(&self) {
        self.lock().selection.clear();
    }

    pub fn selected_ids(&self) -> Vec<String> {
        self.lock().selection.iter().cloned().collect()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.lock().selection.contains(id)
    }

    /// Whether the delete action applies, i.e. something is selected
    pub fn delete_enabled(&self) -> bool {
        !self.lock().selection.is_empty()
    }

    // =============================================================================
    // Expansion
    // =============================================================================

    pub fn expand_state(&self, id: &str) -> ExpandState {
        self.lock().expansion.get(id).copied().unwrap_or_default()
    }

    /// Flip one row between collapsed and expanded
    ///
    /// Returns the new state, or `None` when no displayed row has that id.
    pub fn toggle_expansion(&self, id: &str) -> Option<ExpandState> {
        let mut inner = self.lock();
        if !inner.rows.iter().any(|r| r.id() == id) {
            return None;
        }
        let state = inner.expansion.entry(id.to_string()).or_default();
        *state = state.toggled();
        Some(*state)
    }
}

fn reset_paging<R>(inner: &mut ViewInner<R>) {
    inner.page = 0;
    inner.page_tokens.truncate(1);
}

/// Order rows newest first without touching the input order of equal rows
///
/// Rows without a creation time rank above every timestamped row and compare
/// equal to each other.
pub fn sort_newest_first<R: TableRow>(rows: &[R]) -> Vec<R> {
    let mut sorted = rows.to_vec();
    sorted.sort_by(|a, b| match (a.created_at(), b.created_at()) {
        (None, None) => std::cmp::Ordering::Equal,
        (None, Some(_)) => std::cmp::Ordering::Less,
        (Some(_), None) => std::cmp::Ordering::Greater,
        (Some(a), Some(b)) => b.cmp(&a),
    });
    sorted
}

/// Error sink that only logs
pub fn log_errors() -> ErrorSink {
    Box::new(|message, err| warn!(error = %format!("{:#}", err), "{}", message))
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::VecDeque;

    /// Scripted source recording every request it receives
    pub struct FakeSource<R> {
        pub calls: Mutex<Vec<ListRequest>>,
        pub responses: Mutex<VecDeque<Result<ListPage<R>>>>,
    }

    impl<R> FakeSource<R> {
        pub fn new(responses: Vec<Result<ListPage<R>>>) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                responses: Mutex::new(responses.into()),
            }
        }

        pub fn calls(&self) -> Vec<ListRequest> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl<R: TableRow> ListSource for FakeSource<R> {
        type Row = R;

        async fn list(&self, request: &ListRequest) -> Result<ListPage<R>> {
            self.calls.lock().unwrap().push(request.clone());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(ListPage::new(Vec::new(), "")))
        }
    }

    /// Error sink collecting messages
    pub fn collecting_sink() -> (ErrorSink, Arc<Mutex<Vec<String>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink_seen = seen.clone();
        let sink: ErrorSink = Box::new(move |message, err| {
            sink_seen
                .lock()
                .unwrap()
                .push(format!("{} {}", message, err));
        });
        (sink, seen)
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{FakeSource, collecting_sink};
    use super::*;
    use chrono::{TimeZone, Utc};
    use pipedeck_core::domain::pipeline::PipelineVersion;
    use tokio::sync::Notify;

    fn version(i: usize) -> PipelineVersion {
        PipelineVersion {
            id: format!("test-pipeline-version-id{}", i),
            name: format!("test pipeline version name{}", i),
            ..Default::default()
        }
    }

    fn versions(n: usize) -> Vec<PipelineVersion> {
        (0..n).map(version).collect()
    }

    async fn mount_with_n_pipeline_versions(
        n: usize,
    ) -> ListView<FakeSource<PipelineVersion>> {
        let source = FakeSource::new(vec![Ok(ListPage::new(versions(n), ""))]);
        let view = ListView::new(source, 10, log_errors());
        view.reload().await;
        view
    }

    #[tokio::test]
    async fn test_mount_displays_rows_and_selection_enables_delete() {
        let view = mount_with_n_pipeline_versions(3).await;

        let names: Vec<String> = view.rows().iter().map(|v| v.name.clone()).collect();
        assert_eq!(
            names,
            vec![
                "test pipeline version name0",
                "test pipeline version name1",
                "test pipeline version name2"
            ]
        );
        assert_eq!(view.state(), ViewState::Loaded);
        assert!(!view.delete_enabled());

        assert!(view.select("test-pipeline-version-id1"));
        assert_eq!(view.selected_ids(), vec!["test-pipeline-version-id1"]);
        assert!(view.delete_enabled());
    }

    #[tokio::test]
    async fn test_initial_request_uses_default_paging_and_sort() {
        let view = mount_with_n_pipeline_versions(1).await;
        assert_eq!(
            view.source().calls(),
            vec![ListRequest {
                page_token: String::new(),
                page_size: 10,
                sort_by: "created_at desc".to_string(),
                filter: String::new(),
            }]
        );
    }

    #[tokio::test]
    async fn test_reload_with_forwards_request_unchanged() {
        let source = FakeSource::new(vec![Ok(ListPage::new(versions(2), "next"))]);
        let view = ListView::new(source, 10, log_errors());
        let request = ListRequest {
            page_token: "tok-7".to_string(),
            page_size: 25,
            sort_by: "name".to_string(),
            filter: "Zm9v".to_string(),
        };

        let token = view.reload_with(request.clone()).await;

        assert_eq!(token, "next");
        assert_eq!(view.source().calls(), vec![request]);
    }

    #[tokio::test]
    async fn test_reload_replaces_rows_instead_of_appending() {
        let source = FakeSource::new(vec![
            Ok(ListPage::new(versions(3), "")),
            Ok(ListPage::new(vec![version(7)], "")),
        ]);
        let view = ListView::new(source, 10, log_errors());

        view.reload().await;
        view.reload().await;

        let rows = view.rows();
        let ids: Vec<&str> = rows.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["test-pipeline-version-id7"]);
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_rows_and_reports_error() {
        let source = FakeSource::new(vec![
            Ok(ListPage::new(versions(2), "more")),
            Err(anyhow::anyhow!("backend unavailable")),
        ]);
        let (sink, seen) = collecting_sink();
        let view = ListView::new(source, 10, sink).with_error_message("Error: failed to fetch runs.");

        assert_eq!(view.reload().await, "more");
        let token = view.reload().await;

        assert_eq!(token, "");
        assert_eq!(view.rows().len(), 2);
        assert!(matches!(view.state(), ViewState::Errored(ref m) if m.contains("backend unavailable")));
        assert_eq!(
            seen.lock().unwrap().clone(),
            vec!["Error: failed to fetch runs. backend unavailable"]
        );
    }

    #[tokio::test]
    async fn test_errored_view_can_reload_again() {
        let source = FakeSource::new(vec![
            Err(anyhow::anyhow!("boom")),
            Ok(ListPage::new(versions(1), "")),
        ]);
        let view = ListView::new(source, 10, log_errors());

        view.reload().await;
        assert!(matches!(view.state(), ViewState::Errored(_)));
        view.reload().await;
        assert_eq!(view.state(), ViewState::Loaded);
        assert_eq!(view.rows().len(), 1);
    }

    #[tokio::test]
    async fn test_paging_walks_token_stack() {
        let source = FakeSource::new(vec![
            Ok(ListPage::new(vec![version(0)], "t1")),
            Ok(ListPage::new(vec![version(1)], "t2")),
            Ok(ListPage::new(vec![version(2)], "")),
            Ok(ListPage::new(vec![version(1)], "t2")),
        ]);
        let view = ListView::new(source, 1, log_errors());

        view.reload().await;
        assert!(view.has_next_page());
        assert_eq!(view.next_page().await, Some("t2".to_string()));
        assert_eq!(view.next_page().await, Some(String::new()));
        assert!(!view.has_next_page());
        assert_eq!(view.next_page().await, None);
        assert_eq!(view.page_index(), 2);

        view.previous_page().await;
        assert_eq!(view.page_index(), 1);

        let tokens: Vec<String> = view
            .source()
            .calls()
            .into_iter()
            .map(|r| r.page_token)
            .collect();
        assert_eq!(tokens, vec!["", "t1", "t2", "t1"]);
    }

    #[tokio::test]
    async fn test_sort_column_flips_and_resets_paging() {
        let source = FakeSource::new(vec![Ok(ListPage::new(versions(1), "t1"))]);
        let view = ListView::new(source, 10, log_errors());
        view.reload().await;
        view.next_page().await;

        view.sort_by_column("name").await;
        view.sort_by_column("name").await;
        view.sort_by_column("created_at").await;

        let calls = view.source().calls();
        let sorts: Vec<&str> = calls.iter().map(|r| r.sort_by.as_str()).collect();
        assert_eq!(
            sorts,
            vec!["created_at desc", "created_at desc", "name desc", "name", "created_at desc"]
        );
        assert!(calls[2..].iter().all(|r| r.page_token.is_empty()));
        assert_eq!(view.page_index(), 0);
    }

    #[tokio::test]
    async fn test_filter_is_encoded_as_name_predicate() {
        let source = FakeSource::<PipelineVersion>::new(Vec::new());
        let view = ListView::new(source, 10, log_errors());

        view.set_filter("mnist").await;
        view.set_filter("").await;

        let calls = view.source().calls();
        assert_eq!(
            Filter::decode(&calls[0].filter).unwrap(),
            Filter::name_contains("mnist")
        );
        assert_eq!(calls[1].filter, "");
    }

    #[tokio::test]
    async fn test_base_filter_is_combined_with_name_filter() {
        use pipedeck_core::list::{Predicate, PredicateOp};

        let archived = Predicate::string("storage_state", PredicateOp::Equals, "STORAGESTATE_ARCHIVED");
        let view = ListView::new(FakeSource::<PipelineVersion>::new(Vec::new()), 10, log_errors())
            .with_base_filter(Filter::default().and(archived.clone()));

        view.reload().await;
        view.set_filter("train").await;

        let calls = view.source().calls();
        assert_eq!(
            Filter::decode(&calls[0].filter).unwrap(),
            Filter::default().and(archived.clone())
        );
        let combined = Filter::decode(&calls[1].filter).unwrap();
        assert_eq!(combined.predicates.len(), 2);
        assert_eq!(combined.predicates[0], archived);
    }

    #[tokio::test]
    async fn test_toggle_expansion_is_per_row_and_ignores_selection() {
        let view = mount_with_n_pipeline_versions(3).await;
        view.select("test-pipeline-version-id2");

        let id = "test-pipeline-version-id0";
        assert_eq!(view.toggle_expansion(id), Some(ExpandState::Expanded));
        assert_eq!(view.expand_state("test-pipeline-version-id1"), ExpandState::Collapsed);
        assert_eq!(view.toggle_expansion(id), Some(ExpandState::Collapsed));

        for i in 0..3 {
            assert_eq!(
                view.expand_state(&format!("test-pipeline-version-id{}", i)),
                ExpandState::Collapsed
            );
        }
        assert_eq!(view.selected_ids(), vec!["test-pipeline-version-id2"]);
        assert_eq!(view.toggle_expansion("missing"), None);
    }

    #[tokio::test]
    async fn test_selection_survives_reload_and_reorder() {
        let mut reordered = versions(3);
        reordered.reverse();
        let source = FakeSource::new(vec![
            Ok(ListPage::new(versions(3), "")),
            Ok(ListPage::new(reordered, "")),
        ]);
        let view = ListView::new(source, 10, log_errors());
        view.reload().await;
        view.select("test-pipeline-version-id0");

        view.reload().await;

        assert!(view.is_selected("test-pipeline-version-id0"));
        assert_eq!(view.rows()[2].id, "test-pipeline-version-id0");
        assert!(!view.toggle_selection("test-pipeline-version-id0"));
        assert!(!view.delete_enabled());
        assert!(!view.select("unknown"));
    }

    struct GatedSource {
        started: Notify,
        gate: Notify,
        fail_slow: bool,
    }

    impl GatedSource {
        fn new(fail_slow: bool) -> Self {
            Self {
                started: Notify::new(),
                gate: Notify::new(),
                fail_slow,
            }
        }
    }

    #[async_trait]
    impl ListSource for GatedSource {
        type Row = PipelineVersion;

        async fn list(&self, request: &ListRequest) -> Result<ListPage<PipelineVersion>> {
            if request.page_token == "slow" {
                self.started.notify_one();
                self.gate.notified().await;
                if self.fail_slow {
                    anyhow::bail!("stale failure");
                }
                return Ok(ListPage::new(vec![version(0)], "stale-token"));
            }
            Ok(ListPage::new(vec![version(1)], "fresh-token"))
        }
    }

    #[tokio::test]
    async fn test_superseded_reload_is_discarded() {
        let view = Arc::new(ListView::new(GatedSource::new(false), 10, log_errors()));

        let slow_view = view.clone();
        let slow = tokio::spawn(async move {
            slow_view
                .reload_with(ListRequest {
                    page_token: "slow".to_string(),
                    ..Default::default()
                })
                .await
        });
        view.source().started.notified().await;
        assert_eq!(view.state(), ViewState::Loading);

        let fresh = view.reload_with(ListRequest::default()).await;
        view.source().gate.notify_one();
        let stale = slow.await.unwrap();

        assert_eq!(fresh, "fresh-token");
        assert_eq!(stale, "");
        assert_eq!(view.rows()[0].id, "test-pipeline-version-id1");
        assert_eq!(view.state(), ViewState::Loaded);
    }

    #[tokio::test]
    async fn test_superseded_failure_is_not_reported() {
        let (sink, seen) = collecting_sink();
        let view = Arc::new(ListView::new(GatedSource::new(true), 10, sink));

        let slow_view = view.clone();
        let slow = tokio::spawn(async move {
            slow_view
                .reload_with(ListRequest {
                    page_token: "slow".to_string(),
                    ..Default::default()
                })
                .await
        });
        view.source().started.notified().await;
        assert_eq!(view.state(), ViewState::Loading);

        let fresh = view.reload_with(ListRequest::default()).await;
        view.source().gate.notify_one();
        let stale = slow.await.unwrap();

        assert_eq!(fresh, "fresh-token");
        assert_eq!(stale, "");
        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(view.state(), ViewState::Loaded);
        assert_eq!(view.rows()[0].id, "test-pipeline-version-id1");
    }

    #[test]
    fn test_sort_newest_first_puts_missing_timestamps_first() {
        let t1 = Utc.with_ymd_and_hms(2019, 1, 1, 0, 0, 0).unwrap();
        let t3 = Utc.with_ymd_and_hms(2019, 3, 1, 0, 0, 0).unwrap();
        let rows = vec![
            PipelineVersion {
                id: "1".to_string(),
                created_at: Some(t1),
                ..Default::default()
            },
            PipelineVersion {
                id: "2".to_string(),
                ..Default::default()
            },
            PipelineVersion {
                id: "3".to_string(),
                created_at: Some(t3),
                ..Default::default()
            },
        ];

        let sorted = sort_newest_first(&rows);

        let ids: Vec<&str> = sorted.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3", "1"]);
        assert_eq!(rows[0].id, "1");
    }

    #[test]
    fn test_sort_newest_first_keeps_untimestamped_rows_stable() {
        let rows = vec![
            PipelineVersion {
                id: "a".to_string(),
                ..Default::default()
            },
            PipelineVersion {
                id: "b".to_string(),
                ..Default::default()
            },
        ];
        let ids: Vec<String> = sort_newest_first(&rows).into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
