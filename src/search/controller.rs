//! Debounced, cancellable food search.
//!
//! Every qualifying edit restarts a quiet-period timer in a spawned task.
//! When the timer runs out the task issues one catalog request and sends
//! the outcome back over a channel. Each task owns a [`CancellationToken`]
//! that is cancelled on the next edit or on teardown, and every message
//! carries the generation it was started for; the controller only applies
//! messages of the current generation.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::error::Result;
use crate::models::SearchResult;
use crate::nutrition::constants::{MIN_QUERY_LEN, SEARCH_DEBOUNCE_MS};
use crate::state::{FoodCatalog, SessionContext};

const SEARCH_ERROR_MESSAGE: &str = "Errore durante la ricerca alimenti.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    /// No query worth searching.
    Idle,
    /// Waiting for the quiet period to elapse.
    Debouncing,
    /// Request sent, waiting for the catalog.
    InFlight,
    /// Results (possibly empty) are current.
    Settled,
    /// The last request failed; see [`FoodSearchController::error`].
    Errored,
}

#[derive(Debug)]
enum SearchEvent {
    Started {
        generation: u64,
    },
    Finished {
        generation: u64,
        outcome: Result<Vec<SearchResult>>,
    },
}

impl SearchEvent {
    fn generation(&self) -> u64 {
        match self {
            SearchEvent::Started { generation } | SearchEvent::Finished { generation, .. } => {
                *generation
            }
        }
    }
}

/// Search state of one add-food dialog.
///
/// Must be used inside a tokio runtime: edits spawn the timer task.
pub struct FoodSearchController {
    catalog: Arc<dyn FoodCatalog>,
    session: SessionContext,
    debounce: Duration,
    min_query_len: usize,

    query: String,
    phase: SearchPhase,
    results: Vec<SearchResult>,
    error: Option<String>,
    selected: Option<SearchResult>,

    generation: u64,
    pending: Option<CancellationToken>,
    tx: mpsc::UnboundedSender<SearchEvent>,
    rx: mpsc::UnboundedReceiver<SearchEvent>,
}

impl FoodSearchController {
    pub fn new(catalog: Arc<dyn FoodCatalog>, session: SessionContext) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            catalog,
            session,
            debounce: Duration::from_millis(SEARCH_DEBOUNCE_MS),
            min_query_len: MIN_QUERY_LEN,
            query: String::new(),
            phase: SearchPhase::Idle,
            results: Vec::new(),
            error: None,
            selected: None,
            generation: 0,
            pending: None,
            tx,
            rx,
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_min_query_len(mut self, min_query_len: usize) -> Self {
        self.min_query_len = min_query_len;
        self
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn phase(&self) -> SearchPhase {
        self.phase
    }

    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The food picked from the results, pending confirmation.
    pub fn selected(&self) -> Option<&SearchResult> {
        self.selected.as_ref()
    }

    /// Replace the query text, as on every keystroke.
    ///
    /// Clears any selection. Short queries clear results at once; longer
    /// ones (re)start the quiet-period timer.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.selected = None;
        self.cancel_pending();

        let trimmed = self.query.trim().to_string();
        if trimmed.chars().count() < self.min_query_len {
            self.results.clear();
            self.error = None;
            self.phase = SearchPhase::Idle;
            return;
        }

        self.phase = SearchPhase::Debouncing;
        self.spawn_search(trimmed);
    }

    /// Pick a result: it becomes the pending food, query and results are cleared.
    pub fn select(&mut self, index: usize) -> Option<&SearchResult> {
        let choice = self.results.get(index)?.clone();
        self.cancel_pending();
        self.query.clear();
        self.results.clear();
        self.error = None;
        self.phase = SearchPhase::Idle;
        self.selected = Some(choice);
        self.selected.as_ref()
    }

    /// Tear down: any outstanding request is abandoned and all state reset.
    pub fn close(&mut self) {
        self.cancel_pending();
        self.query.clear();
        self.results.clear();
        self.error = None;
        self.selected = None;
        self.phase = SearchPhase::Idle;
    }

    /// Wait for the next message of the search task and apply it.
    ///
    /// Returns immediately when nothing is pending.
    pub async fn next_event(&mut self) -> SearchPhase {
        while self.is_busy() {
            let Some(event) = self.rx.recv().await else {
                break;
            };
            if self.apply(event) {
                break;
            }
        }
        self.phase
    }

    /// Wait until the current query has settled, errored or been dropped.
    pub async fn settle(&mut self) -> SearchPhase {
        while self.is_busy() {
            self.next_event().await;
        }
        self.phase
    }

    /// Apply whatever messages have already arrived, without waiting.
    pub fn pump(&mut self) -> SearchPhase {
        while let Ok(event) = self.rx.try_recv() {
            self.apply(event);
        }
        self.phase
    }

    fn is_busy(&self) -> bool {
        matches!(self.phase, SearchPhase::Debouncing | SearchPhase::InFlight)
    }

    /// Returns whether the event was current.
    fn apply(&mut self, event: SearchEvent) -> bool {
        if event.generation() != self.generation {
            trace!(
                generation = event.generation(),
                current = self.generation,
                "discarding stale search message"
            );
            return false;
        }

        match event {
            SearchEvent::Started { .. } => {
                self.error = None;
                self.phase = SearchPhase::InFlight;
            }
            SearchEvent::Finished {
                outcome: Ok(results),
                ..
            } => {
                debug!(query = %self.query, count = results.len(), "search settled");
                self.results = results;
                self.error = None;
                self.phase = SearchPhase::Settled;
            }
            SearchEvent::Finished {
                outcome: Err(e), ..
            } => {
                warn!(query = %self.query, error = %e, transient = e.is_transient(), "food search failed");
                self.results.clear();
                self.error = Some(SEARCH_ERROR_MESSAGE.to_string());
                self.phase = SearchPhase::Errored;
            }
        }
        true
    }

    fn cancel_pending(&mut self) {
        self.generation += 1;
        if let Some(token) = self.pending.take() {
            token.cancel();
        }
    }

    fn spawn_search(&mut self, query: String) {
        let token = CancellationToken::new();
        self.pending = Some(token.clone());

        let generation = self.generation;
        let debounce = self.debounce;
        let catalog = Arc::clone(&self.catalog);
        let session = self.session.clone();
        let tx = self.tx.clone();

        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => return,
                _ = tokio::time::sleep(debounce) => {}
            }
            if tx.send(SearchEvent::Started { generation }).is_err() {
                return;
            }

            debug!(query = %query, "searching food catalog");
            let outcome = catalog.search_foods(&session, &query).await;

            if token.is_cancelled() {
                trace!(query = %query, "search abandoned, result dropped");
                return;
            }
            let _ = tx.send(SearchEvent::Finished { generation, outcome });
        });
    }
}

impl Drop for FoodSearchController {
    fn drop(&mut self) {
        if let Some(token) = self.pending.take() {
            token.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlanError;
    use crate::models::NutrientValue;
    use crate::state::PortionRequest;
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingCatalog {
        calls: Mutex<Vec<String>>,
        slow: Vec<(String, Duration)>,
        fail: bool,
    }

    impl RecordingCatalog {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl FoodCatalog for RecordingCatalog {
        async fn search_foods(&self, _session: &SessionContext, query: &str) -> Result<Vec<SearchResult>> {
            self.calls.lock().unwrap().push(query.to_string());
            if let Some((_, delay)) = self.slow.iter().find(|(q, _)| q == query) {
                tokio::time::sleep(*delay).await;
            }
            if self.fail {
                return Err(PlanError::Request("catalog down".to_string()));
            }
            Ok(vec![SearchResult {
                food_code: format!("code-{query}"),
                name: query.to_string(),
                category: None,
                kcal_per100: NutrientValue::Number(100.0),
                protein_per100: "1,5".into(),
                carb_per100: "tr".into(),
                fat_per100: "".into(),
            }])
        }

        async fn compute_micronutrients(
            &self,
            _session: &SessionContext,
            _portions: &[PortionRequest],
        ) -> Result<BTreeMap<String, f64>> {
            Ok(BTreeMap::new())
        }
    }

    fn controller(catalog: &Arc<RecordingCatalog>) -> FoodSearchController {
        FoodSearchController::new(catalog.clone(), SessionContext::anonymous())
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_query_never_searches() {
        let catalog = Arc::new(RecordingCatalog::default());
        let mut search = controller(&catalog);

        search.set_query("p");
        assert_eq!(search.phase(), SearchPhase::Idle);
        search.set_query(" p ");
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert_eq!(search.settle().await, SearchPhase::Idle);
        assert!(catalog.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_edits_issue_one_request() {
        let catalog = Arc::new(RecordingCatalog::default());
        let mut search = controller(&catalog);

        search.set_query("pa");
        tokio::time::sleep(Duration::from_millis(100)).await;
        search.set_query("pas");
        tokio::time::sleep(Duration::from_millis(200)).await;
        search.set_query("past");
        assert_eq!(search.phase(), SearchPhase::Debouncing);

        assert_eq!(search.settle().await, SearchPhase::Settled);
        assert_eq!(catalog.calls(), vec!["past".to_string()]);
        assert_eq!(search.results()[0].name, "past");
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_query_clears_results() {
        let catalog = Arc::new(RecordingCatalog::default());
        let mut search = controller(&catalog);

        search.set_query("riso");
        search.settle().await;
        assert_eq!(search.results().len(), 1);

        search.set_query("r");
        assert!(search.results().is_empty());
        assert_eq!(search.phase(), SearchPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_dialog_drops_late_result() {
        let catalog = Arc::new(RecordingCatalog {
            slow: vec![("pasta".to_string(), Duration::from_secs(1))],
            ..Default::default()
        });
        let mut search = controller(&catalog);

        search.set_query("pasta");
        assert_eq!(search.next_event().await, SearchPhase::InFlight);
        search.close();

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(search.pump(), SearchPhase::Idle);
        assert!(search.results().is_empty());
        assert_eq!(catalog.calls(), vec!["pasta".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_query_wins_over_slow_one() {
        let catalog = Arc::new(RecordingCatalog {
            slow: vec![("pasta".to_string(), Duration::from_secs(1))],
            ..Default::default()
        });
        let mut search = controller(&catalog);

        search.set_query("pasta");
        assert_eq!(search.next_event().await, SearchPhase::InFlight);
        search.set_query("pollo");
        assert_eq!(search.settle().await, SearchPhase::Settled);

        tokio::time::sleep(Duration::from_secs(2)).await;
        search.pump();
        assert_eq!(search.results().len(), 1);
        assert_eq!(search.results()[0].name, "pollo");
        assert_eq!(catalog.calls(), vec!["pasta".to_string(), "pollo".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_sets_error_only() {
        let catalog = Arc::new(RecordingCatalog {
            fail: true,
            ..Default::default()
        });
        let mut search = controller(&catalog);

        search.set_query("pollo");
        assert_eq!(search.settle().await, SearchPhase::Errored);
        assert!(search.results().is_empty());
        assert_eq!(search.error(), Some(SEARCH_ERROR_MESSAGE));
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_clears_query_and_results() {
        let catalog = Arc::new(RecordingCatalog::default());
        let mut search = controller(&catalog);

        search.set_query("avena");
        search.settle().await;
        let picked = search.select(0).cloned().unwrap();

        assert_eq!(picked.food_code, "code-avena");
        assert_eq!(search.query(), "");
        assert!(search.results().is_empty());
        assert_eq!(search.selected(), Some(&picked));
        assert!(search.select(0).is_none());

        search.set_query("av");
        assert!(search.selected().is_none());
    }
}
