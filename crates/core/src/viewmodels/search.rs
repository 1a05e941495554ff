use futures::stream::BoxStream;
use futures::StreamExt;
use log::debug;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::SearchConfig;
use crate::models::preferences::SearchStatistics;
use crate::models::resource::NetworkResult;
use crate::models::search::SymbolMatch;
use crate::services::stock_repository::StockRepository;
use crate::storage::preferences_store::PreferencesStore;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    /// Query the visible results belong to.
    pub query: String,
    pub is_searching: bool,
    pub results: Vec<SymbolMatch>,
    pub error: Option<String>,
}

/// State shared between the view model, its debounce loop and the
/// in-flight search task.
struct SearchShared {
    repository: Arc<StockRepository>,
    state: watch::Sender<SearchState>,
    /// Bumped whenever a search starts or is cancelled. Events carrying an
    /// older generation are dropped.
    generation: AtomicU64,
    in_flight: Mutex<Option<JoinHandle<()>>>,
    /// Last query handed to the repository, for duplicate suppression.
    last_searched: Mutex<Option<String>>,
}

impl SearchShared {
    /// Start searching `query`, abandoning whatever was in flight.
    ///
    /// The generation bump and the handle swap happen under the
    /// `in_flight` lock, so the task holding the newest generation is
    /// always the one left running.
    fn start_search(self: &Arc<Self>, query: String) {
        let mut in_flight = self.in_flight.lock();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *self.last_searched.lock() = Some(query.clone());
        debug!("Searching symbols for {query:?}");

        let shared = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let mut events = shared.repository.search_symbol(&query);
            while let Some(event) = events.next().await {
                shared.apply(generation, &query, event);
            }
        });

        if let Some(previous) = in_flight.replace(handle) {
            previous.abort();
        }
    }

    fn cancel(&self) {
        let mut in_flight = self.in_flight.lock();
        self.generation.fetch_add(1, Ordering::SeqCst);
        *self.last_searched.lock() = None;
        if let Some(previous) = in_flight.take() {
            previous.abort();
        }
    }

    fn apply(&self, generation: u64, query: &str, event: NetworkResult<Vec<SymbolMatch>>) {
        self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            match event {
                NetworkResult::Loading => {
                    state.is_searching = true;
                    state.error = None;
                }
                NetworkResult::Success(matches) => {
                    state.query = query.to_string();
                    state.is_searching = false;
                    state.results = matches;
                    state.error = None;
                }
                NetworkResult::Error(message) => {
                    state.query = query.to_string();
                    state.is_searching = false;
                    state.results.clear();
                    state.error = Some(message);
                }
            }
            true
        });
    }

    fn set_error(&self, message: impl Into<String>) {
        let message = message.into();
        self.state.send_modify(|state| state.error = Some(message));
    }
}

/// Search screen: debounced symbol search plus recent-search history.
///
/// Typing goes through [`update_query`](Self::update_query). A background
/// loop waits for the configured quiet period, drops queries shorter than
/// the minimum length or identical to the previous search, and starts a
/// search. Only the latest search may touch the visible state.
///
/// Must be created inside a Tokio runtime. Background work stops on drop.
pub struct SearchViewModel {
    shared: Arc<SearchShared>,
    preferences: PreferencesStore,
    config: SearchConfig,
    query: watch::Sender<String>,
    debounce_task: JoinHandle<()>,
}

impl SearchViewModel {
    pub fn new(
        repository: Arc<StockRepository>,
        preferences: PreferencesStore,
        config: SearchConfig,
    ) -> Self {
        let (state, _rx) = watch::channel(SearchState::default());
        let shared = Arc::new(SearchShared {
            repository,
            state,
            generation: AtomicU64::new(0),
            in_flight: Mutex::new(None),
            last_searched: Mutex::new(None),
        });

        let (query, query_rx) = watch::channel(String::new());
        let debounce_task = tokio::spawn(debounce_loop(Arc::clone(&shared), query_rx, config));

        Self {
            shared,
            preferences,
            config,
            query,
            debounce_task,
        }
    }

    pub fn state(&self) -> SearchState {
        self.shared.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.shared.state.subscribe()
    }

    /// Raw text as last typed.
    pub fn query(&self) -> String {
        self.query.borrow().clone()
    }

    pub fn update_query(&self, query: &str) {
        self.query.send_replace(query.to_string());
        if query.trim().is_empty() {
            self.reset();
        }
    }

    pub fn clear_query(&self) {
        self.query.send_replace(String::new());
        self.reset();
    }

    /// Run the current query again right away, bypassing the debounce and
    /// duplicate suppression.
    pub fn retry(&self) {
        let query = self.query.borrow().trim().to_string();
        if query.chars().count() >= self.config.min_query_len {
            self.shared.start_search(query);
        }
    }

    // ── Recent searches ─────────────────────────────────────────────

    pub fn recent_searches(&self) -> BoxStream<'static, Vec<String>> {
        self.preferences.recent_searches()
    }

    pub fn search_statistics(&self) -> BoxStream<'static, SearchStatistics> {
        self.preferences.search_statistics()
    }

    pub fn add_to_recent_searches(&self, query: &str) {
        if let Err(e) = self.preferences.add_recent_search(query) {
            debug!("add_recent_search failed: {e}");
            self.shared.set_error("Failed to add to recent searches");
        }
    }

    pub fn remove_from_recent_searches(&self, query: &str) {
        if let Err(e) = self.preferences.remove_recent_search(query) {
            debug!("remove_recent_search failed: {e}");
            self.shared.set_error("Failed to remove recent search");
        }
    }

    pub fn clear_recent_searches(&self) {
        if let Err(e) = self.preferences.clear_recent_searches() {
            debug!("clear_recent_searches failed: {e}");
            self.shared.set_error("Failed to clear recent searches");
        }
    }

    fn reset(&self) {
        self.shared.cancel();
        self.shared.state.send_modify(|state| {
            state.query.clear();
            state.is_searching = false;
            state.results.clear();
            state.error = None;
        });
    }
}

impl Drop for SearchViewModel {
    fn drop(&mut self) {
        self.debounce_task.abort();
        self.shared.cancel();
    }
}

/// Waits for the query to settle, filters it, then hands it to
/// [`SearchShared::start_search`].
async fn debounce_loop(
    shared: Arc<SearchShared>,
    mut query_rx: watch::Receiver<String>,
    config: SearchConfig,
) {
    loop {
        if query_rx.changed().await.is_err() {
            return;
        }

        // Every change restarts the quiet period.
        loop {
            tokio::select! {
                changed = query_rx.changed() => {
                    if changed.is_err() {
                        return;
                    }
                }
                _ = tokio::time::sleep(config.debounce()) => break,
            }
        }

        let query = query_rx.borrow_and_update().trim().to_string();
        if query.chars().count() < config.min_query_len {
            continue;
        }
        if shared.last_searched.lock().as_deref() == Some(query.as_str()) {
            continue;
        }
        shared.start_search(query);
    }
}
