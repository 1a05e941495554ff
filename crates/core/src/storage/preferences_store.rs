use futures::stream::{self, BoxStream, StreamExt};
use log::{debug, warn};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::watch;

use crate::errors::CoreError;
use crate::models::preferences::{SearchStatistics, UserPreferences, MAX_RECENT_SEARCHES};

/// On-disk layout. Statistics are kept as an embedded JSON string so a
/// corrupt blob can be discarded without losing the rest of the file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct PreferencesDocument {
    is_dark_theme: bool,
    /// Oldest first.
    recent_searches: Vec<String>,
    search_statistics: Option<String>,
}

impl PreferencesDocument {
    /// Decoded statistics, or the empty default when missing or malformed.
    fn statistics(&self) -> SearchStatistics {
        match self.search_statistics.as_deref() {
            None => SearchStatistics::default(),
            Some(raw) => serde_json::from_str(raw).unwrap_or_else(|e| {
                warn!("Discarding unreadable search statistics: {e}");
                SearchStatistics::default()
            }),
        }
    }
}

/// Everything observers can see, republished after every write.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreferencesSnapshot {
    pub preferences: UserPreferences,
    /// Oldest first.
    pub recent_searches: Vec<String>,
    pub statistics: SearchStatistics,
}

impl From<&PreferencesDocument> for PreferencesSnapshot {
    fn from(doc: &PreferencesDocument) -> Self {
        Self {
            preferences: UserPreferences {
                is_dark_theme: doc.is_dark_theme,
            },
            recent_searches: doc.recent_searches.clone(),
            statistics: doc.statistics(),
        }
    }
}

struct PrefsInner {
    path: Option<PathBuf>,
    document: Mutex<PreferencesDocument>,
    state: watch::Sender<PreferencesSnapshot>,
}

/// Durable key-value settings: theme flag, recent searches (capped at
/// [`MAX_RECENT_SEARCHES`]) and search statistics.
///
/// Every write goes to disk first (temp file + rename) and is published
/// to observers only after it is durable. Cloning shares the same state.
#[derive(Clone)]
pub struct PreferencesStore {
    inner: Arc<PrefsInner>,
}

impl std::fmt::Debug for PreferencesStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreferencesStore")
            .field("path", &self.inner.path)
            .finish()
    }
}

impl PreferencesStore {
    /// Load preferences from `path`. A missing file means defaults.
    pub fn open(path: &Path) -> Result<Self, CoreError> {
        let document = if path.exists() {
            let bytes = std::fs::read(path)?;
            serde_json::from_slice(&bytes).map_err(|e| {
                CoreError::Decode(format!(
                    "Failed to read preferences at {}: {e}",
                    path.display()
                ))
            })?
        } else {
            PreferencesDocument::default()
        };
        debug!("Loaded preferences from {}", path.display());
        Ok(Self::build(Some(path.to_path_buf()), document))
    }

    /// Preferences that live only as long as this store.
    pub fn in_memory() -> Self {
        Self::build(None, PreferencesDocument::default())
    }

    fn build(path: Option<PathBuf>, document: PreferencesDocument) -> Self {
        let (state, _rx) = watch::channel(PreferencesSnapshot::from(&document));
        Self {
            inner: Arc::new(PrefsInner {
                path,
                document: Mutex::new(document),
                state,
            }),
        }
    }

    // ── Point-in-time reads ─────────────────────────────────────────

    pub fn snapshot(&self) -> PreferencesSnapshot {
        self.inner.state.borrow().clone()
    }

    pub fn user_preferences(&self) -> UserPreferences {
        self.inner.state.borrow().preferences
    }

    /// Most recent first.
    pub fn recent_searches_now(&self) -> Vec<String> {
        newest_first(&self.inner.state.borrow())
    }

    pub fn search_statistics_now(&self) -> SearchStatistics {
        self.inner.state.borrow().statistics.clone()
    }

    // ── Live streams ────────────────────────────────────────────────

    pub fn user_preferences_stream(&self) -> BoxStream<'static, UserPreferences> {
        self.observe(|s| s.preferences)
    }

    pub fn dark_theme(&self) -> BoxStream<'static, bool> {
        self.observe(|s| s.preferences.is_dark_theme)
    }

    /// Most recent first.
    pub fn recent_searches(&self) -> BoxStream<'static, Vec<String>> {
        self.observe(newest_first)
    }

    pub fn search_statistics(&self) -> BoxStream<'static, SearchStatistics> {
        self.observe(|s| s.statistics.clone())
    }

    // ── Writes ──────────────────────────────────────────────────────

    pub fn set_dark_theme(&self, is_dark_theme: bool) -> Result<(), CoreError> {
        self.edit(|doc| doc.is_dark_theme = is_dark_theme)
    }

    /// Record a search: move `query` to the most-recent slot, keep the
    /// newest [`MAX_RECENT_SEARCHES`], and count it in the statistics.
    /// Blank queries are ignored.
    pub fn add_recent_search(&self, query: &str) -> Result<(), CoreError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(());
        }

        self.edit(|doc| {
            doc.recent_searches.retain(|q| q != query);
            doc.recent_searches.push(query.to_string());
            if doc.recent_searches.len() > MAX_RECENT_SEARCHES {
                let excess = doc.recent_searches.len() - MAX_RECENT_SEARCHES;
                doc.recent_searches.drain(..excess);
            }

            let mut stats = doc.statistics();
            stats.record(query);
            // Serializing plain structs into a String cannot fail.
            doc.search_statistics = serde_json::to_string(&stats).ok();
        })
    }

    pub fn remove_recent_search(&self, query: &str) -> Result<(), CoreError> {
        let query = query.trim();
        self.edit(|doc| doc.recent_searches.retain(|q| q != query))
    }

    /// Drops the history but keeps the statistics.
    pub fn clear_recent_searches(&self) -> Result<(), CoreError> {
        self.edit(|doc| doc.recent_searches.clear())
    }

    // ── Internals ───────────────────────────────────────────────────

    /// Apply `f` to a copy, persist it, then commit and publish.
    fn edit(&self, f: impl FnOnce(&mut PreferencesDocument)) -> Result<(), CoreError> {
        let mut document = self.inner.document.lock();
        let mut updated = document.clone();
        f(&mut updated);
        if updated == *document {
            return Ok(());
        }

        if let Some(path) = &self.inner.path {
            write_document(path, &updated)?;
        }
        *document = updated;
        self.inner
            .state
            .send_replace(PreferencesSnapshot::from(&*document));
        Ok(())
    }

    /// Stream of `project(snapshot)`: current value first, then only
    /// values that differ from the previous one.
    fn observe<T>(&self, project: fn(&PreferencesSnapshot) -> T) -> BoxStream<'static, T>
    where
        T: Clone + PartialEq + Send + Sync + 'static,
    {
        let rx = self.inner.state.subscribe();
        stream::unfold((rx, None::<T>), move |(mut rx, last)| async move {
            loop {
                if last.is_some() && rx.changed().await.is_err() {
                    return None;
                }
                let value = project(&rx.borrow_and_update());
                if last.as_ref() != Some(&value) {
                    return Some((value.clone(), (rx, Some(value))));
                }
            }
        })
        .boxed()
    }
}

fn newest_first(snapshot: &PreferencesSnapshot) -> Vec<String> {
    snapshot.recent_searches.iter().rev().cloned().collect()
}

fn write_document(path: &Path, document: &PreferencesDocument) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let bytes = serde_json::to_vec_pretty(document)
        .map_err(|e| CoreError::Serialization(format!("Failed to encode preferences: {e}")))?;

    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, bytes)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}
