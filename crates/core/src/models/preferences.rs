use serde::{Deserialize, Serialize};

/// Maximum number of recent search strings kept.
pub const MAX_RECENT_SEARCHES: usize = 20;

/// Maximum number of entries in the "most common searches" table.
pub const MAX_COMMON_SEARCHES: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPreferences {
    /// Light theme unless the user switched.
    pub is_dark_theme: bool,
}

/// How often a single query has been searched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFrequency {
    pub query: String,
    pub count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchStatistics {
    /// Monotonic count of every recorded search.
    pub total_searches: u64,

    /// Sorted by `count` descending, at most [`MAX_COMMON_SEARCHES`] entries.
    pub most_common_searches: Vec<SearchFrequency>,
}

impl SearchStatistics {
    /// Count one search for `query`: bump the total, upsert the frequency
    /// entry, then re-sort and cap the table.
    pub fn record(&mut self, query: &str) {
        self.total_searches += 1;

        match self
            .most_common_searches
            .iter_mut()
            .find(|entry| entry.query == query)
        {
            Some(entry) => entry.count += 1,
            None => self.most_common_searches.push(SearchFrequency {
                query: query.to_string(),
                count: 1,
            }),
        }

        // Stable sort: ties keep their previous relative order.
        self.most_common_searches
            .sort_by(|a, b| b.count.cmp(&a.count));
        self.most_common_searches.truncate(MAX_COMMON_SEARCHES);
    }
}
