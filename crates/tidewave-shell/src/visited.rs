//! Visited-history log, newest first and capped.
//!
//! Separate from the back/forward stack: this is what the history panel
//! lists, and it is never used for traversal.

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use tidewave_core::types::{now_millis, unique_id, HistoryItem};

pub struct VisitedHistory {
    items: Vec<HistoryItem>,
    limit: usize,
    matcher: SkimMatcherV2,
}

impl std::fmt::Debug for VisitedHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisitedHistory")
            .field("items", &self.items.len())
            .field("limit", &self.limit)
            .finish()
    }
}

impl VisitedHistory {
    pub fn new(mut items: Vec<HistoryItem>, limit: usize) -> Self {
        let limit = limit.max(1);
        if items.len() > limit {
            tracing::debug!(len = items.len(), limit, "Trimming persisted visit log");
            items.truncate(limit);
        }

        Self {
            items,
            limit,
            matcher: SkimMatcherV2::default(),
        }
    }

    /// Most recent first
    pub fn items(&self) -> &[HistoryItem] {
        &self.items
    }

    /// Record a visit. Returns false when the newest entry already has this
    /// URL and nothing was added.
    pub fn record(&mut self, url: &str, title: impl Into<String>) -> bool {
        if self.items.first().is_some_and(|head| head.url == url) {
            return false;
        }

        self.items.insert(
            0,
            HistoryItem {
                id: unique_id("h"),
                title: title.into(),
                url: url.to_string(),
                timestamp: now_millis(),
            },
        );
        self.items.truncate(self.limit);
        true
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Fuzzy search over titles and URLs, best match first
    pub fn search(&self, query: &str) -> Vec<HistoryItem> {
        let mut results: Vec<(i64, &HistoryItem)> = self
            .items
            .iter()
            .filter_map(|item| {
                let title = self.matcher.fuzzy_match(&item.title, query);
                let url = self.matcher.fuzzy_match(&item.url, query);
                title.max(url).map(|score| (score, item))
            })
            .collect();

        // Stable sort keeps recency order between equal scores.
        results.sort_by(|a, b| b.0.cmp(&a.0));
        results
            .into_iter()
            .map(|(_, item)| item.clone())
            .take(10)
            .collect()
    }
}
