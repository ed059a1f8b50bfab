//! Bookmark collection with toggle, search and JSON interchange.

use crate::page;
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use serde::Deserialize;
use std::collections::HashSet;
use tidewave_core::types::{now_millis, unique_id, Bookmark};
use tidewave_core::{TidewaveError, TidewaveResult};

/// What a toggle did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookmarkToggle {
    Added(Bookmark),
    Removed(Bookmark),
}

/// Result of a successful import
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOutcome {
    pub imported: usize,
    pub skipped: usize,
}

/// Lenient shape accepted per array element on import
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportedBookmark {
    id: Option<String>,
    title: Option<String>,
    url: String,
    created_at: Option<i64>,
}

pub struct BookmarkManager {
    bookmarks: Vec<Bookmark>,
    matcher: SkimMatcherV2,
}

impl std::fmt::Debug for BookmarkManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookmarkManager")
            .field("bookmarks", &self.bookmarks)
            .finish()
    }
}

impl BookmarkManager {
    pub fn new(bookmarks: Vec<Bookmark>) -> Self {
        Self {
            bookmarks,
            matcher: SkimMatcherV2::default(),
        }
    }

    pub fn list(&self) -> &[Bookmark] {
        &self.bookmarks
    }

    pub fn is_bookmarked(&self, url: &str) -> bool {
        self.bookmarks.iter().any(|b| b.url == url)
    }

    /// Remove the bookmark for `url` if present, otherwise add one titled by
    /// the page-type rule.
    pub fn toggle(&mut self, url: &str) -> BookmarkToggle {
        if let Some(pos) = self.bookmarks.iter().position(|b| b.url == url) {
            let removed = self.bookmarks.remove(pos);
            tracing::info!("Removed bookmark {}: {}", removed.id, removed.url);
            return BookmarkToggle::Removed(removed);
        }

        let bookmark = Bookmark::new(page::title_for_url(url), url);
        tracing::info!("Added bookmark {}: {}", bookmark.id, bookmark.url);
        self.bookmarks.push(bookmark.clone());
        BookmarkToggle::Added(bookmark)
    }

    /// Remove a bookmark by id
    pub fn remove(&mut self, id: &str) -> TidewaveResult<Bookmark> {
        let pos = self
            .bookmarks
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| TidewaveError::not_found(format!("bookmark {}", id)))?;
        Ok(self.bookmarks.remove(pos))
    }

    /// Fuzzy search over titles and URLs, best match first
    pub fn search(&self, query: &str) -> Vec<Bookmark> {
        let mut results: Vec<(i64, &Bookmark)> = self
            .bookmarks
            .iter()
            .filter_map(|b| {
                let title = self.matcher.fuzzy_match(&b.title, query);
                let url = self.matcher.fuzzy_match(&b.url, query);
                title.max(url).map(|score| (score, b))
            })
            .collect();

        results.sort_by(|a, b| b.0.cmp(&a.0));
        results.into_iter().map(|(_, b)| b.clone()).take(10).collect()
    }

    /// Serialize the whole collection as a JSON array
    pub fn export_all(&self) -> TidewaveResult<String> {
        Ok(serde_json::to_string_pretty(&self.bookmarks)?)
    }

    /// Replace the collection with the bookmarks in a JSON array document.
    ///
    /// Anything other than an array of objects carrying a `url` is rejected
    /// and the current collection is left untouched.
    pub fn import_all(&mut self, document: &str) -> TidewaveResult<ImportOutcome> {
        let value: serde_json::Value = serde_json::from_str(document)
            .map_err(|e| TidewaveError::import(format!("malformed JSON: {}", e)))?;

        let items = match value {
            serde_json::Value::Array(items) => items,
            other => {
                return Err(TidewaveError::import(format!(
                    "expected a JSON array, got {}",
                    json_kind(&other)
                )));
            }
        };

        let mut parsed = Vec::with_capacity(items.len());
        for (i, item) in items.into_iter().enumerate() {
            let entry: ImportedBookmark = serde_json::from_value(item)
                .map_err(|e| TidewaveError::import(format!("entry {}: {}", i, e)))?;
            parsed.push(entry);
        }

        let mut seen_urls = HashSet::new();
        let mut seen_ids = HashSet::new();
        let mut skipped = 0;
        let mut imported = Vec::with_capacity(parsed.len());

        for entry in parsed {
            if !seen_urls.insert(entry.url.clone()) {
                skipped += 1;
                continue;
            }

            let id = match entry.id {
                Some(id) if seen_ids.insert(id.clone()) => id,
                _ => {
                    let id = unique_id("bm");
                    seen_ids.insert(id.clone());
                    id
                }
            };

            imported.push(Bookmark {
                id,
                title: entry
                    .title
                    .filter(|t| !t.trim().is_empty())
                    .unwrap_or_else(|| page::title_for_url(&entry.url)),
                url: entry.url,
                created_at: entry.created_at.unwrap_or_else(now_millis),
            });
        }

        let outcome = ImportOutcome {
            imported: imported.len(),
            skipped,
        };
        self.bookmarks = imported;
        tracing::info!(
            "Imported {} bookmarks ({} duplicates skipped)",
            outcome.imported,
            outcome.skipped
        );
        Ok(outcome)
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
