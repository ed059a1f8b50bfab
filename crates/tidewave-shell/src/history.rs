//! Back/forward history stack.
//!
//! Holds the ordered URLs of the session plus the current position. Pushing
//! after going back discards the forward branch, the usual browser contract.
//! The stack is never empty, so `0 <= index < len` always holds.

use crate::page::NEW_TAB_URL;

/// The back/forward stack for the single browsing context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryStack {
    /// Visited URLs, oldest first.
    entries: Vec<String>,

    /// Current entry index.
    current_index: usize,
}

impl HistoryStack {
    /// Create a stack holding only the new-tab page.
    pub fn new() -> Self {
        Self {
            entries: vec![NEW_TAB_URL.to_string()],
            current_index: 0,
        }
    }

    /// Rebuild a stack from persisted parts, repairing anything out of range.
    pub fn restore(entries: Vec<String>, index: usize) -> Self {
        if entries.is_empty() {
            tracing::warn!("Persisted history stack is empty, starting fresh");
            return Self::new();
        }

        let current_index = if index < entries.len() {
            index
        } else {
            tracing::warn!(
                index,
                len = entries.len(),
                "Persisted history index out of range, clamping"
            );
            entries.len() - 1
        };

        Self {
            entries,
            current_index,
        }
    }

    /// Get the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the current URL.
    pub fn current(&self) -> &str {
        &self.entries[self.current_index]
    }

    /// Get current index.
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Get entries.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Push a new entry, truncating any forward history first.
    pub fn push(&mut self, url: impl Into<String>) {
        self.entries.truncate(self.current_index + 1);
        self.entries.push(url.into());
        self.current_index = self.entries.len() - 1;
    }

    /// Check if can go back.
    pub fn can_go_back(&self) -> bool {
        self.current_index > 0
    }

    /// Check if can go forward.
    pub fn can_go_forward(&self) -> bool {
        self.current_index + 1 < self.entries.len()
    }

    /// Go back one entry.
    pub fn back(&mut self) -> Option<&str> {
        self.go(-1)
    }

    /// Go forward one entry.
    pub fn forward(&mut self) -> Option<&str> {
        self.go(1)
    }

    /// Go by delta entries (negative = back, positive = forward).
    ///
    /// Returns `None` and leaves the position untouched if the target is out
    /// of range.
    pub fn go(&mut self, delta: isize) -> Option<&str> {
        let new_index = self.current_index.checked_add_signed(delta)?;

        if new_index >= self.entries.len() {
            return None;
        }

        self.current_index = new_index;
        Some(self.current())
    }
}

impl Default for HistoryStack {
    fn default() -> Self {
        Self::new()
    }
}
