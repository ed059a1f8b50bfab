//! Navigation controller.
//!
//! `BrowserSession` owns all session state and is the only thing that
//! mutates it. Every change to a durable field is written through to the
//! injected store before the operation returns.

use crate::bookmarks::{BookmarkManager, BookmarkToggle, ImportOutcome};
use crate::history::HistoryStack;
use crate::page::{self, NavigationTarget, NEW_TAB_URL};
use crate::palette::{Command, CommandPalette, PanelState, ShellAction};
use crate::synth;
use crate::visited::VisitedHistory;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tidewave_core::store::{keys, PersistentStore, StoreExt};
use tidewave_core::types::{
    AdBlockStats, Bookmark, DownloadItem, DownloadKind, HistoryItem, NetworkSample, PageVariant,
    Panel, SearchResult, Theme,
};
use tidewave_core::{Config, TidewaveResult};
use tidewave_net::{DownloadEvent, DownloadSimulator, ThroughputModel};
use tidewave_shield::AdBlocker;

/// A loading transition waiting for its simulated latency to elapse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingLoad {
    pub generation: u64,
    pub latency: Duration,
}

/// Read-only lookup of page icons, keyed by host
pub trait FaviconSource: Send {
    fn favicon(&self, host: &str) -> Option<String>;
}

/// Source that never has an icon
#[derive(Debug, Default, Clone, Copy)]
pub struct NoFavicons;

impl FaviconSource for NoFavicons {
    fn favicon(&self, _host: &str) -> Option<String> {
        None
    }
}

/// Projection handed to renderers
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub url: String,
    pub active_page: PageVariant,
    pub active_query: String,
    pub search_results: Vec<SearchResult>,
    pub bookmarks: Vec<Bookmark>,
    pub visited_history: Vec<HistoryItem>,
    pub downloads: Vec<DownloadItem>,
    pub ad_block_stats: AdBlockStats,
    pub network_sample: NetworkSample,
    pub history_index: usize,
    pub history_length: usize,
    pub is_loading: bool,
    pub can_go_back: bool,
    pub can_go_forward: bool,
    pub theme: Theme,
    pub open_panel: Option<Panel>,
}

pub struct BrowserSession<S: PersistentStore> {
    config: Config,
    store: S,

    history: HistoryStack,
    active_page: PageVariant,
    active_query: String,
    search_results: Vec<SearchResult>,
    loading: bool,
    load_generation: u64,

    bookmarks: BookmarkManager,
    visited: VisitedHistory,
    downloads: DownloadSimulator,
    shield: AdBlocker,
    throughput: ThroughputModel,
    network: NetworkSample,

    panels: PanelState,
    palette: CommandPalette,
    theme: Theme,
    favicons: Box<dyn FaviconSource>,
    rng: Box<dyn RngCore + Send>,
}

impl<S: PersistentStore> BrowserSession<S> {
    /// Restore a session from `store`, seeding defaults on first load.
    pub fn open(store: S, config: Config) -> Self {
        let stack: Vec<String> =
            store.get(keys::SESSION_HISTORY_STACK, vec![NEW_TAB_URL.to_string()]);
        let index: usize = store.get(keys::SESSION_HISTORY_INDEX, 0);
        let history = HistoryStack::restore(stack, index);

        let saved_url: String = store.get(keys::SESSION_URL, NEW_TAB_URL.to_string());
        if saved_url != history.current() {
            tracing::warn!(
                saved = %saved_url,
                stack = %history.current(),
                "Persisted URL disagrees with history stack, using the stack"
            );
        }

        let seed_bookmarks: Vec<Bookmark> = config
            .seed_bookmarks
            .iter()
            .map(|seed| Bookmark::new(seed.title.clone(), seed.url.clone()))
            .collect();
        let bookmarks = BookmarkManager::new(store.get(keys::BOOKMARKS, seed_bookmarks));
        let visited = VisitedHistory::new(
            store.get(keys::VISITED_HISTORY, Vec::new()),
            config.history_limit,
        );
        let downloads =
            DownloadSimulator::from_items(store.get(keys::DOWNLOADS, Vec::new()), &config);

        let mut stats: AdBlockStats = store.get(keys::AD_BLOCK_STATS, AdBlockStats::default());
        stats.session_blocked = 0;
        let shield = AdBlocker::from_stats(stats, &config);

        let theme: Theme = store.get(keys::THEME, Theme::default());

        let mut session = Self {
            config,
            store,
            history,
            active_page: PageVariant::NewTab,
            active_query: String::new(),
            search_results: Vec::new(),
            loading: false,
            load_generation: 0,
            bookmarks,
            visited,
            downloads,
            shield,
            throughput: ThroughputModel::default(),
            network: NetworkSample::default(),
            panels: PanelState::default(),
            palette: CommandPalette::new(),
            theme,
            favicons: Box::new(NoFavicons),
            rng: Box::new(StdRng::from_entropy()),
        };

        session.resolve_current();
        session.persist_all();

        tracing::info!(
            url = %session.current_url(),
            index = session.history.current_index(),
            len = session.history.len(),
            "Session restored"
        );
        session
    }

    /// Replace the randomness source used by the simulators
    pub fn with_rng(mut self, rng: impl RngCore + Send + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    pub fn with_favicons(mut self, favicons: impl FaviconSource + 'static) -> Self {
        self.favicons = Box::new(favicons);
        self
    }

    pub fn with_throughput_model(mut self, model: ThroughputModel) -> Self {
        self.throughput = model;
        self
    }

    // Navigation

    /// Navigate to typed input: a URL, a bare host, a search phrase, or
    /// nothing (the new-tab page).
    pub fn navigate(&mut self, raw: &str) -> Option<PendingLoad> {
        match page::classify_input(raw) {
            NavigationTarget::NewTab => {
                tracing::info!("Navigating to new tab");
                self.history.push(NEW_TAB_URL);
                self.show_new_tab();
                self.cancel_load();
                self.persist_session();
                None
            }
            NavigationTarget::Search { query, url } => {
                tracing::info!(query = %query, "Navigating to search");
                self.history.push(url.clone());
                self.visited.record(&url, page::search_title(&query));
                self.show_search(query);
                Some(self.start_navigation_load())
            }
            NavigationTarget::External { url } => {
                let title = page::host_title(&url);
                tracing::info!(url = %url, title = %title, "Navigating to external page");
                self.history.push(url.clone());
                self.visited.record(&url, title);
                self.show_external();
                Some(self.start_navigation_load())
            }
        }
    }

    fn start_navigation_load(&mut self) -> PendingLoad {
        self.shield.reset_session();
        self.store.set(keys::AD_BLOCK_STATS, self.shield.stats());
        self.store.set(keys::VISITED_HISTORY, self.visited.items());
        self.persist_session();
        self.begin_load()
    }

    /// Step back one entry. Returns false at the start of the stack.
    pub fn back(&mut self) -> bool {
        if self.history.back().is_none() {
            return false;
        }
        self.after_traversal();
        true
    }

    /// Step forward one entry. Returns false at the end of the stack.
    pub fn forward(&mut self) -> bool {
        if self.history.forward().is_none() {
            return false;
        }
        self.after_traversal();
        true
    }

    fn after_traversal(&mut self) {
        // Any load in flight belonged to the entry we just left.
        self.cancel_load();
        self.resolve_current();
        self.persist_session();
        tracing::info!(
            url = %self.current_url(),
            index = self.history.current_index(),
            "Moved through history"
        );
    }

    /// Replay the loading indicator for the current page
    pub fn reload(&mut self) -> Option<PendingLoad> {
        if self.active_page == PageVariant::NewTab {
            return None;
        }
        tracing::info!(url = %self.current_url(), "Reloading");
        Some(self.begin_load())
    }

    /// Clear the loading flag if `generation` is still the latest load.
    pub fn finish_load(&mut self, generation: u64) -> bool {
        if !self.loading || generation != self.load_generation {
            tracing::debug!(
                generation,
                current = self.load_generation,
                "Ignoring stale load completion"
            );
            return false;
        }
        self.loading = false;
        tracing::debug!(generation, "Load finished");
        true
    }

    fn begin_load(&mut self) -> PendingLoad {
        self.load_generation += 1;
        self.loading = true;
        let latency = match self.active_page {
            PageVariant::SearchResults => self.config.search_latency(),
            _ => self.config.external_latency(),
        };
        PendingLoad {
            generation: self.load_generation,
            latency,
        }
    }

    fn cancel_load(&mut self) {
        self.load_generation += 1;
        self.loading = false;
    }

    /// Re-derive the page variant (and search results) from the current URL
    fn resolve_current(&mut self) {
        let url = self.history.current().to_string();
        match page::classify(&url) {
            PageVariant::NewTab => self.show_new_tab(),
            PageVariant::SearchResults => self.show_search(page::query_from_url(&url)),
            PageVariant::External => self.show_external(),
        }
    }

    fn show_new_tab(&mut self) {
        self.active_page = PageVariant::NewTab;
        self.active_query.clear();
        self.search_results.clear();
    }

    fn show_search(&mut self, query: String) {
        self.search_results = synth::synthesize(&query);
        self.active_query = query;
        self.active_page = PageVariant::SearchResults;
    }

    fn show_external(&mut self) {
        self.active_page = PageVariant::External;
        self.active_query.clear();
        self.search_results.clear();
    }

    // Bookmarks and history

    /// Add or remove a bookmark for `url`
    pub fn toggle_bookmark(&mut self, url: &str) -> BookmarkToggle {
        let outcome = self.bookmarks.toggle(url);
        self.store.set(keys::BOOKMARKS, self.bookmarks.list());
        outcome
    }

    /// Add or remove a bookmark for the page being shown
    pub fn toggle_current_bookmark(&mut self) -> BookmarkToggle {
        let url = self.current_url().to_string();
        self.toggle_bookmark(&url)
    }

    pub fn remove_bookmark(&mut self, id: &str) -> TidewaveResult<Bookmark> {
        let removed = self.bookmarks.remove(id)?;
        self.store.set(keys::BOOKMARKS, self.bookmarks.list());
        Ok(removed)
    }

    pub fn export_bookmarks(&self) -> TidewaveResult<String> {
        self.bookmarks.export_all()
    }

    /// Write the export document into `dir` under the product file name
    pub fn export_bookmarks_to(&self, dir: &Path) -> TidewaveResult<PathBuf> {
        let path = dir.join(self.config.bookmark_export_file_name());
        std::fs::write(&path, self.bookmarks.export_all()?)?;
        tracing::info!("Exported {} bookmarks to {}", self.bookmarks.list().len(), path.display());
        Ok(path)
    }

    /// Replace bookmarks from a JSON array document. Rejections leave the
    /// collection untouched and are logged here as well as returned.
    pub fn import_bookmarks(&mut self, document: &str) -> TidewaveResult<ImportOutcome> {
        match self.bookmarks.import_all(document) {
            Ok(outcome) => {
                self.store.set(keys::BOOKMARKS, self.bookmarks.list());
                Ok(outcome)
            }
            Err(err) => {
                tracing::warn!(error = %err, "Bookmark import rejected");
                Err(err)
            }
        }
    }

    pub fn search_bookmarks(&self, query: &str) -> Vec<Bookmark> {
        self.bookmarks.search(query)
    }

    pub fn search_history(&self, query: &str) -> Vec<HistoryItem> {
        self.visited.search(query)
    }

    pub fn remove_history_item(&mut self, id: &str) -> bool {
        let removed = self.visited.remove(id);
        if removed {
            self.store.set(keys::VISITED_HISTORY, self.visited.items());
        }
        removed
    }

    pub fn clear_visited_history(&mut self) {
        self.visited.clear();
        self.store.set(keys::VISITED_HISTORY, self.visited.items());
        tracing::info!("Cleared visited history");
    }

    // Downloads

    /// Start a simulated download and reveal the downloads panel
    pub fn start_download(&mut self, filename: &str, kind: DownloadKind) -> u64 {
        let (item, _) = self.downloads.start(filename, kind, &mut *self.rng);
        let id = item.id;
        self.panels.reveal(Panel::Downloads);
        self.store.set(keys::DOWNLOADS, self.downloads.items());
        id
    }

    pub fn fail_download(&mut self, id: u64) -> TidewaveResult<()> {
        self.downloads.fail(id)?;
        self.store.set(keys::DOWNLOADS, self.downloads.items());
        Ok(())
    }

    pub fn remove_download(&mut self, id: u64) -> bool {
        let removed = self.downloads.remove(id);
        if removed {
            self.store.set(keys::DOWNLOADS, self.downloads.items());
        }
        removed
    }

    pub fn clear_finished_downloads(&mut self) -> usize {
        let cleared = self.downloads.clear_finished();
        if cleared > 0 {
            self.store.set(keys::DOWNLOADS, self.downloads.items());
        }
        cleared
    }

    // Ticks

    /// Download progress tick
    pub fn tick_downloads(&mut self) -> Vec<DownloadEvent> {
        let events = self.downloads.tick(&mut *self.rng);
        if !events.is_empty() {
            self.store.set(keys::DOWNLOADS, self.downloads.items());
        }
        events
    }

    /// Ad-block tick. Returns true when a block was counted.
    pub fn tick_adblock(&mut self) -> bool {
        let blocked = self.shield.tick(self.loading, &mut *self.rng);
        if blocked {
            self.store.set(keys::AD_BLOCK_STATS, self.shield.stats());
        }
        blocked
    }

    /// Network sample tick
    pub fn tick_network(&mut self) -> NetworkSample {
        self.network = self.throughput.sample(
            self.loading,
            self.downloads.active_count(),
            &mut *self.rng,
        );
        self.network
    }

    // Settings and surfaces

    pub fn set_ad_block_enabled(&mut self, enabled: bool) {
        self.shield.set_enabled(enabled);
        self.store.set(keys::AD_BLOCK_STATS, self.shield.stats());
    }

    pub fn set_strict_mode(&mut self, strict: bool) {
        self.shield.set_strict_mode(strict);
        self.store.set(keys::AD_BLOCK_STATS, self.shield.stats());
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        self.store.set(keys::THEME, &self.theme);
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.set_theme(self.theme.toggled());
        self.theme
    }

    pub fn toggle_panel(&mut self, panel: Panel) -> Option<Panel> {
        self.panels.toggle(panel)
    }

    pub fn close_panels(&mut self) {
        self.panels.close();
    }

    /// Run the command bound to a key chord, if any
    pub fn handle_shortcut(&mut self, chord: &str) -> Option<(ShellAction, Option<PendingLoad>)> {
        let action = self.palette.command_for_shortcut(chord)?.action;
        Some((action, self.run_action(action)))
    }

    /// Perform a palette action; returns a pending load when one started
    pub fn run_action(&mut self, action: ShellAction) -> Option<PendingLoad> {
        match action {
            ShellAction::TogglePanel(panel) => {
                self.toggle_panel(panel);
                None
            }
            ShellAction::ToggleBookmark => {
                self.toggle_current_bookmark();
                None
            }
            ShellAction::Back => {
                self.back();
                None
            }
            ShellAction::Forward => {
                self.forward();
                None
            }
            ShellAction::Reload => self.reload(),
            ShellAction::NewTab => self.navigate(NEW_TAB_URL),
            ShellAction::ToggleTheme => {
                self.toggle_theme();
                None
            }
        }
    }

    pub fn search_commands(&self, query: &str) -> Vec<Command> {
        self.palette.search(query)
    }

    /// Icon for the host of `url`; `None` is the common case
    pub fn favicon_for(&self, url: &str) -> Option<String> {
        page::host_of(url).and_then(|host| self.favicons.favicon(&host))
    }

    // Persistence

    fn persist_session(&mut self) {
        self.store.set(keys::SESSION_URL, self.history.current());
        self.store.set(keys::SESSION_HISTORY_STACK, self.history.entries());
        self.store
            .set(keys::SESSION_HISTORY_INDEX, &self.history.current_index());
    }

    fn persist_all(&mut self) {
        self.persist_session();
        self.store.set(keys::THEME, &self.theme);
        self.store.set(keys::BOOKMARKS, self.bookmarks.list());
        self.store.set(keys::VISITED_HISTORY, self.visited.items());
        self.store.set(keys::DOWNLOADS, self.downloads.items());
        self.store.set(keys::AD_BLOCK_STATS, self.shield.stats());
    }

    // Accessors

    pub fn current_url(&self) -> &str {
        self.history.current()
    }

    pub fn active_page(&self) -> PageVariant {
        self.active_page
    }

    /// Query of the search page; empty on other pages
    pub fn active_query(&self) -> &str {
        &self.active_query
    }

    pub fn search_results(&self) -> &[SearchResult] {
        &self.search_results
    }

    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn load_generation(&self) -> u64 {
        self.load_generation
    }

    pub fn bookmarks(&self) -> &[Bookmark] {
        self.bookmarks.list()
    }

    pub fn is_bookmarked(&self, url: &str) -> bool {
        self.bookmarks.is_bookmarked(url)
    }

    pub fn visited_history(&self) -> &[HistoryItem] {
        self.visited.items()
    }

    pub fn downloads(&self) -> &[DownloadItem] {
        self.downloads.items()
    }

    pub fn ad_block_stats(&self) -> &AdBlockStats {
        self.shield.stats()
    }

    pub fn network_sample(&self) -> NetworkSample {
        self.network
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn open_panel(&self) -> Option<Panel> {
        self.panels.open_panel()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn snapshot(&self) -> SessionView {
        SessionView {
            url: self.current_url().to_string(),
            active_page: self.active_page,
            active_query: self.active_query.clone(),
            search_results: self.search_results.clone(),
            bookmarks: self.bookmarks.list().to_vec(),
            visited_history: self.visited.items().to_vec(),
            downloads: self.downloads.items().to_vec(),
            ad_block_stats: self.shield.stats().clone(),
            network_sample: self.network,
            history_index: self.history.current_index(),
            history_length: self.history.len(),
            is_loading: self.loading,
            can_go_back: self.history.can_go_back(),
            can_go_forward: self.history.can_go_forward(),
            theme: self.theme,
            open_panel: self.panels.open_panel(),
        }
    }
}
