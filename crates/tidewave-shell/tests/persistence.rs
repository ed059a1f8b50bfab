//! Session state surviving a restart through the persistent store

use rand::rngs::mock::StepRng;
use tempfile::TempDir;
use tidewave_core::store::{keys, StoreExt};
use tidewave_core::types::{AdBlockStats, DownloadKind, DownloadStatus, PageVariant, Theme};
use tidewave_core::{Config, JsonFileStore, MemoryStore, TidewaveError};
use tidewave_shell::{BookmarkToggle, BrowserSession};

fn reopen(session: BrowserSession<MemoryStore>) -> BrowserSession<MemoryStore> {
    BrowserSession::open(session.into_store(), Config::default())
}

#[test]
fn adblock_totals_round_trip() {
    let mut store = MemoryStore::new();
    store.set(
        keys::AD_BLOCK_STATS,
        &AdBlockStats {
            total_blocked: 5,
            ..AdBlockStats::default()
        },
    );

    let session = BrowserSession::open(store, Config::default());
    assert_eq!(session.ad_block_stats().total_blocked, 5);
    assert_eq!(session.ad_block_stats().session_blocked, 0);
}

#[test]
fn session_restores_position_and_page() {
    let mut session = BrowserSession::open(MemoryStore::new(), Config::default());
    session.navigate("rust book");
    session.navigate("docs.rs");
    session.back();
    session.toggle_theme();

    let restored = reopen(session);
    assert_eq!(restored.history().len(), 3);
    assert_eq!(restored.history().current_index(), 1);
    assert_eq!(restored.active_page(), PageVariant::SearchResults);
    assert_eq!(restored.active_query(), "rust book");
    assert_eq!(restored.search_results().len(), 8);
    assert_eq!(restored.theme(), Theme::Light);
    assert!(!restored.is_loading());
}

#[test]
fn out_of_range_index_is_repaired() {
    let mut store = MemoryStore::new();
    store.insert_raw(
        keys::SESSION_HISTORY_STACK,
        r#"["internal://newtab","https://a.example"]"#,
    );
    store.insert_raw(keys::SESSION_HISTORY_INDEX, "9");

    let session = BrowserSession::open(store, Config::default());
    assert_eq!(session.history().current_index(), 1);
    assert_eq!(session.current_url(), "https://a.example");
    assert_eq!(session.store().raw(keys::SESSION_HISTORY_INDEX), Some("1"));
}

#[test]
fn corrupt_values_fall_back_to_defaults() {
    let mut store = MemoryStore::new();
    store.insert_raw(keys::BOOKMARKS, "{not json");
    store.insert_raw(keys::THEME, "\"purple\"");

    let session = BrowserSession::open(store, Config::default());
    assert_eq!(session.bookmarks().len(), 2);
    assert_eq!(session.theme(), Theme::Dark);
}

#[test]
fn bookmark_toggle_is_idempotent_and_persisted() {
    let mut session = BrowserSession::open(MemoryStore::new(), Config::default());
    let before = session.bookmarks().to_vec();

    assert!(matches!(
        session.toggle_bookmark("https://example.com"),
        BookmarkToggle::Added(_)
    ));
    let restored = reopen(session);
    assert!(restored.is_bookmarked("https://example.com"));

    let mut session = restored;
    session.toggle_bookmark("https://example.com");
    assert_eq!(reopen(session).bookmarks(), before.as_slice());
}

#[test]
fn import_rejection_leaves_bookmarks() {
    let mut session = BrowserSession::open(MemoryStore::new(), Config::default());
    let before = session.bookmarks().to_vec();

    let result = session.import_bookmarks("{}");
    assert!(matches!(result, Err(TidewaveError::Import(_))));
    assert_eq!(session.bookmarks(), before.as_slice());
}

#[test]
fn export_then_import_into_fresh_session() {
    let dir = TempDir::new().unwrap();
    let source = BrowserSession::open(MemoryStore::new(), Config::default());
    let path = source.export_bookmarks_to(dir.path()).unwrap();
    assert!(path.ends_with("tidewave_bookmarks.json"));

    let mut target = BrowserSession::open(MemoryStore::new(), Config::default());
    target.toggle_bookmark("https://only-here.example");
    let document = std::fs::read_to_string(&path).unwrap();
    let outcome = target.import_bookmarks(&document).unwrap();

    assert_eq!(outcome.imported, 2);
    assert_eq!(target.bookmarks(), source.bookmarks());
}

#[test]
fn downloads_progress_monotonically_and_persist() {
    let mut session =
        BrowserSession::open(MemoryStore::new(), Config::default()).with_rng(StepRng::new(0, 0));
    let id = session.start_download("big.iso", DownloadKind::File);

    let mut last = 0;
    for _ in 0..200 {
        session.tick_downloads();
        let item = session.downloads().iter().find(|d| d.id == id).unwrap();
        assert!(item.progress >= last);
        assert!(item.progress <= 100);
        assert_eq!(item.progress == 100, item.status == DownloadStatus::Completed);
        last = item.progress;
    }
    assert_eq!(last, 100);

    let restored = reopen(session);
    assert_eq!(restored.downloads()[0].status, DownloadStatus::Completed);
}

#[test]
fn json_file_store_survives_restart() {
    let dir = TempDir::new().unwrap();

    {
        let store = JsonFileStore::open(dir.path()).unwrap();
        let mut session = BrowserSession::open(store, Config::default());
        session.navigate("persisted.example");
        session.set_strict_mode(true);
    }

    let store = JsonFileStore::open(dir.path()).unwrap();
    let session = BrowserSession::open(store, Config::default());
    assert_eq!(session.current_url(), "https://persisted.example");
    assert!(session.ad_block_stats().strict_mode);
    assert!(dir.path().join("session.url.json").exists());
}
