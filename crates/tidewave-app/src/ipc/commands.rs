//! IPC command handlers
//!
//! Every handler mutates the session through its public operations and
//! replies with a fresh snapshot.

use super::{IpcMessage, IpcResponse};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tidewave_core::PersistentStore;
use tidewave_shell::{BookmarkToggle, BrowserSession, PendingLoad};
use tracing::{debug, info, warn};

/// Reply plus the load timer the host has to schedule, if any
#[derive(Debug)]
pub struct Handled {
    pub response: IpcResponse,
    pub pending: Option<PendingLoad>,
}

impl Handled {
    fn reply(response: IpcResponse) -> Self {
        Self {
            response,
            pending: None,
        }
    }

    fn loading(response: IpcResponse, pending: Option<PendingLoad>) -> Self {
        Self { response, pending }
    }
}

#[derive(Serialize)]
struct ToggleResult<'a> {
    added: bool,
    url: &'a str,
}

/// Handle one message. `Quit` is the host's business and only snapshots here.
pub fn handle_message<S: PersistentStore>(
    session: &mut BrowserSession<S>,
    export_dir: &Path,
    message: IpcMessage,
) -> Handled {
    debug!(?message, "Handling command");

    match message {
        // Navigation commands
        IpcMessage::Navigate { input } => {
            let pending = session.navigate(&input);
            Handled::loading(snapshot(session), pending)
        }
        IpcMessage::Back => handle_traversal(session, BrowserSession::back),
        IpcMessage::Forward => handle_traversal(session, BrowserSession::forward),
        IpcMessage::Reload => {
            let pending = session.reload();
            Handled::loading(snapshot(session), pending)
        }

        // Bookmark commands
        IpcMessage::ToggleBookmark { url } => handle_toggle_bookmark(session, url.as_deref()),
        IpcMessage::RemoveBookmark { id } => match session.remove_bookmark(&id) {
            Ok(removed) => Handled::reply(snapshot(session).with_data(removed)),
            Err(e) => Handled::reply(IpcResponse::error(e.to_string())),
        },
        IpcMessage::SearchBookmarks { query } => {
            let found = session.search_bookmarks(&query);
            Handled::reply(snapshot(session).with_data(found))
        }
        IpcMessage::ExportBookmarks { path } => {
            handle_export_bookmarks(session, path.map(PathBuf::from), export_dir)
        }
        IpcMessage::ImportBookmarks { document } => match session.import_bookmarks(&document) {
            Ok(outcome) => Handled::reply(snapshot(session).with_data(serde_json::json!({
                "imported": outcome.imported,
                "skipped": outcome.skipped,
            }))),
            Err(e) => Handled::reply(IpcResponse::error(e.to_string())),
        },

        // History commands
        IpcMessage::SearchHistory { query } => {
            let found = session.search_history(&query);
            Handled::reply(snapshot(session).with_data(found))
        }
        IpcMessage::RemoveHistoryItem { id } => {
            if session.remove_history_item(&id) {
                Handled::reply(snapshot(session))
            } else {
                Handled::reply(IpcResponse::error(format!("no history item {}", id)))
            }
        }
        IpcMessage::ClearHistory => {
            session.clear_visited_history();
            Handled::reply(snapshot(session))
        }

        // Download commands
        IpcMessage::StartDownload { filename, kind } => {
            let id = session.start_download(&filename, kind);
            Handled::reply(snapshot(session).with_data(serde_json::json!({ "id": id })))
        }
        IpcMessage::FailDownload { id } => match session.fail_download(id) {
            Ok(()) => Handled::reply(snapshot(session)),
            Err(e) => Handled::reply(IpcResponse::error(e.to_string())),
        },
        IpcMessage::RemoveDownload { id } => {
            if session.remove_download(id) {
                Handled::reply(snapshot(session))
            } else {
                Handled::reply(IpcResponse::error(format!("no download {}", id)))
            }
        }
        IpcMessage::ClearDownloads => {
            let cleared = session.clear_finished_downloads();
            Handled::reply(snapshot(session).with_data(serde_json::json!({ "cleared": cleared })))
        }

        // Surface commands
        IpcMessage::TogglePanel { panel } => {
            session.toggle_panel(panel);
            Handled::reply(snapshot(session))
        }
        IpcMessage::Shortcut { keys } => match session.handle_shortcut(&keys) {
            Some((action, pending)) => {
                Handled::loading(snapshot(session).with_data(action), pending)
            }
            None => Handled::reply(IpcResponse::error(format!("no command bound to {}", keys))),
        },
        IpcMessage::SearchCommands { query } => {
            let commands = session.search_commands(&query);
            Handled::reply(snapshot(session).with_data(commands))
        }
        IpcMessage::ToggleTheme => {
            session.toggle_theme();
            Handled::reply(snapshot(session))
        }
        IpcMessage::SetAdBlock {
            enabled,
            strict_mode,
        } => {
            if let Some(enabled) = enabled {
                session.set_ad_block_enabled(enabled);
            }
            if let Some(strict) = strict_mode {
                session.set_strict_mode(strict);
            }
            Handled::reply(snapshot(session))
        }
        IpcMessage::Favicon { url } => {
            let icon = session.favicon_for(&url);
            Handled::reply(snapshot(session).with_data(icon))
        }

        IpcMessage::Snapshot | IpcMessage::Quit => Handled::reply(snapshot(session)),
    }
}

fn snapshot<S: PersistentStore>(session: &BrowserSession<S>) -> IpcResponse {
    IpcResponse::success(session.snapshot())
}

fn handle_traversal<S: PersistentStore>(
    session: &mut BrowserSession<S>,
    step: fn(&mut BrowserSession<S>) -> bool,
) -> Handled {
    let moved = step(session);
    Handled::reply(snapshot(session).with_data(serde_json::json!({ "moved": moved })))
}

fn handle_toggle_bookmark<S: PersistentStore>(
    session: &mut BrowserSession<S>,
    url: Option<&str>,
) -> Handled {
    let outcome = match url {
        Some(url) => session.toggle_bookmark(url),
        None => session.toggle_current_bookmark(),
    };

    let data = match &outcome {
        BookmarkToggle::Added(b) => ToggleResult {
            added: true,
            url: &b.url,
        },
        BookmarkToggle::Removed(b) => ToggleResult {
            added: false,
            url: &b.url,
        },
    };
    let response = snapshot(session).with_data(data);
    Handled::reply(response)
}

fn handle_export_bookmarks<S: PersistentStore>(
    session: &BrowserSession<S>,
    dir: Option<PathBuf>,
    default_dir: &Path,
) -> Handled {
    let dir = dir.unwrap_or_else(|| default_dir.to_path_buf());
    match session.export_bookmarks_to(&dir) {
        Ok(path) => {
            info!("Bookmarks exported to {}", path.display());
            let data = serde_json::json!({ "path": path.display().to_string() });
            Handled::reply(snapshot(session).with_data(data))
        }
        Err(e) => {
            warn!("Bookmark export failed: {}", e);
            Handled::reply(IpcResponse::error(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tidewave_core::types::{DownloadKind, Panel};
    use tidewave_core::{Config, MemoryStore};

    fn session() -> BrowserSession<MemoryStore> {
        BrowserSession::open(MemoryStore::new(), Config::default())
    }

    fn run(session: &mut BrowserSession<MemoryStore>, message: IpcMessage) -> Handled {
        handle_message(session, Path::new("."), message)
    }

    #[test]
    fn test_navigate_schedules_load() {
        let mut session = session();
        let handled = run(
            &mut session,
            IpcMessage::Navigate {
                input: "wikipedia.org".to_string(),
            },
        );

        assert!(handled.response.ok);
        assert!(handled.pending.is_some());
        let view = handled.response.view.unwrap();
        assert_eq!(view.url, "https://wikipedia.org");
        assert!(view.is_loading);
    }

    #[test]
    fn test_back_reports_movement() {
        let mut session = session();
        let handled = run(&mut session, IpcMessage::Back);
        assert_eq!(handled.response.data.unwrap()["moved"], false);
        assert!(handled.pending.is_none());
    }

    #[test]
    fn test_toggle_current_bookmark() {
        let mut session = session();
        run(
            &mut session,
            IpcMessage::Navigate {
                input: "docs.rs".to_string(),
            },
        );

        let handled = run(&mut session, IpcMessage::ToggleBookmark { url: None });
        let data = handled.response.data.unwrap();
        assert_eq!(data["added"], true);
        assert_eq!(data["url"], "https://docs.rs");
    }

    #[test]
    fn test_import_failure_is_error_reply() {
        let mut session = session();
        let handled = run(
            &mut session,
            IpcMessage::ImportBookmarks {
                document: "{}".to_string(),
            },
        );
        assert!(!handled.response.ok);
        assert!(handled.response.error.unwrap().contains("array"));
        assert_eq!(session.bookmarks().len(), 2);
    }

    #[test]
    fn test_export_to_directory() {
        let dir = TempDir::new().unwrap();
        let mut session = session();
        let handled = handle_message(
            &mut session,
            dir.path(),
            IpcMessage::ExportBookmarks { path: None },
        );

        assert!(handled.response.ok);
        assert!(dir.path().join("tidewave_bookmarks.json").exists());
    }

    #[test]
    fn test_download_opens_panel() {
        let mut session = session();
        let handled = run(
            &mut session,
            IpcMessage::StartDownload {
                filename: "clip.mp4".to_string(),
                kind: DownloadKind::Video,
            },
        );

        let view = handled.response.view.unwrap();
        assert_eq!(view.open_panel, Some(Panel::Downloads));
        assert_eq!(view.downloads.len(), 1);
    }

    #[test]
    fn test_unknown_shortcut() {
        let mut session = session();
        let handled = run(
            &mut session,
            IpcMessage::Shortcut {
                keys: "Ctrl+Alt+Z".to_string(),
            },
        );
        assert!(!handled.response.ok);
    }

    #[test]
    fn test_set_ad_block_partial() {
        let mut session = session();
        run(
            &mut session,
            IpcMessage::SetAdBlock {
                enabled: None,
                strict_mode: Some(true),
            },
        );
        assert!(session.ad_block_stats().enabled);
        assert!(session.ad_block_stats().strict_mode);
    }
}
