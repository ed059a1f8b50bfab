//! Line-delimited JSON protocol between a front end and the host
//!
//! Each stdin line is one [`IpcMessage`]; each stdout line is one
//! [`IpcResponse`].

pub mod commands;

use serde::{Deserialize, Serialize};
use tidewave_core::types::{DownloadKind, Panel};
use tidewave_shell::SessionView;

/// Command sent to the host
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum IpcMessage {
    // Navigation
    Navigate {
        input: String,
    },
    Back,
    Forward,
    Reload,

    // Bookmarks
    ToggleBookmark {
        url: Option<String>,
    },
    RemoveBookmark {
        id: String,
    },
    SearchBookmarks {
        query: String,
    },
    ExportBookmarks {
        path: Option<String>,
    },
    ImportBookmarks {
        document: String,
    },

    // Visited history
    SearchHistory {
        query: String,
    },
    RemoveHistoryItem {
        id: String,
    },
    ClearHistory,

    // Downloads
    StartDownload {
        filename: String,
        kind: DownloadKind,
    },
    FailDownload {
        id: u64,
    },
    RemoveDownload {
        id: u64,
    },
    ClearDownloads,

    // Panels, palette and settings
    TogglePanel {
        panel: Panel,
    },
    Shortcut {
        keys: String,
    },
    SearchCommands {
        query: String,
    },
    ToggleTheme,
    SetAdBlock {
        enabled: Option<bool>,
        strict_mode: Option<bool>,
    },
    Favicon {
        url: String,
    },

    Snapshot,
    Quit,
}

/// Reply written for every command
#[derive(Debug, Clone, Serialize)]
pub struct IpcResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<SessionView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl IpcResponse {
    pub fn success(view: SessionView) -> Self {
        IpcResponse {
            ok: true,
            view: Some(view),
            data: None,
            error: None,
        }
    }

    /// Attach a command-specific payload next to the view
    pub fn with_data<T: Serialize>(mut self, data: T) -> Self {
        self.data = Some(serde_json::to_value(data).unwrap_or(serde_json::Value::Null));
        self
    }

    pub fn error(message: impl Into<String>) -> Self {
        IpcResponse {
            ok: false,
            view: None,
            data: None,
            error: Some(message.into()),
        }
    }

    /// Serialize as a single line
    pub fn to_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|err| {
            format!(
                "{{\"ok\":false,\"error\":\"reply serialization failed: {}\"}}",
                err.to_string().replace('"', "'")
            )
        })
    }
}

/// Parse one protocol line
pub fn parse_message(line: &str) -> Result<IpcMessage, String> {
    serde_json::from_str(line).map_err(|e| format!("invalid command: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_navigation() {
        assert_eq!(
            parse_message(r#"{"cmd":"navigate","input":"wikipedia.org"}"#).unwrap(),
            IpcMessage::Navigate {
                input: "wikipedia.org".to_string()
            }
        );
        assert_eq!(parse_message(r#"{"cmd":"back"}"#).unwrap(), IpcMessage::Back);
    }

    #[test]
    fn test_parse_optional_fields() {
        assert_eq!(
            parse_message(r#"{"cmd":"toggle_bookmark"}"#).unwrap(),
            IpcMessage::ToggleBookmark { url: None }
        );
        assert_eq!(
            parse_message(r#"{"cmd":"set_ad_block","strict_mode":true}"#).unwrap(),
            IpcMessage::SetAdBlock {
                enabled: None,
                strict_mode: Some(true)
            }
        );
    }

    #[test]
    fn test_parse_enums() {
        assert_eq!(
            parse_message(r#"{"cmd":"start_download","filename":"a.mp4","kind":"video"}"#)
                .unwrap(),
            IpcMessage::StartDownload {
                filename: "a.mp4".to_string(),
                kind: DownloadKind::Video
            }
        );
        assert_eq!(
            parse_message(r#"{"cmd":"toggle_panel","panel":"history"}"#).unwrap(),
            IpcMessage::TogglePanel {
                panel: Panel::History
            }
        );
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!(parse_message(r#"{"cmd":"launch_rockets"}"#).is_err());
        assert!(parse_message("not json").is_err());
        assert!(parse_message(r#"{"cmd":"navigate"}"#).is_err());
    }

    #[test]
    fn test_error_reply_shape() {
        let line = IpcResponse::error("nope").to_line();
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["ok"], false);
        assert_eq!(value["error"], "nope");
        assert!(value.get("view").is_none());
    }
}
