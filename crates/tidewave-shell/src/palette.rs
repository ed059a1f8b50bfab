//! Side panels and the keyboard command palette

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use serde::{Deserialize, Serialize};
use tidewave_core::types::Panel;

/// Visibility of the mutually exclusive side panels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PanelState {
    open: Option<Panel>,
}

impl PanelState {
    pub fn open_panel(&self) -> Option<Panel> {
        self.open
    }

    pub fn is_open(&self, panel: Panel) -> bool {
        self.open == Some(panel)
    }

    /// Open `panel` (closing the others) or close it if already open
    pub fn toggle(&mut self, panel: Panel) -> Option<Panel> {
        self.open = if self.is_open(panel) { None } else { Some(panel) };
        self.open
    }

    /// Open `panel` regardless of current state
    pub fn reveal(&mut self, panel: Panel) {
        self.open = Some(panel);
    }

    pub fn close(&mut self) {
        self.open = None;
    }
}

/// Operation a command triggers on the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShellAction {
    TogglePanel(Panel),
    ToggleBookmark,
    Back,
    Forward,
    Reload,
    NewTab,
    ToggleTheme,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Command {
    pub id: String,
    pub name: String,
    pub description: String,
    pub shortcut: Option<String>,
    pub category: CommandCategory,
    pub action: ShellAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandCategory {
    Navigation,
    Panels,
    Bookmarks,
    Settings,
}

pub struct CommandPalette {
    commands: Vec<Command>,
    matcher: SkimMatcherV2,
}

impl std::fmt::Debug for CommandPalette {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandPalette")
            .field("commands", &self.commands.len())
            .finish()
    }
}

impl CommandPalette {
    pub fn new() -> Self {
        let mut palette = Self {
            commands: Vec::new(),
            matcher: SkimMatcherV2::default(),
        };

        // Register default commands
        palette.register_defaults();
        palette
    }

    fn register_defaults(&mut self) {
        let defaults = [
            (
                "toggle_bookmarks",
                "Toggle Bookmarks",
                "Show or hide the bookmarks panel",
                "Ctrl+B",
                CommandCategory::Panels,
                ShellAction::TogglePanel(Panel::Bookmarks),
            ),
            (
                "toggle_history",
                "Toggle History",
                "Show or hide the history panel",
                "Ctrl+H",
                CommandCategory::Panels,
                ShellAction::TogglePanel(Panel::History),
            ),
            (
                "toggle_downloads",
                "Toggle Downloads",
                "Show or hide the downloads panel",
                "Ctrl+J",
                CommandCategory::Panels,
                ShellAction::TogglePanel(Panel::Downloads),
            ),
            (
                "bookmark_page",
                "Bookmark Page",
                "Add or remove a bookmark for the current page",
                "Ctrl+D",
                CommandCategory::Bookmarks,
                ShellAction::ToggleBookmark,
            ),
            (
                "back",
                "Go Back",
                "Go to the previous page",
                "Alt+Left",
                CommandCategory::Navigation,
                ShellAction::Back,
            ),
            (
                "forward",
                "Go Forward",
                "Go to the next page",
                "Alt+Right",
                CommandCategory::Navigation,
                ShellAction::Forward,
            ),
            (
                "reload",
                "Reload",
                "Reload the current page",
                "Ctrl+R",
                CommandCategory::Navigation,
                ShellAction::Reload,
            ),
            (
                "new_tab",
                "New Tab",
                "Return to the new tab page",
                "Ctrl+T",
                CommandCategory::Navigation,
                ShellAction::NewTab,
            ),
            (
                "toggle_theme",
                "Toggle Theme",
                "Switch between dark and light themes",
                "Ctrl+Shift+L",
                CommandCategory::Settings,
                ShellAction::ToggleTheme,
            ),
        ];

        for (id, name, description, shortcut, category, action) in defaults {
            self.register(Command {
                id: id.to_string(),
                name: name.to_string(),
                description: description.to_string(),
                shortcut: Some(shortcut.to_string()),
                category,
                action,
            });
        }
    }

    pub fn register(&mut self, command: Command) {
        self.commands.push(command);
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Resolve a key chord such as "ctrl+b" to its command
    pub fn command_for_shortcut(&self, keys: &str) -> Option<&Command> {
        let wanted = normalize_chord(keys);
        self.commands.iter().find(|cmd| {
            cmd.shortcut
                .as_deref()
                .is_some_and(|shortcut| normalize_chord(shortcut) == wanted)
        })
    }

    pub fn search(&self, query: &str) -> Vec<Command> {
        let mut results: Vec<(i64, Command)> = self
            .commands
            .iter()
            .filter_map(|cmd| {
                self.matcher
                    .fuzzy_match(&cmd.name, query)
                    .map(|score| (score, cmd.clone()))
            })
            .collect();

        // Sort by score descending
        results.sort_by(|a, b| b.0.cmp(&a.0));

        results.into_iter().map(|(_, cmd)| cmd).take(10).collect()
    }
}

impl Default for CommandPalette {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize_chord(keys: &str) -> String {
    keys.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase()
}
