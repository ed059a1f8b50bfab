//! Browser session shell - navigation, bookmarks, history and panels
//!
//! [`BrowserSession`] is the controller every front end drives. The other
//! modules hold the pieces it composes and can be used on their own.

pub mod bookmarks;
pub mod history;
pub mod page;
pub mod palette;
pub mod session;
pub mod synth;
pub mod visited;

pub use bookmarks::{BookmarkManager, BookmarkToggle, ImportOutcome};
pub use history::HistoryStack;
pub use page::{classify, classify_input, NavigationTarget, NEW_TAB_URL, SEARCH_URL_PREFIX};
pub use palette::{Command, CommandCategory, CommandPalette, PanelState, ShellAction};
pub use session::{BrowserSession, FaviconSource, NoFavicons, PendingLoad, SessionView};
pub use visited::VisitedHistory;
