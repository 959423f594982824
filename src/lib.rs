pub mod clipboard;
pub mod config;
pub mod history;
pub mod hotkeys;
pub mod logging;
pub mod paste;
pub mod platform;
pub mod runtime;

pub use clipboard::content::Content;
pub use clipboard::item::HistoryItem;
pub use history::HistoryStore;
pub use runtime::{ClipStack, ClipStackHandle};
