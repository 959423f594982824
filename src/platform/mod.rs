pub mod change_count;
pub mod keystroke;
pub mod system;

#[cfg(test)]
pub mod fake;

use thiserror::Error;

use crate::clipboard::snapshot::ClipboardSnapshot;

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),
    #[error("clipboard read failed: {0}")]
    Read(String),
    #[error("clipboard write failed: {0}")]
    Write(String),
}

#[derive(Debug, Error)]
pub enum KeystrokeError {
    #[error("input simulation permission not granted")]
    PermissionDenied,
    #[error("failed to synthesize key event: {0}")]
    Event(String),
}

/// The system clipboard as seen by the observer and the paste executor.
pub trait ClipboardAccess {
    /// Counter that grows on every clipboard write.
    fn change_count(&mut self) -> i64;

    fn snapshot(&mut self) -> Result<ClipboardSnapshot, ClipboardError>;

    /// Replaces the clipboard contents with `text`.
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// Sends the platform paste shortcut to the focused application.
pub trait PasteKeystroke: Send + Sync {
    fn send_paste(&self) -> Result<(), KeystrokeError>;
}
