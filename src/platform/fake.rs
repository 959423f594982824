//! In-memory platform doubles for tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::{ClipboardAccess, ClipboardError, KeystrokeError, PasteKeystroke};
use crate::clipboard::snapshot::ClipboardSnapshot;

#[derive(Default)]
struct Board {
    change_count: i64,
    snapshot: ClipboardSnapshot,
    writes: Vec<String>,
    fail_writes: bool,
}

/// Shared clipboard: clones see the same contents, so a test can play the
/// "other application" while the service owns its own clone.
#[derive(Clone, Default)]
pub struct MemoryClipboard {
    board: Arc<Mutex<Board>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Another application writes to the clipboard.
    pub fn external_copy(&self, snapshot: ClipboardSnapshot) {
        let mut board = self.board.lock().unwrap();
        board.change_count += 1;
        board.snapshot = snapshot;
    }

    pub fn external_text(&self, text: &str) {
        self.external_copy(ClipboardSnapshot::text(text));
    }

    pub fn writes(&self) -> Vec<String> {
        self.board.lock().unwrap().writes.clone()
    }

    pub fn count(&self) -> i64 {
        self.board.lock().unwrap().change_count
    }

    pub fn fail_writes(&self, fail: bool) {
        self.board.lock().unwrap().fail_writes = fail;
    }
}

impl ClipboardAccess for MemoryClipboard {
    fn change_count(&mut self) -> i64 {
        self.board.lock().unwrap().change_count
    }

    fn snapshot(&mut self) -> Result<ClipboardSnapshot, ClipboardError> {
        Ok(self.board.lock().unwrap().snapshot.clone())
    }

    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        let mut board = self.board.lock().unwrap();
        if board.fail_writes {
            return Err(ClipboardError::Write("pasteboard locked".to_string()));
        }
        board.change_count += 1;
        board.snapshot = ClipboardSnapshot::text(text);
        board.writes.push(text.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingKeystroke {
    sent: AtomicUsize,
    deny: AtomicBool,
}

impl RecordingKeystroke {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn denied() -> Arc<Self> {
        let keystroke = Self::default();
        keystroke.deny.store(true, Ordering::SeqCst);
        Arc::new(keystroke)
    }

    pub fn sent(&self) -> usize {
        self.sent.load(Ordering::SeqCst)
    }
}

impl PasteKeystroke for RecordingKeystroke {
    fn send_paste(&self) -> Result<(), KeystrokeError> {
        if self.deny.load(Ordering::SeqCst) {
            return Err(KeystrokeError::PermissionDenied);
        }
        self.sent.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
