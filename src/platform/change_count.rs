//! Clipboard change counting.
//!
//! macOS exposes `NSPasteboard.changeCount`, a cheap integer read. Elsewhere
//! the counter is emulated by fingerprinting the clipboard and bumping a local
//! count whenever the fingerprint moves.

#[cfg(target_os = "macos")]
use objc::sel;
#[cfg(target_os = "macos")]
use objc::sel_impl;

use sha2::{Digest, Sha256};

#[cfg(target_os = "macos")]
pub fn native_change_count() -> Option<i64> {
    use cocoa::appkit::NSPasteboard;
    use cocoa::base::nil;
    use objc::runtime::Object;

    unsafe {
        let pasteboard: *mut Object = NSPasteboard::generalPasteboard(nil);
        if pasteboard.is_null() {
            return None;
        }
        // NSInteger, 64-bit on every supported target
        let change_count: i64 = objc::msg_send![pasteboard, changeCount];
        Some(change_count)
    }
}

#[cfg(not(target_os = "macos"))]
pub fn native_change_count() -> Option<i64> {
    None
}

/// Hash of whatever identifies the current clipboard contents.
pub fn fingerprint<'a>(parts: impl IntoIterator<Item = &'a [u8]>) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update((part.len() as u64).to_le_bytes());
        hasher.update(part);
    }
    format!("{:x}", hasher.finalize())
}

/// Local stand-in for a native change counter.
#[derive(Debug, Default)]
pub struct EmulatedCounter {
    count: i64,
    last_fingerprint: Option<String>,
}

impl EmulatedCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds the current fingerprint and returns the count. The first
    /// observation only sets the baseline.
    pub fn observe(&mut self, fingerprint: String) -> i64 {
        match &self.last_fingerprint {
            Some(last) if *last == fingerprint => {}
            Some(_) => {
                self.count += 1;
                self.last_fingerprint = Some(fingerprint);
            }
            None => self.last_fingerprint = Some(fingerprint),
        }
        self.count
    }

    /// Counts our own write as exactly one change and adopts its fingerprint,
    /// so the next `observe` of the same contents reports no further change.
    pub fn record_write(&mut self, fingerprint: String) -> i64 {
        self.count += 1;
        self.last_fingerprint = Some(fingerprint);
        self.count
    }
}
