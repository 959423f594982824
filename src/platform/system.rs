use clipboard_rs::common::RustImage;
use clipboard_rs::{Clipboard, ClipboardContext, ContentFormat};

use super::change_count::{fingerprint, native_change_count, EmulatedCounter};
use super::{ClipboardAccess, ClipboardError};
use crate::clipboard::snapshot::ClipboardSnapshot;

#[cfg(target_os = "macos")]
const NATIVE_BITMAP_FORMAT: Option<&str> = Some("public.tiff");
#[cfg(not(target_os = "macos"))]
const NATIVE_BITMAP_FORMAT: Option<&str> = None;

/// The OS clipboard through `clipboard-rs`.
pub struct SystemClipboard {
    ctx: ClipboardContext,
    counter: EmulatedCounter,
}

impl SystemClipboard {
    pub fn new() -> Result<Self, ClipboardError> {
        let ctx = ClipboardContext::new().map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
        Ok(Self {
            ctx,
            counter: EmulatedCounter::new(),
        })
    }

    // Cheap enough for a poll: format names, text and file list. Image-only
    // changes that keep the same formats are not seen by the emulated counter.
    fn current_fingerprint(&self) -> String {
        let formats = self.ctx.available_formats().unwrap_or_default().join("\n");
        let text = self.ctx.get_text().unwrap_or_default();
        let files = self.ctx.get_files().unwrap_or_default().join("\n");
        fingerprint([formats.as_bytes(), text.as_bytes(), files.as_bytes()])
    }
}

impl ClipboardAccess for SystemClipboard {
    fn change_count(&mut self) -> i64 {
        if let Some(count) = native_change_count() {
            return count;
        }
        let fingerprint = self.current_fingerprint();
        self.counter.observe(fingerprint)
    }

    fn snapshot(&mut self) -> Result<ClipboardSnapshot, ClipboardError> {
        let mut snapshot = ClipboardSnapshot::default();

        if let Some(format) = NATIVE_BITMAP_FORMAT {
            if self.ctx.has(ContentFormat::Other(format.to_string())) {
                snapshot.tiff = self.ctx.get_buffer(format).ok();
            }
        }

        if snapshot.tiff.is_none() && self.ctx.has(ContentFormat::Image) {
            if let Ok(img) = self.ctx.get_image() {
                match img.to_png() {
                    Ok(png) => snapshot.png = Some(png.get_bytes().to_vec()),
                    Err(e) => log::debug!("clipboard image could not be encoded: {}", e),
                }
            }
        }

        if self.ctx.has(ContentFormat::Files) {
            if let Ok(files) = self.ctx.get_files() {
                snapshot.files = files;
            }
        }

        if self.ctx.has(ContentFormat::Rtf) {
            if let Ok(rtf) = self.ctx.get_rich_text() {
                snapshot.rtf = Some(rtf.into_bytes());
            }
        }

        if self.ctx.has(ContentFormat::Text) {
            snapshot.text = self.ctx.get_text().ok();
        }

        Ok(snapshot)
    }

    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.ctx
            .set_text(text.to_string())
            .map_err(|e| ClipboardError::Write(e.to_string()))?;
        if native_change_count().is_none() {
            let fingerprint = self.current_fingerprint();
            self.counter.record_write(fingerprint);
        }
        Ok(())
    }
}
