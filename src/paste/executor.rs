use std::sync::Arc;
use std::time::Duration;

use super::token::CoordinationToken;
use crate::platform::{ClipboardAccess, ClipboardError, PasteKeystroke};

/// Time for a closing menu to hand focus back before the keystroke lands.
pub const PASTE_DELAY: Duration = Duration::from_millis(50);

/// Writes text to the clipboard and pastes it into the focused application.
pub struct PasteExecutor {
    token: CoordinationToken,
    keystroke: Arc<dyn PasteKeystroke>,
    delay: Duration,
}

impl PasteExecutor {
    pub fn new(token: CoordinationToken, keystroke: Arc<dyn PasteKeystroke>) -> Self {
        Self {
            token,
            keystroke,
            delay: PASTE_DELAY,
        }
    }

    pub fn token(&self) -> &CoordinationToken {
        &self.token
    }

    /// Puts `text` on the clipboard and schedules the paste keystroke.
    ///
    /// Returns once the clipboard holds `text`; the keystroke follows after
    /// the paste delay. A failed write leaves no token behind.
    pub fn paste<C>(&self, clipboard: &mut C, text: &str) -> Result<(), ClipboardError>
    where
        C: ClipboardAccess + ?Sized,
    {
        let current = clipboard.change_count();
        self.token.expect(current + 1);

        if let Err(e) = clipboard.write_text(text) {
            self.token.clear();
            return Err(e);
        }
        log::debug!("Paste: wrote {} bytes, expecting change count {}", text.len(), current + 1);

        self.schedule_keystroke();
        Ok(())
    }

    fn schedule_keystroke(&self) {
        let keystroke = Arc::clone(&self.keystroke);
        let delay = self.delay;

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    tokio::time::sleep(delay).await;
                    deliver(keystroke.as_ref());
                });
            }
            Err(_) => {
                std::thread::spawn(move || {
                    std::thread::sleep(delay);
                    deliver(keystroke.as_ref());
                });
            }
        }
    }
}

fn deliver(keystroke: &dyn PasteKeystroke) {
    match keystroke.send_paste() {
        Ok(()) => log::debug!("Paste keystroke sent"),
        Err(e) => log::warn!(
            "Paste keystroke not delivered ({}); the text is on the clipboard for a manual paste",
            e
        ),
    }
}
