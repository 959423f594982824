use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use device_query::{DeviceQuery, DeviceState, Keycode};

use super::{index_for_digit, pressed_digit, HotKeyModifiers};
use crate::runtime::ClipStackHandle;

const KEY_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Turns raw key state into at most one paste per chord press.
#[derive(Debug)]
pub struct ChordTracker {
    modifiers: HotKeyModifiers,
    last: Option<usize>,
}

impl ChordTracker {
    pub fn new(modifiers: HotKeyModifiers) -> Self {
        Self {
            modifiers,
            last: None,
        }
    }

    /// Returns the position to paste when a chord goes down; `None` while it
    /// stays held or nothing is pressed. The plain-text chord pastes the same
    /// item, since pastes are always plain text.
    pub fn update(&mut self, keys: &[Keycode]) -> Option<usize> {
        if !self.modifiers.held(keys) && !self.modifiers.plain_text_held(keys) {
            self.last = None;
            return None;
        }

        let index = pressed_digit(keys).and_then(index_for_digit);
        if index == self.last {
            return None;
        }
        self.last = index;
        index
    }
}

/// Polls the keyboard on a background thread. Key state is read, never
/// intercepted, so focused windows still see every key.
pub struct HotkeyListener {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl HotkeyListener {
    pub fn start(handle: ClipStackHandle, modifiers: HotKeyModifiers) -> std::io::Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let thread = std::thread::Builder::new()
            .name("clipstack-hotkeys".to_string())
            .spawn(move || listen(handle, modifiers, stop_flag))?;

        Ok(Self {
            stop,
            thread: Some(thread),
        })
    }

    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for HotkeyListener {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn listen(handle: ClipStackHandle, modifiers: HotKeyModifiers, stop: Arc<AtomicBool>) {
    let device_state = match std::panic::catch_unwind(DeviceState::new) {
        Ok(state) => state,
        Err(_) => {
            log::warn!("Keyboard state unavailable, paste shortcuts disabled");
            return;
        }
    };
    let mut tracker = ChordTracker::new(modifiers);

    log::info!(
        "Shortcut listener started: {}+1..{}+0 ({}), plain text {}+digit",
        modifiers.display_name(),
        modifiers.display_name(),
        modifiers.full_name(),
        modifiers.plain_text_display_name()
    );

    while !stop.load(Ordering::Relaxed) {
        std::thread::sleep(KEY_POLL_INTERVAL);

        let keys = device_state.get_keys();
        let Some(index) = tracker.update(&keys) else {
            continue;
        };

        log::debug!("Shortcut for position {} pressed", index);
        if handle.paste_item(index).is_err() {
            log::debug!("Service gone, shortcut listener exiting");
            break;
        }
    }
}
