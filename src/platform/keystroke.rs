use super::{KeystrokeError, PasteKeystroke};

/// Cmd+V on macOS, Ctrl+V elsewhere.
pub struct SystemKeystroke;

#[cfg(target_os = "macos")]
mod imp {
    use core_graphics::event::{CGEvent, CGEventFlags, CGEventTapLocation, CGKeyCode};
    use core_graphics::event_source::{CGEventSource, CGEventSourceStateID};

    use super::KeystrokeError;

    const KEY_V: CGKeyCode = 0x09;

    pub fn accessibility_trusted() -> bool {
        #[link(name = "ApplicationServices", kind = "framework")]
        extern "C" {
            fn AXIsProcessTrusted() -> bool;
        }
        unsafe { AXIsProcessTrusted() }
    }

    pub fn send_paste() -> Result<(), KeystrokeError> {
        if !accessibility_trusted() {
            return Err(KeystrokeError::PermissionDenied);
        }

        let source = CGEventSource::new(CGEventSourceStateID::HIDSystemState)
            .map_err(|_| KeystrokeError::Event("failed to create CGEventSource".to_string()))?;

        let key_down = CGEvent::new_keyboard_event(source.clone(), KEY_V, true)
            .map_err(|_| KeystrokeError::Event("failed to create key down event".to_string()))?;
        key_down.set_flags(CGEventFlags::CGEventFlagCommand);

        let key_up = CGEvent::new_keyboard_event(source, KEY_V, false)
            .map_err(|_| KeystrokeError::Event("failed to create key up event".to_string()))?;
        key_up.set_flags(CGEventFlags::CGEventFlagCommand);

        key_down.post(CGEventTapLocation::HID);
        key_up.post(CGEventTapLocation::HID);
        Ok(())
    }
}

#[cfg(not(target_os = "macos"))]
mod imp {
    use enigo::{Direction, Enigo, Key, Keyboard, Settings};

    use super::KeystrokeError;

    pub fn send_paste() -> Result<(), KeystrokeError> {
        let mut enigo =
            Enigo::new(&Settings::default()).map_err(|e| KeystrokeError::Event(e.to_string()))?;

        enigo
            .key(Key::Control, Direction::Press)
            .map_err(|e| KeystrokeError::Event(e.to_string()))?;
        let pressed = enigo.key(Key::Unicode('v'), Direction::Click);
        // Release the modifier even if the V press failed.
        let released = enigo.key(Key::Control, Direction::Release);

        pressed.map_err(|e| KeystrokeError::Event(e.to_string()))?;
        released.map_err(|e| KeystrokeError::Event(e.to_string()))
    }
}

impl PasteKeystroke for SystemKeystroke {
    fn send_paste(&self) -> Result<(), KeystrokeError> {
        imp::send_paste()
    }
}
