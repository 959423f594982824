//! Global paste shortcuts: modifier combo plus a digit pastes a history item.

pub mod listener;

use device_query::Keycode;
use serde::{Deserialize, Serialize};

pub use listener::HotkeyListener;

/// Modifier combination that, held with a digit, triggers a paste.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HotKeyModifiers {
    #[default]
    CommandOption,
    CommandShift,
    ControlOption,
    ControlShift,
    CommandControl,
}

impl HotKeyModifiers {
    pub const ALL: [HotKeyModifiers; 5] = [
        HotKeyModifiers::CommandOption,
        HotKeyModifiers::CommandShift,
        HotKeyModifiers::ControlOption,
        HotKeyModifiers::ControlShift,
        HotKeyModifiers::CommandControl,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            HotKeyModifiers::CommandOption => "⌘⌥",
            HotKeyModifiers::CommandShift => "⌘⇧",
            HotKeyModifiers::ControlOption => "⌃⌥",
            HotKeyModifiers::ControlShift => "⌃⇧",
            HotKeyModifiers::CommandControl => "⌘⌃",
        }
    }

    pub fn full_name(self) -> &'static str {
        match self {
            HotKeyModifiers::CommandOption => "Command+Option",
            HotKeyModifiers::CommandShift => "Command+Shift",
            HotKeyModifiers::ControlOption => "Control+Option",
            HotKeyModifiers::ControlShift => "Control+Shift",
            HotKeyModifiers::CommandControl => "Command+Control",
        }
    }

    /// The secondary "paste as plain text" chord: the combo plus Shift, or
    /// plus Option when Shift is already part of it.
    pub fn plain_text_display_name(self) -> String {
        let name = self.display_name();
        if name.contains('⇧') {
            format!("{}⌥", name)
        } else {
            format!("{}⇧", name)
        }
    }

    fn required(self) -> ModifierSet {
        let none = ModifierSet::default();
        match self {
            HotKeyModifiers::CommandOption => ModifierSet { command: true, option: true, ..none },
            HotKeyModifiers::CommandShift => ModifierSet { command: true, shift: true, ..none },
            HotKeyModifiers::ControlOption => ModifierSet { control: true, option: true, ..none },
            HotKeyModifiers::ControlShift => ModifierSet { control: true, shift: true, ..none },
            HotKeyModifiers::CommandControl => ModifierSet { command: true, control: true, ..none },
        }
    }

    fn plain_text_required(self) -> ModifierSet {
        let mut set = self.required();
        if set.shift {
            set.option = true;
        } else {
            set.shift = true;
        }
        set
    }

    /// Exactly the combo's modifiers are down.
    pub fn held(self, keys: &[Keycode]) -> bool {
        ModifierSet::from_keys(keys) == self.required()
    }

    pub fn plain_text_held(self, keys: &[Keycode]) -> bool {
        ModifierSet::from_keys(keys) == self.plain_text_required()
    }
}

/// Modifier state, with left/right and platform spellings folded together.
/// Command also matches Meta so the combos work without a Command key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct ModifierSet {
    command: bool,
    option: bool,
    shift: bool,
    control: bool,
}

impl ModifierSet {
    fn from_keys(keys: &[Keycode]) -> Self {
        let any = |candidates: &[Keycode]| candidates.iter().any(|key| keys.contains(key));
        Self {
            command: any(&[Keycode::Command, Keycode::LMeta, Keycode::RMeta]),
            option: any(&[Keycode::LOption, Keycode::ROption, Keycode::LAlt, Keycode::RAlt]),
            shift: any(&[Keycode::LShift, Keycode::RShift]),
            control: any(&[Keycode::LControl, Keycode::RControl]),
        }
    }
}

const DIGIT_KEYS: [(Keycode, u8); 10] = [
    (Keycode::Key0, 0),
    (Keycode::Key1, 1),
    (Keycode::Key2, 2),
    (Keycode::Key3, 3),
    (Keycode::Key4, 4),
    (Keycode::Key5, 5),
    (Keycode::Key6, 6),
    (Keycode::Key7, 7),
    (Keycode::Key8, 8),
    (Keycode::Key9, 9),
];

/// Lowest digit key currently down, if any.
pub fn pressed_digit(keys: &[Keycode]) -> Option<u8> {
    DIGIT_KEYS
        .iter()
        .find(|(key, _)| keys.contains(key))
        .map(|&(_, digit)| digit)
}

/// `1`..`9` select positions 0..8, `0` selects position 9.
pub fn index_for_digit(digit: u8) -> Option<usize> {
    match digit {
        0 => Some(9),
        1..=9 => Some(usize::from(digit) - 1),
        _ => None,
    }
}

/// Inverse of [`index_for_digit`]: the digit shown next to a history position.
pub fn shortcut_digit(index: usize) -> Option<char> {
    match index {
        0..=8 => char::from_digit(index as u32 + 1, 10),
        9 => Some('0'),
        _ => None,
    }
}
