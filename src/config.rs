use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::history::DEFAULT_CAPACITY;
use crate::hotkeys::HotKeyModifiers;

pub const APP_DIR_NAME: &str = "ClipStack";
pub const DATA_DIR_ENV: &str = "CLIPSTACK_DATA_DIR";
pub const HISTORY_FILE: &str = "history.json";
pub const PREFERENCES_FILE: &str = "preferences.json";

pub const HISTORY_SIZE_CHOICES: [usize; 6] = [5, 10, 15, 20, 25, 50];
pub const POLLING_INTERVAL_CHOICES: [f64; 4] = [0.25, 0.5, 1.0, 2.0];
pub const DEFAULT_POLLING_INTERVAL_SECS: f64 = 0.5;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("preferences I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("preferences are not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Where history, preferences and logs live.
///
/// An explicit override wins, then `CLIPSTACK_DATA_DIR`, then the platform
/// data directory.
pub fn data_dir(override_dir: Option<&Path>) -> PathBuf {
    if let Some(dir) = override_dir {
        return dir.to_path_buf();
    }
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(dir);
    }
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR_NAME)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub history_size: usize,
    pub polling_interval_secs: f64,
    pub hotkey_modifiers: HotKeyModifiers,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            history_size: DEFAULT_CAPACITY,
            polling_interval_secs: DEFAULT_POLLING_INTERVAL_SECS,
            hotkey_modifiers: HotKeyModifiers::default(),
        }
    }
}

impl Preferences {
    pub fn path(data_dir: &Path) -> PathBuf {
        data_dir.join(PREFERENCES_FILE)
    }

    /// Reads preferences from `data_dir`. Never fails: a missing file gives
    /// defaults, an unreadable one gives defaults and a warning.
    pub fn load(data_dir: &Path) -> Self {
        let path = Self::path(data_dir);
        match Self::read(&path) {
            Ok(Some(prefs)) => prefs.sanitized(),
            Ok(None) => Self::default(),
            Err(e) => {
                log::warn!("Ignoring preferences at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    fn read(path: &Path) -> Result<Option<Self>, ConfigError> {
        let data = match std::fs::read(path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&data)?))
    }

    pub fn save(&self, data_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(data_dir)?;
        let json = serde_json::to_vec_pretty(self)?;
        std::fs::write(Self::path(data_dir), json)?;
        Ok(())
    }

    /// Non-positive values fall back to defaults; values outside the offered
    /// choices are kept but noted.
    pub fn sanitized(mut self) -> Self {
        if self.history_size == 0 {
            log::warn!("history_size must be positive, using {}", DEFAULT_CAPACITY);
            self.history_size = DEFAULT_CAPACITY;
        } else if !HISTORY_SIZE_CHOICES.contains(&self.history_size) {
            log::info!("Using non-standard history_size {}", self.history_size);
        }

        let secs = self.polling_interval_secs;
        if !secs.is_finite() || secs <= 0.0 {
            log::warn!(
                "polling_interval_secs must be positive, using {}",
                DEFAULT_POLLING_INTERVAL_SECS
            );
            self.polling_interval_secs = DEFAULT_POLLING_INTERVAL_SECS;
        } else if !POLLING_INTERVAL_CHOICES.contains(&secs) {
            log::info!("Using non-standard polling_interval_secs {}", secs);
        }

        self
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.polling_interval_secs)
            .ok()
            .filter(|d| !d.is_zero())
            .unwrap_or(Duration::from_millis(500))
    }
}
