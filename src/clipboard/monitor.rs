use std::time::Duration;

use super::classifier::classify;
use crate::history::store::HistoryStore;
use crate::paste::CoordinationToken;
use crate::platform::ClipboardAccess;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserverState {
    Stopped,
    Running,
}

/// What a single poll did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Stopped, or the clipboard has not changed.
    Idle,
    /// The change was our own paste write.
    SelfWrite,
    /// New content went into the history.
    Captured,
    /// Changed, but nothing usable (or a duplicate-free no-op).
    Ignored,
}

/// Polls the clipboard change counter and feeds new content into the history.
///
/// The observer does not own a timer; the runtime calls [`tick`](Self::tick)
/// at [`interval`](Self::interval) while it is running.
pub struct ClipboardObserver {
    state: ObserverState,
    interval: Duration,
    last_change_count: i64,
    token: CoordinationToken,
}

impl ClipboardObserver {
    /// Whatever is on the clipboard now counts as already seen.
    pub fn new<C>(clipboard: &mut C, token: CoordinationToken, interval: Duration) -> Self
    where
        C: ClipboardAccess + ?Sized,
    {
        let interval = if interval.is_zero() {
            DEFAULT_POLL_INTERVAL
        } else {
            interval
        };
        Self {
            state: ObserverState::Stopped,
            interval,
            last_change_count: clipboard.change_count(),
            token,
        }
    }

    pub fn state(&self) -> ObserverState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == ObserverState::Running
    }

    pub fn start(&mut self) {
        if self.state == ObserverState::Running {
            return;
        }
        self.state = ObserverState::Running;
        log::info!("Clipboard observer started (every {:?})", self.interval);
    }

    pub fn stop(&mut self) {
        if self.state == ObserverState::Stopped {
            return;
        }
        self.state = ObserverState::Stopped;
        log::info!("Clipboard observer stopped");
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn set_interval(&mut self, interval: Duration) {
        if interval.is_zero() {
            log::warn!("Ignoring zero poll interval, keeping {:?}", self.interval);
            return;
        }
        self.interval = interval;
        log::debug!("Poll interval set to {:?}", interval);
    }

    pub fn tick<C>(&mut self, clipboard: &mut C, history: &mut HistoryStore) -> TickOutcome
    where
        C: ClipboardAccess + ?Sized,
    {
        if self.state == ObserverState::Stopped {
            return TickOutcome::Idle;
        }

        let count = clipboard.change_count();
        if count == self.last_change_count {
            return TickOutcome::Idle;
        }
        self.last_change_count = count;

        if self.token.consume(count) {
            log::debug!("Skipping our own clipboard write (change count {})", count);
            return TickOutcome::SelfWrite;
        }

        let snapshot = match clipboard.snapshot() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::debug!("Clipboard read failed: {}", e);
                return TickOutcome::Ignored;
            }
        };

        let Some(content) = classify(&snapshot) else {
            log::debug!("Clipboard change {} has no recognizable content", count);
            return TickOutcome::Ignored;
        };

        let kind = content.kind();
        if history.add(content) {
            log::debug!("Captured {} (change count {}), {} items", kind, count, history.len());
            TickOutcome::Captured
        } else {
            TickOutcome::Ignored
        }
    }
}
