//! The service that owns the clipboard, the history and the paste path.
//!
//! Everything that touches the history runs on one task: poll ticks and
//! commands are interleaved by a single `select!` loop, so the sequence never
//! needs a lock. Other threads talk to it through a [`ClipStackHandle`].

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

use crate::clipboard::item::HistoryItem;
use crate::clipboard::monitor::{ClipboardObserver, TickOutcome};
use crate::history::HistoryStore;
use crate::paste::{CoordinationToken, PasteExecutor};
use crate::platform::{ClipboardAccess, ClipboardError, PasteKeystroke};

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("service is not running")]
    Closed,
    #[error(transparent)]
    Clipboard(#[from] ClipboardError),
    #[error("failed to start service thread: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug)]
pub enum Command {
    /// Paste the item at this position (0 = most recent).
    PasteItem(usize),
    SetCapacity(usize),
    SetInterval(Duration),
    Clear,
    Start,
    Stop,
    Snapshot(oneshot::Sender<Vec<HistoryItem>>),
    Shutdown,
}

#[derive(Clone)]
pub struct ClipStackHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl ClipStackHandle {
    pub fn send(&self, command: Command) -> Result<(), RuntimeError> {
        self.tx.send(command).map_err(|_| RuntimeError::Closed)
    }

    pub fn paste_item(&self, index: usize) -> Result<(), RuntimeError> {
        self.send(Command::PasteItem(index))
    }

    pub fn set_capacity(&self, capacity: usize) -> Result<(), RuntimeError> {
        self.send(Command::SetCapacity(capacity))
    }

    pub fn set_interval(&self, interval: Duration) -> Result<(), RuntimeError> {
        self.send(Command::SetInterval(interval))
    }

    pub fn clear(&self) -> Result<(), RuntimeError> {
        self.send(Command::Clear)
    }

    pub fn start(&self) -> Result<(), RuntimeError> {
        self.send(Command::Start)
    }

    pub fn stop(&self) -> Result<(), RuntimeError> {
        self.send(Command::Stop)
    }

    pub async fn items(&self) -> Result<Vec<HistoryItem>, RuntimeError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Command::Snapshot(reply_tx))?;
        reply_rx.await.map_err(|_| RuntimeError::Closed)
    }

    pub fn shutdown(&self) -> Result<(), RuntimeError> {
        self.send(Command::Shutdown)
    }
}

pub struct ClipStack<C> {
    clipboard: C,
    history: HistoryStore,
    observer: ClipboardObserver,
    executor: PasteExecutor,
}

impl<C: ClipboardAccess> ClipStack<C> {
    /// Builds a stopped service. The clipboard's current content is treated
    /// as already seen.
    pub fn new(
        mut clipboard: C,
        history: HistoryStore,
        keystroke: Arc<dyn PasteKeystroke>,
        interval: Duration,
    ) -> Self {
        let token = CoordinationToken::new();
        let observer = ClipboardObserver::new(&mut clipboard, token.clone(), interval);
        let executor = PasteExecutor::new(token, keystroke);
        Self {
            clipboard,
            history,
            observer,
            executor,
        }
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn observer(&self) -> &ClipboardObserver {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut ClipboardObserver {
        &mut self.observer
    }

    pub fn tick(&mut self) -> TickOutcome {
        self.observer.tick(&mut self.clipboard, &mut self.history)
    }

    /// Applies one command. Returns `false` once the service should exit.
    pub fn handle_command(&mut self, command: Command) -> bool {
        match command {
            Command::PasteItem(index) => self.paste_item(index),
            Command::SetCapacity(capacity) => self.history.set_capacity(capacity),
            Command::SetInterval(interval) => self.observer.set_interval(interval),
            Command::Clear => {
                self.history.clear();
                log::info!("History cleared");
            }
            Command::Start => self.observer.start(),
            Command::Stop => self.observer.stop(),
            Command::Snapshot(reply) => {
                let _ = reply.send(self.history.items().to_vec());
            }
            Command::Shutdown => return false,
        }
        true
    }

    fn paste_item(&mut self, index: usize) {
        let Some(item) = isize::try_from(index).ok().and_then(|i| self.history.item(i)) else {
            log::info!("Nothing to paste at position {} ({} items)", index, self.history.len());
            return;
        };
        let Some(text) = item.content.paste_text() else {
            log::info!("Skipping paste of {} entry at position {}", item.content.kind(), index);
            return;
        };

        if let Err(e) = self.executor.paste(&mut self.clipboard, &text) {
            log::warn!("Paste of position {} failed: {}", index, e);
        }
    }

    /// Runs until `Shutdown` arrives or every handle is dropped.
    pub async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        let mut next_tick = Instant::now() + self.observer.interval();

        loop {
            let running = self.observer.is_running();
            tokio::select! {
                _ = tokio::time::sleep_until(next_tick), if running => {
                    self.tick();
                    next_tick = Instant::now() + self.observer.interval();
                }
                command = commands.recv() => {
                    let Some(command) = command else { break };
                    let was_running = self.observer.is_running();
                    if !self.handle_command(command) {
                        break;
                    }
                    if !was_running && self.observer.is_running() {
                        next_tick = Instant::now() + self.observer.interval();
                    }
                }
            }
        }

        log::info!("ClipStack service stopped with {} items", self.history.len());
    }
}

/// Starts the service on its own thread with a current-thread runtime.
///
/// `factory` runs on that thread, so the clipboard need not be `Send`. The
/// observer is started before this returns.
pub fn spawn<C, F>(factory: F) -> Result<(ClipStackHandle, JoinHandle<()>), RuntimeError>
where
    C: ClipboardAccess + 'static,
    F: FnOnce() -> Result<ClipStack<C>, ClipboardError> + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let (ready_tx, ready_rx) = std::sync::mpsc::channel::<Result<(), RuntimeError>>();

    let thread = std::thread::Builder::new()
        .name("clipstack-service".to_string())
        .spawn(move || {
            let rt = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    let _ = ready_tx.send(Err(e.into()));
                    return;
                }
            };

            let mut service = match factory() {
                Ok(service) => service,
                Err(e) => {
                    let _ = ready_tx.send(Err(e.into()));
                    return;
                }
            };
            service.observer_mut().start();
            let _ = ready_tx.send(Ok(()));

            rt.block_on(service.run(rx));
        })?;

    match ready_rx.recv() {
        Ok(Ok(())) => Ok((ClipStackHandle { tx }, thread)),
        Ok(Err(e)) => {
            let _ = thread.join();
            Err(e)
        }
        Err(_) => {
            let _ = thread.join();
            Err(RuntimeError::Closed)
        }
    }
}
