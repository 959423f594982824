use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use clipstack_lib::config::{self, Preferences, HISTORY_FILE};
use clipstack_lib::history::HistoryStore;
use clipstack_lib::hotkeys::{shortcut_digit, HotkeyListener};
use clipstack_lib::logging;
use clipstack_lib::platform::keystroke::SystemKeystroke;
use clipstack_lib::platform::system::SystemClipboard;
use clipstack_lib::runtime::{self, ClipStack};

#[derive(Debug, Parser)]
#[command(name = "clipstack", version, about = "Clipboard history with paste-back shortcuts")]
struct Cli {
    /// Directory holding history, preferences and logs
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Watch the clipboard and listen for paste shortcuts (default)
    Run {
        /// Number of items to keep, overriding preferences
        #[arg(long)]
        history_size: Option<usize>,

        /// Seconds between clipboard polls, overriding preferences
        #[arg(long)]
        interval: Option<f64>,
    },
    /// Print the saved history
    List,
    /// Delete the saved history
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let data_dir = config::data_dir(cli.data_dir.as_deref());
    logging::init(&data_dir, cli.verbose);

    let command = cli.command.unwrap_or(Command::Run {
        history_size: None,
        interval: None,
    });

    match command {
        Command::Run {
            history_size,
            interval,
        } => run(&data_dir, history_size, interval).await,
        Command::List => list(&data_dir),
        Command::Clear => clear(&data_dir),
    }
}

async fn run(data_dir: &Path, history_size: Option<usize>, interval: Option<f64>) -> Result<()> {
    let mut prefs = Preferences::load(data_dir);
    if let Some(size) = history_size {
        prefs.history_size = size;
    }
    if let Some(secs) = interval {
        prefs.polling_interval_secs = secs;
    }
    let prefs = prefs.sanitized();

    let history_path = data_dir.join(HISTORY_FILE);
    let capacity = prefs.history_size;
    let poll_interval = prefs.poll_interval();

    let (handle, service) = runtime::spawn(move || {
        let clipboard = SystemClipboard::new()?;
        let history = HistoryStore::open(history_path, capacity);
        Ok(ClipStack::new(
            clipboard,
            history,
            Arc::new(SystemKeystroke),
            poll_interval,
        ))
    })
    .context("failed to start clipboard service")?;

    let hotkeys = HotkeyListener::start(handle.clone(), prefs.hotkey_modifiers)
        .context("failed to start shortcut listener")?;

    let combo = prefs.hotkey_modifiers.display_name();
    log::info!(
        "Keeping {} items, polling every {:?}. Paste with {}1..{}0, Ctrl+C to quit",
        capacity,
        poll_interval,
        combo,
        combo
    );

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl+C")?;
    log::info!("Shutting down");

    let _ = handle.shutdown();
    let joined = tokio::task::spawn_blocking(move || {
        hotkeys.stop();
        service.join()
    })
    .await
    .context("failed to wait for clipboard service")?;
    if joined.is_err() {
        log::error!("Clipboard service thread panicked");
    }
    Ok(())
}

fn open_saved_history(data_dir: &Path) -> HistoryStore {
    let prefs = Preferences::load(data_dir);
    HistoryStore::open(data_dir.join(HISTORY_FILE), prefs.history_size)
}

fn list(data_dir: &Path) -> Result<()> {
    let history = open_saved_history(data_dir);
    if history.is_empty() {
        println!("History is empty");
        return Ok(());
    }

    for (index, item) in history.items().iter().enumerate() {
        let digit = shortcut_digit(index).unwrap_or(' ');
        println!(
            "{:>2}  [{}]  {:<8} {}  ({})",
            index + 1,
            digit,
            item.content.kind(),
            item.display_text(),
            item.copied_at
                .with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M:%S")
        );
    }
    Ok(())
}

fn clear(data_dir: &Path) -> Result<()> {
    let mut history = open_saved_history(data_dir);
    let count = history.len();
    history.clear();
    history.flush();
    match history.storage_path() {
        Some(path) => println!("Cleared {} items from {}", count, path.display()),
        None => println!("Cleared {} items", count),
    }
    log::info!("Cleared saved history; a running instance keeps its in-memory items");
    Ok(())
}
