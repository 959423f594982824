use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use env_logger::{Builder, Env, Target};

const LOG_FILE_NAME: &str = "clipstack.log";
const OLD_LOG_FILE_NAME: &str = "clipstack.old.log";
const MAX_LOG_BYTES: u64 = 2 * 1024 * 1024;

static LOG_PATH: Mutex<Option<PathBuf>> = Mutex::new(None);

/// Copies every log line to stderr and, when it could be opened, the log file.
struct Tee {
    file: Option<File>,
}

impl Write for Tee {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let _ = std::io::stderr().write_all(buf);
        if let Some(file) = self.file.as_mut() {
            let _ = file.write_all(buf);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        let _ = std::io::stderr().flush();
        if let Some(file) = self.file.as_mut() {
            file.flush()?;
        }
        Ok(())
    }
}

/// Installs the global logger. `RUST_LOG` wins over the default level, which
/// is `info`, or `debug` when `verbose` is set.
pub fn init(data_dir: &Path, verbose: bool) {
    let file = open_log_file(data_dir);
    let default_level = if verbose { "debug" } else { "info" };

    let result = Builder::from_env(Env::default().default_filter_or(default_level))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {:<5} {}: {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .target(Target::Pipe(Box::new(Tee { file })))
        .try_init();

    if result.is_err() {
        // Already installed, e.g. by a test harness.
        return;
    }

    log::info!("=== ClipStack v{} started ===", env!("CARGO_PKG_VERSION"));
    log::info!("OS: {} ({})", std::env::consts::OS, std::env::consts::ARCH);
    match log_path() {
        Some(path) => log::info!("Log file: {}", path.display()),
        None => log::warn!("Logging to stderr only"),
    }
}

fn open_log_file(data_dir: &Path) -> Option<File> {
    std::fs::create_dir_all(data_dir).ok()?;
    let log_path = data_dir.join(LOG_FILE_NAME);

    if let Ok(meta) = std::fs::metadata(&log_path) {
        if meta.len() > MAX_LOG_BYTES {
            let _ = std::fs::rename(&log_path, data_dir.join(OLD_LOG_FILE_NAME));
        }
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .ok()?;

    if let Ok(mut guard) = LOG_PATH.lock() {
        *guard = Some(log_path);
    }
    Some(file)
}

/// The file currently receiving log output, if any.
pub fn log_path() -> Option<PathBuf> {
    LOG_PATH.lock().ok().and_then(|guard| guard.clone())
}
