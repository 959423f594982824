use std::path::PathBuf;
use std::sync::mpsc;
use std::thread::JoinHandle;

use super::record::write_history_bytes;

enum Request {
    Save(Vec<u8>),
    Flush(mpsc::Sender<()>),
}

/// Writes encoded history on its own thread so captures never wait on disk.
///
/// Saves are applied in order; when several queue up only the newest is
/// written. Dropping the writer finishes any pending save.
pub struct HistoryWriter {
    tx: Option<mpsc::Sender<Request>>,
    thread: Option<JoinHandle<()>>,
}

impl HistoryWriter {
    pub fn spawn(path: PathBuf) -> std::io::Result<Self> {
        let (tx, rx) = mpsc::channel();
        let thread = std::thread::Builder::new()
            .name("clipstack-history-writer".to_string())
            .spawn(move || write_loop(path, rx))?;
        Ok(Self {
            tx: Some(tx),
            thread: Some(thread),
        })
    }

    pub fn save(&self, bytes: Vec<u8>) {
        let sent = self
            .tx
            .as_ref()
            .is_some_and(|tx| tx.send(Request::Save(bytes)).is_ok());
        if !sent {
            log::warn!("History writer is gone, change not saved");
        }
    }

    /// Blocks until every save queued so far is on disk (or has failed).
    pub fn flush(&self) {
        let Some(tx) = &self.tx else {
            return;
        };
        let (ack_tx, ack_rx) = mpsc::channel();
        if tx.send(Request::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.recv();
        }
    }
}

impl Drop for HistoryWriter {
    fn drop(&mut self) {
        self.tx.take();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

fn write_loop(path: PathBuf, rx: mpsc::Receiver<Request>) {
    while let Ok(first) = rx.recv() {
        let mut latest = None;
        let mut acks = Vec::new();

        for request in std::iter::once(first).chain(rx.try_iter()) {
            match request {
                Request::Save(bytes) => latest = Some(bytes),
                Request::Flush(ack) => acks.push(ack),
            }
        }

        if let Some(bytes) = latest {
            if let Err(e) = write_history_bytes(&path, &bytes) {
                log::warn!("Failed to save history to {}: {}", path.display(), e);
            }
        }
        for ack in acks {
            let _ = ack.send(());
        }
    }
    log::debug!("History writer for {} stopped", path.display());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newest_save_ends_up_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        let writer = HistoryWriter::spawn(path.clone()).unwrap();

        for n in 0..50 {
            writer.save(format!("[{}]", n).into_bytes());
        }
        writer.flush();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[49]");
    }

    #[test]
    fn drop_finishes_pending_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("history.json");

        let writer = HistoryWriter::spawn(path.clone()).unwrap();
        writer.save(b"[]".to_vec());
        drop(writer);

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
    }

    #[test]
    fn failed_write_does_not_stop_the_writer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        std::fs::create_dir(&path).unwrap();

        let writer = HistoryWriter::spawn(path.clone()).unwrap();
        writer.save(b"[1]".to_vec());
        writer.flush();

        std::fs::remove_dir(&path).unwrap();
        writer.save(b"[2]".to_vec());
        writer.flush();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[2]");
    }
}
