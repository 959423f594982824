use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};

use super::record::{encode_history, read_history_file, write_history_bytes};
use super::writer::HistoryWriter;
use crate::clipboard::content::Content;
use crate::clipboard::item::HistoryItem;

pub const DEFAULT_CAPACITY: usize = 10;

/// Most-recent-first clipboard history, bounded and free of duplicates.
pub struct HistoryStore {
    items: Vec<HistoryItem>,
    capacity: usize,
    storage: Option<Storage>,
}

struct Storage {
    path: PathBuf,
    // None when the writer thread could not start; saves then run inline.
    writer: Option<HistoryWriter>,
}

impl HistoryStore {
    /// History that lives only in memory.
    pub fn new(capacity: usize) -> Self {
        Self {
            items: Vec::new(),
            capacity: capacity.max(1),
            storage: None,
        }
    }

    /// History backed by `path`. Whatever is stored there is loaded and cut
    /// down to `capacity`; a missing or broken file starts empty.
    pub fn open(path: impl Into<PathBuf>, capacity: usize) -> Self {
        let path = path.into();
        let capacity = capacity.max(1);

        let mut items = match read_history_file(&path) {
            Ok(items) => items,
            Err(e) => {
                if path.exists() {
                    log::warn!("Could not load history from {}: {}", path.display(), e);
                } else {
                    log::debug!("No history file at {}", path.display());
                }
                Vec::new()
            }
        };
        let loaded = items.len();
        dedup_keep_first(&mut items);
        if items.len() < loaded {
            log::warn!(
                "Dropped {} duplicate entries from {}",
                loaded - items.len(),
                path.display()
            );
        }
        items.truncate(capacity);
        log::info!("Loaded {} history items from {}", items.len(), path.display());

        let writer = match HistoryWriter::spawn(path.clone()) {
            Ok(writer) => Some(writer),
            Err(e) => {
                log::warn!("History writer not started, saving inline: {}", e);
                None
            }
        };

        Self {
            items,
            capacity,
            storage: Some(Storage { path, writer }),
        }
    }

    /// Adds `content` at the front, dropping any equal entry and the oldest
    /// entries beyond capacity. Whitespace-only plain text is ignored.
    /// Returns whether the history changed.
    pub fn add(&mut self, content: Content) -> bool {
        if let Content::PlainText(text) = &content {
            if text.trim().is_empty() {
                return false;
            }
        }

        let copied_at = self.next_timestamp();
        self.items.retain(|existing| existing.content != content);

        let item = HistoryItem::new(content, copied_at);
        log::debug!(
            "Captured: id={} kind={} at={}",
            item.id,
            item.content.kind(),
            item.copied_at.timestamp_millis()
        );
        self.items.insert(0, item);
        self.items.truncate(self.capacity);

        self.persist();
        true
    }

    /// Item at `index` in most-recent-first order.
    pub fn item(&self, index: isize) -> Option<&HistoryItem> {
        usize::try_from(index).ok().and_then(|i| self.items.get(i))
    }

    pub fn items(&self) -> &[HistoryItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn storage_path(&self) -> Option<&Path> {
        self.storage.as_ref().map(|storage| storage.path.as_path())
    }

    /// Waits for queued saves to reach disk.
    pub fn flush(&self) {
        if let Some(writer) = self.storage.as_ref().and_then(|s| s.writer.as_ref()) {
            writer.flush();
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.persist();
    }

    pub fn set_capacity(&mut self, capacity: usize) {
        if capacity == 0 {
            log::warn!("Ignoring history capacity of 0, using 1");
        }
        self.capacity = capacity.max(1);
        if self.items.len() > self.capacity {
            let dropped = self.items.len() - self.capacity;
            self.items.truncate(self.capacity);
            log::info!("Expired {} old items (limit: {})", dropped, self.capacity);
            self.persist();
        }
    }

    /// Now, or just after the newest entry when the clock has not moved.
    fn next_timestamp(&self) -> DateTime<Utc> {
        let now = Utc::now();
        match self.items.first() {
            Some(head) if now <= head.copied_at => head.copied_at + Duration::microseconds(1),
            _ => now,
        }
    }

    /// Encodes now, writes later: the disk write happens on the writer thread.
    fn persist(&self) {
        let Some(storage) = &self.storage else {
            return;
        };
        let bytes = match encode_history(&self.items) {
            Ok(bytes) => bytes,
            Err(e) => {
                log::warn!("Failed to encode history: {}", e);
                return;
            }
        };
        match &storage.writer {
            Some(writer) => writer.save(bytes),
            None => {
                if let Err(e) = write_history_bytes(&storage.path, &bytes) {
                    log::warn!("Failed to save history to {}: {}", storage.path.display(), e);
                }
            }
        }
    }
}

fn dedup_keep_first(items: &mut Vec<HistoryItem>) {
    let mut kept: Vec<HistoryItem> = Vec::with_capacity(items.len());
    for item in items.drain(..) {
        if !kept.contains(&item) {
            kept.push(item);
        }
    }
    *items = kept;
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::content::Thumbnail;
    use crate::clipboard::content::WebLink;

    fn text_of(item: &HistoryItem) -> Option<&str> {
        match &item.content {
            Content::PlainText(s) => Some(s.as_str()),
            _ => None,
        }
    }

    fn texts(history: &HistoryStore) -> Vec<&str> {
        history.items().iter().filter_map(text_of).collect()
    }

    fn image(bytes: &[u8]) -> Content {
        Content::Image {
            tiff: bytes.to_vec(),
            thumbnail: Thumbnail::empty(),
        }
    }

    #[test]
    fn add_inserts_at_front() {
        let mut history = HistoryStore::default();
        history.add(Content::PlainText("a".into()));
        history.add(Content::PlainText("b".into()));
        history.add(Content::PlainText("c".into()));
        assert_eq!(texts(&history), vec!["c", "b", "a"]);
    }

    #[test]
    fn empty_and_whitespace_text_is_ignored() {
        let mut history = HistoryStore::default();
        for blank in ["", "   ", "\n\n", "\t\t", "   \n\t "] {
            assert!(!history.add(Content::PlainText(blank.into())));
        }
        assert!(history.is_empty());

        history.add(Content::PlainText("  hello  ".into()));
        assert_eq!(texts(&history), vec!["  hello  "]);
    }

    #[test]
    fn duplicate_moves_to_front_with_newer_timestamp() {
        let mut history = HistoryStore::default();
        history.add(Content::PlainText("first".into()));
        let first_at = history.items()[0].copied_at;
        history.add(Content::PlainText("second".into()));
        history.add(Content::PlainText("first".into()));

        assert_eq!(texts(&history), vec!["first", "second"]);
        assert!(history.items()[0].copied_at > first_at);
        assert!(history.items()[0].copied_at > history.items()[1].copied_at);
    }

    #[test]
    fn duplicate_detection_is_exact() {
        let mut history = HistoryStore::default();
        history.add(Content::PlainText("hello".into()));
        history.add(Content::PlainText("hello ".into()));
        history.add(Content::PlainText("Hello".into()));
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn dedup_applies_to_every_variant_but_not_across_variants() {
        let mut history = HistoryStore::default();
        let url = WebLink::parse("https://example.com").unwrap();

        history.add(image(&[1, 2, 3]));
        history.add(image(&[1, 2, 3]));
        history.add(Content::RichText { rtf: vec![4, 5], plain_fallback: "a".into() });
        history.add(Content::RichText { rtf: vec![4, 5], plain_fallback: "b".into() });
        history.add(Content::FileReference(vec!["/tmp/t.txt".into()]));
        history.add(Content::FileReference(vec!["/tmp/t.txt".into()]));
        history.add(Content::WebUrl(url.clone()));
        history.add(Content::WebUrl(url));
        assert_eq!(history.len(), 4);

        history.add(Content::PlainText("https://example.com/".into()));
        assert_eq!(history.len(), 5);
    }

    #[test]
    fn oldest_items_are_evicted_at_capacity() {
        let mut history = HistoryStore::default();
        for i in 1..=11 {
            history.add(Content::PlainText(i.to_string()));
        }
        let expected: Vec<String> = (2..=11).rev().map(|i| i.to_string()).collect();
        assert_eq!(texts(&history), expected);
        assert!(!texts(&history).contains(&"1"));
    }

    #[test]
    fn length_and_uniqueness_hold_for_mixed_sequences() {
        let mut history = HistoryStore::new(5);
        for i in 0..40 {
            history.add(Content::PlainText((i % 7).to_string()));
            assert!(history.len() <= 5);
            let items = history.items();
            for (a, left) in items.iter().enumerate() {
                for right in &items[a + 1..] {
                    assert_ne!(left.content, right.content);
                }
            }
        }
    }

    #[test]
    fn item_lookup_by_position() {
        let mut history = HistoryStore::default();
        assert!(history.item(0).is_none());

        history.add(Content::PlainText("a".into()));
        history.add(Content::PlainText("b".into()));
        history.add(Content::PlainText("c".into()));
        assert_eq!(history.item(0).and_then(text_of), Some("c"));
        assert_eq!(history.item(2).and_then(text_of), Some("a"));
        assert!(history.item(-1).is_none());
        assert!(history.item(3).is_none());
        assert!(history.item(100).is_none());
    }

    #[test]
    fn clear_then_add() {
        let mut history = HistoryStore::default();
        history.clear();
        history.add(Content::PlainText("before".into()));
        history.clear();
        assert!(history.is_empty());
        history.add(Content::PlainText("after".into()));
        assert_eq!(texts(&history), vec!["after"]);
    }

    #[test]
    fn shrinking_capacity_truncates_tail() {
        let mut history = HistoryStore::default();
        for i in 1..=10 {
            history.add(Content::PlainText(i.to_string()));
        }
        history.set_capacity(3);
        assert_eq!(texts(&history), vec!["10", "9", "8"]);

        history.set_capacity(20);
        assert_eq!(history.len(), 3);
        for i in 11..=30 {
            history.add(Content::PlainText(i.to_string()));
        }
        assert_eq!(history.len(), 20);
    }

    #[test]
    fn persisted_history_round_trips_without_images() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");

        let mut history = HistoryStore::open(&path, 10);
        history.add(Content::PlainText("one".into()));
        history.add(image(&[9, 9, 9]));
        history.add(Content::WebUrl(WebLink::parse("https://example.com/x").unwrap()));
        history.add(Content::FileReference(vec!["/tmp/a.txt".into()]));
        history.add(Content::RichText {
            rtf: br"{\rtf1 rich}".to_vec(),
            plain_fallback: "rich".into(),
        });

        let expected: Vec<Content> = history
            .items()
            .iter()
            .filter(|i| !i.content.is_image())
            .map(|i| i.content.clone())
            .collect();

        history.flush();
        let reloaded = HistoryStore::open(&path, 10);
        let contents: Vec<Content> = reloaded.items().iter().map(|i| i.content.clone()).collect();
        assert_eq!(contents, expected);
        assert_eq!(reloaded.items()[0].id, history.items()[0].id);
    }

    #[test]
    fn image_only_history_reloads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");

        let mut history = HistoryStore::open(&path, 10);
        history.add(image(&[1]));
        history.add(image(&[2]));
        assert_eq!(history.len(), 2);
        history.flush();

        assert!(HistoryStore::open(&path, 10).is_empty());
    }

    #[test]
    fn loading_with_smaller_capacity_keeps_most_recent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");

        let mut history = HistoryStore::open(&path, 10);
        for i in 1..=8 {
            history.add(Content::PlainText(i.to_string()));
        }
        history.flush();

        let reloaded = HistoryStore::open(&path, 3);
        assert_eq!(texts(&reloaded), vec!["8", "7", "6"]);
    }

    #[test]
    fn saves_reach_disk_in_the_background() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");

        let mut history = HistoryStore::open(&path, 10);
        assert_eq!(history.storage_path(), Some(path.as_path()));
        history.add(Content::PlainText("queued".into()));
        history.flush();

        let saved = std::fs::read_to_string(&path).unwrap();
        assert!(saved.contains("queued"));

        history.clear();
        drop(history);
        assert_eq!(std::fs::read_to_string(&path).unwrap().trim(), "[]");
    }

    #[test]
    fn duplicate_records_are_dropped_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(
            &path,
            r#"[{"type":"plainText","text":"a"},{"type":"plainText","text":"b"},{"type":"plainText","text":"a"}]"#,
        )
        .unwrap();

        let history = HistoryStore::open(&path, 10);
        assert_eq!(texts(&history), vec!["a", "b"]);
        assert_eq!(HistoryStore::new(5).storage_path(), None);
    }

    #[test]
    fn missing_or_malformed_storage_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(HistoryStore::open(dir.path().join("absent.json"), 10).is_empty());

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{ not json").unwrap();
        assert!(HistoryStore::open(&bad, 10).is_empty());

        let partly_bad = dir.path().join("partly.json");
        std::fs::write(
            &partly_bad,
            r#"[{"type":"plainText","text":"ok"},{"type":"webURL","url":"nope"}]"#,
        )
        .unwrap();
        assert!(HistoryStore::open(&partly_bad, 10).is_empty());
    }

    #[test]
    fn unwritable_storage_keeps_working_in_memory() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be makes every write fail.
        let path = dir.path().join("history.json");
        std::fs::create_dir(&path).unwrap();

        let mut history = HistoryStore::open(&path, 10);
        history.add(Content::PlainText("still here".into()));
        assert_eq!(texts(&history), vec!["still here"]);
    }
}
