use std::fs;
use std::path::Path;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;
use uuid::Uuid;

use crate::clipboard::classifier::{classify_text, file_path_from_entry};
use crate::clipboard::content::Content;
use crate::clipboard::item::HistoryItem;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("history file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("history file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("rich text payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("invalid {kind} record: {reason}")]
    InvalidRecord { kind: &'static str, reason: String },
}

/// One entry of `history.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(rename = "copiedAt", default, skip_serializing_if = "Option::is_none")]
    pub copied_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub payload: RecordPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RecordPayload {
    #[serde(rename = "plainText")]
    PlainText { text: String },
    #[serde(rename = "webURL")]
    WebUrl { url: String },
    #[serde(rename = "fileURL")]
    FileUrl { urls: Vec<String> },
    #[serde(rename = "richText")]
    RichText {
        rtf: String,
        #[serde(rename = "plainFallback")]
        plain_fallback: String,
    },
}

impl Record {
    /// Images have no persisted form.
    pub fn from_item(item: &HistoryItem) -> Option<Self> {
        let payload = match &item.content {
            Content::PlainText(text) => RecordPayload::PlainText { text: text.clone() },
            Content::WebUrl(link) => RecordPayload::WebUrl {
                url: link.as_str().to_string(),
            },
            Content::FileReference(paths) => RecordPayload::FileUrl {
                urls: paths
                    .iter()
                    .map(|p| {
                        Url::from_file_path(p)
                            .map(|u| u.to_string())
                            .unwrap_or_else(|_| p.display().to_string())
                    })
                    .collect(),
            },
            Content::RichText {
                rtf,
                plain_fallback,
            } => RecordPayload::RichText {
                rtf: BASE64.encode(rtf),
                plain_fallback: plain_fallback.clone(),
            },
            Content::Image { .. } => return None,
        };
        Some(Self {
            id: Some(item.id),
            copied_at: Some(item.copied_at),
            payload,
        })
    }

    pub fn into_item(self) -> Result<HistoryItem, StoreError> {
        let content = match self.payload {
            RecordPayload::PlainText { text } => Content::PlainText(text),
            RecordPayload::WebUrl { url } => match classify_text(&url) {
                web @ Content::WebUrl(_) => web,
                _ => {
                    return Err(StoreError::InvalidRecord {
                        kind: "webURL",
                        reason: format!("not an http(s) URL: {}", url),
                    })
                }
            },
            RecordPayload::FileUrl { urls } => {
                let paths = urls
                    .iter()
                    .map(|u| {
                        file_path_from_entry(u).ok_or_else(|| StoreError::InvalidRecord {
                            kind: "fileURL",
                            reason: format!("not a file reference: {}", u),
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                if paths.is_empty() {
                    return Err(StoreError::InvalidRecord {
                        kind: "fileURL",
                        reason: "empty file list".to_string(),
                    });
                }
                Content::FileReference(paths)
            }
            RecordPayload::RichText {
                rtf,
                plain_fallback,
            } => Content::RichText {
                rtf: BASE64.decode(rtf)?,
                plain_fallback,
            },
        };

        let mut item = HistoryItem::new(content, self.copied_at.unwrap_or_else(Utc::now));
        if let Some(id) = self.id {
            item.id = id;
        }
        Ok(item)
    }
}

/// Reads the whole file; any bad record fails the whole load.
pub fn read_history_file(path: &Path) -> Result<Vec<HistoryItem>, StoreError> {
    let data = fs::read(path)?;
    let records: Vec<Record> = serde_json::from_slice(&data)?;
    records.into_iter().map(Record::into_item).collect()
}

/// Serialized form of `items` as stored in `history.json`. Images are left out.
pub fn encode_history(items: &[HistoryItem]) -> Result<Vec<u8>, StoreError> {
    let records: Vec<Record> = items.iter().filter_map(Record::from_item).collect();
    Ok(serde_json::to_vec_pretty(&records)?)
}

/// Writes to a sibling temp file and renames it over `path`.
pub fn write_history_bytes(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
