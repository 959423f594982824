use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::content::Content;

#[derive(Debug, Clone)]
pub struct HistoryItem {
    pub id: Uuid,
    pub content: Content,
    pub copied_at: DateTime<Utc>,
}

impl HistoryItem {
    pub fn new(content: Content, copied_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content,
            copied_at,
        }
    }

    pub fn display_text(&self) -> String {
        self.content.display_text()
    }
}

/// Items compare by content; identity and timestamp are ignored.
impl PartialEq for HistoryItem {
    fn eq(&self, other: &Self) -> bool {
        self.content == other.content
    }
}
