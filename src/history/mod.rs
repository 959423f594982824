pub mod record;
pub mod store;
pub mod writer;

pub use record::StoreError;
pub use store::{HistoryStore, DEFAULT_CAPACITY};
