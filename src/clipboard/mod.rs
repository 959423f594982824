pub mod classifier;
pub mod content;
pub mod item;
pub mod monitor;
pub mod rtf;
pub mod snapshot;
