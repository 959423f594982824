pub mod executor;
pub mod token;

pub use executor::{PasteExecutor, PASTE_DELAY};
pub use token::CoordinationToken;
