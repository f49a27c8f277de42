pub mod clock;
pub mod composer;
pub mod config;
pub mod conversation;
pub mod diagnostics;
pub mod error;
pub mod memo;
pub mod models;
pub mod search;
pub mod seed;
pub mod selectors;
pub mod state;

pub use config::SelectorConfig;
pub use error::CoreError;
pub use selectors::Selectors;
pub use state::AppState;
