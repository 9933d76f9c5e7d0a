pub mod config;
pub mod context;
pub mod error;
pub mod filter;
pub mod insights;
pub mod store;
pub mod suggest;
pub mod task;
pub mod types;

pub use config::{
    ConfigManager, LoggingConfig, SecurityConfig, ServerConfig, Settings, SuggestionConfig,
};
pub use context::*;
pub use error::*;
pub use filter::*;
pub use insights::*;
pub use store::*;
pub use suggest::*;
pub use task::*;
pub use types::*;
