// Core modules
pub mod api;
pub mod config;
pub mod error;
pub mod execution;
pub mod indicators;
pub mod models;
pub mod orchestrator;
pub mod strategy;

// Re-export commonly used types
pub use api::{BinanceFuturesClient, Exchange};
pub use config::Config;
pub use error::{BotError, Result};
pub use models::*;
pub use orchestrator::Orchestrator;
