//! Configuration and logging setup

pub mod config;
pub mod logging;

pub use config::{AnchorConfig, EngineConfig};
pub use logging::{init_logging, LogLevel};
