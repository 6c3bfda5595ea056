//! Core types and constants for the lateration engine

pub mod types;
pub mod constants;

pub use types::*;
pub use constants::*;
