//! Reading validation and error types

pub mod data;
pub mod error;

pub use data::{is_valid_distance, ReadingValidator};
pub use error::{ConfigError, DecodeError, InvalidReading, MalformedEntry, SolveError};
