//! Error taxonomy for the lateration engine
//!
//! Every failure the engine can hit is a value of one of these enums. Reading
//! and solve errors are local and recoverable; configuration errors only occur
//! at startup.

use crate::core::{AnchorId, UnresolvedReason};
use thiserror::Error;

/// Why a single range report was rejected by the anchor table
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum InvalidReading {
    #[error("distance {distance} is negative")]
    NegativeDistance { distance: f64 },
    #[error("distance {distance} is not finite")]
    NonFiniteDistance { distance: f64 },
    #[error("sequence {sequence} is negative")]
    NegativeSequence { sequence: i64 },
    #[error("sequence {sequence} is older than stored sequence {stored}")]
    StaleSequence { sequence: i64, stored: i64 },
}

/// Failure of a single solve attempt
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SolveError {
    #[error("need at least {required} usable anchors, have {available}")]
    InsufficientAnchors { available: usize, required: usize },
    #[error("anchor geometry is singular or rank deficient")]
    DegenerateGeometry,
    #[error("solution ({x:.2}, {y:.2}) lies outside the map")]
    OutOfBounds { x: f64, y: f64 },
}

impl SolveError {
    pub fn reason(&self) -> UnresolvedReason {
        match self {
            SolveError::InsufficientAnchors { .. } => UnresolvedReason::InsufficientAnchors,
            SolveError::DegenerateGeometry => UnresolvedReason::DegenerateGeometry,
            SolveError::OutOfBounds { .. } => UnresolvedReason::OutOfBounds,
        }
    }
}

/// Whole-payload decoding failure
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("payload must be a JSON object keyed by anchor id, got {found}")]
    NotAnObject { found: &'static str },
    #[error("{count} malformed entries in strict mode, first: {first}")]
    MalformedEntries { count: usize, first: MalformedEntry },
}

/// One payload entry that could not be turned into a range report
#[derive(Debug, Clone, PartialEq, Error)]
#[error("entry for anchor '{anchor_id}' is malformed: {reason}")]
pub struct MalformedEntry {
    pub anchor_id: String,
    pub reason: String,
}

/// Configuration loading and validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid map size {width} x {height}, both must be positive and finite")]
    InvalidMapSize { width: f64, height: f64 },
    #[error("anchor '{0}' is configured more than once")]
    DuplicateAnchor(AnchorId),
    #[error("anchor '{anchor_id}' has a non-finite position")]
    InvalidAnchorPosition { anchor_id: AnchorId },
}
