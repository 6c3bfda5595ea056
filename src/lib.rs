//! UWB Lateration Engine
//!
//! Real-time 2D tag positioning from streaming anchor range reports: an
//! anchor table that absorbs batches of readings and a solver that turns a
//! snapshot of usable anchors into a validated position.

pub mod core;
pub mod algorithms;
pub mod processing;
pub mod validation;
pub mod utils;
pub mod api;

// Re-export commonly used types
pub use crate::core::{
    AnchorId, AnchorLayout, AnchorReading, MapBounds, Point2, PositionEstimate, RangeReport,
    SequencePolicy, Snapshot, SnapshotEntry, SolveMethod, UnresolvedReason,
};
pub use algorithms::{LaterationSolver, LeastSquaresMultilateration, SolveReport, Trilateration};
pub use processing::{AnchorTable, ApplyReport, BatchParser, DecodedBatch, RejectedReading};
pub use validation::{ConfigError, DecodeError, InvalidReading, MalformedEntry, SolveError};
pub use utils::{init_logging, AnchorConfig, EngineConfig, LogLevel};
pub use api::{EstimateFormatter, IngestReport, MethodComparison, PositioningEngine};
