//! Engine facade and output interfaces
//!
//! The engine owns the anchor table and solver; consumers receive estimates
//! through callbacks or channels and format them for display.

pub mod callback;
pub mod engine;
pub mod formatting;

pub use callback::{CallbackHandle, ConsumerRegistry, PositionCallback};
pub use engine::{IngestReport, MethodComparison, PositioningEngine};
pub use formatting::EstimateFormatter;
