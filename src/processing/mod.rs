//! Ingestion side: payload decoding and anchor state

pub mod parser;
pub mod table;

pub use parser::{BatchParser, DecodedBatch};
pub use table::{AnchorTable, ApplyReport, RejectedReading};
