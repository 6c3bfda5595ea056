use crate::core::RangeReport;
use crate::validation::error::{DecodeError, MalformedEntry};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

/// Per-anchor payload as published by the anchor gateway:
/// `{"ANC3": {"distance": 1.14, "seq": 1001, "active": true}, ...}`
#[derive(Debug, Clone, Deserialize)]
struct WireReading {
    distance: f64,
    seq: i64,
    active: bool,
}

/// Well-typed reports plus the entries that could not be decoded
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedBatch {
    /// Reports in payload order
    pub reports: Vec<RangeReport>,
    pub malformed: Vec<MalformedEntry>,
}

/// Decodes gateway JSON payloads into range report batches
#[derive(Debug, Clone)]
pub struct BatchParser {
    strict_validation: bool,
}

impl BatchParser {
    /// Lenient parser: malformed entries are collected, good ones kept
    pub fn new() -> Self {
        Self {
            strict_validation: false,
        }
    }

    /// In strict mode any malformed entry fails the whole payload
    pub fn set_strict_validation(&mut self, strict: bool) {
        self.strict_validation = strict;
    }

    pub fn parse_bytes(&self, payload: &[u8]) -> Result<DecodedBatch, DecodeError> {
        let value: Value = serde_json::from_slice(payload)?;
        self.parse_value(value)
    }

    pub fn parse(&self, payload: &str) -> Result<DecodedBatch, DecodeError> {
        let value: Value = serde_json::from_str(payload)?;
        self.parse_value(value)
    }

    fn parse_value(&self, value: Value) -> Result<DecodedBatch, DecodeError> {
        let entries = match value {
            Value::Object(entries) => entries,
            other => {
                return Err(DecodeError::NotAnObject {
                    found: json_kind(&other),
                })
            }
        };

        let mut batch = DecodedBatch::default();
        for (anchor_id, entry) in entries {
            match serde_json::from_value::<WireReading>(entry) {
                Ok(wire) => batch.reports.push(RangeReport::new(
                    anchor_id,
                    wire.distance,
                    wire.seq,
                    wire.active,
                )),
                Err(err) => {
                    warn!(anchor = %anchor_id, error = %err, "malformed payload entry");
                    batch.malformed.push(MalformedEntry {
                        anchor_id,
                        reason: err.to_string(),
                    });
                }
            }
        }

        if self.strict_validation && !batch.malformed.is_empty() {
            let count = batch.malformed.len();
            let first = batch.malformed.swap_remove(0);
            return Err(DecodeError::MalformedEntries { count, first });
        }

        Ok(batch)
    }
}

impl Default for BatchParser {
    fn default() -> Self {
        Self::new()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
