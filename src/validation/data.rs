//! Per-report range validation applied before a reading reaches the table

use crate::core::{AnchorReading, RangeReport, SequencePolicy};
use crate::validation::error::InvalidReading;

/// A distance is usable when it is finite and non-negative
pub fn is_valid_distance(distance: f64) -> bool {
    distance.is_finite() && distance >= 0.0
}

/// Validates incoming reports against numeric ranges and the sequence policy
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadingValidator {
    policy: SequencePolicy,
}

impl ReadingValidator {
    pub fn new(policy: SequencePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> SequencePolicy {
        self.policy
    }

    /// Check one report; `stored` is the reading currently held for the same anchor
    pub fn validate(
        &self,
        report: &RangeReport,
        stored: Option<&AnchorReading>,
    ) -> Result<(), InvalidReading> {
        if report.distance.is_nan() || report.distance.is_infinite() {
            return Err(InvalidReading::NonFiniteDistance { distance: report.distance });
        }
        if report.distance < 0.0 {
            return Err(InvalidReading::NegativeDistance { distance: report.distance });
        }
        if report.sequence < 0 {
            return Err(InvalidReading::NegativeSequence { sequence: report.sequence });
        }

        if let (SequencePolicy::RejectOlder, Some(stored)) = (self.policy, stored) {
            if report.sequence < stored.sequence {
                return Err(InvalidReading::StaleSequence {
                    sequence: report.sequence,
                    stored: stored.sequence,
                });
            }
        }

        Ok(())
    }
}
