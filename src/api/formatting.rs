//! Display and JSON output for position estimates
//!
//! Estimates are kept at full precision internally; rounding happens only here.

use crate::algorithms::solver::SolveReport;
use crate::core::{PositionEstimate, DISPLAY_PRECISION};

/// Renders estimates for humans and for downstream JSON consumers
#[derive(Debug, Clone, Copy)]
pub struct EstimateFormatter {
    /// Decimal places for coordinates
    pub precision: u8,
}

impl Default for EstimateFormatter {
    fn default() -> Self {
        Self {
            precision: DISPLAY_PRECISION,
        }
    }
}

impl EstimateFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_precision(mut self, precision: u8) -> Self {
        self.precision = precision;
        self
    }

    /// `"Tri (3.57, 2.87)"`, or `"Tri unresolved: out of bounds"`
    pub fn format_text(&self, label: &str, estimate: &PositionEstimate) -> String {
        let precision = self.precision as usize;
        match estimate {
            PositionEstimate::Resolved { x, y } => {
                format!("{} ({:.*}, {:.*})", label, precision, x, precision, y)
            }
            PositionEstimate::Unresolved { reason } => format!("{} unresolved: {}", label, reason),
        }
    }

    /// Estimate as JSON with coordinates rounded to the display precision
    pub fn format_json(&self, estimate: &PositionEstimate) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.rounded(estimate))
    }

    /// Full solve report as JSON, position rounded
    pub fn format_report_json(&self, report: &SolveReport) -> Result<String, serde_json::Error> {
        let mut rounded = report.clone();
        rounded.estimate = self.rounded(&report.estimate);
        serde_json::to_string(&rounded)
    }

    fn rounded(&self, estimate: &PositionEstimate) -> PositionEstimate {
        match *estimate {
            PositionEstimate::Resolved { x, y } => PositionEstimate::Resolved {
                x: self.round_to_precision(x),
                y: self.round_to_precision(y),
            },
            unresolved => unresolved,
        }
    }

    fn round_to_precision(&self, value: f64) -> f64 {
        let multiplier = 10_f64.powi(self.precision as i32);
        (value * multiplier).round() / multiplier
    }
}
