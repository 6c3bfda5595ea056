//! Overdetermined linear least-squares multilateration
//!
//! The circle equation of the first (reference) anchor is subtracted from
//! every other anchor's equation, giving an (N-1)x2 system `A·p = b` that is
//! solved with an SVD. A rank-deficient `A` (all anchors on one line) is
//! reported as degenerate instead of returning the minimum-norm point.

use crate::algorithms::geometry::circle_difference_row;
use crate::core::{Point2, SnapshotEntry, MIN_ANCHORS, RANK_TOLERANCE};
use crate::validation::error::SolveError;
use nalgebra::{DMatrix, DVector};

/// Least-squares solver over all usable anchors
#[derive(Debug, Clone, Copy)]
pub struct LeastSquaresMultilateration {
    /// Smallest-to-largest singular value ratio treated as rank deficient
    pub rank_tolerance: f64,
}

impl Default for LeastSquaresMultilateration {
    fn default() -> Self {
        Self {
            rank_tolerance: RANK_TOLERANCE,
        }
    }
}

impl LeastSquaresMultilateration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the linearized system with `entries[0]` as reference
    pub fn build_system(&self, entries: &[SnapshotEntry]) -> Option<(DMatrix<f64>, DVector<f64>)> {
        let (reference, others) = entries.split_first()?;
        let rows = others.len();
        let mut a_matrix = DMatrix::<f64>::zeros(rows, 2);
        let mut b_vector = DVector::<f64>::zeros(rows);

        for (row, entry) in others.iter().enumerate() {
            let ([a, b], c) = circle_difference_row(reference, entry);
            a_matrix[(row, 0)] = a;
            a_matrix[(row, 1)] = b;
            b_vector[row] = c;
        }

        Some((a_matrix, b_vector))
    }

    /// Solve using every entry; requires at least three
    pub fn solve(&self, entries: &[SnapshotEntry]) -> Result<Point2, SolveError> {
        if entries.len() < MIN_ANCHORS {
            return Err(SolveError::InsufficientAnchors {
                available: entries.len(),
                required: MIN_ANCHORS,
            });
        }

        let (a_matrix, b_vector) = self
            .build_system(entries)
            .ok_or(SolveError::DegenerateGeometry)?;

        // nalgebra's SVD panics on non-finite input; overflowed rows land here
        if !a_matrix.iter().chain(b_vector.iter()).all(|v| v.is_finite()) {
            return Err(SolveError::DegenerateGeometry);
        }

        let svd = a_matrix.svd(true, true);
        let (largest, smallest) = svd
            .singular_values
            .iter()
            .fold((0.0_f64, f64::INFINITY), |(hi, lo), &s| (hi.max(s), lo.min(s)));

        if !(largest.is_finite() && largest > 0.0) || smallest <= self.rank_tolerance * largest {
            return Err(SolveError::DegenerateGeometry);
        }

        let solution = svd
            .solve(&b_vector, self.rank_tolerance * largest)
            .map_err(|_| SolveError::DegenerateGeometry)?;

        Ok(Point2::new(solution[0], solution[1]))
    }
}
