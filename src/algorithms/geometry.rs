//! Shared geometry helpers for the linearized circle equations

use crate::core::{MapBounds, Point2, SnapshotEntry};
use crate::validation::error::SolveError;

/// One row of the linear system obtained by subtracting the reference circle
/// equation from another anchor's circle equation.
///
/// Returns `([2(xi - x1), 2(yi - y1)], d1² - di² - x1² - y1² + xi² + yi²)`.
pub fn circle_difference_row(reference: &SnapshotEntry, other: &SnapshotEntry) -> ([f64; 2], f64) {
    let (x1, y1, d1) = (reference.position.x, reference.position.y, reference.distance);
    let (xi, yi, di) = (other.position.x, other.position.y, other.distance);

    let coefficients = [2.0 * (xi - x1), 2.0 * (yi - y1)];
    let rhs = d1.powi(2) - di.powi(2) - x1.powi(2) - y1.powi(2) + xi.powi(2) + yi.powi(2);
    (coefficients, rhs)
}

/// Accept a solved point only if it is finite and inside the map
pub fn validate_in_bounds(point: Point2, bounds: &MapBounds) -> Result<Point2, SolveError> {
    if !point.is_finite() {
        return Err(SolveError::DegenerateGeometry);
    }
    if !bounds.contains(&point) {
        return Err(SolveError::OutOfBounds { x: point.x, y: point.y });
    }
    Ok(point)
}

/// Root-mean-square difference between measured and implied ranges
pub fn rms_range_residual(point: &Point2, entries: &[SnapshotEntry]) -> f64 {
    if entries.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = entries
        .iter()
        .map(|entry| (point.distance_to(&entry.position) - entry.distance).powi(2))
        .sum();
    (sum_sq / entries.len() as f64).sqrt()
}
