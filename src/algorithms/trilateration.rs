//! Closed-form trilateration from exactly three anchors
//!
//! Subtracting the reference anchor's circle equation from the other two
//! removes the quadratic `x² + y²` term and leaves a 2x2 linear system
//!
//! ```text
//! a1·x + b1·y = c1
//! a2·x + b2·y = c2
//! ```
//!
//! which is solved by elimination once the determinant has been checked.

use crate::algorithms::geometry::circle_difference_row;
use crate::core::{Point2, SnapshotEntry, SINGULARITY_TOLERANCE};
use crate::validation::error::SolveError;

/// Exact three-anchor solver
#[derive(Debug, Clone, Copy)]
pub struct Trilateration {
    /// Determinant magnitude, relative to the coefficient scale, treated as singular
    pub singularity_tolerance: f64,
}

impl Default for Trilateration {
    fn default() -> Self {
        Self {
            singularity_tolerance: SINGULARITY_TOLERANCE,
        }
    }
}

impl Trilateration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Solve for the tag from `reference` and two further anchors.
    ///
    /// Collinear or coincident anchors make the system singular and yield
    /// `DegenerateGeometry`; no division happens in that case.
    pub fn solve(
        &self,
        reference: &SnapshotEntry,
        second: &SnapshotEntry,
        third: &SnapshotEntry,
    ) -> Result<Point2, SolveError> {
        let ([a1, b1], c1) = circle_difference_row(reference, second);
        let ([a2, b2], c2) = circle_difference_row(reference, third);

        let determinant = a1 * b2 - a2 * b1;
        let scale = (a1.abs() + b1.abs()) * (a2.abs() + b2.abs());
        if !determinant.is_finite() || determinant.abs() <= self.singularity_tolerance * scale {
            return Err(SolveError::DegenerateGeometry);
        }

        let x = (c1 * b2 - c2 * b1) / determinant;
        let y = (a1 * c2 - a2 * c1) / determinant;
        Ok(Point2::new(x, y))
    }

    /// Solve from the first three entries of an id-ordered slice
    pub fn solve_entries(&self, entries: &[SnapshotEntry]) -> Result<Point2, SolveError> {
        match entries {
            [reference, second, third, ..] => self.solve(reference, second, third),
            _ => Err(SolveError::InsufficientAnchors {
                available: entries.len(),
                required: 3,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::AnchorId;

    fn entry_for(id: &str, anchor: Point2, tag: Point2) -> SnapshotEntry {
        SnapshotEntry {
            anchor_id: AnchorId::from(id),
            position: anchor,
            distance: anchor.distance_to(&tag),
            sequence: 0,
        }
    }

    #[test]
    fn test_exact_solution() {
        let tag = Point2::new(4.2, 2.7);
        let a = entry_for("ANC3", Point2::new(0.5, 1.4), tag);
        let b = entry_for("ANC4", Point2::new(6.3, 1.7), tag);
        let c = entry_for("ANC5", Point2::new(5.85, 4.05), tag);

        let solved = Trilateration::new().solve(&a, &b, &c).unwrap();
        assert!((solved.x - tag.x).abs() < 1e-6);
        assert!((solved.y - tag.y).abs() < 1e-6);
    }

    #[test]
    fn test_matches_elimination_formula() {
        // hand elimination: x = (c1 - c2·b1/b2) / (a1 - a2·b1/b2), y = (c1 - a1·x) / b1
        let a = SnapshotEntry { anchor_id: AnchorId::from("ANC3"), position: Point2::new(0.5, 1.40), distance: 3.0, sequence: 1 };
        let b = SnapshotEntry { anchor_id: AnchorId::from("ANC4"), position: Point2::new(6.3, 1.7), distance: 2.5, sequence: 1 };
        let c = SnapshotEntry { anchor_id: AnchorId::from("ANC5"), position: Point2::new(5.85, 4.05), distance: 2.0, sequence: 1 };

        let ([a1, b1], c1) = circle_difference_row(&a, &b);
        let ([a2, b2], c2) = circle_difference_row(&a, &c);
        let x_ref = (c1 - c2 * b1 / b2) / (a1 - a2 * b1 / b2);
        let y_ref = (c1 - a1 * x_ref) / b1;

        let solved = Trilateration::new().solve(&a, &b, &c).unwrap();
        assert!((solved.x - x_ref).abs() < 1e-6);
        assert!((solved.y - y_ref).abs() < 1e-6);
        assert!((solved.x - 3.568598).abs() < 1e-4);
        assert!((solved.y - 2.873774).abs() < 1e-4);
    }

    #[test]
    fn test_collinear_is_degenerate() {
        let tag = Point2::new(3.0, 2.0);
        let a = entry_for("A", Point2::new(0.0, 0.0), tag);
        let b = entry_for("B", Point2::new(5.0, 0.0), tag);
        let c = entry_for("C", Point2::new(10.0, 0.0), tag);
        assert_eq!(Trilateration::new().solve(&a, &b, &c), Err(SolveError::DegenerateGeometry));

        // diagonal line, b1 and b2 both non-zero
        let a = entry_for("A", Point2::new(1.0, 1.0), tag);
        let b = entry_for("B", Point2::new(2.0, 2.0), tag);
        let c = entry_for("C", Point2::new(4.0, 4.0), tag);
        assert_eq!(Trilateration::new().solve(&a, &b, &c), Err(SolveError::DegenerateGeometry));
    }

    #[test]
    fn test_coincident_anchors_are_degenerate() {
        let tag = Point2::new(3.0, 2.0);
        let a = entry_for("A", Point2::new(1.0, 1.0), tag);
        let b = entry_for("B", Point2::new(1.0, 1.0), tag);
        let c = entry_for("C", Point2::new(4.0, 0.0), tag);
        assert_eq!(Trilateration::new().solve(&a, &b, &c), Err(SolveError::DegenerateGeometry));
    }

    #[test]
    fn test_solve_entries_needs_three() {
        let tag = Point2::new(3.0, 2.0);
        let entries = vec![
            entry_for("A", Point2::new(0.0, 0.0), tag),
            entry_for("B", Point2::new(5.0, 0.0), tag),
        ];
        assert_eq!(
            Trilateration::new().solve_entries(&entries),
            Err(SolveError::InsufficientAnchors { available: 2, required: 3 })
        );
    }
}
