//! Method selection and bounds validation on top of the two solvers

use crate::algorithms::geometry::{rms_range_residual, validate_in_bounds};
use crate::algorithms::least_squares::LeastSquaresMultilateration;
use crate::algorithms::trilateration::Trilateration;
use crate::core::{
    AnchorId, MapBounds, Point2, PositionEstimate, Snapshot, SolveMethod, MIN_ANCHORS,
};
use crate::validation::error::SolveError;
use serde::Serialize;
use tracing::debug;

/// A validated position together with how it was obtained
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fix {
    pub position: Point2,
    pub method: SolveMethod,
    /// Anchors that entered the solve, reference first
    pub anchors: Vec<AnchorId>,
    /// RMS range residual over the anchors used (m)
    pub residual_rms_m: f64,
}

/// Estimate plus diagnostics for monitoring
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolveReport {
    pub estimate: PositionEstimate,
    pub method: Option<SolveMethod>,
    pub anchors_used: Vec<AnchorId>,
    pub residual_rms_m: Option<f64>,
}

/// Stateless position solver bound to one map
#[derive(Debug, Clone)]
pub struct LaterationSolver {
    bounds: MapBounds,
    trilateration: Trilateration,
    least_squares: LeastSquaresMultilateration,
}

impl LaterationSolver {
    pub fn new(bounds: MapBounds) -> Self {
        Self {
            bounds,
            trilateration: Trilateration::default(),
            least_squares: LeastSquaresMultilateration::default(),
        }
    }

    pub fn with_solvers(
        bounds: MapBounds,
        trilateration: Trilateration,
        least_squares: LeastSquaresMultilateration,
    ) -> Self {
        Self {
            bounds,
            trilateration,
            least_squares,
        }
    }

    pub fn bounds(&self) -> &MapBounds {
        &self.bounds
    }

    /// Exactly three anchors use the closed form, four or more use least squares
    pub fn select_method(anchor_count: usize) -> Result<SolveMethod, SolveError> {
        match anchor_count {
            n if n < MIN_ANCHORS => Err(SolveError::InsufficientAnchors {
                available: n,
                required: MIN_ANCHORS,
            }),
            3 => Ok(SolveMethod::Trilateration),
            _ => Ok(SolveMethod::LeastSquares),
        }
    }

    pub fn solve(&self, snapshot: &Snapshot) -> PositionEstimate {
        self.solve_detailed(snapshot).estimate
    }

    pub fn solve_detailed(&self, snapshot: &Snapshot) -> SolveReport {
        let method = match Self::select_method(snapshot.len()) {
            Ok(method) => method,
            Err(err) => return self.unresolved(err, None),
        };

        match self.solve_with(snapshot, method) {
            Ok(fix) => SolveReport {
                estimate: PositionEstimate::from(fix.position),
                method: Some(fix.method),
                anchors_used: fix.anchors,
                residual_rms_m: Some(fix.residual_rms_m),
            },
            Err(err) => self.unresolved(err, Some(method)),
        }
    }

    /// Solve with a forced method.
    ///
    /// Trilateration takes the three smallest anchor ids; least squares takes
    /// every anchor in the snapshot. A degenerate system is returned as an
    /// error, never retried with the other method.
    pub fn solve_with(&self, snapshot: &Snapshot, method: SolveMethod) -> Result<Fix, SolveError> {
        let entries = snapshot.entries();
        let used = match method {
            SolveMethod::Trilateration => &entries[..entries.len().min(MIN_ANCHORS)],
            SolveMethod::LeastSquares => entries,
        };

        let raw = match method {
            SolveMethod::Trilateration => self.trilateration.solve_entries(used)?,
            SolveMethod::LeastSquares => self.least_squares.solve(used)?,
        };
        let position = validate_in_bounds(raw, &self.bounds)?;

        Ok(Fix {
            position,
            method,
            anchors: used.iter().map(|entry| entry.anchor_id.clone()).collect(),
            residual_rms_m: rms_range_residual(&position, used),
        })
    }

    fn unresolved(&self, err: SolveError, method: Option<SolveMethod>) -> SolveReport {
        debug!(error = %err, ?method, "position unresolved");
        SolveReport {
            estimate: PositionEstimate::from(err.reason()),
            method,
            anchors_used: Vec::new(),
            residual_rms_m: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{SnapshotEntry, UnresolvedReason, LAB_MAP_HEIGHT, LAB_MAP_WIDTH};

    fn lab_solver() -> LaterationSolver {
        LaterationSolver::new(MapBounds::new(LAB_MAP_WIDTH, LAB_MAP_HEIGHT))
    }

    fn snapshot_for(anchors: &[(&str, f64, f64)], tag: Point2) -> Snapshot {
        Snapshot::new(anchors.iter().map(|&(id, x, y)| {
            let position = Point2::new(x, y);
            SnapshotEntry {
                anchor_id: AnchorId::from(id),
                position,
                distance: position.distance_to(&tag),
                sequence: 1,
            }
        }))
    }

    fn snapshot_with_distances(anchors: &[(&str, f64, f64, f64)]) -> Snapshot {
        Snapshot::new(anchors.iter().map(|&(id, x, y, distance)| SnapshotEntry {
            anchor_id: AnchorId::from(id),
            position: Point2::new(x, y),
            distance,
            sequence: 1,
        }))
    }

    const LAB: [(&str, f64, f64); 4] = [
        ("ANC3", 0.5, 1.40),
        ("ANC4", 6.3, 1.7),
        ("ANC5", 5.85, 4.05),
        ("ANC6", 9.9, 3.62),
    ];

    #[test]
    fn test_method_selection() {
        assert!(matches!(
            LaterationSolver::select_method(2),
            Err(SolveError::InsufficientAnchors { available: 2, required: 3 })
        ));
        assert_eq!(LaterationSolver::select_method(3), Ok(SolveMethod::Trilateration));
        assert_eq!(LaterationSolver::select_method(4), Ok(SolveMethod::LeastSquares));
        assert_eq!(LaterationSolver::select_method(12), Ok(SolveMethod::LeastSquares));
    }

    #[test]
    fn test_lab_scenario_three_anchors() {
        let snapshot = snapshot_with_distances(&[
            ("ANC3", 0.5, 1.40, 3.0),
            ("ANC4", 6.3, 1.7, 2.5),
            ("ANC5", 5.85, 4.05, 2.0),
        ]);
        let report = lab_solver().solve_detailed(&snapshot);
        assert_eq!(report.method, Some(SolveMethod::Trilateration));

        let position = report.estimate.position().unwrap();
        // a1=11.6 b1=0.6 c1=43.12 a2=10.7 b2=5.3 c2=53.415 det=55.06
        let x_ref = (43.12 * 5.3 - 53.415 * 0.6) / 55.06;
        let y_ref = (11.6 * 53.415 - 10.7 * 43.12) / 55.06;
        assert!((position.x - x_ref).abs() < 1e-6);
        assert!((position.y - y_ref).abs() < 1e-6);
    }

    #[test]
    fn test_exact_least_squares_on_lab_layout() {
        let tag = Point2::new(7.25, 2.4);
        let report = lab_solver().solve_detailed(&snapshot_for(&LAB, tag));
        assert_eq!(report.method, Some(SolveMethod::LeastSquares));
        assert_eq!(report.anchors_used.len(), 4);

        let position = report.estimate.position().unwrap();
        assert!(position.distance_to(&tag) < 1e-6);
        assert!(report.residual_rms_m.unwrap() < 1e-6);
    }

    #[test]
    fn test_two_anchors_insufficient() {
        let snapshot = snapshot_for(&LAB[..2], Point2::new(3.0, 3.0));
        assert_eq!(
            lab_solver().solve(&snapshot),
            PositionEstimate::Unresolved { reason: UnresolvedReason::InsufficientAnchors }
        );
    }

    #[test]
    fn test_collinear_three_anchors_degenerate() {
        let snapshot = snapshot_for(
            &[("A", 0.0, 0.0), ("B", 5.0, 0.0), ("C", 10.0, 0.0)],
            Point2::new(3.0, 2.0),
        );
        let estimate = lab_solver().solve(&snapshot);
        assert_eq!(estimate.reason(), Some(UnresolvedReason::DegenerateGeometry));
    }

    #[test]
    fn test_collinear_four_anchors_degenerate_without_fallback() {
        // the first three would also be collinear; the point is that least
        // squares reports the failure itself
        let snapshot = snapshot_for(
            &[("A", 0.0, 1.0), ("B", 3.0, 1.0), ("C", 6.0, 1.0), ("D", 9.0, 1.0)],
            Point2::new(3.0, 2.0),
        );
        let report = lab_solver().solve_detailed(&snapshot);
        assert_eq!(report.method, Some(SolveMethod::LeastSquares));
        assert_eq!(report.estimate.reason(), Some(UnresolvedReason::DegenerateGeometry));
    }

    #[test]
    fn test_out_of_bounds() {
        let tag = Point2::new(-1.0, 3.0);
        let snapshot = snapshot_for(&LAB[..3], tag);
        assert_eq!(
            lab_solver().solve(&snapshot),
            PositionEstimate::Unresolved { reason: UnresolvedReason::OutOfBounds }
        );

        let snapshot = snapshot_for(&LAB, tag);
        assert_eq!(
            lab_solver().solve(&snapshot).reason(),
            Some(UnresolvedReason::OutOfBounds)
        );
    }

    #[test]
    fn test_forced_trilateration_uses_smallest_ids() {
        let tag = Point2::new(4.0, 3.0);
        let mut snapshot_anchors = LAB.to_vec();
        snapshot_anchors.reverse();
        let snapshot = snapshot_for(&snapshot_anchors, tag);

        let fix = lab_solver().solve_with(&snapshot, SolveMethod::Trilateration).unwrap();
        let ids: Vec<&str> = fix.anchors.iter().map(AnchorId::as_str).collect();
        assert_eq!(ids, vec!["ANC3", "ANC4", "ANC5"]);
        assert!(fix.position.distance_to(&tag) < 1e-6);
    }

    #[test]
    fn test_forced_least_squares_on_three() {
        let tag = Point2::new(4.0, 3.0);
        let snapshot = snapshot_for(&LAB[..3], tag);
        let fix = lab_solver().solve_with(&snapshot, SolveMethod::LeastSquares).unwrap();
        assert!(fix.position.distance_to(&tag) < 1e-6);
    }

    #[test]
    fn test_noisy_least_squares_beats_trilateration_on_average() {
        // one anchor carries a range bias; averaged over tag positions the
        // all-anchor solve lands closer than the three-anchor subsets that
        // contain the biased anchor
        let anchors = [
            ("A1", 0.5, 0.5),
            ("A2", 11.0, 0.5),
            ("A3", 11.0, 5.3),
            ("A4", 0.5, 5.3),
            ("A5", 5.8, 0.3),
            ("A6", 5.8, 5.5),
        ];
        let tags = [
            Point2::new(3.0, 2.0),
            Point2::new(6.0, 3.0),
            Point2::new(8.5, 1.5),
            Point2::new(2.5, 4.0),
            Point2::new(9.0, 4.5),
        ];
        let solver = LaterationSolver::new(MapBounds::new(1000.0, 1000.0));
        let unbounded = Trilateration::new();

        let mut ls_error = 0.0;
        let mut tri_error = 0.0;
        let mut tri_count = 0.0;
        for tag in tags {
            let mut snapshot_entries = snapshot_for(&anchors, tag).entries().to_vec();
            snapshot_entries[1].distance += 0.3;
            let snapshot = Snapshot::new(snapshot_entries.clone());

            let fix = solver.solve_with(&snapshot, SolveMethod::LeastSquares).unwrap();
            ls_error += fix.position.distance_to(&tag);

            for j in 2..snapshot_entries.len() {
                let solved = unbounded
                    .solve(&snapshot_entries[0], &snapshot_entries[1], &snapshot_entries[j])
                    .unwrap();
                tri_error += solved.distance_to(&tag);
                tri_count += 1.0;
            }
        }

        let ls_mean = ls_error / tags.len() as f64;
        let tri_mean = tri_error / tri_count;
        assert!(ls_mean <= tri_mean, "least squares {ls_mean} vs trilateration {tri_mean}");
    }
}
