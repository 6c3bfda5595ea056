//! Positioning engine: one anchor table, one solver, many consumers
//!
//! The transport thread calls [`PositioningEngine::ingest`] for every payload;
//! any thread may call [`PositioningEngine::estimate`]. Each estimate is
//! published to registered consumers.

use crate::algorithms::solver::{LaterationSolver, SolveReport};
use crate::api::callback::{CallbackHandle, ConsumerRegistry, PositionCallback};
use crate::core::{PositionEstimate, RangeReport, SolveMethod, UnresolvedReason, MIN_ANCHORS};
use crate::processing::parser::BatchParser;
use crate::processing::table::{AnchorTable, ApplyReport};
use crate::utils::config::EngineConfig;
use crate::validation::error::{ConfigError, DecodeError, MalformedEntry};
use std::sync::mpsc::Receiver;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

/// Outcome of one ingested payload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestReport {
    pub applied: ApplyReport,
    /// Entries the decoder could not read
    pub malformed: Vec<MalformedEntry>,
}

/// Side-by-side estimates from both methods on one snapshot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MethodComparison {
    /// Three smallest anchor ids
    pub trilateration: PositionEstimate,
    /// All anchors; needs at least four to differ from trilateration
    pub least_squares: PositionEstimate,
}

pub struct PositioningEngine {
    table: AnchorTable,
    solver: LaterationSolver,
    parser: BatchParser,
    consumers: Mutex<ConsumerRegistry>,
}

impl PositioningEngine {
    pub fn new(config: &EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let layout = config.anchor_layout()?;
        info!(
            anchors = layout.len(),
            width = config.map.width,
            height = config.map.height,
            policy = ?config.sequence_policy,
            "positioning engine configured"
        );

        let mut parser = BatchParser::new();
        parser.set_strict_validation(config.strict_payloads);

        Ok(Self::from_parts(
            AnchorTable::with_policy(layout, config.sequence_policy),
            LaterationSolver::new(config.map),
            parser,
        ))
    }

    pub fn from_parts(table: AnchorTable, solver: LaterationSolver, parser: BatchParser) -> Self {
        Self {
            table,
            solver,
            parser,
            consumers: Mutex::new(ConsumerRegistry::new()),
        }
    }

    pub fn table(&self) -> &AnchorTable {
        &self.table
    }

    pub fn solver(&self) -> &LaterationSolver {
        &self.solver
    }

    /// Decode a gateway payload and apply it as one batch
    pub fn ingest(&self, payload: &str) -> Result<IngestReport, DecodeError> {
        let decoded = self.parser.parse(payload)?;
        let applied = self.table.apply(decoded.reports);
        Ok(IngestReport {
            applied,
            malformed: decoded.malformed,
        })
    }

    pub fn apply<I>(&self, batch: I) -> ApplyReport
    where
        I: IntoIterator<Item = RangeReport>,
    {
        self.table.apply(batch)
    }

    /// Solve the current snapshot and publish the result
    pub fn estimate(&self) -> PositionEstimate {
        self.estimate_detailed().estimate
    }

    pub fn estimate_detailed(&self) -> SolveReport {
        let snapshot = self.table.snapshot();
        let report = self.solver.solve_detailed(&snapshot);
        debug!(estimate = ?report.estimate, method = ?report.method, "estimate computed");
        self.publish(&report.estimate);
        report
    }

    // Callbacks run with the registry unlocked so they may call back into the engine.
    fn publish(&self, estimate: &PositionEstimate) {
        let callbacks = self.consumers().callbacks();
        for callback in callbacks {
            callback(estimate);
        }
        self.consumers().notify_subscribers(estimate);
    }

    /// Run both methods on the same snapshot without publishing
    pub fn compare(&self) -> MethodComparison {
        let snapshot = self.table.snapshot();
        let insufficient = PositionEstimate::from(UnresolvedReason::InsufficientAnchors);

        let trilateration = self
            .solver
            .solve_with(&snapshot, SolveMethod::Trilateration)
            .map(|fix| PositionEstimate::from(fix.position))
            .unwrap_or_else(|err| PositionEstimate::from(err.reason()));

        let least_squares = if snapshot.len() > MIN_ANCHORS {
            self.solver
                .solve_with(&snapshot, SolveMethod::LeastSquares)
                .map(|fix| PositionEstimate::from(fix.position))
                .unwrap_or_else(|err| PositionEstimate::from(err.reason()))
        } else {
            insufficient
        };

        MethodComparison {
            trilateration,
            least_squares,
        }
    }

    pub fn register_consumer(&self, callback: PositionCallback) -> CallbackHandle {
        self.consumers().register(callback)
    }

    pub fn unregister_consumer(&self, handle: CallbackHandle) -> bool {
        self.consumers().unregister(handle)
    }

    pub fn subscribe(&self) -> Receiver<PositionEstimate> {
        self.consumers().subscribe()
    }

    fn consumers(&self) -> MutexGuard<'_, ConsumerRegistry> {
        self.consumers.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
