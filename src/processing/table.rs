//! Anchor table: latest reading per anchor under streaming updates
//!
//! One `RwLock` guards the whole table. `apply` holds the write lock for the
//! full batch, so `snapshot` and `observed_ids` see either the state before a
//! batch or after it, never part of one. Readers do not block each other.

use crate::core::{
    AnchorId, AnchorLayout, AnchorReading, RangeReport, SequencePolicy, Snapshot, SnapshotEntry,
};
use crate::validation::data::{is_valid_distance, ReadingValidator};
use crate::validation::error::InvalidReading;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, warn};

/// A report the table refused
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedReading {
    pub anchor_id: AnchorId,
    pub reason: InvalidReading,
}

/// Outcome of applying one batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplyReport {
    /// Number of reports written to the table
    pub accepted: usize,
    pub rejected: Vec<RejectedReading>,
}

impl ApplyReport {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

#[derive(Debug, Default, Serialize)]
struct TableState {
    readings: BTreeMap<AnchorId, AnchorReading>,
    // superset of `readings` keys
    observed: BTreeSet<AnchorId>,
    // stored readings superseded by an invalid report; subset of `readings` keys
    invalidated: BTreeSet<AnchorId>,
}

/// Latest known state per anchor, paired with the fixed anchor layout
#[derive(Debug)]
pub struct AnchorTable {
    layout: AnchorLayout,
    validator: ReadingValidator,
    state: RwLock<TableState>,
}

impl AnchorTable {
    /// Table with the default policy: every report overwrites the stored one
    pub fn new(layout: AnchorLayout) -> Self {
        Self::with_policy(layout, SequencePolicy::default())
    }

    pub fn with_policy(layout: AnchorLayout, policy: SequencePolicy) -> Self {
        Self {
            layout,
            validator: ReadingValidator::new(policy),
            state: RwLock::new(TableState::default()),
        }
    }

    pub fn layout(&self) -> &AnchorLayout {
        &self.layout
    }

    pub fn policy(&self) -> SequencePolicy {
        self.validator.policy()
    }

    /// Insert or overwrite the reading for every valid report in `batch`.
    ///
    /// Invalid reports are skipped and listed in the returned report; they
    /// never abort the batch. Later reports for the same anchor win. An invalid
    /// report that is not older than the stored reading marks it invalidated,
    /// removing the anchor from snapshots until a valid report arrives.
    pub fn apply<I>(&self, batch: I) -> ApplyReport
    where
        I: IntoIterator<Item = RangeReport>,
    {
        let mut report = ApplyReport::default();
        let mut state = self.write_state();

        for reading in batch {
            let stored = state.readings.get(&reading.anchor_id);
            let supersedes = stored.map_or(false, |stored| {
                self.policy() == SequencePolicy::AcceptAll || reading.sequence >= stored.sequence
            });
            match self.validator.validate(&reading, stored) {
                Ok(()) => {
                    state.observed.insert(reading.anchor_id.clone());
                    state.invalidated.remove(&reading.anchor_id);
                    state
                        .readings
                        .insert(reading.anchor_id.clone(), AnchorReading::from(&reading));
                    report.accepted += 1;
                }
                Err(reason) => {
                    warn!(anchor = %reading.anchor_id, %reason, "rejected range report");
                    if supersedes {
                        state.invalidated.insert(reading.anchor_id.clone());
                    }
                    report.rejected.push(RejectedReading {
                        anchor_id: reading.anchor_id,
                        reason,
                    });
                }
            }
        }

        debug!(
            accepted = report.accepted,
            rejected = report.rejected.len(),
            anchors = state.readings.len(),
            invalidated = state.invalidated.len(),
            "applied batch"
        );
        report
    }

    /// Active anchors with a configured position and a current, valid distance
    pub fn snapshot(&self) -> Snapshot {
        let state = self.read_state();
        Snapshot::new(state.readings.iter().filter_map(|(anchor_id, reading)| {
            if !reading.active
                || !is_valid_distance(reading.distance)
                || state.invalidated.contains(anchor_id)
            {
                return None;
            }
            let position = self.layout.position(anchor_id.as_str())?;
            Some(SnapshotEntry {
                anchor_id: anchor_id.clone(),
                position,
                distance: reading.distance,
                sequence: reading.sequence,
            })
        }))
    }

    /// Every id ever accepted, including inactive and unpositioned anchors
    pub fn observed_ids(&self) -> BTreeSet<AnchorId> {
        self.read_state().observed.clone()
    }

    pub fn reading(&self, anchor_id: &str) -> Option<AnchorReading> {
        self.read_state().readings.get(anchor_id).copied()
    }

    /// Whether the stored reading was superseded by an invalid report
    pub fn is_invalidated(&self, anchor_id: &str) -> bool {
        self.read_state().invalidated.contains(anchor_id)
    }

    pub fn len(&self) -> usize {
        self.read_state().readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_state().readings.is_empty()
    }

    /// Current readings as JSON, for monitoring output
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&*self.read_state())
    }

    // State stays consistent between reports, so a poisoned lock is still usable.
    fn read_state(&self) -> RwLockReadGuard<'_, TableState> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, TableState> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
