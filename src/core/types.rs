//! Core data types for the positioning engine

use crate::validation::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

/// Stable identifier of a physical anchor, assigned outside the engine
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnchorId(String);

impl AnchorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AnchorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AnchorId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for AnchorId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for AnchorId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Map-relative 2D point in meters
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: &Point2) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Valid output rectangle `[0, width] x [0, height]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapBounds {
    /// Map width (m)
    pub width: f64,
    /// Map height (m)
    pub height: f64,
}

impl MapBounds {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Both dimensions positive and finite
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Inclusive containment test; NaN coordinates are never contained
    pub fn contains(&self, point: &Point2) -> bool {
        (0.0..=self.width).contains(&point.x) && (0.0..=self.height).contains(&point.y)
    }
}

/// One range report as delivered by the transport
#[derive(Debug, Clone, PartialEq)]
pub struct RangeReport {
    pub anchor_id: AnchorId,
    /// Measured anchor-to-tag distance (m)
    pub distance: f64,
    /// Sender-side message counter
    pub sequence: i64,
    pub active: bool,
}

impl RangeReport {
    pub fn new(anchor_id: impl Into<AnchorId>, distance: f64, sequence: i64, active: bool) -> Self {
        Self {
            anchor_id: anchor_id.into(),
            distance,
            sequence,
            active,
        }
    }
}

/// Latest state held for one anchor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnchorReading {
    pub distance: f64,
    pub sequence: i64,
    pub active: bool,
}

impl From<&RangeReport> for AnchorReading {
    fn from(report: &RangeReport) -> Self {
        Self {
            distance: report.distance,
            sequence: report.sequence,
            active: report.active,
        }
    }
}

/// How the anchor table treats a report older than the one it holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequencePolicy {
    /// Every report overwrites the stored reading, whatever its sequence
    #[default]
    AcceptAll,
    /// Reports with a sequence lower than the stored one are rejected
    RejectOlder,
}

/// Fixed anchor positions, loaded once at startup
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnchorLayout {
    positions: BTreeMap<AnchorId, Point2>,
}

impl AnchorLayout {
    /// Build a layout, rejecting duplicate ids and non-finite coordinates
    pub fn from_positions<I, K>(positions: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, Point2)>,
        K: Into<AnchorId>,
    {
        let mut layout = BTreeMap::new();
        for (id, position) in positions {
            let id = id.into();
            if !position.is_finite() {
                return Err(ConfigError::InvalidAnchorPosition { anchor_id: id });
            }
            if layout.contains_key(&id) {
                return Err(ConfigError::DuplicateAnchor(id));
            }
            layout.insert(id, position);
        }
        Ok(Self { positions: layout })
    }

    pub fn position(&self, anchor_id: &str) -> Option<Point2> {
        self.positions.get(anchor_id).copied()
    }

    pub fn contains(&self, anchor_id: &str) -> bool {
        self.positions.contains_key(anchor_id)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AnchorId, &Point2)> {
        self.positions.iter()
    }
}

/// A usable anchor paired with its configured position
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotEntry {
    pub anchor_id: AnchorId,
    pub position: Point2,
    pub distance: f64,
    pub sequence: i64,
}

impl SnapshotEntry {
    fn is_usable(&self) -> bool {
        self.position.is_finite() && self.distance.is_finite() && self.distance >= 0.0
    }
}

/// Immutable, id-ordered view of the anchors usable for one solve
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    entries: Vec<SnapshotEntry>,
}

impl Snapshot {
    /// Unusable entries are dropped; for a repeated id the last entry wins
    pub fn new(entries: impl IntoIterator<Item = SnapshotEntry>) -> Self {
        let by_id: BTreeMap<AnchorId, SnapshotEntry> = entries
            .into_iter()
            .filter(SnapshotEntry::is_usable)
            .map(|entry| (entry.anchor_id.clone(), entry))
            .collect();
        Self {
            entries: by_id.into_values().collect(),
        }
    }

    pub fn entries(&self) -> &[SnapshotEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn anchor_ids(&self) -> Vec<AnchorId> {
        self.entries.iter().map(|entry| entry.anchor_id.clone()).collect()
    }
}

/// Why a solve produced no position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedReason {
    InsufficientAnchors,
    DegenerateGeometry,
    OutOfBounds,
}

impl fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnresolvedReason::InsufficientAnchors => write!(f, "insufficient anchors"),
            UnresolvedReason::DegenerateGeometry => write!(f, "degenerate geometry"),
            UnresolvedReason::OutOfBounds => write!(f, "out of bounds"),
        }
    }
}

/// Result of one solve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PositionEstimate {
    Resolved { x: f64, y: f64 },
    Unresolved { reason: UnresolvedReason },
}

impl PositionEstimate {
    pub fn is_resolved(&self) -> bool {
        matches!(self, PositionEstimate::Resolved { .. })
    }

    pub fn position(&self) -> Option<Point2> {
        match *self {
            PositionEstimate::Resolved { x, y } => Some(Point2::new(x, y)),
            PositionEstimate::Unresolved { .. } => None,
        }
    }

    pub fn reason(&self) -> Option<UnresolvedReason> {
        match *self {
            PositionEstimate::Resolved { .. } => None,
            PositionEstimate::Unresolved { reason } => Some(reason),
        }
    }
}

impl From<Point2> for PositionEstimate {
    fn from(point: Point2) -> Self {
        PositionEstimate::Resolved { x: point.x, y: point.y }
    }
}

impl From<UnresolvedReason> for PositionEstimate {
    fn from(reason: UnresolvedReason) -> Self {
        PositionEstimate::Unresolved { reason }
    }
}

/// Solve method selected for a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveMethod {
    /// Closed-form solve from exactly three anchors
    Trilateration,
    /// Overdetermined linear least squares over every usable anchor
    LeastSquares,
}

impl SolveMethod {
    /// Short display label
    pub fn label(&self) -> &'static str {
        match self {
            SolveMethod::Trilateration => "Tri",
            SolveMethod::LeastSquares => "Quad",
        }
    }
}
