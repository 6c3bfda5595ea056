//! Numeric constants and lab defaults

/// Minimum number of usable anchors for a 2D fix
pub const MIN_ANCHORS: usize = 3;

/// Relative tolerance below which the 2x2 elimination determinant is treated as singular
pub const SINGULARITY_TOLERANCE: f64 = 1e-9;

/// Smallest-to-largest singular value ratio below which least squares is rank deficient
pub const RANK_TOLERANCE: f64 = 1e-9;

/// Decimal places used when displaying coordinates
pub const DISPLAY_PRECISION: u8 = 2;

/// Width of the default lab map (m)
pub const LAB_MAP_WIDTH: f64 = 11.55;

/// Height of the default lab map (m)
pub const LAB_MAP_HEIGHT: f64 = 5.85;
