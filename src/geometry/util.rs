//! Geometric utility functions.
//!
//! Coordinate rounding shared by fusion and the network container, plus the base
//! point generators in [`point_generation`].

pub mod point_generation;

pub use point_generation::*;

/// Number of decimal places network coordinates are rounded to.
pub const COORDINATE_DECIMALS: i32 = 10;

/// Rounds `value` to `decimals` decimal places, ties to even.
///
/// Negative zero is normalized to `0.0` so rounded coordinates compare and hash
/// consistently.
///
/// # Examples
///
/// ```rust
/// use delaunay_voronoi_dual::geometry::util::round_to_decimals;
///
/// assert_eq!(round_to_decimals(0.123_456_789_012_3, 10), 0.123_456_789_0);
/// assert_eq!(round_to_decimals(-1e-14, 10).to_bits(), 0.0f64.to_bits());
/// assert_eq!(round_to_decimals(2.5, 0), 2.0);
/// ```
#[must_use]
pub fn round_to_decimals(value: f64, decimals: i32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(decimals);
    let scaled = value * factor;
    if !scaled.is_finite() {
        return value;
    }
    let rounded = scaled.round_ties_even() / factor;
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Rounds every component of a 3-D coordinate to [`COORDINATE_DECIMALS`].
#[must_use]
pub fn round_coords(coords: [f64; 3]) -> [f64; 3] {
    coords.map(|c| round_to_decimals(c, COORDINATE_DECIMALS))
}
