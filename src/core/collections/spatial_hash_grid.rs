//! Spatial hash-grid acceleration structures.
//!
//! The grid answers "which previously stored points lie within one cell of this
//! coordinate" in expected constant time. It backs two tolerance-based lookups:
//!
//! - duplicate detection for input points before insertion
//! - welding of coincident circumcenters into a single Voronoi vertex
//!
//! Both go through [`PointWelder`], which falls back to a linear scan when a
//! coordinate cannot be keyed (non-finite, or too large for unit cell resolution).

use super::{FastHashMap, SmallBuffer};

/// Maximum dimension supported by the hash-grid neighborhood walk.
///
/// The neighbor search enumerates the 3^D Moore neighborhood.
const MAX_HASH_GRID_DIMENSION: usize = 3;

const BUCKET_INLINE_CAPACITY: usize = 8;

/// Largest cell coordinate that still has unit resolution as an `f64`.
const MAX_EXACT_CELL_COORD: f64 = 9_007_199_254_740_992.0; // 2^53

/// Hashable grid-cell key for a D-dimensional grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct GridKey<const D: usize>([i64; D]);

/// A simple spatial hash grid mapping grid cells to stored indices.
///
/// The grid uses a fixed `cell_size` and indexes entries by the floored cell
/// coordinates `floor(coord / cell_size)`.
#[derive(Clone, Debug)]
pub(crate) struct HashGridIndex<const D: usize> {
    cell_size: f64,
    usable: bool,
    cells: FastHashMap<GridKey<D>, SmallBuffer<usize, BUCKET_INLINE_CAPACITY>>,
}

impl<const D: usize> HashGridIndex<D> {
    /// Create a new grid index with the given cell size.
    pub(crate) fn new(cell_size: f64) -> Self {
        let usable = D <= MAX_HASH_GRID_DIMENSION && cell_size.is_finite() && cell_size > 0.0;
        Self {
            cell_size,
            usable,
            cells: FastHashMap::default(),
        }
    }

    const fn disable(&mut self) {
        self.usable = false;
    }

    /// Insert an entry into the appropriate grid cell.
    ///
    /// If the coordinate cannot be keyed, the index is disabled so callers can
    /// fall back to linear scans.
    pub(crate) fn insert(&mut self, index: usize, coords: &[f64; D]) {
        if !self.usable {
            return;
        }

        let Some(key) = self.key_for_coords(coords) else {
            self.disable();
            return;
        };

        self.cells.entry(key).or_default().push(index);
    }

    /// Visit all candidate entries in the 3^D neighborhood around `coords`.
    ///
    /// Returns `true` if the index was used for the query (even if it yielded zero
    /// candidates). Returns `false` if the index was unusable for this query.
    pub(crate) fn for_each_candidate<F>(&self, coords: &[f64; D], mut f: F) -> bool
    where
        F: FnMut(usize) -> bool,
    {
        if !self.usable {
            return false;
        }

        let Some(base_key) = self.key_for_coords(coords) else {
            return false;
        };

        let base = base_key.0;
        let mut current = base;

        Self::visit_neighbor_cells(0, &base, &mut current, &mut |neighbor| {
            if let Some(bucket) = self.cells.get(&neighbor) {
                for &index in bucket {
                    if !f(index) {
                        return false;
                    }
                }
            }
            true
        });

        true
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "cell coordinates are range-checked against 2^53 before the cast"
    )]
    fn key_for_coords(&self, coords: &[f64; D]) -> Option<GridKey<D>> {
        if !self.usable {
            return None;
        }

        let mut key = [0_i64; D];
        for (slot, coord) in key.iter_mut().zip(coords) {
            if !coord.is_finite() {
                return None;
            }
            let cell_coord = (coord / self.cell_size).floor();
            if !cell_coord.is_finite() || cell_coord.abs() >= MAX_EXACT_CELL_COORD {
                return None;
            }
            *slot = cell_coord as i64;
        }

        Some(GridKey(key))
    }

    fn visit_neighbor_cells<F>(axis: usize, base: &[i64; D], current: &mut [i64; D], f: &mut F) -> bool
    where
        F: FnMut(GridKey<D>) -> bool,
    {
        if axis == D {
            return f(GridKey(*current));
        }

        for offset in [-1_i64, 0, 1] {
            current[axis] = base[axis] + offset;
            if !Self::visit_neighbor_cells(axis + 1, base, current, f) {
                return false;
            }
        }

        true
    }
}

/// Tolerance-based point deduplication on top of [`HashGridIndex`].
///
/// Every stored point gets a dense index in insertion order. Looking up a point
/// that lies within `tolerance` (Euclidean) of a stored point returns the stored
/// index instead of creating a new one.
#[derive(Clone, Debug)]
pub(crate) struct PointWelder<const D: usize> {
    tolerance: f64,
    grid: HashGridIndex<D>,
    points: Vec<[f64; D]>,
}

impl<const D: usize> PointWelder<D> {
    pub(crate) fn new(tolerance: f64) -> Self {
        // Cells wider than the tolerance keep every match inside the 3^D neighborhood.
        Self {
            tolerance,
            grid: HashGridIndex::new(tolerance * 4.0),
            points: Vec::new(),
        }
    }

    /// Returns the index of a stored point within tolerance of `coords`, if any.
    pub(crate) fn find(&self, coords: &[f64; D]) -> Option<usize> {
        let tol_sq = self.tolerance * self.tolerance;
        let mut found = None;
        let used = self.grid.for_each_candidate(coords, |index| {
            if squared_distance(&self.points[index], coords) <= tol_sq {
                found = Some(found.map_or(index, |prev: usize| prev.min(index)));
            }
            true
        });
        if used {
            return found;
        }
        self.points
            .iter()
            .position(|stored| squared_distance(stored, coords) <= tol_sq)
    }

    /// Returns `(index, inserted)`: the matching stored index, or a fresh one.
    pub(crate) fn weld(&mut self, coords: [f64; D]) -> (usize, bool) {
        if let Some(existing) = self.find(&coords) {
            return (existing, false);
        }
        let index = self.points.len();
        self.points.push(coords);
        self.grid.insert(index, &coords);
        (index, true)
    }

    pub(crate) fn into_points(self) -> Vec<[f64; D]> {
        self.points
    }
}

fn squared_distance<const D: usize>(a: &[f64; D], b: &[f64; D]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::collections::FastHashSet;

    #[test]
    fn test_hash_grid_index_keying_and_candidate_lookup_2d() {
        let mut grid: HashGridIndex<2> = HashGridIndex::new(1.0);

        grid.insert(1, &[0.2, 0.2]);
        grid.insert(2, &[-0.2, 0.2]);

        let mut found: FastHashSet<usize> = FastHashSet::default();
        let used = grid.for_each_candidate(&[0.9, 0.1], |index| {
            found.insert(index);
            true
        });

        assert!(used);
        assert!(found.contains(&1));
        assert!(found.contains(&2));
    }

    #[test]
    fn test_hash_grid_index_candidate_visit_counts_3d() {
        let mut grid: HashGridIndex<3> = HashGridIndex::new(1.0);
        let offsets = [-1.0, 0.0, 1.0];
        let mut next = 0;
        for a in offsets {
            for b in offsets {
                for c in offsets {
                    grid.insert(next, &[a + 0.25, b + 0.25, c + 0.25]);
                    next += 1;
                }
            }
        }

        let mut found: FastHashSet<usize> = FastHashSet::default();
        let used = grid.for_each_candidate(&[0.25, 0.25, 0.25], |index| {
            found.insert(index);
            true
        });

        assert!(used);
        assert_eq!(found.len(), 27);
    }

    #[test]
    fn test_hash_grid_index_disables_on_unkeyable_coordinates() {
        let mut grid: HashGridIndex<2> = HashGridIndex::new(1e-10);
        assert!(grid.for_each_candidate(&[0.0, 0.0], |_| true));

        grid.insert(0, &[1e300, 0.0]);
        assert!(!grid.for_each_candidate(&[0.0, 0.0], |_| true));
    }

    #[test]
    fn test_point_welder_merges_within_tolerance() {
        let mut welder: PointWelder<2> = PointWelder::new(1e-10);

        assert_eq!(welder.weld([0.5, 0.5]), (0, true));
        assert_eq!(welder.weld([1.0, 0.5]), (1, true));
        assert_eq!(welder.weld([0.5 + 1e-12, 0.5 - 1e-12]), (0, false));
        assert_eq!(welder.weld([0.5 + 1e-6, 0.5]), (2, true));

        let points = welder.into_points();
        assert_eq!(points.len(), 3);
        assert_eq!(points[0], [0.5, 0.5]);
    }

    #[test]
    fn test_point_welder_linear_fallback_for_huge_coordinates() {
        let mut welder: PointWelder<3> = PointWelder::new(1e-10);

        assert_eq!(welder.weld([0.0, 0.0, 0.0]), (0, true));
        assert_eq!(welder.weld([1e30, 0.0, 0.0]), (1, true));
        // Grid disabled by the huge coordinate; lookups still work.
        assert_eq!(welder.weld([1e30, 0.0, 0.0]), (1, false));
        assert_eq!(welder.weld([0.0, 0.0, 0.0]), (0, false));
    }
}
