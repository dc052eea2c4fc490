//! Incremental Bowyer-Watson algorithm for Delaunay tessellation.
//!
//! The triangulation is closed with *ghost cells*: every convex hull facet `F` is
//! paired with a cell `F ∪ {∞}` whose extra vertex is [`GHOST`]. With ghosts in
//! place every facet is shared by exactly two cells, so the ring of cells around a
//! Delaunay edge is always a closed cycle and the unbounded Voronoi ridges fall out
//! of the same walk as the bounded ones.
//!
//! # Algorithm Overview
//!
//! 1. **Initialization**: pick `D + 1` affinely independent points greedily (each
//!    new point maximizes the distance to the span of the previous ones) and build
//!    the seed simplex plus its `D + 1` ghost cells.
//! 2. **Incremental insertion**: for each remaining point, find one cell in conflict
//!    (visibility walk, with a linear scan as fallback), grow the conflict region
//!    across shared facets, remove it and re-triangulate its boundary from the new
//!    point.
//! 3. **Ghost repair**: new ghost cells take as reference the apex of the finite
//!    cell across their hull facet.
//!
//! A finite cell conflicts with `p` when `p` is strictly inside its circumsphere. A
//! ghost cell conflicts with `p` when `p` lies strictly beyond its hull facet; if
//! `p` is coplanar with the facet, the ghost conflicts exactly when the finite cell
//! across the facet does.
//!
//! Inputs are expected at roughly unit scale; [`crate::core::tessellation`]
//! normalizes coordinates before calling in here.
//!
//! # References
//!
//! - **Bowyer, A.** "Computing Dirichlet tessellations." *The Computer Journal* 24.2 (1981): 162-166.
//! - **Watson, D.F.** "Computing the n-dimensional Delaunay tessellation with application to
//!   Voronoi polytopes." *The Computer Journal* 24.2 (1981): 167-172.
//! - **Shewchuk, J.R.** "Lecture Notes on Delaunay Mesh Generation." UC Berkeley, 2012.
//!   Chapter 3 (ghost triangles).

use slotmap::new_key_type;
use thiserror::Error;

use crate::core::collections::spatial_hash_grid::PointWelder;
use crate::core::collections::{
    FastHashMap, FastHashSet, SIMPLEX_CAPACITY, SimplexVertices, SmallBuffer, StorageMap,
};
use crate::geometry::{
    Circumsphere, InSphere, Orientation, Point, PredicateError, simplex_orientation,
};

/// Vertex id standing in for the point at infinity in ghost cells.
pub const GHOST: usize = usize::MAX;

/// Points closer than this (after normalization) are treated as duplicates.
pub const DUPLICATE_TOLERANCE: f64 = 1e-10;

/// Minimum relative distance of a seed point from the span of the previous seeds.
const INDEPENDENCE_TOLERANCE: f64 = 1e-9;

new_key_type! {
    /// Key type for accessing cells in the storage map.
    pub struct CellKey;
}

/// Errors that can occur while building the Delaunay tessellation.
#[derive(Clone, Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum TessellationError {
    /// Not enough points to span a `D`-simplex.
    #[error("A {dimension}-D tessellation needs at least {required} points, got {actual}")]
    InsufficientPoints {
        /// Minimum number of points (`D + 1`).
        required: usize,
        /// Number of points supplied.
        actual: usize,
        /// Dimension of the tessellation.
        dimension: usize,
    },
    /// All points lie on a common lower-dimensional affine subspace.
    #[error("Input points are degenerate: no {required} affinely independent points")]
    DegenerateInput {
        /// Number of independent points required (`D + 1`).
        required: usize,
    },
    /// A point has a NaN or infinite coordinate.
    #[error("Point {index} has a non-finite coordinate")]
    NonFinitePoint {
        /// Index of the offending point.
        index: usize,
    },
    /// Two input points coincide.
    #[error("Point {index} duplicates point {existing}")]
    DuplicatePoint {
        /// Index of the later point.
        index: usize,
        /// Index of the point it coincides with.
        existing: usize,
    },
    /// No cell was found in conflict with a point.
    #[error("Point {index} could not be inserted: no conflicting cell found")]
    InsertionFailed {
        /// Index of the point.
        index: usize,
    },
    /// Re-triangulating a cavity produced a flat cell.
    #[error("Degenerate cell while inserting point {index}: {source}")]
    DegenerateCell {
        /// Index of the point being inserted.
        index: usize,
        /// Underlying predicate failure.
        #[source]
        source: PredicateError,
    },
}

/// What kind of cell a [`Cell`] is.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CellKind<const D: usize> {
    /// A real simplex with its circumsphere.
    Finite(Circumsphere<D>),
    /// A ghost cell; `inner` is a vertex on the interior side of the hull facet.
    Ghost {
        /// Apex of the finite cell across the hull facet.
        inner: usize,
    },
}

/// A cell of the tessellation: `D + 1` sorted vertex ids.
///
/// Ghost cells end with [`GHOST`], which sorts last.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell<const D: usize> {
    vertices: SimplexVertices,
    kind: CellKind<D>,
}

impl<const D: usize> Cell<D> {
    /// Sorted vertex ids.
    #[must_use]
    pub fn vertices(&self) -> &[usize] {
        &self.vertices
    }

    /// Cell kind.
    #[must_use]
    pub const fn kind(&self) -> &CellKind<D> {
        &self.kind
    }

    /// Returns `true` for ghost cells.
    #[must_use]
    pub const fn is_ghost(&self) -> bool {
        matches!(self.kind, CellKind::Ghost { .. })
    }

    /// Circumsphere of a finite cell.
    #[must_use]
    pub const fn circumsphere(&self) -> Option<&Circumsphere<D>> {
        match &self.kind {
            CellKind::Finite(sphere) => Some(sphere),
            CellKind::Ghost { .. } => None,
        }
    }

    /// The finite vertices (all of them for finite cells, the hull facet for ghosts).
    #[must_use]
    pub fn finite_vertices(&self) -> &[usize] {
        if self.is_ghost() {
            &self.vertices[..self.vertices.len() - 1]
        } else {
            &self.vertices
        }
    }
}

/// Counters collected during construction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InsertionStatistics {
    /// Points inserted (seed simplex included).
    pub vertices_processed: usize,
    /// Cells created, ghosts included.
    pub cells_created: usize,
    /// Cells removed, ghosts included.
    pub cells_removed: usize,
    /// Insertions where the walk failed and a linear scan found the conflict.
    pub locate_fallbacks: usize,
}

type FacetCells = SmallBuffer<CellKey, 2>;

/// A Delaunay tessellation closed with ghost cells.
///
/// # Examples
///
/// ```rust
/// use delaunay_voronoi_dual::core::algorithms::bowyer_watson::BowyerWatson;
/// use delaunay_voronoi_dual::geometry::Point;
///
/// let points = vec![
///     Point::new([0.0, 0.0]),
///     Point::new([1.0, 0.0]),
///     Point::new([0.0, 1.0]),
///     Point::new([1.0, 1.1]),
/// ];
/// let bw = BowyerWatson::triangulate(points).unwrap();
/// assert_eq!(bw.finite_cells().count(), 2);
/// assert!(bw.is_delaunay());
/// ```
#[derive(Clone, Debug)]
pub struct BowyerWatson<const D: usize> {
    points: Vec<Point<D>>,
    cells: StorageMap<CellKey, Cell<D>>,
    facets: FastHashMap<SimplexVertices, FacetCells>,
    last_created: Option<CellKey>,
    statistics: InsertionStatistics,
}

impl<const D: usize> BowyerWatson<D> {
    /// Tessellates `points`, inserting them in index order after the seed simplex.
    ///
    /// # Errors
    ///
    /// - [`TessellationError::InsufficientPoints`] for fewer than `D + 1` points
    /// - [`TessellationError::NonFinitePoint`] / [`TessellationError::DuplicatePoint`]
    ///   for unusable input
    /// - [`TessellationError::DegenerateInput`] if the points span less than `D` dimensions
    /// - [`TessellationError::InsertionFailed`] / [`TessellationError::DegenerateCell`]
    ///   if numerical trouble prevents an insertion
    pub fn triangulate(points: Vec<Point<D>>) -> Result<Self, TessellationError> {
        if points.len() < D + 1 {
            return Err(TessellationError::InsufficientPoints {
                required: D + 1,
                actual: points.len(),
                dimension: D,
            });
        }
        if let Some(index) = points.iter().position(|p| !p.is_finite()) {
            return Err(TessellationError::NonFinitePoint { index });
        }

        let mut welder = PointWelder::<D>::new(DUPLICATE_TOLERANCE);
        for (index, p) in points.iter().enumerate() {
            let (existing, inserted) = welder.weld(*p.coords());
            if !inserted {
                return Err(TessellationError::DuplicatePoint { index, existing });
            }
        }

        let seed = seed_simplex(&points)?;
        let mut bw = Self {
            points,
            cells: StorageMap::with_key(),
            facets: FastHashMap::default(),
            last_created: None,
            statistics: InsertionStatistics::default(),
        };
        bw.insert_seed(&seed)?;

        for index in 0..bw.points.len() {
            if !seed.contains(&index) {
                bw.insert(index)?;
            }
        }

        tracing::debug!(
            points = bw.points.len(),
            cells = bw.cells.len(),
            finite_cells = bw.finite_cells().count(),
            fallbacks = bw.statistics.locate_fallbacks,
            "Bowyer-Watson tessellation complete"
        );
        Ok(bw)
    }

    /// The input points.
    #[must_use]
    pub fn points(&self) -> &[Point<D>] {
        &self.points
    }

    /// Construction counters.
    #[must_use]
    pub const fn statistics(&self) -> &InsertionStatistics {
        &self.statistics
    }

    /// Looks up a cell.
    #[must_use]
    pub fn cell(&self, key: CellKey) -> Option<&Cell<D>> {
        self.cells.get(key)
    }

    /// All cells, ghosts included.
    pub fn cells(&self) -> impl Iterator<Item = (CellKey, &Cell<D>)> {
        self.cells.iter()
    }

    /// Finite cells only.
    pub fn finite_cells(&self) -> impl Iterator<Item = (CellKey, &Cell<D>)> {
        self.cells.iter().filter(|(_, cell)| !cell.is_ghost())
    }

    /// The cell sharing the sorted `facet` with `key`.
    #[must_use]
    pub fn neighbor_across(&self, key: CellKey, facet: &[usize]) -> Option<CellKey> {
        self.facets
            .get(facet)?
            .iter()
            .copied()
            .find(|&other| other != key)
    }

    /// Checks the empty-circumsphere property of every finite cell by brute force.
    #[must_use]
    pub fn is_delaunay(&self) -> bool {
        self.finite_cells().all(|(_, cell)| {
            cell.circumsphere().is_some_and(|sphere| {
                self.points
                    .iter()
                    .enumerate()
                    .filter(|(index, _)| !cell.vertices.contains(index))
                    .all(|(_, p)| sphere.classify(p) != InSphere::INSIDE)
            })
        })
    }

    /// Every facet is shared by exactly two cells.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.facets.values().all(|cells| cells.len() == 2)
    }

    // =========================================================================
    // Construction
    // =========================================================================

    fn insert_seed(&mut self, seed: &SimplexVertices) -> Result<(), TessellationError> {
        let mut vertices = seed.clone();
        vertices.sort_unstable();
        let last = vertices.last().copied().unwrap_or(0);
        let sphere = self
            .circumsphere_of(&vertices)
            .map_err(|source| TessellationError::DegenerateCell {
                index: last,
                source,
            })?;
        self.add_cell(vertices.clone(), CellKind::Finite(sphere));

        for (skip, &inner) in vertices.iter().enumerate() {
            let mut ghost = facet_without(&vertices, skip);
            ghost.push(GHOST);
            self.add_cell(ghost, CellKind::Ghost { inner });
        }
        self.statistics.vertices_processed += vertices.len();
        Ok(())
    }

    fn insert(&mut self, index: usize) -> Result<(), TessellationError> {
        let p = self.points[index];
        let start = self.locate_conflict(&p).ok_or(TessellationError::InsertionFailed { index })?;
        let mut cavity = self.grow_cavity(start, &p);
        let boundary = self.cavity_boundary(&mut cavity, &p);

        for key in cavity {
            self.remove_cell(key);
        }

        let mut ghosts: Vec<CellKey> = Vec::new();
        for facet in boundary {
            let mut vertices = facet;
            vertices.push(index);
            vertices.sort_unstable();
            if vertices.last() == Some(&GHOST) {
                ghosts.push(self.add_cell(vertices, CellKind::Ghost { inner: GHOST }));
            } else {
                let sphere = self
                    .circumsphere_of(&vertices)
                    .map_err(|source| TessellationError::DegenerateCell { index, source })?;
                let key = self.add_cell(vertices, CellKind::Finite(sphere));
                self.last_created = Some(key);
            }
        }

        for key in ghosts {
            let inner = self.inner_vertex(key).ok_or(TessellationError::InsertionFailed { index })?;
            if let Some(cell) = self.cells.get_mut(key) {
                cell.kind = CellKind::Ghost { inner };
            }
        }

        self.statistics.vertices_processed += 1;
        tracing::trace!(index, cells = self.cells.len(), "inserted point");
        Ok(())
    }

    /// Walks toward `p` from the last created cell; scans every cell if that fails.
    fn locate_conflict(&mut self, p: &Point<D>) -> Option<CellKey> {
        if let Some(found) = self.walk_to(p)
            && self.in_conflict(found, p)
        {
            return Some(found);
        }
        self.statistics.locate_fallbacks += 1;
        self.cells
            .keys()
            .find(|&key| self.in_conflict(key, p))
    }

    /// Visibility walk: step across any facet that separates the cell from `p`.
    fn walk_to(&self, p: &Point<D>) -> Option<CellKey> {
        let mut current = self
            .last_created
            .filter(|&key| self.cells.contains_key(key))
            .or_else(|| self.finite_cells().map(|(key, _)| key).next())?;
        let mut previous: Option<CellKey> = None;

        for _ in 0..=self.cells.len() {
            let cell = self.cells.get(current)?;
            if cell.is_ghost() {
                return Some(current);
            }
            let mut next = None;
            for skip in 0..cell.vertices.len() {
                let facet = facet_without(&cell.vertices, skip);
                let apex = self.points[cell.vertices[skip]];
                if self
                    .orientation_with(&facet, p)
                    .is_opposite(self.orientation_with(&facet, &apex))
                    && let Some(neighbor) = self.neighbor_across(current, &facet)
                    && Some(neighbor) != previous
                {
                    next = Some(neighbor);
                    break;
                }
            }
            match next {
                Some(neighbor) => {
                    previous = Some(current);
                    current = neighbor;
                }
                None => return Some(current),
            }
        }
        None
    }

    /// Breadth-first growth of the conflict region over shared facets.
    fn grow_cavity(&self, start: CellKey, p: &Point<D>) -> FastHashSet<CellKey> {
        let mut cavity: FastHashSet<CellKey> = FastHashSet::default();
        let mut rejected: FastHashSet<CellKey> = FastHashSet::default();
        cavity.insert(start);
        let mut stack = vec![start];

        while let Some(key) = stack.pop() {
            let Some(cell) = self.cells.get(key) else {
                continue;
            };
            for skip in 0..cell.vertices.len() {
                let facet = facet_without(&cell.vertices, skip);
                if let Some(neighbor) = self.neighbor_across(key, &facet)
                    && !cavity.contains(&neighbor)
                    && !rejected.contains(&neighbor)
                {
                    if self.in_conflict(neighbor, p) {
                        cavity.insert(neighbor);
                        stack.push(neighbor);
                    } else {
                        rejected.insert(neighbor);
                    }
                }
            }
        }
        cavity
    }

    /// Boundary facets of the cavity. A finite facet that `p` does not see from
    /// the cavity side would give a flat or inverted cell, so the cell behind it
    /// joins the cavity and the boundary is recomputed.
    fn cavity_boundary(
        &self,
        cavity: &mut FastHashSet<CellKey>,
        p: &Point<D>,
    ) -> Vec<SimplexVertices> {
        loop {
            let mut boundary = Vec::new();
            let mut absorb: Vec<CellKey> = Vec::new();
            for &key in cavity.iter() {
                let Some(cell) = self.cells.get(key) else {
                    continue;
                };
                for (skip, &apex) in cell.vertices.iter().enumerate() {
                    let facet = facet_without(&cell.vertices, skip);
                    let neighbor = self.neighbor_across(key, &facet);
                    if neighbor.is_some_and(|n| cavity.contains(&n)) {
                        continue;
                    }
                    if !facet.contains(&GHOST)
                        && !self.sees_facet(cell, apex, &facet, p)
                        && let Some(neighbor) = neighbor
                    {
                        absorb.push(neighbor);
                    }
                    boundary.push(facet);
                }
            }
            if absorb.is_empty() {
                return boundary;
            }
            tracing::debug!(absorbed = absorb.len(), "cavity absorbs cells behind unseen facets");
            cavity.extend(absorb);
        }
    }

    /// `p` lies strictly on the same side of `facet` as the rest of `cell`.
    fn sees_facet(&self, cell: &Cell<D>, apex: usize, facet: &[usize], p: &Point<D>) -> bool {
        let side = self.orientation_with(facet, p);
        if side == Orientation::DEGENERATE {
            return false;
        }
        match (apex, cell.kind) {
            (GHOST, CellKind::Ghost { inner }) => self
                .points
                .get(inner)
                .is_some_and(|q| side.is_opposite(self.orientation_with(facet, q))),
            (GHOST, CellKind::Finite(_)) => true,
            _ => self
                .points
                .get(apex)
                .is_some_and(|q| side == self.orientation_with(facet, q)),
        }
    }

    fn in_conflict(&self, key: CellKey, p: &Point<D>) -> bool {
        let Some(cell) = self.cells.get(key) else {
            return false;
        };
        match cell.kind {
            CellKind::Finite(sphere) => sphere.classify(p) == InSphere::INSIDE,
            CellKind::Ghost { inner } => {
                let hull = cell.finite_vertices();
                let Some(inner_point) = self.points.get(inner) else {
                    return false;
                };
                let side = self.orientation_with(hull, p);
                if side.is_opposite(self.orientation_with(hull, inner_point)) {
                    return true;
                }
                side == Orientation::DEGENERATE
                    && self
                        .neighbor_across(key, hull)
                        .and_then(|n| self.cells.get(n))
                        .and_then(Cell::circumsphere)
                        .is_some_and(|sphere| sphere.classify(p) == InSphere::INSIDE)
            }
        }
    }

    /// Apex of the finite cell across the hull facet of ghost `key`.
    fn inner_vertex(&self, key: CellKey) -> Option<usize> {
        let hull = self.cells.get(key)?.finite_vertices();
        let neighbor = self.cells.get(self.neighbor_across(key, hull)?)?;
        neighbor
            .vertices
            .iter()
            .copied()
            .find(|v| *v != GHOST && !hull.contains(v))
    }

    fn orientation_with(&self, facet: &[usize], apex: &Point<D>) -> Orientation {
        let mut simplex: SmallBuffer<Point<D>, SIMPLEX_CAPACITY> =
            facet.iter().map(|&v| self.points[v]).collect();
        simplex.push(*apex);
        simplex_orientation(&simplex).unwrap_or(Orientation::DEGENERATE)
    }

    fn circumsphere_of(&self, vertices: &[usize]) -> Result<Circumsphere<D>, PredicateError> {
        let simplex: SmallBuffer<Point<D>, SIMPLEX_CAPACITY> =
            vertices.iter().map(|&v| self.points[v]).collect();
        Circumsphere::new(&simplex)
    }

    fn add_cell(&mut self, vertices: SimplexVertices, kind: CellKind<D>) -> CellKey {
        let facets: SmallBuffer<SimplexVertices, SIMPLEX_CAPACITY> = (0..vertices.len())
            .map(|skip| facet_without(&vertices, skip))
            .collect();
        let key = self.cells.insert(Cell { vertices, kind });
        for facet in facets {
            self.facets.entry(facet).or_default().push(key);
        }
        self.statistics.cells_created += 1;
        key
    }

    fn remove_cell(&mut self, key: CellKey) {
        let Some(cell) = self.cells.remove(key) else {
            return;
        };
        for skip in 0..cell.vertices.len() {
            let facet = facet_without(&cell.vertices, skip);
            if let Some(cells) = self.facets.get_mut(&facet) {
                cells.retain(|k| *k != key);
                if cells.is_empty() {
                    self.facets.remove(&facet);
                }
            }
        }
        self.statistics.cells_removed += 1;
    }
}

/// Sorted vertex list minus the entry at `skip`.
pub(crate) fn facet_without(vertices: &[usize], skip: usize) -> SimplexVertices {
    vertices
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != skip)
        .map(|(_, &v)| v)
        .collect()
}

/// Greedy choice of `D + 1` well-spread, affinely independent points.
fn seed_simplex<const D: usize>(points: &[Point<D>]) -> Result<SimplexVertices, TessellationError> {
    let degenerate = TessellationError::DegenerateInput { required: D + 1 };
    let origin = points[0];
    let scale = points
        .iter()
        .map(|p| p.squared_distance(&origin))
        .fold(0.0, f64::max)
        .sqrt();
    if scale == 0.0 {
        return Err(degenerate);
    }

    let mut seed = SimplexVertices::new();
    seed.push(0);
    let mut basis: SmallBuffer<[f64; D], SIMPLEX_CAPACITY> = SmallBuffer::new();

    for _ in 0..D {
        let mut best: Option<(usize, f64, [f64; D])> = None;
        for (index, p) in points.iter().enumerate() {
            if seed.contains(&index) {
                continue;
            }
            let mut residual = *p - origin;
            for axis in &basis {
                let dot: f64 = residual.iter().zip(axis).map(|(a, b)| a * b).sum();
                for (r, a) in residual.iter_mut().zip(axis) {
                    *r -= dot * a;
                }
            }
            let length = residual.iter().map(|r| r * r).sum::<f64>().sqrt();
            if best.is_none_or(|(_, best_length, _)| length > best_length) {
                best = Some((index, length, residual));
            }
        }
        match best {
            Some((index, length, residual)) if length > INDEPENDENCE_TOLERANCE * scale => {
                basis.push(residual.map(|r| r / length));
                seed.push(index);
            }
            _ => return Err(degenerate),
        }
    }
    Ok(seed)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn diamond() -> Vec<Point<2>> {
        vec![
            Point::new([0.0, 0.0]),
            Point::new([1.0, 0.0]),
            Point::new([0.0, 1.0]),
            Point::new([-1.0, 0.0]),
            Point::new([0.0, -1.0]),
        ]
    }

    fn octahedron() -> Vec<Point<3>> {
        vec![
            Point::new([0.0, 0.0, 0.0]),
            Point::new([1.0, 0.0, 0.0]),
            Point::new([0.0, 1.0, 0.0]),
            Point::new([0.0, 0.0, 1.0]),
            Point::new([-1.0, 0.0, 0.0]),
            Point::new([0.0, -1.0, 0.0]),
            Point::new([0.0, 0.0, -1.0]),
        ]
    }

    fn sorted_finite_cells<const D: usize>(bw: &BowyerWatson<D>) -> Vec<Vec<usize>> {
        let mut cells: Vec<Vec<usize>> = bw
            .finite_cells()
            .map(|(_, cell)| cell.vertices().to_vec())
            .collect();
        cells.sort();
        cells
    }

    #[test]
    fn test_diamond_has_four_triangles_around_center() {
        let bw = BowyerWatson::triangulate(diamond()).unwrap();
        assert_eq!(
            sorted_finite_cells(&bw),
            vec![vec![0, 1, 2], vec![0, 1, 4], vec![0, 2, 3], vec![0, 3, 4]]
        );
        assert!(bw.is_delaunay());
        assert!(bw.is_closed());
        // One ghost per hull edge.
        assert_eq!(bw.cells().filter(|(_, c)| c.is_ghost()).count(), 4);
    }

    #[test]
    fn test_octahedron_has_eight_tetrahedra() {
        let bw = BowyerWatson::triangulate(octahedron()).unwrap();
        let cells = sorted_finite_cells(&bw);
        assert_eq!(cells.len(), 8);
        assert!(cells.iter().all(|c| c[0] == 0));
        assert!(bw.is_delaunay());
        assert!(bw.is_closed());
        assert_eq!(bw.cells().filter(|(_, c)| c.is_ghost()).count(), 8);
    }

    #[test]
    fn test_ghost_inner_vertex_is_opposite_apex() {
        let bw = BowyerWatson::triangulate(diamond()).unwrap();
        for (_, cell) in bw.cells().filter(|(_, c)| c.is_ghost()) {
            let CellKind::Ghost { inner } = *cell.kind() else {
                unreachable!()
            };
            assert_eq!(inner, 0, "hull {:?}", cell.finite_vertices());
        }
    }

    #[test]
    fn test_collinear_hull_extension_stays_closed() {
        // Points 3 and 4 extend the hull along the line through 0 and 1.
        let points = vec![
            Point::new([0.0, 0.0]),
            Point::new([1.0, 0.0]),
            Point::new([0.5, 1.0]),
            Point::new([2.0, 0.0]),
            Point::new([-1.0, 0.0]),
        ];
        let bw = BowyerWatson::triangulate(points).unwrap();
        assert!(bw.is_closed());
        assert!(bw.is_delaunay());
        // 2n - h - 2 with all five points on the hull boundary.
        assert_eq!(bw.finite_cells().count(), 3);
    }

    #[test]
    fn test_cocircular_grid_is_triangulated() {
        let mut points = Vec::new();
        for i in 0..4 {
            for j in 0..4 {
                points.push(Point::new([f64::from(i), f64::from(j)]));
            }
        }
        let bw = BowyerWatson::triangulate(points).unwrap();
        assert!(bw.is_closed());
        assert!(bw.is_delaunay());
        // 2n - h - 2 triangles for n = 16, h = 12 hull points.
        assert_eq!(bw.finite_cells().count(), 18);
    }

    #[test]
    fn test_statistics_track_construction() {
        let bw = BowyerWatson::triangulate(diamond()).unwrap();
        let stats = bw.statistics();
        assert_eq!(stats.vertices_processed, 5);
        assert_eq!(stats.cells_created - stats.cells_removed, bw.cells().count());
    }

    #[test]
    fn test_rejects_insufficient_points() {
        let err = BowyerWatson::triangulate(vec![Point::new([0.0, 0.0]), Point::new([1.0, 0.0])])
            .unwrap_err();
        assert_eq!(
            err,
            TessellationError::InsufficientPoints {
                required: 3,
                actual: 2,
                dimension: 2
            }
        );
    }

    #[test]
    fn test_rejects_collinear_input() {
        let points = (0..5).map(|i| Point::new([f64::from(i), 0.0])).collect();
        assert_eq!(
            BowyerWatson::<2>::triangulate(points).unwrap_err(),
            TessellationError::DegenerateInput { required: 3 }
        );
    }

    #[test]
    fn test_rejects_duplicates_and_non_finite() {
        let mut points = diamond();
        points.push(Point::new([1.0, 0.0]));
        assert_eq!(
            BowyerWatson::triangulate(points).unwrap_err(),
            TessellationError::DuplicatePoint {
                index: 5,
                existing: 1
            }
        );

        let mut points = diamond();
        points[2] = Point::new([f64::NAN, 0.0]);
        assert_eq!(
            BowyerWatson::triangulate(points).unwrap_err(),
            TessellationError::NonFinitePoint { index: 2 }
        );
    }

    #[test]
    fn test_seed_simplex_prefers_spread_points() {
        let points = vec![
            Point::new([0.0, 0.0]),
            Point::new([0.1, 0.0]),
            Point::new([5.0, 0.0]),
            Point::new([0.0, 3.0]),
        ];
        assert_eq!(seed_simplex(&points).unwrap().as_slice(), &[0, 2, 3]);
    }

    #[test]
    fn test_facet_without_keeps_order() {
        assert_eq!(facet_without(&[1, 4, 7, 9], 2).as_slice(), &[1, 4, 9]);
        assert_eq!(facet_without(&[1, 4, GHOST], 0).as_slice(), &[4, GHOST]);
    }
}
