//! Delaunay tessellation and its Voronoi dual.
//!
//! [`tessellate`] normalizes the input, runs the Bowyer-Watson kernel and reads
//! the dual off the closed cell complex:
//!
//! - Voronoi vertices are the circumcenters of the finite cells, welded so that
//!   cospherical configurations (which produce several identical circumcenters)
//!   share one vertex.
//! - The Voronoi ridge of a Delaunay edge `(i, j)` is the cyclic sequence of
//!   circumcenters of the cells around that edge. A ghost cell in the ring
//!   contributes [`RidgeVertex::Infinite`]; consecutive repeats collapse.
//!
//! Ridges are keyed by the sorted Delaunay edge and stored in a `BTreeMap`, so
//! iteration order is deterministic.

use std::collections::BTreeMap;

use slotmap::SecondaryMap;

use crate::core::algorithms::bowyer_watson::{BowyerWatson, CellKey, facet_without};
pub use crate::core::algorithms::bowyer_watson::TessellationError;
use crate::core::collections::spatial_hash_grid::PointWelder;
use crate::core::collections::{FastHashSet, RING_CAPACITY, SmallBuffer};
use crate::core::points::PointSet;
use crate::geometry::Point;

/// Circumcenters closer than this (in normalized units) are merged.
pub const VERTEX_WELD_TOLERANCE: f64 = 1e-10;

/// One entry of a Voronoi ridge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RidgeVertex {
    /// Index into [`Tessellation::vertices`].
    Finite(usize),
    /// The ridge extends to infinity.
    Infinite,
}

impl RidgeVertex {
    /// The vertex index, or `None` at infinity.
    #[must_use]
    pub const fn finite(self) -> Option<usize> {
        match self {
            Self::Finite(v) => Some(v),
            Self::Infinite => None,
        }
    }
}

/// A Delaunay tessellation and its Voronoi dual.
///
/// Coordinates are reported as `[f64; 3]` (the third component is `0.0` in 2-D).
#[derive(Clone, Debug, PartialEq)]
pub struct Tessellation {
    dim: usize,
    points: Vec<[f64; 3]>,
    vertices: Vec<[f64; 3]>,
    ridges: BTreeMap<(usize, usize), Vec<RidgeVertex>>,
    simplices: Vec<Vec<usize>>,
}

impl Tessellation {
    /// Dimension of the tessellation (2 or 3).
    #[must_use]
    pub const fn dim(&self) -> usize {
        self.dim
    }

    /// The input points.
    #[must_use]
    pub fn points(&self) -> &[[f64; 3]] {
        &self.points
    }

    /// Number of input points.
    #[must_use]
    pub fn npoints(&self) -> usize {
        self.points.len()
    }

    /// The Voronoi vertices.
    #[must_use]
    pub fn vertices(&self) -> &[[f64; 3]] {
        &self.vertices
    }

    /// Ridges keyed by sorted Delaunay edge.
    #[must_use]
    pub const fn ridges(&self) -> &BTreeMap<(usize, usize), Vec<RidgeVertex>> {
        &self.ridges
    }

    /// The ridge dual to the edge `(a, b)`, in either order.
    #[must_use]
    pub fn ridge(&self, a: usize, b: usize) -> Option<&[RidgeVertex]> {
        self.ridges.get(&(a.min(b), a.max(b))).map(Vec::as_slice)
    }

    /// Sorted point indices of each Delaunay simplex.
    #[must_use]
    pub fn simplices(&self) -> &[Vec<usize>] {
        &self.simplices
    }

    /// Builds the tessellation of `D`-dimensional points.
    ///
    /// # Errors
    ///
    /// Returns a [`TessellationError`] if the kernel rejects the input.
    pub fn from_points<const D: usize>(raw: &[[f64; D]]) -> Result<Self, TessellationError> {
        let frame = Frame::fit(raw);
        let normalized: Vec<Point<D>> = raw.iter().map(|p| frame.normalize(p)).collect();
        let bw = BowyerWatson::triangulate(normalized)?;

        let mut welder = PointWelder::<D>::new(VERTEX_WELD_TOLERANCE);
        let mut vertex_of: SecondaryMap<CellKey, usize> = SecondaryMap::new();
        let mut simplices = Vec::new();
        for (key, cell) in bw.finite_cells() {
            if let Some(sphere) = cell.circumsphere() {
                let (vertex, _) = welder.weld(*sphere.center().coords());
                vertex_of.insert(key, vertex);
                simplices.push(cell.vertices().to_vec());
            }
        }
        let vertices: Vec<[f64; 3]> = welder
            .into_points()
            .iter()
            .map(|c| frame.denormalize(c).to_padded())
            .collect();

        let ridges = collect_ridges(&bw, &vertex_of);
        tracing::debug!(
            dim = D,
            points = raw.len(),
            simplices = simplices.len(),
            vertices = vertices.len(),
            ridges = ridges.len(),
            "tessellation complete"
        );

        Ok(Self {
            dim: D,
            points: raw.iter().map(|&p| Point::new(p).to_padded()).collect(),
            vertices,
            ridges,
            simplices,
        })
    }
}

/// Tessellates a 2-D or 3-D point set.
///
/// # Errors
///
/// Returns a [`TessellationError`] for too few, duplicate or degenerate points.
///
/// # Examples
///
/// ```rust
/// use delaunay_voronoi_dual::core::points::PointSet;
/// use delaunay_voronoi_dual::core::tessellation::{RidgeVertex, tessellate};
///
/// let points = PointSet::from(vec![[0.0, 0.0], [2.0, 0.0], [0.0, 2.0]]);
/// let tess = tessellate(&points).unwrap();
/// assert_eq!(tess.vertices(), &[[1.0, 1.0, 0.0]]);
/// assert_eq!(tess.ridge(0, 1), Some(&[RidgeVertex::Finite(0), RidgeVertex::Infinite][..]));
/// ```
pub fn tessellate(points: &PointSet) -> Result<Tessellation, TessellationError> {
    match points {
        PointSet::Planar(p) => Tessellation::from_points(p),
        PointSet::Spatial(p) => Tessellation::from_points(p),
    }
}

/// Affine map to the unit box around the bounding-box midpoint.
struct Frame<const D: usize> {
    center: [f64; D],
    scale: f64,
}

impl<const D: usize> Frame<D> {
    fn fit(raw: &[[f64; D]]) -> Self {
        let mut lo = [f64::INFINITY; D];
        let mut hi = [f64::NEG_INFINITY; D];
        for p in raw {
            for axis in 0..D {
                lo[axis] = lo[axis].min(p[axis]);
                hi[axis] = hi[axis].max(p[axis]);
            }
        }
        let mut center = [0.0; D];
        let mut scale: f64 = 0.0;
        for axis in 0..D {
            if lo[axis].is_finite() && hi[axis].is_finite() {
                center[axis] = 0.5 * (lo[axis] + hi[axis]);
                scale = scale.max(0.5 * (hi[axis] - lo[axis]));
            }
        }
        if !(scale.is_finite() && scale > 0.0) {
            scale = 1.0;
        }
        Self { center, scale }
    }

    fn normalize(&self, p: &[f64; D]) -> Point<D> {
        Point::new(*p).map(|axis, c| (c - self.center[axis]) / self.scale)
    }

    fn denormalize(&self, p: &[f64; D]) -> Point<D> {
        Point::new(*p).map(|axis, c| c.mul_add(self.scale, self.center[axis]))
    }
}

fn collect_ridges<const D: usize>(
    bw: &BowyerWatson<D>,
    vertex_of: &SecondaryMap<CellKey, usize>,
) -> BTreeMap<(usize, usize), Vec<RidgeVertex>> {
    let mut incident: BTreeMap<(usize, usize), SmallBuffer<CellKey, RING_CAPACITY>> =
        BTreeMap::new();
    for (key, cell) in bw.cells() {
        let finite = cell.finite_vertices();
        for (i, &a) in finite.iter().enumerate() {
            for &b in &finite[i + 1..] {
                incident.entry((a, b)).or_default().push(key);
            }
        }
    }

    let mut ridges = BTreeMap::new();
    for (&(a, b), cells) in &incident {
        // Edges seen only by ghosts do not exist: every edge lies in a finite cell.
        if !cells.iter().any(|&k| vertex_of.contains_key(k)) {
            continue;
        }
        let ring = ring_around_edge(bw, a, b, cells);
        let mapped = ring.iter().map(|&k| {
            vertex_of
                .get(k)
                .map_or(RidgeVertex::Infinite, |&v| RidgeVertex::Finite(v))
        });
        let ridge = collapse_cyclic(mapped);

        let bounded = !ridge.contains(&RidgeVertex::Infinite);
        let distinct: FastHashSet<RidgeVertex> = ridge.iter().copied().collect();
        if bounded && distinct.len() < D {
            tracing::trace!(a, b, "dropping zero-measure ridge");
            continue;
        }
        ridges.insert((a, b), ridge);
    }
    ridges
}

/// Cells around edge `(a, b)` in adjacency order.
fn ring_around_edge<const D: usize>(
    bw: &BowyerWatson<D>,
    a: usize,
    b: usize,
    cells: &[CellKey],
) -> SmallBuffer<CellKey, RING_CAPACITY> {
    let mut ring: SmallBuffer<CellKey, RING_CAPACITY> = SmallBuffer::new();
    let Some(&first) = cells.first() else {
        return ring;
    };
    ring.push(first);
    let mut previous: Option<CellKey> = None;
    let mut current = first;

    while ring.len() < cells.len() {
        let Some(cell) = bw.cell(current) else {
            break;
        };
        let next = cell
            .vertices()
            .iter()
            .enumerate()
            .filter(|&(_, &v)| v != a && v != b)
            .filter_map(|(skip, _)| bw.neighbor_across(current, &facet_without(cell.vertices(), skip)))
            .find(|&n| Some(n) != previous && !ring.contains(&n));
        match next {
            Some(n) => {
                ring.push(n);
                previous = Some(current);
                current = n;
            }
            None => break,
        }
    }

    if ring.len() < cells.len() {
        tracing::debug!(a, b, "open ring around edge; appending remaining cells");
        for &k in cells {
            if !ring.contains(&k) {
                ring.push(k);
            }
        }
    }
    ring
}

/// Drops consecutive repeats, treating the sequence as cyclic.
fn collapse_cyclic(items: impl IntoIterator<Item = RidgeVertex>) -> Vec<RidgeVertex> {
    let mut out: Vec<RidgeVertex> = Vec::new();
    for item in items {
        if out.last() != Some(&item) {
            out.push(item);
        }
    }
    while out.len() > 1 && out.first() == out.last() {
        out.pop();
    }
    out
}

// =============================================================================
// TESTS
// =============================================================================
