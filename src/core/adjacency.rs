//! Adjacency construction and on-demand neighbor indices.
//!
//! Two structures live here:
//!
//! - [`AdjacencyBuilder`]: an append-only buffer of undirected pairs. Fusion pushes
//!   every candidate throat, duplicates included, and [`AdjacencyBuilder::finish`]
//!   canonicalizes them with a single sort + dedup pass.
//! - [`AdjacencyIndex`]: an immutable compressed-sparse-row (CSR) neighbor index
//!   built from a finished throat list. It is built on demand for a query batch and
//!   never cached inside the network.

use crate::core::edge::EdgeKey;
use thiserror::Error;

/// Errors that can occur while building adjacency.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum AdjacencyError {
    /// A pair connects a pore to itself.
    #[error("Self-loop on pore {pore} is not a valid throat")]
    SelfLoop {
        /// The pore on both ends.
        pore: usize,
    },
    /// A pair references a pore outside `0..num_nodes`.
    #[error("Throat endpoint {pore} is out of range for {num_nodes} pores")]
    EndpointOutOfRange {
        /// Offending endpoint.
        pore: usize,
        /// Number of pores.
        num_nodes: usize,
    },
}

/// Append-only buffer of undirected pore pairs.
///
/// # Examples
///
/// ```rust
/// use delaunay_voronoi_dual::core::adjacency::AdjacencyBuilder;
/// use delaunay_voronoi_dual::core::edge::EdgeKey;
///
/// let mut builder = AdjacencyBuilder::new(4);
/// builder.push(2, 0).unwrap();
/// builder.push(0, 2).unwrap();
/// builder.push(1, 3).unwrap();
/// assert!(builder.push(3, 3).is_err());
///
/// assert_eq!(builder.finish(), vec![EdgeKey::new(0, 2), EdgeKey::new(1, 3)]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct AdjacencyBuilder {
    num_nodes: usize,
    pairs: Vec<EdgeKey>,
}

impl AdjacencyBuilder {
    /// An empty builder over pores `0..num_nodes`.
    #[must_use]
    pub const fn new(num_nodes: usize) -> Self {
        Self {
            num_nodes,
            pairs: Vec::new(),
        }
    }

    /// An empty builder with room for `capacity` pairs.
    #[must_use]
    pub fn with_capacity(num_nodes: usize, capacity: usize) -> Self {
        Self {
            num_nodes,
            pairs: Vec::with_capacity(capacity),
        }
    }

    /// Appends the undirected pair `(a, b)`. Duplicates are fine.
    ///
    /// # Errors
    ///
    /// Returns [`AdjacencyError::SelfLoop`] if `a == b` and
    /// [`AdjacencyError::EndpointOutOfRange`] if either endpoint is not a pore.
    pub fn push(&mut self, a: usize, b: usize) -> Result<(), AdjacencyError> {
        let num_nodes = self.num_nodes;
        if let Some(pore) = [a, b].into_iter().find(|&p| p >= num_nodes) {
            return Err(AdjacencyError::EndpointOutOfRange { pore, num_nodes });
        }
        if a == b {
            return Err(AdjacencyError::SelfLoop { pore: a });
        }
        self.pairs.push(EdgeKey::new(a, b));
        Ok(())
    }

    /// Number of pairs pushed so far (duplicates included).
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns `true` if nothing has been pushed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Sorts and deduplicates the buffer into a canonical throat list.
    #[must_use]
    pub fn finish(mut self) -> Vec<EdgeKey> {
        let pushed = self.pairs.len();
        self.pairs.sort_unstable();
        self.pairs.dedup();
        tracing::debug!(
            pushed,
            unique = self.pairs.len(),
            "deduplicated adjacency pairs"
        );
        self.pairs
    }
}

/// Immutable CSR neighbor index over a throat list.
///
/// Neighbor lists are sorted ascending. The throat ids stored alongside each
/// neighbor refer to positions in the throat list the index was built from.
///
/// # Examples
///
/// ```rust
/// use delaunay_voronoi_dual::core::adjacency::AdjacencyIndex;
/// use delaunay_voronoi_dual::core::edge::EdgeKey;
///
/// let throats = [EdgeKey::new(0, 1), EdgeKey::new(1, 2), EdgeKey::new(0, 2)];
/// let index = AdjacencyIndex::from_edges(4, &throats).unwrap();
/// assert_eq!(index.neighbors(0), &[1, 2]);
/// assert_eq!(index.incident_throats(0), &[0, 2]);
/// assert_eq!(index.degree(3), 0);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AdjacencyIndex {
    offsets: Vec<usize>,
    neighbors: Vec<usize>,
    throats: Vec<usize>,
}

impl AdjacencyIndex {
    /// Builds the index over every throat in `edges`.
    ///
    /// # Errors
    ///
    /// Returns [`AdjacencyError::EndpointOutOfRange`] if a throat references a pore
    /// `>= num_nodes`.
    pub fn from_edges(num_nodes: usize, edges: &[EdgeKey]) -> Result<Self, AdjacencyError> {
        Self::from_edges_where(num_nodes, edges, |_| true)
    }

    /// Builds the index over the throats `t` for which `include(t)` holds.
    ///
    /// # Errors
    ///
    /// Returns [`AdjacencyError::EndpointOutOfRange`] if an included throat
    /// references a pore `>= num_nodes`.
    pub fn from_edges_where<F>(
        num_nodes: usize,
        edges: &[EdgeKey],
        mut include: F,
    ) -> Result<Self, AdjacencyError>
    where
        F: FnMut(usize) -> bool,
    {
        let mut degree = vec![0_usize; num_nodes];
        let mut selected: Vec<usize> = Vec::with_capacity(edges.len());
        for (t, edge) in edges.iter().enumerate() {
            if !include(t) {
                continue;
            }
            let (a, b) = edge.endpoints();
            if let Some(pore) = [a, b].into_iter().find(|&p| p >= num_nodes) {
                return Err(AdjacencyError::EndpointOutOfRange { pore, num_nodes });
            }
            degree[a] += 1;
            degree[b] += 1;
            selected.push(t);
        }

        let mut offsets = Vec::with_capacity(num_nodes + 1);
        offsets.push(0);
        for d in &degree {
            let last = offsets.last().copied().unwrap_or(0);
            offsets.push(last + d);
        }

        let total = offsets.last().copied().unwrap_or(0);
        let mut entries: Vec<(usize, usize)> = vec![(0, 0); total];
        let mut cursor = offsets.clone();
        for &t in &selected {
            let (a, b) = edges[t].endpoints();
            entries[cursor[a]] = (b, t);
            cursor[a] += 1;
            entries[cursor[b]] = (a, t);
            cursor[b] += 1;
        }
        for p in 0..num_nodes {
            entries[offsets[p]..offsets[p + 1]].sort_unstable();
        }

        let (neighbors, throats) = entries.into_iter().unzip();
        Ok(Self {
            offsets,
            neighbors,
            throats,
        })
    }

    /// Number of pores covered by the index.
    #[must_use]
    pub fn num_nodes(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    fn range(&self, pore: usize) -> std::ops::Range<usize> {
        match (self.offsets.get(pore), self.offsets.get(pore + 1)) {
            (Some(&start), Some(&end)) => start..end,
            _ => 0..0,
        }
    }

    /// Sorted neighbors of `pore` (empty for unknown pores).
    #[must_use]
    pub fn neighbors(&self, pore: usize) -> &[usize] {
        &self.neighbors[self.range(pore)]
    }

    /// Throat ids incident to `pore`, aligned with [`Self::neighbors`].
    #[must_use]
    pub fn incident_throats(&self, pore: usize) -> &[usize] {
        &self.throats[self.range(pore)]
    }

    /// Number of incident throats.
    #[must_use]
    pub fn degree(&self, pore: usize) -> usize {
        self.range(pore).len()
    }

    /// Sorted intersection of the neighbor lists of `a` and `b`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use delaunay_voronoi_dual::core::adjacency::AdjacencyIndex;
    /// use delaunay_voronoi_dual::core::edge::EdgeKey;
    ///
    /// let throats = [(0, 2), (0, 3), (1, 3), (1, 4), (0, 4)].map(EdgeKey::from);
    /// let index = AdjacencyIndex::from_edges(5, &throats).unwrap();
    /// assert_eq!(index.common_neighbors(0, 1), vec![3, 4]);
    /// ```
    #[must_use]
    pub fn common_neighbors(&self, a: usize, b: usize) -> Vec<usize> {
        let (xs, ys) = (self.neighbors(a), self.neighbors(b));
        let (mut i, mut j) = (0, 0);
        let mut out = Vec::new();
        while i < xs.len() && j < ys.len() {
            match xs[i].cmp(&ys[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    out.push(xs[i]);
                    i += 1;
                    j += 1;
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_rejects_out_of_range_before_self_loop() {
        let mut builder = AdjacencyBuilder::new(2);
        assert_eq!(
            builder.push(5, 5),
            Err(AdjacencyError::EndpointOutOfRange {
                pore: 5,
                num_nodes: 2
            })
        );
        assert_eq!(builder.push(1, 1), Err(AdjacencyError::SelfLoop { pore: 1 }));
        assert!(builder.is_empty());
    }

    #[test]
    fn builder_finish_is_idempotent_over_duplicates() {
        let mut once = AdjacencyBuilder::with_capacity(6, 8);
        let mut twice = AdjacencyBuilder::new(6);
        for (a, b) in [(0, 1), (4, 2), (5, 0), (1, 0)] {
            once.push(a, b).unwrap();
            twice.push(a, b).unwrap();
            twice.push(b, a).unwrap();
        }
        assert_eq!(once.len(), 4);
        assert_eq!(twice.len(), 8);
        let once = once.finish();
        assert_eq!(once.len(), 3);
        assert_eq!(once, twice.finish());
    }

    #[test]
    fn index_neighbors_sorted_with_aligned_throats() {
        let throats = [(3, 0), (0, 1), (2, 0)].map(EdgeKey::from);
        let index = AdjacencyIndex::from_edges(4, &throats).unwrap();
        assert_eq!(index.num_nodes(), 4);
        assert_eq!(index.neighbors(0), &[1, 2, 3]);
        assert_eq!(index.incident_throats(0), &[1, 2, 0]);
        assert_eq!(index.neighbors(3), &[0]);
        assert!(index.neighbors(99).is_empty());
    }

    #[test]
    fn index_filtered_build_skips_excluded_throats() {
        let throats = [(0, 1), (1, 2), (2, 3)].map(EdgeKey::from);
        let index = AdjacencyIndex::from_edges_where(4, &throats, |t| t != 1).unwrap();
        assert_eq!(index.neighbors(1), &[0]);
        assert_eq!(index.neighbors(2), &[3]);
        assert_eq!(index.incident_throats(2), &[2]);
    }

    #[test]
    fn index_rejects_out_of_range_endpoints() {
        let throats = [EdgeKey::new(0, 7)];
        assert_eq!(
            AdjacencyIndex::from_edges(3, &throats),
            Err(AdjacencyError::EndpointOutOfRange {
                pore: 7,
                num_nodes: 3
            })
        );
    }
}
