//! Host graph container: pore coordinates, throat connections and labels.
//!
//! A [`Network`] stores pores as `[f64; 3]` coordinates and throats as canonical
//! [`EdgeKey`]s into the pore array. All structural edits go through
//! [`Network::trim_pores`], [`Network::trim_throats`] and [`Network::extend`], which
//! keep the coordinate array, the throat list and every label array consistent.
//!
//! Neighbor queries build an [`AdjacencyIndex`] on demand; nothing is cached, so a
//! `&Network` can be shared freely between threads.

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::core::adjacency::{AdjacencyError, AdjacencyIndex};
use crate::core::collections::FastHashSet;
use crate::core::edge::EdgeKey;
use crate::core::labels::{LabelError, LabelRegistry, PoreLabel, ThroatLabel};

/// Errors raised by network construction, queries and edits.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum NetworkError {
    /// A pore index is not in `0..num_pores`.
    #[error("Pore index {index} is out of range for {count} pores")]
    PoreOutOfRange {
        /// Offending index.
        index: usize,
        /// Current pore count.
        count: usize,
    },
    /// A throat index is not in `0..num_throats`.
    #[error("Throat index {index} is out of range for {count} throats")]
    ThroatOutOfRange {
        /// Offending index.
        index: usize,
        /// Current throat count.
        count: usize,
    },
    /// The same undirected throat appears twice.
    #[error("Throat {index} duplicates pores ({v0}, {v1})")]
    DuplicateThroat {
        /// Position of the second occurrence.
        index: usize,
        /// Smaller endpoint.
        v0: usize,
        /// Larger endpoint.
        v1: usize,
    },
    /// A throat's endpoints are not stored smaller-first.
    #[error("Throat {index} stores pores ({v0}, {v1}) in reverse order")]
    NonCanonicalThroat {
        /// Throat position.
        index: usize,
        /// Stored first endpoint.
        v0: usize,
        /// Stored second endpoint.
        v1: usize,
    },
    /// Throats are not in canonical sorted order.
    #[error("Throat list is not sorted at index {index}")]
    UnsortedThroats {
        /// First out-of-order position.
        index: usize,
    },
    /// Adjacency construction failed.
    #[error(transparent)]
    Adjacency(#[from] AdjacencyError),
    /// A label array is inconsistent.
    #[error(transparent)]
    Label(#[from] LabelError),
}

/// How [`Network::find_neighbor_pores`] and [`Network::find_neighbor_throats`]
/// combine the neighborhoods of several input pores.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NeighborMode {
    /// Union.
    ///
    /// - pores: every neighbor of at least one input pore
    /// - throats: every throat touching at least one input pore
    #[default]
    Or,
    /// Shared.
    ///
    /// - pores: neighbors of two or more input pores
    /// - throats: throats with both endpoints in the input
    Xnor,
    /// Exclusive.
    ///
    /// - pores: neighbors of exactly one input pore
    /// - throats: throats with exactly one endpoint in the input
    Xor,
}

/// Pore/throat graph with typed labels.
///
/// # Examples
///
/// ```rust
/// use delaunay_voronoi_dual::core::edge::EdgeKey;
/// use delaunay_voronoi_dual::core::network::{NeighborMode, Network};
///
/// let coords = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0], [3.0, 0.0, 0.0]];
/// let conns = vec![EdgeKey::new(0, 1), EdgeKey::new(1, 2), EdgeKey::new(2, 3)];
/// let mut net = Network::new(coords, conns).unwrap();
///
/// assert_eq!(net.find_neighbor_pores(&[1], NeighborMode::Or, false), vec![0, 2]);
/// assert_eq!(net.find_neighbor_throats(&[1, 2], NeighborMode::Xnor), vec![1]);
///
/// let (pores, throats) = net.trim_pores(&[0]).unwrap();
/// assert_eq!((pores, throats), (1, 1));
/// assert_eq!(net.conns(), &[EdgeKey::new(0, 1), EdgeKey::new(1, 2)]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Network {
    coords: Vec<[f64; 3]>,
    conns: Vec<EdgeKey>,
    labels: LabelRegistry,
}

/// Serialized form of a [`Network`], validated before it becomes one.
#[derive(Deserialize)]
struct NetworkFields {
    coords: Vec<[f64; 3]>,
    conns: Vec<EdgeKey>,
    labels: LabelRegistry,
}

/// Rejects documents that fail [`Network::check_integrity`].
impl<'de> Deserialize<'de> for Network {
    fn deserialize<De>(deserializer: De) -> Result<Self, De::Error>
    where
        De: Deserializer<'de>,
    {
        let NetworkFields {
            coords,
            conns,
            labels,
        } = NetworkFields::deserialize(deserializer)?;
        let network = Self {
            coords,
            conns,
            labels,
        };
        network
            .check_integrity()
            .map_err(<De::Error as serde::de::Error>::custom)?;
        Ok(network)
    }
}

impl Network {
    /// Builds a network and validates it with [`Self::check_integrity`].
    ///
    /// # Errors
    ///
    /// Returns any error reported by [`Self::check_integrity`].
    pub fn new(coords: Vec<[f64; 3]>, conns: Vec<EdgeKey>) -> Result<Self, NetworkError> {
        let labels = LabelRegistry::new(coords.len(), conns.len());
        let network = Self {
            coords,
            conns,
            labels,
        };
        network.check_integrity()?;
        Ok(network)
    }

    /// Number of pores.
    #[must_use]
    pub fn num_pores(&self) -> usize {
        self.coords.len()
    }

    /// Number of throats.
    #[must_use]
    pub fn num_throats(&self) -> usize {
        self.conns.len()
    }

    /// Pore coordinates.
    #[must_use]
    pub fn coords(&self) -> &[[f64; 3]] {
        &self.coords
    }

    /// Throat connections, sorted and canonical.
    #[must_use]
    pub fn conns(&self) -> &[EdgeKey] {
        &self.conns
    }

    /// Label registry.
    #[must_use]
    pub const fn labels(&self) -> &LabelRegistry {
        &self.labels
    }

    pub(crate) const fn labels_mut(&mut self) -> &mut LabelRegistry {
        &mut self.labels
    }

    /// Overwrites the coordinates of one pore.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::PoreOutOfRange`] for an unknown pore.
    pub fn set_coords(&mut self, pore: usize, coords: [f64; 3]) -> Result<(), NetworkError> {
        let count = self.coords.len();
        let slot = self
            .coords
            .get_mut(pore)
            .ok_or(NetworkError::PoreOutOfRange { index: pore, count })?;
        *slot = coords;
        Ok(())
    }

    /// Sorted pore indices carrying `label`.
    #[must_use]
    pub fn pores(&self, label: PoreLabel) -> Vec<usize> {
        self.labels.pore_indices(label)
    }

    /// Sorted throat indices carrying `label`.
    #[must_use]
    pub fn throats(&self, label: ThroatLabel) -> Vec<usize> {
        self.labels.throat_indices(label)
    }

    /// Boolean pore mask with `true` at each of `pores` (out-of-range ignored).
    #[must_use]
    pub fn to_mask(&self, pores: &[usize]) -> Vec<bool> {
        let mut mask = vec![false; self.num_pores()];
        for &p in pores {
            if let Some(slot) = mask.get_mut(p) {
                *slot = true;
            }
        }
        mask
    }

    /// Builds a neighbor index over all throats.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::Adjacency`] if a throat is out of range.
    pub fn adjacency(&self) -> Result<AdjacencyIndex, NetworkError> {
        Ok(AdjacencyIndex::from_edges(self.num_pores(), &self.conns)?)
    }

    /// Builds a neighbor index over the throats carrying `label`.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::Adjacency`] if a throat is out of range.
    pub fn adjacency_for(&self, label: ThroatLabel) -> Result<AdjacencyIndex, NetworkError> {
        let mask = self.labels.throats(label);
        Ok(AdjacencyIndex::from_edges_where(
            self.num_pores(),
            &self.conns,
            |t| mask.is_some_and(|m| m.get(t).copied().unwrap_or(false)),
        )?)
    }

    /// Pores adjacent to `pores`, combined according to `mode`.
    ///
    /// Input pores are excluded from the result unless `include_input` is set, in
    /// which case they are added. Out-of-range inputs are ignored. The result is
    /// sorted and unique.
    #[must_use]
    pub fn find_neighbor_pores(
        &self,
        pores: &[usize],
        mode: NeighborMode,
        include_input: bool,
    ) -> Vec<usize> {
        let input = self.to_mask(pores);
        let mut hits = vec![0_u32; self.num_pores()];
        for edge in &self.conns {
            let (a, b) = edge.endpoints();
            if input[a] {
                hits[b] += 1;
            }
            if input[b] {
                hits[a] += 1;
            }
        }
        self.neighbor_pores_from_hits(&input, &hits, mode, include_input)
    }

    /// Same as [`Self::find_neighbor_pores`] but reuses a prebuilt index.
    #[must_use]
    pub fn find_neighbor_pores_with(
        &self,
        index: &AdjacencyIndex,
        pores: &[usize],
        mode: NeighborMode,
        include_input: bool,
    ) -> Vec<usize> {
        let input = self.to_mask(pores);
        let mut hits = vec![0_u32; self.num_pores()];
        for (p, _) in input.iter().enumerate().filter(|(_, set)| **set) {
            for &q in index.neighbors(p) {
                if let Some(h) = hits.get_mut(q) {
                    *h += 1;
                }
            }
        }
        self.neighbor_pores_from_hits(&input, &hits, mode, include_input)
    }

    fn neighbor_pores_from_hits(
        &self,
        input: &[bool],
        hits: &[u32],
        mode: NeighborMode,
        include_input: bool,
    ) -> Vec<usize> {
        (0..self.num_pores())
            .filter(|&q| {
                if input[q] {
                    return include_input;
                }
                match mode {
                    NeighborMode::Or => hits[q] >= 1,
                    NeighborMode::Xnor => hits[q] >= 2,
                    NeighborMode::Xor => hits[q] == 1,
                }
            })
            .collect()
    }

    /// Throats touching `pores`, selected according to `mode`. Sorted.
    #[must_use]
    pub fn find_neighbor_throats(&self, pores: &[usize], mode: NeighborMode) -> Vec<usize> {
        let input = self.to_mask(pores);
        self.conns
            .iter()
            .enumerate()
            .filter(|(_, edge)| {
                let ends = usize::from(input[edge.v0()]) + usize::from(input[edge.v1()]);
                match mode {
                    NeighborMode::Or => ends >= 1,
                    NeighborMode::Xnor => ends == 2,
                    NeighborMode::Xor => ends == 1,
                }
            })
            .map(|(t, _)| t)
            .collect()
    }

    /// Removes `pores` and every throat touching them, compacting indices.
    ///
    /// Survivors keep their relative order, so sorted throat lists stay sorted.
    /// Returns `(pores_removed, throats_removed)`.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::PoreOutOfRange`] for an unknown pore; nothing is
    /// modified in that case.
    pub fn trim_pores(&mut self, pores: &[usize]) -> Result<(usize, usize), NetworkError> {
        let count = self.num_pores();
        if let Some(&index) = pores.iter().find(|&&p| p >= count) {
            return Err(NetworkError::PoreOutOfRange { index, count });
        }
        let keep: Vec<bool> = self.to_mask(pores).into_iter().map(|drop| !drop).collect();

        let mut new_index = vec![usize::MAX; count];
        let mut next = 0;
        for (p, _) in keep.iter().enumerate().filter(|(_, k)| **k) {
            new_index[p] = next;
            next += 1;
        }

        let keep_throats: Vec<bool> = self
            .conns
            .iter()
            .map(|e| keep[e.v0()] && keep[e.v1()])
            .collect();

        let mut p = 0;
        self.coords.retain(|_| {
            let k = keep[p];
            p += 1;
            k
        });
        self.conns = self
            .conns
            .iter()
            .zip(&keep_throats)
            .filter(|(_, k)| **k)
            .map(|(e, _)| EdgeKey::new(new_index[e.v0()], new_index[e.v1()]))
            .collect();

        self.labels.retain_pores(&keep);
        self.labels.retain_throats(&keep_throats);

        let pores_removed = count - self.num_pores();
        let throats_removed = keep_throats.len() - self.num_throats();
        tracing::debug!(pores_removed, throats_removed, "trimmed pores");
        Ok((pores_removed, throats_removed))
    }

    /// Removes `throats`. Returns the number removed.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::ThroatOutOfRange`] for an unknown throat; nothing is
    /// modified in that case.
    pub fn trim_throats(&mut self, throats: &[usize]) -> Result<usize, NetworkError> {
        let count = self.num_throats();
        let mut keep = vec![true; count];
        for &t in throats {
            let slot = keep
                .get_mut(t)
                .ok_or(NetworkError::ThroatOutOfRange { index: t, count })?;
            *slot = false;
        }
        let mut t = 0;
        self.conns.retain(|_| {
            let k = keep[t];
            t += 1;
            k
        });
        self.labels.retain_throats(&keep);
        let removed = count - self.num_throats();
        tracing::debug!(throats_removed = removed, "trimmed throats");
        Ok(removed)
    }

    /// Appends pores and throats, then applies labels to the new elements.
    ///
    /// `conns` may reference both existing and new pores. The throat list is
    /// re-sorted afterwards; label arrays are permuted along with it. Returns the
    /// indices of the new pores.
    ///
    /// # Errors
    ///
    /// - [`NetworkError::Adjacency`] for self-loops or out-of-range endpoints
    /// - [`NetworkError::DuplicateThroat`] if a new throat already exists
    pub fn extend(
        &mut self,
        coords: &[[f64; 3]],
        conns: &[(usize, usize)],
        pore_labels: &[PoreLabel],
        throat_labels: &[ThroatLabel],
    ) -> Result<Vec<usize>, NetworkError> {
        let old_pores = self.num_pores();
        let old_throats = self.num_throats();
        let num_nodes = old_pores + coords.len();
        let mut new_edges = Vec::with_capacity(conns.len());
        for &(a, b) in conns {
            if let Some(pore) = [a, b].into_iter().find(|&p| p >= num_nodes) {
                return Err(AdjacencyError::EndpointOutOfRange { pore, num_nodes }.into());
            }
            if a == b {
                return Err(AdjacencyError::SelfLoop { pore: a }.into());
            }
            new_edges.push(EdgeKey::new(a, b));
        }
        let mut seen: FastHashSet<EdgeKey> = self.conns.iter().copied().collect();
        for (i, edge) in new_edges.iter().enumerate() {
            if !seen.insert(*edge) {
                let (v0, v1) = edge.endpoints();
                return Err(NetworkError::DuplicateThroat {
                    index: old_throats + i,
                    v0,
                    v1,
                });
            }
        }

        self.coords.extend_from_slice(coords);
        self.conns.extend(new_edges);
        self.labels.grow(coords.len(), conns.len());

        let new_pores: Vec<usize> = (old_pores..num_nodes).collect();
        for &label in pore_labels {
            let mut mask = self.labels.pores(label).map_or_else(
                || vec![false; num_nodes],
                <[bool]>::to_vec,
            );
            for &p in &new_pores {
                mask[p] = true;
            }
            self.labels.set_pores(label, mask)?;
        }
        let total_throats = self.num_throats();
        for &label in throat_labels {
            let mut mask = self.labels.throats(label).map_or_else(
                || vec![false; total_throats],
                <[bool]>::to_vec,
            );
            for slot in &mut mask[old_throats..] {
                *slot = true;
            }
            self.labels.set_throats(label, mask)?;
        }

        self.sort_throats()?;
        self.check_integrity()?;
        Ok(new_pores)
    }

    fn sort_throats(&mut self) -> Result<(), NetworkError> {
        let mut order: Vec<usize> = (0..self.num_throats()).collect();
        order.sort_by_key(|&t| self.conns[t]);
        if order.iter().enumerate().all(|(i, &t)| i == t) {
            return Ok(());
        }
        self.conns = order.iter().map(|&t| self.conns[t]).collect();
        let labels: Vec<ThroatLabel> = self.labels.throat_labels().collect();
        for label in labels {
            if let Some(mask) = self.labels.throats(label) {
                let permuted = order.iter().map(|&t| mask[t]).collect();
                self.labels.set_throats(label, permuted)?;
            }
        }
        Ok(())
    }

    /// Validates structural invariants.
    ///
    /// Checks, in order: endpoint ranges, self-loops, canonical sorted order, no
    /// duplicate throats and label array lengths.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn check_integrity(&self) -> Result<(), NetworkError> {
        let num_nodes = self.num_pores();
        for (index, edge) in self.conns.iter().enumerate() {
            if let Some(pore) = [edge.v0(), edge.v1()].into_iter().find(|&p| p >= num_nodes) {
                return Err(AdjacencyError::EndpointOutOfRange { pore, num_nodes }.into());
            }
            if edge.is_self_loop() {
                return Err(AdjacencyError::SelfLoop { pore: edge.v0() }.into());
            }
            if edge.v0() > edge.v1() {
                let (v0, v1) = (edge.v0(), edge.v1());
                return Err(NetworkError::NonCanonicalThroat { index, v0, v1 });
            }
        }
        for (i, pair) in self.conns.windows(2).enumerate() {
            if pair[0] == pair[1] {
                let (v0, v1) = pair[1].endpoints();
                return Err(NetworkError::DuplicateThroat { index: i + 1, v0, v1 });
            }
            if pair[0] > pair[1] {
                return Err(NetworkError::UnsortedThroats { index: i + 1 });
            }
        }
        if self.labels.num_pores() != num_nodes {
            return Err(LabelError::LengthMismatch {
                label: "pore registry".to_owned(),
                actual: self.labels.num_pores(),
                expected: num_nodes,
            }
            .into());
        }
        if self.labels.num_throats() != self.num_throats() {
            return Err(LabelError::LengthMismatch {
                label: "throat registry".to_owned(),
                actual: self.labels.num_throats(),
                expected: self.num_throats(),
            }
            .into());
        }
        self.labels.validate()?;
        Ok(())
    }
}
