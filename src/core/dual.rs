//! The Delaunay-Voronoi dual network.
//!
//! Construction runs the full pipeline:
//!
//! 1. prepare points (explicit, or generated and reflected across the domain faces)
//! 2. tessellate and take the Voronoi dual
//! 3. fuse both graphs into one [`Network`] and label pores and throats by class
//! 4. trim everything outside the domain and pull surface pores onto it
//!
//! The result owns the network, the tessellation it came from and the domain.

use thiserror::Error;

use crate::core::adjacency::AdjacencyError;
use crate::core::config::{DualConfig, DualConfigBuilder, DualConfigBuilderError};
use crate::core::domain::{Domain, DomainError};
use crate::core::edge::EdgeCategory;
use crate::core::fusion::fuse;
use crate::core::labels::{LabelError, PoreLabel, ThroatLabel};
use crate::core::network::{NeighborMode, Network, NetworkError};
use crate::core::points::{PointPreparationError, PointSet, prepare_points_tracked, restore_axis};
use crate::core::tessellation::{Tessellation, TessellationError, tessellate};

/// Errors raised while building or editing a [`DelaunayVoronoiDual`].
#[derive(Clone, Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum DualNetworkError {
    /// The configuration is invalid.
    #[error("Invalid configuration: {0}")]
    Config(String),
    /// The domain shape is invalid.
    #[error(transparent)]
    Domain(#[from] DomainError),
    /// Points could not be prepared.
    #[error(transparent)]
    PointPreparation(#[from] PointPreparationError),
    /// The tessellation failed.
    #[error(transparent)]
    Tessellation(#[from] TessellationError),
    /// Fusion produced an invalid throat.
    #[error(transparent)]
    Adjacency(#[from] AdjacencyError),
    /// A network edit or query failed.
    #[error(transparent)]
    Network(#[from] NetworkError),
    /// A label array is inconsistent.
    #[error(transparent)]
    Label(#[from] LabelError),
}

impl From<DualConfigBuilderError> for DualNetworkError {
    fn from(err: DualConfigBuilderError) -> Self {
        Self::Config(err.to_string())
    }
}

/// Outcome of [`DelaunayVoronoiDual::trim_external_pores`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrimReport {
    /// Pores removed because they were neither inside nor next to the inside.
    pub pores_removed: usize,
    /// Throats removed together with those pores.
    pub throats_removed: usize,
    /// Delaunay throats removed between two surface pores.
    pub surface_throats_removed: usize,
    /// Surface pores moved onto the mean of their Voronoi neighbors.
    pub relocated: usize,
    /// Surface Delaunay pores left without any Delaunay throat.
    pub isolated_surface_pores: Vec<usize>,
}

/// A Delaunay network and its Voronoi dual, fused and trimmed to a box domain.
///
/// # Examples
///
/// ```rust
/// use delaunay_voronoi_dual::core::dual::DelaunayVoronoiDual;
/// use delaunay_voronoi_dual::core::labels::{PoreLabel, ThroatLabel};
///
/// let dual = DelaunayVoronoiDual::from_points(
///     &[1.0, 1.0, 0.0],
///     vec![[0.5, 0.5], [1.5, 0.5], [0.5, 1.5], [-0.5, 0.5], [0.5, -0.5]],
/// )
/// .unwrap();
/// let net = dual.network();
/// assert_eq!(net.num_pores(), 9);
/// assert_eq!(net.num_throats(), 20);
/// assert_eq!(net.pores(PoreLabel::Internal), vec![0]);
/// assert_eq!(net.throats(ThroatLabel::Surface).len(), 12);
/// assert_eq!(net.coords()[1], [1.0, 0.5, 0.0]);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct DelaunayVoronoiDual {
    network: Network,
    tessellation: Tessellation,
    domain: Domain,
    trim_report: TrimReport,
}

impl DelaunayVoronoiDual {
    /// A builder for the construction parameters.
    #[must_use]
    pub fn builder() -> DualConfigBuilder {
        DualConfigBuilder::default()
    }

    /// Builds the network described by `config`.
    ///
    /// # Errors
    ///
    /// - [`DualNetworkError::Config`] for invalid parameters (checked before any
    ///   geometry work)
    /// - [`DualNetworkError::PointPreparation`] / [`DualNetworkError::Tessellation`]
    ///   when the points are unusable
    pub fn new(config: &DualConfig) -> Result<Self, DualNetworkError> {
        config.validate().map_err(DualNetworkError::Config)?;
        let domain = config.domain()?;
        let (points, dropped) =
            prepare_points_tracked(&domain, config.points.clone(), config.num_points, config.seed)?;
        Self::from_prepared(domain, &points, dropped)
    }

    /// Builds the network over explicit points inside the box `shape`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::new`].
    pub fn from_points(shape: &[f64], points: impl Into<PointSet>) -> Result<Self, DualNetworkError> {
        let domain = Domain::new(shape)?;
        let (points, dropped) = prepare_points_tracked(&domain, Some(points.into()), None, None)?;
        Self::from_prepared(domain, &points, dropped)
    }

    fn from_prepared(
        domain: Domain,
        points: &PointSet,
        dropped_axis: Option<usize>,
    ) -> Result<Self, DualNetworkError> {
        let tessellation = tessellate(points)?;
        let graph = fuse(&tessellation)?;
        let n_delaunay = graph.n_delaunay;
        let coords = match dropped_axis {
            Some(axis) => graph.coords.into_iter().map(|c| restore_axis(c, axis)).collect(),
            None => graph.coords,
        };
        let mut network = Network::new(coords, graph.conns)?;

        let num_pores = network.num_pores();
        let is_delaunay: Vec<bool> = (0..num_pores).map(|p| p < n_delaunay).collect();
        let is_voronoi: Vec<bool> = is_delaunay.iter().map(|d| !d).collect();
        let categories: Vec<EdgeCategory> = network
            .conns()
            .iter()
            .map(|&e| EdgeCategory::classify(e, n_delaunay))
            .collect();

        let labels = network.labels_mut();
        labels.set_pores(PoreLabel::Delaunay, is_delaunay)?;
        labels.set_pores(PoreLabel::Voronoi, is_voronoi)?;
        for (label, category) in [
            (ThroatLabel::Delaunay, EdgeCategory::Delaunay),
            (ThroatLabel::Voronoi, EdgeCategory::Voronoi),
            (ThroatLabel::Interconnect, EdgeCategory::Interconnect),
        ] {
            labels.set_throats(label, categories.iter().map(|c| *c == category).collect())?;
        }

        let mut dual = Self {
            network,
            tessellation,
            domain,
            trim_report: TrimReport::default(),
        };
        dual.trim_report = dual.trim_external_pores()?;
        tracing::debug!(
            pores = dual.network.num_pores(),
            throats = dual.network.num_throats(),
            "dual network built"
        );
        Ok(dual)
    }

    /// The fused network.
    #[must_use]
    pub const fn network(&self) -> &Network {
        &self.network
    }

    /// Consumes `self`, returning the network.
    #[must_use]
    pub fn into_network(self) -> Network {
        self.network
    }

    /// The tessellation the network was fused from (before trimming).
    ///
    /// For planar builds its coordinates omit the collapsed axis.
    #[must_use]
    pub const fn tessellation(&self) -> &Tessellation {
        &self.tessellation
    }

    /// Delaunay simplices of the tessellation.
    #[must_use]
    pub fn simplices(&self) -> &[Vec<usize>] {
        self.tessellation.simplices()
    }

    /// The box domain.
    #[must_use]
    pub const fn domain(&self) -> &Domain {
        &self.domain
    }

    /// The report of the trim run during construction.
    #[must_use]
    pub const fn trim_report(&self) -> &TrimReport {
        &self.trim_report
    }

    /// Category of throat `t`, from the class labels of its endpoints.
    #[must_use]
    pub fn throat_category(&self, t: usize) -> Option<EdgeCategory> {
        let edge = self.network.conns().get(t)?;
        let labels = self.network.labels();
        Some(EdgeCategory::from_endpoint_classes(
            labels.pore_has(PoreLabel::Delaunay, edge.v0()),
            labels.pore_has(PoreLabel::Delaunay, edge.v1()),
        ))
    }

    /// Trims the network to the domain and relocates surface pores onto it.
    ///
    /// Pores outside the box are dropped unless they neighbor an interior
    /// Delaunay pore. Kept outside Delaunay pores become the surface: throats
    /// between two of them are removed and each is moved to the mean of its
    /// Voronoi neighbors. Every pore is then labeled `Surface` or `Internal`.
    ///
    /// Pores already labeled `Surface` stay on the surface and are not moved
    /// again, so running it on a trimmed network leaves the network unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`DualNetworkError::Network`] or [`DualNetworkError::Label`] if the
    /// network is internally inconsistent.
    pub fn trim_external_pores(&mut self) -> Result<TrimReport, DualNetworkError> {
        let domain = self.domain;
        let net = &mut self.network;

        let external: Vec<bool> = net.coords().iter().map(|c| domain.is_outside(c)).collect();
        net.labels_mut().set_pores(PoreLabel::External, external)?;

        let internal_delaunay: Vec<usize> = (0..net.num_pores())
            .filter(|&p| {
                net.labels().pore_has(PoreLabel::Delaunay, p)
                    && !net.labels().pore_has(PoreLabel::External, p)
            })
            .collect();
        let keep = net.find_neighbor_pores(&internal_delaunay, NeighborMode::Or, true);
        net.labels_mut().set_pore_indices(PoreLabel::Keep, &keep)?;

        let drop: Vec<usize> = (0..net.num_pores())
            .filter(|&p| !net.labels().pore_has(PoreLabel::Keep, p))
            .collect();
        let (pores_removed, throats_removed) = net.trim_pores(&drop)?;

        // Pores relocated by an earlier trim sit on the boundary and keep their label.
        let surface_delaunay: Vec<usize> = (0..net.num_pores())
            .filter(|&p| {
                net.labels().pore_has(PoreLabel::Delaunay, p)
                    && (net.labels().pore_has(PoreLabel::External, p)
                        || net.labels().pore_has(PoreLabel::Surface, p))
            })
            .collect();
        let fresh_surface: Vec<usize> = surface_delaunay
            .iter()
            .copied()
            .filter(|&p| net.labels().pore_has(PoreLabel::External, p))
            .collect();
        let mut surface = surface_delaunay.clone();
        surface.extend(
            net.find_neighbor_pores(&surface_delaunay, NeighborMode::Or, false)
                .into_iter()
                .filter(|&p| net.labels().pore_has(PoreLabel::Voronoi, p)),
        );
        surface.sort_unstable();
        net.labels_mut().set_pore_indices(PoreLabel::Surface, &surface)?;

        let surface_throats = net.find_neighbor_throats(&surface, NeighborMode::Xnor);
        net.labels_mut()
            .set_throat_indices(ThroatLabel::Surface, &surface_throats)?;

        let hull_throats = net.find_neighbor_throats(&surface_delaunay, NeighborMode::Xnor);
        let surface_throats_removed = net.trim_throats(&hull_throats)?;

        let index = net.adjacency()?;
        let mut moves: Vec<(usize, [f64; 3])> = Vec::with_capacity(fresh_surface.len());
        let mut isolated_surface_pores = Vec::new();
        for &p in &fresh_surface {
            let neighbors = index.neighbors(p);
            if !neighbors
                .iter()
                .any(|&q| net.labels().pore_has(PoreLabel::Delaunay, q))
            {
                isolated_surface_pores.push(p);
            }
            let voronoi: Vec<[f64; 3]> = neighbors
                .iter()
                .filter(|&&q| net.labels().pore_has(PoreLabel::Voronoi, q))
                .map(|&q| net.coords()[q])
                .collect();
            if voronoi.is_empty() {
                tracing::warn!(pore = p, "surface pore has no Voronoi neighbor; left in place");
                continue;
            }
            moves.push((p, centroid(&voronoi)));
        }
        let relocated = moves.len();
        for (p, coords) in moves {
            net.set_coords(p, coords)?;
        }
        if !isolated_surface_pores.is_empty() {
            tracing::warn!(
                count = isolated_surface_pores.len(),
                pores = ?isolated_surface_pores,
                "surface pores lost every Delaunay throat"
            );
        }

        let surface_mask = net.to_mask(&surface);
        let internal: Vec<usize> = (0..net.num_pores()).filter(|&p| !surface_mask[p]).collect();
        net.labels_mut().set_pore_indices(PoreLabel::Internal, &internal)?;
        let internal_throats = net.find_neighbor_throats(&internal, NeighborMode::Xnor);
        net.labels_mut()
            .set_throat_indices(ThroatLabel::Internal, &internal_throats)?;

        net.labels_mut().remove_pores(PoreLabel::External);
        net.labels_mut().remove_pores(PoreLabel::Keep);

        let report = TrimReport {
            pores_removed,
            throats_removed,
            surface_throats_removed,
            relocated,
            isolated_surface_pores,
        };
        tracing::debug!(
            pores_removed,
            throats_removed,
            surface_throats_removed,
            relocated,
            surface = surface.len(),
            internal = internal.len(),
            "trimmed to domain"
        );
        Ok(report)
    }

    /// For each throat, the Voronoi pores shared by the interconnect
    /// neighborhoods of its two endpoints: the facet it passes through.
    ///
    /// `None` selects every Delaunay throat. Results are sorted per throat.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::ThroatOutOfRange`] (wrapped) for unknown throats.
    pub fn find_throat_facets(
        &self,
        throats: Option<&[usize]>,
    ) -> Result<Vec<Vec<usize>>, DualNetworkError> {
        let selected = throats.map_or_else(|| self.network.throats(ThroatLabel::Delaunay), <[usize]>::to_vec);
        let count = self.network.num_throats();
        if let Some(&index) = selected.iter().find(|&&t| t >= count) {
            return Err(NetworkError::ThroatOutOfRange { index, count }.into());
        }
        let index = self.network.adjacency_for(ThroatLabel::Interconnect)?;
        Ok(selected
            .iter()
            .map(|&t| {
                let (a, b) = self.network.conns()[t].endpoints();
                index.common_neighbors(a, b)
            })
            .collect())
    }

    /// For each pore, its interconnect neighbors: the Voronoi cell around a
    /// Delaunay pore, or the generators around a Voronoi pore.
    ///
    /// `None` selects every Delaunay pore. Results are sorted per pore.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::PoreOutOfRange`] (wrapped) for unknown pores.
    pub fn find_pore_hulls(
        &self,
        pores: Option<&[usize]>,
    ) -> Result<Vec<Vec<usize>>, DualNetworkError> {
        let selected = pores.map_or_else(|| self.network.pores(PoreLabel::Delaunay), <[usize]>::to_vec);
        let count = self.network.num_pores();
        if let Some(&index) = selected.iter().find(|&&p| p >= count) {
            return Err(NetworkError::PoreOutOfRange { index, count }.into());
        }
        let index = self.network.adjacency_for(ThroatLabel::Interconnect)?;
        Ok(selected
            .iter()
            .map(|&p| index.neighbors(p).to_vec())
            .collect())
    }

    /// Clones every pore labeled `label`, shifted by `offset`, and connects each
    /// clone to its parent.
    ///
    /// Clones and their throats carry the `Boundary` label; clones also inherit
    /// the parent's Delaunay/Voronoi class, and each new throat gets the class
    /// label of its endpoints. Returns the new pore indices.
    ///
    /// # Errors
    ///
    /// Returns [`DualNetworkError::Network`] if the network rejects the new throats.
    pub fn add_boundary_pores(
        &mut self,
        label: PoreLabel,
        offset: [f64; 3],
    ) -> Result<Vec<usize>, DualNetworkError> {
        let parents = self.network.pores(label);
        let base = self.network.num_pores();
        let coords: Vec<[f64; 3]> = parents
            .iter()
            .map(|&p| {
                let c = self.network.coords()[p];
                [c[0] + offset[0], c[1] + offset[1], c[2] + offset[2]]
            })
            .collect();
        let conns: Vec<(usize, usize)> = parents
            .iter()
            .enumerate()
            .map(|(i, &p)| (p, base + i))
            .collect();

        let clones = self.network.extend(
            &coords,
            &conns,
            &[PoreLabel::Boundary],
            &[ThroatLabel::Boundary],
        )?;

        let net = &mut self.network;
        for (class, throat_class) in [
            (PoreLabel::Delaunay, ThroatLabel::Delaunay),
            (PoreLabel::Voronoi, ThroatLabel::Voronoi),
        ] {
            let mut pores = net.pores(class);
            pores.extend(
                parents
                    .iter()
                    .zip(&clones)
                    .filter(|&(&parent, _)| net.labels().pore_has(class, parent))
                    .map(|(_, &clone)| clone),
            );
            pores.sort_unstable();
            net.labels_mut().set_pore_indices(class, &pores)?;

            let boundary = net.throats(ThroatLabel::Boundary);
            let mut throats = net.throats(throat_class);
            throats.extend(boundary.into_iter().filter(|&t| {
                let (a, b) = net.conns()[t].endpoints();
                net.labels().pore_has(class, a) && net.labels().pore_has(class, b)
            }));
            throats.sort_unstable();
            throats.dedup();
            net.labels_mut().set_throat_indices(throat_class, &throats)?;
        }

        tracing::debug!(label = %label, added = clones.len(), "added boundary pores");
        Ok(clones)
    }
}

fn centroid(points: &[[f64; 3]]) -> [f64; 3] {
    let mut sum = [0.0; 3];
    for p in points {
        for (s, c) in sum.iter_mut().zip(p) {
            *s += c;
        }
    }
    #[expect(clippy::cast_precision_loss, reason = "pore degrees are far below 2^52")]
    let n = points.len() as f64;
    sum.map(|s| s / n)
}

// =============================================================================
// TESTS
// =============================================================================
