//! Strongly typed boolean labels over pores and throats.
//!
//! Every label array in a [`LabelRegistry`] has exactly the current pore (or throat)
//! count. The registry is only ever resized through [`LabelRegistry::retain_pores`],
//! [`LabelRegistry::retain_throats`] and [`LabelRegistry::grow`], which act on every
//! array at once.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Pore labels.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PoreLabel {
    /// Pore is a Delaunay node (an input point).
    Delaunay,
    /// Pore is a Voronoi node (a circumcenter).
    Voronoi,
    /// Pore lies on the domain surface after trimming.
    Surface,
    /// Pore is not on the surface.
    Internal,
    /// Transient: pore lies outside the domain. Removed after trimming.
    External,
    /// Transient: pore survives trimming. Removed after trimming.
    Keep,
    /// Pore was added by `add_boundary_pores`.
    Boundary,
}

/// Throat labels.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ThroatLabel {
    /// Both endpoints are Delaunay pores.
    Delaunay,
    /// Both endpoints are Voronoi pores.
    Voronoi,
    /// One Delaunay and one Voronoi endpoint.
    Interconnect,
    /// Both endpoints are surface pores.
    Surface,
    /// Both endpoints are internal pores.
    Internal,
    /// Throat was added by `add_boundary_pores`.
    Boundary,
}

impl std::fmt::Display for PoreLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Delaunay => "delaunay",
            Self::Voronoi => "voronoi",
            Self::Surface => "surface",
            Self::Internal => "internal",
            Self::External => "external",
            Self::Keep => "keep",
            Self::Boundary => "boundary",
        };
        write!(f, "pore.{name}")
    }
}

impl std::fmt::Display for ThroatLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Delaunay => "delaunay",
            Self::Voronoi => "voronoi",
            Self::Interconnect => "interconnect",
            Self::Surface => "surface",
            Self::Internal => "internal",
            Self::Boundary => "boundary",
        };
        write!(f, "throat.{name}")
    }
}

/// Errors raised when a label array does not fit the registry.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum LabelError {
    /// A mask has the wrong length.
    #[error("Label mask for {label} has length {actual}, expected {expected}")]
    LengthMismatch {
        /// Human-readable label name.
        label: String,
        /// Length supplied.
        actual: usize,
        /// Current element count.
        expected: usize,
    },
    /// An index is outside the current element count.
    #[error("Index {index} for {label} is out of range for {count} elements")]
    IndexOutOfRange {
        /// Human-readable label name.
        label: String,
        /// Offending index.
        index: usize,
        /// Current element count.
        count: usize,
    },
}

/// Boolean label arrays keyed by [`PoreLabel`] / [`ThroatLabel`].
///
/// A label that was never set reads as all-`false`.
///
/// # Examples
///
/// ```rust
/// use delaunay_voronoi_dual::core::labels::{LabelRegistry, PoreLabel};
///
/// let mut labels = LabelRegistry::new(3, 0);
/// labels.set_pores(PoreLabel::Surface, vec![true, false, true]).unwrap();
/// assert_eq!(labels.pore_indices(PoreLabel::Surface), vec![0, 2]);
/// assert!(!labels.pore_has(PoreLabel::Internal, 1));
///
/// labels.retain_pores(&[false, true, true]);
/// assert_eq!(labels.num_pores(), 2);
/// assert_eq!(labels.pore_indices(PoreLabel::Surface), vec![1]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRegistry {
    num_pores: usize,
    num_throats: usize,
    pores: BTreeMap<PoreLabel, Vec<bool>>,
    throats: BTreeMap<ThroatLabel, Vec<bool>>,
}

impl LabelRegistry {
    /// An empty registry for the given element counts.
    #[must_use]
    pub const fn new(num_pores: usize, num_throats: usize) -> Self {
        Self {
            num_pores,
            num_throats,
            pores: BTreeMap::new(),
            throats: BTreeMap::new(),
        }
    }

    /// Current pore count.
    #[must_use]
    pub const fn num_pores(&self) -> usize {
        self.num_pores
    }

    /// Current throat count.
    #[must_use]
    pub const fn num_throats(&self) -> usize {
        self.num_throats
    }

    /// Replaces the mask of a pore label.
    ///
    /// # Errors
    ///
    /// Returns [`LabelError::LengthMismatch`] if `mask.len() != num_pores`.
    pub fn set_pores(&mut self, label: PoreLabel, mask: Vec<bool>) -> Result<(), LabelError> {
        check_len(&label.to_string(), mask.len(), self.num_pores)?;
        self.pores.insert(label, mask);
        Ok(())
    }

    /// Replaces the mask of a throat label.
    ///
    /// # Errors
    ///
    /// Returns [`LabelError::LengthMismatch`] if `mask.len() != num_throats`.
    pub fn set_throats(&mut self, label: ThroatLabel, mask: Vec<bool>) -> Result<(), LabelError> {
        check_len(&label.to_string(), mask.len(), self.num_throats)?;
        self.throats.insert(label, mask);
        Ok(())
    }

    /// Sets `label` on exactly the pores in `indices` (all others cleared).
    ///
    /// # Errors
    ///
    /// Returns [`LabelError::IndexOutOfRange`] for an index `>= num_pores`.
    pub fn set_pore_indices(&mut self, label: PoreLabel, indices: &[usize]) -> Result<(), LabelError> {
        let mask = indices_to_mask(&label.to_string(), indices, self.num_pores)?;
        self.pores.insert(label, mask);
        Ok(())
    }

    /// Sets `label` on exactly the throats in `indices` (all others cleared).
    ///
    /// # Errors
    ///
    /// Returns [`LabelError::IndexOutOfRange`] for an index `>= num_throats`.
    pub fn set_throat_indices(
        &mut self,
        label: ThroatLabel,
        indices: &[usize],
    ) -> Result<(), LabelError> {
        let mask = indices_to_mask(&label.to_string(), indices, self.num_throats)?;
        self.throats.insert(label, mask);
        Ok(())
    }

    /// The mask of a pore label, if it was ever set.
    #[must_use]
    pub fn pores(&self, label: PoreLabel) -> Option<&[bool]> {
        self.pores.get(&label).map(Vec::as_slice)
    }

    /// The mask of a throat label, if it was ever set.
    #[must_use]
    pub fn throats(&self, label: ThroatLabel) -> Option<&[bool]> {
        self.throats.get(&label).map(Vec::as_slice)
    }

    /// Whether pore `index` carries `label` (`false` for unset labels).
    #[must_use]
    pub fn pore_has(&self, label: PoreLabel, index: usize) -> bool {
        self.pores
            .get(&label)
            .and_then(|mask| mask.get(index))
            .copied()
            .unwrap_or(false)
    }

    /// Whether throat `index` carries `label` (`false` for unset labels).
    #[must_use]
    pub fn throat_has(&self, label: ThroatLabel, index: usize) -> bool {
        self.throats
            .get(&label)
            .and_then(|mask| mask.get(index))
            .copied()
            .unwrap_or(false)
    }

    /// Sorted pore indices carrying `label`.
    #[must_use]
    pub fn pore_indices(&self, label: PoreLabel) -> Vec<usize> {
        mask_to_indices(self.pores(label))
    }

    /// Sorted throat indices carrying `label`.
    #[must_use]
    pub fn throat_indices(&self, label: ThroatLabel) -> Vec<usize> {
        mask_to_indices(self.throats(label))
    }

    /// Drops a pore label entirely.
    pub fn remove_pores(&mut self, label: PoreLabel) -> Option<Vec<bool>> {
        self.pores.remove(&label)
    }

    /// Drops a throat label entirely.
    pub fn remove_throats(&mut self, label: ThroatLabel) -> Option<Vec<bool>> {
        self.throats.remove(&label)
    }

    /// Pore labels currently present, in a stable order.
    pub fn pore_labels(&self) -> impl Iterator<Item = PoreLabel> + '_ {
        self.pores.keys().copied()
    }

    /// Throat labels currently present, in a stable order.
    pub fn throat_labels(&self) -> impl Iterator<Item = ThroatLabel> + '_ {
        self.throats.keys().copied()
    }

    /// Keeps the pores with `keep[i] == true` in every pore label, preserving order.
    ///
    /// `keep` must have the current pore count; shorter masks drop the tail.
    pub fn retain_pores(&mut self, keep: &[bool]) {
        for mask in self.pores.values_mut() {
            retain_by(mask, keep);
        }
        self.num_pores = keep.iter().filter(|&&k| k).count();
    }

    /// Keeps the throats with `keep[i] == true` in every throat label.
    pub fn retain_throats(&mut self, keep: &[bool]) {
        for mask in self.throats.values_mut() {
            retain_by(mask, keep);
        }
        self.num_throats = keep.iter().filter(|&&k| k).count();
    }

    /// Appends `new_pores` / `new_throats` unlabeled elements to every array.
    pub fn grow(&mut self, new_pores: usize, new_throats: usize) {
        self.num_pores += new_pores;
        self.num_throats += new_throats;
        for mask in self.pores.values_mut() {
            mask.resize(self.num_pores, false);
        }
        for mask in self.throats.values_mut() {
            mask.resize(self.num_throats, false);
        }
    }

    /// Checks that every label array matches the element counts.
    ///
    /// # Errors
    ///
    /// Returns the first [`LabelError::LengthMismatch`] found.
    pub fn validate(&self) -> Result<(), LabelError> {
        for (label, mask) in &self.pores {
            check_len(&label.to_string(), mask.len(), self.num_pores)?;
        }
        for (label, mask) in &self.throats {
            check_len(&label.to_string(), mask.len(), self.num_throats)?;
        }
        Ok(())
    }
}

fn check_len(label: &str, actual: usize, expected: usize) -> Result<(), LabelError> {
    if actual == expected {
        Ok(())
    } else {
        Err(LabelError::LengthMismatch {
            label: label.to_owned(),
            actual,
            expected,
        })
    }
}

fn indices_to_mask(label: &str, indices: &[usize], count: usize) -> Result<Vec<bool>, LabelError> {
    let mut mask = vec![false; count];
    for &index in indices {
        let slot = mask.get_mut(index).ok_or_else(|| LabelError::IndexOutOfRange {
            label: label.to_owned(),
            index,
            count,
        })?;
        *slot = true;
    }
    Ok(mask)
}

fn mask_to_indices(mask: Option<&[bool]>) -> Vec<usize> {
    mask.map(|m| {
        m.iter()
            .enumerate()
            .filter_map(|(i, &set)| set.then_some(i))
            .collect()
    })
    .unwrap_or_default()
}

fn retain_by(mask: &mut Vec<bool>, keep: &[bool]) {
    let mut i = 0;
    mask.retain(|_| {
        let k = keep.get(i).copied().unwrap_or(false);
        i += 1;
        k
    });
}
