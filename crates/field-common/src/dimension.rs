//! Logical dimensions a figure can vary along.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};

/// A logical axis of variation across panels.
///
/// The declaration order is significant: it is the tie-break precedence used
/// when two dimensions have equal length (later counts as longer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Model,
    LeadTime,
    Ensemble,
}

impl Dimension {
    /// All dimensions in precedence order.
    pub const ALL: [Dimension; 3] = [Dimension::Model, Dimension::LeadTime, Dimension::Ensemble];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Model => "model",
            Dimension::LeadTime => "lead time",
            Dimension::Ensemble => "ensemble",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value per dimension, addressed by [`Dimension`] rather than position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DimensionMap<T> {
    pub model: T,
    pub lead_time: T,
    pub ensemble: T,
}

impl<T> DimensionMap<T> {
    pub fn new(model: T, lead_time: T, ensemble: T) -> Self {
        Self {
            model,
            lead_time,
            ensemble,
        }
    }

    /// Iterate `(dimension, value)` pairs in precedence order.
    pub fn iter(&self) -> impl Iterator<Item = (Dimension, &T)> {
        Dimension::ALL.into_iter().map(move |dim| (dim, &self[dim]))
    }

    pub fn map<U>(&self, mut f: impl FnMut(Dimension, &T) -> U) -> DimensionMap<U> {
        DimensionMap {
            model: f(Dimension::Model, &self.model),
            lead_time: f(Dimension::LeadTime, &self.lead_time),
            ensemble: f(Dimension::Ensemble, &self.ensemble),
        }
    }
}

impl DimensionMap<usize> {
    /// Dimensions whose cardinality exceeds one.
    pub fn active(&self) -> Vec<Dimension> {
        self.iter()
            .filter(|(_, len)| **len > 1)
            .map(|(dim, _)| dim)
            .collect()
    }

    /// Dimensions ordered from shortest to longest.
    ///
    /// The sort is stable, so equal lengths keep precedence order and the
    /// later-declared dimension ends up last.
    pub fn ascending(&self) -> [Dimension; 3] {
        let mut dims = Dimension::ALL;
        dims.sort_by_key(|&dim| self[dim]);
        dims
    }
}

impl<T> Index<Dimension> for DimensionMap<T> {
    type Output = T;

    fn index(&self, dim: Dimension) -> &T {
        match dim {
            Dimension::Model => &self.model,
            Dimension::LeadTime => &self.lead_time,
            Dimension::Ensemble => &self.ensemble,
        }
    }
}

impl<T> IndexMut<Dimension> for DimensionMap<T> {
    fn index_mut(&mut self, dim: Dimension) -> &mut T {
        match dim {
            Dimension::Model => &mut self.model,
            Dimension::LeadTime => &mut self.lead_time,
            Dimension::Ensemble => &mut self.ensemble,
        }
    }
}
