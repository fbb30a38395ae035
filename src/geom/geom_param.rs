//! Face-varying geometry attributes.
//!
//! A [`FaceVaryingAttribute`] holds one value per face-vertex occurrence,
//! stored either flat (one value per occurrence) or indexed (a table of
//! distinct values plus one table index per occurrence).

use crate::core::GeometryScope;

use super::indexer::{index_values, IndexKey};

/// Storage mode of a face-varying attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageMode {
    /// One value per occurrence.
    Flat,
    /// Deduplicated table plus per-occurrence indices.
    Indexed,
}

/// Sample data of a face-varying attribute (normals, UVs).
#[derive(Clone, Debug, PartialEq)]
pub struct FaceVaryingAttribute<T> {
    /// Values: per occurrence when flat, the distinct table when indexed.
    pub vals: Vec<T>,
    /// Per-occurrence table indices (indexed storage only).
    pub indices: Option<Vec<u32>>,
    /// Scope of the data.
    pub scope: GeometryScope,
}

impl<T: Copy + Default> FaceVaryingAttribute<T> {
    /// Flat attribute with one value per occurrence.
    pub fn flat(vals: Vec<T>) -> Self {
        Self {
            vals,
            indices: None,
            scope: GeometryScope::FaceVarying,
        }
    }

    /// Indexed attribute from a value table and per-occurrence indices.
    pub fn indexed(vals: Vec<T>, indices: Vec<u32>) -> Self {
        Self {
            vals,
            indices: Some(indices),
            scope: GeometryScope::FaceVarying,
        }
    }

    /// Build from per-occurrence values, deduplicating when `indexed` is set.
    ///
    /// The flag alone decides the mode; no size heuristic is applied.
    pub fn from_occurrences(values: Vec<T>, indexed: bool) -> Self
    where
        T: IndexKey,
    {
        if indexed {
            let out = index_values(&values);
            Self::indexed(out.values, out.indices)
        } else {
            Self::flat(values)
        }
    }

    /// Storage mode of this attribute.
    #[inline]
    pub fn storage_mode(&self) -> StorageMode {
        if self.indices.is_some() {
            StorageMode::Indexed
        } else {
            StorageMode::Flat
        }
    }

    /// Check if this attribute is indexed.
    #[inline]
    pub fn is_indexed(&self) -> bool {
        self.indices.is_some()
    }

    /// Number of stored values (table size when indexed).
    #[inline]
    pub fn num_values(&self) -> usize {
        self.vals.len()
    }

    /// Number of face-vertex occurrences covered.
    #[inline]
    pub fn num_occurrences(&self) -> usize {
        match &self.indices {
            Some(indices) => indices.len(),
            None => self.vals.len(),
        }
    }

    /// Value at an occurrence, resolving the index table.
    pub fn get(&self, occurrence: usize) -> Option<T> {
        match &self.indices {
            Some(indices) => {
                let idx = *indices.get(occurrence)? as usize;
                self.vals.get(idx).copied()
            }
            None => self.vals.get(occurrence).copied(),
        }
    }

    /// Expand to one value per occurrence.
    ///
    /// Out-of-range table indices yield `T::default()`.
    pub fn expand(&self) -> Vec<T> {
        match &self.indices {
            Some(indices) => indices
                .iter()
                .map(|&i| self.vals.get(i as usize).copied().unwrap_or_default())
                .collect(),
            None => self.vals.clone(),
        }
    }
}

/// A face-varying attribute stored under its own name (additional UV sets).
#[derive(Clone, Debug, PartialEq)]
pub struct NamedAttribute<T> {
    /// Stored attribute name.
    pub name: String,
    /// Attribute data.
    pub attr: FaceVaryingAttribute<T>,
}
