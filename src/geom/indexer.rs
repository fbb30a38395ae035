//! Value deduplication for indexed attribute storage.
//!
//! [`ValueIndexer`] turns a per-occurrence value sequence into a table of
//! distinct values plus one table index per occurrence. Values are keyed by
//! an exact total order over their components (no epsilon), and the table
//! keeps first-occurrence order, so the output is fully deterministic.

use std::collections::BTreeMap;

use crate::util::{Vec2, Vec3};

/// Values that can be deduplicated by [`ValueIndexer`].
pub trait IndexKey: Copy {
    /// Totally ordered key; equal keys mean bit-identical components.
    type Key: Ord + Copy;

    /// Build the ordering key for this value.
    fn index_key(&self) -> Self::Key;
}

/// Map an `f32` onto a `u32` whose unsigned order matches `f32::total_cmp`.
#[inline]
fn ordered_bits(v: f32) -> u32 {
    let bits = v.to_bits();
    if bits & 0x8000_0000 != 0 {
        !bits
    } else {
        bits | 0x8000_0000
    }
}

impl IndexKey for f32 {
    type Key = u32;

    #[inline]
    fn index_key(&self) -> u32 {
        ordered_bits(*self)
    }
}

impl IndexKey for Vec2 {
    type Key = [u32; 2];

    #[inline]
    fn index_key(&self) -> [u32; 2] {
        [ordered_bits(self.x), ordered_bits(self.y)]
    }
}

impl IndexKey for Vec3 {
    type Key = [u32; 3];

    #[inline]
    fn index_key(&self) -> [u32; 3] {
        [ordered_bits(self.x), ordered_bits(self.y), ordered_bits(self.z)]
    }
}

/// Deduplicated table plus per-occurrence indices.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IndexedValues<T> {
    /// Distinct values in first-occurrence order.
    pub values: Vec<T>,
    /// One table index per input value.
    pub indices: Vec<u32>,
}

/// Incremental deduplicator scoped to a single attribute of a single sample.
pub struct ValueIndexer<T: IndexKey> {
    lookup: BTreeMap<T::Key, u32>,
    values: Vec<T>,
    indices: Vec<u32>,
}

impl<T: IndexKey> ValueIndexer<T> {
    /// Create an empty indexer.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create an indexer expecting `n` occurrences.
    pub fn with_capacity(n: usize) -> Self {
        Self {
            lookup: BTreeMap::new(),
            values: Vec::new(),
            indices: Vec::with_capacity(n),
        }
    }

    /// Record one occurrence and return its table index.
    pub fn push(&mut self, value: T) -> u32 {
        let next = self.values.len() as u32;
        let idx = *self.lookup.entry(value.index_key()).or_insert_with(|| {
            self.values.push(value);
            next
        });
        self.indices.push(idx);
        idx
    }

    /// Number of distinct values seen so far.
    pub fn num_values(&self) -> usize {
        self.values.len()
    }

    /// Number of occurrences recorded so far.
    pub fn num_indices(&self) -> usize {
        self.indices.len()
    }

    /// Finish and return the table and index sequence.
    pub fn finish(self) -> IndexedValues<T> {
        IndexedValues {
            values: self.values,
            indices: self.indices,
        }
    }
}

impl<T: IndexKey> Default for ValueIndexer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: IndexKey> Extend<T> for ValueIndexer<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for v in iter {
            self.push(v);
        }
    }
}

/// Deduplicate `values` in one pass.
pub fn index_values<T: IndexKey>(values: &[T]) -> IndexedValues<T> {
    let mut indexer = ValueIndexer::with_capacity(values.len());
    indexer.extend(values.iter().copied());
    indexer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_normals() -> Vec<Vec3> {
        vec![
            Vec3::Z,
            Vec3::Y,
            Vec3::Z,
            Vec3::new(0.5, 0.5, 0.0),
            Vec3::Y,
            Vec3::Z,
        ]
    }

    #[test]
    fn test_first_occurrence_order() {
        let out = index_values(&sample_normals());
        assert_eq!(out.values, vec![Vec3::Z, Vec3::Y, Vec3::new(0.5, 0.5, 0.0)]);
        assert_eq!(out.indices, vec![0, 1, 0, 2, 1, 0]);
    }

    #[test]
    fn test_dedup_correctness() {
        let input = sample_normals();
        let out = index_values(&input);
        assert_eq!(out.indices.len(), input.len());
        for i in 0..input.len() {
            for j in 0..input.len() {
                let same_entry = out.values[out.indices[i] as usize] == out.values[out.indices[j] as usize];
                assert_eq!(same_entry, input[i] == input[j]);
            }
        }
    }

    #[test]
    fn test_reindex_table_is_identity() {
        let uvs = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 1.0),
        ];
        let first = index_values(&uvs);
        let second = index_values(&first.values);
        assert_eq!(second.values, first.values);
        let identity: Vec<u32> = (0..first.values.len() as u32).collect();
        assert_eq!(second.indices, identity);
    }

    #[test]
    fn test_exact_keys() {
        // No tolerance: nearby values stay distinct.
        let a = Vec2::new(0.1, 0.2);
        let b = Vec2::new(0.1 + f32::EPSILON, 0.2);
        let out = index_values(&[a, b, a]);
        assert_eq!(out.values.len(), 2);
        assert_eq!(out.indices, vec![0, 1, 0]);

        // Signed zeros have different bits.
        let out = index_values(&[0.0f32, -0.0f32]);
        assert_eq!(out.values.len(), 2);

        // Identical NaN payloads merge.
        let nan = f32::NAN;
        let out = index_values(&[nan, nan]);
        assert_eq!(out.values.len(), 1);
    }

    #[test]
    fn test_ordered_bits_matches_total_cmp() {
        let vals = [-3.5f32, -0.0, 0.0, 1e-30, 2.0, f32::MAX];
        for w in vals.windows(2) {
            assert_eq!(
                ordered_bits(w[0]).cmp(&ordered_bits(w[1])),
                w[0].total_cmp(&w[1])
            );
        }
    }

    #[test]
    fn test_empty_input() {
        let out = index_values::<Vec3>(&[]);
        assert!(out.values.is_empty());
        assert!(out.indices.is_empty());
    }
}
