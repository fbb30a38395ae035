//! Polygon mesh samples and sample streams.
//!
//! A [`GeometrySample`] is the unit persisted per frame. Samples are appended
//! to a [`GeometrySampleSequence`] and never modified afterwards.

use crate::core::{compute_digest_parts, SampleDigest, TimeSampling, TopologyVariance};
use crate::util::{BBox3d, Chrono, Error, Result, Vec2, Vec3, INVALID_POINT};

use super::faceset::FaceSet;
use super::geom_param::{FaceVaryingAttribute, NamedAttribute};

/// Stored face layout.
///
/// Indices within each face are stored in reverse traversal order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Topology {
    /// Face vertex counts - number of vertices per face.
    pub face_counts: Vec<i32>,
    /// Face vertex indices - indices into the position array.
    pub face_indices: Vec<i32>,
}

impl Topology {
    /// Create from count/index arrays.
    pub fn new(face_counts: Vec<i32>, face_indices: Vec<i32>) -> Self {
        Self { face_counts, face_indices }
    }

    /// The stand-in layout written when a mesh has no faces: one face of
    /// zero vertices and one index of zero.
    pub fn degenerate() -> Self {
        Self::new(vec![0], vec![0])
    }

    /// Get number of faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.face_counts.len()
    }

    /// Get total number of face-vertex indices.
    #[inline]
    pub fn num_indices(&self) -> usize {
        self.face_indices.len()
    }

    /// No faces at all (pure point cache).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.face_counts.is_empty()
    }

    /// First face count is the reserved zero-count marker.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.face_counts.first() == Some(&0)
    }

    /// Number of vertices the indices reference (largest index + 1).
    pub fn num_referenced_vertices(&self) -> usize {
        self.face_indices
            .iter()
            .filter(|&&i| i >= 0)
            .map(|&i| i as usize + 1)
            .max()
            .unwrap_or(0)
    }

    /// Identity of this layout for a mesh of `num_vertices` points.
    pub fn signature(&self, num_vertices: usize) -> TopologySignature {
        TopologySignature {
            num_vertices,
            num_faces: self.num_faces(),
            num_indices: self.num_indices(),
            digest: compute_digest_parts(&[self.face_counts.as_slice(), self.face_indices.as_slice()]),
        }
    }
}

/// Identity of a mesh's connectivity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TopologySignature {
    /// Vertex count of the sample that wrote the topology.
    pub num_vertices: usize,
    /// Number of faces.
    pub num_faces: usize,
    /// Number of face-vertex indices.
    pub num_indices: usize,
    /// Digest of the stored count and index arrays.
    pub digest: SampleDigest,
}

/// Per-UV-set options, stored once as a side property.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UvOptions {
    pub wrap_u: bool,
    pub wrap_v: bool,
    pub subdiv_smooth: bool,
}

impl UvOptions {
    /// Float triplet layout `[wrap_u, wrap_v, smooth]` used by persistence layers.
    pub fn to_floats(&self) -> [f32; 3] {
        let f = |b: bool| if b { 1.0 } else { 0.0 };
        [f(self.wrap_u), f(self.wrap_v), f(self.subdiv_smooth)]
    }

    /// Flatten a list of options into one float array.
    pub fn flatten(options: &[UvOptions]) -> Vec<f32> {
        options.iter().flat_map(|o| o.to_floats()).collect()
    }
}

/// Properties written once, with the first sample of a stream.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SideProperties {
    /// Host names of all UV sets, in set order.
    pub uv_set_names: Vec<String>,
    /// Options of each UV set, in set order.
    pub uv_options: Vec<UvOptions>,
    /// Named face sets.
    pub face_sets: Vec<FaceSet>,
    /// Undeformed reference positions.
    pub bind_pose: Option<Vec<Vec3>>,
}

impl SideProperties {
    /// Check if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.uv_set_names.is_empty()
            && self.uv_options.is_empty()
            && self.face_sets.is_empty()
            && self.bind_pose.is_none()
    }

    /// Look up a face set by name.
    pub fn face_set(&self, name: &str) -> Option<&FaceSet> {
        self.face_sets.iter().find(|fs| fs.name == name)
    }
}

/// One persisted mesh sample.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GeometrySample {
    /// Position of this sample in its stream.
    pub index: usize,
    /// Vertex positions (P).
    pub positions: Vec<Vec3>,
    /// Face layout, present only when (re)written on this sample.
    pub topology: Option<Topology>,
    /// Face-varying normals (optional).
    pub normals: Option<FaceVaryingAttribute<Vec3>>,
    /// Primary UV set (optional).
    pub uvs: Option<FaceVaryingAttribute<Vec2>>,
    /// Additional UV sets, stored under their own names.
    pub extra_uvs: Vec<NamedAttribute<Vec2>>,
    /// Vertex velocities (optional).
    pub velocities: Option<Vec<Vec3>>,
    /// Bounds of this sample's positions.
    pub self_bounds: BBox3d,
}

impl GeometrySample {
    /// Get number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.positions.len()
    }

    /// Check if this sample carries topology.
    #[inline]
    pub fn has_topology(&self) -> bool {
        self.topology.is_some()
    }

    /// Check if mesh has velocities.
    #[inline]
    pub fn has_velocities(&self) -> bool {
        self.velocities.is_some()
    }

    /// Positions hold only the reserved no-geometry point.
    pub fn is_empty_marker(&self) -> bool {
        self.positions.len() == 1 && self.positions[0] == INVALID_POINT
    }

    /// UV set by ordinal: 0 is the primary set, `n` the n-th additional set.
    pub fn uv_set(&self, set: usize) -> Option<&FaceVaryingAttribute<Vec2>> {
        match set {
            0 => self.uvs.as_ref(),
            n => self.extra_uvs.get(n - 1).map(|a| &a.attr),
        }
    }

    /// Positions as a flat float slice (x, y, z, x, y, z, ...).
    pub fn positions_as_f32(&self) -> &[f32] {
        bytemuck::cast_slice(self.positions.as_slice())
    }
}

/// Append-only stream of samples plus its time sampling.
#[derive(Clone, Debug, Default)]
pub struct GeometrySampleSequence {
    time_sampling: TimeSampling,
    samples: Vec<GeometrySample>,
    side: SideProperties,
    dynamic_topology: bool,
}

impl GeometrySampleSequence {
    /// Create an empty stream.
    pub fn new(time_sampling: TimeSampling) -> Self {
        Self {
            time_sampling,
            ..Default::default()
        }
    }

    /// Mark the stream as rewriting topology every sample.
    pub fn with_dynamic_topology(mut self, dynamic: bool) -> Self {
        self.dynamic_topology = dynamic;
        self
    }

    /// Append a sample. Its index must equal the current length.
    pub fn push(&mut self, sample: GeometrySample) -> Result<()> {
        let expected = self.samples.len();
        if sample.index != expected {
            return Err(Error::SampleOutOfOrder { index: sample.index, expected });
        }
        self.samples.push(sample);
        Ok(())
    }

    /// Record first-sample side properties. Later calls are ignored.
    pub fn set_side_properties(&mut self, side: SideProperties) {
        if self.side.is_empty() {
            self.side = side;
        }
    }

    /// Time sampling of the stream.
    pub fn time_sampling(&self) -> &TimeSampling {
        &self.time_sampling
    }

    /// Time of sample `index`.
    pub fn sample_time(&self, index: usize) -> Chrono {
        self.time_sampling.sample_time(index)
    }

    /// Side properties written with the first sample.
    pub fn side_properties(&self) -> &SideProperties {
        &self.side
    }

    /// Get number of samples.
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample by index, if present.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&GeometrySample> {
        self.samples.get(index)
    }

    /// Sample by index.
    pub fn sample(&self, index: usize) -> Result<&GeometrySample> {
        self.samples.get(index).ok_or(Error::SampleOutOfBounds {
            index,
            count: self.samples.len(),
        })
    }

    /// Iterate samples in order.
    pub fn iter(&self) -> std::slice::Iter<'_, GeometrySample> {
        self.samples.iter()
    }

    /// Whether topology was written on every sample.
    pub fn is_dynamic_topology(&self) -> bool {
        self.dynamic_topology
    }

    /// Topology variance of the stream.
    pub fn topology_variance(&self) -> TopologyVariance {
        if self.dynamic_topology {
            TopologyVariance::Heterogeneous
        } else if self.samples.len() > 1 {
            TopologyVariance::Homogeneous
        } else {
            TopologyVariance::Static
        }
    }

    /// Topology in effect at `index`: the most recent one written at or
    /// before that sample.
    pub fn topology_for(&self, index: usize) -> Option<&Topology> {
        let end = index.checked_add(1)?.min(self.samples.len());
        self.samples[..end].iter().rev().find_map(|s| s.topology.as_ref())
    }

    /// Union of all sample bounds.
    pub fn total_bounds(&self) -> BBox3d {
        let mut b = BBox3d::EMPTY;
        for s in &self.samples {
            b.expand_by_box(&s.self_bounds);
        }
        b
    }
}

impl<'a> IntoIterator for &'a GeometrySampleSequence {
    type Item = &'a GeometrySample;
    type IntoIter = std::slice::Iter<'a, GeometrySample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(index: usize, topology: Option<Topology>) -> GeometrySample {
        GeometrySample {
            index,
            positions: vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            topology,
            ..Default::default()
        }
    }

    #[test]
    fn test_topology_signature() {
        let a = Topology::new(vec![3], vec![2, 1, 0]);
        let b = Topology::new(vec![3], vec![0, 1, 2]);
        assert_eq!(a.signature(3), a.signature(3));
        assert_ne!(a.signature(3).digest, b.signature(3).digest);
        assert_eq!(a.num_referenced_vertices(), 3);
    }

    #[test]
    fn test_degenerate_topology() {
        let t = Topology::degenerate();
        assert!(t.is_degenerate());
        assert!(!t.is_empty());
        assert!(Topology::default().is_empty());
    }

    #[test]
    fn test_push_in_order() {
        let mut seq = GeometrySampleSequence::new(TimeSampling::uniform(1.0, 0.0));
        seq.push(sample(0, Some(Topology::new(vec![3], vec![2, 1, 0])))).unwrap();
        seq.push(sample(1, None)).unwrap();
        let err = seq.push(sample(5, None)).unwrap_err();
        assert!(matches!(err, Error::SampleOutOfOrder { index: 5, expected: 2 }));
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.topology_variance(), TopologyVariance::Homogeneous);
    }

    #[test]
    fn test_topology_for_walks_back() {
        let mut seq = GeometrySampleSequence::new(TimeSampling::uniform(1.0, 0.0));
        let t0 = Topology::new(vec![3], vec![2, 1, 0]);
        seq.push(sample(0, Some(t0.clone()))).unwrap();
        seq.push(sample(1, None)).unwrap();
        seq.push(sample(2, None)).unwrap();
        assert_eq!(seq.topology_for(2), Some(&t0));
        assert_eq!(seq.topology_for(99), Some(&t0));
    }

    #[test]
    fn test_side_properties_written_once() {
        let mut seq = GeometrySampleSequence::default();
        seq.set_side_properties(SideProperties {
            uv_set_names: vec!["map".into()],
            ..Default::default()
        });
        seq.set_side_properties(SideProperties {
            uv_set_names: vec!["other".into()],
            ..Default::default()
        });
        assert_eq!(seq.side_properties().uv_set_names, vec!["map".to_string()]);
    }

    #[test]
    fn test_uv_options_floats() {
        let opts = [
            UvOptions { wrap_u: true, wrap_v: false, subdiv_smooth: true },
            UvOptions::default(),
        ];
        assert_eq!(UvOptions::flatten(&opts), vec![1.0, 0.0, 1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_positions_as_f32() {
        let s = sample(0, None);
        assert_eq!(s.positions_as_f32().len(), 9);
        assert_eq!(s.positions_as_f32()[3], 1.0);
    }
}
