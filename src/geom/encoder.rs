//! Mesh sample encoder.
//!
//! [`encode`] turns one [`MeshSnapshot`] into one [`GeometrySample`], applying
//! an [`EncodePolicy`]. [`MeshWriter`] wraps it into an append-only stream that
//! carries the topology signature from one sample to the next.
//!
//! Layout rules every reader relies on:
//! - face-vertex indices are stored in reverse traversal order within each face,
//!   and face-varying attributes follow that same order;
//! - a mesh without vertices stores the single point [`INVALID_POINT`] and
//!   bounds of the origin;
//! - a mesh without face-vertex indices stores [`Topology::degenerate`].

use tracing::{debug, trace, warn};

use crate::core::TimeSampling;
use crate::util::{BBox3d, Chrono, DVec3, Error, Result, Vec2, Vec3, INVALID_NORMAL, INVALID_POINT};

use super::faceset::FaceSet;
use super::geom_param::{FaceVaryingAttribute, NamedAttribute};
use super::polymesh::{
    GeometrySample, GeometrySampleSequence, SideProperties, Topology, TopologySignature, UvOptions,
};
use super::snapshot::{Face, MeshSnapshot, SnapshotProvider};

/// Export options for a mesh stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EncodePolicy {
    /// Store positions only; no topology or attributes.
    pub point_cache_only: bool,
    /// Rewrite topology and face-varying attributes on every sample.
    pub dynamic_topology: bool,
    pub export_normals: bool,
    /// Store velocities (dynamic topology only).
    pub export_velocities: bool,
    pub indexed_normals: bool,
    pub indexed_uvs: bool,
    pub export_uvs: bool,
    /// Store named face groups with the first sample.
    pub export_face_sets: bool,
    /// Store the undeformed reference pose with the first sample.
    pub export_bind_pose: bool,
    /// The provider hands over world-space data. The encoder does not
    /// transform anything itself.
    pub global_space: bool,
}

impl Default for EncodePolicy {
    fn default() -> Self {
        Self {
            point_cache_only: false,
            dynamic_topology: false,
            export_normals: true,
            export_velocities: false,
            indexed_normals: true,
            indexed_uvs: true,
            export_uvs: true,
            export_face_sets: true,
            export_bind_pose: false,
            global_space: false,
        }
    }
}

impl EncodePolicy {
    /// Positions-only policy.
    pub fn point_cache() -> Self {
        Self {
            point_cache_only: true,
            ..Self::default()
        }
    }

    pub fn with_dynamic_topology(mut self, on: bool) -> Self {
        self.dynamic_topology = on;
        self
    }

    pub fn with_normals(mut self, export: bool, indexed: bool) -> Self {
        self.export_normals = export;
        self.indexed_normals = indexed;
        self
    }

    pub fn with_uvs(mut self, export: bool, indexed: bool) -> Self {
        self.export_uvs = export;
        self.indexed_uvs = indexed;
        self
    }

    pub fn with_velocities(mut self, on: bool) -> Self {
        self.export_velocities = on;
        self
    }

    pub fn with_face_sets(mut self, on: bool) -> Self {
        self.export_face_sets = on;
        self
    }

    pub fn with_bind_pose(mut self, on: bool) -> Self {
        self.export_bind_pose = on;
        self
    }

    pub fn with_global_space(mut self, on: bool) -> Self {
        self.global_space = on;
        self
    }

    /// Parse a policy from JSON. Missing keys keep their defaults.
    #[cfg(feature = "serde")]
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Serialize the policy to pretty JSON.
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Output of one [`encode`] call.
#[derive(Clone, Debug)]
pub struct EncodedSample {
    /// The new sample.
    pub sample: GeometrySample,
    /// Topology signature in effect after this sample.
    pub signature: TopologySignature,
    /// First-sample side properties (first sample only).
    pub side: Option<SideProperties>,
}

/// Encode one snapshot.
///
/// `previous` is the signature returned for the prior sample of the same
/// stream, or `None` if this is the first sample.
pub fn encode(
    snapshot: &MeshSnapshot,
    index: usize,
    previous: Option<&TopologySignature>,
    policy: &EncodePolicy,
) -> Result<EncodedSample> {
    snapshot.validate()?;
    let first = previous.is_none();

    let (positions, self_bounds) = encode_positions(&snapshot.positions);
    let mut sample = GeometrySample {
        index,
        positions,
        self_bounds,
        ..Default::default()
    };

    if policy.point_cache_only {
        let signature = match previous {
            Some(prev) => *prev,
            None => {
                // Explicitly empty topology marks "no surface exported".
                let topo = Topology::default();
                let sig = topo.signature(sample.num_vertices());
                sample.topology = Some(topo);
                sig
            }
        };
        return Ok(EncodedSample {
            sample,
            signature,
            side: first.then(SideProperties::default),
        });
    }

    let write_topology = first || policy.dynamic_topology;
    let lookup = occurrence_lookup(&snapshot.faces);

    if policy.export_normals {
        if let Some(normals) = &snapshot.normals {
            let occ: Vec<Vec3> = lookup.iter().map(|&i| normals[i]).collect();
            sample.normals = if !occ.is_empty() {
                Some(FaceVaryingAttribute::from_occurrences(occ, policy.indexed_normals))
            } else if policy.dynamic_topology {
                trace!("sample {}: no normals, writing marker", index);
                Some(FaceVaryingAttribute::indexed(vec![INVALID_NORMAL], vec![0]))
            } else {
                None
            };
        }
    }

    if policy.dynamic_topology && policy.export_velocities {
        if let Some(vels) = &snapshot.velocities {
            let mut vels = vels.clone();
            if vels.is_empty() {
                vels.push(Vec3::ZERO);
            }
            sample.velocities = Some(vels);
        }
    }

    let signature = if write_topology {
        let topo = encode_topology(&snapshot.faces)?;
        let sig = topo.signature(sample.num_vertices());
        if let Some(prev) = previous {
            if prev.digest != sig.digest {
                debug!(
                    "sample {}: topology changed ({} -> {} faces)",
                    index, prev.num_faces, sig.num_faces
                );
            }
        }
        sample.topology = Some(topo);

        if policy.export_uvs {
            for (set_index, set) in snapshot.uv_sets.iter().enumerate() {
                let occ: Vec<Vec2> = lookup.iter().map(|&i| set.values[i]).collect();
                let attr = FaceVaryingAttribute::from_occurrences(occ, policy.indexed_uvs);
                if set_index == 0 {
                    sample.uvs = Some(attr);
                } else {
                    sample.extra_uvs.push(NamedAttribute {
                        name: format!("uv{}", set_index),
                        attr,
                    });
                }
            }
        }
        sig
    } else {
        let prev = previous.copied().ok_or_else(|| Error::other("missing topology signature"))?;
        if prev.num_vertices != sample.num_vertices() {
            warn!(
                "sample {}: {} vertices against static topology of {}",
                index,
                sample.num_vertices(),
                prev.num_vertices
            );
        }
        prev
    };

    let side = if first {
        Some(encode_side_properties(snapshot, policy)?)
    } else {
        None
    };

    Ok(EncodedSample { sample, signature, side })
}

/// Narrow positions to single precision and bound them.
fn encode_positions(src: &[DVec3]) -> (Vec<Vec3>, BBox3d) {
    let mut bounds = BBox3d::EMPTY;
    let mut positions: Vec<Vec3> = src.iter().map(|p| p.as_vec3()).collect();
    for p in &positions {
        bounds.expand_by_vec3(*p);
    }
    if positions.is_empty() {
        trace!("no vertices, writing marker point");
        bounds.expand_by_point(DVec3::ZERO);
        positions.push(INVALID_POINT);
    }
    (positions, bounds)
}

/// For each stored occurrence, the snapshot occurrence it comes from.
///
/// Stored order reverses the vertices of every face.
fn occurrence_lookup(faces: &[Face]) -> Vec<usize> {
    let mut lookup = Vec::with_capacity(faces.iter().map(|f| f.len()).sum());
    let mut start = 0;
    for face in faces {
        lookup.extend((start..start + face.len()).rev());
        start += face.len();
    }
    lookup
}

/// Build count/index arrays with per-face reversed winding.
fn encode_topology(faces: &[Face]) -> Result<Topology> {
    let to_i32 = |v: usize| i32::try_from(v).map_err(|_| Error::TopologyTooLarge(v));

    let mut face_counts = Vec::with_capacity(faces.len());
    let mut face_indices = Vec::new();
    for face in faces {
        face_counts.push(to_i32(face.len())?);
        for &v in face.iter().rev() {
            face_indices.push(to_i32(v as usize)?);
        }
    }

    if face_indices.is_empty() {
        trace!("no face-vertex indices, writing degenerate topology");
        return Ok(Topology::degenerate());
    }
    Ok(Topology::new(face_counts, face_indices))
}

fn encode_side_properties(snapshot: &MeshSnapshot, policy: &EncodePolicy) -> Result<SideProperties> {
    let mut side = SideProperties::default();

    if policy.export_uvs {
        side.uv_set_names = snapshot.uv_sets.iter().map(|s| s.name.clone()).collect();
        side.uv_options = snapshot
            .uv_sets
            .iter()
            .map(|s| UvOptions {
                wrap_u: s.wrap_u,
                wrap_v: s.wrap_v,
                subdiv_smooth: s.subdiv_smooth,
            })
            .collect();
    }

    if policy.export_face_sets {
        for group in snapshot.face_groups.iter().filter(|g| !g.faces.is_empty()) {
            side.face_sets
                .push(FaceSet::new(group.name.clone(), &group.faces, snapshot.num_faces())?);
        }
    }

    if policy.export_bind_pose {
        if let Some(pose) = &snapshot.bind_pose {
            side.bind_pose = Some(pose.iter().map(|p| p.as_vec3()).collect());
        }
    }

    Ok(side)
}

/// Append-only writer for one mesh stream.
///
/// Only one writer may advance a stream; it owns the sequence until
/// [`finish`](Self::finish).
pub struct MeshWriter {
    sequence: GeometrySampleSequence,
    policy: EncodePolicy,
    signature: Option<TopologySignature>,
}

impl MeshWriter {
    /// Create a writer for a new stream.
    pub fn new(time_sampling: TimeSampling, policy: EncodePolicy) -> Self {
        let dynamic = policy.dynamic_topology && !policy.point_cache_only;
        Self {
            sequence: GeometrySampleSequence::new(time_sampling).with_dynamic_topology(dynamic),
            policy,
            signature: None,
        }
    }

    /// Export options of this stream.
    pub fn policy(&self) -> &EncodePolicy {
        &self.policy
    }

    /// Get number of samples written so far.
    pub fn num_samples(&self) -> usize {
        self.sequence.len()
    }

    /// Topology signature after the last sample.
    pub fn signature(&self) -> Option<&TopologySignature> {
        self.signature.as_ref()
    }

    /// Samples written so far.
    pub fn sequence(&self) -> &GeometrySampleSequence {
        &self.sequence
    }

    /// Encode and append one snapshot.
    pub fn write(&mut self, snapshot: &MeshSnapshot) -> Result<&GeometrySample> {
        let index = self.sequence.len();
        let encoded = encode(snapshot, index, self.signature.as_ref(), &self.policy)?;

        trace!(
            "sample {}: {} points, topology {}",
            index,
            encoded.sample.num_vertices(),
            if encoded.sample.has_topology() { "written" } else { "reused" }
        );

        self.sequence.push(encoded.sample)?;
        if let Some(side) = encoded.side {
            self.sequence.set_side_properties(side);
        }
        self.signature = Some(encoded.signature);
        self.sequence.sample(index)
    }

    /// Pull snapshots from `provider` at each time and write them.
    ///
    /// After the first sample, times are skipped while the provider reports
    /// the source as not animated. Returns the number of samples written.
    pub fn capture<P: SnapshotProvider>(&mut self, provider: &mut P, times: &[Chrono]) -> Result<usize> {
        let mut written = 0;
        for &time in times {
            if !self.sequence.is_empty() && !provider.is_animated() {
                trace!("t={}: source unchanged, skipping", time);
                continue;
            }
            let snapshot = provider.snapshot(time)?;
            self.write(&snapshot)?;
            written += 1;
        }
        debug!("captured {} of {} samples", written, times.len());
        Ok(written)
    }

    /// Finish the stream.
    pub fn finish(self) -> GeometrySampleSequence {
        self.sequence
    }
}
