//! Live mesh snapshots and the capability traits around the codec.
//!
//! The encoder reads a [`MeshSnapshot`] produced by a [`SnapshotProvider`];
//! the reader pushes reconstructed geometry into a [`PlaybackSink`]. Both
//! traits are implemented by host adapters outside this crate.

use smallvec::SmallVec;

use crate::util::{Chrono, DAffine3, DVec3, Error, Result, Vec2, Vec3};

/// Vertex indices of one face, in the host's traversal order.
pub type Face = SmallVec<[u32; 4]>;

/// One named UV set with its per-set options.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UvSet {
    /// Host name of the set.
    pub name: String,
    /// One UV per face-vertex occurrence, in traversal order.
    pub values: Vec<Vec2>,
    /// Texture wraps in U.
    pub wrap_u: bool,
    /// Texture wraps in V.
    pub wrap_v: bool,
    /// UVs are smoothed when the surface is subdivided.
    pub subdiv_smooth: bool,
}

impl UvSet {
    /// Create a set with default (off) options.
    pub fn new(name: impl Into<String>, values: Vec<Vec2>) -> Self {
        Self {
            name: name.into(),
            values,
            ..Default::default()
        }
    }
}

/// A named group of faces (material cluster, selection, ...).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FaceGroup {
    pub name: String,
    pub faces: Vec<u32>,
}

/// Read-only view of a polygon mesh at one time.
///
/// Every per-face-vertex array (normals, UV sets) is aligned with the
/// traversal of `faces`: face 0 vertex 0, face 0 vertex 1, ...
#[derive(Clone, Debug, Default)]
pub struct MeshSnapshot {
    /// Vertex positions.
    pub positions: Vec<DVec3>,
    /// Faces as vertex index lists.
    pub faces: Vec<Face>,
    /// Shading normals, one per face-vertex occurrence (optional).
    pub normals: Option<Vec<Vec3>>,
    /// Named UV sets.
    pub uv_sets: Vec<UvSet>,
    /// Per-vertex velocities in units per second (optional).
    pub velocities: Option<Vec<Vec3>>,
    /// Named face groups.
    pub face_groups: Vec<FaceGroup>,
    /// Undeformed reference positions, present when the mesh is skinned.
    pub bind_pose: Option<Vec<DVec3>>,
}

impl MeshSnapshot {
    /// Create a snapshot from positions and faces.
    pub fn new(positions: Vec<DVec3>, faces: Vec<Face>) -> Self {
        Self {
            positions,
            faces,
            ..Default::default()
        }
    }

    pub fn with_normals(mut self, normals: Vec<Vec3>) -> Self {
        self.normals = Some(normals);
        self
    }

    pub fn with_uv_set(mut self, set: UvSet) -> Self {
        self.uv_sets.push(set);
        self
    }

    pub fn with_velocities(mut self, velocities: Vec<Vec3>) -> Self {
        self.velocities = Some(velocities);
        self
    }

    pub fn with_face_group(mut self, name: impl Into<String>, faces: Vec<u32>) -> Self {
        self.face_groups.push(FaceGroup { name: name.into(), faces });
        self
    }

    pub fn with_bind_pose(mut self, bind_pose: Vec<DVec3>) -> Self {
        self.bind_pose = Some(bind_pose);
        self
    }

    /// Get number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.positions.len()
    }

    /// Get number of faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Total number of face-vertex occurrences.
    pub fn num_face_vertices(&self) -> usize {
        self.faces.iter().map(|f| f.len()).sum()
    }

    /// Check the snapshot invariants the encoder relies on.
    ///
    /// Face-vertex indices must address existing positions; per-occurrence
    /// attributes must cover every occurrence; velocities every vertex.
    pub fn validate(&self) -> Result<()> {
        let count = self.positions.len();
        for (face, verts) in self.faces.iter().enumerate() {
            if let Some(&bad) = verts.iter().find(|&&v| v as usize >= count) {
                return Err(Error::InvalidFaceIndex { face, index: bad as i64, count });
            }
        }

        let occurrences = self.num_face_vertices();
        if let Some(normals) = &self.normals {
            if normals.len() != occurrences {
                return Err(Error::attribute_length("normals", occurrences, normals.len()));
            }
        }
        for set in &self.uv_sets {
            if set.values.len() != occurrences {
                return Err(Error::attribute_length(set.name.clone(), occurrences, set.values.len()));
            }
        }
        if let Some(vels) = &self.velocities {
            if vels.len() != count {
                return Err(Error::attribute_length("velocities", count, vels.len()));
            }
        }
        Ok(())
    }

    /// Map the snapshot into world space.
    ///
    /// Positions take the full transform. Normals and velocities take the
    /// rotation only; normals are renormalized afterwards.
    pub fn to_world_space(&self, xform: &DAffine3) -> Self {
        let (_, rotation, _) = xform.to_scale_rotation_translation();
        let rotate = |v: Vec3| (rotation * v.as_dvec3()).as_vec3();

        Self {
            positions: self.positions.iter().map(|&p| xform.transform_point3(p)).collect(),
            faces: self.faces.clone(),
            normals: self
                .normals
                .as_ref()
                .map(|ns| ns.iter().map(|&n| rotate(n).normalize_or_zero()).collect()),
            uv_sets: self.uv_sets.clone(),
            velocities: self
                .velocities
                .as_ref()
                .map(|vs| vs.iter().map(|&v| rotate(v)).collect()),
            face_groups: self.face_groups.clone(),
            bind_pose: self.bind_pose.clone(),
        }
    }
}

/// Source of live mesh state (the host scene layer).
pub trait SnapshotProvider {
    /// Evaluate the mesh at `time`.
    fn snapshot(&mut self, time: Chrono) -> Result<MeshSnapshot>;

    /// Whether the source can change after its first sample.
    ///
    /// Returning `false` lets a writer skip every sample after the first.
    fn is_animated(&self) -> bool {
        true
    }
}

/// Receiver of reconstructed geometry (the host playback layer).
pub trait PlaybackSink {
    /// Replace vertex positions.
    fn set_positions(&mut self, positions: &[Vec3]);

    /// Replace face layout, in the host's traversal order.
    fn set_topology(&mut self, _faces: &[Face]) {}

    /// Replace face-varying normals, in the host's traversal order.
    fn set_normals(&mut self, _normals: &[Vec3]) {}

    /// Replace one UV set, in the host's traversal order.
    fn set_uvs(&mut self, _set: usize, _uvs: &[Vec2]) {}
}
