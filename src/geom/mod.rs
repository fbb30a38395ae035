//! Mesh sample codec.
//!
//! This module provides:
//! - [`ValueIndexer`] - Dedup of face-varying values into values + indices
//! - [`FaceVaryingAttribute`] - Flat or indexed per-occurrence attributes
//! - [`MeshSnapshot`] / [`SnapshotProvider`] / [`PlaybackSink`] - Host seams
//! - [`encode`] / [`MeshWriter`] - Snapshot to stored sample
//! - [`GeometrySample`] / [`GeometrySampleSequence`] - The stored stream
//! - [`MeshReader`] - Stream to geometry at arbitrary times
//! - [`FaceSet`] - Named face groupings

pub mod indexer;
pub mod geom_param;
pub mod snapshot;
pub mod faceset;
pub mod polymesh;
pub mod encoder;
pub mod decoder;

// Re-export indexer types
pub use indexer::{index_values, IndexKey, IndexedValues, ValueIndexer};

// Re-export geom_param types
pub use geom_param::{FaceVaryingAttribute, NamedAttribute, StorageMode};

// Re-export snapshot types
pub use snapshot::{Face, FaceGroup, MeshSnapshot, PlaybackSink, SnapshotProvider, UvSet};

// Re-export faceset types
pub use faceset::{FaceSet, FaceSetExclusivity};

// Re-export polymesh types
pub use polymesh::{
    GeometrySample, GeometrySampleSequence, SideProperties, Topology, TopologySignature, UvOptions,
};

// Re-export codec entry points
pub use encoder::{encode, EncodePolicy, EncodedSample, MeshWriter};
pub use decoder::{
    blend_normals, blend_uvs, reconstruct, reconstruct_positions, reconstruct_topology,
    to_traversal_order, MeshReader, Reconstructed,
};
