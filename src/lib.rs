//! # Geocache
//!
//! Time-sampled polygon mesh cache codec.
//!
//! A host scene hands the encoder a [`MeshSnapshot`](geom::MeshSnapshot) per
//! frame; the encoder stores positions, topology and face-varying attributes
//! in a compact indexed layout. The reader reconstructs geometry at any
//! query time by blending the two bracketing samples, or by integrating
//! velocities when the samples cannot be blended point for point.
//!
//! ## Modules
//!
//! - [`util`] - Basic types (math, bounds, errors)
//! - [`core`] - Time sampling, sample lookup and digests
//! - [`geom`] - Mesh encoder, decoder and stored sample layout
//!
//! ## Example
//!
//! ```ignore
//! use geocache::prelude::*;
//!
//! let mut writer = MeshWriter::new(TimeSampling::uniform(1.0 / 24.0, 0.0), EncodePolicy::default());
//! writer.capture(&mut scene_mesh, &[0.0, 1.0 / 24.0])?;
//! let stream = writer.finish();
//!
//! let reader = MeshReader::new(&stream);
//! let points = reader.positions_at(0.5 / 24.0);
//! ```

pub mod util;
pub mod core;
pub mod geom;

// Re-export commonly used types
pub use util::{BBox3d, Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{BBox3d, Chrono, Error, Result};
    pub use crate::core::{locate, SampleInterp, TimeSampling, TopologyVariance};
    pub use crate::geom::*;
}
