//! Utility types and functions for the cache codec.
//!
//! This module contains fundamental types used throughout the library:
//! - [`Error`] / [`Result`] - Error handling
//! - [`BBox3d`] - Running bounding box
//! - Math type re-exports from glam

mod error;
mod math;

pub use error::*;
pub use math::*;
