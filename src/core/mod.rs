//! Core layer - time lookup and fundamental sample types.
//!
//! This module provides:
//! - [`TimeSampling`] - When each sample of a stream was recorded
//! - [`locate`] - Bracketing-sample lookup for a query time
//! - [`SampleInterp`] - Floor/ceil indices and blend factor
//! - [`GeometryScope`] / [`TopologyVariance`] - Stream classification
//! - [`compute_digest_parts`] - Content digests for topology signatures

mod time_sampling;
mod sample;
mod digest;

pub use time_sampling::{locate, TimeSampling, TimeSamplingType};
pub use sample::{GeometryScope, SampleInterp, TopologyVariance};
pub use digest::{compute_digest_parts, SampleDigest};
