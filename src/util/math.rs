//! Math type re-exports and cache-specific math utilities.
//!
//! This module re-exports types from `glam` and provides the running
//! bounding box used by the encoder and the bounds read-back path.

// Re-export glam types
pub use glam::{
    // Single precision vectors
    Vec2, Vec3,
    // Double precision vectors
    DVec2, DVec3,
    // Transforms
    DMat3, DAffine3, DQuat,
};

use bytemuck::{Pod, Zeroable};
use std::fmt;

/// Reserved marker stored in place of a point when a snapshot has no vertices.
///
/// Readers must treat a one-element position array holding this value as
/// "no geometry".
pub const INVALID_POINT: Vec3 = Vec3::splat(f32::MAX);

/// Reserved marker stored in place of normals when a dynamic-topology sample
/// has no face-vertex occurrences.
pub const INVALID_NORMAL: Vec3 = Vec3::splat(f32::MAX);

/// 3D bounding box with double precision.
///
/// Starts [`EMPTY`](Self::EMPTY) and only ever grows. An empty box is inverted
/// (min > max) so it stays distinguishable from a degenerate single-point box.
#[doc(alias = "BoundingBoxAccumulator")]
#[derive(Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct BBox3d {
    pub min: DVec3,
    pub max: DVec3,
}

impl BBox3d {
    /// Empty bounding box (inverted, will expand on first point).
    pub const EMPTY: Self = Self {
        min: DVec3::splat(f64::INFINITY),
        max: DVec3::splat(f64::NEG_INFINITY),
    };

    /// Create a new bounding box from min and max points.
    #[inline]
    pub const fn new(min: DVec3, max: DVec3) -> Self {
        Self { min, max }
    }

    /// Create a bounding box from a single point.
    #[inline]
    pub fn from_point(p: DVec3) -> Self {
        Self { min: p, max: p }
    }

    /// Build a box enclosing all points (order does not matter).
    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = DVec3>,
    {
        let mut b = Self::EMPTY;
        for p in points {
            b.expand_by_point(p);
        }
        b
    }

    /// Check if this box is empty (no point was ever added).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Expand this box to include a point.
    #[inline]
    pub fn expand_by_point(&mut self, p: DVec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Expand this box to include a single precision point.
    #[inline]
    pub fn expand_by_vec3(&mut self, p: Vec3) {
        self.expand_by_point(p.as_dvec3());
    }

    /// Expand to include `p`, then grow every side by `padding`.
    #[inline]
    pub fn expand_by_point_padded(&mut self, p: DVec3, padding: f64) {
        self.expand_by_point(p);
        *self = self.padded(padding);
    }

    /// Expand this box to include another box.
    #[inline]
    pub fn expand_by_box(&mut self, other: &Self) {
        if !other.is_empty() {
            self.min = self.min.min(other.min);
            self.max = self.max.max(other.max);
        }
    }

    /// Return a copy grown symmetrically by `amount` on every side.
    ///
    /// Empty boxes stay empty.
    #[inline]
    pub fn padded(&self, amount: f64) -> Self {
        if self.is_empty() {
            return *self;
        }
        Self {
            min: self.min - DVec3::splat(amount),
            max: self.max + DVec3::splat(amount),
        }
    }

    /// Blend two boxes corner by corner.
    pub fn lerp(&self, other: &Self, alpha: f64) -> Self {
        if alpha == 0.0 || other.is_empty() {
            return *self;
        }
        if self.is_empty() {
            return *other;
        }
        Self {
            min: self.min * (1.0 - alpha) + other.min * alpha,
            max: self.max * (1.0 - alpha) + other.max * alpha,
        }
    }

    /// Snap a point onto this box: each component goes to `min` when it is
    /// negative and to `max` otherwise.
    ///
    /// Used to deform a unit proxy cube into the cached bounds.
    #[inline]
    pub fn deform_point(&self, p: DVec3) -> DVec3 {
        DVec3::new(
            if p.x < 0.0 { self.min.x } else { self.max.x },
            if p.y < 0.0 { self.min.y } else { self.max.y },
            if p.z < 0.0 { self.min.z } else { self.max.z },
        )
    }

    /// Get the center of the box.
    #[inline]
    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the size (extents) of the box.
    #[inline]
    pub fn size(&self) -> DVec3 {
        self.max - self.min
    }

    /// Flatten to `[min.x, min.y, min.z, max.x, max.y, max.z]`.
    #[inline]
    pub fn to_array(&self) -> [f64; 6] {
        [self.min.x, self.min.y, self.min.z, self.max.x, self.max.y, self.max.z]
    }
}

impl Default for BBox3d {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Debug for BBox3d {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BBox3d({:?} - {:?})", self.min, self.max)
    }
}

/// Chrono type - time value (seconds).
pub type Chrono = f64;
