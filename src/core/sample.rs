//! Sample selection and stream classification types.

use crate::util::Chrono;

/// Result of a bracketing-sample query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SampleInterp {
    /// Floor sample index.
    pub floor_index: usize,
    /// Ceil sample index.
    pub ceil_index: usize,
    /// Interpolation factor (0.0 = floor, 1.0 = ceil).
    pub alpha: f64,
    /// Time of the floor sample.
    pub floor_time: Chrono,
    /// Time of the ceil sample.
    pub ceil_time: Chrono,
}

impl SampleInterp {
    /// Create for exact sample (no interpolation needed).
    pub fn exact(index: usize, time: Chrono) -> Self {
        Self {
            floor_index: index,
            ceil_index: index,
            alpha: 0.0,
            floor_time: time,
            ceil_time: time,
        }
    }

    /// Create for interpolation between two samples.
    pub fn lerp(floor: usize, ceil: usize, alpha: f64, floor_time: Chrono, ceil_time: Chrono) -> Self {
        Self {
            floor_index: floor,
            ceil_index: ceil,
            alpha: alpha.clamp(0.0, 1.0),
            floor_time,
            ceil_time,
        }
    }

    /// Check if this is an exact sample (no interpolation).
    pub fn is_exact(&self) -> bool {
        self.floor_index == self.ceil_index || self.alpha == 0.0
    }

    /// Wall time between the two bracketing samples.
    pub fn elapsed(&self) -> Chrono {
        self.ceil_time - self.floor_time
    }
}

/// Scope/extent of data in a geometry attribute.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum GeometryScope {
    /// Constant for entire object.
    Constant,
    /// Per-face.
    Uniform,
    /// Per-vertex.
    Varying,
    /// Per-vertex.
    Vertex,
    /// Per-face-vertex occurrence.
    #[default]
    FaceVarying,
}

/// Topology variance of a sample stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TopologyVariance {
    /// Topology is rewritten every sample and may change.
    Heterogeneous,
    /// Topology is constant, only positions change.
    Homogeneous,
    /// Completely static (single sample).
    #[default]
    Static,
}

impl TopologyVariance {
    /// Whether point correspondence between samples can be assumed.
    #[inline]
    pub fn is_fixed(&self) -> bool {
        !matches!(self, Self::Heterogeneous)
    }
}
