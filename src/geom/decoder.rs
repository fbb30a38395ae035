//! Mesh sample decoder and interpolator.
//!
//! Given the two samples that bracket a query time, rebuild point positions,
//! face layout and face-varying attributes at that time. Mismatched data
//! never fails: each case falls back to a defined degraded result.

use rayon::prelude::*;
use smallvec::smallvec;
use tracing::{debug, trace, warn};

use crate::core::{SampleInterp, TopologyVariance};
use crate::util::{BBox3d, Chrono, DVec3, Vec2, Vec3};

use super::geom_param::FaceVaryingAttribute;
use super::polymesh::{GeometrySample, GeometrySampleSequence, Topology};
use super::snapshot::{Face, PlaybackSink};

/// Positions and (optionally) faces rebuilt for one query time.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Reconstructed {
    pub positions: Vec<Vec3>,
    /// `None` when no topology was requested or none is valid for the frame.
    pub faces: Option<Vec<Face>>,
}

/// Rebuild positions between `floor` and `ceil`.
///
/// - `alpha == 0`: floor positions verbatim.
/// - Same point count and fixed topology: linear blend.
/// - Floor velocities covering every point: integrate them over the elapsed
///   wall time `(ceil_time - floor_time) * alpha`.
/// - Otherwise: floor positions unmodified.
pub fn reconstruct_positions(
    floor: &GeometrySample,
    ceil: &GeometrySample,
    interp: &SampleInterp,
    variance: TopologyVariance,
) -> Vec<Vec3> {
    let alpha = interp.alpha;
    if alpha == 0.0 {
        return floor.positions.clone();
    }

    if floor.positions.len() == ceil.positions.len() && variance.is_fixed() {
        let ialpha = 1.0 - alpha;
        return floor
            .positions
            .iter()
            .zip(&ceil.positions)
            .map(|(a, b)| (a.as_dvec3() * ialpha + b.as_dvec3() * alpha).as_vec3())
            .collect();
    }

    if let Some(vels) = floor.velocities.as_ref().filter(|v| v.len() == floor.positions.len()) {
        let dt = interp.elapsed() * alpha;
        trace!("sample {}: velocity extrapolation over {}s", floor.index, dt);
        return floor
            .positions
            .iter()
            .zip(vels)
            .map(|(p, v)| (p.as_dvec3() + v.as_dvec3() * dt).as_vec3())
            .collect();
    }

    debug!(
        "samples {}/{} cannot be blended ({} vs {} points), using floor",
        floor.index,
        ceil.index,
        floor.positions.len(),
        ceil.positions.len()
    );
    floor.positions.clone()
}

/// Rebuild faces from stored topology, undoing the per-face reversal.
///
/// Returns `None` when the frame has no valid topology: a degenerate marker
/// without matching velocities, or count/index arrays that do not agree.
pub fn reconstruct_topology(
    topology: &Topology,
    num_points: usize,
    velocities: Option<&[Vec3]>,
) -> Option<Vec<Face>> {
    if topology.is_empty() {
        return Some(Vec::new());
    }

    if topology.is_degenerate() {
        return match velocities {
            Some(v) if v.len() == num_points => Some(vec![smallvec![0, 0, 0]]),
            _ => None,
        };
    }

    let indices = &topology.face_indices;
    let mut faces = Vec::with_capacity(topology.num_faces());
    let mut offset = 0usize;
    for &count in &topology.face_counts {
        let Ok(count) = usize::try_from(count) else {
            warn!("negative face count {}", count);
            return None;
        };
        let Some(stored) = indices.get(offset..offset + count) else {
            warn!("face counts exceed {} stored indices", indices.len());
            return None;
        };
        let mut face = Face::with_capacity(count);
        for &v in stored.iter().rev() {
            match u32::try_from(v) {
                Ok(v) if (v as usize) < num_points => face.push(v),
                _ => {
                    warn!("face index {} outside {} points", v, num_points);
                    return None;
                }
            }
        }
        faces.push(face);
        offset += count;
    }
    Some(faces)
}

/// Rebuild positions and, when `topology` is given, faces.
pub fn reconstruct(
    floor: &GeometrySample,
    ceil: &GeometrySample,
    interp: &SampleInterp,
    variance: TopologyVariance,
    topology: Option<&Topology>,
) -> Reconstructed {
    let positions = reconstruct_positions(floor, ceil, interp, variance);
    let faces = topology.and_then(|t| {
        reconstruct_topology(t, floor.positions.len(), floor.velocities.as_deref())
    });
    Reconstructed { positions, faces }
}

/// Reorder stored (per-face reversed) occurrences into traversal order.
///
/// Returns `None` when the counts do not cover `stored` exactly.
pub fn to_traversal_order<T: Copy>(stored: &[T], face_counts: &[i32]) -> Option<Vec<T>> {
    let mut out = Vec::with_capacity(stored.len());
    let mut offset = 0usize;
    for &count in face_counts {
        let count = usize::try_from(count).ok()?;
        let face = stored.get(offset..offset + count)?;
        out.extend(face.iter().rev().copied());
        offset += count;
    }
    (offset == stored.len()).then_some(out)
}

/// Blend two per-occurrence normal arrays and renormalize.
///
/// Falls back to `floor` when the occurrence counts differ.
pub fn blend_normals(floor: &[Vec3], ceil: &[Vec3], alpha: f64) -> Vec<Vec3> {
    if alpha == 0.0 || floor.len() != ceil.len() {
        return floor.to_vec();
    }
    let a = alpha as f32;
    floor
        .iter()
        .zip(ceil)
        .map(|(f, c)| f.lerp(*c, a).normalize_or_zero())
        .collect()
}

/// Blend two per-occurrence UV arrays (no renormalization).
///
/// Every output value is computed from the unblended floor value.
pub fn blend_uvs(floor: &[Vec2], ceil: &[Vec2], alpha: f64) -> Vec<Vec2> {
    if alpha == 0.0 || floor.len() != ceil.len() {
        return floor.to_vec();
    }
    let ialpha = 1.0 - alpha;
    floor
        .iter()
        .zip(ceil)
        .map(|(f, c)| (f.as_dvec2() * ialpha + c.as_dvec2() * alpha).as_vec2())
        .collect()
}

/// Read-only view that reconstructs a stream at arbitrary times.
///
/// Readers never mutate the sequence and can be used from many threads.
#[derive(Clone, Copy)]
pub struct MeshReader<'a> {
    sequence: &'a GeometrySampleSequence,
}

impl<'a> MeshReader<'a> {
    /// Wrap a written stream.
    pub fn new(sequence: &'a GeometrySampleSequence) -> Self {
        Self { sequence }
    }

    /// The underlying stream.
    pub fn sequence(&self) -> &'a GeometrySampleSequence {
        self.sequence
    }

    /// Get number of samples.
    pub fn num_samples(&self) -> usize {
        self.sequence.len()
    }

    /// Bracketing samples and blend factor for `time`.
    pub fn interp_at(&self, time: Chrono) -> SampleInterp {
        self.sequence.time_sampling().locate(time, self.sequence.len())
    }

    /// Floor and ceil samples for `time`, if the stream has any.
    pub fn bracket(&self, time: Chrono) -> Option<(&'a GeometrySample, &'a GeometrySample, SampleInterp)> {
        let interp = self.interp_at(time);
        let floor = self.sequence.get(interp.floor_index)?;
        let ceil = self.sequence.get(interp.ceil_index)?;
        Some((floor, ceil, interp))
    }

    /// Positions at `time`. Empty if the stream has no samples.
    pub fn positions_at(&self, time: Chrono) -> Vec<Vec3> {
        match self.bracket(time) {
            Some((floor, ceil, interp)) => {
                reconstruct_positions(floor, ceil, &interp, self.sequence.topology_variance())
            }
            None => Vec::new(),
        }
    }

    /// Positions for many query times, reconstructed in parallel.
    pub fn par_positions_at(&self, times: &[Chrono]) -> Vec<Vec<Vec3>> {
        times.par_iter().map(|&t| self.positions_at(t)).collect()
    }

    /// Faces at `time`, in the host's traversal order.
    pub fn topology_at(&self, time: Chrono) -> Option<Vec<Face>> {
        let (floor, _, interp) = self.bracket(time)?;
        let topology = self.sequence.topology_for(interp.floor_index)?;
        reconstruct_topology(topology, floor.positions.len(), floor.velocities.as_deref())
    }

    /// Positions and faces at `time`.
    pub fn reconstruct_at(&self, time: Chrono) -> Option<Reconstructed> {
        let (floor, ceil, interp) = self.bracket(time)?;
        Some(reconstruct(
            floor,
            ceil,
            &interp,
            self.sequence.topology_variance(),
            self.sequence.topology_for(interp.floor_index),
        ))
    }

    /// Normals at `time`, in the host's traversal order.
    pub fn normals_at(&self, time: Chrono) -> Option<Vec<Vec3>> {
        self.face_varying_at(time, |s| s.normals.as_ref(), blend_normals)
    }

    /// UV set `set` at `time` (0 = primary), in the host's traversal order.
    pub fn uvs_at(&self, time: Chrono, set: usize) -> Option<Vec<Vec2>> {
        self.face_varying_at(time, |s| s.uv_set(set), blend_uvs)
    }

    /// Number of UV sets stored in the stream.
    pub fn num_uv_sets(&self) -> usize {
        match self.sequence.iter().find(|s| s.uvs.is_some()) {
            Some(s) => 1 + s.extra_uvs.len(),
            None => 0,
        }
    }

    /// Self bounds at `time`, blended between floor and ceil.
    pub fn bounds_at(&self, time: Chrono) -> BBox3d {
        match self.bracket(time) {
            Some((floor, ceil, interp)) if interp.alpha > 0.0 => {
                floor.self_bounds.lerp(&ceil.self_bounds, interp.alpha)
            }
            Some((floor, _, _)) => floor.self_bounds,
            None => BBox3d::EMPTY,
        }
    }

    /// Snap `points` onto the bounds at `time`, grown by `padding`.
    pub fn deform_to_bounds(&self, time: Chrono, padding: f64, points: &[DVec3]) -> Vec<DVec3> {
        let bounds = self.bounds_at(time).padded(padding);
        points.iter().map(|&p| bounds.deform_point(p)).collect()
    }

    /// Push the frame at `time` into `sink`.
    ///
    /// Returns `false` without touching the sink when the stream is empty or,
    /// for dynamic topology, when the frame has no valid topology.
    pub fn play<S: PlaybackSink + ?Sized>(&self, time: Chrono, sink: &mut S) -> bool {
        let Some(frame) = self.reconstruct_at(time) else {
            return false;
        };
        if self.sequence.is_dynamic_topology() && frame.faces.is_none() {
            debug!("t={}: no valid topology, frame skipped", time);
            return false;
        }

        sink.set_positions(&frame.positions);
        // Point caches carry an empty topology; the host keeps its own faces.
        if let Some(faces) = frame.faces.as_ref().filter(|f| !f.is_empty()) {
            sink.set_topology(faces);
        }
        if let Some(normals) = self.normals_at(time) {
            sink.set_normals(&normals);
        }
        for set in 0..self.num_uv_sets() {
            if let Some(uvs) = self.uvs_at(time, set) {
                sink.set_uvs(set, &uvs);
            }
        }
        true
    }

    /// Most recent sample at or before `index` carrying the attribute.
    fn latest<T: 'a>(
        &self,
        index: usize,
        pick: impl Fn(&'a GeometrySample) -> Option<&'a T>,
    ) -> Option<(usize, &'a T)> {
        (0..=index)
            .rev()
            .filter_map(|i| self.sequence.get(i))
            .find_map(|s| pick(s).map(|a| (s.index, a)))
    }

    /// Sample carrying the attribute for `index`.
    ///
    /// Static streams store UVs only with topology, so the lookup walks back.
    /// Dynamic streams rewrite every attribute per sample: a sample without
    /// the attribute has none.
    fn resolve<T: 'a>(
        &self,
        index: usize,
        pick: impl Fn(&'a GeometrySample) -> Option<&'a T>,
    ) -> Option<(usize, &'a T)> {
        if self.sequence.is_dynamic_topology() {
            let s = self.sequence.get(index)?;
            pick(s).map(|a| (s.index, a))
        } else {
            self.latest(index, pick)
        }
    }

    fn face_varying_at<T: Copy + Default + 'a>(
        &self,
        time: Chrono,
        pick: impl Fn(&'a GeometrySample) -> Option<&'a FaceVaryingAttribute<T>>,
        blend: impl Fn(&[T], &[T], f64) -> Vec<T>,
    ) -> Option<Vec<T>> {
        let interp = self.interp_at(time);
        let (floor_at, floor_attr) = self.resolve(interp.floor_index, &pick)?;
        let mut values = floor_attr.expand();

        if interp.alpha != 0.0 {
            if let Some((ceil_at, ceil_attr)) = self.resolve(interp.ceil_index, &pick) {
                if ceil_at != floor_at {
                    values = blend(&values, &ceil_attr.expand(), interp.alpha);
                }
            }
        }

        let topology = self.sequence.topology_for(floor_at)?;
        to_traversal_order(&values, &topology.face_counts)
    }
}
