//! Time sampling types and bracketing-sample lookup.
//!
//! A cached mesh stream is sampled over time. [`TimeSampling`] describes when
//! each sample was recorded, and [`locate`] finds the two samples that bracket
//! a query time together with the blend factor between them.

use super::sample::SampleInterp;
use crate::util::Chrono;

/// Type of time sampling.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum TimeSamplingType {
    /// Single static sample at time 0 (identity sampling).
    #[default]
    Identity,

    /// Uniform sampling: samples at regular intervals.
    /// start_time + index * time_per_cycle
    Uniform {
        time_per_cycle: Chrono,
        start_time: Chrono,
    },

    /// Cyclic sampling: repeating pattern of sample times.
    Cyclic {
        time_per_cycle: Chrono,
        times: Vec<Chrono>,
    },

    /// Acyclic sampling: explicit time for each sample.
    Acyclic {
        times: Vec<Chrono>,
    },
}

/// Time sampling information for a sample stream.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TimeSampling {
    /// The type of sampling.
    pub sampling_type: TimeSamplingType,
}

impl TimeSampling {
    /// Identity time sampling (single sample at time 0).
    pub const IDENTITY: Self = Self {
        sampling_type: TimeSamplingType::Identity,
    };

    /// Create uniform time sampling.
    pub fn uniform(time_per_cycle: Chrono, start_time: Chrono) -> Self {
        Self {
            sampling_type: TimeSamplingType::Uniform {
                time_per_cycle,
                start_time,
            },
        }
    }

    /// Create acyclic time sampling from explicit, ascending times.
    pub fn acyclic(times: Vec<Chrono>) -> Self {
        Self {
            sampling_type: TimeSamplingType::Acyclic { times },
        }
    }

    /// Create cyclic time sampling.
    pub fn cyclic(time_per_cycle: Chrono, times: Vec<Chrono>) -> Self {
        Self {
            sampling_type: TimeSamplingType::Cyclic {
                time_per_cycle,
                times,
            },
        }
    }

    /// Get the time for a specific sample index.
    pub fn sample_time(&self, index: usize) -> Chrono {
        match &self.sampling_type {
            TimeSamplingType::Identity => 0.0,
            TimeSamplingType::Uniform { time_per_cycle, start_time } => {
                *start_time + (index as Chrono) * *time_per_cycle
            }
            TimeSamplingType::Cyclic { time_per_cycle, times } => {
                if times.is_empty() {
                    return 0.0;
                }
                let cycle = index / times.len();
                let local_idx = index % times.len();
                times[local_idx] + (cycle as Chrono) * *time_per_cycle
            }
            TimeSamplingType::Acyclic { times } => {
                match times.get(index) {
                    Some(t) => *t,
                    // Past the explicit list: hold the last time.
                    None => times.last().copied().unwrap_or(0.0),
                }
            }
        }
    }

    /// Number of samples this sampling can address, capped at `num_samples`.
    fn addressable(&self, num_samples: usize) -> usize {
        match &self.sampling_type {
            TimeSamplingType::Identity => num_samples.min(1),
            TimeSamplingType::Acyclic { times } => num_samples.min(times.len()),
            TimeSamplingType::Cyclic { times, .. } if times.is_empty() => num_samples.min(1),
            _ => num_samples,
        }
    }

    /// Find the floor index (largest index with time <= given time).
    pub fn floor_index(&self, time: Chrono, num_samples: usize) -> (usize, Chrono) {
        let n = self.addressable(num_samples);
        if n == 0 {
            return (0, 0.0);
        }
        let idx = partition_point(n, |i| self.sample_time(i) <= time).saturating_sub(1);
        (idx, self.sample_time(idx))
    }

    /// Find the bracketing samples and blend factor for `time`.
    pub fn locate(&self, time: Chrono, num_samples: usize) -> SampleInterp {
        let n = self.addressable(num_samples);
        locate_by(time, n, |i| self.sample_time(i))
    }
}

/// Locate the bracketing samples for `time` in an explicit ascending time list.
///
/// Only the first `sample_count` entries of `times` are considered.
pub fn locate(time: Chrono, times: &[Chrono], sample_count: usize) -> SampleInterp {
    let n = sample_count.min(times.len());
    locate_by(time, n, |i| times[i])
}

/// Shared bracketing search over `n` ascending sample times.
fn locate_by(time: Chrono, n: usize, sample_time: impl Fn(usize) -> Chrono) -> SampleInterp {
    if n <= 1 {
        let t = if n == 1 { sample_time(0) } else { 0.0 };
        return SampleInterp::exact(0, t);
    }

    let last = n - 1;
    let first_time = sample_time(0);
    // NaN compares false against every sample time; pin it to the first.
    if time.is_nan() || time <= first_time {
        return SampleInterp::exact(0, first_time);
    }
    let last_time = sample_time(last);
    if time >= last_time {
        return SampleInterp::exact(last, last_time);
    }

    // first_time < time < last_time, so 1 <= upper <= last.
    let upper = partition_point(n, |i| sample_time(i) <= time);
    let floor = upper - 1;
    let floor_time = sample_time(floor);
    if floor_time == time {
        return SampleInterp::exact(floor, floor_time);
    }

    let ceil = upper;
    let ceil_time = sample_time(ceil);
    let span = ceil_time - floor_time;
    let alpha = if span > 0.0 { (time - floor_time) / span } else { 0.0 };
    SampleInterp::lerp(floor, ceil, alpha, floor_time, ceil_time)
}

/// Index of the first sample for which `pred` is false (pred must be monotonic).
fn partition_point(n: usize, pred: impl Fn(usize) -> bool) -> usize {
    let mut lo = 0;
    let mut hi = n;
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if pred(mid) {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    lo
}
