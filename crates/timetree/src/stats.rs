//! Aggregate runtime statistics.
//!
//! A [`Stats`] value is cached on every node of the profile tree. Leaves fold
//! samples into it, composite nodes sum their children. Validity of the cache is
//! tracked by the owning node, not here.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::sample::Sample;

/// Aggregated statistics of one profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    /// Sum of all sample durations.
    pub total_time: Duration,
    /// Total time corrected by the concurrency divisor.
    pub effective_time: Duration,
    /// Effective time per sample.
    pub mean_time: Duration,
    /// Number of recorded samples.
    pub samples: u64,
    /// Share of the parent's effective time.
    pub timeslice: f64,
    /// Share of the parent's sample count.
    pub taken: f64,
}

impl Stats {
    /// Fold one sample into a memoryless leaf aggregate.
    ///
    /// Effective time is rederived as `total / min(samples, threads)` on every
    /// call instead of accumulating `duration / threads` per sample.
    pub(crate) fn record(&mut self, duration: Duration, threads: usize) {
        self.samples += 1;
        self.total_time = self.total_time.saturating_add(duration);
        self.effective_time = effective_time(self.total_time, self.samples, threads);
        self.mean_time = div_duration(self.effective_time, self.samples);
    }

    /// Rebuild a leaf aggregate from its retained samples.
    ///
    /// Shares are left untouched; they belong to the parent's update.
    pub(crate) fn recompute_from_samples(&mut self, samples: &[Sample], threads: usize) {
        self.samples = samples.len() as u64;
        self.total_time = samples
            .iter()
            .fold(Duration::ZERO, |acc, s| acc.saturating_add(s.duration()));
        self.effective_time = effective_time(self.total_time, self.samples, threads);
        self.mean_time = div_duration(self.effective_time, self.samples);
    }

    /// Rebuild a composite aggregate as the sum of its children.
    pub(crate) fn recompute_from_children<'a>(
        &mut self,
        children: impl IntoIterator<Item = &'a Self>,
    ) {
        self.total_time = Duration::ZERO;
        self.effective_time = Duration::ZERO;
        self.samples = 0;

        for child in children {
            self.total_time = self.total_time.saturating_add(child.total_time);
            self.effective_time = self.effective_time.saturating_add(child.effective_time);
            self.samples += child.samples;
        }

        self.mean_time = div_duration(self.effective_time, self.samples);
    }

    /// Set this node's shares relative to its parent's aggregate.
    pub(crate) fn set_shares(&mut self, parent: &Self) {
        self.timeslice = ratio(
            self.effective_time.as_secs_f64(),
            parent.effective_time.as_secs_f64(),
        );
        self.taken = ratio(self.samples as f64, parent.samples as f64);
    }
}

/// `total / min(samples, threads)`, zero when there are no samples.
fn effective_time(total: Duration, samples: u64, threads: usize) -> Duration {
    let threads = threads.max(1) as u64;
    div_duration(total, samples.min(threads))
}

/// Divide a duration by an integer, yielding zero for a zero divisor.
pub(crate) fn div_duration(duration: Duration, by: u64) -> Duration {
    if by == 0 {
        return Duration::ZERO;
    }
    let nanos = duration.as_nanos() / u128::from(by);
    Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
}

/// `num / den`, yielding zero instead of NaN or infinity for a zero divisor.
pub(crate) fn ratio(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn record_single_thread() {
        let mut stats = Stats::default();
        for d in [10, 20, 30] {
            stats.record(ms(d), 1);
        }

        assert_eq!(stats.samples, 3);
        assert_eq!(stats.total_time, ms(60));
        assert_eq!(stats.effective_time, ms(60));
        assert_eq!(stats.mean_time, ms(20));
    }

    #[test]
    fn record_divides_by_min_of_samples_and_threads() {
        let mut stats = Stats::default();

        stats.record(ms(40), 4);
        // One sample cannot have run in parallel with anything.
        assert_eq!(stats.effective_time, ms(40));

        stats.record(ms(40), 4);
        assert_eq!(stats.effective_time, ms(40));

        for _ in 0..6 {
            stats.record(ms(40), 4);
        }
        assert_eq!(stats.total_time, ms(320));
        assert_eq!(stats.effective_time, ms(80));
        assert_eq!(stats.mean_time, ms(10));
    }

    #[test]
    fn recompute_matches_incremental() {
        let samples: Vec<Sample> = [5, 15, 25, 35, 45]
            .into_iter()
            .map(|d| Sample::from_duration(ms(d)))
            .collect();

        let mut incremental = Stats::default();
        for s in &samples {
            incremental.record(s.duration(), 3);
        }

        let mut full = Stats::default();
        full.recompute_from_samples(&samples, 3);

        assert_eq!(full, incremental);
    }

    #[test]
    fn empty_samples_yield_zeroes() {
        let mut stats = Stats::default();
        stats.recompute_from_samples(&[], 2);

        assert_eq!(stats.samples, 0);
        assert_eq!(stats.effective_time, Duration::ZERO);
        assert_eq!(stats.mean_time, Duration::ZERO);
    }

    #[test]
    fn children_sum_and_shares() {
        let mut x = Stats::default();
        for d in [10, 20, 30] {
            x.record(ms(d), 1);
        }
        let mut y = Stats::default();
        y.record(ms(60), 1);

        let mut parent = Stats::default();
        parent.recompute_from_children([&x, &y]);

        assert_eq!(parent.total_time, ms(120));
        assert_eq!(parent.effective_time, ms(120));
        assert_eq!(parent.samples, 4);
        assert_eq!(parent.mean_time, ms(30));

        x.set_shares(&parent);
        y.set_shares(&parent);
        assert_relative_eq!(x.timeslice, 0.5);
        assert_relative_eq!(y.timeslice, 0.5);
        assert_relative_eq!(x.taken, 0.75);
        assert_relative_eq!(y.taken, 0.25);
    }

    #[test]
    fn shares_of_empty_parent_are_zero() {
        let mut child = Stats::default();
        child.set_shares(&Stats::default());

        assert_eq!(child.timeslice, 0.0);
        assert_eq!(child.taken, 0.0);
    }
}
