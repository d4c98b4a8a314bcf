//! Running summary of timer durations for one scope
//!
//! The variance is maintained with Welford's online update: a running mean and
//! the sum of squared deviations from it (`m2`). Each update touches only the
//! new duration, so the raw samples are never revisited and no large squared
//! sums are formed.

#![allow(clippy::cast_precision_loss)]

/// Count, extremes and variance of the durations seen for one scope
///
/// A scope that was never observed reports all zeros.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScopeStats {
    pub count: u64,
    /// Sum of all durations, saturating at `u64::MAX`
    pub total_time_ns: u64,
    pub min_ns: u64,
    pub max_ns: u64,
    /// Population variance (`m2 / count`)
    pub variance_ns: f64,

    mean_ns: f64,
    m2: f64,
}

impl ScopeStats {
    /// Fold one duration into the summary
    pub fn update(&mut self, duration_ns: u64) {
        if self.count == 0 {
            self.min_ns = duration_ns;
            self.max_ns = duration_ns;
        } else {
            self.min_ns = self.min_ns.min(duration_ns);
            self.max_ns = self.max_ns.max(duration_ns);
        }
        self.count += 1;
        self.total_time_ns = self.total_time_ns.saturating_add(duration_ns);

        let value = duration_ns as f64;
        let delta = value - self.mean_ns;
        self.mean_ns += delta / self.count as f64;
        self.m2 += delta * (value - self.mean_ns);
        self.variance_ns = (self.m2 / self.count as f64).max(0.0);
    }

    #[must_use]
    pub fn mean_ns(&self) -> f64 {
        self.mean_ns
    }

    #[must_use]
    pub fn std_dev_ns(&self) -> f64 {
        self.variance_ns.sqrt()
    }
}
