use procfs::{CpuTime, CurrentSI};

/// Aggregate cumulative tick counters from the kernel's CPU stat line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CpuTicks {
    pub total: u64,
    pub idle: u64,
}

impl CpuTicks {
    fn from_cpu_time(t: &CpuTime) -> Self {
        let idle = t.idle + t.iowait.unwrap_or(0);
        let total = t.user
            + t.nice
            + t.system
            + t.idle
            + t.iowait.unwrap_or(0)
            + t.irq.unwrap_or(0)
            + t.softirq.unwrap_or(0)
            + t.steal.unwrap_or(0)
            + t.guest.unwrap_or(0)
            + t.guest_nice.unwrap_or(0);
        Self { total, idle }
    }
}

/// Stateful CPU utilization sampler.
///
/// The kernel exposes monotonic cumulative tick counters, so a single
/// reading carries no rate information; utilization is derived from the
/// delta against the previous call's counters.
pub struct CpuSampler {
    prev: Option<CpuTicks>,
}

impl CpuSampler {
    pub fn new() -> Self {
        Self { prev: None }
    }

    /// Instantaneous CPU utilization in [0, 100].
    ///
    /// The first call establishes the baseline and returns 0.0. A failed
    /// read returns 0.0 without touching state, so the next successful
    /// read still diffs against the last good counters.
    pub fn sample(&mut self) -> f64 {
        let Ok(stats) = procfs::KernelStats::current() else {
            return 0.0;
        };
        let cur = CpuTicks::from_cpu_time(&stats.total);
        let usage = match self.prev {
            Some(prev) => utilization_between(prev, cur),
            None => 0.0,
        };
        self.prev = Some(cur);
        usage
    }
}

impl Default for CpuSampler {
    fn default() -> Self {
        Self::new()
    }
}

/// `100 * (Δtotal - Δidle) / Δtotal`, clamped to [0, 100].
/// Δtotal == 0 means no kernel tick elapsed between readings.
pub(crate) fn utilization_between(prev: CpuTicks, cur: CpuTicks) -> f64 {
    let d_total = cur.total.saturating_sub(prev.total);
    if d_total == 0 {
        return 0.0;
    }
    let d_idle = cur.idle.saturating_sub(prev.idle);
    let busy = d_total.saturating_sub(d_idle);
    (busy as f64 * 100.0 / d_total as f64).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticks(total: u64, idle: u64) -> CpuTicks {
        CpuTicks { total, idle }
    }

    #[test]
    fn utilization_matches_delta_formula() {
        // 1000 total ticks elapsed, 250 of them idle -> 75% busy.
        assert_eq!(
            utilization_between(ticks(5000, 2000), ticks(6000, 2250)),
            75.0
        );
    }

    #[test]
    fn fully_idle_interval_is_zero() {
        assert_eq!(
            utilization_between(ticks(1000, 400), ticks(2000, 1400)),
            0.0
        );
    }

    #[test]
    fn fully_busy_interval_is_one_hundred() {
        assert_eq!(
            utilization_between(ticks(1000, 400), ticks(2000, 400)),
            100.0
        );
    }

    #[test]
    fn zero_total_delta_is_zero_not_a_fault() {
        assert_eq!(utilization_between(ticks(5000, 2000), ticks(5000, 2000)), 0.0);
    }

    #[test]
    fn counter_regression_clamps_instead_of_underflowing() {
        // Idle advancing faster than total should clamp to 0, not wrap.
        assert_eq!(
            utilization_between(ticks(1000, 100), ticks(1100, 900)),
            0.0
        );
    }

    #[test]
    fn utilization_stays_in_range() {
        for (t0, i0, t1, i1) in [
            (0u64, 0u64, 1u64, 0u64),
            (100, 50, 200, 150),
            (100, 50, 1_000_000, 999_999),
            (7, 3, 7, 3),
        ] {
            let u = utilization_between(ticks(t0, i0), ticks(t1, i1));
            assert!((0.0..=100.0).contains(&u), "u = {u}");
        }
    }

    #[test]
    fn first_sample_is_zero_regardless_of_absolute_counters() {
        let mut sampler = CpuSampler::new();
        assert_eq!(sampler.sample(), 0.0);
    }
}
