use crate::model::RamStats;
use procfs::Current;

/// Stateless memory sampler over the kernel memory-info table.
///
/// "Available" is the kernel's MemAvailable estimate, not the naive
/// "free" figure, which undercounts reclaimable cache.
pub struct MemorySampler;

impl MemorySampler {
    pub fn new() -> Self {
        Self
    }

    /// Usage percentage plus total/used/available in kilobytes.
    /// A failed read degrades to the all-zero tuple.
    pub fn sample(&self) -> RamStats {
        let Ok(meminfo) = procfs::Meminfo::current() else {
            return zero_stats();
        };
        // procfs reports bytes; the wire format is kilobytes.
        derive(meminfo.mem_total / 1024, meminfo.mem_available.unwrap_or(0) / 1024)
    }
}

impl Default for MemorySampler {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn derive(total_kb: u64, available_kb: u64) -> RamStats {
    if total_kb == 0 {
        return zero_stats();
    }
    let used_kb = total_kb.saturating_sub(available_kb);
    RamStats {
        usage: used_kb as f64 * 100.0 / total_kb as f64,
        total: total_kb,
        used: used_kb,
        available: available_kb,
    }
}

fn zero_stats() -> RamStats {
    RamStats {
        usage: 0.0,
        total: 0,
        used: 0,
        available: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_available_is_fifty_percent() {
        let stats = derive(16_000_000, 8_000_000);
        assert_eq!(stats.usage, 50.0);
        assert_eq!(stats.total, 16_000_000);
        assert_eq!(stats.used, 8_000_000);
        assert_eq!(stats.available, 8_000_000);
    }

    #[test]
    fn zero_total_yields_zero_tuple() {
        let stats = derive(0, 0);
        assert_eq!(stats.usage, 0.0);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.used, 0);
        assert_eq!(stats.available, 0);
    }

    #[test]
    fn missing_available_counts_everything_as_used() {
        let stats = derive(4_000_000, 0);
        assert_eq!(stats.usage, 100.0);
        assert_eq!(stats.used, 4_000_000);
    }

    #[test]
    fn live_sample_is_consistent() {
        let stats = MemorySampler::new().sample();
        assert!((0.0..=100.0).contains(&stats.usage));
        assert_eq!(stats.used, stats.total.saturating_sub(stats.available));
    }
}
