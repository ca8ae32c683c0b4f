use nix::sys::statvfs::statvfs;
use std::collections::BTreeMap;
use std::path::Path;

/// Stateless per-mount disk usage sampler backed by statvfs.
pub struct DiskUsageSampler;

impl DiskUsageSampler {
    pub fn new() -> Self {
        Self
    }

    /// Usage percentage per mount. A mount that cannot be queried, or
    /// reports zero total blocks, contributes 0.0; one mount's failure
    /// never affects the others.
    pub fn sample(&self, mounts: &[String]) -> BTreeMap<String, f64> {
        mounts
            .iter()
            .map(|mount| (mount.clone(), mount_usage(mount)))
            .collect()
    }
}

impl Default for DiskUsageSampler {
    fn default() -> Self {
        Self::new()
    }
}

fn mount_usage(mount: &str) -> f64 {
    match statvfs(Path::new(mount)) {
        Ok(stat) => usage_percent(stat.blocks() as u64, stat.blocks_available() as u64),
        Err(_) => 0.0,
    }
}

/// `100 * (total - available) / total` against the unprivileged-available
/// block count: what a non-root consumer could actually use.
pub(crate) fn usage_percent(total_blocks: u64, available_blocks: u64) -> f64 {
    if total_blocks == 0 {
        return 0.0;
    }
    let used = total_blocks.saturating_sub(available_blocks);
    used as f64 * 100.0 / total_blocks as f64
}
