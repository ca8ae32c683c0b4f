//! One-time hardware discovery: CPU model, GPU enumeration across vendor
//! kernel interfaces, and disk media-type classification.
//!
//! Every detection step degrades locally ("Unknown CPU", an empty GPU
//! list, `DiskType::Unknown`) so the inventory always completes.

use crate::model::{DiskType, GpuDescriptor, GpuVendor, StaticInventory, StaticRecord};
use crate::probe;
use procfs::Current;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

const NVIDIA_PROC_ROOT: &str = "/proc/driver/nvidia/gpus";
const DRM_ROOT: &str = "/sys/class/drm";
const BLOCK_ROOT: &str = "/sys/block";
const PCI_DEVICES_ROOT: &str = "/sys/bus/pci/devices";

const AMD_VENDOR_ID: &str = "0x1002";
const INTEL_VENDOR_ID: &str = "0x8086";

/// Static hardware facts detected once at startup.
#[derive(Debug, Clone)]
pub struct HardwareInventory {
    pub cpu_model: String,
    pub gpus: Vec<GpuDescriptor>,
    pub disk_types: BTreeMap<String, DiskType>,
}

impl HardwareInventory {
    /// Detect CPU model, GPUs, and the media type backing each mount.
    pub fn detect(mounts: &[String]) -> Self {
        Self {
            cpu_model: detect_cpu_model(),
            gpus: detect_gpus(Path::new(NVIDIA_PROC_ROOT), Path::new(DRM_ROOT)),
            disk_types: detect_disk_types(mounts, Path::new(BLOCK_ROOT)),
        }
    }

    pub fn gpu_count(&self) -> usize {
        self.gpus.len()
    }

    /// The one-time inventory record emitted before the sampling loop.
    pub fn to_static_record(&self) -> StaticRecord {
        StaticRecord {
            inventory: StaticInventory {
                cpu_model: self.cpu_model.clone(),
                gpu_names: self.gpus.iter().map(|g| g.name.clone()).collect(),
                gpu_vendors: self.gpus.iter().map(|g| g.vendor).collect(),
                disk_types: self.disk_types.clone(),
                gpu_count: self.gpus.len(),
            },
        }
    }
}

fn detect_cpu_model() -> String {
    procfs::CpuInfo::current()
        .ok()
        .and_then(|info| info.model_name(0).map(normalize_cpu_model))
        .unwrap_or_else(|| "Unknown CPU".to_string())
}

/// Strip marketing noise from a raw `model name` string: the trailing
/// clock annotation ("@ 3.60GHz"), an embedded integrated-GPU clause
/// ("w/ Radeon ..."), and trailing class suffixes ("12-Core Processor").
pub(crate) fn normalize_cpu_model(raw: &str) -> String {
    let mut model = raw.trim().to_string();
    for marker in [" w/ Radeon", " with Radeon", " @"] {
        if let Some(pos) = model.find(marker) {
            model.truncate(pos);
        }
    }

    let mut tokens: Vec<&str> = model.split_whitespace().collect();
    while tokens.last().is_some_and(|last| is_model_suffix(last)) {
        tokens.pop();
    }
    if tokens.is_empty() {
        return "Unknown CPU".to_string();
    }
    tokens.join(" ")
}

fn is_model_suffix(token: &str) -> bool {
    let lower = token.to_ascii_lowercase();
    if matches!(lower.as_str(), "cpu" | "fpu" | "apu" | "processor") {
        return true;
    }
    match lower.strip_suffix("-core") {
        Some(count) => {
            matches!(count, "dual" | "quad" | "six" | "eight" | "ten")
                || (!count.is_empty() && count.bytes().all(|b| b.is_ascii_digit()))
        }
        None => false,
    }
}

/// Enumerate GPUs: NVIDIA entries from the driver's proc tree first, then
/// AMD/Intel DRM cards. Missing roots contribute zero entries.
pub(crate) fn detect_gpus(nvidia_root: &Path, drm_root: &Path) -> Vec<GpuDescriptor> {
    let mut gpus = Vec::new();

    if let Ok(entries) = fs::read_dir(nvidia_root) {
        for entry in entries.flatten() {
            let pci_id = entry.file_name().to_string_lossy().into_owned();
            let info_path = entry.path().join("information");
            if !info_path.exists() {
                continue;
            }
            let mut name = String::from("NVIDIA GPU");
            if let Ok(contents) = fs::read_to_string(&info_path) {
                // Last "Model:" line wins when the driver lists several.
                for line in contents.lines() {
                    if let Some(model) = line.strip_prefix("Model:") {
                        name = model.trim().to_string();
                    }
                }
            }
            let power = Path::new(PCI_DEVICES_ROOT)
                .join(&pci_id)
                .join("power/runtime_status");
            gpus.push(GpuDescriptor {
                vendor: GpuVendor::Nvidia,
                name,
                identifier: pci_id,
                power_status_path: power.exists().then_some(power),
            });
        }
    }

    if let Ok(entries) = fs::read_dir(drm_root) {
        for entry in entries.flatten() {
            let card = entry.file_name().to_string_lossy().into_owned();
            // "card0-HDMI-A-1" and friends are sub-connector nodes.
            if !card.starts_with("card") || card.contains('-') {
                continue;
            }
            let Ok(vendor_id) = probe::read_trimmed(entry.path().join("device/vendor")) else {
                continue;
            };
            let index = card.trim_start_matches("card");
            let tagged = match vendor_id.to_ascii_lowercase().as_str() {
                AMD_VENDOR_ID => Some((GpuVendor::Amd, format!("AMD GPU {index}"))),
                INTEL_VENDOR_ID => Some((GpuVendor::Intel, format!("Intel GPU {index}"))),
                _ => None,
            };
            if let Some((vendor, name)) = tagged {
                gpus.push(GpuDescriptor {
                    vendor,
                    name,
                    identifier: card,
                    power_status_path: None,
                });
            }
        }
    }

    gpus
}

/// Classify each mount's backing device as rotational or solid-state.
/// Any failure leaves that mount as `Unknown` and never affects the rest.
pub(crate) fn detect_disk_types(
    mounts: &[String],
    block_root: &Path,
) -> BTreeMap<String, DiskType> {
    let mount_table = procfs::mounts().ok();
    mounts
        .iter()
        .map(|mount| {
            let class = mount_table
                .as_deref()
                .and_then(|table| device_for_mount(mount, table))
                .and_then(|dev| classify_device(&dev, block_root))
                .unwrap_or(DiskType::Unknown);
            (mount.clone(), class)
        })
        .collect()
}

fn device_for_mount(mount: &str, table: &[procfs::MountEntry]) -> Option<String> {
    table
        .iter()
        .find(|entry| entry.fs_file == mount)
        .and_then(|entry| entry.fs_spec.strip_prefix("/dev/"))
        .map(str::to_string)
}

/// Look up the rotational flag for a device, falling back to its base
/// device when the name refers to a partition.
pub(crate) fn classify_device(dev: &str, block_root: &Path) -> Option<DiskType> {
    for candidate in [dev.to_string(), base_device(dev)] {
        let rotational = block_root.join(&candidate).join("queue/rotational");
        if let Ok(flag) = probe::read_trimmed(&rotational) {
            return Some(if flag == "1" { DiskType::Hdd } else { DiskType::Ssd });
        }
    }
    None
}

/// Strip a partition-number suffix: "sda1" -> "sda", "nvme0n1p2" -> "nvme0n1".
pub(crate) fn base_device(dev: &str) -> String {
    let trimmed = dev.trim_end_matches(|c: char| c.is_ascii_digit());
    if trimmed.len() < dev.len() {
        if let Some(prefix) = trimmed.strip_suffix('p') {
            if prefix.ends_with(|c: char| c.is_ascii_digit()) {
                return prefix.to_string();
            }
        }
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn normalizes_amd_core_count_suffixes() {
        assert_eq!(
            normalize_cpu_model("AMD Ryzen 9 5900X 12-Core Processor"),
            "AMD Ryzen 9 5900X"
        );
    }

    #[test]
    fn normalizes_intel_clock_annotation() {
        assert_eq!(
            normalize_cpu_model("Intel(R) Core(TM) i7-9700K CPU @ 3.60GHz"),
            "Intel(R) Core(TM) i7-9700K"
        );
    }

    #[test]
    fn normalizes_radeon_clause() {
        assert_eq!(
            normalize_cpu_model("AMD Ryzen 7 5800H with Radeon Graphics"),
            "AMD Ryzen 7 5800H"
        );
        assert_eq!(
            normalize_cpu_model("AMD A10-7850K APU w/ Radeon R7 Graphics"),
            "AMD A10-7850K"
        );
    }

    #[test]
    fn normalizes_word_core_counts() {
        assert_eq!(
            normalize_cpu_model("AMD Phenom(tm) II X4 955 Quad-Core Processor"),
            "AMD Phenom(tm) II X4 955"
        );
    }

    #[test]
    fn leaves_clean_models_alone() {
        assert_eq!(normalize_cpu_model("Apple M1"), "Apple M1");
    }

    #[test]
    fn collapses_internal_whitespace() {
        assert_eq!(
            normalize_cpu_model("Intel(R)  Xeon(R)   E5-2680   CPU"),
            "Intel(R) Xeon(R) E5-2680"
        );
    }

    #[test]
    fn base_device_strips_partition_suffixes() {
        assert_eq!(base_device("sda1"), "sda");
        assert_eq!(base_device("sdb12"), "sdb");
        assert_eq!(base_device("nvme0n1p2"), "nvme0n1");
        assert_eq!(base_device("mmcblk0p1"), "mmcblk0");
        assert_eq!(base_device("sda"), "sda");
    }

    #[test]
    fn detects_amd_and_intel_drm_cards() {
        let dir = tempfile::tempdir().unwrap();
        let drm = dir.path().join("drm");
        for (card, vendor) in [("card0", "0x1002"), ("card1", "0x8086"), ("card2", "0x10de")] {
            let device = drm.join(card).join("device");
            fs::create_dir_all(&device).unwrap();
            fs::write(device.join("vendor"), format!("{vendor}\n")).unwrap();
        }
        // Sub-connector nodes and render nodes must be skipped.
        fs::create_dir_all(drm.join("card0-HDMI-A-1")).unwrap();
        fs::create_dir_all(drm.join("renderD128")).unwrap();

        let missing = dir.path().join("no-nvidia");
        let mut gpus = detect_gpus(&missing, &drm);
        gpus.sort_by_key(|g| g.identifier.clone());

        assert_eq!(gpus.len(), 2);
        assert_eq!(gpus[0].vendor, GpuVendor::Amd);
        assert_eq!(gpus[0].name, "AMD GPU 0");
        assert_eq!(gpus[0].identifier, "card0");
        assert!(gpus[0].power_status_path.is_none());
        assert_eq!(gpus[1].vendor, GpuVendor::Intel);
        assert_eq!(gpus[1].name, "Intel GPU 1");
    }

    #[test]
    fn detects_nvidia_gpus_last_model_line_wins() {
        let dir = tempfile::tempdir().unwrap();
        let nvidia = dir.path().join("nvidia");
        let gpu_dir = nvidia.join("0000:01:00.0");
        fs::create_dir_all(&gpu_dir).unwrap();
        fs::write(
            gpu_dir.join("information"),
            "Model: NVIDIA GeForce GTX 1080\nIRQ: 135\nModel: NVIDIA GeForce RTX 3080\n",
        )
        .unwrap();

        let missing = dir.path().join("no-drm");
        let gpus = detect_gpus(&nvidia, &missing);

        assert_eq!(gpus.len(), 1);
        assert_eq!(gpus[0].vendor, GpuVendor::Nvidia);
        assert_eq!(gpus[0].name, "NVIDIA GeForce RTX 3080");
        assert_eq!(gpus[0].identifier, "0000:01:00.0");
    }

    #[test]
    fn missing_gpu_roots_yield_empty_inventory() {
        let dir = tempfile::tempdir().unwrap();
        let gpus = detect_gpus(&dir.path().join("a"), &dir.path().join("b"));
        assert!(gpus.is_empty());
    }

    #[test]
    fn classify_device_reads_rotational_flag() {
        let dir = tempfile::tempdir().unwrap();
        let queue = dir.path().join("sda").join("queue");
        fs::create_dir_all(&queue).unwrap();
        fs::write(queue.join("rotational"), "1\n").unwrap();
        // Partition name resolves through the base device.
        assert_eq!(classify_device("sda1", dir.path()), Some(DiskType::Hdd));

        fs::write(queue.join("rotational"), "0\n").unwrap();
        assert_eq!(classify_device("sda", dir.path()), Some(DiskType::Ssd));

        assert_eq!(classify_device("sdz9", dir.path()), None);
    }

    #[test]
    fn unresolvable_mounts_classify_as_unknown() {
        let dir = tempfile::tempdir().unwrap();
        let mounts = vec!["/definitely/not/a/mount".to_string()];
        let types = detect_disk_types(&mounts, dir.path());
        assert_eq!(types.get("/definitely/not/a/mount"), Some(&DiskType::Unknown));
    }
}
