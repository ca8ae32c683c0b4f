use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// GPU vendor tag; the set is closed and dispatch is by tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GpuVendor {
    Nvidia,
    Amd,
    Intel,
}

/// One inventoried GPU. Immutable once built; owned by the inventory and
/// read by the stats sampler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GpuDescriptor {
    pub vendor: GpuVendor,
    pub name: String,
    /// Vendor-specific handle: PCI slot for NVIDIA, DRM card name for AMD/Intel.
    pub identifier: String,
    /// Runtime power-state indicator, NVIDIA only.
    pub power_status_path: Option<PathBuf>,
}

/// Backing-media classification of a monitored mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiskType {
    Hdd,
    Ssd,
    Unknown,
}

/// Static hardware inventory, emitted exactly once before the first snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticInventory {
    pub cpu_model: String,
    pub gpu_names: Vec<String>,
    pub gpu_vendors: Vec<GpuVendor>,
    pub disk_types: BTreeMap<String, DiskType>,
    pub gpu_count: usize,
}

/// Wire wrapper for the one-time inventory record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticRecord {
    #[serde(rename = "static")]
    pub inventory: StaticInventory,
}

/// CPU metrics: utilization percentage and package temperature
/// (whole Celsius, or -1 when no sensor is available).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CpuStats {
    pub usage: f64,
    pub temp: i64,
}

/// Memory metrics, all sizes in kilobytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RamStats {
    pub usage: f64,
    pub total: u64,
    pub used: u64,
    pub available: u64,
}

/// Per-mount disk usage percentages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiskStats {
    pub usage: BTreeMap<String, f64>,
}

/// GPU metrics. `usages` and `temps` are positionally aligned with the
/// inventory order established at startup and always have `count` entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GpuStats {
    pub detected: bool,
    pub count: usize,
    pub usages: Vec<f64>,
    pub temps: Vec<i64>,
}

/// One per-tick telemetry snapshot. Transient; emitted and discarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub cpu: CpuStats,
    pub ram: RamStats,
    pub disk: DiskStats,
    pub gpu: GpuStats,
}
