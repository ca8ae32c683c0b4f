pub mod cpu;
pub mod disk;
pub mod gpu;
pub mod memory;
pub mod thermal;

pub use cpu::CpuSampler;
pub use disk::DiskUsageSampler;
pub use gpu::{GpuReading, GpuStatsSampler};
pub use memory::MemorySampler;
pub use thermal::ThermalSampler;

use crate::inventory::HardwareInventory;
use crate::model::{CpuStats, DiskStats, GpuStats, Snapshot};

/// Main sampler that coordinates the per-metric samplers against a fixed
/// hardware inventory.
///
/// One call produces one snapshot; every sub-reading degrades locally,
/// so sampling itself never fails.
pub struct TelemetrySampler {
    inventory: HardwareInventory,
    mounts: Vec<String>,
    cpu: CpuSampler,
    thermal: ThermalSampler,
    memory: MemorySampler,
    disk: DiskUsageSampler,
    gpu: GpuStatsSampler,
}

impl TelemetrySampler {
    pub fn new(inventory: HardwareInventory, mounts: Vec<String>) -> Self {
        Self {
            inventory,
            mounts,
            cpu: CpuSampler::new(),
            thermal: ThermalSampler::new(),
            memory: MemorySampler::new(),
            disk: DiskUsageSampler::new(),
            gpu: GpuStatsSampler::new(),
        }
    }

    pub fn inventory(&self) -> &HardwareInventory {
        &self.inventory
    }

    /// Run one sampling pass and assemble the snapshot.
    pub fn sample(&mut self) -> Snapshot {
        let usage = self.cpu.sample();
        let temp = self.thermal.sample();
        let ram = self.memory.sample();
        let disk_usage = self.disk.sample(&self.mounts);
        let GpuReading { usages, temps } = self.gpu.sample(&self.inventory.gpus);

        Snapshot {
            cpu: CpuStats { usage, temp },
            ram,
            disk: DiskStats { usage: disk_usage },
            gpu: GpuStats {
                detected: !self.inventory.gpus.is_empty(),
                count: self.inventory.gpus.len(),
                usages,
                temps,
            },
        }
    }
}
