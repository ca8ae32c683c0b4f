use crate::model::{GpuDescriptor, GpuVendor};
use crate::probe;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Per-GPU utilization and temperature readings, positionally aligned
/// with the inventory order.
#[derive(Debug, Clone, PartialEq)]
pub struct GpuReading {
    pub usages: Vec<f64>,
    pub temps: Vec<i64>,
}

/// Stateless, vendor-polymorphic GPU stats sampler.
///
/// NVIDIA readings go through the external vendor query tool, gated on
/// the device's runtime power status so a suspended card is never woken
/// by a poll. AMD readings come from the card's DRM device node. Intel
/// exposes neither through this mechanism and always reports defaults.
pub struct GpuStatsSampler {
    drm_root: PathBuf,
    smi_program: String,
    query_timeout: Duration,
}

impl GpuStatsSampler {
    pub fn new() -> Self {
        Self {
            drm_root: PathBuf::from("/sys/class/drm"),
            smi_program: String::from("nvidia-smi"),
            query_timeout: Duration::from_secs(5),
        }
    }

    /// One `(usage, temp)` pair per descriptor, in inventory order.
    /// Every failure degrades to `(0.0, -1)` for that GPU only.
    pub fn sample(&self, gpus: &[GpuDescriptor]) -> GpuReading {
        let mut usages = Vec::with_capacity(gpus.len());
        let mut temps = Vec::with_capacity(gpus.len());
        for gpu in gpus {
            let (usage, temp) = match gpu.vendor {
                GpuVendor::Nvidia => self.sample_nvidia(gpu),
                GpuVendor::Amd => self.sample_amd(gpu),
                GpuVendor::Intel => (0.0, -1),
            };
            usages.push(usage);
            temps.push(temp);
        }
        GpuReading { usages, temps }
    }

    fn sample_nvidia(&self, gpu: &GpuDescriptor) -> (f64, i64) {
        // Querying a runtime-suspended device is slow and would wake it;
        // short-circuit without spawning the query tool.
        if let Some(power_path) = &gpu.power_status_path {
            if !power_status_active(power_path) {
                return (0.0, -1);
            }
        }
        self.query_nvidia_smi(&gpu.identifier).unwrap_or((0.0, -1))
    }

    fn query_nvidia_smi(&self, pci_id: &str) -> Option<(f64, i64)> {
        let out = probe::run_query_tool(
            &self.smi_program,
            &[
                "-i",
                pci_id,
                "--query-gpu=utilization.gpu,temperature.gpu",
                "--format=csv,noheader,nounits",
            ],
            self.query_timeout,
        )
        .ok()?;
        parse_smi_line(&out)
    }

    fn sample_amd(&self, gpu: &GpuDescriptor) -> (f64, i64) {
        let device = self.drm_root.join(&gpu.identifier).join("device");
        // Usage and temperature fail independently of each other.
        let usage = probe::read_trimmed(device.join("gpu_busy_percent"))
            .ok()
            .and_then(|s| s.parse::<f64>().ok())
            .unwrap_or(0.0);
        let temp = amd_hwmon_temp(&device).unwrap_or(-1);
        (usage, temp)
    }
}

impl Default for GpuStatsSampler {
    fn default() -> Self {
        Self::new()
    }
}

/// An unreadable power-status file does not block the query; only an
/// explicit non-"active" state does.
fn power_status_active(path: &Path) -> bool {
    probe::read_trimmed(path).map_or(true, |status| status == "active")
}

fn parse_smi_line(out: &str) -> Option<(f64, i64)> {
    let line = out.lines().next()?;
    let mut fields = line.split(',');
    let usage = fields.next()?.trim().parse::<f64>().ok()?;
    let temp = fields.next()?.trim().parse::<i64>().ok()?;
    Some((usage, temp))
}

fn amd_hwmon_temp(device: &Path) -> Option<i64> {
    let hwmon = fs::read_dir(device.join("hwmon")).ok()?.flatten().next()?;
    let raw = probe::read_i64(hwmon.path().join("temp1_input"))?;
    Some(raw / 1000)
}
