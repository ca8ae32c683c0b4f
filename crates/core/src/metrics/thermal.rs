use crate::probe;
use std::fs;
use std::path::{Path, PathBuf};

/// Hwmon driver names that report a CPU package temperature. Anything
/// else (GPU, NVMe, chipset sensors) must not be mistaken for the CPU.
const CPU_SENSOR_NAMES: &[&str] = &[
    "coretemp",
    "k10temp",
    "zenpower",
    "cpu_thermal",
    "x86_pkg_temp",
    "amd_energy",
];

/// Raw millidegree readings outside this band are sensor placeholders or
/// error codes, not temperatures.
const MIN_PLAUSIBLE_MILLIDEG: i64 = 10_000;
const MAX_PLAUSIBLE_MILLIDEG: i64 = 120_000;

/// Stateless CPU temperature sampler over the hwmon device tree.
pub struct ThermalSampler {
    hwmon_root: PathBuf,
}

impl ThermalSampler {
    pub fn new() -> Self {
        Self {
            hwmon_root: PathBuf::from("/sys/class/hwmon"),
        }
    }

    /// CPU package temperature in whole degrees Celsius, or -1 when no
    /// recognized sensor provides a plausible reading.
    pub fn sample(&self) -> i64 {
        let Ok(entries) = fs::read_dir(&self.hwmon_root) else {
            return -1;
        };
        for entry in entries.flatten() {
            let device = entry.path();
            let Ok(name) = probe::read_trimmed(device.join("name")) else {
                continue;
            };
            if !CPU_SENSOR_NAMES.contains(&name.as_str()) {
                continue;
            }
            if let Some(temp) = first_plausible_temp(&device) {
                return temp;
            }
        }
        -1
    }
}

impl Default for ThermalSampler {
    fn default() -> Self {
        Self::new()
    }
}

fn first_plausible_temp(device: &Path) -> Option<i64> {
    for entry in fs::read_dir(device).ok()?.flatten() {
        let file_name = entry.file_name();
        let file_name = file_name.to_string_lossy();
        if !file_name.starts_with("temp") || !file_name.ends_with("_input") {
            continue;
        }
        if let Some(raw) = probe::read_i64(entry.path()) {
            if raw > MIN_PLAUSIBLE_MILLIDEG && raw < MAX_PLAUSIBLE_MILLIDEG {
                return Some(raw / 1000);
            }
        }
    }
    None
}
