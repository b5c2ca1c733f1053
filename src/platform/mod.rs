//! Platform memory and core collection
//!
//! One [`HostCollector`] per data source:
//! - Linux: `sysinfo(2)`, `sysconf`, `/proc/cpuinfo`
//! - Windows: `GetSystemInfo`, registry `~MHz`, `GlobalMemoryStatusEx`
//! - Anywhere: the sysinfo crate ([`PortableHost`]), used natively on other hosts
//!
//! [`NativeHost`] names the collector selected for the build target.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::Result;

#[cfg(target_os = "linux")]
mod linux;
mod portable;
#[cfg(target_os = "windows")]
mod windows;

#[cfg(target_os = "linux")]
pub use linux::{parse_cpu_mhz, LinuxHost};
pub use portable::PortableHost;
#[cfg(target_os = "windows")]
pub use windows::WindowsHost;

#[cfg(target_os = "linux")]
pub type NativeHost = LinuxHost;
#[cfg(target_os = "windows")]
pub type NativeHost = WindowsHost;
#[cfg(not(any(target_os = "linux", target_os = "windows")))]
pub type NativeHost = PortableHost;

/// Core, clock and memory figures read from the host
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HostStats {
    pub core_count: u32,
    /// `None` when the source had no recognizable frequency entry
    pub cpu_frequency_mhz: Option<u32>,
    pub ram_total_kb: u64,
    pub ram_free_kb: u64,
    pub ram_usage_percent: u32,
}

/// Reads core count, clock frequency and physical memory from the host
pub trait HostCollector {
    fn read(&self) -> Result<HostStats>;
}

impl<T: HostCollector + ?Sized> HostCollector for &T {
    fn read(&self) -> Result<HostStats> {
        (**self).read()
    }
}

/// Locations of the platform diagnostic sources
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sources {
    /// Text file scanned for the first `cpu MHz` line (Linux)
    pub cpuinfo_path: PathBuf,
    /// Key under HKEY_LOCAL_MACHINE describing the first logical processor (Windows)
    pub registry_key: String,
    /// DWORD value under `registry_key` holding the clock in MHz (Windows)
    pub frequency_value: String,
}

impl Default for Sources {
    fn default() -> Self {
        Self {
            cpuinfo_path: PathBuf::from("/proc/cpuinfo"),
            registry_key: "HARDWARE\\DESCRIPTION\\System\\CentralProcessor\\0".to_string(),
            frequency_value: "~MHz".to_string(),
        }
    }
}

/// Percentage of physical memory in use, rounded and clamped to 0..=100
pub fn usage_percent(total_kb: u64, free_kb: u64) -> u32 {
    if total_kb == 0 {
        return 0;
    }

    let used = 1.0 - (free_kb as f64 / total_kb as f64);
    (used * 100.0).round().clamp(0.0, 100.0) as u32
}
