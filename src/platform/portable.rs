//! Cross-platform collector using the sysinfo crate

use std::io;
use sysinfo::System;
use tracing::{debug, warn};

use super::{usage_percent, HostCollector, HostStats, Sources};
use crate::error::{Error, Result};

/// Host collector for targets without a dedicated variant
#[derive(Debug, Clone, Copy, Default)]
pub struct PortableHost;

impl PortableHost {
    pub fn new() -> Self {
        PortableHost
    }

    pub fn from_sources(_sources: &Sources) -> Self {
        PortableHost
    }
}

impl HostCollector for PortableHost {
    fn read(&self) -> Result<HostStats> {
        let mut sys = System::new();
        sys.refresh_memory();

        let ram_total_kb = sys.total_memory() / 1024; // bytes to KB
        if ram_total_kb == 0 {
            return Err(Error::MemoryQueryFailed(io::Error::new(
                io::ErrorKind::Unsupported,
                "sysinfo reported no physical memory",
            )));
        }
        let ram_free_kb = (sys.free_memory() / 1024).min(ram_total_kb);

        sys.refresh_cpu_all();
        let cpus = sys.cpus();
        let core_count = u32::try_from(cpus.len()).unwrap_or(u32::MAX);
        let cpu_frequency_mhz = cpus
            .first()
            .map(|cpu| cpu.frequency())
            .filter(|&mhz| mhz > 0)
            .and_then(|mhz| u32::try_from(mhz).ok());

        if cpu_frequency_mhz.is_none() {
            let err = Error::frequency_unavailable("sysinfo");
            warn!(%err, "Leaving CPU frequency at 0");
        }

        let stats = HostStats {
            core_count,
            cpu_frequency_mhz,
            ram_total_kb,
            ram_free_kb,
            ram_usage_percent: usage_percent(ram_total_kb, ram_free_kb),
        };
        debug!(?stats, "Read host stats via sysinfo");
        Ok(stats)
    }
}
