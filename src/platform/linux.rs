//! Linux collector: sysinfo(2), sysconf and /proc/cpuinfo

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::{usage_percent, HostCollector, HostStats, Sources};
use crate::error::{Error, Result};

const MHZ_MARKER: &str = "cpu MHz";

/// Host collector backed by kernel memory accounting and a cpuinfo file
#[derive(Debug, Clone)]
pub struct LinuxHost {
    cpuinfo_path: PathBuf,
}

impl LinuxHost {
    pub fn new(cpuinfo_path: impl Into<PathBuf>) -> Self {
        Self {
            cpuinfo_path: cpuinfo_path.into(),
        }
    }

    pub fn from_sources(sources: &Sources) -> Self {
        Self::new(&sources.cpuinfo_path)
    }

    pub fn cpuinfo_path(&self) -> &Path {
        &self.cpuinfo_path
    }

    fn read_frequency(&self) -> Result<Option<u32>> {
        let origin = self.cpuinfo_path.display().to_string();
        let file =
            File::open(&self.cpuinfo_path).map_err(|e| Error::source_unavailable(&origin, e))?;

        match parse_cpu_mhz(BufReader::new(file), &origin) {
            Ok(mhz) => Ok(Some(mhz)),
            Err(err @ Error::FrequencyUnavailable { .. }) => {
                warn!(%err, "Leaving CPU frequency at 0");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}

impl HostCollector for LinuxHost {
    fn read(&self) -> Result<HostStats> {
        let (ram_total_kb, ram_free_kb) = query_memory()?;
        let cpu_frequency_mhz = self.read_frequency()?;
        let core_count = online_cores();

        debug!(
            core_count,
            ?cpu_frequency_mhz,
            ram_total_kb,
            ram_free_kb,
            "Read Linux host stats"
        );

        Ok(HostStats {
            core_count,
            cpu_frequency_mhz,
            ram_total_kb,
            ram_free_kb,
            ram_usage_percent: usage_percent(ram_total_kb, ram_free_kb),
        })
    }
}

/// Integer MHz from the first `cpu MHz` line of a cpuinfo listing
///
/// Format: "cpu MHz\t\t: 2400.000". The fractional part is dropped.
pub fn parse_cpu_mhz<R: BufRead>(reader: R, origin: &str) -> Result<u32> {
    // Lines are matched as bytes; undecodable lines elsewhere in the file are ignored.
    for line in reader.split(b'\n') {
        let line = line.map_err(|e| Error::source_unavailable(origin, e))?;
        let Some(rest) = line.strip_prefix(MHZ_MARKER.as_bytes()) else {
            continue;
        };

        return rest
            .iter()
            .position(|&b| b == b':')
            .map(|colon| {
                let value = &rest[colon + 1..];
                let start = value
                    .iter()
                    .position(|b| !b.is_ascii_whitespace())
                    .unwrap_or(value.len());
                &value[start..]
            })
            .and_then(|value| {
                let end = value
                    .iter()
                    .position(|b| !b.is_ascii_digit())
                    .unwrap_or(value.len());
                std::str::from_utf8(&value[..end]).ok()?.parse::<u32>().ok()
            })
            .ok_or_else(|| Error::frequency_unavailable(origin));
    }

    Err(Error::frequency_unavailable(origin))
}

/// Total and free physical memory in KB
fn query_memory() -> Result<(u64, u64)> {
    // SAFETY: sysinfo is plain old data; all-zero is a valid value.
    let mut info: libc::sysinfo = unsafe { std::mem::zeroed() };
    // SAFETY: info is a valid, writable sysinfo struct.
    if unsafe { libc::sysinfo(&mut info) } != 0 {
        return Err(Error::MemoryQueryFailed(io::Error::last_os_error()));
    }

    let unit = u64::from(info.mem_unit.max(1));
    let total = (info.totalram as u64).saturating_mul(unit) / 1024;
    let free = (info.freeram as u64).saturating_mul(unit) / 1024;
    Ok((total, free))
}

fn online_cores() -> u32 {
    // SAFETY: sysconf has no preconditions.
    let n = unsafe { libc::sysconf(libc::_SC_NPROCESSORS_ONLN) };
    u32::try_from(n).unwrap_or_else(|_| {
        warn!(result = n, "sysconf(_SC_NPROCESSORS_ONLN) failed");
        0
    })
}
