//! Windows collector: GetSystemInfo, registry clock speed, GlobalMemoryStatusEx

use std::io;
use tracing::{debug, warn};

use windows_sys::Win32::Foundation::ERROR_SUCCESS;
use windows_sys::Win32::System::Registry::{
    RegCloseKey, RegOpenKeyExW, RegQueryValueExW, HKEY, HKEY_LOCAL_MACHINE, KEY_READ, REG_DWORD,
    REG_VALUE_TYPE,
};
use windows_sys::Win32::System::SystemInformation::{
    GetSystemInfo, GlobalMemoryStatusEx, MEMORYSTATUSEX, SYSTEM_INFO,
};

use super::{HostCollector, HostStats, Sources};
use crate::error::{Error, Result};

/// Host collector backed by the system information, registry and memory status APIs
#[derive(Debug, Clone)]
pub struct WindowsHost {
    registry_key: String,
    frequency_value: String,
}

impl WindowsHost {
    pub fn new(registry_key: impl Into<String>, frequency_value: impl Into<String>) -> Self {
        Self {
            registry_key: registry_key.into(),
            frequency_value: frequency_value.into(),
        }
    }

    pub fn from_sources(sources: &Sources) -> Self {
        Self::new(&sources.registry_key, &sources.frequency_value)
    }

    fn origin(&self) -> String {
        format!("HKEY_LOCAL_MACHINE\\{}", self.registry_key)
    }

    fn read_frequency(&self) -> Result<Option<u32>> {
        let key = RegKey::open_local_machine(&self.registry_key)
            .map_err(|e| Error::source_unavailable(self.origin(), e))?;

        match key.query_dword(&self.frequency_value) {
            Ok(mhz) => Ok(Some(mhz)),
            Err(e) => {
                let err = Error::frequency_unavailable(format!(
                    "{}\\{}",
                    self.origin(),
                    self.frequency_value
                ));
                warn!(%err, reason = %e, "Leaving CPU frequency at 0");
                Ok(None)
            }
        }
    }
}

impl HostCollector for WindowsHost {
    fn read(&self) -> Result<HostStats> {
        // SAFETY: MEMORYSTATUSEX is plain old data; dwLength is set before the call.
        let mut mem: MEMORYSTATUSEX = unsafe { std::mem::zeroed() };
        mem.dwLength = std::mem::size_of::<MEMORYSTATUSEX>() as u32;
        if unsafe { GlobalMemoryStatusEx(&mut mem) } == 0 {
            return Err(Error::MemoryQueryFailed(io::Error::last_os_error()));
        }

        // SAFETY: GetSystemInfo only writes into the provided struct.
        let mut sys: SYSTEM_INFO = unsafe { std::mem::zeroed() };
        unsafe { GetSystemInfo(&mut sys) };

        let cpu_frequency_mhz = self.read_frequency()?;

        let stats = HostStats {
            core_count: sys.dwNumberOfProcessors,
            cpu_frequency_mhz,
            ram_total_kb: mem.ullTotalPhys / 1024,
            ram_free_kb: mem.ullAvailPhys / 1024,
            ram_usage_percent: mem.dwMemoryLoad.min(100),
        };
        debug!(?stats, "Read Windows host stats");
        Ok(stats)
    }
}

/// Open registry key, closed on drop
struct RegKey(HKEY);

impl RegKey {
    fn open_local_machine(path: &str) -> io::Result<Self> {
        let wide = to_wide(path);
        let mut hkey: HKEY = std::ptr::null_mut();
        let status =
            unsafe { RegOpenKeyExW(HKEY_LOCAL_MACHINE, wide.as_ptr(), 0, KEY_READ, &mut hkey) };
        if status != ERROR_SUCCESS {
            return Err(io::Error::from_raw_os_error(status as i32));
        }
        Ok(RegKey(hkey))
    }

    fn query_dword(&self, name: &str) -> io::Result<u32> {
        let wide = to_wide(name);
        let mut value = 0u32;
        let mut size = std::mem::size_of::<u32>() as u32;
        let mut kind: REG_VALUE_TYPE = 0;
        let status = unsafe {
            RegQueryValueExW(
                self.0,
                wide.as_ptr(),
                std::ptr::null(),
                &mut kind,
                (&mut value as *mut u32).cast::<u8>(),
                &mut size,
            )
        };
        if status != ERROR_SUCCESS {
            return Err(io::Error::from_raw_os_error(status as i32));
        }
        if kind != REG_DWORD {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("{name} is not a REG_DWORD"),
            ));
        }
        Ok(value)
    }
}

impl Drop for RegKey {
    fn drop(&mut self) {
        let _ = unsafe { RegCloseKey(self.0) };
    }
}

fn to_wide(text: &str) -> Vec<u16> {
    text.encode_utf16().chain(std::iter::once(0)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_wide_is_nul_terminated() {
        assert_eq!(to_wide("~MHz"), vec![0x7e, 0x4d, 0x48, 0x7a, 0]);
    }

    #[test]
    fn missing_key_is_diagnostic_source_unavailable() {
        let host = WindowsHost::new("HARDWARE\\DESCRIPTION\\NoSuchKey\\0", "~MHz");
        let err = host.read().unwrap_err();
        assert!(matches!(err, Error::DiagnosticSourceUnavailable { .. }));
    }

    #[test]
    fn missing_value_yields_zero_frequency() {
        let sources = Sources {
            frequency_value: "NoSuchValue".to_string(),
            ..Sources::default()
        };
        let stats = WindowsHost::from_sources(&sources).read().unwrap();
        assert_eq!(stats.cpu_frequency_mhz, None);
        assert!(stats.core_count >= 1);
    }

    #[test]
    fn host_stats_are_in_range() {
        let stats = WindowsHost::from_sources(&Sources::default()).read().unwrap();
        assert!(stats.core_count >= 1);
        assert!(stats.ram_total_kb > 0);
        assert!(stats.ram_free_kb <= stats.ram_total_kb);
        assert!(stats.ram_usage_percent <= 100);
    }
}
