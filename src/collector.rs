//! Snapshot assembly
//!
//! Combines processor identification and host statistics into one
//! [`HardwareSnapshot`]. CPU fields are filled first, then host fields; the
//! target is zeroed before either so nothing stale survives.

use serde::Serialize;
use tracing::{debug, warn};

use crate::cpuid::{identify, CpuidSource, NativeCpuid};
use crate::error::{Error, Result};
use crate::platform::{HostCollector, NativeHost, Sources};
use crate::snapshot::HardwareSnapshot;

/// A piece of the snapshot the host could not supply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Missing {
    /// No frequency entry in the diagnostic source; `cpu_frequency_mhz` is 0
    Frequency,
    /// CPUID leaf 1 unsupported; every extension flag is false
    FeatureFlags,
    /// CPUID brand leaves unsupported; `brand_string` is zeroed
    BrandString,
}

/// Outcome of a successful collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "missing", rename_all = "snake_case")]
pub enum Status {
    Complete,
    Partial(Vec<Missing>),
}

impl Status {
    fn from_missing(missing: Vec<Missing>) -> Self {
        if missing.is_empty() {
            Status::Complete
        } else {
            Status::Partial(missing)
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Status::Complete)
    }

    pub fn missing(&self) -> &[Missing] {
        match self {
            Status::Complete => &[],
            Status::Partial(missing) => missing,
        }
    }
}

/// An owned snapshot with its collection status
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub snapshot: HardwareSnapshot,
    pub status: Status,
}

/// Snapshot assembler over a CPUID source and a host collector
#[derive(Debug, Clone)]
pub struct Collector<C = NativeCpuid, H = NativeHost> {
    cpuid: C,
    host: H,
}

impl Collector {
    /// Collector for this machine with the default diagnostic sources
    pub fn native() -> Self {
        Self::with_sources(&Sources::default())
    }

    /// Collector for this machine reading from `sources`
    pub fn with_sources(sources: &Sources) -> Self {
        Collector::new(NativeCpuid, NativeHost::from_sources(sources))
    }
}

impl Default for Collector {
    fn default() -> Self {
        Self::native()
    }
}

impl<C: CpuidSource, H: HostCollector> Collector<C, H> {
    pub fn new(cpuid: C, host: H) -> Self {
        Collector { cpuid, host }
    }

    /// Populate `target` in place
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `target` is `None` (nothing is queried). Host
    /// failures are returned as-is, leaving the CPU fields already written
    /// to `target` and every host field zeroed.
    pub fn collect_into(&self, target: Option<&mut HardwareSnapshot>) -> Result<Status> {
        let Some(target) = target else {
            return Err(Error::InvalidArgument);
        };
        target.clear();

        let mut missing = Vec::new();

        debug!("Identifying processor");
        let cpu = identify(&self.cpuid);
        target.vendor_id = cpu.vendor_id;
        target.brand_string = cpu.brand_string;
        target.extensions = cpu.extensions;
        if !cpu.features_supported {
            missing.push(Missing::FeatureFlags);
        }
        if !cpu.brand_supported {
            missing.push(Missing::BrandString);
        }

        debug!("Reading host statistics");
        let stats = self.host.read()?;
        target.core_count = stats.core_count;
        target.cpu_frequency_mhz = stats.cpu_frequency_mhz.unwrap_or(0);
        target.ram_total_kb = stats.ram_total_kb;
        target.ram_free_kb = stats.ram_free_kb;
        target.ram_usage_percent = stats.ram_usage_percent.min(100);
        if stats.cpu_frequency_mhz.is_none() {
            missing.push(Missing::Frequency);
        }

        let status = Status::from_missing(missing);
        if !status.is_complete() {
            warn!(missing = ?status.missing(), "Snapshot collected with gaps");
        }
        Ok(status)
    }

    /// Collect a fresh snapshot
    pub fn collect(&self) -> Result<Report> {
        let mut snapshot = HardwareSnapshot::zeroed();
        let status = self.collect_into(Some(&mut snapshot))?;
        Ok(Report { snapshot, status })
    }
}

/// Collect a snapshot of this machine with the default diagnostic sources
pub fn collect() -> Result<Report> {
    Collector::native().collect()
}
