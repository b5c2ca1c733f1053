//! corinfo - CPU, feature flag, clock, core and memory snapshot
//!
//! Queries the processor with CPUID and the host OS for core count, clock
//! speed and physical memory, returning everything in one fixed-size
//! [`HardwareSnapshot`].
//!
//! ```no_run
//! let report = corinfo::collect()?;
//! println!("{} ({} cores)", report.snapshot.brand(), report.snapshot.core_count);
//! if !report.status.is_complete() {
//!     eprintln!("missing: {:?}", report.status.missing());
//! }
//! # Ok::<(), corinfo::Error>(())
//! ```

pub mod collector;
pub mod cpuid;
pub mod error;
pub mod platform;
pub mod snapshot;

pub use collector::{collect, Collector, Missing, Report, Status};
pub use cpuid::{CpuIdentity, CpuidSource, NativeCpuid, Registers};
pub use error::{Error, Result};
pub use platform::{HostCollector, HostStats, NativeHost, PortableHost, Sources};
pub use snapshot::{Extensions, HardwareSnapshot};
