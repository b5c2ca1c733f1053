//! Processor identification
//!
//! Issues the CPUID instruction and decodes its registers into vendor, brand
//! and extension data. Everything above [`CpuidSource`] depends only on the
//! four-register contract, so tests substitute fixed register tables.

pub mod decode;
mod identity;

pub use identity::{identify, CpuIdentity};

/// Leaf reporting the maximum basic leaf and the vendor identifier
pub const LEAF_VENDOR: u32 = 0x0000_0000;
/// Leaf reporting the feature flags
pub const LEAF_FEATURES: u32 = 0x0000_0001;
/// Leaf reporting the maximum extended leaf
pub const LEAF_EXTENDED_MAX: u32 = 0x8000_0000;
/// Leaves carrying the 48-byte brand string, in concatenation order
pub const LEAVES_BRAND: [u32; 3] = [0x8000_0002, 0x8000_0003, 0x8000_0004];

/// The four output registers of one CPUID invocation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Registers {
    pub eax: u32,
    pub ebx: u32,
    pub ecx: u32,
    pub edx: u32,
}

impl Registers {
    pub const fn new(eax: u32, ebx: u32, ecx: u32, edx: u32) -> Self {
        Registers { eax, ebx, ecx, edx }
    }

    /// Registers in output order (eax, ebx, ecx, edx)
    pub const fn words(&self) -> [u32; 4] {
        [self.eax, self.ebx, self.ecx, self.edx]
    }
}

/// Something that answers CPUID queries
///
/// The sub-leaf is always 0. Implementations cannot fail; unsupported leaves
/// return whatever the processor reports for them.
pub trait CpuidSource {
    fn query(&self, leaf: u32) -> Registers;
}

impl<T: CpuidSource + ?Sized> CpuidSource for &T {
    fn query(&self, leaf: u32) -> Registers {
        (**self).query(leaf)
    }
}

/// The host processor's CPUID instruction
///
/// On targets without CPUID every query answers all-zero registers.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeCpuid;

impl CpuidSource for NativeCpuid {
    #[cfg(target_arch = "x86_64")]
    fn query(&self, leaf: u32) -> Registers {
        use std::arch::x86_64::__cpuid_count;
        // SAFETY: CPUID is available on every x86_64 processor.
        #[allow(unused_unsafe)]
        let r = unsafe { __cpuid_count(leaf, 0) };
        Registers::new(r.eax, r.ebx, r.ecx, r.edx)
    }

    #[cfg(target_arch = "x86")]
    fn query(&self, leaf: u32) -> Registers {
        use std::arch::x86::{__cpuid_count, has_cpuid};
        if !has_cpuid() {
            return Registers::default();
        }
        // SAFETY: has_cpuid() confirmed the instruction exists.
        #[allow(unused_unsafe)]
        let r = unsafe { __cpuid_count(leaf, 0) };
        Registers::new(r.eax, r.ebx, r.ecx, r.edx)
    }

    #[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
    fn query(&self, _leaf: u32) -> Registers {
        Registers::default()
    }
}
