use tracing::{debug, warn};

use super::{decode, CpuidSource, LEAF_EXTENDED_MAX, LEAF_FEATURES, LEAF_VENDOR, LEAVES_BRAND};
use crate::snapshot::{Extensions, BRAND_LEN, VENDOR_LEN};

/// Decoded processor identity
///
/// `brand_string` and `extensions` are only read from leaves the processor
/// claims to support; otherwise they stay zeroed and the matching
/// `*_supported` flag is false.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuIdentity {
    pub vendor_id: [u8; VENDOR_LEN],
    pub brand_string: [u8; BRAND_LEN],
    pub extensions: Extensions,
    pub max_basic_leaf: u32,
    pub max_extended_leaf: u32,
    pub features_supported: bool,
    pub brand_supported: bool,
}

/// Query vendor, brand and extension flags from `source`
pub fn identify<C: CpuidSource + ?Sized>(source: &C) -> CpuIdentity {
    let leaf0 = source.query(LEAF_VENDOR);
    let vendor_id = decode::vendor_id(&leaf0);
    let max_basic_leaf = decode::max_leaf(&leaf0);

    let features_supported = max_basic_leaf >= LEAF_FEATURES;
    let extensions = if features_supported {
        decode::extensions(&source.query(LEAF_FEATURES))
    } else {
        warn!(max_basic_leaf, "CPUID leaf 1 unsupported, extension flags unavailable");
        Extensions::default()
    };

    let max_extended_leaf = decode::max_leaf(&source.query(LEAF_EXTENDED_MAX));
    let brand_supported = max_extended_leaf >= LEAVES_BRAND[2];
    let brand_string = if brand_supported {
        decode::brand_string(&LEAVES_BRAND.map(|leaf| source.query(leaf)))
    } else {
        warn!(
            max_extended_leaf = %format!("{max_extended_leaf:#x}"),
            "CPUID brand leaves unsupported, brand string unavailable"
        );
        [0; BRAND_LEN]
    };

    debug!(
        vendor = %String::from_utf8_lossy(&vendor_id),
        max_basic_leaf,
        max_extended_leaf = %format!("{max_extended_leaf:#x}"),
        "Identified processor"
    );

    CpuIdentity {
        vendor_id,
        brand_string,
        extensions,
        max_basic_leaf,
        max_extended_leaf,
        features_supported,
        brand_supported,
    }
}
