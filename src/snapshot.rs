//! Hardware snapshot record
//!
//! A plain, copyable value filled in one collection call. Every field starts
//! zeroed so a failed collection never exposes stale data.

use serde::{Deserialize, Serialize};

/// Length of the vendor identifier reported by CPUID leaf 0
pub const VENDOR_LEN: usize = 12;
/// Length of the brand string reported by CPUID leaves 0x80000002..=0x80000004
pub const BRAND_LEN: usize = 48;

/// Instruction-set extensions reported by CPUID leaf 1
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Extensions {
    pub mmx: bool,
    pub sse: bool,
    pub sse2: bool,
    pub sse3: bool,
    pub sse41: bool,
    pub sse42: bool,
    pub avx: bool,
}

impl Extensions {
    /// Flags paired with their conventional names, in leaf-1 bit order
    pub fn flags(&self) -> [(&'static str, bool); 7] {
        [
            ("MMX", self.mmx),
            ("SSE", self.sse),
            ("SSE2", self.sse2),
            ("SSE3", self.sse3),
            ("SSE4.1", self.sse41),
            ("SSE4.2", self.sse42),
            ("AVX", self.avx),
        ]
    }

    /// Names of the supported extensions
    pub fn supported(&self) -> Vec<&'static str> {
        self.flags()
            .into_iter()
            .filter_map(|(name, set)| set.then_some(name))
            .collect()
    }
}

/// Complete point-in-time hardware snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HardwareSnapshot {
    /// Number of logical processors online
    pub core_count: u32,
    /// Current or nominal clock speed in MHz (0 when unknown)
    pub cpu_frequency_mhz: u32,
    /// Raw vendor identifier, e.g. "GenuineIntel" (not NUL-terminated)
    #[serde(with = "fixed_ascii")]
    pub vendor_id: [u8; VENDOR_LEN],
    /// Raw brand string, typically NUL-padded
    #[serde(with = "fixed_ascii")]
    pub brand_string: [u8; BRAND_LEN],
    pub extensions: Extensions,
    /// Physical RAM size, in KB
    pub ram_total_kb: u64,
    /// Free physical RAM, in KB
    pub ram_free_kb: u64,
    /// Approximate physical memory utilization, 0..=100
    pub ram_usage_percent: u32,
}

impl Default for HardwareSnapshot {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl HardwareSnapshot {
    /// Snapshot with every field zero/false
    pub const fn zeroed() -> Self {
        HardwareSnapshot {
            core_count: 0,
            cpu_frequency_mhz: 0,
            vendor_id: [0; VENDOR_LEN],
            brand_string: [0; BRAND_LEN],
            extensions: Extensions {
                mmx: false,
                sse: false,
                sse2: false,
                sse3: false,
                sse41: false,
                sse42: false,
                avx: false,
            },
            ram_total_kb: 0,
            ram_free_kb: 0,
            ram_usage_percent: 0,
        }
    }

    /// Reset every field to zero/false
    pub fn clear(&mut self) {
        *self = Self::zeroed();
    }

    pub fn is_zeroed(&self) -> bool {
        *self == Self::zeroed()
    }

    /// Vendor identifier as text, trailing padding removed
    pub fn vendor(&self) -> String {
        ascii_text(&self.vendor_id)
    }

    /// Brand string as text, surrounding padding removed
    pub fn brand(&self) -> String {
        ascii_text(&self.brand_string)
    }

    /// Display snapshot as formatted string
    pub fn display(&self) -> String {
        const WIDTH: usize = 62;
        let mut output = String::new();

        output.push_str(&format!("╔{}╗\n", "═".repeat(WIDTH)));
        output.push_str(&format!("║{:^WIDTH$}║\n", "HARDWARE SNAPSHOT"));
        output.push_str(&format!("╠{}╣\n", "═".repeat(WIDTH)));

        let format_line = |label: &str, content: &str| -> String {
            let content_width = WIDTH.saturating_sub(1 + label.len());
            let clipped: String = content.chars().take(content_width).collect();
            format!("║ {}{:<content_width$}║\n", label, clipped)
        };

        let or_unknown = |text: String| {
            if text.is_empty() {
                "Unknown".to_string()
            } else {
                text
            }
        };

        output.push_str(&format_line("CPU: ", &or_unknown(self.brand())));
        output.push_str(&format_line(
            "      ",
            &format!("Vendor: {}", or_unknown(self.vendor())),
        ));
        output.push_str(&format_line(
            "      ",
            &format!("{} logical cores", self.core_count),
        ));
        if self.cpu_frequency_mhz > 0 {
            output.push_str(&format_line(
                "      ",
                &format!("Clock: {} MHz", self.cpu_frequency_mhz),
            ));
        }
        let supported = self.extensions.supported();
        let ext = if supported.is_empty() {
            "none detected".to_string()
        } else {
            supported.join(" ")
        };
        output.push_str(&format_line("      ", &format!("Extensions: {}", ext)));

        output.push_str(&format!("╠{}╣\n", "═".repeat(WIDTH)));

        let total_gb = self.ram_total_kb as f64 / 1024.0 / 1024.0;
        let free_gb = self.ram_free_kb as f64 / 1024.0 / 1024.0;
        output.push_str(&format_line(
            "RAM: ",
            &format!("{:.1} GB total | {:.1} GB free", total_gb, free_gb),
        ));
        output.push_str(&format_line(
            "      ",
            &format!("Usage: {}%", self.ram_usage_percent),
        ));

        output.push_str(&format!("╚{}╝", "═".repeat(WIDTH)));

        output
    }
}

/// Lossy text view of a fixed byte field, NUL and whitespace padding stripped
///
/// Display only; serialization goes through [`fixed_ascii`], which keeps every byte.
fn ascii_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim_matches(|c: char| c == '\0' || c.is_whitespace())
        .to_string()
}

/// Serde adapter storing fixed byte arrays as escaped ASCII strings
///
/// Trailing NUL padding is dropped and restored on read. Printable ASCII is
/// written as-is, `\` as `\\`, and any other byte as `\xHH`, so leading
/// spaces, interior NULs and non-ASCII bytes survive a round trip.
mod fixed_ascii {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S, const N: usize>(bytes: &[u8; N], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&encode(bytes))
    }

    pub fn deserialize<'de, D, const N: usize>(deserializer: D) -> Result<[u8; N], D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        let raw = decode(&text).map_err(D::Error::custom)?;
        if raw.len() > N {
            return Err(D::Error::custom(format!(
                "expected at most {} bytes, got {}",
                N,
                raw.len()
            )));
        }

        let mut out = [0u8; N];
        out[..raw.len()].copy_from_slice(&raw);
        Ok(out)
    }

    pub(super) fn encode(bytes: &[u8]) -> String {
        let used = bytes.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
        let mut out = String::with_capacity(used);
        for &b in &bytes[..used] {
            match b {
                b'\\' => out.push_str("\\\\"),
                0x20..=0x7e => out.push(char::from(b)),
                _ => out.push_str(&format!("\\x{b:02x}")),
            }
        }
        out
    }

    pub(super) fn decode(text: &str) -> Result<Vec<u8>, String> {
        let mut out = Vec::with_capacity(text.len());
        let mut bytes = text.bytes();
        while let Some(b) = bytes.next() {
            if b != b'\\' {
                out.push(b);
                continue;
            }
            match bytes.next() {
                Some(b'\\') => out.push(b'\\'),
                Some(b'x') => {
                    let hex = [bytes.next(), bytes.next()];
                    let byte = match hex {
                        [Some(hi), Some(lo)] => std::str::from_utf8(&[hi, lo])
                            .ok()
                            .and_then(|h| u8::from_str_radix(h, 16).ok()),
                        _ => None,
                    };
                    out.push(byte.ok_or_else(|| format!("invalid \\x escape in {text:?}"))?);
                }
                _ => return Err(format!("invalid escape in {text:?}")),
            }
        }
        Ok(out)
    }
}
