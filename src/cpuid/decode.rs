//! Register decoding
//!
//! Pure bit manipulation over CPUID output. Every register is read
//! little-endian, lowest byte first.

use super::Registers;
use crate::snapshot::{Extensions, BRAND_LEN, VENDOR_LEN};

// Leaf 1, edx
const EDX_MMX: u32 = 23;
const EDX_SSE: u32 = 25;
const EDX_SSE2: u32 = 26;
// Leaf 1, ecx
const ECX_SSE3: u32 = 0;
const ECX_SSE41: u32 = 19;
const ECX_SSE42: u32 = 20;
const ECX_AVX: u32 = 28;

/// Vendor identifier from leaf 0: ebx, edx, ecx in that order
pub fn vendor_id(regs: &Registers) -> [u8; VENDOR_LEN] {
    let mut out = [0u8; VENDOR_LEN];
    out[0..4].copy_from_slice(&regs.ebx.to_le_bytes());
    out[4..8].copy_from_slice(&regs.edx.to_le_bytes());
    out[8..12].copy_from_slice(&regs.ecx.to_le_bytes());
    out
}

/// One 16-byte brand block: eax, ebx, ecx, edx in that order
pub fn brand_block(regs: &Registers) -> [u8; 16] {
    let mut out = [0u8; 16];
    for (chunk, word) in out.chunks_exact_mut(4).zip(regs.words()) {
        chunk.copy_from_slice(&word.to_le_bytes());
    }
    out
}

/// Brand string from the three brand leaves, concatenated in call order
pub fn brand_string(blocks: &[Registers; 3]) -> [u8; BRAND_LEN] {
    let mut out = [0u8; BRAND_LEN];
    for (chunk, regs) in out.chunks_exact_mut(16).zip(blocks) {
        chunk.copy_from_slice(&brand_block(regs));
    }
    out
}

/// Extension flags from leaf 1
pub fn extensions(regs: &Registers) -> Extensions {
    Extensions {
        mmx: bit(regs.edx, EDX_MMX),
        sse: bit(regs.edx, EDX_SSE),
        sse2: bit(regs.edx, EDX_SSE2),
        sse3: bit(regs.ecx, ECX_SSE3),
        sse41: bit(regs.ecx, ECX_SSE41),
        sse42: bit(regs.ecx, ECX_SSE42),
        avx: bit(regs.ecx, ECX_AVX),
    }
}

/// Highest leaf in the range the query was issued for (eax of leaf 0 or 0x80000000)
pub fn max_leaf(regs: &Registers) -> u32 {
    regs.eax
}

fn bit(word: u32, position: u32) -> bool {
    (word >> position) & 1 == 1
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Pack four ASCII bytes into a register, lowest byte first
    fn word(bytes: &[u8; 4]) -> u32 {
        u32::from_le_bytes(*bytes)
    }

    fn vendor_regs(text: &[u8; 12]) -> Registers {
        Registers::new(
            0x16,
            word(&[text[0], text[1], text[2], text[3]]),
            word(&[text[8], text[9], text[10], text[11]]),
            word(&[text[4], text[5], text[6], text[7]]),
        )
    }

    #[test]
    fn vendor_decodes_genuine_intel() {
        let regs = Registers::new(0x16, 0x756e_6547, 0x6c65_746e, 0x4965_6e69);
        assert_eq!(&vendor_id(&regs), b"GenuineIntel");
    }

    #[test]
    fn vendor_decodes_authentic_amd() {
        let regs = vendor_regs(b"AuthenticAMD");
        assert_eq!(&vendor_id(&regs), b"AuthenticAMD");
    }

    #[test]
    fn vendor_ignores_eax() {
        let mut regs = vendor_regs(b"GenuineIntel");
        let before = vendor_id(&regs);
        regs.eax = 0xdead_beef;
        assert_eq!(vendor_id(&regs), before);
    }

    #[test]
    fn vendor_order_is_ebx_edx_ecx() {
        let regs = Registers::new(0, word(b"AAAA"), word(b"CCCC"), word(b"DDDD"));
        assert_eq!(&vendor_id(&regs), b"AAAADDDDCCCC");
    }

    #[test]
    fn vendor_decoding_is_deterministic() {
        let regs = Registers::new(0x1, 0x1234_5678, 0x9abc_def0, 0x0fed_cba9);
        let first = vendor_id(&regs);
        for _ in 0..10 {
            assert_eq!(vendor_id(&regs), first);
        }
    }

    #[test]
    fn brand_concatenates_blocks_in_call_order() {
        let text = b"0123456789abcdefGHIJKLMNOPQRSTUVwxyz!@#$%^&*()_+";
        let blocks: [Registers; 3] = std::array::from_fn(|i| {
            let chunk = &text[i * 16..(i + 1) * 16];
            Registers::new(
                word(&[chunk[0], chunk[1], chunk[2], chunk[3]]),
                word(&[chunk[4], chunk[5], chunk[6], chunk[7]]),
                word(&[chunk[8], chunk[9], chunk[10], chunk[11]]),
                word(&[chunk[12], chunk[13], chunk[14], chunk[15]]),
            )
        });

        let brand = brand_string(&blocks);
        assert_eq!(brand.len(), BRAND_LEN);
        assert_eq!(&brand, text);
    }

    #[test]
    fn brand_keeps_trailing_nul_padding() {
        let blocks = [
            Registers::new(word(b"Test"), word(b" CPU"), 0, 0),
            Registers::default(),
            Registers::default(),
        ];
        let brand = brand_string(&blocks);
        assert_eq!(&brand[..8], b"Test CPU");
        assert!(brand[8..].iter().all(|&b| b == 0));
    }

    #[test]
    fn brand_block_is_little_endian_per_register() {
        let regs = Registers::new(0x0403_0201, 0x0807_0605, 0x0c0b_0a09, 0x100f_0e0d);
        let block = brand_block(&regs);
        let expected: Vec<u8> = (1..=16).collect();
        assert_eq!(block.as_slice(), expected.as_slice());
    }

    #[test]
    fn each_flag_reflects_only_its_bit() {
        let cases: [(&str, Registers); 7] = [
            ("MMX", Registers::new(0, 0, 0, 1 << 23)),
            ("SSE", Registers::new(0, 0, 0, 1 << 25)),
            ("SSE2", Registers::new(0, 0, 0, 1 << 26)),
            ("SSE3", Registers::new(0, 0, 1 << 0, 0)),
            ("SSE4.1", Registers::new(0, 0, 1 << 19, 0)),
            ("SSE4.2", Registers::new(0, 0, 1 << 20, 0)),
            ("AVX", Registers::new(0, 0, 1 << 28, 0)),
        ];

        for (name, regs) in cases {
            let ext = extensions(&regs);
            assert_eq!(ext.supported(), vec![name], "bit for {name}");
        }
    }

    #[test]
    fn flags_ignore_eax_and_ebx() {
        let regs = Registers::new(u32::MAX, u32::MAX, 0, 0);
        assert_eq!(extensions(&regs), Extensions::default());
    }

    #[test]
    fn all_bits_set_enables_every_flag() {
        let ext = extensions(&Registers::new(0, 0, u32::MAX, u32::MAX));
        assert!(ext.flags().iter().all(|(_, set)| *set));
    }

    #[test]
    fn max_leaf_reads_eax() {
        assert_eq!(max_leaf(&Registers::new(0x8000_0008, 1, 2, 3)), 0x8000_0008);
    }
}
