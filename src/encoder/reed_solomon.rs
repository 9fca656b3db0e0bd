//! Reed-Solomon error correction coding for QR codes.
//! QR codes use RS over GF(256) with primitive polynomial x^8 + x^4 + x^3 + x^2 + 1.

use std::sync::OnceLock;

use crate::encoder::tables::{self, EcBlocks};
use crate::models::ECLevel;

/// GF(256) field operations using log/exp tables
pub struct Gf256;

static LOG_TABLE: [u8; 256] = [
    0, 0, 1, 25, 2, 50, 26, 198, 3, 223, 51, 238, 27, 104, 199, 75, 4, 100, 224, 14, 52, 141, 239,
    129, 28, 193, 105, 248, 200, 8, 76, 113, 5, 138, 101, 47, 225, 36, 15, 33, 53, 147, 142, 218,
    240, 18, 130, 69, 29, 181, 194, 125, 106, 39, 249, 185, 201, 154, 9, 120, 77, 228, 114, 166, 6,
    191, 139, 98, 102, 221, 48, 253, 226, 152, 37, 179, 16, 145, 34, 136, 54, 208, 148, 206, 143,
    150, 219, 189, 241, 210, 19, 92, 131, 56, 70, 64, 30, 66, 182, 163, 195, 72, 126, 110, 107, 58,
    40, 84, 250, 133, 186, 61, 202, 94, 155, 159, 10, 21, 121, 43, 78, 212, 229, 172, 115, 243,
    167, 87, 7, 112, 192, 247, 140, 128, 99, 13, 103, 74, 222, 237, 49, 197, 254, 24, 227, 165,
    153, 119, 38, 184, 180, 124, 17, 68, 146, 217, 35, 32, 137, 46, 55, 63, 209, 91, 149, 188, 207,
    205, 144, 135, 151, 178, 220, 252, 190, 97, 242, 86, 211, 171, 20, 42, 93, 158, 132, 60, 57,
    83, 71, 109, 65, 162, 31, 45, 67, 216, 183, 123, 164, 118, 196, 23, 73, 236, 127, 12, 111, 246,
    108, 161, 59, 82, 41, 157, 85, 170, 251, 96, 134, 177, 187, 204, 62, 90, 203, 89, 95, 176, 156,
    169, 160, 81, 11, 245, 22, 235, 122, 117, 44, 215, 79, 174, 213, 233, 230, 231, 173, 232, 116,
    214, 244, 234, 168, 80, 88, 175,
];

static EXP_TABLE: [u8; 256] = [
    1, 2, 4, 8, 16, 32, 64, 128, 29, 58, 116, 232, 205, 135, 19, 38, 76, 152, 45, 90, 180, 117,
    234, 201, 143, 3, 6, 12, 24, 48, 96, 192, 157, 39, 78, 156, 37, 74, 148, 53, 106, 212, 181,
    119, 238, 193, 159, 35, 70, 140, 5, 10, 20, 40, 80, 160, 93, 186, 105, 210, 185, 111, 222, 161,
    95, 190, 97, 194, 153, 47, 94, 188, 101, 202, 137, 15, 30, 60, 120, 240, 253, 231, 211, 187,
    107, 214, 177, 127, 254, 225, 223, 163, 91, 182, 113, 226, 217, 175, 67, 134, 17, 34, 68, 136,
    13, 26, 52, 104, 208, 189, 103, 206, 129, 31, 62, 124, 248, 237, 199, 147, 59, 118, 236, 197,
    151, 51, 102, 204, 133, 23, 46, 92, 184, 109, 218, 169, 79, 158, 33, 66, 132, 21, 42, 84, 168,
    77, 154, 41, 82, 164, 85, 170, 73, 146, 57, 114, 228, 213, 183, 115, 230, 209, 191, 99, 198,
    145, 63, 126, 252, 229, 215, 179, 123, 246, 241, 255, 227, 219, 171, 75, 150, 49, 98, 196, 149,
    55, 110, 220, 165, 87, 174, 65, 130, 25, 50, 100, 200, 141, 7, 14, 28, 56, 112, 224, 221, 167,
    83, 166, 81, 162, 89, 178, 121, 242, 249, 239, 195, 155, 43, 86, 172, 69, 138, 9, 18, 36, 72,
    144, 61, 122, 244, 245, 247, 243, 251, 235, 203, 139, 11, 22, 44, 88, 176, 125, 250, 233, 207,
    131, 27, 54, 108, 216, 173, 71, 142, 1,
];

impl Gf256 {
    /// Multiply two field elements
    pub fn mul(a: u8, b: u8) -> u8 {
        if a == 0 || b == 0 {
            return 0;
        }
        let log_a = LOG_TABLE[a as usize] as usize;
        let log_b = LOG_TABLE[b as usize] as usize;
        EXP_TABLE[(log_a + log_b) % 255]
    }

    /// alpha^n for the generator element alpha = 2
    pub fn alpha_pow(n: usize) -> u8 {
        EXP_TABLE[n % 255]
    }
}

/// Largest ECC length any version/level pair uses
const MAX_ECC_LEN: usize = 30;

/// One cached generator polynomial per distinct ECC length. ECC lengths are
/// few and shared across many blocks and versions, so each is built once.
static GENERATORS: [OnceLock<Vec<u8>>; MAX_ECC_LEN + 1] =
    [const { OnceLock::new() }; MAX_ECC_LEN + 1];

/// Generator polynomial of the given degree, in division-ready order:
/// coefficient of x^(degree-1) first, the monic leading term implied.
fn generator(degree: usize) -> &'static [u8] {
    assert!((1..=MAX_ECC_LEN).contains(&degree), "ECC length out of range");
    GENERATORS[degree].get_or_init(|| {
        // Iteratively multiply (x - alpha^0) .. (x - alpha^(degree-1))
        let mut divisor = vec![0u8; degree];
        divisor[degree - 1] = 1;
        let mut root: u8 = 1;
        for _ in 0..degree {
            for j in 0..degree {
                divisor[j] = Gf256::mul(divisor[j], root);
                if j + 1 < degree {
                    divisor[j] ^= divisor[j + 1];
                }
            }
            root = Gf256::mul(root, 2);
        }
        divisor
    })
}

/// Reed-Solomon encoder producing ECC codewords for data blocks
pub struct ReedSolomonEncoder;

impl ReedSolomonEncoder {
    /// Compute `degree` ECC codewords for a data block.
    ///
    /// Standard LFSR-style polynomial division: each data byte feeds a
    /// feedback register whose final contents are the remainder.
    pub fn compute(data: &[u8], degree: usize) -> Vec<u8> {
        debug_assert!(data.len() + degree <= 255, "block exceeds field size");
        let divisor = generator(degree);
        let mut remainder = vec![0u8; degree];
        for &b in data {
            let factor = b ^ remainder[0];
            remainder.rotate_left(1);
            remainder[degree - 1] = 0;
            for (r, &g) in remainder.iter_mut().zip(divisor.iter()) {
                *r ^= Gf256::mul(g, factor);
            }
        }
        remainder
    }
}

/// One RS block: a borrowed slice of data codewords plus its computed ECC
#[derive(Debug)]
pub struct RsBlock<'a> {
    /// Data codewords of this block
    pub data: &'a [u8],
    /// ECC codewords computed over `data`
    pub ecc: Vec<u8>,
}

/// Split regular-QR data codewords into RS blocks and compute each block's ECC
pub fn build_blocks(data: &[u8], version: u8, level: ECLevel) -> Vec<RsBlock<'_>> {
    let shape: EcBlocks = tables::ec_blocks(version, level);
    debug_assert_eq!(data.len(), tables::data_codewords(version, level));

    let mut blocks = Vec::with_capacity(shape.num_blocks);
    let mut offset = 0;
    for i in 0..shape.num_blocks {
        let len = shape.data_len(i);
        let block_data = &data[offset..offset + len];
        blocks.push(RsBlock {
            data: block_data,
            ecc: ReedSolomonEncoder::compute(block_data, shape.ecc_per_block),
        });
        offset += len;
    }
    debug_assert_eq!(offset, data.len());
    blocks
}

/// Interleave block data and ECC codewords into the final codeword stream:
/// data column-major across blocks, then ECC column-major
pub fn interleave(blocks: &[RsBlock<'_>]) -> Vec<u8> {
    let total: usize = blocks.iter().map(|b| b.data.len() + b.ecc.len()).sum();
    let mut out = Vec::with_capacity(total);

    let max_data = blocks.iter().map(|b| b.data.len()).max().unwrap_or(0);
    for i in 0..max_data {
        for block in blocks {
            if let Some(&cw) = block.data.get(i) {
                out.push(cw);
            }
        }
    }
    let ecc_len = blocks.first().map_or(0, |b| b.ecc.len());
    for i in 0..ecc_len {
        for block in blocks {
            out.push(block.ecc[i]);
        }
    }
    debug_assert_eq!(out.len(), total);
    out
}

/// Micro QR codeword stream: a single block, data followed by its ECC
pub fn micro_codewords(data: &[u8], ecc_len: usize) -> Vec<u8> {
    let mut out = data.to_vec();
    out.extend(ReedSolomonEncoder::compute(data, ecc_len));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gf256_mul() {
        assert_eq!(Gf256::mul(0, 5), 0);
        assert_eq!(Gf256::mul(5, 0), 0);
        assert_eq!(Gf256::mul(1, 123), 123);
        // 2 * 128 wraps through the primitive polynomial 0x11d
        assert_eq!(Gf256::mul(2, 128), 0x1d);
    }

    #[test]
    fn test_alpha_pow() {
        assert_eq!(Gf256::alpha_pow(0), 1);
        assert_eq!(Gf256::alpha_pow(1), 2);
        assert_eq!(Gf256::alpha_pow(8), 29);
        // order of the multiplicative group
        assert_eq!(Gf256::alpha_pow(255), 1);
    }

    #[test]
    fn test_generator_degree_7() {
        // Published coefficients of the degree-7 generator polynomial
        assert_eq!(generator(7), &[127, 122, 154, 164, 11, 68, 117]);
    }

    #[test]
    fn test_ecc_for_known_block() {
        // Version 1-M "HELLO WORLD" data codewords and their 10 ECC codewords
        let data = [
            32, 91, 11, 120, 209, 114, 220, 77, 67, 64, 236, 17, 236, 17, 236, 17,
        ];
        let ecc = ReedSolomonEncoder::compute(&data, 10);
        assert_eq!(ecc, vec![196, 35, 39, 119, 235, 215, 231, 226, 93, 23]);
    }

    #[test]
    fn test_generator_cache_is_stable() {
        let a = generator(10).to_vec();
        let b = generator(10).to_vec();
        assert_eq!(a, b);
    }

    #[test]
    fn test_single_block_interleave_is_identity() {
        let data = [1u8, 2, 3, 4, 5];
        let blocks = vec![RsBlock {
            data: &data,
            ecc: vec![9, 8],
        }];
        assert_eq!(interleave(&blocks), vec![1, 2, 3, 4, 5, 9, 8]);
    }

    #[test]
    fn test_interleave_mixed_block_lengths() {
        let short = [1u8, 2];
        let long = [3u8, 4, 5];
        let blocks = vec![
            RsBlock {
                data: &short,
                ecc: vec![10, 11],
            },
            RsBlock {
                data: &long,
                ecc: vec![12, 13],
            },
        ];
        // data column-major (short block exhausted first), then ECC column-major
        assert_eq!(interleave(&blocks), vec![1, 3, 2, 4, 5, 10, 12, 11, 13]);
    }

    #[test]
    fn test_build_blocks_shapes() {
        // Version 5-H: blocks of 11,11,12,12 data codewords, 22 ECC each
        let data = vec![0xAB; 46];
        let blocks = build_blocks(&data, 5, crate::models::ECLevel::H);
        let lens: Vec<usize> = blocks.iter().map(|b| b.data.len()).collect();
        assert_eq!(lens, vec![11, 11, 12, 12]);
        assert!(blocks.iter().all(|b| b.ecc.len() == 22));
    }

    #[test]
    fn test_micro_codewords() {
        let data = [0x40, 0x18, 0xAC, 0xC3, 0x00];
        let cw = micro_codewords(&data, 5);
        assert_eq!(cw.len(), 10);
        assert_eq!(&cw[..5], &data);
    }
}
