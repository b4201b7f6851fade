//! Byte compaction.
use super::{Codeword, MODULUS};

/// Latch used when the input length is a multiple of 6.
pub const LATCH_BYTE_ALIGNED: Codeword = 924;

/// Latch used when the input ends with a partial group.
pub const LATCH_BYTE: Codeword = 901;

pub const GROUP_SIZE: usize = 6;

pub const GROUP_CODEWORDS: usize = 5;

/// Packs bytes into codewords, latch first.
///
/// Every full group of 6 bytes is read as a big-endian base 256 number and
/// written as 5 base 929 digits. The remaining bytes are emitted as one
/// codeword each.
pub fn compact(bytes: &[u8]) -> Vec<Codeword> {
    let groups = bytes.chunks_exact(GROUP_SIZE);
    let tail = groups.remainder();

    let mut result = Vec::with_capacity(1 + groups.len() * GROUP_CODEWORDS + tail.len());
    result.push(if tail.is_empty() {
        LATCH_BYTE_ALIGNED
    } else {
        LATCH_BYTE
    });

    for group in groups {
        result.extend(pack_group(group));
    }

    result.extend(tail.iter().map(|&b| b as Codeword));
    result
}

fn pack_group(group: &[u8]) -> [Codeword; GROUP_CODEWORDS] {
    let mut value = group.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64);

    let mut digits = [0; GROUP_CODEWORDS];
    for digit in digits.iter_mut().rev() {
        *digit = (value % MODULUS as u64) as Codeword;
        value /= MODULUS as u64;
    }

    digits
}

/// Reverse of the group packing, for 5 codewords produced by [`compact`].
pub fn unpack_group(codewords: &[Codeword; GROUP_CODEWORDS]) -> [u8; GROUP_SIZE] {
    let mut value = codewords
        .iter()
        .fold(0u64, |acc, &c| acc * MODULUS as u64 + c as u64);

    let mut bytes = [0; GROUP_SIZE];
    for byte in bytes.iter_mut().rev() {
        *byte = (value & 0xff) as u8;
        value >>= 8;
    }

    bytes
}
