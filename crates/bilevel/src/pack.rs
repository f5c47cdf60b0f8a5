//! 1-bit packing of exported masks.

use crate::mask::BinaryMask;

/// Pack the exported foreground of `mask` row-major, eight samples per byte,
/// most significant bit first. A set bit is foreground.
///
/// The last byte is zero-padded when the sample count is not a multiple of
/// eight.
pub fn pack_bits(mask: &BinaryMask, invert: bool) -> Vec<u8> {
    let mut bytes = vec![0u8; mask.len().div_ceil(8)];
    for i in 0..mask.len() {
        if mask.is_exported_foreground(i, invert) {
            bytes[i / 8] |= 0x80 >> (i % 8);
        }
    }
    bytes
}

/// Inverse of [`pack_bits`]: the foreground pattern of `len` samples.
///
/// Samples past the end of `bytes` read as background.
pub fn unpack_bits(bytes: &[u8], len: usize) -> Vec<bool> {
    (0..len)
        .map(|i| {
            bytes
                .get(i / 8)
                .is_some_and(|&b| b & (0x80 >> (i % 8)) != 0)
        })
        .collect()
}
