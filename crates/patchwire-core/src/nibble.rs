//! Nibble splitting for devices that send each data byte as two 4-bit halves.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// Splits every byte into `[low, high]` nibbles.
pub fn nibblize_low_first(bytes: &[u8]) -> Vec<u8> {
    bytes.iter().flat_map(|&b| [b & 0x0F, b >> 4]).collect()
}

/// Joins `[low, high]` nibble pairs back into bytes. A trailing odd nibble is
/// ignored.
pub fn denibblize_low_first(nibbles: &[u8]) -> Vec<u8> {
    nibbles
        .chunks_exact(2)
        .map(|pair| (pair[0] & 0x0F) | ((pair[1] & 0x0F) << 4))
        .collect()
}
