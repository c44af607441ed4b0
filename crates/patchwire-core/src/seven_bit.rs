//! 8-bit ↔ 7-bit payload packing.
//!
//! SysEx payload bytes must have bit 7 clear. Devices that need full 8-bit
//! values (the Venom, for one) split the input into groups of seven bytes and
//! send each group as eight: a leading byte carrying the stripped high bits,
//! then the seven low-7-bit bytes.
//!
//! ```text
//! input:   b0 b1 b2 b3 b4 b5 b6 | b7 b8
//! output:  H  b0 b1 b2 b3 b4 b5 b6 | H' b7 b8
//!          H bit i = bit 7 of b(i)
//! ```
//!
//! A short final group is emitted the same way: one leading byte plus the
//! bytes that are present, so `N` input bytes become
//! `(N / 7) * 8 + (N % 7 + 1)` bytes when `N % 7 > 0`.
//!
//! # Example
//!
//! ```rust
//! use patchwire_core::seven_bit::{pack, unpack};
//!
//! let raw = [5, 127, 64, 1, 2, 3, 4];
//! let packed = pack(&raw);
//! assert_eq!(packed.len(), 8);
//! assert_eq!(unpack(&packed), raw);
//! ```

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// Bytes per unpacked group.
pub const GROUP: usize = 7;

/// Bytes per packed group (leading high-bit byte + [`GROUP`]).
pub const PACKED_GROUP: usize = GROUP + 1;

/// Length of the packed form of `n` raw bytes.
pub const fn packed_len(n: usize) -> usize {
    let rem = n % GROUP;
    (n / GROUP) * PACKED_GROUP + if rem > 0 { rem + 1 } else { 0 }
}

/// Length of the unpacked form of `len` packed bytes.
///
/// A trailing fragment of a single byte carries only a high-bit byte and
/// contributes nothing.
pub const fn unpacked_len(len: usize) -> usize {
    (len / PACKED_GROUP) * GROUP + (len % PACKED_GROUP).saturating_sub(1)
}

/// Packs raw 8-bit bytes into a 7-bit-safe payload.
///
/// Every output byte is `<= 0x7F`.
pub fn pack(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(packed_len(data.len()));
    for group in data.chunks(GROUP) {
        let high = group
            .iter()
            .enumerate()
            .fold(0u8, |acc, (i, &b)| acc | ((b >> 7) << i));
        out.push(high);
        out.extend(group.iter().map(|&b| b & 0x7F));
    }
    out
}

/// Unpacks a 7-bit payload produced by [`pack`].
///
/// Callers pass the exact payload sub-slice; a final partial group uses only
/// the high bits it needs and never reads past the end of `data`.
pub fn unpack(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(unpacked_len(data.len()));
    for group in data.chunks(PACKED_GROUP) {
        if let Some((&high, body)) = group.split_first() {
            out.extend(
                body.iter()
                    .enumerate()
                    .map(|(i, &b)| b | (((high >> i) & 1) << 7)),
            );
        }
    }
    out
}
