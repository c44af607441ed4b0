//! Additive 7-bit checksums.
//!
//! Both Yamaha and M-Audio close a frame with `(0 - sum) & 0x7F` over a
//! device-specific byte range. Yamaha documents it as
//! `(256 - (sum & 255)) & 127`, which is the same value. Summing with a
//! wrapping `u32` keeps the result independent of frame size.
//!
//! Incoming frames are not rejected on mismatch; [`verify`] is available for
//! diagnostics.

/// Sum of `bytes` with wrapping arithmetic.
#[inline]
fn sum(bytes: &[u8]) -> u32 {
    bytes
        .iter()
        .fold(0u32, |acc, &b| acc.wrapping_add(u32::from(b)))
}

/// Checksum byte for the given range.
///
/// # Example
///
/// ```rust
/// use patchwire_core::checksum::checksum;
///
/// assert_eq!(checksum(&[0x01, 0x02]), 0x7D);
/// ```
pub fn checksum(bytes: &[u8]) -> u8 {
    (0u32.wrapping_sub(sum(bytes)) & 0x7F) as u8
}

/// True when `bytes` (range plus its trailing checksum byte) sums to
/// `0 mod 128`.
pub fn verify(bytes: &[u8]) -> bool {
    sum(bytes) & 0x7F == 0
}
