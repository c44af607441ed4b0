//! Property-based tests for patchwire-core byte transforms.
//!
//! Tests packing round trips, length formulas, checksum closure, and frame
//! splitting using proptest for randomized input generation.

use patchwire_core::frame::{FrameBuilder, split_frames};
use patchwire_core::seven_bit::{pack, packed_len, unpack, unpacked_len};
use patchwire_core::{BitField, checksum, nibble};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Packing then unpacking returns the input for 7-bit data of any length.
    #[test]
    fn seven_bit_round_trip(data in prop::collection::vec(0u8..=0x7F, 0..512)) {
        let packed = pack(&data);
        prop_assert_eq!(unpack(&packed), data);
    }

    /// The high bits survive too, so full 8-bit data also round-trips.
    #[test]
    fn eight_bit_round_trip(data in prop::collection::vec(any::<u8>(), 0..512)) {
        let packed = pack(&data);
        prop_assert!(packed.iter().all(|&b| b <= 0x7F));
        prop_assert_eq!(unpack(&packed), data);
    }

    /// Output lengths follow the group formulas.
    #[test]
    fn length_formulas(n in 0usize..2048) {
        let expected = (n / 7) * 8 + if n % 7 > 0 { n % 7 + 1 } else { 0 };
        prop_assert_eq!(packed_len(n), expected);
        prop_assert_eq!(pack(&vec![0u8; n]).len(), expected);
        prop_assert_eq!(unpacked_len(expected), n);
    }

    /// A range plus its checksum sums to zero mod 128.
    #[test]
    fn checksum_closes_range(data in prop::collection::vec(0u8..=0x7F, 0..4096)) {
        let mut with = data.clone();
        with.push(checksum::checksum(&data));
        prop_assert!(checksum::verify(&with));
        prop_assert!(with.iter().all(|&b| b <= 0x7F));
    }

    /// Insert then extract returns the masked value and preserves other bits.
    #[test]
    fn bit_field_insert_extract(byte in any::<u8>(), shift in 0u8..8, width in 1u8..=8, value in 0i32..256) {
        prop_assume!(shift + width <= 8);
        let field = BitField::new(shift, width);
        let out = field.insert(byte, value);
        prop_assert_eq!(field.extract(out), value & field.max());
        prop_assert_eq!(out & !field.mask(), byte & !field.mask());
    }

    /// Nibble splitting is lossless.
    #[test]
    fn nibble_round_trip(data in prop::collection::vec(any::<u8>(), 0..256)) {
        let nibbles = nibble::nibblize_low_first(&data);
        prop_assert!(nibbles.iter().all(|&n| n < 16));
        prop_assert_eq!(nibble::denibblize_low_first(&nibbles), data);
    }

    /// Frames built from arbitrary 7-bit payloads are recovered by splitting
    /// their concatenation, with stray bytes in between.
    #[test]
    fn split_recovers_built_frames(
        payloads in prop::collection::vec(prop::collection::vec(0u8..=0x7F, 0..64), 1..8),
        stray in 0u8..0x7F,
    ) {
        let frames: Vec<Vec<u8>> = payloads
            .iter()
            .map(|p| FrameBuilder::new(&[0xF0, 0x43]).checksum_from_here().extend(p).finish())
            .collect();
        let mut stream = Vec::new();
        for f in &frames {
            stream.extend_from_slice(f);
            stream.push(stray);
        }
        let split: Vec<&[u8]> = split_frames(&stream).collect();
        prop_assert_eq!(split.len(), frames.len());
        for (a, b) in split.iter().zip(&frames) {
            prop_assert_eq!(*a, b.as_slice());
        }
    }
}
