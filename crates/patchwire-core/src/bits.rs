//! Bit fields inside a single payload byte.
//!
//! Many devices pack several small parameters into one byte. [`BitField`]
//! names one sub-field by shift and width; [`FlagLayout`] ties a set of
//! fields to model keys so a whole byte can be packed or unpacked at once.
//!
//! ```text
//! Venom oscillator flags byte
//!  bit  7   6     5        4        3        2       1       0
//!       -   1   osc3kt   osc2kt   osc1kt   osc3sy  osc2sy  waveshape
//! ```

use crate::model::ParameterModel;

/// A `width`-bit field starting at bit `shift`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitField {
    /// Position of the field's lowest bit.
    pub shift: u8,
    /// Number of bits.
    pub width: u8,
}

impl BitField {
    /// Field of `width` bits at `shift`.
    pub const fn new(shift: u8, width: u8) -> Self {
        Self { shift, width }
    }

    /// Single-bit field.
    pub const fn bit(shift: u8) -> Self {
        Self::new(shift, 1)
    }

    /// Unshifted value mask, e.g. `0b111` for a 3-bit field.
    #[inline]
    pub const fn value_mask(&self) -> u8 {
        ((1u16 << self.width) - 1) as u8
    }

    /// Mask of the field's bits in place.
    #[inline]
    pub const fn mask(&self) -> u8 {
        self.value_mask() << self.shift
    }

    /// Largest value the field can hold.
    pub const fn max(&self) -> i32 {
        self.value_mask() as i32
    }

    /// Reads the field from `byte`.
    #[inline]
    pub fn extract(&self, byte: u8) -> i32 {
        i32::from((byte >> self.shift) & self.value_mask())
    }

    /// Writes `value` (masked to the field width) into `byte`, leaving other
    /// bits untouched.
    #[inline]
    pub fn insert(&self, byte: u8, value: i32) -> u8 {
        (byte & !self.mask()) | (((value as u8) & self.value_mask()) << self.shift)
    }
}

/// Fixed assignment of model keys to the bit fields of one byte.
#[derive(Debug, Clone, Copy)]
pub struct FlagLayout {
    /// Model key and bit field for each sub-parameter.
    pub fields: &'static [(&'static str, BitField)],
    /// Bits always written as 1 and ignored on read.
    pub always_set: u8,
}

impl FlagLayout {
    /// Builds the byte from the model. Missing keys read as 0.
    pub fn pack(&self, model: &dyn ParameterModel) -> u8 {
        self.fields
            .iter()
            .fold(self.always_set, |byte, (key, field)| {
                field.insert(byte, model.get_or(key, 0))
            })
    }

    /// Writes every field of `byte` into the model.
    pub fn unpack(&self, byte: u8, model: &mut dyn ParameterModel) {
        for (key, field) in self.fields {
            model.set(key, field.extract(byte));
        }
    }

    /// True when `key` is one of this layout's fields.
    pub fn contains(&self, key: &str) -> bool {
        self.fields.iter().any(|(k, _)| *k == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Patch;

    const SIX_FLAGS: FlagLayout = FlagLayout {
        fields: &[
            ("waveshape", BitField::bit(0)),
            ("osc2sync", BitField::bit(1)),
            ("osc3sync", BitField::bit(2)),
            ("osc1keytrack", BitField::bit(3)),
            ("osc2keytrack", BitField::bit(4)),
            ("osc3keytrack", BitField::bit(5)),
        ],
        always_set: 0x40,
    };

    #[test]
    fn extract_and_insert() {
        let f = BitField::new(3, 3);
        assert_eq!(f.mask(), 0b0011_1000);
        assert_eq!(f.max(), 7);
        assert_eq!(f.extract(0b0010_1000), 5);
        assert_eq!(f.insert(0xFF, 0), 0b1100_0111);
        assert_eq!(f.insert(0, 9), 0b0000_1000);
    }

    #[test]
    fn all_flag_combinations_round_trip() {
        for combo in 0u8..64 {
            let mut src = Patch::new("");
            for (i, (key, _)) in SIX_FLAGS.fields.iter().enumerate() {
                src.set(key, i32::from((combo >> i) & 1));
            }
            let byte = SIX_FLAGS.pack(&src);
            assert_eq!(byte, combo | 0x40);

            let mut dst = Patch::new("");
            SIX_FLAGS.unpack(byte, &mut dst);
            assert_eq!(dst, src, "combination {combo:#08b}");
        }
    }

    #[test]
    fn always_set_bit_is_ignored_on_read() {
        let mut with = Patch::new("");
        let mut without = Patch::new("");
        SIX_FLAGS.unpack(0x45, &mut with);
        SIX_FLAGS.unpack(0x05, &mut without);
        assert_eq!(with, without);
    }

    #[test]
    fn width_eight_field() {
        let f = BitField::new(0, 8);
        assert_eq!(f.value_mask(), 0xFF);
        assert_eq!(f.extract(0xAB), 0xAB);
    }
}
