//! FB-01 voice data: 64 bytes, sent as 128 low-first nibbles.
//!
//! ```text
//! +0..7    name
//! +7       user code            +8  LFO speed
//! +9       load LFO<<7 | AMD    +10 LFO sync<<7 | PMD
//! +11      op1..op4 enable in bits 6..3
//! +12      L<<7 | R<<6 | feedback<<3 | algorithm
//! +13      PMS<<4 | AMS         +14 LFO wave<<5
//! +15      transpose (two's complement)
//! +16..48  4 operator blocks of 8 bytes (order 4, 3, 2, 1)
//!          +0 level
//!          +1 KLS type bit 0<<7 | level velocity<<4
//!          +2 KLS depth<<4 | KLS adjust
//!          +3 KLS type bit 1<<7 | detune<<4 | frequency
//!          +4 KRS<<6 | AR     +5 carrier<<7 | AR velocity<<5 | D1R
//!          +6 inharmonic<<6 | D2R   +7 SL<<4 | RR
//! +58      mono<<7 | portamento time
//! +59      pitch mod control<<4 | pitch bend range
//! ```
//!
//! A single-parameter change addresses voice byte `n` as parameter
//! `0x40 + n` and always carries the whole byte.

use std::sync::OnceLock;

use patchwire_core::{BitField, ParamRange, ParameterModel, Patch, RangeMap, name_from_bytes};

/// Voice data length before nibble splitting.
pub const VOICE_LEN: usize = 64;

/// Name length.
pub const NAME_LEN: usize = 7;

/// Parameter number of voice byte 0.
pub const PARAM_BASE: u8 = 0x40;

const OPERATOR_OFFSET: usize = 16;
const OPERATOR_LEN: usize = 8;
const TRANSPOSE_OFFSET: usize = 15;

#[derive(Debug, Clone, Copy)]
struct Field {
    key: &'static str,
    offset: usize,
    bits: BitField,
}

const fn field(key: &'static str, offset: usize, shift: u8, width: u8) -> Field {
    Field { key, offset, bits: BitField::new(shift, width) }
}

const GLOBAL_FIELDS: [Field; 21] = [
    field("usercode", 7, 0, 8),
    field("lfospeed", 8, 0, 8),
    field("loadlfodata", 9, 7, 1),
    field("lfoamplitudemodulationdepth", 9, 0, 7),
    field("lfosync", 10, 7, 1),
    field("lfopitchmodulationdepth", 10, 0, 7),
    field("op1enable", 11, 6, 1),
    field("op2enable", 11, 5, 1),
    field("op3enable", 11, 4, 1),
    field("op4enable", 11, 3, 1),
    field("leftoutputenable", 12, 7, 1),
    field("rightoutputenable", 12, 6, 1),
    field("feedback", 12, 3, 3),
    field("algorithm", 12, 0, 3),
    field("lfopitchmodulationsensitivity", 13, 4, 3),
    field("lfoamplitudemodulationsensitivity", 13, 0, 2),
    field("lfowave", 14, 5, 2),
    field("mono", 58, 7, 1),
    field("portamentotime", 58, 0, 7),
    field("pitchmodcontrol", 59, 4, 3),
    field("pitchbendrange", 59, 0, 4),
];

/// Per-operator fields relative to the operator block. The level-scaling
/// type is split over two bytes and handled separately.
const OPERATOR_FIELDS: [(&str, usize, u8, u8); 15] = [
    ("level", 0, 0, 7),
    ("velocitysensitivityforlevel", 1, 4, 3),
    ("keyboardlevelscalingdepth", 2, 4, 4),
    ("keyboardscalingadjustforlevel", 2, 0, 4),
    ("detune", 3, 4, 3),
    ("frequency", 3, 0, 4),
    ("keyboardratescalingdepth", 4, 6, 2),
    ("attackrate", 4, 0, 5),
    ("carrieram", 5, 7, 1),
    ("velocitysensitivityforattackrate", 5, 5, 2),
    ("decay1rate", 5, 0, 5),
    ("inharmonic", 6, 6, 2),
    ("decay2rate", 6, 0, 5),
    ("sustainlevel", 7, 4, 4),
    ("releaserate", 7, 0, 4),
];

const LEVEL_SCALING_TYPE: &str = "keyboardlevelscalingtype";
const LEVEL_SCALING_TYPE_LOW: (usize, BitField) = (1, BitField::bit(7));
const LEVEL_SCALING_TYPE_HIGH: (usize, BitField) = (3, BitField::bit(7));

fn operator_key(op: usize, suffix: &str) -> String {
    format!("op{op}{suffix}")
}

/// Start of operator `op`'s block. Operator 4 comes first.
fn block_offset(op: usize) -> usize {
    OPERATOR_OFFSET + (4 - op) * OPERATOR_LEN
}

/// Operator number of a key like `op3attackrate`, and the rest of the key.
pub fn split_operator_key(key: &str) -> Option<(usize, &str)> {
    let rest = key.strip_prefix("op")?;
    let digit = rest.chars().next()?.to_digit(10)?;
    (1..=4).contains(&digit).then(|| (digit as usize, &rest[1..]))
}

/// Visits every single-byte field with its resolved key.
fn for_each_field(mut f: impl FnMut(&str, usize, BitField)) {
    for fd in &GLOBAL_FIELDS {
        f(fd.key, fd.offset, fd.bits);
    }
    for op in 1..=4 {
        let base = block_offset(op);
        for &(suffix, offset, shift, width) in &OPERATOR_FIELDS {
            f(&operator_key(op, suffix), base + offset, BitField::new(shift, width));
        }
    }
}

/// Packs `model` into voice bytes.
pub fn encode(model: &dyn ParameterModel) -> [u8; VOICE_LEN] {
    let mut d = [0u8; VOICE_LEN];
    for (i, c) in model.name().bytes().chain(std::iter::repeat(b' ')).take(NAME_LEN).enumerate() {
        d[i] = c & 0x7F;
    }
    for_each_field(|key, offset, bits| d[offset] = bits.insert(d[offset], model.get_or(key, 0)));
    d[TRANSPOSE_OFFSET] = model.get_or("transpose", 0) as i8 as u8;
    for op in 1..=4 {
        let kls = model.get_or(&operator_key(op, LEVEL_SCALING_TYPE), 0);
        let base = block_offset(op);
        let (low, bit) = LEVEL_SCALING_TYPE_LOW;
        d[base + low] = bit.insert(d[base + low], kls);
        let (high, bit) = LEVEL_SCALING_TYPE_HIGH;
        d[base + high] = bit.insert(d[base + high], kls >> 1);
    }
    d
}

/// Unpacks voice bytes. `d` must hold at least [`VOICE_LEN`] bytes.
pub fn decode(d: &[u8]) -> Patch {
    let mut patch = Patch::new(&name_from_bytes(&d[..NAME_LEN]));
    for_each_field(|key, offset, bits| patch.set(key, bits.extract(d[offset])));
    patch.set("transpose", i32::from(d[TRANSPOSE_OFFSET] as i8));
    for op in 1..=4 {
        let base = block_offset(op);
        let (low, lbit) = LEVEL_SCALING_TYPE_LOW;
        let (high, hbit) = LEVEL_SCALING_TYPE_HIGH;
        let kls = lbit.extract(d[base + low]) | (hbit.extract(d[base + high]) << 1);
        patch.set(&operator_key(op, LEVEL_SCALING_TYPE), kls);
    }
    patch
}

/// Voice byte offsets that hold `key`. Empty for unknown keys. The
/// level-scaling type touches two bytes.
pub fn offsets_of(key: &str) -> Vec<usize> {
    if key == "transpose" {
        return vec![TRANSPOSE_OFFSET];
    }
    if let Some((op, rest)) = split_operator_key(key) {
        if rest == LEVEL_SCALING_TYPE {
            let base = block_offset(op);
            return vec![base + LEVEL_SCALING_TYPE_LOW.0, base + LEVEL_SCALING_TYPE_HIGH.0];
        }
    }
    let mut found = Vec::new();
    for_each_field(|k, offset, _| {
        if k == key {
            found.push(offset);
        }
    });
    found
}

/// Every model key.
pub fn model_keys() -> Vec<&'static str> {
    ranges().iter().map(|r| r.key).collect()
}

/// Operator keys, one row per operator.
const OPERATOR_KEYS: [[&str; 17]; 4] = [
    [
        "op1level", "op1velocitysensitivityforlevel", "op1keyboardlevelscalingdepth",
        "op1keyboardscalingadjustforlevel", "op1detune", "op1frequency",
        "op1keyboardratescalingdepth", "op1attackrate", "op1carrieram",
        "op1velocitysensitivityforattackrate", "op1decay1rate", "op1inharmonic",
        "op1decay2rate", "op1sustainlevel", "op1releaserate", "op1keyboardlevelscalingtype",
        "op1enable",
    ],
    [
        "op2level", "op2velocitysensitivityforlevel", "op2keyboardlevelscalingdepth",
        "op2keyboardscalingadjustforlevel", "op2detune", "op2frequency",
        "op2keyboardratescalingdepth", "op2attackrate", "op2carrieram",
        "op2velocitysensitivityforattackrate", "op2decay1rate", "op2inharmonic",
        "op2decay2rate", "op2sustainlevel", "op2releaserate", "op2keyboardlevelscalingtype",
        "op2enable",
    ],
    [
        "op3level", "op3velocitysensitivityforlevel", "op3keyboardlevelscalingdepth",
        "op3keyboardscalingadjustforlevel", "op3detune", "op3frequency",
        "op3keyboardratescalingdepth", "op3attackrate", "op3carrieram",
        "op3velocitysensitivityforattackrate", "op3decay1rate", "op3inharmonic",
        "op3decay2rate", "op3sustainlevel", "op3releaserate", "op3keyboardlevelscalingtype",
        "op3enable",
    ],
    [
        "op4level", "op4velocitysensitivityforlevel", "op4keyboardlevelscalingdepth",
        "op4keyboardscalingadjustforlevel", "op4detune", "op4frequency",
        "op4keyboardratescalingdepth", "op4attackrate", "op4carrieram",
        "op4velocitysensitivityforattackrate", "op4decay1rate", "op4inharmonic",
        "op4decay2rate", "op4sustainlevel", "op4releaserate", "op4keyboardlevelscalingtype",
        "op4enable",
    ],
];

fn operator_range(suffix: &str) -> (i32, i32) {
    match suffix {
        "level" => (0, 127),
        "keyboardlevelscalingdepth" | "keyboardscalingadjustforlevel" | "frequency"
        | "sustainlevel" | "releaserate" => (0, 15),
        "velocitysensitivityforlevel" | "detune" => (0, 7),
        "attackrate" | "decay1rate" | "decay2rate" => (0, 31),
        "carrieram" | "enable" => (0, 1),
        _ => (0, 3),
    }
}

const GLOBAL_RANGES: [ParamRange; 18] = [
    ParamRange::new("usercode", 0, 255),
    ParamRange::new("lfospeed", 0, 255),
    ParamRange::new("loadlfodata", 0, 1),
    ParamRange::new("lfoamplitudemodulationdepth", 0, 127),
    ParamRange::new("lfosync", 0, 1),
    ParamRange::new("lfopitchmodulationdepth", 0, 127),
    ParamRange::new("leftoutputenable", 0, 1),
    ParamRange::new("rightoutputenable", 0, 1),
    ParamRange::new("feedback", 0, 7),
    ParamRange::new("algorithm", 0, 7),
    ParamRange::new("lfopitchmodulationsensitivity", 0, 7),
    ParamRange::new("lfoamplitudemodulationsensitivity", 0, 3),
    ParamRange::new("lfowave", 0, 3),
    ParamRange::new("transpose", -128, 127),
    ParamRange::new("mono", 0, 1),
    ParamRange::new("portamentotime", 0, 127),
    ParamRange::new("pitchmodcontrol", 0, 4),
    ParamRange::new("pitchbendrange", 0, 12),
];

/// Value ranges of every model key.
pub fn ranges() -> &'static RangeMap {
    static RANGES: OnceLock<RangeMap> = OnceLock::new();
    RANGES.get_or_init(|| {
        let mut all: Vec<ParamRange> = GLOBAL_RANGES.to_vec();
        for keys in &OPERATOR_KEYS {
            for &key in keys {
                let (min, max) = operator_range(&key[3..]);
                all.push(ParamRange::new(key, min, max));
            }
        }
        RangeMap::new(all.iter().map(|r| r.key), 0, 0, &all)
    })
}

/// Pitch modulation controllers.
pub const PITCH_MOD_CONTROLS: [&str; 5] =
    ["Off", "Aftertouch", "Pitch Wheel", "Breath Controller", "Foot Controller"];
/// LFO waveforms.
pub const LFO_WAVES: [&str; 4] = ["Sawtooth", "Square", "Triangle", "Sample and Hold"];
/// Keyboard level-scaling curves.
pub const LEVEL_SCALING_TYPES: [&str; 4] = ["1", "2", "3", "4"];
/// Operator role for amplitude modulation.
pub const AMPLITUDE_MODULATION: [&str; 2] = ["Modulator (Off)", "Carrier (On)"];

/// Display list for `key`.
pub fn display_list(key: &str) -> Option<&'static [&'static str]> {
    let list: &'static [&'static str] = match key {
        "pitchmodcontrol" => &PITCH_MOD_CONTROLS,
        "lfowave" => &LFO_WAVES,
        k if k.ends_with(LEVEL_SCALING_TYPE) => &LEVEL_SCALING_TYPES,
        k if k.ends_with("carrieram") => &AMPLITUDE_MODULATION,
        _ => return None,
    };
    Some(list)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voice() -> Patch {
        Patch::new("BASS 1")
            .with("usercode", 200)
            .with("lfospeed", 180)
            .with("loadlfodata", 1)
            .with("lfoamplitudemodulationdepth", 90)
            .with("op1enable", 1)
            .with("op3enable", 1)
            .with("leftoutputenable", 1)
            .with("feedback", 6)
            .with("algorithm", 3)
            .with("lfowave", 2)
            .with("transpose", -12)
            .with("op4level", 100)
            .with("op4keyboardlevelscalingtype", 2)
            .with("op1keyboardlevelscalingtype", 3)
            .with("op1detune", 5)
            .with("op1frequency", 9)
            .with("op2carrieram", 1)
            .with("op2velocitysensitivityforattackrate", 3)
            .with("op3sustainlevel", 11)
            .with("pitchmodcontrol", 4)
            .with("pitchbendrange", 12)
            .with("portamentotime", 77)
            .with("mono", 1)
    }

    #[test]
    fn test_byte_layout() {
        let d = encode(&voice());
        assert_eq!(&d[..7], b"BASS 1 ");
        assert_eq!(d[7], 200);
        assert_eq!(d[9], 0x80 | 90);
        assert_eq!(d[11], 0b0101_0000);
        assert_eq!(d[12], 0x80 | (6 << 3) | 3);
        assert_eq!(d[14], 2 << 5);
        assert_eq!(d[15], 0xF4);
        // operator 4 block first
        assert_eq!(d[16], 100);
        assert_eq!(d[17] & 0x80, 0);
        assert_eq!(d[19] & 0x80, 0x80);
        // operator 1 block last
        assert_eq!(d[40 + 1] & 0x80, 0x80);
        assert_eq!(d[40 + 3], 0x80 | (5 << 4) | 9);
        assert_eq!(d[58], 0x80 | 77);
        assert_eq!(d[59], (4 << 4) | 12);
    }

    #[test]
    fn test_decode_inverts_encode() {
        let v = voice();
        let parsed = decode(&encode(&v));
        assert_eq!(parsed.name(), "BASS 1");
        for (key, value) in v.values() {
            assert_eq!(parsed.get(key), Some(value), "{key}");
        }
        assert_eq!(parsed.get("op2enable"), Some(0));
    }

    #[test]
    fn test_offsets() {
        assert_eq!(offsets_of("usercode"), vec![7]);
        assert_eq!(offsets_of("op4level"), vec![16]);
        assert_eq!(offsets_of("op1releaserate"), vec![47]);
        assert_eq!(offsets_of("op2keyboardlevelscalingtype"), vec![33, 35]);
        assert_eq!(offsets_of("pitchbendrange"), vec![59]);
        assert!(offsets_of("bogus").is_empty());
    }

    #[test]
    fn test_ranges_cover_every_key() {
        let r = ranges();
        assert_eq!(r.len(), 18 + 4 * 17);
        assert_eq!(r.get("transpose").map(|r| (r.min, r.max)), Some((-128, 127)));
        assert_eq!(r.get("op3attackrate").map(|r| r.max), Some(31));
        assert_eq!(r.get("op2inharmonic").map(|r| r.max), Some(3));
        assert_eq!(r.get("op1keyboardlevelscalingtype").map(|r| r.max), Some(3));
        assert_eq!(r.get("op4enable").map(|r| r.max), Some(1));
        for key in model_keys() {
            assert!(split_operator_key(key).is_some() || GLOBAL_RANGES.iter().any(|g| g.key == key));
        }
    }
}
