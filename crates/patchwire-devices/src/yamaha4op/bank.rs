//! VMEM bank dumps: 32 voices in one 4104-byte frame.
//!
//! Each 128-byte record packs the VCED, ACED, ACED2, EFEDS and ACED3 values
//! into bit fields:
//!
//! ```text
//! +0..40   4 operator blocks of 10 bytes (order 4, 2, 3, 1)
//!          +0 AR  +1 D1R  +2 D2R  +3 RR  +4 D1L  +5 LS
//!          +6 AME<<6 | EBS<<3 | KVS   +7 OUT  +8 CRS
//!          +9 LS sign<<6 | KVS sign<<5 | RS<<3 | DET
//!             KVS sign differs from banks written by other editors,
//!             which put it at bit 3
//! +40      SYNC<<6 | FBL<<3 | ALG
//! +41..45  LFS LFD PMD AMD
//! +45      PMS<<4 | AMS<<2 | LFW
//! +46 TRPS  +47 PBR
//! +48      CH<<4 | MO<<3 | SU<<2 | PO<<1 | PM
//! +49..57  PORT FCVOL MWPITCH MWAMPLI BCPITCH BCAMPLI BCPBIAS BCEBIAS
//! +57..67  name
//! +67..73  pitch EG rates and levels
//! +73      per operator, 2 bytes: FIXRM<<6 | EGSFT<<4 | FIX<<3 | FIXRG
//!                                 OSW<<4 | FINE
//! +81..84  REV FC PITCH FC AMPLI
//! +84..88  AT PITCH AT AMPLI AT PBIAS AT EBIAS
//! +91..94  effect preset, time, balance
//! +94..101 V50 effect sel, balance, out level, stereo mix, params 1..3
//! ```

use patchwire_core::{
    BitField, CodecError, FrameBuilder, ParameterModel, Patch, checksum, name_from_bytes,
    padded_name_bytes,
};

use super::tables::{LEVEL_SCALING_SIGN_KEYS, NAME_LEN, VELOCITY_SIGN_KEYS};

/// Bank frame length.
pub const VMEM_LEN: usize = 4104;
/// Voices per bank.
pub const VOICES: usize = 32;
/// Bytes per voice record.
pub const RECORD_LEN: usize = 128;
/// Offset of the first record.
pub const RECORDS_OFFSET: usize = 6;

const NAME_OFFSET: usize = 57;

/// Where one parameter lives inside a record.
#[derive(Debug, Clone, Copy)]
struct Field {
    key: &'static str,
    offset: usize,
    bits: BitField,
}

const fn field(key: &'static str, offset: usize, shift: u8, width: u8) -> Field {
    Field { key, offset, bits: BitField::new(shift, width) }
}

/// Per-operator fields relative to the operator block.
const OPERATOR_FIELDS: [(&str, usize, u8, u8); 15] = [
    ("attackrate", 0, 0, 5),
    ("decay1rate", 1, 0, 5),
    ("decay2rate", 2, 0, 5),
    ("releaserate", 3, 0, 4),
    ("decay1level", 4, 0, 4),
    ("levelscaling", 5, 0, 7),
    ("amplitudemodulationenable", 6, 6, 1),
    ("egbiassensitivity", 6, 3, 3),
    ("keyvelocitysensitivity", 6, 0, 3),
    ("outputlevel", 7, 0, 7),
    ("frequencycoarse", 8, 0, 6),
    ("ratescaling", 9, 3, 2),
    ("detune", 9, 0, 3),
    ("vkeyvelocitysensitivitysign", 9, 5, 1),
    ("vlevelscalingsign", 9, 6, 1),
];

/// Per-operator ACED fields relative to `73 + 2 * block`.
const OPERATOR_ACED_FIELDS: [(&str, usize, u8, u8); 6] = [
    ("vshift", 0, 6, 1),
    ("shift", 0, 4, 2),
    ("fix", 0, 3, 1),
    ("fixedfrequencyrange", 0, 0, 3),
    ("operatorwaveform", 1, 4, 3),
    ("frequencyfine", 1, 0, 4),
];

const GLOBAL_FIELDS: [Field; 45] = [
    field("lfosync", 40, 6, 1),
    field("feedback", 40, 3, 3),
    field("algorithm", 40, 0, 3),
    field("lfospeed", 41, 0, 7),
    field("lfodelay", 42, 0, 7),
    field("lfopitchmodulationdepth", 43, 0, 7),
    field("lfoamplitudemodulationdepth", 44, 0, 7),
    field("lfopitchmodulationsensitivity", 45, 4, 3),
    field("lfoamplitudemodulationsensitivity", 45, 2, 2),
    field("lfowave", 45, 0, 2),
    field("transpose", 46, 0, 6),
    field("pitchbendrange", 47, 0, 4),
    field("chorus", 48, 4, 1),
    field("mono", 48, 3, 1),
    field("sustain", 48, 2, 1),
    field("portamento", 48, 1, 1),
    field("fulltimeportamentomode", 48, 0, 1),
    field("portamentotime", 49, 0, 7),
    field("footcontrolvolume", 50, 0, 7),
    field("modulationwheelpitch", 51, 0, 7),
    field("modulationwheelamplitude", 52, 0, 7),
    field("breathcontrolpitch", 53, 0, 7),
    field("breathcontrolamplitude", 54, 0, 7),
    field("breathcontrolpitchbias", 55, 0, 7),
    field("breathcontrolenvelopebias", 56, 0, 7),
    field("pitchattackrate", 67, 0, 7),
    field("pitchdecayrate", 68, 0, 7),
    field("pitchreleaserate", 69, 0, 7),
    field("pitchattacklevel", 70, 0, 7),
    field("pitchdecaylevel", 71, 0, 7),
    field("pitchreleaselevel", 72, 0, 7),
    field("reverbrate", 81, 0, 3),
    field("footcontrolpitch", 82, 0, 7),
    field("footcontrolamplitude", 83, 0, 7),
    field("aftertouchpitch", 84, 0, 7),
    field("aftertouchamplitude", 85, 0, 7),
    field("aftertouchpitchbias", 86, 0, 7),
    field("aftertouchenvelopebias", 87, 0, 7),
    field("effectpreset", 91, 0, 4),
    field("effecttime", 92, 0, 7),
    field("effectbalance", 93, 0, 7),
    field("veffectsel", 94, 0, 6),
    field("veffectbalance", 95, 0, 7),
    field("veffectoutlevel", 96, 0, 7),
    field("veffectstereomix", 97, 0, 1),
];

const V50_PARAM_FIELDS: [Field; 3] = [
    field("veffectparam1", 98, 0, 7),
    field("veffectparam2", 99, 0, 7),
    field("veffectparam3", 100, 0, 7),
];

/// Operator number stored in record block `block`.
const BLOCK_OPERATORS: [usize; 4] = [4, 2, 3, 1];

fn operator_key(op: usize, suffix: &str) -> String {
    format!("operator{op}{suffix}")
}

/// Visits every field of a record with its resolved key.
fn for_each_field(mut f: impl FnMut(&str, usize, BitField)) {
    for (block, &op) in BLOCK_OPERATORS.iter().enumerate() {
        for &(suffix, offset, shift, width) in &OPERATOR_FIELDS {
            f(&operator_key(op, suffix), block * 10 + offset, BitField::new(shift, width));
        }
        for &(suffix, offset, shift, width) in &OPERATOR_ACED_FIELDS {
            f(&operator_key(op, suffix), 73 + block * 2 + offset, BitField::new(shift, width));
        }
    }
    for fd in GLOBAL_FIELDS.iter().chain(&V50_PARAM_FIELDS) {
        f(fd.key, fd.offset, fd.bits);
    }
}

/// True when `frame` is a VMEM bank dump.
pub fn is_vmem(frame: &[u8]) -> bool {
    frame.len() == VMEM_LEN
        && frame[..2] == [0xF0, 0x43]
        && frame[3..6] == [0x04, 0x20, 0x00]
        && frame[VMEM_LEN - 1] == 0xF7
}

fn record(data: &[u8], index: usize) -> Result<&[u8], CodecError> {
    if index >= VOICES {
        return Err(CodecError::PatchIndexOutOfRange { index, count: VOICES });
    }
    let start = RECORDS_OFFSET + index * RECORD_LEN;
    data.get(start..start + RECORD_LEN).ok_or(CodecError::Truncated {
        expected: VMEM_LEN,
        actual: data.len(),
    })
}

/// Name of voice `index`.
pub fn voice_name(data: &[u8], index: usize) -> Result<String, CodecError> {
    let rec = record(data, index)?;
    Ok(name_from_bytes(&rec[NAME_OFFSET..NAME_OFFSET + NAME_LEN]))
}

/// Decodes voice `index`. The location is set to bank 0, since a VMEM dump
/// does not say which bank it came from.
pub fn decode_voice(data: &[u8], index: usize) -> Result<Patch, CodecError> {
    let rec = record(data, index)?;
    let mut patch = Patch::new(&name_from_bytes(&rec[NAME_OFFSET..NAME_OFFSET + NAME_LEN]))
        .with_location(patchwire_core::PatchLocation::new(0, index as u8));
    for_each_field(|key, offset, bits| patch.set(key, bits.extract(rec[offset])));
    Ok(patch)
}

/// Writes one voice record. Sign bits are written only when `signed`.
fn encode_voice(model: &dyn ParameterModel, signed: bool, rec: &mut [u8]) {
    rec[NAME_OFFSET..NAME_OFFSET + NAME_LEN]
        .copy_from_slice(&padded_name_bytes(model.name(), NAME_LEN));
    for_each_field(|key, offset, bits| {
        let is_sign = VELOCITY_SIGN_KEYS.contains(&key) || LEVEL_SCALING_SIGN_KEYS.contains(&key);
        if signed || !is_sign {
            rec[offset] = bits.insert(rec[offset], model.get_or(key, 0));
        }
    });
}

/// Builds a VMEM dump on `channel`. `fill` supplies records past the end
/// of `voices`.
pub fn encode_bank(voices: &[Patch], fill: &Patch, channel: u8, signed: bool) -> Vec<u8> {
    let mut records = vec![0u8; VOICES * RECORD_LEN];
    for (i, rec) in records.chunks_exact_mut(RECORD_LEN).enumerate() {
        encode_voice(voices.get(i).unwrap_or(fill), signed, rec);
    }
    let frame = FrameBuilder::new(&[0xF0, 0x43, channel & 0x0F, 0x04, 0x20, 0x00])
        .checksum_from_here()
        .extend(&records)
        .finish();
    debug_assert!(checksum::verify(&frame[RECORDS_OFFSET..VMEM_LEN - 1]));
    frame
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voice(n: i32) -> Patch {
        Patch::new(&format!("VOICE {n}"))
            .with("algorithm", 5)
            .with("feedback", 6)
            .with("lfosync", 1)
            .with("operator1ratescaling", 2)
            .with("operator1detune", 5)
            .with("operator3vlevelscalingsign", 1)
            .with("operator2vkeyvelocitysensitivitysign", 1)
            .with("operator4frequencyfine", 9)
            .with("operator4operatorwaveform", 6)
            .with("operator4shift", 2)
            .with("aftertouchpitchbias", 80)
            .with("veffectparam3", 99)
            .with("transpose", 24 + n)
    }

    #[test]
    fn test_bank_shape() {
        let bank = encode_bank(&[voice(0)], &Patch::new("INIT VOICE"), 3, true);
        assert_eq!(bank.len(), VMEM_LEN);
        assert_eq!(&bank[..6], &[0xF0, 0x43, 0x03, 0x04, 0x20, 0x00]);
        assert!(is_vmem(&bank));
        assert!(bank[1..VMEM_LEN - 1].iter().all(|&b| b <= 0x7F));
    }

    #[test]
    fn test_record_round_trip() {
        let voices: Vec<Patch> = (0..3).map(voice).collect();
        let bank = encode_bank(&voices, &Patch::new("INIT VOICE"), 0, true);
        for (i, v) in voices.iter().enumerate() {
            let p = decode_voice(&bank, i).unwrap();
            assert_eq!(p.name(), v.name());
            for (key, value) in v.values() {
                assert_eq!(p.get(key), Some(value), "{key}");
            }
        }
        assert_eq!(voice_name(&bank, 31).unwrap(), "INIT VOICE");
    }

    #[test]
    fn test_packed_bytes() {
        let bank = encode_bank(&[voice(0)], &Patch::new(""), 0, true);
        let rec = &bank[RECORDS_OFFSET..RECORDS_OFFSET + RECORD_LEN];
        assert_eq!(rec[40], (1 << 6) | (6 << 3) | 5);
        // operator 1 is the fourth block
        assert_eq!(rec[30 + 9], (2 << 3) | 5);
        assert_eq!(rec[74], (6 << 4) | 9);
        assert_eq!(rec[73], 2 << 4);
    }

    #[test]
    fn test_unsigned_bank_drops_signs() {
        let bank = encode_bank(&[voice(0)], &Patch::new(""), 0, false);
        let p = decode_voice(&bank, 0).unwrap();
        assert_eq!(p.get("operator3vlevelscalingsign"), Some(0));
        assert_eq!(p.get("operator2vkeyvelocitysensitivitysign"), Some(0));
    }

    #[test]
    fn test_aftertouch_keeps_seven_bits() {
        let v = Patch::new("AT")
            .with("aftertouchpitch", 99)
            .with("aftertouchamplitude", 50);
        let bank = encode_bank(&[v], &Patch::new(""), 0, true);
        let rec = &bank[RECORDS_OFFSET..RECORDS_OFFSET + RECORD_LEN];
        assert_eq!(rec[84], 99);
        assert_eq!(rec[85], 50);
        let p = decode_voice(&bank, 0).unwrap();
        assert_eq!(p.get("aftertouchpitch"), Some(99));
        assert_eq!(p.get("aftertouchamplitude"), Some(50));
    }

    #[test]
    fn test_index_errors() {
        let bank = encode_bank(&[], &Patch::new(""), 0, false);
        assert_eq!(
            decode_voice(&bank, 32),
            Err(CodecError::PatchIndexOutOfRange { index: 32, count: 32 })
        );
        assert!(matches!(decode_voice(&bank[..100], 3), Err(CodecError::Truncated { .. })));
    }
}
