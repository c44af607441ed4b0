//! FB-01 voice bank dumps: 48 voices plus an 8-character bank name.
//!
//! Two framings carry the same body:
//!
//! ```text
//! bank 0   F0 43 0n 0C 00 40                 (6 bytes)
//! bank X   F0 43 75 0n 00 00 0m 00 40        (9 bytes)
//! body     16 nibbles name, 48 nibbles zero, checksum
//!          48 x [01 00, 128 nibbles voice, checksum]
//!          F7
//! ```
//!
//! Only the bank X form names its bank, so every write goes out in that
//! form.

use patchwire_core::{
    CodecError, Patch, PatchLocation, checksum, name_from_bytes, nibble, padded_name_bytes,
    sanitize_name,
};

use super::voice;

/// Voices per bank.
pub const VOICES: usize = 48;
/// Bank name length.
pub const BANK_NAME_LEN: usize = 8;
/// Bytes per voice record: two count bytes, 128 nibbles, checksum.
pub const RECORD_LEN: usize = 2 + 2 * voice::VOICE_LEN + 1;

const HEADER_NIBBLES: usize = 64;
const RECORD_HEADER: [u8; 2] = [0x01, 0x00];

/// Which framing a bank dump uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BankForm {
    /// `F0 43 0n 0C`, always bank 0.
    BankZero,
    /// `F0 43 75 0n 00 00 0m`, bank `m`.
    BankX,
}

impl BankForm {
    /// Frame length.
    pub const fn frame_len(self) -> usize {
        self.records_offset() + VOICES * RECORD_LEN + 1
    }

    /// Offset of the bank name nibbles.
    pub const fn name_offset(self) -> usize {
        match self {
            BankForm::BankZero => 6,
            BankForm::BankX => 9,
        }
    }

    /// Offset of the header checksum.
    pub const fn header_checksum_offset(self) -> usize {
        self.name_offset() + HEADER_NIBBLES
    }

    /// Offset of the first voice record.
    pub const fn records_offset(self) -> usize {
        self.header_checksum_offset() + 1
    }

    /// Form of `data`, if it is a bank dump.
    pub fn detect(data: &[u8]) -> Option<Self> {
        let form = if data.len() == BankForm::BankX.frame_len()
            && data[..3] == [0xF0, 0x43, 0x75]
            && data[4..6] == [0x00, 0x00]
            && data[7..9] == [0x00, 0x40]
        {
            BankForm::BankX
        } else if data.len() == BankForm::BankZero.frame_len()
            && data[..2] == [0xF0, 0x43]
            && data[3..6] == [0x0C, 0x00, 0x40]
        {
            BankForm::BankZero
        } else {
            return None;
        };
        (data[data.len() - 1] == 0xF7).then_some(form)
    }
}

/// True when `data` is a bank dump in either form.
pub fn is_bank(data: &[u8]) -> bool {
    BankForm::detect(data).is_some()
}

/// Bank index named by a bank X dump.
pub fn bank_number(data: &[u8]) -> Option<u8> {
    match BankForm::detect(data)? {
        BankForm::BankX => Some(data[6]),
        BankForm::BankZero => Some(0),
    }
}

fn chars_from_nibbles(nibbles: &[u8]) -> String {
    name_from_bytes(&nibble::denibblize_low_first(nibbles))
}

fn name_nibbles(name: &str, len: usize) -> Vec<u8> {
    nibble::nibblize_low_first(&padded_name_bytes(&sanitize_name(name, len), len))
}

/// The bank's own name.
pub fn bank_name(data: &[u8]) -> Option<String> {
    let form = BankForm::detect(data)?;
    let start = form.name_offset();
    Some(chars_from_nibbles(&data[start..start + 2 * BANK_NAME_LEN]))
}

fn record(data: &[u8], index: usize) -> Result<&[u8], CodecError> {
    let form = BankForm::detect(data).ok_or(CodecError::BadHeader)?;
    if index >= VOICES {
        return Err(CodecError::PatchIndexOutOfRange { index, count: VOICES });
    }
    let start = form.records_offset() + index * RECORD_LEN;
    data.get(start..start + RECORD_LEN).ok_or(CodecError::Truncated {
        expected: start + RECORD_LEN,
        actual: data.len(),
    })
}

fn voice_nibbles(record: &[u8]) -> &[u8] {
    &record[RECORD_HEADER.len()..RECORD_LEN - 1]
}

/// Name of voice `index`.
pub fn voice_name(data: &[u8], index: usize) -> Result<String, CodecError> {
    let rec = record(data, index)?;
    Ok(chars_from_nibbles(&voice_nibbles(rec)[..2 * voice::NAME_LEN]))
}

/// Decodes voice `index`. Bank X dumps give the location's bank; bank 0
/// dumps are placed in bank 0.
pub fn decode_voice(data: &[u8], index: usize) -> Result<Patch, CodecError> {
    let rec = record(data, index)?;
    let bytes = nibble::denibblize_low_first(voice_nibbles(rec));
    let bank = bank_number(data).unwrap_or(0);
    Ok(voice::decode(&bytes).with_location(PatchLocation::new(bank, index as u8)))
}

fn push_record(out: &mut Vec<u8>, model: &Patch) {
    let nibbles = nibble::nibblize_low_first(&voice::encode(model));
    out.extend_from_slice(&RECORD_HEADER);
    out.extend_from_slice(&nibbles);
    out.push(checksum::checksum(&nibbles));
}

/// Builds a bank X dump for `bank` named `name`. `fill` supplies records
/// past the end of `voices`. `device` is the wire device byte.
pub fn encode_bank(voices: &[Patch], fill: &Patch, device: u8, bank: u8, name: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(BankForm::BankX.frame_len());
    out.extend_from_slice(&[0xF0, 0x43, 0x75, device & 0x0F, 0x00, 0x00, bank & 0x07, 0x00, 0x40]);
    let mut header = name_nibbles(name, BANK_NAME_LEN);
    header.resize(HEADER_NIBBLES, 0);
    out.extend_from_slice(&header);
    out.push(checksum::checksum(&header));
    for i in 0..VOICES {
        push_record(&mut out, voices.get(i).unwrap_or(fill));
    }
    out.push(0xF7);
    out
}

/// Rewrites a bank dump of either form as a bank X dump addressed to
/// `device` and `bank`, optionally renaming it. The header checksum is
/// recomputed. `None` when `data` is not a bank dump.
pub fn retarget(data: &[u8], device: u8, bank: u8, name: Option<&str>) -> Option<Vec<u8>> {
    let form = BankForm::detect(data)?;
    let mut out = vec![0xF0, 0x43, 0x75, device & 0x0F, 0x00, 0x00, bank & 0x07, 0x00, 0x40];
    out.extend_from_slice(&data[form.name_offset()..]);

    let x = BankForm::BankX;
    if let Some(name) = name {
        let start = x.name_offset();
        out[start..start + 2 * BANK_NAME_LEN].copy_from_slice(&name_nibbles(name, BANK_NAME_LEN));
    }
    let cs = x.header_checksum_offset();
    out[cs] = checksum::checksum(&out[x.name_offset()..cs]);
    Some(out)
}

/// Splits a bank X dump into the header packet and one packet per record.
/// The final packet carries the closing `F7`.
pub fn packets(frame: &[u8]) -> Vec<Vec<u8>> {
    let start = BankForm::BankX.records_offset();
    let mut out = vec![frame[..start.min(frame.len())].to_vec()];
    let body = frame.get(start..).unwrap_or_default();
    let mut chunks: Vec<Vec<u8>> = body.chunks(RECORD_LEN).map(<[u8]>::to_vec).collect();
    // The trailing F7 lands in a chunk of its own.
    if chunks.last().is_some_and(|c| c.len() < RECORD_LEN) {
        if let Some(tail) = chunks.pop() {
            if let Some(last) = chunks.last_mut() {
                last.extend(tail);
            }
        }
    }
    out.extend(chunks);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use patchwire_core::ParameterModel;

    fn voices() -> Vec<Patch> {
        (0..3)
            .map(|i| {
                Patch::new(&format!("VOX {i}"))
                    .with("algorithm", i)
                    .with("op2level", 100 + i)
                    .with("transpose", -i)
            })
            .collect()
    }

    fn bank_zero(x: &[u8]) -> Vec<u8> {
        let mut out = vec![0xF0, 0x43, 0x02, 0x0C, 0x00, 0x40];
        out.extend_from_slice(&x[BankForm::BankX.name_offset()..]);
        out
    }

    #[test]
    fn test_bank_x_shape() {
        let bank = encode_bank(&voices(), &Patch::new("INIT"), 0, 1, "MY BANK");
        assert_eq!(bank.len(), 6363);
        assert_eq!(BankForm::detect(&bank), Some(BankForm::BankX));
        assert_eq!(bank_number(&bank), Some(1));
        assert_eq!(bank_name(&bank).as_deref(), Some("MY BANK"));
        let cs = BankForm::BankX.header_checksum_offset();
        assert!(checksum::verify(&bank[9..=cs]));
        let rec = record(&bank, 2).unwrap();
        assert_eq!(&rec[..2], &RECORD_HEADER);
        assert!(checksum::verify(&rec[2..]));
        assert!(bank[1..bank.len() - 1].iter().all(|&b| b <= 0x7F));
    }

    #[test]
    fn test_bank_zero_form() {
        let x = encode_bank(&voices(), &Patch::new("INIT"), 0, 1, "ZERO");
        let zero = bank_zero(&x);
        assert_eq!(zero.len(), 6360);
        assert_eq!(BankForm::detect(&zero), Some(BankForm::BankZero));
        assert_eq!(BankForm::BankZero.records_offset(), 71);
        assert_eq!(bank_name(&zero).as_deref(), Some("ZERO"));
        let p = decode_voice(&zero, 1).unwrap();
        assert_eq!(p.name(), "VOX 1");
        assert_eq!(p.location(), Some(PatchLocation::new(0, 1)));
    }

    #[test]
    fn test_decode_records() {
        let bank = encode_bank(&voices(), &Patch::new("INIT"), 0, 1, "B");
        let p = decode_voice(&bank, 2).unwrap();
        assert_eq!(p.get("op2level"), Some(102));
        assert_eq!(p.get("transpose"), Some(-2));
        assert_eq!(p.location(), Some(PatchLocation::new(1, 2)));
        assert_eq!(voice_name(&bank, 0).unwrap(), "VOX 0");
        assert_eq!(voice_name(&bank, 47).unwrap(), "INIT");
        assert_eq!(
            decode_voice(&bank, 48),
            Err(CodecError::PatchIndexOutOfRange { index: 48, count: 48 })
        );
        assert_eq!(decode_voice(&bank[..100], 0), Err(CodecError::BadHeader));
    }

    #[test]
    fn test_retarget_from_bank_zero() {
        let x = encode_bank(&voices(), &Patch::new("INIT"), 0, 1, "OLD");
        let zero = bank_zero(&x);
        let out = retarget(&zero, 4, 0, Some("NEW NAME")).unwrap();
        assert_eq!(out.len(), 6363);
        assert_eq!(&out[..9], &[0xF0, 0x43, 0x75, 0x04, 0x00, 0x00, 0x00, 0x00, 0x40]);
        assert_eq!(bank_name(&out).as_deref(), Some("NEW NAME"));
        let cs = BankForm::BankX.header_checksum_offset();
        assert!(checksum::verify(&out[9..=cs]));
        assert_eq!(&out[74..], &zero[71..]);
    }

    #[test]
    fn test_retarget_keeps_name() {
        let x = encode_bank(&voices(), &Patch::new("INIT"), 0, 0, "KEEP");
        let out = retarget(&x, 0, 1, None).unwrap();
        assert_eq!(bank_name(&out).as_deref(), Some("KEEP"));
        assert_eq!(bank_number(&out), Some(1));
        assert!(retarget(&[0xF0, 0xF7], 0, 0, None).is_none());
    }

    #[test]
    fn test_packets() {
        let x = encode_bank(&voices(), &Patch::new("INIT"), 0, 0, "P");
        let p = packets(&x);
        assert_eq!(p.len(), 49);
        assert_eq!(p[0].len(), 74);
        assert!(p[1..48].iter().all(|r| r.len() == RECORD_LEN));
        assert_eq!(p[48].len(), RECORD_LEN + 1);
        assert_eq!(p[48].last(), Some(&0xF7));
        assert_eq!(p.concat(), x);
    }
}
