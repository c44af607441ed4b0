//! Multi-frame voice reassembly.
//!
//! A 4-op voice arrives as up to four frames: one of ACED3 (V50) or EFEDS
//! (TQ5 family), then ACED2, ACED, and always VCED last. Each frame is
//! matched on its exact length and header bytes; anything else is skipped.
//! The voice is complete once VCED has been merged.

use patchwire_core::{
    FrameBuilder, ParameterModel, ParameterTable, ParseOutcome, Patch, RESERVED, Signature,
    name_from_bytes, padded_name_bytes, split_frames,
};
use tracing::debug;

use super::tables::{
    self, ACED2_SIGN_SLOT, FREQUENCY_KEYS, LEVEL_SCALING_SIGN_KEYS, NAME_LEN, VCED_NAME_OFFSET,
    VELOCITY_KEYS, VELOCITY_SIGN_KEYS,
};

/// Voice frame types in emit order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FrameKind {
    /// V50 effects.
    Aced3,
    /// TQ5 family effects.
    Efeds,
    /// DX11 and later extras: aftertouch, V50 shifts and signs.
    Aced2,
    /// TX81Z and later extras: waveforms, fixed frequency, reverb.
    Aced,
    /// The voice itself.
    Vced,
}

const ACED3_SIGNATURE: Signature =
    Signature::new(38, &[(0, 0xF0), (1, 0x43), (3, 0x7E), (4, 0x00), (5, 0x1E)])
        .with_tag(6, b"LM  8073AE");
const EFEDS_SIGNATURE: Signature =
    Signature::new(21, &[(0, 0xF0), (1, 0x43), (3, 0x7E), (4, 0x00), (5, 0x0D)])
        .with_tag(6, b"LM  8036EF");
const ACED2_SIGNATURE: Signature =
    Signature::new(28, &[(0, 0xF0), (1, 0x43), (3, 0x7E), (4, 0x00), (5, 0x14)])
        .with_tag(6, b"LM  8023AE");
const ACED_SIGNATURE: Signature =
    Signature::new(41, &[(0, 0xF0), (1, 0x43), (3, 0x7E), (4, 0x00), (5, 0x21)])
        .with_tag(6, b"LM  8976AE");
const VCED_SIGNATURE: Signature =
    Signature::new(101, &[(0, 0xF0), (1, 0x43), (3, 0x03), (4, 0x00), (5, 0x5D)]);

impl FrameKind {
    /// All kinds in emit order.
    pub const ALL: [FrameKind; 5] = [
        FrameKind::Aced3,
        FrameKind::Efeds,
        FrameKind::Aced2,
        FrameKind::Aced,
        FrameKind::Vced,
    ];

    /// Header and length signature.
    pub const fn signature(self) -> Signature {
        match self {
            FrameKind::Aced3 => ACED3_SIGNATURE,
            FrameKind::Efeds => EFEDS_SIGNATURE,
            FrameKind::Aced2 => ACED2_SIGNATURE,
            FrameKind::Aced => ACED_SIGNATURE,
            FrameKind::Vced => VCED_SIGNATURE,
        }
    }

    /// The 10-byte ASCII tag following the header, if any.
    pub const fn tag(self) -> Option<&'static [u8]> {
        match self.signature().tag {
            Some((_, tag)) => Some(tag),
            None => None,
        }
    }

    /// Bytes 3..6 of the frame: format and byte count.
    const fn format(self) -> [u8; 3] {
        match self {
            FrameKind::Aced3 => [0x7E, 0x00, 0x1E],
            FrameKind::Efeds => [0x7E, 0x00, 0x0D],
            FrameKind::Aced2 => [0x7E, 0x00, 0x14],
            FrameKind::Aced => [0x7E, 0x00, 0x21],
            FrameKind::Vced => [0x03, 0x00, 0x5D],
        }
    }

    /// Offset of the first parameter byte.
    pub const fn data_offset(self) -> usize {
        match self {
            FrameKind::Vced => 6,
            _ => 16,
        }
    }

    /// Parameter layout.
    pub fn table(self) -> &'static ParameterTable {
        match self {
            FrameKind::Aced3 => tables::aced3_table(),
            FrameKind::Efeds => tables::efeds_table(),
            FrameKind::Aced2 => tables::aced2_table(),
            FrameKind::Aced => tables::aced_table(),
            FrameKind::Vced => tables::vced_table(),
        }
    }

    /// Kind of `frame`, if it is a voice frame.
    pub fn identify(frame: &[u8]) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.signature().matches(frame))
    }

    /// Builds this frame for `model` on `channel`. `signed` writes the V50
    /// sign bits.
    pub fn encode(self, model: &dyn ParameterModel, channel: u8, signed: bool) -> Vec<u8> {
        let mut data: Vec<u8> = self
            .table()
            .slots()
            .iter()
            .map(|&key| if key == RESERVED { 0 } else { (model.get_or(key, 0) & 0x7F) as u8 })
            .collect();

        match self {
            FrameKind::Vced => {
                let name = padded_name_bytes(model.name(), NAME_LEN);
                data[VCED_NAME_OFFSET..VCED_NAME_OFFSET + NAME_LEN].copy_from_slice(&name);
                if signed {
                    for (key, sign) in VELOCITY_KEYS.iter().zip(VELOCITY_SIGN_KEYS) {
                        if let Some(i) = self.table().index_of(key) {
                            data[i] |= ((model.get_or(sign, 0) & 1) << 3) as u8;
                        }
                    }
                }
            }
            FrameKind::Aced => {
                for (coarse, fine) in FREQUENCY_KEYS {
                    if let Some(i) = self.table().index_of(fine) {
                        data[i] = clamp_fine(model.get_or(coarse, 0), i32::from(data[i])) as u8;
                    }
                }
            }
            FrameKind::Aced2 if signed => data[ACED2_SIGN_SLOT] = level_scaling_signs(model),
            _ => {}
        }

        let mut builder = FrameBuilder::new(&[0xF0, 0x43, channel & 0x0F])
            .extend(&self.format())
            .checksum_from_here();
        if let Some(tag) = self.tag() {
            builder = builder.extend(tag);
        }
        builder.extend(&data).finish()
    }

    /// Merges a frame of this kind into `patch`.
    pub fn decode(self, frame: &[u8], patch: &mut Patch) {
        let offset = self.data_offset();
        let table = self.table();
        let Some(data) = frame.get(offset..offset + table.len()) else {
            return;
        };
        for (&key, &byte) in table.slots().iter().zip(data) {
            if key != RESERVED {
                patch.set(key, i32::from(byte));
            }
        }
        match self {
            FrameKind::Vced => {
                patch.set_name(&name_from_bytes(&data[VCED_NAME_OFFSET..VCED_NAME_OFFSET + NAME_LEN]));
                for (key, sign) in VELOCITY_KEYS.iter().zip(VELOCITY_SIGN_KEYS) {
                    let raw = patch.get_or(key, 0);
                    patch.set(key, raw & 7);
                    patch.set(sign, (raw >> 3) & 1);
                }
            }
            FrameKind::Aced2 => {
                let signs = i32::from(data[ACED2_SIGN_SLOT]);
                for (bit, key) in LEVEL_SCALING_SIGN_KEYS.iter().enumerate() {
                    patch.set(key, (signs >> bit) & 1);
                }
            }
            _ => {}
        }
    }
}

/// Fine frequency is limited to 0..=7 while the coarse ratio is below 1.0.
pub fn clamp_fine(coarse: i32, fine: i32) -> i32 {
    if coarse < 4 { fine.min(7) } else { fine }
}

/// The four level-scaling signs packed with operator 1 in bit 0.
pub fn level_scaling_signs(model: &dyn ParameterModel) -> u8 {
    LEVEL_SCALING_SIGN_KEYS
        .iter()
        .enumerate()
        .fold(0, |acc, (bit, key)| acc | (((model.get_or(key, 0) & 1) as u8) << bit))
}

/// Reassembly progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReassemblyState {
    /// VCED has not arrived yet.
    AwaitingFrames,
    /// VCED has been merged.
    Complete,
}

/// Collects voice frames until VCED arrives.
///
/// ```rust
/// use patchwire_devices::yamaha4op::reassembly::{Reassembler, ReassemblyState};
///
/// let mut r = Reassembler::new();
/// assert!(!r.feed(&[0xF0, 0x43, 0x00, 0xF7]));
/// assert_eq!(r.state(), ReassemblyState::AwaitingFrames);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Reassembler {
    patch: Patch,
    seen: Vec<FrameKind>,
}

impl Reassembler {
    /// Empty reassembler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges `frame` if it is a voice frame. Returns whether it matched.
    pub fn feed(&mut self, frame: &[u8]) -> bool {
        let Some(kind) = FrameKind::identify(frame) else {
            debug!(len = frame.len(), "skipping frame that is not a 4-op voice frame");
            return false;
        };
        kind.decode(frame, &mut self.patch);
        if !self.seen.contains(&kind) {
            self.seen.push(kind);
        }
        true
    }

    /// Feeds every frame of `data`. Returns how many matched.
    pub fn feed_all(&mut self, data: &[u8]) -> usize {
        split_frames(data).filter(|f| self.feed(f)).count()
    }

    /// Current state.
    pub fn state(&self) -> ReassemblyState {
        if self.seen.contains(&FrameKind::Vced) {
            ReassemblyState::Complete
        } else {
            ReassemblyState::AwaitingFrames
        }
    }

    /// Frame kinds merged so far.
    pub fn seen(&self) -> &[FrameKind] {
        &self.seen
    }

    /// Outcome and merged patch.
    pub fn finish(self) -> (ParseOutcome, Patch) {
        let outcome = match (self.state(), self.seen.is_empty()) {
            (ReassemblyState::Complete, _) => ParseOutcome::Succeeded,
            (ReassemblyState::AwaitingFrames, false) => ParseOutcome::Incomplete,
            (ReassemblyState::AwaitingFrames, true) => ParseOutcome::Failed,
        };
        (outcome, self.patch)
    }
}

/// Splits a stream into per-voice frame groups, each ending at a VCED
/// frame. Frames that are neither voice frames nor VMEM banks are dropped;
/// a VMEM bank forms a group by itself. Trailing frames with no VCED form a
/// final group.
pub fn patch_groups(data: &[u8]) -> Vec<Vec<u8>> {
    let mut groups = Vec::new();
    let mut current = Vec::new();
    for frame in split_frames(data) {
        if super::bank::is_vmem(frame) {
            groups.push(frame.to_vec());
            continue;
        }
        match FrameKind::identify(frame) {
            Some(FrameKind::Vced) => {
                current.extend_from_slice(frame);
                groups.push(std::mem::take(&mut current));
            }
            Some(_) => current.extend_from_slice(frame),
            None => {}
        }
    }
    if !current.is_empty() {
        groups.push(current);
    }
    groups
}
