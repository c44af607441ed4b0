//! TX81Z and DX11 performances: eight instruments drawing on the voice
//! memory, plus microtuning and effect selection.
//!
//! A PCED dump is one 128-byte frame:
//!
//! ```text
//! F0 43 0n 7E 00 78 "LM  8976PE" <110 data bytes> cs F7
//!
//! +0..96   8 instruments of 12 bytes:
//!          MAX NOTES, VOICE MSB, VOICE LSB, CH, LOW, HIGH, DETUNE,
//!          NOTE SHIFT, VOLUME, OUT ASSIGN, LFO SELECT, MICROTUNE
//! +96      microtune table  +97 assign mode  +98 effect  +99 microtune key
//! +100..110 name
//! ```
//!
//! The checksum covers the tag and the data. Data offsets double as
//! single-parameter numbers (group `10`).
//!
//! A PMEM bank packs 32 records of 76 bytes into one 2450-byte frame. Only
//! the first 24 are performances. Each instrument takes 8 bytes:
//!
//! ```text
//! +0  OUT<<5 | VOICE MSB<<4 | MAX NOTES     +1 VOICE LSB
//! +2  LFO<<5 | CH                           +3 LOW  +4 HIGH  +5 DETUNE
//! +6  MICROTUNE<<6 | NOTE SHIFT             +7 VOLUME
//! +64 microtune table  +65 KEY<<3 | EFFECT<<1 | ASSIGN  +66..76 name
//! ```
//!
//! The bank checksum covers the records only.
//!
//! Both forms store an instrument's voice as one number 0..=159 split over
//! two bytes. The model keeps it as a voice bank (I, A..D) and a number
//! 0..=31 within it.

use std::sync::OnceLock;

use patchwire_core::{
    BankCodec, BitField, CodecError, DeviceDescriptor, DeviceFamily, DeviceSettings, Destination,
    FrameBuilder, Message, ParamRange, ParameterModel, ParseOutcome, Patch, PatchLocation,
    RangeMap, Signature, SysexCodec, Timing, name_from_bytes, name_from_list, padded_name_bytes,
    split_frames,
};
use tracing::{debug, warn};

use super::tables::{BANKS, NAME_LEN};

/// Single dump length.
pub const PCED_LEN: usize = 128;
/// Bank dump length.
pub const PMEM_LEN: usize = 2450;
/// Performances per bank.
pub const PERFORMANCES: usize = 24;
/// Offset of the data following the tag, in both forms.
pub const DATA_OFFSET: usize = 16;

const PCED_DATA_LEN: usize = 110;
const PCED_NAME_OFFSET: usize = 100;
const PCED_COMMON_OFFSET: usize = 96;
const INSTRUMENT_LEN: usize = 12;

const PMEM_RECORDS: usize = 32;
const PMEM_RECORD_LEN: usize = 76;
const PMEM_INSTRUMENT_LEN: usize = 8;
const PMEM_NAME_OFFSET: usize = 66;

const PCED_GROUP: u8 = 0x10;
const REMOTE_SWITCH_GROUP: u8 = 0x13;

/// Voices addressable by an instrument: internal plus banks A..D.
const VOICE_SLOTS: i32 = 160;
const VOICES_PER_BANK: i32 = 32;
/// Performances start at this program-change table value.
const PERFORMANCE_PROGRAM_BASE: u16 = 160;

const PCED_TAG: &[u8] = b"LM  8976PE";
const PMEM_TAG: &[u8] = b"LM  8976PM";

const PCED_SIGNATURE: Signature =
    Signature::new(PCED_LEN, &[(0, 0xF0), (1, 0x43), (3, 0x7E), (4, 0x00), (5, 0x78)])
        .with_tag(6, PCED_TAG);
const PMEM_SIGNATURE: Signature =
    Signature::new(PMEM_LEN, &[(0, 0xF0), (1, 0x43), (3, 0x7E), (4, 0x13), (5, 0x0A)])
        .with_tag(6, PMEM_TAG);

const BASE: DeviceDescriptor = DeviceDescriptor {
    id: "tx81z-perf",
    name: "Yamaha TX81Z [Performance]",
    family: DeviceFamily::Yamaha4Op,
    manufacturer: &[0x43],
    banks: &["PF"],
    writable_banks: &[0],
    patches_per_bank: PERFORMANCES as u8,
    name_len: NAME_LEN,
    default_name: "INIT PERF",
    default_device_id: 0,
    quirks: &[],
};

/// TX81Z performances.
pub static TX81Z_PERFORMANCE: DeviceDescriptor = BASE;

/// DX11 performances.
pub static DX11_PERFORMANCE: DeviceDescriptor = DeviceDescriptor {
    id: "dx11-perf",
    name: "Yamaha DX11 [Performance]",
    ..BASE
};

/// Which synthesizer's performances a codec addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PerformanceModel {
    /// TX81Z.
    Tx81z,
    /// DX11, which adds nine effects.
    Dx11,
}

impl PerformanceModel {
    /// Static description.
    pub fn descriptor(self) -> &'static DeviceDescriptor {
        match self {
            PerformanceModel::Tx81z => &TX81Z_PERFORMANCE,
            PerformanceModel::Dx11 => &DX11_PERFORMANCE,
        }
    }

    /// Remote switch that enters performance mode.
    fn perform_button(self) -> u8 {
        match self {
            PerformanceModel::Tx81z => 68,
            PerformanceModel::Dx11 => 119,
        }
    }

    fn effects(self) -> &'static [&'static str] {
        match self {
            PerformanceModel::Tx81z => &TX81Z_EFFECTS,
            PerformanceModel::Dx11 => &DX11_EFFECTS,
        }
    }
}

/// Keys of one instrument.
#[derive(Debug)]
pub struct InstrumentKeys {
    /// Voices the instrument may sound at once.
    pub maxnotes: &'static str,
    /// Voice bank (I, A, B, C, D).
    pub voicebank: &'static str,
    /// Voice within the bank.
    pub voicenumber: &'static str,
    /// Receive channel; 16 is omni.
    pub channel: &'static str,
    /// Lowest key.
    pub lowkey: &'static str,
    /// Highest key.
    pub highkey: &'static str,
    /// Detune, centred on 7.
    pub detune: &'static str,
    /// Note shift, centred on 24.
    pub noteshift: &'static str,
    /// Output level.
    pub volume: &'static str,
    /// Output routing.
    pub outassign: &'static str,
    /// LFO the instrument follows.
    pub lfoselect: &'static str,
    /// Microtuning on or off.
    pub microtune: &'static str,
}

macro_rules! instrument_keys {
    ($n:literal) => {
        InstrumentKeys {
            maxnotes: concat!("instrument", $n, "maxnotes"),
            voicebank: concat!("instrument", $n, "voicebank"),
            voicenumber: concat!("instrument", $n, "voicenumber"),
            channel: concat!("instrument", $n, "channel"),
            lowkey: concat!("instrument", $n, "lowkey"),
            highkey: concat!("instrument", $n, "highkey"),
            detune: concat!("instrument", $n, "detune"),
            noteshift: concat!("instrument", $n, "noteshift"),
            volume: concat!("instrument", $n, "volume"),
            outassign: concat!("instrument", $n, "outassign"),
            lfoselect: concat!("instrument", $n, "lfoselect"),
            microtune: concat!("instrument", $n, "microtune"),
        }
    };
}

/// Instruments 1..=8.
pub static INSTRUMENTS: [InstrumentKeys; 8] = [
    instrument_keys!(1),
    instrument_keys!(2),
    instrument_keys!(3),
    instrument_keys!(4),
    instrument_keys!(5),
    instrument_keys!(6),
    instrument_keys!(7),
    instrument_keys!(8),
];

/// PCED offsets of the voice number bytes within an instrument block.
const VOICE_MSB_SLOT: usize = 1;
const VOICE_LSB_SLOT: usize = 2;

impl InstrumentKeys {
    /// PCED block order, without the two voice number bytes.
    fn pced_slots(&self) -> [(usize, &'static str); 10] {
        [
            (0, self.maxnotes),
            (3, self.channel),
            (4, self.lowkey),
            (5, self.highkey),
            (6, self.detune),
            (7, self.noteshift),
            (8, self.volume),
            (9, self.outassign),
            (10, self.lfoselect),
            (11, self.microtune),
        ]
    }

    /// PMEM fields relative to the instrument's 8 bytes, without the voice.
    fn pmem_fields(&self) -> [(&'static str, usize, BitField); 10] {
        [
            (self.maxnotes, 0, BitField::new(0, 4)),
            (self.outassign, 0, BitField::new(5, 2)),
            (self.channel, 2, BitField::new(0, 5)),
            (self.lfoselect, 2, BitField::new(5, 2)),
            (self.lowkey, 3, BitField::new(0, 7)),
            (self.highkey, 4, BitField::new(0, 7)),
            (self.detune, 5, BitField::new(0, 4)),
            (self.noteshift, 6, BitField::new(0, 6)),
            (self.microtune, 6, BitField::bit(6)),
            (self.volume, 7, BitField::new(0, 7)),
        ]
    }

    fn ranges(&self) -> [ParamRange; 12] {
        [
            ParamRange::new(self.maxnotes, 0, 8),
            ParamRange::new(self.voicebank, 0, 4),
            ParamRange::new(self.voicenumber, 0, 31),
            ParamRange::new(self.channel, 0, 16),
            ParamRange::new(self.lowkey, 0, 127),
            ParamRange::new(self.highkey, 0, 127),
            ParamRange::new(self.detune, 0, 14),
            ParamRange::new(self.noteshift, 0, 48),
            ParamRange::new(self.volume, 0, 99),
            ParamRange::new(self.outassign, 0, 3),
            ParamRange::new(self.lfoselect, 0, 3),
            ParamRange::new(self.microtune, 0, 1),
        ]
    }

    /// Voice 0..=159 across all voice banks.
    fn voice(&self, model: &dyn ParameterModel) -> i32 {
        (model.get_or(self.voicebank, 0) * VOICES_PER_BANK + model.get_or(self.voicenumber, 0))
            .clamp(0, VOICE_SLOTS - 1)
    }

    /// Stores the voice carried by `msb` and `lsb`. Dumps often hold junk
    /// here, so stray bits are masked and the result wrapped into range.
    fn set_voice(&self, model: &mut dyn ParameterModel, msb: u8, lsb: u8) {
        let raw = (i32::from(msb & 0x01) << 7) | i32::from(lsb & 0x7F);
        if msb > 1 || raw >= VOICE_SLOTS {
            warn!(msb, lsb, "corrupt voice number in performance, wrapping");
        }
        let voice = raw % VOICE_SLOTS;
        model.set(self.voicebank, voice / VOICES_PER_BANK);
        model.set(self.voicenumber, voice % VOICES_PER_BANK);
    }
}

/// Performance keys outside the instruments, with their PCED offsets.
const COMMON_SLOTS: [(usize, &str); 4] = [
    (PCED_COMMON_OFFSET, "microtunetable"),
    (PCED_COMMON_OFFSET + 1, "assignmode"),
    (PCED_COMMON_OFFSET + 2, "effect"),
    (PCED_COMMON_OFFSET + 3, "microtunekey"),
];

const COMMON_PMEM_FIELDS: [(&str, usize, BitField); 4] = [
    ("microtunetable", 64, BitField::new(0, 4)),
    ("assignmode", 65, BitField::bit(0)),
    ("effect", 65, BitField::new(1, 2)),
    ("microtunekey", 65, BitField::new(3, 4)),
];

/// Every key of a performance.
pub fn model_keys() -> impl Iterator<Item = &'static str> {
    INSTRUMENTS
        .iter()
        .flat_map(|k| k.ranges().map(|r| r.key))
        .chain(COMMON_SLOTS.iter().map(|&(_, key)| key))
}

fn ranges(model: PerformanceModel) -> &'static RangeMap {
    static TX81Z: OnceLock<RangeMap> = OnceLock::new();
    static DX11: OnceLock<RangeMap> = OnceLock::new();
    let cell = match model {
        PerformanceModel::Tx81z => &TX81Z,
        PerformanceModel::Dx11 => &DX11,
    };
    cell.get_or_init(|| {
        let mut overrides: Vec<ParamRange> = INSTRUMENTS.iter().flat_map(|k| k.ranges()).collect();
        overrides.extend([
            ParamRange::new("microtunetable", 0, 12),
            ParamRange::new("assignmode", 0, 1),
            ParamRange::new("effect", 0, model.effects().len() as i32 - 1),
            ParamRange::new("microtunekey", 0, 11),
        ]);
        RangeMap::new(model_keys(), 0, 127, &overrides)
    })
}

/// Assign modes.
pub const ASSIGN_MODES: [&str; 2] = ["Normal", "Alternate"];
/// Output routing.
pub const OUT_ASSIGNS: [&str; 4] = ["Off", "I", "II", "I and II"];
/// LFO sources.
pub const LFO_SELECTS: [&str; 4] = ["Off", "Instrument 1", "Instrument 2", "Vibrato"];
/// TX81Z effects.
pub const TX81Z_EFFECTS: [&str; 4] = ["Off", "Delay", "Pan", "Chord"];
/// DX11 effects.
pub const DX11_EFFECTS: [&str; 13] = [
    "Off", "Delay", "Pan", "Chord", "Twin", "Lead", "Unison 1", "Unison 2", "Unison 3",
    "Octave", "Harmony 1", "Harmony 2", "Harmony 3",
];
/// Microtune tables.
pub const MICROTUNE_TABLES: [&str; 13] = [
    "Octave", "Full", "Equal", "Pure Major", "Pure Minor", "Mean Tone", "Pythagorean",
    "Werckmeister", "Kirnberger", "Vallotti", "1/4 Tone", "1/8 Tone", "Indian",
];
/// Microtune keys.
pub const KEYS: [&str; 12] = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];

/// True when `frame` is a PCED dump.
pub fn is_pced(frame: &[u8]) -> bool {
    PCED_SIGNATURE.matches(frame)
}

/// True when `frame` is a PMEM bank.
pub fn is_pmem(frame: &[u8]) -> bool {
    PMEM_SIGNATURE.matches(frame)
}

/// Builds a PCED dump on `channel`.
pub fn encode_pced(model: &dyn ParameterModel, channel: u8) -> Vec<u8> {
    let mut data = [0u8; PCED_DATA_LEN];
    for (keys, block) in INSTRUMENTS.iter().zip(data.chunks_exact_mut(INSTRUMENT_LEN)) {
        for (slot, key) in keys.pced_slots() {
            block[slot] = (model.get_or(key, 0) & 0x7F) as u8;
        }
        let voice = keys.voice(model);
        block[VOICE_MSB_SLOT] = (voice >> 7) as u8;
        block[VOICE_LSB_SLOT] = (voice & 0x7F) as u8;
    }
    for (offset, key) in COMMON_SLOTS {
        data[offset] = (model.get_or(key, 0) & 0x7F) as u8;
    }
    data[PCED_NAME_OFFSET..].copy_from_slice(&padded_name_bytes(model.name(), NAME_LEN));

    FrameBuilder::new(&[0xF0, 0x43, channel & 0x0F, 0x7E, 0x00, 0x78])
        .checksum_from_here()
        .extend(PCED_TAG)
        .extend(&data)
        .finish()
}

/// Decodes a PCED dump. The dump does not say where it came from, so the
/// patch has no location.
pub fn decode_pced(frame: &[u8]) -> Result<Patch, CodecError> {
    let data = frame
        .get(DATA_OFFSET..DATA_OFFSET + PCED_DATA_LEN)
        .ok_or(CodecError::Truncated { expected: PCED_LEN, actual: frame.len() })?;
    let mut patch = Patch::new(&name_from_bytes(&data[PCED_NAME_OFFSET..]));
    for (keys, block) in INSTRUMENTS.iter().zip(data.chunks_exact(INSTRUMENT_LEN)) {
        for (slot, key) in keys.pced_slots() {
            patch.set(key, i32::from(block[slot]));
        }
        keys.set_voice(&mut patch, block[VOICE_MSB_SLOT], block[VOICE_LSB_SLOT]);
    }
    for (offset, key) in COMMON_SLOTS {
        patch.set(key, i32::from(data[offset]));
    }
    Ok(patch)
}

fn record(data: &[u8], index: usize) -> Result<&[u8], CodecError> {
    if index >= PERFORMANCES {
        return Err(CodecError::PatchIndexOutOfRange { index, count: PERFORMANCES });
    }
    let start = DATA_OFFSET + index * PMEM_RECORD_LEN;
    data.get(start..start + PMEM_RECORD_LEN).ok_or(CodecError::Truncated {
        expected: PMEM_LEN,
        actual: data.len(),
    })
}

/// Name of performance `index` in a PMEM bank.
pub fn performance_name(data: &[u8], index: usize) -> Result<String, CodecError> {
    let rec = record(data, index)?;
    Ok(name_from_bytes(&rec[PMEM_NAME_OFFSET..PMEM_NAME_OFFSET + NAME_LEN]))
}

/// Decodes performance `index` of a PMEM bank.
pub fn decode_performance(data: &[u8], index: usize) -> Result<Patch, CodecError> {
    let rec = record(data, index)?;
    let mut patch = Patch::new(&name_from_bytes(&rec[PMEM_NAME_OFFSET..PMEM_NAME_OFFSET + NAME_LEN]))
        .with_location(PatchLocation::new(0, index as u8));
    for (keys, block) in INSTRUMENTS.iter().zip(rec.chunks_exact(PMEM_INSTRUMENT_LEN)) {
        for (key, offset, bits) in keys.pmem_fields() {
            patch.set(key, bits.extract(block[offset]));
        }
        keys.set_voice(&mut patch, (block[0] >> 4) & 0x01, block[1]);
    }
    for (key, offset, bits) in COMMON_PMEM_FIELDS {
        patch.set(key, bits.extract(rec[offset]));
    }
    Ok(patch)
}

fn encode_performance(model: &dyn ParameterModel, rec: &mut [u8]) {
    for (keys, block) in INSTRUMENTS.iter().zip(rec.chunks_exact_mut(PMEM_INSTRUMENT_LEN)) {
        for (key, offset, bits) in keys.pmem_fields() {
            block[offset] = bits.insert(block[offset], model.get_or(key, 0));
        }
        let voice = keys.voice(model);
        block[0] = BitField::bit(4).insert(block[0], voice >> 7);
        block[1] = (voice & 0x7F) as u8;
    }
    for (key, offset, bits) in COMMON_PMEM_FIELDS {
        rec[offset] = bits.insert(rec[offset], model.get_or(key, 0));
    }
    rec[PMEM_NAME_OFFSET..PMEM_NAME_OFFSET + NAME_LEN]
        .copy_from_slice(&padded_name_bytes(model.name(), NAME_LEN));
}

/// Builds a PMEM bank on `channel`. `fill` supplies performances past the
/// end of `performances`; the trailing unused records stay zero.
pub fn encode_pmem(performances: &[Patch], fill: &Patch, channel: u8) -> Vec<u8> {
    let mut records = vec![0u8; PMEM_RECORDS * PMEM_RECORD_LEN];
    for (i, rec) in records.chunks_exact_mut(PMEM_RECORD_LEN).take(PERFORMANCES).enumerate() {
        encode_performance(performances.get(i).unwrap_or(fill), rec);
    }
    FrameBuilder::new(&[0xF0, 0x43, channel & 0x0F, 0x7E, 0x13, 0x0A])
        .extend(PMEM_TAG)
        .checksum_from_here()
        .extend(&records)
        .finish()
}

/// Codec for TX81Z or DX11 performances.
#[derive(Debug, Clone)]
pub struct Yamaha4OpPerformance {
    model: PerformanceModel,
    settings: DeviceSettings,
}

impl Yamaha4OpPerformance {
    /// Codec for `model`.
    pub fn new(model: PerformanceModel, settings: DeviceSettings) -> Self {
        Self { model, settings }
    }

    /// The addressed model.
    pub fn model(&self) -> PerformanceModel {
        self.model
    }

    fn channel(&self) -> u8 {
        self.settings.channel & 0x0F
    }

    fn parameter(&self, param: usize, value: i32) -> Message {
        Message::Sysex(vec![
            0xF0,
            0x43,
            0x10 | self.channel(),
            PCED_GROUP,
            (param & 0x7F) as u8,
            (value & 0x7F) as u8,
            0xF7,
        ])
    }
}

impl SysexCodec for Yamaha4OpPerformance {
    fn descriptor(&self) -> &DeviceDescriptor {
        self.model.descriptor()
    }

    fn settings(&self) -> &DeviceSettings {
        &self.settings
    }

    fn recognize(&self, data: &[u8]) -> bool {
        is_pced(data) || is_pmem(data)
    }

    fn parse(&self, data: &[u8]) -> (ParseOutcome, Patch) {
        let decoded = if let Some(pced) = split_frames(data).find(|f| is_pced(f)) {
            decode_pced(pced)
        } else if let Some(pmem) = split_frames(data).find(|f| is_pmem(f)) {
            debug!("parsing first performance of a PMEM bank");
            decode_performance(pmem, 0)
        } else {
            debug!(len = data.len(), "no performance frame");
            return (ParseOutcome::Failed, self.init_patch());
        };
        match decoded {
            Ok(mut patch) => {
                self.revise(&mut patch);
                (ParseOutcome::Succeeded, patch)
            }
            Err(e) => {
                warn!(%e, "unreadable performance");
                (ParseOutcome::Failed, self.init_patch())
            }
        }
    }

    fn emit(&self, model: &dyn ParameterModel, destination: Destination) -> Vec<Message> {
        let mut messages = Vec::new();
        if let Destination::Slot(location) = destination {
            messages.extend(self.change_patch(location));
            messages.push(Message::Pause(self.timing().after_change_patch));
        }
        messages.push(Message::Sysex(encode_pced(model, self.channel())));
        messages
    }

    fn emit_parameter(&self, model: &dyn ParameterModel, key: &str) -> Vec<Message> {
        if matches!(key, "bank" | "number") {
            return Vec::new();
        }
        if key == "name" {
            return padded_name_bytes(model.name(), NAME_LEN)
                .into_iter()
                .enumerate()
                .map(|(i, c)| self.parameter(PCED_NAME_OFFSET + i, i32::from(c)))
                .collect();
        }
        for (i, keys) in INSTRUMENTS.iter().enumerate() {
            let base = i * INSTRUMENT_LEN;
            if key == keys.voicebank || key == keys.voicenumber {
                let voice = keys.voice(model);
                return vec![
                    self.parameter(base + VOICE_MSB_SLOT, voice >> 7),
                    self.parameter(base + VOICE_LSB_SLOT, voice),
                ];
            }
            if let Some((slot, _)) = keys.pced_slots().into_iter().find(|(_, k)| *k == key) {
                return vec![self.parameter(base + slot, model.get_or(key, 0))];
            }
        }
        if let Some(&(offset, _)) = COMMON_SLOTS.iter().find(|(_, k)| *k == key) {
            return vec![self.parameter(offset, model.get_or(key, 0))];
        }
        warn!(key, "4-op performance has no single-parameter message for key");
        Vec::new()
    }

    /// Points program-change table slot 127 at the performance, presses
    /// PLAY/PERFORM (PERFORM on the DX11), then calls up program 127.
    fn change_patch(&self, location: PatchLocation) -> Vec<Message> {
        let mut number = location.number;
        if usize::from(number) >= PERFORMANCES {
            warn!(number, "performance number is invalid, wrapping");
            number %= PERFORMANCES as u8;
        }
        let program = PERFORMANCE_PROGRAM_BASE + u16::from(number);
        vec![
            Message::Sysex(vec![
                0xF0,
                0x43,
                0x10 | self.channel(),
                PCED_GROUP,
                0x7F,
                0x7F,
                (program >> 7) as u8,
                (program & 0x7F) as u8,
                0xF7,
            ]),
            Message::Sysex(vec![
                0xF0,
                0x43,
                0x10 | self.channel(),
                REMOTE_SWITCH_GROUP,
                self.model.perform_button(),
                0x7F,
                0xF7,
            ]),
            Message::program_change(self.channel(), 127),
        ]
    }

    /// Always a patch change followed by a current-performance request.
    fn request_dump(&self, location: PatchLocation) -> Vec<Message> {
        let mut messages = self.change_patch(location);
        messages.push(Message::Pause(self.timing().after_change_patch));
        messages.extend(self.request_current_dump());
        messages
    }

    fn request_current_dump(&self) -> Vec<Message> {
        let mut frame = vec![0xF0, 0x43, 0x20 | self.channel(), 0x7E];
        frame.extend_from_slice(PCED_TAG);
        frame.push(0xF7);
        vec![Message::Sysex(frame)]
    }

    fn timing(&self) -> Timing {
        Timing::from_millis(50, 200, 500)
    }

    fn ranges(&self) -> &RangeMap {
        ranges(self.model)
    }

    fn display(&self, key: &str, value: i32) -> String {
        let list: Option<&[&str]> = match key {
            "assignmode" => Some(&ASSIGN_MODES[..]),
            "effect" => Some(self.model.effects()),
            "microtunetable" => Some(&MICROTUNE_TABLES[..]),
            "microtunekey" => Some(&KEYS[..]),
            k if k.ends_with("voicebank") => Some(&BANKS[..]),
            k if k.ends_with("outassign") => Some(&OUT_ASSIGNS[..]),
            k if k.ends_with("lfoselect") => Some(&LFO_SELECTS[..]),
            _ => None,
        };
        match (list, key) {
            (Some(list), _) => name_from_list(list, value),
            (None, k) if k.ends_with("detune") => (value - 7).to_string(),
            (None, k) if k.ends_with("noteshift") => (value - 24).to_string(),
            (None, k) if k.ends_with("voicenumber") => (value + 1).to_string(),
            (None, k) if k.ends_with("channel") && value == 16 => String::from("Omni"),
            (None, k) if k.ends_with("channel") => (value + 1).to_string(),
            _ => value.to_string(),
        }
    }

    /// Instrument 1 plays all eight notes on channel 1 across the keyboard.
    fn init_patch(&self) -> Patch {
        let mut patch = Patch::new(self.model.descriptor().default_name);
        for r in self.ranges().iter() {
            patch.set(r.key, r.min);
        }
        for keys in &INSTRUMENTS {
            patch.set(keys.highkey, 127);
            patch.set(keys.detune, 7);
            patch.set(keys.noteshift, 24);
            patch.set(keys.volume, 99);
            patch.set(keys.outassign, 3);
        }
        patch.set(INSTRUMENTS[0].maxnotes, 8);
        patch
    }

    fn as_bank(&self) -> Option<&dyn BankCodec> {
        Some(self)
    }
}

impl BankCodec for Yamaha4OpPerformance {
    fn recognize_bank(&self, data: &[u8]) -> bool {
        is_pmem(data)
    }

    fn bank_patch_names(&self, data: &[u8]) -> Vec<String> {
        (0..PERFORMANCES)
            .map_while(|i| performance_name(data, i).ok())
            .collect()
    }

    fn parse_from_bank(&self, data: &[u8], index: usize) -> Result<Patch, CodecError> {
        let mut patch = decode_performance(data, index)?;
        self.revise(&mut patch);
        Ok(patch)
    }

    fn emit_bank(&self, patches: &[Patch]) -> Vec<u8> {
        encode_pmem(patches, &self.init_patch(), self.channel())
    }

    fn request_bank(&self, _bank: u8) -> Vec<Message> {
        let mut frame = vec![0xF0, 0x43, 0x20 | self.channel(), 0x7E];
        frame.extend_from_slice(PMEM_TAG);
        frame.push(0xF7);
        vec![Message::Sysex(frame)]
    }

    fn patches_per_bank(&self) -> usize {
        PERFORMANCES
    }
}
