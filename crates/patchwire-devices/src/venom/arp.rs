//! Venom arpeggiator patterns.
//!
//! A pattern travels as two frames, a header and the step list:
//!
//! ```text
//! header:  F0 00 01 05 21 id 02 kind bank num <packed 20 bytes> cs F7
//!          kind/bank: 00 08 (edit buffer) or 03 bank+1
//! pattern: F0 00 01 05 21 id 02 kind bank num <packed 4 * n bytes> cs F7
//!          kind/bank: 00 0D (edit buffer) or 04 bank+1
//! ```
//!
//! Each step is a little-endian 32-bit word:
//!
//! ```text
//! bits 16..32  time (24 ticks per quarter note, two bars max)
//! bit  15      mode bit 1
//! bits  8..15  data 1 (note, controller number, bend MSB)
//! bit   7      mode bit 0
//! bits  0..7   data 2 (velocity, controller value, bend LSB)
//! ```
//!
//! A word of all zeros ends the pattern.

use std::sync::OnceLock;
use std::time::Duration;

use patchwire_core::frame::{FrameBuilder, split_frames};
use patchwire_core::{
    DeviceDescriptor, DeviceFamily, DeviceSettings, Destination, Message, ParamRange,
    ParameterModel, ParseOutcome, Patch, PatchLocation, Quirk, RangeMap, SysexCodec, Timing,
    name_from_bytes, name_from_list, padded_name_bytes, revise_standard, seven_bit,
};
use tracing::{debug, warn};

use super::tables::{self, NAME_LEN};
use super::{
    CANCEL, DEFAULT_ID, HEADER, PAYLOAD_OFFSET, READ_DUMP, WRITE_DUMP, command_frame, wide_bool,
};

/// Header frame length.
pub const HEADER_LEN: usize = 35;

/// Steps in a pattern, including the end marker.
pub const MAX_STEPS: usize = 256;

/// Last usable step time.
pub const MAX_TIME: u16 = 767;

/// Ticks per quarter note.
pub const TICKS_PER_BEAT: u16 = 24;

/// Some firmware closes patterns with a junk step at this time.
const BUGGY_END_TIME: u16 = 768;

const HEADER_EDIT: u8 = 0x08;
const HEADER_STORED: u8 = 0x03;
const PATTERN_EDIT: u8 = 0x0D;
const PATTERN_STORED: u8 = 0x04;

/// Pause the device needs between header and pattern.
const POST_HEADER_PAUSE: Duration = Duration::from_millis(300);

const HEADER_NAME_OFFSET: usize = 10;

const HEADER_KEYS: [&str; 7] = [
    "arpenable",
    "arpmode",
    "arpnoteorder",
    "arpoctaverange",
    "arpbipolar",
    "arplatchkeys",
    "arprootnote",
];

const RANGE_OVERRIDES: &[ParamRange] = &[
    ParamRange::new("arpenable", 0, 1),
    ParamRange::new("arpmode", 0, 2),
    ParamRange::new("arpnoteorder", 0, 6),
    ParamRange::new("arpoctaverange", 60, 68),
    ParamRange::new("arpbipolar", 0, 1),
    ParamRange::new("arplatchkeys", 0, 1),
];

/// Venom arp patterns.
pub static ARP: DeviceDescriptor = DeviceDescriptor {
    id: "venom-arp",
    name: "M-Audio Venom [Arp]",
    family: DeviceFamily::Venom,
    manufacturer: &[0x00, 0x01, 0x05],
    banks: &["A", "B"],
    writable_banks: &[1],
    patches_per_bank: 128,
    name_len: NAME_LEN,
    default_name: "Untitled",
    default_device_id: DEFAULT_ID,
    quirks: &[Quirk::WideBooleans, Quirk::SignedArpOctave],
};

fn ranges() -> &'static RangeMap {
    static RANGES: OnceLock<RangeMap> = OnceLock::new();
    RANGES.get_or_init(|| RangeMap::new(HEADER_KEYS, 0, 127, RANGE_OVERRIDES))
}

/// What a step does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepMode {
    /// End of pattern.
    #[default]
    End,
    /// Note on.
    Note,
    /// Control change.
    Controller,
    /// Pitch bend.
    Bend,
}

impl StepMode {
    /// Mode from its two wire bits.
    pub fn from_bits(bits: u32) -> Self {
        match bits & 0x03 {
            1 => StepMode::Note,
            2 => StepMode::Controller,
            3 => StepMode::Bend,
            _ => StepMode::End,
        }
    }

    /// Two wire bits of the mode.
    pub fn bits(self) -> u32 {
        match self {
            StepMode::End => 0,
            StepMode::Note => 1,
            StepMode::Controller => 2,
            StepMode::Bend => 3,
        }
    }
}

/// One pattern step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArpStep {
    /// Position in ticks.
    pub time: u16,
    /// Event type.
    pub mode: StepMode,
    /// Note number, controller number, or bend MSB.
    pub data1: u8,
    /// Velocity, controller value, or bend LSB.
    pub data2: u8,
}

impl ArpStep {
    /// Wire word of the step. End steps are all zeros.
    pub fn to_word(self) -> u32 {
        if self.mode == StepMode::End {
            return 0;
        }
        let mode = self.mode.bits();
        (u32::from(self.time) << 16)
            | (((mode >> 1) & 1) << 15)
            | (u32::from(self.data1 & 0x7F) << 8)
            | ((mode & 1) << 7)
            | u32::from(self.data2 & 0x7F)
    }

    /// Step from a wire word.
    pub fn from_word(word: u32) -> Self {
        Self {
            time: (word >> 16) as u16,
            mode: StepMode::from_bits((((word >> 15) & 1) << 1) | ((word >> 7) & 1)),
            data1: ((word >> 8) & 0x7F) as u8,
            data2: (word & 0x7F) as u8,
        }
    }
}

/// Rounding used by [`quantize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantize {
    /// Next beat.
    Up,
    /// Previous beat.
    Down,
    /// Closest beat; ties go up.
    Nearest,
}

/// Moves every step time onto a quarter-note boundary.
pub fn quantize(steps: &mut [ArpStep], rounding: Quantize) {
    for step in steps {
        let t = step.time;
        let below = (t / TICKS_PER_BEAT) * TICKS_PER_BEAT;
        if below == t {
            continue;
        }
        let above = below.saturating_add(TICKS_PER_BEAT);
        step.time = match rounding {
            Quantize::Up => above,
            Quantize::Down => below,
            Quantize::Nearest if t - below < above - t => below,
            Quantize::Nearest => above,
        };
    }
}

/// Steps that go on the wire: everything before the first end marker,
/// stably sorted by time.
pub fn playable_steps(steps: &[ArpStep]) -> Vec<ArpStep> {
    let mut out: Vec<ArpStep> = steps
        .iter()
        .take_while(|s| s.mode != StepMode::End)
        .copied()
        .collect();
    out.sort_by_key(|s| s.time);
    out
}

fn step_key(i: usize, field: &str) -> String {
    format!("step{i}{field}")
}

/// Reads the 256 steps of a model. Missing keys read as end steps.
pub fn steps_from_model(model: &dyn ParameterModel) -> Vec<ArpStep> {
    (0..MAX_STEPS)
        .map(|i| ArpStep {
            time: model.get_or(&step_key(i, "time"), 0).clamp(0, i32::from(MAX_TIME)) as u16,
            mode: StepMode::from_bits(model.get_or(&step_key(i, "mode"), 0) as u32),
            data1: model.get_or(&step_key(i, "data1"), 0).clamp(0, 127) as u8,
            data2: model.get_or(&step_key(i, "data2"), 0).clamp(0, 127) as u8,
        })
        .collect()
}

/// Writes `steps` into the model, padding with end steps to 256.
pub fn write_steps(model: &mut dyn ParameterModel, steps: &[ArpStep]) {
    for i in 0..MAX_STEPS {
        let step = steps.get(i).copied().unwrap_or_default();
        model.set(&step_key(i, "time"), i32::from(step.time));
        model.set(&step_key(i, "mode"), step.mode.bits() as i32);
        model.set(&step_key(i, "data1"), i32::from(step.data1));
        model.set(&step_key(i, "data2"), i32::from(step.data2));
    }
}

/// Venom arp pattern codec.
#[derive(Debug, Clone)]
pub struct VenomArp {
    settings: DeviceSettings,
}

impl VenomArp {
    /// Codec addressing the device described by `settings`.
    pub fn new(settings: DeviceSettings) -> Self {
        Self { settings }
    }

    fn device_id(&self) -> u8 {
        self.settings.device_id_or(&ARP) & 0x7F
    }

    fn command(&self, body: &[u8]) -> Message {
        Message::Sysex(command_frame(self.device_id(), body))
    }

    /// Kind, bank, and number bytes of a frame.
    fn address(location: Option<PatchLocation>, edit: u8, stored: u8) -> [u8; 3] {
        match location {
            Some(l) => [stored, (l.bank & 0x01) + 1, l.number & 0x7F],
            None => [0x00, edit, 0x00],
        }
    }

    /// Builds the header frame. `location` selects the stored form.
    pub fn emit_header(&self, model: &dyn ParameterModel, location: Option<PatchLocation>) -> Vec<u8> {
        let target = location.unwrap_or_default();
        let mut octave = model.get_or("arpoctaverange", 64) as u8;
        // Stored headers come back from the device with 0 for "no shift".
        if location.is_some() && octave == 64 {
            octave = 0;
        }
        let mut raw = vec![
            wide_bool(model, "arpenable"),
            0,
            target.bank & 0x01,
            target.number & 0x7F,
            model.get_or("arpmode", 0) as u8,
            model.get_or("arpnoteorder", 0) as u8,
            octave,
            wide_bool(model, "arpbipolar"),
            wide_bool(model, "arplatchkeys"),
            model.get_or("arprootnote", 60) as u8,
        ];
        raw.extend(padded_name_bytes(model.name(), NAME_LEN));

        FrameBuilder::new(&HEADER)
            .push(self.device_id())
            .checksum_from_here()
            .push(WRITE_DUMP)
            .extend(&Self::address(location, HEADER_EDIT, HEADER_STORED))
            .extend(&seven_bit::pack(&raw))
            .finish()
    }

    /// Builds the pattern frame from the model's steps.
    pub fn emit_pattern(&self, model: &dyn ParameterModel, location: Option<PatchLocation>) -> Vec<u8> {
        let mut steps = playable_steps(&steps_from_model(model));
        if steps.len() < MAX_STEPS {
            steps.push(ArpStep::default());
        }
        let raw: Vec<u8> = steps.iter().flat_map(|s| s.to_word().to_le_bytes()).collect();

        FrameBuilder::new(&HEADER)
            .push(self.device_id())
            .checksum_from_here()
            .push(WRITE_DUMP)
            .extend(&Self::address(location, PATTERN_EDIT, PATTERN_STORED))
            .extend(&seven_bit::pack(&raw))
            .finish()
    }

    fn emit_pair(&self, model: &dyn ParameterModel, location: Option<PatchLocation>) -> Vec<Message> {
        vec![
            Message::Sysex(self.emit_header(model, location)),
            Message::Pause(POST_HEADER_PAUSE),
            Message::Sysex(self.emit_pattern(model, location)),
        ]
    }

    /// True for a header frame in either form.
    pub fn is_header(data: &[u8]) -> bool {
        data.len() == HEADER_LEN
            && data.starts_with(&HEADER)
            && data[6] == WRITE_DUMP
            && (data[7] == HEADER_STORED
                || (data[7] == 0x00 && (HEADER_EDIT..=0x0C).contains(&data[8])))
    }

    /// True for a pattern frame in either form.
    pub fn is_pattern(data: &[u8]) -> bool {
        data.len() > PAYLOAD_OFFSET + 2
            && data.starts_with(&HEADER)
            && data[6] == WRITE_DUMP
            && (data[7] == PATTERN_STORED
                || (data[7] == 0x00 && (PATTERN_EDIT..=0x11).contains(&data[8])))
    }

    fn decode_header(frame: &[u8], patch: &mut Patch) {
        if frame[7] == HEADER_STORED {
            let mut bank = i32::from(frame[8]) - 1;
            if !(0..=1).contains(&bank) {
                warn!(byte = frame[8], "venom arp header has an invalid bank byte, using bank A");
                bank = 0;
            }
            patch.set_location(Some(PatchLocation::new(bank as u8, frame[9])));
        }
        let raw = seven_bit::unpack(&frame[PAYLOAD_OFFSET..frame.len() - 2]);
        let byte = |i: usize| i32::from(raw.get(i).copied().unwrap_or(0));
        patch.set("arpenable", i32::from(byte(0) >= 64));
        patch.set("arpmode", byte(4));
        patch.set("arpnoteorder", byte(5));
        patch.set("arpoctaverange", if byte(6) == 0 { 64 } else { byte(6) });
        patch.set("arpbipolar", i32::from(byte(7) >= 64));
        patch.set("arplatchkeys", i32::from(byte(8) >= 64));
        patch.set("arprootnote", byte(9));
        if let Some(name) = raw.get(HEADER_NAME_OFFSET..HEADER_NAME_OFFSET + NAME_LEN) {
            patch.set_name(&name_from_bytes(name));
        }
    }

    fn decode_pattern(frame: &[u8], patch: &mut Patch) {
        let raw = seven_bit::unpack(&frame[PAYLOAD_OFFSET..frame.len() - 2]);
        if raw.len() % 4 != 0 {
            warn!(len = raw.len(), "venom arp pattern length is not a multiple of 4");
        }
        let mut steps: Vec<ArpStep> = raw
            .chunks_exact(4)
            .take(MAX_STEPS)
            .map(|c| ArpStep::from_word(u32::from_le_bytes([c[0], c[1], c[2], c[3]])))
            .collect();
        for (i, step) in steps.iter_mut().enumerate() {
            if step.time == BUGGY_END_TIME {
                warn!(step = i, "venom arp step at time 768 treated as end");
                *step = ArpStep::default();
            }
        }
        write_steps(patch, &steps);
    }
}

impl Default for VenomArp {
    fn default() -> Self {
        Self::new(DeviceSettings::default())
    }
}

impl SysexCodec for VenomArp {
    fn descriptor(&self) -> &DeviceDescriptor {
        &ARP
    }

    fn settings(&self) -> &DeviceSettings {
        &self.settings
    }

    fn recognize(&self, data: &[u8]) -> bool {
        Self::is_header(data) || Self::is_pattern(data)
    }

    /// Complete only once a pattern frame has been seen.
    fn parse(&self, data: &[u8]) -> (ParseOutcome, Patch) {
        let mut patch = self.init_patch();
        let mut header = false;
        let mut pattern = false;
        for frame in split_frames(data) {
            if Self::is_header(frame) {
                debug!("parsing venom arp header");
                Self::decode_header(frame, &mut patch);
                header = true;
            } else if Self::is_pattern(frame) {
                debug!(len = frame.len(), "parsing venom arp pattern");
                Self::decode_pattern(frame, &mut patch);
                pattern = true;
            }
        }
        self.revise(&mut patch);
        let outcome = match (header, pattern) {
            (_, true) => ParseOutcome::Succeeded,
            (true, false) => ParseOutcome::Incomplete,
            (false, false) => ParseOutcome::Failed,
        };
        (outcome, patch)
    }

    fn emit(&self, model: &dyn ParameterModel, destination: Destination) -> Vec<Message> {
        match destination {
            Destination::WorkingMemory => self.emit_pair(model, None),
            Destination::Slot(location) => self.emit_pair(model, Some(location)),
            Destination::File => {
                self.emit_pair(model, Some(model.location().unwrap_or_default()))
            }
        }
    }

    /// The device takes no single-parameter edits for patterns; any change
    /// resends the edit buffer.
    fn emit_parameter(&self, model: &dyn ParameterModel, key: &str) -> Vec<Message> {
        match key {
            "bank" | "number" => Vec::new(),
            _ => self.emit_pair(model, None),
        }
    }

    fn change_patch(&self, _location: PatchLocation) -> Vec<Message> {
        Vec::new()
    }

    fn request_dump(&self, location: PatchLocation) -> Vec<Message> {
        let bank = (location.bank & 0x01) + 1;
        let number = location.number & 0x7F;
        vec![
            self.command(&[READ_DUMP, HEADER_STORED, bank, number]),
            Message::Pause(POST_HEADER_PAUSE),
            self.command(&[READ_DUMP, PATTERN_STORED, bank, number]),
        ]
    }

    fn request_current_dump(&self) -> Vec<Message> {
        vec![
            self.command(&[READ_DUMP, 0x00, HEADER_EDIT, 0x00]),
            Message::Pause(POST_HEADER_PAUSE),
            self.command(&[READ_DUMP, 0x00, PATTERN_EDIT, 0x00]),
        ]
    }

    fn acknowledge_receipt(&self) -> Vec<Message> {
        vec![self.command(&[CANCEL])]
    }

    fn timing(&self) -> Timing {
        Timing::from_millis(0, 750, 0)
    }

    fn ranges(&self) -> &RangeMap {
        ranges()
    }

    /// Clamps header values and every step field.
    fn revise(&self, model: &mut dyn ParameterModel) {
        revise_standard(model, ranges(), &ARP);
        for i in 0..MAX_STEPS {
            for (field, max) in [("time", i32::from(MAX_TIME)), ("mode", 3), ("data1", 127), ("data2", 127)] {
                let key = step_key(i, field);
                if let Some(v) = model.get(&key) {
                    let clamped = v.clamp(0, max);
                    if clamped != v {
                        model.set(&key, clamped);
                    }
                }
            }
        }
    }

    fn display(&self, key: &str, value: i32) -> String {
        match key {
            "arpmode" => name_from_list(&tables::ARP_MODES, value),
            "arpnoteorder" => name_from_list(&tables::ARP_NOTE_ORDERS, value),
            "arpoctaverange" => format!("{}", value - 64),
            "arprootnote" => format!(
                "{}{}",
                tables::NOTES[value.rem_euclid(12) as usize],
                value.div_euclid(12) - 1
            ),
            k if k.ends_with("mode") && k.starts_with("step") => {
                name_from_list(&["End", "Note", "Controller", "Bend"], value)
            }
            _ => value.to_string(),
        }
    }

    fn init_patch(&self) -> Patch {
        let mut patch = Patch::new(ARP.default_name);
        for r in ranges().iter() {
            patch.set(r.key, r.min);
        }
        patch.set("arpoctaverange", 64);
        patch.set("arprootnote", 60);
        write_steps(&mut patch, &[]);
        patch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::venom::CHECKSUM_START;
    use patchwire_core::checksum;

    fn note(time: u16, data1: u8, data2: u8) -> ArpStep {
        ArpStep { time, mode: StepMode::Note, data1, data2 }
    }

    fn sample() -> Patch {
        let arp = VenomArp::default();
        let mut p = arp.init_patch();
        p.set_name("Offbeat");
        p.set("arpenable", 1);
        p.set("arpmode", 1);
        p.set("arpnoteorder", 4);
        p.set("arpoctaverange", 62);
        p.set("arplatchkeys", 1);
        p.set("arprootnote", 48);
        write_steps(
            &mut p,
            &[
                note(0, 60, 100),
                ArpStep { time: 12, mode: StepMode::Controller, data1: 74, data2: 33 },
                note(24, 67, 90),
                ArpStep { time: 36, mode: StepMode::Bend, data1: 80, data2: 5 },
            ],
        );
        p
    }

    #[test]
    fn test_step_word_layout() {
        let step = ArpStep { time: 0x0123, mode: StepMode::Bend, data1: 0x40, data2: 0x05 };
        assert_eq!(step.to_word(), 0x0123_C085);
        assert_eq!(ArpStep::from_word(0x0123_C085), step);
        assert_eq!(ArpStep::default().to_word(), 0);
        assert_eq!(ArpStep::from_word(0x0018_0000).mode, StepMode::End);
    }

    #[test]
    fn test_header_shape() {
        let arp = VenomArp::default();
        let frame = arp.emit_header(&sample(), None);
        assert_eq!(frame.len(), HEADER_LEN);
        assert_eq!(&frame[5..10], &[0x7F, 0x02, 0x00, 0x08, 0x00]);
        assert!(checksum::verify(&frame[CHECKSUM_START..HEADER_LEN - 1]));
        assert!(VenomArp::is_header(&frame));
        assert!(!VenomArp::is_pattern(&frame));
    }

    #[test]
    fn test_pattern_frame_holds_steps_and_one_terminator() {
        let arp = VenomArp::default();
        let frame = arp.emit_pattern(&sample(), Some(PatchLocation::new(1, 4)));
        assert_eq!(&frame[6..10], &[0x02, 0x04, 0x02, 0x04]);
        assert_eq!(frame.len(), PAYLOAD_OFFSET + seven_bit::packed_len(5 * 4) + 2);
        assert!(checksum::verify(&frame[CHECKSUM_START..frame.len() - 1]));
        assert!(VenomArp::is_pattern(&frame));
    }

    #[test]
    fn test_round_trip() {
        let arp = VenomArp::default();
        let src = sample();
        let bytes = patchwire_core::sysex_bytes(&arp.emit(&src, Destination::WorkingMemory));
        let (outcome, back) = arp.parse(&bytes);
        assert_eq!(outcome, ParseOutcome::Succeeded);
        assert_eq!(back.name(), "Offbeat");
        for (key, value) in src.values() {
            assert_eq!(back.get(key), Some(value), "{key}");
        }
    }

    #[test]
    fn test_stored_form_keeps_location_and_octave() {
        let arp = VenomArp::default();
        let mut src = sample();
        src.set("arpoctaverange", 64);
        let messages = arp.emit(&src, Destination::Slot(PatchLocation::new(1, 20)));
        assert_eq!(messages.len(), 3);
        assert!(messages[1].is_pause());
        let header = messages[0].to_bytes();
        let raw = seven_bit::unpack(&header[PAYLOAD_OFFSET..HEADER_LEN - 2]);
        assert_eq!(raw[6], 0);
        let (_, back) = arp.parse(&patchwire_core::sysex_bytes(&messages));
        assert_eq!(back.location(), Some(PatchLocation::new(1, 20)));
        assert_eq!(back.get("arpoctaverange"), Some(64));
    }

    #[test]
    fn test_header_alone_is_incomplete() {
        let arp = VenomArp::default();
        let (outcome, back) = arp.parse(&arp.emit_header(&sample(), None));
        assert_eq!(outcome, ParseOutcome::Incomplete);
        assert_eq!(back.get("arpmode"), Some(1));
        assert_eq!(arp.parse(&[0xF0, 0x7E, 0xF7]).0, ParseOutcome::Failed);
    }

    #[test]
    fn test_emit_sorts_and_truncates() {
        let mut p = sample();
        write_steps(
            &mut p,
            &[note(48, 1, 1), note(0, 2, 2), ArpStep::default(), note(12, 3, 3)],
        );
        let arp = VenomArp::default();
        let (_, back) = arp.parse(&patchwire_core::sysex_bytes(&arp.emit(&p, Destination::WorkingMemory)));
        let steps = steps_from_model(&back);
        assert_eq!(steps[0], note(0, 2, 2));
        assert_eq!(steps[1], note(48, 1, 1));
        assert_eq!(steps[2].mode, StepMode::End);
        assert_eq!(steps[3].mode, StepMode::End);
    }

    #[test]
    fn test_buggy_end_marker_becomes_end() {
        let arp = VenomArp::default();
        let mut p = sample();
        let mut steps = steps_from_model(&p);
        steps[4] = note(MAX_TIME, 0, 102);
        write_steps(&mut p, &steps);
        let mut raw: Vec<u8> = playable_steps(&steps_from_model(&p))
            .iter()
            .flat_map(|s| s.to_word().to_le_bytes())
            .collect();
        let junk = ArpStep { time: BUGGY_END_TIME, ..note(0, 0, 102) };
        raw[16..20].copy_from_slice(&junk.to_word().to_le_bytes());
        let frame = FrameBuilder::new(&HEADER)
            .push(DEFAULT_ID)
            .checksum_from_here()
            .extend(&[WRITE_DUMP, 0x00, PATTERN_EDIT, 0x00])
            .extend(&seven_bit::pack(&raw))
            .finish();
        let (outcome, back) = arp.parse(&frame);
        assert_eq!(outcome, ParseOutcome::Succeeded);
        assert_eq!(steps_from_model(&back)[4].mode, StepMode::End);
        assert_eq!(steps_from_model(&back)[3].mode, StepMode::Bend);
    }

    #[test]
    fn test_quantize() {
        let mut steps = [note(0, 0, 0), note(5, 0, 0), note(13, 0, 0), note(30, 0, 0)];
        let mut up = steps;
        quantize(&mut up, Quantize::Up);
        assert_eq!(up.map(|s| s.time), [0, 24, 24, 48]);
        let mut down = steps;
        quantize(&mut down, Quantize::Down);
        assert_eq!(down.map(|s| s.time), [0, 0, 0, 24]);
        quantize(&mut steps, Quantize::Nearest);
        assert_eq!(steps.map(|s| s.time), [0, 0, 24, 24]);
    }

    #[test]
    fn test_revise_clamps_steps() {
        let arp = VenomArp::default();
        let mut p = sample();
        p.set("step0time", 2000);
        p.set("step1mode", 9);
        arp.revise(&mut p);
        assert_eq!(p.get("step0time"), Some(767));
        assert_eq!(p.get("step1mode"), Some(3));
    }

    #[test]
    fn test_requests() {
        let arp = VenomArp::default();
        let request = arp.request_dump(PatchLocation::new(0, 9));
        assert_eq!(&request[0].to_bytes()[6..10], &[0x01, 0x03, 0x01, 9]);
        assert_eq!(&request[2].to_bytes()[6..10], &[0x01, 0x04, 0x01, 9]);
        let current = arp.request_current_dump();
        assert_eq!(&current[0].to_bytes()[6..10], &[0x01, 0x00, 0x08, 0x00]);
        assert_eq!(&current[2].to_bytes()[6..10], &[0x01, 0x00, 0x0D, 0x00]);
    }
}
