//! Venom multi patches: four parts, shared aux effects and master EQ.
//!
//! One 210-byte frame carrying 173 bytes packed 7-to-8:
//!
//! ```text
//! F0 00 01 05 21 id 02 kind bank num <packed payload> cs F7
//!                      |    |    |
//!                      |    |    +-- patch number (stored dumps)
//!                      |    +------- 02 (edit buffer) or bank + 1
//!                      +------------ 00 edit buffer, 02 stored multi
//! ```
//!
//! Payload slot numbers double as single-parameter numbers (op `0A`).
//! Writing to a slot sends the edit-buffer dump followed by a store command.
//!
//! Each part's arp source is split over two bytes: the part source byte
//! carries a "single" bit and the arp slot carries `7F` for "multi". Both
//! are zero for "pattern".

use std::sync::OnceLock;

use patchwire_core::frame::{FrameBuilder, split_frames};
use patchwire_core::{
    BitField, DeviceDescriptor, DeviceFamily, DeviceSettings, Destination, FlagLayout, Message,
    ParamRange, ParameterModel, ParameterTable, ParseOutcome, Patch, PatchLocation, Quirk,
    RESERVED, RangeMap, SysexCodec, Timing, name_from_bytes, name_from_list, padded_name_bytes,
    seven_bit,
};
use tracing::{debug, warn};

use super::tables::{self, NAME_LEN};
use super::{
    CANCEL, DEFAULT_ID, HEADER, PAYLOAD_OFFSET, READ_DUMP, WRITE_DUMP, arp_octave_from_wire,
    command_frame, parameter_frame, wide_bool,
};

/// Multi dump length.
pub const MULTI_LEN: usize = 210;

/// Unpacked offset of the name.
pub const NAME_OFFSET: usize = 163;

const EDIT_MULTI_PARAM: u8 = 0x0A;
const STORE_PATCH: u8 = 0x06;
const MULTI_DUMP: u8 = 0x02;
const NAME_PARAM: u16 = (0x01 << 7) | 0x23;

/// Arp source: follows the multi.
pub const ARP_SOURCE_MULTI: i32 = 0;
/// Arp source: follows the part's single patch.
pub const ARP_SOURCE_SINGLE: i32 = 1;
/// Arp source: a stored arp pattern.
pub const ARP_SOURCE_PATTERN: i32 = 2;

/// Venom multi patches.
pub static MULTI: DeviceDescriptor = DeviceDescriptor {
    id: "venom-multi",
    name: "M-Audio Venom [Multi]",
    family: DeviceFamily::Venom,
    manufacturer: &[0x00, 0x01, 0x05],
    banks: &["A", "B"],
    writable_banks: &[1],
    patches_per_bank: 128,
    name_len: NAME_LEN,
    default_name: "Untitled",
    default_device_id: DEFAULT_ID,
    quirks: &[Quirk::WideBooleans],
};

/// Keys of one part that do not map one-to-one onto a payload slot.
#[derive(Debug)]
pub struct PartKeys {
    /// Slot holding the voice flags and the arp "single" bit.
    pub source: &'static str,
    /// Slot holding the controller enables.
    pub control: &'static str,
    /// Arp source key (0 multi, 1 single, 2 pattern).
    pub arpsource: &'static str,
    /// Bits 0 and 1 of the source byte.
    pub voice: FlagLayout,
    /// Bits 0..=5 of the control byte.
    pub controls: FlagLayout,
}

macro_rules! part_keys {
    ($n:literal) => {
        PartKeys {
            source: concat!("part", $n, "source"),
            control: concat!("part", $n, "controlenable"),
            arpsource: concat!("part", $n, "arpsource"),
            voice: FlagLayout {
                fields: &[
                    (concat!("part", $n, "channelsingle"), BitField::bit(0)),
                    (concat!("part", $n, "voicesingle"), BitField::bit(1)),
                ],
                always_set: 0,
            },
            controls: FlagLayout {
                fields: &[
                    (concat!("part", $n, "pitchbendenable"), BitField::bit(0)),
                    (concat!("part", $n, "modwheelenable"), BitField::bit(1)),
                    (concat!("part", $n, "sustainenable"), BitField::bit(2)),
                    (concat!("part", $n, "expressionenable"), BitField::bit(3)),
                    (concat!("part", $n, "keyboardenable"), BitField::bit(4)),
                    (concat!("part", $n, "externalmidiinputenable"), BitField::bit(5)),
                ],
                always_set: 0,
            },
        }
    };
}

/// Parts 1..=4.
pub static PARTS: [PartKeys; 4] = [part_keys!(1), part_keys!(2), part_keys!(3), part_keys!(4)];

macro_rules! part_slots {
    ($n:literal) => {
        [
            concat!("part", $n, "bank"),
            concat!("part", $n, "program"),
            concat!("part", $n, "coarsetune"),
            concat!("part", $n, "finetune"),
            concat!("part", $n, "voicemode"),
            concat!("part", $n, "unisonmode"),
            concat!("part", $n, "unisoncount"),
            concat!("part", $n, "unisondetune"),
            concat!("part", $n, "volume"),
            concat!("part", $n, "pan"),
            concat!("part", $n, "direct"),
            concat!("part", $n, "aux1send"),
            concat!("part", $n, "aux2send"),
            concat!("part", $n, "fxtype"),
            concat!("part", $n, "channel"),
            concat!("part", $n, "keylow"),
            concat!("part", $n, "keyhigh"),
            concat!("part", $n, "vellow"),
            concat!("part", $n, "velhigh"),
            concat!("part", $n, "controlenable"),
        ]
    };
}

macro_rules! part_arp_slots {
    ($n:literal) => {
        [
            concat!("part", $n, "arpenable"),
            concat!("part", $n, "arpsource"),
            concat!("part", $n, "arpbank"),
            concat!("part", $n, "arppattern"),
            concat!("part", $n, "arpmode"),
            concat!("part", $n, "arpnoteorder"),
            concat!("part", $n, "arpoctaverange"),
            concat!("part", $n, "arpbipolar"),
            concat!("part", $n, "arplatchkeys"),
            concat!("part", $n, "arprootnote"),
        ]
    };
}

macro_rules! part_ranges {
    ($n:literal) => {
        [
            ParamRange::new(concat!("part", $n, "enable"), 0, 1),
            ParamRange::new(concat!("part", $n, "channelsingle"), 0, 1),
            ParamRange::new(concat!("part", $n, "voicesingle"), 0, 1),
            ParamRange::new(concat!("part", $n, "bank"), 0, 3),
            ParamRange::new(concat!("part", $n, "voicemode"), 0, 1),
            ParamRange::new(concat!("part", $n, "unisonmode"), 0, 1),
            ParamRange::new(concat!("part", $n, "unisoncount"), 2, 12),
            ParamRange::new(concat!("part", $n, "fxtype"), 0, 5),
            ParamRange::new(concat!("part", $n, "channel"), 0, 16),
            ParamRange::new(concat!("part", $n, "pitchbendenable"), 0, 1),
            ParamRange::new(concat!("part", $n, "modwheelenable"), 0, 1),
            ParamRange::new(concat!("part", $n, "sustainenable"), 0, 1),
            ParamRange::new(concat!("part", $n, "expressionenable"), 0, 1),
            ParamRange::new(concat!("part", $n, "keyboardenable"), 0, 1),
            ParamRange::new(concat!("part", $n, "externalmidiinputenable"), 0, 1),
            ParamRange::new(concat!("part", $n, "arpenable"), 0, 1),
            ParamRange::new(concat!("part", $n, "arpsource"), 0, 2),
            ParamRange::new(concat!("part", $n, "arpbank"), 0, 1),
            ParamRange::new(concat!("part", $n, "arpmode"), 0, 2),
            ParamRange::new(concat!("part", $n, "arpnoteorder"), 0, 6),
            ParamRange::new(concat!("part", $n, "arpoctaverange"), 60, 68),
            ParamRange::new(concat!("part", $n, "arpbipolar"), 0, 1),
            ParamRange::new(concat!("part", $n, "arplatchkeys"), 0, 1),
        ]
    };
}

const HEAD_SLOTS: [&str; 13] = [
    "part1source", "part2source", "part3source", "part4source",
    "aux1source", "aux2source", "mastersource", RESERVED, RESERVED,
    "part1enable", "part2enable", "part3enable", "part4enable",
];

const FX_SLOTS: [&str; 30] = [
    "aux1mode", "aux1type", "aux1depth", "aux1prehp", "aux1predelay", "aux1highdamp",
    "aux1time", "aux1feedback", "aux1gatedelaytime", "aux1gatethresh", "aux1tonegain",
    "aux1tonefrequency",
    "aux2mode", "aux2type", "aux2depth", "aux2toaux1", "aux2prehp", "aux2prelp", "aux2time",
    "aux2feedback", "aux2highdamp", "aux2lforate", "aux2lfodepth",
    "progvolume",
    "mastereqlowfreq", "mastereqlowgain", "mastereqmidfreq", "mastereqmidgain",
    "mastereqhighfreq", "mastereqhighgain",
];

const PART_SLOTS: [[&str; 20]; 4] = [part_slots!(1), part_slots!(2), part_slots!(3), part_slots!(4)];

const ARP_SLOTS: [[&str; 10]; 4] =
    [part_arp_slots!(1), part_arp_slots!(2), part_arp_slots!(3), part_arp_slots!(4)];

const PART_RANGES: [&[ParamRange]; 4] =
    [&part_ranges!(1), &part_ranges!(2), &part_ranges!(3), &part_ranges!(4)];

const RANGE_OVERRIDES: &[ParamRange] = &[
    ParamRange::new("aux1source", 0, 4),
    ParamRange::new("aux2source", 0, 4),
    ParamRange::new("mastersource", 0, 4),
    ParamRange::new("aux1mode", 0, 1),
    ParamRange::new("aux2mode", 0, 1),
    ParamRange::new("aux1type", 0, 12),
    ParamRange::new("aux2type", 0, 3),
    ParamRange::new("aux2lforate", 0, 123),
];

/// Effect sources of the aux and master sections.
pub const AUX_PARAM_SOURCES: [&str; 5] = ["Multi", "Part 1", "Part 2", "Part 3", "Part 4"];
/// Arp source names.
pub const ARP_SOURCES: [&str; 3] = ["Multi", "Single", "Pattern"];

/// Payload slot layout.
pub fn table() -> &'static ParameterTable {
    static TABLE: OnceLock<ParameterTable> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut slots: Vec<&'static str> = HEAD_SLOTS.to_vec();
        PART_SLOTS.iter().for_each(|part| slots.extend_from_slice(part));
        slots.extend_from_slice(&FX_SLOTS);
        ARP_SLOTS.iter().for_each(|arp| slots.extend_from_slice(arp));
        slots.resize(NAME_OFFSET + NAME_LEN, RESERVED);
        ParameterTable::new(&slots)
    })
}

/// Keys of the multi model: table keys with the source and control bytes
/// split into their bits.
pub fn model_keys() -> impl Iterator<Item = &'static str> {
    table()
        .keys()
        .filter(|k| !PARTS.iter().any(|p| p.source == *k || p.control == *k))
        .chain(
            PARTS
                .iter()
                .flat_map(|p| p.voice.fields.iter().chain(p.controls.fields))
                .map(|(k, _)| *k),
        )
}

fn ranges() -> &'static RangeMap {
    static RANGES: OnceLock<RangeMap> = OnceLock::new();
    RANGES.get_or_init(|| {
        let mut overrides = RANGE_OVERRIDES.to_vec();
        PART_RANGES.iter().for_each(|r| overrides.extend_from_slice(r));
        RangeMap::new(model_keys(), 0, 127, &overrides)
    })
}

/// The part key without its `partN` prefix.
fn part_suffix(key: &str) -> Option<&str> {
    key.strip_prefix("part").and_then(|rest| rest.get(1..))
}

fn is_wide_boolean(key: &str) -> bool {
    matches!(key, "aux1mode" | "aux2mode")
        || matches!(
            part_suffix(key),
            Some("enable" | "unisonmode" | "arpenable" | "arpbipolar" | "arplatchkeys")
        )
}

/// Venom multi codec.
#[derive(Debug, Clone)]
pub struct VenomMulti {
    settings: DeviceSettings,
}

impl VenomMulti {
    /// Codec addressing the device described by `settings`.
    pub fn new(settings: DeviceSettings) -> Self {
        Self { settings }
    }

    fn device_id(&self) -> u8 {
        self.settings.device_id_or(&MULTI) & 0x7F
    }

    fn command(&self, body: &[u8]) -> Message {
        Message::Sysex(command_frame(self.device_id(), body))
    }

    fn parameter_message(&self, param: usize, value: i32) -> Message {
        parameter_frame(self.device_id(), EDIT_MULTI_PARAM, param as u16, value)
    }

    /// Undocumented commands that put the front panel in multi mode.
    fn switch_screen(&self) -> [Message; 2] {
        [
            self.command(&[WRITE_DUMP, 0x15, 0x00, 0x01, 0x00, 0x01]),
            self.command(&[WRITE_DUMP, 0x15, 0x00, 0x02, 0x00, 0x00]),
        ]
    }

    fn encode_slot(model: &dyn ParameterModel, key: &str) -> u8 {
        if let Some(part) = PARTS.iter().find(|p| p.source == key) {
            let single = model.get_or(part.arpsource, ARP_SOURCE_MULTI) == ARP_SOURCE_SINGLE;
            return part.voice.pack(model) | (u8::from(single) << 2);
        }
        if let Some(part) = PARTS.iter().find(|p| p.control == key) {
            return part.controls.pack(model);
        }
        match key {
            k if PARTS.iter().any(|p| p.arpsource == k) => {
                if model.get_or(k, ARP_SOURCE_MULTI) == ARP_SOURCE_MULTI {
                    0x7F
                } else {
                    0
                }
            }
            k if is_wide_boolean(k) => wide_bool(model, k),
            k => model.get_or(k, 0) as u8,
        }
    }

    /// Builds a multi dump. `location` selects the stored form.
    pub fn emit_dump(&self, model: &dyn ParameterModel, location: Option<PatchLocation>) -> Vec<u8> {
        let table = table();
        let mut raw = vec![0u8; table.len()];
        for (i, &key) in table.slots().iter().enumerate() {
            if key != RESERVED {
                raw[i] = Self::encode_slot(model, key);
            }
        }
        raw[NAME_OFFSET..NAME_OFFSET + NAME_LEN]
            .copy_from_slice(&padded_name_bytes(model.name(), NAME_LEN));

        let (kind, bank, number) = match location {
            Some(l) => (MULTI_DUMP, (l.bank & 0x01) + 1, l.number & 0x7F),
            None => (0x00, MULTI_DUMP, 0x00),
        };
        FrameBuilder::new(&HEADER)
            .push(self.device_id())
            .checksum_from_here()
            .extend(&[WRITE_DUMP, kind, bank, number])
            .extend(&seven_bit::pack(&raw))
            .finish()
    }

    fn decode_dump(frame: &[u8]) -> Patch {
        let mut patch = Patch::new("");
        if frame[7] == MULTI_DUMP {
            let mut bank = i32::from(frame[8]) - 1;
            if !(0..=1).contains(&bank) {
                warn!(byte = frame[8], "venom multi dump has an invalid bank byte, using bank A");
                bank = 0;
            }
            patch.set_location(Some(PatchLocation::new(bank as u8, frame[9])));
        }

        let raw = seven_bit::unpack(&frame[PAYLOAD_OFFSET..frame.len() - 2]);
        if let Some(name) = raw.get(NAME_OFFSET..NAME_OFFSET + NAME_LEN) {
            patch.set_name(&name_from_bytes(name));
        }

        for (&key, &byte) in table().slots().iter().zip(&raw) {
            if key == RESERVED {
                continue;
            }
            if let Some(part) = PARTS.iter().find(|p| p.source == key) {
                part.voice.unpack(byte, &mut patch);
                continue;
            }
            if let Some(part) = PARTS.iter().find(|p| p.control == key) {
                part.controls.unpack(byte, &mut patch);
                continue;
            }
            if let Some(n) = PARTS.iter().position(|p| p.arpsource == key) {
                let source = if byte == 0x7F {
                    ARP_SOURCE_MULTI
                } else if raw[n] & 0x04 != 0 {
                    ARP_SOURCE_SINGLE
                } else {
                    ARP_SOURCE_PATTERN
                };
                patch.set(key, source);
                continue;
            }
            match key {
                k if is_wide_boolean(k) => patch.set(k, i32::from(byte >= 64)),
                k if part_suffix(k) == Some("arpoctaverange") => {
                    patch.set(k, arp_octave_from_wire(byte as i8));
                }
                k => patch.set(k, i32::from(byte)),
            }
        }
        patch
    }
}

impl Default for VenomMulti {
    fn default() -> Self {
        Self::new(DeviceSettings::default())
    }
}

impl SysexCodec for VenomMulti {
    fn descriptor(&self) -> &DeviceDescriptor {
        &MULTI
    }

    fn settings(&self) -> &DeviceSettings {
        &self.settings
    }

    fn recognize(&self, data: &[u8]) -> bool {
        data.len() == MULTI_LEN
            && data.starts_with(&HEADER)
            && data[6] == WRITE_DUMP
            && ((data[7] == 0x00 && data[8] == MULTI_DUMP) || data[7] == MULTI_DUMP)
    }

    fn parse(&self, data: &[u8]) -> (ParseOutcome, Patch) {
        match split_frames(data).find(|f| self.recognize(f)) {
            Some(frame) => {
                debug!(stored = frame[7] == MULTI_DUMP, "parsing venom multi dump");
                let mut patch = Self::decode_dump(frame);
                self.revise(&mut patch);
                (ParseOutcome::Succeeded, patch)
            }
            None => (ParseOutcome::Failed, Patch::new(MULTI.default_name)),
        }
    }

    fn emit(&self, model: &dyn ParameterModel, destination: Destination) -> Vec<Message> {
        match destination {
            Destination::WorkingMemory => {
                let mut messages = vec![Message::Sysex(self.emit_dump(model, None))];
                messages.extend(self.switch_screen());
                messages
            }
            // The device answers stored-multi requests with bad data, so
            // writes go through the edit buffer and a store command.
            Destination::Slot(location) => vec![
                Message::Sysex(self.emit_dump(model, None)),
                self.command(&[
                    STORE_PATCH,
                    MULTI_DUMP,
                    (location.bank & 0x01) + 1,
                    location.number & 0x7F,
                ]),
            ],
            Destination::File => vec![Message::Sysex(
                self.emit_dump(model, Some(model.location().unwrap_or_default())),
            )],
        }
    }

    fn emit_parameter(&self, model: &dyn ParameterModel, key: &str) -> Vec<Message> {
        if matches!(key, "bank" | "number") {
            return Vec::new();
        }
        if key == "name" {
            return padded_name_bytes(model.name(), NAME_LEN)
                .into_iter()
                .enumerate()
                .map(|(i, ch)| self.parameter_message(usize::from(NAME_PARAM) + i, i32::from(ch)))
                .collect();
        }
        let table = table();
        if let Some((n, part)) = PARTS
            .iter()
            .enumerate()
            .find(|(_, p)| p.voice.contains(key) || p.arpsource == key)
        {
            let arp_index = table.index_of(part.arpsource).unwrap_or(0);
            return vec![
                self.parameter_message(n, i32::from(Self::encode_slot(model, part.source))),
                self.parameter_message(arp_index, i32::from(Self::encode_slot(model, part.arpsource))),
            ];
        }
        if let Some(part) = PARTS.iter().find(|p| p.controls.contains(key)) {
            if let Some(index) = table.index_of(part.control) {
                return vec![self.parameter_message(index, i32::from(part.controls.pack(model)))];
            }
        }
        match table.index_of(key) {
            Some(index) => vec![self.parameter_message(index, i32::from(Self::encode_slot(model, key)))],
            None => {
                warn!(key, "venom multi has no single-parameter message for key");
                Vec::new()
            }
        }
    }

    fn change_patch(&self, location: PatchLocation) -> Vec<Message> {
        let mut messages = vec![self.command(&[
            WRITE_DUMP,
            0x15,
            0x00,
            0x0D,
            (location.bank & 0x01) + 0x40,
            location.number & 0x7F,
        ])];
        messages.extend(self.switch_screen());
        messages
    }

    /// Selects the multi, then asks for the edit buffer.
    fn request_dump(&self, location: PatchLocation) -> Vec<Message> {
        let mut messages = self.change_patch(location);
        messages.push(Message::Pause(self.timing().after_change_patch));
        messages.extend(self.request_current_dump());
        messages
    }

    fn request_current_dump(&self) -> Vec<Message> {
        vec![self.command(&[READ_DUMP, 0x00, MULTI_DUMP, 0x00])]
    }

    fn acknowledge_receipt(&self) -> Vec<Message> {
        vec![self.command(&[CANCEL])]
    }

    fn timing(&self) -> Timing {
        Timing::from_millis(0, 750, 500)
    }

    fn ranges(&self) -> &RangeMap {
        ranges()
    }

    fn display(&self, key: &str, value: i32) -> String {
        let list: &[&str] = match part_suffix(key).unwrap_or(key) {
            "aux1source" | "aux2source" | "mastersource" => &AUX_PARAM_SOURCES,
            "channelsingle" | "voicesingle" => &["Multi", "Single"],
            "arpsource" => &ARP_SOURCES,
            "bank" => &tables::BANKS,
            "arpbank" => &["A", "B"],
            "fxtype" => &tables::INSERT_FX_TYPES,
            "aux1type" => &tables::AUX_FX_1_TYPES,
            "aux2type" => &tables::AUX_FX_2_TYPES,
            "arpmode" => &tables::ARP_MODES,
            "arpnoteorder" => &tables::ARP_NOTE_ORDERS,
            "channel" if value == 0 => return String::from("Omni"),
            "arpoctaverange" | "coarsetune" => return format!("{}", value - 64),
            "arprootnote" => {
                return format!(
                    "{}{}",
                    tables::NOTES[value.rem_euclid(12) as usize],
                    value.div_euclid(12) - 1
                );
            }
            _ => return value.to_string(),
        };
        name_from_list(list, value)
    }

    fn init_patch(&self) -> Patch {
        let mut patch = Patch::new(MULTI.default_name);
        for r in ranges().iter() {
            patch.set(r.key, r.min);
        }
        for n in 0..PARTS.len() {
            for (key, value) in [
                ("coarsetune", 64),
                ("finetune", 64),
                ("volume", 100),
                ("pan", 64),
                ("direct", 127),
                ("keyhigh", 127),
                ("velhigh", 127),
                ("arpoctaverange", 64),
                ("arprootnote", 60),
                ("pitchbendenable", 1),
                ("modwheelenable", 1),
                ("sustainenable", 1),
                ("expressionenable", 1),
                ("keyboardenable", 1),
                ("externalmidiinputenable", 1),
            ] {
                patch.set(&format!("part{}{key}", n + 1), value);
            }
            patch.set(&format!("part{}channel", n + 1), n as i32 + 1);
        }
        patch.set("part1enable", 1);
        patch.set("progvolume", 100);
        patch
    }
}
