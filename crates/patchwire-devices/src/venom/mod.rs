//! M-Audio Venom single-patch codec.
//!
//! Patches travel as one frame with an 8-bit payload packed 7-to-8:
//!
//! ```text
//! F0 00 01 05 21 id 02 kind bank num <packed payload> cs F7
//!                   |  |    |    |
//!                   |  |    |    +-- patch number (stored dumps)
//!                   |  |    +------- 01 (edit buffer) or bank + 1
//!                   |  +------------ 00 edit buffer, 01 stored patch
//!                   +--------------- write data dump
//! ```
//!
//! The checksum covers everything from the command byte (offset 6) up to
//! the checksum itself. Edit-buffer frames are 239 bytes; stored-patch
//! frames are 240 because the device repeats the osc 2 waveform byte.

pub mod arp;
pub mod controller;
pub mod global;
pub mod multi;
pub mod tables;

use std::time::Duration;

use patchwire_core::frame::{FrameBuilder, refresh_checksum, split_frames};
use patchwire_core::{
    BitField, DeviceDescriptor, DeviceFamily, DeviceSettings, Destination, FlagLayout, Message,
    ParameterModel, ParseOutcome, Patch, PatchLocation, Quirk, RESERVED, RangeMap, SysexCodec,
    Timing, name_from_bytes, name_from_list, padded_name_bytes, revise_standard, seven_bit,
};
use tracing::{debug, warn};

pub use arp::VenomArp;
pub use controller::{ControllerEvent, apply_controller};
pub use global::VenomGlobal;
pub use multi::VenomMulti;
use tables::{EDIT_BUFFER_NAME_OFFSET, MOD_DESTINATION_KEYS, NAME_LEN, WIDE_BOOLEANS};

/// Manufacturer and model prefix of every Venom frame.
const HEADER: [u8; 5] = [0xF0, 0x00, 0x01, 0x05, 0x21];

/// Device id the Venom answers to and sends.
pub const DEFAULT_ID: u8 = 0x7F;

const WRITE_DUMP: u8 = 0x02;
const READ_DUMP: u8 = 0x01;
const EDIT_SINGLE_PARAM: u8 = 0x09;
const CANCEL: u8 = 0x7D;

/// Start of the packed payload.
const PAYLOAD_OFFSET: usize = 10;
/// Start of the checksummed range (the command byte).
const CHECKSUM_START: usize = 6;

/// Edit-buffer dump length.
pub const EDIT_BUFFER_LEN: usize = 239;
/// Stored-patch dump length.
pub const STORED_LEN: usize = 240;

/// Oscillator flags byte. The keytrack bits hold the hardware value, where
/// 1 means keytracking is off. Bit 6 is unknown and always set.
pub const OSC_FLAGS: FlagLayout = FlagLayout {
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

/// Single-parameter number of the flags byte.
const OSC_FLAGS_PARAM: u16 = 0x18;
/// Single-parameter numbers of the two cutoff bytes.
const CUTOFF_HIGH_PARAM: u16 = 0x6A;
const CUTOFF_LOW_PARAM: u16 = 0x6B;
/// Single-parameter number of the first name character.
const NAME_PARAM: u16 = (0x01 << 7) | 0x3C;

/// First wire value of the shifted mod destinations.
const SHIFTED_DESTINATION_BASE: i32 = 64;
/// First model value of the mod amount destinations.
const MOD_AMOUNT_DESTINATION: i32 = 18;

/// The Venom.
pub static DESCRIPTOR: DeviceDescriptor = DeviceDescriptor {
    id: "venom",
    name: "M-Audio Venom",
    family: DeviceFamily::Venom,
    manufacturer: &[0x00, 0x01, 0x05],
    banks: &tables::BANKS,
    writable_banks: &[2, 3],
    patches_per_bank: 128,
    name_len: NAME_LEN,
    default_name: "Untitled",
    default_device_id: DEFAULT_ID,
    quirks: &[
        Quirk::AlwaysSetFlagBit,
        Quirk::WideBooleans,
        Quirk::ShiftedModDestinations,
        Quirk::RepeatedWaveformByte,
        Quirk::SignedArpOctave,
    ],
};

/// The two dump layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpForm {
    /// 239-byte edit-buffer dump.
    EditBuffer,
    /// 240-byte stored-patch dump.
    Stored,
}

impl DumpForm {
    /// Frame length.
    pub const fn len(self) -> usize {
        match self {
            DumpForm::EditBuffer => EDIT_BUFFER_LEN,
            DumpForm::Stored => STORED_LEN,
        }
    }

    /// Slot layout of the unpacked payload.
    pub fn table(self) -> &'static patchwire_core::ParameterTable {
        match self {
            DumpForm::EditBuffer => tables::edit_buffer_table(),
            DumpForm::Stored => tables::stored_table(),
        }
    }

    /// Unpacked offset of the name.
    pub const fn name_offset(self) -> usize {
        match self {
            DumpForm::EditBuffer => EDIT_BUFFER_NAME_OFFSET,
            DumpForm::Stored => EDIT_BUFFER_NAME_OFFSET + 1,
        }
    }
}

/// Model value → wire value for a mod destination.
pub fn destination_to_wire(value: i32) -> i32 {
    if value >= MOD_AMOUNT_DESTINATION {
        value - MOD_AMOUNT_DESTINATION + SHIFTED_DESTINATION_BASE
    } else {
        value
    }
}

/// Wire value → model value for a mod destination.
pub fn destination_from_wire(value: i32) -> i32 {
    if value >= SHIFTED_DESTINATION_BASE {
        value - SHIFTED_DESTINATION_BASE + MOD_AMOUNT_DESTINATION
    } else {
        value
    }
}

/// Recovers the arp octave range (60..=68, 64 = no shift) from a dump byte.
///
/// Stored dumps send it as a signed offset from 64 and some firmware sends
/// the offset already wrapped, so every known form is accepted. Anything
/// else is logged and becomes 0.
pub fn arp_octave_from_wire(byte: i8) -> i32 {
    let o = i32::from(byte);
    match o {
        60..=68 => o,
        -4..=4 => 64 + o,
        124..=127 => o - 128 + 64,
        -128..=-124 => o + 128 + 64,
        _ => {
            warn!(value = o, "bad unconverted arp octave value");
            0
        }
    }
}

/// A short command frame: header, `id`, `body`, `F7`.
pub(crate) fn command_frame(id: u8, body: &[u8]) -> Vec<u8> {
    FrameBuilder::new(&HEADER).push(id & 0x7F).extend(body).finish()
}

/// Single-parameter edit `op` with `param` and `value` split into 7-bit
/// MSB/LSB pairs.
pub(crate) fn parameter_frame(id: u8, op: u8, param: u16, value: i32) -> Message {
    let value = value.clamp(0, 0x3FFF) as u16;
    Message::Sysex(command_frame(
        id,
        &[
            WRITE_DUMP,
            op,
            ((param >> 7) & 0x7F) as u8,
            (param & 0x7F) as u8,
            ((value >> 7) & 0x7F) as u8,
            (value & 0x7F) as u8,
        ],
    ))
}

/// Booleans the Venom sends as 0/127.
pub(crate) fn wide_bool(model: &dyn ParameterModel, key: &str) -> u8 {
    if model.get_or(key, 0) == 0 { 0 } else { 127 }
}

/// Venom codec.
#[derive(Debug, Clone)]
pub struct Venom {
    settings: DeviceSettings,
}

impl Venom {
    /// Codec addressing the device described by `settings`.
    pub fn new(settings: DeviceSettings) -> Self {
        Self { settings }
    }

    fn device_id(&self) -> u8 {
        self.settings.device_id_or(&DESCRIPTOR) & 0x7F
    }

    fn command(&self, body: &[u8]) -> Vec<u8> {
        command_frame(self.device_id(), body)
    }

    fn parameter_message(&self, param: u16, value: i32) -> Message {
        parameter_frame(self.device_id(), EDIT_SINGLE_PARAM, param, value)
    }

    /// Wire byte for one table slot.
    fn encode_slot(model: &dyn ParameterModel, key: &str, form: DumpForm) -> u8 {
        match key {
            "arpoctaverange" => {
                let v = model.get_or(key, 64);
                match form {
                    DumpForm::Stored => (v - 64) as i8 as u8,
                    DumpForm::EditBuffer => v as u8,
                }
            }
            "cutoffhigh" => (model.get_or("cutoff", 0) >> 7) as u8,
            "cutofflow" => (model.get_or("cutoff", 0) & 0x7F) as u8,
            "oscflags" => OSC_FLAGS.pack(model),
            k if WIDE_BOOLEANS.contains(&k) => wide_bool(model, k),
            k if k.ends_with("destination") => destination_to_wire(model.get_or(k, 0)) as u8,
            k => model.get_or(k, 0) as u8,
        }
    }

    /// Builds a dump of `model` in `form`. `location` is written for stored
    /// dumps.
    pub fn emit_dump(
        &self,
        model: &dyn ParameterModel,
        form: DumpForm,
        location: PatchLocation,
    ) -> Vec<u8> {
        let table = form.table();
        let mut raw = vec![0u8; table.len()];
        for (i, &key) in table.slots().iter().enumerate() {
            if key != RESERVED {
                raw[i] = Self::encode_slot(model, key, form);
            }
        }
        if form == DumpForm::Stored {
            if let Some(i) = table.index_of("osc2waveform") {
                raw[i + 1] = raw[i];
            }
        }
        let name_at = form.name_offset();
        raw[name_at..name_at + NAME_LEN].copy_from_slice(&padded_name_bytes(model.name(), NAME_LEN));

        let (kind, bank, number) = match form {
            DumpForm::EditBuffer => (0x00, 0x01, 0x00),
            DumpForm::Stored => (0x01, (location.bank & 0x03) + 1, location.number & 0x7F),
        };
        FrameBuilder::new(&HEADER)
            .push(self.device_id())
            .checksum_from_here()
            .push(WRITE_DUMP)
            .push(kind)
            .push(bank)
            .push(number)
            .extend(&seven_bit::pack(&raw))
            .finish()
    }

    /// Decodes a recognized dump frame.
    fn decode_dump(frame: &[u8]) -> Patch {
        let form = if frame.len() == STORED_LEN {
            DumpForm::Stored
        } else {
            DumpForm::EditBuffer
        };
        let mut patch = Patch::new("");

        if frame[7] == 0x01 {
            let mut bank = i32::from(frame[8]) - 1;
            if !(0..=3).contains(&bank) {
                warn!(byte = frame[8], "venom dump has an invalid bank byte, using bank A");
                bank = 0;
            }
            patch.set_location(Some(PatchLocation::new(bank as u8, frame[9])));
        }

        let raw = seven_bit::unpack(&frame[PAYLOAD_OFFSET..frame.len() - 2]);
        let name_at = form.name_offset();
        if let Some(name) = raw.get(name_at..name_at + NAME_LEN) {
            patch.set_name(&name_from_bytes(name));
        }

        for (i, (&key, &byte)) in form.table().slots().iter().zip(&raw).enumerate() {
            match key {
                RESERVED | "cutofflow" => {}
                "arpoctaverange" => patch.set(key, arp_octave_from_wire(byte as i8)),
                "cutoffhigh" => {
                    let low = raw.get(i + 1).copied().unwrap_or(0);
                    patch.set("cutoff", (i32::from(byte) << 7) | i32::from(low));
                }
                "oscflags" => OSC_FLAGS.unpack(byte, &mut patch),
                k if WIDE_BOOLEANS.contains(&k) => patch.set(k, i32::from(byte >= 64)),
                k if k.ends_with("destination") => {
                    patch.set(k, destination_from_wire(i32::from(byte)));
                }
                k => patch.set(k, i32::from(byte)),
            }
        }
        patch
    }

    /// Rewrites a stored dump so the device writes it into `bank` (C or D).
    /// Edit-buffer dumps only get their id reset.
    pub fn retarget_for_write(&self, frame: &[u8], bank: u8) -> Option<Vec<u8>> {
        if !self.recognize(frame) {
            return None;
        }
        if !DESCRIPTOR.is_writable(bank) {
            warn!(bank, "venom bank is not writable");
            return None;
        }
        let mut out = frame.to_vec();
        out[5] = DEFAULT_ID;
        if out[7] == 0x01 {
            out[8] = bank + 1;
        }
        refresh_checksum(&mut out, CHECKSUM_START);
        Some(out)
    }

    /// Mod slots 3..=15 may not target their own amount, and a slot whose
    /// amount is targeted may not itself target an amount.
    fn revise_mod_destinations(model: &mut dyn ParameterModel) {
        for i in 3..16 {
            let own_key = MOD_DESTINATION_KEYS[i - 1];
            let own_amount = i as i32 + 17;
            if model.get_or(own_key, 0) == own_amount {
                model.set(own_key, 0);
            }
            for j in 3..16 {
                if model.get_or(MOD_DESTINATION_KEYS[j - 1], 0) == own_amount
                    && model.get_or(own_key, 0) >= MOD_AMOUNT_DESTINATION
                {
                    model.set(own_key, 0);
                }
            }
        }
    }
}

impl Default for Venom {
    fn default() -> Self {
        Self::new(DeviceSettings::default())
    }
}

impl SysexCodec for Venom {
    fn descriptor(&self) -> &DeviceDescriptor {
        &DESCRIPTOR
    }

    fn settings(&self) -> &DeviceSettings {
        &self.settings
    }

    fn recognize(&self, data: &[u8]) -> bool {
        let header_ok = data.starts_with(&HEADER) && data.get(6) == Some(&WRITE_DUMP);
        match data.len() {
            STORED_LEN => header_ok && matches!(data[7], 0x00 | 0x01),
            EDIT_BUFFER_LEN => {
                header_ok && data[7] == 0x00 && matches!(data[8], 0x01 | 0x03..=0x06)
            }
            _ => false,
        }
    }

    fn parse(&self, data: &[u8]) -> (ParseOutcome, Patch) {
        match split_frames(data).find(|f| self.recognize(f)) {
            Some(frame) => {
                debug!(len = frame.len(), "parsing venom dump");
                let mut patch = Self::decode_dump(frame);
                self.revise(&mut patch);
                (ParseOutcome::Succeeded, patch)
            }
            None => (ParseOutcome::Failed, Patch::new(DESCRIPTOR.default_name)),
        }
    }

    fn emit(&self, model: &dyn ParameterModel, destination: Destination) -> Vec<Message> {
        let frame = match destination {
            Destination::WorkingMemory => {
                self.emit_dump(model, DumpForm::EditBuffer, PatchLocation::default())
            }
            Destination::Slot(location) => self.emit_dump(model, DumpForm::Stored, location),
            Destination::File => {
                self.emit_dump(model, DumpForm::Stored, model.location().unwrap_or_default())
            }
        };
        vec![Message::Sysex(frame)]
    }

    fn emit_parameter(&self, model: &dyn ParameterModel, key: &str) -> Vec<Message> {
        match key {
            "bank" | "number" => Vec::new(),
            "name" => padded_name_bytes(model.name(), NAME_LEN)
                .into_iter()
                .enumerate()
                .map(|(i, ch)| self.parameter_message(NAME_PARAM + i as u16, i32::from(ch)))
                .collect(),
            // The device takes each cutoff byte as the LSB of its own
            // parameter.
            "cutoff" => {
                let cutoff = model.get_or("cutoff", 0);
                vec![
                    self.parameter_message(CUTOFF_HIGH_PARAM, cutoff >> 7),
                    self.parameter_message(CUTOFF_LOW_PARAM, cutoff & 0x7F),
                ]
            }
            k if OSC_FLAGS.contains(k) => {
                vec![self.parameter_message(OSC_FLAGS_PARAM, i32::from(OSC_FLAGS.pack(model)))]
            }
            k => match tables::edit_buffer_table().index_of(k) {
                Some(index) => {
                    let value = i32::from(Self::encode_slot(model, k, DumpForm::EditBuffer));
                    vec![self.parameter_message(index as u16, value)]
                }
                None => {
                    warn!(key = k, "venom has no single-parameter message for key");
                    Vec::new()
                }
            },
        }
    }

    fn change_patch(&self, location: PatchLocation) -> Vec<Message> {
        vec![
            Message::Sysex(self.command(&[
                WRITE_DUMP,
                0x15,
                0x00,
                0x0D,
                location.bank & 0x03,
                location.number & 0x7F,
            ])),
            // Switch the front panel to the patch screen.
            Message::Sysex(self.command(&[WRITE_DUMP, 0x15, 0x00, 0x01, 0x00, 0x00])),
        ]
    }

    fn request_dump(&self, location: PatchLocation) -> Vec<Message> {
        vec![Message::Sysex(self.command(&[
            READ_DUMP,
            0x01,
            (location.bank & 0x03) + 1,
            location.number & 0x7F,
        ]))]
    }

    fn request_current_dump(&self) -> Vec<Message> {
        vec![Message::Sysex(self.command(&[READ_DUMP, 0x00, 0x01, 0x00]))]
    }

    /// The Venom keeps resending a dump until it sees a cancel.
    fn acknowledge_receipt(&self) -> Vec<Message> {
        vec![Message::Sysex(self.command(&[CANCEL]))]
    }

    fn timing(&self) -> Timing {
        Timing::from_millis(0, 750, 500)
    }

    fn ranges(&self) -> &RangeMap {
        tables::ranges()
    }

    fn revise(&self, model: &mut dyn ParameterModel) {
        revise_standard(model, self.ranges(), &DESCRIPTOR);
        Self::revise_mod_destinations(model);
    }

    fn display(&self, key: &str, value: i32) -> String {
        match (key, tables::display_list(key)) {
            ("arprootnote", _) => format!(
                "{}{}",
                tables::NOTES[value.rem_euclid(12) as usize],
                value.div_euclid(12) - 1
            ),
            (_, Some(list)) => name_from_list(list, value),
            _ => value.to_string(),
        }
    }

    fn init_patch(&self) -> Patch {
        let mut patch = Patch::new(DESCRIPTOR.default_name);
        for r in self.ranges().iter() {
            patch.set(r.key, r.min);
        }
        patch.set("arpoctaverange", 64);
        patch.set("unisoncount", 2);
        patch.set("channelvolume", 100);
        patch.set("channelpan", 64);
        patch.set("progvolume", 100);
        patch
    }

    fn prepare_bulk_write(&self, data: &[u8], bank: u8, _name: Option<&str>) -> Option<Vec<Message>> {
        let mut messages = Vec::new();
        for frame in split_frames(data) {
            let retargeted = self.retarget_for_write(frame, bank)?;
            if !messages.is_empty() {
                messages.push(Message::Pause(Duration::from_millis(750)));
            }
            messages.push(Message::Sysex(retargeted));
        }
        (!messages.is_empty()).then_some(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use patchwire_core::checksum;

    fn sample_patch() -> Patch {
        let venom = Venom::default();
        let mut p = venom.init_patch();
        p.set_name("Fat Bass");
        p.set("glidemode", 1);
        p.set("glidetime", 33);
        p.set("cutoff", 9000);
        p.set("resonance", 101);
        p.set("osc2waveform", 17);
        p.set("osc2coarsetune", 52);
        p.set("osc1keytrack", 1);
        p.set("osc3sync", 1);
        p.set("mod1destination", 1);
        p.set("mod2destination", 25);
        p.set("arpoctaverange", 62);
        p.set("arpenable", 1);
        p.set("aux1type", 11);
        p
    }

    #[test]
    fn test_edit_buffer_dump_shape() {
        let venom = Venom::default();
        let frame = venom.emit_dump(&sample_patch(), DumpForm::EditBuffer, PatchLocation::default());
        assert_eq!(frame.len(), EDIT_BUFFER_LEN);
        assert_eq!(&frame[..10], &[0xF0, 0x00, 0x01, 0x05, 0x21, 0x7F, 0x02, 0x00, 0x01, 0x00]);
        assert_eq!(frame[EDIT_BUFFER_LEN - 1], 0xF7);
        assert!(checksum::verify(&frame[CHECKSUM_START..frame.len() - 1]));
        assert!(frame[1..frame.len() - 1].iter().all(|&b| b <= 0x7F));
        assert!(venom.recognize(&frame));
    }

    #[test]
    fn test_stored_dump_shape_and_location() {
        let venom = Venom::default();
        let frame = venom.emit_dump(&sample_patch(), DumpForm::Stored, PatchLocation::new(2, 99));
        assert_eq!(frame.len(), STORED_LEN);
        assert_eq!(frame[7], 0x01);
        assert_eq!(frame[8], 3);
        assert_eq!(frame[9], 99);
        assert!(venom.recognize(&frame));
    }

    #[test]
    fn test_round_trip_both_forms() {
        let venom = Venom::default();
        let patch = sample_patch();
        for form in [DumpForm::EditBuffer, DumpForm::Stored] {
            let frame = venom.emit_dump(&patch, form, PatchLocation::new(1, 5));
            let (outcome, parsed) = venom.parse(&frame);
            assert_eq!(outcome, ParseOutcome::Succeeded);
            assert_eq!(parsed.name(), "Fat Bass");
            for (key, value) in patch.values() {
                assert_eq!(parsed.get(key), Some(value), "{key} in {form:?}");
            }
        }
    }

    #[test]
    fn test_stored_dump_repeats_osc2_waveform() {
        let venom = Venom::default();
        let frame = venom.emit_dump(&sample_patch(), DumpForm::Stored, PatchLocation::default());
        let raw = seven_bit::unpack(&frame[PAYLOAD_OFFSET..frame.len() - 2]);
        let i = tables::stored_table().index_of("osc2waveform").unwrap();
        assert_eq!(raw[i], 17);
        assert_eq!(raw[i + 1], 17);
        assert_eq!(raw[i + 2], 52);
    }

    #[test]
    fn test_wire_transforms() {
        let venom = Venom::default();
        let frame = venom.emit_dump(&sample_patch(), DumpForm::EditBuffer, PatchLocation::default());
        let raw = seven_bit::unpack(&frame[PAYLOAD_OFFSET..frame.len() - 2]);
        let t = tables::edit_buffer_table();
        assert_eq!(raw[t.index_of("glidemode").unwrap()], 127);
        assert_eq!(raw[t.index_of("cutoffhigh").unwrap()], (9000 >> 7) as u8);
        assert_eq!(raw[t.index_of("cutofflow").unwrap()], (9000 & 127) as u8);
        assert_eq!(raw[t.index_of("oscflags").unwrap()], 0x40 | 0x04 | 0x08);
        assert_eq!(raw[t.index_of("mod2destination").unwrap()], 25 - 18 + 64);
        assert_eq!(raw[t.index_of("mod1destination").unwrap()], 1);
        assert_eq!(&raw[188..198], b"Fat Bass  ");
    }

    #[test]
    fn test_stored_arp_octave_is_signed_offset() {
        let venom = Venom::default();
        let frame = venom.emit_dump(&sample_patch(), DumpForm::Stored, PatchLocation::default());
        let raw = seven_bit::unpack(&frame[PAYLOAD_OFFSET..frame.len() - 2]);
        let i = tables::stored_table().index_of("arpoctaverange").unwrap();
        assert_eq!(raw[i] as i8, -2);
    }

    #[test]
    fn test_arp_octave_recovery() {
        assert_eq!(arp_octave_from_wire(64), 64);
        assert_eq!(arp_octave_from_wire(0), 64);
        assert_eq!(arp_octave_from_wire(-3), 61);
        assert_eq!(arp_octave_from_wire(127), 63);
        assert_eq!(arp_octave_from_wire(-128), 64);
        assert_eq!(arp_octave_from_wire(30), 0);
    }

    #[test]
    fn test_wide_boolean_threshold() {
        let venom = Venom::default();
        let mut frame = venom.emit_dump(&sample_patch(), DumpForm::EditBuffer, PatchLocation::default());
        let mut raw = seven_bit::unpack(&frame[PAYLOAD_OFFSET..frame.len() - 2]);
        raw[tables::edit_buffer_table().index_of("unisonmode").unwrap()] = 63;
        raw[tables::edit_buffer_table().index_of("glidemode").unwrap()] = 64;
        let end = frame.len() - 2;
        frame[PAYLOAD_OFFSET..end].copy_from_slice(&seven_bit::pack(&raw));
        refresh_checksum(&mut frame, CHECKSUM_START);
        assert!(checksum::verify(&frame[CHECKSUM_START..frame.len() - 1]));
        let (_, parsed) = venom.parse(&frame);
        assert_eq!(parsed.get("unisonmode"), Some(0));
        assert_eq!(parsed.get("glidemode"), Some(1));
    }

    #[test]
    fn test_bad_bank_byte_falls_back_to_a() {
        let venom = Venom::default();
        let mut frame = venom.emit_dump(&sample_patch(), DumpForm::Stored, PatchLocation::new(1, 3));
        frame[8] = 9;
        let (outcome, parsed) = venom.parse(&frame);
        assert_eq!(outcome, ParseOutcome::Succeeded);
        assert_eq!(parsed.location(), Some(PatchLocation::new(0, 3)));
    }

    #[test]
    fn test_recognize_rules() {
        let venom = Venom::default();
        let mut frame = venom.emit_dump(&sample_patch(), DumpForm::EditBuffer, PatchLocation::default());
        for bank in [0x01, 0x03, 0x04, 0x05, 0x06] {
            frame[8] = bank;
            assert!(venom.recognize(&frame), "bank byte {bank}");
        }
        frame[8] = 0x02;
        assert!(!venom.recognize(&frame));
        assert!(!venom.recognize(&frame[..100]));
        let (outcome, _) = venom.parse(&[0xF0, 0x43, 0xF7]);
        assert_eq!(outcome, ParseOutcome::Failed);
    }

    #[test]
    fn test_single_parameter_messages() {
        let venom = Venom::default();
        let patch = sample_patch();

        let msgs = venom.emit_parameter(&patch, "cutoff");
        assert_eq!(msgs.len(), 2);
        assert_eq!(
            msgs[0].to_bytes(),
            vec![0xF0, 0x00, 0x01, 0x05, 0x21, 0x7F, 0x02, 0x09, 0x00, 0x6A, 0x00, (9000 >> 7) as u8, 0xF7]
        );
        assert_eq!(msgs[1].to_bytes()[11], (9000 & 127) as u8);

        let msgs = venom.emit_parameter(&patch, "osc3sync");
        assert_eq!(&msgs[0].to_bytes()[8..12], &[0x00, 0x18, 0x00, 0x4C]);

        let msgs = venom.emit_parameter(&patch, "glidemode");
        assert_eq!(&msgs[0].to_bytes()[8..12], &[0x00, 0x00, 0x00, 127]);

        let msgs = venom.emit_parameter(&patch, "mod2destination");
        let index = tables::edit_buffer_table().index_of("mod2destination").unwrap() as u8;
        assert_eq!(&msgs[0].to_bytes()[8..12], &[0x00, index, 0x00, 71]);

        let msgs = venom.emit_parameter(&patch, "name");
        assert_eq!(msgs.len(), 10);
        assert_eq!(&msgs[0].to_bytes()[8..12], &[0x01, 0x3C, 0x00, b'F']);
        assert_eq!(&msgs[9].to_bytes()[8..12], &[0x01, 0x45, 0x00, b' ']);

        assert!(venom.emit_parameter(&patch, "bank").is_empty());
        assert!(venom.emit_parameter(&patch, "nonsense").is_empty());
    }

    #[test]
    fn test_requests_and_patch_change() {
        let venom = Venom::default();
        let req = venom.request_dump(PatchLocation::new(3, 10));
        assert_eq!(
            req[0].to_bytes(),
            vec![0xF0, 0x00, 0x01, 0x05, 0x21, 0x7F, 0x01, 0x01, 0x04, 0x0A, 0xF7]
        );
        let cur = venom.request_current_dump();
        assert_eq!(cur[0].to_bytes()[6..], [0x01, 0x00, 0x01, 0x00, 0xF7]);
        let change = venom.change_patch(PatchLocation::new(1, 2));
        assert_eq!(change[0].to_bytes()[6..], [0x02, 0x15, 0x00, 0x0D, 0x01, 0x02, 0xF7]);
        assert_eq!(change[1].to_bytes()[6..], [0x02, 0x15, 0x00, 0x01, 0x00, 0x00, 0xF7]);
        let ack = venom.acknowledge_receipt();
        assert_eq!(ack[0].to_bytes(), vec![0xF0, 0x00, 0x01, 0x05, 0x21, 0x7F, 0x7D, 0xF7]);
        assert_eq!(venom.timing().after_change_patch, Duration::from_millis(500));
    }

    #[test]
    fn test_retarget_for_write() {
        let venom = Venom::default();
        let mut frame = venom.emit_dump(&sample_patch(), DumpForm::Stored, PatchLocation::new(0, 7));
        frame[5] = 0x10;
        let out = venom.retarget_for_write(&frame, 3).unwrap();
        assert_eq!(out[5], 0x7F);
        assert_eq!(out[8], 4);
        assert!(checksum::verify(&out[CHECKSUM_START..out.len() - 1]));
        assert!(venom.retarget_for_write(&frame, 0).is_none());

        let mut both = frame.clone();
        both.extend_from_slice(&frame);
        let msgs = venom.prepare_bulk_write(&both, 2, None).unwrap();
        assert_eq!(msgs.len(), 3);
        assert!(msgs[1].is_pause());
    }

    #[test]
    fn test_revise_mod_destinations() {
        let venom = Venom::default();
        let mut p = venom.init_patch();
        p.set("mod5destination", 5 + 17);
        p.set("mod4destination", 6 + 17);
        p.set("mod6destination", 20);
        p.set("mod7destination", 2);
        p.set("mod8destination", 99);
        p.set_name("A\u{1}very long name");
        venom.revise(&mut p);
        assert_eq!(p.get("mod5destination"), Some(0));
        assert_eq!(p.get("mod6destination"), Some(0));
        assert_eq!(p.get("mod4destination"), Some(23));
        assert_eq!(p.get("mod7destination"), Some(2));
        assert_eq!(p.get("mod8destination"), Some(33));
        assert_eq!(p.name(), "A very lon");
    }

    #[test]
    fn test_parse_revises_decoded_patch() {
        let venom = Venom::default();
        let mut p = venom.init_patch();
        p.set("mod3destination", 20);
        p.set("mod4destination", 4);
        let frame = venom.emit_dump(&p, DumpForm::EditBuffer, PatchLocation::default());
        let (outcome, parsed) = venom.parse(&frame);
        assert_eq!(outcome, ParseOutcome::Succeeded);
        assert_eq!(parsed.get("mod3destination"), Some(0));
        assert_eq!(parsed.get("mod4destination"), Some(4));
    }

    #[test]
    fn test_env1_release_tops_out_below_127() {
        let venom = Venom::default();
        let mut p = venom.init_patch();
        p.set("env1release", 127);
        p.set("env2release", 127);
        venom.revise(&mut p);
        assert_eq!(p.get("env1release"), Some(126));
        assert_eq!(p.get("env2release"), Some(127));
    }

    #[test]
    fn test_display() {
        let venom = Venom::default();
        assert_eq!(venom.display("filtertype", 4), "Lowpass 24");
        assert_eq!(venom.display("mod3destination", 20), "Mod 3 Amount");
        assert_eq!(venom.display("arprootnote", 60), "C4");
        assert_eq!(venom.display("resonance", 12), "12");
    }
}
