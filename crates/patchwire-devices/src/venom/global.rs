//! Venom global settings.
//!
//! One 36-byte frame, edit buffer only:
//!
//! ```text
//! F0 00 01 05 21 id 02 00 00 00 <packed 20 bytes> 00 cs F7
//! ```
//!
//! Single parameters use op `08`. The documented parameter numbers are off
//! by one past the tempo: tempo occupies two slots in the dump but one
//! parameter number, so every slot from the global channel on is sent as
//! `index - 1`.

use patchwire_core::frame::{FrameBuilder, split_frames};
use patchwire_core::{
    DeviceDescriptor, DeviceFamily, DeviceSettings, Destination, Message, ParamRange,
    ParameterModel, ParameterTable, ParseOutcome, Patch, PatchLocation, Quirk, RangeMap,
    SysexCodec, Timing, name_from_list, seven_bit,
};
use std::sync::OnceLock;
use tracing::{debug, warn};

use super::{
    CANCEL, DEFAULT_ID, HEADER, PAYLOAD_OFFSET, READ_DUMP, WRITE_DUMP,
    command_frame, parameter_frame, wide_bool,
};

/// Global dump length.
pub const GLOBAL_LEN: usize = 36;

const EDIT_GLOBAL_PARAM: u8 = 0x08;

const SLOTS: [&str; 20] = [
    "octave",
    "transpose",
    "mastertune",
    "mastertempomsb",
    "mastertempolsb",
    "globalchannel",
    "midioutmode",
    "localmode",
    "velcurve",
    "fixedvel",
    "midireceiveclockmode",
    "miditransmitclockmode",
    "midisingleselect",
    "midimultiselect",
    "arpeggiatorroute",
    "sustainpedalcc",
    "expressionpedalcc",
    "modulationwheelcc",
    "usbrecord",
    "monorecord",
];

/// Sent as 0/127 although documented as 0/1.
const WIDE_BOOLEANS: [&str; 6] = [
    "midisingleselect",
    "midimultiselect",
    "usbrecord",
    "monorecord",
    "arpeggiatorroute",
    "localmode",
];

const RANGE_OVERRIDES: &[ParamRange] = &[
    ParamRange::new("octave", 61, 67),
    ParamRange::new("transpose", 52, 76),
    ParamRange::new("mastertune", 14, 114),
    ParamRange::new("mastertempo", 50, 300),
    ParamRange::new("globalchannel", 0, 15),
    ParamRange::new("midioutmode", 0, 1),
    ParamRange::new("localmode", 0, 1),
    ParamRange::new("velcurve", 0, 3),
    ParamRange::new("midireceiveclockmode", 0, 2),
    ParamRange::new("miditransmitclockmode", 0, 2),
    ParamRange::new("midisingleselect", 0, 1),
    ParamRange::new("midimultiselect", 0, 1),
    ParamRange::new("arpeggiatorroute", 0, 1),
    ParamRange::new("sustainpedalcc", 0, 131),
    ParamRange::new("expressionpedalcc", 0, 131),
    ParamRange::new("modulationwheelcc", 0, 131),
    ParamRange::new("usbrecord", 0, 1),
    ParamRange::new("monorecord", 0, 1),
];

/// Pedal and wheel assignments past the 128 MIDI controllers.
const EXTRA_CC: [&str; 4] = ["PB Sens", "F Tune", "C Tune", "AT"];

/// Venom global settings.
pub static GLOBAL: DeviceDescriptor = DeviceDescriptor {
    id: "venom-global",
    name: "M-Audio Venom [Global]",
    family: DeviceFamily::Venom,
    manufacturer: &[0x00, 0x01, 0x05],
    banks: &[],
    writable_banks: &[],
    patches_per_bank: 0,
    name_len: 10,
    default_name: "Global",
    default_device_id: DEFAULT_ID,
    quirks: &[Quirk::WideBooleans],
};

fn table() -> &'static ParameterTable {
    static TABLE: OnceLock<ParameterTable> = OnceLock::new();
    TABLE.get_or_init(|| ParameterTable::new(&SLOTS))
}

fn ranges() -> &'static RangeMap {
    static RANGES: OnceLock<RangeMap> = OnceLock::new();
    RANGES.get_or_init(|| {
        let keys = SLOTS
            .iter()
            .copied()
            .filter(|k| !k.starts_with("mastertempo"))
            .chain(std::iter::once("mastertempo"));
        RangeMap::new(keys, 0, 127, RANGE_OVERRIDES)
    })
}

/// Venom global settings codec.
#[derive(Debug, Clone)]
pub struct VenomGlobal {
    settings: DeviceSettings,
}

impl VenomGlobal {
    /// Codec addressing the device described by `settings`.
    pub fn new(settings: DeviceSettings) -> Self {
        Self { settings }
    }

    fn device_id(&self) -> u8 {
        self.settings.device_id_or(&GLOBAL) & 0x7F
    }

    fn encode_slot(model: &dyn ParameterModel, key: &str) -> u8 {
        match key {
            "mastertempomsb" => (model.get_or("mastertempo", 120) >> 8) as u8,
            "mastertempolsb" => (model.get_or("mastertempo", 120) & 0xFF) as u8,
            k if WIDE_BOOLEANS.contains(&k) => wide_bool(model, k),
            k => model.get_or(k, 0) as u8,
        }
    }

    /// Builds the global dump.
    pub fn emit_dump(&self, model: &dyn ParameterModel) -> Vec<u8> {
        let raw: Vec<u8> = SLOTS.iter().map(|k| Self::encode_slot(model, k)).collect();
        let mut payload = seven_bit::pack(&raw);
        payload.resize(GLOBAL_LEN - PAYLOAD_OFFSET - 2, 0);
        FrameBuilder::new(&HEADER)
            .push(self.device_id())
            .checksum_from_here()
            .extend(&[WRITE_DUMP, 0x00, 0x00, 0x00])
            .extend(&payload)
            .finish()
    }

    fn decode_dump(frame: &[u8]) -> Patch {
        let raw = seven_bit::unpack(&frame[PAYLOAD_OFFSET..frame.len() - 2]);
        let mut patch = Patch::new(GLOBAL.default_name);
        for (i, (&key, &byte)) in SLOTS.iter().zip(&raw).enumerate() {
            match key {
                "mastertempolsb" => {}
                "mastertempomsb" => {
                    let lsb = raw.get(i + 1).copied().unwrap_or(0);
                    patch.set("mastertempo", (i32::from(byte) << 8) | i32::from(lsb));
                }
                k if WIDE_BOOLEANS.contains(&k) => patch.set(k, i32::from(byte >= 64)),
                k => patch.set(k, i32::from(byte)),
            }
        }
        patch
    }
}

impl Default for VenomGlobal {
    fn default() -> Self {
        Self::new(DeviceSettings::default())
    }
}

impl SysexCodec for VenomGlobal {
    fn descriptor(&self) -> &DeviceDescriptor {
        &GLOBAL
    }

    fn settings(&self) -> &DeviceSettings {
        &self.settings
    }

    fn recognize(&self, data: &[u8]) -> bool {
        data.len() == GLOBAL_LEN
            && data.starts_with(&HEADER)
            && data[6] == WRITE_DUMP
            && data[7] == 0x00
            && data[8] == 0x00
    }

    fn parse(&self, data: &[u8]) -> (ParseOutcome, Patch) {
        match split_frames(data).find(|f| self.recognize(f)) {
            Some(frame) => {
                debug!("parsing venom global dump");
                let mut patch = Self::decode_dump(frame);
                self.revise(&mut patch);
                (ParseOutcome::Succeeded, patch)
            }
            None => (ParseOutcome::Failed, Patch::new(GLOBAL.default_name)),
        }
    }

    fn emit(&self, model: &dyn ParameterModel, _destination: Destination) -> Vec<Message> {
        vec![Message::Sysex(self.emit_dump(model))]
    }

    fn emit_parameter(&self, model: &dyn ParameterModel, key: &str) -> Vec<Message> {
        let id = self.device_id();
        match key {
            // Changing the MIDI out port mid-session cuts the connection.
            "midioutmode" | "name" => Vec::new(),
            "mastertempo" => {
                vec![parameter_frame(id, EDIT_GLOBAL_PARAM, 3, model.get_or(key, 120))]
            }
            k => match table().index_of(k) {
                Some(index) => {
                    let param = if index >= 5 { index - 1 } else { index };
                    let value = i32::from(Self::encode_slot(model, k));
                    vec![parameter_frame(id, EDIT_GLOBAL_PARAM, param as u16, value)]
                }
                None => {
                    warn!(key = k, "venom global has no parameter for key");
                    Vec::new()
                }
            },
        }
    }

    fn change_patch(&self, _location: PatchLocation) -> Vec<Message> {
        Vec::new()
    }

    fn request_dump(&self, _location: PatchLocation) -> Vec<Message> {
        self.request_current_dump()
    }

    fn request_current_dump(&self) -> Vec<Message> {
        vec![Message::Sysex(command_frame(
            self.device_id(),
            &[READ_DUMP, 0x00, 0x00, 0x00],
        ))]
    }

    fn acknowledge_receipt(&self) -> Vec<Message> {
        vec![Message::Sysex(command_frame(self.device_id(), &[CANCEL]))]
    }

    fn timing(&self) -> Timing {
        Timing::from_millis(0, 750, 0)
    }

    fn ranges(&self) -> &RangeMap {
        ranges()
    }

    fn display(&self, key: &str, value: i32) -> String {
        match key {
            "octave" | "transpose" | "mastertune" => format!("{}", value - 64),
            "globalchannel" => format!("{}", value + 1),
            "velcurve" => name_from_list(&["Low", "Normal", "High", "Fixed"], value),
            "midireceiveclockmode" => name_from_list(&["Off", "On", "Auto"], value),
            "miditransmitclockmode" => name_from_list(&["Off", "On / Arp", "On / Always"], value),
            "arpeggiatorroute" => name_from_list(&["Local + Keyboard", "Local + MIDI"], value),
            "midioutmode" => name_from_list(&["USB", "Key"], value),
            "sustainpedalcc" | "expressionpedalcc" | "modulationwheelcc" if value >= 128 => {
                name_from_list(&EXTRA_CC, value - 128)
            }
            _ => value.to_string(),
        }
    }

    fn init_patch(&self) -> Patch {
        let mut patch = Patch::new(GLOBAL.default_name);
        for r in ranges().iter() {
            patch.set(r.key, r.min);
        }
        patch.set("octave", 64);
        patch.set("transpose", 64);
        patch.set("mastertune", 64);
        patch.set("mastertempo", 120);
        patch.set("velcurve", 1);
        patch.set("fixedvel", 100);
        patch.set("localmode", 1);
        patch.set("sustainpedalcc", 64);
        patch.set("expressionpedalcc", 11);
        patch.set("modulationwheelcc", 1);
        patch
    }
}
