//! Yamaha 4-operator FM voices: DX21, DX27/DX100, TX81Z, DX11, TQ5 (and
//! YS100/YS200/B200), V50.
//!
//! All six models share one voice model. They differ in which additional
//! frames they send around VCED, in how a patch is selected, and in the V50
//! sign bits, so one [`Yamaha4Op`] codec covers them all and switches on
//! its [`Yamaha4OpModel`].
//!
//! TX81Z and DX11 performances live in [`performance`] with their own codec.

pub mod bank;
pub mod performance;
pub mod reassembly;
pub mod tables;

pub use performance::{PerformanceModel, Yamaha4OpPerformance};

use patchwire_core::{
    BankCodec, CodecError, DeviceDescriptor, DeviceFamily, DeviceSettings, Destination, Message,
    ParameterModel, ParseOutcome, Patch, PatchLocation, Quirk, RangeMap, SysexCodec, Timing,
    name_from_list, padded_name_bytes, split_frames,
};
use tracing::{debug, warn};

use reassembly::{FrameKind, Reassembler, clamp_fine, level_scaling_signs};
use tables::{LEVEL_SCALING_SIGN_KEYS, NAME_LEN, VCED_NAME_OFFSET, VELOCITY_SIGN_KEYS};

const VCED_GROUP: u8 = 0x12;
const ACED_GROUP: u8 = 0x13;
const EFEDS_GROUP: u8 = 0x24;
const PCED_GROUP: u8 = 0x10;
const REMOTE_SWITCH_GROUP: u8 = 0x13;
const TQ5_REMOTE_SWITCH_GROUP: u8 = 0x24;

/// Single-parameter numbers of ACED2 and ACED3 continue after ACED.
const ACED2_PARAM_BASE: usize = 23;
const ACED3_PARAM_BASE: usize = 33;
const EFEDS_PARAM_BASE: usize = 4;

const YAMAHA: &[u8] = &[0x43];

const BASE: DeviceDescriptor = DeviceDescriptor {
    id: "dx21",
    name: "Yamaha DX21",
    family: DeviceFamily::Yamaha4Op,
    manufacturer: YAMAHA,
    banks: &["A/B"],
    writable_banks: &[0],
    patches_per_bank: 32,
    name_len: NAME_LEN,
    default_name: "INIT VOICE",
    default_device_id: 0,
    quirks: &[Quirk::FineFrequencyClamp],
};

/// DX21.
pub static DX21: DeviceDescriptor = BASE;

/// DX27 and DX100.
pub static DX27: DeviceDescriptor = DeviceDescriptor {
    id: "dx27",
    name: "Yamaha DX27 / DX100",
    banks: &tables::BANKS,
    patches_per_bank: 24,
    ..BASE
};

/// TX81Z.
pub static TX81Z: DeviceDescriptor = DeviceDescriptor {
    id: "tx81z",
    name: "Yamaha TX81Z",
    banks: &tables::BANKS,
    ..BASE
};

/// DX11.
pub static DX11: DeviceDescriptor = DeviceDescriptor {
    id: "dx11",
    name: "Yamaha DX11",
    banks: &tables::BANKS,
    ..BASE
};

/// TQ5, YS100, YS200 and B200.
pub static TQ5: DeviceDescriptor = DeviceDescriptor {
    id: "tq5",
    name: "Yamaha TQ5 / YS100 / YS200 / B200",
    banks: &tables::TQ5_BANKS,
    writable_banks: &[1, 2],
    patches_per_bank: 100,
    ..BASE
};

/// V50.
pub static V50: DeviceDescriptor = DeviceDescriptor {
    id: "v50",
    name: "Yamaha V50",
    banks: &tables::V50_BANKS,
    writable_banks: &[0, 1],
    patches_per_bank: 100,
    quirks: &[Quirk::FineFrequencyClamp, Quirk::SignedSensitivity, Quirk::Aced3Effects],
    ..BASE
};

/// Which 4-op synthesizer a codec addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Yamaha4OpModel {
    /// DX21.
    Dx21,
    /// DX27 / DX100.
    Dx27,
    /// TX81Z.
    Tx81z,
    /// DX11.
    Dx11,
    /// TQ5 / YS100 / YS200 / B200.
    Tq5,
    /// V50.
    V50,
}

impl Yamaha4OpModel {
    /// Every model.
    pub const ALL: [Yamaha4OpModel; 6] = [
        Yamaha4OpModel::Dx21,
        Yamaha4OpModel::Dx27,
        Yamaha4OpModel::Tx81z,
        Yamaha4OpModel::Dx11,
        Yamaha4OpModel::Tq5,
        Yamaha4OpModel::V50,
    ];

    /// Static description.
    pub fn descriptor(self) -> &'static DeviceDescriptor {
        match self {
            Yamaha4OpModel::Dx21 => &DX21,
            Yamaha4OpModel::Dx27 => &DX27,
            Yamaha4OpModel::Tx81z => &TX81Z,
            Yamaha4OpModel::Dx11 => &DX11,
            Yamaha4OpModel::Tq5 => &TQ5,
            Yamaha4OpModel::V50 => &V50,
        }
    }

    /// Model with descriptor id `id`.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.descriptor().id == id)
    }

    /// Tag of the last additional frame the model sends, which is also what
    /// its dump request names. `None` for models that only send VCED.
    pub fn request_tag(self) -> Option<&'static [u8]> {
        match self {
            Yamaha4OpModel::Dx21 | Yamaha4OpModel::Dx27 => None,
            Yamaha4OpModel::Tx81z => FrameKind::Aced.tag(),
            Yamaha4OpModel::Dx11 => FrameKind::Aced2.tag(),
            Yamaha4OpModel::Tq5 => FrameKind::Efeds.tag(),
            Yamaha4OpModel::V50 => FrameKind::Aced3.tag(),
        }
    }

    /// Frames emitted for a voice, in order.
    pub fn emitted_frames(self) -> [FrameKind; 4] {
        let effects = if self.descriptor().has(Quirk::Aced3Effects) {
            FrameKind::Aced3
        } else {
            FrameKind::Efeds
        };
        [effects, FrameKind::Aced2, FrameKind::Aced, FrameKind::Vced]
    }
}

/// Codec for one 4-op model.
#[derive(Debug, Clone)]
pub struct Yamaha4Op {
    model: Yamaha4OpModel,
    settings: DeviceSettings,
}

impl Yamaha4Op {
    /// Codec for `model`.
    pub fn new(model: Yamaha4OpModel, settings: DeviceSettings) -> Self {
        Self { model, settings }
    }

    /// The addressed model.
    pub fn model(&self) -> Yamaha4OpModel {
        self.model
    }

    fn channel(&self) -> u8 {
        self.settings.channel & 0x0F
    }

    fn signed(&self) -> bool {
        self.model.descriptor().has(Quirk::SignedSensitivity)
    }

    fn parameter(&self, group: u8, param: usize, value: i32) -> Message {
        Message::Sysex(vec![
            0xF0,
            0x43,
            0x10 | self.channel(),
            group,
            (param & 0x7F) as u8,
            (value & 0x7F) as u8,
            0xF7,
        ])
    }

    fn program_change(&self, program: u8) -> Message {
        Message::program_change(self.channel(), program)
    }

    /// Every voice frame for `model`, in emit order.
    pub fn voice_frames(&self, model: &dyn ParameterModel) -> Vec<Vec<u8>> {
        self.model
            .emitted_frames()
            .into_iter()
            .map(|kind| kind.encode(model, self.channel(), self.signed()))
            .collect()
    }

    fn init_values(patch: &mut Patch) {
        for (key, value) in [
            ("algorithm", 0),
            ("operator1outputlevel", 90),
            ("operator1releaserate", 15),
            ("operator2releaserate", 15),
            ("operator3releaserate", 15),
            ("operator4releaserate", 15),
            ("operator1attackrate", 31),
            ("operator2attackrate", 31),
            ("operator3attackrate", 31),
            ("operator4attackrate", 31),
            ("operator1decay1level", 15),
            ("operator2decay1level", 15),
            ("operator3decay1level", 15),
            ("operator4decay1level", 15),
            ("operator1frequencycoarse", 4),
            ("operator2frequencycoarse", 4),
            ("operator3frequencycoarse", 4),
            ("operator4frequencycoarse", 4),
            ("operator1detune", 3),
            ("operator2detune", 3),
            ("operator3detune", 3),
            ("operator4detune", 3),
            ("transpose", 24),
            ("pitchbendrange", 4),
            ("breathcontrolpitchbias", 50),
            ("aftertouchpitchbias", 50),
            ("pitchattacklevel", 50),
            ("pitchdecaylevel", 50),
            ("pitchreleaselevel", 50),
            ("veffectbalance", 50),
            ("veffectoutlevel", 100),
        ] {
            patch.set(key, value);
        }
    }
}

impl SysexCodec for Yamaha4Op {
    fn descriptor(&self) -> &DeviceDescriptor {
        self.model.descriptor()
    }

    fn settings(&self) -> &DeviceSettings {
        &self.settings
    }

    fn recognize(&self, data: &[u8]) -> bool {
        FrameKind::identify(data).is_some() || bank::is_vmem(data)
    }

    fn parse(&self, data: &[u8]) -> (ParseOutcome, Patch) {
        if let Some(vmem) = split_frames(data).find(|f| bank::is_vmem(f)) {
            debug!("parsing first voice of a VMEM bank");
            return match bank::decode_voice(vmem, 0) {
                Ok(mut patch) => {
                    self.revise(&mut patch);
                    (ParseOutcome::Succeeded, patch)
                }
                Err(e) => {
                    warn!(%e, "unreadable VMEM bank");
                    (ParseOutcome::Failed, self.init_patch())
                }
            };
        }
        let mut reassembler = Reassembler::new();
        reassembler.feed_all(data);
        let (outcome, mut patch) = reassembler.finish();
        if outcome.is_success() {
            self.revise(&mut patch);
        }
        (outcome, patch)
    }

    fn emit(&self, model: &dyn ParameterModel, destination: Destination) -> Vec<Message> {
        let mut messages = Vec::new();
        if let Destination::Slot(location) = destination {
            messages.extend(self.change_patch(location));
            messages.push(Message::Pause(self.timing().after_change_patch));
        }
        messages.extend(self.voice_frames(model).into_iter().map(Message::Sysex));
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
                .map(|(i, c)| self.parameter(VCED_GROUP, VCED_NAME_OFFSET + i, i32::from(c)))
                .collect();
        }

        if let Some(i) = VELOCITY_SIGN_KEYS.iter().position(|k| *k == key) {
            if !self.signed() {
                return Vec::new();
            }
            let velocity = tables::VELOCITY_KEYS[i];
            let Some(index) = tables::vced_table().index_of(velocity) else {
                return Vec::new();
            };
            let value = model.get_or(velocity, 0) | (model.get_or(key, 0) << 3);
            return vec![self.parameter(VCED_GROUP, index, value)];
        }
        if LEVEL_SCALING_SIGN_KEYS.contains(&key) {
            if !self.signed() {
                return Vec::new();
            }
            let value = i32::from(level_scaling_signs(model));
            return vec![self.parameter(ACED_GROUP, ACED2_PARAM_BASE + tables::ACED2_SIGN_SLOT, value)];
        }

        if let Some(index) = tables::vced_table().index_of(key) {
            let mut value = model.get_or(key, 0);
            if self.signed() {
                if let Some(i) = tables::VELOCITY_KEYS.iter().position(|k| *k == key) {
                    value |= model.get_or(VELOCITY_SIGN_KEYS[i], 0) << 3;
                }
            }
            vec![self.parameter(VCED_GROUP, index, value)]
        } else if let Some(index) = tables::aced_table().index_of(key) {
            let mut value = model.get_or(key, 0);
            if let Some(&(coarse, _)) = tables::FREQUENCY_KEYS.iter().find(|(_, fine)| *fine == key) {
                value = clamp_fine(model.get_or(coarse, 0), value);
            }
            vec![self.parameter(ACED_GROUP, index, value)]
        } else if let Some(index) = tables::aced2_table().index_of(key) {
            vec![self.parameter(ACED_GROUP, ACED2_PARAM_BASE + index, model.get_or(key, 0))]
        } else if let Some(index) = tables::aced3_table().index_of(key) {
            vec![self.parameter(ACED_GROUP, ACED3_PARAM_BASE + index, model.get_or(key, 0))]
        } else if let Some(index) = tables::efeds_table().index_of(key) {
            vec![self.parameter(EFEDS_GROUP, EFEDS_PARAM_BASE + index, model.get_or(key, 0))]
        } else {
            warn!(key, "4-op voice has no single-parameter message for key");
            Vec::new()
        }
    }

    fn change_patch(&self, location: PatchLocation) -> Vec<Message> {
        let PatchLocation { mut bank, mut number } = location;
        let descriptor = self.model.descriptor();
        let per_bank = descriptor.patches_per_bank;
        if number >= per_bank {
            warn!(number, "patch number is invalid, wrapping to {}", number % per_bank);
            number %= per_bank;
        }
        if bank >= descriptor.bank_count() {
            warn!(bank, "bank is invalid, using bank 0");
            bank = 0;
        }

        match self.model {
            Yamaha4OpModel::Dx21 => vec![self.program_change(number)],
            Yamaha4OpModel::Dx27 => vec![self.program_change(number + bank * per_bank)],
            // Point program-change table slot 127 at the voice, press
            // PLAY/PERFORM (SINGLE on the DX11), then call up program 127.
            Yamaha4OpModel::Tx81z | Yamaha4OpModel::Dx11 => {
                let voice = u16::from(bank) * 32 + u16::from(number);
                let button = if self.model == Yamaha4OpModel::Tx81z { 68 } else { 118 };
                vec![
                    Message::Sysex(vec![
                        0xF0,
                        0x43,
                        0x10 | self.channel(),
                        PCED_GROUP,
                        0x7F,
                        0x7F,
                        (voice >> 7) as u8,
                        (voice & 0x7F) as u8,
                        0xF7,
                    ]),
                    Message::Sysex(vec![
                        0xF0,
                        0x43,
                        0x10 | self.channel(),
                        REMOTE_SWITCH_GROUP,
                        button,
                        0x7F,
                        0xF7,
                    ]),
                    self.program_change(127),
                ]
            }
            // Buttons 116, 117 and 118 select Preset, User and Card.
            Yamaha4OpModel::Tq5 => vec![
                Message::Sysex(vec![
                    0xF0,
                    0x43,
                    0x10 | self.channel(),
                    TQ5_REMOTE_SWITCH_GROUP,
                    116 + bank,
                    0x7F,
                    0xF7,
                ]),
                self.program_change(number),
            ],
            // Programs 122..=124 switch banks.
            Yamaha4OpModel::V50 => vec![self.program_change(122 + bank), self.program_change(number)],
        }
    }

    /// Always a patch change followed by a current-voice request.
    fn request_dump(&self, location: PatchLocation) -> Vec<Message> {
        let mut messages = self.change_patch(location);
        messages.push(Message::Pause(self.timing().after_change_patch));
        messages.extend(self.request_current_dump());
        messages
    }

    fn request_current_dump(&self) -> Vec<Message> {
        let mut frame = vec![0xF0, 0x43, 0x20 | self.channel()];
        match self.model.request_tag() {
            Some(tag) => {
                frame.push(0x7E);
                frame.extend_from_slice(tag);
            }
            None => frame.push(0x03),
        }
        frame.push(0xF7);
        vec![Message::Sysex(frame)]
    }

    fn timing(&self) -> Timing {
        Timing::from_millis(50, 50, 100)
    }

    fn ranges(&self) -> &RangeMap {
        tables::ranges()
    }

    fn display(&self, key: &str, value: i32) -> String {
        match key {
            "algorithm" => (value + 1).to_string(),
            "transpose" => (value - 24).to_string(),
            k if k.ends_with("detune") => (value - 3).to_string(),
            k => match tables::display_list(k) {
                Some(list) => name_from_list(list, value),
                None => value.to_string(),
            },
        }
    }

    fn init_patch(&self) -> Patch {
        let mut patch = Patch::new(self.model.descriptor().default_name);
        for r in self.ranges().iter() {
            patch.set(r.key, r.min);
        }
        Self::init_values(&mut patch);
        patch
    }

    fn as_bank(&self) -> Option<&dyn BankCodec> {
        Some(self)
    }
}

impl BankCodec for Yamaha4Op {
    fn recognize_bank(&self, data: &[u8]) -> bool {
        bank::is_vmem(data)
    }

    fn bank_patch_names(&self, data: &[u8]) -> Vec<String> {
        (0..bank::VOICES)
            .map_while(|i| bank::voice_name(data, i).ok())
            .collect()
    }

    fn parse_from_bank(&self, data: &[u8], index: usize) -> Result<Patch, CodecError> {
        let mut patch = bank::decode_voice(data, index)?;
        self.revise(&mut patch);
        Ok(patch)
    }

    fn emit_bank(&self, patches: &[Patch]) -> Vec<u8> {
        bank::encode_bank(patches, &self.init_patch(), self.channel(), self.signed())
    }

    fn request_bank(&self, _bank: u8) -> Vec<Message> {
        vec![Message::Sysex(vec![0xF0, 0x43, 0x20 | self.channel(), 0x04, 0xF7])]
    }

    fn patches_per_bank(&self) -> usize {
        bank::VOICES
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn codec(model: Yamaha4OpModel) -> Yamaha4Op {
        Yamaha4Op::new(model, DeviceSettings::on_channel(1))
    }

    fn voice(codec: &Yamaha4Op) -> Patch {
        let mut p = codec.init_patch();
        p.set_name("BRASS 2");
        p.set("algorithm", 6);
        p.set("operator2outputlevel", 77);
        p.set("operator4keyvelocitysensitivity", 3);
        p.set("operator4vkeyvelocitysensitivitysign", 1);
        p.set("operator1vlevelscalingsign", 1);
        p.set("operator3operatorwaveform", 5);
        p.set("effectpreset", 4);
        p.set("veffectsel", 9);
        p
    }

    #[test]
    fn test_emit_order_per_model() {
        let v50 = codec(Yamaha4OpModel::V50);
        let frames = v50.voice_frames(&voice(&v50));
        let lens: Vec<usize> = frames.iter().map(Vec::len).collect();
        assert_eq!(lens, vec![38, 28, 41, 101]);

        let tx = codec(Yamaha4OpModel::Tx81z);
        let frames = tx.voice_frames(&voice(&tx));
        let lens: Vec<usize> = frames.iter().map(Vec::len).collect();
        assert_eq!(lens, vec![21, 28, 41, 101]);
        assert!(frames.iter().all(|f| f[2] == 1));
    }

    #[test]
    fn test_round_trip_v50_keeps_signs() {
        let v50 = codec(Yamaha4OpModel::V50);
        let p = voice(&v50);
        let bytes = patchwire_core::sysex_bytes(&v50.emit(&p, Destination::File));
        let (outcome, parsed) = v50.parse(&bytes);
        assert_eq!(outcome, ParseOutcome::Succeeded);
        assert_eq!(parsed.name(), "BRASS 2");
        for (key, value) in p.values() {
            if key.starts_with("effect") {
                continue;
            }
            assert_eq!(parsed.get(key), Some(value), "{key}");
        }
    }

    #[test]
    fn test_round_trip_tq5_drops_signs() {
        let tq5 = codec(Yamaha4OpModel::Tq5);
        let p = voice(&tq5);
        let bytes = patchwire_core::sysex_bytes(&tq5.emit(&p, Destination::WorkingMemory));
        let (outcome, parsed) = tq5.parse(&bytes);
        assert_eq!(outcome, ParseOutcome::Succeeded);
        assert_eq!(parsed.get("effectpreset"), Some(4));
        assert_eq!(parsed.get("operator4vkeyvelocitysensitivitysign"), Some(0));
        assert_eq!(parsed.get("operator1vlevelscalingsign"), Some(0));
        assert_eq!(parsed.get("veffectsel"), None);
    }

    #[test]
    fn test_slot_emit_changes_patch_first() {
        let v50 = codec(Yamaha4OpModel::V50);
        let msgs = v50.emit(&voice(&v50), Destination::Slot(PatchLocation::new(1, 42)));
        assert_eq!(msgs[0], Message::program_change(1, 123));
        assert_eq!(msgs[1], Message::program_change(1, 42));
        assert_eq!(msgs[2], Message::Pause(Duration::from_millis(100)));
        assert_eq!(msgs.len(), 7);
    }

    #[test]
    fn test_single_parameters() {
        let v50 = codec(Yamaha4OpModel::V50);
        let p = voice(&v50);
        assert_eq!(
            v50.emit_parameter(&p, "algorithm")[0].to_bytes(),
            vec![0xF0, 0x43, 0x11, 0x12, 52, 6, 0xF7]
        );
        let kvs = tables::vced_table().index_of("operator4keyvelocitysensitivity").unwrap() as u8;
        assert_eq!(
            v50.emit_parameter(&p, "operator4vkeyvelocitysensitivitysign")[0].to_bytes(),
            vec![0xF0, 0x43, 0x11, 0x12, kvs, 3 | 8, 0xF7]
        );
        assert_eq!(
            v50.emit_parameter(&p, "operator3vlevelscalingsign")[0].to_bytes(),
            vec![0xF0, 0x43, 0x11, 0x13, 31, 1, 0xF7]
        );
        assert_eq!(v50.emit_parameter(&p, "veffectsel")[0].to_bytes()[4], 33);
        assert_eq!(v50.emit_parameter(&p, "effectbalance")[0].to_bytes()[3..5], [0x24, 6]);
        assert_eq!(v50.emit_parameter(&p, "aftertouchamplitude")[0].to_bytes()[4], 24);
        let name = v50.emit_parameter(&p, "name");
        assert_eq!(name.len(), 10);
        assert_eq!(name[0].to_bytes()[4..6], [77, b'B']);

        let dx = codec(Yamaha4OpModel::Dx21);
        assert!(dx.emit_parameter(&p, "operator4vkeyvelocitysensitivitysign").is_empty());
        assert!(dx.emit_parameter(&p, "operator1vlevelscalingsign").is_empty());
        assert!(dx.emit_parameter(&p, "number").is_empty());
        assert!(dx.emit_parameter(&p, "bogus").is_empty());
    }

    #[test]
    fn test_single_parameter_fine_clamp() {
        let tx = codec(Yamaha4OpModel::Tx81z);
        let mut p = voice(&tx);
        p.set("operator2frequencycoarse", 1);
        p.set("operator2frequencyfine", 14);
        let msg = tx.emit_parameter(&p, "operator2frequencyfine");
        assert_eq!(msg[0].to_bytes()[5], 7);
    }

    #[test]
    fn test_change_patch_per_model() {
        let dx27 = codec(Yamaha4OpModel::Dx27);
        assert_eq!(dx27.change_patch(PatchLocation::new(2, 30)), vec![Message::program_change(1, 2 * 24 + 6)]);

        let tx = codec(Yamaha4OpModel::Tx81z);
        let msgs = tx.change_patch(PatchLocation::new(4, 31));
        let voice = 4 * 32 + 31;
        assert_eq!(
            msgs[0].to_bytes(),
            vec![0xF0, 0x43, 0x11, 0x10, 0x7F, 0x7F, (voice >> 7) as u8, (voice & 0x7F) as u8, 0xF7]
        );
        assert_eq!(msgs[1].to_bytes(), vec![0xF0, 0x43, 0x11, 0x13, 68, 0x7F, 0xF7]);
        assert_eq!(msgs[2], Message::program_change(1, 127));
        assert_eq!(codec(Yamaha4OpModel::Dx11).change_patch(PatchLocation::new(0, 0))[1].to_bytes()[4], 118);

        let tq5 = codec(Yamaha4OpModel::Tq5);
        let msgs = tq5.change_patch(PatchLocation::new(7, 150));
        assert_eq!(msgs[0].to_bytes(), vec![0xF0, 0x43, 0x11, 0x24, 116, 0x7F, 0xF7]);
        assert_eq!(msgs[1], Message::program_change(1, 50));
    }

    #[test]
    fn test_requests() {
        assert_eq!(
            codec(Yamaha4OpModel::Dx21).request_current_dump()[0].to_bytes(),
            vec![0xF0, 0x43, 0x21, 0x03, 0xF7]
        );
        let req = codec(Yamaha4OpModel::Tq5).request_current_dump()[0].to_bytes();
        assert_eq!(&req[3..14], b"\x7ELM  8036EF");
        let v50 = codec(Yamaha4OpModel::V50).request_current_dump()[0].to_bytes();
        assert_eq!(&v50[4..14], b"LM  8073AE");

        let full = codec(Yamaha4OpModel::Dx21).request_dump(PatchLocation::new(0, 3));
        assert_eq!(full[0], Message::program_change(1, 3));
        assert!(full[1].is_pause());
        assert_eq!(full[2].to_bytes()[3], 0x03);
    }

    #[test]
    fn test_parse_outcomes() {
        let tx = codec(Yamaha4OpModel::Tx81z);
        let frames = tx.voice_frames(&voice(&tx));
        assert_eq!(tx.parse(&frames[2]).0, ParseOutcome::Incomplete);
        assert_eq!(tx.parse(&[0xF0, 0x41, 0xF7]).0, ParseOutcome::Failed);
        assert!(tx.recognize(&frames[3]));
        assert!(!tx.recognize(&[0xF0, 0x43, 0x00, 0x03, 0xF7]));
    }

    #[test]
    fn test_bank_codec() {
        let v50 = codec(Yamaha4OpModel::V50);
        let voices = vec![voice(&v50), v50.init_patch()];
        let bank = v50.as_bank().unwrap();
        let data = bank.emit_bank(&voices);
        assert!(bank.recognize_bank(&data));
        assert_eq!(data[2], 1);
        let names = bank.bank_patch_names(&data);
        assert_eq!(names.len(), 32);
        assert_eq!(names[0], "BRASS 2");
        assert_eq!(names[5], "INIT VOICE");
        let p = bank.parse_from_bank(&data, 0).unwrap();
        assert_eq!(p.get("operator2outputlevel"), Some(77));
        assert_eq!(p.get("operator4vkeyvelocitysensitivitysign"), Some(1));
        assert!(bank.parse_from_bank(&data, 40).is_err());
        assert_eq!(bank.request_bank(0)[0].to_bytes(), vec![0xF0, 0x43, 0x21, 0x04, 0xF7]);

        let (outcome, first) = v50.parse(&data);
        assert_eq!(outcome, ParseOutcome::Succeeded);
        assert_eq!(first.name(), "BRASS 2");
    }

    #[test]
    fn test_display() {
        let dx = codec(Yamaha4OpModel::Dx21);
        assert_eq!(dx.display("algorithm", 0), "1");
        assert_eq!(dx.display("operator1detune", 0), "-3");
        assert_eq!(dx.display("lfowave", 3), "Sample & Hold");
        assert_eq!(dx.display("veffectsel", 0), "Off");
        assert_eq!(dx.display("operator1outputlevel", 55), "55");
    }

    #[test]
    fn test_model_lookup() {
        for m in Yamaha4OpModel::ALL {
            assert_eq!(Yamaha4OpModel::from_id(m.descriptor().id), Some(m));
        }
        assert_eq!(Yamaha4OpModel::from_id("dx7"), None);
    }
}
