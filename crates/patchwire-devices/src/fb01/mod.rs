//! Yamaha FB-01 voice codec.
//!
//! Every data byte the FB-01 exchanges, single parameters included, is split
//! into two low-first nibbles. A voice is one 139-byte frame:
//!
//! ```text
//! F0 43 75 id 08 00 00 01 00 <128 nibbles> cs F7
//! ```
//!
//! `id` is the "system channel" minus one. Writing to a RAM slot means
//! sending the voice to instrument 1 and then asking the device to store
//! it.

pub mod bank;
pub mod voice;

use std::time::Duration;

use patchwire_core::{
    BankCodec, CodecError, DeviceDescriptor, DeviceFamily, DeviceSettings, Destination,
    FrameBuilder, Message, ParameterModel, ParseOutcome, Patch, PatchLocation, Quirk, RangeMap,
    SysexCodec, Timing, name_from_list, nibble, padded_name_bytes, split_frames,
};
use tracing::{debug, warn};

const HEADER: [u8; 3] = [0xF0, 0x43, 0x75];

/// Voice frame length.
pub const VOICE_FRAME_LEN: usize = 9 + 2 * voice::VOICE_LEN + 2;

const VOICE_DATA_OFFSET: usize = 9;

/// Bank display names.
pub const BANKS: [&str; 7] =
    ["1 (A)", "2 (B)", "3 (ROM 1)", "4 (ROM 2)", "5 (ROM 3)", "6 (ROM 4)", "7 (ROM 5)"];

/// Name written into bank dumps built from patches.
pub const DEFAULT_BANK_NAME: &str = "PATCHWR";

/// Pause the FB-01 needs between packets of a bank write.
pub const PACKET_PAUSE: Duration = Duration::from_millis(120);

/// FB-01.
pub static DESCRIPTOR: DeviceDescriptor = DeviceDescriptor {
    id: "fb01",
    name: "Yamaha FB-01",
    family: DeviceFamily::Fb01,
    manufacturer: &[0x43],
    banks: &BANKS,
    writable_banks: &[0, 1],
    patches_per_bank: 48,
    name_len: voice::NAME_LEN,
    default_name: "INIT",
    default_device_id: 1,
    quirks: &[Quirk::NibbleData, Quirk::ZeroBasedDeviceId],
};

/// Codec for the FB-01.
#[derive(Debug, Clone)]
pub struct Fb01 {
    settings: DeviceSettings,
}

impl Fb01 {
    /// Codec addressing the device with `settings`. The device id is the
    /// FB-01's system channel, 1..=16.
    pub fn new(settings: DeviceSettings) -> Self {
        Self { settings }
    }

    /// Device byte on the wire.
    fn wire_id(&self) -> u8 {
        let id = self.settings.device_id_or(&DESCRIPTOR);
        if (1..=16).contains(&id) {
            id - 1
        } else {
            warn!(id, "FB-01 device id must be 1..=16, using 1");
            0
        }
    }

    fn command(&self, body: &[u8]) -> Vec<u8> {
        FrameBuilder::new(&HEADER).push(self.wire_id()).extend(body).finish()
    }

    /// Parameter change for instrument 1, value split into nibbles.
    fn parameter(&self, param: u8, value: u8) -> Message {
        Message::Sysex(self.command(&[0x18, param, value & 0x0F, (value >> 4) & 0x0F]))
    }

    /// One-voice bulk dump of `model` to instrument 1.
    pub fn voice_frame(&self, model: &dyn ParameterModel) -> Vec<u8> {
        let nibbles = nibble::nibblize_low_first(&voice::encode(model));
        FrameBuilder::new(&HEADER)
            .extend(&[self.wire_id(), 0x08, 0x00, 0x00, 0x01, 0x00])
            .checksum_from_here()
            .extend(&nibbles)
            .finish()
    }

    fn is_voice_frame(frame: &[u8]) -> bool {
        frame.len() == VOICE_FRAME_LEN
            && frame[..3] == HEADER
            && frame[4] & 0xF8 == 0x08
            && frame[5..9] == [0x00, 0x00, 0x01, 0x00]
            && frame[VOICE_FRAME_LEN - 1] == 0xF7
    }

    fn decode_voice_frame(frame: &[u8]) -> Patch {
        let nibbles = &frame[VOICE_DATA_OFFSET..VOICE_DATA_OFFSET + 2 * voice::VOICE_LEN];
        voice::decode(&nibble::denibblize_low_first(nibbles))
    }

    /// Store the voice in instrument 1 into RAM slot `location`. Only the
    /// two RAM banks take writes.
    fn store(&self, location: PatchLocation) -> Message {
        let mut bank = location.bank;
        if !DESCRIPTOR.is_writable(bank) {
            warn!(bank, "FB-01 bank is read-only, storing to bank 0");
            bank = 0;
        }
        let number = location.number % DESCRIPTOR.patches_per_bank;
        Message::Sysex(self.command(&[0x28, 0x40, number + bank * DESCRIPTOR.patches_per_bank]))
    }
}

impl Default for Fb01 {
    fn default() -> Self {
        Self::new(DeviceSettings::default())
    }
}

impl SysexCodec for Fb01 {
    fn descriptor(&self) -> &DeviceDescriptor {
        &DESCRIPTOR
    }

    fn settings(&self) -> &DeviceSettings {
        &self.settings
    }

    fn recognize(&self, data: &[u8]) -> bool {
        Self::is_voice_frame(data) || bank::is_bank(data)
    }

    fn parse(&self, data: &[u8]) -> (ParseOutcome, Patch) {
        for frame in split_frames(data) {
            if bank::is_bank(frame) {
                debug!("parsing first voice of an FB-01 bank");
                return match bank::decode_voice(frame, 0) {
                    Ok(mut patch) => {
                        self.revise(&mut patch);
                        (ParseOutcome::Succeeded, patch)
                    }
                    Err(e) => {
                        warn!(%e, "unreadable FB-01 bank");
                        (ParseOutcome::Failed, self.init_patch())
                    }
                };
            }
            if Self::is_voice_frame(frame) {
                let mut patch = Self::decode_voice_frame(frame);
                self.revise(&mut patch);
                return (ParseOutcome::Succeeded, patch);
            }
        }
        (ParseOutcome::Failed, self.init_patch())
    }

    fn emit(&self, model: &dyn ParameterModel, destination: Destination) -> Vec<Message> {
        let mut messages = vec![Message::Sysex(self.voice_frame(model))];
        if let Destination::Slot(location) = destination {
            messages.push(self.store(location));
        }
        messages
    }

    fn emit_parameter(&self, model: &dyn ParameterModel, key: &str) -> Vec<Message> {
        if matches!(key, "bank" | "number") {
            return Vec::new();
        }
        if key == "name" {
            return padded_name_bytes(model.name(), voice::NAME_LEN)
                .into_iter()
                .enumerate()
                .map(|(i, c)| self.parameter(voice::PARAM_BASE + i as u8, c))
                .collect();
        }
        let offsets = voice::offsets_of(key);
        if offsets.is_empty() {
            warn!(key, "FB-01 voice has no parameter for key");
            return Vec::new();
        }
        let data = voice::encode(model);
        offsets
            .into_iter()
            .map(|offset| self.parameter(voice::PARAM_BASE + offset as u8, data[offset]))
            .collect()
    }

    /// Sets instrument 1's bank, then its voice number.
    fn change_patch(&self, location: PatchLocation) -> Vec<Message> {
        let PatchLocation { mut bank, mut number } = location;
        if bank >= DESCRIPTOR.bank_count() {
            warn!(bank, "FB-01 bank is invalid, using bank 0");
            bank = 0;
        }
        if number >= DESCRIPTOR.patches_per_bank {
            warn!(number, "FB-01 voice number is invalid, wrapping");
            number %= DESCRIPTOR.patches_per_bank;
        }
        vec![
            Message::Sysex(self.command(&[0x18, 0x04, bank])),
            Message::Pause(self.timing().after_change_patch),
            Message::Sysex(self.command(&[0x18, 0x05, number])),
        ]
    }

    /// The FB-01 can only dump instrument 1's current voice, so the patch
    /// is always changed first.
    fn request_dump(&self, location: PatchLocation) -> Vec<Message> {
        let mut messages = self.change_patch(location);
        messages.push(Message::Pause(self.timing().after_change_patch));
        messages.extend(self.request_current_dump());
        messages
    }

    fn request_current_dump(&self) -> Vec<Message> {
        vec![Message::Sysex(self.command(&[0x28, 0x00, 0x00]))]
    }

    fn timing(&self) -> Timing {
        Timing::from_millis(0, 0, 150)
    }

    fn ranges(&self) -> &RangeMap {
        voice::ranges()
    }

    fn display(&self, key: &str, value: i32) -> String {
        match key {
            "algorithm" => (value + 1).to_string(),
            k if k.ends_with("detune") => (value - 3).to_string(),
            k if k.ends_with("frequency") && value == 0 => String::from("0.5"),
            k => match voice::display_list(k) {
                Some(list) => name_from_list(list, value),
                None => value.to_string(),
            },
        }
    }

    fn init_patch(&self) -> Patch {
        let mut patch = Patch::new(DESCRIPTOR.default_name);
        for r in self.ranges().iter() {
            patch.set(r.key, r.min.max(0));
        }
        for op in 1..=4 {
            patch.set(&format!("op{op}enable"), 1);
            patch.set(&format!("op{op}frequency"), 1);
            patch.set(&format!("op{op}attackrate"), 31);
            patch.set(&format!("op{op}releaserate"), 15);
            patch.set(&format!("op{op}level"), if op == 1 { 0 } else { 127 });
        }
        patch.set("op1carrieram", 1);
        patch.set("leftoutputenable", 1);
        patch.set("rightoutputenable", 1);
        patch.set("pitchbendrange", 2);
        patch
    }

    /// Converts a bank dump to the bank X form addressed to `bank` (0 or
    /// 1), optionally renaming it, and splits it into packets separated by
    /// [`PACKET_PAUSE`].
    fn prepare_bulk_write(&self, data: &[u8], bank: u8, name: Option<&str>) -> Option<Vec<Message>> {
        if !DESCRIPTOR.is_writable(bank) {
            warn!(bank, "FB-01 bank is read-only");
            return None;
        }
        let frame = split_frames(data).find(|f| bank::is_bank(f))?;
        let retargeted = bank::retarget(frame, self.wire_id(), bank, name)?;
        let mut messages = Vec::new();
        for packet in bank::packets(&retargeted) {
            if !messages.is_empty() {
                messages.push(Message::Pause(PACKET_PAUSE));
            }
            messages.push(Message::Sysex(packet));
        }
        Some(messages)
    }

    fn as_bank(&self) -> Option<&dyn BankCodec> {
        Some(self)
    }
}

impl BankCodec for Fb01 {
    fn recognize_bank(&self, data: &[u8]) -> bool {
        bank::is_bank(data)
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
        bank::encode_bank(patches, &self.init_patch(), self.wire_id(), 0, DEFAULT_BANK_NAME)
    }

    fn request_bank(&self, bank: u8) -> Vec<Message> {
        let bank = if bank < DESCRIPTOR.bank_count() {
            bank
        } else {
            warn!(bank, "FB-01 bank is invalid, requesting bank 0");
            0
        };
        vec![Message::Sysex(self.command(&[0x20, 0x00, bank]))]
    }

    fn patches_per_bank(&self) -> usize {
        bank::VOICES
    }
}
