//! The codec contract every device implements.
//!
//! A codec turns a [`ParameterModel`] into outgoing [`Message`]s and incoming
//! SysEx bytes back into a [`Patch`]. It never talks to a MIDI port: callers
//! hand the messages to a transport and honor the [`Timing`] the codec
//! reports.
//!
//! ```rust,ignore
//! let codec = registry.create("venom", &DeviceSettings::default())?;
//! let (outcome, patch) = codec.parse(&bytes);
//! if outcome.is_success() {
//!     for msg in codec.emit(&patch, Destination::WorkingMemory) {
//!         transport.send(&msg.to_bytes())?;
//!     }
//! }
//! ```

#[cfg(not(feature = "std"))]
use alloc::{format, string::String, vec, vec::Vec};
use core::time::Duration;

use crate::device::{DeviceDescriptor, DeviceSettings};
use crate::error::CodecError;
use crate::model::{ParameterModel, Patch, PatchLocation};
use crate::param_table::RangeMap;

/// Result of parsing incoming data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseOutcome {
    /// A complete patch was decoded.
    Succeeded,
    /// Some frames matched but a required one never arrived.
    Incomplete,
    /// Nothing in the data belonged to this device.
    Failed,
}

impl ParseOutcome {
    /// True for [`ParseOutcome::Succeeded`].
    pub fn is_success(&self) -> bool {
        matches!(self, ParseOutcome::Succeeded)
    }
}

/// Where emitted patch data should land.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    /// The device's edit buffer.
    WorkingMemory,
    /// A stored patch slot.
    Slot(PatchLocation),
    /// A `.syx` file; no device-side store command is added.
    File,
}

/// One outgoing step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// A complete SysEx frame.
    Sysex(Vec<u8>),
    /// A MIDI program change.
    ProgramChange {
        /// MIDI channel, 0..=15.
        channel: u8,
        /// Program number, 0..=127.
        program: u8,
    },
    /// Wait before sending the next message.
    Pause(Duration),
}

impl Message {
    /// Program change with channel and program masked to legal ranges.
    pub fn program_change(channel: u8, program: u8) -> Self {
        Message::ProgramChange {
            channel: channel & 0x0F,
            program: program & 0x7F,
        }
    }

    /// Wire bytes. Pauses have none.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Message::Sysex(bytes) => bytes.clone(),
            Message::ProgramChange { channel, program } => vec![0xC0 | channel, *program],
            Message::Pause(_) => Vec::new(),
        }
    }

    /// The frame of a [`Message::Sysex`].
    pub fn as_sysex(&self) -> Option<&[u8]> {
        match self {
            Message::Sysex(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// True for [`Message::Pause`].
    pub fn is_pause(&self) -> bool {
        matches!(self, Message::Pause(_))
    }
}

/// Concatenated SysEx frames of `messages`, pauses and program changes
/// dropped. This is the `.syx` file form.
pub fn sysex_bytes(messages: &[Message]) -> Vec<u8> {
    messages
        .iter()
        .filter_map(Message::as_sysex)
        .flatten()
        .copied()
        .collect()
}

/// Pauses a device needs between operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Timing {
    /// After each single-parameter change.
    pub after_parameter: Duration,
    /// After a full patch send.
    pub after_send_all: Duration,
    /// After a patch change.
    pub after_change_patch: Duration,
}

impl Timing {
    /// Timing from millisecond values.
    pub const fn from_millis(after_parameter: u64, after_send_all: u64, after_change_patch: u64) -> Self {
        Self {
            after_parameter: Duration::from_millis(after_parameter),
            after_send_all: Duration::from_millis(after_send_all),
            after_change_patch: Duration::from_millis(after_change_patch),
        }
    }

    /// Every pause multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        let factor = factor.max(0.0);
        Self {
            after_parameter: self.after_parameter.mul_f64(factor),
            after_send_all: self.after_send_all.mul_f64(factor),
            after_change_patch: self.after_change_patch.mul_f64(factor),
        }
    }
}

/// Cleans a patch name for a device: at most `max_len` characters,
/// characters outside 32..=127 replaced with spaces, surrounding whitespace
/// trimmed.
pub fn sanitize_name(name: &str, max_len: usize) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .take(max_len)
        .map(|c| if (' '..='\u{7F}').contains(&c) { c } else { ' ' })
        .collect();
    String::from(cleaned.trim())
}

/// Name padded with spaces (or cut) to exactly `len` ASCII bytes.
pub fn padded_name_bytes(name: &str, len: usize) -> Vec<u8> {
    let mut bytes: Vec<u8> = name
        .chars()
        .map(|c| if c.is_ascii() { c as u8 } else { b' ' })
        .take(len)
        .collect();
    bytes.resize(len, b' ');
    bytes
}

/// Decodes a fixed-width ASCII name field, trimming trailing spaces.
pub fn name_from_bytes(bytes: &[u8]) -> String {
    let s: String = bytes.iter().map(|&b| char::from(b & 0x7F)).collect();
    String::from(s.trim_end())
}

/// Clamps ranged values and sanitizes the name. Codecs with cross-field
/// rules call this first.
pub fn revise_standard(
    model: &mut dyn ParameterModel,
    ranges: &RangeMap,
    descriptor: &DeviceDescriptor,
) {
    ranges.clamp(model);
    let cleaned = sanitize_name(model.name(), descriptor.name_len);
    if cleaned != model.name() {
        model.set_name(&cleaned);
    }
}

/// Bidirectional SysEx codec for one device.
///
/// Object safe; the registry hands codecs out as `Box<dyn SysexCodec>`.
pub trait SysexCodec {
    /// Static description of the device.
    fn descriptor(&self) -> &DeviceDescriptor;

    /// Channel and device id the codec addresses.
    fn settings(&self) -> &DeviceSettings;

    /// True when `data` is a single-patch dump this codec parses.
    fn recognize(&self, data: &[u8]) -> bool;

    /// Decodes one patch from `data`, which may hold several frames.
    fn parse(&self, data: &[u8]) -> (ParseOutcome, Patch);

    /// Messages that send the whole patch to `destination`.
    fn emit(&self, model: &dyn ParameterModel, destination: Destination) -> Vec<Message>;

    /// Messages that send one parameter. Empty when the key has no
    /// single-parameter form.
    fn emit_parameter(&self, model: &dyn ParameterModel, key: &str) -> Vec<Message>;

    /// Messages that select the patch at `location`.
    fn change_patch(&self, location: PatchLocation) -> Vec<Message>;

    /// Messages that ask the device for the patch at `location`.
    fn request_dump(&self, location: PatchLocation) -> Vec<Message>;

    /// Messages that ask for the edit buffer.
    fn request_current_dump(&self) -> Vec<Message>;

    /// Messages to send after a dump arrives from the device.
    fn acknowledge_receipt(&self) -> Vec<Message> {
        Vec::new()
    }

    /// Pauses between operations.
    fn timing(&self) -> Timing;

    /// Value ranges for every parameter.
    fn ranges(&self) -> &RangeMap;

    /// Brings every parameter into range and fixes the name.
    fn revise(&self, model: &mut dyn ParameterModel) {
        revise_standard(model, self.ranges(), self.descriptor());
    }

    /// Human-readable value.
    fn display(&self, key: &str, value: i32) -> String {
        let _ = key;
        format!("{value}")
    }

    /// A patch with every ranged parameter at its minimum.
    fn init_patch(&self) -> Patch {
        let mut patch = Patch::new(self.descriptor().default_name);
        for r in self.ranges().iter() {
            patch.set(r.key, r.min);
        }
        patch
    }

    /// Rewrites stored dumps so the device writes them to `bank`.
    ///
    /// `None` when the device has no such operation or the data is not
    /// recognized.
    fn prepare_bulk_write(&self, data: &[u8], bank: u8, name: Option<&str>) -> Option<Vec<Message>> {
        let _ = (data, bank, name);
        None
    }

    /// Bank dump support, if the device has a bank format.
    fn as_bank(&self) -> Option<&dyn BankCodec> {
        None
    }
}

/// Whole-bank dumps.
pub trait BankCodec {
    /// True when `data` is a bank dump.
    fn recognize_bank(&self, data: &[u8]) -> bool;

    /// Names of every patch in the bank.
    fn bank_patch_names(&self, data: &[u8]) -> Vec<String>;

    /// Decodes record `index`.
    fn parse_from_bank(&self, data: &[u8], index: usize) -> Result<Patch, CodecError>;

    /// Builds a bank dump. Missing records are filled with init patches.
    fn emit_bank(&self, patches: &[Patch]) -> Vec<u8>;

    /// Messages that ask for bank `bank`.
    fn request_bank(&self, bank: u8) -> Vec<Message>;

    /// Records per bank dump.
    fn patches_per_bank(&self) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn program_change_bytes() {
        let msg = Message::program_change(0x13, 0x85);
        assert_eq!(msg.to_bytes(), vec![0xC3, 0x05]);
        assert!(Message::Pause(Duration::from_millis(5)).to_bytes().is_empty());
    }

    #[test]
    fn sysex_bytes_skips_non_sysex() {
        let msgs = vec![
            Message::Sysex(vec![0xF0, 1, 0xF7]),
            Message::Pause(Duration::from_millis(10)),
            Message::program_change(0, 1),
            Message::Sysex(vec![0xF0, 2, 0xF7]),
        ];
        assert_eq!(sysex_bytes(&msgs), vec![0xF0, 1, 0xF7, 0xF0, 2, 0xF7]);
    }

    #[test]
    fn sanitize_truncates_and_replaces() {
        assert_eq!(sanitize_name("Brass\u{7}Lead Extra", 10), "Brass Lead");
        assert_eq!(sanitize_name("  pad  ", 10), "pad");
        assert_eq!(sanitize_name("Ünïcode", 7), "n code");
    }

    #[test]
    fn padded_name_and_back() {
        let bytes = padded_name_bytes("PAD", 7);
        assert_eq!(bytes, b"PAD    ");
        assert_eq!(name_from_bytes(&bytes), "PAD");
        assert_eq!(padded_name_bytes("TOOLONGNAME", 4), b"TOOL");
    }

    #[test]
    fn timing_scales() {
        let t = Timing::from_millis(50, 50, 100).scaled(2.0);
        assert_eq!(t.after_change_patch, Duration::from_millis(200));
        assert_eq!(Timing::from_millis(10, 10, 10).scaled(-1.0), Timing::default());
    }
}
