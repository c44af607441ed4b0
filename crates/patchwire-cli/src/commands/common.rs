//! Shared CLI helpers used across multiple commands.

use anyhow::{Context, anyhow};
use clap::Args;
use patchwire_config::{Config, PatchFile, factory_patch, paths::find_patch_in};
use patchwire_core::{DeviceFamily, DeviceSettings, Message, SysexCodec, checksum};
use patchwire_registry::DeviceRegistry;
use std::path::Path;
use tracing::warn;

/// A codec built from the registry.
pub type Codec = Box<dyn SysexCodec + Send + Sync>;

/// Device selection shared by commands that talk to one device.
#[derive(Args, Debug, Clone, Default)]
pub struct DeviceOpts {
    /// Device id (see `patchwire devices`); defaults to the configured device
    #[arg(short, long)]
    pub device: Option<String>,

    /// MIDI channel, 0-15; defaults to the configured channel
    #[arg(short, long)]
    pub channel: Option<u8>,

    /// Device id byte sent in SysEx headers
    #[arg(long)]
    pub device_id: Option<u8>,
}

impl DeviceOpts {
    /// Builds the codec. The device comes from `--device`, then `fallback`,
    /// then the configuration file.
    pub fn codec(&self, fallback: Option<&str>) -> anyhow::Result<Codec> {
        let config = load_config()?;
        let id = self
            .device
            .as_deref()
            .or(fallback)
            .unwrap_or(config.device.as_str());
        let settings = DeviceSettings {
            channel: self.channel.unwrap_or(config.channel) & 0x0F,
            device_id: self.device_id.or(config.device_id),
        };
        DeviceRegistry::new().create(id, &settings).ok_or_else(|| {
            anyhow!("Unknown device '{id}'. Use 'patchwire devices' to see supported devices.")
        })
    }
}

/// The user configuration, or defaults when there is none.
pub fn load_config() -> anyhow::Result<Config> {
    Config::load_user().context("failed to load configuration")
}

/// Load a patch file by factory name, path, or name in the patch directory.
pub fn load_patch_file(name: &str) -> anyhow::Result<PatchFile> {
    if let Some(file) = factory_patch(name) {
        return Ok(file);
    }

    let patches_dir = load_config()?.patches_dir();
    if let Some(path) = find_patch_in(name, &patches_dir) {
        return PatchFile::load(&path).with_context(|| format!("reading {}", path.display()));
    }

    anyhow::bail!("Patch '{}' not found. Pass a path to a .toml patch file.", name)
}

/// SysEx frames of `messages`. Program changes and pauses cannot be stored
/// in a `.syx` file and are dropped with a warning.
pub fn sysex_frames(messages: &[Message]) -> Vec<Vec<u8>> {
    let dropped = messages
        .iter()
        .filter(|m| matches!(m, Message::ProgramChange { .. }))
        .count();
    if dropped > 0 {
        warn!(dropped, "program changes are not stored in .syx files");
    }
    messages
        .iter()
        .filter_map(Message::as_sysex)
        .map(<[u8]>::to_vec)
        .collect()
}

/// Write frames to `path`.
pub fn write_frames(path: &Path, frames: &[Vec<u8>]) -> anyhow::Result<()> {
    patchwire_io::write_syx(path, frames).with_context(|| format!("writing {}", path.display()))
}

/// Parse hex bytes. Accepts `F0 43 10`, `f04310`, `0xF0,0x43` and mixes.
pub fn parse_hex(input: &str) -> anyhow::Result<Vec<u8>> {
    let digits: String = input
        .split(|c: char| c.is_whitespace() || c == ',' || c == ':')
        .map(|tok| {
            tok.strip_prefix("0x")
                .or_else(|| tok.strip_prefix("0X"))
                .unwrap_or(tok)
        })
        .collect();
    if digits.len() % 2 != 0 {
        anyhow::bail!("odd number of hex digits in '{}'", input);
    }
    (0..digits.len())
        .step_by(2)
        .map(|i| {
            let pair = digits.get(i..i + 2).unwrap_or_default();
            u8::from_str_radix(pair, 16).map_err(|_| anyhow!("invalid hex byte '{pair}'"))
        })
        .collect()
}

/// Uppercase hex, space separated.
pub fn to_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether the frame's checksum verifies, for families with one checksum
/// per frame. `None` when the layout has no single checksum.
pub fn checksum_ok(family: DeviceFamily, frame: &[u8]) -> Option<bool> {
    let start = match family {
        // performance banks leave the tag out of the checksum
        DeviceFamily::Yamaha4Op if frame.len() == 2450 => 16,
        DeviceFamily::Venom | DeviceFamily::Yamaha4Op => 6,
        // bank dumps carry one checksum per record
        DeviceFamily::Fb01 if frame.len() == 139 => 9,
        DeviceFamily::Fb01 => return None,
    };
    let body = frame.get(start..frame.len().checked_sub(1)?)?;
    Some(checksum::verify(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_forms() {
        assert_eq!(parse_hex("F0 43 10").unwrap(), vec![0xF0, 0x43, 0x10]);
        assert_eq!(parse_hex("f04310").unwrap(), vec![0xF0, 0x43, 0x10]);
        assert_eq!(parse_hex("0xF0,0x43, 0x10").unwrap(), vec![0xF0, 0x43, 0x10]);
        assert_eq!(parse_hex("").unwrap(), Vec::<u8>::new());
        assert!(parse_hex("F0 4").is_err());
        assert!(parse_hex("ZZ").is_err());
    }

    #[test]
    fn test_to_hex() {
        assert_eq!(to_hex(&[0xF0, 0x01, 0x7F]), "F0 01 7F");
        assert_eq!(to_hex(&[]), "");
    }

    #[test]
    fn test_checksum_ok() {
        let mut frame = vec![0xF0, 0x43, 0x00, 0x03, 0x00, 0x02, 0x10, 0x20];
        frame.push(checksum::checksum(&[0x10, 0x20]));
        frame.push(0xF7);
        assert_eq!(checksum_ok(DeviceFamily::Yamaha4Op, &frame), Some(true));
        frame[6] = 0x11;
        assert_eq!(checksum_ok(DeviceFamily::Yamaha4Op, &frame), Some(false));
        assert_eq!(checksum_ok(DeviceFamily::Fb01, &frame), None);
    }

    #[test]
    fn test_checksum_ok_performance_bank() {
        let mut frame = vec![0u8; 2450];
        frame[..6].copy_from_slice(&[0xF0, 0x43, 0x00, 0x7E, 0x13, 0x0A]);
        frame[6..16].copy_from_slice(b"LM  8976PM");
        frame[16] = 0x05;
        frame[2448] = checksum::checksum(&frame[16..2448]);
        frame[2449] = 0xF7;
        assert_eq!(checksum_ok(DeviceFamily::Yamaha4Op, &frame), Some(true));
    }
}
