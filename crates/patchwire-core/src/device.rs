//! Device identity: descriptors, families, quirks, and per-connection
//! settings.
//!
//! A [`DeviceDescriptor`] is plain data. One codec type can serve several
//! descriptors (the six Yamaha 4-op models share one) and consults the
//! descriptor's [`Quirk`] list wherever models differ.

/// Device family: one manufacturer protocol. A family may have a codec per
/// dump kind (single, multi, bank, global).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceFamily {
    /// M-Audio Venom.
    Venom,
    /// Yamaha 4-operator FM synthesizers (DX21 through V50).
    Yamaha4Op,
    /// Yamaha FB-01 sound module.
    Fb01,
}

impl DeviceFamily {
    /// Short identifier.
    pub const fn name(&self) -> &'static str {
        match self {
            DeviceFamily::Venom => "venom",
            DeviceFamily::Yamaha4Op => "yamaha4op",
            DeviceFamily::Fb01 => "fb01",
        }
    }

    /// One-line description.
    pub const fn description(&self) -> &'static str {
        match self {
            DeviceFamily::Venom => "M-Audio Venom virtual-analog synthesizer",
            DeviceFamily::Yamaha4Op => "Yamaha 4-operator FM: DX21, DX27/DX100, TX81Z, DX11, TQ5, V50",
            DeviceFamily::Fb01 => "Yamaha FB-01 FM sound module",
        }
    }

    /// Parses [`name`](Self::name).
    pub fn from_name(name: &str) -> Option<Self> {
        [Self::Venom, Self::Yamaha4Op, Self::Fb01]
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(name))
    }
}

/// A hardware behavior that a codec must compensate for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quirk {
    /// Oscillator flag byte bit 6 is always set; meaning unknown.
    AlwaysSetFlagBit,
    /// Booleans travel as 0/127 rather than 0/1.
    WideBooleans,
    /// Mod destinations above 17 are offset by 46 on the wire.
    ShiftedModDestinations,
    /// Stored-patch dumps repeat the osc 2 waveform byte.
    RepeatedWaveformByte,
    /// Stored-patch dumps send arp octave as a signed offset, sometimes
    /// corrupted.
    SignedArpOctave,
    /// Fine frequency must stay below 8 while coarse frequency is below 4.
    FineFrequencyClamp,
    /// Level-scaling and velocity sign bits are honored.
    SignedSensitivity,
    /// Effects travel in an ACED3 frame instead of EFEDS.
    Aced3Effects,
    /// Voice data is split into low-first nibbles.
    NibbleData,
    /// Device id on the wire is one less than the displayed id.
    ZeroBasedDeviceId,
}

impl Quirk {
    /// One-line description.
    pub const fn description(&self) -> &'static str {
        match self {
            Quirk::AlwaysSetFlagBit => "oscillator flags bit 6 always set, ignored on read",
            Quirk::WideBooleans => "booleans sent as 0/127",
            Quirk::ShiftedModDestinations => "mod destinations >= 18 shifted by 46",
            Quirk::RepeatedWaveformByte => "stored dumps repeat the osc 2 waveform byte",
            Quirk::SignedArpOctave => "stored dumps send arp octave as a signed offset",
            Quirk::FineFrequencyClamp => "fine frequency <= 7 when coarse frequency < 4",
            Quirk::SignedSensitivity => "velocity and level scaling sign bits",
            Quirk::Aced3Effects => "effects in ACED3 rather than EFEDS",
            Quirk::NibbleData => "voice data sent as low-first nibbles",
            Quirk::ZeroBasedDeviceId => "wire device id is displayed id minus one",
        }
    }
}

/// Static description of one device model.
#[derive(Debug, Clone, Copy)]
pub struct DeviceDescriptor {
    /// Unique identifier (lowercase, no spaces).
    pub id: &'static str,
    /// Human-readable name.
    pub name: &'static str,
    /// Family, which selects the codec.
    pub family: DeviceFamily,
    /// Manufacturer id bytes following `0xF0`.
    pub manufacturer: &'static [u8],
    /// Bank display names.
    pub banks: &'static [&'static str],
    /// Indices of banks that accept writes.
    pub writable_banks: &'static [u8],
    /// Patches per bank.
    pub patches_per_bank: u8,
    /// Maximum patch name length.
    pub name_len: usize,
    /// Name of an initialized patch.
    pub default_name: &'static str,
    /// Device id used when the settings do not give one.
    pub default_device_id: u8,
    /// Hardware behaviors the codec compensates for.
    pub quirks: &'static [Quirk],
}

impl DeviceDescriptor {
    /// True when the device has `quirk`.
    pub fn has(&self, quirk: Quirk) -> bool {
        self.quirks.contains(&quirk)
    }

    /// Number of banks.
    pub fn bank_count(&self) -> u8 {
        self.banks.len() as u8
    }

    /// True when bank `bank` accepts writes.
    pub fn is_writable(&self, bank: u8) -> bool {
        self.writable_banks.contains(&bank)
    }
}

/// Per-connection settings a codec is built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeviceSettings {
    /// MIDI channel, 0..=15.
    pub channel: u8,
    /// Device id override.
    pub device_id: Option<u8>,
}

impl DeviceSettings {
    /// Settings for `channel` with the device's default id.
    pub const fn on_channel(channel: u8) -> Self {
        Self {
            channel: channel & 0x0F,
            device_id: None,
        }
    }

    /// Builder: sets the device id.
    pub const fn with_device_id(mut self, id: u8) -> Self {
        self.device_id = Some(id);
        self
    }

    /// Device id, falling back to the descriptor's default.
    pub fn device_id_or(&self, descriptor: &DeviceDescriptor) -> u8 {
        self.device_id.unwrap_or(descriptor.default_device_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST: DeviceDescriptor = DeviceDescriptor {
        id: "test",
        name: "Test",
        family: DeviceFamily::Fb01,
        manufacturer: &[0x43],
        banks: &["A", "B", "ROM"],
        writable_banks: &[0, 1],
        patches_per_bank: 48,
        name_len: 7,
        default_name: "INIT",
        default_device_id: 1,
        quirks: &[Quirk::NibbleData],
    };

    #[test]
    fn descriptor_queries() {
        assert!(TEST.has(Quirk::NibbleData));
        assert!(!TEST.has(Quirk::WideBooleans));
        assert_eq!(TEST.bank_count(), 3);
        assert!(TEST.is_writable(1));
        assert!(!TEST.is_writable(2));
    }

    #[test]
    fn settings_fall_back_to_default_id() {
        let s = DeviceSettings::on_channel(18);
        assert_eq!(s.channel, 2);
        assert_eq!(s.device_id_or(&TEST), 1);
        assert_eq!(s.with_device_id(5).device_id_or(&TEST), 5);
    }

    #[test]
    fn family_names_round_trip() {
        for f in [DeviceFamily::Venom, DeviceFamily::Yamaha4Op, DeviceFamily::Fb01] {
            assert_eq!(DeviceFamily::from_name(f.name()), Some(f));
        }
        assert_eq!(DeviceFamily::from_name("moog"), None);
    }
}
