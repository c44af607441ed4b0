//! Yamaha 4-op frame layouts, value ranges, and display lists.
//!
//! Operator blocks in VCED and ACED run in the order 4, 2, 3, 1.

use std::sync::OnceLock;

use patchwire_core::{ParamRange, ParameterTable, RESERVED, RangeMap};

/// VCED data bytes. Slots 77..87 hold the name.
pub const VCED_SLOTS: [&str; 93] = [
    "operator4attackrate", "operator4decay1rate", "operator4decay2rate", "operator4releaserate",
    "operator4decay1level", "operator4levelscaling", "operator4ratescaling",
    "operator4egbiassensitivity", "operator4amplitudemodulationenable",
    "operator4keyvelocitysensitivity", "operator4outputlevel", "operator4frequencycoarse",
    "operator4detune",
    "operator2attackrate", "operator2decay1rate", "operator2decay2rate", "operator2releaserate",
    "operator2decay1level", "operator2levelscaling", "operator2ratescaling",
    "operator2egbiassensitivity", "operator2amplitudemodulationenable",
    "operator2keyvelocitysensitivity", "operator2outputlevel", "operator2frequencycoarse",
    "operator2detune",
    "operator3attackrate", "operator3decay1rate", "operator3decay2rate", "operator3releaserate",
    "operator3decay1level", "operator3levelscaling", "operator3ratescaling",
    "operator3egbiassensitivity", "operator3amplitudemodulationenable",
    "operator3keyvelocitysensitivity", "operator3outputlevel", "operator3frequencycoarse",
    "operator3detune",
    "operator1attackrate", "operator1decay1rate", "operator1decay2rate", "operator1releaserate",
    "operator1decay1level", "operator1levelscaling", "operator1ratescaling",
    "operator1egbiassensitivity", "operator1amplitudemodulationenable",
    "operator1keyvelocitysensitivity", "operator1outputlevel", "operator1frequencycoarse",
    "operator1detune",
    "algorithm", "feedback", "lfospeed", "lfodelay", "lfopitchmodulationdepth",
    "lfoamplitudemodulationdepth", "lfosync", "lfowave", "lfopitchmodulationsensitivity",
    "lfoamplitudemodulationsensitivity", "transpose",
    "mono", "pitchbendrange", "fulltimeportamentomode", "portamentotime", "footcontrolvolume",
    "sustain", "portamento", "chorus",
    "modulationwheelpitch", "modulationwheelamplitude", "breathcontrolpitch",
    "breathcontrolamplitude", "breathcontrolpitchbias", "breathcontrolenvelopebias",
    RESERVED, RESERVED, RESERVED, RESERVED, RESERVED,
    RESERVED, RESERVED, RESERVED, RESERVED, RESERVED,
    "pitchattackrate", "pitchdecayrate", "pitchreleaserate",
    "pitchattacklevel", "pitchdecaylevel", "pitchreleaselevel",
];

/// VCED offset of the name.
pub const VCED_NAME_OFFSET: usize = 77;

/// Name length.
pub const NAME_LEN: usize = 10;

/// ACED data bytes, after the 10-byte tag.
pub const ACED_SLOTS: [&str; 23] = [
    "operator4fix", "operator4fixedfrequencyrange", "operator4frequencyfine",
    "operator4operatorwaveform", "operator4shift",
    "operator2fix", "operator2fixedfrequencyrange", "operator2frequencyfine",
    "operator2operatorwaveform", "operator2shift",
    "operator3fix", "operator3fixedfrequencyrange", "operator3frequencyfine",
    "operator3operatorwaveform", "operator3shift",
    "operator1fix", "operator1fixedfrequencyrange", "operator1frequencyfine",
    "operator1operatorwaveform", "operator1shift",
    "reverbrate", "footcontrolpitch", "footcontrolamplitude",
];

/// ACED2 data bytes. Slot 8 packs the four level-scaling signs.
pub const ACED2_SLOTS: [&str; 10] = [
    "aftertouchpitch", "aftertouchamplitude", "aftertouchpitchbias", "aftertouchenvelopebias",
    "operator4vshift", "operator2vshift", "operator3vshift", "operator1vshift",
    RESERVED, RESERVED,
];

/// ACED2 slot holding the level-scaling signs, operator 1 in bit 0.
pub const ACED2_SIGN_SLOT: usize = 8;

/// ACED3 data bytes (V50 effects).
pub const ACED3_SLOTS: [&str; 20] = [
    "veffectsel", "veffectbalance", "veffectoutlevel", "veffectstereomix",
    "veffectparam1", "veffectparam2", "veffectparam3",
    RESERVED, RESERVED, RESERVED, RESERVED, RESERVED, RESERVED, RESERVED,
    RESERVED, RESERVED, RESERVED, RESERVED, RESERVED, RESERVED,
];

/// EFEDS data bytes (TQ5 family effects).
pub const EFEDS_SLOTS: [&str; 3] = ["effectpreset", "effecttime", "effectbalance"];

/// Velocity sensitivity sign of operators 1..=4 (V50).
pub const VELOCITY_SIGN_KEYS: [&str; 4] = [
    "operator1vkeyvelocitysensitivitysign",
    "operator2vkeyvelocitysensitivitysign",
    "operator3vkeyvelocitysensitivitysign",
    "operator4vkeyvelocitysensitivitysign",
];

/// Level scaling sign of operators 1..=4 (V50).
pub const LEVEL_SCALING_SIGN_KEYS: [&str; 4] = [
    "operator1vlevelscalingsign",
    "operator2vlevelscalingsign",
    "operator3vlevelscalingsign",
    "operator4vlevelscalingsign",
];

/// Velocity sensitivity key of operators 1..=4.
pub const VELOCITY_KEYS: [&str; 4] = [
    "operator1keyvelocitysensitivity",
    "operator2keyvelocitysensitivity",
    "operator3keyvelocitysensitivity",
    "operator4keyvelocitysensitivity",
];

/// Coarse and fine frequency keys of operators 1..=4.
pub const FREQUENCY_KEYS: [(&str, &str); 4] = [
    ("operator1frequencycoarse", "operator1frequencyfine"),
    ("operator2frequencycoarse", "operator2frequencyfine"),
    ("operator3frequencycoarse", "operator3frequencyfine"),
    ("operator4frequencycoarse", "operator4frequencyfine"),
];

/// Operator number of a key like `operator3detune`.
pub fn operator_of(key: &str) -> Option<usize> {
    let digit = key.strip_prefix("operator")?.chars().next()?.to_digit(10)?;
    (1..=4).contains(&digit).then_some(digit as usize)
}

fn tables() -> &'static [ParameterTable; 5] {
    static TABLES: OnceLock<[ParameterTable; 5]> = OnceLock::new();
    TABLES.get_or_init(|| {
        [
            ParameterTable::new(&VCED_SLOTS),
            ParameterTable::new(&ACED_SLOTS),
            ParameterTable::new(&ACED2_SLOTS),
            ParameterTable::new(&ACED3_SLOTS),
            ParameterTable::new(&EFEDS_SLOTS),
        ]
    })
}

/// VCED layout.
pub fn vced_table() -> &'static ParameterTable {
    &tables()[0]
}

/// ACED layout.
pub fn aced_table() -> &'static ParameterTable {
    &tables()[1]
}

/// ACED2 layout.
pub fn aced2_table() -> &'static ParameterTable {
    &tables()[2]
}

/// ACED3 layout.
pub fn aced3_table() -> &'static ParameterTable {
    &tables()[3]
}

/// EFEDS layout.
pub fn efeds_table() -> &'static ParameterTable {
    &tables()[4]
}

/// Every model key.
pub fn model_keys() -> impl Iterator<Item = &'static str> {
    VCED_SLOTS
        .iter()
        .chain(&ACED_SLOTS)
        .chain(&ACED2_SLOTS)
        .chain(&ACED3_SLOTS)
        .chain(&EFEDS_SLOTS)
        .chain(&VELOCITY_SIGN_KEYS)
        .chain(&LEVEL_SCALING_SIGN_KEYS)
        .copied()
        .filter(|k| *k != RESERVED)
}

/// Range of `key`, by its operator suffix or global name. Unlisted keys are
/// 0..=99.
fn range_of(key: &'static str) -> ParamRange {
    let suffix = match operator_of(key) {
        Some(_) => &key["operatorN".len()..],
        None => key,
    };
    let (min, max) = match suffix {
        "attackrate" | "decay1rate" | "decay2rate" => (0, 31),
        "releaserate" => (1, 15),
        "decay1level" | "frequencyfine" => (0, 15),
        "ratescaling" | "shift" => (0, 3),
        "egbiassensitivity" | "keyvelocitysensitivity" | "fixedfrequencyrange"
        | "operatorwaveform" => (0, 7),
        "frequencycoarse" => (0, 63),
        "detune" => (0, 6),
        "amplitudemodulationenable" | "fix" | "vshift" | "vkeyvelocitysensitivitysign"
        | "vlevelscalingsign" => (0, 1),
        "algorithm" | "feedback" | "reverbrate" | "lfopitchmodulationsensitivity" => (0, 7),
        "lfoamplitudemodulationsensitivity" | "lfowave" => (0, 3),
        "transpose" => (0, 48),
        "pitchbendrange" => (0, 12),
        "lfosync" | "mono" | "fulltimeportamentomode" | "sustain" | "portamento" | "chorus"
        | "veffectstereomix" => (0, 1),
        "effectpreset" => (0, 10),
        "effecttime" | "veffectparam1" => (0, 75),
        "veffectsel" => (0, 32),
        "veffectbalance" | "veffectoutlevel" => (0, 100),
        _ => (0, 99),
    };
    ParamRange::new(key, min, max)
}

/// Value ranges of every model key.
pub fn ranges() -> &'static RangeMap {
    static RANGES: OnceLock<RangeMap> = OnceLock::new();
    RANGES.get_or_init(|| {
        let overrides: Vec<ParamRange> = model_keys().map(range_of).collect();
        RangeMap::new(model_keys(), 0, 99, &overrides)
    })
}

/// Bank names of the DX27/DX100, TX81Z and DX11.
pub const BANKS: [&str; 5] = ["I", "A", "B", "C", "D"];
/// TQ5 family bank names.
pub const TQ5_BANKS: [&str; 3] = ["Preset", "User", "Card"];
/// V50 bank names.
pub const V50_BANKS: [&str; 3] = ["Internal", "Card", "Preset"];

/// Operator waveforms.
pub const WAVES: [&str; 8] = ["W1", "W2", "W3", "W4", "W5", "W6", "W7", "W8"];
/// LFO waveforms.
pub const LFO_WAVES: [&str; 4] = ["Sawtooth", "Square", "Triangle", "Sample & Hold"];
/// EG shifts.
pub const SHIFTS: [&str; 4] = ["96dB", "48dB", "24dB", "12dB"];
/// Fixed frequency ranges.
pub const FIXED_RANGES: [&str; 8] =
    ["255Hz", "510Hz", "1KHz", "2KHz", "4KHz", "8KHz", "16KHz", "32KHz"];

/// TQ5 family effect presets.
pub const EFFECTS: [&str; 11] = [
    "Off", "Reverb - Hall", "Reverb - Room", "Reverb - Plate", "Delay", "Delay - Left/Right",
    "Stereo Echo", "Distortion + Reverb", "Distortion + Echo", "Gated Reverb", "Reverse Gate",
];

/// V50 effects, `Off` first.
pub const V50_EFFECTS: [&str; 33] = [
    "Off", "Reverb Hall", "Reverb Room", "Reverb Plate", "Delay", "Delay L/R", "Stereo Echo",
    "Distortion Reverb", "Distortion Echo", "Gate Reverb", "Reverse Gate", "Early Reflections",
    "Tone Control 1", "Delay and Reverb", "Delay L/R and Reverb", "Distortion Delay", "Church",
    "Club", "Stage", "Bath Room", "Metal", "Tunnel", "Doubler 1", "Doubler 2", "Feed Back Gate",
    "Feed Back Reverse", "Feed Back E/R", "Delay and Tone Control 1",
    "Delay L/R and Tone Control 1", "Tone Control 2", "Delay and Tone Control 2",
    "Delay L/R and Tone Control 2", "Distortion",
];

/// Display list for `key`.
pub fn display_list(key: &str) -> Option<&'static [&'static str]> {
    let list: &'static [&'static str] = match key {
        "lfowave" => &LFO_WAVES,
        "effectpreset" => &EFFECTS,
        "veffectsel" => &V50_EFFECTS,
        k if k.ends_with("operatorwaveform") => &WAVES,
        k if k.ends_with("fixedfrequencyrange") => &FIXED_RANGES,
        k if operator_of(k).is_some() && k.ends_with("shift") && !k.ends_with("vshift") => &SHIFTS,
        _ => return None,
    };
    Some(list)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_sizes() {
        assert_eq!(vced_table().len(), 93);
        assert_eq!(aced_table().len(), 23);
        assert_eq!(aced2_table().len(), 10);
        assert_eq!(aced3_table().len(), 20);
        assert_eq!(efeds_table().len(), 3);
        assert_eq!(vced_table().slot(VCED_NAME_OFFSET), Some(RESERVED));
        assert_eq!(vced_table().index_of("pitchattackrate"), Some(87));
    }

    #[test]
    fn test_operator_of() {
        assert_eq!(operator_of("operator3detune"), Some(3));
        assert_eq!(operator_of("operator9detune"), None);
        assert_eq!(operator_of("algorithm"), None);
    }

    #[test]
    fn test_ranges() {
        let r = ranges();
        assert_eq!(r.get("operator2releaserate").map(|r| (r.min, r.max)), Some((1, 15)));
        assert_eq!(r.get("operator4frequencycoarse").map(|r| r.max), Some(63));
        assert_eq!(r.get("transpose").map(|r| r.max), Some(48));
        assert_eq!(r.get("veffectbalance").map(|r| r.max), Some(100));
        assert_eq!(r.get("aftertouchpitchbias").map(|r| r.max), Some(99));
        assert_eq!(r.get("operator1vlevelscalingsign").map(|r| r.max), Some(1));
        assert!(r.get("name").is_none());
    }

    #[test]
    fn test_display_lists_match_ranges() {
        for key in ["lfowave", "effectpreset", "veffectsel", "operator2operatorwaveform", "operator1shift"] {
            let list = display_list(key).unwrap();
            assert_eq!(list.len() as i32, ranges().get(key).unwrap().max + 1, "{key}");
        }
        assert!(display_list("operator1vshift").is_none());
    }
}
