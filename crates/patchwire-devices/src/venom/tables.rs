//! Venom slot layout, value ranges, and display lists.

use std::sync::OnceLock;

use patchwire_core::{ParamRange, ParameterTable, RESERVED, RangeMap};

/// Edit-buffer slot order. Slots 2 and 3 carry bank and number in stored
/// dumps and are ignored here; slots 188..198 hold the name.
pub const EDIT_BUFFER_SLOTS: [&str; 198] = [
    "glidemode", "glidetime", RESERVED, RESERVED,
    "env1attack", "env1hold", "env1decay", "env1sustain", "env1release",
    "env2attack", "env2hold", "env2decay", "env2sustain", "env2release",
    "env3attack", "env3hold", "env3decay", "env3sustain", "env3release",
    "startmod", "oscdrift", "bendrange", "ringmod", "fmlevel", "oscflags", "waveshapewidth",
    "osc1waveform", "osc1coarsetune", "osc1finetune",
    "osc2waveform", "osc2coarsetune", "osc2finetune",
    "boost",
    "osc3waveform", "osc3coarsetune", "osc3finetune",
    RESERVED,
    "lfo1waveform", "lfo1rate", "lfo1delay", "lfo1attack", "lfo1startphase",
    "lfo2waveform", "lfo2rate", "lfo2delay", "lfo2attack", "lfo2startphase",
    "lfo3waveform", "lfo3rate", "lfo3delay", "lfo3attack", "lfo3startphase",
    "mod1source", "mod2source", "mod3source", "mod4source",
    "mod5source", "mod6source", "mod7source", "mod8source",
    "mod9source", "mod10source", "mod11source", "mod12source",
    "mod13source", "mod14source", "mod15source", "mod16source",
    "mod1destination", "mod2destination", "mod3destination", "mod4destination",
    "mod5destination", "mod6destination", "mod7destination", "mod8destination",
    "mod9destination", "mod10destination", "mod11destination", "mod12destination",
    "mod13destination", "mod14destination", "mod15destination", "mod16destination",
    "mod1scaling", "mod2scaling", "mod3scaling", "mod4scaling",
    "mod5scaling", "mod6scaling", "mod7scaling", "mod8scaling",
    "mod9scaling", "mod10scaling", "mod11scaling", "mod12scaling",
    "mod13scaling", "mod14scaling", "mod15scaling", "mod16scaling",
    "osc1volume", "osc2volume", "osc3volume", "extinvolume", "extinsource",
    "filtertype", "cutoffhigh", "cutofflow", "resonance",
    "coarsetune", "finetune", "voicemode", "unisonmode", "unisoncount", "unisondetune",
    "channelvolume", "channelpan", "channeldirect", "channelaux1send", "channelaux2send",
    "channelfxtype",
    "hiloeqlowfreq", "hiloeqlowgain", "hiloeqhighfreq", "hiloeqhighgain",
    "tremolowaveform", "tremolorate", "tremolovoldepth", "tremolopandepth",
    "autowahtype", "autowahcutoff", "autowahresonance", "autowahsensitivity",
    "compressorattack", "compressorrelease", "compressorthreshold", "compressorratio",
    "compressorgain",
    "distortiontype", "distortiondepth", "distortionpregain", "distortionpostgain",
    "distortionhighcutoff",
    "bandpassmidfreq", "bandpassmidgain", "bandpassmidq",
    "reducerbitdepth", "reducersamplerate",
    "aux1mode", "aux1type", "aux1depth", "aux1prehp", "aux1predelay", "aux1highdamp",
    "aux1time", "aux1feedback", "aux1gatedelaytime", "aux1gatethresh", "aux1tonegain",
    "aux1tonefreq",
    "aux2mode", "aux2type", "aux2depth", "aux2toaux1", "aux2prehp", "aux2prelp",
    "aux2time", "aux2feedback", "aux2highdamp", "aux2lforate", "aux2lfodepth",
    "progvolume",
    "mastereqlowfreq", "mastereqlowgain", "mastereqmidfreq", "mastereqmidgain",
    "mastereqhighfreq", "mastereqhighgain",
    "arpenable", "arpsrc", "arpbank", "arppattern", "arpmode", "arpnoteorder",
    "arpoctaverange", "arpbipolar", "arplatchkeys", "arprootnote",
    RESERVED, RESERVED, RESERVED, RESERVED, RESERVED,
    RESERVED, RESERVED, RESERVED, RESERVED, RESERVED,
];

/// Unpacked offset of the name in edit-buffer dumps.
pub const EDIT_BUFFER_NAME_OFFSET: usize = 188;

/// Name length.
pub const NAME_LEN: usize = 10;

/// Booleans sent as 0/127.
pub const WIDE_BOOLEANS: [&str; 8] = [
    "glidemode",
    "unisonmode",
    "aux1mode",
    "aux2mode",
    "arpsrc",
    "arpbipolar",
    "arplatchkeys",
    "arpenable",
];

/// Slot layout of edit-buffer dumps.
pub fn edit_buffer_table() -> &'static ParameterTable {
    static TABLE: OnceLock<ParameterTable> = OnceLock::new();
    TABLE.get_or_init(|| ParameterTable::new(&EDIT_BUFFER_SLOTS))
}

/// Slot layout of stored-patch dumps: the edit-buffer layout with a repeated
/// osc 2 waveform byte after `osc2waveform`.
pub fn stored_table() -> &'static ParameterTable {
    static TABLE: OnceLock<ParameterTable> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut slots = Vec::with_capacity(EDIT_BUFFER_SLOTS.len() + 1);
        for &key in &EDIT_BUFFER_SLOTS {
            slots.push(key);
            if key == "osc2waveform" {
                slots.push(RESERVED);
            }
        }
        ParameterTable::new(&slots)
    })
}

const RANGE_OVERRIDES: &[ParamRange] = &[
    ParamRange::new("cutoff", 0, 16383),
    ParamRange::new("arpoctaverange", 60, 68),
    ParamRange::new("env1release", 0, 126),
    ParamRange::new("unisoncount", 2, 12),
    ParamRange::new("glidemode", 0, 1),
    ParamRange::new("unisonmode", 0, 1),
    ParamRange::new("voicemode", 0, 1),
    ParamRange::new("aux1mode", 0, 1),
    ParamRange::new("aux2mode", 0, 1),
    ParamRange::new("arpenable", 0, 1),
    ParamRange::new("arpsrc", 0, 1),
    ParamRange::new("arpbank", 0, 1),
    ParamRange::new("arpbipolar", 0, 1),
    ParamRange::new("arplatchkeys", 0, 1),
    ParamRange::new("waveshape", 0, 1),
    ParamRange::new("osc2sync", 0, 1),
    ParamRange::new("osc3sync", 0, 1),
    ParamRange::new("osc1keytrack", 0, 1),
    ParamRange::new("osc2keytrack", 0, 1),
    ParamRange::new("osc3keytrack", 0, 1),
    ParamRange::new("osc1waveform", 0, 93),
    ParamRange::new("osc2waveform", 0, 93),
    ParamRange::new("osc3waveform", 0, 93),
    ParamRange::new("lfo1waveform", 0, 11),
    ParamRange::new("lfo2waveform", 0, 11),
    ParamRange::new("lfo3waveform", 0, 11),
    ParamRange::new("tremolowaveform", 0, 4),
    ParamRange::new("filtertype", 0, 6),
    ParamRange::new("extinsource", 0, 6),
    ParamRange::new("channelfxtype", 0, 5),
    ParamRange::new("autowahtype", 0, 1),
    ParamRange::new("distortiontype", 0, 2),
    // Docs say 0 or 1; the device takes 0..=12.
    ParamRange::new("aux1type", 0, 12),
    // Docs say 0..=4; the device takes 0..=3.
    ParamRange::new("aux2type", 0, 3),
    ParamRange::new("arpmode", 0, 2),
    ParamRange::new("arpnoteorder", 0, 6),
];

/// Keys of the patch model: table keys with the flags byte split into its
/// bits and the two cutoff bytes joined.
pub fn model_keys() -> impl Iterator<Item = &'static str> {
    edit_buffer_table()
        .keys()
        .filter(|k| !matches!(*k, "oscflags" | "cutoffhigh" | "cutofflow"))
        .chain(super::OSC_FLAGS.fields.iter().map(|(k, _)| *k))
        .chain(std::iter::once("cutoff"))
}

/// Value ranges. Mod sources run 0..=31 and destinations 0..=33 (the
/// extended list including mod amounts).
pub fn ranges() -> &'static RangeMap {
    static RANGES: OnceLock<RangeMap> = OnceLock::new();
    RANGES.get_or_init(|| {
        let mut overrides = RANGE_OVERRIDES.to_vec();
        for i in 0..16 {
            overrides.push(ParamRange::new(MOD_SOURCE_KEYS[i], 0, 31));
            overrides.push(ParamRange::new(MOD_DESTINATION_KEYS[i], 0, 33));
        }
        RangeMap::new(model_keys(), 0, 127, &overrides)
    })
}

/// `mod1source` … `mod16source`.
pub const MOD_SOURCE_KEYS: [&str; 16] = [
    "mod1source", "mod2source", "mod3source", "mod4source",
    "mod5source", "mod6source", "mod7source", "mod8source",
    "mod9source", "mod10source", "mod11source", "mod12source",
    "mod13source", "mod14source", "mod15source", "mod16source",
];

/// `mod1destination` … `mod16destination`.
pub const MOD_DESTINATION_KEYS: [&str; 16] = [
    "mod1destination", "mod2destination", "mod3destination", "mod4destination",
    "mod5destination", "mod6destination", "mod7destination", "mod8destination",
    "mod9destination", "mod10destination", "mod11destination", "mod12destination",
    "mod13destination", "mod14destination", "mod15destination", "mod16destination",
];

/// Bank names.
pub const BANKS: [&str; 4] = ["A", "B", "C", "D"];

/// Oscillator waveforms.
pub const WAVEFORMS: [&str; 94] = [
    "HP Sine", "PB Sine", "RP Sine", "SH Triangle", "MG Triangle", "RP Triangle", "RP Sawtooth",
    "SH Sawtooth", "MG Sawtooth", "OB Sawtooth", "JX Sawtooth", "RP Sawtooth", "MS Sawtooth",
    "PB Square", "SH Square", "MG Square", "OB Square", "JX Square", "RP Square", "MS Square",
    "AL Pulse", "MG Pulse", "MG Sync", "SH Sync", "JX Sync", "Bit Wave 1", "Bit Wave 2",
    "Bit Wave 3", "AL FM Wave", "DP X Wave", "RP FM Wave", "AL FM Bass", "AL FM Quack",
    "AL FM Woody", "AL FM Science", "AL FM Organ 1", "AL FM Organ 2", "AL FM Inharmonic",
    "MG White Noise", "08 Kit", "09 Kit", "DR Kit", "FM Kit", "08 Kick 1", "08 Kick 2",
    "09 Kick 1", "09 Kick 2", "09 Kick 3", "DR Kick", "FM Kick 1", "FM Kick 2", "08 Tom High",
    "08 Tom Mid", "08 Tom Low", "09 Tom High", "09 Tom Mid", "09 Tom Low", "FM Tom",
    "08 Snare 1", "08 Snare 2", "09 Snare 1", "09 Snare 2", "DR Snare", "FM Snare 1",
    "FM Snare 2", "FM Snare 3", "08 Hat Closed", "08 Hat Open", "09 Hat Closed", "09 Hat Open",
    "DR Hat", "FM Hat Closed", "FM Hat Open", "08 Crash", "08 Ride", "09 Crash", "09 Ride",
    "08 Rim Shot", "09 Rim Shot", "DR Rim Shot", "08 Hand Clap", "09 Hand Clap", "08 Cowbell",
    "FM Cowbell", "RP Guiro", "08 Conga", "08 Clave", "08 Maracas", "RP Zap 1", "RP Zap 2",
    "RP Zap 3", "RP Zap 4", "TB Saw", "TB Square",
];

/// Filter types.
pub const FILTER_TYPES: [&str; 7] = [
    "Off", "Lowpass 12", "Bandpass 12", "Highpass 12", "Lowpass 24", "Bandpass 24", "Highpass 24",
];

/// LFO waveforms.
pub const LFO_WAVES: [&str; 12] = [
    "Sine", "Sine+", "Triangle", "Sawtooth", "Square", "Sample and Hold",
    "Linear Sample and Hold", "Log Sample and Hold", "Exp Square", "Log Square",
    "Log Up Sawtooth", "Exp Up Sawtooth",
];

/// Tremolo (amplitude modulation) waveforms.
pub const A_MOD_WAVES: [&str; 5] = ["Sine", "Triangle", "Saw Up", "Saw Down", "Square"];

/// Mod matrix sources.
pub const MOD_SOURCES: [&str; 32] = [
    "Off", "Envelope 1", "Envelope 2", "Envelope 3", "Envelope 1 Bipolar", "Envelope 2 Bipolar",
    "Envelope 3 Bipolar", "LFO 1 Wide Bipolar", "LFO 2 Wide Bipolar", "LFO 3 Wide Bipolar",
    "LFO 1 Wide Unipolar", "LFO 2 Wide Unipolar", "LFO 3 Wide Unipolar", "LFO 1 Fine Bipolar",
    "LFO 2 Fine Bipolar", "LFO 3 Fine Bipolar", "LFO 1 Fine Unipolar", "LFO 2 Fine Unipolar",
    "LFO 3 Fine Unipolar", "Velocity", "- Velocity", "Keytrack", "Mod Wheel", "Pitch Bend",
    "Aftertouch", "Expression", "- Expression", "Sustain", "- Aftertouch", "- Keytrack",
    "- Mod Wheel", "- Sustain",
];

/// Mod matrix destinations, including the mod amount targets from 18 on.
pub const MOD_DESTINATIONS: [&str; 34] = [
    "Off", "Filter Cutoff", "Pitch", "Osc 1 Pitch", "Osc 2 Pitch", "Osc 3 Pitch", "Amplitude",
    "Filter Resonance", "Ring Mod", "External Input Level", "FM Amount", "Osc 1 Waveshaper",
    "LFO 1 Rate", "LFO 2 Rate", "Osc Detune", "Osc 1 Level", "Osc 2 Level", "Osc 3 Level",
    "Mod 1 Amount", "Mod 2 Amount", "Mod 3 Amount", "Mod 4 Amount", "Mod 5 Amount",
    "Mod 6 Amount", "Mod 7 Amount", "Mod 8 Amount", "Mod 9 Amount", "Mod 10 Amount",
    "Mod 11 Amount", "Mod 12 Amount", "Mod 13 Amount", "Mod 14 Amount", "Mod 15 Amount",
    "Mod 16 Amount",
];

/// Arpeggiator modes.
pub const ARP_MODES: [&str; 3] = ["Standard", "Phrase", "Drum"];

/// Arpeggiator note orders.
pub const ARP_NOTE_ORDERS: [&str; 7] = [
    "Up", "Down", "Up/Down Excl.", "Up/Down Incl.", "Down/Up Excl.", "Down/Up Incl.", "Chord",
];

/// Aux FX 1 types.
pub const AUX_FX_1_TYPES: [&str; 13] = [
    "Plate Reverb", "Room Reverb", "Hall Reverb", "Mono Echo", "Stereo Echo", "Mono 3/4 Echo",
    "Stereo 3/4 Echo", "Mono 4/4 Echo", "Stereo 4/4 Echo", "Mono Triplet", "Stereo Triplet",
    "Long Mono Delay", "Long Ping Pong",
];

/// Aux FX 2 types.
pub const AUX_FX_2_TYPES: [&str; 4] = ["Chorus", "Flanger", "Phaser", "Delay"];

/// Insert effect types.
pub const INSERT_FX_TYPES: [&str; 6] =
    ["Off", "EQ Bandpass", "Compressor", "Auto Wah", "Distortion", "Reducer"];

/// Distortion types.
pub const DISTORTION_TYPES: [&str; 3] = ["Overdrive", "Distortion", "Fuzz"];

/// External input sources.
pub const EXTERNAL_SOURCES: [&str; 7] = [
    "Off", "Input Left", "Input Right", "Input Left/Right", "USB Left", "USB Right",
    "USB Left/Right",
];

/// Note names for `arprootnote`.
pub const NOTES: [&str; 12] = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];

/// Display list for `key`, if it is an enumerated parameter.
pub fn display_list(key: &str) -> Option<&'static [&'static str]> {
    let list: &'static [&'static str] = match key {
        "osc1waveform" | "osc2waveform" | "osc3waveform" => &WAVEFORMS,
        "lfo1waveform" | "lfo2waveform" | "lfo3waveform" => &LFO_WAVES,
        "tremolowaveform" => &A_MOD_WAVES,
        "filtertype" => &FILTER_TYPES,
        "arpmode" => &ARP_MODES,
        "arpnoteorder" => &ARP_NOTE_ORDERS,
        "aux1type" => &AUX_FX_1_TYPES,
        "aux2type" => &AUX_FX_2_TYPES,
        "channelfxtype" => &INSERT_FX_TYPES,
        "distortiontype" => &DISTORTION_TYPES,
        "extinsource" => &EXTERNAL_SOURCES,
        "arpbank" => &["A", "B"],
        "arpsrc" => &["Pattern", "Single"],
        "glidemode" => &["Rate", "Time"],
        "autowahtype" => &["Low Pass", "High Pass"],
        k if k.ends_with("source") && k.starts_with("mod") => &MOD_SOURCES,
        k if k.ends_with("destination") => &MOD_DESTINATIONS,
        _ => return None,
    };
    Some(list)
}
