//! Factory patches bundled with patchwire.
//!
//! Each device family gets at least one starting patch. They are partial:
//! the listed values are overlaid on the codec's init patch, so the files
//! stay short and readable.

use patchwire_core::DeviceFamily;
use patchwire_registry::DeviceRegistry;

use crate::PatchFile;

/// TOML content for factory patches, keyed by identifier.
///
/// These are embedded at compile time and always available.
static FACTORY_PATCHES_TOML: &[(&str, &str)] = &[
    ("venom_init", VENOM_INIT),
    ("venom_saw_bass", VENOM_SAW_BASS),
    ("yamaha4op_init", YAMAHA4OP_INIT),
    ("fb01_init", FB01_INIT),
];

/// Single sawtooth through an open filter.
const VENOM_INIT: &str = r#"
device = "venom"
name = "Init Saw"
description = "One sawtooth, open filter, short release"

[params]
osc1waveform = 1
osc1volume = 100
cutoff = 16383
resonance = 0
env1attack = 0
env1decay = 64
env1sustain = 127
env1release = 10
channelvolume = 100
channelpan = 64
progvolume = 100
"#;

/// Three detuned saws into a low-pass.
const VENOM_SAW_BASS: &str = r#"
device = "venom"
name = "Saw Bass"
description = "Three detuned saws, low-pass with envelope"

[params]
osc1waveform = 1
osc2waveform = 1
osc3waveform = 1
osc1volume = 110
osc2volume = 100
osc3volume = 90
osc2finetune = 70
osc3finetune = 58
filtertype = 1
cutoff = 4200
resonance = 40
env1attack = 0
env1decay = 50
env1sustain = 90
env1release = 12
voicemode = 1
"#;

/// Single sine carrier, algorithm 8.
const YAMAHA4OP_INIT: &str = r#"
device = "tx81z"
name = "INIT VOICE"
description = "Operator 1 sine carrier, all others silent"

[params]
algorithm = 7
feedback = 0
operator1outputlevel = 90
operator2outputlevel = 0
operator3outputlevel = 0
operator4outputlevel = 0
operator1attackrate = 31
operator1decay1level = 15
operator1releaserate = 15
operator1frequencycoarse = 4
"#;

/// Both output channels on, operator 1 carrier.
const FB01_INIT: &str = r#"
device = "fb01"
name = "INIT"
description = "Operator 1 carrier, both outputs"

[params]
algorithm = 0
feedback = 0
leftoutputenable = 1
rightoutputenable = 1
op1enable = 1
op1carrieram = 1
op1level = 0
op1attackrate = 31
op1releaserate = 15
pitchbendrange = 2
"#;

/// All factory patches.
pub fn factory_patches() -> Vec<PatchFile> {
    FACTORY_PATCHES_TOML
        .iter()
        .filter_map(|(_, toml)| PatchFile::from_toml(toml).ok())
        .collect()
}

/// Get a factory patch by identifier or patch name (case-insensitive).
///
/// # Example
///
/// ```rust
/// use patchwire_config::factory_patch;
///
/// let patch = factory_patch("venom_saw_bass").unwrap();
/// assert_eq!(patch.name, "Saw Bass");
/// ```
pub fn factory_patch(name: &str) -> Option<PatchFile> {
    let lower = name.to_lowercase();
    FACTORY_PATCHES_TOML
        .iter()
        .find(|(id, _)| id.to_lowercase() == lower)
        .and_then(|(_, toml)| PatchFile::from_toml(toml).ok())
        .or_else(|| {
            factory_patches()
                .into_iter()
                .find(|p| p.name.to_lowercase() == lower)
        })
}

/// Identifiers of all factory patches.
pub fn factory_patch_names() -> Vec<&'static str> {
    FACTORY_PATCHES_TOML.iter().map(|(name, _)| *name).collect()
}

/// Factory patches whose device belongs to `family`.
pub fn factory_patches_for(family: DeviceFamily, registry: &DeviceRegistry) -> Vec<PatchFile> {
    factory_patches()
        .into_iter()
        .filter(|p| registry.get(&p.device).is_some_and(|d| d.family == family))
        .collect()
}
