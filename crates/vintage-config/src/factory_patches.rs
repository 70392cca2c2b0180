//! Factory patches bundled with the library.
//!
//! Embedded as TOML so they go through exactly the same parser as user
//! files and are always available without touching the filesystem.

use crate::Patch;

/// Internal identifiers of the factory patches, in display order.
pub static FACTORY_PATCH_NAMES: &[&str] = &["init", "supersaw", "warm_pad", "pluck_bass", "noisy_lead"];

static FACTORY_PATCHES_TOML: &[(&str, &str)] = &[
    ("init", INIT_PATCH),
    ("supersaw", SUPERSAW_PATCH),
    ("warm_pad", WARM_PAD_PATCH),
    ("pluck_bass", PLUCK_BASS_PATCH),
    ("noisy_lead", NOISY_LEAD_PATCH),
];

/// Every parameter at its default.
const INIT_PATCH: &str = r#"
name = "Init"
description = "Default parameters: three-voice sine through a gently enveloped filter"
sample_rate = 48000
"#;

const SUPERSAW_PATCH: &str = r#"
name = "Supersaw"
description = "Seven detuned saws spread wide"
sample_rate = 48000

[params]
attack = 0.02
decay = 0.4
sustain = 0.85
release = 0.6
cutoff = 4500.0
resonance = 0.9
filter_attack = 0.01
filter_decay = 0.6
filter_sustain = 0.5
filter_release = 0.6
filter_env_amount = 40.0
waveform = "saw"
voices = 7
detune = 70.0
stereo = 100.0
"#;

const WARM_PAD_PATCH: &str = r#"
name = "Warm Pad"
description = "Slow swell, dark filter, a little tape hiss"
sample_rate = 48000

[params]
attack = 0.9
decay = 1.2
sustain = 0.75
release = 1.8
cutoff = 900.0
resonance = 1.4
filter_attack = 1.5
filter_decay = 2.0
filter_sustain = 0.4
filter_release = 2.0
filter_env_amount = 35.0
noise_enable = true
noise_level = 20.0
waveform = "triangle"
voices = 5
detune = 40.0
stereo = 80.0
"#;

const PLUCK_BASS_PATCH: &str = r#"
name = "Pluck Bass"
description = "Tight square bass with a snappy filter envelope"
sample_rate = 48000

[params]
attack = 0.01
decay = 0.25
sustain = 0.3
release = 0.12
cutoff = 180.0
resonance = 3.5
filter_attack = 0.01
filter_decay = 0.18
filter_sustain = 0.0
filter_release = 0.1
filter_env_amount = 70.0
waveform = "square"
voices = 1
detune = 0.0
stereo = 0.0
"#;

const NOISY_LEAD_PATCH: &str = r#"
name = "Noisy Lead"
description = "Resonant saw lead with audible analog noise"
sample_rate = 48000

[params]
attack = 0.01
decay = 0.3
sustain = 0.7
release = 0.25
cutoff = 1400.0
resonance = 6.0
filter_attack = 0.05
filter_decay = 0.5
filter_sustain = 0.35
filter_release = 0.3
filter_env_amount = 60.0
noise_enable = true
noise_level = 60.0
waveform = "saw"
voices = 3
detune = 25.0
stereo = 40.0
"#;

/// Parse every factory patch.
///
/// # Example
///
/// ```rust
/// use vintage_config::factory_patches;
///
/// for patch in factory_patches() {
///     println!("{}: {}", patch.name, patch.description.as_deref().unwrap_or(""));
/// }
/// ```
pub fn factory_patches() -> Vec<Patch> {
    FACTORY_PATCHES_TOML
        .iter()
        .filter_map(|(_, toml)| Patch::from_toml(toml).ok())
        .collect()
}

/// Look up a factory patch by identifier (`"warm_pad"`) or display name
/// (`"Warm Pad"`), ignoring case.
///
/// ```rust
/// use vintage_config::get_factory_patch;
///
/// assert_eq!(get_factory_patch("Pluck Bass").map(|p| p.params.voices), Some(1));
/// assert!(get_factory_patch("missing").is_none());
/// ```
pub fn get_factory_patch(name: &str) -> Option<Patch> {
    if let Some((_, toml)) = FACTORY_PATCHES_TOML
        .iter()
        .find(|(id, _)| id.eq_ignore_ascii_case(name))
    {
        return Patch::from_toml(toml).ok();
    }

    factory_patches()
        .into_iter()
        .find(|p| p.name.eq_ignore_ascii_case(name))
}

/// Whether `name` matches a factory patch identifier or display name.
pub fn is_factory_patch(name: &str) -> bool {
    get_factory_patch(name).is_some()
}
