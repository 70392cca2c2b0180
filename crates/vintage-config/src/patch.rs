//! Patch file format and operations.

use serde::{Deserialize, Serialize};
use std::path::Path;

use vintage_synth::{PatchParams, SynthParam, Waveform};

use crate::error::ConfigError;

/// A named synth sound stored as TOML.
///
/// # TOML Format
///
/// ```toml
/// name = "Warm Pad"
/// description = "Slow strings with gentle hiss"
/// sample_rate = 48000
///
/// [params]
/// attack = 0.8
/// release = 1.5
/// cutoff = 1800.0
/// waveform = "saw"
/// voices = 5
/// noise_enable = true
/// ```
///
/// Any parameter left out takes its default.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patch {
    /// Display name.
    pub name: String,

    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Sample rate hint (defaults to 48000). Rendering may override it.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Synth parameter values.
    #[serde(default)]
    pub params: PatchSettings,
}

fn default_sample_rate() -> u32 {
    48000
}

/// Parameter values as they appear in a patch file.
///
/// Units match the parameter table: seconds, Hz and percent. Values are
/// stored as written; [`validate_patch`](crate::validate_patch) reports
/// anything out of range and [`Patch::to_params`] clamps.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PatchSettings {
    /// Amplitude attack, seconds.
    pub attack: f32,
    /// Amplitude decay, seconds.
    pub decay: f32,
    /// Amplitude sustain level.
    pub sustain: f32,
    /// Amplitude release, seconds.
    pub release: f32,
    /// Filter cutoff, Hz.
    pub cutoff: f32,
    /// Filter resonance (Q).
    pub resonance: f32,
    /// Filter envelope attack, seconds.
    pub filter_attack: f32,
    /// Filter envelope decay, seconds.
    pub filter_decay: f32,
    /// Filter envelope sustain level.
    pub filter_sustain: f32,
    /// Filter envelope release, seconds.
    pub filter_release: f32,
    /// Filter envelope depth, percent.
    pub filter_env_amount: f32,
    /// Noise on/off.
    pub noise_enable: bool,
    /// Noise level, percent.
    pub noise_level: f32,
    /// Waveform name: `sine`, `saw`, `square` or `triangle`.
    pub waveform: String,
    /// Unison oscillator count.
    pub voices: u32,
    /// Unison detune, percent.
    pub detune: f32,
    /// Unison stereo width, percent.
    pub stereo: f32,
}

impl Default for PatchSettings {
    fn default() -> Self {
        Self::from(&PatchParams::default())
    }
}

impl From<&PatchParams> for PatchSettings {
    fn from(p: &PatchParams) -> Self {
        Self {
            attack: p.attack,
            decay: p.decay,
            sustain: p.sustain,
            release: p.release,
            cutoff: p.cutoff,
            resonance: p.resonance,
            filter_attack: p.filter_attack,
            filter_decay: p.filter_decay,
            filter_sustain: p.filter_sustain,
            filter_release: p.filter_release,
            filter_env_amount: p.filter_env_amount,
            noise_enable: p.noise_enable,
            noise_level: p.noise_level,
            waveform: p.waveform.name().to_string(),
            voices: p.voices as u32,
            detune: p.detune,
            stereo: p.stereo,
        }
    }
}

impl PatchSettings {
    /// Numeric value for `param`, in table units. The waveform reads as its
    /// index, or `None` if the name is not recognized.
    pub fn value(&self, param: SynthParam) -> Option<f32> {
        let v = match param {
            SynthParam::Attack => self.attack,
            SynthParam::Decay => self.decay,
            SynthParam::Sustain => self.sustain,
            SynthParam::Release => self.release,
            SynthParam::Cutoff => self.cutoff,
            SynthParam::Resonance => self.resonance,
            SynthParam::FilterAttack => self.filter_attack,
            SynthParam::FilterDecay => self.filter_decay,
            SynthParam::FilterSustain => self.filter_sustain,
            SynthParam::FilterRelease => self.filter_release,
            SynthParam::FilterEnvAmount => self.filter_env_amount,
            SynthParam::NoiseEnable => f32::from(u8::from(self.noise_enable)),
            SynthParam::NoiseLevel => self.noise_level,
            SynthParam::Waveform => return self.waveform().map(|w| w.index() as f32),
            SynthParam::Voices => self.voices as f32,
            SynthParam::Detune => self.detune,
            SynthParam::Stereo => self.stereo,
        };
        Some(v)
    }

    /// Parsed waveform, if the name is known.
    pub fn waveform(&self) -> Option<Waveform> {
        Waveform::from_name(&self.waveform)
    }
}

impl Patch {
    /// Patch with default parameters.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            sample_rate: default_sample_rate(),
            params: PatchSettings::default(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the sample rate hint.
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Replace the parameter values.
    pub fn with_params(mut self, params: &PatchParams) -> Self {
        self.params = PatchSettings::from(params);
        self
    }

    /// Build a patch from engine parameters.
    pub fn from_params(name: impl Into<String>, params: &PatchParams) -> Self {
        Self::new(name).with_params(params)
    }

    /// Engine parameters for this patch. Out-of-range values are clamped and
    /// an unknown waveform falls back to sine.
    pub fn to_params(&self) -> PatchParams {
        let mut params = PatchParams::default();
        for param in SynthParam::ALL {
            let value = self
                .params
                .value(param)
                .unwrap_or(param.descriptor().default);
            params.set(param, value);
        }
        params
    }

    /// Load a patch from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Parse a patch from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save to a TOML file, creating parent directories as needed.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

impl Default for Patch {
    fn default() -> Self {
        Self::new("Untitled")
    }
}
