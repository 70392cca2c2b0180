//! The synth's parameter set: descriptor table, value snapshot, and a
//! lock-free store shared between control and audio threads.
//!
//! The control side writes single values into [`SharedParams`]; the audio
//! side takes a [`PatchParams`] snapshot once per block and pushes it into
//! every voice. Each value is one `AtomicU32` holding `f32` bits, so reads
//! never tear and neither side ever waits.
//!
//! ```rust
//! use vintage_synth::{SharedParams, SynthParam};
//!
//! let shared = SharedParams::new();
//!
//! // control thread
//! shared.set_param(SynthParam::Cutoff, 2500.0);
//! shared.set_param(SynthParam::Voices, 12.0); // clamped to 7
//!
//! // audio thread, once per block
//! let snapshot = shared.snapshot();
//! assert_eq!(snapshot.cutoff, 2500.0);
//! assert_eq!(snapshot.voices, 7);
//! ```

use core::sync::atomic::{AtomicU32, Ordering};

use vintage_core::{ParamDescriptor, ParamId, ParamScale, ParamUnit, ParameterInfo};

use crate::envelope::EnvelopeParams;
use crate::oscillator::Waveform;

/// Number of synth parameters.
pub const PARAM_COUNT: usize = 17;

/// Identifies one synth parameter. The discriminant is its index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum SynthParam {
    /// Amplitude attack, seconds.
    Attack,
    /// Amplitude decay, seconds.
    Decay,
    /// Amplitude sustain level.
    Sustain,
    /// Amplitude release, seconds.
    Release,
    /// Filter base cutoff, Hz.
    Cutoff,
    /// Filter resonance (Q).
    Resonance,
    /// Filter envelope attack, seconds.
    FilterAttack,
    /// Filter envelope decay, seconds.
    FilterDecay,
    /// Filter envelope sustain level.
    FilterSustain,
    /// Filter envelope release, seconds.
    FilterRelease,
    /// Filter envelope depth, percent (±100).
    FilterEnvAmount,
    /// Noise on/off.
    NoiseEnable,
    /// Noise level, percent.
    NoiseLevel,
    /// Waveform index.
    Waveform,
    /// Unison oscillator count.
    Voices,
    /// Unison detune, percent.
    Detune,
    /// Unison stereo width, percent.
    Stereo,
}

impl SynthParam {
    /// All parameters in index order.
    pub const ALL: [SynthParam; PARAM_COUNT] = [
        SynthParam::Attack,
        SynthParam::Decay,
        SynthParam::Sustain,
        SynthParam::Release,
        SynthParam::Cutoff,
        SynthParam::Resonance,
        SynthParam::FilterAttack,
        SynthParam::FilterDecay,
        SynthParam::FilterSustain,
        SynthParam::FilterRelease,
        SynthParam::FilterEnvAmount,
        SynthParam::NoiseEnable,
        SynthParam::NoiseLevel,
        SynthParam::Waveform,
        SynthParam::Voices,
        SynthParam::Detune,
        SynthParam::Stereo,
    ];

    /// Position in the parameter table.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Parameter at `index`, if any.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Metadata for this parameter.
    pub fn descriptor(self) -> &'static ParamDescriptor {
        &DESCRIPTORS[self.index()]
    }

    /// Look up by `string_id` (e.g. `"filter_env_amount"`).
    pub fn from_string_id(id: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.descriptor().string_id.eq_ignore_ascii_case(id))
    }
}

const fn time(name: &'static str, short: &'static str, default: f32) -> ParamDescriptor {
    ParamDescriptor::new(name, short, ParamUnit::Seconds, 0.01, 5.0, default)
}

/// Descriptor table, indexed by [`SynthParam::index`].
pub static DESCRIPTORS: [ParamDescriptor; PARAM_COUNT] = [
    time("Attack", "Attack", 0.1)
        .with_id(ParamId(100), "attack")
        .with_group("amp"),
    time("Decay", "Decay", 0.1)
        .with_id(ParamId(101), "decay")
        .with_group("amp"),
    ParamDescriptor::new("Sustain", "Sustain", ParamUnit::None, 0.0, 1.0, 0.8)
        .with_id(ParamId(102), "sustain")
        .with_group("amp"),
    time("Release", "Release", 0.1)
        .with_id(ParamId(103), "release")
        .with_group("amp"),
    ParamDescriptor::new("Cutoff", "Cutoff", ParamUnit::Hertz, 20.0, 20000.0, 1000.0)
        .with_id(ParamId(104), "cutoff")
        .with_scale(ParamScale::Logarithmic)
        .with_step(1.0)
        .with_group("filter"),
    ParamDescriptor::new("Resonance", "Reso", ParamUnit::None, 0.1, 10.0, 1.0)
        .with_id(ParamId(105), "resonance")
        .with_group("filter"),
    time("Filter Attack", "F.Att", 0.3)
        .with_id(ParamId(106), "filter_attack")
        .with_group("filter"),
    time("Filter Decay", "F.Dec", 0.8)
        .with_id(ParamId(107), "filter_decay")
        .with_group("filter"),
    ParamDescriptor::new("Filter Sustain", "F.Sus", ParamUnit::None, 0.0, 1.0, 0.3)
        .with_id(ParamId(108), "filter_sustain")
        .with_group("filter"),
    time("Filter Release", "F.Rel", 0.5)
        .with_id(ParamId(109), "filter_release")
        .with_group("filter"),
    ParamDescriptor::new("Filter Env Amount", "F.Amt", ParamUnit::Percent, -100.0, 100.0, 80.0)
        .with_id(ParamId(110), "filter_env_amount")
        .with_step(1.0)
        .with_group("filter"),
    ParamDescriptor::stepped("Noise", "Noise", ParamUnit::Toggle, 0.0, 1.0, 0.0)
        .with_id(ParamId(111), "noise_enable")
        .with_group("noise"),
    ParamDescriptor::new("Noise Level", "NoiseLvl", ParamUnit::Percent, 0.0, 100.0, 30.0)
        .with_id(ParamId(112), "noise_level")
        .with_step(1.0)
        .with_group("noise"),
    ParamDescriptor::stepped("Waveform", "Wave", ParamUnit::Choice, 0.0, 3.0, 0.0)
        .with_id(ParamId(113), "waveform")
        .with_group("osc"),
    ParamDescriptor::stepped("Unison Voices", "Voices", ParamUnit::Count, 1.0, 7.0, 3.0)
        .with_id(ParamId(114), "voices")
        .with_group("osc"),
    ParamDescriptor::new("Detune", "Detune", ParamUnit::Percent, 0.0, 100.0, 50.0)
        .with_id(ParamId(115), "detune")
        .with_step(1.0)
        .with_group("osc"),
    ParamDescriptor::new("Stereo Width", "Stereo", ParamUnit::Percent, 0.0, 100.0, 50.0)
        .with_id(ParamId(116), "stereo")
        .with_step(1.0)
        .with_group("osc"),
];

/// Plain snapshot of every synth parameter, in display units (seconds,
/// Hz, percent).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PatchParams {
    /// Amplitude attack, seconds.
    pub attack: f32,
    /// Amplitude decay, seconds.
    pub decay: f32,
    /// Amplitude sustain level.
    pub sustain: f32,
    /// Amplitude release, seconds.
    pub release: f32,
    /// Filter base cutoff, Hz.
    pub cutoff: f32,
    /// Filter Q.
    pub resonance: f32,
    /// Filter envelope attack, seconds.
    pub filter_attack: f32,
    /// Filter envelope decay, seconds.
    pub filter_decay: f32,
    /// Filter envelope sustain.
    pub filter_sustain: f32,
    /// Filter envelope release, seconds.
    pub filter_release: f32,
    /// Filter envelope depth, percent in \[-100, 100\].
    pub filter_env_amount: f32,
    /// Noise on/off.
    pub noise_enable: bool,
    /// Noise level, percent.
    pub noise_level: f32,
    /// Oscillator waveform.
    pub waveform: Waveform,
    /// Unison oscillator count, 1..=7.
    pub voices: usize,
    /// Unison detune, percent.
    pub detune: f32,
    /// Unison stereo width, percent.
    pub stereo: f32,
}

impl Default for PatchParams {
    fn default() -> Self {
        let mut params = Self {
            attack: 0.0,
            decay: 0.0,
            sustain: 0.0,
            release: 0.0,
            cutoff: 0.0,
            resonance: 0.0,
            filter_attack: 0.0,
            filter_decay: 0.0,
            filter_sustain: 0.0,
            filter_release: 0.0,
            filter_env_amount: 0.0,
            noise_enable: false,
            noise_level: 0.0,
            waveform: Waveform::Sine,
            voices: 1,
            detune: 0.0,
            stereo: 0.0,
        };
        for (i, desc) in DESCRIPTORS.iter().enumerate() {
            params.set_param(i, desc.default);
        }
        params
    }
}

impl PatchParams {
    /// Amplitude envelope settings.
    pub fn amp_envelope(&self) -> EnvelopeParams {
        EnvelopeParams {
            attack: self.attack,
            decay: self.decay,
            sustain: self.sustain,
            release: self.release,
        }
    }

    /// Filter envelope settings.
    pub fn filter_envelope(&self) -> EnvelopeParams {
        EnvelopeParams {
            attack: self.filter_attack,
            decay: self.filter_decay,
            sustain: self.filter_sustain,
            release: self.filter_release,
        }
    }

    /// Value of `param`.
    pub fn get(&self, param: SynthParam) -> f32 {
        self.get_param(param.index())
    }

    /// Set `param`, clamped to its range.
    pub fn set(&mut self, param: SynthParam, value: f32) {
        self.set_param(param.index(), value);
    }
}

impl ParameterInfo for PatchParams {
    fn param_count(&self) -> usize {
        PARAM_COUNT
    }

    fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
        DESCRIPTORS.get(index).copied()
    }

    fn get_param(&self, index: usize) -> f32 {
        let Some(param) = SynthParam::from_index(index) else {
            return 0.0;
        };
        match param {
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
            SynthParam::Waveform => self.waveform.index() as f32,
            SynthParam::Voices => self.voices as f32,
            SynthParam::Detune => self.detune,
            SynthParam::Stereo => self.stereo,
        }
    }

    fn set_param(&mut self, index: usize, value: f32) {
        let Some(param) = SynthParam::from_index(index) else {
            return;
        };
        let v = param.descriptor().clamp(value);
        match param {
            SynthParam::Attack => self.attack = v,
            SynthParam::Decay => self.decay = v,
            SynthParam::Sustain => self.sustain = v,
            SynthParam::Release => self.release = v,
            SynthParam::Cutoff => self.cutoff = v,
            SynthParam::Resonance => self.resonance = v,
            SynthParam::FilterAttack => self.filter_attack = v,
            SynthParam::FilterDecay => self.filter_decay = v,
            SynthParam::FilterSustain => self.filter_sustain = v,
            SynthParam::FilterRelease => self.filter_release = v,
            SynthParam::FilterEnvAmount => self.filter_env_amount = v,
            SynthParam::NoiseEnable => self.noise_enable = v >= 0.5,
            SynthParam::NoiseLevel => self.noise_level = v,
            SynthParam::Waveform => self.waveform = Waveform::from_index(v as usize),
            SynthParam::Voices => self.voices = v as usize,
            SynthParam::Detune => self.detune = v,
            SynthParam::Stereo => self.stereo = v,
        }
    }
}

/// Parameter values shared between a control thread and the audio thread.
///
/// Writers use `Release` stores and readers `Acquire` loads. Values are
/// independent: a snapshot taken while the control side is mid-way through a
/// multi-parameter change may see some new values and some old ones, but
/// never a torn float.
#[derive(Debug)]
pub struct SharedParams {
    values: [AtomicU32; PARAM_COUNT],
}

impl Default for SharedParams {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedParams {
    /// Store holding every parameter's default.
    pub fn new() -> Self {
        Self {
            values: core::array::from_fn(|i| AtomicU32::new(DESCRIPTORS[i].default.to_bits())),
        }
    }

    /// Store initialized from a snapshot.
    pub fn from_params(params: &PatchParams) -> Self {
        let shared = Self::new();
        shared.store(params);
        shared
    }

    /// Set the value at `index`, clamped to its range. Out-of-range indices
    /// are ignored.
    pub fn set(&self, index: usize, value: f32) {
        if let Some(desc) = DESCRIPTORS.get(index) {
            self.values[index].store(desc.clamp(value).to_bits(), Ordering::Release);
        }
    }

    /// Set one parameter.
    pub fn set_param(&self, param: SynthParam, value: f32) {
        self.set(param.index(), value);
    }

    /// Value at `index`, or 0.0 past the end.
    pub fn get(&self, index: usize) -> f32 {
        self.values
            .get(index)
            .map_or(0.0, |v| f32::from_bits(v.load(Ordering::Acquire)))
    }

    /// Value of one parameter.
    pub fn get_param(&self, param: SynthParam) -> f32 {
        self.get(param.index())
    }

    /// Overwrite every value from a snapshot.
    pub fn store(&self, params: &PatchParams) {
        for i in 0..PARAM_COUNT {
            self.set(i, params.get_param(i));
        }
    }

    /// Read every value. Call once per audio block.
    pub fn snapshot(&self) -> PatchParams {
        let mut params = PatchParams::default();
        for i in 0..PARAM_COUNT {
            params.set_param(i, self.get(i));
        }
        params
    }
}
