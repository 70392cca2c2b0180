//! Linear ADSR envelope generator.
//!
//! Every stage is a straight line with an integer length in samples, so the
//! stage endpoints are hit exactly: the last attack sample is 1.0, the last
//! decay sample is the sustain level and the last release sample is 0.0,
//! after which the envelope is idle.

/// Shortest accepted stage time in seconds.
pub const MIN_STAGE_SECONDS: f32 = 0.01;
/// Longest accepted stage time in seconds.
pub const MAX_STAGE_SECONDS: f32 = 5.0;

/// ADSR envelope states
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EnvelopeState {
    /// Output is zero and stays there until the next note-on.
    #[default]
    Idle,
    /// Rising from 0 to 1.
    Attack,
    /// Falling from 1 to the sustain level.
    Decay,
    /// Holding the sustain level until note-off.
    Sustain,
    /// Falling from wherever note-off found it to 0.
    Release,
}

/// Stage times and sustain level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnvelopeParams {
    /// Attack time in seconds.
    pub attack: f32,
    /// Decay time in seconds.
    pub decay: f32,
    /// Sustain level in \[0, 1\].
    pub sustain: f32,
    /// Release time in seconds.
    pub release: f32,
}

impl Default for EnvelopeParams {
    fn default() -> Self {
        Self {
            attack: 0.1,
            decay: 0.1,
            sustain: 0.8,
            release: 0.1,
        }
    }
}

/// Four-stage envelope producing a value in \[0, 1\] per sample.
///
/// Stage lengths are latched when a stage begins, so changing a time while
/// that stage runs takes effect from its next occurrence. The sustain level
/// is read live, both as the decay target and while sustaining.
///
/// # Example
///
/// ```rust
/// use vintage_synth::{AdsrEnvelope, EnvelopeParams, EnvelopeState};
///
/// let mut env = AdsrEnvelope::new(48000.0);
/// env.set_params(EnvelopeParams { attack: 0.01, decay: 0.2, sustain: 0.6, release: 0.5 });
///
/// env.note_on();
/// let mut level = 0.0;
/// for _ in 0..480 {
///     level = env.next_sample();
/// }
/// assert_eq!(level, 1.0);
/// assert_eq!(env.state(), EnvelopeState::Decay);
///
/// env.note_off();
/// assert_eq!(env.state(), EnvelopeState::Release);
/// ```
#[derive(Debug, Clone)]
pub struct AdsrEnvelope {
    state: EnvelopeState,
    level: f32,

    /// Level at the start of the current ramp.
    from: f32,
    /// Samples in the current ramp.
    length: u32,
    /// Samples already produced in the current ramp.
    position: u32,

    params: EnvelopeParams,
    sample_rate: f32,
}

impl Default for AdsrEnvelope {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl AdsrEnvelope {
    /// Idle envelope with default times (0.1 s / 0.1 s / 0.8 / 0.1 s).
    pub fn new(sample_rate: f32) -> Self {
        debug_assert!(sample_rate > 0.0, "sample rate must be positive");
        Self {
            state: EnvelopeState::Idle,
            level: 0.0,
            from: 0.0,
            length: 1,
            position: 0,
            params: EnvelopeParams::default(),
            sample_rate,
        }
    }

    /// Set all four parameters, clamping times to \[0.01, 5\] s and sustain
    /// to \[0, 1\].
    pub fn set_params(&mut self, params: EnvelopeParams) {
        self.params = EnvelopeParams {
            attack: clamp_time(params.attack),
            decay: clamp_time(params.decay),
            sustain: params.sustain.clamp(0.0, 1.0),
            release: clamp_time(params.release),
        };
    }

    /// Current (clamped) parameters.
    pub fn params(&self) -> EnvelopeParams {
        self.params
    }

    /// Set attack time in seconds.
    pub fn set_attack(&mut self, seconds: f32) {
        self.params.attack = clamp_time(seconds);
    }

    /// Set decay time in seconds.
    pub fn set_decay(&mut self, seconds: f32) {
        self.params.decay = clamp_time(seconds);
    }

    /// Set sustain level.
    pub fn set_sustain(&mut self, level: f32) {
        self.params.sustain = level.clamp(0.0, 1.0);
    }

    /// Set release time in seconds.
    pub fn set_release(&mut self, seconds: f32) {
        self.params.release = clamp_time(seconds);
    }

    /// Set sample rate. Affects stages started afterwards.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        debug_assert!(sample_rate > 0.0, "sample rate must be positive");
        self.sample_rate = sample_rate;
    }

    /// Start the attack stage from 0, whatever the current state.
    pub fn note_on(&mut self) {
        self.level = 0.0;
        self.enter(EnvelopeState::Attack, self.params.attack);
    }

    /// Start the release stage from the current level.
    ///
    /// Does nothing when idle. An envelope that is already silent goes
    /// straight to idle.
    pub fn note_off(&mut self) {
        match self.state {
            EnvelopeState::Idle | EnvelopeState::Release => {}
            _ if self.level <= 0.0 => self.reset(),
            _ => self.enter(EnvelopeState::Release, self.params.release),
        }
    }

    /// Force idle at level 0.
    pub fn reset(&mut self) {
        self.state = EnvelopeState::Idle;
        self.level = 0.0;
        self.position = 0;
    }

    /// Current stage.
    pub fn state(&self) -> EnvelopeState {
        self.state
    }

    /// Most recent output.
    pub fn level(&self) -> f32 {
        self.level
    }

    /// `true` in every state except [`EnvelopeState::Idle`].
    pub fn is_active(&self) -> bool {
        self.state != EnvelopeState::Idle
    }

    /// Advance one sample and return the new level.
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        match self.state {
            EnvelopeState::Idle => {}
            EnvelopeState::Sustain => self.level = self.params.sustain,
            EnvelopeState::Attack => {
                if self.step(1.0) {
                    self.enter(EnvelopeState::Decay, self.params.decay);
                }
            }
            EnvelopeState::Decay => {
                if self.step(self.params.sustain) {
                    self.state = EnvelopeState::Sustain;
                }
            }
            EnvelopeState::Release => {
                if self.step(0.0) {
                    self.reset();
                }
            }
        }
        self.level
    }

    fn enter(&mut self, state: EnvelopeState, seconds: f32) {
        self.state = state;
        self.from = self.level;
        self.position = 0;
        self.length = libm::roundf(seconds * self.sample_rate).max(1.0) as u32;
    }

    /// Move one sample along the ramp toward `to`. Returns `true` on the
    /// ramp's final sample, which lands exactly on `to`.
    #[inline]
    fn step(&mut self, to: f32) -> bool {
        self.position += 1;
        if self.position >= self.length {
            self.level = to;
            true
        } else {
            let t = self.position as f32 / self.length as f32;
            self.level = self.from + (to - self.from) * t;
            false
        }
    }
}

#[inline]
fn clamp_time(seconds: f32) -> f32 {
    if seconds.is_nan() {
        MIN_STAGE_SECONDS
    } else {
        seconds.clamp(MIN_STAGE_SECONDS, MAX_STAGE_SECONDS)
    }
}
