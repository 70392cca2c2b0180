//! One polyphonic note: unison bank → amplitude → modulated filter →
//! analog character, accumulated into a shared output buffer.
//!
//! A [`Voice`] is created once, lives in a fixed pool, and cycles between
//! Free and Active. The allocator (see [`SynthEngine`](crate::SynthEngine))
//! treats Free as "available"; there is no error path.
//!
//! ## Signal flow per sample
//!
//! ```text
//! amp   = amp_env.next()
//! fenv  = filter_env.next()
//! fc    = clamp(base_cutoff + fenv · (amount/100) · 5000, 20, 20000)
//! (l,r) = unison.next() · level · amp
//! (l,r) = svf(fc).process(l, r)
//! out  += soft_clip(l,r) + noise · amp
//! ```

use vintage_core::StereoSvf;

use crate::analog::{AnalogCharacter, soft_clip};
use crate::envelope::{AdsrEnvelope, EnvelopeParams, EnvelopeState};
use crate::oscillator::Waveform;
use crate::params::PatchParams;
use crate::unison::UnisonBank;

/// Velocity-to-level factor. Leaves room for several voices to sum without
/// clipping.
pub const VELOCITY_HEADROOM: f32 = 0.15;

/// Cutoff offset in Hz at full filter-envelope depth.
pub const FILTER_ENV_RANGE_HZ: f32 = 5000.0;

const MIN_MODULATED_CUTOFF: f32 = 20.0;
const MAX_MODULATED_CUTOFF: f32 = 20_000.0;

/// Convert MIDI note number to frequency in Hz (A4 = 69 = 440 Hz).
///
/// ```rust
/// use vintage_synth::midi_to_freq;
///
/// assert_eq!(midi_to_freq(69), 440.0);
/// assert!((midi_to_freq(60) - 261.63).abs() < 0.01);
/// ```
#[inline]
pub fn midi_to_freq(note: u8) -> f32 {
    440.0 * libm::powf(2.0, (f32::from(note) - 69.0) / 12.0)
}

/// Cutoff after filter-envelope modulation, clamped to \[20, 20000\] Hz.
///
/// `amount` is in percent (±100).
#[inline]
pub fn modulated_cutoff(base: f32, envelope: f32, amount: f32) -> f32 {
    (base + envelope * (amount / 100.0) * FILTER_ENV_RANGE_HZ)
        .clamp(MIN_MODULATED_CUTOFF, MAX_MODULATED_CUTOFF)
}

/// Kind of sound a voice can render.
///
/// The allocator checks this once when assigning a note, never per sample.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SoundKind {
    /// Detuned-unison subtractive voice with analog character.
    #[default]
    Vintage,
}

/// Voice lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VoiceState {
    /// No note. Available for assignment.
    #[default]
    Free,
    /// Sounding, including its release tail.
    Active,
}

/// A single synthesizer voice.
///
/// Owns its oscillators, both envelopes, filter state and noise generator.
/// Nothing is shared between voices.
///
/// # Example
///
/// ```rust
/// use vintage_synth::{PatchParams, Voice, Waveform};
///
/// let mut voice = Voice::new(48000.0);
/// let mut params = PatchParams::default();
/// params.waveform = Waveform::Saw;
/// voice.apply_params(&params);
///
/// voice.start(57, 0.9);
///
/// let mut left = [0.0f32; 256];
/// let mut right = [0.0f32; 256];
/// voice.render_range(&mut [&mut left[..], &mut right[..]], 0, 256);
/// assert!(left.iter().any(|s| *s != 0.0));
///
/// voice.stop(0.0, false);
/// assert!(voice.is_free());
/// ```
#[derive(Debug, Clone)]
pub struct Voice {
    unison: UnisonBank,
    amp_env: AdsrEnvelope,
    filter_env: AdsrEnvelope,
    filter: StereoSvf,
    analog: AnalogCharacter,

    sound: SoundKind,
    note: Option<u8>,
    level: f32,
    current_frequency: f32,
    sample_rate: f32,

    base_cutoff: f32,
    filter_env_amount: f32,
    noise_enabled: bool,
    /// Normalized \[0, 1\].
    noise_level: f32,
}

impl Voice {
    /// Free voice with default settings and a fixed noise seed.
    pub fn new(sample_rate: f32) -> Self {
        Self::with_seed(sample_rate, 0x1234_5678)
    }

    /// Free voice whose noise generator starts from `seed`. Give each voice
    /// in a pool a different seed so their noise is uncorrelated.
    pub fn with_seed(sample_rate: f32, seed: u32) -> Self {
        debug_assert!(sample_rate > 0.0, "sample rate must be positive");
        Self {
            unison: UnisonBank::new(),
            amp_env: AdsrEnvelope::new(sample_rate),
            filter_env: AdsrEnvelope::new(sample_rate),
            filter: StereoSvf::new(sample_rate),
            analog: AnalogCharacter::new(seed),
            sound: SoundKind::Vintage,
            note: None,
            level: 0.0,
            current_frequency: 0.0,
            sample_rate,
            base_cutoff: 1000.0,
            filter_env_amount: 0.0,
            noise_enabled: false,
            noise_level: 0.3,
        }
    }

    /// Whether this voice can render `sound`.
    pub fn can_play(&self, sound: SoundKind) -> bool {
        self.sound == sound
    }

    /// Change sample rate. A sounding note is retuned in place.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        debug_assert!(sample_rate > 0.0, "sample rate must be positive");
        self.sample_rate = sample_rate;
        self.amp_env.set_sample_rate(sample_rate);
        self.filter_env.set_sample_rate(sample_rate);
        self.filter.set_sample_rate(sample_rate);
        if self.current_frequency > 0.0 {
            self.unison.set_frequency(self.current_frequency, sample_rate);
        }
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Begin a note.
    ///
    /// Oscillator phases restart at 0 and both envelopes restart their
    /// attack from 0. `velocity` in \[0, 1\] scales the output by
    /// `velocity × 0.15`; NaN is silent.
    pub fn start(&mut self, note: u8, velocity: f32) {
        let note = note.min(127);
        if self.note.is_none() {
            self.filter.reset();
        }
        self.note = Some(note);
        self.current_frequency = midi_to_freq(note);
        self.level = clamp_or(velocity, 0.0, 1.0, 0.0) * VELOCITY_HEADROOM;

        self.unison.set_frequency(self.current_frequency, self.sample_rate);
        self.unison.reset();
        self.amp_env.note_on();
        self.filter_env.note_on();
    }

    /// Release the note.
    ///
    /// With `allow_tail_off` the envelopes enter release and the voice stays
    /// Active until the amplitude envelope reaches zero. Without it, or if
    /// the amplitude envelope is already idle, the voice is freed at once
    /// and renders nothing further.
    pub fn stop(&mut self, _velocity: f32, allow_tail_off: bool) {
        self.amp_env.note_off();
        self.filter_env.note_off();

        if !allow_tail_off || !self.amp_env.is_active() {
            self.clear_note();
        }
    }

    /// Accumulate `num_samples` samples into `outputs` starting at
    /// `start_sample`.
    ///
    /// Channel 0 receives left and channel 1 right; further channels are
    /// untouched and fewer than two channels is fine. The range must lie
    /// within every channel; release builds render only the part that fits.
    ///
    /// An idle voice returns immediately. If the note finishes during the
    /// range the voice becomes Free.
    pub fn render_range(&mut self, outputs: &mut [&mut [f32]], start_sample: usize, num_samples: usize) {
        if !self.amp_env.is_active() {
            if self.note.is_some() {
                self.clear_note();
            }
            return;
        }

        let end = start_sample.saturating_add(num_samples);
        let available = outputs
            .iter()
            .take(2)
            .map(|ch| ch.len())
            .min()
            .unwrap_or(usize::MAX);
        debug_assert!(end <= available, "render range {start_sample}..{end} exceeds buffer");
        let end = end.min(available);

        for i in start_sample..end {
            let amp = self.amp_env.next_sample();
            let fenv = self.filter_env.next_sample();
            self.filter
                .set_cutoff(modulated_cutoff(self.base_cutoff, fenv, self.filter_env_amount));

            let (left, right) = self.unison.next_stereo_sample();
            let gain = self.level * amp;
            let left = soft_clip(self.filter.process_sample(0, left * gain));
            let right = soft_clip(self.filter.process_sample(1, right * gain));

            let noise = self.analog.analog_noise(self.noise_enabled, self.noise_level) * amp;

            if let Some(ch) = outputs.get_mut(0) {
                ch[i] += left + noise;
            }
            if let Some(ch) = outputs.get_mut(1) {
                ch[i] += right + noise;
            }
        }

        if !self.amp_env.is_active() {
            self.clear_note();
        }
    }

    /// Set base cutoff (Hz), resonance (Q) and filter-envelope depth
    /// (percent, ±100). Values are clamped. A NaN cutoff keeps the current
    /// one and a NaN depth reads as 0.
    pub fn update_filter(&mut self, cutoff: f32, resonance: f32, env_amount: f32) {
        self.base_cutoff = clamp_or(cutoff, MIN_MODULATED_CUTOFF, MAX_MODULATED_CUTOFF, self.base_cutoff);
        self.filter_env_amount = clamp_or(env_amount, -100.0, 100.0, 0.0);
        self.filter.set_resonance(resonance);
    }

    /// Set the oscillator waveform.
    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.unison.set_waveform(waveform);
    }

    /// Set unison count (1–7), detune and stereo width (both \[0, 1\]).
    pub fn update_unison(&mut self, voices: usize, detune: f32, stereo_width: f32) {
        self.unison.set_voice_count(voices);
        self.unison.set_detune_amount(detune);
        self.unison.set_stereo_width(stereo_width);
    }

    /// Enable noise and set its level, normalized \[0, 1\]. NaN reads as 0.
    pub fn update_noise(&mut self, enabled: bool, level: f32) {
        self.noise_enabled = enabled;
        self.noise_level = clamp_or(level, 0.0, 1.0, 0.0);
    }

    /// Set amplitude envelope times and sustain.
    pub fn update_amp_envelope(&mut self, params: EnvelopeParams) {
        self.amp_env.set_params(params);
    }

    /// Set filter envelope times and sustain.
    pub fn update_filter_envelope(&mut self, params: EnvelopeParams) {
        self.filter_env.set_params(params);
    }

    /// Push a full parameter snapshot, converting percentages to the
    /// normalized ranges the components expect.
    pub fn apply_params(&mut self, params: &PatchParams) {
        self.update_amp_envelope(params.amp_envelope());
        self.update_filter_envelope(params.filter_envelope());
        self.update_filter(params.cutoff, params.resonance, params.filter_env_amount);
        self.set_waveform(params.waveform);
        self.update_unison(params.voices, params.detune / 100.0, params.stereo / 100.0);
        self.update_noise(params.noise_enable, params.noise_level / 100.0);
    }

    /// Lifecycle state.
    pub fn state(&self) -> VoiceState {
        if self.note.is_some() {
            VoiceState::Active
        } else {
            VoiceState::Free
        }
    }

    /// `true` when no note is assigned.
    pub fn is_free(&self) -> bool {
        self.note.is_none()
    }

    /// `true` while a note (or its release tail) is sounding.
    pub fn is_active(&self) -> bool {
        self.note.is_some()
    }

    /// MIDI note being played.
    pub fn note(&self) -> Option<u8> {
        self.note
    }

    /// Frequency of the current (or last) note in Hz.
    pub fn current_frequency(&self) -> f32 {
        self.current_frequency
    }

    /// Output level derived from velocity.
    pub fn level(&self) -> f32 {
        self.level
    }

    /// `true` once note-off has been received but the tail is still sounding.
    pub fn is_releasing(&self) -> bool {
        self.note.is_some() && self.amp_env.state() == EnvelopeState::Release
    }

    /// The unison bank, for inspection.
    pub fn unison(&self) -> &UnisonBank {
        &self.unison
    }

    /// The filter, for inspection.
    pub fn filter(&self) -> &StereoSvf {
        &self.filter
    }

    fn clear_note(&mut self) {
        self.note = None;
        self.amp_env.reset();
        self.filter_env.reset();
    }
}

/// `value` clamped to `[min, max]`, or `fallback` when it is NaN.
fn clamp_or(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_nan() { fallback } else { value.clamp(min, max) }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 48000.0;

    fn short_voice() -> Voice {
        let mut v = Voice::new(SR);
        let mut params = PatchParams::default();
        params.attack = 0.01;
        params.decay = 0.01;
        params.sustain = 0.7;
        params.release = 0.02;
        params.waveform = Waveform::Saw;
        v.apply_params(&params);
        v
    }

    fn render(v: &mut Voice, n: usize) -> (Vec<f32>, Vec<f32>) {
        let mut l = vec![0.0; n];
        let mut r = vec![0.0; n];
        v.render_range(&mut [&mut l[..], &mut r[..]], 0, n);
        (l, r)
    }

    #[test]
    fn test_midi_to_freq_reference() {
        assert_eq!(midi_to_freq(69), 440.0);
        assert!((midi_to_freq(60) - 261.626).abs() < 0.01);
        assert!((midi_to_freq(81) - 880.0).abs() < 1e-3);
    }

    #[test]
    fn test_modulated_cutoff() {
        assert_eq!(modulated_cutoff(1000.0, 0.0, 80.0), 1000.0);
        assert_eq!(modulated_cutoff(1000.0, 1.0, 80.0), 5000.0);
        assert_eq!(modulated_cutoff(1000.0, 1.0, -100.0), 20.0);
        assert_eq!(modulated_cutoff(19000.0, 1.0, 100.0), 20000.0);
    }

    #[test]
    fn test_new_voice_is_free_and_silent() {
        let mut v = short_voice();
        assert!(v.is_free());
        assert_eq!(v.state(), VoiceState::Free);
        let (l, r) = render(&mut v, 128);
        assert!(l.iter().chain(&r).all(|s| *s == 0.0));
    }

    #[test]
    fn test_start_sets_pitch_and_level() {
        let mut v = short_voice();
        v.start(69, 1.0);
        assert_eq!(v.note(), Some(69));
        assert_eq!(v.current_frequency(), 440.0);
        assert!((v.level() - 0.15).abs() < 1e-7);
        assert_eq!(v.state(), VoiceState::Active);
        assert_eq!(v.unison().base_frequency(), 440.0);
    }

    #[test]
    fn test_render_accumulates() {
        let mut a = short_voice();
        let mut b = short_voice();
        a.start(60, 0.8);
        b.start(60, 0.8);

        let (reference, _) = render(&mut a, 256);
        let mut l = vec![0.25; 256];
        let mut r = vec![0.25; 256];
        b.render_range(&mut [&mut l[..], &mut r[..]], 0, 256);
        for (x, y) in reference.iter().zip(&l) {
            assert!((x + 0.25 - y).abs() < 1e-6);
        }
    }

    #[test]
    fn test_render_respects_start_offset() {
        let mut v = short_voice();
        v.start(60, 1.0);
        let mut l = vec![0.0; 64];
        let mut r = vec![0.0; 64];
        v.render_range(&mut [&mut l[..], &mut r[..]], 32, 32);
        assert!(l[..32].iter().all(|s| *s == 0.0));
        assert!(l[32..].iter().any(|s| *s != 0.0));
    }

    #[test]
    fn test_immediate_stop_frees_and_silences() {
        let mut v = short_voice();
        v.start(60, 1.0);
        v.stop(0.0, false);
        assert!(v.is_free());
        let (l, r) = render(&mut v, 512);
        assert!(l.iter().chain(&r).all(|s| *s == 0.0));
    }

    #[test]
    fn test_tail_off_releases_then_frees() {
        let mut v = short_voice();
        v.start(60, 1.0);
        render(&mut v, 2000);
        v.stop(0.0, true);
        assert!(v.is_active());
        assert!(v.is_releasing());

        // 0.02 s release = 960 samples.
        let (l, _) = render(&mut v, 959);
        assert!(v.is_active());
        assert!(l.iter().any(|s| *s != 0.0));
        render(&mut v, 1);
        assert!(v.is_free());

        let (l, _) = render(&mut v, 128);
        assert!(l.iter().all(|s| *s == 0.0));
    }

    #[test]
    fn test_stop_before_any_render_is_immediate() {
        // Amplitude envelope is still at 0, so there is no tail to play.
        let mut v = short_voice();
        v.start(60, 1.0);
        v.stop(0.0, true);
        assert!(v.is_free());
    }

    #[test]
    fn test_mono_and_empty_outputs() {
        let mut v = short_voice();
        v.start(48, 1.0);
        let mut mono = vec![0.0; 128];
        v.render_range(&mut [&mut mono[..]], 0, 128);
        assert!(mono.iter().any(|s| *s != 0.0));

        v.render_range(&mut [], 0, 128);
        assert!(v.is_active());
    }

    #[test]
    fn test_output_bounded() {
        let mut v = short_voice();
        let mut params = PatchParams::default();
        params.resonance = 10.0;
        params.voices = 7;
        params.noise_enable = true;
        params.noise_level = 100.0;
        params.waveform = Waveform::Square;
        v.apply_params(&params);
        v.start(36, 1.0);
        let (l, r) = render(&mut v, 48000);
        for s in l.iter().chain(&r) {
            assert!(s.is_finite() && s.abs() <= 0.8 + 0.03 + 1e-6);
        }
    }

    #[test]
    fn test_noise_follows_amp_envelope() {
        let mut v = Voice::new(SR);
        let mut params = PatchParams::default();
        params.noise_enable = true;
        params.noise_level = 100.0;
        params.cutoff = 20.0;
        params.filter_env_amount = 0.0;
        v.apply_params(&params);
        v.start(60, 0.0);
        // Zero velocity: oscillator path is silent, so output is pure noise
        // scaled by the attack ramp.
        let (l, r) = render(&mut v, 4800);
        assert_eq!(l, r);
        let early = l[..100].iter().map(|s| s.abs()).fold(0.0f32, f32::max);
        let late = l[4000..].iter().map(|s| s.abs()).fold(0.0f32, f32::max);
        assert!(early < 0.03 * 100.0 / 4800.0 + 1e-6);
        assert!(late > 0.02);
    }

    #[test]
    fn test_parameter_updates_on_free_voice() {
        let mut v = Voice::new(SR);
        v.update_filter(50_000.0, 50.0, 300.0);
        v.update_unison(12, 2.0, -1.0);
        v.update_noise(true, 5.0);
        assert_eq!(v.filter().resonance(), 10.0);
        assert_eq!(v.unison().voice_count(), 7);
        assert_eq!(v.unison().detune_amount(), 1.0);
        assert_eq!(v.unison().stereo_width(), 0.0);
        assert!(v.is_free());
    }

    #[test]
    fn test_can_play() {
        assert!(Voice::new(SR).can_play(SoundKind::Vintage));
    }

    #[test]
    fn test_nan_controls_render_finite() {
        let mut v = short_voice();
        v.update_unison(3, f32::NAN, f32::NAN);
        v.update_filter(f32::NAN, f32::NAN, f32::NAN);
        v.update_noise(true, f32::NAN);
        v.start(60, 1.0);

        let (l, r) = render(&mut v, 1024);
        assert!(l.iter().chain(&r).all(|s| s.is_finite()));
        assert!(l.iter().any(|s| s.abs() > 1e-4), "voice went silent");

        v.start(64, f32::NAN);
        assert_eq!(v.level(), 0.0);
        let (l, r) = render(&mut v, 1024);
        assert!(l.iter().chain(&r).all(|s| s.is_finite()));
    }
}
