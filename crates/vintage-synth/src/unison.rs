//! Unison voice bank: detuned, panned oscillator stack mixed to stereo.
//!
//! ## Detune Distribution
//!
//! For `n` active oscillators and detune amount `d` in \[0, 1\], oscillator `i`
//! is offset by
//!
//! ```text
//! cents = (i − n/2) · d · 15        (integer division for n/2)
//! ```
//!
//! With an odd count the stack is symmetric around the base pitch. With an
//! even count it leans one step flat, e.g. `n = 4` gives offsets −2, −1, 0, +1.
//!
//! ## Pan Distribution
//!
//! ```text
//! pan = (2i/(n − 1) − 1) · width          (0 when n = 1)
//! ```
//!
//! Pans become equal-power gains, and the stereo sum is scaled by `1/√n`
//! so perceived loudness stays roughly constant as oscillators are added.

use crate::oscillator::{Oscillator, Waveform};
use vintage_core::equal_power_gains;

/// Most oscillators a bank can stack.
pub const MAX_UNISON_VOICES: usize = 7;

/// Detune of the outermost step at full detune amount, in cents.
pub const MAX_DETUNE_CENTS: f32 = 15.0;

/// Stack of up to [`MAX_UNISON_VOICES`] oscillators with per-oscillator detune
/// and stereo placement.
///
/// Pan gains and tuning are recomputed only when a setting changes; the
/// per-sample path is oscillator generation plus two multiply-adds each.
///
/// # Example
///
/// ```rust
/// use vintage_synth::{UnisonBank, Waveform};
///
/// let mut bank = UnisonBank::new();
/// bank.set_waveform(Waveform::Saw);
/// bank.set_voice_count(5);
/// bank.set_detune_amount(0.4);
/// bank.set_stereo_width(0.8);
/// bank.set_frequency(110.0, 48000.0);
///
/// let (left, right) = bank.next_stereo_sample();
/// assert!(left.is_finite() && right.is_finite());
/// ```
#[derive(Debug, Clone)]
pub struct UnisonBank {
    oscillators: [Oscillator; MAX_UNISON_VOICES],
    /// Equal-power (left, right) gains per oscillator.
    gains: [(f32, f32); MAX_UNISON_VOICES],
    voice_count: usize,
    detune_amount: f32,
    stereo_width: f32,
    /// 1/√voice_count
    normalization: f32,
    base_frequency: f32,
    sample_rate: f32,
}

impl Default for UnisonBank {
    fn default() -> Self {
        Self::new()
    }
}

impl UnisonBank {
    /// Single centered oscillator, detune and width at 0.5, untuned until
    /// [`set_frequency`](Self::set_frequency) is called.
    pub fn new() -> Self {
        let mut bank = Self {
            oscillators: core::array::from_fn(|_| Oscillator::new()),
            gains: [(0.0, 0.0); MAX_UNISON_VOICES],
            voice_count: 1,
            detune_amount: 0.5,
            stereo_width: 0.5,
            normalization: 1.0,
            base_frequency: 0.0,
            sample_rate: 0.0,
        };
        bank.update_gains();
        bank
    }

    /// Number of oscillators, clamped to \[1, 7\].
    ///
    /// Retunes in place: oscillators that were already sounding keep their
    /// phase. Newly enabled oscillators start from phase 0.
    pub fn set_voice_count(&mut self, count: usize) {
        let count = count.clamp(1, MAX_UNISON_VOICES);
        if count == self.voice_count {
            return;
        }
        if count > self.voice_count {
            for osc in &mut self.oscillators[self.voice_count..count] {
                osc.reset();
            }
        }
        self.voice_count = count;
        self.update_gains();
        self.retune();
    }

    /// Active oscillator count.
    pub fn voice_count(&self) -> usize {
        self.voice_count
    }

    /// Detune amount, clamped to \[0, 1\]. 1.0 spaces neighbours 15 cents apart.
    /// NaN reads as 0.
    pub fn set_detune_amount(&mut self, amount: f32) {
        let amount = if amount.is_nan() { 0.0 } else { amount.clamp(0.0, 1.0) };
        if amount == self.detune_amount {
            return;
        }
        self.detune_amount = amount;
        self.retune();
    }

    /// Current detune amount.
    pub fn detune_amount(&self) -> f32 {
        self.detune_amount
    }

    /// Stereo spread, clamped to \[0, 1\]. 0 collapses every oscillator to
    /// the center. NaN reads as 0.
    pub fn set_stereo_width(&mut self, width: f32) {
        let width = if width.is_nan() { 0.0 } else { width.clamp(0.0, 1.0) };
        if width == self.stereo_width {
            return;
        }
        self.stereo_width = width;
        self.update_gains();
    }

    /// Current stereo width.
    pub fn stereo_width(&self) -> f32 {
        self.stereo_width
    }

    /// Set the waveform of every oscillator.
    pub fn set_waveform(&mut self, waveform: Waveform) {
        for osc in &mut self.oscillators {
            osc.set_waveform(waveform);
        }
    }

    /// Current waveform.
    pub fn waveform(&self) -> Waveform {
        self.oscillators[0].waveform()
    }

    /// Set the base frequency and retune the stack.
    pub fn set_frequency(&mut self, hz: f32, sample_rate: f32) {
        debug_assert!(sample_rate > 0.0, "sample rate must be positive");
        self.base_frequency = hz;
        self.sample_rate = sample_rate;
        self.retune();
    }

    /// Base frequency in Hz.
    pub fn base_frequency(&self) -> f32 {
        self.base_frequency
    }

    /// Tuned frequency of oscillator `index`, or `None` if it is not active.
    pub fn sub_frequency(&self, index: usize) -> Option<f32> {
        (index < self.voice_count).then(|| self.oscillators[index].frequency())
    }

    /// Pan position of oscillator `index` in \[-1, 1\], or `None` if it is not
    /// active.
    pub fn pan(&self, index: usize) -> Option<f32> {
        (index < self.voice_count).then(|| self.pan_for(index))
    }

    /// Detune of oscillator `index` in cents.
    pub fn detune_cents(&self, index: usize) -> f32 {
        let centered = index as i32 - (self.voice_count / 2) as i32;
        centered as f32 * self.detune_amount * MAX_DETUNE_CENTS
    }

    /// Mix one sample from every active oscillator into a stereo pair.
    #[inline]
    pub fn next_stereo_sample(&mut self) -> (f32, f32) {
        let mut left = 0.0;
        let mut right = 0.0;
        for (osc, &(gl, gr)) in self.oscillators[..self.voice_count]
            .iter_mut()
            .zip(&self.gains)
        {
            let s = osc.next_sample();
            left += s * gl;
            right += s * gr;
        }
        (left * self.normalization, right * self.normalization)
    }

    /// Zero every oscillator's phase.
    pub fn reset(&mut self) {
        for osc in &mut self.oscillators {
            osc.reset();
        }
    }

    fn pan_for(&self, index: usize) -> f32 {
        if self.voice_count > 1 {
            ((2.0 * index as f32) / (self.voice_count - 1) as f32 - 1.0) * self.stereo_width
        } else {
            0.0
        }
    }

    fn update_gains(&mut self) {
        for i in 0..self.voice_count {
            self.gains[i] = equal_power_gains(self.pan_for(i));
        }
        self.normalization = 1.0 / libm::sqrtf(self.voice_count as f32);
    }

    fn retune(&mut self) {
        if self.sample_rate <= 0.0 {
            return;
        }
        for i in 0..self.voice_count {
            let ratio = libm::exp2f(self.detune_cents(i) / 1200.0);
            self.oscillators[i].set_frequency(self.base_frequency * ratio, self.sample_rate);
        }
    }
}
