//! Two-channel resonant low-pass for per-sample cutoff modulation.
//!
//! # Topology
//!
//! Topology-Preserving Transform (TPT) state-variable filter after Zavalishin,
//! "The Art of VA Filter Design". The trapezoidal integrators keep their
//! state in the same units as the analog prototype, so the cutoff can be
//! rewritten every sample without the state becoming inconsistent with the
//! new coefficients. Direct Form biquads zipper and can blow up under the
//! same treatment.
//!
//! Both channels share one set of coefficients (`g`, `k`) and keep
//! independent integrator state. A modulated voice updates the cutoff once
//! per sample and then runs left and right through [`StereoSvf::process_sample`].
//!
//! # Performance
//!
//! Coefficient updates use [`fast_tan`] while the prewarp argument
//! `pi * fc / fs` is below `pi / 4` (a quarter of the sample rate) and fall
//! back to [`libm::tanf`] above, so a per-sample update costs one division and a
//! handful of multiplies in the common range.
//!
//! # Reference
//!
//! Zavalishin, "The Art of VA Filter Design", rev. 2.1.2 (2018), Chapter 3.

use core::f32::consts::PI;
use libm::tanf;

use crate::fast_math::fast_tan;
use crate::flush_denormal;

/// Lowest accepted cutoff in Hz.
pub const MIN_CUTOFF_HZ: f32 = 20.0;
/// Highest accepted cutoff in Hz (further limited to 0.49 × sample rate).
pub const MAX_CUTOFF_HZ: f32 = 20_000.0;
/// Lowest accepted resonance (Q).
pub const MIN_RESONANCE: f32 = 0.1;
/// Highest accepted resonance (Q).
pub const MAX_RESONANCE: f32 = 10.0;

const CHANNELS: usize = 2;

#[derive(Debug, Clone, Copy, Default)]
struct ChannelState {
    ic1eq: f32,
    ic2eq: f32,
}

/// Stereo 2-pole (12 dB/oct) TPT low-pass.
///
/// ## Parameters
///
/// - `cutoff`: 20 Hz to min(20 kHz, sr × 0.49), default 1000 Hz
/// - `resonance`: Q from 0.1 to 10.0, default 0.7
///
/// Out-of-range values are clamped, never rejected.
///
/// # Example
///
/// ```rust
/// use vintage_core::StereoSvf;
///
/// let mut filter = StereoSvf::new(48000.0);
/// filter.set_params(2500.0, 4.0);
///
/// let left = filter.process_sample(0, 0.5);
/// let right = filter.process_sample(1, -0.5);
/// assert!(left.is_finite() && right.is_finite());
/// ```
#[derive(Debug, Clone)]
pub struct StereoSvf {
    state: [ChannelState; CHANNELS],

    g: f32,
    k: f32,

    sample_rate: f32,
    cutoff: f32,
    resonance: f32,
}

impl Default for StereoSvf {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl StereoSvf {
    /// Create a filter at 1000 Hz, Q 0.7.
    pub fn new(sample_rate: f32) -> Self {
        debug_assert!(sample_rate > 0.0, "sample rate must be positive");
        let mut svf = Self {
            state: [ChannelState::default(); CHANNELS],
            g: 0.0,
            k: 0.0,
            sample_rate,
            cutoff: 1000.0,
            resonance: 0.7,
        };
        svf.update_coefficients();
        svf
    }

    /// Change the sample rate, re-clamping and recomputing the cutoff.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        debug_assert!(sample_rate > 0.0, "sample rate must be positive");
        self.sample_rate = sample_rate;
        self.cutoff = self.clamp_cutoff(self.cutoff);
        self.update_coefficients();
    }

    /// Current sample rate in Hz.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Set cutoff in Hz. Cheap enough to call every sample.
    #[inline]
    pub fn set_cutoff(&mut self, freq: f32) {
        self.cutoff = self.clamp_cutoff(freq);
        self.update_coefficients();
    }

    /// Current cutoff in Hz (after clamping).
    pub fn cutoff(&self) -> f32 {
        self.cutoff
    }

    /// Set resonance (Q), clamped to \[0.1, 10\]. NaN reads as the minimum.
    pub fn set_resonance(&mut self, q: f32) {
        self.resonance = clamp_resonance(q);
        self.update_coefficients();
    }

    /// Current resonance (Q).
    pub fn resonance(&self) -> f32 {
        self.resonance
    }

    /// Set cutoff and resonance with a single coefficient update.
    #[inline]
    pub fn set_params(&mut self, cutoff: f32, q: f32) {
        self.cutoff = self.clamp_cutoff(cutoff);
        self.resonance = clamp_resonance(q);
        self.update_coefficients();
    }

    /// Filter one sample on `channel` (0 = left, 1 = right) and return the
    /// low-pass output.
    ///
    /// Channels beyond the second pass through untouched.
    #[inline]
    pub fn process_sample(&mut self, channel: usize, input: f32) -> f32 {
        debug_assert!(channel < CHANNELS, "channel {channel} out of range");
        let Some(state) = self.state.get_mut(channel) else {
            return input;
        };

        let v3 = input - state.ic2eq;
        let v1 = (self.g * v3 + state.ic1eq) / (1.0 + self.g * (self.g + self.k));
        let v2 = state.ic2eq + self.g * v1;

        state.ic1eq = flush_denormal(2.0 * v1 - state.ic1eq);
        state.ic2eq = flush_denormal(2.0 * v2 - state.ic2eq);

        v2
    }

    /// Clear the integrator state on both channels.
    pub fn reset(&mut self) {
        self.state = [ChannelState::default(); CHANNELS];
    }

    fn clamp_cutoff(&self, freq: f32) -> f32 {
        let ceiling = MAX_CUTOFF_HZ.min(self.sample_rate * 0.49);
        freq.min(ceiling).max(MIN_CUTOFF_HZ)
    }

    fn update_coefficients(&mut self) {
        let arg = PI * self.cutoff / self.sample_rate;
        // Padé stays within 0.1% of tan below pi/4.
        self.g = if arg < PI * 0.25 {
            fast_tan(arg)
        } else {
            tanf(arg)
        };
        self.k = 1.0 / self.resonance;
    }
}

fn clamp_resonance(q: f32) -> f32 {
    if q.is_nan() {
        MIN_RESONANCE
    } else {
        q.clamp(MIN_RESONANCE, MAX_RESONANCE)
    }
}
