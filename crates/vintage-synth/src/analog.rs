//! Analog-character post-processing: soft saturation, hiss, pitch drift.
//!
//! Each voice owns one [`AnalogCharacter`], so voices never share random
//! state.

use libm::{sqrtf, tanhf};

/// Gain into the saturator.
const DRIVE: f32 = 1.5;
/// Make-up gain after the saturator.
const OUTPUT_GAIN: f32 = 0.8;
/// Noise amplitude per percent of noise level.
const NOISE_PER_PERCENT: f32 = 0.0003;
/// Drift never wanders further than this (relative pitch offset).
pub const MAX_DRIFT: f32 = 0.0005;
/// Drift step size at 48 kHz.
const DRIFT_STEP: f32 = 0.0001;

/// Soft saturation: `tanh(1.5·x) · 0.8`.
///
/// Odd-symmetric, monotonic, transparent-ish near zero and compressive toward
/// ±0.8. Stateless.
///
/// ```rust
/// use vintage_synth::soft_clip;
///
/// assert_eq!(soft_clip(0.0), 0.0);
/// assert_eq!(soft_clip(-0.5), -soft_clip(0.5));
/// assert!(soft_clip(10.0) <= 0.8);
/// ```
#[inline]
pub fn soft_clip(sample: f32) -> f32 {
    tanhf(sample * DRIVE) * OUTPUT_GAIN
}

/// Per-voice analog imperfection generator.
///
/// Randomness comes from a xorshift32 generator: fast, allocation-free and
/// uniform enough for noise texture.
#[derive(Debug, Clone)]
pub struct AnalogCharacter {
    rng_state: u32,
    drift: f32,
}

impl Default for AnalogCharacter {
    fn default() -> Self {
        Self::new(0x1234_5678)
    }
}

impl AnalogCharacter {
    /// Create with a seed. Zero is replaced by a fixed non-zero seed since
    /// xorshift would otherwise stay at zero forever.
    pub fn new(seed: u32) -> Self {
        Self {
            rng_state: if seed == 0 { 0x1234_5678 } else { seed },
            drift: 0.0,
        }
    }

    /// [`soft_clip`].
    #[inline]
    pub fn soft_clip(&self, sample: f32) -> f32 {
        soft_clip(sample)
    }

    /// One sample of white noise, or 0 when disabled.
    ///
    /// `level` is normalized \[0, 1\] and maps to a peak amplitude of
    /// `0.0003 × level × 100`, i.e. 0.03 at full level.
    #[inline]
    pub fn analog_noise(&mut self, enabled: bool, level: f32) -> f32 {
        if !enabled {
            return 0.0;
        }
        self.next_bipolar() * NOISE_PER_PERCENT * level * 100.0
    }

    /// Advance the pitch-drift random walk and return the new offset, a
    /// relative frequency deviation within ±[`MAX_DRIFT`] (about ±1 cent).
    ///
    /// Step size scales with `1/√(rate/48k)` so the wander per second does not
    /// depend on the sample rate.
    pub fn drift_amount(&mut self, sample_rate: f32) -> f32 {
        debug_assert!(sample_rate > 0.0, "sample rate must be positive");
        let scale = if sample_rate > 0.0 {
            sqrtf(48_000.0 / sample_rate)
        } else {
            1.0
        };
        self.drift += self.next_bipolar() * 0.5 * DRIFT_STEP * scale;
        self.drift = self.drift.clamp(-MAX_DRIFT, MAX_DRIFT);
        self.drift
    }

    /// Current drift offset without advancing.
    pub fn drift(&self) -> f32 {
        self.drift
    }

    /// Zero the drift walk. The noise sequence continues.
    pub fn reset(&mut self) {
        self.drift = 0.0;
    }

    /// Uniform value in \[-1, 1).
    #[inline]
    fn next_bipolar(&mut self) -> f32 {
        let mut x = self.rng_state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.rng_state = x;

        // Top 24 bits give an exact f32 in [0, 1).
        (x >> 8) as f32 / 16_777_216.0 * 2.0 - 1.0
    }
}
