//! Output tone compensation applied after all voices are summed.
//!
//! A fixed loudness-style curve: rumble and DC removed below 40 Hz, lows
//! trimmed by a 200 Hz shelf, presence lifted around 4 kHz, then a small
//! make-down gain. Each channel owns its own filter memory.

use vintage_core::{Biquad, BiquadCoefficients};

const HIGHPASS_HZ: f32 = 40.0;
const HIGHPASS_Q: f32 = 0.707;
const LOW_SHELF_HZ: f32 = 200.0;
const LOW_SHELF_DB: f32 = -3.0;
const PRESENCE_HZ: f32 = 4000.0;
const PRESENCE_Q: f32 = 0.7;
const PRESENCE_DB: f32 = 2.0;
/// Gain applied after the curve.
pub const OUTPUT_GAIN: f32 = 0.92;

#[derive(Debug, Clone, Default)]
struct ChannelChain {
    highpass: Biquad,
    low_shelf: Biquad,
    presence: Biquad,
}

impl ChannelChain {
    fn design(&mut self, sample_rate: f32) {
        self.highpass
            .set_coefficients(BiquadCoefficients::highpass(HIGHPASS_HZ, HIGHPASS_Q, sample_rate));
        self.low_shelf
            .set_coefficients(BiquadCoefficients::low_shelf(LOW_SHELF_HZ, LOW_SHELF_DB, sample_rate));
        let presence_hz = PRESENCE_HZ.min(sample_rate * 0.45);
        self.presence.set_coefficients(BiquadCoefficients::peaking(
            presence_hz,
            PRESENCE_Q,
            PRESENCE_DB,
            sample_rate,
        ));
    }

    #[inline]
    fn process(&mut self, x: f32) -> f32 {
        let y = self.highpass.process(x);
        let y = self.low_shelf.process(y);
        self.presence.process(y) * OUTPUT_GAIN
    }

    fn clear(&mut self) {
        self.highpass.clear();
        self.low_shelf.clear();
        self.presence.clear();
    }
}

/// Stereo master-bus tone curve.
///
/// ```rust
/// use vintage_synth::ToneCompensation;
///
/// let mut tone = ToneCompensation::new(48000.0);
/// let mut left = [0.5f32; 64];
/// let mut right = [0.5f32; 64];
/// tone.process_block(&mut left, &mut right);
/// // DC is on its way out.
/// assert!(left[63] < 0.5);
/// ```
#[derive(Debug, Clone)]
pub struct ToneCompensation {
    left: ChannelChain,
    right: ChannelChain,
    enabled: bool,
    sample_rate: f32,
}

impl ToneCompensation {
    /// Enabled curve designed for `sample_rate`.
    pub fn new(sample_rate: f32) -> Self {
        let mut tone = Self {
            left: ChannelChain::default(),
            right: ChannelChain::default(),
            enabled: true,
            sample_rate,
        };
        tone.set_sample_rate(sample_rate);
        tone
    }

    /// Redesign the filters for a new rate and clear their state.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        debug_assert!(sample_rate > 0.0, "sample rate must be positive");
        self.sample_rate = sample_rate;
        self.left.design(sample_rate);
        self.right.design(sample_rate);
        self.reset();
    }

    /// Turn the curve on or off. Either way the filter memory is cleared so
    /// re-enabling starts clean.
    pub fn set_enabled(&mut self, enabled: bool) {
        if enabled != self.enabled {
            self.enabled = enabled;
            self.reset();
        }
    }

    /// Whether the curve is applied.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Clear filter memory on both channels.
    pub fn reset(&mut self) {
        self.left.clear();
        self.right.clear();
    }

    /// Process one stereo frame.
    #[inline]
    pub fn process_frame(&mut self, left: f32, right: f32) -> (f32, f32) {
        if !self.enabled {
            return (left, right);
        }
        (self.left.process(left), self.right.process(right))
    }

    /// Process a block in place. Extra samples in the longer slice are left
    /// alone.
    pub fn process_block(&mut self, left: &mut [f32], right: &mut [f32]) {
        if !self.enabled {
            return;
        }
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            *l = self.left.process(*l);
            *r = self.right.process(*r);
        }
    }

    /// Magnitude of the full curve at `frequency`, linear, including output
    /// gain. 1.0 everywhere when disabled.
    pub fn magnitude_at(&self, frequency: f32) -> f32 {
        if !self.enabled {
            return 1.0;
        }
        let chain = &self.left;
        chain.highpass.coefficients().magnitude_at(frequency, self.sample_rate)
            * chain.low_shelf.coefficients().magnitude_at(frequency, self.sample_rate)
            * chain.presence.coefficients().magnitude_at(frequency, self.sample_rate)
            * OUTPUT_GAIN
    }
}
