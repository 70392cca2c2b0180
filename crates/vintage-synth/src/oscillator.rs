//! Band-limited audio oscillator.
//!
//! Saw and square use a second-order PolyBLEP (Polynomial Band-Limited Step)
//! correction at each hard discontinuity. Sine and triangle have no jumps and
//! are generated directly.
//!
//! # Reference
//!
//! Välimäki & Huovilainen, "Antialiasing Oscillators in Subtractive
//! Synthesis", IEEE Signal Processing Magazine, 2007.

use core::f32::consts::TAU;
use libm::sinf;

/// Oscillator waveform.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Waveform {
    /// Pure fundamental.
    #[default]
    Sine,
    /// All harmonics, bright.
    Saw,
    /// Odd harmonics, hollow. 50% duty cycle.
    Square,
    /// Odd harmonics rolling off at 12 dB/oct, soft.
    Triangle,
}

impl Waveform {
    /// All waveforms in parameter-index order.
    pub const ALL: [Waveform; 4] = [
        Waveform::Sine,
        Waveform::Saw,
        Waveform::Square,
        Waveform::Triangle,
    ];

    /// Waveform for a parameter index. Out-of-range indices clamp to the
    /// nearest end.
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index.min(Self::ALL.len() - 1)]
    }

    /// Position in [`Waveform::ALL`].
    pub const fn index(self) -> usize {
        match self {
            Waveform::Sine => 0,
            Waveform::Saw => 1,
            Waveform::Square => 2,
            Waveform::Triangle => 3,
        }
    }

    /// Lowercase name, as used in patch files.
    pub const fn name(self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Saw => "saw",
            Waveform::Square => "square",
            Waveform::Triangle => "triangle",
        }
    }

    /// Parse a name (ASCII case-insensitive). `"sawtooth"` is accepted.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|w| w.name().eq_ignore_ascii_case(name))
            .or_else(|| name.eq_ignore_ascii_case("sawtooth").then_some(Waveform::Saw))
    }
}

/// Second-order PolyBLEP residual.
///
/// Non-zero only within one phase increment of the discontinuity at `t = 0`.
#[inline]
pub fn poly_blep(t: f32, dt: f32) -> f32 {
    if t < dt {
        let t = t / dt;
        t + t - t * t - 1.0
    } else if t > 1.0 - dt {
        let t = (t - 1.0) / dt;
        t * t + t + t + 1.0
    } else {
        0.0
    }
}

/// Single-channel band-limited oscillator.
///
/// State is a phase in \[0, 1) and a per-sample increment. The oscillator
/// does not store a sample rate; [`set_frequency`](Self::set_frequency) takes
/// one so that a bank can retune every member from one place.
///
/// # Example
///
/// ```rust
/// use vintage_synth::{Oscillator, Waveform};
///
/// let mut osc = Oscillator::new();
/// osc.set_waveform(Waveform::Saw);
/// osc.set_frequency(440.0, 48000.0);
///
/// let sample = osc.next_sample();
/// assert!((-1.0..=1.0).contains(&sample));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Oscillator {
    phase: f32,
    phase_increment: f32,
    frequency: f32,
    waveform: Waveform,
}

impl Oscillator {
    /// Silent sine oscillator at phase 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the waveform. Takes effect on the next sample.
    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
    }

    /// Current waveform.
    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Set frequency in Hz at the given sample rate.
    ///
    /// Phase is preserved, so retuning a sounding oscillator is click-free.
    /// The increment is limited to Nyquist. `sample_rate` must be positive;
    /// release builds treat a non-positive rate as silence.
    pub fn set_frequency(&mut self, hz: f32, sample_rate: f32) {
        debug_assert!(sample_rate > 0.0, "sample rate must be positive");
        self.frequency = hz.max(0.0);
        self.phase_increment = if sample_rate > 0.0 {
            (self.frequency / sample_rate).min(0.5)
        } else {
            0.0
        };
    }

    /// Frequency in Hz, as last set.
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Phase advance per sample (`frequency / sample_rate`).
    pub fn phase_increment(&self) -> f32 {
        self.phase_increment
    }

    /// Current phase in \[0, 1).
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Return to phase 0.
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    /// Generate one sample in \[-1, 1\] and advance the phase.
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        let t = self.phase;
        let dt = self.phase_increment;

        let out = match self.waveform {
            Waveform::Sine => sinf(TAU * t),
            Waveform::Saw => (2.0 * t - 1.0) - poly_blep(t, dt),
            Waveform::Square => {
                let naive = if t < 0.5 { 1.0 } else { -1.0 };
                let mut falling = t + 0.5;
                if falling >= 1.0 {
                    falling -= 1.0;
                }
                naive + poly_blep(t, dt) - poly_blep(falling, dt)
            }
            Waveform::Triangle => {
                if t < 0.5 {
                    4.0 * t - 1.0
                } else {
                    3.0 - 4.0 * t
                }
            }
        };

        self.phase += dt;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }

        out
    }
}
