//! Second-order IIR sections for fixed (non-modulated) tone shaping.
//!
//! Coefficient designs follow the RBJ Audio EQ Cookbook. The section itself is
//! Direct Form I, which is fine for static curves; use [`StereoSvf`](crate::StereoSvf)
//! when the cutoff moves per sample.

use core::f32::consts::PI;
use libm::{cosf, sinf, sqrtf};

/// Normalized biquad coefficients (`a0` already divided out).
///
/// ```text
/// y[n] = b0·x[n] + b1·x[n-1] + b2·x[n-2] − a1·y[n-1] − a2·y[n-2]
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoefficients {
    /// Feedforward taps.
    pub b0: f32,
    /// Feedforward taps.
    pub b1: f32,
    /// Feedforward taps.
    pub b2: f32,
    /// Feedback taps.
    pub a1: f32,
    /// Feedback taps.
    pub a2: f32,
}

impl Default for BiquadCoefficients {
    fn default() -> Self {
        Self::passthrough()
    }
}

impl BiquadCoefficients {
    /// `y[n] = x[n]`.
    pub const fn passthrough() -> Self {
        Self {
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
        }
    }

    fn normalized(b0: f32, b1: f32, b2: f32, a0: f32, a1: f32, a2: f32) -> Self {
        let inv = 1.0 / a0;
        Self {
            b0: b0 * inv,
            b1: b1 * inv,
            b2: b2 * inv,
            a1: a1 * inv,
            a2: a2 * inv,
        }
    }

    /// 12 dB/oct low-pass.
    pub fn lowpass(frequency: f32, q: f32, sample_rate: f32) -> Self {
        let omega = 2.0 * PI * frequency / sample_rate;
        let cos_w = cosf(omega);
        let alpha = sinf(omega) / (2.0 * q);

        let b1 = 1.0 - cos_w;
        Self::normalized(
            b1 / 2.0,
            b1,
            b1 / 2.0,
            1.0 + alpha,
            -2.0 * cos_w,
            1.0 - alpha,
        )
    }

    /// 12 dB/oct high-pass.
    pub fn highpass(frequency: f32, q: f32, sample_rate: f32) -> Self {
        let omega = 2.0 * PI * frequency / sample_rate;
        let cos_w = cosf(omega);
        let alpha = sinf(omega) / (2.0 * q);

        let b0 = (1.0 + cos_w) / 2.0;
        Self::normalized(
            b0,
            -(1.0 + cos_w),
            b0,
            1.0 + alpha,
            -2.0 * cos_w,
            1.0 - alpha,
        )
    }

    /// Low shelf with slope `S = 1`.
    ///
    /// Frequencies below `frequency` are scaled by `gain_db`.
    pub fn low_shelf(frequency: f32, gain_db: f32, sample_rate: f32) -> Self {
        // Cookbook A: square root of the linear gain.
        let a = crate::db_to_linear(gain_db * 0.5);
        let omega = 2.0 * PI * frequency / sample_rate;
        let cos_w = cosf(omega);
        // S = 1 reduces the cookbook's shelf alpha to sin(w)/√2.
        let alpha = sinf(omega) / core::f32::consts::SQRT_2;
        let two_sqrt_a_alpha = 2.0 * sqrtf(a) * alpha;

        Self::normalized(
            a * ((a + 1.0) - (a - 1.0) * cos_w + two_sqrt_a_alpha),
            2.0 * a * ((a - 1.0) - (a + 1.0) * cos_w),
            a * ((a + 1.0) - (a - 1.0) * cos_w - two_sqrt_a_alpha),
            (a + 1.0) + (a - 1.0) * cos_w + two_sqrt_a_alpha,
            -2.0 * ((a - 1.0) + (a + 1.0) * cos_w),
            (a + 1.0) + (a - 1.0) * cos_w - two_sqrt_a_alpha,
        )
    }

    /// Peaking EQ: boost or cut of `gain_db` centered on `frequency`.
    pub fn peaking(frequency: f32, q: f32, gain_db: f32, sample_rate: f32) -> Self {
        let a = crate::db_to_linear(gain_db * 0.5);
        let omega = 2.0 * PI * frequency / sample_rate;
        let cos_w = cosf(omega);
        let alpha = sinf(omega) / (2.0 * q);

        Self::normalized(
            1.0 + alpha * a,
            -2.0 * cos_w,
            1.0 - alpha * a,
            1.0 + alpha / a,
            -2.0 * cos_w,
            1.0 - alpha / a,
        )
    }

    /// Magnitude response at `frequency`, linear.
    pub fn magnitude_at(&self, frequency: f32, sample_rate: f32) -> f32 {
        let w = 2.0 * PI * frequency / sample_rate;
        let (c1, s1) = (cosf(w), sinf(w));
        let (c2, s2) = (cosf(2.0 * w), sinf(2.0 * w));

        let num_re = self.b0 + self.b1 * c1 + self.b2 * c2;
        let num_im = -(self.b1 * s1 + self.b2 * s2);
        let den_re = 1.0 + self.a1 * c1 + self.a2 * c2;
        let den_im = -(self.a1 * s1 + self.a2 * s2);

        sqrtf((num_re * num_re + num_im * num_im) / (den_re * den_re + den_im * den_im))
    }
}

/// Direct Form I biquad section.
#[derive(Debug, Clone, Default)]
pub struct Biquad {
    coeffs: BiquadCoefficients,

    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl Biquad {
    /// Passthrough section with cleared state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Section with the given coefficients and cleared state.
    pub fn with_coefficients(coeffs: BiquadCoefficients) -> Self {
        Self {
            coeffs,
            ..Self::default()
        }
    }

    /// Replace the coefficients, keeping the delay lines.
    pub fn set_coefficients(&mut self, coeffs: BiquadCoefficients) {
        self.coeffs = coeffs;
    }

    /// Current coefficients.
    pub fn coefficients(&self) -> &BiquadCoefficients {
        &self.coeffs
    }

    /// Filter one sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let c = &self.coeffs;
        let output = c.b0 * input + c.b1 * self.x1 + c.b2 * self.x2
            - c.a1 * self.y1
            - c.a2 * self.y2;

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = crate::flush_denormal(output);

        output
    }

    /// Clear the delay lines without touching coefficients.
    pub fn clear(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db_to_linear, linear_to_db};

    const SR: f32 = 48000.0;

    fn settle(biquad: &mut Biquad, input: f32) -> f32 {
        let mut out = 0.0;
        for _ in 0..4000 {
            out = biquad.process(input);
        }
        out
    }

    #[test]
    fn test_passthrough() {
        let mut biquad = Biquad::new();
        for i in 0..10 {
            let x = i as f32 * 0.1;
            assert_eq!(biquad.process(x), x);
        }
    }

    #[test]
    fn test_clear() {
        let mut biquad = Biquad::with_coefficients(BiquadCoefficients::lowpass(1000.0, 0.707, SR));
        for _ in 0..10 {
            biquad.process(1.0);
        }
        biquad.clear();
        assert_eq!(biquad.x1, 0.0);
        assert_eq!(biquad.y2, 0.0);
    }

    #[test]
    fn test_lowpass_passes_dc() {
        let mut biquad = Biquad::with_coefficients(BiquadCoefficients::lowpass(1000.0, 0.707, SR));
        assert!((settle(&mut biquad, 1.0) - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_highpass_blocks_dc() {
        let mut biquad = Biquad::with_coefficients(BiquadCoefficients::highpass(40.0, 0.707, SR));
        assert!(settle(&mut biquad, 1.0).abs() < 0.01);
    }

    #[test]
    fn test_highpass_response() {
        let c = BiquadCoefficients::highpass(40.0, 0.707, SR);
        assert!((linear_to_db(c.magnitude_at(40.0, SR)) + 3.0).abs() < 0.2);
        assert!((c.magnitude_at(1000.0, SR) - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_low_shelf_gain() {
        let c = BiquadCoefficients::low_shelf(200.0, -1.0, SR);
        let dc = c.magnitude_at(5.0, SR);
        assert!((dc - db_to_linear(-1.0)).abs() < 0.005, "shelf floor {dc}");
        assert!((c.magnitude_at(10_000.0, SR) - 1.0).abs() < 0.005);
    }

    #[test]
    fn test_peaking_gain_at_center() {
        let c = BiquadCoefficients::peaking(4000.0, 0.7, 1.5, SR);
        let at_center = linear_to_db(c.magnitude_at(4000.0, SR));
        assert!((at_center - 1.5).abs() < 0.05, "peak {at_center} dB");
        assert!((c.magnitude_at(20.0, SR) - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_peaking_unity_at_zero_gain() {
        let mut biquad = Biquad::with_coefficients(BiquadCoefficients::peaking(1000.0, 1.0, 0.0, SR));
        assert!((settle(&mut biquad, 1.0) - 1.0).abs() < 0.01);
    }
}
