//! Fast approximations for per-sample coefficient work.

/// Padé \[3/2\] approximation of `tan(x)`.
///
/// ```text
/// tan(x) ≈ x · (15 − x²) / (15 − 6x²)
/// ```
///
/// Accurate to better than 0.1% for `x < π·10000/44100`, which covers filter
/// prewarping below 10 kHz. Callers switch to [`libm::tanf`] above that.
#[inline]
pub fn fast_tan(x: f32) -> f32 {
    let x2 = x * x;
    x * (15.0 - x2) / (15.0 - 6.0 * x2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f32::consts::PI;

    #[test]
    fn tan_matches_libm_below_10k() {
        for hz in [20.0, 100.0, 1000.0, 5000.0, 9999.0] {
            let x = PI * hz / 44100.0;
            let exact = libm::tanf(x);
            let approx = fast_tan(x);
            let rel = ((approx - exact) / exact).abs();
            assert!(rel < 1e-3, "{hz} Hz: rel error {rel}");
        }
    }

    #[test]
    fn tan_zero() {
        assert_eq!(fast_tan(0.0), 0.0);
    }
}
