//! Mathematical utility functions for DSP.
//!
//! All functions are allocation-free and suitable for `no_std`.
//!
//! - [`db_to_linear`] / [`linear_to_db`] - Convert between dB and linear gain
//! - [`flush_denormal`] - Keep recursive filter state out of the subnormal range
//! - [`equal_power_gains`] - Constant-power pan law

use core::f32::consts::FRAC_PI_4;

/// Convert decibels to linear gain.
///
/// # Example
///
/// ```rust
/// use vintage_core::db_to_linear;
///
/// assert!((db_to_linear(0.0) - 1.0).abs() < 1e-6);
/// assert!((db_to_linear(-6.0) - 0.501).abs() < 0.01);
/// ```
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    libm::powf(10.0, db / 20.0)
}

/// Convert linear gain to decibels.
///
/// Silence is floored at -120 dB rather than returning negative infinity.
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    if linear <= 1e-6 {
        return -120.0;
    }
    20.0 * libm::log10f(linear)
}

/// Flush values below 1e-20 to zero.
///
/// Recursive state decaying toward silence otherwise lands in the subnormal
/// range, which is dramatically slower on most CPUs.
#[inline]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < 1e-20 { 0.0 } else { x }
}

/// Equal-power pan law.
///
/// `pan` is in \[-1, 1\] (hard left to hard right). Returns `(left, right)`
/// gains with `left² + right² = 1`:
///
/// ```text
/// angle = (pan + 1) · π/4
/// left  = cos(angle)
/// right = sin(angle)
/// ```
///
/// A centered source gets `√2/2` on both sides.
#[inline]
pub fn equal_power_gains(pan: f32) -> (f32, f32) {
    let angle = (pan.clamp(-1.0, 1.0) + 1.0) * FRAC_PI_4;
    (libm::cosf(angle), libm::sinf(angle))
}
