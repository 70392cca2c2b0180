//! Vintage Core - DSP primitives for the vintage synth engine
//!
//! The building blocks here are shared by the synthesis crate and are
//! designed for real-time use: no allocation, no locks, bounded work per
//! sample.
//!
//! # Filters
//!
//! - [`StereoSvf`] - Two-channel TPT state-variable low-pass whose cutoff can be
//!   updated every sample
//! - [`Biquad`] - Direct Form I second-order section
//! - [`BiquadCoefficients`] - RBJ cookbook designs (high-pass, low-pass, shelf, peak)
//!
//! # Parameters
//!
//! - [`ParamDescriptor`] - Range, default, unit and stable id of one parameter
//! - [`ParameterInfo`] - Index-based parameter introspection
//!
//! # Utilities
//!
//! - [`db_to_linear`], [`linear_to_db`], [`flush_denormal`], [`equal_power_gains`]
//! - [`fast_tan`] - Padé approximation used for per-sample coefficient updates
//!
//! # no_std Support
//!
//! Disable the default `std` feature to build for embedded targets:
//!
//! ```toml
//! [dependencies]
//! vintage-core = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod biquad;
pub mod fast_math;
pub mod math;
pub mod param_info;
pub mod svf;

pub use biquad::{Biquad, BiquadCoefficients};
pub use fast_math::fast_tan;
pub use math::{db_to_linear, equal_power_gains, flush_denormal, linear_to_db};
pub use param_info::{ParamDescriptor, ParamFlags, ParamId, ParamScale, ParamUnit, ParameterInfo};
pub use svf::{MAX_CUTOFF_HZ, MAX_RESONANCE, MIN_CUTOFF_HZ, MIN_RESONANCE, StereoSvf};
