//! Patch validation against the synth parameter table.
//!
//! Loading a patch never fails on range: the engine clamps whatever it is
//! given. Validation exists so tools can tell the user what a file gets
//! wrong before it is silently clamped.
//!
//! # Example
//!
//! ```rust
//! use vintage_config::{Patch, ValidationError, validate_patch};
//!
//! let mut patch = Patch::new("Too Bright");
//! patch.params.cutoff = 40_000.0;
//!
//! let err = validate_patch(&patch).unwrap_err();
//! assert!(matches!(err, ValidationError::OutOfRange { ref param, .. } if param == "cutoff"));
//! ```

use thiserror::Error;
use vintage_synth::SynthParam;

use crate::patch::Patch;

/// Lowest accepted sample-rate hint.
pub const MIN_SAMPLE_RATE: u32 = 8000;
/// Highest accepted sample-rate hint.
pub const MAX_SAMPLE_RATE: u32 = 384_000;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Parameter value out of range.
    #[error("parameter '{param}' value {value} out of range [{min}, {max}]")]
    OutOfRange {
        /// Parameter string id.
        param: String,
        /// The value that was out of range.
        value: f32,
        /// Minimum allowed value.
        min: f32,
        /// Maximum allowed value.
        max: f32,
    },

    /// Waveform name not recognized.
    #[error("unknown waveform: {0}")]
    UnknownWaveform(String),

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Check a single value against the descriptor of `param`.
pub fn validate_param(param: SynthParam, value: f32) -> ValidationResult<()> {
    let desc = param.descriptor();
    if desc.contains(value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            param: desc.string_id.to_string(),
            value,
            min: desc.min,
            max: desc.max,
        })
    }
}

/// Collect every problem in a patch.
///
/// A single problem is returned as itself; several come back as
/// [`ValidationError::Multiple`] in parameter-table order, with the sample
/// rate last.
pub fn validate_patch(patch: &Patch) -> ValidationResult<()> {
    let mut errors = Vec::new();

    for param in SynthParam::ALL {
        match patch.params.value(param) {
            Some(value) => {
                if let Err(e) = validate_param(param, value) {
                    errors.push(e);
                }
            }
            None => errors.push(ValidationError::UnknownWaveform(
                patch.params.waveform.clone(),
            )),
        }
    }

    if !(MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&patch.sample_rate) {
        errors.push(ValidationError::OutOfRange {
            param: "sample_rate".to_string(),
            value: patch.sample_rate as f32,
            min: MIN_SAMPLE_RATE as f32,
            max: MAX_SAMPLE_RATE as f32,
        });
    }

    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}
