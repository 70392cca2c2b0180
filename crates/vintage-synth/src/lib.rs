//! Vintage Synth - Polyphonic synthesis core
//!
//! Everything needed to render polyphonic notes with a detuned-unison,
//! filtered, slightly analog voice. Rendering allocates nothing, takes no
//! locks and does a bounded amount of work per sample.
//!
//! # Components
//!
//! - [`Oscillator`] / [`Waveform`] - PolyBLEP band-limited oscillator
//! - [`UnisonBank`] - Up to seven detuned, panned oscillators mixed to stereo
//! - [`AdsrEnvelope`] - Linear ADSR with exact stage endpoints
//! - [`AnalogCharacter`] / [`soft_clip`] - Saturation, hiss and pitch drift
//! - [`Voice`] - One note: unison → amp envelope → modulated low-pass → analog
//! - [`SynthEngine`] - Fixed voice pool with sample-accurate events
//! - [`ToneCompensation`] - Master-bus tone curve
//!
//! # Parameters
//!
//! [`PatchParams`] holds a plain snapshot of all seventeen parameters.
//! [`SharedParams`] stores the same values as atomics so a control thread can
//! write while the audio thread reads a snapshot once per block.
//!
//! ```rust
//! use vintage_synth::{SharedParams, SynthEngine, SynthParam};
//!
//! let shared = SharedParams::new();
//! shared.set_param(SynthParam::Cutoff, 2500.0);
//!
//! let mut engine: SynthEngine<8> = SynthEngine::new(48000.0);
//! engine.apply_params(&shared.snapshot());
//! engine.note_on(60, 0.9);
//!
//! let mut left = vec![0.0; 256];
//! let mut right = vec![0.0; 256];
//! engine.render_block(&mut left, &mut right);
//! ```
//!
//! # no_std Support
//!
//! Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! vintage-synth = { version = "0.1", default-features = false }
//! ```
//!
//! The optional `tracing` feature emits `debug` events for voice
//! assignment, dropped notes and sample-rate changes.

#![cfg_attr(not(feature = "std"), no_std)]

pub mod analog;
pub mod engine;
pub mod envelope;
pub mod oscillator;
pub mod params;
pub mod tone;
pub mod unison;
pub mod voice;

pub use analog::{AnalogCharacter, MAX_DRIFT, soft_clip};
pub use engine::{DEFAULT_POLYPHONY, NoteEvent, SynthEngine, TimedEvent};
pub use envelope::{AdsrEnvelope, EnvelopeParams, EnvelopeState, MAX_STAGE_SECONDS, MIN_STAGE_SECONDS};
pub use oscillator::{Oscillator, Waveform, poly_blep};
pub use params::{DESCRIPTORS, PARAM_COUNT, PatchParams, SharedParams, SynthParam};
pub use tone::ToneCompensation;
pub use unison::{MAX_DETUNE_CENTS, MAX_UNISON_VOICES, UnisonBank};
pub use voice::{
    FILTER_ENV_RANGE_HZ, SoundKind, VELOCITY_HEADROOM, Voice, VoiceState, midi_to_freq,
    modulated_cutoff,
};

pub use vintage_core::{ParamDescriptor, ParamId, ParameterInfo, StereoSvf};
