//! Fixed-size voice pool with block rendering and sample-accurate events.
//!
//! [`SynthEngine`] is the smallest host that drives [`Voice`]s correctly:
//! it hands each note to the first Free voice, accumulates every voice into
//! a stereo block and runs the master [`ToneCompensation`] stage. There is
//! no note stealing; when the pool is full the note is dropped.

use crate::params::PatchParams;
use crate::tone::ToneCompensation;
use crate::voice::{SoundKind, Voice};

/// Pool size used by the CLI and most tests.
pub const DEFAULT_POLYPHONY: usize = 8;

/// A note event without timing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NoteEvent {
    /// Start a note.
    NoteOn {
        /// MIDI note number.
        note: u8,
        /// Velocity in \[0, 1\].
        velocity: f32,
    },
    /// Release every voice playing `note`.
    NoteOff {
        /// MIDI note number.
        note: u8,
        /// Let the release stage run instead of cutting off.
        allow_tail_off: bool,
    },
    /// Release every voice.
    AllNotesOff {
        /// Let the release stage run instead of cutting off.
        allow_tail_off: bool,
    },
}

/// A [`NoteEvent`] at a sample offset inside the current block.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimedEvent {
    /// Sample index within the block. Offsets past the end apply at the end.
    pub offset: usize,
    /// What happens there.
    pub event: NoteEvent,
}

impl TimedEvent {
    /// Note-on at `offset`.
    pub fn note_on(offset: usize, note: u8, velocity: f32) -> Self {
        Self {
            offset,
            event: NoteEvent::NoteOn { note, velocity },
        }
    }

    /// Note-off with release tail at `offset`.
    pub fn note_off(offset: usize, note: u8) -> Self {
        Self {
            offset,
            event: NoteEvent::NoteOff {
                note,
                allow_tail_off: true,
            },
        }
    }
}

/// Polyphonic engine with `N` pre-allocated voices.
///
/// # Example
///
/// ```rust
/// use vintage_synth::{PatchParams, SynthEngine, TimedEvent, Waveform};
///
/// let mut engine: SynthEngine<8> = SynthEngine::new(48000.0);
/// let mut params = PatchParams::default();
/// params.waveform = Waveform::Saw;
/// engine.apply_params(&params);
///
/// let mut left = [0.0f32; 512];
/// let mut right = [0.0f32; 512];
/// let events = [TimedEvent::note_on(0, 60, 0.8), TimedEvent::note_on(256, 64, 0.8)];
/// engine.render_block_with_events(&mut left, &mut right, &events);
///
/// assert_eq!(engine.active_voice_count(), 2);
/// assert!(left.iter().any(|s| *s != 0.0));
/// ```
#[derive(Debug, Clone)]
pub struct SynthEngine<const N: usize> {
    voices: [Voice; N],
    tone: ToneCompensation,
    sound: SoundKind,
    sample_rate: f32,
}

impl<const N: usize> SynthEngine<N> {
    /// Create an engine with default parameters. Each voice gets its own
    /// noise seed.
    pub fn new(sample_rate: f32) -> Self {
        debug_assert!(sample_rate > 0.0, "sample rate must be positive");
        Self {
            voices: core::array::from_fn(|i| Voice::with_seed(sample_rate, voice_seed(i))),
            tone: ToneCompensation::new(sample_rate),
            sound: SoundKind::Vintage,
            sample_rate,
        }
    }

    /// Propagate a new sample rate to every voice and the tone stage.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        debug_assert!(sample_rate > 0.0, "sample rate must be positive");
        #[cfg(feature = "tracing")]
        tracing::debug!("engine: sample rate {} -> {sample_rate}", self.sample_rate);
        self.sample_rate = sample_rate;
        for voice in &mut self.voices {
            voice.set_sample_rate(sample_rate);
        }
        self.tone.set_sample_rate(sample_rate);
    }

    /// Current sample rate.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Push a parameter snapshot into every voice, Free or Active.
    pub fn apply_params(&mut self, params: &PatchParams) {
        for voice in &mut self.voices {
            voice.apply_params(params);
        }
    }

    /// Enable or bypass the output tone stage.
    pub fn set_tone_enabled(&mut self, enabled: bool) {
        self.tone.set_enabled(enabled);
    }

    /// Whether the output tone stage is applied.
    pub fn tone_enabled(&self) -> bool {
        self.tone.is_enabled()
    }

    /// Start a note on the first Free voice and return its index.
    ///
    /// Returns `None` when every voice is busy; the note is dropped.
    pub fn note_on(&mut self, note: u8, velocity: f32) -> Option<usize> {
        let sound = self.sound;
        let Some(index) = self
            .voices
            .iter()
            .position(|v| v.is_free() && v.can_play(sound))
        else {
            #[cfg(feature = "tracing")]
            tracing::debug!("engine: no free voice for note {note}, dropped");
            return None;
        };

        self.voices[index].start(note, velocity);
        #[cfg(feature = "tracing")]
        tracing::debug!("engine: note {note} -> voice {index}");
        Some(index)
    }

    /// Stop every Active voice playing `note`.
    pub fn note_off(&mut self, note: u8, allow_tail_off: bool) {
        for voice in self.voices.iter_mut().filter(|v| v.note() == Some(note)) {
            voice.stop(0.0, allow_tail_off);
        }
    }

    /// Stop every Active voice.
    pub fn all_notes_off(&mut self, allow_tail_off: bool) {
        for voice in self.voices.iter_mut().filter(|v| v.is_active()) {
            voice.stop(0.0, allow_tail_off);
        }
    }

    /// Free every voice at once and clear the tone stage.
    pub fn reset(&mut self) {
        self.all_notes_off(false);
        self.tone.reset();
    }

    /// Apply one event immediately.
    pub fn handle_event(&mut self, event: NoteEvent) {
        match event {
            NoteEvent::NoteOn { note, velocity } => {
                self.note_on(note, velocity);
            }
            NoteEvent::NoteOff {
                note,
                allow_tail_off,
            } => self.note_off(note, allow_tail_off),
            NoteEvent::AllNotesOff { allow_tail_off } => self.all_notes_off(allow_tail_off),
        }
    }

    /// Render one block, overwriting `left` and `right`.
    ///
    /// Only the first `min(left.len(), right.len())` samples are touched.
    pub fn render_block(&mut self, left: &mut [f32], right: &mut [f32]) {
        self.render_block_with_events(left, right, &[]);
    }

    /// Render one block, applying `events` at their sample offsets.
    ///
    /// Events are expected in offset order. An offset earlier than one
    /// already applied takes effect at that earlier event's position, and
    /// offsets past the block take effect at its end, after the last
    /// sample is rendered.
    pub fn render_block_with_events(
        &mut self,
        left: &mut [f32],
        right: &mut [f32],
        events: &[TimedEvent],
    ) {
        let len = left.len().min(right.len());
        let left = &mut left[..len];
        let right = &mut right[..len];
        left.fill(0.0);
        right.fill(0.0);

        let mut cursor = 0;
        for timed in events {
            let offset = timed.offset.clamp(cursor, len);
            self.render_voices(left, right, cursor, offset - cursor);
            cursor = offset;
            self.handle_event(timed.event);
        }
        self.render_voices(left, right, cursor, len - cursor);

        self.tone.process_block(left, right);
    }

    fn render_voices(&mut self, left: &mut [f32], right: &mut [f32], start: usize, len: usize) {
        if len == 0 {
            return;
        }
        let mut outputs: [&mut [f32]; 2] = [left, right];
        for voice in self.voices.iter_mut().filter(|v| v.is_active()) {
            voice.render_range(&mut outputs, start, len);
        }
    }

    /// Voices currently sounding, release tails included.
    pub fn active_voice_count(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
    }

    /// Pool size.
    pub const fn polyphony(&self) -> usize {
        N
    }

    /// Read access to the pool.
    pub fn voices(&self) -> &[Voice; N] {
        &self.voices
    }
}

impl Default for SynthEngine<DEFAULT_POLYPHONY> {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

/// Distinct non-zero noise seed per pool slot.
fn voice_seed(index: usize) -> u32 {
    0x1234_5678 ^ (index as u32).wrapping_add(1).wrapping_mul(0x9E37_79B9)
}
