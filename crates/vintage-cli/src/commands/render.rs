//! Offline rendering of a note sequence to WAV.

use anyhow::{Context, bail};
use clap::{Args, ValueEnum};
use std::path::{Path, PathBuf};
use vintage_config::validation::{MAX_SAMPLE_RATE, MIN_SAMPLE_RATE};
use vintage_config::{Patch, resolve_patch, validate_patch};
use vintage_synth::{NoteEvent, PatchParams, SynthEngine, SynthParam, TimedEvent, Waveform, midi_to_freq};

/// Waveform types for CLI
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum CliWaveform {
    Sine,
    Saw,
    Square,
    Triangle,
}

impl From<CliWaveform> for Waveform {
    fn from(w: CliWaveform) -> Self {
        match w {
            CliWaveform::Sine => Waveform::Sine,
            CliWaveform::Saw => Waveform::Saw,
            CliWaveform::Square => Waveform::Square,
            CliWaveform::Triangle => Waveform::Triangle,
        }
    }
}

#[derive(Args)]
pub struct RenderArgs {
    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Factory patch name, user patch name or path to a patch file
    #[arg(short, long)]
    patch: Option<String>,

    /// MIDI notes (comma-separated, e.g., "60,64,67" for C major)
    #[arg(long, default_value = "60,64,67")]
    notes: String,

    /// Note velocity (0-1)
    #[arg(long, default_value = "0.8")]
    velocity: f32,

    /// Seconds each note is held before release
    #[arg(long, default_value = "1.0")]
    hold: f32,

    /// Seconds rendered after the last note-off
    #[arg(long, default_value = "1.0")]
    tail: f32,

    /// Sample rate (defaults to the patch's sample rate)
    #[arg(long)]
    sample_rate: Option<u32>,

    /// Samples per processing block
    #[arg(long, default_value = "512")]
    block_size: usize,

    /// Seconds between successive note onsets (0 plays a chord)
    #[arg(long, default_value = "0.0")]
    arpeggio: f32,

    /// Bypass the output tone stage
    #[arg(long)]
    no_tone: bool,

    /// Override the patch waveform
    #[arg(long, value_enum)]
    waveform: Option<CliWaveform>,

    /// Override the unison voice count (1-7)
    #[arg(long)]
    voices: Option<u32>,
}

pub fn run(args: RenderArgs) -> anyhow::Result<()> {
    let notes = parse_notes(&args.notes)?;

    if !(0.0..=1.0).contains(&args.velocity) {
        bail!("velocity must be between 0 and 1, got {}", args.velocity);
    }
    if args.hold < 0.0 || args.tail < 0.0 || args.arpeggio < 0.0 {
        bail!("--hold, --tail and --arpeggio must not be negative");
    }
    if args.block_size == 0 {
        bail!("--block-size must be at least 1");
    }

    let patch = match &args.patch {
        Some(name) => resolve_patch(name).with_context(|| format!("loading patch '{name}'"))?,
        None => Patch::new("Default"),
    };
    if let Err(e) = validate_patch(&patch) {
        tracing::warn!(patch = %patch.name, "{e}; out-of-range values will be clamped");
    }

    let sample_rate = args.sample_rate.unwrap_or(patch.sample_rate);
    if !(MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&sample_rate) {
        bail!("sample rate must be between {MIN_SAMPLE_RATE} and {MAX_SAMPLE_RATE} Hz, got {sample_rate}");
    }

    let mut params = patch.to_params();
    if let Some(waveform) = args.waveform {
        params.waveform = waveform.into();
    }
    if let Some(voices) = args.voices {
        params.set(SynthParam::Voices, voices as f32);
    }

    let mut engine: SynthEngine<8> = SynthEngine::new(sample_rate as f32);
    engine.apply_params(&params);
    engine.set_tone_enabled(!args.no_tone);

    if notes.len() > engine.polyphony() {
        tracing::warn!(
            notes = notes.len(),
            polyphony = engine.polyphony(),
            "more simultaneous notes than voices; extra notes are dropped unless arpeggiated"
        );
    }

    log_config(&patch, &params, &notes, sample_rate);

    let sr = sample_rate as f32;
    let schedule = build_schedule(
        &notes,
        args.velocity,
        seconds_to_samples(args.hold, sr),
        seconds_to_samples(args.arpeggio, sr),
    );
    let last_event = schedule.last().map_or(0, |e| e.offset);
    let total = last_event + seconds_to_samples(args.tail, sr);

    let (left, right) = render_schedule(&mut engine, &schedule, total, args.block_size);
    write_stereo_wav(&args.output, &left, &right, sample_rate)?;

    let peak = left
        .iter()
        .chain(right.iter())
        .fold(0.0f32, |acc, s| acc.max(s.abs()));
    let peak_db = peak_dbfs(peak);

    tracing::info!(
        samples = total,
        seconds = total as f32 / sr,
        peak_dbfs = peak_db,
        "render complete"
    );
    println!(
        "Wrote {} frames ({:.2}s) to {}, peak {:.1} dBFS",
        total,
        total as f32 / sr,
        args.output.display(),
        peak_db
    );

    Ok(())
}

fn log_config(patch: &Patch, params: &PatchParams, notes: &[u8], sample_rate: u32) {
    let freqs: Vec<String> = notes
        .iter()
        .map(|&n| format!("{:.1}", midi_to_freq(n)))
        .collect();
    tracing::info!(
        patch = %patch.name,
        sample_rate,
        waveform = params.waveform.name(),
        voices = params.voices,
        cutoff = params.cutoff,
        "rendering notes {:?} ({} Hz)",
        notes,
        freqs.join(", ")
    );
}

/// Parse a comma-separated list of MIDI note numbers.
fn parse_notes(spec: &str) -> anyhow::Result<Vec<u8>> {
    let mut notes = Vec::new();
    for part in spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let note: u8 = part
            .parse()
            .with_context(|| format!("invalid MIDI note '{part}'"))?;
        if note > 127 {
            bail!("MIDI note {note} out of range 0-127");
        }
        notes.push(note);
    }

    if notes.is_empty() {
        bail!("No valid MIDI notes provided. Use format: --notes \"60,64,67\"");
    }
    Ok(notes)
}

fn seconds_to_samples(seconds: f32, sample_rate: f32) -> usize {
    (seconds * sample_rate).round() as usize
}

/// Note-on and tail-off note-off events at absolute sample positions.
///
/// Note `i` starts at `i * stagger` and is held for `hold` samples. At equal
/// positions note-offs come first so a repeated note retriggers cleanly.
fn build_schedule(notes: &[u8], velocity: f32, hold: usize, stagger: usize) -> Vec<TimedEvent> {
    let mut events = Vec::with_capacity(notes.len() * 2);
    for (i, &note) in notes.iter().enumerate() {
        let start = i * stagger;
        events.push(TimedEvent::note_on(start, note, velocity));
        events.push(TimedEvent::note_off(start + hold, note));
    }
    events.sort_by_key(|e| (e.offset, matches!(e.event, NoteEvent::NoteOn { .. })));
    events
}

/// Render `total` frames in blocks of `block_size`, delivering each event
/// inside the block that contains it.
fn render_schedule<const N: usize>(
    engine: &mut SynthEngine<N>,
    schedule: &[TimedEvent],
    total: usize,
    block_size: usize,
) -> (Vec<f32>, Vec<f32>) {
    let mut left = vec![0.0f32; total];
    let mut right = vec![0.0f32; total];
    let mut block_events = Vec::new();
    let mut next = 0;

    for start in (0..total).step_by(block_size) {
        let end = (start + block_size).min(total);

        block_events.clear();
        while let Some(timed) = schedule.get(next)
            && timed.offset < end
        {
            block_events.push(TimedEvent {
                offset: timed.offset - start,
                event: timed.event,
            });
            next += 1;
        }

        engine.render_block_with_events(&mut left[start..end], &mut right[start..end], &block_events);
    }

    (left, right)
}

fn write_stereo_wav(path: &Path, left: &[f32], right: &[f32], sample_rate: u32) -> anyhow::Result<()> {
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("creating {}", path.display()))?;
    for (&l, &r) in left.iter().zip(right.iter()) {
        writer.write_sample(l)?;
        writer.write_sample(r)?;
    }
    writer.finalize()?;
    Ok(())
}

fn peak_dbfs(peak: f32) -> f32 {
    if peak > 0.0 {
        20.0 * peak.log10()
    } else {
        f32::NEG_INFINITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_notes_accepts_spaces() {
        assert_eq!(parse_notes("60, 64,67").unwrap(), vec![60, 64, 67]);
        assert_eq!(parse_notes("0,127,").unwrap(), vec![0, 127]);
    }

    #[test]
    fn parse_notes_rejects_bad_input() {
        assert!(parse_notes("").is_err());
        assert!(parse_notes("60,x").is_err());
        assert!(parse_notes("128").is_err());
        assert!(parse_notes("-1").is_err());
    }

    #[test]
    fn schedule_orders_offs_before_ons() {
        let schedule = build_schedule(&[60, 60], 1.0, 100, 100);
        let offsets: Vec<usize> = schedule.iter().map(|e| e.offset).collect();
        assert_eq!(offsets, vec![0, 100, 100, 200]);
        assert!(matches!(schedule[1].event, NoteEvent::NoteOff { note: 60, allow_tail_off: true }));
        assert!(matches!(schedule[2].event, NoteEvent::NoteOn { note: 60, .. }));
    }

    #[test]
    fn chord_schedule_starts_together() {
        let schedule = build_schedule(&[60, 64, 67], 0.5, 480, 0);
        assert_eq!(schedule.len(), 6);
        assert!(schedule[..3].iter().all(|e| e.offset == 0));
        assert!(schedule[3..].iter().all(|e| e.offset == 480));
    }

    #[test]
    fn block_size_does_not_change_output() {
        let schedule = build_schedule(&[57, 60, 64], 0.8, 3000, 700);
        let render = |block| {
            let mut engine: SynthEngine<8> = SynthEngine::new(48000.0);
            let mut params = PatchParams::default();
            params.waveform = Waveform::Saw;
            params.release = 0.05;
            engine.apply_params(&params);
            render_schedule(&mut engine, &schedule, 12_000, block)
        };

        let (l_ref, r_ref) = render(1);
        for block in [37, 512, 12_000] {
            let (l, r) = render(block);
            for (a, b) in l_ref.iter().zip(&l).chain(r_ref.iter().zip(&r)) {
                assert!((a - b).abs() < 1e-4, "block {block}: {a} vs {b}");
            }
        }
    }

    #[test]
    fn render_releases_every_voice() {
        let mut engine: SynthEngine<8> = SynthEngine::new(48000.0);
        let mut params = PatchParams::default();
        params.release = 0.05;
        engine.apply_params(&params);
        let schedule = build_schedule(&[60, 64], 1.0, 4800, 0);
        let (left, _) = render_schedule(&mut engine, &schedule, 4800 + 9600, 256);
        assert_eq!(engine.active_voice_count(), 0);
        assert!(left[..4800].iter().any(|s| s.abs() > 1e-3));
    }

    #[test]
    fn peak_dbfs_values() {
        assert!(peak_dbfs(1.0).abs() < 1e-6);
        assert!((peak_dbfs(0.5) + 6.0206).abs() < 1e-3);
        assert_eq!(peak_dbfs(0.0), f32::NEG_INFINITY);
    }
}
