//! Integration tests for vintage-synth.
//!
//! End-to-end behaviour of oscillators, unison, voices and the engine as a
//! host would observe it: rendered sample values and voice lifecycle.

use vintage_synth::{
    AdsrEnvelope, EnvelopeParams, EnvelopeState, NoteEvent, Oscillator, PatchParams,
    SharedParams, SynthEngine, SynthParam, TimedEvent, UnisonBank, VELOCITY_HEADROOM, Voice,
    Waveform, midi_to_freq,
};

const SR: f32 = 48000.0;

/// Single-bin DFT magnitude, scaled so a unit sine reads 1.0.
fn bin_magnitude(signal: &[f32], freq: f32) -> f64 {
    let w = 2.0 * std::f64::consts::PI * f64::from(freq) / f64::from(SR);
    let (re, im) = signal.iter().enumerate().fold((0.0, 0.0), |(re, im), (i, &s)| {
        let phase = w * i as f64;
        (re + f64::from(s) * phase.cos(), im + f64::from(s) * phase.sin())
    });
    2.0 * re.hypot(im) / signal.len() as f64
}

fn energy(signal: &[f32]) -> f64 {
    signal.iter().map(|s| f64::from(*s) * f64::from(*s)).sum()
}

/// Energy of the first difference, a rough brightness measure.
fn diff_energy(signal: &[f32]) -> f64 {
    signal
        .windows(2)
        .map(|w| f64::from(w[1] - w[0]) * f64::from(w[1] - w[0]))
        .sum()
}

fn quiet_params() -> PatchParams {
    PatchParams {
        attack: 0.01,
        decay: 0.1,
        sustain: 0.8,
        release: 0.1,
        filter_env_amount: 0.0,
        noise_enable: false,
        ..PatchParams::default()
    }
}

fn render_voice(voice: &mut Voice, samples: usize) -> (Vec<f32>, Vec<f32>) {
    let mut left = vec![0.0; samples];
    let mut right = vec![0.0; samples];
    voice.render_range(&mut [&mut left[..], &mut right[..]], 0, samples);
    (left, right)
}

// ---------------------------------------------------------------------------
// 1. Oscillator
// ---------------------------------------------------------------------------

#[test]
fn polyblep_saw_suppresses_aliases() {
    let mut osc = Oscillator::new();
    osc.set_waveform(Waveform::Saw);
    osc.set_frequency(5000.0, SR);
    let signal: Vec<f32> = (0..48000).map(|_| osc.next_sample()).collect();

    // The 9th harmonic (45 kHz) folds to 3 kHz; a naive saw puts ~0.075 there.
    assert!(bin_magnitude(&signal, 5000.0) > 0.5);
    assert!(bin_magnitude(&signal, 3000.0) < 0.01);
    assert!(bin_magnitude(&signal, 8000.0) < 0.02);
}

#[test]
fn oscillator_pitch_matches_zero_crossings() {
    for waveform in [Waveform::Sine, Waveform::Saw, Waveform::Square, Waveform::Triangle] {
        let mut osc = Oscillator::new();
        osc.set_waveform(waveform);
        osc.set_frequency(440.0, SR);
        let signal: Vec<f32> = (0..48000).map(|_| osc.next_sample()).collect();
        let rising = signal.windows(2).filter(|w| w[0] < 0.0 && w[1] >= 0.0).count();
        assert!(
            (439..=441).contains(&rising),
            "{waveform:?}: {rising} rising crossings in one second"
        );
    }
}

#[test]
fn oscillator_reset_restarts_waveform() {
    let mut osc = Oscillator::new();
    osc.set_waveform(Waveform::Triangle);
    osc.set_frequency(261.0, SR);
    let first: Vec<f32> = (0..64).map(|_| osc.next_sample()).collect();
    for _ in 0..1000 {
        osc.next_sample();
    }
    osc.reset();
    let again: Vec<f32> = (0..64).map(|_| osc.next_sample()).collect();
    assert_eq!(first, again);
}

// ---------------------------------------------------------------------------
// 2. Unison bank
// ---------------------------------------------------------------------------

#[test]
fn unison_loudness_is_stable_across_voice_counts() {
    let stereo_energy = |count: usize| {
        let mut bank = UnisonBank::new();
        bank.set_waveform(Waveform::Saw);
        bank.set_voice_count(count);
        bank.set_detune_amount(1.0);
        bank.set_stereo_width(0.5);
        bank.set_frequency(440.0, SR);
        (0..48000)
            .map(|_| {
                let (l, r) = bank.next_stereo_sample();
                f64::from(l * l + r * r)
            })
            .sum::<f64>()
    };

    let single = stereo_energy(1);
    for count in 2..=7 {
        let ratio = stereo_energy(count) / single;
        assert!(
            (0.6..1.6).contains(&ratio),
            "{count} voices: energy ratio {ratio}"
        );
    }
}

#[test]
fn unison_zero_width_is_centered() {
    let mut bank = UnisonBank::new();
    bank.set_waveform(Waveform::Saw);
    bank.set_voice_count(5);
    bank.set_detune_amount(0.7);
    bank.set_stereo_width(0.0);
    bank.set_frequency(220.0, SR);
    for _ in 0..4800 {
        let (l, r) = bank.next_stereo_sample();
        assert!((l - r).abs() < 1e-5);
    }
}

#[test]
fn unison_full_width_spreads_outer_voices() {
    let mut bank = UnisonBank::new();
    bank.set_voice_count(3);
    bank.set_stereo_width(1.0);
    assert_eq!(bank.pan(0), Some(-1.0));
    assert_eq!(bank.pan(1), Some(0.0));
    assert_eq!(bank.pan(2), Some(1.0));
    assert_eq!(bank.pan(3), None);
}

#[test]
fn unison_detune_is_symmetric_in_cents() {
    let mut bank = UnisonBank::new();
    bank.set_voice_count(5);
    bank.set_detune_amount(1.0);
    bank.set_frequency(440.0, SR);
    let cents: Vec<f32> = (0..5).map(|i| bank.detune_cents(i)).collect();
    assert_eq!(cents, vec![-30.0, -15.0, 0.0, 15.0, 30.0]);
    let low = bank.sub_frequency(0).unwrap_or_default();
    let expected = 440.0 * 2f32.powf(-30.0 / 1200.0);
    assert!((low - expected).abs() < 0.01);
}

// ---------------------------------------------------------------------------
// 3. Envelope timing
// ---------------------------------------------------------------------------

#[test]
fn envelope_full_cycle_timing() {
    let mut env = AdsrEnvelope::new(SR);
    env.set_params(EnvelopeParams {
        attack: 0.02,
        decay: 0.03,
        sustain: 0.5,
        release: 0.04,
    });
    env.note_on();

    let mut peak_at = None;
    for i in 1..=2400 {
        let v = env.next_sample();
        if v == 1.0 && peak_at.is_none() {
            peak_at = Some(i);
        }
    }
    assert_eq!(peak_at, Some(960));
    assert_eq!(env.state(), EnvelopeState::Sustain);
    assert_eq!(env.level(), 0.5);

    env.note_off();
    let mut idle_at = None;
    for i in 1..=4000 {
        env.next_sample();
        if !env.is_active() && idle_at.is_none() {
            idle_at = Some(i);
        }
    }
    assert_eq!(idle_at, Some(1920));
}

// ---------------------------------------------------------------------------
// 4. Voice lifecycle and rendering
// ---------------------------------------------------------------------------

#[test]
fn free_voice_renders_nothing() {
    let mut voice = Voice::new(SR);
    let mut left = vec![0.25; 128];
    let mut right = vec![-0.25; 128];
    voice.render_range(&mut [&mut left[..], &mut right[..]], 0, 128);
    assert!(left.iter().all(|s| *s == 0.25));
    assert!(right.iter().all(|s| *s == -0.25));
}

#[test]
fn voice_accumulates_into_buffer() {
    let mut voice = Voice::new(SR);
    voice.apply_params(&quiet_params());
    voice.start(60, 0.9);
    let mut twin = voice.clone();
    let mut third = voice.clone();

    let (alone, _) = render_voice(&mut voice, 1024);

    let mut left = vec![0.0; 1024];
    let mut right = vec![0.0; 1024];
    twin.render_range(&mut [&mut left[..], &mut right[..]], 0, 1024);
    third.render_range(&mut [&mut left[..], &mut right[..]], 0, 1024);

    for (sum, single) in left.iter().zip(&alone) {
        assert_eq!(*sum, single * 2.0);
    }
}

#[test]
fn voice_renders_only_requested_range() {
    let mut voice = Voice::new(SR);
    voice.apply_params(&quiet_params());
    voice.start(64, 1.0);
    let mut left = vec![0.0; 512];
    let mut right = vec![0.0; 512];
    voice.render_range(&mut [&mut left[..], &mut right[..]], 128, 256);
    assert!(left[..128].iter().all(|s| *s == 0.0));
    assert!(left[128..384].iter().any(|s| *s != 0.0));
    assert!(left[384..].iter().all(|s| *s == 0.0));
}

#[test]
fn voice_output_is_bounded() {
    let mut params = quiet_params();
    params.waveform = Waveform::Square;
    params.resonance = 10.0;
    params.filter_env_amount = 100.0;
    params.noise_enable = true;
    params.noise_level = 100.0;
    params.voices = 7;

    let mut voice = Voice::new(SR);
    voice.apply_params(&params);
    voice.start(36, 1.0);
    let (left, right) = render_voice(&mut voice, 96_000);

    // Soft clip peaks at 0.8 and full-level noise adds at most 0.03.
    for s in left.iter().chain(&right) {
        assert!(s.is_finite());
        assert!(s.abs() <= 0.8301, "sample {s} out of bounds");
    }
}

#[test]
fn note_start_is_click_free() {
    let mut voice = Voice::new(SR);
    voice.apply_params(&quiet_params());
    voice.start(69, 1.0);
    let (left, right) = render_voice(&mut voice, 8);
    // Attack starts from zero, so the first samples are tiny.
    assert!(left[0].abs() < 0.01);
    assert!(right[0].abs() < 0.01);
}

#[test]
fn release_tail_decays_then_frees_voice() {
    let mut voice = Voice::new(SR);
    voice.apply_params(&quiet_params());
    voice.start(57, 1.0);
    render_voice(&mut voice, 9600);

    voice.stop(0.0, true);
    assert!(voice.is_active());
    assert!(voice.is_releasing());

    let release = (0.1 * SR) as usize;
    let (tail, _) = render_voice(&mut voice, release - 1);
    assert!(voice.is_active());
    let early = energy(&tail[..480]);
    let late = energy(&tail[tail.len() - 480..]);
    assert!(late < early * 0.1, "release should fade: {early} -> {late}");

    render_voice(&mut voice, 1);
    assert!(voice.is_free());
    assert_eq!(voice.note(), None);
}

#[test]
fn immediate_stop_silences_at_once() {
    let mut voice = Voice::new(SR);
    voice.apply_params(&quiet_params());
    voice.start(60, 1.0);
    render_voice(&mut voice, 1000);
    voice.stop(0.0, false);
    assert!(voice.is_free());
    let (left, right) = render_voice(&mut voice, 256);
    assert!(left.iter().chain(&right).all(|s| *s == 0.0));
}

#[test]
fn velocity_scales_level() {
    let mut voice = Voice::new(SR);
    voice.start(60, 0.5);
    assert_eq!(voice.level(), 0.5 * VELOCITY_HEADROOM);
    assert_eq!(voice.current_frequency(), midi_to_freq(60));
}

#[test]
fn cutoff_controls_brightness() {
    let brightness = |cutoff: f32| {
        let mut params = quiet_params();
        params.waveform = Waveform::Saw;
        params.cutoff = cutoff;
        params.resonance = 0.7;
        let mut voice = Voice::new(SR);
        voice.apply_params(&params);
        voice.start(48, 0.8);
        render_voice(&mut voice, 4800);
        let (left, _) = render_voice(&mut voice, 9600);
        diff_energy(&left) / energy(&left)
    };
    let dark = brightness(200.0);
    let bright = brightness(8000.0);
    assert!(bright > dark * 10.0, "dark {dark}, bright {bright}");
}

#[test]
fn filter_envelope_opens_cutoff() {
    let mut params = quiet_params();
    params.cutoff = 500.0;
    params.filter_env_amount = 100.0;
    params.filter_attack = 0.01;
    params.filter_decay = 5.0;
    params.filter_sustain = 1.0;

    let mut voice = Voice::new(SR);
    voice.apply_params(&params);
    voice.start(60, 1.0);
    render_voice(&mut voice, 480);
    assert_eq!(voice.filter().cutoff(), 5500.0);
}

#[test]
fn parameter_changes_are_safe_mid_note() {
    let mut voice = Voice::new(SR);
    voice.apply_params(&quiet_params());
    voice.start(60, 1.0);
    render_voice(&mut voice, 2048);

    let mut params = quiet_params();
    params.waveform = Waveform::Triangle;
    params.voices = 7;
    params.detune = 100.0;
    params.cutoff = 12_000.0;
    voice.apply_params(&params);

    let (left, _) = render_voice(&mut voice, 2048);
    assert!(voice.is_active());
    assert!(left.iter().all(|s| s.is_finite()));
    assert_eq!(voice.unison().voice_count(), 7);
}

// ---------------------------------------------------------------------------
// 5. Engine
// ---------------------------------------------------------------------------

#[test]
fn chord_uses_one_voice_per_note() {
    let mut engine: SynthEngine<8> = SynthEngine::new(SR);
    engine.apply_params(&quiet_params());
    for note in [60, 64, 67] {
        assert!(engine.note_on(note, 0.8).is_some());
    }
    let mut left = vec![0.0; 1024];
    let mut right = vec![0.0; 1024];
    engine.render_block(&mut left, &mut right);
    assert_eq!(engine.active_voice_count(), 3);
    assert!(energy(&left) > 0.0);
}

#[test]
fn event_sequence_over_several_blocks() {
    let mut engine: SynthEngine<4> = SynthEngine::new(SR);
    engine.set_tone_enabled(false);
    engine.apply_params(&quiet_params());
    let mut left = vec![0.0; 512];
    let mut right = vec![0.0; 512];

    engine.render_block_with_events(
        &mut left,
        &mut right,
        &[TimedEvent::note_on(0, 60, 0.8), TimedEvent::note_on(256, 67, 0.8)],
    );
    assert_eq!(engine.active_voice_count(), 2);

    engine.render_block_with_events(&mut left, &mut right, &[TimedEvent::note_off(0, 60)]);
    assert_eq!(engine.active_voice_count(), 2, "note 60 is in its release tail");

    for _ in 0..10 {
        engine.render_block(&mut left, &mut right);
    }
    assert_eq!(engine.active_voice_count(), 1);

    engine.render_block_with_events(
        &mut left,
        &mut right,
        &[TimedEvent {
            offset: 100,
            event: NoteEvent::AllNotesOff {
                allow_tail_off: false,
            },
        }],
    );
    assert_eq!(engine.active_voice_count(), 0);
    assert!(left[100..].iter().all(|s| *s == 0.0));
}

#[test]
fn tone_bypass_changes_output() {
    let render = |tone: bool| {
        let mut engine: SynthEngine<2> = SynthEngine::new(SR);
        engine.set_tone_enabled(tone);
        engine.apply_params(&quiet_params());
        engine.note_on(45, 1.0);
        let mut left = vec![0.0; 2048];
        let mut right = vec![0.0; 2048];
        engine.render_block(&mut left, &mut right);
        left
    };
    assert_ne!(render(true), render(false));
}

#[test]
fn shared_params_reach_engine_from_control_thread() {
    let shared = std::sync::Arc::new(SharedParams::new());
    let control = std::sync::Arc::clone(&shared);
    std::thread::spawn(move || {
        control.set_param(SynthParam::Waveform, 2.0);
        control.set_param(SynthParam::Voices, 5.0);
    })
    .join()
    .expect("control thread panicked");

    let mut engine: SynthEngine<2> = SynthEngine::new(SR);
    engine.apply_params(&shared.snapshot());
    let voice = &engine.voices()[0];
    assert_eq!(voice.unison().waveform(), Waveform::Square);
    assert_eq!(voice.unison().voice_count(), 5);
}
