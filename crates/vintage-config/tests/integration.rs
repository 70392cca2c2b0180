//! Integration tests for vintage-config.
//!
//! Covers patch files on disk, factory patches driving the engine, and
//! validation of hand-edited files.

use tempfile::TempDir;
use vintage_config::{
    ConfigError, FACTORY_PATCH_NAMES, Patch, ValidationError, factory_patches, find_patch_in,
    get_factory_patch, list_patches_in, patch_name_from_path, validate_patch,
};
use vintage_synth::{PatchParams, SynthEngine, Waveform};

// ---------------------------------------------------------------------------
// Files on disk
// ---------------------------------------------------------------------------

#[test]
fn save_and_load_round_trip() {
    let tmp = TempDir::new().expect("tempdir");
    let path = tmp.path().join("nested").join("dir").join("lead.toml");

    let mut params = PatchParams::default();
    params.waveform = Waveform::Square;
    params.cutoff = 3200.0;
    params.voices = 5;
    params.noise_enable = true;
    let patch = Patch::from_params("Lead", &params).with_description("square lead");

    patch.save(&path).expect("save");
    assert!(path.is_file());

    let loaded = Patch::load(&path).expect("load");
    assert_eq!(loaded, patch);
    assert_eq!(loaded.to_params(), params);
}

#[test]
fn load_missing_file_is_read_error() {
    let tmp = TempDir::new().expect("tempdir");
    let path = tmp.path().join("absent.toml");
    match Patch::load(&path) {
        Err(ConfigError::ReadFile { path: p, .. }) => assert_eq!(p, path),
        other => panic!("expected ReadFile, got {other:?}"),
    }
}

#[test]
fn hand_edited_file_validates_and_clamps() {
    let tmp = TempDir::new().expect("tempdir");
    let path = tmp.path().join("edited.toml");
    std::fs::write(
        &path,
        r#"
name = "Edited"

[params]
cutoff = 50000.0
waveform = "Saw"
"#,
    )
    .expect("write");

    let patch = Patch::load(&path).expect("parses");
    let err = validate_patch(&patch).expect_err("cutoff is out of range");
    assert!(matches!(err, ValidationError::OutOfRange { ref param, .. } if param == "cutoff"));

    let params = patch.to_params();
    assert_eq!(params.cutoff, 20000.0);
    assert_eq!(params.waveform, Waveform::Saw);
}

#[test]
fn directory_listing_and_lookup() {
    let tmp = TempDir::new().expect("tempdir");
    for name in ["pad", "bass"] {
        Patch::new(name)
            .save(tmp.path().join(format!("{name}.toml")))
            .expect("save");
    }

    let names: Vec<String> = list_patches_in(tmp.path())
        .iter()
        .filter_map(|p| patch_name_from_path(p))
        .collect();
    assert_eq!(names, vec!["bass", "pad"]);

    let found = find_patch_in("pad", tmp.path()).expect("found");
    assert_eq!(Patch::load(found).expect("load").name, "pad");
}

// ---------------------------------------------------------------------------
// Factory patches through the engine
// ---------------------------------------------------------------------------

#[test]
fn every_factory_patch_is_valid() {
    let patches = factory_patches();
    assert_eq!(patches.len(), FACTORY_PATCH_NAMES.len());
    for patch in &patches {
        assert_eq!(validate_patch(patch), Ok(()), "{}", patch.name);
    }
}

#[test]
fn every_factory_patch_renders_bounded_audio() {
    for name in FACTORY_PATCH_NAMES {
        let patch = get_factory_patch(name).expect("factory patch");
        let mut engine: SynthEngine<8> = SynthEngine::new(patch.sample_rate as f32);
        engine.apply_params(&patch.to_params());

        for note in [48, 52, 55, 60] {
            assert!(engine.note_on(note, 1.0).is_some());
        }

        let mut left = vec![0.0f32; 512];
        let mut right = vec![0.0f32; 512];
        let mut peak = 0.0f32;
        for _ in 0..40 {
            engine.render_block(&mut left, &mut right);
            for s in left.iter().chain(right.iter()) {
                assert!(s.is_finite(), "{name}: non-finite sample");
                peak = peak.max(s.abs());
            }
        }

        assert!(peak > 1e-3, "{name}: silent, peak {peak}");
        assert!(peak < 2.0, "{name}: peak {peak}");
    }
}

#[test]
fn factory_patch_copied_to_user_file() {
    let tmp = TempDir::new().expect("tempdir");
    let source = get_factory_patch("warm_pad").expect("factory patch");
    let path = tmp.path().join("my_pad.toml");

    let mut copy = source.clone();
    copy.name = "My Pad".to_string();
    copy.save(&path).expect("save");

    let loaded = Patch::load(&path).expect("load");
    assert_eq!(loaded.name, "My Pad");
    assert_eq!(loaded.params, source.params);
}
