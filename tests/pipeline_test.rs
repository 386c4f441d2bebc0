//! End-to-end tests through TrainerContext
//!
//! WAV files are synthesized with hound into a temp directory, registered as
//! references, extracted, widened and finally used to score candidates.

use std::path::{Path, PathBuf};

use phoneme_trainer::analysis::ScoringMode;
use phoneme_trainer::error::{AnalysisError, StoreError, TrainerError};
use phoneme_trainer::reference::ProfileState;
use phoneme_trainer::{AppConfig, TrainerContext};

const FILE_RATE: u32 = 44_100;

fn write_sine_wav(path: &Path, frequency: f32, amplitude: f32, seconds: f32, channels: u16) {
    let spec = hound::WavSpec {
        channels,
        sample_rate: FILE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    let frames = (FILE_RATE as f32 * seconds) as usize;
    for i in 0..frames {
        let t = i as f32 / FILE_RATE as f32;
        let value = amplitude * (2.0 * std::f32::consts::PI * frequency * t).sin();
        let sample = (value * i16::MAX as f32) as i16;
        for _ in 0..channels {
            writer.write_sample(sample).unwrap();
        }
    }
    writer.finalize().unwrap();
}

fn context(data_dir: &Path) -> TrainerContext {
    let mut config = AppConfig::default();
    config.store.data_dir = data_dir.to_path_buf();
    TrainerContext::new(config).unwrap()
}

fn audio_dir(root: &Path) -> PathBuf {
    let dir = root.join("reference_audio");
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_configure_and_score_reference() {
    let root = tempfile::tempdir().unwrap();
    let audio = audio_dir(root.path());
    let reference_wav = audio.join("a.wav");
    write_sine_wav(&reference_wav, 220.0, 0.4, 0.5, 2);

    let ctx = context(&root.path().join("configurations"));
    assert!(!ctx.is_configured().unwrap());

    let profile = ctx
        .register_reference("en", "a", None, reference_wav.to_str().unwrap())
        .unwrap();
    let extracted = ctx.extract_reference_features(&profile.id).await.unwrap();
    assert_eq!(extracted.state(), ProfileState::FeaturesExtracted);

    let features = extracted.features.unwrap();
    assert!((features.duration_range.0 - 0.4).abs() < 1e-3);
    assert!((features.duration_range.1 - 0.6).abs() < 1e-3);
    assert!(features.rms > 0.2 && features.rms < 0.35, "rms {}", features.rms);
    assert!(ctx.is_configured().unwrap());

    let widened = ctx.apply_reference_tolerance(&profile.id, 20.0).unwrap();
    assert_eq!(widened.state(), ProfileState::RangesApplied);

    // Same recording scores close to the reference; an octave-jumped,
    // quieter one scores lower
    let same = ctx
        .analyze_file(&reference_wav, Some(&profile.id))
        .await
        .unwrap();
    let other_wav = audio.join("other.wav");
    write_sine_wav(&other_wav, 1760.0, 0.1, 0.5, 1);
    let other = ctx
        .analyze_file(&other_wav, Some(&profile.id))
        .await
        .unwrap();

    println!("same {} / other {}", same.similarity_score, other.similarity_score);
    assert!(same.similarity_score > 90.0);
    assert!(other.similarity_score < same.similarity_score);
    assert_eq!(
        same.mode,
        ScoringMode::ReferenceRelative {
            reference_id: profile.id.clone()
        }
    );
    assert!((same.report.fundamental_hz - 220.0).abs() <= 11.0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_profiles_survive_restart() {
    let root = tempfile::tempdir().unwrap();
    let audio = audio_dir(root.path());
    let wav = audio.join("s.wav");
    write_sine_wav(&wav, 330.0, 0.3, 0.3, 1);
    let data_dir = root.path().join("configurations");

    let saved = {
        let ctx = context(&data_dir);
        let profile = ctx
            .register_reference("es", "s", Some("voiceless alveolar".into()), wav.to_str().unwrap())
            .unwrap();
        ctx.extract_reference_features(&profile.id).await.unwrap();
        ctx.apply_reference_tolerance(&profile.id, 5.0).unwrap()
    };

    let ctx = context(&data_dir);
    assert_eq!(ctx.get_reference(&saved.id).unwrap(), Some(saved.clone()));
    assert_eq!(ctx.list_references().unwrap().len(), 1);
    assert!(ctx.is_configured().unwrap());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_target_scoring_without_reference() {
    let root = tempfile::tempdir().unwrap();
    let ctx = context(&root.path().join("configurations"));

    let samples: Vec<f32> = (0..22_050)
        .map(|i| 0.7 * (2.0 * std::f32::consts::PI * 200.0 * i as f32 / 22_050.0).sin())
        .collect();
    let outcome = ctx.analyze_samples(samples, 22_050, None).await.unwrap();

    assert_eq!(outcome.mode, ScoringMode::TargetRelative);
    assert!((0.0..=100.0).contains(&outcome.similarity_score));
    assert_eq!(
        outcome.similarity_score,
        ctx.score_against_target(&outcome.report)
    );
    assert_eq!(outcome.report.snapshot.spectrum.len(), 100);

    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["mode"], "target_relative");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_error_paths() {
    let root = tempfile::tempdir().unwrap();
    let ctx = context(&root.path().join("configurations"));

    match ctx.extract_reference_features("unknown").await {
        Err(TrainerError::Store(StoreError::ReferenceNotFound { .. })) => {}
        other => panic!("Expected ReferenceNotFound, got {:?}", other),
    }

    let profile = ctx
        .register_reference("en", "a", None, "does/not/exist.wav")
        .unwrap();
    match ctx.apply_reference_tolerance(&profile.id, 10.0) {
        Err(TrainerError::Analysis(AnalysisError::MissingFeatures { .. })) => {}
        other => panic!("Expected MissingFeatures, got {:?}", other),
    }
    match ctx.extract_reference_features(&profile.id).await {
        Err(TrainerError::Analysis(AnalysisError::DecodeUnavailable { .. })) => {}
        other => panic!("Expected DecodeUnavailable, got {:?}", other),
    }
    match ctx.analyze_samples(Vec::new(), 22_050, None).await {
        Err(TrainerError::Analysis(AnalysisError::ExtractionFailed { .. })) => {}
        other => panic!("Expected ExtractionFailed, got {:?}", other),
    }

    let candidate = ctx
        .extract_features(vec![0.2; 4096], 22_050)
        .await
        .unwrap();
    assert_eq!(
        ctx.score_against_reference(&candidate, &profile.id).unwrap(),
        0.0
    );
}
