use std::path::Path;
use std::process::Command;

use serde_json::Value;

fn cli(data_dir: &Path) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_phoneme_cli"));
    command
        .arg("--config")
        .arg(data_dir.join("absent-config.json"))
        .arg("--data-dir")
        .arg(data_dir);
    command
}

fn run_json(command: &mut Command) -> Value {
    let output = command.output().expect("failed to run phoneme_cli");
    assert!(
        output.status.success(),
        "CLI exited with {:?}: {}",
        output.status.code(),
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8(output.stdout).expect("stdout UTF-8");
    serde_json::from_str(stdout.trim()).expect("JSON payload")
}

fn write_tone(path: &Path) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 22_050,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for i in 0..11_025 {
        let t = i as f32 / 22_050.0;
        let value = 0.3 * (2.0 * std::f32::consts::PI * 440.0 * t).sin();
        writer.write_sample((value * i16::MAX as f32) as i16).unwrap();
    }
    writer.finalize().unwrap();
}

#[test]
fn register_extract_and_analyze() {
    let dir = tempfile::tempdir().unwrap();
    let wav = dir.path().join("tone.wav");
    write_tone(&wav);
    let data_dir = dir.path().join("configurations");

    let status = run_json(cli(&data_dir).arg("status"));
    assert_eq!(status["configured"], false);

    let registered = run_json(
        cli(&data_dir)
            .args(["register", "--language", "en", "--symbol", "a", "--audio"])
            .arg(&wav),
    );
    let id = registered["id"].as_str().expect("id").to_string();
    assert!(registered["features"].is_null());

    let extracted = run_json(cli(&data_dir).args(["extract", "--id", &id]));
    assert!(extracted["features"]["frequencyRange"].is_array());

    let widened = run_json(cli(&data_dir).args(["tolerance", "--id", &id, "--percent", "10"]));
    assert_eq!(widened["tolerancePercent"], 10.0);

    let analyzed = run_json(
        cli(&data_dir)
            .args(["analyze", "--reference", &id, "--no-snapshot", "--audio"])
            .arg(&wav),
    );
    assert_eq!(analyzed["mode"], "reference_relative");
    assert_eq!(analyzed["reference_id"], id.as_str());
    assert_eq!(analyzed["similarity_score"], 100.0);

    let status = run_json(cli(&data_dir).arg("status"));
    assert_eq!(status["configured"], true);
    assert_eq!(status["references"], 1);
}

#[test]
fn show_unknown_reference_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    let output = cli(dir.path())
        .args(["show", "--id", "missing"])
        .output()
        .expect("failed to run phoneme_cli");
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn invalid_tolerance_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = cli(dir.path())
        .args(["tolerance", "--id", "whatever", "--percent", "250"])
        .output()
        .expect("failed to run phoneme_cli");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Tolerance"), "stderr: {}", stderr);
}
