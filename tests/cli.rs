use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;

const READINGS: &str = r#"[
  {"timestamp": "2024-03-07T00:00:00Z", "value": 12.5, "rainfall": 0.0},
  {"timestamp": "2024-03-08T00:00:00Z", "value": 12.3, "rainfall": 4.2},
  {"timestamp": "2024-03-09T00:00:00Z", "value": 12.0},
  {"timestamp": "2024-03-10T00:00:00Z", "value": 11.8, "rainfall": 1.1}
]"#;

#[test]
fn cli_shows_help() {
    let mut cmd = Command::cargo_bin("aquifer-chart").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("aquifer-chart"))
        .stdout(predicate::str::contains("--threshold"));
}

#[test]
fn renders_png_and_csv() {
    let dir = tempfile::tempdir().unwrap();
    let readings = dir.path().join("readings.json");
    let config = dir.path().join("chart.json");
    let png = dir.path().join("chart.png");
    let csv = dir.path().join("chart.csv");
    fs::write(&readings, READINGS).unwrap();
    fs::write(
        &config,
        r#"{"title": "GW-7", "y_axis_label": "Water level", "secondary_y_axis_label": "Rainfall"}"#,
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("aquifer-chart").unwrap();
    cmd.arg("--readings")
        .arg(&readings)
        .arg("--config")
        .arg(&config)
        .args(["--secondary", "rainfall=Rainfall", "--threshold", "11.5:Critical:error", "--trend"])
        .arg("--out")
        .arg(&png)
        .arg("--csv")
        .arg(&csv);
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Charting 4 dataset(s)"));

    let bytes = fs::read(&png).unwrap();
    assert_eq!(&bytes[..4], &[0x89, b'P', b'N', b'G']);
    let table = fs::read_to_string(&csv).unwrap();
    let mut lines = table.lines();
    assert_eq!(lines.next(), Some("Date,Water Level,Rainfall"));
    assert_eq!(lines.nth(2), Some("2024-03-09T00:00:00Z,12,"));
}

#[test]
fn renders_svg() {
    let dir = tempfile::tempdir().unwrap();
    let readings = dir.path().join("readings.json");
    let svg = dir.path().join("chart.svg");
    fs::write(&readings, READINGS).unwrap();

    let mut cmd = Command::cargo_bin("aquifer-chart").unwrap();
    cmd.arg("-r").arg(&readings).args(["--kind", "bar", "--zoom", "2"]).arg("-o").arg(&svg);
    cmd.assert().success();
    assert!(fs::read_to_string(&svg).unwrap().contains("<svg"));
}

#[test]
fn rejects_bad_threshold() {
    let dir = tempfile::tempdir().unwrap();
    let readings = dir.path().join("readings.json");
    fs::write(&readings, READINGS).unwrap();

    let mut cmd = Command::cargo_bin("aquifer-chart").unwrap();
    cmd.arg("-r").arg(&readings).args(["-t", "deep:Critical"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("invalid threshold value"));
}
