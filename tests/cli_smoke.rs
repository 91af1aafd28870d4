use std::path::PathBuf;

use serde_json::json;

fn exe() -> PathBuf {
    std::env::var_os("CARGO_BIN_EXE_racebar")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let mut p = PathBuf::from("target").join("debug");
            p.push(if cfg!(windows) {
                "racebar.exe"
            } else {
                "racebar"
            });
            p
        })
}

fn write_input(dir: &std::path::Path) -> PathBuf {
    std::fs::create_dir_all(dir).unwrap();
    let input = json!({
        "config": { "date": "d", "category": "c", "value": "v", "rank": "2" },
        "element": {
            "columns": { "d": { "name": "Year of Date" } },
            "data": {
                "d": ["2019", "2019", "2019", "2020", "2020", "2020"],
                "c": ["A", "B", "C", "A", "B", "C"],
                "v": [10, 5, 1, 3, 12, 8]
            }
        },
        "playback": { "duration_ms": 20 }
    });
    let path = dir.join("input.json");
    let f = std::fs::File::create(&path).unwrap();
    serde_json::to_writer_pretty(f, &input).unwrap();
    path
}

#[test]
fn cli_keyframes_prints_the_timeline() {
    let dir = PathBuf::from("target").join("cli_smoke_keyframes");
    let input = write_input(&dir);

    let output = std::process::Command::new(exe())
        .args(["keyframes", "--in"])
        .arg(&input)
        .output()
        .unwrap();
    assert!(output.status.success());

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["n"], 2);
    assert_eq!(summary["keyframes"].as_array().unwrap().len(), 2);
    assert_eq!(summary["keyframes"][1]["caption"], "2020");
    assert_eq!(summary["keyframes"][1]["entries"][0]["name"], "B");
    assert_eq!(summary["links"].as_array().unwrap().len(), 6);
}

#[test]
fn cli_frame_writes_svg() {
    let dir = PathBuf::from("target").join("cli_smoke_frame");
    let input = write_input(&dir);
    let out_path = dir.join("out.svg");
    let _ = std::fs::remove_file(&out_path);

    let status = std::process::Command::new(exe())
        .args(["frame", "--keyframe", "1", "--progress", "0.5", "--in"])
        .arg(&input)
        .arg("--out")
        .arg(&out_path)
        .status()
        .unwrap();
    assert!(status.success());

    let svg = std::fs::read_to_string(&out_path).unwrap();
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains(">2019</text>"));
}

#[test]
fn cli_frame_rejects_out_of_range_keyframe() {
    let dir = PathBuf::from("target").join("cli_smoke_frame_range");
    let input = write_input(&dir);

    let status = std::process::Command::new(exe())
        .args(["frame", "--keyframe", "9", "--in"])
        .arg(&input)
        .arg("--out")
        .arg(dir.join("never.svg"))
        .status()
        .unwrap();
    assert!(!status.success());
}

#[test]
fn cli_play_prints_captions_and_snapshots() {
    let dir = PathBuf::from("target").join("cli_smoke_play");
    let input = write_input(&dir);
    let frames = dir.join("frames");
    let _ = std::fs::remove_dir_all(&frames);

    let output = std::process::Command::new(exe())
        .args(["play", "--in"])
        .arg(&input)
        .arg("--out-dir")
        .arg(&frames)
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines, vec!["2019", "2020"]);
    assert!(frames.join("keyframe_0000.svg").exists());
    assert!(frames.join("keyframe_0001.svg").exists());
}
