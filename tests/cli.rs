//! End-to-end runs of the `colorflow` binary.

mod common;

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

fn colorflow(args: &[&str], stdin: Option<&str>) -> Output {
    colorflow_with(args, &[], stdin.unwrap_or_default().as_bytes())
}

fn colorflow_with(args: &[&str], env: &[(&str, &str)], stdin: &[u8]) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_colorflow"))
        .args(args)
        .env_remove("RUST_LOG")
        .envs(env.iter().copied())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn colorflow");
    {
        let mut pipe = child.stdin.take().unwrap();
        pipe.write_all(stdin).unwrap();
    }
    child.wait_with_output().unwrap()
}

fn stdout_lines(out: &Output) -> Vec<String> {
    String::from_utf8_lossy(&out.stdout)
        .lines()
        .map(str::to_owned)
        .collect()
}

fn write_pictures(dir: &Path) {
    std::fs::write(dir.join("red.bmp"), common::bmp_uniform(4, 4, [255, 0, 0])).unwrap();
    std::fs::write(dir.join("gray.bmp"), common::bmp_uniform(2, 3, [16, 16, 16])).unwrap();
    std::fs::write(dir.join("bogus.bmp"), b"BMnope").unwrap();
}

#[test]
fn prints_one_color_per_argument() {
    let dir = tempfile::tempdir().unwrap();
    write_pictures(dir.path());
    let prefix = dir.path().to_str().unwrap();

    let out = colorflow(&["--prefix", prefix, "red.bmp", "gray.bmp"], None);
    assert!(out.status.success(), "{out:?}");
    assert_eq!(stdout_lines(&out), ["#FF0000", "#101010"]);
}

#[test]
fn reads_names_from_stdin() {
    let dir = tempfile::tempdir().unwrap();
    write_pictures(dir.path());
    let prefix = dir.path().to_str().unwrap();

    let out = colorflow(&["-p", prefix, "-F", "hex-alpha"], Some("red.bmp\r\n\ngray.bmp\n"));
    assert!(out.status.success(), "{out:?}");
    assert_eq!(stdout_lines(&out), ["FF0000-FF", "101010-FF"]);
}

#[test]
fn failures_are_reported_and_processing_continues() {
    let dir = tempfile::tempdir().unwrap();
    write_pictures(dir.path());
    let prefix = dir.path().to_str().unwrap();

    let out = colorflow(&["-p", prefix, "bogus.bmp", "red.bmp"], None);
    assert_eq!(out.status.code(), Some(2));
    assert_eq!(stdout_lines(&out), ["#FF0000"]);
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("bogus.bmp"), "stderr: {stderr}");

    let out = colorflow(&["-p", prefix, "missing.bmp"], None);
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn invalid_utf8_stdin_line_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    write_pictures(dir.path());
    let prefix = dir.path().to_str().unwrap();

    let out = colorflow_with(&["-p", prefix], &[], b"\xff\xfe.bmp\nred.bmp\n");
    assert_eq!(out.status.code(), Some(1));
    assert_eq!(stdout_lines(&out), ["#FF0000"]);
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("stdin line 1"), "stderr: {stderr}");
}

#[test]
fn failures_are_logged_at_default_level() {
    let dir = tempfile::tempdir().unwrap();
    write_pictures(dir.path());
    let prefix = dir.path().to_str().unwrap();

    let out = colorflow(&["-p", prefix, "bogus.bmp"], None);
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("WARN"), "stderr: {stderr}");
    assert!(stderr.contains("failed to compute average color"), "stderr: {stderr}");
}

#[test]
fn rust_log_controls_the_crate_level() {
    let dir = tempfile::tempdir().unwrap();
    write_pictures(dir.path());
    let prefix = dir.path().to_str().unwrap();

    let out = colorflow_with(&["-p", prefix, "red.bmp"], &[("RUST_LOG", "colorflow=debug")], b"");
    assert!(out.status.success(), "{out:?}");
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("DEBUG"), "stderr: {stderr}");
    assert!(stderr.contains("average color"), "stderr: {stderr}");

    // quieter than the default level
    let out = colorflow_with(&["-p", prefix, "bogus.bmp"], &[("RUST_LOG", "colorflow=error")], b"");
    assert_eq!(out.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(!stderr.contains("WARN"), "stderr: {stderr}");

    // an explicit -v still raises it
    let out = colorflow_with(&["-vv", "-p", prefix, "red.bmp"], &[("RUST_LOG", "colorflow=error")], b"");
    assert!(String::from_utf8_lossy(&out.stderr).contains("DEBUG"));
}

#[test]
fn bad_frame_percentage_exits_with_config_error() {
    let out = colorflow(&["-n", "0", "whatever.bmp"], None);
    assert_eq!(out.status.code(), Some(5));
    assert!(out.stdout.is_empty());
}

#[test]
fn config_file_supplies_defaults() {
    let dir = tempfile::tempdir().unwrap();
    write_pictures(dir.path());
    let config = dir.path().join("colorflow.yaml");
    std::fs::write(
        &config,
        format!(
            "path-prefix: {:?}\nsampling:\n  mode: frame\n  frame-percent: 25\nformat: rgb\n",
            dir.path().to_str().unwrap()
        ),
    )
    .unwrap();

    let out = colorflow(&["-c", config.to_str().unwrap(), "red.bmp"], None);
    assert!(out.status.success(), "{out:?}");
    assert_eq!(stdout_lines(&out), ["rgb(255, 0, 0)"]);

    // command line wins over the file
    let out = colorflow(&["-c", config.to_str().unwrap(), "-F", "hex", "red.bmp"], None);
    assert_eq!(stdout_lines(&out), ["#FF0000"]);
}
