#![cfg(feature = "cli")]

use std::process::{Command, Output};

fn swarmlink(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_swarmlink"))
        .args(args)
        .env_remove("SWARMLINK_SERIAL")
        .env_remove("SWARMLINK_BAUD")
        .output()
        .expect("swarmlink binary should run")
}

#[test]
fn version_prints_package_version() {
    let out = swarmlink(&["version"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert_eq!(
        stdout.trim(),
        format!("swarmlink {}", env!("CARGO_PKG_VERSION"))
    );
}

#[test]
fn extended_version_reports_build_target() {
    let out = swarmlink(&["version", "--extended"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("name: swarmlink"));
    assert!(stdout.contains("target: "));
    assert!(stdout.contains("features: cli=true"));
}

#[test]
fn send_without_serial_port_is_a_usage_error() {
    let out = swarmlink(&["send", "A1", "getValue"]);
    assert_eq!(out.status.code(), Some(64));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("no serial port given"), "stderr: {stderr}");
}

#[test]
fn malformed_port_is_rejected_before_connecting() {
    let out = swarmlink(&["--serial", "/dev/swarmlink-missing", "send", "A.1", "getValue"]);
    assert_eq!(out.status.code(), Some(64));
}

#[test]
fn missing_serial_device_is_a_transport_error() {
    let out = swarmlink(&[
        "--serial",
        "/dev/swarmlink-missing",
        "--format",
        "raw",
        "send",
        "A1",
        "getValue",
    ]);
    assert_eq!(out.status.code(), Some(3));
    assert!(out.stdout.is_empty());
}
