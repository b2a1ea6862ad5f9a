use std::path::PathBuf;
use std::process::{Command, Output};

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/simple_trace.json")
}

fn gfxscope(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_gfxscope"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run gfxscope")
}

fn section_line(title: &str, bands: usize, markers: usize) -> String {
    format!("  {title:<24} {bands:>3} bands {markers:>5} markers")
}

#[test]
fn test_summary_lists_every_section() {
    let trace = fixture();
    let output = gfxscope(&[trace.to_str().unwrap(), "--summary"]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[0], "trace: 20.0 ms, 2 cpus, 4 sections");
    assert_eq!(lines[1], section_line("CPUs", 2, 0));
    assert_eq!(lines[2], section_line("Chrome graphics", 1, 1));
    assert_eq!(lines[3], section_line("Android graphics", 1, 3));
    assert_eq!(lines[4], section_line("Maps - MainActivity", 2, 3));
    assert_eq!(lines[5], "diagnostics: none");
}

#[test]
fn test_detail_at_prints_cpu_breakdown() {
    let trace = fixture();
    let output = gfxscope(&[trace.to_str().unwrap(), "--detail-at", "10"]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[0], "window: -1.0...21.0 ms around 10.0 ms");
    assert_eq!(lines[1], "CPU view. 2/3 active processes/threads. Total cpu usage: 72.64%.");
    assert_eq!(lines[2], "app <7>, cpu usage: 54.48%.");
    assert_eq!(lines.len(), 7);
}

#[test]
fn test_detail_outside_trace_is_usage_error() {
    let trace = fixture();
    let output = gfxscope(&[trace.to_str().unwrap(), "--detail-at", "50"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("outside the trace"));
}

#[test]
fn test_missing_trace_fails() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.json");
    let output = gfxscope(&[missing.to_str().unwrap(), "--summary"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to load trace"));
}

#[test]
fn test_invalid_resolution_is_rejected_by_parser() {
    let trace = fixture();
    let output = gfxscope(&[trace.to_str().unwrap(), "--resolution", "-1", "--summary"]);
    assert_eq!(output.status.code(), Some(2));
}
