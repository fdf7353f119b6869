//! Integration tests for the pdxhist CLI
//!
//! These tests invoke the actual pdxhist binary against the fixture roots
//! under `tests/fixtures` and verify exit codes, stdout/stderr and the
//! generated files.

use std::path::PathBuf;
use std::process::Command;

use tempfile::TempDir;

// ── Helpers ───────────────────────────────────────────────

fn pdxhist_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_pdxhist"))
}

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../tests/fixtures")
        .join(name)
}

fn history(name: &str) -> String {
    fixture(&format!("history/{}", name))
        .to_str()
        .unwrap()
        .to_string()
}

fn run_pdxhist(args: &[&str]) -> std::process::Output {
    Command::new(pdxhist_bin())
        .args(args)
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to execute pdxhist")
}

fn stdout(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// `run` against the mod fixture, writing into a fresh temp dir
fn run_mod(extra: &[&str]) -> (TempDir, PathBuf, std::process::Output) {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out.txt");
    let root = fixture("mod");
    let mut args = vec![
        "run",
        "--root",
        root.to_str().unwrap(),
        "-o",
        out.to_str().unwrap(),
    ];
    args.extend_from_slice(extra);
    let output = run_pdxhist(&args);
    (dir, out, output)
}

// ── Version ───────────────────────────────────────────────

#[test]
fn test_version_command() {
    let output = run_pdxhist(&["version"]);
    assert!(output.status.success(), "version should exit 0");
    let out = stdout(&output);
    assert!(out.contains("pdxhist"));
    assert!(out.contains(env!("CARGO_PKG_VERSION")));
    assert!(
        out.contains(&format!("(pdx-core {})", pdx_core::VERSION)),
        "core version comes from the library: {}",
        out
    );
}

#[test]
fn test_version_flag() {
    let output = run_pdxhist(&["--version"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains(env!("CARGO_PKG_VERSION")));
}

// ── Parse ─────────────────────────────────────────────────

#[test]
fn test_parse_prints_document() {
    let output = run_pdxhist(&["parse", &history("valid.txt")]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("title = c_roma"));
    assert!(out.contains("religion = \"cathar\""), "quoting is kept: {}", out);
    assert!(out.contains("1066.1.1 = {"));
}

#[test]
fn test_parse_error_has_location() {
    let output = run_pdxhist(&["parse", &history("parse-error.txt")]);
    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("parse-error.txt:4:12:"), "stderr: {}", err);
    assert!(err.contains("unterminated"));
}

#[test]
fn test_parse_nonexistent_file() {
    let output = run_pdxhist(&["parse", "does-not-exist.txt"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("does-not-exist.txt"));
}

// ── Timeline ──────────────────────────────────────────────

#[test]
fn test_timeline_table() {
    let output = run_pdxhist(&["timeline", &history("valid.txt")]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 4, "header plus three entries: {}", out);
    assert!(lines[0].contains("YEAR"));
    assert!(lines[1].starts_with(" 867 |"));
    assert!(lines[1].contains("italian"));
    assert!(lines[1].ends_with("| Y"));
    assert!(lines[2].starts_with("1100 |"));
    assert!(lines[2].contains("cathar"));
    assert!(lines[3].starts_with("1200 |"));
}

#[test]
fn test_timeline_json() {
    let output = run_pdxhist(&["timeline", "--json", &history("valid.txt")]);
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).expect("valid JSON");
    let entries = json.as_array().expect("array");
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["start_year"], 867);
    assert_eq!(entries[0]["culture"], "italian");
    assert_eq!(entries[1]["religion"], "cathar");
    assert_eq!(entries[2]["has_temple"], true);
}

#[test]
fn test_timeline_cutoff_flag() {
    let output = run_pdxhist(&["timeline", "--json", "--cutoff", "1150", &history("valid.txt")]);
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 2);
}

#[test]
fn test_timeline_without_title() {
    let output = run_pdxhist(&["timeline", &history("no-title.txt")]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("not a province"));

    let output = run_pdxhist(&["timeline", "--json", &history("no-title.txt")]);
    assert_eq!(stdout(&output).trim(), "null");
}

#[test]
fn test_timeline_missing_culture() {
    let output = run_pdxhist(&["timeline", &history("missing-culture.txt")]);
    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("missing-culture.txt"), "stderr: {}", err);
    assert!(err.contains("missing top-level culture"));
}

#[test]
fn test_timeline_non_barony_holding() {
    let output = run_pdxhist(&["timeline", &history("non-barony-holding.txt")]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("contract violation"));
}

#[test]
fn test_timeline_config_file() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("pdxhist.toml");
    std::fs::write(&config, "cutoff_year = 1337\nunplayable_ranges = []\n").unwrap();

    let output = run_pdxhist(&[
        "timeline",
        "--json",
        "--config",
        config.to_str().unwrap(),
        &history("valid.txt"),
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    // no rounding: epoch and 769 stay apart
    assert_eq!(json[0]["start_year"], 1);
    assert_eq!(json[1]["start_year"], 769);
}

#[test]
fn test_timeline_bad_config() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("pdxhist.toml");
    std::fs::write(&config, "cutoff = 1337\n").unwrap();

    let output = run_pdxhist(&[
        "timeline",
        "--config",
        config.to_str().unwrap(),
        &history("valid.txt"),
    ]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("pdxhist.toml"));
}

// ── Run ───────────────────────────────────────────────────

#[test]
fn test_run_with_vanilla_fallback() {
    let vanilla = fixture("vanilla");
    let (_dir, out, output) = run_mod(&["--vanilla", vanilla.to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("wrote 2 province timelines"));

    let text = std::fs::read_to_string(&out).unwrap();
    assert!(text.starts_with("# generated by pdxhist"));
    assert!(text.contains("# 1 - Roma\n1 = {\n    867 = {"));
    assert!(text.contains("# 2 - Ostia\n2 = {"));
    assert!(text.contains("holding = temple"));
    assert!(text.contains("holding = tribal"));
    // sea zone, river, unnamed and untitled provinces are absent
    for id in ["3", "4", "5", "6"] {
        assert!(!text.contains(&format!("\n{} = {{", id)), "province {} leaked", id);
    }
}

#[test]
fn test_run_json_output() {
    let vanilla = fixture("vanilla");
    let (_dir, out, output) = run_mod(&["--json", "--vanilla", vanilla.to_str().unwrap()]);
    assert!(output.status.success());

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    let provinces = json.as_array().unwrap();
    assert_eq!(provinces.len(), 2);
    assert_eq!(provinces[0]["id"], 1);
    assert_eq!(provinces[1]["name"], "Ostia");
    assert_eq!(provinces[1]["timeline"][1]["start_year"], 1066);
    assert_eq!(provinces[1]["timeline"][1]["culture"], "greek");
}

#[test]
fn test_run_missing_history_halts() {
    let (_dir, out, output) = run_mod(&[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("2 - Ostia.txt"));
    assert!(!out.exists(), "nothing is written on failure");
}

#[test]
fn test_run_keep_going() {
    let (_dir, out, output) = run_mod(&["--keep-going"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("wrote 1 province timelines"));
    assert!(stderr(&output).contains("skipping province"));

    let text = std::fs::read_to_string(&out).unwrap();
    assert!(text.contains("# 1 - Roma"));
    assert!(!text.contains("Ostia"));
}

#[test]
fn test_run_quiet() {
    let vanilla = fixture("vanilla");
    let (_dir, out, output) = run_mod(&["-q", "--vanilla", vanilla.to_str().unwrap()]);
    assert!(output.status.success());
    assert!(stdout(&output).is_empty());
    assert!(out.exists());
}

#[test]
fn test_run_broken_history() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out.txt");
    let root = fixture("broken");
    let output = run_pdxhist(&[
        "run",
        "--root",
        root.to_str().unwrap(),
        "-o",
        out.to_str().unwrap(),
    ]);
    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("1 - Broken.txt"), "stderr: {}", err);
    assert!(err.contains("religion"));
}

#[test]
fn test_run_missing_root() {
    let output = run_pdxhist(&["run", "--root", "no/such/root"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("default.map"));
}

#[test]
fn test_run_determinism() {
    let vanilla = fixture("vanilla");
    let (_a, first, _) = run_mod(&["--vanilla", vanilla.to_str().unwrap()]);
    let (_b, second, _) = run_mod(&["--vanilla", vanilla.to_str().unwrap()]);
    assert_eq!(
        std::fs::read(first).unwrap(),
        std::fs::read(second).unwrap()
    );
}

// ── Definitions ───────────────────────────────────────────

#[test]
fn test_definitions_summary() {
    let output = run_pdxhist(&["definitions", fixture("mod").to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("6 provinces defined, 3 named land provinces"));
}

#[test]
fn test_definitions_write() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("definition.csv");
    let output = run_pdxhist(&[
        "definitions",
        fixture("mod").to_str().unwrap(),
        "--write",
        out.to_str().unwrap(),
    ]);
    assert!(output.status.success());

    let written = std::fs::read_to_string(&out).unwrap();
    let original = std::fs::read_to_string(fixture("mod/map/definition.csv")).unwrap();
    assert_eq!(written, original);
}
