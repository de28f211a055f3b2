//! CLI integration tests for memlens.
//!
//! These tests run the memlens binary against the Employee fixture header
//! and against headers written to temporary directories.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Get the path to the memlens binary.
fn memlens_bin() -> String {
    env!("CARGO_BIN_EXE_memlens").to_string()
}

/// Workspace fixtures directory.
fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../tests/fixtures")
}

/// Run memlens with the given arguments.
fn run_memlens(args: &[&str]) -> Output {
    Command::new(memlens_bin())
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute memlens")
}

fn employee_dump(dir: &Path) -> PathBuf {
    let mut data = vec![0u8; 36];
    data[0] = 42;
    data[4..7].copy_from_slice(b"Bob");
    data[20] = 51;
    data[24] = 33;
    data[28] = 1;
    data[32] = 2;
    let path = dir.join("employee.bin");
    fs::write(&path, data).unwrap();
    path
}

// =============================================================================
// Basic Command Tests
// =============================================================================

#[test]
fn test_help() {
    let output = run_memlens(&["--help"]);
    assert!(output.status.success(), "memlens --help should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("decode"), "Help should list decode");
    assert!(stdout.contains("types"), "Help should list types");
}

#[test]
fn test_missing_subcommand() {
    let output = run_memlens(&[]);
    assert!(!output.status.success());
}

// =============================================================================
// Decode Command Tests
// =============================================================================

#[test]
fn test_decode_employee() {
    let dir = tempfile::tempdir().unwrap();
    let dump = employee_dump(dir.path());
    let fixtures = fixtures_dir();

    let output = run_memlens(&[
        "decode",
        "-t",
        "Employee",
        "-b",
        dump.to_str().unwrap(),
        "-I",
        fixtures.to_str().unwrap(),
    ]);
    assert!(
        output.status.success(),
        "decode failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("struct Employee {\n"));
    assert!(stdout.contains("    id =  42, 0x0000002a\n"));
    assert!(stdout.contains("            [0] =  66, 0x42, 'B'\n"));
    assert!(stdout.contains("        home =  33, 0x00000021, Zhejiang\n"));
    assert!(stdout.contains("    position = union Position {\n"));
    assert!(stdout.contains("            level =   2, 0x00000002\n"));
    assert!(stdout.contains("            skills =   1, 0x00000001\n"));
}

#[test]
fn test_decode_json() {
    let dir = tempfile::tempdir().unwrap();
    let dump = employee_dump(dir.path());
    let fixtures = fixtures_dir();

    let output = run_memlens(&[
        "decode",
        "--type",
        "Employee",
        "--binary",
        dump.to_str().unwrap(),
        "--include",
        fixtures.to_str().unwrap(),
        "--json",
    ]);
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["type_name"], "Employee");
    assert_eq!(json["size"], 36);
    assert_eq!(json["fields"][0]["name"], "id");
    assert_eq!(json["fields"][0]["value"]["scalar"]["value"], 42);
}

#[test]
fn test_decode_unknown_type_fails() {
    let dir = tempfile::tempdir().unwrap();
    let dump = employee_dump(dir.path());
    let fixtures = fixtures_dir();

    let output = run_memlens(&[
        "decode",
        "-t",
        "Nobody",
        "-b",
        dump.to_str().unwrap(),
        "-I",
        fixtures.to_str().unwrap(),
    ]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Nobody"), "stderr: {}", stderr);
}

#[test]
fn test_decode_missing_binary_fails() {
    let fixtures = fixtures_dir();
    let output = run_memlens(&[
        "decode",
        "-t",
        "Employee",
        "-b",
        "/nonexistent/dump.bin",
        "-I",
        fixtures.to_str().unwrap(),
    ]);
    assert!(!output.status.success());
}

#[test]
fn test_decode_short_dump_still_prints() {
    let dir = tempfile::tempdir().unwrap();
    let dump = dir.path().join("short.bin");
    fs::write(&dump, [5u8, 0, 0, 0, b'Z']).unwrap();
    let fixtures = fixtures_dir();

    let output = run_memlens(&[
        "decode",
        "-t",
        "Employee",
        "-b",
        dump.to_str().unwrap(),
        "-I",
        fixtures.to_str().unwrap(),
    ]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("    id =   5, 0x00000005\n"));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("buffer-overrun"), "stderr: {}", stderr);
}

// =============================================================================
// Types Command Tests
// =============================================================================

#[test]
fn test_types_dump() {
    let fixtures = fixtures_dir();
    let output = run_memlens(&["types", "-I", fixtures.to_str().unwrap()]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("#define MAX_NAME_LENGTH 16"));
    assert!(stdout.contains("struct Employee {"));
    assert!(stdout.contains("} // size: 36 bytes"));
    assert!(stdout.contains("union Position {"));
    assert!(stdout.contains("enum Home {"));
}

#[test]
fn test_types_single() {
    let fixtures = fixtures_dir();
    let output = run_memlens(&[
        "types",
        "-I",
        fixtures.to_str().unwrap(),
        "--name",
        "Manager",
    ]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("struct Manager {"));
    assert!(stdout.contains("int level; // offset 4, size 4"));
    assert!(stdout.contains("} // size: 8 bytes"));
}

#[test]
fn test_types_unknown_name_fails() {
    let fixtures = fixtures_dir();
    let output = run_memlens(&[
        "types",
        "-I",
        fixtures.to_str().unwrap(),
        "--name",
        "Missing",
    ]);
    assert!(!output.status.success());
}

#[test]
fn test_types_json() {
    let fixtures = fixtures_dir();
    let output = run_memlens(&["types", "-I", fixtures.to_str().unwrap(), "--json"]);
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["constants"]["MAX_NAME_LENGTH"], 16);
    assert_eq!(json["sizes"]["Employee"], 36);
}

#[test]
fn test_includes_resolved_from_include_path() {
    let dir = tempfile::tempdir().unwrap();
    let headers = dir.path().join("headers");
    fs::create_dir_all(headers.join("common")).unwrap();
    fs::write(
        headers.join("common/base.h"),
        "#define COUNT 2\ntypedef struct point { short x; short y; } point;\n",
    )
    .unwrap();
    let main = dir.path().join("shape.h");
    fs::write(
        &main,
        "#include \"common/base.h\"\nstruct shape { point pts[COUNT]; char tag; };\n",
    )
    .unwrap();

    let output = run_memlens(&[
        "types",
        "-I",
        headers.to_str().unwrap(),
        "-f",
        main.to_str().unwrap(),
        "--name",
        "shape",
    ]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("} // size: 9 bytes"), "stdout: {}", stdout);
}

#[test]
fn test_broken_header_does_not_stop_run() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a_broken.h"), "struct broken {\n    int a;\n").unwrap();
    fs::write(dir.path().join("b_good.h"), "struct good { int a; };\n").unwrap();

    let output = run_memlens(&["types", "-I", dir.path().to_str().unwrap()]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("struct good {"));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("a_broken.h"), "stderr: {}", stderr);
}

#[test]
fn test_no_headers_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_memlens(&["types", "-I", dir.path().to_str().unwrap()]);
    assert!(!output.status.success());
}
