//! Black-box specs for the `pipeforge` binary: invoke it as a subprocess and
//! check stdout/stderr/exit code.

use std::process::Command;

fn pipeforge() -> Command {
    Command::new(env!("CARGO_BIN_EXE_pipeforge"))
}

#[test]
fn run_executes_a_minimal_pipeline_and_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("pipeline.yaml");
    std::fs::write(
        &file,
        "version: 1\nname: Demo\nstages:\n  - name: build\n    steps:\n      - name: Echo\n        command: echo\n        arguments: hi\n",
    )
    .unwrap();

    let output = pipeforge()
        .args(["run"])
        .arg(&file)
        .env("PIPEFORGE_HOME", dir.path())
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "stdout: {}\nstderr: {}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(String::from_utf8_lossy(&output.stdout).contains("hi"));
}

#[test]
fn run_reports_failure_exit_code_for_a_failing_step() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("pipeline.yaml");
    std::fs::write(
        &file,
        "version: 1\nname: Demo\nstages:\n  - name: build\n    steps:\n      - name: Fail\n        command: exit 1\n",
    )
    .unwrap();

    let output = pipeforge()
        .args(["run"])
        .arg(&file)
        .env("PIPEFORGE_HOME", dir.path())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn validate_exits_zero_for_a_well_formed_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("pipeline.yaml");
    std::fs::write(
        &file,
        "version: 1\nname: Demo\nstages:\n  - name: build\n    steps:\n      - name: Echo\n        command: echo\n        arguments: hi\n",
    )
    .unwrap();

    let status = pipeforge().args(["validate"]).arg(&file).status().unwrap();
    assert!(status.success());
}

#[test]
fn validate_exits_one_for_a_pipeline_with_zero_stages() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("pipeline.yaml");
    std::fs::write(&file, "version: 1\nname: Empty\nstages: []\n").unwrap();

    let status = pipeforge().args(["validate"]).arg(&file).status().unwrap();
    assert_eq!(status.code(), Some(1));
}

#[test]
fn templates_lists_every_named_template() {
    let output = pipeforge().arg("templates").output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    for name in ["innosetup", "dotnet", "security", "twincat", "custom"] {
        assert!(stdout.contains(name), "missing {name} in:\n{stdout}");
    }
}

#[test]
fn init_writes_the_requested_template_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let output_path = dir.path().join("out.yaml");

    let status = pipeforge()
        .args(["init", "dotnet", "--output"])
        .arg(&output_path)
        .status()
        .unwrap();

    assert!(status.success());
    let written = std::fs::read_to_string(&output_path).unwrap();
    assert!(written.contains("dotnet"));
}

#[test]
fn init_rejects_an_unknown_template_name() {
    let dir = tempfile::tempdir().unwrap();
    let output_path = dir.path().join("out.yaml");

    let status = pipeforge()
        .args(["init", "nonexistent", "--output"])
        .arg(&output_path)
        .status()
        .unwrap();

    assert_eq!(status.code(), Some(1));
    assert!(!output_path.exists());
}
