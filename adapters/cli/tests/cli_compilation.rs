use std::process::Command;

#[test]
fn cli_compiles_without_warnings() {
    let status = Command::new(env!("CARGO"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(["check", "--quiet", "--bin", "waypoint-defence"])
        .status()
        .expect("failed to invoke cargo check for waypoint-defence CLI binary");

    assert!(
        status.success(),
        "cargo check --bin waypoint-defence should succeed"
    );
}

#[test]
fn headless_run_prints_summary() {
    let output = Command::new(env!("CARGO"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args([
            "run",
            "--quiet",
            "--bin",
            "waypoint-defence",
            "--",
            "--ticks",
            "240",
        ])
        .output()
        .expect("failed to run waypoint-defence CLI binary");

    assert!(output.status.success(), "headless run should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Welcome to Waypoint Defence."));
    assert!(stdout.contains("status:"));
}
