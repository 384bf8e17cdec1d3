use std::process::Command;

#[test]
fn cli_runs_the_demo_arena() {
    let output = Command::new(env!("CARGO_BIN_EXE_tilewalk"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args([
            "--level",
            "levels/arena.json",
            "--config",
            "levels/config.toml",
            "--ticks",
            "120",
            "--hold",
            "sd",
        ])
        .output()
        .expect("failed to invoke the tilewalk binary");

    assert!(output.status.success(), "tilewalk should exit cleanly");
    let stdout = String::from_utf8(output.stdout).expect("report is utf-8");
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 4, "unexpected report:\n{stdout}");
    assert!(lines[0].starts_with("hero player alive"));
    assert!(lines[1].starts_with("slime autonomous"));
    assert!(lines[2].starts_with("bat autonomous"));
    assert_eq!(lines[3], "outcome after 120 ticks: ongoing");
}

#[test]
fn cli_rejects_a_missing_level() {
    let status = Command::new(env!("CARGO_BIN_EXE_tilewalk"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(["--level", "levels/missing.json"])
        .status()
        .expect("failed to invoke the tilewalk binary");

    assert!(!status.success());
}
