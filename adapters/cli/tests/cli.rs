use std::process::{Command, Output};

fn pinball_panic(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pinball-panic"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run the pinball-panic binary")
}

#[test]
fn generated_grids_verify() {
    let output = pinball_panic(&[
        "generate",
        "--size",
        "7",
        "--min-objects",
        "2",
        "--max-objects",
        "4",
        "--objects",
        "bumper,tunnel,teleporter",
        "--seed",
        "17",
        "--count",
        "3",
        "--format",
        "transfer",
    ]);
    assert!(output.status.success(), "generate failed: {output:?}");

    let stdout = String::from_utf8(output.stdout).expect("utf-8 output");
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 3);
    for line in lines {
        assert!(line.starts_with("grid:v1:7x7:"));
        let verified = pinball_panic(&["verify", line]);
        assert!(verified.status.success(), "verify failed: {verified:?}");
        let report = String::from_utf8(verified.stdout).expect("utf-8 output");
        assert!(report.contains("exit: row"));
    }
}

#[test]
fn seeds_reproduce_output() {
    let args = ["generate", "--size", "6", "--seed", "3", "--format", "both"];
    let first = pinball_panic(&args);
    let second = pinball_panic(&args);
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn invalid_configuration_fails() {
    let output = pinball_panic(&["generate", "--min-objects", "3", "--max-objects", "2"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).expect("utf-8 output");
    assert!(stderr.contains("invalid configuration"));
}

#[test]
fn malformed_transfer_strings_fail() {
    let output = pinball_panic(&["verify", "grid:v1:5x5:not-base64"]);
    assert!(!output.status.success());
}

#[test]
fn path_is_drawn_only_on_request() {
    let args = ["generate", "--size", "6", "--seed", "9"];
    let hidden = pinball_panic(&args);
    assert!(hidden.status.success(), "generate failed: {hidden:?}");
    let hidden = String::from_utf8(hidden.stdout).expect("utf-8 output");
    assert!(!hidden.contains('·'));

    let mut revealed_args = args.to_vec();
    revealed_args.push("--show-path");
    let revealed = pinball_panic(&revealed_args);
    assert!(revealed.status.success(), "generate failed: {revealed:?}");
    let revealed = String::from_utf8(revealed.stdout).expect("utf-8 output");
    assert!(revealed.contains('·'));
    assert_eq!(hidden.lines().count(), revealed.lines().count());
}
