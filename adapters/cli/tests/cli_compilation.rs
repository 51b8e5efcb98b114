use std::process::Command;

#[test]
fn cli_compiles_without_warnings() {
    let status = Command::new(env!("CARGO"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(["check", "--quiet", "--bin", "pinball-panic"])
        .status()
        .expect("failed to invoke cargo check for pinball-panic CLI binary");

    assert!(status.success(), "cargo check --bin pinball-panic should succeed");
}
