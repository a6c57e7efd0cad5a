use std::process::Command;

fn help_for(args: &[&str]) -> String {
    let output = Command::new(assert_cmd::cargo::cargo_bin!("devx"))
        .args(args)
        .output()
        .expect("should run successfully");
    assert!(output.status.success());
    String::from_utf8(output.stdout).unwrap()
}

#[test]
fn test_top_level_help_lists_build_commands() {
    let stdout = help_for(&["--help"]);
    assert!(stdout.contains("BUILD COMMANDS"));
    assert!(stdout.contains("build"));
    assert!(stdout.contains("environments"));
}

#[test]
fn test_build_help_documents_configuration_flags() {
    let stdout = help_for(&["build", "--help"]);
    for flag in [
        "--config-dir",
        "--stack-path",
        "--builders-path",
        "--output-dir",
        "--no-progress",
    ] {
        assert!(stdout.contains(flag), "missing {} in:\n{}", flag, stdout);
    }
    assert!(stdout.contains("<ENVIRONMENT>"));
    assert!(stdout.contains("devx build dev --config-dir ./project"));
}

#[test]
fn test_environments_help_has_example() {
    let stdout = help_for(&["environments", "--help"]);
    assert!(stdout.contains("--builders-path"));
    assert!(stdout.contains("devx environments --config-dir ./project"));
}

#[test]
fn test_version_flag_prints_crate_version() {
    let stdout = help_for(&["--version"]);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_build_requires_environment() {
    let output = Command::new(assert_cmd::cargo::cargo_bin!("devx"))
        .arg("build")
        .output()
        .expect("should run");
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("<ENVIRONMENT>"));
}
