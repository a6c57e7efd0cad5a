use devx::core::config::{ConfigLoader, DevxConfig};
use serial_test::serial;
use std::env;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn clear_devx_env() {
    for v in &["DEVX_STACK_PATH", "DEVX_BUILDERS_PATH", "DEVX_OUTPUT_DIR"] {
        env::remove_var(v);
    }
}

/// Test integration of config loading with environment variables
#[test]
#[serial]
fn test_config_loading_integration() {
    clear_devx_env();
    let temp_dir = TempDir::new().unwrap();

    let config_content = r#"
[project]
stack_path = "platform.stack"
builders_path = "platform.builders"

[output]
dir = "out"
"#;
    fs::write(temp_dir.path().join("devx.toml"), config_content).unwrap();

    let config = ConfigLoader::load_from_dir(temp_dir.path()).unwrap();
    assert_eq!(config.project.stack_path, "platform.stack");
    assert_eq!(config.project.builders_path, "platform.builders");
    assert_eq!(config.output.dir, PathBuf::from("out"));

    env::set_var("DEVX_BUILDERS_PATH", "envs");
    env::set_var("DEVX_OUTPUT_DIR", "/tmp/devx-build");

    let config = ConfigLoader::load_from_dir(temp_dir.path()).unwrap();
    assert_eq!(config.project.stack_path, "platform.stack"); // From file
    assert_eq!(config.project.builders_path, "envs"); // From env
    assert_eq!(config.output.dir, PathBuf::from("/tmp/devx-build")); // From env

    clear_devx_env();
}

#[test]
#[serial]
fn test_env_overrides_apply_without_config_file() {
    clear_devx_env();
    let temp_dir = TempDir::new().unwrap();
    env::set_var("DEVX_STACK_PATH", "services");

    let config = ConfigLoader::load_from_dir(temp_dir.path()).unwrap();
    assert_eq!(config.project.stack_path, "services");
    assert_eq!(config.project.builders_path, DevxConfig::default().project.builders_path);

    clear_devx_env();
}

#[test]
#[serial]
fn test_invalid_env_override_is_rejected() {
    clear_devx_env();
    let temp_dir = TempDir::new().unwrap();
    env::set_var("DEVX_STACK_PATH", "stack.");

    let err = ConfigLoader::load_from_dir(temp_dir.path()).unwrap_err();
    assert_eq!(err.code, "CONFIG-002");

    clear_devx_env();
}

#[test]
fn test_env_var_documentation_lists_every_override() {
    let docs = ConfigLoader::env_var_documentation();
    for name in ["DEVX_STACK_PATH", "DEVX_BUILDERS_PATH", "DEVX_OUTPUT_DIR"] {
        assert!(docs.iter().any(|line| line.starts_with(name)), "{}", name);
    }
}
