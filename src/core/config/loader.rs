#![allow(clippy::result_large_err)]

use super::{ConfigValidator, DevxConfig};
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use std::env;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "devx.toml";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config from the project directory (dir/devx.toml).
    /// Environment variables override config file values; a missing file
    /// means defaults plus env vars.
    pub fn load_from_dir(config_dir: &Path) -> Result<DevxConfig, AppError> {
        let config_path = config_dir.join(CONFIG_FILE);
        let config_file = Self::load_from_file(&config_path)?;

        let mut config = config_file.unwrap_or_default();

        Self::apply_env_overrides(&mut config);
        ConfigValidator::validate(&config)?;

        Ok(config)
    }

    /// Load config from specific file path
    /// Returns Ok(None) if file doesn't exist
    pub fn load_from_file(path: &Path) -> Result<Option<DevxConfig>, AppError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::new(
                ErrorCategory::IoError,
                format!("Failed to read config file {}: {}", path.display(), e),
            )
        })?;

        let config: DevxConfig = toml::from_str(&content).map_err(|e| {
            AppError::new(
                ErrorCategory::ValidationError,
                format!("Failed to parse config file {}: {}", path.display(), e),
            )
            .with_code("CONFIG-003")
        })?;

        Ok(Some(config))
    }

    /// Environment variables take precedence over config file values
    fn apply_env_overrides(config: &mut DevxConfig) {
        if let Ok(stack_path) = env::var("DEVX_STACK_PATH") {
            config.project.stack_path = stack_path;
        }

        if let Ok(builders_path) = env::var("DEVX_BUILDERS_PATH") {
            config.project.builders_path = builders_path;
        }

        if let Ok(output_dir) = env::var("DEVX_OUTPUT_DIR") {
            config.output.dir = PathBuf::from(output_dir);
        }
    }

    /// Get documentation for supported environment variables
    pub fn env_var_documentation() -> &'static [&'static str] {
        &[
            "DEVX_STACK_PATH - Override the stack value path (default: stack)",
            "DEVX_BUILDERS_PATH - Override the builders value path (default: builders)",
            "DEVX_OUTPUT_DIR - Override the output directory (default: build)",
        ]
    }

    /// Output directory resolved against the config directory.
    pub fn resolve_output_dir(config_dir: &Path, config: &DevxConfig) -> PathBuf {
        if config.output.dir.is_absolute() {
            config.output.dir.clone()
        } else {
            config_dir.join(&config.output.dir)
        }
    }
}
