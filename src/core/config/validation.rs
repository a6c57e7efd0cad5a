#![allow(clippy::result_large_err)]

use super::DevxConfig;
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use devx_types::ValuePath;

pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate configuration rules
    pub fn validate(config: &DevxConfig) -> Result<(), AppError> {
        Self::validate_value_path("project.stack_path", &config.project.stack_path)?;
        Self::validate_value_path("project.builders_path", &config.project.builders_path)?;

        if config.output.dir.as_os_str().is_empty() {
            return Err(AppError::new(
                ErrorCategory::ValidationError,
                "output.dir cannot be empty",
            )
            .with_code("CONFIG-001"));
        }

        Ok(())
    }

    fn validate_value_path(key: &str, path: &str) -> Result<(), AppError> {
        if path.trim().is_empty() {
            return Err(AppError::new(
                ErrorCategory::ValidationError,
                format!("{} cannot be empty", key),
            )
            .with_code("CONFIG-001"));
        }
        ValuePath::parse(path).map_err(|err| {
            AppError::new(
                ErrorCategory::ValidationError,
                format!("{} is not a valid value path: {}", key, err),
            )
            .with_code("CONFIG-002")
        })?;
        Ok(())
    }
}
