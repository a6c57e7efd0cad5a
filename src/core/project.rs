#![allow(clippy::result_large_err)]

//! Loading a project directory into one configuration value.

use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use devx_types::{unify_values, ConfigValue};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

const SOURCE_EXTENSIONS: &[&str] = &["yaml", "yml", "json"];

/// Read every YAML and JSON file directly inside `dir`, in file name order,
/// and unify them into one root value.
pub fn load_project(dir: &Path) -> Result<ConfigValue, AppError> {
    let files = source_files(dir)?;
    tracing::debug!(dir = %dir.display(), files = files.len(), "loading project");

    let mut root = Value::Object(Default::default());
    for file in &files {
        let document = parse_file(file)?;
        if document.is_null() {
            continue;
        }
        root = unify_values(&root, &document);
    }

    if files.is_empty() {
        tracing::warn!(dir = %dir.display(), "project directory has no yaml or json files");
    }
    Ok(ConfigValue::root(root))
}

fn source_files(dir: &Path) -> Result<Vec<PathBuf>, AppError> {
    let entries = fs::read_dir(dir).map_err(|err| {
        AppError::new(
            ErrorCategory::IoError,
            format!("failed to read project directory {}: {}", dir.display(), err),
        )
        .with_code("PROJECT-LOAD-001")
        .with_suggestion("pass the project directory with --config-dir")
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let is_source = path.is_file()
            && path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| SOURCE_EXTENSIONS.contains(&ext))
                .unwrap_or(false);
        if is_source {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn parse_file(path: &Path) -> Result<Value, AppError> {
    let content = fs::read_to_string(path).map_err(|err| {
        AppError::new(
            ErrorCategory::IoError,
            format!("failed to read {}: {}", path.display(), err),
        )
        .with_code("PROJECT-LOAD-001")
    })?;

    let parsed = if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
        serde_json::from_str::<Value>(&content).map_err(|err| err.to_string())
    } else {
        serde_yaml::from_str::<Value>(&content).map_err(|err| err.to_string())
    };
    parsed.map_err(|reason| {
        AppError::new(
            ErrorCategory::SerializationError,
            format!("failed to parse {}: {}", path.display(), reason),
        )
        .with_code("PROJECT-LOAD-002")
    })
}
