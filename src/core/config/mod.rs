use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Build configuration loaded from devx.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct DevxConfig {
    /// Where the stack and builders live inside the project value
    #[serde(default)]
    pub project: ProjectConfig,

    /// Where drivers write their files
    #[serde(default)]
    pub output: OutputConfig,
}

/// Project configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectConfig {
    /// Value path of the stack definition
    #[serde(default = "default_stack_path")]
    pub stack_path: String,

    /// Value path of the environment builders
    #[serde(default = "default_builders_path")]
    pub builders_path: String,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutputConfig {
    /// Output base directory, relative to the config directory unless absolute
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

fn default_stack_path() -> String {
    "stack".to_string()
}

fn default_builders_path() -> String {
    "builders".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("build")
}

impl Default for ProjectConfig {
    fn default() -> Self {
        ProjectConfig {
            stack_path: default_stack_path(),
            builders_path: default_builders_path(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            dir: default_output_dir(),
        }
    }
}


pub mod loader;
pub mod validation;

pub use loader::ConfigLoader;
pub use validation::ConfigValidator;
