#![allow(clippy::result_large_err)]

//! End-to-end build of one environment: load, transform, render.

use crate::core::config::{ConfigLoader, DevxConfig};
use crate::core::drivers::{DriverOutput, DriverRegistry};
use crate::core::error::AppError;
use crate::core::progress::ProgressReporter;
use crate::core::project::load_project;
use crate::core::stack::Stack;
use crate::core::stackbuilder::new_environments;
use crate::core::types::ErrorCategory;
use std::path::PathBuf;

/// Inputs of one build.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub environment: String,
    pub config_dir: PathBuf,
    pub config: DevxConfig,
}

/// What a successful build did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    pub environment: String,
    /// Component ids in the order they were transformed.
    pub components: Vec<String>,
    pub outputs: Vec<DriverOutput>,
}

impl BuildSummary {
    pub fn files(&self) -> impl Iterator<Item = &PathBuf> {
        self.outputs.iter().flat_map(|output| output.files.iter())
    }
}

/// An environment as seen by `devx environments`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentInfo {
    pub name: String,
    pub flows: usize,
    pub drivers: Vec<String>,
}

/// Build `request.environment` with the built-in drivers.
pub fn run(
    request: &BuildRequest,
    progress: &mut dyn ProgressReporter,
) -> Result<BuildSummary, AppError> {
    run_with_drivers(request, &DriverRegistry::with_builtins(), progress)
}

pub fn run_with_drivers(
    request: &BuildRequest,
    drivers: &DriverRegistry,
    progress: &mut dyn ProgressReporter,
) -> Result<BuildSummary, AppError> {
    tracing::info!(
        environment = %request.environment,
        config_dir = %request.config_dir.display(),
        "building environment"
    );

    let project = load_project(&request.config_dir)?;
    let builders = project.lookup_path(&request.config.project.builders_path)?;
    let mut environments = new_environments(&builders)?;
    let builder = environments
        .shift_remove(&request.environment)
        .ok_or_else(|| {
            let known = environments.keys().cloned().collect::<Vec<_>>().join(", ");
            AppError::new(
                ErrorCategory::LookupError,
                format!("environment {} was not found", request.environment),
            )
            .with_code("ENV-NOT-FOUND-001")
            .with_suggestion(format!("known environments: {}", known))
        })?;

    let stack_value = project.lookup_path(&request.config.project.stack_path)?;
    let mut stack = Stack::new(&stack_value)?.with_drivers(drivers.names());
    let components = builder.transform_stack(&mut stack, progress)?;

    let output_dir = ConfigLoader::resolve_output_dir(&request.config_dir, &request.config);
    let outputs = drivers.apply_all(&stack, &output_dir, &builder.driver_config)?;

    Ok(BuildSummary {
        environment: request.environment.clone(),
        components,
        outputs,
    })
}

/// Environments declared under the builders path, in declaration order.
pub fn list_environments(
    config_dir: &std::path::Path,
    config: &DevxConfig,
) -> Result<Vec<EnvironmentInfo>, AppError> {
    let project = load_project(config_dir)?;
    let builders = project.lookup_path(&config.project.builders_path)?;
    let environments = new_environments(&builders)?;
    Ok(environments
        .iter()
        .map(|(name, builder)| {
            let mut drivers: Vec<String> = builder.driver_config.keys().cloned().collect();
            drivers.sort();
            EnvironmentInfo {
                name: name.clone(),
                flows: builder.flows.len(),
                drivers,
            }
        })
        .collect())
}
