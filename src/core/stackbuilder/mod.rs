#![allow(clippy::result_large_err)] // StackBuilder construction returns AppError so callers keep error codes.

//! Per-environment stack builders and the environment registry.

use crate::core::error::AppError;
use crate::core::flow::Flow;
use crate::core::types::ErrorCategory;
use devx_types::ConfigValue;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::fmt;

mod diagnostics;
mod transform;

pub use diagnostics::collect_concreteness_errors;

pub const FLOWS_FIELD: &str = "flows";
pub const DRIVERS_FIELD: &str = "drivers";
pub const ADDITIONAL_COMPONENTS_FIELD: &str = "additionalComponents";

/// Driver name -> option name -> option value.
pub type DriverConfig = HashMap<String, HashMap<String, String>>;

/// Environment name -> builder.
pub type Environments = IndexMap<String, StackBuilder>;

/// One environment's transformation recipe.
#[derive(Debug)]
pub struct StackBuilder {
    pub driver_config: DriverConfig,
    /// Owned snapshot of the overlay, merged into the stack by value.
    pub additional_components: Option<ConfigValue>,
    pub flows: Vec<Flow>,
}

impl StackBuilder {
    pub fn new(value: &ConfigValue) -> Result<Self, AppError> {
        let flows_value = value.lookup(FLOWS_FIELD).ok_or_else(|| {
            flows_error(format!(
                "environment {} is missing `{}`",
                value.path().describe(),
                FLOWS_FIELD
            ))
        })?;
        let flow_values = flows_value.list().map_err(|err| {
            flows_error(format!("`{}` must be a list: {}", FLOWS_FIELD, err))
        })?;

        let additional_components = value.lookup(ADDITIONAL_COMPONENTS_FIELD);

        let mut driver_config = DriverConfig::new();
        if let Some(drivers) = value.lookup(DRIVERS_FIELD) {
            for driver in drivers.fields().map_err(drivers_error)? {
                let mut options = HashMap::new();
                for option in driver.value.fields().map_err(drivers_error)? {
                    let text = option.value.as_str().map_err(|err| {
                        AppError::from(err).with_code("SB-DRIVERS-002")
                    })?;
                    options.insert(option.label, text.to_string());
                }
                driver_config.insert(driver.label, options);
            }
        }

        let flows = flow_values
            .iter()
            .map(Flow::new)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            driver_config,
            additional_components,
            flows,
        })
    }

    pub fn driver_options(&self, driver: &str) -> Option<&HashMap<String, String>> {
        self.driver_config.get(driver)
    }

    /// Sum of every flow's pipeline length.
    pub fn pipeline_units(&self) -> usize {
        self.flows.iter().map(Flow::pipeline_len).sum()
    }
}

fn flows_error(message: String) -> AppError {
    AppError::new(ErrorCategory::ValidationError, message)
        .with_code("SB-FLOWS-001")
        .with_suggestion("declare `flows` as a list of flow definitions")
}

fn drivers_error(err: devx_types::ValueError) -> AppError {
    AppError::new(
        ErrorCategory::ValidationError,
        format!("`{}` must map driver names to option tables: {}", DRIVERS_FIELD, err),
    )
    .with_code("SB-DRIVERS-001")
}

/// Failure while building the registry, with everything built before it.
#[derive(Debug)]
pub struct EnvironmentsError {
    pub partial: Environments,
    pub error: AppError,
}

impl fmt::Display for EnvironmentsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl std::error::Error for EnvironmentsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

impl From<EnvironmentsError> for AppError {
    fn from(err: EnvironmentsError) -> Self {
        err.error
    }
}

/// Build one [`StackBuilder`] per field of `value`, keyed by the field's last
/// path fragment.
pub fn new_environments(value: &ConfigValue) -> Result<Environments, EnvironmentsError> {
    let mut environments = Environments::new();
    let fields = match value.fields() {
        Ok(fields) => fields,
        Err(err) => {
            return Err(EnvironmentsError {
                partial: environments,
                error: err.into(),
            })
        }
    };

    for field in fields {
        let name = field
            .value
            .path()
            .last_fragment()
            .unwrap_or_else(|| field.label.clone());
        match StackBuilder::new(&field.value) {
            Ok(builder) => {
                tracing::debug!(
                    environment = %name,
                    flows = builder.flows.len(),
                    "built stack builder"
                );
                environments.insert(name, builder);
            }
            Err(mut error) => {
                error.add_context("environment", &name);
                return Err(EnvironmentsError {
                    partial: environments,
                    error,
                });
            }
        }
    }

    Ok(environments)
}
