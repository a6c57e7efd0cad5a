use super::{Driver, DriverContext, DriverOutput};
use crate::core::error::AppError;
use crate::core::stack::{Stack, DRIVER_FIELD, RESOURCES_FIELD};
use crate::core::types::ErrorCategory;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

pub const COMPOSE_DRIVER: &str = "compose";
const DEFAULT_PATH: &str = "compose";
const DEFAULT_FILE: &str = "docker-compose.yml";

/// Writes every `compose` resource as a service of one compose file.
#[derive(Debug, Clone, Default)]
pub struct ComposeDriver;

impl ComposeDriver {
    pub fn new() -> Self {
        Self
    }

    /// Gather services in component order, keyed by resource name.
    fn collect_services(&self, stack: &Stack) -> Result<Map<String, Value>, AppError> {
        let mut services = Map::new();
        for (id, component) in stack.components() {
            let Some(resources) = component.lookup(RESOURCES_FIELD) else {
                continue;
            };
            for resource in resources.fields()? {
                let driver = resource
                    .value
                    .lookup(DRIVER_FIELD)
                    .and_then(|driver| driver.as_str().map(str::to_string).ok());
                if driver.as_deref() != Some(COMPOSE_DRIVER) {
                    continue;
                }
                if services.contains_key(&resource.label) {
                    return Err(AppError::new(
                        ErrorCategory::DriverError,
                        format!(
                            "compose service {} is declared twice (again by component {})",
                            resource.label, id
                        ),
                    )
                    .with_code("DRIVER-COMPOSE-001"));
                }
                let mut service = match resource.value.into_value() {
                    Value::Object(map) => map,
                    _ => Map::new(),
                };
                service.remove(DRIVER_FIELD);
                services.insert(resource.label, Value::Object(service));
            }
        }
        Ok(services)
    }
}

impl Driver for ComposeDriver {
    fn name(&self) -> &'static str {
        COMPOSE_DRIVER
    }

    fn apply_all(&self, stack: &Stack, ctx: &DriverContext<'_>) -> Result<DriverOutput, AppError> {
        let services = self.collect_services(stack)?;
        let mut output = DriverOutput {
            driver: COMPOSE_DRIVER.to_string(),
            files: Vec::new(),
            resources: services.len(),
        };
        if services.is_empty() {
            tracing::debug!("no compose resources in stack");
            return Ok(output);
        }

        let mut document = Map::new();
        if let Some(name) = ctx.option("name") {
            document.insert("name".to_string(), Value::String(name.to_string()));
        }
        document.insert("services".to_string(), Value::Object(services));

        let rendered = serde_yaml::to_string(&Value::Object(document)).map_err(|err| {
            AppError::new(
                ErrorCategory::SerializationError,
                format!("failed to render compose file: {}", err),
            )
            .with_code("DRIVER-IO-001")
        })?;

        let dir = ctx
            .output_dir
            .join(ctx.option("path").unwrap_or(DEFAULT_PATH));
        let file = dir.join(ctx.option("file").unwrap_or(DEFAULT_FILE));
        write_file(&dir, &file, &rendered)?;
        tracing::debug!(path = %file.display(), "wrote compose file");

        output.files.push(file);
        Ok(output)
    }
}

fn write_file(dir: &Path, file: &Path, contents: &str) -> Result<(), AppError> {
    fs::create_dir_all(dir)
        .and_then(|_| fs::write(file, contents))
        .map_err(|err| {
            AppError::new(
                ErrorCategory::IoError,
                format!("failed to write {}: {}", file.display(), err),
            )
            .with_code("DRIVER-IO-001")
            .with_suggestion("check that the output directory is writable")
        })
}
