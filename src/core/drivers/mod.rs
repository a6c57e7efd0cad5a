#![allow(clippy::result_large_err)] // Driver trait and registry return AppError directly for structured diagnostics without boxing.

//! Output drivers: turn a transformed stack into files on disk.

pub mod compose;

use crate::core::error::AppError;
use crate::core::stack::Stack;
use crate::core::stackbuilder::DriverConfig;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub use compose::ComposeDriver;

/// Everything a driver run needs besides the stack.
#[derive(Debug, Clone)]
pub struct DriverContext<'a> {
    /// Base directory every driver writes under.
    pub output_dir: &'a Path,
    /// The environment's `drivers.<name>` table, when one is declared.
    pub options: Option<&'a HashMap<String, String>>,
}

impl<'a> DriverContext<'a> {
    pub fn option(&self, key: &str) -> Option<&'a str> {
        self.options
            .and_then(|options| options.get(key))
            .map(String::as_str)
    }
}

/// What a driver produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriverOutput {
    pub driver: String,
    pub files: Vec<PathBuf>,
    pub resources: usize,
}

/// Trait implemented by output drivers.
pub trait Driver: Send + Sync + 'static {
    /// Name resources use in their `driver` field.
    fn name(&self) -> &'static str;

    /// Render every resource assigned to this driver.
    fn apply_all(&self, stack: &Stack, ctx: &DriverContext<'_>) -> Result<DriverOutput, AppError>;
}

/// Builder used to register drivers before a build.
pub struct DriverRegistryBuilder {
    drivers: BTreeMap<String, Arc<dyn Driver>>,
}

impl Default for DriverRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DriverRegistryBuilder {
    pub fn new() -> Self {
        Self {
            drivers: BTreeMap::new(),
        }
    }

    pub fn register<T: Driver>(&mut self, driver: T) -> &mut Self {
        let name = driver.name();
        if self.drivers.contains_key(name) {
            panic!("duplicate driver registered: {}", name);
        }
        self.drivers.insert(name.to_string(), Arc::new(driver));
        self
    }

    pub fn build(self) -> DriverRegistry {
        DriverRegistry {
            inner: Arc::new(self.drivers),
        }
    }
}

/// Immutable set of drivers available to a build.
#[derive(Clone)]
pub struct DriverRegistry {
    inner: Arc<BTreeMap<String, Arc<dyn Driver>>>,
}

impl Default for DriverRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl DriverRegistry {
    pub fn builder() -> DriverRegistryBuilder {
        DriverRegistryBuilder::new()
    }

    /// Registry holding the built-in drivers.
    pub fn with_builtins() -> Self {
        let mut builder = DriverRegistryBuilder::new();
        builder.register(ComposeDriver::new());
        builder.build()
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Driver>> {
        self.inner.get(name).cloned()
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<String> {
        self.inner.keys().cloned().collect()
    }

    /// Run every registered driver with its option table from `config`.
    pub fn apply_all(
        &self,
        stack: &Stack,
        output_dir: &Path,
        config: &DriverConfig,
    ) -> Result<Vec<DriverOutput>, AppError> {
        let mut outputs = Vec::with_capacity(self.inner.len());
        for (name, driver) in self.inner.iter() {
            let ctx = DriverContext {
                output_dir,
                options: config.get(name),
            };
            let output = driver.apply_all(stack, &ctx).map_err(|mut err| {
                err.add_context("driver", name);
                err
            })?;
            tracing::info!(
                driver = %name,
                resources = output.resources,
                files = output.files.len(),
                "driver applied"
            );
            outputs.push(output);
        }
        Ok(outputs)
    }
}
