#![allow(clippy::result_large_err)] // Stack APIs return AppError so lookup failures keep their codes.

//! The set of components for one deployment target.

use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use devx_types::{ConfigValue, ValuePath};
use indexmap::IndexMap;
use std::collections::BTreeSet;

mod graph;

pub const COMPONENTS_FIELD: &str = "components";
pub const DEPENDENCIES_FIELD: &str = "$dependencies";
pub const METADATA_FIELD: &str = "$metadata";
pub const RESOURCES_FIELD: &str = "$resources";
pub const DRIVER_FIELD: &str = "driver";

/// Components keyed by id, in declaration order.
#[derive(Debug, Clone)]
pub struct Stack {
    components_path: ValuePath,
    components: IndexMap<String, ConfigValue>,
    known_drivers: BTreeSet<String>,
}

impl Stack {
    /// Build a stack from a value that declares a `components` mapping.
    pub fn new(value: &ConfigValue) -> Result<Self, AppError> {
        let components_value = value.lookup_path(COMPONENTS_FIELD).map_err(|_| {
            AppError::new(
                ErrorCategory::ValidationError,
                format!(
                    "stack at {} must declare a `{}` mapping",
                    value.path().describe(),
                    COMPONENTS_FIELD
                ),
            )
            .with_code("STACK-DEF-001")
        })?;

        let mut components = IndexMap::new();
        for field in components_value.fields()? {
            components.insert(field.label, field.value);
        }

        Ok(Self {
            components_path: components_value.path().clone(),
            components,
            known_drivers: BTreeSet::new(),
        })
    }

    /// Restrict resource drivers to the given names.
    pub fn with_drivers<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known_drivers = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.components.contains_key(id)
    }

    pub fn components(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.components
            .iter()
            .map(|(id, component)| (id.as_str(), component))
    }

    /// Merge an overlay mapping of components into the stack.
    ///
    /// Existing ids are unified with the overlay's version; new ids are
    /// appended and relocated under this stack's `components` path.
    pub fn add_components(&mut self, overlay: &ConfigValue) -> Result<(), AppError> {
        for field in overlay.fields()? {
            let incoming = field
                .value
                .rebase(self.components_path.child(&field.label));
            match self.components.get_mut(&field.label) {
                Some(existing) => *existing = existing.unify(&incoming),
                None => {
                    self.components.insert(field.label, incoming);
                }
            }
        }
        Ok(())
    }

    /// Component ids with every dependency ahead of its dependents.
    pub fn ordered_components(&self) -> Result<Vec<String>, AppError> {
        let mut dependencies = IndexMap::new();
        for (id, component) in &self.components {
            dependencies.insert(id.clone(), dependencies_of(component)?);
        }
        graph::dependency_order(&dependencies)
    }

    pub fn get_component(&self, id: &str) -> Result<ConfigValue, AppError> {
        self.components.get(id).cloned().ok_or_else(|| {
            AppError::new(
                ErrorCategory::LookupError,
                format!("component {} not found in stack", id),
            )
            .with_code("STACK-LOOKUP-001")
        })
    }

    pub fn update_component(&mut self, id: &str, component: ConfigValue) {
        self.components.insert(id.to_string(), component);
    }

    /// Every declared resource names a concrete, known driver.
    pub fn has_concrete_resource_drivers(&self, component: &ConfigValue) -> bool {
        let Some(resources) = component.lookup(RESOURCES_FIELD) else {
            return true;
        };
        let Ok(resources) = resources.fields() else {
            return false;
        };
        resources.iter().all(|resource| {
            resource
                .value
                .lookup(DRIVER_FIELD)
                .and_then(|driver| driver.as_str().map(str::to_string).ok())
                .map(|name| self.known_drivers.is_empty() || self.known_drivers.contains(&name))
                .unwrap_or(false)
        })
    }

    pub fn is_concrete_component(&self, component: &ConfigValue) -> bool {
        component.is_concrete()
    }
}

/// Ids listed under a component's `$dependencies`.
pub fn dependencies_of(component: &ConfigValue) -> Result<Vec<String>, AppError> {
    let Some(dependencies) = component.lookup(DEPENDENCIES_FIELD) else {
        return Ok(Vec::new());
    };
    dependencies
        .list()?
        .iter()
        .map(|entry| entry.as_str().map(str::to_string).map_err(AppError::from))
        .collect()
}
