#![allow(clippy::result_large_err)] // Flow construction and steps return AppError for structured diagnostics.

//! Flows: ordered pipelines of steps applied to one component at a time.

use crate::core::error::AppError;
use crate::core::stack::{Stack, METADATA_FIELD};
use crate::core::types::ErrorCategory;
use devx_types::ConfigValue;
use indexmap::IndexMap;
use std::fmt;

mod steps;

pub use steps::{DefaultsStep, PatchStep, ResolveStep};

/// One transformation in a flow pipeline.
pub trait FlowStep: fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// Return the transformed component. The stack is read-only here; the
    /// orchestrator decides whether the result is committed.
    fn apply(&self, stack: &Stack, id: &str, component: ConfigValue)
        -> Result<ConfigValue, AppError>;
}

/// Trait and label constraints used by `match` and `exclude`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentSelector {
    pub traits: Vec<String>,
    pub labels: IndexMap<String, String>,
}

impl ComponentSelector {
    fn parse(value: &ConfigValue) -> Result<Self, AppError> {
        let mut selector = ComponentSelector::default();
        for field in value.fields().map_err(|err| definition_error(value, err))? {
            match field.label.as_str() {
                "traits" => {
                    for entry in field.value.list().map_err(|err| definition_error(value, err))? {
                        let name = entry.as_str().map_err(|err| definition_error(value, err))?;
                        selector.traits.push(name.to_string());
                    }
                }
                "labels" => {
                    for label in field.value.fields().map_err(|err| definition_error(value, err))? {
                        let text = label
                            .value
                            .as_str()
                            .map_err(|err| definition_error(value, err))?;
                        selector.labels.insert(label.label, text.to_string());
                    }
                }
                other => {
                    return Err(definition_error(
                        value,
                        format!("unknown selector field '{}'", other),
                    ))
                }
            }
        }
        Ok(selector)
    }

    fn is_empty(&self) -> bool {
        self.traits.is_empty() && self.labels.is_empty()
    }

    /// Every trait and label of the selector is present on the component.
    fn matches_all(&self, metadata: &ComponentMetadata) -> bool {
        self.traits.iter().all(|name| metadata.traits.contains(name))
            && self
                .labels
                .iter()
                .all(|(key, expected)| metadata.labels.get(key) == Some(expected))
    }

    /// At least one trait or label of the selector is present on the component.
    fn matches_any(&self, metadata: &ComponentMetadata) -> bool {
        self.traits.iter().any(|name| metadata.traits.contains(name))
            || self
                .labels
                .iter()
                .any(|(key, expected)| metadata.labels.get(key) == Some(expected))
    }
}

/// Traits and labels read from a component's `$metadata`.
#[derive(Debug, Default)]
struct ComponentMetadata {
    traits: Vec<String>,
    labels: IndexMap<String, String>,
}

impl ComponentMetadata {
    fn of(component: &ConfigValue) -> Self {
        let mut metadata = ComponentMetadata::default();
        let Some(value) = component.lookup(METADATA_FIELD) else {
            return metadata;
        };
        if let Some(Ok(traits)) = value.lookup("traits").map(|traits| traits.list()) {
            metadata.traits = traits
                .iter()
                .filter_map(|entry| entry.as_str().ok().map(str::to_string))
                .collect();
        }
        if let Some(Ok(labels)) = value.lookup("labels").map(|labels| labels.fields()) {
            metadata.labels = labels
                .into_iter()
                .filter_map(|field| {
                    let text = field.value.as_str().ok()?.to_string();
                    Some((field.label, text))
                })
                .collect();
        }
        metadata
    }
}

/// A named, ordered pipeline applied to every component it matches.
#[derive(Debug)]
pub struct Flow {
    name: Option<String>,
    include: ComponentSelector,
    exclude: ComponentSelector,
    pipeline: Vec<Box<dyn FlowStep>>,
}

impl Flow {
    /// Build a flow from one element of an environment's `flows` list.
    pub fn new(value: &ConfigValue) -> Result<Self, AppError> {
        let fields = value.fields().map_err(|err| definition_error(value, err))?;

        let mut name = None;
        let mut include = ComponentSelector::default();
        let mut exclude = ComponentSelector::default();
        let mut pipeline = None;
        for field in fields {
            match field.label.as_str() {
                "name" => {
                    let text = field
                        .value
                        .as_str()
                        .map_err(|err| definition_error(value, err))?;
                    name = Some(text.to_string());
                }
                "match" => include = ComponentSelector::parse(&field.value)?,
                "exclude" => exclude = ComponentSelector::parse(&field.value)?,
                "pipeline" => pipeline = Some(parse_pipeline(&field.value)?),
                other => {
                    return Err(definition_error(
                        value,
                        format!("unknown flow field '{}'", other),
                    ))
                }
            }
        }

        let pipeline = pipeline.ok_or_else(|| {
            definition_error(value, "flow must declare a `pipeline` list")
        })?;

        Ok(Self {
            name,
            include,
            exclude,
            pipeline,
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Number of steps, used for progress accounting.
    pub fn pipeline_len(&self) -> usize {
        self.pipeline.len()
    }

    pub fn step_names(&self) -> Vec<&'static str> {
        self.pipeline.iter().map(|step| step.name()).collect()
    }

    pub fn matches(&self, component: &ConfigValue) -> bool {
        let metadata = ComponentMetadata::of(component);
        if !self.include.is_empty() && !self.include.matches_all(&metadata) {
            return false;
        }
        !self.exclude.matches_any(&metadata)
    }

    /// Run the pipeline against `component` and return the new value.
    /// Components the flow does not match pass through unchanged.
    pub fn run(
        &self,
        stack: &Stack,
        id: &str,
        component: ConfigValue,
    ) -> Result<ConfigValue, AppError> {
        if !self.matches(&component) {
            tracing::debug!(
                component = id,
                flow = self.name().unwrap_or("<unnamed>"),
                "flow does not match component"
            );
            return Ok(component);
        }

        let mut current = component;
        for step in &self.pipeline {
            tracing::trace!(component = id, step = step.name(), "applying flow step");
            current = step.apply(stack, id, current).map_err(|mut err| {
                err.add_context("component", id);
                err.add_context("step", step.name());
                err
            })?;
        }
        Ok(current)
    }
}

fn parse_pipeline(value: &ConfigValue) -> Result<Vec<Box<dyn FlowStep>>, AppError> {
    let entries = value.list().map_err(|err| definition_error(value, err))?;
    entries.iter().map(parse_step).collect()
}

fn parse_step(value: &ConfigValue) -> Result<Box<dyn FlowStep>, AppError> {
    let fields = value.fields().map_err(|err| step_error(value, err))?;
    let [field] = fields.as_slice() else {
        return Err(step_error(
            value,
            "each pipeline step must contain exactly one of patch, defaults, resolve",
        ));
    };
    match field.label.as_str() {
        "patch" => {
            field
                .value
                .fields()
                .map_err(|err| step_error(value, err))?;
            Ok(Box::new(PatchStep::new(field.value.value().clone())))
        }
        "defaults" => {
            field
                .value
                .fields()
                .map_err(|err| step_error(value, err))?;
            Ok(Box::new(DefaultsStep::new(field.value.value().clone())))
        }
        "resolve" => Ok(Box::new(ResolveStep)),
        other => Err(step_error(value, format!("unknown step '{}'", other))),
    }
}

fn definition_error(value: &ConfigValue, reason: impl fmt::Display) -> AppError {
    AppError::new(
        ErrorCategory::ValidationError,
        format!(
            "invalid flow definition at {}: {}",
            value.path().describe(),
            reason
        ),
    )
    .with_code("FLOW-DEF-001")
}

fn step_error(value: &ConfigValue, reason: impl fmt::Display) -> AppError {
    AppError::new(
        ErrorCategory::ValidationError,
        format!(
            "invalid pipeline step at {}: {}",
            value.path().describe(),
            reason
        ),
    )
    .with_code("FLOW-DEF-001")
}
