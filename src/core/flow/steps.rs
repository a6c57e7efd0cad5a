use crate::core::error::AppError;
use crate::core::flow::FlowStep;
use crate::core::stack::Stack;
use crate::core::types::ErrorCategory;
use devx_types::{unify_values, ConfigValue, Marker, Selector, ValuePath};
use serde_json::Value;

/// Unify a fixed fragment into the component.
#[derive(Debug, Clone)]
pub struct PatchStep {
    patch: Value,
}

/// Fill fields that are missing or still abstract; concrete fields win.
#[derive(Debug, Clone)]
pub struct DefaultsStep {
    defaults: Value,
}

/// Replace `$ref` markers with the referenced, already concrete values.
#[derive(Debug, Clone, Default)]
pub struct ResolveStep;

impl PatchStep {
    pub fn new(patch: Value) -> Self {
        Self { patch }
    }
}

impl DefaultsStep {
    pub fn new(defaults: Value) -> Self {
        Self { defaults }
    }
}

impl FlowStep for PatchStep {
    fn name(&self) -> &'static str {
        "patch"
    }

    fn apply(
        &self,
        _stack: &Stack,
        _id: &str,
        component: ConfigValue,
    ) -> Result<ConfigValue, AppError> {
        Ok(component.unify_value(&self.patch))
    }
}

impl FlowStep for DefaultsStep {
    fn name(&self) -> &'static str {
        "defaults"
    }

    fn apply(
        &self,
        _stack: &Stack,
        _id: &str,
        component: ConfigValue,
    ) -> Result<ConfigValue, AppError> {
        let filled = fill_defaults(component.value(), &self.defaults);
        Ok(ConfigValue::new(component.path().clone(), filled))
    }
}

impl FlowStep for ResolveStep {
    fn name(&self) -> &'static str {
        "resolve"
    }

    fn apply(
        &self,
        stack: &Stack,
        id: &str,
        component: ConfigValue,
    ) -> Result<ConfigValue, AppError> {
        let mut resolved = component;
        let mut total = 0;
        // Resolved values are concrete, so every pass shrinks the set of
        // references and chains through the component itself settle.
        loop {
            let snapshot = resolved.clone();
            let mut lookup = |target: &str| lookup_reference(stack, id, &snapshot, target);
            let count = resolve_references(resolved.value_mut(), &mut lookup)?;
            if count == 0 {
                break;
            }
            total += count;
        }
        tracing::trace!(component = id, resolved = total, "resolved references");
        Ok(resolved)
    }
}

fn lookup_reference(
    stack: &Stack,
    id: &str,
    own: &ConfigValue,
    target: &str,
) -> Result<Option<Value>, AppError> {
    let path = ValuePath::parse(target).map_err(|err| reference_error(id, target, err))?;
    let Some((Selector::Field(owner), rest)) = path.split_first() else {
        return Err(reference_error(id, target, "reference must start with a component id"));
    };
    let found = if owner == id {
        own.get(&rest)
    } else {
        stack
            .get_component(owner)
            .map_err(|err| reference_error(id, target, err.message))?
            .get(&rest)
    };
    Ok(found
        .filter(ConfigValue::is_concrete)
        .map(ConfigValue::into_value))
}

fn reference_error(id: &str, target: &str, reason: impl std::fmt::Display) -> AppError {
    AppError::new(
        ErrorCategory::FlowError,
        format!(
            "component {} has an invalid reference to '{}': {}",
            id, target, reason
        ),
    )
    .with_code("FLOW-REF-001")
}

fn resolve_references(
    value: &mut Value,
    lookup: &mut dyn FnMut(&str) -> Result<Option<Value>, AppError>,
) -> Result<usize, AppError> {
    let target = match Marker::of(value) {
        Some(Marker::Reference(target)) => Some(target.to_string()),
        Some(_) => return Ok(0),
        None => None,
    };
    if let Some(target) = target {
        return match lookup(&target)? {
            Some(resolved) => {
                *value = resolved;
                Ok(1)
            }
            None => Ok(0),
        };
    }

    let mut count = 0;
    match value {
        Value::Object(map) => {
            for child in map.values_mut() {
                count += resolve_references(child, lookup)?;
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                count += resolve_references(item, lookup)?;
            }
        }
        _ => {}
    }
    Ok(count)
}

fn fill_defaults(current: &Value, defaults: &Value) -> Value {
    match Marker::of(current) {
        Some(Marker::Abstract(_)) => unify_values(current, defaults),
        Some(_) => current.clone(),
        None => match (current, defaults) {
            (Value::Object(existing), Value::Object(fallbacks)) => {
                let mut merged = existing.clone();
                for (label, fallback) in fallbacks {
                    let value = match existing.get(label) {
                        Some(present) => fill_defaults(present, fallback),
                        None => fallback.clone(),
                    };
                    merged.insert(label.clone(), value);
                }
                Value::Object(merged)
            }
            _ => current.clone(),
        },
    }
}
