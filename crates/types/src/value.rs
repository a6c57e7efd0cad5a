use crate::error::ValueError;
use crate::path::{Selector, ValuePath};
use crate::unify::unify_values;
use serde_json::{Map, Value};

/// Marker key for a field whose value is constrained to a kind but not yet known.
pub const ABSTRACT_KEY: &str = "$abstract";
/// Marker key for a reference to a field of another component.
pub const REFERENCE_KEY: &str = "$ref";
/// Marker key for an evaluation error attached to a node.
pub const ERROR_KEY: &str = "$error";

/// Unresolved node kinds recognized inside a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker<'a> {
    Abstract(&'a str),
    Reference(&'a str),
    Error(&'a str),
}

impl<'a> Marker<'a> {
    /// Detect a marker object: a single-key mapping whose key is a marker key
    /// and whose value is a string.
    pub fn of(value: &'a Value) -> Option<Self> {
        let Value::Object(map) = value else {
            return None;
        };
        if map.len() != 1 {
            return None;
        }
        let (key, inner) = map.iter().next()?;
        let Value::String(text) = inner else {
            return None;
        };
        match key.as_str() {
            ABSTRACT_KEY => Some(Marker::Abstract(text)),
            REFERENCE_KEY => Some(Marker::Reference(text)),
            ERROR_KEY => Some(Marker::Error(text)),
            _ => None,
        }
    }
}

fn marker_value(key: &str, text: &str) -> Value {
    let mut map = Map::new();
    map.insert(key.to_string(), Value::String(text.to_string()));
    Value::Object(map)
}

pub fn abstract_value(kind: &str) -> Value {
    marker_value(ABSTRACT_KEY, kind)
}

pub fn reference_value(target: &str) -> Value {
    marker_value(REFERENCE_KEY, target)
}

pub fn error_value(message: &str) -> Value {
    marker_value(ERROR_KEY, message)
}

/// Kind name used in type errors and conflict messages.
pub fn kind_of(value: &Value) -> &'static str {
    if let Some(marker) = Marker::of(value) {
        return match marker {
            Marker::Abstract(_) => "incomplete value",
            Marker::Reference(_) => "unresolved reference",
            Marker::Error(_) => "error",
        };
    }
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(number) if number.is_i64() || number.is_u64() => "int",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}

/// A labeled child of a mapping value.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub label: String,
    pub value: ConfigValue,
}

/// A configuration subtree together with its absolute location.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigValue {
    path: ValuePath,
    value: Value,
}

impl ConfigValue {
    pub fn new(path: ValuePath, value: Value) -> Self {
        Self { path, value }
    }

    pub fn root(value: Value) -> Self {
        Self::new(ValuePath::root(), value)
    }

    pub fn path(&self) -> &ValuePath {
        &self.path
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut Value {
        &mut self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    pub fn marker(&self) -> Option<Marker<'_>> {
        Marker::of(&self.value)
    }

    pub fn kind(&self) -> &'static str {
        kind_of(&self.value)
    }

    /// Markers and scalars have no children to walk.
    pub fn is_leaf(&self) -> bool {
        self.marker().is_some() || !matches!(self.value, Value::Object(_) | Value::Array(_))
    }

    /// Same subtree relocated under `path`.
    pub fn rebase(self, path: ValuePath) -> Self {
        Self {
            path,
            value: self.value,
        }
    }

    /// Descend along a relative path. Markers stop the descent.
    pub fn get(&self, relative: &ValuePath) -> Option<ConfigValue> {
        let mut current = &self.value;
        for selector in relative.selectors() {
            if Marker::of(current).is_some() {
                return None;
            }
            current = match (selector, current) {
                (Selector::Field(label), Value::Object(map)) => map.get(label)?,
                (Selector::Index(index), Value::Array(items)) => items.get(*index)?,
                _ => return None,
            };
        }
        Some(ConfigValue::new(self.path.join(relative), current.clone()))
    }

    /// Look up a dotted path relative to this value.
    pub fn lookup_path(&self, path: &str) -> Result<ConfigValue, ValueError> {
        let relative = ValuePath::parse(path)?;
        self.get(&relative).ok_or_else(|| ValueError::NotFound {
            path: self.path.join(&relative).describe(),
        })
    }

    /// Like [`ConfigValue::lookup_path`] but treats every failure as absence.
    pub fn lookup(&self, path: &str) -> Option<ConfigValue> {
        self.lookup_path(path).ok()
    }

    pub fn type_mismatch(&self, expected: &'static str) -> ValueError {
        ValueError::TypeMismatch {
            path: self.path.describe(),
            expected,
            found: self.kind(),
        }
    }

    /// Children of a mapping, in declaration order.
    pub fn fields(&self) -> Result<Vec<Field>, ValueError> {
        match &self.value {
            Value::Object(map) if self.marker().is_none() => Ok(map
                .iter()
                .map(|(label, child)| Field {
                    label: label.clone(),
                    value: ConfigValue::new(self.path.child(label), child.clone()),
                })
                .collect()),
            _ => Err(self.type_mismatch("mapping")),
        }
    }

    pub fn list(&self) -> Result<Vec<ConfigValue>, ValueError> {
        match &self.value {
            Value::Array(items) => Ok(items
                .iter()
                .enumerate()
                .map(|(index, item)| ConfigValue::new(self.path.index(index), item.clone()))
                .collect()),
            _ => Err(self.type_mismatch("list")),
        }
    }

    pub fn as_str(&self) -> Result<&str, ValueError> {
        match &self.value {
            Value::String(text) => Ok(text),
            _ => Err(self.type_mismatch("string")),
        }
    }

    /// Evaluation error attached directly to this node, if any.
    pub fn err(&self) -> Option<ValueError> {
        match self.marker() {
            Some(Marker::Error(message)) => Some(ValueError::Evaluation {
                path: self.path.describe(),
                message: message.to_string(),
            }),
            _ => None,
        }
    }

    fn children(&self) -> Vec<ConfigValue> {
        if self.marker().is_some() {
            return Vec::new();
        }
        match &self.value {
            Value::Object(map) => map
                .iter()
                .map(|(label, child)| ConfigValue::new(self.path.child(label), child.clone()))
                .collect(),
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(index, item)| ConfigValue::new(self.path.index(index), item.clone()))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Depth-first walk. `before` runs first and decides whether the children
    /// are visited; `after` runs once the children are done. When `before`
    /// returns false neither the children nor `after` run for that node.
    pub fn walk<B, A>(&self, before: &mut B, after: &mut A)
    where
        B: FnMut(&ConfigValue) -> bool,
        A: FnMut(&ConfigValue),
    {
        if !before(self) {
            return;
        }
        for child in self.children() {
            child.walk(before, after);
        }
        after(self);
    }

    /// Reports the first node, in depth-first order, that is not concrete.
    pub fn validate_concrete(&self) -> Result<(), ValueError> {
        match first_incomplete(&self.path, &self.value) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    pub fn is_concrete(&self) -> bool {
        self.validate_concrete().is_ok()
    }

    /// Unify `other` into this value, keeping this value's location.
    pub fn unify(&self, other: &ConfigValue) -> ConfigValue {
        self.unify_value(&other.value)
    }

    pub fn unify_value(&self, other: &Value) -> ConfigValue {
        ConfigValue::new(self.path.clone(), unify_values(&self.value, other))
    }
}

fn first_incomplete(path: &ValuePath, value: &Value) -> Option<ValueError> {
    if let Some(marker) = Marker::of(value) {
        return Some(match marker {
            Marker::Abstract(kind) => ValueError::NotConcrete {
                path: path.describe(),
                message: format!("incomplete value {}", kind),
            },
            Marker::Reference(target) => ValueError::NotConcrete {
                path: path.describe(),
                message: format!("unresolved reference to '{}'", target),
            },
            Marker::Error(message) => ValueError::Evaluation {
                path: path.describe(),
                message: message.to_string(),
            },
        });
    }
    match value {
        Value::Object(map) => map
            .iter()
            .find_map(|(label, child)| first_incomplete(&path.child(label), child)),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .find_map(|(index, item)| first_incomplete(&path.index(index), item)),
        _ => None,
    }
}
