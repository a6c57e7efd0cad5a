use crate::value::{error_value, kind_of, Marker};
use serde_json::Value;

/// Merge two trees into the most specific value that satisfies both.
///
/// Conflicts never fail the call: they are recorded in place as `$error`
/// markers so that a later concreteness check can report every one of them.
pub fn unify_values(left: &Value, right: &Value) -> Value {
    match (Marker::of(left), Marker::of(right)) {
        (Some(Marker::Error(_)), _) => left.clone(),
        (_, Some(Marker::Error(_))) => right.clone(),
        (Some(left_marker), Some(right_marker)) => {
            unify_markers(left, left_marker, right, right_marker)
        }
        (Some(marker), None) => unify_marker_with_value(marker, left, right),
        (None, Some(marker)) => unify_marker_with_value(marker, right, left),
        (None, None) => unify_plain(left, right),
    }
}

fn unify_markers(left: &Value, left_marker: Marker, right: &Value, right_marker: Marker) -> Value {
    match (left_marker, right_marker) {
        (Marker::Reference(_), _) => left.clone(),
        (_, Marker::Reference(_)) => right.clone(),
        (Marker::Abstract(a), Marker::Abstract(b)) => {
            if a == b || b == "any" {
                left.clone()
            } else if a == "any" {
                right.clone()
            } else if (a, b) == ("number", "int") {
                right.clone()
            } else if (a, b) == ("int", "number") {
                left.clone()
            } else {
                conflict(left, right)
            }
        }
        _ => left.clone(),
    }
}

fn unify_marker_with_value(marker: Marker, marker_value: &Value, other: &Value) -> Value {
    match marker {
        Marker::Abstract(kind) if kind_accepts(kind, other) => other.clone(),
        Marker::Abstract(_) => conflict(marker_value, other),
        Marker::Reference(_) => other.clone(),
        Marker::Error(_) => marker_value.clone(),
    }
}

fn kind_accepts(kind: &str, value: &Value) -> bool {
    match kind {
        "any" => true,
        "string" => value.is_string(),
        "int" => value.is_i64() || value.is_u64(),
        "number" => value.is_number(),
        "bool" => value.is_boolean(),
        "list" => value.is_array(),
        "object" | "mapping" => value.is_object(),
        "null" => value.is_null(),
        _ => false,
    }
}

fn unify_plain(left: &Value, right: &Value) -> Value {
    match (left, right) {
        (Value::Object(a), Value::Object(b)) => {
            let mut merged = a.clone();
            for (label, incoming) in b {
                let unified = match merged.get(label) {
                    Some(existing) => unify_values(existing, incoming),
                    None => incoming.clone(),
                };
                merged.insert(label.clone(), unified);
            }
            Value::Object(merged)
        }
        (Value::Array(a), Value::Array(b)) if a.len() == b.len() => Value::Array(
            a.iter()
                .zip(b.iter())
                .map(|(x, y)| unify_values(x, y))
                .collect(),
        ),
        (a, b) if a == b => a.clone(),
        (a, b) => conflict(a, b),
    }
}

fn describe(value: &Value) -> String {
    match Marker::of(value) {
        Some(Marker::Abstract(kind)) => kind.to_string(),
        Some(Marker::Reference(target)) => format!("reference to '{}'", target),
        Some(Marker::Error(message)) => message.to_string(),
        None => match value {
            Value::Object(_) => "{...}".to_string(),
            Value::Array(items) => format!("list of length {}", items.len()),
            scalar => scalar.to_string(),
        },
    }
}

fn conflict(left: &Value, right: &Value) -> Value {
    let (left_kind, right_kind) = (kind_of(left), kind_of(right));
    let message = if left_kind != right_kind && Marker::of(left).is_none() {
        format!(
            "conflicting values {} and {} (mismatched types {} and {})",
            describe(left),
            describe(right),
            left_kind,
            right_kind
        )
    } else {
        format!("conflicting values {} and {}", describe(left), describe(right))
    };
    error_value(&message)
}
