//! Schema-free configuration values for devx.
//!
//! A [`ConfigValue`] is a tree of JSON-like data that remembers the absolute
//! [`ValuePath`] it was taken from. Unresolved data is expressed with marker
//! objects (`$abstract`, `$ref`, `$error`) so that stacks can be declared
//! before every field is known and resolved later by flows.

pub mod error;
pub mod path;
pub mod unify;
pub mod value;

pub use error::ValueError;
pub use path::{Selector, ValuePath};
pub use unify::unify_values;
pub use value::{
    abstract_value, error_value, kind_of, reference_value, ConfigValue, Field, Marker,
    ABSTRACT_KEY, ERROR_KEY, REFERENCE_KEY,
};
