use thiserror::Error;

/// Failures raised while reading or validating a [`crate::ConfigValue`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("{path}: field not found")]
    NotFound { path: String },

    #[error("{path}: expected {expected}, found {found}")]
    TypeMismatch {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    /// The node (or one of its descendants) still carries an unresolved marker.
    #[error("{message}")]
    NotConcrete { path: String, message: String },

    /// An evaluation error attached to the node itself.
    #[error("{message}")]
    Evaluation { path: String, message: String },

    #[error("invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },
}

impl ValueError {
    /// Location the error refers to.
    pub fn path(&self) -> &str {
        match self {
            ValueError::NotFound { path }
            | ValueError::TypeMismatch { path, .. }
            | ValueError::NotConcrete { path, .. }
            | ValueError::Evaluation { path, .. }
            | ValueError::InvalidPath { path, .. } => path,
        }
    }
}
