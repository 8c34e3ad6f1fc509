use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PysonError {
    #[error("{0}")]
    Arity(String),

    #[error("{0}")]
    InvalidOperand(String),

    #[error("\"{0}\" operands must have compatible types.")]
    IncompatibleTypes(&'static str),

    #[error("Invalid {class} object: {reason}")]
    InvalidShape { class: &'static str, reason: String },

    #[error("Invalid {0} value.")]
    InvalidWireValue(&'static str),

    #[error("Decoded value is not a PYSON expression.")]
    NotAnExpression,

    #[error("Invalid JSON: {0}")]
    Json(String),
}

impl From<serde_json::Error> for PysonError {
    fn from(err: serde_json::Error) -> Self {
        PysonError::Json(err.to_string())
    }
}

impl PysonError {
    pub(crate) fn shape(class: &'static str, reason: impl Into<String>) -> Self {
        PysonError::InvalidShape {
            class,
            reason: reason.into(),
        }
    }
}
