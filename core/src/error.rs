use thiserror::Error;

/// Error type for equation substitution, parsing and evaluation.
#[derive(Error, Debug, Clone, PartialEq, uniffi::Error)]
#[uniffi(flat_error)]
pub enum CalcError {
    #[error("parse error at position {position}: {message}")]
    ParseError { position: usize, message: String },

    #[error("unresolved field: {0}")]
    UnresolvedField(String),

    #[error("unknown function: {0}")]
    UnknownFunction(String),

    #[error("empty expression")]
    EmptyExpression,
}

impl CalcError {
    pub(crate) fn parse(position: usize, message: impl Into<String>) -> Self {
        CalcError::ParseError {
            position,
            message: message.into(),
        }
    }

    /// True for failures raised while reading the flattened arithmetic,
    /// as opposed to failures resolving fields or functions.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            CalcError::ParseError { .. } | CalcError::EmptyExpression
        )
    }
}
