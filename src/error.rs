use thiserror::Error;

/// Errors raised by matrix construction, activations and layers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NnError {
    #[error("shape mismatch: expected {expected_rows}x{expected_cols}, got {rows}x{cols}")]
    ShapeMismatch {
        expected_rows: usize,
        expected_cols: usize,
        rows: usize,
        cols: usize,
    },

    #[error("unsupported activation: {0}")]
    UnsupportedActivation(String),

    #[error("failed to allocate a {rows}x{cols} matrix")]
    AllocationFailure { rows: usize, cols: usize },

    #[error("invalid layer configuration: {0}")]
    InvalidConfig(String),

    #[error("{0}: backward called before any forward pass")]
    NotForwarded(&'static str),
}

pub type NnResult<T> = Result<T, NnError>;
