/// Errors raised by the transform pipeline
use thiserror::Error;

/// Transform pipeline error types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransformError {
    /// The accumulated camera matrix has no inverse
    #[error("camera matrix is not invertible")]
    Degenerate,
    #[error("transform stack is full ({0} entries)")]
    StackOverflow(usize),
    /// Only the perspective entry is left; it is never popped
    #[error("cannot pop the perspective entry off the transform stack")]
    StackUnderflow,
}

pub type TransformResult<T> = Result<T, TransformError>;
