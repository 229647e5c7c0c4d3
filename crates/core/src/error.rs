use std::error::Error as StdError;

use thiserror::Error;

/// Errors that can occur while decorating a function.
///
/// These are construction-time failures: a decorated function whose examples
/// do not hold is never handed back to the caller. Errors raised while
/// *calling* a decorated function are the function's own error type and pass
/// through untouched.
///
/// Inputs and values are rendered with their `Debug` representation.
#[derive(Debug, Error)]
pub enum DecorateError {
    /// An example produced a different output than expected.
    #[error(
        "`{function}` failed example {index}: called with {inputs}, expected {expected}, got {actual}"
    )]
    Mismatch {
        function: String,
        index: usize,
        inputs: String,
        expected: String,
        actual: String,
    },

    /// Calling the decorated function on an example returned an error.
    #[error("`{function}` failed example {index}: called with {inputs}, returned an error")]
    Failed {
        function: String,
        index: usize,
        inputs: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl DecorateError {
    /// Returns the name of the function whose example failed.
    pub fn function(&self) -> &str {
        match self {
            Self::Mismatch { function, .. } | Self::Failed { function, .. } => function,
        }
    }

    /// Returns the position of the failing example.
    pub fn index(&self) -> usize {
        match self {
            Self::Mismatch { index, .. } | Self::Failed { index, .. } => *index,
        }
    }
}
