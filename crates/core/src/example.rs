use std::{error::Error as StdError, fmt::Debug};

use tracing::warn;

use crate::DecorateError;

/// A worked example: a set of arguments and the output they must produce.
///
/// Examples are checked once, when a decorated function is built, against
/// the fully decorated function (hooks included). They act as an inline
/// self-test and are never run again afterwards.
///
/// With the `serde` feature (enabled by default), examples can be loaded from
/// fixture files. A JSON example for a two-argument function looks like
/// `{"input": [3, 4], "expected": 7}`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Example<I, O> {
    /// The arguments to call the function with.
    pub input: I,
    /// The output the call must produce.
    pub expected: O,
}

impl<I, O> Example<I, O> {
    /// Creates an example from its arguments and expected output.
    pub fn new(input: I, expected: O) -> Self {
        Self { input, expected }
    }
}

impl<I, O> From<(I, O)> for Example<I, O> {
    fn from((input, expected): (I, O)) -> Self {
        Self::new(input, expected)
    }
}

/// An example paired with the functions that replay and judge it.
///
/// A `Check` is created only where the inputs are `Clone + Debug` and the
/// output is `PartialEq + Debug`. The function under test needs neither.
pub(crate) struct Check<I, O, E> {
    example: Example<I, O>,
    replay: fn(&I) -> I,
    judge: fn(&str, usize, &Example<I, O>, Result<O, E>) -> Result<(), DecorateError>,
}

impl<I, O, E> Check<I, O, E> {
    pub(crate) fn new(example: Example<I, O>) -> Self
    where
        I: Clone + Debug,
        O: PartialEq + Debug,
        E: StdError + Send + Sync + 'static,
    {
        Self {
            example,
            replay: I::clone,
            judge: check::<I, O, E>,
        }
    }

    /// Returns a fresh copy of the example's arguments.
    pub(crate) fn input(&self) -> I {
        (self.replay)(&self.example.input)
    }

    /// Compares the result of calling the function with [`Check::input`].
    pub(crate) fn verify(
        &self,
        function: &str,
        index: usize,
        result: Result<O, E>,
    ) -> Result<(), DecorateError> {
        (self.judge)(function, index, &self.example, result)
    }
}

impl<I, O, E> Clone for Check<I, O, E>
where
    I: Clone,
    O: Clone,
{
    fn clone(&self) -> Self {
        Self {
            example: self.example.clone(),
            replay: self.replay,
            judge: self.judge,
        }
    }
}

/// Compares the result of running an example against its expected output.
///
/// An `Err` result is a failed example, regardless of what was expected.
pub(crate) fn check<I, O, E>(
    function: &str,
    index: usize,
    example: &Example<I, O>,
    result: Result<O, E>,
) -> Result<(), DecorateError>
where
    I: Debug,
    O: PartialEq + Debug,
    E: StdError + Send + Sync + 'static,
{
    match result {
        Ok(actual) if actual == example.expected => Ok(()),
        Ok(actual) => {
            let error = DecorateError::Mismatch {
                function: function.to_string(),
                index,
                inputs: format!("{:?}", example.input),
                expected: format!("{:?}", example.expected),
                actual: format!("{actual:?}"),
            };
            warn!(function, index, %error, "example mismatch");
            Err(error)
        }
        Err(source) => {
            warn!(function, index, error = %source, "example call failed");
            Err(DecorateError::Failed {
                function: function.to_string(),
                index,
                inputs: format!("{:?}", example.input),
                source: Box::new(source),
            })
        }
    }
}
