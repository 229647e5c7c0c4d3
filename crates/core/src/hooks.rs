use std::{error::Error as StdError, fmt, fmt::Debug, sync::Arc};

use tracing::trace;

use crate::{Example, example::Check};

/// Replaces a function's arguments before it is called.
pub type InputHook<F, Args, E> = Arc<dyn Fn(&F, Args) -> Result<Args, E> + Send + Sync>;

/// Transforms a function's successful output.
///
/// Receives the arguments the function was actually called with.
pub type OutputHook<F, Args, O, E> = Arc<dyn Fn(&F, O, &Args) -> Result<O, E> + Send + Sync>;

/// Recovers from a function's error by producing a substitute output.
///
/// Receives the arguments the function was actually called with. Returning
/// `Err` re-raises, either the original error or a new one.
pub type ErrorHook<F, Args, O, E> = Arc<dyn Fn(&F, E, &Args) -> Result<O, E> + Send + Sync>;

/// The optional hooks that make up a decoration.
///
/// Each hook is independent and receives the base function `F` as its first
/// argument. On every call of a decorated function the hooks run in a fixed
/// order:
///
/// 1. `on_input` replaces the arguments.
/// 2. The base function is called with the (possibly replaced) arguments.
/// 3. On success, `on_output` transforms the output. On failure, `on_error`
///    recovers, and `on_output` is skipped for that call.
///
/// Errors from `on_input` and `on_output` reach the caller directly; only the
/// base call is guarded by `on_error`.
///
/// `examples` are not part of the call path. They are checked once, when
/// the decorated function is built.
///
/// Only `on_output` and `on_error` need the arguments after the base call
/// has consumed them, so only those two require `Args: Clone`. Examples
/// additionally require `Debug` inputs and a `PartialEq + Debug` output.
/// A function with move-only arguments or an opaque output can still take
/// every hook its types allow.
///
/// Hooks are stored behind [`Arc`], so cloning a `Hooks` shares the hook
/// closures rather than copying them. Any state a hook needs (a cache, a
/// counter) lives in the closure itself.
pub struct Hooks<F, Args, O, E> {
    pub(crate) on_input: Option<InputHook<F, Args, E>>,
    pub(crate) on_output: Option<OutputHook<F, Args, O, E>>,
    pub(crate) on_error: Option<ErrorHook<F, Args, O, E>>,
    pub(crate) examples: Vec<Check<Args, O, E>>,
    clone_args: Option<fn(&Args) -> Args>,
}

impl<F, Args, O, E> Hooks<F, Args, O, E> {
    /// Creates an empty set of hooks.
    #[must_use]
    pub fn new() -> Self {
        Self {
            on_input: None,
            on_output: None,
            on_error: None,
            examples: Vec::new(),
            clone_args: None,
        }
    }

    /// Sets the hook that replaces arguments before the base call.
    #[must_use]
    pub fn on_input<H>(mut self, hook: H) -> Self
    where
        H: Fn(&F, Args) -> Result<Args, E> + Send + Sync + 'static,
    {
        self.on_input = Some(Arc::new(hook));
        self
    }

    /// Sets the hook that transforms a successful output.
    #[must_use]
    pub fn on_output<H>(mut self, hook: H) -> Self
    where
        Args: Clone,
        H: Fn(&F, O, &Args) -> Result<O, E> + Send + Sync + 'static,
    {
        self.on_output = Some(Arc::new(hook));
        self.clone_args = Some(Args::clone);
        self
    }

    /// Sets the hook that recovers from a failed base call.
    #[must_use]
    pub fn on_error<H>(mut self, hook: H) -> Self
    where
        Args: Clone,
        H: Fn(&F, E, &Args) -> Result<O, E> + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(hook));
        self.clone_args = Some(Args::clone);
        self
    }

    /// Adds an example to check at build time.
    #[must_use]
    pub fn example(self, input: Args, expected: O) -> Self
    where
        Args: Clone + Debug,
        O: PartialEq + Debug,
        E: StdError + Send + Sync + 'static,
    {
        self.examples([Example::new(input, expected)])
    }

    /// Adds several examples, checked in iteration order.
    #[must_use]
    pub fn examples<I>(mut self, examples: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Example<Args, O>>,
        Args: Clone + Debug,
        O: PartialEq + Debug,
        E: StdError + Send + Sync + 'static,
    {
        self.examples
            .extend(examples.into_iter().map(|example| Check::new(example.into())));
        self
    }

    /// Returns `true` if no call-path hook is set.
    ///
    /// Examples do not count: they never run during a call.
    pub fn is_passthrough(&self) -> bool {
        self.on_input.is_none() && self.on_output.is_none() && self.on_error.is_none()
    }

    /// Copies the arguments if a later stage needs them after the base call.
    ///
    /// Returns `None` when neither `on_output` nor `on_error` is set, in
    /// which case the arguments can be moved into the base call.
    pub(crate) fn retain(&self, args: &Args) -> Option<Args> {
        self.clone_args.map(|clone| clone(args))
    }

    /// Runs the input stage.
    pub(crate) fn prepare(&self, base: &F, args: Args) -> Result<Args, E> {
        match &self.on_input {
            Some(hook) => hook(base, args),
            None => Ok(args),
        }
    }

    /// Splits off the examples, leaving only the call-path hooks.
    pub(crate) fn take_examples(&mut self) -> Vec<Check<Args, O, E>> {
        std::mem::take(&mut self.examples)
    }
}

impl<F, Args, O, E> Hooks<F, Args, O, E>
where
    E: fmt::Display,
{
    /// Runs the output or error stage on the result of the base call.
    pub(crate) fn settle(
        &self,
        function: &str,
        base: &F,
        result: Result<O, E>,
        args: &Args,
    ) -> Result<O, E> {
        match result {
            Ok(output) => match &self.on_output {
                Some(hook) => hook(base, output, args),
                None => Ok(output),
            },
            Err(error) => match &self.on_error {
                Some(hook) => {
                    trace!(function, %error, "recovering from error");
                    hook(base, error, args)
                }
                None => Err(error),
            },
        }
    }
}

impl<F, Args, O, E> Default for Hooks<F, Args, O, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F, Args, O, E> Clone for Hooks<F, Args, O, E>
where
    Args: Clone,
    O: Clone,
{
    fn clone(&self) -> Self {
        Self {
            on_input: self.on_input.clone(),
            on_output: self.on_output.clone(),
            on_error: self.on_error.clone(),
            examples: self.examples.clone(),
            clone_args: self.clone_args,
        }
    }
}

impl<F, Args, O, E> fmt::Debug for Hooks<F, Args, O, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("on_input", &self.on_input.is_some())
            .field("on_output", &self.on_output.is_some())
            .field("on_error", &self.on_error.is_some())
            .field("examples", &self.examples.len())
            .finish()
    }
}
