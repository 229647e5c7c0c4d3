use std::fmt::Debug;

use tracing::debug;

use crate::{DecorateError, Decorated, Example, Function, Hooks, function::short_type_name};

/// Builds a [`Decorated`] function from a base function and its hooks.
///
/// Every hook is optional. Setting none of them produces a decorated function
/// that behaves exactly like the base.
///
/// The base's types only need to support the hooks actually set:
/// `on_output` and `on_error` need `Clone` arguments, and examples also need
/// `Debug` arguments and a `PartialEq + Debug` output.
///
/// [`build()`] checks each example against the finished decorated function,
/// in the order they were added, and fails on the first one that does not
/// hold.
///
/// [`build()`]: Decorator::build
///
/// # Example
///
/// ```
/// use std::convert::Infallible;
/// use hitch_core::{Decorator, Function};
///
/// fn add(a: i32, b: i32) -> Result<i32, Infallible> {
///     Ok(a + b)
/// }
///
/// // Clamp negative arguments to zero before adding.
/// let add_non_negative = Decorator::new(add)
///     .on_input(|_add, (a, b)| Ok((a.max(0), b.max(0))))
///     .examples([((1, 2), 3), ((-5, 4), 4)])
///     .build()
///     .unwrap();
///
/// assert_eq!(add_non_negative.call((-1, -1)), Ok(0));
///
/// // A wrong example is caught before the function is ever handed out.
/// let error = Decorator::new(add)
///     .example((3, 4), 8)
///     .build()
///     .unwrap_err();
///
/// assert!(error.to_string().contains("expected 8, got 7"));
/// ```
pub struct Decorator<F, Args>
where
    F: Function<Args>,
{
    base: F,
    name: String,
    hooks: Hooks<F, Args, F::Output, F::Error>,
}

impl<F, Args> Decorator<F, Args>
where
    F: Function<Args>,
{
    /// Starts decorating `base` with no hooks.
    pub fn new(base: F) -> Self {
        Self::with_hooks(base, Hooks::new())
    }

    /// Starts decorating `base` with a prepared set of hooks.
    pub fn with_hooks(base: F, hooks: Hooks<F, Args, F::Output, F::Error>) -> Self {
        Self {
            base,
            name: short_type_name::<F>().to_string(),
            hooks,
        }
    }

    /// Sets the name reported in diagnostics and example failures.
    ///
    /// Defaults to the base function's type name, which is unhelpful for
    /// closures.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the hook that replaces arguments before the base call.
    ///
    /// The hook must return a complete argument tuple. An error it returns
    /// reaches the caller directly and the base function is not called.
    #[must_use]
    pub fn on_input<H>(mut self, hook: H) -> Self
    where
        H: Fn(&F, Args) -> Result<Args, F::Error> + Send + Sync + 'static,
    {
        self.hooks = self.hooks.on_input(hook);
        self
    }

    /// Sets the hook that transforms a successful output.
    ///
    /// Not called when the base function fails, even if `on_error` recovers.
    #[must_use]
    pub fn on_output<H>(mut self, hook: H) -> Self
    where
        Args: Clone,
        H: Fn(&F, F::Output, &Args) -> Result<F::Output, F::Error> + Send + Sync + 'static,
    {
        self.hooks = self.hooks.on_output(hook);
        self
    }

    /// Sets the hook that recovers from a failed base call.
    ///
    /// Its result is returned as is. Errors from the other hooks are never
    /// passed to it.
    #[must_use]
    pub fn on_error<H>(mut self, hook: H) -> Self
    where
        Args: Clone,
        H: Fn(&F, F::Error, &Args) -> Result<F::Output, F::Error> + Send + Sync + 'static,
    {
        self.hooks = self.hooks.on_error(hook);
        self
    }

    /// Adds an example to check at build time.
    #[must_use]
    pub fn example(mut self, input: Args, expected: F::Output) -> Self
    where
        Args: Clone + Debug,
        F::Output: PartialEq + Debug,
    {
        self.hooks = self.hooks.example(input, expected);
        self
    }

    /// Adds several examples, checked in iteration order.
    #[must_use]
    pub fn examples<I>(mut self, examples: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Example<Args, F::Output>>,
        Args: Clone + Debug,
        F::Output: PartialEq + Debug,
    {
        self.hooks = self.hooks.examples(examples);
        self
    }

    /// Finishes the decoration and checks the examples.
    ///
    /// # Errors
    ///
    /// Returns a [`DecorateError`] for the first example whose output does not
    /// equal its expected value, or whose call fails. Later examples are not
    /// run.
    pub fn build(self) -> Result<Decorated<F, Args>, DecorateError> {
        let Self {
            base,
            name,
            mut hooks,
        } = self;

        let examples = hooks.take_examples();
        let decorated = Decorated { base, name, hooks };

        if !examples.is_empty() {
            debug!(
                function = decorated.name(),
                count = examples.len(),
                "checking examples"
            );
        }

        for (index, check) in examples.iter().enumerate() {
            let result = decorated.call(check.input());
            check.verify(decorated.name(), index, result)?;
        }

        Ok(decorated)
    }
}
