use std::{error::Error as StdError, fmt, fmt::Debug, pin::Pin, sync::Arc};

use tracing::{debug, trace};

use crate::{DecorateError, Example, example::Check, function::short_type_name};

/// A fallible function that returns a future.
///
/// The asynchronous counterpart of [`Function`]: `Args` is the tuple of the
/// function's parameters, and the returned future resolves to a `Result`.
/// It is implemented for every `Fn` of up to eight parameters that returns a
/// `Future<Output = Result<O, E>>`, which includes `async fn`s.
///
/// [`Function`]: crate::Function
pub trait AsyncFunction<Args> {
    type Output;
    type Error: StdError + Send + Sync + 'static;

    /// Calls the function with the given arguments.
    ///
    /// # Errors
    ///
    /// The returned future resolves to the function's own `Error` type on
    /// failure.
    fn call(&self, args: Args) -> impl Future<Output = Result<Self::Output, Self::Error>>;
}

macro_rules! impl_async_function {
    ($($ty:ident $arg:ident),*) => {
        impl<Func, Fut, $($ty,)* O, E> AsyncFunction<($($ty,)*)> for Func
        where
            Func: Fn($($ty),*) -> Fut,
            Fut: Future<Output = Result<O, E>>,
            E: StdError + Send + Sync + 'static,
        {
            type Output = O;
            type Error = E;

            fn call(&self, ($($arg,)*): ($($ty,)*)) -> impl Future<Output = Result<O, E>> {
                (self)($($arg),*)
            }
        }
    };
}

impl_async_function!();
impl_async_function!(A a);
impl_async_function!(A a, B b);
impl_async_function!(A a, B b, C c);
impl_async_function!(A a, B b, C c, D d);
impl_async_function!(A a, B b, C c, D d, G g);
impl_async_function!(A a, B b, C c, D d, G g, H h);
impl_async_function!(A a, B b, C c, D d, G g, H h, J j);
impl_async_function!(A a, B b, C c, D d, G g, H h, J j, K k);

/// The future returned by an asynchronous hook, boxed so hooks can be stored.
type HookFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

type AsyncInputHook<F, Args, E> =
    Arc<dyn Fn(&F, Args) -> HookFuture<Result<Args, E>> + Send + Sync>;

type AsyncOutputHook<F, Args, O, E> =
    Arc<dyn Fn(&F, O, &Args) -> HookFuture<Result<O, E>> + Send + Sync>;

type AsyncErrorHook<F, Args, O, E> =
    Arc<dyn Fn(&F, E, &Args) -> HookFuture<Result<O, E>> + Send + Sync>;

/// The hooks of an [`AsyncDecorated`] function.
///
/// Same stages as [`Hooks`](crate::Hooks), but every hook returns a future
/// that is awaited before the next stage starts.
struct AsyncHooks<F, Args, O, E> {
    on_input: Option<AsyncInputHook<F, Args, E>>,
    on_output: Option<AsyncOutputHook<F, Args, O, E>>,
    on_error: Option<AsyncErrorHook<F, Args, O, E>>,
    clone_args: Option<fn(&Args) -> Args>,
}

impl<F, Args, O, E> AsyncHooks<F, Args, O, E> {
    fn new() -> Self {
        Self {
            on_input: None,
            on_output: None,
            on_error: None,
            clone_args: None,
        }
    }

    fn is_passthrough(&self) -> bool {
        self.on_input.is_none() && self.on_output.is_none() && self.on_error.is_none()
    }

    fn retain(&self, args: &Args) -> Option<Args> {
        self.clone_args.map(|clone| clone(args))
    }

    async fn prepare(&self, base: &F, args: Args) -> Result<Args, E> {
        match &self.on_input {
            Some(hook) => hook(base, args).await,
            None => Ok(args),
        }
    }
}

impl<F, Args, O, E> AsyncHooks<F, Args, O, E>
where
    E: fmt::Display,
{
    async fn settle(
        &self,
        function: &str,
        base: &F,
        result: Result<O, E>,
        args: &Args,
    ) -> Result<O, E> {
        match result {
            Ok(output) => match &self.on_output {
                Some(hook) => hook(base, output, args).await,
                None => Ok(output),
            },
            Err(error) => match &self.on_error {
                Some(hook) => {
                    trace!(function, %error, "recovering from error");
                    hook(base, error, args).await
                }
                None => Err(error),
            },
        }
    }
}

impl<F, Args, O, E> fmt::Debug for AsyncHooks<F, Args, O, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncHooks")
            .field("on_input", &self.on_input.is_some())
            .field("on_output", &self.on_output.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

/// An asynchronous function wrapped with asynchronous hooks.
///
/// Each stage is awaited to completion before the next one starts: the input
/// hook, then the base future, then the output or error hook. Stages follow
/// the same order as for [`Decorated`](crate::Decorated), with respect to
/// when each one completes.
pub struct AsyncDecorated<F, Args>
where
    F: AsyncFunction<Args>,
{
    base: F,
    name: String,
    hooks: AsyncHooks<F, Args, F::Output, F::Error>,
}

/// Wraps an asynchronous function without any hooks.
pub fn decorate_async<F, Args>(base: F) -> AsyncDecorated<F, Args>
where
    F: AsyncFunction<Args>,
{
    AsyncDecorated {
        base,
        name: short_type_name::<F>().to_string(),
        hooks: AsyncHooks::new(),
    }
}

impl<F, Args> AsyncDecorated<F, Args>
where
    F: AsyncFunction<Args>,
{
    /// Returns the base function.
    pub fn base(&self) -> &F {
        &self.base
    }

    /// Returns the name used for this function in diagnostics.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` if any call-path hook is set.
    pub fn has_hooks(&self) -> bool {
        !self.hooks.is_passthrough()
    }

    /// Discards the hooks and returns the base function.
    pub fn into_base(self) -> F {
        self.base
    }

    async fn invoke(&self, args: Args) -> Result<F::Output, F::Error> {
        let args = self.hooks.prepare(&self.base, args).await?;

        let Some(retained) = self.hooks.retain(&args) else {
            return self.base.call(args).await;
        };

        let result = self.base.call(args).await;
        self.hooks
            .settle(&self.name, &self.base, result, &retained)
            .await
    }
}

impl<F, Args> AsyncFunction<Args> for AsyncDecorated<F, Args>
where
    F: AsyncFunction<Args>,
{
    type Output = F::Output;
    type Error = F::Error;

    fn call(&self, args: Args) -> impl Future<Output = Result<Self::Output, Self::Error>> {
        self.invoke(args)
    }
}

impl<F, Args> fmt::Debug for AsyncDecorated<F, Args>
where
    F: AsyncFunction<Args>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncDecorated")
            .field("name", &self.name)
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}

/// Builds an [`AsyncDecorated`] function.
///
/// Mirrors [`Decorator`](crate::Decorator), except that each hook returns a
/// future and [`build()`] is `async` because checking the examples awaits the
/// decorated function.
///
/// A hook is called with borrowed arguments and returns a `'static` future,
/// so anything the future needs from them is copied out before the `async`
/// block starts.
///
/// [`build()`]: AsyncDecorator::build
///
/// # Example
///
/// ```
/// use hitch_core::{AsyncDecorator, AsyncFunction};
///
/// #[derive(Debug, PartialEq, thiserror::Error)]
/// #[error("no price for {0}")]
/// struct NoPrice(&'static str);
///
/// async fn price(symbol: &'static str) -> Result<u32, NoPrice> {
///     match symbol {
///         "ACME" => Ok(120),
///         other => Err(NoPrice(other)),
///     }
/// }
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let with_fallback = AsyncDecorator::new(price)
///     .on_error(|_, _, _| async { Ok(100) })
///     .example(("ACME",), 120)
///     .example(("INIT",), 100)
///     .build()
///     .await
///     .unwrap();
///
/// assert_eq!(with_fallback.call(("XYZ",)).await, Ok(100));
/// # });
/// ```
pub struct AsyncDecorator<F, Args>
where
    F: AsyncFunction<Args>,
{
    base: F,
    name: String,
    hooks: AsyncHooks<F, Args, F::Output, F::Error>,
    examples: Vec<Check<Args, F::Output, F::Error>>,
}

impl<F, Args> AsyncDecorator<F, Args>
where
    F: AsyncFunction<Args>,
{
    /// Starts decorating `base` with no hooks.
    pub fn new(base: F) -> Self {
        Self {
            base,
            name: short_type_name::<F>().to_string(),
            hooks: AsyncHooks::new(),
            examples: Vec::new(),
        }
    }

    /// Sets the name reported in diagnostics and example failures.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the hook that replaces arguments before the base call.
    ///
    /// The base future is not created until the hook's future resolves.
    #[must_use]
    pub fn on_input<H, Fut>(mut self, hook: H) -> Self
    where
        H: Fn(&F, Args) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Args, F::Error>> + Send + 'static,
    {
        self.hooks.on_input = Some(Arc::new(
            move |base: &F, args: Args| -> HookFuture<Result<Args, F::Error>> {
                Box::pin(hook(base, args))
            },
        ));
        self
    }

    /// Sets the hook that transforms a successful output.
    #[must_use]
    pub fn on_output<H, Fut>(mut self, hook: H) -> Self
    where
        Args: Clone,
        H: Fn(&F, F::Output, &Args) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<F::Output, F::Error>> + Send + 'static,
    {
        self.hooks.on_output = Some(Arc::new(
            move |base: &F,
                  output: F::Output,
                  args: &Args|
                  -> HookFuture<Result<F::Output, F::Error>> {
                Box::pin(hook(base, output, args))
            },
        ));
        self.hooks.clone_args = Some(Args::clone);
        self
    }

    /// Sets the hook that recovers from a failed base call.
    #[must_use]
    pub fn on_error<H, Fut>(mut self, hook: H) -> Self
    where
        Args: Clone,
        H: Fn(&F, F::Error, &Args) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<F::Output, F::Error>> + Send + 'static,
    {
        self.hooks.on_error = Some(Arc::new(
            move |base: &F,
                  error: F::Error,
                  args: &Args|
                  -> HookFuture<Result<F::Output, F::Error>> {
                Box::pin(hook(base, error, args))
            },
        ));
        self.hooks.clone_args = Some(Args::clone);
        self
    }

    /// Adds an example to check at build time.
    #[must_use]
    pub fn example(self, input: Args, expected: F::Output) -> Self
    where
        Args: Clone + Debug,
        F::Output: PartialEq + Debug,
    {
        self.examples([Example::new(input, expected)])
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
        self.examples
            .extend(examples.into_iter().map(|example| Check::new(example.into())));
        self
    }

    /// Finishes the decoration and checks the examples, one at a time.
    ///
    /// # Errors
    ///
    /// Returns a [`DecorateError`] for the first example whose output does not
    /// equal its expected value, or whose call fails.
    pub async fn build(self) -> Result<AsyncDecorated<F, Args>, DecorateError> {
        let Self {
            base,
            name,
            hooks,
            examples,
        } = self;

        let decorated = AsyncDecorated { base, name, hooks };

        if !examples.is_empty() {
            debug!(
                function = decorated.name(),
                count = examples.len(),
                "checking examples"
            );
        }

        for (index, check) in examples.iter().enumerate() {
            let result = decorated.invoke(check.input()).await;
            check.verify(decorated.name(), index, result)?;
        }

        Ok(decorated)
    }
}
