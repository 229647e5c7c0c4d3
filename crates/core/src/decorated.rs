use std::fmt;

use crate::{Function, Hooks, function::short_type_name};

/// A function wrapped with [`Hooks`].
///
/// `Decorated` has the same calling convention as its base: it takes the same
/// argument tuple and returns the same `Result`. It implements [`Function`],
/// so it can be used anywhere the base could.
///
/// A decorated function keeps no state between calls. Each call runs the
/// input, base, and output-or-error stages from scratch.
///
/// Built by [`Decorator::build`] or, without hooks, by [`decorate`].
///
/// [`Decorator::build`]: crate::Decorator::build
pub struct Decorated<F, Args>
where
    F: Function<Args>,
{
    pub(crate) base: F,
    pub(crate) name: String,
    pub(crate) hooks: Hooks<F, Args, F::Output, F::Error>,
}

/// Wraps a function without any hooks.
///
/// The result behaves exactly like `base`: same outputs, same errors. Calls
/// go straight to the base function.
///
/// # Example
///
/// ```
/// use hitch_core::{Function, decorate};
///
/// fn parse(text: &str) -> Result<i64, std::num::ParseIntError> {
///     text.parse()
/// }
///
/// let wrapped = decorate(parse);
/// assert_eq!(wrapped.call(("42",)), parse("42"));
/// assert_eq!(wrapped.call(("x",)), parse("x"));
/// ```
pub fn decorate<F, Args>(base: F) -> Decorated<F, Args>
where
    F: Function<Args>,
{
    Decorated {
        base,
        name: short_type_name::<F>().to_string(),
        hooks: Hooks::new(),
    }
}

impl<F, Args> Decorated<F, Args>
where
    F: Function<Args>,
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
}

impl<F, Args> Function<Args> for Decorated<F, Args>
where
    F: Function<Args>,
{
    type Output = F::Output;
    type Error = F::Error;

    /// Calls the base function through the hooks.
    ///
    /// # Errors
    ///
    /// Returns the base function's error unless `on_error` recovers it, and
    /// any error raised by a hook.
    fn call(&self, args: Args) -> Result<Self::Output, Self::Error> {
        let args = self.hooks.prepare(&self.base, args)?;

        let Some(retained) = self.hooks.retain(&args) else {
            return self.base.call(args);
        };

        let result = self.base.call(args);
        self.hooks.settle(&self.name, &self.base, result, &retained)
    }
}

impl<F, Args> fmt::Debug for Decorated<F, Args>
where
    F: Function<Args>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decorated")
            .field("name", &self.name)
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}
