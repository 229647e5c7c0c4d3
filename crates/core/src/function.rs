use std::{any::type_name, error::Error as StdError};

/// A fallible function that can be decorated.
///
/// `Args` is the tuple of the function's parameters, in declaration order.
/// A function `fn(A, B) -> Result<O, E>` implements `Function<(A, B)>` and is
/// called as `Function::call(&f, (a, b))`. A single-parameter function takes
/// a one-element tuple `(a,)` and a function without parameters takes `()`.
///
/// You rarely implement this trait by hand. It is implemented for every `Fn`
/// of up to eight parameters that returns a `Result`, and for [`Decorated`]
/// itself, so a decorated function can be used anywhere its base could.
///
/// Functions that cannot fail return `Result<O, Infallible>`.
///
/// [`Decorated`]: crate::Decorated
///
/// # Example
///
/// ```
/// use std::convert::Infallible;
/// use hitch_core::Function;
///
/// fn area(width: u32, height: u32) -> Result<u32, Infallible> {
///     Ok(width * height)
/// }
///
/// assert_eq!(Function::call(&area, (3, 4)), Ok(12));
/// ```
pub trait Function<Args> {
    type Output;
    type Error: StdError + Send + Sync + 'static;

    /// Calls the function with the given arguments.
    ///
    /// # Errors
    ///
    /// Each function defines its own `Error` type to represent its failures.
    fn call(&self, args: Args) -> Result<Self::Output, Self::Error>;
}

macro_rules! impl_function {
    ($($ty:ident $arg:ident),*) => {
        impl<Func, $($ty,)* O, E> Function<($($ty,)*)> for Func
        where
            Func: Fn($($ty),*) -> Result<O, E>,
            E: StdError + Send + Sync + 'static,
        {
            type Output = O;
            type Error = E;

            fn call(&self, ($($arg,)*): ($($ty,)*)) -> Result<O, E> {
                (self)($($arg),*)
            }
        }
    };
}

impl_function!();
impl_function!(A a);
impl_function!(A a, B b);
impl_function!(A a, B b, C c);
impl_function!(A a, B b, C c, D d);
impl_function!(A a, B b, C c, D d, G g);
impl_function!(A a, B b, C c, D d, G g, H h);
impl_function!(A a, B b, C c, D d, G g, H h, J j);
impl_function!(A a, B b, C c, D d, G g, H h, J j, K k);

/// Returns the last path segment of a type's name, without type arguments.
///
/// Used as the default display name of a decorated function, so both
/// `my_crate::parse` and `my_crate::echo::<String>` name themselves by their
/// function name.
pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let full_type_name = type_name::<T>();
    let path = full_type_name
        .split('<')
        .next()
        .unwrap_or(full_type_name);
    path.rsplit("::").next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use thiserror::Error;

    use super::*;

    #[derive(Debug, Error, PartialEq)]
    #[error("cannot take the square root of {0}")]
    struct NegativeRoot(f64);

    fn answer() -> Result<i32, Infallible> {
        Ok(42)
    }

    fn negate(x: i32) -> Result<i32, Infallible> {
        Ok(-x)
    }

    fn sqrt(x: f64) -> Result<f64, NegativeRoot> {
        if x < 0.0 {
            Err(NegativeRoot(x))
        } else {
            Ok(x.sqrt())
        }
    }

    fn join(a: &str, b: &str, c: &str) -> Result<String, Infallible> {
        Ok(format!("{a}-{b}-{c}"))
    }

    #[test]
    fn functions_of_any_arity_are_callable_with_tuples() {
        assert_eq!(Function::call(&answer, ()), Ok(42));
        assert_eq!(Function::call(&negate, (7,)), Ok(-7));
        assert_eq!(Function::call(&join, ("a", "b", "c")), Ok("a-b-c".to_string()));
    }

    #[test]
    fn errors_are_returned_as_is() {
        assert_eq!(Function::call(&sqrt, (4.0,)), Ok(2.0));
        assert_eq!(Function::call(&sqrt, (-1.0,)), Err(NegativeRoot(-1.0)));
    }

    #[test]
    fn closures_are_functions() {
        let offset = 10;
        let shift = move |x: i32, y: i32| Ok::<_, Infallible>((x + offset, y + offset));
        assert_eq!(Function::call(&shift, (1, 2)), Ok((11, 12)));
    }

    #[test]
    fn short_type_name_drops_the_path() {
        assert_eq!(short_type_name::<NegativeRoot>(), "NegativeRoot");
        assert_eq!(short_type_name::<String>(), "String");
    }

    #[test]
    fn short_type_name_drops_type_arguments() {
        fn echo<T>(value: T) -> Result<T, Infallible> {
            Ok(value)
        }

        fn name_of<T>(_: &T) -> &'static str {
            short_type_name::<T>()
        }

        assert_eq!(name_of(&echo::<String>), "echo");
        assert_eq!(name_of(&echo::<Vec<(u8, String)>>), "echo");
        assert_eq!(short_type_name::<Vec<String>>(), "Vec");
    }
}
