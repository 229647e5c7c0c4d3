//! Core traits and types for the Hitch decorator.
//!
//! Hitch wraps a function with optional lifecycle hooks without touching the
//! function's own body:
//!
//! - [`Function`] — any `Fn(A, B, ...) -> Result<O, E>`, called with its
//!   arguments packed into a tuple
//! - [`Hooks`] — the optional input, output, and error hooks plus the worked
//!   [`Example`]s checked at decoration time
//! - [`Decorator`] — builds a [`Decorated`] function and verifies its examples
//! - [`decorate`] — wraps a function with no hooks at all
//! - [`AsyncFunction`], [`AsyncDecorator`], [`AsyncDecorated`] — the same
//!   contract for functions that return futures
//!
//! # Example
//!
//! ```
//! use std::convert::Infallible;
//! use hitch_core::{Decorator, Function};
//!
//! fn add(a: i32, b: i32) -> Result<i32, Infallible> {
//!     Ok(a + b)
//! }
//!
//! let doubled = Decorator::new(add)
//!     .on_output(|_add, sum, _args| Ok(sum * 2))
//!     .example((1, 2), 6)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(doubled.call((2, 3)), Ok(10));
//! ```

mod decorated;
mod decorator;
mod error;
mod example;
mod function;
mod future;
mod hooks;

pub use decorated::{Decorated, decorate};
pub use decorator::Decorator;
pub use error::DecorateError;
pub use example::Example;
pub use function::Function;
pub use future::{AsyncDecorated, AsyncDecorator, AsyncFunction, decorate_async};
pub use hooks::{ErrorHook, Hooks, InputHook, OutputHook};
