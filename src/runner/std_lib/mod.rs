//! Standard library: the core functions and the system libraries.
//!
//! Every function here has the [`NativeFn`](crate::runner::plugin::types::NativeFn)
//! signature. Core functions are bound to the environment that resolved
//! them, so `ctx.global` is always the caller's own environment.

pub mod chunk;
pub mod console;
pub mod conversion;
pub mod core;
pub mod error;
pub mod gc;
pub mod math;
pub mod raw;
pub mod select;
pub mod string;

pub use self::core::{register_core_functions, register_system_libraries};

use crate::runner::ds::error::ErrorType;
use crate::runner::ds::value::Value;

/// `bad argument #n to 'f' (expected)` in the conventional wording.
pub(crate) fn bad_argument(position: usize, function: &str, message: impl AsRef<str>) -> ErrorType {
    ErrorType::argument(
        format!("#{}", position),
        format!("bad argument #{} to '{}' ({})", position, function, message.as_ref()),
    )
}

pub(crate) fn arg(args: &[Value], index: usize) -> Value {
    args.get(index).cloned().unwrap_or(Value::Nil)
}
