//! `assert` and `error`.

use tracing::warn;

use crate::runner::ds::error::ErrorType;
use crate::runner::ds::operations::type_conversion::to_boolean;
use crate::runner::ds::value::Value;
use crate::runner::plugin::types::EvalContext;

use super::arg;

pub const ASSERTION_FAILED: &str = "assertion failed!";

/// assert(v, message)
///
/// Returns `v` when it converts to true. Strings and numbers go through the
/// boolean conversion, so `assert("false")` and `assert(0)` both fail.
pub fn assert(_ctx: &mut EvalContext, args: Vec<Value>) -> Result<Vec<Value>, ErrorType> {
    let value = arg(&args, 0);
    if to_boolean(&value) {
        return Ok(vec![value]);
    }
    let message = match args.get(1) {
        Some(m) if !m.is_nil() => m.to_string(),
        _ => ASSERTION_FAILED.to_string(),
    };
    warn!(%message, "assertion failed");
    Err(ErrorType::runtime(message, 1))
}

/// error(message, level)
pub fn error(_ctx: &mut EvalContext, args: Vec<Value>) -> Result<Vec<Value>, ErrorType> {
    let message = arg(&args, 0).to_string();
    let level = args.get(1).and_then(Value::as_i64).unwrap_or(1);
    Err(ErrorType::runtime(message, level))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assert_passes_value_through() {
        let mut ctx = EvalContext::new();
        let out = assert(&mut ctx, vec![Value::Integer(7), Value::from("unused")]).unwrap();
        assert_eq!(out, vec![Value::Integer(7)]);
    }

    #[test]
    fn test_assert_default_message() {
        let mut ctx = EvalContext::new();
        match assert(&mut ctx, vec![Value::Boolean(false)]) {
            Err(ErrorType::RuntimeFailure { message, level }) => {
                assert_eq!(message, ASSERTION_FAILED);
                assert_eq!(level, 1);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_assert_false_string() {
        let mut ctx = EvalContext::new();
        assert!(assert(&mut ctx, vec![Value::from("false"), Value::from("no")]).is_err());
    }

    #[test]
    fn test_error_level() {
        let mut ctx = EvalContext::new();
        match error(&mut ctx, vec![Value::from("boom"), Value::Integer(2)]) {
            Err(ErrorType::RuntimeFailure { message, level }) => {
                assert_eq!(message, "boom");
                assert_eq!(level, 2);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
