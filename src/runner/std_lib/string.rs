//! The `string` library. Positions are 1-based character indices and
//! negative positions count from the end.

use crate::runner::ds::error::ErrorType;
use crate::runner::ds::heap::OUT_OF_MEMORY;
use crate::runner::ds::value::Value;
use crate::runner::plugin::types::{EvalContext, LibraryObject};

use super::bad_argument;

/// Largest string `rep` builds, whatever the heap limit.
pub const MAX_REP_BYTES: usize = 1 << 30;

pub fn library() -> LibraryObject {
    LibraryObject::new("string")
        .add_method("len", string_len)
        .add_method("lower", string_lower)
        .add_method("rep", string_rep)
        .add_method("sub", string_sub)
        .add_method("upper", string_upper)
}

/// Strings as given; numbers in their default string form.
fn to_text(args: &[Value], index: usize, function: &str) -> Result<String, ErrorType> {
    match args.get(index) {
        Some(Value::String(s)) => Ok(s.to_string()),
        Some(v) if v.kind().is_numeric() => Ok(v.to_string()),
        Some(v) => Err(bad_argument(index + 1, function, format!("string expected, got {}", v.type_name()))),
        None => Err(bad_argument(index + 1, function, "string expected, got no value")),
    }
}

fn to_int(args: &[Value], index: usize, function: &str, default: i64) -> Result<i64, ErrorType> {
    match args.get(index) {
        None | Some(Value::Nil) => Ok(default),
        Some(v) => v.as_i64().ok_or_else(|| {
            bad_argument(index + 1, function, "number has no integer representation")
        }),
    }
}

fn string_len(_ctx: &mut EvalContext, args: Vec<Value>) -> Result<Vec<Value>, ErrorType> {
    let s = to_text(&args, 0, "len")?;
    Ok(vec![Value::from_i64(s.chars().count() as i64)])
}

fn string_upper(_ctx: &mut EvalContext, args: Vec<Value>) -> Result<Vec<Value>, ErrorType> {
    Ok(vec![Value::from(to_text(&args, 0, "upper")?.to_uppercase())])
}

fn string_lower(_ctx: &mut EvalContext, args: Vec<Value>) -> Result<Vec<Value>, ErrorType> {
    Ok(vec![Value::from(to_text(&args, 0, "lower")?.to_lowercase())])
}

/// string.sub(s, i, j)
fn string_sub(_ctx: &mut EvalContext, args: Vec<Value>) -> Result<Vec<Value>, ErrorType> {
    let chars: Vec<char> = to_text(&args, 0, "sub")?.chars().collect();
    let len = chars.len() as i64;
    let resolve = |p: i64| if p < 0 { (len + p + 1).max(0) } else { p };
    let start = resolve(to_int(&args, 1, "sub", 1)?).max(1);
    let end = resolve(to_int(&args, 2, "sub", -1)?).min(len);
    if start > end {
        return Ok(vec![Value::from("")]);
    }
    let out: String = chars[(start - 1) as usize..end as usize].iter().collect();
    Ok(vec![Value::from(out)])
}

/// string.rep(s, n)
///
/// The result is checked against the environment's heap limit before it
/// is built.
fn string_rep(ctx: &mut EvalContext, args: Vec<Value>) -> Result<Vec<Value>, ErrorType> {
    let s = to_text(&args, 0, "rep")?;
    let n = to_int(&args, 1, "rep", 1)?;
    if n <= 0 {
        return Ok(vec![Value::from("")]);
    }
    let total = usize::try_from(n)
        .ok()
        .and_then(|n| s.len().checked_mul(n))
        .filter(|total| *total <= MAX_REP_BYTES)
        .ok_or_else(|| bad_argument(2, "rep", "resulting string too large"))?;
    if let Some(env) = &ctx.global {
        if !env.can_allocate(total) {
            return Err(ErrorType::runtime(OUT_OF_MEMORY, 1));
        }
    }
    Ok(vec![Value::from(s.repeat(n as usize))])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(f: fn(&mut EvalContext, Vec<Value>) -> Result<Vec<Value>, ErrorType>, args: Vec<Value>) -> Vec<Value> {
        f(&mut EvalContext::new(), args).unwrap()
    }

    #[test]
    fn test_sub() {
        let s = Value::from("hello");
        assert_eq!(call(string_sub, vec![s.clone(), Value::Integer(2), Value::Integer(4)]), vec![Value::from("ell")]);
        assert_eq!(call(string_sub, vec![s.clone(), Value::Integer(-3)]), vec![Value::from("llo")]);
        assert_eq!(call(string_sub, vec![s.clone(), Value::Integer(4), Value::Integer(2)]), vec![Value::from("")]);
        assert_eq!(call(string_sub, vec![s, Value::Integer(0), Value::Integer(99)]), vec![Value::from("hello")]);
    }

    #[test]
    fn test_case_and_len() {
        assert_eq!(call(string_upper, vec![Value::from("abc")]), vec![Value::from("ABC")]);
        assert_eq!(call(string_lower, vec![Value::from("ABC")]), vec![Value::from("abc")]);
        assert_eq!(call(string_len, vec![Value::Integer(1234)]), vec![Value::Integer(4)]);
    }

    #[test]
    fn test_rep() {
        assert_eq!(call(string_rep, vec![Value::from("ab"), Value::Integer(3)]), vec![Value::from("ababab")]);
        assert_eq!(call(string_rep, vec![Value::from("ab"), Value::Integer(0)]), vec![Value::from("")]);
    }

    #[test]
    fn test_rep_too_large() {
        let huge = vec![Value::from("xy"), Value::Int64(4_611_686_018_427_387_904)];
        match string_rep(&mut EvalContext::new(), huge) {
            Err(ErrorType::ArgumentError { message, .. }) => {
                assert_eq!(message, "bad argument #2 to 'rep' (resulting string too large)")
            }
            other => panic!("unexpected {:?}", other),
        }
        let over_cap = vec![Value::from("x"), Value::Int64(MAX_REP_BYTES as i64 + 1)];
        assert!(string_rep(&mut EvalContext::new(), over_cap).is_err());
    }
}
