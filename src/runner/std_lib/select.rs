use crate::runner::ds::error::ErrorType;
use crate::runner::ds::value::Value;
use crate::runner::plugin::types::EvalContext;

use super::bad_argument;

/// select(i, ...)
///
/// `i` is a 0-based index into the trailing arguments; a negative `i`
/// counts from the end and is clamped at the first one. `select("#", ...)`
/// returns how many trailing arguments there are.
pub fn select(_ctx: &mut EvalContext, mut args: Vec<Value>) -> Result<Vec<Value>, ErrorType> {
    if args.is_empty() {
        return Err(bad_argument(1, "select", "number expected, got no value"));
    }
    let selector = args.remove(0);
    if selector.as_str() == Some("#") {
        return Ok(vec![Value::from_i64(args.len() as i64)]);
    }
    let index = selector
        .as_i64()
        .ok_or_else(|| bad_argument(1, "select", format!("number expected, got {}", selector.type_name())))?;
    let start = if index < 0 {
        (args.len() as i64 + index).max(0) as usize
    } else {
        index as usize
    };
    if start >= args.len() {
        return Ok(vec![]);
    }
    Ok(args.split_off(start))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn run(args: Vec<Value>) -> Vec<Value> {
        select(&mut EvalContext::new(), args).unwrap()
    }

    fn ints(ns: &[i32]) -> Vec<Value> {
        ns.iter().map(|n| Value::Integer(*n)).collect()
    }

    #[test]
    fn test_negative_counts_from_end() {
        let mut args = ints(&[-1]);
        args.extend(ints(&[1, 2, 3]));
        assert_eq!(run(args), ints(&[3]));
    }

    #[test]
    fn test_negative_is_clamped() {
        let mut args = ints(&[-10]);
        args.extend(ints(&[1, 2, 3]));
        assert_eq!(run(args), ints(&[1, 2, 3]));
    }

    #[test]
    fn test_zero_based_index() {
        let mut args = ints(&[1]);
        args.extend(ints(&[1, 2, 3]));
        assert_eq!(run(args), ints(&[2, 3]));
    }

    #[test]
    fn test_out_of_range_is_empty() {
        let mut args = ints(&[5]);
        args.extend(ints(&[1, 2, 3]));
        assert_eq!(run(args), Vec::<Value>::new());
    }

    #[test]
    fn test_count() {
        let mut args = vec![Value::from("#")];
        args.extend(ints(&[1, 2]));
        assert_eq!(run(args), ints(&[2]));
    }
}
