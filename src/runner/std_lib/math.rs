//! The `math` library.

use crate::runner::ds::error::ErrorType;
use crate::runner::ds::value::Value;
use crate::runner::plugin::types::{EvalContext, LibraryConstant, LibraryObject};

use super::bad_argument;

pub fn library() -> LibraryObject {
    LibraryObject::new("math")
        .add_property("pi", LibraryConstant::Number(std::f64::consts::PI))
        .add_property("huge", LibraryConstant::Number(f64::INFINITY))
        .add_method("abs", math_abs)
        .add_method("ceil", math_ceil)
        .add_method("floor", math_floor)
        .add_method("max", math_max)
        .add_method("min", math_min)
        .add_method("sqrt", math_sqrt)
}

fn to_f64(args: &[Value], index: usize, function: &str) -> Result<f64, ErrorType> {
    match args.get(index) {
        Some(v) => v.as_f64().ok_or_else(|| {
            bad_argument(index + 1, function, format!("number expected, got {}", v.type_name()))
        }),
        None => Err(bad_argument(index + 1, function, "number expected, got no value")),
    }
}

/// Integral results come back as integers.
fn integral(n: f64) -> Value {
    if n.is_finite() && n >= i64::MIN as f64 && n <= i64::MAX as f64 {
        Value::from_i64(n as i64)
    } else {
        Value::Number(n)
    }
}

/// math.abs - Absolute value; integer kinds stay integral.
fn math_abs(_ctx: &mut EvalContext, args: Vec<Value>) -> Result<Vec<Value>, ErrorType> {
    let n = to_f64(&args, 0, "abs")?;
    Ok(vec![match args[0] {
        Value::Single(_) | Value::Number(_) => Value::Number(n.abs()),
        _ => integral(n.abs()),
    }])
}

/// math.floor - Largest integer not above x.
fn math_floor(_ctx: &mut EvalContext, args: Vec<Value>) -> Result<Vec<Value>, ErrorType> {
    Ok(vec![integral(to_f64(&args, 0, "floor")?.floor())])
}

/// math.ceil - Smallest integer not below x.
fn math_ceil(_ctx: &mut EvalContext, args: Vec<Value>) -> Result<Vec<Value>, ErrorType> {
    Ok(vec![integral(to_f64(&args, 0, "ceil")?.ceil())])
}

fn pick(args: Vec<Value>, function: &str, better: fn(f64, f64) -> bool) -> Result<Vec<Value>, ErrorType> {
    let mut best = to_f64(&args, 0, function)?;
    let mut best_index = 0;
    for i in 1..args.len() {
        let n = to_f64(&args, i, function)?;
        if better(n, best) {
            best = n;
            best_index = i;
        }
    }
    Ok(vec![args[best_index].clone()])
}

/// math.max - The largest argument, returned as passed.
fn math_max(_ctx: &mut EvalContext, args: Vec<Value>) -> Result<Vec<Value>, ErrorType> {
    pick(args, "max", |a, b| a > b)
}

/// math.min - The smallest argument, returned as passed.
fn math_min(_ctx: &mut EvalContext, args: Vec<Value>) -> Result<Vec<Value>, ErrorType> {
    pick(args, "min", |a, b| a < b)
}

/// math.sqrt
fn math_sqrt(_ctx: &mut EvalContext, args: Vec<Value>) -> Result<Vec<Value>, ErrorType> {
    Ok(vec![Value::Number(to_f64(&args, 0, "sqrt")?.sqrt())])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(f: fn(&mut EvalContext, Vec<Value>) -> Result<Vec<Value>, ErrorType>, args: Vec<Value>) -> Vec<Value> {
        f(&mut EvalContext::new(), args).unwrap()
    }

    #[test]
    fn test_floor_and_ceil() {
        assert_eq!(call(math_floor, vec![Value::Number(2.7)]), vec![Value::Integer(2)]);
        assert_eq!(call(math_ceil, vec![Value::Number(-2.7)]), vec![Value::Integer(-2)]);
        assert_eq!(call(math_floor, vec![Value::Number(f64::INFINITY)]), vec![Value::Number(f64::INFINITY)]);
    }

    #[test]
    fn test_abs_keeps_kind() {
        assert_eq!(call(math_abs, vec![Value::Integer(-3)]), vec![Value::Integer(3)]);
        assert_eq!(call(math_abs, vec![Value::Number(-3.0)]), vec![Value::Number(3.0)]);
    }

    #[test]
    fn test_max_min() {
        let args = vec![Value::Integer(3), Value::Number(7.5), Value::Integer(-1)];
        assert_eq!(call(math_max, args.clone()), vec![Value::Number(7.5)]);
        assert_eq!(call(math_min, args), vec![Value::Integer(-1)]);
    }

    #[test]
    fn test_missing_argument() {
        assert!(math_sqrt(&mut EvalContext::new(), vec![]).is_err());
        assert!(math_max(&mut EvalContext::new(), vec![Value::Integer(1), Value::from("x")]).is_err());
    }

    #[test]
    fn test_library_members() {
        let lib = library();
        assert_eq!(lib.constants.get("pi"), Some(&LibraryConstant::Number(std::f64::consts::PI)));
        assert!(lib.function("sqrt").is_some());
        assert_eq!(lib.member_count(), 8);
    }
}
