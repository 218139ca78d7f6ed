//! `tonumber`, `tostring` and `type`.

use crate::runner::ds::error::ErrorType;
use crate::runner::ds::operations::type_conversion::to_number;
use crate::runner::ds::value::Value;
use crate::runner::plugin::types::EvalContext;

use super::{arg, bad_argument};

/// tonumber(v, base)
pub fn tonumber(_ctx: &mut EvalContext, args: Vec<Value>) -> Result<Vec<Value>, ErrorType> {
    let base = match args.get(1) {
        None | Some(Value::Nil) => 10,
        Some(b) => match b.as_i64() {
            Some(n) if (0..=i64::from(u32::MAX)).contains(&n) => n as u32,
            Some(n) => return Err(bad_argument(2, "tonumber", format!("base {} out of range", n))),
            None => return Err(bad_argument(2, "tonumber", "number expected")),
        },
    };
    Ok(vec![to_number(&arg(&args, 0), base)?])
}

/// tostring(v)
pub fn tostring(_ctx: &mut EvalContext, args: Vec<Value>) -> Result<Vec<Value>, ErrorType> {
    Ok(vec![match arg(&args, 0) {
        Value::Nil => Value::Nil,
        other => Value::from(other.to_string()),
    }])
}

/// type(v)
pub fn type_of(_ctx: &mut EvalContext, args: Vec<Value>) -> Result<Vec<Value>, ErrorType> {
    Ok(vec![Value::from(arg(&args, 0).type_name())])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(f: fn(&mut EvalContext, Vec<Value>) -> Result<Vec<Value>, ErrorType>, args: Vec<Value>) -> Vec<Value> {
        f(&mut EvalContext::new(), args).unwrap()
    }

    #[test]
    fn test_tonumber_default_base() {
        assert_eq!(call(tonumber, vec![Value::from("42")]), vec![Value::Integer(42)]);
        assert_eq!(call(tonumber, vec![Value::from("3.14"), Value::Integer(10)]), vec![Value::Nil]);
    }

    #[test]
    fn test_tonumber_base_out_of_range() {
        let err = tonumber(&mut EvalContext::new(), vec![Value::from("1"), Value::Integer(37)]);
        assert!(matches!(err, Err(ErrorType::ArgumentError { .. })));
    }

    #[test]
    fn test_tostring_nil_is_nil() {
        assert_eq!(call(tostring, vec![]), vec![Value::Nil]);
        assert_eq!(call(tostring, vec![Value::Boolean(true)]), vec![Value::from("true")]);
    }

    #[test]
    fn test_type_names() {
        assert_eq!(call(type_of, vec![Value::Integer(1)]), vec![Value::from("number")]);
        assert_eq!(call(type_of, vec![Value::Number(0.5)]), vec![Value::from("number")]);
        assert_eq!(call(type_of, vec![Value::Byte(1)]), vec![Value::from("userdata")]);
        assert_eq!(call(type_of, vec![Value::UInt64(1)]), vec![Value::from("userdata")]);
        assert_eq!(call(type_of, vec![Value::Single(1.0)]), vec![Value::from("userdata")]);
        assert_eq!(call(type_of, vec![Value::Boolean(false)]), vec![Value::from("bool")]);
        assert_eq!(call(type_of, vec![]), vec![Value::from("nil")]);
    }
}
