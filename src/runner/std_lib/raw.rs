//! Raw access: equality and table reads/writes that skip the index hook.

use crate::runner::ds::error::ErrorType;
use crate::runner::ds::operations::test_and_comparison::raw_equal;
use crate::runner::ds::table::TableRef;
use crate::runner::ds::value::Value;
use crate::runner::plugin::types::EvalContext;

use super::{arg, bad_argument};

fn table_arg(args: &[Value], function: &str) -> Result<TableRef, ErrorType> {
    match args.first() {
        Some(Value::Table(t)) => Ok(t.clone()),
        other => {
            let got = other.map(Value::type_name).unwrap_or("no value");
            Err(ErrorType::type_error(format!(
                "bad argument #1 to '{}' (table expected, got {})",
                function, got
            )))
        }
    }
}

/// rawequal(a, b)
pub fn rawequal(_ctx: &mut EvalContext, args: Vec<Value>) -> Result<Vec<Value>, ErrorType> {
    let (a, b) = (arg(&args, 0), arg(&args, 1));
    Ok(vec![Value::Boolean(raw_equal(&a, &b))])
}

/// rawget(t, k)
pub fn rawget(_ctx: &mut EvalContext, args: Vec<Value>) -> Result<Vec<Value>, ErrorType> {
    let table = table_arg(&args, "rawget")?;
    let value = table.borrow().raw_get(&arg(&args, 1));
    Ok(vec![value])
}

/// rawset(t, k, v) returns `t`.
pub fn rawset(ctx: &mut EvalContext, args: Vec<Value>) -> Result<Vec<Value>, ErrorType> {
    let table = table_arg(&args, "rawset")?;
    let key = arg(&args, 1);
    if key.is_nil() {
        return Err(bad_argument(2, "rawset", "index is nil"));
    }
    match &ctx.global {
        Some(env) => env.table_set(&table, key, arg(&args, 2))?,
        None => {
            table.borrow_mut().raw_set(key, arg(&args, 2))?;
        }
    }
    Ok(vec![Value::Table(table)])
}

/// rawlen(v)
pub fn rawlen(_ctx: &mut EvalContext, args: Vec<Value>) -> Result<Vec<Value>, ErrorType> {
    let n = match arg(&args, 0) {
        Value::String(s) => s.len(),
        Value::Table(t) => t.borrow().len(),
        Value::HostObject(o) => o.length().unwrap_or(0),
        _ => 0,
    };
    Ok(vec![Value::from_i64(n as i64)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::ds::table::Table;

    #[test]
    fn test_rawequal_kinds_differ() {
        let mut ctx = EvalContext::new();
        let out = rawequal(&mut ctx, vec![Value::Integer(5), Value::Number(5.0)]).unwrap();
        assert_eq!(out, vec![Value::Boolean(false)]);
    }

    #[test]
    fn test_rawget_skips_hook() {
        let mut ctx = EvalContext::new();
        let fallback = Table::new_ref();
        fallback.borrow_mut().raw_set(Value::from("k"), Value::Integer(1)).unwrap();
        let t = Table::new_ref();
        t.borrow_mut().set_index_hook(Some(Value::Table(fallback)));
        let out = rawget(&mut ctx, vec![Value::Table(t), Value::from("k")]).unwrap();
        assert_eq!(out, vec![Value::Nil]);
    }

    #[test]
    fn test_rawset_returns_table() {
        let mut ctx = EvalContext::new();
        let t = Table::new_ref();
        let out = rawset(
            &mut ctx,
            vec![Value::Table(t.clone()), Value::Integer(1), Value::from("a")],
        )
        .unwrap();
        assert_eq!(out, vec![Value::Table(t.clone())]);
        assert_eq!(t.borrow().len(), 1);
    }

    #[test]
    fn test_rawset_requires_table() {
        let mut ctx = EvalContext::new();
        let err = rawset(&mut ctx, vec![Value::Integer(1), Value::Integer(1), Value::Nil]);
        assert!(matches!(err, Err(ErrorType::TypeError(_))));
    }

    #[test]
    fn test_rawlen() {
        let mut ctx = EvalContext::new();
        assert_eq!(rawlen(&mut ctx, vec![Value::Nil]).unwrap(), vec![Value::Integer(0)]);
        assert_eq!(rawlen(&mut ctx, vec![Value::from("héllo")]).unwrap(), vec![Value::Integer(6)]);
    }
}
