use crate::runner::ds::error::ErrorType;
use crate::runner::ds::value::Value;
use crate::runner::plugin::types::EvalContext;

/// collectgarbage(option)
///
/// Only "collect", "count" and "isrunning" do anything. Any other option,
/// a missing one included, returns no values.
pub fn collect_garbage(ctx: &mut EvalContext, args: Vec<Value>) -> Result<Vec<Value>, ErrorType> {
    let option = match args.first() {
        None | Some(Value::Nil) => return Ok(vec![]),
        Some(v) => v.to_string(),
    };
    match option.as_str() {
        "collect" => {
            ctx.global("collectgarbage")?.collect_garbage();
            count(ctx)
        }
        "count" => count(ctx),
        "isrunning" => Ok(vec![Value::Boolean(true)]),
        _ => Ok(vec![]),
    }
}

/// Kilobytes in use as a double, and the remainder in bytes.
fn count(ctx: &EvalContext) -> Result<Vec<Value>, ErrorType> {
    let bytes = ctx.global("collectgarbage")?.memory_in_use();
    Ok(vec![
        Value::Number(bytes as f64 / 1024.0),
        Value::from_i64((bytes % 1024) as i64),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_option_returns_nothing() {
        let mut ctx = EvalContext::new();
        assert_eq!(collect_garbage(&mut ctx, vec![]).unwrap(), Vec::<Value>::new());
        assert_eq!(collect_garbage(&mut ctx, vec![Value::Nil]).unwrap(), Vec::<Value>::new());
        assert_eq!(collect_garbage(&mut ctx, vec![Value::from("step")]).unwrap(), Vec::<Value>::new());
    }
}
