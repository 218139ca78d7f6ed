//! Expression evaluation.

use crate::parser::ast::{BinaryOp, Expression, TableField, UnaryOp};
use crate::runner::ds::error::ErrorType;
use crate::runner::ds::function_object::call_value;
use crate::runner::ds::operations::test_and_comparison::{compare_values, values_equal};
use crate::runner::ds::operations::type_conversion::to_concat_string;
use crate::runner::ds::table::{table_get, Table};
use crate::runner::ds::value::Value;
use crate::runner::global::GlobalEnvironment;
use crate::runner::plugin::types::EvalContext;

use super::types::{Frame, MultiValueResult, ValueResult};

/// Evaluate to exactly one value; multi-valued expressions are truncated.
pub fn evaluate_expression(expr: &Expression, frame: &mut Frame) -> ValueResult {
    match expr {
        Expression::Nil => Ok(Value::Nil),
        Expression::Boolean(b) => Ok(Value::Boolean(*b)),
        Expression::Integer(n) => Ok(Value::from_i64(*n)),
        Expression::Number(n) => Ok(Value::Number(*n)),
        Expression::String(s) => Ok(Value::from(s.as_str())),
        Expression::Name(name) => frame.lookup(name),
        Expression::Index { object, key } => {
            let object = evaluate_expression(object, frame)?;
            let key = evaluate_expression(key, frame)?;
            index_value(&mut frame.ctx, &object, &key)
        }
        Expression::Binary { op, left, right } => evaluate_binary(*op, left, right, frame),
        Expression::Unary { op, operand } => {
            let value = evaluate_expression(operand, frame)?;
            match op {
                UnaryOp::Not => Ok(Value::Boolean(!value.is_truthy())),
                UnaryOp::Minus => negate(&value),
            }
        }
        Expression::Table(fields) => build_table(fields, frame),
        Expression::Paren(inner) => evaluate_expression(inner, frame),
        Expression::VarArgs | Expression::Call { .. } | Expression::MethodCall { .. } => {
            Ok(evaluate_multi(expr, frame)?.into_iter().next().unwrap_or(Value::Nil))
        }
    }
}

/// Evaluate keeping every value a call or `...` produces.
pub fn evaluate_multi(expr: &Expression, frame: &mut Frame) -> MultiValueResult {
    match expr {
        Expression::VarArgs => Ok(frame.varargs.clone()),
        Expression::Call { callee, args } => {
            let callee = evaluate_expression(callee, frame)?;
            let args = evaluate_expression_list(args, frame)?;
            call_value(&mut frame.ctx, &callee, args)
        }
        Expression::MethodCall {
            object,
            method,
            args,
        } => {
            let object = evaluate_expression(object, frame)?;
            let args = evaluate_expression_list(args, frame)?;
            invoke_method(&mut frame.ctx, object, method, args)
        }
        other => Ok(vec![evaluate_expression(other, frame)?]),
    }
}

/// Every expression yields one value, except a trailing multi-valued one
/// which is expanded in place.
pub fn evaluate_expression_list(exprs: &[Expression], frame: &mut Frame) -> MultiValueResult {
    let mut values = Vec::with_capacity(exprs.len());
    for (i, expr) in exprs.iter().enumerate() {
        if i + 1 == exprs.len() && expr.is_multi_valued() {
            values.extend(evaluate_multi(expr, frame)?);
        } else {
            values.push(evaluate_expression(expr, frame)?);
        }
    }
    Ok(values)
}

fn member_name<'a>(object: &Value, key: &'a Value) -> Result<&'a str, ErrorType> {
    key.as_str().ok_or_else(|| {
        ErrorType::type_error(format!(
            "{} members are indexed by name, got a {} key",
            object.type_name(),
            key.type_name()
        ))
    })
}

/// `object[key]`. Tables honor their index hook; host values and the
/// environment dispatch to their members.
pub fn index_value(ctx: &mut EvalContext, object: &Value, key: &Value) -> ValueResult {
    match object {
        Value::Table(t) => table_get(ctx, t, key),
        Value::TypeNode(node) => Ok(node.get_member(member_name(object, key)?, false)),
        Value::HostObject(o) => Ok(o
            .get_member(member_name(object, key)?, false)
            .unwrap_or(Value::Nil)),
        Value::Environment(env) => env.get_member(member_name(object, key)?),
        other => Err(ErrorType::type_error(format!(
            "attempt to index a {} value",
            other.type_name()
        ))),
    }
}

/// `object[key] = value`. Table writes are raw and charged to `env`'s heap.
pub fn assign_index(env: &GlobalEnvironment, object: &Value, key: Value, value: Value) -> Result<(), ErrorType> {
    match object {
        Value::Table(t) => env.table_set(t, key, value),
        Value::TypeNode(node) => node.set_member(member_name(object, &key)?, value, false),
        Value::HostObject(o) => {
            let name = member_name(object, &key)?;
            if o.set_member(name, value)? {
                Ok(())
            } else {
                Err(ErrorType::type_error(format!(
                    "{} has no settable member '{}'",
                    o.type_name(),
                    name
                )))
            }
        }
        Value::Environment(env) => env.set_member(member_name(object, &key)?, value),
        other => Err(ErrorType::type_error(format!(
            "attempt to index a {} value",
            other.type_name()
        ))),
    }
}

/// `object:method(args)`.
fn invoke_method(ctx: &mut EvalContext, object: Value, method: &str, args: Vec<Value>) -> MultiValueResult {
    match &object {
        Value::TypeNode(node) => node.invoke_member(ctx, method, args, false),
        Value::HostObject(o) => match o.invoke_member(ctx, method, args.clone(), false) {
            Some(result) => result,
            None => match o.get_member(method, false) {
                Some(f @ Value::Function(_)) => call_value(ctx, &f, args),
                _ => Err(ErrorType::type_error(format!(
                    "{} has no callable member '{}'",
                    o.type_name(),
                    method
                ))),
            },
        },
        _ => {
            let f = index_value(ctx, &object, &Value::from(method))?;
            let mut call_args = Vec::with_capacity(args.len() + 1);
            call_args.push(object.clone());
            call_args.extend(args);
            call_value(ctx, &f, call_args)
        }
    }
}

fn build_table(fields: &[TableField], frame: &mut Frame) -> ValueResult {
    let table = Table::new_ref();
    let mut position = 1i64;
    for (i, field) in fields.iter().enumerate() {
        match field {
            TableField::Positional(expr) => {
                let values = if i + 1 == fields.len() && expr.is_multi_valued() {
                    evaluate_multi(expr, frame)?
                } else {
                    vec![evaluate_expression(expr, frame)?]
                };
                for value in values {
                    table.borrow_mut().raw_set(Value::from_i64(position), value)?;
                    position += 1;
                }
            }
            TableField::Keyed(key, value) => {
                let key = evaluate_expression(key, frame)?;
                let value = evaluate_expression(value, frame)?;
                table.borrow_mut().raw_set(key, value)?;
            }
        }
    }
    Ok(Value::Table(table))
}

fn evaluate_binary(op: BinaryOp, left: &Expression, right: &Expression, frame: &mut Frame) -> ValueResult {
    let lhs = evaluate_expression(left, frame)?;
    match op {
        BinaryOp::And => {
            return if lhs.is_truthy() {
                evaluate_expression(right, frame)
            } else {
                Ok(lhs)
            }
        }
        BinaryOp::Or => {
            return if lhs.is_truthy() {
                Ok(lhs)
            } else {
                evaluate_expression(right, frame)
            }
        }
        _ => {}
    }
    let rhs = evaluate_expression(right, frame)?;
    match op {
        BinaryOp::Eq => Ok(Value::Boolean(values_equal(&lhs, &rhs))),
        BinaryOp::NotEq => Ok(Value::Boolean(!values_equal(&lhs, &rhs))),
        BinaryOp::Less => Ok(Value::Boolean(compare_values(&lhs, &rhs)?.is_lt())),
        BinaryOp::LessEq => Ok(Value::Boolean(compare_values(&lhs, &rhs)?.is_le())),
        BinaryOp::Greater => Ok(Value::Boolean(compare_values(&lhs, &rhs)?.is_gt())),
        BinaryOp::GreaterEq => Ok(Value::Boolean(compare_values(&lhs, &rhs)?.is_ge())),
        BinaryOp::Concat => {
            let mut out = to_concat_string(&lhs).ok_or_else(|| concat_error(&lhs))?;
            out.push_str(&to_concat_string(&rhs).ok_or_else(|| concat_error(&rhs))?);
            Ok(Value::from(out))
        }
        _ => arithmetic(op, &lhs, &rhs),
    }
}

fn concat_error(v: &Value) -> ErrorType {
    ErrorType::type_error(format!("attempt to concatenate a {} value", v.type_name()))
}

/// Integral operands of integer kinds stay integers; anything else is done
/// in double precision. Division is always floating point.
fn arithmetic(op: BinaryOp, lhs: &Value, rhs: &Value) -> ValueResult {
    let (a, b) = match (lhs.as_f64(), rhs.as_f64()) {
        (Some(a), Some(b)) => (a, b),
        _ => {
            let culprit = if lhs.as_f64().is_none() { lhs } else { rhs };
            return Err(ErrorType::type_error(format!(
                "attempt to perform arithmetic on a {} value",
                culprit.type_name()
            )));
        }
    };
    if let (Some(x), Some(y)) = (integer_operand(lhs), integer_operand(rhs)) {
        match op {
            BinaryOp::Add => return Ok(Value::from_i64(x.wrapping_add(y))),
            BinaryOp::Sub => return Ok(Value::from_i64(x.wrapping_sub(y))),
            BinaryOp::Mul => return Ok(Value::from_i64(x.wrapping_mul(y))),
            BinaryOp::Mod => {
                if y == 0 {
                    return Err(ErrorType::type_error("attempt to perform 'n%0'"));
                }
                // floored: the result takes the sign of the divisor
                let r = x.wrapping_rem(y);
                let r = if r != 0 && (r < 0) != (y < 0) { r + y } else { r };
                return Ok(Value::from_i64(r));
            }
            _ => {}
        }
    }
    Ok(Value::Number(match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => a / b,
        BinaryOp::Mod => a - (a / b).floor() * b,
        _ => return Err(ErrorType::type_error("unsupported arithmetic operator")),
    }))
}

fn integer_operand(v: &Value) -> Option<i64> {
    match v {
        Value::Single(_) | Value::Number(_) => None,
        other => other.as_i64(),
    }
}

fn negate(v: &Value) -> ValueResult {
    if let Some(n) = integer_operand(v) {
        return Ok(Value::from_i64(n.wrapping_neg()));
    }
    match v.as_f64() {
        Some(n) => Ok(Value::Number(-n)),
        None => Err(ErrorType::type_error(format!(
            "attempt to perform arithmetic on a {} value",
            v.type_name()
        ))),
    }
}
