use std::cmp::Ordering;
use std::rc::Rc;
use std::sync::Arc;

use crate::runner::ds::error::ErrorType;
use crate::runner::ds::value::Value;

/// Identity comparison for reference kinds. Value kinds are never "the same
/// reference".
pub fn same_reference(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Table(x), Value::Table(y)) => Rc::ptr_eq(x, y),
        (Value::Function(x), Value::Function(y)) => Rc::ptr_eq(x, y),
        (Value::HostObject(x), Value::HostObject(y)) => {
            Rc::as_ptr(x) as *const u8 == Rc::as_ptr(y) as *const u8
        }
        (Value::Environment(x), Value::Environment(y)) => x.ptr_eq(y),
        (Value::TypeNode(x), Value::TypeNode(y)) => {
            Arc::ptr_eq(x.tree(), y.tree()) && x.id() == y.id()
        }
        _ => false,
    }
}

/// `rawequal`: no coercion across kinds, so `5` and `5.0` differ.
pub fn raw_equal(a: &Value, b: &Value) -> bool {
    let kind = a.kind();
    if kind != b.kind() {
        return false;
    }
    if !kind.is_value_kind() {
        return same_reference(a, b);
    }
    match (a, b) {
        (Value::Nil, Value::Nil) => true,
        (Value::Boolean(x), Value::Boolean(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Single(x), Value::Single(y)) => x == y || (x.is_nan() && y.is_nan()),
        (Value::Number(x), Value::Number(y)) => x == y || (x.is_nan() && y.is_nan()),
        // Remaining value kinds are integers of the same width.
        _ => a.as_i64() == b.as_i64() && a.as_f64() == b.as_f64(),
    }
}

/// Script `==`: numbers compare numerically across kinds.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    if a.kind().is_numeric() && b.kind().is_numeric() {
        return match (a.as_i64(), b.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => a.as_f64() == b.as_f64(),
        };
    }
    raw_equal(a, b)
}

/// Ordering used by `<`, `<=`, `>` and `>=`.
pub fn compare_values(a: &Value, b: &Value) -> Result<Ordering, ErrorType> {
    if let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) {
        return x.partial_cmp(&y).ok_or_else(|| {
            ErrorType::type_error("attempt to compare NaN".to_string())
        });
    }
    if let (Some(x), Some(y)) = (a.as_str(), b.as_str()) {
        return Ok(x.cmp(y));
    }
    Err(ErrorType::type_error(format!(
        "attempt to compare {} with {}",
        a.type_name(),
        b.type_name()
    )))
}
