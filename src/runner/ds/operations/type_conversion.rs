use crate::runner::ds::error::ErrorType;
use crate::runner::ds::value::Value;

/// Boolean conversion used by `assert`.
///
/// `nil` and `false` are false. Everything else goes through a boolean
/// conversion (numbers are non-zero, strings must spell a boolean); a value
/// that has no such conversion counts as true.
pub fn to_boolean(v: &Value) -> bool {
    match v {
        Value::Nil => false,
        Value::Boolean(b) => *b,
        Value::String(s) => {
            let s = s.trim();
            if s.eq_ignore_ascii_case("false") {
                false
            } else {
                // "true" converts to true, anything else fails to convert
                true
            }
        }
        other => match other.as_f64() {
            Some(n) => n != 0.0,
            None => true,
        },
    }
}

/// `tonumber` conversion.
///
/// Strings are parsed as 32-bit integers only; `"3.14"` is not a number.
/// `base` of 0 means decimal.
pub fn to_number(v: &Value, base: u32) -> Result<Value, ErrorType> {
    let base = if base == 0 { 10 } else { base };
    if !(2..=36).contains(&base) {
        return Err(ErrorType::argument(
            "base",
            format!("base {} is out of range (2..36)", base),
        ));
    }
    Ok(match v {
        Value::Nil => Value::Nil,
        Value::String(s) => parse_integer(s, base).map(Value::Integer).unwrap_or(Value::Nil),
        Value::Integer(_) | Value::Number(_) => v.clone(),
        Value::Byte(n) => Value::Integer(*n as i32),
        Value::SByte(n) => Value::Integer(*n as i32),
        Value::Int16(n) => Value::Integer(*n as i32),
        Value::UInt16(n) => Value::Integer(*n as i32),
        Value::UInt32(n) => Value::Number(*n as f64),
        Value::Int64(n) => Value::Number(*n as f64),
        Value::UInt64(n) => Value::Number(*n as f64),
        Value::Single(n) => Value::Number(*n as f64),
        Value::Boolean(b) => Value::Integer(if *b { 1 } else { 0 }),
        _ => Value::Nil,
    })
}

fn parse_integer(text: &str, base: u32) -> Option<i32> {
    let text = text.trim();
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let digits = if base == 16 {
        digits
            .strip_prefix("0x")
            .or_else(|| digits.strip_prefix("0X"))
            .unwrap_or(digits)
    } else {
        digits
    };
    // from_str_radix would accept a second sign
    if !digits.chars().next().map_or(false, |c| c.is_digit(base)) {
        return None;
    }
    let magnitude = i64::try_from(u64::from_str_radix(digits, base).ok()?).ok()?;
    let n = if negative { -magnitude } else { magnitude };
    i32::try_from(n).ok()
}

/// Text used by `..`: strings and numbers only.
pub fn to_concat_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.to_string()),
        v if v.kind().is_numeric() => Some(v.to_string()),
        _ => None,
    }
}
