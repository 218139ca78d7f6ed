//! Script-visible key/value storage.
//!
//! `get` consults the optional index hook on a miss; the `raw_*` variants
//! never do. Assigning `nil` removes an entry.

use std::cell::RefCell;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::runner::ds::error::ErrorType;
use crate::runner::ds::function_object::call_value;
use crate::runner::ds::operations::test_and_comparison::same_reference;
use crate::runner::ds::value::Value;
use crate::runner::plugin::types::EvalContext;

const MAX_HOOK_DEPTH: usize = 100;

pub type TableRef = Rc<RefCell<Table>>;

/// Normalized table key. Integral numbers of every kind share one key space.
#[derive(Clone, Debug)]
pub enum TableKey {
    Boolean(bool),
    Integer(i64),
    Float(u64),
    String(Rc<str>),
    Reference(Value),
}

impl TableKey {
    /// `None` for keys that can never be stored (`nil`, NaN).
    pub fn from_value(v: &Value) -> Option<TableKey> {
        match v {
            Value::Nil => None,
            Value::Boolean(b) => Some(TableKey::Boolean(*b)),
            Value::String(s) => Some(TableKey::String(s.clone())),
            v if v.kind().is_numeric() => {
                if let Some(i) = v.as_i64() {
                    Some(TableKey::Integer(i))
                } else {
                    let f = v.as_f64()?;
                    if f.is_nan() {
                        None
                    } else {
                        Some(TableKey::Float(f.to_bits()))
                    }
                }
            }
            other => Some(TableKey::Reference(other.clone())),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            TableKey::Boolean(b) => Value::Boolean(*b),
            TableKey::Integer(i) => Value::from_i64(*i),
            TableKey::Float(bits) => Value::Number(f64::from_bits(*bits)),
            TableKey::String(s) => Value::String(s.clone()),
            TableKey::Reference(v) => v.clone(),
        }
    }
}

impl PartialEq for TableKey {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TableKey::Boolean(a), TableKey::Boolean(b)) => a == b,
            (TableKey::Integer(a), TableKey::Integer(b)) => a == b,
            (TableKey::Float(a), TableKey::Float(b)) => a == b,
            (TableKey::String(a), TableKey::String(b)) => a == b,
            (TableKey::Reference(a), TableKey::Reference(b)) => same_reference(a, b),
            _ => false,
        }
    }
}

impl Eq for TableKey {}

impl Hash for TableKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            TableKey::Boolean(b) => b.hash(state),
            TableKey::Integer(i) => i.hash(state),
            TableKey::Float(bits) => bits.hash(state),
            TableKey::String(s) => s.hash(state),
            TableKey::Reference(v) => reference_address(v).hash(state),
        }
    }
}

fn reference_address(v: &Value) -> usize {
    match v {
        Value::Table(t) => Rc::as_ptr(t) as *const u8 as usize,
        Value::Function(f) => Rc::as_ptr(f) as *const u8 as usize,
        Value::HostObject(o) => Rc::as_ptr(o) as *const u8 as usize,
        Value::Environment(e) => e.address(),
        Value::TypeNode(n) => n.id().index(),
        _ => 0,
    }
}

#[derive(Default)]
pub struct Table {
    entries: HashMap<TableKey, Value>,
    index_hook: Option<Value>,
}

impl Table {
    pub fn new() -> Self {
        Table::default()
    }

    pub fn new_ref() -> TableRef {
        Rc::new(RefCell::new(Table::new()))
    }

    pub fn raw_get(&self, key: &Value) -> Value {
        TableKey::from_value(key)
            .and_then(|k| self.entries.get(&k).cloned())
            .unwrap_or(Value::Nil)
    }

    pub fn raw_get_str(&self, name: &str) -> Value {
        self.entries
            .get(&TableKey::String(Rc::from(name)))
            .cloned()
            .unwrap_or(Value::Nil)
    }

    /// Store `value` under `key`, returning the previous value.
    pub fn raw_set(&mut self, key: Value, value: Value) -> Result<Value, ErrorType> {
        let k = TableKey::from_value(&key).ok_or_else(|| {
            ErrorType::type_error(format!("table index is {}", describe_bad_key(&key)))
        })?;
        let previous = if value.is_nil() {
            self.entries.remove(&k)
        } else {
            self.entries.insert(k, value)
        };
        Ok(previous.unwrap_or(Value::Nil))
    }

    /// Border length: the count of consecutive integer keys starting at 1.
    pub fn len(&self) -> usize {
        let mut n = 0usize;
        while self.entries.contains_key(&TableKey::Integer(n as i64 + 1)) {
            n += 1;
        }
        n
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&TableKey, &Value)> {
        self.entries.iter()
    }

    pub fn index_hook(&self) -> Option<&Value> {
        self.index_hook.as_ref()
    }

    /// Install the hook consulted by `table_get` on a miss: a table to read
    /// from, or a function called with `(table, key)`.
    pub fn set_index_hook(&mut self, hook: Option<Value>) {
        self.index_hook = hook;
    }
}

fn describe_bad_key(key: &Value) -> &'static str {
    if key.is_nil() {
        "nil"
    } else {
        "NaN"
    }
}

/// Hooked read: raw lookup first, then the index hook chain.
pub fn table_get(ctx: &mut EvalContext, table: &TableRef, key: &Value) -> Result<Value, ErrorType> {
    let mut current = table.clone();
    for _ in 0..MAX_HOOK_DEPTH {
        let (value, hook) = {
            let t = current.borrow();
            (t.raw_get(key), t.index_hook.clone())
        };
        if !value.is_nil() {
            return Ok(value);
        }
        match hook {
            None => return Ok(Value::Nil),
            Some(Value::Table(next)) => current = next,
            Some(f @ Value::Function(_)) => {
                let results = call_value(ctx, &f, vec![Value::Table(current), key.clone()])?;
                return Ok(results.into_iter().next().unwrap_or(Value::Nil));
            }
            Some(_) => return Ok(Value::Nil),
        }
    }
    Err(ErrorType::type_error("index hook chain is too deep"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integral_numbers_share_keys() {
        let mut t = Table::new();
        t.raw_set(Value::Integer(1), Value::from("a")).unwrap();
        assert_eq!(t.raw_get(&Value::Number(1.0)), Value::from("a"));
        assert_eq!(t.raw_get(&Value::Byte(1)), Value::from("a"));
    }

    #[test]
    fn test_nil_assignment_removes_entry() {
        let mut t = Table::new();
        t.raw_set(Value::from("x"), Value::Integer(3)).unwrap();
        t.raw_set(Value::from("x"), Value::Nil).unwrap();
        assert!(t.is_empty());
    }

    #[test]
    fn test_nil_key_is_rejected() {
        let mut t = Table::new();
        assert!(t.raw_set(Value::Nil, Value::Integer(1)).is_err());
    }

    #[test]
    fn test_border_length() {
        let mut t = Table::new();
        for i in 1..=3 {
            t.raw_set(Value::Integer(i), Value::Integer(i * 10)).unwrap();
        }
        t.raw_set(Value::Integer(5), Value::Integer(50)).unwrap();
        assert_eq!(t.len(), 3);
    }

    #[test]
    fn test_table_hook_chain() {
        let base = Table::new_ref();
        base.borrow_mut()
            .raw_set(Value::from("inherited"), Value::Boolean(true))
            .unwrap();
        let derived = Table::new_ref();
        derived
            .borrow_mut()
            .set_index_hook(Some(Value::Table(base)));

        let mut ctx = EvalContext::new();
        let v = table_get(&mut ctx, &derived, &Value::from("inherited")).unwrap();
        assert_eq!(v, Value::Boolean(true));
        assert_eq!(derived.borrow().raw_get(&Value::from("inherited")), Value::Nil);
    }
}
