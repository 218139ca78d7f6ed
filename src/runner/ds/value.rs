use std::fmt;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

use crate::runner::ds::function_object::FunctionRef;
use crate::runner::ds::host_object::HostObjectRef;
use crate::runner::ds::table::TableRef;
use crate::runner::global::GlobalEnvironment;
use crate::runner::interop::proxy_node::ProxyNode;

pub const TYPE_STR_NIL: &str = "nil";
pub const TYPE_STR_NUMBER: &str = "number";
pub const TYPE_STR_STRING: &str = "string";
pub const TYPE_STR_BOOL: &str = "bool";
pub const TYPE_STR_TABLE: &str = "table";
pub const TYPE_STR_FUNCTION: &str = "function";
pub const TYPE_STR_USERDATA: &str = "userdata";

/// The dynamic value representation scripts operate on.
///
/// Host numeric kinds are kept distinct (a `Byte` is not an `Integer`), so
/// `rawequal` and `tonumber` can tell them apart.
#[derive(Clone)]
pub enum Value {
    Nil,
    Boolean(bool),
    Byte(u8),
    SByte(i8),
    Int16(i16),
    UInt16(u16),
    Integer(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Single(f32),
    Number(f64),
    String(Rc<str>),
    Table(TableRef),
    Function(FunctionRef),
    TypeNode(ProxyNode),
    HostObject(HostObjectRef),
    Environment(GlobalEnvironment),
}

/// Runtime kind of a value. Also used as a compile-time type hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Nil,
    Boolean,
    Byte,
    SByte,
    Int16,
    UInt16,
    Integer,
    UInt32,
    Int64,
    UInt64,
    Single,
    Number,
    String,
    Table,
    Function,
    TypeNode,
    HostObject,
    Environment,
}

impl ValueKind {
    /// Value kinds compare by content; every other kind compares by identity.
    pub fn is_value_kind(self) -> bool {
        !matches!(
            self,
            ValueKind::Table
                | ValueKind::Function
                | ValueKind::TypeNode
                | ValueKind::HostObject
                | ValueKind::Environment
        )
    }

    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            ValueKind::Byte
                | ValueKind::SByte
                | ValueKind::Int16
                | ValueKind::UInt16
                | ValueKind::Integer
                | ValueKind::UInt32
                | ValueKind::Int64
                | ValueKind::UInt64
                | ValueKind::Single
                | ValueKind::Number
        )
    }
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Nil => ValueKind::Nil,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Byte(_) => ValueKind::Byte,
            Value::SByte(_) => ValueKind::SByte,
            Value::Int16(_) => ValueKind::Int16,
            Value::UInt16(_) => ValueKind::UInt16,
            Value::Integer(_) => ValueKind::Integer,
            Value::UInt32(_) => ValueKind::UInt32,
            Value::Int64(_) => ValueKind::Int64,
            Value::UInt64(_) => ValueKind::UInt64,
            Value::Single(_) => ValueKind::Single,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Table(_) => ValueKind::Table,
            Value::Function(_) => ValueKind::Function,
            Value::TypeNode(_) => ValueKind::TypeNode,
            Value::HostObject(_) => ValueKind::HostObject,
            Value::Environment(_) => ValueKind::Environment,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Script truthiness: only `nil` and `false` are false.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Boolean(false))
    }

    /// Name reported by the `type` built-in. Only the script's own number
    /// kinds are "number"; the other host numeric kinds are userdata.
    pub fn type_name(&self) -> &'static str {
        match self.kind() {
            ValueKind::Nil => TYPE_STR_NIL,
            ValueKind::Boolean => TYPE_STR_BOOL,
            ValueKind::String => TYPE_STR_STRING,
            ValueKind::Table => TYPE_STR_TABLE,
            ValueKind::Function => TYPE_STR_FUNCTION,
            ValueKind::Integer | ValueKind::Number => TYPE_STR_NUMBER,
            _ => TYPE_STR_USERDATA,
        }
    }

    /// Any numeric kind widened to a double.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Byte(n) => Some(*n as f64),
            Value::SByte(n) => Some(*n as f64),
            Value::Int16(n) => Some(*n as f64),
            Value::UInt16(n) => Some(*n as f64),
            Value::Integer(n) => Some(*n as f64),
            Value::UInt32(n) => Some(*n as f64),
            Value::Int64(n) => Some(*n as f64),
            Value::UInt64(n) => Some(*n as f64),
            Value::Single(n) => Some(*n as f64),
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Any numeric kind as an integer, if it has no fractional part.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Byte(n) => Some(*n as i64),
            Value::SByte(n) => Some(*n as i64),
            Value::Int16(n) => Some(*n as i64),
            Value::UInt16(n) => Some(*n as i64),
            Value::Integer(n) => Some(*n as i64),
            Value::UInt32(n) => Some(*n as i64),
            Value::Int64(n) => Some(*n),
            Value::UInt64(n) => i64::try_from(*n).ok(),
            Value::Single(_) | Value::Number(_) => {
                let f = self.as_f64()?;
                if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
                    Some(f as i64)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Narrowest standard representation of an integer result.
    pub fn from_i64(n: i64) -> Value {
        match i32::try_from(n) {
            Ok(i) => Value::Integer(i),
            Err(_) => Value::Int64(n),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(Rc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(Rc::from(s))
    }
}

impl From<TableRef> for Value {
    fn from(t: TableRef) -> Self {
        Value::Table(t)
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "{}", TYPE_STR_NIL),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Byte(n) => write!(f, "{}", n),
            Value::SByte(n) => write!(f, "{}", n),
            Value::Int16(n) => write!(f, "{}", n),
            Value::UInt16(n) => write!(f, "{}", n),
            Value::Integer(n) => write!(f, "{}", n),
            Value::UInt32(n) => write!(f, "{}", n),
            Value::Int64(n) => write!(f, "{}", n),
            Value::UInt64(n) => write!(f, "{}", n),
            Value::Single(n) => write!(f, "{}", n),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
            Value::Table(t) => write!(f, "table: {:p}", Rc::as_ptr(t)),
            Value::Function(func) => write!(f, "function: {}", func.name()),
            Value::TypeNode(node) => write!(f, "{}", node),
            Value::HostObject(o) => write!(f, "{}", o.display()),
            Value::Environment(_) => write!(f, "global"),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "Value::Nil"),
            Value::Boolean(b) => write!(f, "Value::Boolean({})", b),
            Value::String(s) => write!(f, "Value::String({:?})", s),
            Value::Table(_) => write!(f, "Value::Table(...)"),
            Value::Function(func) => write!(f, "Value::Function({})", func.name()),
            Value::TypeNode(node) => write!(f, "Value::TypeNode({})", node),
            Value::HostObject(o) => write!(f, "Value::HostObject({})", o.type_name()),
            Value::Environment(_) => write!(f, "Value::Environment"),
            other => write!(f, "Value::{:?}({})", other.kind(), other),
        }
    }
}

/// Structural equality for tests and host code: same kind, then content
/// for value kinds and identity for reference kinds.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        crate::runner::ds::operations::test_and_comparison::raw_equal(self, other)
    }
}
