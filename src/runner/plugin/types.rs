//! Core types shared by built-in functions and libraries.

use std::collections::HashMap;

use crate::runner::ds::error::ErrorType;
use crate::runner::ds::value::Value;
use crate::runner::global::GlobalEnvironment;

/// Execution context passed to native functions.
pub struct EvalContext {
    /// Environment the running code belongs to, if any.
    pub global: Option<GlobalEnvironment>,
}

impl EvalContext {
    pub fn new() -> Self {
        EvalContext { global: None }
    }

    pub fn with_global(global: GlobalEnvironment) -> Self {
        EvalContext {
            global: Some(global),
        }
    }

    /// The environment, or a type error naming the built-in that needed it.
    pub fn global(&self, caller: &str) -> Result<GlobalEnvironment, ErrorType> {
        self.global.clone().ok_or_else(|| {
            ErrorType::type_error(format!("'{}' requires a global environment", caller))
        })
    }
}

impl Default for EvalContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Signature of every built-in function: arguments in, results out.
pub type NativeFn = fn(ctx: &mut EvalContext, args: Vec<Value>) -> Result<Vec<Value>, ErrorType>;

/// One entry of the core function registry.
#[derive(Clone, Copy)]
pub struct CoreFunction {
    pub name: &'static str,
    pub func: NativeFn,
}

/// Thread-safe constant stored on a library object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LibraryConstant {
    Integer(i32),
    Number(f64),
    Str(&'static str),
}

impl LibraryConstant {
    pub fn to_value(self) -> Value {
        match self {
            LibraryConstant::Integer(n) => Value::Integer(n),
            LibraryConstant::Number(n) => Value::Number(n),
            LibraryConstant::Str(s) => Value::from(s),
        }
    }
}

/// A registered system library such as `math`.
pub struct LibraryObject {
    pub name: String,
    pub functions: HashMap<String, NativeFn>,
    pub constants: HashMap<String, LibraryConstant>,
}

impl LibraryObject {
    pub fn new(name: impl Into<String>) -> Self {
        LibraryObject {
            name: name.into(),
            functions: HashMap::new(),
            constants: HashMap::new(),
        }
    }

    pub fn add_method(mut self, name: impl Into<String>, func: NativeFn) -> Self {
        self.functions.insert(name.into(), func);
        self
    }

    pub fn add_property(mut self, name: impl Into<String>, value: LibraryConstant) -> Self {
        self.constants.insert(name.into(), value);
        self
    }

    pub fn function(&self, name: &str) -> Option<NativeFn> {
        self.functions.get(name).copied()
    }

    pub fn member_count(&self) -> usize {
        self.functions.len() + self.constants.len()
    }
}
