//! Compiled units of script source.

pub mod compiler;
pub mod executor;

use std::fmt;
use std::rc::Rc;

use uuid::Uuid;

use crate::runner::ds::error::ErrorType;
use crate::runner::ds::value::{Value, ValueKind};

/// Declared type of a chunk parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeHint {
    /// No specific kind; used for `nil` arguments.
    Object,
    Kind(ValueKind),
}

impl TypeHint {
    pub fn of(value: &Value) -> TypeHint {
        if value.is_nil() {
            TypeHint::Object
        } else {
            TypeHint::Kind(value.kind())
        }
    }
}

/// The executable artifact. Argument 0 is always the global environment.
pub type CompiledCode = Rc<dyn Fn(Vec<Value>) -> Result<Vec<Value>, ErrorType>>;

pub struct Chunk {
    name: String,
    id: Uuid,
    parameters: Vec<(String, TypeHint)>,
    code: Option<CompiledCode>,
}

impl Chunk {
    pub fn new(name: impl Into<String>, parameters: Vec<(String, TypeHint)>, code: CompiledCode) -> Self {
        Chunk {
            name: name.into(),
            id: Uuid::new_v4(),
            parameters,
            code: Some(code),
        }
    }

    /// A chunk that was declared but never compiled.
    pub fn declared(name: impl Into<String>, parameters: Vec<(String, TypeHint)>) -> Self {
        Chunk {
            name: name.into(),
            id: Uuid::new_v4(),
            parameters,
            code: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn parameters(&self) -> &[(String, TypeHint)] {
        &self.parameters
    }

    pub fn is_compiled(&self) -> bool {
        self.code.is_some()
    }

    pub fn code(&self) -> Option<&CompiledCode> {
        self.code.as_ref()
    }

    /// Drop the compiled artifact. The chunk can no longer be executed.
    pub fn release(&mut self) {
        self.code = None;
    }
}

impl fmt::Debug for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chunk")
            .field("name", &self.name)
            .field("id", &self.id)
            .field("parameters", &self.parameters)
            .field("compiled", &self.is_compiled())
            .finish()
    }
}
