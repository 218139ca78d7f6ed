//! Core types for the evaluation engine.

use std::collections::HashMap;

use crate::runner::ds::error::ErrorType;
use crate::runner::ds::value::Value;
use crate::runner::global::GlobalEnvironment;
use crate::runner::plugin::types::EvalContext;

pub type ValueResult = Result<Value, ErrorType>;
pub type MultiValueResult = Result<Vec<Value>, ErrorType>;

/// State of one running chunk.
pub struct Frame {
    pub ctx: EvalContext,
    pub env: GlobalEnvironment,
    /// Parameters and `local` declarations.
    pub locals: HashMap<String, Value>,
    /// Arguments beyond the declared parameters, read with `...`.
    pub varargs: Vec<Value>,
}

impl Frame {
    pub fn new(env: GlobalEnvironment) -> Self {
        Frame {
            ctx: EvalContext::with_global(env.clone()),
            env,
            locals: HashMap::new(),
            varargs: Vec::new(),
        }
    }

    /// Locals shadow globals.
    pub fn lookup(&self, name: &str) -> ValueResult {
        match self.locals.get(name) {
            Some(v) => Ok(v.clone()),
            None => self.env.get_member(name),
        }
    }

    pub fn assign(&mut self, name: &str, value: Value) -> Result<(), ErrorType> {
        match self.locals.get_mut(name) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => self.env.set_member(name, value),
        }
    }
}
