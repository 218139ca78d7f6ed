use std::rc::Rc;

use crate::runner::ds::error::ErrorType;
use crate::runner::ds::value::Value;
use crate::runner::global::{GlobalEnvironment, WeakGlobal};
use crate::runner::interop::host::HostMethodGroup;
use crate::runner::plugin::types::{EvalContext, NativeFn};

pub type FunctionRef = Rc<FunctionObject>;

pub type ClosureFn = dyn Fn(&mut EvalContext, Vec<Value>) -> Result<Vec<Value>, ErrorType>;

pub enum FunctionKind {
    /// Direct function pointer, used by the core functions and libraries.
    Native(NativeFn),
    /// Arbitrary Rust closure supplied by a host or a compiled chunk.
    Closure(Box<ClosureFn>),
    /// Overload set bound from a host type.
    Host(HostMethodGroup),
}

/// A callable script value.
pub struct FunctionObject {
    name: String,
    kind: FunctionKind,
    /// Environment a core function was materialized for. Weak so storage
    /// holding the function does not keep its own environment alive.
    bound: Option<WeakGlobal>,
}

impl FunctionObject {
    pub fn native(name: impl Into<String>, func: NativeFn) -> FunctionRef {
        Rc::new(FunctionObject {
            name: name.into(),
            kind: FunctionKind::Native(func),
            bound: None,
        })
    }

    /// A native function that always runs against `env`, whoever calls it.
    pub fn bound(name: impl Into<String>, func: NativeFn, env: &GlobalEnvironment) -> FunctionRef {
        Rc::new(FunctionObject {
            name: name.into(),
            kind: FunctionKind::Native(func),
            bound: Some(env.downgrade()),
        })
    }

    pub fn closure<F>(name: impl Into<String>, func: F) -> FunctionRef
    where
        F: Fn(&mut EvalContext, Vec<Value>) -> Result<Vec<Value>, ErrorType> + 'static,
    {
        Rc::new(FunctionObject {
            name: name.into(),
            kind: FunctionKind::Closure(Box::new(func)),
            bound: None,
        })
    }

    pub fn host(group: HostMethodGroup) -> FunctionRef {
        Rc::new(FunctionObject {
            name: group.label().to_string(),
            kind: FunctionKind::Host(group),
            bound: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &FunctionKind {
        &self.kind
    }

    pub fn call(&self, ctx: &mut EvalContext, args: Vec<Value>) -> Result<Vec<Value>, ErrorType> {
        match &self.kind {
            FunctionKind::Native(f) => match &self.bound {
                Some(weak) => {
                    let env = weak.upgrade().ok_or_else(|| {
                        ErrorType::type_error(format!(
                            "'{}' outlived the environment it was bound to",
                            self.name
                        ))
                    })?;
                    let mut bound_ctx = EvalContext::with_global(env);
                    f(&mut bound_ctx, args)
                }
                None => f(ctx, args),
            },
            FunctionKind::Closure(f) => f(ctx, args),
            FunctionKind::Host(group) => group.invoke(&args),
        }
    }
}

/// Call any value, failing with a type error for non-callables.
pub fn call_value(ctx: &mut EvalContext, callee: &Value, args: Vec<Value>) -> Result<Vec<Value>, ErrorType> {
    match callee {
        Value::Function(f) => f.call(ctx, args),
        other => Err(ErrorType::type_error(format!(
            "attempt to call a {} value",
            other.type_name()
        ))),
    }
}
