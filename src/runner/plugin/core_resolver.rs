//! Resolution sources backed by the process-wide built-in registries.
//!
//! Registry entries are materialized into script values on first lookup and
//! cached by the source, which lives as long as its environment. Whether
//! storage shadows a built-in is decided by the resolver on every lookup and
//! never cached here.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::runner::ds::error::ErrorType;
use crate::runner::ds::function_object::FunctionObject;
use crate::runner::ds::host_object::HostObject;
use crate::runner::ds::value::Value;
use crate::runner::global::GlobalEnvironment;
use crate::runner::plugin::registry::{CoreFunctionRegistry, SystemLibraryRegistry};
use crate::runner::plugin::resolver::{MemberSource, Resolution};
use crate::runner::plugin::types::{EvalContext, LibraryObject};

/// Core functions bound to the environment that resolved them.
pub struct CoreFunctionSource {
    registry: &'static CoreFunctionRegistry,
    materialized: RefCell<HashMap<&'static str, Value>>,
}

impl CoreFunctionSource {
    pub fn new(registry: &'static CoreFunctionRegistry) -> Self {
        CoreFunctionSource {
            registry,
            materialized: RefCell::new(HashMap::new()),
        }
    }
}

impl MemberSource for CoreFunctionSource {
    fn try_resolve(&self, name: &str, env: &GlobalEnvironment) -> Result<Resolution, ErrorType> {
        let entry = match self.registry.get(name) {
            Some(entry) => entry,
            None => return Ok(Resolution::Next),
        };
        let mut cache = self.materialized.borrow_mut();
        let value = cache
            .entry(entry.name)
            .or_insert_with(|| Value::Function(FunctionObject::bound(entry.name, entry.func, env)))
            .clone();
        Ok(Resolution::Found(value))
    }

    fn name(&self) -> &str {
        "core_functions"
    }
}

/// System libraries exposed as library proxies.
pub struct SystemLibrarySource {
    registry: &'static SystemLibraryRegistry,
    materialized: RefCell<HashMap<String, Value>>,
}

impl SystemLibrarySource {
    pub fn new(registry: &'static SystemLibraryRegistry) -> Self {
        SystemLibrarySource {
            registry,
            materialized: RefCell::new(HashMap::new()),
        }
    }
}

impl MemberSource for SystemLibrarySource {
    fn try_resolve(&self, name: &str, _env: &GlobalEnvironment) -> Result<Resolution, ErrorType> {
        let library = match self.registry.get(name) {
            Some(library) => library,
            None => return Ok(Resolution::Next),
        };
        let mut cache = self.materialized.borrow_mut();
        let value = cache
            .entry(name.to_string())
            .or_insert_with(|| Value::HostObject(Rc::new(LibraryProxy::new(library))))
            .clone();
        Ok(Resolution::Found(value))
    }

    fn name(&self) -> &str {
        "system_libraries"
    }
}

/// Script view of a registered library: constants read as values and
/// functions as callables.
pub struct LibraryProxy {
    library: &'static LibraryObject,
    functions: RefCell<HashMap<String, Value>>,
}

impl LibraryProxy {
    pub fn new(library: &'static LibraryObject) -> Self {
        LibraryProxy {
            library,
            functions: RefCell::new(HashMap::new()),
        }
    }

    fn find_key<'a, I>(mut keys: I, name: &str, ignore_case: bool) -> Option<&'a String>
    where
        I: Iterator<Item = &'a String>,
    {
        keys.find(|k| {
            if ignore_case {
                k.eq_ignore_ascii_case(name)
            } else {
                k.as_str() == name
            }
        })
    }
}

impl HostObject for LibraryProxy {
    fn type_name(&self) -> &str {
        &self.library.name
    }

    fn get_member(&self, name: &str, ignore_case: bool) -> Option<Value> {
        if let Some(key) = Self::find_key(self.library.constants.keys(), name, ignore_case) {
            return self.library.constants.get(key).map(|c| c.to_value());
        }
        let key = Self::find_key(self.library.functions.keys(), name, ignore_case)?;
        let func = self.library.function(key)?;
        let mut cache = self.functions.borrow_mut();
        let value = cache
            .entry(key.clone())
            .or_insert_with(|| {
                Value::Function(FunctionObject::native(
                    format!("{}.{}", self.library.name, key),
                    func,
                ))
            })
            .clone();
        Some(value)
    }

    fn invoke_member(
        &self,
        ctx: &mut EvalContext,
        name: &str,
        args: Vec<Value>,
        ignore_case: bool,
    ) -> Option<Result<Vec<Value>, ErrorType>> {
        let key = Self::find_key(self.library.functions.keys(), name, ignore_case)?;
        let func = self.library.function(key)?;
        Some(func(ctx, args))
    }

    fn length(&self) -> Option<usize> {
        Some(self.library.member_count())
    }

    fn display(&self) -> String {
        format!("library: {}", self.library.name)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
