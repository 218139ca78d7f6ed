//! Name resolution for the global scope.
//!
//! ```text
//! lookup "print"
//!   1. reserved names   clr, _VERSION        (never shadowed)
//!   2. script storage   non-nil value wins
//!   3. core functions   print, type, select, ...
//!   4. system libraries math, string
//!   5. host sources     added with `add_source`
//! ```
//!
//! Nothing about which step answered is remembered. A script that assigns
//! `print = nil` gets the built-in back on its next lookup, and a later
//! non-nil assignment shadows it again, with no invalidation step.

use std::rc::Rc;

use tracing::trace;

use crate::runner::ds::error::ErrorType;
use crate::runner::ds::table::table_get;
use crate::runner::ds::value::Value;
use crate::runner::global::GlobalEnvironment;
use crate::runner::plugin::core_resolver::{CoreFunctionSource, SystemLibrarySource};
use crate::runner::plugin::registry::{core_functions, system_libraries};
use crate::runner::plugin::resolver::{MemberSource, Resolution};
use crate::runner::plugin::types::EvalContext;

/// Name of the host namespace/type tree root.
pub const INTEROP_ROOT_NAME: &str = "clr";
pub const VERSION_NAME: &str = "_VERSION";
pub const VERSION_STRING: &str = "Lune 5.2";

/// Names answered before storage is consulted.
pub struct ReservedNameSource;

impl MemberSource for ReservedNameSource {
    fn try_resolve(&self, name: &str, env: &GlobalEnvironment) -> Result<Resolution, ErrorType> {
        Ok(match name {
            INTEROP_ROOT_NAME => Resolution::Found(Value::TypeNode(env.interop_root())),
            VERSION_NAME => Resolution::Found(Value::from(VERSION_STRING)),
            _ => Resolution::Next,
        })
    }

    fn name(&self) -> &str {
        "reserved"
    }
}

/// Script-defined globals. A nil read falls through to the built-ins.
pub struct StorageSource;

impl MemberSource for StorageSource {
    fn try_resolve(&self, name: &str, env: &GlobalEnvironment) -> Result<Resolution, ErrorType> {
        let storage = env.storage();
        let mut ctx = EvalContext::with_global(env.clone());
        let value = table_get(&mut ctx, &storage, &Value::from(name))?;
        Ok(if value.is_nil() {
            Resolution::Next
        } else {
            Resolution::Found(value)
        })
    }

    fn name(&self) -> &str {
        "storage"
    }
}

pub struct GlobalResolver {
    sources: Vec<Rc<dyn MemberSource>>,
}

impl GlobalResolver {
    /// A resolver without any sources. Mostly useful for tests.
    pub fn empty() -> Self {
        GlobalResolver {
            sources: Vec::new(),
        }
    }

    /// The standard pipeline: reserved names, storage, core functions and
    /// system libraries.
    pub fn new() -> Self {
        let mut resolver = Self::empty();
        resolver.add_source(Rc::new(ReservedNameSource));
        resolver.add_source(Rc::new(StorageSource));
        resolver.add_source(Rc::new(CoreFunctionSource::new(core_functions())));
        resolver.add_source(Rc::new(SystemLibrarySource::new(system_libraries())));
        resolver
    }

    /// Append a source, consulted after every source already present.
    pub fn add_source(&mut self, source: Rc<dyn MemberSource>) {
        self.sources.push(source);
    }

    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Clones of the sources, so a caller can resolve without holding a
    /// borrow of the resolver across script code.
    pub fn sources(&self) -> Vec<Rc<dyn MemberSource>> {
        self.sources.clone()
    }

    /// `None` when no source knows the name.
    pub fn resolve_member(&self, name: &str, env: &GlobalEnvironment) -> Result<Option<Value>, ErrorType> {
        resolve_with(&self.sources, name, env)
    }
}

impl Default for GlobalResolver {
    fn default() -> Self {
        Self::new()
    }
}

pub fn resolve_with(
    sources: &[Rc<dyn MemberSource>],
    name: &str,
    env: &GlobalEnvironment,
) -> Result<Option<Value>, ErrorType> {
    for source in sources {
        if let Resolution::Found(value) = source.try_resolve(name, env)? {
            trace!(name, source = source.name(), "resolved global");
            return Ok(Some(value));
        }
    }
    trace!(name, "global not found");
    Ok(None)
}
