//! Process-wide registries of core functions and system libraries.
//!
//! Both are built once on first use and are read-only afterwards, so every
//! interpreter in the process shares them.

use std::collections::HashMap;

use super::types::{CoreFunction, LibraryObject, NativeFn};
use crate::runner::std_lib::{register_core_functions, register_system_libraries};

/// Name → built-in function, exact and case-sensitive.
pub struct CoreFunctionRegistry {
    functions: HashMap<&'static str, CoreFunction>,
}

impl CoreFunctionRegistry {
    pub fn new() -> Self {
        CoreFunctionRegistry {
            functions: HashMap::new(),
        }
    }

    /// A registry holding `print`, `type`, `select` and the other core
    /// functions.
    pub fn with_core() -> Self {
        let mut registry = Self::new();
        register_core_functions(&mut registry);
        registry
    }

    pub fn register(&mut self, name: &'static str, func: NativeFn) {
        self.functions.insert(name, CoreFunction { name, func });
    }

    pub fn get(&self, name: &str) -> Option<&CoreFunction> {
        self.functions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.functions.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for CoreFunctionRegistry {
    fn default() -> Self {
        Self::with_core()
    }
}

/// Name → library object (`math`, `string`).
pub struct SystemLibraryRegistry {
    libraries: HashMap<String, LibraryObject>,
}

impl SystemLibraryRegistry {
    pub fn new() -> Self {
        SystemLibraryRegistry {
            libraries: HashMap::new(),
        }
    }

    pub fn with_core() -> Self {
        let mut registry = Self::new();
        register_system_libraries(&mut registry);
        registry
    }

    pub fn register(&mut self, library: LibraryObject) {
        self.libraries.insert(library.name.clone(), library);
    }

    pub fn get(&self, name: &str) -> Option<&LibraryObject> {
        self.libraries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.libraries.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.libraries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for SystemLibraryRegistry {
    fn default() -> Self {
        Self::with_core()
    }
}

lazy_static! {
    static ref CORE_FUNCTIONS: CoreFunctionRegistry = CoreFunctionRegistry::with_core();
    static ref SYSTEM_LIBRARIES: SystemLibraryRegistry = SystemLibraryRegistry::with_core();
}

pub fn core_functions() -> &'static CoreFunctionRegistry {
    &CORE_FUNCTIONS
}

pub fn system_libraries() -> &'static SystemLibraryRegistry {
    &SYSTEM_LIBRARIES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_registry_is_case_sensitive() {
        let registry = core_functions();
        assert!(registry.contains("print"));
        assert!(!registry.contains("Print"));
    }

    #[test]
    fn test_libraries_registered() {
        assert_eq!(system_libraries().names(), vec!["math", "string"]);
        let math = system_libraries().get("math").unwrap();
        assert!(math.function("floor").is_some());
        assert!(math.constants.contains_key("pi"));
    }
}
