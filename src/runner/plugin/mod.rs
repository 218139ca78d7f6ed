//! Built-in functions, libraries and the global resolution pipeline.
//!
//! Every free name a script reads ends up in [`GlobalResolver`]. The
//! resolver walks an ordered list of [`MemberSource`]s:
//!
//! ```text
//! Variable Lookup Order:
//! 1. Chunk locals and parameters (handled by the evaluator)
//! 2. Reserved names: clr, _VERSION
//! 3. Script storage of the global environment
//! 4. Core functions      ← CoreFunctionRegistry
//! 5. System libraries    ← SystemLibraryRegistry
//! 6. Host-provided sources
//! ```
//!
//! The registries are process-wide and immutable once built. What a source
//! materializes from them (a bound function, a library proxy) is cached per
//! environment, but the decision to fall back to a built-in is taken afresh
//! on every lookup.
//!
//! ## Example: a custom source
//!
//! ```
//! use std::rc::Rc;
//! use lune::runner::api::Interpreter;
//! use lune::runner::ds::error::ErrorType;
//! use lune::runner::ds::value::Value;
//! use lune::runner::global::GlobalEnvironment;
//! use lune::runner::plugin::resolver::{MemberSource, Resolution};
//!
//! struct Answer;
//!
//! impl MemberSource for Answer {
//!     fn try_resolve(&self, name: &str, _env: &GlobalEnvironment) -> Result<Resolution, ErrorType> {
//!         Ok(if name == "answer" {
//!             Resolution::Found(Value::Integer(42))
//!         } else {
//!             Resolution::Next
//!         })
//!     }
//!
//!     fn name(&self) -> &str { "answer" }
//! }
//!
//! let interpreter = Interpreter::new();
//! let env = interpreter.global();
//! env.add_member_source(Rc::new(Answer));
//! assert_eq!(env.get_member("answer").unwrap(), Value::Integer(42));
//! ```

pub mod config;
pub mod core_resolver;
pub mod global_resolver;
pub mod registry;
pub mod resolver;
pub mod types;

pub use config::{ConfigError, PrintTarget, RuntimeConfig};
pub use global_resolver::GlobalResolver;
pub use registry::{CoreFunctionRegistry, SystemLibraryRegistry};
pub use resolver::{MemberSource, Resolution};
pub use types::{EvalContext, LibraryObject, NativeFn};
