//! # lune - embeddable scripting runtime
//!
//! The global environment of a small Lua-flavoured scripting language:
//! - Global name resolution that falls back from script storage to core
//!   functions, system libraries and host-provided sources
//! - A lazily built, thread-safe tree of host namespaces and types reached
//!   through `clr`
//! - Chunk compilation and execution against a global environment
//! - A PEG-based default compiler with a tree-walking evaluator
//!
//! ## Quick Start
//!
//! ```
//! use lune::runner::api::Interpreter;
//! use lune::runner::ds::value::Value;
//!
//! let interpreter = Interpreter::new();
//! let env = interpreter.global();
//! let result = env
//!     .do_chunk_str("return math.floor(x / 2), _VERSION", "quickstart", &[("x", Value::Integer(9))])
//!     .unwrap();
//! assert_eq!(result, vec![Value::Integer(4), Value::from("Lune 5.2")]);
//! ```
//!
//! ## Host types
//!
//! ```
//! use std::sync::Arc;
//! use lune::runner::api::Interpreter;
//! use lune::runner::ds::value::Value;
//! use lune::runner::interop::host::{HostType, HostTypeRegistry};
//! use lune::runner::interop::proxy_tree::TypeProxyTree;
//!
//! let registry = Arc::new(HostTypeRegistry::new());
//! registry.register(
//!     HostType::builder("Demo.Calc")
//!         .method("Twice", Some(1), |args| {
//!             let n = args.first().and_then(Value::as_i64).unwrap_or(0);
//!             Ok(vec![Value::from_i64(n * 2)])
//!         })
//!         .build(),
//! );
//! let tree = Arc::new(TypeProxyTree::new(registry));
//! let interpreter = Interpreter::builder().tree(tree).build().unwrap();
//! let result = interpreter.run_str("return clr.Demo.Calc.Twice(21)", "host").unwrap();
//! assert_eq!(result, vec![Value::Integer(42)]);
//! ```
//!
//! ## Architecture
//!
//! - **[`parser`]** - PEG grammar and AST of the default chunk language
//! - **[`runner`]** - Runtime
//!   - **[`runner::global`]** - The global environment
//!   - **[`runner::plugin`]** - Resolution pipeline, registries and configuration
//!   - **[`runner::interop`]** - Host types and the type proxy tree
//!   - **[`runner::chunk`]** - Compiled chunks and the executor
//!   - **[`runner::eval`]** - Tree-walking evaluator
//!   - **[`runner::ds`]** - Values, tables, functions, errors and heap accounting
//!   - **[`runner::std_lib`]** - Built-in functions and libraries

#[macro_use]
extern crate lazy_static;

pub mod parser;
pub mod runner;
