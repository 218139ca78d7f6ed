//! Runtime data structures: values, tables, callables and their errors.

pub mod error;
pub mod function_object;
pub mod heap;
pub mod host_object;
pub mod operations;
pub mod table;
pub mod value;
