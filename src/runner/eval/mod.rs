//! Tree-walking evaluation of parsed chunks.

pub mod expression;
pub mod statement;
pub mod types;

use crate::parser::ast::Block;
use crate::runner::ds::error::ErrorType;
use crate::runner::ds::value::Value;

pub use types::{Frame, MultiValueResult, ValueResult};

/// Run `block` with the calling convention of compiled chunks: argument 0 is
/// the global environment, the next arguments bind `parameters` in order,
/// and whatever is left becomes `...`.
pub fn execute_chunk(block: &Block, parameters: &[String], args: Vec<Value>) -> MultiValueResult {
    let mut args = args.into_iter();
    let env = match args.next() {
        Some(Value::Environment(env)) => env,
        other => {
            return Err(ErrorType::type_error(format!(
                "chunk expects the global environment as argument 0, got {}",
                other.map(|v| v.type_name()).unwrap_or("no value")
            )))
        }
    };
    let mut frame = Frame::new(env);
    for name in parameters {
        let value = args.next().unwrap_or(Value::Nil);
        frame.locals.insert(name.clone(), value);
    }
    frame.varargs = args.collect();
    statement::execute_block(block, &mut frame)
}
