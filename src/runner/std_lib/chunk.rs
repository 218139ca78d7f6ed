use std::path::Path;

use tracing::debug;

use crate::runner::ds::error::ErrorType;
use crate::runner::ds::value::Value;
use crate::runner::plugin::types::EvalContext;

use super::bad_argument;

/// dofile(path)
///
/// Runs the file against the calling environment and returns whatever the
/// chunk returns.
pub fn dofile(ctx: &mut EvalContext, args: Vec<Value>) -> Result<Vec<Value>, ErrorType> {
    let path = match args.first() {
        Some(Value::String(s)) => s.clone(),
        Some(other) => {
            return Err(bad_argument(1, "dofile", format!("string expected, got {}", other.type_name())))
        }
        None => return Err(bad_argument(1, "dofile", "string expected, got no value")),
    };
    let env = ctx.global("dofile")?;
    debug!(path = %path, "dofile");
    env.do_chunk_file(Path::new(path.as_ref()), &[])
}
