//! Compiles chunks and runs them against a global environment.

use std::rc::Rc;

use tracing::debug;

use crate::runner::chunk::compiler::{ChunkCompiler, ScriptCompiler};
use crate::runner::chunk::{Chunk, TypeHint};
use crate::runner::ds::error::ErrorType;
use crate::runner::ds::value::Value;
use crate::runner::global::GlobalEnvironment;

#[derive(Clone)]
pub struct ChunkExecutor {
    compiler: Rc<dyn ChunkCompiler>,
}

impl ChunkExecutor {
    pub fn new(compiler: Rc<dyn ChunkCompiler>) -> Self {
        ChunkExecutor { compiler }
    }

    pub fn compile(&self, chunk_name: &str, source: &str, parameters: &[(String, TypeHint)]) -> Result<Chunk, ErrorType> {
        if chunk_name.is_empty() {
            return Err(ErrorType::argument("chunk_name", "chunk name must not be empty"));
        }
        let code = self.compiler.compile(chunk_name, source, parameters)?;
        let chunk = Chunk::new(chunk_name, parameters.to_vec(), code);
        debug!(chunk = chunk_name, id = %chunk.id(), "compiled chunk");
        Ok(chunk)
    }

    /// Call `chunk` with `env` prepended to `args`.
    pub fn execute(&self, env: &GlobalEnvironment, chunk: &Chunk, args: Vec<Value>) -> Result<Vec<Value>, ErrorType> {
        let code = chunk.code().ok_or_else(|| {
            ErrorType::compile(chunk.name(), "chunk is not compiled")
        })?;
        let mut call_args = Vec::with_capacity(args.len() + 1);
        call_args.push(Value::Environment(env.clone()));
        call_args.extend(args);
        debug!(chunk = chunk.name(), id = %chunk.id(), args = call_args.len() - 1, "executing chunk");
        code(call_args)
    }

    /// Compile, run once and release. Parameter hints come from the values.
    pub fn do_chunk(
        &self,
        env: &GlobalEnvironment,
        chunk_name: &str,
        source: &str,
        args: &[(&str, Value)],
    ) -> Result<Vec<Value>, ErrorType> {
        let parameters: Vec<(String, TypeHint)> = args
            .iter()
            .map(|(name, value)| (name.to_string(), TypeHint::of(value)))
            .collect();
        let mut chunk = self.compile(chunk_name, source, &parameters)?;
        let values = args.iter().map(|(_, v)| v.clone()).collect();
        let result = self.execute(env, &chunk, values);
        chunk.release();
        result
    }
}

impl Default for ChunkExecutor {
    fn default() -> Self {
        ChunkExecutor::new(Rc::new(ScriptCompiler::new()))
    }
}
