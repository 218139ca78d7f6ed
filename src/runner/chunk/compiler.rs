use std::rc::Rc;

use tracing::debug;

use crate::parser::ChunkParser;
use crate::runner::chunk::{CompiledCode, TypeHint};
use crate::runner::ds::error::ErrorType;
use crate::runner::ds::value::Value;
use crate::runner::eval::execute_chunk;

/// Turns source text into an executable artifact.
pub trait ChunkCompiler {
    fn compile(&self, chunk_name: &str, source: &str, parameters: &[(String, TypeHint)]) -> Result<CompiledCode, ErrorType>;
}

/// Default compiler: parses with the bundled grammar and interprets the
/// resulting tree.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScriptCompiler;

impl ScriptCompiler {
    pub fn new() -> Self {
        ScriptCompiler
    }
}

impl ChunkCompiler for ScriptCompiler {
    fn compile(&self, chunk_name: &str, source: &str, parameters: &[(String, TypeHint)]) -> Result<CompiledCode, ErrorType> {
        let block = ChunkParser::parse_chunk(source)
            .map_err(|e| ErrorType::compile(chunk_name, e.to_string()))?;
        debug!(chunk = chunk_name, statements = block.statements.len(), "parsed chunk");
        let block = Rc::new(block);
        let names: Rc<[String]> = parameters.iter().map(|(n, _)| n.clone()).collect();
        Ok(Rc::new(move |args: Vec<Value>| execute_chunk(&block, &names, args)))
    }
}
