//! Host-facing entry point.
//!
//! An [`Interpreter`] wires a [`GlobalEnvironment`] to its collaborators:
//! the chunk compiler, the interop tree, the heap limit and the print sink.
//! Hosts that only need the defaults use [`Interpreter::new`]; everything
//! else goes through [`Interpreter::builder`].

use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

use tracing::debug;

use crate::runner::chunk::compiler::ChunkCompiler;
use crate::runner::chunk::executor::ChunkExecutor;
use crate::runner::ds::error::ErrorType;
use crate::runner::ds::heap::HeapConfig;
use crate::runner::ds::value::Value;
use crate::runner::global::GlobalEnvironment;
use crate::runner::interop::proxy_tree::TypeProxyTree;
use crate::runner::plugin::config::RuntimeConfig;
use crate::runner::std_lib::console::PrintSink;

pub struct Interpreter {
    config: RuntimeConfig,
    global: GlobalEnvironment,
}

impl Interpreter {
    /// Default configuration, the script compiler and the process-wide
    /// interop tree.
    pub fn new() -> Self {
        let config = RuntimeConfig::default();
        let global = InterpreterBuilder::default().assemble(&config);
        Interpreter { config, global }
    }

    /// Fails when a configured package names a type the host never
    /// registered.
    pub fn with_config(config: RuntimeConfig) -> Result<Self, ErrorType> {
        Interpreter::builder().config(config).build()
    }

    pub fn builder() -> InterpreterBuilder {
        InterpreterBuilder::default()
    }

    /// Handle to the global environment. Clones share the same scope.
    pub fn global(&self) -> GlobalEnvironment {
        self.global.clone()
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn run_str(&self, source: &str, chunk_name: &str) -> Result<Vec<Value>, ErrorType> {
        self.global.do_chunk_str(source, chunk_name, &[])
    }

    pub fn run_file(&self, path: &Path) -> Result<Vec<Value>, ErrorType> {
        self.global.do_chunk_file(path, &[])
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Default)]
pub struct InterpreterBuilder {
    config: Option<RuntimeConfig>,
    compiler: Option<Rc<dyn ChunkCompiler>>,
    tree: Option<Arc<TypeProxyTree>>,
    sink: Option<PrintSink>,
}

impl InterpreterBuilder {
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn compiler(mut self, compiler: Rc<dyn ChunkCompiler>) -> Self {
        self.compiler = Some(compiler);
        self
    }

    /// Use a private interop tree instead of the process-wide one.
    pub fn tree(mut self, tree: Arc<TypeProxyTree>) -> Self {
        self.tree = Some(tree);
        self
    }

    /// Overrides `runtime.print` from the configuration.
    pub fn sink(mut self, sink: PrintSink) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn build(mut self) -> Result<Interpreter, ErrorType> {
        let config = self.config.take().unwrap_or_default();
        let global = self.assemble(&config);
        for (name, type_name) in &config.packages {
            let host_type = global.interop_tree().binder().resolve_type(type_name).ok_or_else(|| {
                ErrorType::argument(
                    name.as_str(),
                    format!("package '{}' names unknown host type '{}'", name, type_name),
                )
            })?;
            global.register_package(name, Some(host_type))?;
        }
        debug!(packages = config.packages.len(), "interpreter ready");
        Ok(Interpreter { config, global })
    }

    fn assemble(self, config: &RuntimeConfig) -> GlobalEnvironment {
        let executor = match self.compiler {
            Some(compiler) => ChunkExecutor::new(compiler),
            None => ChunkExecutor::default(),
        };
        let tree = self.tree.unwrap_or_else(TypeProxyTree::shared);
        let heap = match config.runtime.max_heap_bytes {
            Some(limit) => HeapConfig::with_limit(limit),
            None => HeapConfig::unlimited(),
        };
        let sink = self
            .sink
            .unwrap_or_else(|| PrintSink::from_target(config.runtime.print));
        GlobalEnvironment::new(executor, tree, heap, sink)
    }
}
