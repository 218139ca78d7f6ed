//! The global scope scripts execute in.
//!
//! A [`GlobalEnvironment`] owns the script-defined storage table and the
//! resolver that falls back to built-ins, and it is itself the value every
//! chunk receives as argument 0. It is a cheap `Rc` handle; cloning it does
//! not copy the environment.

use std::cell::{Ref, RefCell};
use std::fs;
use std::io::Read;
use std::path::Path;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use tracing::debug;

use crate::runner::chunk::executor::ChunkExecutor;
use crate::runner::chunk::{Chunk, TypeHint};
use crate::runner::ds::error::ErrorType;
use crate::runner::ds::heap::{
    estimate_entry_size, estimate_value_size, measure_table, Heap, HeapConfig, OUT_OF_MEMORY,
};
use crate::runner::ds::table::{Table, TableRef};
use crate::runner::ds::value::Value;
use crate::runner::interop::host::{HostBinder, HostType};
use crate::runner::interop::package::PackageProxy;
use crate::runner::interop::proxy_node::ProxyNode;
use crate::runner::interop::proxy_tree::TypeProxyTree;
use crate::runner::plugin::global_resolver::{resolve_with, GlobalResolver};
use crate::runner::plugin::resolver::MemberSource;
use crate::runner::std_lib::console::PrintSink;

struct GlobalInner {
    storage: TableRef,
    resolver: RefCell<GlobalResolver>,
    executor: ChunkExecutor,
    heap: RefCell<Heap>,
    sink: PrintSink,
    interop: Arc<TypeProxyTree>,
}

#[derive(Clone)]
pub struct GlobalEnvironment {
    inner: Rc<GlobalInner>,
}

/// Non-owning handle, held by functions bound to an environment.
#[derive(Clone)]
pub struct WeakGlobal {
    inner: Weak<GlobalInner>,
}

impl WeakGlobal {
    pub fn upgrade(&self) -> Option<GlobalEnvironment> {
        self.inner.upgrade().map(|inner| GlobalEnvironment { inner })
    }
}

impl GlobalEnvironment {
    pub fn new(executor: ChunkExecutor, interop: Arc<TypeProxyTree>, heap: HeapConfig, sink: PrintSink) -> Self {
        GlobalEnvironment {
            inner: Rc::new(GlobalInner {
                storage: Table::new_ref(),
                resolver: RefCell::new(GlobalResolver::new()),
                executor,
                heap: RefCell::new(Heap::new(heap)),
                sink,
                interop,
            }),
        }
    }

    /// Value of the global `name`, `nil` when nothing resolves it.
    pub fn get_member(&self, name: &str) -> Result<Value, ErrorType> {
        // Sources may run script code (index hooks), so do not hold the
        // resolver borrowed while they do.
        let sources = self.inner.resolver.borrow().sources();
        Ok(resolve_with(&sources, name, self)?.unwrap_or(Value::Nil))
    }

    /// Write-through to storage. Assigning `nil` removes the entry, which
    /// makes a shadowed built-in visible again.
    pub fn set_member(&self, name: &str, value: Value) -> Result<(), ErrorType> {
        let key = Value::from(name);
        let old_size = {
            let storage = self.inner.storage.borrow();
            let old = storage.raw_get(&key);
            if old.is_nil() {
                0
            } else {
                estimate_value_size(&old) + name.len()
            }
        };
        let new_size = if value.is_nil() {
            0
        } else {
            estimate_value_size(&value) + name.len()
        };
        self.charge(old_size, new_size)?;
        self.inner.storage.borrow_mut().raw_set(key, value)?;
        Ok(())
    }

    /// `table[key] = value` with the size change charged to this
    /// environment's heap. Used for writes below global storage.
    pub fn table_set(&self, table: &TableRef, key: Value, value: Value) -> Result<(), ErrorType> {
        let old_size = {
            let t = table.borrow();
            estimate_entry_size(&key, &t.raw_get(&key))
        };
        let new_size = estimate_entry_size(&key, &value);
        if new_size > old_size && !self.can_allocate(new_size - old_size) {
            return Err(ErrorType::runtime(OUT_OF_MEMORY, 1));
        }
        table.borrow_mut().raw_set(key, value)?;
        self.charge(old_size, new_size)
    }

    fn charge(&self, old_size: usize, new_size: usize) -> Result<(), ErrorType> {
        let mut heap = self.inner.heap.borrow_mut();
        if new_size > old_size {
            heap.allocate(new_size - old_size)
        } else {
            heap.deallocate(old_size - new_size);
            Ok(())
        }
    }

    /// Whether `bytes` more would stay within the heap limit.
    pub fn can_allocate(&self, bytes: usize) -> bool {
        self.inner.heap.borrow().can_allocate(bytes)
    }

    /// Expose the static members of `host_type` under the global `name`.
    pub fn register_package(&self, name: &str, host_type: Option<Arc<HostType>>) -> Result<(), ErrorType> {
        if name.is_empty() {
            return Err(ErrorType::argument("name", "package name must not be empty"));
        }
        let host_type = host_type
            .ok_or_else(|| ErrorType::argument("type", format!("no host type given for package '{}'", name)))?;
        debug!(package = name, host_type = host_type.full_name(), "registering package");
        let binder: Arc<dyn HostBinder> = self.inner.interop.binder().clone();
        let proxy = PackageProxy::new(host_type, binder);
        self.set_member(name, Value::HostObject(Rc::new(proxy)))
    }

    pub fn compile(&self, chunk_name: &str, source: &str, parameters: &[(String, TypeHint)]) -> Result<Chunk, ErrorType> {
        self.inner.executor.compile(chunk_name, source, parameters)
    }

    pub fn execute(&self, chunk: &Chunk, args: Vec<Value>) -> Result<Vec<Value>, ErrorType> {
        self.inner.executor.execute(self, chunk, args)
    }

    pub fn do_chunk_str(&self, source: &str, chunk_name: &str, args: &[(&str, Value)]) -> Result<Vec<Value>, ErrorType> {
        self.inner.executor.do_chunk(self, chunk_name, source, args)
    }

    pub fn do_chunk_reader<R: Read>(&self, mut reader: R, chunk_name: &str, args: &[(&str, Value)]) -> Result<Vec<Value>, ErrorType> {
        let mut source = String::new();
        reader.read_to_string(&mut source)?;
        self.do_chunk_str(&source, chunk_name, args)
    }

    /// Run a script file. The chunk is named after the file name.
    pub fn do_chunk_file(&self, path: &Path, args: &[(&str, Value)]) -> Result<Vec<Value>, ErrorType> {
        let source = fs::read_to_string(path)
            .map_err(|e| ErrorType::Io(format!("cannot open {}: {}", path.display(), e)))?;
        let chunk_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.do_chunk_str(&source, &chunk_name, args)
    }

    pub fn executor(&self) -> &ChunkExecutor {
        &self.inner.executor
    }

    pub fn interop_root(&self) -> ProxyNode {
        ProxyNode::root(self.inner.interop.clone())
    }

    pub fn interop_tree(&self) -> &Arc<TypeProxyTree> {
        &self.inner.interop
    }

    pub fn storage(&self) -> TableRef {
        self.inner.storage.clone()
    }

    pub fn sink(&self) -> &PrintSink {
        &self.inner.sink
    }

    pub fn resolver(&self) -> Ref<'_, GlobalResolver> {
        self.inner.resolver.borrow()
    }

    /// Consult `source` after every built-in source.
    pub fn add_member_source(&self, source: Rc<dyn MemberSource>) {
        self.inner.resolver.borrow_mut().add_source(source);
    }

    /// Re-measure what global storage holds and return the new total.
    pub fn collect_garbage(&self) -> usize {
        let measured = measure_table(&self.inner.storage);
        self.inner.heap.borrow_mut().reset_to(measured);
        debug!(bytes = measured, "heap reconciled");
        measured
    }

    pub fn memory_in_use(&self) -> usize {
        self.inner.heap.borrow().get_allocated()
    }

    pub fn downgrade(&self) -> WeakGlobal {
        WeakGlobal {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn ptr_eq(&self, other: &GlobalEnvironment) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Identity used for hashing environments as table keys.
    pub fn address(&self) -> usize {
        Rc::as_ptr(&self.inner) as usize
    }
}
