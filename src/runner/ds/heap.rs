//! Approximate memory accounting for script-visible storage.
//!
//! The runtime does not own an allocator. Instead every script write into
//! global storage or a table charges an estimate of the stored value, and
//! `collectgarbage("collect")` reconciles the counter by walking what is
//! actually reachable from the storage table.

use std::collections::HashSet;
use std::mem::size_of;
use std::rc::Rc;

use crate::runner::ds::error::ErrorType;
use crate::runner::ds::table::{TableKey, TableRef};
use crate::runner::ds::value::Value;

pub const OUT_OF_MEMORY: &str = "not enough memory";

#[derive(Debug, Clone, Default)]
pub struct HeapConfig {
    /// `None` means unlimited.
    pub max_bytes: Option<usize>,
}

impl HeapConfig {
    pub fn unlimited() -> Self {
        HeapConfig { max_bytes: None }
    }

    pub fn with_limit(max_bytes: usize) -> Self {
        HeapConfig {
            max_bytes: Some(max_bytes),
        }
    }
}

#[derive(Debug, Default)]
pub struct Heap {
    config: HeapConfig,
    allocated_bytes: usize,
}

impl Heap {
    pub fn new(config: HeapConfig) -> Self {
        Heap {
            config,
            allocated_bytes: 0,
        }
    }

    /// Charge `bytes`, failing without charging anything when the limit
    /// would be exceeded.
    pub fn allocate(&mut self, bytes: usize) -> Result<(), ErrorType> {
        if !self.can_allocate(bytes) {
            return Err(ErrorType::runtime(OUT_OF_MEMORY, 1));
        }
        self.allocated_bytes += bytes;
        Ok(())
    }

    pub fn deallocate(&mut self, bytes: usize) {
        self.allocated_bytes = self.allocated_bytes.saturating_sub(bytes);
    }

    pub fn get_allocated(&self) -> usize {
        self.allocated_bytes
    }

    pub fn get_max_bytes(&self) -> Option<usize> {
        self.config.max_bytes
    }

    pub fn can_allocate(&self, bytes: usize) -> bool {
        match self.config.max_bytes {
            Some(max) => self.allocated_bytes.saturating_add(bytes) <= max,
            None => true,
        }
    }

    /// Replace the running estimate with a freshly measured one.
    pub fn reset_to(&mut self, bytes: usize) {
        self.allocated_bytes = bytes;
    }
}

/// Shallow size estimate of one stored value. Tables are counted by their
/// own entries only; `measure_table` follows nesting.
pub fn estimate_value_size(v: &Value) -> usize {
    let base = size_of::<Value>();
    match v {
        Value::String(s) => base + s.len(),
        Value::Table(t) => base + t.borrow().entry_count() * 2 * size_of::<Value>(),
        _ => base,
    }
}

/// Size of one table entry, counted the way `measure_table` counts it.
/// A `nil` value is no entry.
pub fn estimate_entry_size(key: &Value, value: &Value) -> usize {
    if value.is_nil() {
        return 0;
    }
    let key_size = match key {
        Value::String(s) => size_of::<Value>() + s.len(),
        _ => size_of::<Value>(),
    };
    key_size + estimate_value_size(value)
}

/// Bytes reachable from `root`, each table counted once.
pub fn measure_table(root: &TableRef) -> usize {
    let mut visited = HashSet::new();
    measure_inner(root, &mut visited)
}

fn measure_inner(table: &TableRef, visited: &mut HashSet<usize>) -> usize {
    let address = Rc::as_ptr(table) as *const u8 as usize;
    if !visited.insert(address) {
        return 0;
    }
    let mut total = 0;
    let t = table.borrow();
    for (key, value) in t.entries() {
        total += match key {
            TableKey::String(s) => size_of::<Value>() + s.len(),
            _ => size_of::<Value>(),
        };
        total += match value {
            Value::Table(inner) => size_of::<Value>() + measure_inner(inner, visited),
            other => estimate_value_size(other),
        };
    }
    total
}
