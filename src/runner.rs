pub mod api;
pub mod chunk;
pub mod ds;
pub mod eval;
pub mod global;
pub mod interop;
pub mod plugin;
pub mod std_lib;
