//! Bridge between scripts and the host type system.

pub mod host;
pub mod package;
pub mod proxy_node;
pub mod proxy_tree;

pub use host::{HostBinder, HostType, HostTypeRegistry};
pub use proxy_node::ProxyNode;
pub use proxy_tree::{Classification, NodeId, TypeProxyTree};
