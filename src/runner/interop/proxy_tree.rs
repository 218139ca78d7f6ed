//! The lazily built tree of host namespaces and types.
//!
//! Nodes live in one arena behind a single `RwLock` and are addressed by
//! [`NodeId`]. Nothing is created up front: `clr.System.Text` creates the
//! `System` and `Text` nodes the first time a script walks that path, and
//! each node tries to resolve its full name to a host type on demand.
//!
//! ```text
//! clr (root, Namespace)
//! └── System        (Namespace: has children, no type)
//!     ├── Text      (Namespace)
//!     │   └── StringBuilder  (Type)
//!     └── Environment        (Type)
//!         └── SpecialFolder  (nested, full name System.Environment+SpecialFolder)
//! ```
//!
//! Classification only moves forward: `Unknown` becomes `Namespace` once a
//! node has children and no type, or `Type` once its type resolves.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use crate::runner::interop::host::{host_types, HostBinder, HostType};

/// Child count at which a node starts keeping a name index.
pub const INDEX_THRESHOLD: usize = 10;
/// Separator between a type and a type nested inside it.
pub const NESTED_TYPE_SEPARATOR: char = '+';
pub const NAMESPACE_SEPARATOR: char = '.';

/// Stable handle of a node inside its tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Unknown,
    Namespace,
    Type,
}

struct TypeProxyNode {
    name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    name_index: Option<HashMap<String, usize>>,
    resolved_type: Option<Arc<HostType>>,
    /// Type-set version seen by the last failed resolution.
    checked_version: Option<u64>,
    classification: Classification,
}

impl TypeProxyNode {
    fn new(name: String, parent: Option<NodeId>) -> Self {
        TypeProxyNode {
            name,
            parent,
            children: Vec::new(),
            name_index: None,
            resolved_type: None,
            checked_version: None,
            classification: Classification::Unknown,
        }
    }
}

pub struct TypeProxyTree {
    binder: Arc<dyn HostBinder>,
    nodes: RwLock<Vec<TypeProxyNode>>,
}

lazy_static! {
    static ref SHARED_TREE: Arc<TypeProxyTree> = Arc::new(TypeProxyTree::new(host_types()));
}

impl TypeProxyTree {
    pub const ROOT: NodeId = NodeId(0);

    pub fn new(binder: Arc<dyn HostBinder>) -> Self {
        let mut root = TypeProxyNode::new(String::new(), None);
        root.classification = Classification::Namespace;
        TypeProxyTree {
            binder,
            nodes: RwLock::new(vec![root]),
        }
    }

    /// The process-wide tree over the shared host type registry.
    pub fn shared() -> Arc<TypeProxyTree> {
        SHARED_TREE.clone()
    }

    pub fn binder(&self) -> &Arc<dyn HostBinder> {
        &self.binder
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<TypeProxyNode>> {
        self.nodes.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<TypeProxyNode>> {
        self.nodes.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn node_count(&self) -> usize {
        self.read().len()
    }

    /// Find or create the child `name` of `parent`, returning it with its
    /// index under the parent.
    ///
    /// An existing child below a classified parent is found under the read
    /// lock. Otherwise the lookup, append and index maintenance run under
    /// the write lock, so racing callers always agree on one child.
    pub fn child_for(&self, parent: NodeId, name: &str, ignore_case: bool) -> (NodeId, usize) {
        {
            let nodes = self.read();
            if nodes[parent.0].classification != Classification::Unknown {
                if let Some(found) = find_child(&nodes, parent, name, ignore_case) {
                    return found;
                }
            }
        }
        let mut nodes = self.write();
        let (id, index) = match find_child(&nodes, parent, name, ignore_case) {
            Some(found) => found,
            None => {
                let id = NodeId(nodes.len());
                nodes.push(TypeProxyNode::new(name.to_string(), Some(parent)));
                let node = &mut nodes[parent.0];
                let index = node.children.len();
                node.children.push(id);
                if let Some(name_index) = node.name_index.as_mut() {
                    name_index.insert(name.to_string(), index);
                } else if node.children.len() >= INDEX_THRESHOLD {
                    let children = node.children.clone();
                    let built = children
                        .iter()
                        .enumerate()
                        .map(|(i, c)| (nodes[c.0].name.clone(), i))
                        .collect();
                    nodes[parent.0].name_index = Some(built);
                }
                debug!(parent = parent.0, child = name, index, "created type proxy node");
                (id, index)
            }
        };
        if nodes[parent.0].classification == Classification::Unknown {
            self.resolve_locked(&mut nodes, parent);
            if nodes[parent.0].classification == Classification::Unknown {
                nodes[parent.0].classification = Classification::Namespace;
            }
        }
        (id, index)
    }

    /// Re-enter a child by the index `child_for` returned.
    pub fn child_at(&self, parent: NodeId, index: usize) -> Option<NodeId> {
        self.read().get(parent.0)?.children.get(index).copied()
    }

    /// Memoized type of `id`, resolving through the binder if needed.
    pub fn resolved_type(&self, id: NodeId) -> Option<Arc<HostType>> {
        {
            let nodes = self.read();
            let node = nodes.get(id.0)?;
            if let Some(ty) = &node.resolved_type {
                return Some(ty.clone());
            }
            if !self.needs_resolution(node) {
                return None;
            }
        }
        let mut nodes = self.write();
        self.resolve_locked(&mut nodes, id)
    }

    fn needs_resolution(&self, node: &TypeProxyNode) -> bool {
        node.parent.is_some()
            && node.classification != Classification::Namespace
            && node.checked_version != Some(self.binder.type_set_version())
    }

    fn resolve_locked(&self, nodes: &mut [TypeProxyNode], id: NodeId) -> Option<Arc<HostType>> {
        if let Some(ty) = &nodes[id.0].resolved_type {
            return Some(ty.clone());
        }
        if !self.needs_resolution(&nodes[id.0]) {
            return None;
        }
        let version = self.binder.type_set_version();
        let full_name = full_name_of(nodes, id);
        match self.binder.resolve_type(&full_name) {
            Some(ty) => {
                debug!(full_name = %full_name, "resolved host type");
                let node = &mut nodes[id.0];
                node.resolved_type = Some(ty.clone());
                node.classification = Classification::Type;
                Some(ty)
            }
            None => {
                nodes[id.0].checked_version = Some(version);
                None
            }
        }
    }

    /// Dotted host name of `id`; nested types use `+` below a non-namespace.
    pub fn full_name(&self, id: NodeId) -> String {
        full_name_of(&self.read(), id)
    }

    pub fn name(&self, id: NodeId) -> String {
        self.read()
            .get(id.0)
            .map(|n| n.name.clone())
            .unwrap_or_default()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.read().get(id.0)?.parent
    }

    pub fn classification(&self, id: NodeId) -> Classification {
        self.read()
            .get(id.0)
            .map(|n| n.classification)
            .unwrap_or(Classification::Unknown)
    }

    /// Names of the children created so far, in creation order.
    pub fn member_names(&self, id: NodeId) -> Vec<String> {
        let nodes = self.read();
        match nodes.get(id.0) {
            Some(node) => node
                .children
                .iter()
                .map(|c| nodes[c.0].name.clone())
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn has_name_index(&self, id: NodeId) -> bool {
        self.read()
            .get(id.0)
            .map(|n| n.name_index.is_some())
            .unwrap_or(false)
    }
}

fn find_child(nodes: &[TypeProxyNode], parent: NodeId, name: &str, ignore_case: bool) -> Option<(NodeId, usize)> {
    let node = &nodes[parent.0];
    if let Some(index) = node.name_index.as_ref().and_then(|idx| idx.get(name)) {
        return Some((node.children[*index], *index));
    }
    if node.name_index.is_some() && !ignore_case {
        return None;
    }
    node.children.iter().enumerate().find_map(|(i, c)| {
        let child_name = &nodes[c.0].name;
        let hit = if ignore_case {
            child_name.eq_ignore_ascii_case(name)
        } else {
            child_name == name
        };
        if hit {
            Some((*c, i))
        } else {
            None
        }
    })
}

fn full_name_of(nodes: &[TypeProxyNode], id: NodeId) -> String {
    let mut segments = Vec::new();
    let mut current = id;
    while let Some(parent) = nodes[current.0].parent {
        segments.push(current);
        current = parent;
    }
    let mut out = String::new();
    for (depth, node_id) in segments.iter().rev().enumerate() {
        let node = &nodes[node_id.0];
        if depth > 0 {
            let parent = node.parent.map(|p| &nodes[p.0]);
            match parent.map(|p| p.classification) {
                Some(Classification::Namespace) => out.push(NAMESPACE_SEPARATOR),
                _ => out.push(NESTED_TYPE_SEPARATOR),
            }
        }
        out.push_str(&node.name);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::interop::host::HostTypeRegistry;

    fn private_tree() -> (Arc<HostTypeRegistry>, TypeProxyTree) {
        let registry = Arc::new(HostTypeRegistry::new());
        let tree = TypeProxyTree::new(registry.clone());
        (registry, tree)
    }

    #[test]
    fn test_root_is_namespace_without_type() {
        let (_, tree) = private_tree();
        assert_eq!(tree.classification(TypeProxyTree::ROOT), Classification::Namespace);
        assert!(tree.resolved_type(TypeProxyTree::ROOT).is_none());
        assert_eq!(tree.full_name(TypeProxyTree::ROOT), "");
    }

    #[test]
    fn test_index_built_at_threshold() {
        let (_, tree) = private_tree();
        for i in 0..INDEX_THRESHOLD - 1 {
            tree.child_for(TypeProxyTree::ROOT, &format!("N{}", i), false);
        }
        assert!(!tree.has_name_index(TypeProxyTree::ROOT));
        tree.child_for(TypeProxyTree::ROOT, "Tenth", false);
        assert!(tree.has_name_index(TypeProxyTree::ROOT));
        let (_, index) = tree.child_for(TypeProxyTree::ROOT, "Eleventh", false);
        assert_eq!(index, INDEX_THRESHOLD);
        assert_eq!(tree.child_for(TypeProxyTree::ROOT, "N3", false).1, 3);
    }

    #[test]
    fn test_case_insensitive_falls_back_past_index() {
        let (_, tree) = private_tree();
        for i in 0..12 {
            tree.child_for(TypeProxyTree::ROOT, &format!("Name{}", i), false);
        }
        let (_, index) = tree.child_for(TypeProxyTree::ROOT, "name7", true);
        assert_eq!(index, 7);
        assert_eq!(tree.member_names(TypeProxyTree::ROOT).len(), 12);
    }

    #[test]
    fn test_failed_resolution_retried_after_version_bump() {
        let (registry, tree) = private_tree();
        let (id, _) = tree.child_for(TypeProxyTree::ROOT, "Late", false);
        assert!(tree.resolved_type(id).is_none());
        assert_eq!(tree.classification(id), Classification::Unknown);

        registry.register(HostType::builder("Late").build());
        assert!(tree.resolved_type(id).is_some());
        assert_eq!(tree.classification(id), Classification::Type);
    }
}
