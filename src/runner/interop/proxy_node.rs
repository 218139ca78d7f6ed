//! Script-facing handle on one node of a [`TypeProxyTree`].

use std::fmt;
use std::sync::Arc;

use crate::runner::ds::error::ErrorType;
use crate::runner::ds::function_object::{call_value, FunctionObject};
use crate::runner::ds::value::Value;
use crate::runner::interop::host::{BoundMember, HostType};
use crate::runner::interop::proxy_tree::{Classification, NodeId, TypeProxyTree};
use crate::runner::plugin::global_resolver::INTEROP_ROOT_NAME;
use crate::runner::plugin::types::EvalContext;

/// Member name that selects a type's constructors.
pub const CONSTRUCTOR_MEMBER: &str = "construct";

#[derive(Clone)]
pub struct ProxyNode {
    tree: Arc<TypeProxyTree>,
    id: NodeId,
}

impl ProxyNode {
    pub fn new(tree: Arc<TypeProxyTree>, id: NodeId) -> Self {
        ProxyNode { tree, id }
    }

    pub fn root(tree: Arc<TypeProxyTree>) -> Self {
        ProxyNode::new(tree, TypeProxyTree::ROOT)
    }

    pub fn tree(&self) -> &Arc<TypeProxyTree> {
        &self.tree
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn is_root(&self) -> bool {
        self.id == TypeProxyTree::ROOT
    }

    pub fn same_node(&self, other: &ProxyNode) -> bool {
        Arc::ptr_eq(&self.tree, &other.tree) && self.id == other.id
    }

    pub fn full_name(&self) -> String {
        self.tree.full_name(self.id)
    }

    pub fn classification(&self) -> Classification {
        self.tree.classification(self.id)
    }

    pub fn resolved_type(&self) -> Option<Arc<HostType>> {
        self.tree.resolved_type(self.id)
    }

    pub fn member_names(&self) -> Vec<String> {
        self.tree.member_names(self.id)
    }

    /// Child node `name`, created on first access.
    pub fn child(&self, name: &str, ignore_case: bool) -> ProxyNode {
        let (id, _) = self.tree.child_for(self.id, name, ignore_case);
        ProxyNode::new(self.tree.clone(), id)
    }

    /// A static member of the resolved type if there is one, otherwise the
    /// child node `name`.
    pub fn get_member(&self, name: &str, ignore_case: bool) -> Value {
        if let Some(ty) = self.resolved_type() {
            match self.tree.binder().bind_member(&ty, name, ignore_case) {
                Some(BoundMember::Value(v)) => return v,
                Some(BoundMember::Methods(group)) => {
                    return Value::Function(FunctionObject::host(group))
                }
                None => {}
            }
        }
        Value::TypeNode(self.child(name, ignore_case))
    }

    pub fn set_member(&self, name: &str, value: Value, ignore_case: bool) -> Result<(), ErrorType> {
        let ty = self.resolved_type().ok_or_else(|| self.unresolved())?;
        if self.tree.binder().set_member(&ty, name, value, ignore_case)? {
            Ok(())
        } else {
            Err(ErrorType::type_error(format!(
                "'{}' has no settable member '{}'",
                ty.full_name(),
                name
            )))
        }
    }

    /// `node:name(args)`. `construct` selects the constructors; any other
    /// name binds a method group, then falls back to calling whatever
    /// `get_member` returns.
    pub fn invoke_member(
        &self,
        ctx: &mut EvalContext,
        name: &str,
        args: Vec<Value>,
        ignore_case: bool,
    ) -> Result<Vec<Value>, ErrorType> {
        let ty = self.resolved_type().ok_or_else(|| self.unresolved())?;
        let binder = self.tree.binder();
        let group = if name == CONSTRUCTOR_MEMBER {
            binder.bind_constructor(&ty)
        } else {
            match binder.bind_member(&ty, name, ignore_case) {
                Some(BoundMember::Methods(group)) => Some(group),
                _ => None,
            }
        };
        if let Some(group) = group {
            return group.invoke(&args);
        }
        match self.get_member(name, ignore_case) {
            f @ Value::Function(_) => call_value(ctx, &f, args),
            _ => Err(ErrorType::type_error(format!(
                "'{}' has no callable member '{}'",
                ty.full_name(),
                name
            ))),
        }
    }

    fn unresolved(&self) -> ErrorType {
        ErrorType::type_error(format!(
            "'{}' is not a resolvable host type",
            self.full_name()
        ))
    }
}

impl fmt::Display for ProxyNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            write!(f, "{}", INTEROP_ROOT_NAME)
        } else {
            write!(f, "{}", self.full_name())
        }
    }
}

impl fmt::Debug for ProxyNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyNode")
            .field("id", &self.id)
            .field("full_name", &self.full_name())
            .finish()
    }
}
