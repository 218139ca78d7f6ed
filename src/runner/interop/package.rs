//! A host type registered under a global name.

use std::any::Any;
use std::sync::Arc;

use crate::runner::ds::error::ErrorType;
use crate::runner::ds::function_object::FunctionObject;
use crate::runner::ds::host_object::HostObject;
use crate::runner::ds::value::Value;
use crate::runner::interop::host::{BoundMember, HostBinder, HostType};
use crate::runner::interop::proxy_node::CONSTRUCTOR_MEMBER;
use crate::runner::plugin::types::EvalContext;

/// Exposes the static members of one host type, bypassing the proxy tree.
pub struct PackageProxy {
    ty: Arc<HostType>,
    binder: Arc<dyn HostBinder>,
}

impl PackageProxy {
    pub fn new(ty: Arc<HostType>, binder: Arc<dyn HostBinder>) -> Self {
        PackageProxy { ty, binder }
    }

    pub fn host_type(&self) -> &Arc<HostType> {
        &self.ty
    }
}

impl HostObject for PackageProxy {
    fn type_name(&self) -> &str {
        self.ty.full_name()
    }

    fn get_member(&self, name: &str, ignore_case: bool) -> Option<Value> {
        match self.binder.bind_member(&self.ty, name, ignore_case)? {
            BoundMember::Value(v) => Some(v),
            BoundMember::Methods(group) => Some(Value::Function(FunctionObject::host(group))),
        }
    }

    fn set_member(&self, name: &str, value: Value) -> Result<bool, ErrorType> {
        self.binder.set_member(&self.ty, name, value, false)
    }

    fn invoke_member(
        &self,
        _ctx: &mut EvalContext,
        name: &str,
        args: Vec<Value>,
        ignore_case: bool,
    ) -> Option<Result<Vec<Value>, ErrorType>> {
        let group = if name == CONSTRUCTOR_MEMBER {
            self.binder.bind_constructor(&self.ty)?
        } else {
            match self.binder.bind_member(&self.ty, name, ignore_case)? {
                BoundMember::Methods(group) => group,
                BoundMember::Value(_) => return None,
            }
        };
        Some(group.invoke(&args))
    }

    fn display(&self) -> String {
        format!("package: {}", self.ty.full_name())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
