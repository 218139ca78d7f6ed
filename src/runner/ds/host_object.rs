//! Opaque host values ("userdata") with optional member dispatch.

use std::any::Any;
use std::rc::Rc;

use crate::runner::ds::error::ErrorType;
use crate::runner::ds::value::Value;
use crate::runner::plugin::types::EvalContext;

pub type HostObjectRef = Rc<dyn HostObject>;

/// A host value scripts can hold, index and invoke members on.
///
/// Every hook defaults to "not found", so a plain handle only needs
/// `type_name` and `as_any`.
pub trait HostObject {
    fn type_name(&self) -> &str;

    fn get_member(&self, _name: &str, _ignore_case: bool) -> Option<Value> {
        None
    }

    /// Returns `Ok(false)` when the object has no settable member `name`.
    fn set_member(&self, _name: &str, _value: Value) -> Result<bool, ErrorType> {
        Ok(false)
    }

    fn invoke_member(
        &self,
        _ctx: &mut EvalContext,
        _name: &str,
        _args: Vec<Value>,
        _ignore_case: bool,
    ) -> Option<Result<Vec<Value>, ErrorType>> {
        None
    }

    /// Own length/count facility, read by `rawlen`.
    fn length(&self) -> Option<usize> {
        None
    }

    fn display(&self) -> String {
        format!("userdata: {}", self.type_name())
    }

    fn as_any(&self) -> &dyn Any;
}
