//! Registration of the built-in functions and libraries.

use crate::runner::plugin::registry::{CoreFunctionRegistry, SystemLibraryRegistry};

use super::chunk;
use super::console;
use super::conversion;
use super::error;
use super::gc;
use super::math;
use super::raw;
use super::select;
use super::string;

pub fn register_core_functions(registry: &mut CoreFunctionRegistry) {
    registry.register("assert", error::assert);
    registry.register("collectgarbage", gc::collect_garbage);
    registry.register("dofile", chunk::dofile);
    registry.register("error", error::error);
    registry.register("print", console::print);
    registry.register("rawequal", raw::rawequal);
    registry.register("rawget", raw::rawget);
    registry.register("rawlen", raw::rawlen);
    registry.register("rawset", raw::rawset);
    registry.register("select", select::select);
    registry.register("tonumber", conversion::tonumber);
    registry.register("tostring", conversion::tostring);
    registry.register("type", conversion::type_of);
}

pub fn register_system_libraries(registry: &mut SystemLibraryRegistry) {
    registry.register(math::library());
    registry.register(string::library());
}
