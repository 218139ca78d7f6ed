extern crate lune;

use std::cell::Cell;
use std::rc::Rc;

use lune::runner::api::Interpreter;
use lune::runner::ds::error::ErrorType;
use lune::runner::ds::table::Table;
use lune::runner::ds::value::Value;
use lune::runner::global::GlobalEnvironment;
use lune::runner::plugin::resolver::{MemberSource, Resolution};
use pretty_assertions::assert_eq;

fn env() -> GlobalEnvironment {
    Interpreter::new().global()
}

fn is_function(v: &Value) -> bool {
    matches!(v, Value::Function(_))
}

/// Answers one name and counts how often it was asked.
struct Counting {
    name: &'static str,
    value: i32,
    hits: Cell<usize>,
}

impl Counting {
    fn new(name: &'static str, value: i32) -> Rc<Self> {
        Rc::new(Counting {
            name,
            value,
            hits: Cell::new(0),
        })
    }
}

impl MemberSource for Counting {
    fn try_resolve(&self, name: &str, _env: &GlobalEnvironment) -> Result<Resolution, ErrorType> {
        self.hits.set(self.hits.get() + 1);
        Ok(if name == self.name {
            Resolution::Found(Value::Integer(self.value))
        } else {
            Resolution::Next
        })
    }

    fn name(&self) -> &str {
        "counting"
    }
}

// ── Storage and built-ins ─────────────────────────────────────────────

#[test]
fn test_storage_value_wins_over_builtin() {
    let env = env();
    env.set_member("print", Value::Integer(1)).unwrap();
    assert_eq!(env.get_member("print").unwrap(), Value::Integer(1));
}

#[test]
fn test_absent_storage_falls_through_to_builtin() {
    let env = env();
    assert!(is_function(&env.get_member("type").unwrap()));
    assert!(matches!(env.get_member("math").unwrap(), Value::HostObject(_)));
}

#[test]
fn test_nil_assignment_reveals_builtin_again() {
    let env = env();
    env.set_member("type", Value::Integer(5)).unwrap();
    assert_eq!(env.get_member("type").unwrap(), Value::Integer(5));
    env.set_member("type", Value::Nil).unwrap();
    assert!(is_function(&env.get_member("type").unwrap()));
    env.set_member("type", Value::from("shadow")).unwrap();
    assert_eq!(env.get_member("type").unwrap(), Value::from("shadow"));
}

#[test]
fn test_library_shadowed_from_script() {
    let env = env();
    let out = env
        .do_chunk_str("local before = type(math)\nmath = 3\nreturn before, math", "shadow", &[])
        .unwrap();
    assert_eq!(out, vec![Value::from("userdata"), Value::Integer(3)]);
}

#[test]
fn test_unknown_name_is_nil() {
    assert_eq!(env().get_member("no_such_global").unwrap(), Value::Nil);
}

#[test]
fn test_bound_builtin_is_materialized_once() {
    let env = env();
    let first = env.get_member("select").unwrap();
    let second = env.get_member("select").unwrap();
    assert_eq!(first, second);
}

// ── Reserved names ────────────────────────────────────────────────────

#[test]
fn test_reserved_names_win_over_storage() {
    let env = env();
    env.set_member("_VERSION", Value::from("mine")).unwrap();
    env.set_member("clr", Value::Integer(0)).unwrap();
    assert_eq!(env.get_member("_VERSION").unwrap(), Value::from("Lune 5.2"));
    match env.get_member("clr").unwrap() {
        Value::TypeNode(node) => assert!(node.is_root()),
        other => panic!("expected the interop root, got {:?}", other),
    }
}

// ── Pipeline ──────────────────────────────────────────────────────────

#[test]
fn test_source_order() {
    let env = env();
    assert_eq!(
        env.resolver().source_names(),
        vec!["reserved", "storage", "core_functions", "system_libraries"]
    );
}

#[test]
fn test_host_source_is_consulted_last() {
    let env = env();
    let answers_print = Counting::new("print", 7);
    env.add_member_source(answers_print.clone());
    assert!(is_function(&env.get_member("print").unwrap()));
    assert_eq!(answers_print.hits.get(), 0);

    let answers_custom = Counting::new("answer", 42);
    env.add_member_source(answers_custom.clone());
    assert_eq!(env.get_member("answer").unwrap(), Value::Integer(42));
    assert_eq!(answers_custom.hits.get(), 1);
}

#[test]
fn test_fallback_decision_is_not_cached() {
    let env = env();
    let source = Counting::new("late", 1);
    env.add_member_source(source.clone());
    assert_eq!(env.get_member("late").unwrap(), Value::Integer(1));
    assert_eq!(env.get_member("late").unwrap(), Value::Integer(1));
    assert_eq!(source.hits.get(), 2);

    env.set_member("late", Value::Integer(2)).unwrap();
    assert_eq!(env.get_member("late").unwrap(), Value::Integer(2));
    assert_eq!(source.hits.get(), 2);
}

#[test]
fn test_storage_index_hook_is_honored() {
    let env = env();
    let fallback = Table::new_ref();
    fallback
        .borrow_mut()
        .raw_set(Value::from("hooked"), Value::Integer(9))
        .unwrap();
    env.storage()
        .borrow_mut()
        .set_index_hook(Some(Value::Table(fallback)));
    assert_eq!(env.get_member("hooked").unwrap(), Value::Integer(9));
}

#[test]
fn test_environments_do_not_share_storage() {
    let a = env();
    let b = env();
    a.set_member("only_a", Value::Boolean(true)).unwrap();
    assert_eq!(b.get_member("only_a").unwrap(), Value::Nil);
}

#[test]
fn test_bound_function_sees_its_own_environment() {
    let a = env();
    let b = env();
    a.set_member("n", Value::Integer(1)).unwrap();
    b.set_member("n", Value::Integer(2)).unwrap();
    let source = "return dofile ~= nil, n";
    assert_eq!(
        a.do_chunk_str(source, "a", &[]).unwrap(),
        vec![Value::Boolean(true), Value::Integer(1)]
    );
    assert_eq!(
        b.do_chunk_str(source, "b", &[]).unwrap(),
        vec![Value::Boolean(true), Value::Integer(2)]
    );
}
