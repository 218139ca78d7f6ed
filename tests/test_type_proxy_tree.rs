extern crate lune;

use std::collections::HashSet;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use lune::runner::api::Interpreter;
use lune::runner::ds::error::ErrorType;
use lune::runner::ds::value::Value;
use lune::runner::interop::host::{HostBinder, HostType, HostTypeRegistry};
use lune::runner::interop::proxy_tree::{Classification, TypeProxyTree, INDEX_THRESHOLD};
use pretty_assertions::assert_eq;

fn private_tree() -> (Arc<HostTypeRegistry>, Arc<TypeProxyTree>) {
    let registry = Arc::new(HostTypeRegistry::new());
    let tree = Arc::new(TypeProxyTree::new(registry.clone()));
    (registry, tree)
}

// ── Child creation and indices ───────────────────────────────────────

#[test]
fn test_child_indices_increase_and_are_never_reused() {
    let (_, tree) = private_tree();
    let root = TypeProxyTree::ROOT;
    let mut seen = HashSet::new();
    for i in 0..(INDEX_THRESHOLD + 5) {
        let (_, index) = tree.child_for(root, &format!("N{}", i), false);
        assert_eq!(index, i);
        assert!(seen.insert(index));
    }
    assert!(tree.has_name_index(root));
    for i in 0..(INDEX_THRESHOLD + 5) {
        let (id, index) = tree.child_for(root, &format!("N{}", i), false);
        assert_eq!(index, i);
        assert_eq!(tree.child_at(root, index), Some(id));
    }
    assert_eq!(tree.node_count(), INDEX_THRESHOLD + 6);
}

#[test]
fn test_no_name_index_below_threshold() {
    let (_, tree) = private_tree();
    for i in 0..(INDEX_THRESHOLD - 1) {
        tree.child_for(TypeProxyTree::ROOT, &format!("N{}", i), false);
    }
    assert!(!tree.has_name_index(TypeProxyTree::ROOT));
}

#[test]
fn test_ignore_case_finds_existing_child() {
    let (_, tree) = private_tree();
    let (a, _) = tree.child_for(TypeProxyTree::ROOT, "System", false);
    let (b, _) = tree.child_for(TypeProxyTree::ROOT, "SYSTEM", true);
    let (c, _) = tree.child_for(TypeProxyTree::ROOT, "SYSTEM", false);
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn test_racing_threads_create_one_child() {
    let (_, tree) = private_tree();
    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));
    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let tree = tree.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                tree.child_for(TypeProxyTree::ROOT, "Race", false)
            })
        })
        .collect();
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(results.iter().all(|r| *r == results[0]));
    assert_eq!(tree.node_count(), 2);
    assert_eq!(tree.member_names(TypeProxyTree::ROOT), vec!["Race".to_string()]);
}

/// Registry wrapper that counts type lookups.
struct CountingBinder {
    registry: HostTypeRegistry,
    lookups: AtomicUsize,
}

impl HostBinder for CountingBinder {
    fn resolve_type(&self, full_name: &str) -> Option<Arc<HostType>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.registry.resolve_type(full_name)
    }

    fn type_set_version(&self) -> u64 {
        self.registry.type_set_version()
    }
}

#[test]
fn test_existing_child_lookup_skips_resolution() {
    let binder = Arc::new(CountingBinder {
        registry: HostTypeRegistry::new(),
        lookups: AtomicUsize::new(0),
    });
    let tree = TypeProxyTree::new(binder.clone());
    let (a, _) = tree.child_for(TypeProxyTree::ROOT, "A", false);
    let first = tree.child_for(a, "B", false);
    let after_create = binder.lookups.load(Ordering::SeqCst);
    assert_eq!(after_create, 1);
    assert_eq!(tree.classification(a), Classification::Namespace);
    for _ in 0..5 {
        assert_eq!(tree.child_for(a, "B", false), first);
        assert_eq!(tree.child_for(a, "b", true), first);
    }
    assert_eq!(binder.lookups.load(Ordering::SeqCst), after_create);
    assert_eq!(tree.node_count(), 3);
}

// ── Full names and classification ────────────────────────────────────

#[test]
fn test_full_name_through_namespaces() {
    let (_, tree) = private_tree();
    let (a, _) = tree.child_for(TypeProxyTree::ROOT, "A", false);
    let (b, _) = tree.child_for(a, "B", false);
    let (c, _) = tree.child_for(b, "C", false);
    assert_eq!(tree.full_name(c), "A.B.C");
    assert_eq!(tree.classification(a), Classification::Namespace);
    assert_eq!(tree.classification(b), Classification::Namespace);
    assert_eq!(tree.classification(c), Classification::Unknown);
}

#[test]
fn test_nested_separator_below_a_type() {
    let (registry, tree) = private_tree();
    registry.register(HostType::builder("A.B").build());
    let (a, _) = tree.child_for(TypeProxyTree::ROOT, "A", false);
    let (b, _) = tree.child_for(a, "B", false);
    let (c, _) = tree.child_for(b, "C", false);
    assert_eq!(tree.classification(b), Classification::Type);
    assert_eq!(tree.full_name(c), "A.B+C");
}

#[test]
fn test_late_registration_resolves_unknown_node() {
    let (registry, tree) = private_tree();
    let (late, _) = tree.child_for(TypeProxyTree::ROOT, "Late", false);
    let (thing, _) = tree.child_for(late, "Thing", false);
    assert!(tree.resolved_type(thing).is_none());
    registry.register(HostType::builder("Late.Thing").build());
    let ty = tree.resolved_type(thing).unwrap();
    assert_eq!(ty.full_name(), "Late.Thing");
    assert_eq!(tree.classification(thing), Classification::Type);
}

// ── Script access ────────────────────────────────────────────────────

fn counter_type(state: Arc<AtomicI64>) -> Arc<HostType> {
    let read = state.clone();
    HostType::builder("Demo.Counter")
        .field("Name", || Value::from("counter"))
        .property(
            "Value",
            move || Value::from_i64(read.load(Ordering::SeqCst)),
            move |v| {
                let n = v
                    .as_i64()
                    .ok_or_else(|| ErrorType::type_error("Value must be an integer"))?;
                state.store(n, Ordering::SeqCst);
                Ok(())
            },
        )
        .method("Add", Some(2), |args| {
            let sum: i64 = args.iter().filter_map(Value::as_i64).sum();
            Ok(vec![Value::from_i64(sum)])
        })
        .method("Add", None, |args| Ok(vec![Value::from_i64(args.len() as i64)]))
        .constructor(Some(2), |args| {
            let product: i64 = args.iter().filter_map(Value::as_i64).product();
            Ok(vec![Value::from_i64(product)])
        })
        .build()
}

fn interpreter_with_counter() -> (Interpreter, Arc<AtomicI64>) {
    let (registry, tree) = private_tree();
    let state = Arc::new(AtomicI64::new(0));
    registry.register(counter_type(state.clone()));
    let interpreter = Interpreter::builder().tree(tree).build().unwrap();
    (interpreter, state)
}

#[test]
fn test_script_reads_fields_and_calls_overloads() {
    let (interpreter, _) = interpreter_with_counter();
    let out = interpreter
        .run_str(
            "local c = clr.Demo.Counter\nreturn c.Name, c.Add(2, 3), c.Add(1, 2, 3), c:construct(4, 5)",
            "counter",
        )
        .unwrap();
    assert_eq!(
        out,
        vec![
            Value::from("counter"),
            Value::Integer(5),
            Value::Integer(3),
            Value::Integer(20),
        ]
    );
}

#[test]
fn test_script_sets_property() {
    let (interpreter, state) = interpreter_with_counter();
    interpreter
        .run_str("clr.Demo.Counter.Value = 12", "set")
        .unwrap();
    assert_eq!(state.load(Ordering::SeqCst), 12);
    let err = interpreter.run_str("clr.Demo.Counter.Name = 'x'", "readonly");
    assert!(matches!(err, Err(ErrorType::TypeError(_))));
}

#[test]
fn test_invoke_on_unresolved_node_fails() {
    let (interpreter, _) = interpreter_with_counter();
    let err = interpreter.run_str("clr.Nothing.Here:construct()", "missing");
    match err {
        Err(ErrorType::TypeError(message)) => assert!(message.contains("Nothing.Here")),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_namespace_display() {
    let (interpreter, _) = interpreter_with_counter();
    let out = interpreter
        .run_str("return tostring(clr), tostring(clr.Demo.Counter), type(clr)", "display")
        .unwrap();
    assert_eq!(
        out,
        vec![
            Value::from("clr"),
            Value::from("Demo.Counter"),
            Value::from("userdata"),
        ]
    );
}
