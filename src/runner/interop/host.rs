//! Host type descriptions and the binder that resolves them by name.
//!
//! Hosts describe the types they want scripts to reach with [`HostType`]
//! and register them in a [`HostTypeRegistry`]. Every registration bumps the
//! registry's type-set version, which lets proxy nodes that failed to
//! resolve earlier try again.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::runner::ds::error::ErrorType;
use crate::runner::ds::value::Value;

pub type HostCallable = Arc<dyn Fn(&[Value]) -> Result<Vec<Value>, ErrorType> + Send + Sync>;
pub type HostGetter = Arc<dyn Fn() -> Value + Send + Sync>;
pub type HostSetter = Arc<dyn Fn(Value) -> Result<(), ErrorType> + Send + Sync>;

/// One overload. `arity` of `None` accepts any argument count.
pub struct HostMethod {
    pub arity: Option<usize>,
    pub callable: HostCallable,
}

pub enum HostMember {
    Field {
        getter: HostGetter,
        setter: Option<HostSetter>,
    },
    Methods(Vec<Arc<HostMethod>>),
}

/// A host type as seen by scripts: static fields, static methods and
/// constructors.
pub struct HostType {
    full_name: String,
    members: HashMap<String, HostMember>,
    constructors: Vec<Arc<HostMethod>>,
}

impl HostType {
    pub fn builder(full_name: impl Into<String>) -> HostTypeBuilder {
        HostTypeBuilder {
            ty: HostType {
                full_name: full_name.into(),
                members: HashMap::new(),
                constructors: Vec::new(),
            },
        }
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Last dotted segment of the full name.
    pub fn short_name(&self) -> &str {
        self.full_name
            .rsplit(|c| c == '.' || c == '+')
            .next()
            .unwrap_or(&self.full_name)
    }

    /// Exact match first, then an ASCII case-insensitive scan.
    pub fn find_member(&self, name: &str, ignore_case: bool) -> Option<(&str, &HostMember)> {
        if let Some((k, m)) = self.members.get_key_value(name) {
            return Some((k.as_str(), m));
        }
        if !ignore_case {
            return None;
        }
        self.members
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(k, m)| (k.as_str(), m))
    }

    pub fn constructors(&self) -> &[Arc<HostMethod>] {
        &self.constructors
    }

    pub fn member_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.members.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for HostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostType")
            .field("full_name", &self.full_name)
            .field("members", &self.member_names())
            .field("constructors", &self.constructors.len())
            .finish()
    }
}

pub struct HostTypeBuilder {
    ty: HostType,
}

impl HostTypeBuilder {
    /// A read-only static field.
    pub fn field<G>(mut self, name: impl Into<String>, getter: G) -> Self
    where
        G: Fn() -> Value + Send + Sync + 'static,
    {
        self.ty.members.insert(
            name.into(),
            HostMember::Field {
                getter: Arc::new(getter),
                setter: None,
            },
        );
        self
    }

    /// A static field with a setter.
    pub fn property<G, S>(mut self, name: impl Into<String>, getter: G, setter: S) -> Self
    where
        G: Fn() -> Value + Send + Sync + 'static,
        S: Fn(Value) -> Result<(), ErrorType> + Send + Sync + 'static,
    {
        self.ty.members.insert(
            name.into(),
            HostMember::Field {
                getter: Arc::new(getter),
                setter: Some(Arc::new(setter)),
            },
        );
        self
    }

    /// Add an overload to the method group `name`.
    pub fn method<F>(mut self, name: impl Into<String>, arity: Option<usize>, f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Vec<Value>, ErrorType> + Send + Sync + 'static,
    {
        let overload = Arc::new(HostMethod {
            arity,
            callable: Arc::new(f),
        });
        match self
            .ty
            .members
            .entry(name.into())
            .or_insert_with(|| HostMember::Methods(Vec::new()))
        {
            HostMember::Methods(overloads) => overloads.push(overload),
            field => *field = HostMember::Methods(vec![overload]),
        }
        self
    }

    pub fn constructor<F>(mut self, arity: Option<usize>, f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Vec<Value>, ErrorType> + Send + Sync + 'static,
    {
        self.ty.constructors.push(Arc::new(HostMethod {
            arity,
            callable: Arc::new(f),
        }));
        self
    }

    pub fn build(self) -> Arc<HostType> {
        Arc::new(self.ty)
    }
}

/// A set of overloads bound under one label, callable from scripts.
#[derive(Clone)]
pub struct HostMethodGroup {
    label: String,
    overloads: Vec<Arc<HostMethod>>,
}

impl HostMethodGroup {
    pub fn new(label: impl Into<String>, overloads: Vec<Arc<HostMethod>>) -> Self {
        HostMethodGroup {
            label: label.into(),
            overloads,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_empty(&self) -> bool {
        self.overloads.is_empty()
    }

    /// Pick the overload with the exact arity, else a variadic one.
    pub fn invoke(&self, args: &[Value]) -> Result<Vec<Value>, ErrorType> {
        let chosen = self
            .overloads
            .iter()
            .find(|m| m.arity == Some(args.len()))
            .or_else(|| self.overloads.iter().find(|m| m.arity.is_none()))
            .ok_or_else(|| {
                ErrorType::type_error(format!(
                    "no overload of '{}' takes {} argument(s)",
                    self.label,
                    args.len()
                ))
            })?;
        (chosen.callable)(args)
    }
}

/// Result of binding a member name on a host type.
pub enum BoundMember {
    Value(Value),
    Methods(HostMethodGroup),
}

/// How proxy nodes reach the host type system.
///
/// `resolve_type` runs while the [`TypeProxyTree`] holds its write lock.
/// An implementation must not call back into that tree.
///
/// [`TypeProxyTree`]: crate::runner::interop::proxy_tree::TypeProxyTree
pub trait HostBinder: Send + Sync {
    fn resolve_type(&self, full_name: &str) -> Option<Arc<HostType>>;

    /// Changes whenever the set of resolvable types changes.
    fn type_set_version(&self) -> u64;

    fn bind_member(&self, ty: &HostType, name: &str, ignore_case: bool) -> Option<BoundMember> {
        let (key, member) = ty.find_member(name, ignore_case)?;
        Some(match member {
            HostMember::Field { getter, .. } => BoundMember::Value(getter()),
            HostMember::Methods(overloads) => BoundMember::Methods(HostMethodGroup::new(
                format!("{}.{}", ty.full_name(), key),
                overloads.clone(),
            )),
        })
    }

    fn bind_constructor(&self, ty: &HostType) -> Option<HostMethodGroup> {
        if ty.constructors().is_empty() {
            return None;
        }
        Some(HostMethodGroup::new(
            format!("{}.construct", ty.full_name()),
            ty.constructors().to_vec(),
        ))
    }

    /// `Ok(false)` when there is no settable field `name`.
    fn set_member(&self, ty: &HostType, name: &str, value: Value, ignore_case: bool) -> Result<bool, ErrorType> {
        match ty.find_member(name, ignore_case) {
            Some((_, HostMember::Field { setter: Some(setter), .. })) => {
                setter(value)?;
                Ok(true)
            }
            Some((key, HostMember::Field { setter: None, .. })) => Err(ErrorType::type_error(format!(
                "field '{}.{}' is read-only",
                ty.full_name(),
                key
            ))),
            _ => Ok(false),
        }
    }
}

/// Default binder: types registered by full name.
#[derive(Default)]
pub struct HostTypeRegistry {
    types: RwLock<HashMap<String, Arc<HostType>>>,
    version: AtomicU64,
}

impl HostTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, ty: Arc<HostType>) {
        let name = ty.full_name().to_string();
        self.types
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.clone(), ty);
        let version = self.version.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(host_type = %name, version, "registered host type");
    }

    pub fn unregister(&self, full_name: &str) -> Option<Arc<HostType>> {
        let removed = self
            .types
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(full_name);
        if removed.is_some() {
            self.version.fetch_add(1, Ordering::SeqCst);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.types.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl HostBinder for HostTypeRegistry {
    fn resolve_type(&self, full_name: &str) -> Option<Arc<HostType>> {
        self.types
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(full_name)
            .cloned()
    }

    fn type_set_version(&self) -> u64 {
        self.version.load(Ordering::SeqCst)
    }
}

lazy_static! {
    static ref HOST_TYPES: Arc<HostTypeRegistry> = Arc::new(HostTypeRegistry::new());
}

/// The process-wide registry backing the shared type tree.
pub fn host_types() -> Arc<HostTypeRegistry> {
    HOST_TYPES.clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calculator() -> Arc<HostType> {
        HostType::builder("Demo.Calculator")
            .field("Zero", || Value::Integer(0))
            .method("Add", Some(2), |args| {
                let sum = args.iter().filter_map(Value::as_f64).sum::<f64>();
                Ok(vec![Value::Number(sum)])
            })
            .method("Add", None, |args| Ok(vec![Value::Integer(args.len() as i32)]))
            .build()
    }

    #[test]
    fn test_overload_by_arity() {
        let ty = calculator();
        let registry = HostTypeRegistry::new();
        let group = match registry.bind_member(&ty, "Add", false) {
            Some(BoundMember::Methods(group)) => group,
            _ => panic!("Add should bind to a method group"),
        };
        assert_eq!(
            group.invoke(&[Value::Integer(1), Value::Integer(2)]).unwrap(),
            vec![Value::Number(3.0)]
        );
        assert_eq!(
            group.invoke(&[Value::Integer(1)]).unwrap(),
            vec![Value::Integer(1)]
        );
    }

    #[test]
    fn test_case_insensitive_member() {
        let ty = calculator();
        assert!(ty.find_member("zero", false).is_none());
        assert_eq!(ty.find_member("zero", true).map(|(k, _)| k), Some("Zero"));
    }

    #[test]
    fn test_register_bumps_version() {
        let registry = HostTypeRegistry::new();
        let before = registry.type_set_version();
        registry.register(calculator());
        assert!(registry.type_set_version() > before);
        assert!(registry.resolve_type("Demo.Calculator").is_some());
        assert_eq!(calculator().short_name(), "Calculator");
    }

    #[test]
    fn test_read_only_field() {
        let ty = calculator();
        let registry = HostTypeRegistry::new();
        assert!(registry.set_member(&ty, "Zero", Value::Integer(1), false).is_err());
        assert_eq!(registry.set_member(&ty, "Missing", Value::Nil, false), Ok(false));
    }
}
