//! Centralized integration tests for di-impl

use di_abstractions::{InitResult, Initializable, NewInstance, ServiceResolver, ServiceSlot};
use di_impl::Container;
use parking_lot::RwLock;
use registry_common::{ContainerConfig, DependencyError, InitOrdering};
use std::io::Write;
use std::sync::{Arc, Once};

static INIT: Once = Once::new();

fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

trait Describe: Send + Sync {
    fn describe(&self) -> String;
}

#[derive(Debug)]
struct A {
    value: RwLock<String>,
}

impl A {
    fn new(value: &str) -> Self {
        Self {
            value: RwLock::new(value.to_string()),
        }
    }

    fn value(&self) -> String {
        self.value.read().clone()
    }

    fn set(&self, value: &str) {
        *self.value.write() = value.to_string();
    }
}

impl Clone for A {
    fn clone(&self) -> Self {
        Self::new(&self.value())
    }
}

impl Describe for A {
    fn describe(&self) -> String {
        format!("A({})", self.value())
    }
}

struct Other;

impl Describe for Other {
    fn describe(&self) -> String {
        "Other".to_string()
    }
}

/// 共享依赖
#[derive(Default)]
struct B {
    dep: RwLock<Option<Arc<A>>>,
}

impl B {
    fn dep(&self) -> Arc<A> {
        self.dep.read().clone().expect("B 尚未初始化")
    }
}

impl Initializable for B {
    type Deps = (Arc<A>,);

    fn init(&self, (a,): Self::Deps) -> InitResult {
        *self.dep.write() = Some(a);
        Ok(())
    }
}

/// 新实例依赖
#[derive(Default)]
struct C {
    dep: RwLock<Option<Arc<A>>>,
    marker: RwLock<Option<NewInstance>>,
}

impl C {
    fn dep(&self) -> Arc<A> {
        self.dep.read().clone().expect("C 尚未初始化")
    }
}

impl Initializable for C {
    type Deps = (NewInstance, Arc<A>);

    fn init(&self, (marker, a): Self::Deps) -> InitResult {
        *self.marker.write() = Some(marker);
        *self.dep.write() = Some(a);
        Ok(())
    }
}

/// 依赖从未注册的 E
struct D;

struct E;

impl Initializable for D {
    type Deps = (Arc<E>,);

    fn init(&self, _: Self::Deps) -> InitResult {
        Ok(())
    }
}

/// 以能力声明依赖
#[derive(Default)]
struct Reporter {
    line: RwLock<String>,
}

impl Initializable for Reporter {
    type Deps = (Arc<dyn Describe>,);

    fn init(&self, (describe,): Self::Deps) -> InitResult {
        *self.line.write() = describe.describe();
        Ok(())
    }
}

struct X;

struct Y;

impl Initializable for X {
    type Deps = (Arc<Y>,);

    fn init(&self, _: Self::Deps) -> InitResult {
        Ok(())
    }
}

impl Initializable for Y {
    type Deps = (Arc<X>,);

    fn init(&self, _: Self::Deps) -> InitResult {
        Ok(())
    }
}

/// 连续两个标记
struct DoubleMarker;

impl Initializable for DoubleMarker {
    type Deps = (NewInstance, NewInstance, Arc<A>);

    fn init(&self, _: Self::Deps) -> InitResult {
        Ok(())
    }
}

fn shared_a(value: &str) -> ServiceSlot {
    ServiceSlot::builder(Arc::new(A::new(value)))
        .provides(|s| s as Arc<dyn Describe>)
        .cloneable()
        .build()
}

fn initializable<T: Initializable>(service: T) -> ServiceSlot {
    ServiceSlot::builder(Arc::new(service)).initializable().build()
}

#[test]
fn test_overwrite() {
    init_tracing();
    let container = Container::new();
    container.register(Arc::new(A::new("a")));
    container.register(Arc::new(A::new("b")));

    assert_eq!(container.count(), 1);
    let resolved = container
        .resolve(std::any::type_name::<A>())
        .and_then(|instance| instance.downcast::<A>().ok())
        .unwrap();
    assert_eq!(resolved.value(), "b");
}

#[test]
fn test_shared_identity() {
    init_tracing();
    let container = Container::new();
    container.register(Arc::new(A::new("x")));

    container.get::<A>().unwrap().set("y");

    assert_eq!(container.get::<A>().unwrap().value(), "y");
}

#[test]
fn test_interface_resolution() {
    init_tracing();
    let container = Container::new();
    let a = Arc::new(A::new("x"));
    container.register_slot(
        ServiceSlot::builder(Arc::clone(&a))
            .provides(|s| s as Arc<dyn Describe>)
            .build(),
    );

    let describe = container.get::<dyn Describe>().unwrap();
    assert_eq!(describe.describe(), a.describe());
}

#[test]
fn test_dependency_wiring_in_either_order() {
    init_tracing();

    for a_first in [true, false] {
        let container = Container::new();
        if a_first {
            container.register_slot(shared_a("x"));
            container.register_slot(initializable(B::default()));
        } else {
            container.register_slot(initializable(B::default()));
            container.register_slot(shared_a("x"));
        }

        container.init().unwrap();

        let b = container.get::<B>().unwrap();
        assert_eq!(b.dep().value(), "x");

        container.get::<A>().unwrap().set("z");
        assert_eq!(b.dep().value(), "z");
    }
}

#[test]
fn test_marker_binds_detached_copy() {
    init_tracing();
    let container = Container::new();
    container.register_slot(initializable(C::default()));
    container.register_slot(shared_a("x"));

    container.init().unwrap();

    let c = container.get::<C>().unwrap();
    let registry_a = container.get::<A>().unwrap();
    assert_eq!(c.dep().value(), "x");
    assert_eq!(*c.marker.read(), Some(NewInstance::REQUEST));

    // 修改副本不影响注册表中的实例
    c.dep().set("copy");
    assert_eq!(registry_a.value(), "x");

    // 修改注册表中的实例不影响副本
    registry_a.set("source");
    assert_eq!(c.dep().value(), "copy");
}

#[test]
fn test_marker_requires_cloneable() {
    init_tracing();
    let container = Container::new();
    container.register(Arc::new(A::new("x")));
    container.register_slot(initializable(C::default()));

    match container.init() {
        Err(DependencyError::CopyUnsupported { type_name, dependent }) => {
            assert!(type_name.ends_with("::A"));
            assert!(dependent.ends_with("::C"));
        }
        other => panic!("预期 CopyUnsupported, 实际: {other:?}"),
    }
}

#[test]
fn test_marker_after_marker_is_ordinary_dependency() {
    init_tracing();
    let container = Container::new();
    container.register_slot(shared_a("x"));
    container.register_slot(initializable(DoubleMarker));

    match container.init() {
        Err(DependencyError::DependencyNotFound { dependency, .. }) => {
            assert!(dependency.ends_with("NewInstance"));
        }
        other => panic!("预期 DependencyNotFound, 实际: {other:?}"),
    }
}

#[test]
fn test_missing_dependency_names_both_types() {
    init_tracing();
    let container = Container::new();
    container.register_slot(initializable(D));

    match container.init() {
        Err(DependencyError::DependencyNotFound { dependent, dependency }) => {
            assert!(dependent.ends_with("::D"));
            assert!(dependency.ends_with("::E"));
        }
        other => panic!("预期 DependencyNotFound, 实际: {other:?}"),
    }
}

#[test]
fn test_unknown_lookup() {
    init_tracing();
    let container = Container::new();
    container.register(Arc::new(A::new("x")));

    assert!(matches!(
        container.get::<E>(),
        Err(DependencyError::ServiceNotFound { .. })
    ));
    assert!(container.resolve("nonexistent").is_none());
}

#[test]
fn test_first_registered_capability_wins() {
    init_tracing();
    let container = Container::new();
    container.register_slot(
        ServiceSlot::builder(Arc::new(Other))
            .provides(|s| s as Arc<dyn Describe>)
            .build(),
    );
    container.register_slot(shared_a("x"));
    container.register_slot(initializable(Reporter::default()));

    container.init().unwrap();

    assert_eq!(container.get::<dyn Describe>().unwrap().describe(), "Other");
    assert_eq!(*container.get::<Reporter>().unwrap().line.read(), "Other");
}

#[test]
fn test_cycle_detected() {
    init_tracing();
    let container = Container::new();
    container.register_slot(initializable(X));
    container.register_slot(initializable(Y));

    match container.init() {
        Err(DependencyError::CyclicDependency { dependency_chain }) => {
            assert!(dependency_chain.contains("::X"));
            assert!(dependency_chain.contains("::Y"));
        }
        other => panic!("预期 CyclicDependency, 实际: {other:?}"),
    }
}

#[test]
fn test_registration_ordering_from_config_file() {
    init_tracing();
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(file, "init_ordering = \"registration\"").unwrap();
    writeln!(file, "log_bindings = true").unwrap();

    let config = ContainerConfig::from_file(file.path()).unwrap();
    assert_eq!(config.init_ordering, InitOrdering::Registration);

    // 按注册顺序初始化时不检测相互依赖
    let container = Container::with_config(config);
    container.register_slot(initializable(X));
    container.register_slot(initializable(Y));

    let report = container.init().unwrap();
    assert_eq!(report.initialized.len(), 2);
    assert!(report.initialized[0].ends_with("::X"));
}

#[test]
fn test_value_lookup_and_shared_handle() {
    init_tracing();
    let container = Container::new();
    let inner = Arc::new(A::new("inner"));
    container.register(Arc::new(Arc::clone(&inner)));

    let resolved = container.get::<A>().unwrap();
    assert!(Arc::ptr_eq(&resolved, &inner));

    let value = container.get_value::<A>().unwrap();
    value.set("changed");
    assert_eq!(inner.value(), "inner");
}
