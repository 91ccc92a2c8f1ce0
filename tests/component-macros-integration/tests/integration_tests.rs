//! Centralized integration tests for service-macros

use di_abstractions::{InitResult, Initializable, NewInstance, ServiceResolver};
use di_impl::Container;
use parking_lot::RwLock;
use registry_common::DependencyError;
use service_macros::Service;
use std::sync::Arc;

trait Greeter: Send + Sync {
    fn greet(&self) -> String;
}

trait Named: Send + Sync {
    fn name(&self) -> String;
}

#[derive(Debug, Clone, Service)]
#[service(cloneable, provides(dyn Greeter, dyn Named))]
struct English {
    name: String,
}

impl Greeter for English {
    fn greet(&self) -> String {
        format!("hello, {}", self.name)
    }
}

impl Named for English {
    fn name(&self) -> String {
        self.name.clone()
    }
}

#[derive(Default, Service)]
#[service(initializable)]
struct Welcome {
    greeting: RwLock<String>,
}

impl Initializable for Welcome {
    type Deps = (Arc<dyn Greeter>,);

    fn init(&self, (greeter,): Self::Deps) -> InitResult {
        *self.greeting.write() = greeter.greet();
        Ok(())
    }
}

#[derive(Default, Service)]
#[service(initializable)]
struct Snapshot {
    english: RwLock<Option<Arc<English>>>,
}

impl Initializable for Snapshot {
    type Deps = (NewInstance, Arc<English>);

    fn init(&self, (_, english): Self::Deps) -> InitResult {
        *self.english.write() = Some(english);
        Ok(())
    }
}

#[derive(Service)]
struct Plain;

#[test]
fn test_derived_capabilities_resolve() {
    let container = Container::new();
    container.register_service(Arc::new(English {
        name: "Ana".to_string(),
    }));

    assert_eq!(container.get::<dyn Greeter>().unwrap().greet(), "hello, Ana");
    assert_eq!(container.get::<dyn Named>().unwrap().name(), "Ana");

    let metadata = container.describe();
    assert_eq!(metadata[0].capabilities.len(), 2);
    assert!(metadata[0].cloneable);
}

#[test]
fn test_derived_initializer_wires_capability() {
    let container = Container::new();
    container.register_service(Arc::new(Welcome::default()));
    container.register_service(Arc::new(English {
        name: "Rui".to_string(),
    }));

    container.init().unwrap();

    let welcome = container.get::<Welcome>().unwrap();
    assert_eq!(*welcome.greeting.read(), "hello, Rui");
}

#[test]
fn test_derived_cloneable_supports_new_instance() {
    let container = Container::new();
    let english = Arc::new(English {
        name: "Inês".to_string(),
    });
    container.register_service(Arc::clone(&english));
    container.register_service(Arc::new(Snapshot::default()));

    container.init().unwrap();

    let snapshot = container.get::<Snapshot>().unwrap();
    let copy = snapshot.english.read().clone().unwrap();
    assert!(!Arc::ptr_eq(&copy, &english));
    assert_eq!(copy.name, "Inês");
}

#[test]
fn test_plain_derive_declares_nothing() {
    let container = Container::new();
    container.register_service(Arc::new(Plain));

    assert!(container.get::<Plain>().is_ok());
    assert!(matches!(
        container.get::<dyn Greeter>(),
        Err(DependencyError::ServiceNotFound { .. })
    ));
    assert!(!container.describe()[0].initializable);
}
