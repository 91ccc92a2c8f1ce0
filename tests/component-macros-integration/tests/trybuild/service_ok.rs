use di_abstractions::{ServiceDescriptor, SlotBuilder};
use service_macros::Service;
use std::sync::Arc;

trait Named: Send + Sync {
    fn name(&self) -> &'static str;
}

#[derive(Clone, Service)]
#[service(cloneable, provides(dyn Named))]
struct OkService;

impl Named for OkService {
    fn name(&self) -> &'static str {
        "OkService"
    }
}

fn main() {
    let slot = OkService::describe(SlotBuilder::new(Arc::new(OkService))).build();
    assert!(slot.is_cloneable());
    assert_eq!(slot.view::<dyn Named>().unwrap().name(), "OkService");
}
