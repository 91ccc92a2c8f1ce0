use di_abstractions::{ServiceDescriptor, SlotBuilder};
use service_macros::Service;
use std::sync::Arc;

trait Store: Send + Sync {
    fn size(&self) -> usize;
}

#[derive(Service)]
#[service(provides(dyn Store))]
struct Cache<T> {
    items: Vec<T>,
}

impl<T: Send + Sync + 'static> Store for Cache<T> {
    fn size(&self) -> usize {
        self.items.len()
    }
}

fn main() {
    let cache = Cache { items: vec![1_u32, 2, 3] };
    let slot = Cache::describe(SlotBuilder::new(Arc::new(cache))).build();
    assert_eq!(slot.view::<dyn Store>().unwrap().size(), 3);
}
