//! 服务描述与服务提供者

use crate::slot::{ServiceSlot, SlotBuilder};

/// 服务描述
///
/// 描述服务在注册时声明的能力，通常由 `#[derive(Service)]` 生成：
///
/// ```rust
/// use di_abstractions::{ServiceDescriptor, SlotBuilder};
/// use std::sync::Arc;
///
/// trait Clock: Send + Sync {
///     fn now(&self) -> u64;
/// }
///
/// #[derive(Clone)]
/// struct FixedClock(u64);
///
/// impl Clock for FixedClock {
///     fn now(&self) -> u64 {
///         self.0
///     }
/// }
///
/// impl ServiceDescriptor for FixedClock {
///     fn describe(slot: SlotBuilder<Self>) -> SlotBuilder<Self> {
///         slot.provides(|s| s as Arc<dyn Clock>).cloneable()
///     }
/// }
///
/// let slot = FixedClock::describe(SlotBuilder::new(Arc::new(FixedClock(42)))).build();
/// assert_eq!(slot.view::<dyn Clock>().unwrap().now(), 42);
/// ```
pub trait ServiceDescriptor: Send + Sync + Sized + 'static {
    /// 在构建器上声明能力
    fn describe(slot: SlotBuilder<Self>) -> SlotBuilder<Self> {
        slot
    }
}

/// 服务提供者
///
/// 注册提供者时，它提供的服务会一并注册
pub trait ServiceProvider: Send + Sync + 'static {
    /// 提供的服务
    fn provide_service(&self) -> ServiceSlot;
}
