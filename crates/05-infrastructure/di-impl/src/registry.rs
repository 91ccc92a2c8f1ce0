//! 服务注册表实现

use dashmap::DashMap;
use di_abstractions::{ErasedInstance, ServiceContainer, ServiceSlot};
use registry_common::canonical_key;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// 服务注册表
///
/// 以规范化键分片存储服务槽。每次注册分配递增的序号，
/// 枚举时按序号排序，重新注册的服务排到最后。
#[derive(Debug, Default)]
pub struct ServiceRegistry {
    /// 规范化键到服务槽的映射
    slots: DashMap<String, Arc<ServiceSlot>>,
    /// 下一个注册序号
    next_sequence: AtomicU64,
}

impl ServiceRegistry {
    /// 创建空的注册表
    pub fn new() -> Self {
        Self::default()
    }
}

impl ServiceContainer for ServiceRegistry {
    fn register(&self, key: &str, slot: ServiceSlot) {
        let key = canonical_key(key);
        let sequence = self.next_sequence.fetch_add(1, Ordering::SeqCst);
        let slot = Arc::new(slot.with_sequence(sequence));

        if self.slots.insert(key.clone(), slot).is_some() {
            debug!("覆盖已注册的服务: {}", key);
        } else {
            debug!("服务已注册: {} (序号 {})", key, sequence);
        }
    }

    fn resolve(&self, key: &str) -> Option<ErasedInstance> {
        self.resolve_slot(key).map(|slot| slot.get())
    }

    fn resolve_slot(&self, key: &str) -> Option<Arc<ServiceSlot>> {
        self.slots
            .get(&canonical_key(key))
            .map(|entry| Arc::clone(entry.value()))
    }

    fn list_all(&self) -> Vec<Arc<ServiceSlot>> {
        let mut slots: Vec<_> = self
            .slots
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        slots.sort_by_key(|slot| slot.sequence());
        slots
    }

    fn count(&self) -> usize {
        self.slots.len()
    }

    fn clear(&self) {
        let removed = self.slots.len();
        self.slots.clear();
        debug!("注册表已清空, 移除 {} 个服务", removed);
    }
}
