//! 服务注册表抽象接口

use crate::capability::ErasedInstance;
use crate::slot::ServiceSlot;
use std::sync::Arc;

/// 服务注册表 trait
///
/// 以规范化键保存服务槽，是服务是否存在的唯一依据
pub trait ServiceContainer: Send + Sync {
    /// 在 `canonical_key(key)` 下注册服务槽，已存在时覆盖
    fn register(&self, key: &str, slot: ServiceSlot);

    /// 按键查找共享实例
    fn resolve(&self, key: &str) -> Option<ErasedInstance>;

    /// 按键查找服务槽
    fn resolve_slot(&self, key: &str) -> Option<Arc<ServiceSlot>>;

    /// 按注册顺序列出全部服务槽的快照
    fn list_all(&self) -> Vec<Arc<ServiceSlot>>;

    /// 不同键的数量
    fn count(&self) -> usize;

    /// 移除全部服务槽
    fn clear(&self);

    /// 键是否已注册
    fn contains(&self, key: &str) -> bool {
        self.resolve_slot(key).is_some()
    }
}
