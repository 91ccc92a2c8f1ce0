//! 服务解析器实现

use crate::registry::ServiceRegistry;
use di_abstractions::{ServiceContainer, ServiceResolver};
use registry_common::{DependencyError, DependencyResult, TypeInfo};
use std::sync::Arc;
use tracing::{error, trace};

/// 服务解析器
///
/// 解析顺序：
/// 1. 精确键：`T` 的规范化键下的槽，且其自身类型正是 `T`
/// 2. 能力扫描：按注册顺序，第一个自身类型为 `T` 或声明了能力 `T` 的槽
/// 3. 共享句柄解包：键与 `T` 相同且实例为 `Arc<T>` 的槽
#[derive(Debug, Clone)]
pub struct ServiceResolverImpl {
    registry: Arc<ServiceRegistry>,
}

impl ServiceResolverImpl {
    /// 创建新的服务解析器
    pub fn new(registry: Arc<ServiceRegistry>) -> Self {
        Self { registry }
    }

    fn locate<T>(&self, requested: &TypeInfo) -> Option<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        if let Some(service) = self
            .registry
            .resolve_slot(&requested.key)
            .and_then(|slot| slot.own_view::<T>())
        {
            trace!("精确键命中: {}", requested.name);
            return Some(service);
        }

        let slots = self.registry.list_all();

        if let Some(service) = slots.iter().find_map(|slot| slot.view::<T>()) {
            trace!("能力扫描命中: {}", requested.name);
            return Some(service);
        }

        slots
            .iter()
            .filter(|slot| slot.key() == requested.key)
            .find_map(|slot| slot.unwrap_shared::<T>())
            .map(|service| {
                trace!("共享句柄解包命中: {}", requested.name);
                service
            })
    }
}

impl ServiceResolver for ServiceResolverImpl {
    fn get<T>(&self) -> DependencyResult<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let requested = TypeInfo::of::<T>();

        self.locate::<T>(&requested).ok_or_else(|| {
            error!("服务未找到: {}", requested.name);
            DependencyError::service_not_found(requested.name)
        })
    }

    fn try_get<T>(&self) -> Option<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.locate::<T>(&TypeInfo::of::<T>())
    }
}
