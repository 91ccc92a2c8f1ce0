//! 服务解析器抽象接口

use registry_common::DependencyResult;
use std::sync::Arc;

/// 服务解析器 trait
///
/// 依次按精确键、能力扫描、共享句柄解包三种方式查找 `T`
pub trait ServiceResolver: Send + Sync {
    /// 解析服务，找不到时返回 `ServiceNotFound`
    fn get<T>(&self) -> DependencyResult<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static;

    /// 尝试解析服务，找不到时返回 `None` 且不记录错误
    fn try_get<T>(&self) -> Option<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static;

    /// 解析服务并返回值的克隆
    fn get_value<T>(&self) -> DependencyResult<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.get::<T>().map(|service| T::clone(&service))
    }

    /// 检查服务是否可以解析
    fn can_resolve<T>(&self) -> bool
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.try_get::<T>().is_some()
    }
}
