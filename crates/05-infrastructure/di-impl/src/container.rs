//! 服务容器
//!
//! 将注册表、解析器与初始化器组合为统一入口

use crate::initializer::{InitReport, Initializer};
use crate::registry::ServiceRegistry;
use crate::resolver::ServiceResolverImpl;
use di_abstractions::{
    ErasedInstance, ServiceContainer, ServiceDescriptor, ServiceProvider, ServiceResolver,
    ServiceSlot, SlotBuilder,
};
use parking_lot::ReentrantMutex;
use registry_common::{
    ContainerConfig, DependencyError, DependencyResult, InitOrdering, ServiceMetadata,
};
use std::any::Any;
use std::cell::Cell;
use std::sync::Arc;
use tracing::{error, info};

/// 服务容器
///
/// 克隆得到的是同一个容器的另一个句柄
#[derive(Debug, Clone)]
pub struct Container {
    /// 服务注册表
    registry: Arc<ServiceRegistry>,
    /// 服务解析器
    resolver: ServiceResolverImpl,
    /// 容器配置
    config: Arc<ContainerConfig>,
    /// 串行化初始化调用，标记当前线程是否已在初始化中
    init_lock: Arc<ReentrantMutex<Cell<bool>>>,
}

impl Container {
    /// 以默认配置创建容器
    pub fn new() -> Self {
        Self::with_config(ContainerConfig::default())
    }

    /// 以指定配置创建容器
    pub fn with_config(config: ContainerConfig) -> Self {
        let registry = Arc::new(ServiceRegistry::new());
        Self {
            resolver: ServiceResolverImpl::new(Arc::clone(&registry)),
            registry,
            config: Arc::new(config),
            init_lock: Arc::new(ReentrantMutex::new(Cell::new(false))),
        }
    }

    /// 创建构建器
    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::new()
    }

    /// 获取服务注册表
    pub fn registry(&self) -> &Arc<ServiceRegistry> {
        &self.registry
    }

    /// 获取容器配置
    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    /// 注册共享实例，键由类型推断
    pub fn register<T>(&self, instance: Arc<T>)
    where
        T: Send + Sync + 'static,
    {
        self.register_slot(ServiceSlot::new(instance));
    }

    /// 注册值，容器持有其共享实例
    pub fn register_value<T>(&self, value: T)
    where
        T: Send + Sync + 'static,
    {
        self.register(Arc::new(value));
    }

    /// 按类型的服务描述注册
    pub fn register_service<T>(&self, instance: Arc<T>)
    where
        T: ServiceDescriptor,
    {
        self.register_slot(T::describe(SlotBuilder::new(instance)).build());
    }

    /// 注册服务提供者及其提供的服务
    pub fn register_provider<P>(&self, provider: Arc<P>)
    where
        P: ServiceProvider,
    {
        let provided = provider.provide_service();
        self.register(provider);
        self.register_slot(provided);
    }

    /// 注册服务槽
    pub fn register_slot(&self, slot: ServiceSlot) {
        info!("注册服务: {}", slot.type_info().name);
        let key = slot.key().to_string();
        self.registry.register(&key, slot);
    }

    /// 以显式键注册不透明实例
    ///
    /// `value` 必须是装箱的 `Arc<dyn Any + Send + Sync>`
    pub fn register_erased(&self, key: &str, value: Box<dyn Any + Send + Sync>) -> DependencyResult<()> {
        let slot = ServiceSlot::from_erased(key, value).map_err(|e| {
            error!("注册失败: {}", e);
            e
        })?;
        info!("注册服务: {} (显式键)", key);
        self.registry.register(key, slot);
        Ok(())
    }

    /// 按键查找共享实例
    pub fn resolve(&self, key: &str) -> Option<ErasedInstance> {
        self.registry.resolve(key)
    }

    /// 按键查找服务槽
    pub fn resolve_slot(&self, key: &str) -> Option<Arc<ServiceSlot>> {
        self.registry.resolve_slot(key)
    }

    /// 初始化所有已注册的服务
    ///
    /// 已初始化的服务会被跳过，可在追加注册后再次调用。
    /// 其他线程的调用会等待当前初始化结束；在初始化过程中再次调用返回 `CyclicDependency`。
    pub fn init(&self) -> DependencyResult<InitReport> {
        let running = self.init_lock.lock();
        if running.get() {
            error!("初始化过程中再次调用 init");
            return Err(DependencyError::CyclicDependency {
                dependency_chain: "Container::init -> Container::init".to_string(),
            });
        }

        running.set(true);
        let result = Initializer::new(self.config.as_ref().clone()).run(self.registry.as_ref());
        running.set(false);
        result
    }

    /// 按注册顺序列出全部服务槽
    pub fn list_all(&self) -> Vec<Arc<ServiceSlot>> {
        self.registry.list_all()
    }

    /// 已注册服务数量
    pub fn count(&self) -> usize {
        self.registry.count()
    }

    /// 移除全部服务
    pub fn clear(&self) {
        info!("清空服务容器");
        self.registry.clear();
    }

    /// 全部服务的元数据
    pub fn describe(&self) -> Vec<ServiceMetadata> {
        self.list_all().iter().map(|slot| slot.metadata()).collect()
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceResolver for Container {
    fn get<T>(&self) -> DependencyResult<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.resolver.get::<T>()
    }

    fn try_get<T>(&self) -> Option<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.resolver.try_get::<T>()
    }
}

/// 服务容器构建器
#[derive(Debug, Default)]
pub struct ContainerBuilder {
    /// 容器配置
    config: ContainerConfig,
    /// 待注册的服务槽
    slots: Vec<ServiceSlot>,
}

impl ContainerBuilder {
    /// 创建新的构建器
    pub fn new() -> Self {
        Self::default()
    }

    /// 使用指定配置
    pub fn with_config(mut self, config: ContainerConfig) -> Self {
        self.config = config;
        self
    }

    /// 设置初始化顺序策略
    pub fn init_ordering(mut self, ordering: InitOrdering) -> Self {
        self.config = self.config.with_init_ordering(ordering);
        self
    }

    /// 设置依赖图最大遍历深度
    pub fn max_resolution_depth(mut self, depth: usize) -> Self {
        self.config = self.config.with_max_resolution_depth(depth);
        self
    }

    /// 设置是否输出参数绑定日志
    pub fn log_bindings(mut self, enabled: bool) -> Self {
        self.config = self.config.with_log_bindings(enabled);
        self
    }

    /// 注册共享实例
    pub fn register<T>(mut self, instance: Arc<T>) -> Self
    where
        T: Send + Sync + 'static,
    {
        self.slots.push(ServiceSlot::new(instance));
        self
    }

    /// 按类型的服务描述注册
    pub fn register_service<T>(mut self, instance: Arc<T>) -> Self
    where
        T: ServiceDescriptor,
    {
        self.slots.push(T::describe(SlotBuilder::new(instance)).build());
        self
    }

    /// 注册服务槽
    pub fn register_slot(mut self, slot: ServiceSlot) -> Self {
        self.slots.push(slot);
        self
    }

    /// 构建服务容器
    pub fn build(self) -> Container {
        let container = Container::with_config(self.config);
        for slot in self.slots {
            container.register_slot(slot);
        }
        container
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use registry_common::DependencyError;

    struct Engine;

    struct Car {
        engine: Arc<Engine>,
    }

    struct Garage;

    impl ServiceProvider for Garage {
        fn provide_service(&self) -> ServiceSlot {
            ServiceSlot::new(Arc::new(Car {
                engine: Arc::new(Engine),
            }))
        }
    }

    #[test]
    fn test_register_and_get() {
        let container = Container::new();
        container.register_value(Engine);

        assert!(container.get::<Engine>().is_ok());
        assert_eq!(container.count(), 1);
    }

    #[test]
    fn test_provider_registers_both() {
        let container = Container::new();
        container.register_provider(Arc::new(Garage));

        assert_eq!(container.count(), 2);
        assert!(container.get::<Garage>().is_ok());
        let car = container.get::<Car>().unwrap();
        assert_eq!(Arc::strong_count(&car.engine), 1);
    }

    #[test]
    fn test_register_erased() {
        let container = Container::new();
        let shared: ErasedInstance = Arc::new(Engine);

        container.register_erased("app::Engine", Box::new(shared)).unwrap();
        let resolved = container.resolve("&app::Engine").unwrap();
        assert!(resolved.downcast_ref::<Engine>().is_some());

        let result = container.register_erased("app::Engine", Box::new(Engine));
        assert!(matches!(result, Err(DependencyError::NotAReference { .. })));
        assert_eq!(container.count(), 1);
    }

    #[test]
    fn test_init_serialized_across_threads() {
        let container = Container::new();
        container.register_value(Engine);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let container = container.clone();
                std::thread::spawn(move || container.init())
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap().is_ok());
        }
    }

    #[test]
    fn test_builder() {
        let container = Container::builder()
            .init_ordering(InitOrdering::Registration)
            .log_bindings(true)
            .register(Arc::new(Engine))
            .build();

        assert_eq!(container.config().init_ordering, InitOrdering::Registration);
        assert!(container.config().log_bindings);
        assert!(container.can_resolve::<Engine>());
    }

    #[test]
    fn test_clear_and_describe() {
        let container = Container::new();
        container.register_value(Engine);
        container.register_value(Garage);

        let metadata = container.describe();
        assert_eq!(metadata.len(), 2);
        assert!(metadata[0].type_name.ends_with("Engine"));

        container.clear();
        assert_eq!(container.count(), 0);
        assert!(container.get::<Engine>().is_err());
    }
}
