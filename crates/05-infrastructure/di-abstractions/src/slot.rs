//! 服务槽
//!
//! 每个槽持有一个共享实例及其规范化键，并记录注册时声明的能力：
//! 可查看的 trait 对象类型、创建新实例的能力、初始化能力。

use crate::capability::{Capability, ErasedInstance, ErasedView};
use crate::injection::{ErasedInitializer, Initializable, TypedInitializer};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use registry_common::{
    canonical_key, DependencyError, DependencyResult, InitState, ServiceMetadata, TypeInfo,
};
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

type Copier = dyn Fn(&ErasedInstance) -> Option<ErasedInstance> + Send + Sync;

/// 服务槽
pub struct ServiceSlot {
    key: String,
    type_info: TypeInfo,
    instance: ErasedInstance,
    own: Capability,
    capabilities: Vec<Capability>,
    copier: Option<Arc<Copier>>,
    initializer: Option<Arc<dyn ErasedInitializer>>,
    state: Mutex<InitState>,
    sequence: u64,
    registered_at: DateTime<Utc>,
}

impl ServiceSlot {
    /// 以共享实例创建槽，不声明任何额外能力
    pub fn new<T: Send + Sync + 'static>(instance: Arc<T>) -> Self {
        SlotBuilder::new(instance).build()
    }

    /// 创建槽构建器
    pub fn builder<T: Send + Sync + 'static>(instance: Arc<T>) -> SlotBuilder<T> {
        SlotBuilder::new(instance)
    }

    /// 从不透明的装箱值创建槽
    ///
    /// 装箱值必须是 `Arc<dyn Any + Send + Sync>`，否则返回 `NotAReference`。
    /// 这样注册的实例只能通过键或 `dyn Any + Send + Sync` 取出。
    pub fn from_erased(key: &str, value: Box<dyn Any + Send + Sync>) -> DependencyResult<Self> {
        let instance = value
            .downcast::<ErasedInstance>()
            .map_err(|_| DependencyError::NotAReference {
                type_name: key.to_string(),
            })?;
        let instance: ErasedInstance = *instance;
        let concrete = Any::type_id(&*instance);

        Ok(Self {
            key: canonical_key(key),
            type_info: TypeInfo::new(concrete, key),
            instance,
            own: Capability::erased(),
            capabilities: Vec::new(),
            copier: None,
            initializer: None,
            state: Mutex::new(InitState::Uninitialized),
            sequence: 0,
            registered_at: Utc::now(),
        })
    }

    /// 规范化键
    pub fn key(&self) -> &str {
        &self.key
    }

    /// 实例的类型信息
    pub fn type_info(&self) -> &TypeInfo {
        &self.type_info
    }

    /// 注册顺序
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// 设置注册顺序
    pub fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = sequence;
        self
    }

    /// 注册时间
    pub fn registered_at(&self) -> DateTime<Utc> {
        self.registered_at
    }

    /// 共享实例，所有持有者看到同一个对象
    pub fn get(&self) -> ErasedInstance {
        Arc::clone(&self.instance)
    }

    /// 自身视图的 `TypeId`
    pub fn own_type_id(&self) -> TypeId {
        self.own.type_id()
    }

    /// 以自身类型查看实例
    pub fn own_view<C: ?Sized + 'static>(&self) -> Option<Arc<C>> {
        self.own.view::<C>(&self.instance)
    }

    /// 以自身类型或任一声明的能力查看实例
    pub fn view<C: ?Sized + 'static>(&self) -> Option<Arc<C>> {
        self.own_view::<C>().or_else(|| {
            self.capabilities
                .iter()
                .find(|capability| capability.is::<C>())
                .and_then(|capability| capability.view::<C>(&self.instance))
        })
    }

    /// 是否声明了指定类型的能力（不含自身类型）
    pub fn provides_type(&self, type_id: TypeId) -> bool {
        self.capabilities
            .iter()
            .any(|capability| capability.type_id() == type_id)
    }

    /// 按 `TypeId` 取得擦除后的共享视图
    pub fn erased_view(&self, type_id: TypeId) -> Option<ErasedView> {
        self.find_capability(type_id)?.apply(&self.instance)
    }

    /// 将 `Arc<Arc<C>>` 形式的实例解开一层
    pub fn unwrap_shared<C: ?Sized + 'static>(&self) -> Option<Arc<C>> {
        self.instance.downcast_ref::<Arc<C>>().cloned()
    }

    /// 为 `dependent` 创建实例的浅副本，槽内实例不受影响
    pub fn create_copy(&self, dependent: &str) -> DependencyResult<ErasedInstance> {
        self.copy_instance(dependent)
    }

    /// 创建副本并按 `TypeId` 取得视图
    pub fn copy_erased_view(&self, type_id: TypeId, dependent: &str) -> DependencyResult<ErasedView> {
        let copy = self.copy_instance(dependent)?;
        self.find_capability(type_id)
            .and_then(|capability| capability.apply(&copy))
            .ok_or_else(|| {
                DependencyError::resolution_failed(&self.type_info.name, "副本无法转换为请求的类型")
            })
    }

    /// 候选类型名与本槽的键是否一致
    pub fn matches_name(&self, candidate: &str) -> bool {
        canonical_key(candidate) == self.key
    }

    /// 替换实例
    ///
    /// 键随新实例类型重新计算；类型不变时保留已声明的能力，否则全部清除。
    /// 初始化状态回到未初始化。
    pub fn set_instance<T: Send + Sync + 'static>(&mut self, instance: Arc<T>) {
        let type_info = TypeInfo::of::<T>();

        if type_info.id != self.type_info.id {
            self.own = Capability::identity::<T>();
            self.capabilities.clear();
            self.copier = None;
            self.initializer = None;
        }

        self.key = type_info.key.clone();
        self.type_info = type_info;
        self.instance = instance;
        *self.state.get_mut() = InitState::Uninitialized;
    }

    /// 是否支持创建新实例
    pub fn is_cloneable(&self) -> bool {
        self.copier.is_some()
    }

    /// 是否声明了初始化能力
    pub fn is_initializable(&self) -> bool {
        self.initializer.is_some()
    }

    /// 初始化能力
    pub fn initializer(&self) -> Option<Arc<dyn ErasedInitializer>> {
        self.initializer.clone()
    }

    /// 当前初始化状态
    pub fn init_state(&self) -> InitState {
        *self.state.lock()
    }

    /// 更新初始化状态
    pub fn set_init_state(&self, state: InitState) {
        *self.state.lock() = state;
    }

    /// 生成内省用的元数据
    pub fn metadata(&self) -> ServiceMetadata {
        ServiceMetadata {
            key: self.key.clone(),
            type_name: self.type_info.name.clone(),
            capabilities: self
                .capabilities
                .iter()
                .map(|capability| capability.type_info().name.clone())
                .collect(),
            cloneable: self.is_cloneable(),
            initializable: self.is_initializable(),
            init_state: self.init_state(),
            sequence: self.sequence,
            registered_at: self.registered_at,
        }
    }

    fn find_capability(&self, type_id: TypeId) -> Option<&Capability> {
        std::iter::once(&self.own)
            .chain(self.capabilities.iter())
            .find(|capability| Capability::type_id(capability) == type_id)
    }

    fn copy_instance(&self, dependent: &str) -> DependencyResult<ErasedInstance> {
        let unsupported = || DependencyError::CopyUnsupported {
            type_name: self.type_info.name.clone(),
            dependent: dependent.to_string(),
        };

        let copier = self.copier.as_ref().ok_or_else(unsupported)?;
        copier(&self.instance).ok_or_else(unsupported)
    }
}

impl fmt::Debug for ServiceSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceSlot")
            .field("key", &self.key)
            .field("type_name", &self.type_info.name)
            .field("capabilities", &self.capabilities)
            .field("cloneable", &self.is_cloneable())
            .field("initializable", &self.is_initializable())
            .field("init_state", &self.init_state())
            .field("sequence", &self.sequence)
            .finish()
    }
}

/// 服务槽构建器
///
/// ```rust
/// use di_abstractions::ServiceSlot;
/// use std::sync::Arc;
///
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// #[derive(Clone)]
/// struct English;
///
/// impl Greeter for English {
///     fn greet(&self) -> String {
///         "hello".to_string()
///     }
/// }
///
/// let slot = ServiceSlot::builder(Arc::new(English))
///     .provides(|s| s as Arc<dyn Greeter>)
///     .cloneable()
///     .build();
///
/// assert_eq!(slot.view::<dyn Greeter>().unwrap().greet(), "hello");
/// ```
pub struct SlotBuilder<T> {
    instance: Arc<T>,
    capabilities: Vec<Capability>,
    copier: Option<Arc<Copier>>,
    initializer: Option<Arc<dyn ErasedInitializer>>,
}

impl<T: Send + Sync + 'static> SlotBuilder<T> {
    /// 创建构建器
    pub fn new(instance: Arc<T>) -> Self {
        Self {
            instance,
            capabilities: Vec::new(),
            copier: None,
            initializer: None,
        }
    }

    /// 声明服务可以被看作 `Arc<C>`
    pub fn provides<C: ?Sized + Send + Sync + 'static>(mut self, upcast: fn(Arc<T>) -> Arc<C>) -> Self {
        let capability = Capability::new::<T, C>(upcast);
        self.capabilities
            .retain(|existing| existing.type_id() != capability.type_id());
        self.capabilities.push(capability);
        self
    }

    /// 构建服务槽
    pub fn build(self) -> ServiceSlot {
        let type_info = TypeInfo::of::<T>();

        ServiceSlot {
            key: type_info.key.clone(),
            type_info,
            instance: self.instance,
            own: Capability::identity::<T>(),
            capabilities: self.capabilities,
            copier: self.copier,
            initializer: self.initializer,
            state: Mutex::new(InitState::Uninitialized),
            sequence: 0,
            registered_at: Utc::now(),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> SlotBuilder<T> {
    /// 声明可以通过 `Clone` 创建新实例
    pub fn cloneable(mut self) -> Self {
        let copier = |instance: &ErasedInstance| -> Option<ErasedInstance> {
            let service = instance.downcast_ref::<T>()?;
            Some(Arc::new(service.clone()) as ErasedInstance)
        };
        self.copier = Some(Arc::new(copier));
        self
    }
}

impl<T: Initializable> SlotBuilder<T> {
    /// 声明初始化能力
    pub fn initializable(mut self) -> Self {
        self.initializer = Some(Arc::new(TypedInitializer::<T>::new()));
        self
    }
}
