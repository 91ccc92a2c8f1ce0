//! 服务能力视图
//!
//! 一个 [`Capability`] 记录“某个具体服务类型可以被看作类型 `C`”这一事实，
//! 其中 `C` 可以是服务自身，也可以是它实现的 trait 对象。
//! 能力在注册时显式声明，解析时只做 `TypeId` 比较与向下转型。

use registry_common::TypeInfo;
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// 类型擦除后的共享服务实例
pub type ErasedInstance = Arc<dyn Any + Send + Sync>;

/// 擦除后的视图：装箱的 `Arc<C>`
pub type ErasedView = Box<dyn Any + Send + Sync>;

type ViewFn = dyn Fn(ErasedInstance) -> Option<ErasedView> + Send + Sync;

/// 服务能力
#[derive(Clone)]
pub struct Capability {
    type_info: TypeInfo,
    view: Arc<ViewFn>,
}

impl Capability {
    /// 声明服务 `T` 可以通过 `upcast` 转换为 `Arc<C>`
    ///
    /// 通常写作 `Capability::new::<MyService, dyn Greeter>(|s| s as Arc<dyn Greeter>)`。
    pub fn new<T, C>(upcast: fn(Arc<T>) -> Arc<C>) -> Self
    where
        T: Send + Sync + 'static,
        C: ?Sized + Send + Sync + 'static,
    {
        let view = move |instance: ErasedInstance| -> Option<ErasedView> {
            let service = instance.downcast::<T>().ok()?;
            Some(Box::new(upcast(service)) as ErasedView)
        };

        Self {
            type_info: TypeInfo::of::<C>(),
            view: Arc::new(view),
        }
    }

    /// 服务自身类型的视图
    pub fn identity<T: Send + Sync + 'static>() -> Self {
        Self::new::<T, T>(|service| service)
    }

    /// 不透明实例的视图，只能以 `Arc<dyn Any + Send + Sync>` 取出
    pub fn erased() -> Self {
        Self {
            type_info: TypeInfo::of::<dyn Any + Send + Sync>(),
            view: Arc::new(|instance: ErasedInstance| Some(Box::new(instance) as ErasedView)),
        }
    }

    /// 能力对应的类型信息
    pub fn type_info(&self) -> &TypeInfo {
        &self.type_info
    }

    /// 能力对应的 `TypeId`
    pub fn type_id(&self) -> TypeId {
        self.type_info.id
    }

    /// 是否为类型 `C` 的视图
    pub fn is<C: ?Sized + 'static>(&self) -> bool {
        self.type_info.is::<C>()
    }

    /// 对实例应用视图，得到装箱的 `Arc<C>`
    pub fn apply(&self, instance: &ErasedInstance) -> Option<ErasedView> {
        (self.view)(Arc::clone(instance))
    }

    /// 以类型 `C` 查看实例
    pub fn view<C: ?Sized + 'static>(&self, instance: &ErasedInstance) -> Option<Arc<C>> {
        if !self.is::<C>() {
            return None;
        }
        self.apply(instance)?.downcast::<Arc<C>>().ok().map(|view| *view)
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capability")
            .field("type_name", &self.type_info.name)
            .field("view", &"<function>")
            .finish()
    }
}
