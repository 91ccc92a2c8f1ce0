//! 初始化注入协议
//!
//! 服务通过实现 [`Initializable`] 声明初始化能力，其参数列表由
//! [`Dependencies`]（`Arc<T>`、`Arc<dyn Trait>` 与 [`NewInstance`] 组成的元组）描述。
//! 初始化器按参数顺序绑定依赖后调用 [`Initializable::init`]。

use crate::capability::{ErasedInstance, ErasedView};
use registry_common::{DependencyError, DependencyResult, TypeInfo};
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;

/// 新实例标记
///
/// 出现在参数列表中时，紧随其后的参数会收到依赖的独立副本而不是共享实例。
/// 标记本身只接收哨兵值 [`NewInstance::REQUEST`]，不携带依赖。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewInstance(());

impl NewInstance {
    /// 请求新实例的哨兵值
    pub const REQUEST: Self = Self(());
}

/// 参数种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// 新实例标记
    Marker,
    /// 服务依赖
    Service,
}

/// 初始化参数描述
#[derive(Debug, Clone)]
pub struct Param {
    /// 参数声明的类型（`Arc<T>` 中的 `T`）
    pub type_info: TypeInfo,
    /// 参数种类
    pub kind: ParamKind,
}

impl Param {
    /// 是否为新实例标记
    pub fn is_marker(&self) -> bool {
        self.kind == ParamKind::Marker
    }
}

/// 已绑定的参数值
pub enum Binding {
    /// 标记哨兵
    Marker(NewInstance),
    /// 装箱的 `Arc<T>`
    Service(ErasedView),
}

impl std::fmt::Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Marker(marker) => f.debug_tuple("Marker").field(marker).finish(),
            Self::Service(_) => f.write_str("Service(<instance>)"),
        }
    }
}

/// 可作为初始化参数的类型
pub trait Dependency: Sized + 'static {
    /// 参数描述
    fn param() -> Param;

    /// 从绑定值还原参数
    fn from_binding(binding: Binding) -> Option<Self>;
}

impl Dependency for NewInstance {
    fn param() -> Param {
        Param {
            type_info: TypeInfo::of::<Self>(),
            kind: ParamKind::Marker,
        }
    }

    fn from_binding(binding: Binding) -> Option<Self> {
        match binding {
            Binding::Marker(marker) => Some(marker),
            Binding::Service(_) => None,
        }
    }
}

impl<T: ?Sized + Send + Sync + 'static> Dependency for Arc<T> {
    fn param() -> Param {
        Param {
            type_info: TypeInfo::of::<T>(),
            kind: ParamKind::Service,
        }
    }

    fn from_binding(binding: Binding) -> Option<Self> {
        match binding {
            Binding::Service(view) => view.downcast::<Self>().ok().map(|service| *service),
            Binding::Marker(_) => None,
        }
    }
}

/// 初始化参数列表
pub trait Dependencies: Sized {
    /// 按位置排列的参数描述
    fn params() -> Vec<Param>;

    /// 从按位置排列的绑定值构造参数元组
    fn from_bindings(bindings: Vec<Binding>) -> Option<Self>;
}

macro_rules! impl_dependencies {
    ($($name:ident),*) => {
        impl<$($name: Dependency),*> Dependencies for ($($name,)*) {
            fn params() -> Vec<Param> {
                vec![$($name::param()),*]
            }

            #[allow(unused_mut, unused_variables)]
            fn from_bindings(bindings: Vec<Binding>) -> Option<Self> {
                let mut bindings = bindings.into_iter();
                let deps = ($($name::from_binding(bindings.next()?)?,)*);
                if bindings.next().is_some() {
                    return None;
                }
                Some(deps)
            }
        }
    };
}

impl_dependencies!();
impl_dependencies!(A);
impl_dependencies!(A, B);
impl_dependencies!(A, B, C);
impl_dependencies!(A, B, C, D);
impl_dependencies!(A, B, C, D, E);
impl_dependencies!(A, B, C, D, E, F);
impl_dependencies!(A, B, C, D, E, F, G);
impl_dependencies!(A, B, C, D, E, F, G, H);

/// 初始化结果
pub type InitResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// 可初始化服务
///
/// 服务以共享方式注册，`init` 只拿到 `&self`，需要保存的依赖应放在
/// `OnceLock`、`RwLock` 等内部可变容器中。
///
/// ```rust
/// use di_abstractions::{Initializable, InitResult};
/// use parking_lot::RwLock;
/// use std::sync::Arc;
///
/// struct Repository;
///
/// #[derive(Default)]
/// struct Handler {
///     repository: RwLock<Option<Arc<Repository>>>,
/// }
///
/// impl Initializable for Handler {
///     type Deps = (Arc<Repository>,);
///
///     fn init(&self, (repository,): Self::Deps) -> InitResult {
///         *self.repository.write() = Some(repository);
///         Ok(())
///     }
/// }
/// ```
pub trait Initializable: Send + Sync + 'static {
    /// 参数列表
    type Deps: Dependencies;

    /// 使用绑定好的依赖初始化
    fn init(&self, deps: Self::Deps) -> InitResult;
}

/// 类型擦除的初始化能力
pub trait ErasedInitializer: Send + Sync {
    /// 参数描述
    fn params(&self) -> Vec<Param>;

    /// 以绑定值调用初始化
    fn invoke(&self, instance: &ErasedInstance, bindings: Vec<Binding>) -> DependencyResult<()>;
}

/// [`Initializable`] 到 [`ErasedInitializer`] 的适配
pub struct TypedInitializer<T>(PhantomData<fn() -> T>);

impl<T> TypedInitializer<T> {
    /// 创建适配器
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for TypedInitializer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Initializable> ErasedInitializer for TypedInitializer<T> {
    fn params(&self) -> Vec<Param> {
        T::Deps::params()
    }

    fn invoke(&self, instance: &ErasedInstance, bindings: Vec<Binding>) -> DependencyResult<()> {
        let type_name = std::any::type_name::<T>();

        let service = Arc::clone(instance)
            .downcast::<T>()
            .map_err(|_| DependencyError::resolution_failed(type_name, "实例类型与初始化能力不一致"))?;

        let deps = T::Deps::from_bindings(bindings)
            .ok_or_else(|| DependencyError::resolution_failed(type_name, "绑定值与参数列表不匹配"))?;

        debug!("调用服务初始化: {}", type_name);
        service
            .init(deps)
            .map_err(|source| DependencyError::InitializationFailed {
                type_name: type_name.to_string(),
                source,
            })
    }
}
