//! # Registry Common
//!
//! 服务注册表的公共基础类型。
//!
//! ## 核心内容
//!
//! - [`DependencyError`] - 注册、解析与初始化过程中的错误
//! - [`TypeInfo`] / [`canonical_key`] - 运行时类型标识与规范化键
//! - [`InitState`] - 服务初始化状态机
//! - [`ContainerConfig`] - 容器配置及加载
//!
//! ## 设计原则
//!
//! - 所有错误都以类型化的 `Result` 返回，不终止宿主进程
//! - 容器显式构造并传递，不存在全局可变单例

pub mod configuration;
pub mod errors;
pub mod lifecycle;
pub mod metadata;

pub use configuration::*;
pub use errors::*;
pub use lifecycle::*;
pub use metadata::*;
