//! # Dependency Injection Abstractions
//!
//! 服务注册表抽象层，定义服务槽、能力视图和注入协议。
//!
//! ## 核心接口
//!
//! - [`ServiceContainer`] - 服务注册表接口
//! - [`ServiceResolver`] - 服务解析器接口
//! - [`ServiceSlot`] - 持有共享实例与能力声明的服务槽
//! - [`Initializable`] - 服务初始化协议
//! - [`CircularDependencyDetector`] - 依赖图排序与循环检测

pub mod capability;
pub mod descriptor;
pub mod graph;
pub mod injection;
pub mod registry;
pub mod resolver;
pub mod slot;

pub use capability::*;
pub use descriptor::*;
pub use graph::*;
pub use injection::*;
pub use registry::*;
pub use resolver::*;
pub use slot::*;
