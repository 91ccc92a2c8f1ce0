//! # 服务注册表具体实现
//!
//! 提供并发安全的服务注册表、三级解析器、依赖注入初始化器，
//! 以及组合三者的 [`Container`]。
//!
//! ```rust
//! use di_impl::Container;
//! use di_abstractions::ServiceResolver;
//! use std::sync::Arc;
//!
//! struct Clock;
//!
//! let container = Container::new();
//! container.register(Arc::new(Clock));
//! container.init().unwrap();
//!
//! assert!(container.get::<Clock>().is_ok());
//! ```

pub mod container;
pub mod initializer;
pub mod registry;
pub mod resolver;

pub use container::*;
pub use initializer::*;
pub use registry::*;
pub use resolver::*;
