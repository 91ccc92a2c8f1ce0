//! # Service Macros
//!
//! 在编译期为服务类型生成 `ServiceDescriptor` 实现，
//! 把“可以被看作哪些 trait 对象”“能否创建新实例”“是否需要初始化”
//! 这些能力记录到注册时的服务槽中。
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use service_macros::Service;
//!
//! trait Greeter: Send + Sync {
//!     fn greet(&self) -> String;
//! }
//!
//! #[derive(Clone, Service)]
//! #[service(cloneable, provides(dyn Greeter))]
//! struct English;
//!
//! impl Greeter for English {
//!     fn greet(&self) -> String {
//!         "hello".to_string()
//!     }
//! }
//!
//! container.register_service(Arc::new(English));
//! let greeter = container.get::<dyn Greeter>()?;
//! ```

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod service;

/// 服务描述派生宏
///
/// # 参数
///
/// - `provides(dyn A, dyn B)` - 可以被解析为这些 trait 对象
/// - `cloneable` - 支持通过 `Clone` 创建新实例（要求类型实现 `Clone`）
/// - `initializable` - 注册初始化能力（要求类型实现 `Initializable`）
///
/// 参数可以写在一个或多个 `#[service(...)]` 属性中。
#[proc_macro_derive(Service, attributes(service))]
pub fn derive_service(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match service::expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}
