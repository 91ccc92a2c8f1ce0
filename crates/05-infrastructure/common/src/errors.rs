//! 错误类型定义

use thiserror::Error;

/// 依赖注入错误类型
#[derive(Error, Debug)]
pub enum DependencyError {
    #[error("注册的服务不是共享引用: {type_name}")]
    NotAReference { type_name: String },

    #[error("服务未找到: {type_name}")]
    ServiceNotFound { type_name: String },

    #[error("依赖未找到: {dependent} 的初始化参数 {dependency} 无法绑定")]
    DependencyNotFound { dependent: String, dependency: String },

    #[error("循环依赖检测到: {dependency_chain}")]
    CyclicDependency { dependency_chain: String },

    #[error("服务不支持创建新实例: {type_name}, 依赖方: {dependent}")]
    CopyUnsupported { type_name: String, dependent: String },

    #[error("服务初始化失败: {type_name}, 原因: {source}")]
    InitializationFailed {
        type_name: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("依赖解析失败: {type_name}, 原因: {message}")]
    DependencyResolutionFailed { type_name: String, message: String },
}

impl DependencyError {
    /// 创建服务未找到错误
    pub fn service_not_found(type_name: impl Into<String>) -> Self {
        Self::ServiceNotFound {
            type_name: type_name.into(),
        }
    }

    /// 创建依赖未找到错误
    pub fn dependency_not_found(dependent: impl Into<String>, dependency: impl Into<String>) -> Self {
        Self::DependencyNotFound {
            dependent: dependent.into(),
            dependency: dependency.into(),
        }
    }

    /// 创建依赖解析失败错误
    pub fn resolution_failed(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DependencyResolutionFailed {
            type_name: type_name.into(),
            message: message.into(),
        }
    }
}

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    #[error("配置解析失败: {source}")]
    ParseError {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("配置验证失败: {message}")]
    ValidationError { message: String },
}

/// 结果类型别名
pub type DependencyResult<T> = Result<T, DependencyError>;
pub type ConfigResult<T> = Result<T, ConfigError>;
