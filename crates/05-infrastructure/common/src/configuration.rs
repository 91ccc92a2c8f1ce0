//! 容器配置
//!
//! 配置来源按优先级从低到高：默认值、配置文件、`SERVICE_REGISTRY_` 前缀的环境变量。

use crate::errors::{ConfigError, ConfigResult};
use crate::lifecycle::InitOrdering;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, error};

/// 环境变量前缀
pub const ENV_PREFIX: &str = "SERVICE_REGISTRY";

/// 容器配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// 初始化顺序策略
    pub init_ordering: InitOrdering,
    /// 依赖图最大遍历深度
    pub max_resolution_depth: usize,
    /// 是否以 info 级别输出每个参数绑定
    pub log_bindings: bool,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            init_ordering: InitOrdering::Topological,
            max_resolution_depth: 100,
            log_bindings: false,
        }
    }
}

impl ContainerConfig {
    /// 加载配置
    ///
    /// `path` 为 `None` 时只使用默认值与环境变量；文件格式由扩展名决定。
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            if !path.exists() {
                return Err(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                });
            }
            debug!("加载容器配置文件: {}", path.display());
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .map_err(|e| {
                error!("配置构建失败: {}", e);
                ConfigError::ParseError {
                    source: Box::new(e),
                }
            })?;

        let config: Self = settings.try_deserialize().map_err(|e| {
            error!("配置绑定失败: {}", e);
            ConfigError::ParseError {
                source: Box::new(e),
            }
        })?;

        config.validate()?;
        Ok(config)
    }

    /// 从配置文件加载
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        Self::load(Some(path.as_ref()))
    }

    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_resolution_depth == 0 {
            return Err(ConfigError::ValidationError {
                message: "max_resolution_depth 必须大于 0".to_string(),
            });
        }
        Ok(())
    }

    /// 设置初始化顺序策略
    pub fn with_init_ordering(mut self, ordering: InitOrdering) -> Self {
        self.init_ordering = ordering;
        self
    }

    /// 设置依赖图最大遍历深度
    pub fn with_max_resolution_depth(mut self, depth: usize) -> Self {
        self.max_resolution_depth = depth;
        self
    }

    /// 设置是否输出参数绑定日志
    pub fn with_log_bindings(mut self, enabled: bool) -> Self {
        self.log_bindings = enabled;
        self
    }
}
