//! 服务初始化生命周期

use serde::{Deserialize, Serialize};

/// 服务初始化状态
///
/// 状态只会沿 `Uninitialized -> Initializing -> Initialized` 推进；
/// 初始化失败时回到 `Uninitialized`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitState {
    /// 未初始化
    #[default]
    Uninitialized,
    /// 初始化中
    Initializing,
    /// 已初始化
    Initialized,
}

impl InitState {
    /// 是否可以开始初始化
    pub fn can_start(self) -> bool {
        matches!(self, Self::Uninitialized)
    }

    /// 是否已完成初始化
    pub fn is_initialized(self) -> bool {
        matches!(self, Self::Initialized)
    }
}

/// 初始化顺序策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitOrdering {
    /// 依赖优先的拓扑顺序，检测循环依赖
    #[default]
    Topological,
    /// 按注册顺序，不保证依赖先初始化
    Registration,
}
