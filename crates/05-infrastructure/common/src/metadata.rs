//! 元数据定义
//!
//! 提供运行时类型标识、规范化注册键以及服务描述信息

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::any::TypeId;

/// 共享指针包装，规范化时剥离外层
const SHARED_WRAPPERS: &[&str] = &[
    "alloc::sync::Arc<",
    "alloc::rc::Rc<",
    "alloc::boxed::Box<",
    "std::sync::Arc<",
    "std::rc::Rc<",
    "std::boxed::Box<",
    "Arc<",
    "Rc<",
    "Box<",
];

/// 引用与裸指针标记
const REFERENCE_MARKERS: &[&str] = &["&mut ", "*const ", "*mut ", "&"];

/// 将类型名规范化为注册键
///
/// 去掉引用/指针标记以及 `Arc`、`Rc`、`Box` 包装，使 `T` 与“指向 `T` 的引用”
/// 得到相同的键。对任意输入都有定义，且幂等。
pub fn canonical_key(type_name: &str) -> String {
    let mut key = type_name.trim().to_string();

    for marker in REFERENCE_MARKERS {
        key = key.replace(marker, "");
    }

    while let Some((start, prefix_len)) = find_wrapper(&key) {
        let open = start + prefix_len;
        let Some(close) = matching_close(&key, open) else {
            break;
        };
        key.replace_range(close..=close, "");
        key.replace_range(start..open, "");
    }

    key
}

fn find_wrapper(key: &str) -> Option<(usize, usize)> {
    SHARED_WRAPPERS
        .iter()
        .filter_map(|wrapper| find_at_boundary(key, wrapper).map(|index| (index, wrapper.len())))
        .min_by_key(|(index, _)| *index)
}

fn find_at_boundary(key: &str, pattern: &str) -> Option<usize> {
    key.match_indices(pattern).map(|(index, _)| index).find(|&index| {
        key[..index]
            .chars()
            .next_back()
            .map_or(true, |c| !(c.is_alphanumeric() || c == '_' || c == ':'))
    })
}

fn matching_close(key: &str, open: usize) -> Option<usize> {
    let mut depth = 1usize;
    let mut previous = None;

    for (offset, c) in key[open..].char_indices() {
        match c {
            '<' => depth += 1,
            // `->` 不是泛型结束符
            '>' if previous != Some('-') => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + offset);
                }
            }
            _ => {}
        }
        previous = Some(c);
    }

    None
}

/// 类型信息
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeInfo {
    /// 完整类型名称
    pub name: String,
    /// 类型ID
    pub id: TypeId,
    /// 规范化注册键
    pub key: String,
}

impl TypeInfo {
    /// 创建新的类型信息
    pub fn new(type_id: TypeId, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            key: canonical_key(&name),
            name,
            id: type_id,
        }
    }

    /// 从类型获取类型信息
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::new(TypeId::of::<T>(), std::any::type_name::<T>())
    }

    /// 是否为指定类型
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

/// 服务元数据
///
/// 用于内省输出，不参与解析
#[derive(Debug, Clone, Serialize)]
pub struct ServiceMetadata {
    /// 注册键
    pub key: String,
    /// 服务类型名称
    pub type_name: String,
    /// 声明的能力（trait 对象类型）
    pub capabilities: Vec<String>,
    /// 是否支持创建新实例
    pub cloneable: bool,
    /// 是否声明了初始化能力
    pub initializable: bool,
    /// 初始化状态
    pub init_state: crate::lifecycle::InitState,
    /// 注册顺序
    pub sequence: u64,
    /// 注册时间
    pub registered_at: DateTime<Utc>,
}
