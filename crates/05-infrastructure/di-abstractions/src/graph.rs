//! 依赖图与循环依赖检测

use registry_common::{DependencyError, DependencyResult};

/// 依赖图节点
///
/// 节点以其在图中的位置标识，`dependencies` 中保存被依赖节点的位置。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyGraphNode {
    /// 服务名称
    pub name: String,
    /// 依赖节点的位置列表
    pub dependencies: Vec<usize>,
}

impl DependencyGraphNode {
    /// 创建新的节点
    pub fn new(name: impl Into<String>, dependencies: Vec<usize>) -> Self {
        Self {
            name: name.into(),
            dependencies,
        }
    }
}

/// 循环依赖检测器
pub trait CircularDependencyDetector: Send + Sync {
    /// 计算依赖优先的初始化顺序，存在循环时返回 `CyclicDependency`
    fn initialization_order(&self, graph: &[DependencyGraphNode]) -> DependencyResult<Vec<usize>>;
}

/// 默认循环依赖检测器
///
/// 按节点顺序做深度优先遍历，后序输出即依赖优先的顺序；
/// 互不依赖的节点保持原有的相对顺序。
#[derive(Debug, Clone)]
pub struct DefaultCircularDependencyDetector {
    max_depth: usize,
}

impl Default for DefaultCircularDependencyDetector {
    fn default() -> Self {
        Self { max_depth: 100 }
    }
}

impl DefaultCircularDependencyDetector {
    /// 指定最大遍历深度
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    fn dfs_visit(
        &self,
        current: usize,
        graph: &[DependencyGraphNode],
        visited: &mut [bool],
        chain: &mut Vec<usize>,
        order: &mut Vec<usize>,
    ) -> DependencyResult<()> {
        if let Some(position) = chain.iter().position(|&index| index == current) {
            // 检测到循环依赖
            let dependency_chain = chain[position..]
                .iter()
                .chain(std::iter::once(&current))
                .map(|&index| graph[index].name.as_str())
                .collect::<Vec<_>>()
                .join(" -> ");

            return Err(DependencyError::CyclicDependency { dependency_chain });
        }

        if visited[current] {
            return Ok(());
        }

        if chain.len() >= self.max_depth {
            return Err(DependencyError::resolution_failed(
                &graph[current].name,
                format!("依赖链深度超过上限 {}", self.max_depth),
            ));
        }

        chain.push(current);

        for &dependency in &graph[current].dependencies {
            if dependency >= graph.len() {
                return Err(DependencyError::resolution_failed(
                    &graph[current].name,
                    format!("依赖节点越界: {dependency}"),
                ));
            }
            self.dfs_visit(dependency, graph, visited, chain, order)?;
        }

        chain.pop();
        visited[current] = true;
        order.push(current);

        Ok(())
    }
}

impl CircularDependencyDetector for DefaultCircularDependencyDetector {
    fn initialization_order(&self, graph: &[DependencyGraphNode]) -> DependencyResult<Vec<usize>> {
        let mut visited = vec![false; graph.len()];
        let mut chain = Vec::new();
        let mut order = Vec::with_capacity(graph.len());

        for index in 0..graph.len() {
            if !visited[index] {
                self.dfs_visit(index, graph, &mut visited, &mut chain, &mut order)?;
            }
        }

        Ok(order)
    }
}
