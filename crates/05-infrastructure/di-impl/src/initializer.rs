//! 服务初始化器
//!
//! 一次初始化分四步：
//! 1. 对注册表做快照，建立“自身类型 -> 槽”的依赖映射，后注册的槽覆盖先注册的
//! 2. 为每个尚未初始化且声明了初始化能力的槽规划参数绑定
//! 3. 按依赖优先的顺序排序（或按注册顺序）
//! 4. 逐个绑定参数并调用初始化

use di_abstractions::{
    Binding, CircularDependencyDetector, DefaultCircularDependencyDetector, DependencyGraphNode,
    ErasedInitializer, NewInstance, Param, ServiceContainer, ServiceSlot,
};
use registry_common::{
    ContainerConfig, DependencyError, DependencyResult, InitOrdering, InitState,
};
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info};

/// 初始化结果报告
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitReport {
    /// 本次完成初始化的服务，按调用顺序
    pub initialized: Vec<String>,
    /// 之前已完成初始化而跳过的服务
    pub skipped: Vec<String>,
}

/// 参数的绑定来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BindingSource {
    /// 新实例标记的哨兵值
    Marker,
    /// 共享实例
    Shared(usize),
    /// 新实例副本
    Copy(usize),
}

impl BindingSource {
    fn target(self) -> Option<usize> {
        match self {
            Self::Marker => None,
            Self::Shared(index) | Self::Copy(index) => Some(index),
        }
    }
}

/// 单个服务的初始化计划
struct InitPlan {
    slot: usize,
    initializer: Arc<dyn ErasedInitializer>,
    bindings: Vec<(Param, BindingSource)>,
}

/// 服务初始化器
#[derive(Debug, Clone)]
pub struct Initializer {
    config: ContainerConfig,
}

impl Initializer {
    /// 创建初始化器
    pub fn new(config: ContainerConfig) -> Self {
        Self { config }
    }

    /// 对注册表中的服务执行一次初始化
    pub fn run<C>(&self, registry: &C) -> DependencyResult<InitReport>
    where
        C: ServiceContainer + ?Sized,
    {
        let slots = registry.list_all();
        let dependency_map = build_dependency_map(&slots);
        let mut report = InitReport::default();

        let mut plans = Vec::new();
        for (index, slot) in slots.iter().enumerate() {
            let Some(initializer) = slot.initializer() else {
                continue;
            };
            if slot.init_state().is_initialized() {
                report.skipped.push(slot.type_info().name.clone());
                continue;
            }
            plans.push(self.plan(index, initializer, &slots, &dependency_map)?);
        }

        if plans.is_empty() {
            debug!("没有需要初始化的服务");
            return Ok(report);
        }

        let order = self.order(&plans, &slots)?;
        info!("开始初始化 {} 个服务", order.len());

        for plan_index in order {
            let plan = &plans[plan_index];
            let name = self.invoke(plan, &slots)?;
            report.initialized.push(name);
        }

        info!(
            "服务初始化完成: 初始化 {} 个, 跳过 {} 个",
            report.initialized.len(),
            report.skipped.len()
        );
        Ok(report)
    }

    fn plan(
        &self,
        index: usize,
        initializer: Arc<dyn ErasedInitializer>,
        slots: &[Arc<ServiceSlot>],
        dependency_map: &HashMap<TypeId, usize>,
    ) -> DependencyResult<InitPlan> {
        let dependent = &slots[index].type_info().name;
        let mut bindings = Vec::new();
        let mut previous_is_marker = false;

        for param in initializer.params() {
            let source = if param.is_marker() && !previous_is_marker {
                BindingSource::Marker
            } else {
                let type_id = param.type_info.id;
                let target = dependency_map
                    .get(&type_id)
                    .copied()
                    .or_else(|| slots.iter().position(|slot| slot.provides_type(type_id)))
                    .ok_or_else(|| {
                        error!("依赖未找到: {} 需要 {}", dependent, param.type_info.name);
                        DependencyError::dependency_not_found(dependent, &param.type_info.name)
                    })?;

                if previous_is_marker {
                    if !slots[target].is_cloneable() {
                        error!(
                            "服务不支持创建新实例: {} (依赖方 {})",
                            slots[target].type_info().name,
                            dependent
                        );
                        return Err(DependencyError::CopyUnsupported {
                            type_name: slots[target].type_info().name.clone(),
                            dependent: dependent.clone(),
                        });
                    }
                    BindingSource::Copy(target)
                } else {
                    BindingSource::Shared(target)
                }
            };

            previous_is_marker = param.is_marker();
            bindings.push((param, source));
        }

        Ok(InitPlan {
            slot: index,
            initializer,
            bindings,
        })
    }

    fn order(&self, plans: &[InitPlan], slots: &[Arc<ServiceSlot>]) -> DependencyResult<Vec<usize>> {
        if self.config.init_ordering == InitOrdering::Registration {
            return Ok((0..plans.len()).collect());
        }

        // 依赖图覆盖快照中的全部槽，只有待初始化的槽带有出边
        let mut graph: Vec<DependencyGraphNode> = slots
            .iter()
            .map(|slot| DependencyGraphNode::new(slot.type_info().name.clone(), Vec::new()))
            .collect();
        let mut plan_of_slot = HashMap::new();

        for (plan_index, plan) in plans.iter().enumerate() {
            graph[plan.slot].dependencies = plan
                .bindings
                .iter()
                .filter_map(|(_, source)| source.target())
                .collect();
            plan_of_slot.insert(plan.slot, plan_index);
        }

        let detector = DefaultCircularDependencyDetector::new(self.config.max_resolution_depth);
        let order = detector.initialization_order(&graph).map_err(|e| {
            error!("初始化顺序计算失败: {}", e);
            e
        })?;

        Ok(order
            .into_iter()
            .filter_map(|slot_index| plan_of_slot.get(&slot_index).copied())
            .collect())
    }

    fn invoke(&self, plan: &InitPlan, slots: &[Arc<ServiceSlot>]) -> DependencyResult<String> {
        let slot = &slots[plan.slot];
        let name = slot.type_info().name.clone();

        let state = slot.init_state();
        if state.is_initialized() {
            debug!("服务已初始化, 跳过: {}", name);
            return Ok(name);
        }
        if !state.can_start() {
            error!("服务正在初始化中被再次调用: {}", name);
            return Err(DependencyError::CyclicDependency {
                dependency_chain: format!("{name} -> {name}"),
            });
        }

        slot.set_init_state(InitState::Initializing);

        let result = self
            .bind(plan, slots, &name)
            .and_then(|bindings| plan.initializer.invoke(&slot.get(), bindings));

        match result {
            Ok(()) => {
                slot.set_init_state(InitState::Initialized);
                debug!("服务初始化完成: {}", name);
                Ok(name)
            }
            Err(e) => {
                slot.set_init_state(InitState::Uninitialized);
                error!("服务初始化失败: {}: {}", name, e);
                Err(e)
            }
        }
    }

    fn bind(
        &self,
        plan: &InitPlan,
        slots: &[Arc<ServiceSlot>],
        dependent: &str,
    ) -> DependencyResult<Vec<Binding>> {
        plan.bindings
            .iter()
            .map(|(param, source)| {
                let binding = match *source {
                    BindingSource::Marker => Binding::Marker(NewInstance::REQUEST),
                    BindingSource::Shared(target) => {
                        let view = slots[target].erased_view(param.type_info.id).ok_or_else(|| {
                            DependencyError::resolution_failed(
                                &param.type_info.name,
                                "无法以参数类型查看依赖实例",
                            )
                        })?;
                        Binding::Service(view)
                    }
                    BindingSource::Copy(target) => {
                        Binding::Service(slots[target].copy_erased_view(param.type_info.id, dependent)?)
                    }
                };

                if self.config.log_bindings {
                    info!("绑定参数: {} <- {} ({:?})", dependent, param.type_info.name, source);
                } else {
                    debug!("绑定参数: {} <- {} ({:?})", dependent, param.type_info.name, source);
                }

                Ok(binding)
            })
            .collect()
    }
}

/// 以自身类型建立依赖映射，同一类型后注册的槽覆盖先注册的
fn build_dependency_map(slots: &[Arc<ServiceSlot>]) -> HashMap<TypeId, usize> {
    slots
        .iter()
        .enumerate()
        .map(|(index, slot)| (slot.own_type_id(), index))
        .collect()
}
