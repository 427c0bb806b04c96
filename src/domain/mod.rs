// ==========================================
// 矿山生产计划 - 领域模型层
// ==========================================
// 职责: 定义领域实体、值类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod plan;
pub mod types;

// 重导出核心类型
pub use plan::{
    DailyPlan, ParentPlan, ParentPlanInput, ParentPlanSummary, PlanExpansion, SHIFTS_PER_DAY,
};
pub use types::{ExpansionStage, PlanStatus, Ratio};
