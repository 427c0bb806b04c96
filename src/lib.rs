// ==========================================
// 矿山生产计划 - 核心库
// ==========================================
// 系统定位: 月度生产计划 → 日计划分解 (剥离/矿石/采石/外运/库存结转)
// 技术栈: Rust + SQLite
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 引擎层 - 计划展开
pub mod engine;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

pub use domain::{
    DailyPlan, ExpansionStage, ParentPlan, ParentPlanInput, ParentPlanSummary, PlanExpansion,
    Ratio,
};
pub use engine::{EngineError, PlanExpansionOrchestrator};
pub use api::{ApiError, ImportApi, PlanApi};

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "矿山生产计划";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
