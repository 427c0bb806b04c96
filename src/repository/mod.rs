// ==========================================
// 矿山生产计划 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod daily_plan_repo;
pub mod error;
pub mod parent_plan_repo;

// 重导出核心仓储
pub use daily_plan_repo::DailyPlanRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use parent_plan_repo::ParentPlanRepository;
