// ==========================================
// 矿山生产计划 - API 层
// ==========================================
// 职责: 业务接口, 串联校验/引擎/仓储
// ==========================================

pub mod error;
pub mod import_api;
pub mod plan_api;
pub mod validator;

pub use error::{ApiError, ApiResult, FieldViolation};
pub use import_api::ImportApi;
pub use plan_api::{PagedResult, PlanApi, PlanDetail, ReplacePlanResult, MAX_PAGE_SIZE};
pub use validator::PlanInputValidator;
