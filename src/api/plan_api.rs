// ==========================================
// 矿山生产计划 - 月度计划 API
// ==========================================
// 职责: 月度计划提交/预览/替换/查询/删除
// 流程: 请求校验 → 读取展开参数 → 引擎展开 → 事务落库
// 红线: 已提交计划不做原地修改, 修改即重新展开
// ==========================================

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::PlanInputValidator;
use crate::config::ConfigManager;
use crate::domain::plan::{DailyPlan, ParentPlan, ParentPlanInput, PlanExpansion};
use crate::engine::PlanExpansionOrchestrator;
use crate::repository::{DailyPlanRepository, ParentPlanRepository};

/// 分页上限
pub const MAX_PAGE_SIZE: u32 = 200;

// ==========================================
// DTO
// ==========================================

/// 月度计划 + 全部日计划
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanDetail {
    pub plan: ParentPlan,
    pub daily_plans: Vec<DailyPlan>,
}

/// 替换结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplacePlanResult {
    pub detail: PlanDetail,
    pub replaced_plan_id: Option<String>,
}

/// 分页结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
}

// ==========================================
// PlanApi - 月度计划 API
// ==========================================
pub struct PlanApi {
    parent_plan_repo: Arc<ParentPlanRepository>,
    daily_plan_repo: Arc<DailyPlanRepository>,
    config_manager: Arc<ConfigManager>,
    validator: PlanInputValidator,
}

impl PlanApi {
    pub fn new(
        parent_plan_repo: Arc<ParentPlanRepository>,
        daily_plan_repo: Arc<DailyPlanRepository>,
        config_manager: Arc<ConfigManager>,
    ) -> Self {
        Self {
            parent_plan_repo,
            daily_plan_repo,
            config_manager,
            validator: PlanInputValidator::new(),
        }
    }

    /// 校验 + 展开 (不落库)
    fn expand(&self, input: &ParentPlanInput) -> ApiResult<PlanExpansion> {
        self.validator.validate(input)?;
        let profile = self.config_manager.get_expansion_profile()?;
        let expansion = PlanExpansionOrchestrator::new(profile).expand(input)?;
        Ok(expansion)
    }

    fn build_plan(&self, input: &ParentPlanInput, expansion: &PlanExpansion) -> ApiResult<ParentPlan> {
        let snapshot = self.config_manager.get_config_snapshot()?;
        Ok(ParentPlan::from_expansion(
            input,
            &expansion.summary,
            Some(snapshot),
        ))
    }

    /// 预览展开结果
    pub fn preview_plan(&self, input: &ParentPlanInput) -> ApiResult<PlanExpansion> {
        self.expand(input)
    }

    /// 提交月度计划
    ///
    /// # 返回
    /// - Ok(PlanDetail): 已落库的月度计划与日计划
    /// - Err(Conflict): 该月已存在有效计划 (需走 replace_plan)
    pub fn create_plan(&self, input: ParentPlanInput) -> ApiResult<PlanDetail> {
        let expansion = self.expand(&input)?;

        if let Some(existing) = self.parent_plan_repo.find_active_by_month(input.plan_month)? {
            return Err(ApiError::Conflict(format!(
                "月份 {} 已存在有效计划 (id={})",
                input.plan_month.format("%Y-%m"),
                existing.parent_plan_id
            )));
        }

        let plan = self.build_plan(&input, &expansion)?;
        self.parent_plan_repo
            .insert_with_daily_plans(&plan, &expansion.daily_plans)?;

        info!(
            parent_plan_id = %plan.parent_plan_id,
            plan_month = %plan.plan_month,
            "月度计划已创建"
        );
        Ok(PlanDetail {
            plan,
            daily_plans: expansion.daily_plans,
        })
    }

    /// 以新输入重新展开并替换当月有效计划 (旧计划软删除)
    pub fn replace_plan(&self, input: ParentPlanInput) -> ApiResult<ReplacePlanResult> {
        let expansion = self.expand(&input)?;
        let plan = self.build_plan(&input, &expansion)?;
        let replaced_plan_id = self
            .parent_plan_repo
            .replace_active_for_month(&plan, &expansion.daily_plans)?;

        Ok(ReplacePlanResult {
            detail: PlanDetail {
                plan,
                daily_plans: expansion.daily_plans,
            },
            replaced_plan_id,
        })
    }

    /// 按ID查询 (含已软删除, 供审计)
    pub fn get_plan(&self, parent_plan_id: &str) -> ApiResult<PlanDetail> {
        let plan = self
            .parent_plan_repo
            .find_by_id(parent_plan_id)?
            .ok_or_else(|| ApiError::NotFound(format!("月度计划(id={})不存在", parent_plan_id)))?;
        let daily_plans = self.daily_plan_repo.find_by_parent(&plan.parent_plan_id)?;
        Ok(PlanDetail { plan, daily_plans })
    }

    /// 按月份查询有效计划
    pub fn get_plan_by_month(&self, plan_month: NaiveDate) -> ApiResult<PlanDetail> {
        let plan = self
            .parent_plan_repo
            .find_active_by_month(plan_month)?
            .ok_or_else(|| {
                ApiError::NotFound(format!("月份 {} 无有效计划", plan_month.format("%Y-%m")))
            })?;
        let daily_plans = self.daily_plan_repo.find_by_parent(&plan.parent_plan_id)?;
        Ok(PlanDetail { plan, daily_plans })
    }

    /// 分页查询有效计划
    pub fn list_plans(&self, page: u32, page_size: u32) -> ApiResult<PagedResult<ParentPlan>> {
        if page == 0 {
            return Err(ApiError::InvalidInput("page 从 1 开始".to_string()));
        }
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(ApiError::InvalidInput(format!(
                "page_size 必须在 1-{} 之间",
                MAX_PAGE_SIZE
            )));
        }

        let (items, total) = self.parent_plan_repo.list_active(page, page_size)?;
        Ok(PagedResult {
            items,
            total,
            page,
            page_size,
        })
    }

    /// 查询某月度计划的日计划
    pub fn get_daily_plans(&self, parent_plan_id: &str) -> ApiResult<Vec<DailyPlan>> {
        if self.parent_plan_repo.find_by_id(parent_plan_id)?.is_none() {
            return Err(ApiError::NotFound(format!(
                "月度计划(id={})不存在",
                parent_plan_id
            )));
        }
        Ok(self.daily_plan_repo.find_by_parent(parent_plan_id)?)
    }

    /// 软删除月度计划
    pub fn delete_plan(&self, parent_plan_id: &str) -> ApiResult<()> {
        self.parent_plan_repo
            .soft_delete(parent_plan_id, chrono::Local::now().naive_local())?;
        info!(parent_plan_id, "月度计划已删除");
        Ok(())
    }

    /// 物理删除月度计划 (级联日计划)
    pub fn purge_plan(&self, parent_plan_id: &str) -> ApiResult<()> {
        self.parent_plan_repo.purge(parent_plan_id)?;
        Ok(())
    }
}
