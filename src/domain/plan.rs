// ==========================================
// 矿山生产计划 - 月度计划 / 日计划领域模型
// ==========================================
// 用途: 月度计划汇总 (ParentPlan) 按自然日分解为日计划 (DailyPlan)
// 红线: 日计划只能随月度计划整批生成, 不可单条增删改
// ==========================================

use crate::domain::types::{PlanStatus, Ratio};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// 每日班次数 (业务固定两班)
pub const SHIFTS_PER_DAY: u32 = 2;

// ==========================================
// ParentPlanInput - 月度计划输入
// ==========================================
/// 提交给展开引擎的月度计划
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParentPlanInput {
    pub plan_month: NaiveDate, // 计划月份 (必须为当月1日)

    // ===== 月度目标 =====
    pub total_average_month_ewh: f64,   // 月有效工时
    pub total_ob_target: f64,           // 剥离量目标 (OB)
    pub total_ore_target: f64,          // 矿石产量目标
    pub total_quarry_target: f64,       // 采石目标
    pub total_ore_shipment_target: f64, // 矿石外运目标
    pub total_fleet: i64,               // 车队数量

    // ===== 期初库存 =====
    pub total_sisa_stock: Option<i64>, // 月初剩余库存

    pub created_by: Option<String>,
}

// ==========================================
// ParentPlanSummary - 展开后回写到月度计划的汇总字段
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParentPlanSummary {
    pub plan_month: NaiveDate,
    pub total_calendar_days: u32,
    pub total_holiday_days: u32,
    pub total_available_days: u32,
    pub total_sr_target: Ratio,
    /// 已校验存在的月初库存 (结转起点)
    pub opening_stock: i64,
}

// ==========================================
// DailyPlan - 日计划
// ==========================================
/// 单日计划
///
/// `is_calendar_day` 恒为 true, `is_available_day` 恒等于 `!is_holiday_day`,
/// 两者均由方法给出, 不可单独赋值。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPlan {
    pub plan_date: NaiveDate,
    pub is_holiday_day: bool,

    // ===== 日分摊 =====
    pub day_ewh: f64,
    pub day_ob_target: f64,
    pub day_ore_target: f64,
    pub day_quarry_target: f64,
    pub day_ore_shipment_target: f64,

    // ===== 班次分摊 =====
    pub shift_ob_target: f64,
    pub shift_ore_target: f64,
    pub shift_quarry_target: f64,
    pub shift_sr_target: Ratio,

    // ===== 库存结转 =====
    pub daily_old_stock: f64, // 当日期初库存 (= 前一日结存)
    pub remaining_stock: f64, // 当日结存

    pub sr_target: Ratio, // 日剥采比
}

impl DailyPlan {
    pub fn is_calendar_day(&self) -> bool {
        true
    }

    pub fn is_available_day(&self) -> bool {
        !self.is_holiday_day
    }
}

// ==========================================
// PlanExpansion - 引擎输出 (原子单元)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanExpansion {
    pub summary: ParentPlanSummary,
    /// 按 plan_date 升序, 长度 = total_calendar_days
    pub daily_plans: Vec<DailyPlan>,
}

// ==========================================
// ParentPlan - 已落库的月度计划
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParentPlan {
    pub parent_plan_id: String,
    pub plan_month: NaiveDate,

    // ===== 派生汇总 =====
    pub total_calendar_days: u32,
    pub total_holiday_days: u32,
    pub total_available_days: u32,
    pub total_sr_target: Ratio,

    // ===== 月度目标 =====
    pub total_average_month_ewh: f64,
    pub total_ob_target: f64,
    pub total_ore_target: f64,
    pub total_quarry_target: f64,
    pub total_ore_shipment_target: f64,
    pub total_fleet: i64,
    pub total_sisa_stock: i64,

    // ===== 审计 =====
    pub config_snapshot_json: Option<String>,
    pub created_by: Option<String>,
    pub created_at: NaiveDateTime,
    pub deleted_at: Option<NaiveDateTime>,
}

impl ParentPlan {
    /// 由输入与展开结果组装待落库的月度计划
    ///
    /// 月初库存取自展开汇总, 只有成功展开的计划才能落库。
    pub fn from_expansion(
        input: &ParentPlanInput,
        summary: &ParentPlanSummary,
        config_snapshot_json: Option<String>,
    ) -> Self {
        Self {
            parent_plan_id: uuid::Uuid::new_v4().to_string(),
            plan_month: summary.plan_month,
            total_calendar_days: summary.total_calendar_days,
            total_holiday_days: summary.total_holiday_days,
            total_available_days: summary.total_available_days,
            total_sr_target: summary.total_sr_target,
            total_average_month_ewh: input.total_average_month_ewh,
            total_ob_target: input.total_ob_target,
            total_ore_target: input.total_ore_target,
            total_quarry_target: input.total_quarry_target,
            total_ore_shipment_target: input.total_ore_shipment_target,
            total_fleet: input.total_fleet,
            total_sisa_stock: summary.opening_stock,
            config_snapshot_json,
            created_by: input.created_by.clone(),
            created_at: chrono::Local::now().naive_local(),
            deleted_at: None,
        }
    }

    pub fn status(&self) -> PlanStatus {
        if self.deleted_at.is_some() {
            PlanStatus::Deleted
        } else {
            PlanStatus::Active
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_daily(is_holiday_day: bool) -> DailyPlan {
        DailyPlan {
            plan_date: NaiveDate::from_ymd_opt(2025, 11, 2).unwrap(),
            is_holiday_day,
            day_ewh: 20.0,
            day_ob_target: 100.0,
            day_ore_target: 50.0,
            day_quarry_target: 10.0,
            day_ore_shipment_target: 40.0,
            shift_ob_target: 50.0,
            shift_ore_target: 25.0,
            shift_quarry_target: 5.0,
            shift_sr_target: Ratio::Defined(2.0),
            daily_old_stock: 0.0,
            remaining_stock: 10.0,
            sr_target: Ratio::Defined(2.0),
        }
    }

    #[test]
    fn test_available_is_complement_of_holiday() {
        assert!(sample_daily(false).is_available_day());
        assert!(!sample_daily(true).is_available_day());
        assert!(sample_daily(true).is_calendar_day());
    }

    #[test]
    fn test_parent_plan_status_follows_soft_delete() {
        let input = ParentPlanInput {
            plan_month: NaiveDate::from_ymd_opt(2025, 11, 1).unwrap(),
            total_average_month_ewh: 600.0,
            total_ob_target: 0.0,
            total_ore_target: 0.0,
            total_quarry_target: 0.0,
            total_ore_shipment_target: 0.0,
            total_fleet: 3,
            total_sisa_stock: None,
            created_by: None,
        };
        let summary = ParentPlanSummary {
            plan_month: input.plan_month,
            total_calendar_days: 30,
            total_holiday_days: 5,
            total_available_days: 25,
            total_sr_target: Ratio::Undefined,
            opening_stock: 10,
        };
        let mut plan = ParentPlan::from_expansion(&input, &summary, None);
        assert_eq!(plan.status(), PlanStatus::Active);
        assert_eq!(plan.total_sisa_stock, 10);

        plan.deleted_at = Some(plan.created_at);
        assert_eq!(plan.status(), PlanStatus::Deleted);
    }
}
