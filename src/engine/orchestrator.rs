// ==========================================
// 矿山生产计划 - 计划展开编排器
// ==========================================
// 流程: Validated → Expanding → Accumulating → (比值推导) → Finalized
//       任一步失败 → Failed, 不输出任何日计划
// 红线: 编排器不做 I/O, 落库由调用方在同一事务内完成
// ==========================================

use crate::config::ExpansionProfile;
use crate::domain::plan::{DailyPlan, ParentPlanInput, ParentPlanSummary, PlanExpansion};
use crate::domain::types::{ExpansionStage, Ratio};
use crate::engine::apportionment::{self, DayShare};
use crate::engine::calendar;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::ratio;
use crate::engine::stock_carry::{DayStockFlow, StockCarry, StockCarryForward};
use chrono::{Datelike, NaiveDate};
use tracing::{debug, info, warn};

// ==========================================
// ExpandedDay - 展开阶段的中间结果
// ==========================================
#[derive(Debug, Clone)]
struct ExpandedDay {
    plan_date: NaiveDate,
    is_holiday_day: bool,
    ewh: DayShare,
    ob: DayShare,
    ore: DayShare,
    quarry: DayShare,
    ore_shipment: DayShare,
}

// ==========================================
// ExpansionRun - 单次展开的状态跟踪
// ==========================================
struct ExpansionRun {
    plan_month: NaiveDate,
    stage: ExpansionStage,
}

impl ExpansionRun {
    fn new(plan_month: NaiveDate) -> Self {
        Self {
            plan_month,
            stage: ExpansionStage::Validated,
        }
    }

    fn advance(&mut self, next: ExpansionStage) -> EngineResult<()> {
        if !self.stage.can_transition_to(next) {
            return Err(EngineError::InvalidStageTransition {
                from: self.stage,
                to: next,
            });
        }
        debug!(plan_month = %self.plan_month, from = %self.stage, to = %next, "展开阶段迁移");
        self.stage = next;
        Ok(())
    }

    fn fail(&mut self, err: EngineError) -> EngineError {
        warn!(
            plan_month = %self.plan_month,
            stage = %self.stage,
            kind = err.kind(),
            error = %err,
            "计划展开失败"
        );
        self.stage = ExpansionStage::Failed;
        err
    }
}

// ==========================================
// PlanExpansionOrchestrator - 计划展开编排器
// ==========================================

/// 月度计划 → 日计划展开编排器
///
/// 无状态 (除参数快照外), 同一输入同一参数下输出确定。
pub struct PlanExpansionOrchestrator {
    profile: ExpansionProfile,
}

impl Default for PlanExpansionOrchestrator {
    fn default() -> Self {
        Self::new(ExpansionProfile::default())
    }
}

impl PlanExpansionOrchestrator {
    pub fn new(profile: ExpansionProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &ExpansionProfile {
        &self.profile
    }

    /// 执行一次完整展开
    ///
    /// # 返回
    /// - Ok(PlanExpansion): 月度汇总 + 按日期升序的完整日计划
    /// - Err(EngineError): 任何阶段失败, 无部分输出
    pub fn expand(&self, input: &ParentPlanInput) -> EngineResult<PlanExpansion> {
        let mut run = ExpansionRun::new(input.plan_month);
        self.run_stages(&mut run, input).map_err(|e| run.fail(e))
    }

    fn run_stages(&self, run: &mut ExpansionRun, input: &ParentPlanInput) -> EngineResult<PlanExpansion> {
        // ==========================================
        // Validated: 字段类型/范围校验
        // ==========================================
        validate_input(input)?;

        // ==========================================
        // Expanding: 枚举日期 + 日/班分摊 + 休息日标记
        // ==========================================
        run.advance(ExpansionStage::Expanding)?;
        let days = self.expand_days(input)?;
        debug!(plan_month = %input.plan_month, day_count = days.len(), "日期展开完成");

        // ==========================================
        // Accumulating: 库存结转 (严格顺序)
        // ==========================================
        run.advance(ExpansionStage::Accumulating)?;
        let flows: Vec<DayStockFlow> = days
            .iter()
            .map(|d| DayStockFlow {
                ore_target: d.ore.exact,
                ore_shipment_target: d.ore_shipment.exact,
            })
            .collect();
        let opening_stock = input
            .total_sisa_stock
            .ok_or(EngineError::MissingOpeningStock)?;
        let carries = StockCarryForward::fold(Some(opening_stock), &flows)?;

        // ==========================================
        // 比值推导 + 组装日计划
        // ==========================================
        let daily_plans: Vec<DailyPlan> = days
            .iter()
            .zip(carries.iter())
            .map(|(day, carry)| self.build_daily_plan(day, carry))
            .collect();

        let total_calendar_days = daily_plans.len() as u32;
        let total_holiday_days = daily_plans.iter().filter(|d| d.is_holiday_day).count() as u32;
        let total_sr_target = ratio::stripping_ratio(input.total_ob_target, input.total_ore_target)
            .map(|v| self.profile.round(v));

        if !total_sr_target.is_defined() {
            warn!(plan_month = %input.plan_month, "月度矿石目标为0, 剥采比不适用");
        }

        let negative_days = daily_plans.iter().filter(|d| d.remaining_stock < 0.0).count();
        if negative_days > 0 {
            warn!(
                plan_month = %input.plan_month,
                negative_days,
                "存在结存为负的日期 (欠库)"
            );
        }

        // ==========================================
        // Finalized
        // ==========================================
        run.advance(ExpansionStage::Finalized)?;

        let summary = ParentPlanSummary {
            plan_month: input.plan_month,
            total_calendar_days,
            total_holiday_days,
            total_available_days: total_calendar_days - total_holiday_days,
            total_sr_target,
            opening_stock,
        };

        info!(
            plan_month = %summary.plan_month,
            total_calendar_days = summary.total_calendar_days,
            total_holiday_days = summary.total_holiday_days,
            total_available_days = summary.total_available_days,
            "计划展开完成"
        );

        Ok(PlanExpansion {
            summary,
            daily_plans,
        })
    }

    fn expand_days(&self, input: &ParentPlanInput) -> EngineResult<Vec<ExpandedDay>> {
        let year = input.plan_month.year();
        let month = input.plan_month.month();
        let dates = calendar::month_dates(year, month)?;
        let day_count = calendar::days_in_month(year, month)?;

        let round = |v: f64| self.profile.round(v);
        let ewh = apportionment::share(input.total_average_month_ewh, day_count, round)?;
        let ob = apportionment::share(input.total_ob_target, day_count, round)?;
        let ore = apportionment::share(input.total_ore_target, day_count, round)?;
        let quarry = apportionment::share(input.total_quarry_target, day_count, round)?;
        let ore_shipment = apportionment::share(input.total_ore_shipment_target, day_count, round)?;

        Ok(dates
            .into_iter()
            .map(|plan_date| ExpandedDay {
                plan_date,
                is_holiday_day: calendar::is_holiday(plan_date, &self.profile.holiday_weekdays),
                ewh,
                ob,
                ore,
                quarry,
                ore_shipment,
            })
            .collect())
    }

    fn build_daily_plan(&self, day: &ExpandedDay, carry: &StockCarry) -> DailyPlan {
        let sr_target = ratio::stripping_ratio(day.ob.emitted, day.ore.emitted);
        let shift_sr_target = ratio::stripping_ratio(day.ob.shift, day.ore.shift);

        DailyPlan {
            plan_date: day.plan_date,
            is_holiday_day: day.is_holiday_day,
            day_ewh: day.ewh.emitted,
            day_ob_target: day.ob.emitted,
            day_ore_target: day.ore.emitted,
            day_quarry_target: day.quarry.emitted,
            day_ore_shipment_target: day.ore_shipment.emitted,
            shift_ob_target: day.ob.shift,
            shift_ore_target: day.ore.shift,
            shift_quarry_target: day.quarry.shift,
            shift_sr_target: self.round_ratio(shift_sr_target),
            daily_old_stock: self.profile.round(carry.daily_old_stock),
            remaining_stock: self.profile.round(carry.remaining_stock),
            sr_target: self.round_ratio(sr_target),
        }
    }

    fn round_ratio(&self, ratio: Ratio) -> Ratio {
        ratio.map(|v| self.profile.round(v))
    }
}

// ==========================================
// 输入校验
// ==========================================

fn check_total(field: &str, value: f64) -> EngineResult<()> {
    if !value.is_finite() {
        return Err(EngineError::InvalidPlanField {
            field: field.to_string(),
            message: "必须为有限数值".to_string(),
        });
    }
    if value < 0.0 {
        return Err(EngineError::InvalidPlanField {
            field: field.to_string(),
            message: format!("不能为负数: {}", value),
        });
    }
    Ok(())
}

/// 校验月度计划输入 (Validated 阶段)
pub fn validate_input(input: &ParentPlanInput) -> EngineResult<()> {
    calendar::ensure_first_of_month(input.plan_month)?;

    check_total("total_average_month_ewh", input.total_average_month_ewh)?;
    check_total("total_ob_target", input.total_ob_target)?;
    check_total("total_ore_target", input.total_ore_target)?;
    check_total("total_quarry_target", input.total_quarry_target)?;
    check_total("total_ore_shipment_target", input.total_ore_shipment_target)?;

    if input.total_fleet < 0 {
        return Err(EngineError::InvalidPlanField {
            field: "total_fleet".to_string(),
            message: format!("不能为负数: {}", input.total_fleet),
        });
    }
    if let Some(stock) = input.total_sisa_stock {
        if stock < 0 {
            return Err(EngineError::InvalidPlanField {
                field: "total_sisa_stock".to_string(),
                message: format!("不能为负数: {}", stock),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RoundingMode;
    use chrono::Weekday;

    fn november_2025() -> ParentPlanInput {
        ParentPlanInput {
            plan_month: NaiveDate::from_ymd_opt(2025, 11, 1).unwrap(),
            total_average_month_ewh: 600.0,
            total_ob_target: 3_000_000.0,
            total_ore_target: 750_000.0,
            total_quarry_target: 90_000.0,
            total_ore_shipment_target: 600_000.0,
            total_fleet: 12,
            total_sisa_stock: Some(100_000),
            created_by: None,
        }
    }

    #[test]
    fn test_november_2025_scenario() {
        let expansion = PlanExpansionOrchestrator::default()
            .expand(&november_2025())
            .unwrap();
        let summary = &expansion.summary;
        assert_eq!(summary.total_calendar_days, 30);
        // 2025-11 的周日: 2, 9, 16, 23, 30
        assert_eq!(summary.total_holiday_days, 5);
        assert_eq!(summary.total_available_days, 25);
        assert_eq!(summary.total_sr_target, Ratio::Defined(4.0));

        let day1 = &expansion.daily_plans[0];
        assert_eq!(day1.day_ore_target, 25_000.0);
        assert_eq!(day1.day_ore_shipment_target, 20_000.0);
        assert_eq!(day1.daily_old_stock, 100_000.0);
        assert_eq!(day1.remaining_stock, 105_000.0);
        assert!(!day1.is_holiday_day);

        let day2 = &expansion.daily_plans[1];
        assert!(day2.is_holiday_day);
        assert_eq!(day2.daily_old_stock, 105_000.0);

        let last = expansion.daily_plans.last().unwrap();
        assert_eq!(last.remaining_stock, 100_000.0 + 30.0 * 5_000.0);
    }

    #[test]
    fn test_daily_dates_complete_and_ascending() {
        let mut input = november_2025();
        input.plan_month = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let expansion = PlanExpansionOrchestrator::default().expand(&input).unwrap();
        assert_eq!(expansion.daily_plans.len(), 29);
        for (idx, day) in expansion.daily_plans.iter().enumerate() {
            assert_eq!(day.plan_date.day(), idx as u32 + 1);
            assert_eq!(day.plan_date.month(), 2);
        }
    }

    #[test]
    fn test_recurrence_holds_with_fractional_shares() {
        let mut input = november_2025();
        input.plan_month = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        input.total_ore_target = 1_000_000.0;
        input.total_ore_shipment_target = 1_234_567.0;
        let expansion = PlanExpansionOrchestrator::default().expand(&input).unwrap();
        let plans = &expansion.daily_plans;
        assert_eq!(plans[0].daily_old_stock, 100_000.0);
        for i in 1..plans.len() {
            assert_eq!(plans[i].daily_old_stock, plans[i - 1].remaining_stock);
        }
    }

    #[test]
    fn test_shift_values_are_half_of_day_values() {
        let mut input = november_2025();
        input.total_ob_target = 1_000_000.0;
        input.total_ore_target = 333_333.0;
        let expansion = PlanExpansionOrchestrator::default().expand(&input).unwrap();
        for day in &expansion.daily_plans {
            assert_eq!(day.shift_ob_target * 2.0, day.day_ob_target);
            assert_eq!(day.shift_ore_target * 2.0, day.day_ore_target);
            assert_eq!(day.shift_quarry_target * 2.0, day.day_quarry_target);
        }
    }

    #[test]
    fn test_zero_ore_gives_undefined_ratios_everywhere() {
        let mut input = november_2025();
        input.total_ore_target = 0.0;
        let expansion = PlanExpansionOrchestrator::default().expand(&input).unwrap();
        assert_eq!(expansion.summary.total_sr_target, Ratio::Undefined);
        for day in &expansion.daily_plans {
            assert_eq!(day.sr_target, Ratio::Undefined);
            assert_eq!(day.shift_sr_target, Ratio::Undefined);
        }
    }

    #[test]
    fn test_summary_carries_validated_opening_stock() {
        let mut input = november_2025();
        input.total_sisa_stock = Some(250);
        let expansion = PlanExpansionOrchestrator::default().expand(&input).unwrap();
        assert_eq!(expansion.summary.opening_stock, 250);
        assert_eq!(expansion.daily_plans[0].daily_old_stock, 250.0);
    }

    #[test]
    fn test_missing_opening_stock_returns_no_rows() {
        let mut input = november_2025();
        input.total_sisa_stock = None;
        let result = PlanExpansionOrchestrator::default().expand(&input);
        assert_eq!(result, Err(EngineError::MissingOpeningStock));
    }

    #[test]
    fn test_plan_month_must_be_first_of_month() {
        let mut input = november_2025();
        input.plan_month = NaiveDate::from_ymd_opt(2025, 11, 15).unwrap();
        let err = PlanExpansionOrchestrator::default().expand(&input).unwrap_err();
        assert_eq!(err.kind(), "InvalidCalendarInput");
        assert_eq!(err.field(), Some("plan_month"));
    }

    #[test]
    fn test_negative_total_rejected_with_field() {
        let mut input = november_2025();
        input.total_quarry_target = -1.0;
        let err = PlanExpansionOrchestrator::default().expand(&input).unwrap_err();
        assert_eq!(err.field(), Some("total_quarry_target"));

        let mut input = november_2025();
        input.total_fleet = -3;
        let err = PlanExpansionOrchestrator::default().expand(&input).unwrap_err();
        assert_eq!(err.field(), Some("total_fleet"));
    }

    #[test]
    fn test_custom_holiday_profile() {
        let profile = ExpansionProfile {
            rounding_scale: 2,
            rounding_mode: RoundingMode::HalfEven,
            holiday_weekdays: vec![Weekday::Sat, Weekday::Sun],
        };
        let expansion = PlanExpansionOrchestrator::new(profile)
            .expand(&november_2025())
            .unwrap();
        // 2025-11: 周六 5 天 + 周日 5 天
        assert_eq!(expansion.summary.total_holiday_days, 10);
        assert_eq!(expansion.summary.total_available_days, 20);
        let holidays = expansion.daily_plans.iter().filter(|d| d.is_holiday_day).count();
        assert_eq!(holidays as u32, expansion.summary.total_holiday_days);
    }

    #[test]
    fn test_expansion_is_deterministic() {
        let orchestrator = PlanExpansionOrchestrator::default();
        let a = orchestrator.expand(&november_2025()).unwrap();
        let b = orchestrator.expand(&november_2025()).unwrap();
        assert_eq!(a, b);
    }
}
