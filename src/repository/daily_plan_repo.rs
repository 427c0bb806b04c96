// ==========================================
// 矿山生产计划 - 日计划数据仓储
// ==========================================
// 红线: 日计划只随月度计划整批写入 (见 ParentPlanRepository),
//       本仓储只提供查询
// ==========================================

use crate::domain::plan::DailyPlan;
use crate::domain::types::Ratio;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex, MutexGuard};

const DAILY_PLAN_COLUMNS: &str = r#"
    plan_date, is_holiday_day,
    day_ewh, day_ob_target, day_ore_target, day_quarry_target, day_ore_shipment_target,
    shift_ob_target, shift_ore_target, shift_quarry_target, shift_sr_target,
    daily_old_stock, remaining_stock, sr_target
"#;

fn map_daily_plan(row: &Row<'_>) -> SqliteResult<DailyPlan> {
    Ok(DailyPlan {
        plan_date: row.get(0)?,
        is_holiday_day: row.get::<_, i32>(1)? != 0,
        day_ewh: row.get(2)?,
        day_ob_target: row.get(3)?,
        day_ore_target: row.get(4)?,
        day_quarry_target: row.get(5)?,
        day_ore_shipment_target: row.get(6)?,
        shift_ob_target: row.get(7)?,
        shift_ore_target: row.get(8)?,
        shift_quarry_target: row.get(9)?,
        shift_sr_target: Ratio::from_nullable(row.get(10)?),
        daily_old_stock: row.get(11)?,
        remaining_stock: row.get(12)?,
        sr_target: Ratio::from_nullable(row.get(13)?),
    })
}

/// 在调用方事务内批量写入日计划
///
/// 比值未定义时写 NULL。
pub(crate) fn insert_daily_plans(
    conn: &Connection,
    parent_plan_id: &str,
    daily_plans: &[DailyPlan],
) -> RepositoryResult<usize> {
    let mut stmt = conn.prepare(
        r#"
        INSERT INTO daily_plan (
            parent_plan_id, plan_date, is_calendar_day, is_holiday_day, is_available_day,
            day_ewh, day_ob_target, day_ore_target, day_quarry_target, day_ore_shipment_target,
            shift_ob_target, shift_ore_target, shift_quarry_target, shift_sr_target,
            daily_old_stock, remaining_stock, sr_target
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)
        "#,
    )?;

    let mut inserted = 0;
    for plan in daily_plans {
        inserted += stmt.execute(params![
            parent_plan_id,
            plan.plan_date,
            plan.is_calendar_day() as i32,
            plan.is_holiday_day as i32,
            plan.is_available_day() as i32,
            plan.day_ewh,
            plan.day_ob_target,
            plan.day_ore_target,
            plan.day_quarry_target,
            plan.day_ore_shipment_target,
            plan.shift_ob_target,
            plan.shift_ore_target,
            plan.shift_quarry_target,
            plan.shift_sr_target.value(),
            plan.daily_old_stock,
            plan.remaining_stock,
            plan.sr_target.value(),
        ])?;
    }
    Ok(inserted)
}

// ==========================================
// DailyPlanRepository - 日计划仓储
// ==========================================
pub struct DailyPlanRepository {
    conn: Arc<Mutex<Connection>>,
}

impl DailyPlanRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 按月度计划查询全部日计划 (按日期升序)
    pub fn find_by_parent(&self, parent_plan_id: &str) -> RepositoryResult<Vec<DailyPlan>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM daily_plan WHERE parent_plan_id = ?1 ORDER BY plan_date ASC",
            DAILY_PLAN_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let plans = stmt
            .query_map(params![parent_plan_id], map_daily_plan)?
            .collect::<SqliteResult<Vec<DailyPlan>>>()?;
        Ok(plans)
    }

    /// 查询某一天的日计划
    pub fn find_by_parent_and_date(
        &self,
        parent_plan_id: &str,
        plan_date: NaiveDate,
    ) -> RepositoryResult<Option<DailyPlan>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM daily_plan WHERE parent_plan_id = ?1 AND plan_date = ?2",
            DAILY_PLAN_COLUMNS
        );
        let plan = conn
            .query_row(&sql, params![parent_plan_id, plan_date], map_daily_plan)
            .optional()?;
        Ok(plan)
    }

    /// 统计某月度计划的日计划条数
    pub fn count_by_parent(&self, parent_plan_id: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM daily_plan WHERE parent_plan_id = ?1",
            params![parent_plan_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
