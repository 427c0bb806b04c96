// ==========================================
// 矿山生产计划 - 月度计划数据仓储
// ==========================================
// 红线: 月度计划与其全部日计划在同一事务内写入
// 约束: 每个 plan_month 仅一个有效 (未软删除) 计划
// ==========================================

use crate::domain::plan::{DailyPlan, ParentPlan};
use crate::domain::types::Ratio;
use crate::repository::daily_plan_repo::insert_daily_plans;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

const PARENT_PLAN_COLUMNS: &str = r#"
    parent_plan_id, plan_month,
    total_calendar_days, total_holiday_days, total_available_days, total_sr_target,
    total_average_month_ewh, total_ob_target, total_ore_target, total_quarry_target,
    total_ore_shipment_target, total_fleet, total_sisa_stock,
    config_snapshot_json, created_by, created_at, deleted_at
"#;

fn map_parent_plan(row: &Row<'_>) -> SqliteResult<ParentPlan> {
    Ok(ParentPlan {
        parent_plan_id: row.get(0)?,
        plan_month: row.get(1)?,
        total_calendar_days: row.get(2)?,
        total_holiday_days: row.get(3)?,
        total_available_days: row.get(4)?,
        total_sr_target: Ratio::from_nullable(row.get(5)?),
        total_average_month_ewh: row.get(6)?,
        total_ob_target: row.get(7)?,
        total_ore_target: row.get(8)?,
        total_quarry_target: row.get(9)?,
        total_ore_shipment_target: row.get(10)?,
        total_fleet: row.get(11)?,
        total_sisa_stock: row.get(12)?,
        config_snapshot_json: row.get(13)?,
        created_by: row.get(14)?,
        created_at: row.get(15)?,
        deleted_at: row.get(16)?,
    })
}

fn insert_parent_plan(conn: &Connection, plan: &ParentPlan) -> RepositoryResult<()> {
    conn.execute(
        r#"
        INSERT INTO parent_plan (
            parent_plan_id, plan_month,
            total_calendar_days, total_holiday_days, total_available_days, total_sr_target,
            total_average_month_ewh, total_ob_target, total_ore_target, total_quarry_target,
            total_ore_shipment_target, total_fleet, total_sisa_stock,
            config_snapshot_json, created_by, created_at, deleted_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)
        "#,
        params![
            plan.parent_plan_id,
            plan.plan_month,
            plan.total_calendar_days,
            plan.total_holiday_days,
            plan.total_available_days,
            plan.total_sr_target.value(),
            plan.total_average_month_ewh,
            plan.total_ob_target,
            plan.total_ore_target,
            plan.total_quarry_target,
            plan.total_ore_shipment_target,
            plan.total_fleet,
            plan.total_sisa_stock,
            plan.config_snapshot_json,
            plan.created_by,
            plan.created_at,
            plan.deleted_at,
        ],
    )?;
    Ok(())
}

/// 写入前检查日计划批次完整性
fn check_batch(plan: &ParentPlan, daily_plans: &[DailyPlan]) -> RepositoryResult<()> {
    if daily_plans.len() as u32 != plan.total_calendar_days {
        return Err(RepositoryError::BusinessRuleViolation(format!(
            "日计划条数({})与月天数({})不一致",
            daily_plans.len(),
            plan.total_calendar_days
        )));
    }
    Ok(())
}

fn begin_failed(err: rusqlite::Error) -> RepositoryError {
    RepositoryError::DatabaseTransactionError(format!("开启事务失败: {}", err))
}

fn commit_failed(err: rusqlite::Error) -> RepositoryError {
    RepositoryError::DatabaseTransactionError(format!("提交事务失败: {}", err))
}

// ==========================================
// ParentPlanRepository - 月度计划仓储
// ==========================================
pub struct ParentPlanRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ParentPlanRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 原子写入月度计划及其全部日计划
    ///
    /// # 返回
    /// - Ok(()): 全部写入
    /// - Err(UniqueConstraintViolation): 该月已有有效计划
    /// - Err: 其他错误, 事务回滚, 不留部分数据
    pub fn insert_with_daily_plans(
        &self,
        plan: &ParentPlan,
        daily_plans: &[DailyPlan],
    ) -> RepositoryResult<()> {
        check_batch(plan, daily_plans)?;

        let mut conn = self.get_conn()?;
        let tx = conn.transaction().map_err(begin_failed)?;
        insert_parent_plan(&tx, plan)?;
        let inserted = insert_daily_plans(&tx, &plan.parent_plan_id, daily_plans)?;
        tx.commit().map_err(commit_failed)?;

        info!(
            parent_plan_id = %plan.parent_plan_id,
            plan_month = %plan.plan_month,
            daily_count = inserted,
            "月度计划已落库"
        );
        Ok(())
    }

    /// 以新展开结果替换当月有效计划
    ///
    /// 旧计划软删除, 新计划及日计划写入, 同一事务。
    ///
    /// # 返回
    /// 被替换的旧计划ID (当月无有效计划时为 None)
    pub fn replace_active_for_month(
        &self,
        plan: &ParentPlan,
        daily_plans: &[DailyPlan],
    ) -> RepositoryResult<Option<String>> {
        check_batch(plan, daily_plans)?;

        let mut conn = self.get_conn()?;
        let tx = conn.transaction().map_err(begin_failed)?;

        let previous: Option<String> = tx
            .query_row(
                "SELECT parent_plan_id FROM parent_plan WHERE plan_month = ?1 AND deleted_at IS NULL",
                params![plan.plan_month],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(previous_id) = &previous {
            tx.execute(
                "UPDATE parent_plan SET deleted_at = ?1 WHERE parent_plan_id = ?2",
                params![plan.created_at, previous_id],
            )?;
        }

        insert_parent_plan(&tx, plan)?;
        insert_daily_plans(&tx, &plan.parent_plan_id, daily_plans)?;
        tx.commit().map_err(commit_failed)?;

        info!(
            parent_plan_id = %plan.parent_plan_id,
            replaced = ?previous,
            plan_month = %plan.plan_month,
            "月度计划已替换"
        );
        Ok(previous)
    }

    /// 按ID查询 (含已软删除)
    pub fn find_by_id(&self, parent_plan_id: &str) -> RepositoryResult<Option<ParentPlan>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM parent_plan WHERE parent_plan_id = ?1",
            PARENT_PLAN_COLUMNS
        );
        let plan = conn
            .query_row(&sql, params![parent_plan_id], map_parent_plan)
            .optional()?;
        Ok(plan)
    }

    /// 查询某月有效计划
    pub fn find_active_by_month(&self, plan_month: NaiveDate) -> RepositoryResult<Option<ParentPlan>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM parent_plan WHERE plan_month = ?1 AND deleted_at IS NULL",
            PARENT_PLAN_COLUMNS
        );
        let plan = conn
            .query_row(&sql, params![plan_month], map_parent_plan)
            .optional()?;
        Ok(plan)
    }

    /// 分页查询有效计划 (按月份倒序)
    ///
    /// # 参数
    /// - page: 页码, 从1开始
    /// - page_size: 每页条数
    ///
    /// # 返回
    /// (当前页数据, 总条数)
    pub fn list_active(&self, page: u32, page_size: u32) -> RepositoryResult<(Vec<ParentPlan>, i64)> {
        let conn = self.get_conn()?;
        let total: i64 = conn.query_row(
            "SELECT COUNT(*) FROM parent_plan WHERE deleted_at IS NULL",
            [],
            |row| row.get(0),
        )?;

        let offset = i64::from(page.saturating_sub(1)) * i64::from(page_size);
        let sql = format!(
            "SELECT {} FROM parent_plan WHERE deleted_at IS NULL
             ORDER BY plan_month DESC LIMIT ?1 OFFSET ?2",
            PARENT_PLAN_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let plans = stmt
            .query_map(params![i64::from(page_size), offset], map_parent_plan)?
            .collect::<SqliteResult<Vec<ParentPlan>>>()?;

        Ok((plans, total))
    }

    /// 软删除 (保留审计轨迹)
    pub fn soft_delete(&self, parent_plan_id: &str, deleted_at: NaiveDateTime) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE parent_plan SET deleted_at = ?1 WHERE parent_plan_id = ?2 AND deleted_at IS NULL",
            params![deleted_at, parent_plan_id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "ParentPlan".to_string(),
                id: parent_plan_id.to_string(),
            });
        }
        debug!(parent_plan_id, "月度计划已软删除");
        Ok(())
    }

    /// 物理删除 (级联删除日计划)
    pub fn purge(&self, parent_plan_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM parent_plan WHERE parent_plan_id = ?1",
            params![parent_plan_id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "ParentPlan".to_string(),
                id: parent_plan_id.to_string(),
            });
        }
        info!(parent_plan_id, "月度计划已物理删除");
        Ok(())
    }
}
