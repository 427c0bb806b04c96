// ==========================================
// 矿山生产计划 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::expansion_profile::{
    format_holiday_weekdays, parse_holiday_weekdays, ExpansionProfile, RoundingMode,
    DEFAULT_ROUNDING_SCALE,
};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// 取整位数上限 (防止 10^scale 溢出为 inf)
const MAX_ROUNDING_SCALE: u32 = 6;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 从已有连接创建 ConfigManager
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            crate::db::configure_sqlite_connection(&guard)?;
        }
        Ok(Self { conn })
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 读取 global scope 的配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入 global scope 配置 (UPSERT)
    pub fn set_global_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        debug!(key, value, "配置已更新");
        Ok(())
    }

    /// 获取所有配置的快照（JSON格式）
    ///
    /// # 用途
    /// - 每次展开落库时随月度计划保存, 便于审计当时的参数
    pub fn get_config_snapshot(&self) -> RepositoryResult<String> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        serde_json::to_string(&json!(config_map))
            .map_err(|e| RepositoryError::InternalError(e.to_string()))
    }

    // ===== 计划展开参数 =====

    /// 组装展开引擎参数; 未配置的键取默认值
    pub fn get_expansion_profile(&self) -> RepositoryResult<ExpansionProfile> {
        let defaults = ExpansionProfile::default();

        let rounding_scale = match self.get_global_config_value(config_keys::PLAN_ROUNDING_SCALE)? {
            Some(raw) => {
                let scale = raw.trim().parse::<u32>().map_err(|_| RepositoryError::FieldValueError {
                    field: config_keys::PLAN_ROUNDING_SCALE.to_string(),
                    message: format!("无法解析为非负整数: {}", raw),
                })?;
                if scale > MAX_ROUNDING_SCALE {
                    return Err(RepositoryError::FieldValueError {
                        field: config_keys::PLAN_ROUNDING_SCALE.to_string(),
                        message: format!("取值超出范围 [0, {}]: {}", MAX_ROUNDING_SCALE, scale),
                    });
                }
                scale
            }
            None => DEFAULT_ROUNDING_SCALE,
        };

        let rounding_mode = match self.get_global_config_value(config_keys::PLAN_ROUNDING_MODE)? {
            Some(raw) => raw
                .parse::<RoundingMode>()
                .map_err(|message| RepositoryError::FieldValueError {
                    field: config_keys::PLAN_ROUNDING_MODE.to_string(),
                    message,
                })?,
            None => defaults.rounding_mode,
        };

        let holiday_weekdays =
            match self.get_global_config_value(config_keys::PLAN_HOLIDAY_WEEKDAYS)? {
                Some(raw) => parse_holiday_weekdays(&raw).map_err(|message| {
                    RepositoryError::FieldValueError {
                        field: config_keys::PLAN_HOLIDAY_WEEKDAYS.to_string(),
                        message,
                    }
                })?,
                None => defaults.holiday_weekdays,
            };

        Ok(ExpansionProfile {
            rounding_scale,
            rounding_mode,
            holiday_weekdays,
        })
    }

    /// 保存展开引擎参数
    pub fn save_expansion_profile(&self, profile: &ExpansionProfile) -> RepositoryResult<()> {
        self.set_global_config_value(
            config_keys::PLAN_ROUNDING_SCALE,
            &profile.rounding_scale.to_string(),
        )?;
        self.set_global_config_value(
            config_keys::PLAN_ROUNDING_MODE,
            &profile.rounding_mode.to_string(),
        )?;
        self.set_global_config_value(
            config_keys::PLAN_HOLIDAY_WEEKDAYS,
            &format_holiday_weekdays(&profile.holiday_weekdays),
        )?;
        Ok(())
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 计划展开
    pub const PLAN_ROUNDING_SCALE: &str = "plan_rounding_scale"; // 输出保留小数位
    pub const PLAN_ROUNDING_MODE: &str = "plan_rounding_mode"; // HALF_UP / HALF_EVEN
    pub const PLAN_HOLIDAY_WEEKDAYS: &str = "plan_holiday_weekdays"; // 例: SUN 或 SAT,SUN
}
