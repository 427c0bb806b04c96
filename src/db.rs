// ==========================================
// 矿山生产计划 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为 (外键级联删除依赖 foreign_keys)
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 统一建表, 由唯一约束保证 "每月一个有效计划 / 每日一条日计划"
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 建表（幂等）
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    configure_sqlite_connection(conn)?;
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        CREATE TABLE IF NOT EXISTS parent_plan (
            parent_plan_id TEXT PRIMARY KEY,
            plan_month TEXT NOT NULL,
            total_calendar_days INTEGER NOT NULL,
            total_holiday_days INTEGER NOT NULL,
            total_available_days INTEGER NOT NULL,
            total_sr_target REAL,
            total_average_month_ewh REAL NOT NULL,
            total_ob_target REAL NOT NULL,
            total_ore_target REAL NOT NULL,
            total_quarry_target REAL NOT NULL,
            total_ore_shipment_target REAL NOT NULL,
            total_fleet INTEGER NOT NULL,
            total_sisa_stock INTEGER NOT NULL,
            config_snapshot_json TEXT,
            created_by TEXT,
            created_at TEXT NOT NULL,
            deleted_at TEXT,
            CHECK (total_available_days = total_calendar_days - total_holiday_days)
        );

        CREATE UNIQUE INDEX IF NOT EXISTS uq_parent_plan_active_month
            ON parent_plan(plan_month) WHERE deleted_at IS NULL;

        CREATE TABLE IF NOT EXISTS daily_plan (
            daily_plan_id INTEGER PRIMARY KEY AUTOINCREMENT,
            parent_plan_id TEXT NOT NULL
                REFERENCES parent_plan(parent_plan_id) ON DELETE CASCADE,
            plan_date TEXT NOT NULL,
            is_calendar_day INTEGER NOT NULL DEFAULT 1,
            is_holiday_day INTEGER NOT NULL,
            is_available_day INTEGER NOT NULL,
            day_ewh REAL NOT NULL,
            day_ob_target REAL NOT NULL,
            day_ore_target REAL NOT NULL,
            day_quarry_target REAL NOT NULL,
            day_ore_shipment_target REAL NOT NULL,
            shift_ob_target REAL NOT NULL,
            shift_ore_target REAL NOT NULL,
            shift_quarry_target REAL NOT NULL,
            shift_sr_target REAL,
            daily_old_stock REAL NOT NULL,
            remaining_stock REAL NOT NULL,
            sr_target REAL,
            UNIQUE (parent_plan_id, plan_date),
            CHECK (is_available_day = 1 - is_holiday_day)
        );

        CREATE INDEX IF NOT EXISTS idx_daily_plan_parent_date
            ON daily_plan(parent_plan_id, plan_date);
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}
