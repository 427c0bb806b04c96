// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、测试数据生成等功能
// ==========================================
#![allow(dead_code)]

use chrono::NaiveDate;
use mine_production_plan::app::AppState;
use mine_production_plan::domain::plan::ParentPlanInput;
use std::error::Error;
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    mine_production_plan::logging::init_test();

    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file
        .path()
        .to_str()
        .ok_or("临时文件路径非 UTF-8")?
        .to_string();

    let conn = mine_production_plan::db::open_sqlite_connection(&db_path)?;
    mine_production_plan::db::init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 创建完整的应用状态 (临时库)
pub fn create_test_state() -> Result<(NamedTempFile, AppState), Box<dyn Error>> {
    let (temp_file, db_path) = create_test_db()?;
    let state = AppState::new(db_path)?;
    Ok((temp_file, state))
}

/// 构造月度计划输入
pub fn plan_input(year: i32, month: u32) -> ParentPlanInput {
    ParentPlanInput {
        plan_month: NaiveDate::from_ymd_opt(year, month, 1).unwrap(),
        total_average_month_ewh: 620.0,
        total_ob_target: 3_000_000.0,
        total_ore_target: 750_000.0,
        total_quarry_target: 90_000.0,
        total_ore_shipment_target: 600_000.0,
        total_fleet: 12,
        total_sisa_stock: Some(100_000),
        created_by: Some("TEST".to_string()),
    }
}
