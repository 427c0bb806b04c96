// ==========================================
// 矿山生产计划 - 应用层
// ==========================================
// 职责: 组装仓储/API, 供命令行入口使用
// ==========================================

pub mod state;

pub use state::{get_default_db_path, AppState};
