// ==========================================
// 矿山生产计划 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{ImportApi, PlanApi};
use crate::config::ConfigManager;
use crate::db::{init_schema, open_sqlite_connection, read_schema_version, CURRENT_SCHEMA_VERSION};
use crate::repository::{
    DailyPlanRepository, ParentPlanRepository, RepositoryError, RepositoryResult,
};

/// 应用状态
///
/// 所有仓储共享同一连接
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 月度计划API
    pub plan_api: Arc<PlanApi>,

    /// 导入API
    pub import_api: Arc<ImportApi>,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 打开连接并建表（幂等）
    /// 2. 初始化所有Repository
    /// 3. 创建所有API实例
    pub fn new(db_path: String) -> RepositoryResult<Self> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path).map_err(|e| {
            RepositoryError::DatabaseConnectionError(format!("{}: {}", db_path, e))
        })?;
        init_schema(&conn)?;
        match read_schema_version(&conn)? {
            Some(v) if v == CURRENT_SCHEMA_VERSION => {}
            other => tracing::warn!(
                found = ?other,
                expected = CURRENT_SCHEMA_VERSION,
                "schema_version 与当前代码不一致"
            ),
        }
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let parent_plan_repo = Arc::new(ParentPlanRepository::from_connection(conn.clone()));
        let daily_plan_repo = Arc::new(DailyPlanRepository::from_connection(conn.clone()));
        let config_manager = Arc::new(ConfigManager::from_connection(conn)?);

        // ==========================================
        // 初始化API层
        // ==========================================
        let plan_api = Arc::new(PlanApi::new(
            parent_plan_repo,
            daily_plan_repo,
            config_manager.clone(),
        ));
        let import_api = Arc::new(ImportApi::new(plan_api.clone()));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            plan_api,
            import_api,
            config_manager,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先级: 环境变量 MINE_PLAN_DB_PATH > 用户数据目录 > 当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("MINE_PLAN_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./mine_production_plan.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("mine-production-plan");
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("mine_production_plan.db");
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unopenable_db_path_is_connection_error() {
        let result = AppState::new("/nonexistent-dir/mine/plan.db".to_string());
        assert!(matches!(
            result,
            Err(RepositoryError::DatabaseConnectionError(_))
        ));
    }

    #[test]
    fn test_default_db_path_prefers_env() {
        std::env::set_var("MINE_PLAN_DB_PATH", " /tmp/plan-env.db ");
        assert_eq!(get_default_db_path(), "/tmp/plan-env.db");
        std::env::remove_var("MINE_PLAN_DB_PATH");
    }
}
