// ==========================================
// 矿山生产计划 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 原则: 任何错误都中止整次展开, 不输出部分日计划
// ==========================================

use crate::domain::types::ExpansionStage;
use thiserror::Error;

/// 展开引擎错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    // ===== 输入契约违反 =====
    #[error("无效的日历输入: year={year}, month={month}: {message}")]
    InvalidCalendarInput {
        year: i32,
        month: u32,
        message: String,
    },

    #[error("无效的分摊天数: day_count={day_count}")]
    InvalidApportionment { day_count: i64 },

    #[error("字段取值无效 (field={field}): {message}")]
    InvalidPlanField { field: String, message: String },

    // ===== 业务数据缺失 =====
    #[error("缺少月初库存: total_sisa_stock 未提供")]
    MissingOpeningStock,

    // ===== 内部状态机 =====
    #[error("无效的展开阶段迁移: from={from} to={to}")]
    InvalidStageTransition {
        from: ExpansionStage,
        to: ExpansionStage,
    },
}

impl EngineError {
    /// 错误类别标签 (供调用方展示)
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::InvalidCalendarInput { .. } => "InvalidCalendarInput",
            EngineError::InvalidApportionment { .. } => "InvalidApportionment",
            EngineError::InvalidPlanField { .. } => "InvalidPlanField",
            EngineError::MissingOpeningStock => "MissingOpeningStock",
            EngineError::InvalidStageTransition { .. } => "InvalidStageTransition",
        }
    }

    /// 出错字段 (若可定位)
    pub fn field(&self) -> Option<&str> {
        match self {
            EngineError::InvalidCalendarInput { .. } => Some("plan_month"),
            EngineError::InvalidPlanField { field, .. } => Some(field.as_str()),
            EngineError::MissingOpeningStock => Some("total_sisa_stock"),
            _ => None,
        }
    }
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
