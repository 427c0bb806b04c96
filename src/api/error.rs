// ==========================================
// 矿山生产计划 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，将引擎/仓储/导入错误转换为带原因的业务错误
// 原则: 保留错误类别与出错字段, 不静默降级
// ==========================================

use crate::engine::error::EngineError;
use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 字段级校验违规
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 请求校验错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("数据验证失败: {reason}")]
    ValidationError {
        reason: String,
        violations: Vec<FieldViolation>,
    },

    // ==========================================
    // 计划展开错误
    // ==========================================
    #[error("计划展开失败 [{kind}]: {message}")]
    PlanExpansionFailed {
        kind: String,
        field: Option<String>,
        message: String,
    },

    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("数据冲突: {0}")]
    Conflict(String),

    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    // ==========================================
    // 导入错误
    // ==========================================
    #[error("文件导入失败: {message}")]
    ImportError {
        field: Option<String>,
        message: String,
    },

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),
}

impl ApiError {
    /// 错误类别 (用于导入报告等对外展示)
    pub fn kind(&self) -> &str {
        match self {
            ApiError::InvalidInput(_) => "InvalidInput",
            ApiError::ValidationError { .. } => "ValidationError",
            ApiError::PlanExpansionFailed { kind, .. } => kind.as_str(),
            ApiError::NotFound(_) => "NotFound",
            ApiError::Conflict(_) => "Conflict",
            ApiError::BusinessRuleViolation(_) => "BusinessRuleViolation",
            ApiError::DatabaseError(_) => "DatabaseError",
            ApiError::DatabaseConnectionError(_) => "DatabaseConnectionError",
            ApiError::DatabaseTransactionError(_) => "DatabaseTransactionError",
            ApiError::ImportError { .. } => "ImportError",
            ApiError::InternalError(_) => "InternalError",
        }
    }

    /// 出错字段 (多个时以逗号连接)
    pub fn field(&self) -> Option<String> {
        match self {
            ApiError::PlanExpansionFailed { field, .. } | ApiError::ImportError { field, .. } => {
                field.clone()
            }
            ApiError::ValidationError { violations, .. } if !violations.is_empty() => Some(
                violations
                    .iter()
                    .map(|v| v.field.as_str())
                    .collect::<Vec<_>>()
                    .join(","),
            ),
            _ => None,
        }
    }
}

// ==========================================
// 从 EngineError 转换
// ==========================================
impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        ApiError::PlanExpansionFailed {
            kind: err.kind().to_string(),
            field: err.field().map(str::to_string),
            message: err.to_string(),
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::Conflict(format!("数据重复: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("关联数据不存在: {}", msg))
            }
            RepositoryError::BusinessRuleViolation(msg) => ApiError::BusinessRuleViolation(msg),
            RepositoryError::FieldValueError { field, message } => ApiError::ValidationError {
                reason: format!("配置项 {} 取值无效", field),
                violations: vec![FieldViolation { field, message }],
            },
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
        }
    }
}

// ==========================================
// 从 ImportError 转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        ApiError::ImportError {
            field: err.field().map(str::to_string),
            message: err.to_string(),
        }
    }
}

/// API层Result类型别名
pub type ApiResult<T> = Result<T, ApiError>;
