// ==========================================
// 矿山生产计划 - 请求校验器
// ==========================================
// 职责: 进入展开引擎前的字段类型/范围校验, 一次性收集全部违规
// 说明: 月初库存缺失不在此拦截, 由引擎以 MissingOpeningStock 单独报告
// ==========================================

use crate::api::error::{ApiError, ApiResult, FieldViolation};
use crate::domain::plan::ParentPlanInput;
use chrono::Datelike;

/// 月度计划输入校验器
#[derive(Debug, Default, Clone)]
pub struct PlanInputValidator;

impl PlanInputValidator {
    pub fn new() -> Self {
        Self
    }

    /// 校验月度计划输入
    ///
    /// # 返回
    /// - Ok(()): 校验通过
    /// - Err(ApiError::ValidationError): 列出全部违规字段
    pub fn validate(&self, input: &ParentPlanInput) -> ApiResult<()> {
        let mut violations = Vec::new();

        if input.plan_month.day() != 1 {
            violations.push(FieldViolation {
                field: "plan_month".to_string(),
                message: format!("必须为当月1日, 实际为 {}", input.plan_month),
            });
        }

        let totals = [
            ("total_average_month_ewh", input.total_average_month_ewh),
            ("total_ob_target", input.total_ob_target),
            ("total_ore_target", input.total_ore_target),
            ("total_quarry_target", input.total_quarry_target),
            ("total_ore_shipment_target", input.total_ore_shipment_target),
        ];
        for (field, value) in totals {
            if !value.is_finite() || value < 0.0 {
                violations.push(FieldViolation {
                    field: field.to_string(),
                    message: format!("必须为非负数值, 实际为 {}", value),
                });
            }
        }

        if input.total_fleet < 0 {
            violations.push(FieldViolation {
                field: "total_fleet".to_string(),
                message: format!("必须为非负整数, 实际为 {}", input.total_fleet),
            });
        }

        if let Some(stock) = input.total_sisa_stock {
            if stock < 0 {
                violations.push(FieldViolation {
                    field: "total_sisa_stock".to_string(),
                    message: format!("必须为非负整数, 实际为 {}", stock),
                });
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ApiError::ValidationError {
                reason: format!("月度计划 {} 存在 {} 处字段错误", input.plan_month, violations.len()),
                violations,
            })
        }
    }
}
