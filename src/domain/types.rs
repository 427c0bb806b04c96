// ==========================================
// 矿山生产计划 - 领域类型定义
// ==========================================
// 职责: 比值、展开阶段、计划状态等值类型
// 红线: 除零比值必须显式建模, 不得落库浮点哨兵值
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// Ratio - 剥采比等派生比值
// ==========================================
/// 比值结果
///
/// 分母为 0 或缺失时为 `Undefined`, 调用方必须显式处理,
/// 不能参与算术, 也不能以 NaN/Infinity/0 落库。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Ratio {
    Defined(f64),
    Undefined,
}

impl Ratio {
    pub fn is_defined(&self) -> bool {
        matches!(self, Ratio::Defined(_))
    }

    /// 转为可空数值 (落库: Undefined → NULL)
    pub fn value(&self) -> Option<f64> {
        match self {
            Ratio::Defined(v) => Some(*v),
            Ratio::Undefined => None,
        }
    }

    /// 从可空列还原
    pub fn from_nullable(value: Option<f64>) -> Self {
        match value {
            Some(v) if v.is_finite() => Ratio::Defined(v),
            _ => Ratio::Undefined,
        }
    }

    /// 对已定义的值做映射 (例如取整), 未定义保持不变
    pub fn map<F: FnOnce(f64) -> f64>(self, f: F) -> Self {
        match self {
            Ratio::Defined(v) => Ratio::Defined(f(v)),
            Ratio::Undefined => Ratio::Undefined,
        }
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ratio::Defined(v) => write!(f, "{}", v),
            Ratio::Undefined => write!(f, "UNDEFINED"),
        }
    }
}

// ==========================================
// ExpansionStage - 计划展开状态机
// ==========================================
// Validated → Expanding → Accumulating → Finalized
// 任意状态 → Failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpansionStage {
    Validated,
    Expanding,
    Accumulating,
    Finalized,
    Failed,
}

impl ExpansionStage {
    /// 是否允许从当前状态迁移到 `next`
    pub fn can_transition_to(&self, next: ExpansionStage) -> bool {
        use ExpansionStage::*;
        match (self, next) {
            (Finalized, _) | (Failed, _) => false,
            (_, Failed) => true,
            (Validated, Expanding) => true,
            (Expanding, Accumulating) => true,
            (Accumulating, Finalized) => true,
            _ => false,
        }
    }
}

impl fmt::Display for ExpansionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExpansionStage::Validated => "VALIDATED",
            ExpansionStage::Expanding => "EXPANDING",
            ExpansionStage::Accumulating => "ACCUMULATING",
            ExpansionStage::Finalized => "FINALIZED",
            ExpansionStage::Failed => "FAILED",
        };
        write!(f, "{}", s)
    }
}

// ==========================================
// PlanStatus - 月度计划记录状态
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanStatus {
    /// 当前生效
    Active,
    /// 已软删除 (保留审计轨迹)
    Deleted,
}

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanStatus::Active => write!(f, "ACTIVE"),
            PlanStatus::Deleted => write!(f, "DELETED"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_nullable_mapping() {
        assert_eq!(Ratio::Defined(1.5).value(), Some(1.5));
        assert_eq!(Ratio::Undefined.value(), None);
        assert_eq!(Ratio::from_nullable(None), Ratio::Undefined);
        assert_eq!(Ratio::from_nullable(Some(f64::NAN)), Ratio::Undefined);
        assert_eq!(Ratio::from_nullable(Some(2.0)), Ratio::Defined(2.0));
    }

    #[test]
    fn test_ratio_serde_is_tagged() {
        let json = serde_json::to_string(&Ratio::Undefined).unwrap();
        assert_eq!(json, r#"{"kind":"UNDEFINED"}"#);
        let json = serde_json::to_string(&Ratio::Defined(3.0)).unwrap();
        assert_eq!(json, r#"{"kind":"DEFINED","value":3.0}"#);
    }

    #[test]
    fn test_stage_transitions() {
        use ExpansionStage::*;
        assert!(Validated.can_transition_to(Expanding));
        assert!(Expanding.can_transition_to(Accumulating));
        assert!(Accumulating.can_transition_to(Finalized));
        assert!(Expanding.can_transition_to(Failed));

        assert!(!Validated.can_transition_to(Accumulating));
        assert!(!Accumulating.can_transition_to(Expanding));
        assert!(!Finalized.can_transition_to(Failed));
        assert!(!Failed.can_transition_to(Validated));
    }
}
