// ==========================================
// 矿山生产计划 - 比值推导
// ==========================================
// 用途: 剥采比 SR = OB / Ore (月/日/班三级, 各自独立)
// 红线: 分母为 0 或缺失 → Ratio::Undefined, 不产生 NaN/Infinity
// ==========================================

use crate::domain::types::Ratio;

/// 计算比值
pub fn ratio(numerator: f64, denominator: f64) -> Ratio {
    if denominator == 0.0 || !denominator.is_finite() || !numerator.is_finite() {
        return Ratio::Undefined;
    }
    Ratio::Defined(numerator / denominator)
}

/// 剥采比 (OB / Ore)
pub fn stripping_ratio(ob_target: f64, ore_target: f64) -> Ratio {
    ratio(ob_target, ore_target)
}
