// ==========================================
// 矿山生产计划 - 分摊计算器
// ==========================================
// 职责: 月度总量 → 日分摊 → 班次分摊
// 红线: 内部保持全精度, 仅输出值取整
// ==========================================

use crate::domain::plan::SHIFTS_PER_DAY;
use crate::engine::error::{EngineError, EngineResult};

/// 日分摊 (全精度)
pub fn per_day(monthly_total: f64, day_count: u32) -> EngineResult<f64> {
    if day_count == 0 {
        return Err(EngineError::InvalidApportionment { day_count: 0 });
    }
    Ok(monthly_total / day_count as f64)
}

/// 班次分摊
///
/// 传入已取整的日值时, 结果乘2严格等于日值 (除以2在二进制浮点下精确)。
pub fn per_shift(day_value: f64) -> f64 {
    day_value / SHIFTS_PER_DAY as f64
}

// ==========================================
// DayShare - 单项指标的日/班分摊
// ==========================================
/// 单项指标的日分摊结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayShare {
    /// 全精度日值 (供结转计算)
    pub exact: f64,
    /// 输出日值 (已取整)
    pub emitted: f64,
    /// 输出班次值 (= emitted / 2)
    pub shift: f64,
}

/// 计算一项指标的日分摊与班次分摊
pub fn share<R>(monthly_total: f64, day_count: u32, round: R) -> EngineResult<DayShare>
where
    R: Fn(f64) -> f64,
{
    let exact = per_day(monthly_total, day_count)?;
    let emitted = round(exact);
    Ok(DayShare {
        exact,
        emitted,
        shift: per_shift(emitted),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RoundingMode;

    fn round2(v: f64) -> f64 {
        RoundingMode::HalfUp.round(v, 2)
    }

    #[test]
    fn test_per_day_full_precision() {
        let v = per_day(1_000_000.0, 30).unwrap();
        assert!((v - 33_333.333_333).abs() < 1e-5);
    }

    #[test]
    fn test_per_day_zero_days_rejected() {
        assert_eq!(
            per_day(100.0, 0),
            Err(EngineError::InvalidApportionment { day_count: 0 })
        );
    }

    #[test]
    fn test_shift_split_exact_after_rounding() {
        for total in [1_000_000.0, 999_999.99, 750_000.0, 12_345.67, 1.0] {
            for days in [28, 29, 30, 31] {
                let s = share(total, days, round2).unwrap();
                assert_eq!(s.shift * 2.0, s.emitted);
            }
        }
    }

    #[test]
    fn test_conservation_within_rounding_tolerance() {
        let total = 1_234_567.89;
        let s = share(total, 31, round2).unwrap();
        let sum = s.emitted * 31.0;
        assert!((sum - total).abs() <= 31.0 * 0.01);
    }
}
