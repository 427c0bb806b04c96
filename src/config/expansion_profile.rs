// ==========================================
// 矿山生产计划 - 计划展开参数
// ==========================================
// 存储: config_kv (plan_rounding_scale / plan_rounding_mode / plan_holiday_weekdays)
// ==========================================

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 默认保留小数位
pub const DEFAULT_ROUNDING_SCALE: u32 = 2;

// ==========================================
// RoundingMode - 取整方式
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoundingMode {
    /// 四舍五入 (远离零)
    HalfUp,
    /// 银行家舍入 (四舍六入五成双)
    HalfEven,
}

impl RoundingMode {
    /// 按指定小数位取整
    pub fn round(&self, value: f64, scale: u32) -> f64 {
        let factor = 10f64.powi(scale as i32);
        let scaled = value * factor;
        let rounded = match self {
            RoundingMode::HalfUp => scaled.round(),
            RoundingMode::HalfEven => scaled.round_ties_even(),
        };
        rounded / factor
    }
}

impl FromStr for RoundingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "HALF_UP" => Ok(RoundingMode::HalfUp),
            "HALF_EVEN" => Ok(RoundingMode::HalfEven),
            other => Err(format!("未知取整方式: {}", other)),
        }
    }
}

impl fmt::Display for RoundingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoundingMode::HalfUp => write!(f, "HALF_UP"),
            RoundingMode::HalfEven => write!(f, "HALF_EVEN"),
        }
    }
}

// ==========================================
// ExpansionProfile - 展开引擎参数快照
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct ExpansionProfile {
    pub rounding_scale: u32,
    pub rounding_mode: RoundingMode,
    /// 非工作日 (默认周日)
    pub holiday_weekdays: Vec<Weekday>,
}

impl Default for ExpansionProfile {
    fn default() -> Self {
        Self {
            rounding_scale: DEFAULT_ROUNDING_SCALE,
            rounding_mode: RoundingMode::HalfUp,
            holiday_weekdays: vec![Weekday::Sun],
        }
    }
}

impl ExpansionProfile {
    /// 对输出值取整
    pub fn round(&self, value: f64) -> f64 {
        self.rounding_mode.round(value, self.rounding_scale)
    }
}

/// 解析 "SUN,SAT" 形式的休息日配置
pub fn parse_holiday_weekdays(raw: &str) -> Result<Vec<Weekday>, String> {
    let mut days = Vec::new();
    for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let day = token
            .parse::<Weekday>()
            .map_err(|_| format!("无法识别的星期: {}", token))?;
        if !days.contains(&day) {
            days.push(day);
        }
    }
    Ok(days)
}

/// 序列化为配置值
pub fn format_holiday_weekdays(days: &[Weekday]) -> String {
    days.iter()
        .map(|d| d.to_string().to_uppercase())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_up_vs_half_even() {
        assert_eq!(RoundingMode::HalfUp.round(2.5, 0), 3.0);
        assert_eq!(RoundingMode::HalfEven.round(2.5, 0), 2.0);
        assert_eq!(RoundingMode::HalfEven.round(3.5, 0), 4.0);
        assert_eq!(RoundingMode::HalfUp.round(-2.5, 0), -3.0);
        assert_eq!(RoundingMode::HalfUp.round(33333.3333, 2), 33333.33);
    }

    #[test]
    fn test_parse_rounding_mode() {
        assert_eq!("half_up".parse::<RoundingMode>(), Ok(RoundingMode::HalfUp));
        assert_eq!(" HALF_EVEN ".parse::<RoundingMode>(), Ok(RoundingMode::HalfEven));
        assert!("CEIL".parse::<RoundingMode>().is_err());
    }

    #[test]
    fn test_holiday_weekdays_round_trip() {
        let days = parse_holiday_weekdays("SUN, sat ,Sun").unwrap();
        assert_eq!(days, vec![Weekday::Sun, Weekday::Sat]);
        assert_eq!(format_holiday_weekdays(&days), "SUN,SAT");
        assert!(parse_holiday_weekdays("FUNDAY").is_err());
        assert!(parse_holiday_weekdays("").unwrap().is_empty());
    }
}
