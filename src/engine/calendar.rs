// ==========================================
// 矿山生产计划 - 日历工具
// ==========================================
// 职责: 月天数、休息日判定、月内日期枚举
// 无状态, 纯函数
// ==========================================

use crate::engine::error::{EngineError, EngineResult};
use chrono::{Datelike, NaiveDate, Weekday};

fn check_month(year: i32, month: u32) -> EngineResult<()> {
    if !(1..=12).contains(&month) {
        return Err(EngineError::InvalidCalendarInput {
            year,
            month,
            message: "月份必须在 1-12 之间".to_string(),
        });
    }
    Ok(())
}

/// 闰年: 能被4整除且不能被100整除, 或能被400整除
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// 当月天数 (28-31)
pub fn days_in_month(year: i32, month: u32) -> EngineResult<u32> {
    check_month(year, month)?;
    let days = match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        _ if is_leap_year(year) => 29,
        _ => 28,
    };
    Ok(days)
}

/// 是否为休息日 (由配置的星期集合决定, 默认仅周日)
pub fn is_holiday(date: NaiveDate, holiday_weekdays: &[Weekday]) -> bool {
    holiday_weekdays.contains(&date.weekday())
}

/// 当月第几天
pub fn day_of_month(date: NaiveDate) -> u32 {
    date.day()
}

/// 校验计划月份为当月1日
pub fn ensure_first_of_month(date: NaiveDate) -> EngineResult<()> {
    if date.day() != 1 {
        return Err(EngineError::InvalidCalendarInput {
            year: date.year(),
            month: date.month(),
            message: format!("计划月份必须为当月1日, 实际为 {}", date),
        });
    }
    Ok(())
}

/// 按升序枚举当月所有日期
pub fn month_dates(year: i32, month: u32) -> EngineResult<Vec<NaiveDate>> {
    let days = days_in_month(year, month)?;
    (1..=days)
        .map(|day| {
            NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
                EngineError::InvalidCalendarInput {
                    year,
                    month,
                    message: format!("日期超出范围: day={}", day),
                }
            })
        })
        .collect()
}
