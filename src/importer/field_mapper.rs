// ==========================================
// 矿山生产计划 - 字段映射器
// ==========================================
// 职责: 原始行记录 → ParentPlanInput
// 表头: 支持中英文别名
// ==========================================

use crate::domain::plan::ParentPlanInput;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::RawRecord;
use chrono::NaiveDate;

// ==========================================
// 表头别名
// ==========================================
pub mod headers {
    pub const PLAN_MONTH: &[&str] = &["plan_month", "计划月份", "月份"];
    pub const TOTAL_AVERAGE_MONTH_EWH: &[&str] =
        &["total_average_month_ewh", "月有效工时", "ewh"];
    pub const TOTAL_OB_TARGET: &[&str] = &["total_ob_target", "剥离量目标", "ob_target"];
    pub const TOTAL_ORE_TARGET: &[&str] = &["total_ore_target", "矿石产量目标", "ore_target"];
    pub const TOTAL_QUARRY_TARGET: &[&str] = &["total_quarry_target", "采石目标", "quarry_target"];
    pub const TOTAL_ORE_SHIPMENT_TARGET: &[&str] = &[
        "total_ore_shipment_target",
        "矿石外运目标",
        "ore_shipment_target",
    ];
    pub const TOTAL_FLEET: &[&str] = &["total_fleet", "车队数量", "fleet"];
    pub const TOTAL_SISA_STOCK: &[&str] = &["total_sisa_stock", "月初库存", "sisa_stock"];
    pub const CREATED_BY: &[&str] = &["created_by", "创建人"];
}

// ==========================================
// PlanFieldMapper - 月度计划字段映射
// ==========================================
pub struct PlanFieldMapper;

impl PlanFieldMapper {
    /// 映射一行记录
    ///
    /// # 参数
    /// - record: 原始行
    /// - row: 文件中的行号 (表头为第1行)
    pub fn map_record(&self, record: &RawRecord, row: usize) -> ImportResult<ParentPlanInput> {
        let plan_month_raw = required(record, headers::PLAN_MONTH, row)?;
        let plan_month = parse_plan_month(&plan_month_raw).ok_or_else(|| {
            ImportError::DateFormatError {
                row,
                field: headers::PLAN_MONTH[0].to_string(),
                value: plan_month_raw.clone(),
            }
        })?;

        Ok(ParentPlanInput {
            plan_month,
            total_average_month_ewh: required_f64(record, headers::TOTAL_AVERAGE_MONTH_EWH, row)?,
            total_ob_target: required_f64(record, headers::TOTAL_OB_TARGET, row)?,
            total_ore_target: required_f64(record, headers::TOTAL_ORE_TARGET, row)?,
            total_quarry_target: required_f64(record, headers::TOTAL_QUARRY_TARGET, row)?,
            total_ore_shipment_target: required_f64(
                record,
                headers::TOTAL_ORE_SHIPMENT_TARGET,
                row,
            )?,
            total_fleet: required_i64(record, headers::TOTAL_FLEET, row)?,
            total_sisa_stock: optional_i64(record, headers::TOTAL_SISA_STOCK, row)?,
            created_by: lookup(record, headers::CREATED_BY),
        })
    }

    /// 读取行内的计划月份原文 (用于错误报告)
    pub fn raw_plan_month(&self, record: &RawRecord) -> Option<String> {
        lookup(record, headers::PLAN_MONTH)
    }
}

/// 解析计划月份
///
/// 支持 `YYYY-MM`、`YYYY/MM`、`YYYYMM` (归一为当月1日) 以及完整日期 `YYYY-MM-DD`
/// (原样保留, 非1日由引擎拒绝)。
pub fn parse_plan_month(raw: &str) -> Option<NaiveDate> {
    let value = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }

    let normalized = value.replace('/', "-");
    let (year, month) = if let Some((y, m)) = normalized.split_once('-') {
        (y.parse::<i32>().ok()?, m.parse::<u32>().ok()?)
    } else if value.len() == 6 && value.chars().all(|c| c.is_ascii_digit()) {
        (value[..4].parse::<i32>().ok()?, value[4..].parse::<u32>().ok()?)
    } else {
        return None;
    };

    NaiveDate::from_ymd_opt(year, month, 1)
}

fn lookup(record: &RawRecord, aliases: &[&str]) -> Option<String> {
    aliases
        .iter()
        .filter_map(|alias| record.get(*alias))
        .map(|v| v.trim())
        .find(|v| !v.is_empty())
        .map(str::to_string)
}

fn required(record: &RawRecord, aliases: &[&str], row: usize) -> ImportResult<String> {
    lookup(record, aliases).ok_or_else(|| ImportError::MissingField {
        row,
        field: aliases[0].to_string(),
    })
}

fn clean_number(raw: &str) -> String {
    raw.chars().filter(|c| *c != ',' && *c != '_' && !c.is_whitespace()).collect()
}

fn parse_f64(raw: &str, field: &str, row: usize) -> ImportResult<f64> {
    clean_number(raw)
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ImportError::TypeConversionError {
            row,
            field: field.to_string(),
            message: format!("无法解析为数值: {}", raw),
        })
}

fn parse_i64(raw: &str, field: &str, row: usize) -> ImportResult<i64> {
    let cleaned = clean_number(raw);
    if let Ok(v) = cleaned.parse::<i64>() {
        return Ok(v);
    }
    // Excel 数值单元格可能带 ".0"
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract() == 0.0 => Ok(v as i64),
        _ => Err(ImportError::TypeConversionError {
            row,
            field: field.to_string(),
            message: format!("无法解析为整数: {}", raw),
        }),
    }
}

fn required_f64(record: &RawRecord, aliases: &[&str], row: usize) -> ImportResult<f64> {
    let raw = required(record, aliases, row)?;
    parse_f64(&raw, aliases[0], row)
}

fn required_i64(record: &RawRecord, aliases: &[&str], row: usize) -> ImportResult<i64> {
    let raw = required(record, aliases, row)?;
    parse_i64(&raw, aliases[0], row)
}

fn optional_i64(record: &RawRecord, aliases: &[&str], row: usize) -> ImportResult<Option<i64>> {
    lookup(record, aliases)
        .map(|raw| parse_i64(&raw, aliases[0], row))
        .transpose()
}
