// ==========================================
// 矿山生产计划 - 导入层
// ==========================================
// 职责: 外部文件 → 月度计划输入
// 支持: Excel, CSV
// ==========================================

pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod report;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use field_mapper::{parse_plan_month, PlanFieldMapper};
pub use file_parser::{
    CsvParser, ExcelParser, FileParser, RawRecord, SourceRow, UniversalFileParser,
};
pub use report::{
    default_error_report_path, write_error_report, ImportFailure, ImportReport, ImportedPlan,
};
