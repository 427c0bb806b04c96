// ==========================================
// 矿山生产计划 - 导入结果与错误报告
// ==========================================
// 职责: 汇总逐行导入结果; 失败行输出为 CSV 错误报告
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 成功导入的行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportedPlan {
    pub row: usize,
    pub plan_month: String,
    pub parent_plan_id: String,
    pub replaced_plan_id: Option<String>,
}

/// 失败行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportFailure {
    pub row: usize,
    pub plan_month: Option<String>,
    pub error_kind: String,
    pub field: Option<String>,
    pub message: String,
}

/// 一次导入的汇总
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
    pub batch_id: String,
    pub source_file: String,
    pub total_rows: usize,
    pub imported: Vec<ImportedPlan>,
    pub failures: Vec<ImportFailure>,
}

impl ImportReport {
    pub fn new(source_file: &Path) -> Self {
        Self {
            batch_id: uuid::Uuid::new_v4().to_string(),
            source_file: source_file.display().to_string(),
            ..Default::default()
        }
    }

    pub fn success_count(&self) -> usize {
        self.imported.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// 错误报告默认路径: 源文件同目录下 `<stem>_errors.csv`
pub fn default_error_report_path(source_file: &Path) -> PathBuf {
    let stem = source_file
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("import");
    source_file.with_file_name(format!("{}_errors.csv", stem))
}

/// 写出失败行错误报告
pub fn write_error_report(report: &ImportReport, output: &Path) -> ImportResult<()> {
    let mut writer = csv::Writer::from_path(output)
        .map_err(|e| ImportError::ReportWriteError(e.to_string()))?;
    writer
        .write_record(["row", "plan_month", "error_kind", "field", "message"])
        .map_err(|e| ImportError::ReportWriteError(e.to_string()))?;

    for failure in &report.failures {
        writer
            .write_record([
                failure.row.to_string(),
                failure.plan_month.clone().unwrap_or_default(),
                failure.error_kind.clone(),
                failure.field.clone().unwrap_or_default(),
                failure.message.clone(),
            ])
            .map_err(|e| ImportError::ReportWriteError(e.to_string()))?;
    }

    writer
        .flush()
        .map_err(|e| ImportError::ReportWriteError(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_report_path() {
        let path = default_error_report_path(Path::new("/data/plans_2025.xlsx"));
        assert_eq!(path, PathBuf::from("/data/plans_2025_errors.csv"));
    }

    #[test]
    fn test_write_error_report() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("errors.csv");
        let mut report = ImportReport::new(Path::new("plans.csv"));
        report.failures.push(ImportFailure {
            row: 3,
            plan_month: Some("2025-11".to_string()),
            error_kind: "MissingOpeningStock".to_string(),
            field: Some("total_sisa_stock".to_string()),
            message: "缺少月初库存".to_string(),
        });

        write_error_report(&report, &output).unwrap();
        let content = std::fs::read_to_string(&output).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "row,plan_month,error_kind,field,message");
        assert!(lines[1].starts_with("3,2025-11,MissingOpeningStock,total_sisa_stock,"));
    }
}
