// ==========================================
// 矿山生产计划 - 导入 API
// ==========================================
// 职责: 文件 → 逐行映射 → 展开落库; 失败行汇总为错误报告
// 说明: 每行独立成败, 单行失败不影响其他行
// ==========================================

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::api::plan_api::PlanApi;
use crate::importer::{
    default_error_report_path, write_error_report, ImportFailure, ImportReport, ImportedPlan,
    PlanFieldMapper, UniversalFileParser,
};

pub struct ImportApi {
    plan_api: Arc<PlanApi>,
    parser: UniversalFileParser,
    mapper: PlanFieldMapper,
}

impl ImportApi {
    pub fn new(plan_api: Arc<PlanApi>) -> Self {
        Self {
            plan_api,
            parser: UniversalFileParser,
            mapper: PlanFieldMapper,
        }
    }

    /// 导入月度计划文件
    ///
    /// # 参数
    /// - file_path: .csv / .xlsx / .xls
    /// - replace_existing: 当月已有有效计划时是否替换
    ///
    /// # 返回
    /// - Ok(ImportReport): 逐行结果
    /// - Err: 文件级错误 (不存在/格式不支持/解析失败)
    pub fn import_parent_plans<P: AsRef<Path>>(
        &self,
        file_path: P,
        replace_existing: bool,
    ) -> ApiResult<ImportReport> {
        let path = file_path.as_ref();
        let records = self.parser.parse(path)?;

        let mut report = ImportReport::new(path);
        report.total_rows = records.len();

        for source_row in &records {
            let row = source_row.line;
            let record = &source_row.fields;
            let raw_month = self.mapper.raw_plan_month(record);

            let outcome = self
                .mapper
                .map_record(record, row)
                .map_err(ApiError::from)
                .and_then(|input| {
                    let plan_month = input.plan_month.format("%Y-%m").to_string();
                    if replace_existing {
                        self.plan_api.replace_plan(input).map(|r| ImportedPlan {
                            row,
                            plan_month,
                            parent_plan_id: r.detail.plan.parent_plan_id,
                            replaced_plan_id: r.replaced_plan_id,
                        })
                    } else {
                        self.plan_api.create_plan(input).map(|d| ImportedPlan {
                            row,
                            plan_month,
                            parent_plan_id: d.plan.parent_plan_id,
                            replaced_plan_id: None,
                        })
                    }
                });

            match outcome {
                Ok(imported) => report.imported.push(imported),
                Err(err) => {
                    warn!(row, error = %err, "导入行失败");
                    report.failures.push(ImportFailure {
                        row,
                        plan_month: raw_month,
                        error_kind: err.kind().to_string(),
                        field: err.field(),
                        message: err.to_string(),
                    });
                }
            }
        }

        info!(
            batch_id = %report.batch_id,
            total = report.total_rows,
            success = report.success_count(),
            failed = report.failure_count(),
            "月度计划导入完成"
        );
        Ok(report)
    }

    /// 有失败行时在源文件旁写出错误报告
    ///
    /// # 返回
    /// 报告路径; 无失败行时为 None
    pub fn write_error_report(&self, report: &ImportReport) -> ApiResult<Option<PathBuf>> {
        if !report.has_failures() {
            return Ok(None);
        }
        let output = default_error_report_path(Path::new(&report.source_file));
        write_error_report(report, &output)?;
        Ok(Some(output))
    }
}
