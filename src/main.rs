// ==========================================
// 矿山生产计划 - 命令行入口
// ==========================================
// 用法:
//   mine-production-plan import <file> [--replace]
//   mine-production-plan show <YYYY-MM>
//   mine-production-plan list [page] [page_size]
//   mine-production-plan delete <YYYY-MM>
// ==========================================

use anyhow::{anyhow, bail, Context, Result};
use mine_production_plan::app::{get_default_db_path, AppState};
use mine_production_plan::importer::parse_plan_month;

const USAGE: &str = "用法:
  mine-production-plan import <file> [--replace]
  mine-production-plan show <YYYY-MM>
  mine-production-plan list [page] [page_size]
  mine-production-plan delete <YYYY-MM>";

fn main() -> Result<()> {
    mine_production_plan::logging::init();

    tracing::info!("==================================================");
    tracing::info!("{} v{}", mine_production_plan::APP_NAME, mine_production_plan::VERSION);
    tracing::info!("==================================================");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = args.first().map(String::as_str).unwrap_or("");

    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);
    let state = AppState::new(db_path).context("无法初始化AppState")?;

    match command {
        "import" => {
            let file = args.get(1).ok_or_else(|| anyhow!("缺少文件路径\n{}", USAGE))?;
            let replace = args.iter().any(|a| a == "--replace");
            let report = state.import_api.import_parent_plans(file, replace)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            if let Some(path) = state.import_api.write_error_report(&report)? {
                eprintln!("错误报告: {}", path.display());
            }
        }
        "show" => {
            let month = month_arg(&args)?;
            let detail = state.plan_api.get_plan_by_month(month)?;
            println!("{}", serde_json::to_string_pretty(&detail)?);
        }
        "list" => {
            let page = args.get(1).map(|s| s.parse::<u32>()).transpose()?.unwrap_or(1);
            let page_size = args.get(2).map(|s| s.parse::<u32>()).transpose()?.unwrap_or(20);
            let result = state.plan_api.list_plans(page, page_size)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        "delete" => {
            let month = month_arg(&args)?;
            let detail = state.plan_api.get_plan_by_month(month)?;
            state.plan_api.delete_plan(&detail.plan.parent_plan_id)?;
            println!("已删除: {}", detail.plan.parent_plan_id);
        }
        _ => bail!("{}", USAGE),
    }

    Ok(())
}

fn month_arg(args: &[String]) -> Result<chrono::NaiveDate> {
    let raw = args.get(1).ok_or_else(|| anyhow!("缺少月份参数\n{}", USAGE))?;
    parse_plan_month(raw).ok_or_else(|| anyhow!("无法识别的月份: {}", raw))
}
