// ==========================================
// 矿山生产计划 - 引擎层
// ==========================================
// 职责: 月度计划日分解的纯计算逻辑
// 红线: Engine 不拼 SQL, 不做 I/O
// ==========================================

pub mod apportionment;
pub mod calendar;
pub mod error;
pub mod orchestrator;
pub mod ratio;
pub mod stock_carry;

// 重导出核心引擎
pub use apportionment::{per_day, per_shift, DayShare};
pub use calendar::{day_of_month, days_in_month, is_holiday, is_leap_year, month_dates};
pub use error::{EngineError, EngineResult};
pub use orchestrator::{validate_input, PlanExpansionOrchestrator};
pub use ratio::{ratio, stripping_ratio};
pub use stock_carry::{DayStockFlow, StockCarry, StockCarryForward};
