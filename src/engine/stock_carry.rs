// ==========================================
// 矿山生产计划 - 库存结转累加器
// ==========================================
// 规则:
//   daily_old_stock[1] = total_sisa_stock
//   daily_old_stock[i] = remaining_stock[i-1]
//   remaining_stock[i] = daily_old_stock[i] - 外运[i] + 产量[i]
// 红线: 严格自左向右顺序折叠, 第 i 天依赖第 i-1 天结果
// ==========================================

use crate::engine::error::{EngineError, EngineResult};

/// 单日库存流量 (全精度日分摊值)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayStockFlow {
    pub ore_target: f64,
    pub ore_shipment_target: f64,
}

/// 单日结转结果 (全精度)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StockCarry {
    pub daily_old_stock: f64,
    pub remaining_stock: f64,
}

/// 库存结转累加器
///
/// 负库存是合法的业务信号 (欠库), 不视为错误。
pub struct StockCarryForward {
    previous_closing_stock: f64,
}

impl StockCarryForward {
    /// 以月初库存初始化; 缺失时直接失败, 不产生任何结转行
    pub fn new(opening_stock: Option<i64>) -> EngineResult<Self> {
        let opening = opening_stock.ok_or(EngineError::MissingOpeningStock)?;
        Ok(Self {
            previous_closing_stock: opening as f64,
        })
    }

    /// 推进一天
    pub fn step(&mut self, flow: DayStockFlow) -> StockCarry {
        let daily_old_stock = self.previous_closing_stock;
        let remaining_stock = daily_old_stock - flow.ore_shipment_target + flow.ore_target;
        self.previous_closing_stock = remaining_stock;
        StockCarry {
            daily_old_stock,
            remaining_stock,
        }
    }

    /// 当前结存 (下一日期初)
    pub fn closing_stock(&self) -> f64 {
        self.previous_closing_stock
    }

    /// 对有序日流量整体折叠
    pub fn fold(opening_stock: Option<i64>, flows: &[DayStockFlow]) -> EngineResult<Vec<StockCarry>> {
        let mut acc = Self::new(opening_stock)?;
        Ok(flows.iter().map(|flow| acc.step(*flow)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flow(ore: f64, shipment: f64) -> DayStockFlow {
        DayStockFlow {
            ore_target: ore,
            ore_shipment_target: shipment,
        }
    }

    #[test]
    fn test_first_day_uses_opening_stock() {
        let carries = StockCarryForward::fold(Some(100_000), &[flow(25_000.0, 20_000.0)]).unwrap();
        assert_eq!(carries[0].daily_old_stock, 100_000.0);
        assert_eq!(carries[0].remaining_stock, 105_000.0);
    }

    #[test]
    fn test_recurrence_chains_previous_closing() {
        let flows = vec![flow(10.0, 3.0), flow(5.0, 20.0), flow(0.0, 1.5)];
        let carries = StockCarryForward::fold(Some(0), &flows).unwrap();
        assert_eq!(carries.len(), 3);
        for i in 1..carries.len() {
            assert_eq!(carries[i].daily_old_stock, carries[i - 1].remaining_stock);
        }
        assert_eq!(carries[2].remaining_stock, -9.5);
    }

    #[test]
    fn test_negative_stock_is_not_an_error() {
        let carries = StockCarryForward::fold(Some(0), &[flow(0.0, 50.0)]).unwrap();
        assert_eq!(carries[0].remaining_stock, -50.0);
    }

    #[test]
    fn test_missing_opening_stock_fails_fast() {
        let result = StockCarryForward::fold(None, &[flow(1.0, 1.0)]);
        assert_eq!(result, Err(EngineError::MissingOpeningStock));
    }

    #[test]
    fn test_step_updates_closing_stock() {
        let mut acc = StockCarryForward::new(Some(7)).unwrap();
        acc.step(flow(3.0, 1.0));
        assert_eq!(acc.closing_stock(), 9.0);
    }
}
