//! Per-tick performance history and summary figures.

use crate::domain::column::Column;
use crate::domain::error::SimError;
use crate::domain::frame::{DATE, Frame};
use crate::domain::value::EpochTime;

pub const EQUITY: &str = "Equity";
pub const PROFIT: &str = "Profit";
pub const DRAWDOWN: &str = "Drawdown";
pub const RETURNS: &str = "Returns";

/// A fill or close observed during one tick, exposed for trade markers.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeEvent {
    pub price: f64,
    pub units: f64,
    pub exit: bool,
}

/// One row per tick. The Returns column is NaN on ticks with no realized
/// profit; trade events are scalar-free and live beside the frame.
#[derive(Debug)]
pub struct PerformanceStats {
    frame: Frame,
    trades: Vec<Vec<TradeEvent>>,
}

impl Default for PerformanceStats {
    fn default() -> Self {
        Self::new()
    }
}

impl PerformanceStats {
    pub fn new() -> Self {
        let mut frame = Frame::new("performance");
        for name in [DATE, EQUITY, PROFIT, DRAWDOWN, RETURNS] {
            // names are distinct, push cannot fail here
            let _ = frame.push_series(Column::new(name));
        }
        Self {
            frame,
            trades: Vec::new(),
        }
    }

    pub fn record(
        &mut self,
        date: EpochTime,
        equity: f64,
        profit: f64,
        drawdown: f64,
        returns: Option<f64>,
        trades: Vec<TradeEvent>,
    ) -> Result<(), SimError> {
        self.frame.push_value(DATE, date)?;
        self.frame.push_value(EQUITY, equity)?;
        self.frame.push_value(PROFIT, profit)?;
        self.frame.push_value(DRAWDOWN, drawdown)?;
        self.frame
            .push_value(RETURNS, returns.unwrap_or(f64::NAN))?;
        self.trades.push(trades);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.frame.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.is_empty()
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn date(&self, i: isize) -> EpochTime {
        self.frame.time(DATE, i)
    }

    pub fn equity(&self, i: isize) -> f64 {
        self.frame.float(EQUITY, i)
    }

    pub fn drawdown(&self, i: isize) -> f64 {
        self.frame.float(DRAWDOWN, i)
    }

    pub fn returns(&self, i: isize) -> f64 {
        self.frame.float(RETURNS, i)
    }

    pub fn trades_at(&self, row: usize) -> &[TradeEvent] {
        self.trades.get(row).map_or(&[], Vec::as_slice)
    }

    pub fn net_profit(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        self.equity(-1) - self.equity(0)
    }

    pub fn max_drawdown(&self) -> f64 {
        self.drawdown_values().fold(0.0, f64::max)
    }

    /// Gross realized wins over gross realized losses. Infinite with wins
    /// and no losses, zero with no realized trades.
    pub fn profit_factor(&self) -> f64 {
        let mut wins = 0.0;
        let mut losses = 0.0;
        for r in self.returns_values() {
            if r > 0.0 {
                wins += r;
            } else if r < 0.0 {
                losses += -r;
            }
        }
        if losses == 0.0 {
            if wins == 0.0 { 0.0 } else { f64::INFINITY }
        } else {
            wins / losses
        }
    }

    fn drawdown_values(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.len()).map(|i| self.drawdown(i as isize))
    }

    fn returns_values(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.len())
            .map(|i| self.returns(i as isize))
            .filter(|r| !r.is_nan())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_stats() -> PerformanceStats {
        let mut stats = PerformanceStats::new();
        stats
            .record(EpochTime(0), 100_000.0, 0.0, 0.0, None, vec![])
            .unwrap();
        stats
            .record(
                EpochTime(86_400),
                102_500.0,
                2_500.0,
                0.0,
                Some(2_500.0),
                vec![TradeEvent {
                    price: 1.2,
                    units: 50_000.0,
                    exit: true,
                }],
            )
            .unwrap();
        stats
            .record(
                EpochTime(172_800),
                99_000.0,
                -1_000.0,
                1_000.0,
                Some(-3_500.0),
                vec![],
            )
            .unwrap();
        stats
    }

    #[test]
    fn records_one_row_per_tick() {
        let stats = sample_stats();
        assert_eq!(stats.len(), 3);
        assert!((stats.equity(1) - 102_500.0).abs() < f64::EPSILON);
        assert_eq!(stats.date(2), EpochTime(172_800));
    }

    #[test]
    fn returns_is_nan_when_nothing_realized() {
        let stats = sample_stats();
        assert!(stats.returns(0).is_nan());
        assert!((stats.returns(1) - 2_500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn trade_events_align_with_rows() {
        let stats = sample_stats();
        assert!(stats.trades_at(0).is_empty());
        assert_eq!(stats.trades_at(1).len(), 1);
        assert!(stats.trades_at(1)[0].exit);
        assert!(stats.trades_at(99).is_empty());
    }

    #[test]
    fn summary_figures() {
        let stats = sample_stats();
        assert!((stats.net_profit() + 1_000.0).abs() < f64::EPSILON);
        assert!((stats.max_drawdown() - 1_000.0).abs() < f64::EPSILON);
        assert!((stats.profit_factor() - 2_500.0 / 3_500.0).abs() < 1e-12);
    }

    #[test]
    fn profit_factor_edge_cases() {
        let empty = PerformanceStats::new();
        assert!((empty.profit_factor() - 0.0).abs() < f64::EPSILON);

        let mut wins_only = PerformanceStats::new();
        wins_only
            .record(EpochTime(0), 1.0, 0.0, 0.0, Some(10.0), vec![])
            .unwrap();
        assert!(wins_only.profit_factor().is_infinite());
    }
}
