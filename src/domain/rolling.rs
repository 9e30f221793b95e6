//! Rolling aggregates over a column.
//!
//! A window is stateless: per output row it covers the up-to-`period`
//! values ending at that row, so the head of the series sees growing
//! windows rather than padding. The value type of the first window entry
//! decides the arithmetic: float windows aggregate in f64, int windows in
//! integer arithmetic (integer division included), and anything else
//! passes the row's value through unchanged.

use crate::domain::column::Column;
use crate::domain::value::Value;

#[derive(Debug, Clone, Copy)]
pub struct RollingWindow<'a> {
    column: &'a Column,
    period: usize,
}

impl Column {
    pub fn rolling(&self, period: usize) -> RollingWindow<'_> {
        RollingWindow {
            column: self,
            period: period.max(1),
        }
    }
}

impl<'a> RollingWindow<'a> {
    fn window(&self, row: usize) -> &'a [Value] {
        let start = (row + 1).saturating_sub(self.period);
        &self.column.values()[start..=row]
    }

    fn aggregate(
        &self,
        float_agg: impl Fn(&[Value]) -> f64,
        int_agg: impl Fn(&[Value]) -> i64,
    ) -> Column {
        let mut out = Vec::with_capacity(self.column.len());
        for row in 0..self.column.len() {
            let window = self.window(row);
            let value = match window[0] {
                Value::Float(_) => Value::Float(float_agg(window)),
                Value::Int(_) => Value::Int(int_agg(window)),
                _ => window[window.len() - 1].clone(),
            };
            out.push(value);
        }
        Column::with_values(self.column.name(), out)
    }

    pub fn mean(&self) -> Column {
        self.aggregate(
            |w| w.iter().map(Value::float).sum::<f64>() / w.len() as f64,
            |w| w.iter().map(Value::int).sum::<i64>() / w.len() as i64,
        )
    }

    /// Exponential moving average, re-seeded per row from the first value
    /// of that row's window.
    pub fn ema(&self) -> Column {
        let period = self.period;
        self.aggregate(
            move |w| {
                let mult = 2.0 / (period as f64 + 1.0);
                let mut ema = w[0].float();
                for v in &w[1..] {
                    ema += (v.float() - ema) * mult;
                }
                ema
            },
            move |w| {
                let mut ema = w[0].int();
                for v in &w[1..] {
                    ema += (v.int() - ema) * 2 / (period as i64 + 1);
                }
                ema
            },
        )
    }

    pub fn median(&self) -> Column {
        self.aggregate(
            |w| {
                let mut sorted: Vec<f64> = w
                    .iter()
                    .filter(|v| v.is_numeric())
                    .map(Value::float)
                    .collect();
                sorted.sort_by(|a, b| a.total_cmp(b));
                let mid = sorted.len() / 2;
                if sorted.len() % 2 == 1 {
                    sorted[mid]
                } else {
                    (sorted[mid - 1] + sorted[mid]) / 2.0
                }
            },
            |w| {
                let mut sorted: Vec<i64> = w
                    .iter()
                    .filter(|v| v.is_numeric())
                    .map(Value::int)
                    .collect();
                sorted.sort_unstable();
                let mid = sorted.len() / 2;
                if sorted.len() % 2 == 1 {
                    sorted[mid]
                } else {
                    (sorted[mid - 1] + sorted[mid]) / 2
                }
            },
        )
    }

    /// Population standard deviation of the window.
    pub fn stddev(&self) -> Column {
        fn population_stddev(values: &[f64]) -> f64 {
            let mean = values.iter().sum::<f64>() / values.len() as f64;
            let variance =
                values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
            variance.sqrt()
        }
        self.aggregate(
            |w| population_stddev(&w.iter().map(Value::float).collect::<Vec<_>>()),
            |w| population_stddev(&w.iter().map(|v| v.int() as f64).collect::<Vec<_>>()) as i64,
        )
    }

    pub fn min(&self) -> Column {
        self.aggregate(
            |w| w.iter().map(Value::float).fold(f64::INFINITY, f64::min),
            |w| w.iter().map(Value::int).min().unwrap_or(0),
        )
    }

    pub fn max(&self) -> Column {
        self.aggregate(
            |w| w.iter().map(Value::float).fold(f64::NEG_INFINITY, f64::max),
            |w| w.iter().map(Value::int).max().unwrap_or(0),
        )
    }
}
