//! Ichimoku Kinko Hyo.
//!
//! Built from rolling midlines ((max + min) / 2) over a time-indexed price
//! series. The leading spans are projected forward and the lagging span
//! back by relabelling keys, so the values themselves never move.

use crate::domain::indexed::IndexedColumn;
use crate::domain::value::{EpochTime, Frequency};

#[derive(Debug)]
pub struct Ichimoku {
    pub conversion: IndexedColumn<EpochTime>,
    pub base: IndexedColumn<EpochTime>,
    pub leading_a: IndexedColumn<EpochTime>,
    pub leading_b: IndexedColumn<EpochTime>,
    pub lagging: IndexedColumn<EpochTime>,
}

fn midline(prices: &IndexedColumn<EpochTime>, period: usize, name: &str) -> IndexedColumn<EpochTime> {
    let mut high = prices.copy();
    high.rolling(period).max();
    let mut low = prices.copy();
    low.rolling(period).min();
    high.add(&low).mul_scalar(0.5).set_name(name);
    high
}

pub fn ichimoku(
    prices: &IndexedColumn<EpochTime>,
    conversion_period: usize,
    base_period: usize,
    leading_b_period: usize,
    freq: Frequency,
) -> Ichimoku {
    let conversion = midline(prices, conversion_period, "Conversion");
    let base = midline(prices, base_period, "Base");

    let mut leading_a = conversion.copy();
    leading_a.add(&base).mul_scalar(0.5).set_name("LeadingA");
    leading_a.shift_index(base_period as i64, |k, n| k.step(freq, n));

    let mut leading_b = midline(prices, leading_b_period, "LeadingB");
    leading_b.shift_index(base_period as i64, |k, n| k.step(freq, n));

    let mut lagging = prices.copy();
    lagging.set_name("Lagging");
    lagging.shift_index(-(base_period as i64), |k, n| k.step(freq, n));

    Ichimoku {
        conversion,
        base,
        leading_a,
        leading_b,
        lagging,
    }
}
