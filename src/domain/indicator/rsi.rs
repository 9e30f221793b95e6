//! RSI (Relative Strength Index).
//!
//! Average gain and loss are rolling means over the period, so the head of
//! the series warms up over growing windows like every other rolling
//! aggregate. RSI = 100 - 100 / (1 + avg_gain / avg_loss), pinned to 100
//! when the window shows no losses.

use crate::domain::column::Column;
use crate::domain::value::Value;

pub fn rsi(prices: &Column, period: usize) -> Column {
    let mut gains = Column::new("Gains");
    let mut losses = Column::new("Losses");
    for i in 0..prices.len() {
        let change = if i == 0 {
            0.0
        } else {
            prices.float(i as isize) - prices.float(i as isize - 1)
        };
        gains.push(change.max(0.0));
        losses.push((-change).max(0.0));
    }

    let avg_gain = gains.rolling(period).mean();
    let avg_loss = losses.rolling(period).mean();

    let values = (0..prices.len())
        .map(|i| {
            let gain = avg_gain.float(i as isize);
            let loss = avg_loss.float(i as isize);
            let rsi = if loss == 0.0 {
                100.0
            } else {
                100.0 - 100.0 / (1.0 + gain / loss)
            };
            Value::Float(rsi)
        })
        .collect();
    Column::with_values("RSI", values)
}
