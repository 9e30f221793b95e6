//! Positions: a filled order with lifecycle state.

use crate::domain::order::CloseReason;
use crate::domain::value::EpochTime;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_POSITION_ID: AtomicU64 = AtomicU64::new(1);

pub fn next_position_id() -> u64 {
    NEXT_POSITION_ID.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub id: u64,
    pub symbol: String,
    /// Signed: positive long, negative short.
    pub units: f64,
    pub entry_price: f64,
    pub leverage: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub trailing_distance: f64,
    /// Current trailing stop price; 0 until the first ratchet.
    pub trailing_stop: f64,
    pub opened_at: EpochTime,
    pub closed: bool,
    pub close_price: f64,
    pub close_reason: Option<CloseReason>,
}

impl Position {
    #[allow(clippy::too_many_arguments)]
    pub fn open(
        id: u64,
        symbol: &str,
        units: f64,
        entry_price: f64,
        leverage: f64,
        stop_loss: f64,
        take_profit: f64,
        trailing_distance: f64,
        opened_at: EpochTime,
    ) -> Self {
        Self {
            id,
            symbol: symbol.to_string(),
            units,
            entry_price,
            leverage,
            stop_loss,
            take_profit,
            trailing_distance,
            trailing_stop: 0.0,
            opened_at,
            closed: false,
            close_price: 0.0,
            close_reason: None,
        }
    }

    pub fn is_long(&self) -> bool {
        self.units > 0.0
    }

    pub fn is_short(&self) -> bool {
        self.units < 0.0
    }

    pub fn is_open(&self) -> bool {
        !self.closed
    }

    /// Signed notional at entry. Negative for shorts, which credits cash
    /// when the fill is booked.
    pub fn entry_value(&self) -> f64 {
        self.entry_price * self.units
    }

    /// Signed notional at `price`.
    pub fn value(&self, price: f64) -> f64 {
        price * self.units
    }

    /// Profit in account currency at `price`, sign-aware.
    pub fn pl(&self, price: f64) -> f64 {
        (price - self.entry_price) * self.units
    }

    /// Realized profit once closed, marked-to-market profit before.
    pub fn profit(&self, current_price: f64) -> f64 {
        if self.closed {
            self.pl(self.close_price)
        } else {
            self.pl(current_price)
        }
    }

    pub fn should_take_profit(&self, low: f64, high: f64) -> bool {
        if self.take_profit == 0.0 {
            return false;
        }
        if self.is_long() {
            high >= self.take_profit
        } else {
            low <= self.take_profit
        }
    }

    pub fn should_stop_loss(&self, low: f64, high: f64) -> bool {
        if self.stop_loss == 0.0 {
            return false;
        }
        if self.is_long() {
            low <= self.stop_loss
        } else {
            high >= self.stop_loss
        }
    }

    pub fn should_trailing_stop(&self, low: f64, high: f64) -> bool {
        if self.trailing_stop == 0.0 {
            return false;
        }
        if self.is_long() {
            low <= self.trailing_stop
        } else {
            high >= self.trailing_stop
        }
    }

    /// Move the trailing stop in the holder's favor, never against.
    /// No-op without a trailing distance.
    pub fn ratchet(&mut self, price: f64) {
        if self.trailing_distance <= 0.0 || self.closed {
            return;
        }
        if self.is_long() {
            let candidate = price - self.trailing_distance;
            if self.trailing_stop == 0.0 || candidate > self.trailing_stop {
                self.trailing_stop = candidate;
            }
        } else {
            let candidate = price + self.trailing_distance;
            if self.trailing_stop == 0.0 || candidate < self.trailing_stop {
                self.trailing_stop = candidate;
            }
        }
    }

    /// Transition to Closed. A position closes exactly once; later calls
    /// are ignored.
    pub fn close(&mut self, price: f64, reason: CloseReason) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.close_price = price;
        self.close_reason = Some(reason);
    }
}
