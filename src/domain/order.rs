//! Orders: a request to open a position.

use crate::domain::error::SimError;
use crate::domain::value::EpochTime;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ORDER_ID: AtomicU64 = AtomicU64::new(1);

pub fn next_order_id() -> u64 {
    NEXT_ORDER_ID.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderKind {
    /// Fill immediately at the current bid/ask plus slippage.
    Market,
    /// Fill at the requested price once the market trades through it.
    Limit,
    /// Same trigger as Limit; kept distinct for reporting.
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    StopLoss,
    TakeProfit,
    TrailingStop,
    Manual,
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CloseReason::StopLoss => "stop loss",
            CloseReason::TakeProfit => "take profit",
            CloseReason::TrailingStop => "trailing stop",
            CloseReason::Manual => "manual",
        };
        write!(f, "{s}")
    }
}

/// Parameters for placing an order.
///
/// A negative `stop_loss` selects a trailing stop: the magnitude is the
/// trailing distance from the reference price.
#[derive(Debug, Clone)]
pub struct OrderSpec {
    pub symbol: String,
    pub kind: OrderKind,
    /// Signed: positive buys, negative sells.
    pub units: f64,
    /// Requested price for Limit/Stop orders; ignored for Market.
    pub price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
}

impl OrderSpec {
    pub fn market(symbol: &str, units: f64, stop_loss: f64, take_profit: f64) -> Self {
        Self {
            symbol: symbol.to_string(),
            kind: OrderKind::Market,
            units,
            price: 0.0,
            stop_loss,
            take_profit,
        }
    }

    pub fn limit(symbol: &str, units: f64, price: f64, stop_loss: f64, take_profit: f64) -> Self {
        Self {
            symbol: symbol.to_string(),
            kind: OrderKind::Limit,
            units,
            price,
            stop_loss,
            take_profit,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Order {
    pub id: u64,
    pub symbol: String,
    pub kind: OrderKind,
    pub units: f64,
    pub price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub trailing_distance: f64,
    pub leverage: f64,
    pub placed_at: EpochTime,
    /// Set once filled; the terminal state.
    pub position: Option<u64>,
}

impl Order {
    pub fn from_spec(id: u64, spec: OrderSpec, leverage: f64, placed_at: EpochTime) -> Self {
        let (stop_loss, trailing_distance) = if spec.stop_loss < 0.0 {
            (0.0, -spec.stop_loss)
        } else {
            (spec.stop_loss, 0.0)
        };
        Self {
            id,
            symbol: spec.symbol,
            kind: spec.kind,
            units: spec.units,
            price: spec.price,
            stop_loss,
            take_profit: spec.take_profit,
            trailing_distance,
            leverage,
            placed_at,
            position: None,
        }
    }

    pub fn is_buy(&self) -> bool {
        self.units > 0.0
    }

    pub fn is_filled(&self) -> bool {
        self.position.is_some()
    }

    /// Cancellation is not supported: a placed order is a commitment and
    /// fills are irrevocable. Always fails.
    pub fn cancel(&mut self) -> Result<(), SimError> {
        Err(SimError::CancelUnsupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_spec() -> OrderSpec {
        OrderSpec::market("EUR_USD", 50_000.0, 1.05, 1.25)
    }

    #[test]
    fn market_spec_fields() {
        let order = Order::from_spec(next_order_id(), sample_spec(), 1.0, EpochTime(0));
        assert_eq!(order.symbol, "EUR_USD");
        assert_eq!(order.kind, OrderKind::Market);
        assert!(order.is_buy());
        assert!(!order.is_filled());
        assert!((order.stop_loss - 1.05).abs() < f64::EPSILON);
        assert!((order.trailing_distance - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn negative_stop_loss_selects_trailing() {
        let spec = OrderSpec::market("EUR_USD", 50_000.0, -0.02, 0.0);
        let order = Order::from_spec(next_order_id(), spec, 1.0, EpochTime(0));
        assert!((order.stop_loss - 0.0).abs() < f64::EPSILON);
        assert!((order.trailing_distance - 0.02).abs() < f64::EPSILON);
    }

    #[test]
    fn sell_units_are_negative() {
        let spec = OrderSpec::market("EUR_USD", -10_000.0, 0.0, 0.0);
        let order = Order::from_spec(next_order_id(), spec, 1.0, EpochTime(0));
        assert!(!order.is_buy());
    }

    #[test]
    fn cancel_always_fails() {
        let mut order = Order::from_spec(next_order_id(), sample_spec(), 1.0, EpochTime(0));
        assert!(matches!(order.cancel(), Err(SimError::CancelUnsupported)));
        // still pending afterwards
        assert!(!order.is_filled());
    }

    #[test]
    fn order_ids_are_unique() {
        assert_ne!(next_order_id(), next_order_id());
    }
}
