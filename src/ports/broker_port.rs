//! Broker capability port.
//!
//! The trader only talks to this trait. The simulated matching engine
//! implements it for backtests; a live brokerage adapter would implement
//! the same surface, with `advance` as a no-op since real time moves on
//! its own.

use crate::domain::engine::{CandleWindow, EngineEvent};
use crate::domain::error::SimError;
use crate::domain::order::{Order, OrderSpec};
use crate::domain::position::Position;
use crate::domain::value::EpochTime;

pub trait Broker {
    /// Trailing window of up to `count` candles ending now.
    fn candles(&mut self, symbol: &str, count: usize) -> Result<CandleWindow, SimError>;

    /// Side-adjusted price: buyers pay the ask, sellers receive the bid.
    fn price(&self, symbol: &str, want_buy: bool) -> f64;

    fn current_time(&self, symbol: &str) -> EpochTime;

    fn place_order(&mut self, spec: OrderSpec) -> Result<u64, SimError>;

    fn cancel_order(&mut self, id: u64) -> Result<(), SimError>;

    fn close_position(&mut self, id: u64) -> Result<(), SimError>;

    /// Move simulated time one bar forward; false once data is spent.
    fn advance(&mut self) -> bool;

    fn nav(&self) -> f64;

    fn pl(&self) -> f64;

    fn open_orders(&self) -> Vec<&Order>;

    fn open_positions(&self) -> Vec<&Position>;

    fn drain_events(&mut self) -> Vec<EngineEvent>;

    fn spread_collected(&self) -> f64;
}
