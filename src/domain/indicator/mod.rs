//! Technical indicators computed over price columns.

pub mod ichimoku;
pub mod rsi;

pub use ichimoku::{ichimoku, Ichimoku};
pub use rsi::rsi;
