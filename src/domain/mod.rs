//! Core domain types and simulation logic.

pub mod column;
pub mod engine;
pub mod error;
pub mod frame;
pub mod indexed;
pub mod indicator;
pub mod order;
pub mod position;
pub mod rolling;
pub mod signal;
pub mod stats;
pub mod trader;
pub mod value;
