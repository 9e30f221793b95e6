//! Port traits decoupling the domain from concrete adapters.

pub mod broker_port;
pub mod config_port;
