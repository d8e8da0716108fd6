//! Infrastructure Layer
//!
//! Adapters for the Binance wire protocol, REST API, configuration and
//! observability.

pub mod binance;
pub mod config;
pub mod metrics;
pub mod rest;
pub mod telemetry;
