pub mod constants;
pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod observability;
pub mod pipeline;

// Use cases and the ports they talk through, plus the adapters behind them
pub mod app;
pub mod infra;
