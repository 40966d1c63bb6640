//! Core domain types and logic.

pub mod series;
pub mod trade;
pub mod strategy;
pub mod signal;
pub mod execution;
pub mod backtest;
pub mod metrics;
pub mod optimizer;
pub mod settings;
pub mod universe;
pub mod error;
