//! Concrete adapter implementations for ports.

pub mod csv_data_adapter;
pub mod file_config_adapter;
pub mod param_store;
pub mod text_report_adapter;
