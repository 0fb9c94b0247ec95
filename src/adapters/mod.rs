//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod file_config_adapter;
pub mod spreadsheet_adapter;
pub mod table;
pub mod table_output;
pub mod xlsx_report_adapter;
