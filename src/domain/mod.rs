//! Core domain types and logic.

pub mod aggregator;
pub mod assembler;
pub mod config_validation;
pub mod demand;
pub mod error;
pub mod layout;
pub mod normalizer;
pub mod pipeline;
pub mod reorder;
pub mod stats;
pub mod stock;
