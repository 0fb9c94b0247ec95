//! replenish: reorder points and order quantities from consumption history.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`], command surface in [`cli`].

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod ports;
