//! Core types and helpers for catalog-sync
//!
//! Domain records shared by the source client, the storage gateway and the
//! synchronizers, plus constants and environment parsing.

mod constants;
mod env_config;
mod error;
mod model;
mod report;

pub use constants::*;
pub use env_config::*;
pub use error::*;
pub use model::*;
pub use report::*;
