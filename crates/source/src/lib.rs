//! Client for the upstream catalog API
//!
//! Bulk reads of the model list and category list, plus single-model and
//! count lookups. Payloads are validated here; nothing dynamically typed
//! leaves this crate.

mod api_types;
mod client;
mod config;
mod error;

pub use client::CatalogClient;
pub use config::SourceConfig;
pub use error::SourceError;
