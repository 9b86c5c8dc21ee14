//! Synchronization layer for catalog-sync
//!
//! Reconciles upstream records into storage: check by natural key, insert if
//! absent, skip if present. Every batch is a bounded fan-out joined before
//! the caller continues; one failed unit never aborts its siblings.

#![allow(missing_docs, reason = "Internal crate with self-explanatory API")]
#![allow(clippy::missing_errors_doc, reason = "Errors are self-explanatory from Result types")]
#![allow(missing_debug_implementations, reason = "Internal types")]

mod association_sync;
mod category_sync;
mod error;
mod key_locks;
mod model_sync;
mod options;
mod pipeline;
mod retry;
#[cfg(test)]
mod tests;

pub use association_sync::AssociationSynchronizer;
pub use category_sync::CategorySynchronizer;
pub use error::ServiceError;
pub use model_sync::ModelSynchronizer;
pub use options::SyncOptions;
pub use pipeline::SyncPipeline;
