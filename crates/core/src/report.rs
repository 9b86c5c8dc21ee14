//! Per-batch and per-run synchronization reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::RejectedRecord;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SyncScope {
    Models,
    Categories,
    Associations,
}

/// Result of one unit of work (one record, one name, one pair).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitOutcome {
    Inserted,
    /// The natural key already existed.
    Skipped,
    /// Category name with no stored category row.
    Unresolved,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyncReport {
    pub scope: SyncScope,
    pub inserted: usize,
    pub skipped: usize,
    /// Keys whose unit was abandoned after a storage error.
    pub failed: Vec<String>,
    /// Category names that did not resolve to a stored category.
    pub unresolved: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl SyncReport {
    #[must_use]
    pub fn new(scope: SyncScope) -> Self {
        Self {
            scope,
            inserted: 0,
            skipped: 0,
            failed: Vec::new(),
            unresolved: Vec::new(),
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn record(&mut self, key: impl Into<String>, outcome: UnitOutcome) {
        match outcome {
            UnitOutcome::Inserted => self.inserted += 1,
            UnitOutcome::Skipped => self.skipped += 1,
            UnitOutcome::Unresolved => self.unresolved.push(key.into()),
            UnitOutcome::Failed => self.failed.push(key.into()),
        }
    }

    #[must_use]
    pub fn finish(mut self) -> Self {
        self.failed.sort();
        self.unresolved.sort();
        self.finished_at = Some(Utc::now());
        self
    }

    /// Total units seen, whatever their outcome.
    #[must_use]
    pub fn processed(&self) -> usize {
        self.inserted + self.skipped + self.failed.len() + self.unresolved.len()
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.unresolved.is_empty()
    }
}

/// Aggregate of one pipeline invocation, printed by the CLI.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineReport {
    pub models: Option<SyncReport>,
    pub categories: Option<SyncReport>,
    pub associations: Option<SyncReport>,
    pub rejected: Vec<RejectedRecord>,
}

impl PipelineReport {
    #[must_use]
    pub fn has_failures(&self) -> bool {
        [&self.models, &self.categories, &self.associations]
            .into_iter()
            .flatten()
            .any(|r| !r.failed.is_empty())
    }
}
