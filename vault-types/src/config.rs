//! Per-run configuration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A local contact-group id restricting which conversations a run covers.
///
/// Passed through to the item source untouched; the engine never interprets
/// it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContactGroup(i64);

impl ContactGroup {
    /// Create a contact-group filter from a local group id.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the raw group id.
    pub fn id(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for ContactGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "group:{}", self.0)
    }
}

/// What triggered a run, and whether it transfers anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunKind {
    /// User-initiated run
    Manual,
    /// Scheduler-initiated run
    Scheduled,
    /// Mark everything available as already archived, transferring nothing
    Skip,
}

impl RunKind {
    /// Whether this run only advances watermarks.
    pub fn is_skip(&self) -> bool {
        matches!(self, RunKind::Skip)
    }
}

impl fmt::Display for RunKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunKind::Manual => write!(f, "manual"),
            RunKind::Scheduled => write!(f, "scheduled"),
            RunKind::Skip => write!(f, "skip"),
        }
    }
}

/// Immutable parameters for one engine run.
///
/// Created once per invocation. The only derived copy is [`RunConfig::retry`],
/// produced when a credential refresh earns the run its single second
/// attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// What triggered the run
    pub kind: RunKind,
    /// Overall cap on items processed across all categories
    pub max_items: usize,
    /// Cap on records converted and appended per request
    pub batch_cap: usize,
    /// Optional contact-group filter forwarded to the item source
    pub group: Option<ContactGroup>,
    /// Retry attempts already consumed; zero on a fresh run
    pub tries: u32,
}

impl RunConfig {
    /// Create a run configuration.
    pub fn new(kind: RunKind, max_items: usize, batch_cap: usize) -> Self {
        Self { kind, max_items, batch_cap, group: None, tries: 0 }
    }

    /// Restrict the run to one contact group.
    pub fn with_group(mut self, group: ContactGroup) -> Self {
        self.group = Some(group);
        self
    }

    /// Whether the single credential-refresh retry is still available.
    pub fn can_retry(&self) -> bool {
        self.tries == 0
    }

    /// Derive the retry copy, consuming the single retry.
    pub fn retry(&self) -> Self {
        Self { tries: self.tries + 1, ..self.clone() }
    }
}
