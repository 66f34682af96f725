//! Run phases and progress snapshots.
//!
//! This module provides the pure state machine for the backup run lifecycle.
//! The engine derives a fresh [`BackupState`] snapshot for every phase
//! transition and every progress tick; the snapshots travel to observers in
//! emission order, and the final one is the run's outcome.
//!
//! The actual I/O (fetching, converting, appending) is performed by the
//! engine crate, not by this module. This enables instant unit testing
//! without collaborator mocks.

use std::fmt;

use msgvault_types::{BackupError, Category, RunKind};

/// Lifecycle phase of a backup run - NO I/O, just ordering rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Run accepted, nothing started yet.
    Queued,
    /// Preparing the remote session.
    Login,
    /// Sizing per-category batches.
    Calculating,
    /// Converting and appending chunks.
    Running,
    /// All items processed (success terminal).
    Finished,
    /// Cancellation observed (terminal, not a failure).
    Canceled,
    /// Unrecoverable failure (terminal, carries a cause).
    Error,
}

impl Phase {
    /// Whether no further transition occurs after this phase.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Finished | Phase::Canceled | Phase::Error)
    }

    /// Whether this phase is a legal successor of `prev`.
    ///
    /// `prev == None` means nothing has been emitted yet. Terminal phases
    /// may be reached from any live phase; `Login` may re-follow
    /// `Calculating` or `Running` because a credential-refresh retry
    /// restarts the attempt.
    pub fn may_follow(&self, prev: Option<Phase>) -> bool {
        match (prev, self) {
            (None, Phase::Queued) => true,
            (None, _) => false,
            (Some(p), _) if p.is_terminal() => false,
            // Terminal phases close any live run
            (Some(_), Phase::Canceled) | (Some(_), Phase::Error) => true,
            (Some(Phase::Queued), Phase::Login) => true,
            // A skip run finishes straight from Queued
            (Some(Phase::Queued), Phase::Finished) => true,
            (Some(Phase::Login), Phase::Calculating) => true,
            (Some(Phase::Calculating), Phase::Running) => true,
            // A run with nothing to transfer finishes without running
            (Some(Phase::Calculating), Phase::Finished) => true,
            (Some(Phase::Running), Phase::Running) => true,
            (Some(Phase::Running), Phase::Finished) => true,
            // Retry restarts the attempt after a credential refresh
            (Some(Phase::Calculating), Phase::Login) => true,
            (Some(Phase::Running), Phase::Login) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Queued => "queued",
            Phase::Login => "login",
            Phase::Calculating => "calculating",
            Phase::Running => "running",
            Phase::Finished => "finished",
            Phase::Canceled => "canceled",
            Phase::Error => "error",
        };
        write!(f, "{}", name)
    }
}

/// A tagged snapshot of run progress.
///
/// Immutable value; derivation methods return a new snapshot and never
/// mutate in place. Counts and the current category carry over from the
/// previous snapshot unless the derivation replaces them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupState {
    /// Current lifecycle phase
    pub phase: Phase,
    /// Items processed so far
    pub processed: usize,
    /// Total items this run will process
    pub total: usize,
    /// What triggered the run
    pub kind: RunKind,
    /// Category currently being processed, once the loop has started
    pub category: Option<Category>,
    /// Failure cause, present only in the `Error` phase
    pub error: Option<BackupError>,
}

impl BackupState {
    /// The initial snapshot of a freshly accepted run.
    pub fn queued(kind: RunKind) -> Self {
        Self { phase: Phase::Queued, processed: 0, total: 0, kind, category: None, error: None }
    }

    /// Derive a snapshot in a new phase, carrying counts and category over.
    pub fn advance(&self, phase: Phase) -> Self {
        Self { phase, error: None, ..self.clone() }
    }

    /// Derive a snapshot with replaced counts, keeping phase and kind.
    pub fn with_totals(&self, processed: usize, total: usize) -> Self {
        Self { processed, total, ..self.clone() }
    }

    /// Derive a `Running` snapshot with updated counts.
    pub fn running(&self, processed: usize, total: usize, category: Category) -> Self {
        Self {
            phase: Phase::Running,
            processed,
            total,
            category: Some(category),
            error: None,
            ..self.clone()
        }
    }

    /// Derive the success terminal, keeping the counts reached.
    pub fn finished(&self) -> Self {
        self.advance(Phase::Finished)
    }

    /// Derive the cancellation terminal, keeping the counts reached.
    pub fn canceled(&self) -> Self {
        self.advance(Phase::Canceled)
    }

    /// Derive the failure terminal carrying its cause.
    pub fn failed(&self, error: BackupError) -> Self {
        Self { phase: Phase::Error, error: Some(error), ..self.clone() }
    }

    /// Whether this snapshot closes the run.
    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Phase ordering ====================

    #[test]
    fn run_starts_queued() {
        assert!(Phase::Queued.may_follow(None));
        assert!(!Phase::Login.may_follow(None));
        assert!(!Phase::Finished.may_follow(None));
    }

    #[test]
    fn normal_run_order_is_legal() {
        assert!(Phase::Login.may_follow(Some(Phase::Queued)));
        assert!(Phase::Calculating.may_follow(Some(Phase::Login)));
        assert!(Phase::Running.may_follow(Some(Phase::Calculating)));
        assert!(Phase::Running.may_follow(Some(Phase::Running)));
        assert!(Phase::Finished.may_follow(Some(Phase::Running)));
    }

    #[test]
    fn skip_run_finishes_from_queued() {
        assert!(Phase::Finished.may_follow(Some(Phase::Queued)));
    }

    #[test]
    fn empty_run_finishes_from_calculating() {
        assert!(Phase::Finished.may_follow(Some(Phase::Calculating)));
    }

    #[test]
    fn retry_returns_to_login() {
        assert!(Phase::Login.may_follow(Some(Phase::Calculating)));
        assert!(Phase::Login.may_follow(Some(Phase::Running)));
    }

    #[test]
    fn cancel_and_error_close_any_live_phase() {
        for phase in [Phase::Queued, Phase::Login, Phase::Calculating, Phase::Running] {
            assert!(Phase::Canceled.may_follow(Some(phase)));
            assert!(Phase::Error.may_follow(Some(phase)));
        }
    }

    #[test]
    fn nothing_follows_a_terminal_phase() {
        for terminal in [Phase::Finished, Phase::Canceled, Phase::Error] {
            for next in [
                Phase::Queued,
                Phase::Login,
                Phase::Calculating,
                Phase::Running,
                Phase::Finished,
                Phase::Canceled,
                Phase::Error,
            ] {
                assert!(!next.may_follow(Some(terminal)), "{next:?} after {terminal:?}");
            }
        }
    }

    #[test]
    fn backwards_jumps_are_illegal() {
        assert!(!Phase::Queued.may_follow(Some(Phase::Running)));
        assert!(!Phase::Calculating.may_follow(Some(Phase::Running)));
        assert!(!Phase::Running.may_follow(Some(Phase::Login)));
    }

    #[test]
    fn terminal_phases() {
        assert!(Phase::Finished.is_terminal());
        assert!(Phase::Canceled.is_terminal());
        assert!(Phase::Error.is_terminal());
        assert!(!Phase::Queued.is_terminal());
        assert!(!Phase::Running.is_terminal());
    }

    // ==================== Snapshots ====================

    #[test]
    fn queued_snapshot_is_zeroed() {
        let state = BackupState::queued(RunKind::Manual);
        assert_eq!(state.phase, Phase::Queued);
        assert_eq!(state.processed, 0);
        assert_eq!(state.total, 0);
        assert_eq!(state.category, None);
        assert_eq!(state.error, None);
    }

    #[test]
    fn advance_preserves_counts() {
        let state = BackupState::queued(RunKind::Scheduled)
            .advance(Phase::Login)
            .advance(Phase::Calculating);
        let running = state.running(3, 10, Category::Sms);
        let finished = running.finished();

        assert_eq!(finished.phase, Phase::Finished);
        assert_eq!(finished.processed, 3);
        assert_eq!(finished.total, 10);
        assert_eq!(finished.kind, RunKind::Scheduled);
        assert_eq!(finished.category, Some(Category::Sms));
    }

    #[test]
    fn with_totals_replaces_counts_only() {
        let state = BackupState::queued(RunKind::Manual).advance(Phase::Calculating);
        let sized = state.with_totals(0, 42);
        assert_eq!(sized.phase, Phase::Calculating);
        assert_eq!(sized.processed, 0);
        assert_eq!(sized.total, 42);
        assert_eq!(sized.kind, RunKind::Manual);
    }

    #[test]
    fn canceled_keeps_counts_reached() {
        let state = BackupState::queued(RunKind::Manual).running(4, 9, Category::Mms);
        let canceled = state.canceled();
        assert_eq!(canceled.phase, Phase::Canceled);
        assert_eq!(canceled.processed, 4);
        assert_eq!(canceled.total, 9);
        assert!(canceled.is_terminal());
    }

    #[test]
    fn failed_carries_the_cause() {
        let state = BackupState::queued(RunKind::Manual);
        let failed = state.failed(BackupError::MissingCredentials);
        assert_eq!(failed.phase, Phase::Error);
        assert_eq!(failed.error, Some(BackupError::MissingCredentials));
        assert!(failed.is_terminal());
    }

    #[test]
    fn advance_clears_stale_errors() {
        let failed = BackupState::queued(RunKind::Manual)
            .failed(BackupError::Connectivity("reset".into()));
        // A derived non-error snapshot must not drag the cause along
        assert_eq!(failed.advance(Phase::Login).error, None);
    }
}
