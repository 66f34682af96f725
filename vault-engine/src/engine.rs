//! The backup engine.
//!
//! [`BackupEngine::run`] drives one run from `Queued` to a terminal phase:
//! size the run against the item budget, drain the batch queue in category
//! priority order, and commit each category watermark before the matching
//! append so an interrupted run re-archives nothing. Expired credentials
//! earn the run a single refresh-and-retry with a fresh store session.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use msgvault_core::{BackupState, BatchQueue, Budget, Phase};
use msgvault_types::{BackupError, Category, FolderGroup, RunConfig, Timestamp};

use crate::calendar::CalendarMirror;
use crate::convert::Converter;
use crate::credentials::CredentialProvider;
use crate::progress::ProgressSink;
use crate::source::ItemSource;
use crate::store::{MailSession, MailStore, RemoteFolder};
use crate::watermark::WatermarkStore;

/// Releases the item source when an attempt ends, on every exit path.
struct SourceGuard<'a> {
    source: &'a dyn ItemSource,
}

impl Drop for SourceGuard<'_> {
    fn drop(&mut self) {
        self.source.release();
    }
}

/// The folders opened under one store session, closed together when the
/// attempt ends.
struct FolderSet {
    session: Box<dyn MailSession>,
    folders: Vec<(FolderGroup, Box<dyn RemoteFolder>)>,
}

impl FolderSet {
    fn new(session: Box<dyn MailSession>) -> Self {
        Self { session, folders: Vec::new() }
    }

    /// Folder for `group`, opened on first use and reused afterwards.
    async fn get_or_open(
        &mut self,
        group: FolderGroup,
    ) -> Result<&mut dyn RemoteFolder, BackupError> {
        if self.folders.iter().all(|(open, _)| *open != group) {
            let folder = self.session.open_folder(group).await?;
            self.folders.push((group, folder));
        }
        let index = self
            .folders
            .iter()
            .position(|(open, _)| *open == group)
            .ok_or_else(|| BackupError::Protocol(format!("folder {} not open", group.folder_name())))?;
        Ok(self.folders[index].1.as_mut())
    }

    /// Close every open folder exactly once. Close failures are logged and
    /// swallowed so they cannot mask the attempt's own outcome.
    async fn close_all(&mut self) {
        for (group, folder) in &mut self.folders {
            if let Err(error) = folder.close().await {
                warn!(group = group.folder_name(), %error, "failed to close remote folder");
            }
        }
        self.folders.clear();
    }
}

/// Publishes snapshots to the progress sink, tracking the last phase sent so
/// emission order stays within [`Phase::may_follow`].
struct Publisher<'a> {
    sink: &'a dyn ProgressSink,
    last: Option<Phase>,
}

impl<'a> Publisher<'a> {
    fn new(sink: &'a dyn ProgressSink) -> Self {
        Self { sink, last: None }
    }

    fn publish(&mut self, state: &BackupState) {
        debug_assert!(
            state.phase.may_follow(self.last),
            "phase {} may not follow {:?}",
            state.phase,
            self.last,
        );
        self.last = Some(state.phase);
        self.sink.on_state(state.clone());
    }
}

/// One-run backup engine over injected collaborators.
///
/// The engine owns no I/O of its own. Construction wires in the item source,
/// converter, mail store, watermark store, and credential provider; a run
/// borrows them all for one pass. Cancellation arrives through the token
/// handed to [`with_cancellation`](BackupEngine::with_cancellation) and is
/// honored between batches.
pub struct BackupEngine {
    source: Arc<dyn ItemSource>,
    converter: Arc<dyn Converter>,
    store: Arc<dyn MailStore>,
    watermarks: Arc<dyn WatermarkStore>,
    credentials: Arc<dyn CredentialProvider>,
    calendar: Option<Arc<dyn CalendarMirror>>,
    sink: Arc<dyn ProgressSink>,
    cancel: CancellationToken,
}

impl BackupEngine {
    /// Wire up an engine from its collaborators.
    pub fn new(
        source: Arc<dyn ItemSource>,
        converter: Arc<dyn Converter>,
        store: Arc<dyn MailStore>,
        watermarks: Arc<dyn WatermarkStore>,
        credentials: Arc<dyn CredentialProvider>,
        sink: Arc<dyn ProgressSink>,
    ) -> Self {
        Self {
            source,
            converter,
            store,
            watermarks,
            credentials,
            calendar: None,
            sink,
            cancel: CancellationToken::new(),
        }
    }

    /// Mirror call-log batches into a calendar after they are archived.
    pub fn with_calendar(mut self, calendar: Arc<dyn CalendarMirror>) -> Self {
        self.calendar = Some(calendar);
        self
    }

    /// Use an externally owned cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// A token that cancels this engine's runs when triggered.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Execute one backup run to its terminal state.
    ///
    /// Publishes a `Queued` snapshot immediately, then one snapshot per
    /// phase change and per completed batch, and finally the terminal
    /// snapshot it also returns. The terminal is published exactly once,
    /// even across the credential-refresh retry.
    pub async fn run(&self, config: RunConfig) -> BackupState {
        let mut config = config;
        let mut state = BackupState::queued(config.kind);
        let mut publisher = Publisher::new(self.sink.as_ref());
        publisher.publish(&state);

        info!(kind = %config.kind, max_items = config.max_items, "backup run queued");

        let terminal = loop {
            match self.attempt(&config, &mut state, &mut publisher).await {
                Ok(done) => break done,
                Err(error) if error.is_retryable() && config.can_retry() => {
                    info!(%error, "credentials rejected, attempting refresh");
                    if self.credentials.refresh().await {
                        config = config.retry();
                        continue;
                    }
                    warn!("credential refresh failed, giving up");
                    break state.failed(error);
                }
                Err(error) => {
                    warn!(%error, "backup run failed");
                    break state.failed(error);
                }
            }
        };

        publisher.publish(&terminal);
        info!(
            phase = %terminal.phase,
            processed = terminal.processed,
            total = terminal.total,
            "backup run ended"
        );
        terminal
    }

    /// One attempt at the run. `Ok` carries the unpublished terminal
    /// snapshot; a retryable `Err` may earn a second attempt.
    async fn attempt(
        &self,
        config: &RunConfig,
        state: &mut BackupState,
        publisher: &mut Publisher<'_>,
    ) -> Result<BackupState, BackupError> {
        // Skip runs fast-forward watermarks without touching the source
        // lock or the remote store.
        if config.kind.is_skip() {
            return self.skip_run(state).await;
        }

        *state = state.advance(Phase::Login);
        publisher.publish(state);

        self.source.acquire().await?;
        let _guard = SourceGuard { source: self.source.as_ref() };
        self.attempt_locked(config, state, publisher).await
    }

    /// Advance every category's watermark to the newest local record,
    /// marking everything currently on the device as already archived.
    async fn skip_run(&self, state: &BackupState) -> Result<BackupState, BackupError> {
        for category in Category::IN_PRIORITY_ORDER {
            if let Some(newest) = self.source.max_timestamp(category).await? {
                self.watermarks.set(category, newest).await?;
                debug!(%category, watermark = %newest, "skip run advanced watermark");
            }
        }
        info!("skip run complete");
        Ok(state.finished())
    }

    /// The body of an attempt, entered with the item source held.
    async fn attempt_locked(
        &self,
        config: &RunConfig,
        state: &mut BackupState,
        publisher: &mut Publisher<'_>,
    ) -> Result<BackupState, BackupError> {
        *state = state.advance(Phase::Calculating);
        publisher.publish(state);

        // Size the run. Each category sees only the budget its
        // predecessors left over; a zero remainder still asks, and gets an
        // empty batch back.
        let mut budget = Budget::new(config.max_items);
        let mut queue = BatchQueue::new();
        for category in Category::IN_PRIORITY_ORDER {
            let batch = self
                .source
                .fetch(category, config.group, budget.remaining())
                .await?;
            budget.consume(batch.len());
            queue.push(batch);
        }

        let total = budget.sized();
        *state = state.with_totals(0, total);
        debug!(total, "sized backup run");

        if total == 0 {
            if self.watermarks.is_first_run().await? {
                // A first run over an empty device would otherwise stay a
                // "first run" forever; plant floor watermarks so later
                // runs see an initialized profile.
                self.watermarks.set(Category::Sms, Timestamp::ZERO).await?;
                self.watermarks.set(Category::Mms, Timestamp::ZERO).await?;
                info!("first run found no records, wrote floor watermarks");
            }
            return Ok(state.finished());
        }

        if !self.credentials.is_configured() {
            return Err(BackupError::MissingCredentials);
        }

        let session = self.store.open_session().await?;
        let mut folders = FolderSet::new(session);

        let outcome = self
            .run_loop(config, state, publisher, &mut queue, &mut folders, total)
            .await;
        folders.close_all().await;
        outcome
    }

    /// Drain the queue one chunk at a time, committing watermarks and
    /// appending messages, until done or canceled.
    async fn run_loop(
        &self,
        config: &RunConfig,
        state: &mut BackupState,
        publisher: &mut Publisher<'_>,
        queue: &mut BatchQueue,
        folders: &mut FolderSet,
        total: usize,
    ) -> Result<BackupState, BackupError> {
        let mut processed = 0;

        while processed < total {
            // Cancellation is honored between batches, never inside one.
            if self.cancel.is_cancelled() {
                info!(processed, total, "backup run canceled");
                return Ok(state.canceled());
            }

            let chunk = match queue.next_chunk(config.batch_cap) {
                Some(chunk) => chunk,
                None => break,
            };
            let category = chunk.category;

            let conversion = self.converter.convert(&chunk).await?;
            if !conversion.is_empty() {
                if let Some(newest) = conversion.max_timestamp {
                    // Watermark first, append second: a crash between the
                    // two loses these records from the archive rather than
                    // duplicating them on the next run.
                    self.watermarks.set(category, newest).await?;
                }

                let folder = folders.get_or_open(category.folder_group()).await?;
                folder.append(&conversion.messages).await?;
                debug!(%category, messages = conversion.len(), "appended batch");

                if category == Category::CallLog {
                    if let Some(calendar) = &self.calendar {
                        if let Err(error) = calendar.mirror(&conversion).await {
                            warn!(%error, "calendar mirror failed, continuing run");
                        }
                    }
                }
            }

            // The counter tracks converted messages, so a converter that
            // declines records leaves it short of `total`; the drained
            // queue ends the loop in that case.
            processed += conversion.len();
            *state = state.running(processed, total, category);
            publisher.publish(state);
        }

        Ok(state.finished())
    }
}

/// Run a backup on a spawned task and hand back its join handle.
///
/// The caller keeps the engine (and its cancellation token) while the run
/// proceeds in the background; the handle resolves to the terminal snapshot.
pub fn spawn_backup(
    engine: Arc<BackupEngine>,
    config: RunConfig,
) -> tokio::task::JoinHandle<BackupState> {
    tokio::spawn(async move { engine.run(config).await })
}
