//! Mock collaborators for testing.
//!
//! Every mock captures the calls made to it and exposes `fail_next_*` knobs
//! so tests can drive each error path of the engine. Clones share state, so
//! a test can keep a handle while the engine owns another.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

use msgvault_core::{BackupState, Chunk, Phase};
use msgvault_types::{
    BackupError, Batch, Category, ContactGroup, Conversion, FolderGroup, MailMessage,
    Record, Timestamp,
};

use crate::calendar::CalendarMirror;
use crate::convert::Converter;
use crate::credentials::CredentialProvider;
use crate::progress::ProgressSink;
use crate::source::ItemSource;
use crate::store::{MailSession, MailStore, RemoteFolder};

// ============================================================
// MockItemSource
// ============================================================

/// Mock record source backed by per-category record lists.
///
/// `fetch` returns the first `max` records of a category and never drains
/// them; tests control visibility by seeding exactly what a run should see.
#[derive(Debug, Default)]
pub struct MockItemSource {
    inner: Arc<Mutex<SourceInner>>,
}

#[derive(Debug, Default)]
struct SourceInner {
    records: HashMap<Category, Vec<Record>>,
    acquired: bool,
    acquire_count: u32,
    release_count: u32,
    fetch_calls: Vec<(Category, Option<ContactGroup>, usize)>,
    fail_next_acquire: Option<BackupError>,
    fail_next_fetch: Option<BackupError>,
}

impl MockItemSource {
    /// Create a source with no records.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed records for one category.
    pub fn add_records(&self, category: Category, records: Vec<Record>) {
        let mut inner = self.inner.lock().unwrap();
        inner.records.entry(category).or_default().extend(records);
    }

    /// Every `fetch` call made, in order, with its arguments.
    pub fn fetch_calls(&self) -> Vec<(Category, Option<ContactGroup>, usize)> {
        self.inner.lock().unwrap().fetch_calls.clone()
    }

    /// Number of `acquire` calls.
    pub fn acquire_count(&self) -> u32 {
        self.inner.lock().unwrap().acquire_count
    }

    /// Number of `release` calls.
    pub fn release_count(&self) -> u32 {
        self.inner.lock().unwrap().release_count
    }

    /// Whether the store is currently held.
    pub fn is_acquired(&self) -> bool {
        self.inner.lock().unwrap().acquired
    }

    /// Cause the next `acquire` to fail.
    pub fn fail_next_acquire(&self, error: BackupError) {
        self.inner.lock().unwrap().fail_next_acquire = Some(error);
    }

    /// Cause the next `fetch` to fail.
    pub fn fail_next_fetch(&self, error: BackupError) {
        self.inner.lock().unwrap().fail_next_fetch = Some(error);
    }
}

impl Clone for MockItemSource {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

#[async_trait]
impl ItemSource for MockItemSource {
    async fn acquire(&self) -> Result<(), BackupError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(error) = inner.fail_next_acquire.take() {
            return Err(error);
        }
        inner.acquired = true;
        inner.acquire_count += 1;
        Ok(())
    }

    fn release(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.acquired = false;
        inner.release_count += 1;
    }

    async fn fetch(
        &self,
        category: Category,
        group: Option<ContactGroup>,
        max: usize,
    ) -> Result<Batch, BackupError> {
        let mut inner = self.inner.lock().unwrap();
        inner.fetch_calls.push((category, group, max));
        if let Some(error) = inner.fail_next_fetch.take() {
            return Err(error);
        }
        let records = inner
            .records
            .get(&category)
            .map(|all| all.iter().take(max).cloned().collect())
            .unwrap_or_default();
        Ok(Batch::new(category, records))
    }

    async fn max_timestamp(
        &self,
        category: Category,
    ) -> Result<Option<Timestamp>, BackupError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .records
            .get(&category)
            .and_then(|records| records.iter().map(|r| r.timestamp).max()))
    }
}

// ============================================================
// MockConverter
// ============================================================

/// Mock converter producing one message per record.
#[derive(Debug, Default)]
pub struct MockConverter {
    inner: Arc<Mutex<ConverterInner>>,
}

#[derive(Debug, Default)]
struct ConverterInner {
    calls: Vec<(Category, usize)>,
    decline_all: bool,
    fail_next: Option<BackupError>,
}

impl MockConverter {
    /// Create a converter with default one-message-per-record behavior.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `convert` call made: the chunk's category and record count.
    pub fn calls(&self) -> Vec<(Category, usize)> {
        self.inner.lock().unwrap().calls.clone()
    }

    /// Categories converted, in call order.
    pub fn categories_converted(&self) -> Vec<Category> {
        self.inner.lock().unwrap().calls.iter().map(|(c, _)| *c).collect()
    }

    /// Make every conversion come back empty.
    pub fn decline_all(&self) {
        self.inner.lock().unwrap().decline_all = true;
    }

    /// Cause the next `convert` to fail.
    pub fn fail_next(&self, error: BackupError) {
        self.inner.lock().unwrap().fail_next = Some(error);
    }
}

impl Clone for MockConverter {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

#[async_trait]
impl Converter for MockConverter {
    async fn convert(&self, chunk: &Chunk) -> Result<Conversion, BackupError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push((chunk.category, chunk.len()));
        if let Some(error) = inner.fail_next.take() {
            return Err(error);
        }
        if inner.decline_all {
            return Ok(Conversion::empty());
        }
        let messages: Vec<MailMessage> = chunk
            .records
            .iter()
            .map(|record| {
                let body = format!("{}: record {}", chunk.category, record.id);
                MailMessage::new(record.timestamp, body.into_bytes())
            })
            .collect();
        let max_timestamp = chunk.records.iter().map(|r| r.timestamp).max();
        Ok(Conversion { messages, max_timestamp })
    }
}

// ============================================================
// MockMailStore
// ============================================================

/// Mock remote store recording sessions, folder lifecycles, and appends.
#[derive(Debug, Default)]
pub struct MockMailStore {
    inner: Arc<Mutex<StoreInner>>,
}

#[derive(Debug, Default)]
struct StoreInner {
    sessions_opened: u32,
    folders_opened: Vec<FolderGroup>,
    folders_closed: Vec<FolderGroup>,
    appends: Vec<(FolderGroup, Vec<MailMessage>)>,
    append_failures: VecDeque<BackupError>,
    fail_next_open_session: Option<BackupError>,
    fail_next_open_folder: Option<BackupError>,
    cancel_on_append: Option<CancellationToken>,
}

impl MockMailStore {
    /// Create a store that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sessions opened so far.
    pub fn sessions_opened(&self) -> u32 {
        self.inner.lock().unwrap().sessions_opened
    }

    /// Folder groups opened, in order (across all sessions).
    pub fn folders_opened(&self) -> Vec<FolderGroup> {
        self.inner.lock().unwrap().folders_opened.clone()
    }

    /// Folder groups closed, in order.
    pub fn folders_closed(&self) -> Vec<FolderGroup> {
        self.inner.lock().unwrap().folders_closed.clone()
    }

    /// Every append made: the folder group and its messages.
    pub fn appends(&self) -> Vec<(FolderGroup, Vec<MailMessage>)> {
        self.inner.lock().unwrap().appends.clone()
    }

    /// Total messages appended across all folders.
    pub fn appended_count(&self) -> usize {
        self.inner.lock().unwrap().appends.iter().map(|(_, m)| m.len()).sum()
    }

    /// Queue an error for an upcoming append; each queued error fails
    /// exactly one append, in order.
    pub fn queue_append_failure(&self, error: BackupError) {
        self.inner.lock().unwrap().append_failures.push_back(error);
    }

    /// Cause the next `open_session` to fail.
    pub fn fail_next_open_session(&self, error: BackupError) {
        self.inner.lock().unwrap().fail_next_open_session = Some(error);
    }

    /// Cause the next `open_folder` to fail.
    pub fn fail_next_open_folder(&self, error: BackupError) {
        self.inner.lock().unwrap().fail_next_open_folder = Some(error);
    }

    /// Cancel the given token as a side effect of every successful append,
    /// simulating a cancellation that lands while an append is in flight.
    pub fn cancel_on_append(&self, token: CancellationToken) {
        self.inner.lock().unwrap().cancel_on_append = Some(token);
    }
}

impl Clone for MockMailStore {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

#[async_trait]
impl MailStore for MockMailStore {
    async fn open_session(&self) -> Result<Box<dyn MailSession>, BackupError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(error) = inner.fail_next_open_session.take() {
            return Err(error);
        }
        inner.sessions_opened += 1;
        Ok(Box::new(MockMailSession { inner: Arc::clone(&self.inner) }))
    }
}

struct MockMailSession {
    inner: Arc<Mutex<StoreInner>>,
}

#[async_trait]
impl MailSession for MockMailSession {
    async fn open_folder(
        &self,
        group: FolderGroup,
    ) -> Result<Box<dyn RemoteFolder>, BackupError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(error) = inner.fail_next_open_folder.take() {
            return Err(error);
        }
        inner.folders_opened.push(group);
        Ok(Box::new(MockFolder { group, inner: Arc::clone(&self.inner) }))
    }
}

struct MockFolder {
    group: FolderGroup,
    inner: Arc<Mutex<StoreInner>>,
}

#[async_trait]
impl RemoteFolder for MockFolder {
    async fn append(&mut self, messages: &[MailMessage]) -> Result<(), BackupError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(error) = inner.append_failures.pop_front() {
            return Err(error);
        }
        inner.appends.push((self.group, messages.to_vec()));
        if let Some(token) = &inner.cancel_on_append {
            token.cancel();
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<(), BackupError> {
        let mut inner = self.inner.lock().unwrap();
        inner.folders_closed.push(self.group);
        Ok(())
    }
}

// ============================================================
// MockCredentials
// ============================================================

/// Mock credential provider with a fixed configuration state and a settable
/// refresh outcome.
#[derive(Debug)]
pub struct MockCredentials {
    inner: Arc<Mutex<CredentialsInner>>,
}

#[derive(Debug)]
struct CredentialsInner {
    configured: bool,
    refresh_result: bool,
    refresh_calls: u32,
}

impl MockCredentials {
    /// Credentials present; refresh succeeds unless told otherwise.
    pub fn configured() -> Self {
        Self {
            inner: Arc::new(Mutex::new(CredentialsInner {
                configured: true,
                refresh_result: true,
                refresh_calls: 0,
            })),
        }
    }

    /// No credentials configured.
    pub fn unconfigured() -> Self {
        Self {
            inner: Arc::new(Mutex::new(CredentialsInner {
                configured: false,
                refresh_result: false,
                refresh_calls: 0,
            })),
        }
    }

    /// Set what the next refreshes return.
    pub fn set_refresh_result(&self, result: bool) {
        self.inner.lock().unwrap().refresh_result = result;
    }

    /// Number of `refresh` calls made.
    pub fn refresh_calls(&self) -> u32 {
        self.inner.lock().unwrap().refresh_calls
    }
}

impl Clone for MockCredentials {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

#[async_trait]
impl CredentialProvider for MockCredentials {
    fn is_configured(&self) -> bool {
        self.inner.lock().unwrap().configured
    }

    async fn refresh(&self) -> bool {
        let mut inner = self.inner.lock().unwrap();
        inner.refresh_calls += 1;
        inner.refresh_result
    }
}

// ============================================================
// MockCalendar
// ============================================================

/// Mock calendar mirror capturing mirrored conversions.
#[derive(Debug, Default)]
pub struct MockCalendar {
    inner: Arc<Mutex<CalendarInner>>,
}

#[derive(Debug, Default)]
struct CalendarInner {
    mirrored: Vec<Conversion>,
    fail_next: Option<BackupError>,
}

impl MockCalendar {
    /// Create a calendar mirror that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Conversions mirrored so far.
    pub fn mirrored(&self) -> Vec<Conversion> {
        self.inner.lock().unwrap().mirrored.clone()
    }

    /// Number of mirrored conversions.
    pub fn mirrored_count(&self) -> usize {
        self.inner.lock().unwrap().mirrored.len()
    }

    /// Cause the next `mirror` to fail.
    pub fn fail_next_mirror(&self, error: BackupError) {
        self.inner.lock().unwrap().fail_next = Some(error);
    }
}

impl Clone for MockCalendar {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

#[async_trait]
impl CalendarMirror for MockCalendar {
    async fn mirror(&self, conversion: &Conversion) -> Result<(), BackupError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(error) = inner.fail_next.take() {
            return Err(error);
        }
        inner.mirrored.push(conversion.clone());
        Ok(())
    }
}

// ============================================================
// RecordingSink
// ============================================================

/// Progress sink that records every snapshot it receives.
#[derive(Debug, Default)]
pub struct RecordingSink {
    states: Arc<Mutex<Vec<BackupState>>>,
}

impl RecordingSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// All snapshots received, in order.
    pub fn states(&self) -> Vec<BackupState> {
        self.states.lock().unwrap().clone()
    }

    /// The phases of all snapshots received, in order.
    pub fn phases(&self) -> Vec<Phase> {
        self.states.lock().unwrap().iter().map(|s| s.phase).collect()
    }

    /// The most recent snapshot, if any.
    pub fn last(&self) -> Option<BackupState> {
        self.states.lock().unwrap().last().cloned()
    }
}

impl Clone for RecordingSink {
    fn clone(&self) -> Self {
        Self { states: Arc::clone(&self.states) }
    }
}

impl ProgressSink for RecordingSink {
    fn on_state(&self, state: BackupState) {
        self.states.lock().unwrap().push(state);
    }
}
