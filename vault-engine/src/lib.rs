//! # vault-engine
//!
//! Incremental backup engine for the msgvault archive.
//!
//! One [`BackupEngine::run`] transfers every not-yet-archived record from
//! the local store to the remote mail store, one bounded batch at a time.
//!
//! ## Features
//!
//! - **Incremental**: per-category watermarks make re-runs cheap and
//!   duplicate-free
//! - **Bounded**: a per-run item budget and a per-request batch cap keep
//!   memory flat regardless of backlog size
//! - **Cooperative**: cancellation tokens stop a run between batches
//! - **Pluggable**: every collaborator is a trait, with mock
//!   implementations for tests
//!
//! ## Example
//!
//! ```ignore
//! use msgvault_engine::{spawn_backup, BackupEngine, ChannelSink};
//! use msgvault_types::{RunConfig, RunKind};
//!
//! let (sink, mut progress) = ChannelSink::new();
//! let engine = Arc::new(BackupEngine::new(
//!     source, converter, store, watermarks, credentials, Arc::new(sink),
//! ));
//!
//! let handle = spawn_backup(engine, RunConfig::new(RunKind::Manual, 5000, 50));
//! while let Some(state) = progress.recv().await {
//!     println!("{}: {}/{}", state.phase, state.processed, state.total);
//! }
//! let terminal = handle.await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod calendar;
pub mod convert;
pub mod credentials;
pub mod engine;
pub mod mock;
pub mod progress;
pub mod source;
pub mod store;
pub mod watermark;

pub use calendar::CalendarMirror;
pub use convert::Converter;
pub use credentials::CredentialProvider;
pub use engine::{spawn_backup, BackupEngine};
pub use progress::{ChannelSink, ProgressSink};
pub use source::ItemSource;
pub use store::{MailSession, MailStore, RemoteFolder};
pub use watermark::{MemoryWatermarkStore, WatermarkStore};
