//! # vault-types
//!
//! Shared types for the msgvault archive engine.
//!
//! This crate provides the foundational types used across all msgvault
//! crates:
//! - [`Category`], [`FolderGroup`] - Record kinds and their remote folder grouping
//! - [`Timestamp`], [`Record`], [`Batch`] - Local records and watermark ordering
//! - [`MailMessage`], [`Conversion`] - Transport messages derived from records
//! - [`RunConfig`], [`RunKind`] - Per-run parameters
//! - [`BackupError`] - Classified failure causes

#![warn(missing_docs)]
#![warn(clippy::all)]

mod category;
mod config;
mod error;
mod record;

pub use category::{Category, FolderGroup};
pub use config::{ContactGroup, RunConfig, RunKind};
pub use error::BackupError;
pub use record::{Batch, Conversion, MailMessage, MessageId, Record, Timestamp};
