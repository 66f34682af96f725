//! # vault-core
//!
//! Pure run logic for msgvault. No I/O, no async, instant tests.
//!
//! - [`Phase`], [`BackupState`] - The run lifecycle machine and its
//!   progress snapshots
//! - [`Budget`] - Overall-cap accounting while batches are sized
//! - [`BatchQueue`], [`Chunk`] - Priority-ordered consumption of
//!   per-category batches
//!
//! The engine crate drives these against real collaborators; everything
//! here is testable with plain values.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod budget;
mod progress;
mod queue;

pub use budget::Budget;
pub use progress::{BackupState, Phase};
pub use queue::{BatchQueue, Chunk};
