//! Archive new records from a message export.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use msgvault_core::{BackupState, Phase};
use msgvault_engine::{spawn_backup, BackupEngine, ChannelSink, WatermarkStore};
use msgvault_types::{ContactGroup, RunConfig, RunKind};

use crate::archive::MaildirStore;
use crate::config::ProfileConfig;
use crate::convert::TextConverter;
use crate::credentials::StaticCredentials;
use crate::export::JsonExportSource;
use crate::watermarks::JsonWatermarkStore;

/// Options for one backup invocation.
#[derive(Debug, Clone)]
pub struct BackupOpts {
    /// Directory holding the JSON message export.
    pub export: PathBuf,
    /// Overall cap on records archived in this run.
    pub max_items: usize,
    /// Records converted and appended per request.
    pub batch_size: usize,
    /// Only archive records from this contact group.
    pub group: Option<i64>,
    /// Record everything as archived without transferring.
    pub skip: bool,
}

/// Run the backup command.
pub async fn run(data_dir: &Path, opts: BackupOpts) -> Result<()> {
    let profile = ProfileConfig::load(data_dir).await?;

    let watermarks = Arc::new(JsonWatermarkStore::new(data_dir));
    let source = Arc::new(JsonExportSource::new(
        opts.export.clone(),
        Arc::clone(&watermarks) as Arc<dyn WatermarkStore>,
    ));
    let store = Arc::new(MaildirStore::new(profile.archive_dir.clone()));
    let credentials = Arc::new(StaticCredentials::new(profile.token.clone()));
    let (sink, mut progress) = ChannelSink::new();

    let engine = BackupEngine::new(
        source,
        Arc::new(TextConverter::new()),
        store,
        watermarks,
        credentials,
        Arc::new(sink),
    );
    debug!(
        export = %opts.export.display(),
        archive = %profile.archive_dir.display(),
        "backup collaborators wired"
    );

    // Ctrl-C cancels between batches rather than killing the process
    let token = engine.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, canceling after the current batch");
            token.cancel();
        }
    });

    let kind = if opts.skip { RunKind::Skip } else { RunKind::Manual };
    let mut config = RunConfig::new(kind, opts.max_items, opts.batch_size);
    if let Some(id) = opts.group {
        config = config.with_group(ContactGroup::new(id));
    }

    // The spawned task owns the engine; once the run ends and drops it, the
    // progress channel closes and the loop below falls through.
    let handle = spawn_backup(Arc::new(engine), config);
    while let Some(state) = progress.recv().await {
        print_state(&state);
    }

    let terminal = handle.await.context("Backup task panicked")?;
    match terminal.phase {
        Phase::Finished => {
            println!();
            match terminal.kind {
                RunKind::Skip => {
                    println!("Skip complete: current records are now marked as archived.")
                }
                _ if terminal.total == 0 => println!("Nothing new to archive."),
                _ => println!(
                    "Backup finished: {} record(s) archived to {}.",
                    terminal.processed,
                    profile.archive_dir.display()
                ),
            }
        }
        Phase::Canceled => {
            println!();
            println!(
                "Backup canceled after {} of {} record(s).",
                terminal.processed, terminal.total
            );
        }
        Phase::Error => {
            let cause = terminal
                .error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown error".to_string());
            anyhow::bail!("Backup failed: {}", cause);
        }
        _ => {}
    }

    Ok(())
}

fn print_state(state: &BackupState) {
    match state.phase {
        Phase::Queued => println!("Backup queued ({})", state.kind),
        Phase::Login => println!("Opening archive session..."),
        Phase::Calculating => println!("Calculating records to archive..."),
        Phase::Running => {
            if let Some(category) = state.category {
                println!(
                    "  archived {}/{} ({})",
                    state.processed, state.total, category
                );
            }
        }
        // Terminal phases get their summary after the task joins
        Phase::Finished | Phase::Canceled | Phase::Error => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use msgvault_types::{Category, Record, Timestamp};
    use tempfile::tempdir;

    fn opts(export: PathBuf) -> BackupOpts {
        BackupOpts {
            export,
            max_items: 5000,
            batch_size: 50,
            group: None,
            skip: false,
        }
    }

    async fn setup_profile(data_dir: &Path, token: &str) {
        ProfileConfig::new("me@example.org", data_dir.join("archive"), token)
            .save(data_dir)
            .await
            .unwrap();
    }

    async fn write_export(export: &Path, name: &str, records: &[Record]) {
        tokio::fs::create_dir_all(export).await.unwrap();
        let contents = serde_json::to_string_pretty(records).unwrap();
        tokio::fs::write(export.join(name), contents).await.unwrap();
    }

    fn archived(data_dir: &Path, folder: &str) -> usize {
        match std::fs::read_dir(data_dir.join("archive").join(folder)) {
            Ok(entries) => entries.count(),
            Err(_) => 0,
        }
    }

    #[tokio::test]
    async fn backup_archives_an_export_incrementally() {
        let dir = tempdir().unwrap();
        let export = dir.path().join("export");
        setup_profile(dir.path(), "tok").await;
        write_export(
            &export,
            "sms.json",
            &[
                Record::new(1, Timestamp::new(10)).with_field("body", "hi"),
                Record::new(2, Timestamp::new(20)).with_field("body", "there"),
            ],
        )
        .await;

        run(dir.path(), opts(export.clone())).await.unwrap();
        assert_eq!(archived(dir.path(), "messages"), 2);

        let marks = JsonWatermarkStore::new(dir.path());
        assert_eq!(
            marks.get(Category::Sms).await.unwrap(),
            Some(Timestamp::new(20))
        );

        // A second run finds nothing new
        run(dir.path(), opts(export)).await.unwrap();
        assert_eq!(archived(dir.path(), "messages"), 2);
    }

    #[tokio::test]
    async fn skip_marks_records_without_archiving() {
        let dir = tempdir().unwrap();
        let export = dir.path().join("export");
        setup_profile(dir.path(), "tok").await;
        write_export(
            &export,
            "sms.json",
            &[Record::new(1, Timestamp::new(70)).with_field("body", "x")],
        )
        .await;

        let mut o = opts(export);
        o.skip = true;
        run(dir.path(), o).await.unwrap();

        assert_eq!(archived(dir.path(), "messages"), 0);
        let marks = JsonWatermarkStore::new(dir.path());
        assert_eq!(
            marks.get(Category::Sms).await.unwrap(),
            Some(Timestamp::new(70))
        );
    }

    #[tokio::test]
    async fn backup_requires_a_profile() {
        let dir = tempdir().unwrap();
        let err = run(dir.path(), opts(dir.path().join("export")))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("msgvault init"));
    }

    #[tokio::test]
    async fn backup_without_a_token_refuses_to_transfer() {
        let dir = tempdir().unwrap();
        let export = dir.path().join("export");
        setup_profile(dir.path(), "").await;
        write_export(
            &export,
            "chats.json",
            &[Record::new(1, Timestamp::new(5)).with_field("body", "x")],
        )
        .await;

        let err = run(dir.path(), opts(export)).await.unwrap_err();
        assert!(err.to_string().contains("no remote credentials configured"));
        assert_eq!(archived(dir.path(), "chats"), 0);
    }

    #[tokio::test]
    async fn group_filter_limits_what_is_archived() {
        let dir = tempdir().unwrap();
        let export = dir.path().join("export");
        setup_profile(dir.path(), "tok").await;
        write_export(
            &export,
            "sms.json",
            &[
                Record::new(1, Timestamp::new(10))
                    .with_field("body", "in group")
                    .with_field("contact_group", "4"),
                Record::new(2, Timestamp::new(20)).with_field("body", "not in group"),
            ],
        )
        .await;

        let mut o = opts(export);
        o.group = Some(4);
        run(dir.path(), o).await.unwrap();

        assert_eq!(archived(dir.path(), "messages"), 1);
    }

    #[tokio::test]
    async fn empty_export_finishes_cleanly() {
        let dir = tempdir().unwrap();
        let export = dir.path().join("export");
        tokio::fs::create_dir_all(&export).await.unwrap();
        setup_profile(dir.path(), "tok").await;

        run(dir.path(), opts(export)).await.unwrap();
        assert_eq!(archived(dir.path(), "messages"), 0);
    }
}
