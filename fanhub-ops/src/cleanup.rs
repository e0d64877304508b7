//! Bulk removal of blank accounts

use anyhow::{Context, Result};

use fanhub_db::db::repositories::UserRepository;
use fanhub_db::Database;
use fanhub_types::UserSummary;

use crate::pacing::Pause;
use crate::retry::{retry, RetryPolicy};

#[derive(Debug, Clone, Copy)]
pub struct CleanupPacing {
    pub between_users: Pause,
    pub between_batches: Pause,
}

impl Default for CleanupPacing {
    fn default() -> Self {
        Self {
            between_users: Pause::millis(100),
            between_batches: Pause::secs(1),
        }
    }
}

impl CleanupPacing {
    pub fn none() -> Self {
        Self {
            between_users: Pause::NONE,
            between_batches: Pause::NONE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CleanupOptions {
    pub dry_run: bool,
    /// Stop after this many users
    pub limit: Option<u64>,
    pub batch_size: usize,
    pub retry: RetryPolicy,
    pub pacing: CleanupPacing,
}

impl Default for CleanupOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            limit: None,
            batch_size: 100,
            retry: RetryPolicy::default(),
            pacing: CleanupPacing::default(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CleanupSummary {
    pub total_blank: u64,
    pub to_process: u64,
    pub processed: u64,
    /// Deleted, or would have been deleted in a dry run
    pub deleted: u64,
    pub failed: u64,
    /// Users that no longer existed when their turn came
    pub already_gone: u64,
    pub cancelled: bool,
}

impl CleanupSummary {
    pub fn remaining(&self) -> u64 {
        self.total_blank.saturating_sub(self.deleted)
    }
}

/// Delete blank users in batches
///
/// `confirm` receives the number of users about to be deleted and is only
/// consulted for real runs; returning `false` cancels before any write.
pub fn run<F>(db: &Database, opts: &CleanupOptions, confirm: F) -> Result<CleanupSummary>
where
    F: FnOnce(u64) -> Result<bool>,
{
    let users = UserRepository::new(db.pool.clone());
    let mut summary = CleanupSummary {
        total_blank: users.count_blank().context("Failed to count blank users")?,
        ..CleanupSummary::default()
    };

    tracing::info!("Found {} blank users in the database", summary.total_blank);
    if summary.total_blank == 0 {
        tracing::info!("No blank users to remove. Exiting.");
        return Ok(summary);
    }

    summary.to_process = opts
        .limit
        .map_or(summary.total_blank, |limit| limit.min(summary.total_blank));
    let batch_size = opts.batch_size.max(1);
    tracing::info!(
        "Will process {} blank users in batches of {}",
        summary.to_process,
        batch_size
    );

    if !opts.dry_run && !confirm(summary.to_process)? {
        summary.cancelled = true;
        return Ok(summary);
    }

    // Deleted users drop out of the blank set, so a real run only skips past
    // the users it failed to delete.
    let mut offset = 0usize;
    let mut batch_number = 0;
    while summary.processed < summary.to_process {
        let take = usize::try_from(summary.to_process - summary.processed)
            .unwrap_or(usize::MAX)
            .min(batch_size);
        let batch = users
            .find_blank(offset, take)
            .with_context(|| format!("Failed to load blank users at offset {}", offset))?;
        if batch.is_empty() {
            tracing::info!("No more blank users found.");
            break;
        }

        batch_number += 1;
        tracing::info!("Processing batch {} ({} users)...", batch_number, batch.len());

        let failures = process_batch(&users, &batch, opts, &mut summary);
        offset += if opts.dry_run { batch.len() } else { failures };

        tracing::info!(
            "Progress: {}/{} users ({:.2}%)",
            summary.processed,
            summary.to_process,
            summary.processed as f64 / summary.to_process as f64 * 100.0
        );
        opts.pacing.between_batches.wait();
    }

    Ok(summary)
}

/// Returns how many users in the batch could not be deleted
fn process_batch(
    users: &UserRepository,
    batch: &[UserSummary],
    opts: &CleanupOptions,
    summary: &mut CleanupSummary,
) -> usize {
    let mut failures = 0;
    for user in batch {
        summary.processed += 1;
        let desc = format!("{} ({})", user.shown_name(), user.id);

        if opts.dry_run {
            summary.deleted += 1;
            tracing::info!(
                "[{}/{}] Would delete {}",
                summary.processed,
                summary.to_process,
                desc
            );
        } else {
            let label = format!("delete user {}", user.id);
            match retry(&label, opts.retry, || users.delete_with_related(&user.id)) {
                Ok(true) => {
                    summary.deleted += 1;
                    tracing::info!("[{}/{}] Deleted {}", summary.processed, summary.to_process, desc);
                }
                Ok(false) => {
                    summary.already_gone += 1;
                    tracing::warn!("[{}/{}] {} was already gone", summary.processed, summary.to_process, desc);
                }
                Err(e) => {
                    failures += 1;
                    summary.failed += 1;
                    tracing::error!("[{}/{}] Failed to delete {}: {}", summary.processed, summary.to_process, desc, e);
                }
            }
        }

        opts.pacing.between_users.wait();
    }
    failures
}
