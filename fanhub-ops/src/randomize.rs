//! Spreads post creation dates over a window

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rand::Rng;

use fanhub_db::db::repositories::PostRepository;
use fanhub_db::Database;

use crate::generate::random_day_and_time;

/// Posts between progress lines inside a batch
const PROGRESS_EVERY: usize = 10;

#[derive(Debug, Clone)]
pub struct RandomizeOptions {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub batch_size: usize,
    pub dry_run: bool,
}

impl Default for RandomizeOptions {
    fn default() -> Self {
        Self {
            start: default_start(),
            end: Utc::now(),
            batch_size: 100,
            dry_run: false,
        }
    }
}

pub fn default_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

/// Last second of `day`, so a date-only end still covers the whole day
pub fn end_of_day(day: NaiveDate) -> Option<DateTime<Utc>> {
    day.and_hms_opt(23, 59, 59).map(|dt| dt.and_utc())
}

#[derive(Debug, Default)]
pub struct RandomizeSummary {
    pub total_posts: u64,
    pub processed: u64,
    pub updated: u64,
    pub failed: u64,
}

pub fn run<R: Rng + ?Sized>(
    db: &Database,
    rng: &mut R,
    opts: &RandomizeOptions,
) -> Result<RandomizeSummary> {
    let posts = PostRepository::new(db.pool.clone());
    let mut summary = RandomizeSummary {
        total_posts: posts.count().context("Failed to count posts")?,
        ..RandomizeSummary::default()
    };

    tracing::info!("Found {} posts to process", summary.total_posts);
    if summary.total_posts == 0 {
        tracing::info!("No posts found. Exiting.");
        return Ok(summary);
    }

    let batch_size = opts.batch_size.max(1);
    let mut offset = 0;
    let mut batch_number = 0;
    loop {
        let ids = posts
            .page_ids(offset, batch_size)
            .with_context(|| format!("Failed to load posts at offset {}", offset))?;
        if ids.is_empty() {
            break;
        }
        batch_number += 1;
        tracing::info!("Processing batch {} ({} posts)...", batch_number, ids.len());

        let mut batch_updated = 0;
        for (index, id) in ids.iter().enumerate() {
            let created_at = random_day_and_time(rng, opts.start, opts.end);
            summary.processed += 1;

            if opts.dry_run {
                tracing::debug!("Would set post {} to {}", id, created_at);
                batch_updated += 1;
            } else {
                match posts.update_created_at(id, &created_at) {
                    Ok(true) => batch_updated += 1,
                    Ok(false) => {
                        summary.failed += 1;
                        tracing::warn!("Post {} disappeared before it could be updated", id);
                    }
                    Err(e) => {
                        summary.failed += 1;
                        tracing::error!("Error updating post {}: {:#}", id, e);
                    }
                }
            }

            if (index + 1) % PROGRESS_EVERY == 0 {
                tracing::info!(
                    "Updated {}/{} posts in current batch ({} successful)",
                    index + 1,
                    ids.len(),
                    batch_updated
                );
            }
        }

        summary.updated += batch_updated;
        tracing::info!(
            "Batch {} complete. Updated {}/{} posts. Progress: {}/{} posts ({:.0}%)",
            batch_number,
            batch_updated,
            ids.len(),
            summary.updated,
            summary.total_posts,
            summary.updated as f64 / summary.total_posts as f64 * 100.0
        );

        offset += ids.len();
    }

    Ok(summary)
}
