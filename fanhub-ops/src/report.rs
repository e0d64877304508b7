//! Blank-profile statistics

use anyhow::{Context, Result};
use std::fmt::Write;

use fanhub_db::db::repositories::UserRepository;
use fanhub_db::Database;
use fanhub_types::BlankUserReport;

/// Blank users listed at the end of the report
pub const SAMPLE_SIZE: usize = 5;

const RULE: &str = "===============================================";

pub fn build(db: &Database) -> Result<BlankUserReport> {
    let users = UserRepository::new(db.pool.clone());

    Ok(BlankUserReport {
        without_posts: users.count_without_posts().context("Failed to count users without posts")?,
        without_avatar: users.count_without_avatar().context("Failed to count users without avatars")?,
        without_bio: users.count_without_bio().context("Failed to count users without bios")?,
        completely_blank: users.count_blank().context("Failed to count blank users")?,
        total_users: users.count_all().context("Failed to count users")?,
        post_distribution: users
            .post_count_distribution()
            .context("Failed to group users by post count")?,
        sample: users
            .find_blank(0, SAMPLE_SIZE)
            .context("Failed to sample blank users")?,
    })
}

/// Human readable rendering of the report
pub fn render(report: &BlankUserReport) -> Result<String> {
    let mut out = String::new();
    write_report(&mut out, report).context("Failed to format report")?;
    Ok(out)
}

fn write_report(out: &mut String, report: &BlankUserReport) -> std::fmt::Result {
    writeln!(out, "{}", RULE)?;
    writeln!(out, "           BLANK USER PROFILE REPORT          ")?;
    writeln!(out, "{}", RULE)?;
    writeln!(out)?;
    writeln!(out, "Users without any posts: {}", report.without_posts)?;
    writeln!(out, "Users without avatar images: {}", report.without_avatar)?;
    writeln!(out, "Users without bio information: {}", report.without_bio)?;
    writeln!(
        out,
        "Completely blank users (no posts, no avatar, no bio): {}",
        report.completely_blank
    )?;

    writeln!(out)?;
    writeln!(out, "Users grouped by post count:")?;
    for bucket in &report.post_distribution {
        writeln!(out, "{}: {} users", bucket.label(), bucket.user_count)?;
    }

    writeln!(out)?;
    writeln!(out, "Total users in the system: {}", report.total_users)?;

    writeln!(out)?;
    writeln!(out, "Sample of completely blank users:")?;
    if report.sample.is_empty() {
        writeln!(out, "(none)")?;
    }
    for user in &report.sample {
        writeln!(
            out,
            "- {} ({}), created: {}",
            user.shown_name(),
            user.id,
            user.created_at.format("%Y-%m-%d %H:%M:%S")
        )?;
    }

    writeln!(out)?;
    writeln!(out, "{}", RULE)?;
    writeln!(out, "                 REPORT COMPLETE               ")?;
    writeln!(out, "{}", RULE)?;
    Ok(())
}
