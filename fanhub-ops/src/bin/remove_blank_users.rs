use anyhow::{Context, Result};
use clap::Parser;

use fanhub_db::Settings;
use fanhub_ops::cleanup::{self, CleanupOptions, CleanupPacing};
use fanhub_ops::cli::{confirm, open_database, CommonArgs};
use fanhub_ops::logging;
use fanhub_ops::retry::RetryPolicy;

/// Remove blank users and everything that references them
#[derive(Parser, Debug)]
#[command(name = "remove-blank-users")]
#[command(about = "Remove blank users from the database", long_about = None)]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    /// Run without actually deleting users
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Limit the number of users to delete
    #[arg(long)]
    limit: Option<u64>,

    /// Number of users to process in each batch
    #[arg(long, default_value_t = 100)]
    batch_size: usize,

    /// Skip confirmation prompt
    #[arg(short = 'y', long)]
    yes: bool,
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    logging::init(args.common.verbose);

    let settings = Settings::new().context("Failed to load settings")?;
    let database = args.common.database_path(&settings);

    println!("===============================================");
    println!("           BLANK USER REMOVAL TOOL            ");
    println!("===============================================");
    println!();
    println!("Database: {}", database);
    if args.dry_run {
        println!("DRY RUN MODE: No users will actually be deleted");
    }
    if let Some(limit) = args.limit {
        println!("User deletion limited to {} users", limit);
    }
    println!();

    let db = open_database(
        &database,
        &[
            "users",
            "posts",
            "follows",
            "likes",
            "bookmarks",
            "comments",
            "attachments",
            "subscription_tiers",
            "subscriptions",
            "follower_meta",
        ],
    )?;

    let opts = CleanupOptions {
        dry_run: args.dry_run,
        limit: args.limit,
        batch_size: args.batch_size,
        retry: RetryPolicy::default(),
        pacing: if args.common.no_throttle {
            CleanupPacing::none()
        } else {
            CleanupPacing::default()
        },
    };

    let yes = args.yes;
    let summary = cleanup::run(&db, &opts, |count| {
        if yes {
            return Ok(true);
        }
        println!("WARNING: This will permanently delete {} users and all their related data!", count);
        println!("Run with --dry-run to test without deleting.");
        confirm("Do you want to continue?")
    })?;

    if summary.cancelled {
        println!("Operation cancelled.");
        return Ok(());
    }

    println!();
    println!("===============================================");
    println!("               REMOVAL COMPLETE                ");
    println!("===============================================");
    println!("Processed: {} users", summary.processed);
    if args.dry_run {
        println!("Would have deleted: {} users", summary.deleted);
    } else {
        println!("Deleted: {} users", summary.deleted);
    }
    if summary.failed > 0 {
        println!("Failed: {} users", summary.failed);
    }
    println!("Remaining blank users: {}", summary.remaining());

    Ok(())
}
