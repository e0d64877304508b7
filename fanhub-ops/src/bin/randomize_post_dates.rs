use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::Parser;

use fanhub_db::Settings;
use fanhub_ops::cli::{open_database, CommonArgs};
use fanhub_ops::logging;
use fanhub_ops::randomize::{self, default_start, end_of_day, RandomizeOptions};

/// Spread post dates over a window
#[derive(Parser, Debug)]
#[command(name = "randomize-post-dates")]
#[command(about = "Give every post a random creation date", long_about = None)]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    /// First day of the window (YYYY-MM-DD), defaults to 2024-01-01
    #[arg(long, value_parser = parse_start)]
    start: Option<DateTime<Utc>>,

    /// Last day of the window (YYYY-MM-DD, inclusive), defaults to now
    #[arg(long, value_parser = parse_end)]
    end: Option<DateTime<Utc>>,

    /// Posts loaded per page
    #[arg(long, default_value_t = 100)]
    batch_size: usize,

    /// Compute dates without writing them
    #[arg(short = 'n', long)]
    dry_run: bool,
}

fn parse_day(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {}", e))
}

fn parse_start(value: &str) -> Result<DateTime<Utc>, String> {
    parse_day(value)?
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .ok_or_else(|| format!("invalid date: {}", value))
}

fn parse_end(value: &str) -> Result<DateTime<Utc>, String> {
    end_of_day(parse_day(value)?).ok_or_else(|| format!("invalid date: {}", value))
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    logging::init(args.common.verbose);

    let settings = Settings::new().context("Failed to load settings")?;
    let database = args.common.database_path(&settings);

    let opts = RandomizeOptions {
        start: args.start.unwrap_or_else(default_start),
        end: args.end.unwrap_or_else(Utc::now),
        batch_size: args.batch_size,
        dry_run: args.dry_run,
    };
    if opts.end < opts.start {
        anyhow::bail!("--end {} is before --start {}", opts.end, opts.start);
    }

    println!("Post Date Randomizer");
    println!("====================");
    println!();
    println!("Database: {}", database);
    println!("Date range: {} to {}", opts.start.to_rfc3339(), opts.end.to_rfc3339());
    println!("Dry run: {}", opts.dry_run);
    println!();

    let db = open_database(&database, &["posts"])?;
    let summary = randomize::run(&db, &mut rand::thread_rng(), &opts)?;

    println!();
    println!("Post date randomization complete!");
    if opts.dry_run {
        println!("Would have updated {} of {} posts.", summary.updated, summary.total_posts);
    } else {
        println!("Successfully updated {} of {} posts with random dates.", summary.updated, summary.total_posts);
    }
    if summary.failed > 0 {
        println!("Failed updates: {}", summary.failed);
    }

    Ok(())
}
