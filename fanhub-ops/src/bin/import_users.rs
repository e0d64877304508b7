use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use fanhub_db::Settings;
use fanhub_ops::cli::{open_database, CommonArgs};
use fanhub_ops::import::{self, ImportOptions, ImportPacing};
use fanhub_ops::logging;

/// Import creator profiles from folders of images
#[derive(Parser, Debug)]
#[command(name = "import-users")]
#[command(about = "Import user folders (images and descriptions) as creators", long_about = None)]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    /// Directory with one subfolder per user (defaults to `import.downloads_dir`)
    #[arg(long)]
    downloads_dir: Option<PathBuf>,

    /// Public web root images are copied into (defaults to `import.public_dir`)
    #[arg(long)]
    public_dir: Option<PathBuf>,

    /// Folders processed between pauses
    #[arg(long, default_value_t = 3)]
    folder_batch: usize,
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    logging::init(args.common.verbose);

    let settings = Settings::new().context("Failed to load settings")?;
    let database = args.common.database_path(&settings);

    let mut opts = ImportOptions::from_settings(&settings);
    if let Some(dir) = args.downloads_dir {
        opts.downloads_dir = dir;
    }
    if let Some(dir) = args.public_dir {
        opts.public_dir = dir;
    }
    opts.folder_batch = args.folder_batch;
    if args.common.no_throttle {
        opts.pacing = ImportPacing::none();
    }

    println!("User Import");
    println!("===========");
    println!();
    println!("Database: {}", database);
    println!("Downloads: {}", opts.downloads_dir.display());
    println!("Public dir: {}", opts.public_dir.display());
    println!();

    let db = open_database(
        &database,
        &["users", "posts", "media", "attachments", "subscription_tiers", "follower_meta"],
    )?;

    let summary = import::run(&db, &mut rand::thread_rng(), &opts)?;

    println!();
    println!("Import process completed");
    println!("------------------------");
    println!("Total users: {}", summary.total_folders);
    println!("Successfully processed: {}", summary.imported);
    println!("Existing users reused: {}", summary.reused_users);
    println!("Posts created: {}", summary.posts_created);
    println!("Errors: {}", summary.failed);
    for (i, error) in summary.errors.iter().enumerate() {
        println!("  {}. {}", i + 1, error);
    }

    Ok(())
}
