use anyhow::{Context, Result};
use clap::Parser;

use fanhub_db::Settings;
use fanhub_ops::cli::{open_database, CommonArgs};
use fanhub_ops::logging;
use fanhub_ops::seed::{self, SeedOptions, SeedPacing};

/// Seed blank accounts that follow and like every creator
#[derive(Parser, Debug)]
#[command(name = "create-blank-users")]
#[command(about = "Create synthetic blank users and attach follows and likes to creators", long_about = None)]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    /// Number of blank users to create
    #[arg(long, default_value_t = 1_000_000)]
    total: usize,

    /// Users inserted per transaction
    #[arg(long, default_value_t = 1000)]
    batch_size: usize,

    #[arg(long, default_value_t = 500)]
    min_followers: u64,

    #[arg(long, default_value_t = 500_000)]
    max_followers: u64,

    #[arg(long, default_value_t = 500)]
    min_likes: u64,

    #[arg(long, default_value_t = 500_000)]
    max_likes: u64,

    /// Follows or likes inserted per transaction
    #[arg(long, default_value_t = 5000)]
    insert_batch: usize,

    /// Only create the users
    #[arg(long)]
    skip_engagement: bool,
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    logging::init(args.common.verbose);

    let settings = Settings::new().context("Failed to load settings")?;
    let database = args.common.database_path(&settings);

    println!("Blank User Generator");
    println!("====================");
    println!();
    println!("Database: {}", database);
    println!("Target: {} blank users", args.total);
    println!();

    let db = open_database(&database, &["users", "posts", "follows", "likes", "follower_meta"])?;

    let opts = SeedOptions {
        total_users: args.total,
        batch_size: args.batch_size,
        followers: (args.min_followers, args.max_followers),
        likes: (args.min_likes, args.max_likes),
        insert_batch: args.insert_batch,
        password: settings.seed.password.clone(),
        bcrypt_cost: settings.security.bcrypt_cost,
        skip_engagement: args.skip_engagement,
        pacing: if args.common.no_throttle {
            SeedPacing::none()
        } else {
            SeedPacing::default()
        },
    };

    let summary = seed::run(&db, &mut rand::thread_rng(), &opts)?;

    println!();
    println!("Blank user generation completed");
    println!("-------------------------------");
    println!("Total blank users created: {}", summary.users_created);
    println!("Creators with followers and likes: {}", summary.creators_processed);
    println!("Follows created: {}", summary.follows_created);
    println!("Likes created: {}", summary.likes_created);
    if !summary.errors.is_empty() {
        println!();
        println!("Errors encountered: {}", summary.errors.len());
        for (i, error) in summary.errors.iter().enumerate() {
            println!("  {}. {}", i + 1, error);
        }
    }

    Ok(())
}
