use anyhow::{Context, Result};
use clap::Parser;

use fanhub_db::Settings;
use fanhub_ops::cli::{open_database, CommonArgs};
use fanhub_ops::follow_like::{self, FollowLikeOptions, FollowLikePacing, REQUIRED_TABLES};
use fanhub_ops::logging;

/// Give every creator a moderate number of followers and likes
#[derive(Parser, Debug)]
#[command(name = "follow-and-like")]
#[command(about = "Top creators up to a follower and like target using existing blank users", long_about = None)]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    #[arg(long, default_value_t = 50)]
    min_followers: u64,

    #[arg(long, default_value_t = 100)]
    max_followers: u64,

    #[arg(long, default_value_t = 30)]
    min_likes: u64,

    #[arg(long, default_value_t = 100)]
    max_likes: u64,

    /// Follows or likes inserted per transaction
    #[arg(long, default_value_t = 100)]
    batch_size: usize,

    /// Maximum number of users without posts to draw from
    #[arg(long, default_value_t = 10_000)]
    pool_limit: usize,
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    logging::init(args.common.verbose);

    let settings = Settings::new().context("Failed to load settings")?;
    let database = args.common.database_path(&settings);

    println!("Follow and Like");
    println!("===============");
    println!();
    println!("Database: {}", database);
    println!("Users will have {}-{} followers", args.min_followers, args.max_followers);
    println!("Posts will have {}-{} likes", args.min_likes, args.max_likes);
    println!();

    let db = open_database(&database, &REQUIRED_TABLES)?;

    let opts = FollowLikeOptions {
        followers: (args.min_followers, args.max_followers),
        likes: (args.min_likes, args.max_likes),
        batch_size: args.batch_size,
        pool_limit: args.pool_limit,
        pacing: if args.common.no_throttle {
            FollowLikePacing::none()
        } else {
            FollowLikePacing::default()
        },
    };

    let summary = follow_like::run(&db, &mut rand::thread_rng(), &opts)?;

    println!();
    println!("Follow and like process completed");
    println!("---------------------------------");
    println!("Processed {} content creators", summary.creators_processed);
    println!("Follows created: {}", summary.follows_created);
    println!("Likes created: {}", summary.likes_created);
    if !summary.errors.is_empty() {
        println!("Errors encountered: {}", summary.errors.len());
    }

    Ok(())
}
