use anyhow::{Context, Result};
use clap::Parser;

use fanhub_db::{Database, Settings};
use fanhub_ops::logging;

/// Create the database schema
#[derive(Parser, Debug)]
#[command(name = "init-db")]
#[command(about = "Create the FanHub schema for local runs", long_about = None)]
struct Args {
    /// Path to the SQLite database file (defaults to `database.path` from settings)
    #[arg(short, long, env = "DATABASE_PATH")]
    database: Option<String>,

    /// Also load the fixture users and posts
    #[arg(long)]
    with_fixtures: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    logging::init(args.verbose);

    let settings = Settings::new().context("Failed to load settings")?;
    let database = args.database.unwrap_or(settings.database.path);

    let db = Database::new(&database).context("Failed to open database")?;
    db.initialize()?;
    println!("Schema applied to {}", database);

    if args.with_fixtures {
        db.seed_test_data()?;
        println!("Fixture data loaded");
    }

    Ok(())
}
