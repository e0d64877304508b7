use anyhow::{Context, Result};
use clap::Parser;

use fanhub_db::Settings;
use fanhub_ops::cli::{open_database, CommonArgs};
use fanhub_ops::{logging, report};

/// Report blank-profile statistics
#[derive(Parser, Debug)]
#[command(name = "count-blank-users")]
#[command(about = "Count users without posts, avatars or bios", long_about = None)]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    logging::init(args.common.verbose);

    let settings = Settings::new().context("Failed to load settings")?;
    let database = args.common.database_path(&settings);

    let db = open_database(&database, &["users", "posts"])?;
    let blank_report = report::build(&db)?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&blank_report).context("Failed to serialize report")?
        );
    } else {
        print!("{}", report::render(&blank_report)?);
    }

    Ok(())
}
