use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod diff;
mod error;
mod report;
mod scrape;
mod snapshot;
mod types;
mod utils;

use crate::diff::diff;
use crate::report::{build_report, console_summary};
use crate::scrape::{scrape_catalog, PageSession, RenderedFile};
use crate::snapshot::SnapshotStore;
use crate::utils::osc8_file_link;

pub const PRODUCTS_URL: &str = "https://www.acrobiosystems.com/A1337-GPCRs.html";
pub const OUTPUT_FOLDER: &str = "Acro_Product_List";
pub const RENDER_WAIT_SECS: u64 = 4;

#[derive(Parser)]
#[command(name = "acro-products")]
#[command(about = "Track new products on the Acro GPCR catalog page")]
struct Cli {
    /// Product page to fetch
    #[arg(long, default_value = PRODUCTS_URL)]
    url: String,
    /// Read an already-rendered copy of the page instead of fetching it
    #[arg(long, value_name = "FILE")]
    html: Option<PathBuf>,
    /// Snapshot folder (default: ~/Desktop/Acro_Product_List)
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,
    /// Seconds to wait for the page
    #[arg(long, default_value_t = RENDER_WAIT_SECS)]
    wait_secs: u64,
    /// Date used in the report file name (YYYY-MM-DD, default: today)
    #[arg(long)]
    date: Option<NaiveDate>,
    /// Quiet mode - suppress the run summary
    #[arg(short, long)]
    quiet: bool,
}

fn default_output_dir() -> Result<PathBuf> {
    let Some(home) = env::var_os("HOME").or_else(|| env::var_os("USERPROFILE")) else {
        bail!(error::TrackerError::OutputDirectory {
            path: PathBuf::from("~"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "home directory not set"),
        });
    };
    Ok(PathBuf::from(home).join("Desktop").join(OUTPUT_FOLDER))
}

fn run(cli: Cli) -> Result<()> {
    // Extract
    let catalog = match &cli.html {
        Some(path) => scrape_catalog(&RenderedFile { path: path.clone() }),
        None => {
            let session = PageSession::open(&cli.url, Duration::from_secs(cli.wait_secs))?;
            scrape_catalog(&session)
        }
    }
    .context("Failed to extract product catalog")?;

    let dir = match cli.output_dir {
        Some(dir) => dir,
        None => default_output_dir()?,
    };
    let store = SnapshotStore::new(dir);
    let dir = store.resolve_output_directory()?;
    info!(dir = %dir.display(), "using snapshot folder");

    // Load previous
    let previous = store
        .load_latest()
        .context("Failed to load previous snapshot")?;
    if previous.is_none() && !cli.quiet {
        println!("No previous files found, proceeding with the current dataset.");
    }

    // Diff
    let result = diff(&catalog, previous.as_deref());
    info!(
        total = result.total_count,
        new = result.new_count,
        "compared against previous snapshot"
    );
    if !cli.quiet {
        print!("{}", console_summary(&result));
    }

    // Build and save
    let report = build_report(&catalog, &result);
    let date = cli.date.unwrap_or_else(|| Local::now().date_naive());
    let path = store.build_output_path(date);
    store
        .save(&path, &report)
        .context("Failed to save product report")?;

    if !cli.quiet {
        println!(
            "Excel file saved successfully at: {}",
            osc8_file_link(&path, &path.to_string_lossy())
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let result = run(Cli::parse());
    if let Err(err) = &result {
        if let Some(tracker) = err.downcast_ref::<error::TrackerError>() {
            tracing::error!(kind = ?tracker.kind(), "run aborted");
        }
    }
    result
}
