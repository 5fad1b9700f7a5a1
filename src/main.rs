use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use catalog_populate::logging::{init_tracing, LogOptions, DEFAULT_FILTER};
use catalog_populate::util::env as env_util;
use catalog_populate::{build_populator, ListingParams, Outcome, PopulateConfig};
use clap::Parser;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "catalog-populate",
    version,
    about = "Import storefront games, their taxonomy and images into the CMS"
)]
struct Cli {
    /// Listing filter as KEY=VALUE; repeatable (e.g. --param page=2 --param sort=popularity)
    #[arg(short, long = "param", value_name = "KEY=VALUE")]
    params: Vec<String>,
    /// Read the storefront but write nothing to the CMS
    #[arg(long, default_value_t = false)]
    dry_run: bool,
    /// Override POPULATE_ITEM_DELAY_MS
    #[arg(long)]
    delay_ms: Option<u64>,
    /// Override POPULATE_GALLERY_LIMIT
    #[arg(long)]
    gallery_limit: Option<usize>,
    /// Print the run report as JSON on stdout
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    env_util::init_env();
    init_tracing(&LogOptions::from_env(DEFAULT_FILTER))?;
    let cli = Cli::parse();

    let mut config = PopulateConfig::from_env()?;
    config.dry_run |= cli.dry_run;
    if let Some(ms) = cli.delay_ms {
        config.settings.item_delay = Duration::from_millis(ms);
    }
    if let Some(limit) = cli.gallery_limit {
        config.settings.gallery_limit = limit;
    }

    let mut params = ListingParams::new();
    for raw in &cli.params {
        params.push_raw(raw);
    }

    info!(
        storefront = %config.storefront_url,
        cms = %config.cms_url,
        params = ?cli.params,
        dry_run = config.dry_run,
        "catalog-populate: starting"
    );
    let populator = build_populator(&config)?;
    let report = populator.populate(&params).await;

    if cli.json {
        let out = serde_json::to_string_pretty(&report).context("failed to encode report")?;
        println!("{out}");
    }

    Ok(match report.outcome() {
        Outcome::Failed => ExitCode::FAILURE,
        Outcome::Success | Outcome::Partial => ExitCode::SUCCESS,
    })
}
