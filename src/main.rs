mod bench;
mod championship;
mod column_resolver;
mod data_loader;
mod error;
mod mvp;
mod pipeline;
mod processing_context;
mod report;
mod scoring;
mod trade_impact;
mod util;


use anyhow::Context;
use chrono::NaiveDate;
use clap::Parser;
use processing_context::ProcessingContext;
use std::path::PathBuf;
use tracing::{error, info};

/*
    Reads the first CSV in the dataset directory and writes the five chart datasets
    (MVP, championship, scoring leaders, bench strength, trade impact) as JSON.
    Serving the files is somebody else's job.
*/

#[derive(Parser, Debug)]
#[command(name = "courtside")]
#[command(about = "Preprocess per-game NBA player stats into chart-ready JSON")]
struct Cli {
    /// Directory holding the downloaded dataset; the first CSV in it is used
    #[arg(long, default_value = "dataset")]
    dataset_dir: PathBuf,

    /// Directory the JSON files are written to
    #[arg(long, default_value = "data")]
    output_dir: PathBuf,

    /// Seed for the synthetic fallbacks (conference, minutes, team results)
    #[arg(long)]
    seed: Option<u64>,

    /// Trade cutoff date (YYYY-MM-DD)
    #[arg(long)]
    trade_cutoff: Option<NaiveDate>,

    /// Lower bound for the MVP games-played threshold
    #[arg(long)]
    mvp_min_games: Option<usize>,
}

impl Cli {
    fn into_context(self) -> ProcessingContext {
        let mut ctx = ProcessingContext {
            dataset_dir: self.dataset_dir,
            output_dir: self.output_dir,
            seed: self.seed,
            ..ProcessingContext::default()
        };

        if let Some(cutoff) = self.trade_cutoff {
            ctx.trade_cutoff = cutoff;
        }
        if let Some(floor) = self.mvp_min_games {
            ctx.mvp_min_games_floor = floor;
        }

        ctx
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing()?;

    let ctx = Cli::parse().into_context();
    info!(
        "Processing {} into {}",
        ctx.dataset_dir.display(),
        ctx.output_dir.display()
    );

    match pipeline::run(&ctx) {
        Ok(written) => {
            info!("Wrote {} files to {}", written.len(), ctx.output_dir.display());
            Ok(())
        }
        Err(e) => {
            error!("Error processing data: {}", e);
            Err(e).context("failed to process data")
        }
    }
}

// Logs go to stderr; stdout stays free for anything piping the binary.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("courtside=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to set tracing subscriber: {e}"))
}
