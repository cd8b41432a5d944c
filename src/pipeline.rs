use crate::bench::{estimate_bench_strength, BenchRecord};
use crate::championship::{aggregate_teams, TeamSummary};
use crate::data_loader::{find_dataset_file, load_data, GameTable};
use crate::error::{PipelineError, Result};
use crate::mvp::{derive_mvp_metrics, PlayerMetricRecord};
use crate::processing_context::ProcessingContext;
use crate::report::output_report;
use crate::scoring::{build_scoring_leaders, ScoringRecord};
use crate::trade_impact::{extract_trade_impact, TradeImpactReport};
use rand::Rng;
use std::path::PathBuf;
use tracing::info;

// Everything the charts need from one dataset.
#[derive(Debug, Clone)]
pub struct DerivedDatasets {
    pub mvp: Vec<PlayerMetricRecord>,
    pub championship: Vec<TeamSummary>,
    pub scoring: Vec<ScoringRecord>,
    pub bench: Vec<BenchRecord>,
    pub trade_impact: TradeImpactReport,
}

/// Runs the five transforms in a fixed order against the same table.
///
/// The transforms don't depend on each other; the order only matters for which
/// random draws each one sees. The first failure aborts the batch.
pub fn process_table<R: Rng + ?Sized>(
    table: &GameTable,
    ctx: &ProcessingContext,
    rng: &mut R,
) -> Result<DerivedDatasets> {
    if table.is_empty() {
        return Err(PipelineError::EmptyDataset);
    }

    info!("Processing data for MVP chart...");
    let mvp = derive_mvp_metrics(table, ctx)?;

    info!("Processing data for championship chart...");
    let championship = aggregate_teams(table, rng)?;

    info!("Processing data for scoring leader chart...");
    let scoring = build_scoring_leaders(table, ctx)?;

    info!("Processing data for bench strength chart...");
    let bench = estimate_bench_strength(table, rng)?;

    info!("Processing data for trade impact chart...");
    let trade_impact = extract_trade_impact(table, ctx, rng)?;

    Ok(DerivedDatasets {
        mvp,
        championship,
        scoring,
        bench,
        trade_impact,
    })
}

// Dataset directory in, JSON files out.
pub fn run(ctx: &ProcessingContext) -> Result<Vec<PathBuf>> {
    let dataset = find_dataset_file(&ctx.dataset_dir)?;
    let table = load_data(&dataset, ctx)?;

    let mut rng = ctx.rng();
    let datasets = process_table(&table, ctx, &mut rng)?;

    let written = output_report(&datasets, &ctx.output_dir)?;
    info!("All data processed successfully!");

    Ok(written)
}
