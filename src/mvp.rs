use crate::column_resolver::{self, ASSISTS, DATE, PLAYER, POINTS, REBOUNDS};
use crate::data_loader::GameTable;
use crate::error::Result;
use crate::processing_context::ProcessingContext;
use crate::util::{quantile, serialize_opt_date};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{info, warn};

// Output keys follow the box-score labels the charts read.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerMetricRecord {
    #[serde(rename = "Player")]
    pub player: String,
    #[serde(rename = "Date", serialize_with = "serialize_opt_date")]
    pub date: Option<NaiveDate>,
    #[serde(rename = "PTS")]
    pub points: Option<f64>,
    #[serde(rename = "AST")]
    pub assists: Option<f64>,
    #[serde(rename = "TRB")]
    pub rebounds: Option<f64>,
    #[serde(rename = "GmSc")]
    pub score: Option<f64>,
}

// Stand-in for Game Score when the source has none.
pub fn simplified_score(points: f64, assists: f64, rebounds: f64) -> f64 {
    0.5 * points + 0.7 * assists + 0.3 * rebounds
}

// max(floor, floor(q / 2)) where q is the configured quantile of per-player game counts.
pub fn adaptive_min_games(game_counts: &[usize], ctx: &ProcessingContext) -> usize {
    let counts: Vec<f64> = game_counts.iter().map(|c| *c as f64).collect();
    let from_quantile = quantile(&counts, ctx.mvp_quantile)
        .map(|q| (q / 2.0).floor() as usize)
        .unwrap_or(0);

    usize::max(ctx.mvp_min_games_floor, from_quantile)
}

pub fn derive_mvp_metrics(
    table: &GameTable,
    ctx: &ProcessingContext,
) -> Result<Vec<PlayerMetricRecord>> {
    let [player_col, _date_col, pts_col, ast_col, trb_col] = column_resolver::resolve_fields(
        table.headers(),
        "MVP chart",
        [PLAYER, DATE, POINTS, ASSISTS, REBOUNDS],
    )?;

    let gmsc_col = column_resolver::find_exact(table.headers(), &["GmSc"]);
    if gmsc_col.is_none() {
        warn!("Game Score column not found, calculating simplified version");
    }

    let mut game_counts: HashMap<&str, usize> = HashMap::new();
    for row in table.rows() {
        let player = row.text(player_col);
        if player.is_empty() {
            continue;
        }
        *game_counts.entry(player).or_insert(0) += 1;
    }

    let counts: Vec<usize> = game_counts.values().copied().collect();
    let min_games = adaptive_min_games(&counts, ctx);
    let qualified = game_counts.values().filter(|c| **c >= min_games).count();

    let mut records = Vec::new();
    for row in table.rows() {
        let player = row.text(player_col);
        if game_counts.get(player).is_none_or(|c| *c < min_games) {
            continue;
        }

        let points = row.number(pts_col);
        let assists = row.number(ast_col);
        let rebounds = row.number(trb_col);

        let score = match gmsc_col {
            Some(col) => row.number(col),
            None => match (points, assists, rebounds) {
                (Some(p), Some(a), Some(r)) => Some(simplified_score(p, a, r)),
                _ => None,
            },
        };

        records.push(PlayerMetricRecord {
            player: player.to_string(),
            date: row.date(),
            points,
            assists,
            rebounds,
            score,
        });
    }

    info!(
        "MVP data processed with {} records for {} players (min games {})",
        records.len(),
        qualified,
        min_games
    );

    Ok(records)
}
