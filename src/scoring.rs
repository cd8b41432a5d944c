use crate::column_resolver::{self, DATE, PLAYER, POINTS};
use crate::data_loader::GameTable;
use crate::error::Result;
use crate::processing_context::ProcessingContext;
use crate::util::{mean, serialize_opt_date};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoringRecord {
    #[serde(rename = "Player")]
    pub player: String,
    #[serde(rename = "Date", serialize_with = "serialize_opt_date")]
    pub date: Option<NaiveDate>,
    #[serde(rename = "PTS")]
    pub points: Option<f64>,
}

#[derive(Debug, Default)]
struct PlayerScoring {
    points: Vec<f64>,
    games: usize,
}

/// Ranks qualified players by average points, best first, at most
/// `ctx.scoring_top_n` of them.
///
/// A player qualifies with `ctx.scoring_min_games` games. When fewer than
/// `ctx.scoring_min_players` players get there, the bar drops to the smallest
/// game count anyone has. Players with no recorded points are never ranked.
#[cfg(test)]
pub fn rank_top_scorers(table: &GameTable, ctx: &ProcessingContext) -> Result<Vec<(String, f64)>> {
    let [player_col, _date_col, pts_col] = resolve_scoring_fields(table)?;
    Ok(rank_resolved(table, ctx, player_col, pts_col))
}

fn resolve_scoring_fields(table: &GameTable) -> Result<[usize; 3]> {
    column_resolver::resolve_fields(table.headers(), "scoring chart", [PLAYER, DATE, POINTS])
}

fn rank_resolved(
    table: &GameTable,
    ctx: &ProcessingContext,
    player_col: usize,
    pts_col: usize,
) -> Vec<(String, f64)> {
    let mut players: HashMap<&str, PlayerScoring> = HashMap::new();
    for row in table.rows() {
        let player = row.text(player_col);
        if player.is_empty() {
            continue;
        }

        let entry = players.entry(player).or_default();
        entry.games += 1;
        if let Some(pts) = row.number(pts_col) {
            entry.points.push(pts);
        }
    }

    let mut min_games = ctx.scoring_min_games;
    let mut qualified = players.values().filter(|p| p.games >= min_games).count();
    if qualified < ctx.scoring_min_players {
        let fewest = players.values().map(|p| p.games).min().unwrap_or(1);
        warn!(
            "Only {} players with {}+ games. Reducing minimum game threshold to {}",
            qualified,
            min_games,
            fewest.max(1)
        );
        min_games = fewest.max(1);
        qualified = players.values().filter(|p| p.games >= min_games).count();
    }

    let mut ranked: Vec<(String, f64)> = players
        .iter()
        .filter(|(_, p)| p.games >= min_games)
        .filter_map(|(name, p)| mean(&p.points).map(|avg| (name.to_string(), avg)))
        .collect();

    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(ctx.scoring_top_n);

    info!(
        "{} of {} players qualified with {}+ games; keeping top {}",
        qualified,
        players.len(),
        min_games,
        ranked.len()
    );

    ranked
}

// Every game of the top scorers, in input order.
pub fn build_scoring_leaders(
    table: &GameTable,
    ctx: &ProcessingContext,
) -> Result<Vec<ScoringRecord>> {
    let [player_col, _date_col, pts_col] = resolve_scoring_fields(table)?;
    let ranked = rank_resolved(table, ctx, player_col, pts_col);
    let top: HashSet<&str> = ranked.iter().map(|(name, _)| name.as_str()).collect();

    let records: Vec<ScoringRecord> = table
        .rows()
        .filter(|row| top.contains(row.text(player_col)))
        .map(|row| ScoringRecord {
            player: row.text(player_col).to_string(),
            date: row.date(),
            points: row.number(pts_col),
        })
        .collect();

    info!(
        "Scoring data processed with {} records for {} players",
        records.len(),
        top.len()
    );

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_loader::table_from_csv;

    fn games(name: &str, n: usize, pts: f64) -> String {
        (0..n)
            .map(|g| format!("{name},2024-12-{:02},{pts}\n", g + 1))
            .collect()
    }

    #[test]
    fn never_more_than_ten_players() {
        let mut text = String::from("Player,Date,PTS\n");
        for i in 0..14 {
            text.push_str(&games(&format!("P{i:02}"), 6, 10.0 + i as f64));
        }
        let table = table_from_csv(&text);

        let ranked = rank_top_scorers(&table, &ProcessingContext::default()).unwrap();
        assert_eq!(ranked.len(), 10);
        assert_eq!(ranked[0].0, "P13");
        assert_eq!(ranked[9].0, "P04");

        let records = build_scoring_leaders(&table, &ProcessingContext::default()).unwrap();
        let distinct: HashSet<&str> = records.iter().map(|r| r.player.as_str()).collect();
        assert_eq!(distinct.len(), 10);
        assert_eq!(records.len(), 60);
    }

    #[test]
    fn low_volume_players_excluded_when_enough_qualify() {
        let mut text = String::from("Player,Date,PTS\n");
        for i in 0..5 {
            text.push_str(&games(&format!("Regular{i}"), 5, 12.0));
        }
        text.push_str(&games("Cameo", 1, 50.0));
        let table = table_from_csv(&text);

        let ranked = rank_top_scorers(&table, &ProcessingContext::default()).unwrap();
        assert!(ranked.iter().all(|(name, _)| name != "Cameo"));
        assert_eq!(ranked.len(), 5);
    }

    #[test]
    fn threshold_relaxes_when_few_players_qualify() {
        let mut text = String::from("Player,Date,PTS\n");
        text.push_str(&games("Starter", 6, 20.0));
        text.push_str(&games("Rookie", 2, 8.0));
        let table = table_from_csv(&text);

        let ranked = rank_top_scorers(&table, &ProcessingContext::default()).unwrap();
        assert_eq!(ranked, vec![("Starter".to_string(), 20.0), ("Rookie".to_string(), 8.0)]);
    }

    #[test]
    fn ties_break_by_name() {
        let text = format!(
            "Player,Date,PTS\n{}{}",
            games("Zed", 1, 10.0),
            games("Amy", 1, 10.0)
        );
        let table = table_from_csv(&text);

        let ranked = rank_top_scorers(&table, &ProcessingContext::default()).unwrap();
        assert_eq!(ranked[0].0, "Amy");
    }

    #[test]
    fn output_keeps_input_order() {
        let table = table_from_csv(
            "Player,Date,PTS\n\
             A,2024-12-01,10\n\
             B,2024-12-01,4\n\
             A,2024-12-02,20\n",
        );

        let records = build_scoring_leaders(&table, &ProcessingContext::default()).unwrap();
        let order: Vec<&str> = records.iter().map(|r| r.player.as_str()).collect();
        assert_eq!(order, vec!["A", "B", "A"]);
        assert_eq!(records[2].points, Some(20.0));
    }

    #[test]
    fn undated_games_serialize_as_null() {
        let table = table_from_csv("Player,Date,PTS\nA,2024-12-01,10\nA,,14\n");

        let records = build_scoring_leaders(&table, &ProcessingContext::default()).unwrap();
        assert_eq!(records.len(), 2);

        let json = serde_json::to_value(&records).unwrap();
        assert_eq!(json[0]["Date"], "2024-12-01");
        assert!(json[1]["Date"].is_null());
        assert_eq!(json[1]["PTS"], 14.0);
    }
}
