use crate::column_resolver::{self, find_exact, PLAYER, POINTS, TEAM};
use crate::data_loader::{GameRow, GameTable};
use crate::error::Result;
use crate::util::mean;
use rand::Rng;
use serde::Serialize;
use tracing::{info, warn};

const MINUTES_CANDIDATES: [&str; 4] = ["MP", "MIN", "Minutes", "Minutes Played"];
const STARTER_CANDIDATES: [&str; 4] = ["Starter", "Start", "GS", "Role"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchRecord {
    #[serde(rename = "Player")]
    pub player: String,
    #[serde(rename = "Tm")]
    pub team: String,
    #[serde(rename = "PTS")]
    pub points: Option<f64>,
    #[serde(rename = "MP")]
    pub minutes: Option<f64>,
    #[serde(rename = "GmSc")]
    pub score: Option<f64>,
}

// Where per-game minutes come from, best source first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MinutesSource {
    Column(usize),
    StarterFlag(usize),
    FromPoints { league_mean: f64 },
}

impl MinutesSource {
    pub fn detect(table: &GameTable, pts_col: usize) -> Self {
        let headers = table.headers();

        if let Some(col) = column_resolver::find_exact(headers, &MINUTES_CANDIDATES) {
            return MinutesSource::Column(col);
        }

        warn!("No minutes played column found. Looking for alternative indicators...");
        if let Some(col) = column_resolver::find_containing(headers, &STARTER_CANDIDATES) {
            info!("Using {} to determine bench players", headers[col]);
            return MinutesSource::StarterFlag(col);
        }

        warn!("Creating synthetic minutes based on points scored");
        let points: Vec<f64> = table.rows().filter_map(|r| r.number(pts_col)).collect();
        MinutesSource::FromPoints {
            league_mean: mean(&points).unwrap_or(0.0),
        }
    }

    pub fn minutes<R: Rng + ?Sized>(
        &self,
        row: &GameRow,
        pts_col: usize,
        rng: &mut R,
    ) -> Option<f64> {
        match *self {
            MinutesSource::Column(col) => row.number(col),
            MinutesSource::StarterFlag(col) => {
                if row.text(col).to_uppercase().contains("START") {
                    Some(rng.random_range(25.0..38.0))
                } else {
                    Some(rng.random_range(10.0..24.0))
                }
            }
            MinutesSource::FromPoints { league_mean } => {
                let scale = if league_mean > 0.0 { league_mean } else { 1.0 };
                row.number(pts_col).map(|pts| 15.0 + 20.0 * (pts / scale))
            }
        }
    }
}

/// Box-score columns that feed Game Score. Any of them may be absent; a pair
/// term (FG/FGA, FT/FTA) only counts when both halves are present.
#[derive(Debug, Clone, Default)]
pub struct GameScoreTerms {
    pub field_goals: Option<(usize, usize)>,
    pub free_throws: Option<(usize, usize)>,
    pub offensive_rebounds: Option<usize>,
    pub defensive_rebounds: Option<usize>,
    pub steals: Option<usize>,
    pub assists: Option<usize>,
    pub blocks: Option<usize>,
    pub fouls: Option<usize>,
    pub turnovers: Option<usize>,
}

impl GameScoreTerms {
    pub fn detect(headers: &[String]) -> Self {
        let pair = |made, attempted| find_exact(headers, made).zip(find_exact(headers, attempted));

        Self {
            field_goals: pair(&["FG", "FGM"], &["FGA"]),
            free_throws: pair(&["FT", "FTM"], &["FTA"]),
            offensive_rebounds: find_exact(headers, &["ORB", "OREB"]),
            defensive_rebounds: find_exact(headers, &["DRB", "DREB"]),
            steals: find_exact(headers, &["STL"]),
            assists: find_exact(headers, &["AST"]),
            blocks: find_exact(headers, &["BLK"]),
            fouls: find_exact(headers, &["PF", "FOULS"]),
            turnovers: find_exact(headers, &["TOV", "TO"]),
        }
    }

    // Starts from points and adds each available term. A blank cell in a present
    // column leaves the row without a score.
    pub fn score(&self, row: &GameRow, points: Option<f64>) -> Option<f64> {
        let mut score = points?;
        if let Some((made, attempted)) = self.field_goals {
            score += 0.4 * row.number(made)? - 0.7 * row.number(attempted)?;
        }
        if let Some((made, attempted)) = self.free_throws {
            score += 0.4 * (row.number(made)? - row.number(attempted)?);
        }

        let weighted = [
            (self.offensive_rebounds, 0.7),
            (self.defensive_rebounds, 0.3),
            (self.steals, 1.0),
            (self.assists, 0.7),
            (self.blocks, 0.7),
            (self.fouls, -0.4),
            (self.turnovers, -1.0),
        ];
        for (col, weight) in weighted {
            if let Some(col) = col {
                score += weight * row.number(col)?;
            }
        }

        Some(score)
    }
}

pub fn estimate_bench_strength<R: Rng + ?Sized>(
    table: &GameTable,
    rng: &mut R,
) -> Result<Vec<BenchRecord>> {
    let [player_col, team_col, pts_col] =
        column_resolver::resolve_fields(table.headers(), "bench chart", [PLAYER, TEAM, POINTS])?;

    let minutes_source = MinutesSource::detect(table, pts_col);

    let gmsc_col = column_resolver::find_exact(table.headers(), &["GmSc"]);
    let terms = match gmsc_col {
        Some(_) => GameScoreTerms::default(),
        None => {
            info!("Game Score calculated from available statistics");
            GameScoreTerms::detect(table.headers())
        }
    };

    let mut records = Vec::with_capacity(table.len());
    for row in table.rows() {
        let points = row.number(pts_col);
        let score = match gmsc_col {
            Some(col) => row.number(col),
            None => terms.score(&row, points),
        };

        records.push(BenchRecord {
            player: row.text(player_col).to_string(),
            team: row.text(team_col).to_string(),
            points,
            minutes: minutes_source.minutes(&row, pts_col, rng),
            score,
        });
    }

    info!("Bench data processed with {} records", records.len());

    Ok(records)
}
