use crate::column_resolver::{self, POINTS, TEAM};
use crate::data_loader::GameTable;
use crate::error::Result;
use crate::util::{mean, sample_std_dev};
use rand::Rng;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, warn};

pub const EASTERN_TEAMS: [&str; 15] = [
    "BOS", "NYK", "PHI", "TOR", "CHI", "CLE", "DET", "IND", "MIL", "ATL", "CHA", "MIA", "ORL",
    "WAS", "BKN",
];
pub const WESTERN_TEAMS: [&str; 15] = [
    "DAL", "HOU", "MEM", "NOP", "SAS", "DEN", "MIN", "OKC", "POR", "UTA", "GSW", "LAC", "LAL",
    "PHX", "SAC",
];

const RESULT_CANDIDATES: [&str; 4] = ["Res", "Result", "WL", "W/L"];

// A team with no recorded points has no averages, and no estimated win pct either.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamSummary {
    pub team: String,
    pub avg_points_scored: Option<f64>,
    pub games: usize,
    pub win_pct: Option<f64>,
    pub avg_points_allowed: Option<f64>,
    pub conference: String,
}

#[derive(Default)]
struct TeamAccumulator<'a> {
    points: Vec<f64>,
    games: usize,
    wins: usize,
    conference: Option<&'a str>,
}

// Static lookup, then a coin flip for anything unrecognized.
pub fn conference_for<R: Rng + ?Sized>(team: &str, rng: &mut R) -> String {
    if EASTERN_TEAMS.contains(&team) {
        "East".to_string()
    } else if WESTERN_TEAMS.contains(&team) {
        "West".to_string()
    } else if rng.random_bool(0.5) {
        "East".to_string()
    } else {
        "West".to_string()
    }
}

/// Win percentage guessed from scoring alone: half a game plus 0.3 per league
/// standard deviation above the mean, kept inside [0.1, 0.9].
pub fn estimate_win_pct(team_avg: f64, league_mean: f64, league_std: f64) -> f64 {
    let spread = if league_std > 0.0 { league_std } else { 1.0 };
    (0.5 + 0.3 * (team_avg - league_mean) / spread).clamp(0.1, 0.9)
}

pub fn estimate_points_allowed(avg_points_scored: f64, win_pct: f64) -> f64 {
    avg_points_scored - 10.0 * (win_pct - 0.5)
}

pub fn aggregate_teams<R: Rng + ?Sized>(
    table: &GameTable,
    rng: &mut R,
) -> Result<Vec<TeamSummary>> {
    let [team_col, pts_col] =
        column_resolver::resolve_fields(table.headers(), "championship chart", [TEAM, POINTS])?;

    let result_col = column_resolver::find_exact(table.headers(), &RESULT_CANDIDATES);
    let conference_col = column_resolver::find_exact(table.headers(), &["Conference"]);

    let mut teams: BTreeMap<&str, TeamAccumulator> = BTreeMap::new();
    for row in table.rows() {
        let team = row.text(team_col);
        if team.is_empty() {
            continue;
        }

        let acc = teams.entry(team).or_default();
        acc.games += 1;
        if let Some(pts) = row.number(pts_col) {
            acc.points.push(pts);
        }
        if let Some(col) = result_col {
            if row.text(col).to_uppercase().starts_with('W') {
                acc.wins += 1;
            }
        }
        if let Some(col) = conference_col {
            let conf = row.text(col);
            if acc.conference.is_none() && !conf.is_empty() {
                acc.conference = Some(conf);
            }
        }
    }

    let team_avgs: Vec<Option<f64>> = teams.values().map(|acc| mean(&acc.points)).collect();

    // League reference only over teams that actually scored something.
    let scored: Vec<f64> = team_avgs.iter().flatten().copied().collect();
    let league_mean = mean(&scored).unwrap_or(0.0);
    let league_std = sample_std_dev(&scored).unwrap_or(0.0);

    if result_col.is_none() {
        warn!("No result column found, estimating win percentage from points scored");
    }

    let mut summaries = Vec::with_capacity(teams.len());
    for ((team, acc), avg) in teams.iter().zip(team_avgs) {
        let win_pct = match result_col {
            Some(_) => Some(acc.wins as f64 / acc.games as f64),
            None => avg.map(|avg| estimate_win_pct(avg, league_mean, league_std)),
        };

        let conference = match acc.conference {
            Some(conf) => conf.to_string(),
            None => conference_for(team, rng),
        };

        summaries.push(TeamSummary {
            team: team.to_string(),
            avg_points_scored: avg,
            games: acc.games,
            win_pct,
            avg_points_allowed: avg.zip(win_pct).map(|(a, w)| estimate_points_allowed(a, w)),
            conference,
        });
    }

    info!("Championship data processed with {} teams", summaries.len());

    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_loader::table_from_csv;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn win_pct_from_result_column() {
        let table = table_from_csv(
            "Player,Tm,PTS,Res,Date\n\
             a,BOS,10,W,2024-11-01\n\
             b,BOS,20,L,2024-11-01\n\
             c,BOS,30,w,2024-11-02\n\
             d,BOS,40,,2024-11-03\n\
             e,LAL,12,L,2024-11-01\n",
        );

        let teams = aggregate_teams(&table, &mut rng()).unwrap();
        assert_eq!(teams.len(), 2);

        let bos = &teams[0];
        assert_eq!(bos.team, "BOS");
        assert_eq!(bos.games, 4);
        assert_eq!(bos.avg_points_scored, Some(25.0));
        assert_eq!(bos.win_pct, Some(0.5));
        assert_eq!(bos.avg_points_allowed, Some(25.0));
        assert_eq!(bos.conference, "East");

        let lal = &teams[1];
        assert_eq!(lal.win_pct, Some(0.0));
        assert_eq!(lal.avg_points_allowed, Some(17.0));
        assert_eq!(lal.conference, "West");
    }

    #[test]
    fn estimated_win_pct_is_clamped() {
        assert_eq!(estimate_win_pct(200.0, 100.0, 1.0), 0.9);
        assert_eq!(estimate_win_pct(0.0, 100.0, 1.0), 0.1);
        assert_eq!(estimate_win_pct(100.0, 100.0, 0.0), 0.5);
        assert!((estimate_win_pct(110.0, 100.0, 20.0) - 0.65).abs() < 1e-12);
    }

    #[test]
    fn estimates_without_result_column() {
        let table = table_from_csv(
            "Tm,PTS,Date\n\
             BOS,120,2024-11-01\n\
             NYK,100,2024-11-01\n\
             PHI,80,2024-11-01\n",
        );

        let teams = aggregate_teams(&table, &mut rng()).unwrap();
        for t in &teams {
            let pct = t.win_pct.unwrap();
            assert!((0.1..=0.9).contains(&pct), "{pct} out of range");
        }

        // Sample std of [120, 100, 80] is 20, so BOS sits one deviation up.
        let bos = teams.iter().find(|t| t.team == "BOS").unwrap();
        assert!((bos.win_pct.unwrap() - 0.8).abs() < 1e-12);
        assert!((bos.avg_points_allowed.unwrap() - 117.0).abs() < 1e-9);
    }

    #[test]
    fn team_without_points_leaves_league_reference_alone() {
        let table = table_from_csv(
            "Tm,PTS,Date\n\
             BOS,120,2024-11-01\n\
             NYK,100,2024-11-01\n\
             PHI,80,2024-11-01\n\
             XXX,,2024-11-01\n",
        );

        let teams = aggregate_teams(&table, &mut rng()).unwrap();
        let pct = |name: &str| teams.iter().find(|t| t.team == name).unwrap().win_pct;

        assert!((pct("BOS").unwrap() - 0.8).abs() < 1e-12);
        assert!((pct("NYK").unwrap() - 0.5).abs() < 1e-12);
        assert!((pct("PHI").unwrap() - 0.2).abs() < 1e-12);

        let xxx = teams.iter().find(|t| t.team == "XXX").unwrap();
        assert_eq!(xxx.games, 1);
        assert_eq!(xxx.avg_points_scored, None);
        assert_eq!(xxx.win_pct, None);
        assert_eq!(xxx.avg_points_allowed, None);

        let json = serde_json::to_value(xxx).unwrap();
        assert!(json["avgPointsScored"].is_null());
        assert!(json["winPct"].is_null());
    }

    #[test]
    fn single_team_uses_unit_spread() {
        let table = table_from_csv("Tm,PTS,Date\nOKC,118,2024-11-01\n");
        let teams = aggregate_teams(&table, &mut rng()).unwrap();
        assert_eq!(teams[0].win_pct, Some(0.5));
    }

    #[test]
    fn conference_column_overrides_static_lists() {
        let table = table_from_csv(
            "Tm,PTS,Conference,Date\n\
             LAL,100,,2024-11-01\n\
             LAL,110,Pacific,2024-11-02\n",
        );
        let teams = aggregate_teams(&table, &mut rng()).unwrap();
        assert_eq!(teams[0].conference, "Pacific");
    }

    #[test]
    fn unknown_teams_get_a_random_conference() {
        let mut rng = rng();
        for _ in 0..20 {
            let conf = conference_for("XYZ", &mut rng);
            assert!(conf == "East" || conf == "West");
        }
        assert_eq!(conference_for("MIA", &mut rng), "East");
        assert_eq!(conference_for("SAC", &mut rng), "West");
    }

    #[test]
    fn requires_team_and_points() {
        let table = table_from_csv("Player,Date\nA,2024-11-01\n");
        assert!(aggregate_teams(&table, &mut rng()).is_err());
    }
}
