use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;

const fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => date,
        None => panic!("invalid calendar date"),
    }
}

pub const TRADE_CUTOFF: NaiveDate = ymd(2025, 2, 1);
pub const TRADE_WINDOW_END: NaiveDate = ymd(2025, 4, 15);
pub const SYNTHETIC_DATE_START: NaiveDate = ymd(2023, 10, 1);

#[derive(Debug, Clone, PartialEq)]
pub struct TradeTarget {
    pub player: String,
    pub team: String, // Team after the trade
}

impl TradeTarget {
    pub fn new(player: &str, team: &str) -> Self {
        Self {
            player: player.to_string(),
            team: team.to_string(),
        }
    }

    pub fn first_name(&self) -> &str {
        self.player.split_whitespace().next().unwrap_or(&self.player)
    }
}

// All knobs of a preprocessing run. Defaults reproduce the published charts.
#[derive(Debug, Clone)]
pub struct ProcessingContext {
    pub dataset_dir: PathBuf,
    pub output_dir: PathBuf,
    pub seed: Option<u64>, // None draws from OS entropy

    pub synthetic_date_start: NaiveDate,

    pub mvp_min_games_floor: usize,
    pub mvp_quantile: f64,

    pub scoring_min_games: usize,
    pub scoring_min_players: usize,
    pub scoring_top_n: usize,

    pub trade_cutoff: NaiveDate,
    pub trade_window_end: NaiveDate,
    pub trade_record_step_days: u64,
    pub trade_win_probability: f64,
    pub trade_targets: Vec<TradeTarget>,
}

impl Default for ProcessingContext {
    fn default() -> Self {
        Self {
            dataset_dir: PathBuf::from("dataset"),
            output_dir: PathBuf::from("data"),
            seed: None,

            synthetic_date_start: SYNTHETIC_DATE_START,

            mvp_min_games_floor: 5,
            mvp_quantile: 0.75,

            scoring_min_games: 5,
            scoring_min_players: 5,
            scoring_top_n: 10,

            trade_cutoff: TRADE_CUTOFF,
            trade_window_end: TRADE_WINDOW_END,
            trade_record_step_days: 2,
            trade_win_probability: 0.6,
            trade_targets: vec![
                TradeTarget::new("Luka Dončić", "LAL"),
                TradeTarget::new("Anthony Davis", "DAL"),
            ],
        }
    }
}

impl ProcessingContext {
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}
