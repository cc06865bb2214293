use std::{path::PathBuf, time::Duration};

use clap::Parser;

use crate::{
    api::{FetchConfig, DEFAULT_API_ROOT},
    model::curve::{Curve, CurveError}
};

#[derive(Parser, Clone, Debug)]
#[command(
    name = "curve-changer",
    about = "Update star ratings to preserve top CR with a new curve",
    long_about = "Updates the star ratings for a pool so that the top score on every leaderboard keeps its \
    CR under a new curve. Writes newCommands.txt and revertCommands.txt.",
    after_help = "Examples:\n  curve-changer poodles '{\"type\": \"basic\", \"baseline\": 78, \"cutoff\": 0.5, \
    \"exponential\": 2.5}'\n  curve-changer poodles '{\"type\": \"linear\", \"points\": [[0.0, 0.0], [0.8, 0.5], \
    [1.0, 1.0]]}'"
)]
pub struct Args {
    /// Pool whose leaderboards are reweighed
    pub pool: String,

    /// New curve definition as JSON. `type` is either "basic" (with baseline,
    /// cutoff and exponential) or "linear" (with up to 15 points).
    #[arg(value_parser = parse_curve)]
    pub curve: Curve,

    /// Enable verbose logging
    #[arg(short, long, action = clap::ArgAction::SetTrue)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub debug: bool,

    #[arg(long, env, default_value = DEFAULT_API_ROOT, help = "Root url of the scoring API")]
    pub api_root: String,

    #[arg(long, env, default_value_t = 2.0, help = "Maximum outbound requests per second")]
    pub requests_per_second: f64,

    #[arg(
        long,
        env,
        default_value_t = 3,
        help = "Attempts per request when the API answers with an empty body"
    )]
    pub max_attempts: u32,

    #[arg(long, env, default_value_t = 5, help = "Seconds to wait before retrying an empty response")]
    pub retry_delay_secs: u64,

    /// Directory the command files are written to
    #[arg(short, long, default_value = ".")]
    pub out_dir: PathBuf
}

fn parse_curve(input: &str) -> Result<Curve, CurveError> {
    Curve::from_json(input)
}

impl Args {
    /// Log level requested on the command line, if any.
    /// `--debug` wins over `--verbose`.
    pub fn log_level(&self) -> Option<&'static str> {
        match (self.debug, self.verbose) {
            (true, _) => Some("debug"),
            (false, true) => Some("info"),
            _ => None
        }
    }

    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig {
            api_root: self.api_root.clone(),
            requests_per_second: self.requests_per_second,
            max_attempts: self.max_attempts,
            retry_delay: Duration::from_secs(self.retry_delay_secs)
        }
    }
}
