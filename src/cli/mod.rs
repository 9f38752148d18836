//! Command-line parsing for the `opr` ratings tool.
//!
//! Argument parsing lives here; dispatch and env fallbacks live in `app`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::{LambdaStrategy, Metric};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "opr", version, about = "Alliance regression ratings (OPR/DPR/CCWM)")]
pub struct Cli {
    /// Log progress at info level (RUST_LOG overrides).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Solve ratings for a match file, print a summary and optionally export.
    Rate(RateArgs),
    /// Show which ridge λ each strategy would pick for a match file.
    Lambda(LambdaArgs),
    /// Average non-penalty alliance score of one team.
    Npavg(NpavgArgs),
    /// Generate a synthetic event (JSON) for experimentation.
    Simulate(SimulateArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct RateArgs {
    /// Match file (.json or .csv).
    #[arg(short, long)]
    pub matches: PathBuf,

    /// Explicit team universe, comma separated. Defaults to every team in the file.
    #[arg(long, value_delimiter = ',')]
    pub teams: Option<Vec<u32>>,

    /// Ridge strength; implies `--strategy explicit` unless one is given.
    /// Falls back to OPR_LAMBDA.
    #[arg(short, long)]
    pub lambda: Option<f64>,

    /// λ selection strategy. Falls back to OPR_LAMBDA_STRATEGY, then `auto`.
    #[arg(short, long, value_enum)]
    pub strategy: Option<LambdaStrategy>,

    /// Solve a single metric instead of all five.
    #[arg(long, value_enum)]
    pub metric: Option<Metric>,

    /// Rows to print.
    #[arg(long, default_value_t = 20)]
    pub top: usize,

    /// Export the ratings table to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the full run (λ choice, fits, table) to JSON.
    #[arg(long = "export-json")]
    pub export_json: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone)]
pub struct LambdaArgs {
    /// Match file (.json or .csv).
    #[arg(short, long)]
    pub matches: PathBuf,

    /// Only report this strategy.
    #[arg(short, long, value_enum)]
    pub strategy: Option<LambdaStrategy>,

    /// λ reported by the explicit strategy. Falls back to OPR_LAMBDA.
    #[arg(short, long)]
    pub lambda: Option<f64>,
}

#[derive(Debug, Parser, Clone)]
pub struct NpavgArgs {
    /// Match file (.json or .csv).
    #[arg(short, long)]
    pub matches: PathBuf,

    /// Team number.
    #[arg(short, long)]
    pub team: u32,
}

#[derive(Debug, Parser, Clone)]
pub struct SimulateArgs {
    /// Number of teams at the event.
    #[arg(long, default_value_t = 24)]
    pub teams: usize,

    /// Number of matches to generate.
    #[arg(long = "matches", default_value_t = 80)]
    pub match_count: usize,

    #[arg(long, default_value_t = 3)]
    pub alliance_size: usize,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Per-alliance score noise (standard deviation).
    #[arg(long, default_value_t = 5.0)]
    pub noise: f64,

    /// Probability an alliance is awarded penalty points in a match.
    #[arg(long, default_value_t = 0.2)]
    pub penalty_rate: f64,

    /// Output JSON path.
    #[arg(short, long)]
    pub out: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_parses_team_list_and_enums() {
        let cli = Cli::parse_from([
            "opr", "rate", "-m", "event.csv", "--teams", "254,1114,971", "--strategy", "band",
            "--metric", "npopr", "-v",
        ]);
        assert!(cli.verbose);
        let Command::Rate(args) = cli.command else {
            panic!("expected rate");
        };
        assert_eq!(args.teams, Some(vec![254, 1114, 971]));
        assert_eq!(args.strategy, Some(LambdaStrategy::Band));
        assert_eq!(args.metric, Some(Metric::NpOpr));
        assert_eq!(args.lambda, None);
        assert_eq!(args.top, 20);
    }

    #[test]
    fn simulate_requires_out() {
        assert!(Cli::try_parse_from(["opr", "simulate"]).is_err());
        let cli = Cli::try_parse_from(["opr", "simulate", "--out", "ev.json", "--seed", "7"]).unwrap();
        let Command::Simulate(args) = cli.command else {
            panic!("expected simulate");
        };
        assert_eq!(args.seed, 7);
        assert_eq!(args.teams, 24);
    }
}
