//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and sets up logging
//! - parses CLI arguments (defaulting to `rate`)
//! - resolves env fallbacks into a `RunConfig`
//! - prints reports and writes optional exports

use clap::{Parser, ValueEnum};

use crate::cli::{Command, LambdaArgs, NpavgArgs, RateArgs, SimulateArgs};
use crate::data::{EventSpec, generate_event};
use crate::design::{build_indicator, teams_from_matches};
use crate::domain::{LambdaStrategy, Metric, RunConfig, TeamId};
use crate::error::{AppError, CalcError};
use crate::io::{RatingsFile, load_matches, write_event_json, write_ratings_csv, write_ratings_json};
use crate::metrics::{matches_played, np_avg};
use crate::rating::LambdaPolicy;
use crate::report::{format_lambda_choice, format_ratings, format_run_summary};

pub mod pipeline;

/// Explicit ridge strength.
pub const ENV_LAMBDA: &str = "OPR_LAMBDA";
/// λ strategy name (`explicit`, `band`, `continuous`, `auto`).
pub const ENV_LAMBDA_STRATEGY: &str = "OPR_LAMBDA_STRATEGY";

/// Entry point for the `opr` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    init_logging(cli.verbose);

    match cli.command {
        Command::Rate(args) => handle_rate(args),
        Command::Lambda(args) => handle_lambda(args),
        Command::Npavg(args) => handle_npavg(args),
        Command::Simulate(args) => handle_simulate(args),
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "info" } else { "warn" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .try_init();
}

fn handle_rate(args: RateArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args, |k| std::env::var(k).ok())?;
    let run = pipeline::run_ratings(&config)?;

    println!(
        "{}",
        format_run_summary(&config.matches_path, &run.ingest, &run.choice, &run.fits, &run.failures)
    );
    let metrics: Vec<Metric> = run.fits.iter().map(|f| f.metric).collect();
    println!("{}", format_ratings(&run.rows, &metrics, config.top_n));
    if let Some(acc) = run.prediction_accuracy {
        println!("OPR winner prediction accuracy: {:.1}%", acc * 100.0);
    }

    if let Some(path) = &config.export_csv {
        write_ratings_csv(path, &run.rows)?;
    }
    if let Some(path) = &config.export_json {
        let file = RatingsFile::new(
            &config.matches_path,
            run.ingest.matches.len(),
            run.choice.clone(),
            run.fits.clone(),
            run.rows.clone(),
            run.prediction_accuracy,
        );
        write_ratings_json(path, &file)?;
    }

    Ok(())
}

fn handle_lambda(args: LambdaArgs) -> Result<(), AppError> {
    let ingest = load_matches(&args.matches)?;
    let matches = &ingest.matches;
    let teams = teams_from_matches(matches);
    let indicator = match build_indicator(matches, &teams) {
        Ok(sys) => Some(sys),
        Err(CalcError::InsufficientData) => None,
        Err(e) => return Err(e.into()),
    };

    let (strategies, explicit) = lambda_strategies_from_args(&args, |k| std::env::var(k).ok())?;

    println!("{} matches, {} teams", matches.len(), teams.len());
    for strategy in strategies {
        let choice = LambdaPolicy::from_strategy(strategy, explicit)
            .choose_lambda(matches.len(), indicator.as_ref().map(|s| &s.a))?;
        println!("  {:<10} {}", format!("{strategy:?}"), format_lambda_choice(&choice));
    }
    Ok(())
}

fn handle_npavg(args: NpavgArgs) -> Result<(), AppError> {
    let ingest = load_matches(&args.matches)?;
    let team = TeamId(args.team);
    let played = matches_played(&ingest.matches, team);
    if played == 0 {
        log::warn!("Team {team} does not appear in '{}'.", args.matches.display());
    }
    println!(
        "team {team}: npavg={:.3} over {played} matches",
        np_avg(&ingest.matches, team)
    );
    Ok(())
}

fn handle_simulate(args: SimulateArgs) -> Result<(), AppError> {
    let spec = EventSpec {
        team_count: args.teams,
        match_count: args.match_count,
        alliance_size: args.alliance_size,
        seed: args.seed,
        noise_sd: args.noise,
        penalty_rate: args.penalty_rate,
    };
    let event = generate_event(&spec)?;
    write_event_json(&args.out, &event)?;
    println!(
        "Wrote {} matches for {} teams to {}",
        event.matches.len(),
        event.truth.len(),
        args.out.display()
    );
    Ok(())
}

/// Resolve CLI flags plus env fallbacks into a `RunConfig`.
///
/// Precedence for the strategy: `--strategy`, then `explicit` when `--lambda`
/// is given, then `OPR_LAMBDA_STRATEGY`, then `explicit` when `OPR_LAMBDA` is
/// set, else `auto`.
pub fn run_config_from_args<F>(args: &RateArgs, env: F) -> Result<RunConfig, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    let env_lambda = env_lambda(&env)?;
    let lambda = args.lambda.or(env_lambda);

    let strategy = match (args.strategy, args.lambda) {
        (Some(s), _) => s,
        (None, Some(_)) => LambdaStrategy::Explicit,
        (None, None) => match env(ENV_LAMBDA_STRATEGY).filter(|s| !s.trim().is_empty()) {
            Some(raw) => LambdaStrategy::from_str(raw.trim(), true).map_err(|_| {
                AppError::new(2, format!("Invalid {ENV_LAMBDA_STRATEGY} '{raw}'."))
            })?,
            None if env_lambda.is_some() => LambdaStrategy::Explicit,
            None => LambdaStrategy::Auto,
        },
    };

    if strategy == LambdaStrategy::Explicit && lambda.is_none() {
        return Err(AppError::new(
            2,
            format!("Explicit strategy needs --lambda or {ENV_LAMBDA}."),
        ));
    }

    Ok(RunConfig {
        matches_path: args.matches.clone(),
        teams: args
            .teams
            .as_ref()
            .map(|ids| ids.iter().copied().map(TeamId).collect()),
        strategy,
        lambda: lambda.unwrap_or(0.0),
        metric: args.metric,
        top_n: args.top,
        export_csv: args.export.clone(),
        export_json: args.export_json.clone(),
    })
}

/// Strategies to report for `opr lambda`, plus the λ used by `explicit`.
///
/// Without `--strategy` the heuristic strategies are listed, and `explicit`
/// joins them when a λ is supplied. Asking for `explicit` without a λ is an
/// error, as it is for `rate`.
pub fn lambda_strategies_from_args<F>(args: &LambdaArgs, env: F) -> Result<(Vec<LambdaStrategy>, f64), AppError>
where
    F: Fn(&str) -> Option<String>,
{
    let lambda = match args.lambda {
        Some(l) => Some(l),
        None => env_lambda(&env)?,
    };

    let strategies = match args.strategy {
        Some(s) => vec![s],
        None => {
            let mut all = vec![LambdaStrategy::Band, LambdaStrategy::Continuous, LambdaStrategy::Auto];
            if lambda.is_some() {
                all.insert(0, LambdaStrategy::Explicit);
            }
            all
        }
    };

    if strategies.contains(&LambdaStrategy::Explicit) && lambda.is_none() {
        return Err(AppError::new(
            2,
            format!("Explicit strategy needs --lambda or {ENV_LAMBDA}."),
        ));
    }
    Ok((strategies, lambda.unwrap_or(0.0)))
}

fn env_lambda<F>(env: F) -> Result<Option<f64>, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    match env(ENV_LAMBDA).filter(|s| !s.trim().is_empty()) {
        Some(raw) => raw
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| AppError::new(2, format!("Invalid {ENV_LAMBDA} '{raw}'."))),
        None => Ok(None),
    }
}

/// Rewrite argv so a bare `opr --matches FILE ...` means `opr rate ...`.
///
/// Rules:
/// - `opr --help/--version/-h` -> unchanged
/// - `opr [-v] <subcommand> ...` -> unchanged
/// - `opr [-v] -m FILE ...`      -> `opr [-v] rate -m FILE ...`
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(pos) = argv
        .iter()
        .skip(1)
        .position(|a| !matches!(a.as_str(), "-v" | "--verbose"))
        .map(|p| p + 1)
    else {
        return argv;
    };

    let first = argv[pos].as_str();
    let is_top_level = matches!(first, "-h" | "--help" | "-V" | "--version" | "help");
    let is_subcommand = matches!(first, "rate" | "lambda" | "npavg" | "simulate");
    if is_top_level || is_subcommand {
        return argv;
    }

    if first.starts_with('-') {
        argv.insert(pos, "rate".to_string());
    }
    argv
}
