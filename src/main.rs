use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use weather_planner::context::{EvalOptions, DEFAULT_LOCATION_TOLERANCE};
use weather_planner::dataset::Dataset;
use weather_planner::engine::collect_expressions;
use weather_planner::errors::Result;
use weather_planner::{PlanError, Planner};

/// Find favourable hours in a saved hourly forecast.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Open-Meteo hourly forecast response (JSON file)
    #[arg(long, short = 'd')]
    data: PathBuf,
    /// Predicate expression, e.g. "wind < 20" (repeatable)
    #[arg(long = "expr", short = 'e')]
    exprs: Vec<String>,
    /// File with one expression per line; blank lines and `#` comments are skipped
    #[arg(long)]
    plan: Option<PathBuf>,
    /// Tolerance in degrees for `location` checks
    #[arg(long, default_value_t = DEFAULT_LOCATION_TOLERANCE)]
    tolerance: f64,
    /// Group matching hours into contiguous windows
    #[arg(long)]
    windows: bool,
    /// Enable debug logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn run(args: Args) -> Result<String> {
    let exprs = collect_expressions(args.plan.as_deref(), args.exprs)?;

    let dataset = Dataset::from_path(&args.data)?;
    info!(records = dataset.len(), location = %dataset.location(), expressions = exprs.len(), "evaluating plan");

    let planner = Planner::default()
        .with_options(EvalOptions::default().with_location_tolerance(args.tolerance));
    let out = if args.windows {
        let windows = planner.windows(&exprs, &dataset)?;
        info!(windows = windows.len(), "favourable windows found");
        serde_json::to_string_pretty(&windows).map_err(PlanError::Output)?
    } else {
        let records = planner.evaluate(&exprs, &dataset)?;
        info!(records = records.len(), "favourable records found");
        serde_json::to_string_pretty(&records).map_err(PlanError::Output)?
    };
    Ok(out)
}

fn main() -> ExitCode {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .init();

    match run(args) {
        Ok(out) => {
            println!("{out}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
