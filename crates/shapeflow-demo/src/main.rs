//! Run a scenario and print its dashboard as JSON.
//!
//! Usage: `shapeflow-demo [config.toml] [scenario.ron]`. Both default to
//! the files under `scenarios/`. Set `RUST_LOG=shapeflow_stats=debug` to
//! watch rotations.

use std::path::PathBuf;
use std::process::ExitCode;

use shapeflow_demo::{DASHBOARD_LIMIT, DemoError, dashboard, load_scenario, run_scenario};
use shapeflow_stats::{AnalyticsConfig, DataSource};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/scenarios/shapeflow.toml");
const DEFAULT_SCENARIO: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/scenarios/early_hub.ron");

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "demo failed");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), DemoError> {
    let mut args = std::env::args_os().skip(1);
    let config_path = args.next().map_or_else(|| PathBuf::from(DEFAULT_CONFIG), PathBuf::from);
    let scenario_path = args
        .next()
        .map_or_else(|| PathBuf::from(DEFAULT_SCENARIO), PathBuf::from);

    let config = AnalyticsConfig::load(&config_path)?;
    let scenario = load_scenario(&scenario_path)?;
    tracing::info!(
        title = %scenario.title,
        window_len = config.window_len,
        slice_duration_secs = config.slice_duration_secs,
        "running scenario"
    );

    let run = run_scenario(config, &scenario)?;
    let mut rows = Vec::new();
    for source in DataSource::ALL {
        rows.extend(dashboard(&run, source, DASHBOARD_LIMIT)?);
    }
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}
