//! Headless scenario driver for the shapeflow analytics engine.
//!
//! Loads an [`AnalyticsConfig`](shapeflow_stats::AnalyticsConfig) from TOML
//! and a synthetic [`Scenario`] from RON, steps the engine on a simulated
//! clock and renders ranked dashboard rows the way a statistics screen
//! would consume them.
//!
//! # Usage
//!
//! ```rust,ignore
//! use shapeflow_demo::{dashboard, load_scenario, run_scenario};
//!
//! let config = AnalyticsConfig::load(Path::new("scenarios/shapeflow.toml"))?;
//! let scenario = load_scenario(Path::new("scenarios/early_hub.ron"))?;
//! let run = run_scenario(config, &scenario)?;
//! let rows = dashboard(&run, DataSource::Produced, 200)?;
//! ```

pub mod error;
pub mod runner;
pub mod scenario;

pub use error::DemoError;
pub use runner::{DashboardRow, ScenarioRun, dashboard, run_scenario};
pub use scenario::{FlowDef, FlowKind, Scenario, StoreDef, load_scenario, parse_scenario};

/// Row limit of the statistics listing.
pub const DASHBOARD_LIMIT: usize = 200;
