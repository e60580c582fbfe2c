use serde::Deserialize;
use std::path::Path;

use shapeflow_stats::DataSource;

use crate::error::DemoError;

/// A synthetic run loaded from a `.ron` file.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Simulated seconds to run.
    pub duration_secs: f64,
    /// Simulated seconds per step.
    pub step_secs: f64,
    #[serde(default)]
    pub flows: Vec<FlowDef>,
    #[serde(default)]
    pub stores: Vec<StoreDef>,
}

/// A steady stream of counter events.
#[derive(Debug, Clone, Deserialize)]
pub struct FlowDef {
    pub event: FlowKind,
    pub key: String,
    /// Emit once every this many steps.
    pub every_steps: u32,
    /// Items per emission.
    #[serde(default = "default_count")]
    pub count: u64,
    #[serde(default)]
    pub start_secs: f64,
    #[serde(default)]
    pub stop_secs: Option<f64>,
}

/// Which counter event a flow emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum FlowKind {
    Produced,
    Delivered,
    DeliveredToStorage,
}

impl FlowKind {
    pub fn source(self) -> DataSource {
        match self {
            FlowKind::Produced => DataSource::Produced,
            FlowKind::Delivered => DataSource::Delivered,
            FlowKind::DeliveredToStorage => DataSource::DeliveredToStorage,
        }
    }
}

/// A stored quantity that grows every step.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreDef {
    pub key: String,
    #[serde(default)]
    pub initial: u64,
    #[serde(default)]
    pub per_step: u64,
}

fn default_count() -> u64 {
    1
}

impl FlowDef {
    /// Whether the flow emits on `step`, which ends at `now`.
    pub fn fires(&self, step: u64, now: f64) -> bool {
        let running = now > self.start_secs && self.stop_secs.is_none_or(|stop| now <= stop);
        running && step % u64::from(self.every_steps) == 0
    }
}

impl Scenario {
    /// Reject scenarios that would never terminate or never emit.
    pub fn validate(&self) -> Result<(), DemoError> {
        let invalid = |detail: &str| DemoError::InvalidScenario {
            title: self.title.clone(),
            detail: detail.to_string(),
        };
        if !self.step_secs.is_finite() || self.step_secs <= 0.0 {
            return Err(invalid("step_secs must be positive"));
        }
        if !self.duration_secs.is_finite() || self.duration_secs < 0.0 {
            return Err(invalid("duration_secs must be zero or positive"));
        }
        if self.flows.iter().any(|f| f.every_steps == 0) {
            return Err(invalid("every_steps must be at least 1"));
        }
        Ok(())
    }

    /// Number of steps covering `duration_secs`.
    pub fn step_count(&self) -> u64 {
        (self.duration_secs / self.step_secs).ceil() as u64
    }
}

/// Parse and validate a scenario from RON text.
pub fn parse_scenario(input: &str, file: &Path) -> Result<Scenario, DemoError> {
    let scenario: Scenario = ron::from_str(input).map_err(|e| DemoError::Parse {
        file: file.to_path_buf(),
        detail: e.to_string(),
    })?;
    scenario.validate()?;
    Ok(scenario)
}

/// Load a scenario from a `.ron` file.
pub fn load_scenario(path: &Path) -> Result<Scenario, DemoError> {
    let content = std::fs::read_to_string(path)?;
    parse_scenario(&content, path)
}
