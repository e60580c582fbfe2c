use std::path::PathBuf;

/// Errors that can occur while running a demo scenario.
#[derive(Debug, thiserror::Error)]
pub enum DemoError {
    /// The analytics configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] shapeflow_stats::ConfigError),

    /// An analytics call was rejected.
    #[error(transparent)]
    Analytics(#[from] shapeflow_stats::AnalyticsError),

    /// Failed to parse a scenario file.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// The scenario parsed but describes an impossible run.
    #[error("invalid scenario '{title}': {detail}")]
    InvalidScenario { title: String, detail: String },

    /// Failed to render dashboard output.
    #[error("output error: {0}")]
    Output(#[from] serde_json::Error),

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
