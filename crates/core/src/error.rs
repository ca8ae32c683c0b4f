use thiserror::Error;

/// Core errors for the telemetry sampler.
///
/// Per-tick metric reads degrade to sentinel values instead of surfacing
/// these; the error type covers configuration, setup, and the probe layer.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("procfs error: {0}")]
    Procfs(#[from] procfs::ProcError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unix system error: {0}")]
    Unix(#[from] nix::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Query tool error: {0}")]
    QueryTool(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    pub fn query_tool<S: Into<String>>(msg: S) -> Self {
        Self::QueryTool(msg.into())
    }
}
