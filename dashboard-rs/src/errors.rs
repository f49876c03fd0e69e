//! Error types for the PGHD dashboard core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("remote returned status {status} for {url}")]
    Status { status: u16, url: String },

    #[error("decode error: {0}")]
    Decode(String),

    #[error("graph store error: {0}")]
    Store(String),

    #[error("query error: {0}")]
    Query(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for DashboardError {
    fn from(err: reqwest::Error) -> Self {
        DashboardError::Transport(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
