use std::path::PathBuf;

/// Errors an agent can report instead of a move.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("agent '{agent}' has no move policy")]
    Unimplemented { agent: String },

    #[error("agent '{agent}' returned an illegal move: {board}")]
    IllegalMove { agent: String, board: String },

    #[error("agent '{agent}' was asked to move on a finished board")]
    GameOver { agent: String },

    #[error("input closed before a move was entered")]
    InputClosed,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur when loading or saving network weights.
#[derive(Debug, thiserror::Error)]
pub enum WeightsError {
    #[error("failed to read weights from {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write weights to {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse weights from {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("no network named '{0}' in the weight file")]
    MissingNetwork(String),

    #[error("network '{name}' has layout {found:?}, expected {expected:?}")]
    LayoutMismatch {
        name: String,
        expected: Vec<usize>,
        found: Option<Vec<usize>>,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}
