use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipeLlmError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// 재시도 한도 안에 데몬 socket에 연결하지 못함
    #[error("Daemon failed to start (no answer after {attempts} attempts).")]
    DaemonUnavailable { attempts: u32 },

    #[error("Failed to spawn daemon: {0}")]
    SpawnError(String),

    #[error("Missing GEMINI_API_KEY")]
    MissingApiKey,

    #[error("Isolated mode requires a prompt or stdin.")]
    MissingInput,

    #[error("Invalid daemon environment: {0}")]
    InvalidDaemonEnv(String),
}

pub type Result<T> = std::result::Result<T, PipeLlmError>;
