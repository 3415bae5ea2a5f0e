use thiserror::Error;

/// Startup and wiring failures surfaced before the server accepts traffic.
#[derive(Debug, Error)]
pub enum InfraError {
    #[error("configuration: {0}")]
    Configuration(String),
    #[error("database: {0}")]
    Database(#[from] sqlx::Error),
    #[error("telemetry: {0}")]
    Telemetry(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl InfraError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn telemetry(message: impl Into<String>) -> Self {
        Self::Telemetry(message.into())
    }
}
