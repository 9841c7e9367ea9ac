use thiserror::Error;

pub type Result<T, E = RochambeauError> = std::result::Result<T, E>;

/// Unified error type covering the failure scenarios of every subsystem.
#[derive(Debug, Error)]
pub enum RochambeauError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("camera error: {0}")]
    Camera(String),
    #[error("detector error: {0}")]
    Detector(String),
    #[error("asset error: {0}")]
    Asset(String),
    #[error("render error: {0}")]
    Render(String),
    #[error("operational error: {0}")]
    Ops(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
