use thiserror::Error;

#[derive(Debug, Error)]
pub enum VitalwatchError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("upstream error: {0}")]
    Upstream(String),
}

pub type VitalwatchResult<T> = Result<T, VitalwatchError>;
