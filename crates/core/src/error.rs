use thiserror::Error;

#[derive(Debug, Error)]
pub enum TopListError {
    /// The score store is missing, unreachable, or the query failed or timed out.
    #[error("score store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type TopListResult<T> = Result<T, TopListError>;
