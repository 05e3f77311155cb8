use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache connection failed: {0}")]
    Connection(String),
    #[error("cache backend error: {0}")]
    Backend(String),
    #[error("invalid cache key pattern {0}")]
    InvalidPattern(String),
}

pub type CacheResult<T> = Result<T, CacheError>;
