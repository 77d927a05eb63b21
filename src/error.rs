use std::fmt::Debug;
use std::fmt::Display;
use std::time::Duration;

use thiserror::Error;

pub type Result<T, E> = std::result::Result<T, CacheError<E>>;

/// Errors reported by the cached containers. `E` is the error type of the producer backing a container.
#[derive(Error, Debug)]
pub enum CacheError<E>
where
    E: Display + Debug,
{
    /// The producer failed. Its error is carried unchanged.
    #[error("producer failed: {0}")]
    Producer(E),

    #[error("[{list}] no item with key '{key}'")]
    KeyNotFound { list: String, key: String },
}

impl<E> CacheError<E>
where
    E: Display + Debug,
{
    pub fn is_key_not_found(&self) -> bool {
        matches!(self, Self::KeyNotFound { .. })
    }

    pub fn producer_error(&self) -> Option<&E> {
        match self {
            Self::Producer(err) => Some(err),
            _ => None,
        }
    }

    pub fn into_producer_error(self) -> Option<E> {
        match self {
            Self::Producer(err) => Some(err),
            _ => None,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WaitError {
    #[error("retry period must not be zero")]
    ZeroPeriod,

    #[error("retry period {period:?} is longer than the total wait time {total:?}")]
    PeriodExceedsTotal { period: Duration, total: Duration },

    #[error("condition not met within {total:?}")]
    TimedOut { total: Duration },
}
