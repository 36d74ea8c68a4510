use thiserror::Error;

use keyspace_common::StoreError;

use crate::config::ConfigError;

/// Benchmark run errors
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BenchError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store is not empty ({keys} keys); flush it or set store.flush_before_run")]
    StoreNotEmpty { keys: u64 },

    #[error("Verification failed: {0}")]
    Verification(String),
}

pub type BenchResult<T> = Result<T, BenchError>;

impl BenchError {
    pub fn verification(message: impl Into<String>) -> Self {
        BenchError::Verification(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_converts() {
        let err: BenchError = StoreError::Connection("refused".into()).into();
        assert!(matches!(err, BenchError::Store(_)));
        assert!(err.to_string().contains("refused"));
    }

    #[test]
    fn test_store_not_empty_message() {
        let err = BenchError::StoreNotEmpty { keys: 42 };
        assert!(err.to_string().contains("42 keys"));
    }
}
