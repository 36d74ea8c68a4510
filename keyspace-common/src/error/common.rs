//! Store error types shared by every backend.

use thiserror::Error;

/// Errors raised by a [`KeyValueStore`](crate::store::KeyValueStore) backend.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum StoreError {
    /// Could not reach the store or the connection dropped
    #[error("Store connection failed: {0}")]
    Connection(String),

    /// The store rejected or failed a command
    #[error("Store command failed: {0}")]
    Command(String),

    /// Operation against a key holding the wrong kind of value
    #[error("WRONGTYPE operation against key '{key}' holding the wrong kind of value")]
    WrongType { key: String },

    /// The store answered with a reply we cannot interpret
    #[error("Unexpected reply: {0}")]
    UnexpectedReply(String),
}

impl StoreError {
    /// Create a WrongType error
    pub fn wrong_type(key: impl Into<String>) -> Self {
        StoreError::WrongType { key: key.into() }
    }

    /// True when the failure came from the connection rather than a command
    pub fn is_connection(&self) -> bool {
        matches!(self, StoreError::Connection(_))
    }
}

impl From<redis::RedisError> for StoreError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_io_error() || err.is_connection_refusal() || err.is_connection_dropped() {
            StoreError::Connection(err.to_string())
        } else if err.kind() == redis::ErrorKind::TypeError {
            StoreError::UnexpectedReply(err.to_string())
        } else {
            StoreError::Command(err.to_string())
        }
    }
}

/// Result alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrong_type_message() {
        let err = StoreError::wrong_type("group_1");
        assert_eq!(
            err.to_string(),
            "WRONGTYPE operation against key 'group_1' holding the wrong kind of value"
        );
        assert!(!err.is_connection());
    }

    #[test]
    fn test_redis_io_error_maps_to_connection() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err: StoreError = redis::RedisError::from(io).into();
        assert!(err.is_connection());
    }

    #[test]
    fn test_redis_response_error_maps_to_command() {
        let redis_err = redis::RedisError::from((redis::ErrorKind::ResponseError, "ERR bad"));
        let err: StoreError = redis_err.into();
        assert!(matches!(err, StoreError::Command(_)));
    }

    #[test]
    fn test_redis_type_error_maps_to_unexpected_reply() {
        let redis_err = redis::RedisError::from((redis::ErrorKind::TypeError, "not a string"));
        let err: StoreError = redis_err.into();
        assert!(matches!(err, StoreError::UnexpectedReply(_)));
    }
}
