//! Error types for sorted-set commands

use thiserror::Error;

/// Errors raised while building, dispatching or decoding a command.
///
/// `InvalidArgument`, `InvalidRange` and `NotImplemented` are produced
/// locally before anything is handed to the executor.
#[derive(Error, Debug)]
pub enum ZsetError {
    /// Wrong numeric value, or an optional pair given only half-way
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Minimum bound greater than maximum bound
    #[error("invalid range: {0}")]
    InvalidRange(String),

    #[error("{0} is not implemented")]
    NotImplemented(&'static str),

    /// Reply had the wrong shape, or a scalar was not textual where a
    /// number was expected
    #[error("unexpected reply: {0}")]
    UnexpectedReply(String),

    /// Error reply sent back by the store
    #[error("server error: {0}")]
    Server(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("connection closed by server")]
    ConnectionClosed,

    /// An earlier exchange failed or was cut off mid-write
    #[error("connection is unusable after an interrupted exchange")]
    ConnectionBroken,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ZsetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ZsetError::NotImplemented("ZUNIONSTORE").to_string(),
            "ZUNIONSTORE is not implemented"
        );
        assert_eq!(
            ZsetError::InvalidRange("min could not be greater than max".into()).to_string(),
            "invalid range: min could not be greater than max"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let err: ZsetError = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe").into();
        assert!(matches!(err, ZsetError::Io(_)));
    }
}
