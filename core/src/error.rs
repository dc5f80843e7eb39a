use thiserror::Error;

/// Failure reported by the device session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("rejected by device: {0}")]
    Rejected(String),

    #[error("device is not connected")]
    Disconnected,

    #[error("{0} is not valid UTF-8")]
    InvalidUtf8(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TransportError::NotFound("/user/a.py".to_string());
        assert_eq!(err.to_string(), "not found: /user/a.py");

        let err = TransportError::Rejected("OSError: 28".to_string());
        assert_eq!(err.to_string(), "rejected by device: OSError: 28");

        assert_eq!(TransportError::Disconnected.to_string(), "device is not connected");
    }
}
