use edublocks_core::TransportError;
use thiserror::Error;

/// A user request that is not a valid transition. State is left untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Refusal {
    #[error("cannot convert a Python document to a blocks document")]
    ScriptToDiagram,

    #[error("you must specify a filename in order to save")]
    MissingFileName,

    #[error("file name is empty")]
    EmptyFileName,

    #[error("unknown file type: {0}")]
    UnknownFileType(String),

    #[error("block view not available")]
    DiagramViewUnavailable,

    #[error("there is no code to run")]
    NothingToRun,

    #[error("there is no code to save")]
    NothingToSave,

    #[error("invalid path: {0}")]
    InvalidPath(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    #[error(transparent)]
    Refused(#[from] Refusal),

    #[error("device error: {0}")]
    Transport(#[from] TransportError),
}

pub type Result<T> = std::result::Result<T, EditorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refusal_conversion() {
        let err: EditorError = Refusal::NothingToRun.into();
        assert!(matches!(err, EditorError::Refused(Refusal::NothingToRun)));
        assert_eq!(err.to_string(), "there is no code to run");
    }

    #[test]
    fn test_transport_error_display() {
        let err: EditorError = TransportError::Disconnected.into();
        assert_eq!(err.to_string(), "device error: device is not connected");
    }
}
