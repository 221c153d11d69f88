// src/error.rs
// Domain and device error types for HtREST

use thiserror::Error;

/// Coarse classification used to pick an HTTP status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidParameterClass,
    Connectivity,
    Unhandled,
}

/// Main error type for the HtREST library
#[derive(Error, Debug)]
pub enum HtError {
    #[error("{}", unknown_params_message(.0))]
    UnknownParams(Vec<String>),

    #[error("Fault list entry #{0} not found")]
    FaultEntryNotFound(usize),

    #[error("Fault list is empty")]
    FaultListEmpty,

    #[error("Time program #{0} not found")]
    TimeProgNotFound(usize),

    #[error("Time program entry #{day}/{num} of time program #{index} not found")]
    TimeProgEntryNotFound { index: usize, day: usize, num: usize },

    #[error("Parameter '{0}' is not a fast query (MP) data point")]
    NotFastQueryable(String),

    #[error("heat pump connection failed: {0}")]
    Connectivity(String),

    #[error("heat pump error: {0}")]
    Device(String),

    #[error("invalid value for parameter '{name}': {reason}")]
    InvalidValue { name: String, reason: String },

    #[error("invalid time program: {0}")]
    InvalidTimeProgram(String),

    #[error("invalid date/time '{0}'")]
    InvalidDateTime(String),

    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("parameter catalog error: {0}")]
    Catalog(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// Convenience type alias for Result using HtError
pub type Result<T> = std::result::Result<T, HtError>;

fn unknown_params_message(names: &[String]) -> String {
    let quoted: Vec<String> = names.iter().map(|n| format!("'{n}'")).collect();
    if quoted.len() == 1 {
        format!("Parameter {} not found", quoted[0])
    } else {
        format!("Parameters {} not found", quoted.join(", "))
    }
}

impl HtError {
    pub fn invalid_value(name: impl Into<String>, reason: impl Into<String>) -> Self {
        HtError::InvalidValue {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            HtError::UnknownParams(_)
            | HtError::FaultEntryNotFound(_)
            | HtError::FaultListEmpty
            | HtError::TimeProgNotFound(_)
            | HtError::TimeProgEntryNotFound { .. } => ErrorKind::NotFound,
            HtError::NotFastQueryable(_) => ErrorKind::InvalidParameterClass,
            HtError::Connectivity(_) => ErrorKind::Connectivity,
            _ => ErrorKind::Unhandled,
        }
    }
}

impl From<String> for HtError {
    fn from(s: String) -> Self {
        HtError::Other(s)
    }
}

impl From<tokio::task::JoinError> for HtError {
    fn from(err: tokio::task::JoinError) -> Self {
        if err.is_panic() {
            HtError::Other("heat pump task panicked".to_string())
        } else {
            HtError::Other(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_unknown_param_message() {
        let err = HtError::UnknownParams(vec!["Foo".to_string()]);
        assert_eq!(err.to_string(), "Parameter 'Foo' not found");
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_aggregate_unknown_params_message() {
        let err = HtError::UnknownParams(vec!["Foo".to_string(), "Bar.Baz".to_string()]);
        assert_eq!(err.to_string(), "Parameters 'Foo', 'Bar.Baz' not found");
    }

    #[test]
    fn test_kinds() {
        assert_eq!(HtError::FaultEntryNotFound(3).kind(), ErrorKind::NotFound);
        assert_eq!(
            HtError::NotFastQueryable("x".into()).kind(),
            ErrorKind::InvalidParameterClass
        );
        assert_eq!(
            HtError::Connectivity("port closed".into()).kind(),
            ErrorKind::Connectivity
        );
        assert_eq!(HtError::invalid_value("x", "y").kind(), ErrorKind::Unhandled);
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<i32>("not json").unwrap_err();
        let err: HtError = json_err.into();
        assert!(matches!(err, HtError::Json(_)));
        assert!(err.to_string().contains("JSON"));
    }
}
