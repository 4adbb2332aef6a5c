use thiserror::Error;

/// Result type for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Main error type for the crate
///
/// Running short on replay data is not an error (see
/// [`LearnOutcome::Skipped`](crate::agent::LearnOutcome::Skipped)), and neither
/// is a diverging fit, which is reported as a value so the loop keeps going.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AgentError {
    /// Invalid dimensions for operations
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        expected: String,
        actual: String,
    },

    /// Invalid parameter value
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter {
        name: String,
        reason: String,
    },

    /// Action outside of the action space
    #[error("Invalid action {action}: must be less than {action_count}")]
    InvalidAction {
        action: usize,
        action_count: usize,
    },

    /// Configuration could not be parsed
    #[error("Config error: {0}")]
    Config(String),

    /// IO errors (file operations)
    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for AgentError {
    fn from(err: std::io::Error) -> Self {
        AgentError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for AgentError {
    fn from(err: serde_json::Error) -> Self {
        AgentError::Config(err.to_string())
    }
}

// Helper functions for common error patterns
impl AgentError {
    pub fn dimension_mismatch<S: Into<String>>(expected: S, actual: S) -> Self {
        AgentError::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn invalid_parameter<S: Into<String>>(name: S, reason: S) -> Self {
        AgentError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Fails unless `actual` equals `expected`; used for state arity checks.
    pub(crate) fn check_arity(expected: usize, actual: usize) -> Result<()> {
        if expected == actual {
            Ok(())
        } else {
            Err(AgentError::dimension_mismatch(
                format!("state of length {}", expected),
                format!("state of length {}", actual),
            ))
        }
    }
}
