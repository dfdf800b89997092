use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BenchError {
    #[error("failed to start '{command}': {reason}")]
    ToolInvocation { command: String, reason: String },

    #[error("'{command}' timed out after {timeout_ms}ms")]
    ToolTimeout { command: String, timeout_ms: u128 },

    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("log section missing required field '{0}'")]
    ParseFormat(&'static str),

    #[error("no records to tabulate")]
    EmptyResult,

    #[error("tool '{tool}' uses unknown placeholder '{{{placeholder}}}'")]
    UnknownPlaceholder { tool: String, placeholder: String },

    #[error("tool '{0}' command does not reference {{url}}")]
    MissingUrlPlaceholder(String),

    #[error("tool '{0}' is defined more than once")]
    DuplicateTool(String),

    #[error("target '{0}' is defined more than once")]
    DuplicateTarget(String),

    #[error("target '{name}' has an invalid url '{url}': {reason}")]
    InvalidUrl {
        name: String,
        url: String,
        reason: String,
    },

    #[error("{kind} '{name}' may only contain letters, digits, '.', '_' and '-'")]
    InvalidName { kind: &'static str, name: String },

    #[error("tool '{tool}' has an invalid error_pattern: {reason}")]
    InvalidPattern { tool: String, reason: String },

    #[error("no tools configured")]
    NoTools,

    #[error("no targets configured")]
    NoTargets,
}

impl BenchError {
    /// Text stored in the Error Message column when this error ends a trial.
    pub fn record_message(&self) -> String {
        match self {
            BenchError::ToolTimeout { .. } => "timed out".to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_record_message() {
        let err = BenchError::ToolTimeout {
            command: "curl x".to_string(),
            timeout_ms: 5,
        };
        assert_eq!(err.record_message(), "timed out");
    }

    #[test]
    fn test_placeholder_message_keeps_braces() {
        let err = BenchError::UnknownPlaceholder {
            tool: "curl".to_string(),
            placeholder: "bogus".to_string(),
        };
        assert_eq!(err.to_string(), "tool 'curl' uses unknown placeholder '{bogus}'");
    }
}
