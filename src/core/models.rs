use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use url::Url;

use super::errors::BenchError;

/// Characters a target URL may not contain. Rendered commands go through
/// `sh -c` (and lftp's own command parser), so these must be percent-encoded.
const SHELL_UNSAFE: &[char] = &[
    '"', '\'', '`', '$', '\\', ';', '&', '|', '<', '>', '(', ')', '!',
];

/// True for names that are safe to splice unquoted into a shell command:
/// ASCII letters, digits, `.`, `_` and `-`.
pub fn is_plain_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolProfile {
    pub name: String,
    pub command: String,
    /// Regex picking the diagnostic line out of a failed run's output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_pattern: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl ToolProfile {
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            error_pattern: None,
            enabled: true,
        }
    }

    pub fn with_error_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.error_pattern = Some(pattern.into());
        self
    }

    /// First word of the command template, i.e. the program that gets launched.
    pub fn program(&self) -> Option<String> {
        shell_words::split(&self.command)
            .ok()
            .and_then(|words| words.into_iter().next())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub name: String,
    pub url: String,
}

impl Target {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }

    pub fn parsed_url(&self) -> Result<Url, BenchError> {
        if let Some(c) = self
            .url
            .chars()
            .find(|c| c.is_whitespace() || c.is_control() || SHELL_UNSAFE.contains(c))
        {
            return Err(BenchError::InvalidUrl {
                name: self.name.clone(),
                url: self.url.clone(),
                reason: format!("contains {:?}, percent-encode it", c),
            });
        }
        let parsed = Url::parse(&self.url).map_err(|e| BenchError::InvalidUrl {
            name: self.name.clone(),
            url: self.url.clone(),
            reason: e.to_string(),
        })?;
        if parsed.host_str().is_none_or(str::is_empty) {
            return Err(BenchError::InvalidUrl {
                name: self.name.clone(),
                url: self.url.clone(),
                reason: "url has no host".to_string(),
            });
        }
        Ok(parsed)
    }

    pub fn protocol(&self) -> Option<String> {
        Url::parse(&self.url).ok().map(|u| u.scheme().to_string())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Status {
    Success,
    Failure,
    /// Status text from a log that is neither of the two known values.
    Other(String),
}

impl Status {
    pub fn as_str(&self) -> &str {
        match self {
            Status::Success => "Success",
            Status::Failure => "Failure",
            Status::Other(s) => s,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Status::Success)
    }
}

impl From<&str> for Status {
    fn from(value: &str) -> Self {
        match value {
            "Success" => Status::Success,
            "Failure" => Status::Failure,
            other => Status::Other(other.to_string()),
        }
    }
}

impl From<String> for Status {
    fn from(value: String) -> Self {
        Status::from(value.as_str())
    }
}

impl From<Status> for String {
    fn from(value: Status) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the child process of a trial ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrialOutcome {
    Exited(i32),
    TimedOut,
    /// The process never started; carries the spawn error.
    NotStarted(String),
}

#[derive(Clone, Debug)]
pub struct Trial {
    pub tool: String,
    pub target: Target,
    pub filename: String,
    pub command: String,
    pub started_at: chrono::DateTime<chrono::Local>,
    pub output: String,
    pub outcome: TrialOutcome,
    pub elapsed: Duration,
    pub file_size: u64,
    pub error_pattern: Option<regex::Regex>,
}

impl Trial {
    pub fn succeeded(&self) -> bool {
        self.outcome == TrialOutcome::Exited(0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub tool: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_ms: Option<u128>,
}

impl Record {
    pub fn new(tool: impl Into<String>, status: Status) -> Self {
        Self {
            tool: tool.into(),
            url: None,
            status,
            error_message: None,
            ip: None,
            timestamp: None,
            file_size: None,
            full_command: None,
            protocol: None,
            elapsed_ms: None,
        }
    }
}
