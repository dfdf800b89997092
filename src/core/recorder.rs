use regex::Regex;

use super::errors::BenchError;
use super::models::{Record, Status, Target, Trial, TrialOutcome};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Turns finished trials into records, stamping the run's local address.
pub struct ResultRecorder {
    ip: String,
}

impl ResultRecorder {
    /// `ip` is looked up once per run by the caller.
    pub fn new(ip: impl Into<String>) -> Self {
        Self { ip: ip.into() }
    }

    pub fn to_record(&self, trial: Trial) -> Record {
        tracing::debug!("Recording {} trial for {}", trial.tool, trial.filename);
        let status = if trial.succeeded() {
            Status::Success
        } else {
            Status::Failure
        };

        let error_message = match &trial.outcome {
            TrialOutcome::Exited(0) => None,
            TrialOutcome::Exited(code) => Some(
                diagnostic(&trial.output, trial.error_pattern.as_ref())
                    .unwrap_or_else(|| format!("exit code {}", code)),
            ),
            TrialOutcome::TimedOut => Some(
                BenchError::ToolTimeout {
                    command: trial.command.clone(),
                    timeout_ms: trial.elapsed.as_millis(),
                }
                .record_message(),
            ),
            TrialOutcome::NotStarted(reason) => Some(flatten(reason)),
        };

        Record {
            tool: trial.tool,
            protocol: trial.target.protocol(),
            url: Some(trial.target.url),
            status,
            error_message,
            ip: Some(self.ip.clone()),
            timestamp: Some(trial.started_at.format(TIMESTAMP_FORMAT).to_string()),
            file_size: Some(trial.file_size),
            full_command: Some(trial.command),
            elapsed_ms: Some(trial.elapsed.as_millis()),
        }
    }

    /// Record for a trial that never got as far as rendering a command.
    pub fn failure_record(&self, tool: &str, target: &Target, error: &BenchError) -> Record {
        Record {
            url: Some(target.url.clone()),
            protocol: target.protocol(),
            error_message: Some(error.record_message()),
            ip: Some(self.ip.clone()),
            timestamp: Some(chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()),
            file_size: Some(0),
            ..Record::new(tool, Status::Failure)
        }
    }
}

/// Last line matching the tool's error pattern, else the last non-empty line.
fn diagnostic(output: &str, pattern: Option<&Regex>) -> Option<String> {
    let mut lines = output.lines().map(str::trim).filter(|l| !l.is_empty());
    let line = match pattern {
        Some(re) => {
            let all: Vec<&str> = lines.collect();
            all.iter()
                .rev()
                .find(|l| re.is_match(l))
                .or_else(|| all.last())
                .copied()
        }
        None => lines.next_back(),
    };
    line.map(flatten)
}

fn flatten(text: &str) -> String {
    text.split(['\t', '\r', '\n'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::time::Duration;

    fn trial(outcome: TrialOutcome, output: &str, pattern: Option<&str>) -> Trial {
        Trial {
            tool: "curl".to_string(),
            target: Target::new("https", "https://mirror.example.org/pub/a.gz"),
            filename: "curl_https.download".to_string(),
            command: "curl https://mirror.example.org/pub/a.gz -o curl_https.download".to_string(),
            started_at: chrono::Local::now(),
            output: output.to_string(),
            outcome,
            elapsed: Duration::from_millis(1500),
            file_size: 42,
            error_pattern: pattern.map(|p| Regex::new(p).unwrap()),
        }
    }

    #[test]
    fn test_success_record() {
        let record = ResultRecorder::new("10.0.0.2").to_record(trial(
            TrialOutcome::Exited(0),
            "  % Total\n100 42",
            None,
        ));

        assert_eq!(record.status, Status::Success);
        assert_eq!(record.error_message, None);
        assert_eq!(record.ip.as_deref(), Some("10.0.0.2"));
        assert_eq!(record.file_size, Some(42));
        assert_eq!(record.protocol.as_deref(), Some("https"));
        assert_eq!(record.url.as_deref(), Some("https://mirror.example.org/pub/a.gz"));
        assert_eq!(record.elapsed_ms, Some(1500));
    }

    #[rstest]
    #[case::pattern_hit(
        "* Connected\ncurl: (6) Could not resolve host\n* Closing",
        Some(r"^curl: \(\d+\)"),
        "curl: (6) Could not resolve host"
    )]
    #[case::pattern_miss_falls_back_to_tail("connecting\nrefused\n\n", Some("^ERROR"), "refused")]
    #[case::no_pattern_tail("a\nb\tc\n", None, "b c")]
    #[case::empty_output("", None, "exit code 7")]
    fn test_failure_diagnostic(
        #[case] output: &str,
        #[case] pattern: Option<&str>,
        #[case] expected: &str,
    ) {
        let record = ResultRecorder::new("127.0.0.1")
            .to_record(trial(TrialOutcome::Exited(7), output, pattern));
        assert_eq!(record.status, Status::Failure);
        assert_eq!(record.error_message.as_deref(), Some(expected));
    }

    #[test]
    fn test_timeout_and_not_started() {
        let recorder = ResultRecorder::new("127.0.0.1");

        let timed_out = recorder.to_record(trial(TrialOutcome::TimedOut, "partial", None));
        assert_eq!(timed_out.status, Status::Failure);
        assert_eq!(timed_out.error_message.as_deref(), Some("timed out"));

        let missing = recorder.to_record(trial(
            TrialOutcome::NotStarted("No such file or directory".to_string()),
            "",
            None,
        ));
        assert_eq!(missing.error_message.as_deref(), Some("No such file or directory"));
    }

    #[test]
    fn test_failure_record_for_unknown_tool() {
        let target = Target::new("ftp", "ftp://ftp.example.org/a.gz");
        let record = ResultRecorder::new("127.0.0.1").failure_record(
            "aria2c",
            &target,
            &BenchError::UnknownTool("aria2c".to_string()),
        );

        assert_eq!(record.tool, "aria2c");
        assert_eq!(record.status, Status::Failure);
        assert_eq!(record.error_message.as_deref(), Some("unknown tool: aria2c"));
        assert_eq!(record.full_command, None);
        assert_eq!(record.file_size, Some(0));
    }
}
