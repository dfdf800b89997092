use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::errors::BenchError;
use crate::core::models::{Record, Status};

pub const BANNER: &str = "REPORTING RESULTS OF DOWNLOAD ATTEMPT";

static SECTION_DELIMITER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"#{10,}\s*\n\s*#\s*REPORTING RESULTS OF DOWNLOAD ATTEMPT\s*#\s*\n\s*#{10,}")
        .expect("section delimiter regex")
});

/// Field labels recognised inside a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    Command,
    Tool,
    Url,
    Ip,
    Timestamp,
    FileSize,
    Status,
    ErrorMessage,
}

impl Label {
    pub const ALL: [Label; 8] = [
        Label::Command,
        Label::Tool,
        Label::Url,
        Label::Ip,
        Label::Timestamp,
        Label::FileSize,
        Label::Status,
        Label::ErrorMessage,
    ];

    pub fn prefix(self) -> &'static str {
        match self {
            Label::Command => "Command:",
            Label::Tool => "Tool:",
            Label::Url => "URL:",
            Label::Ip => "IP:",
            Label::Timestamp => "Timestamp:",
            Label::FileSize => "File Size:",
            Label::Status => "Status:",
            Label::ErrorMessage => "Error Message:",
        }
    }

    fn strip(line: &str) -> Option<(Label, &str)> {
        Label::ALL
            .iter()
            .find_map(|label| line.strip_prefix(label.prefix()).map(|rest| (*label, rest.trim())))
    }
}

/// Splits result logs into per-trial sections and reads one record from each.
pub struct LogSectionParser;

impl LogSectionParser {
    /// Lazily yields one record per complete section, in log order.
    pub fn parse(log: &str) -> Records<'_> {
        Records {
            sections: SECTION_DELIMITER.split(log),
        }
    }

    /// Reads the labelled fields of one section. Last occurrence of a label wins.
    pub fn parse_section(section: &str) -> Result<Record, BenchError> {
        let mut fields = SectionFields::default();

        for line in section.lines().map(str::trim) {
            let Some((label, value)) = Label::strip(line) else {
                continue;
            };
            let value = value.to_string();
            match label {
                Label::Command => fields.command = Some(value),
                Label::Tool => fields.tool = Some(value),
                Label::Url => fields.url = Some(value),
                Label::Ip => fields.ip = Some(value),
                Label::Timestamp => fields.timestamp = Some(value),
                Label::FileSize => fields.file_size = Some(value),
                Label::Status => fields.status = Some(value),
                Label::ErrorMessage => fields.error_message = Some(value),
            }
        }

        fields.into_record()
    }
}

#[derive(Default)]
struct SectionFields {
    command: Option<String>,
    tool: Option<String>,
    url: Option<String>,
    ip: Option<String>,
    timestamp: Option<String>,
    file_size: Option<String>,
    status: Option<String>,
    error_message: Option<String>,
}

impl SectionFields {
    fn into_record(self) -> Result<Record, BenchError> {
        let tool = self
            .tool
            .filter(|v| !v.is_empty())
            .ok_or(BenchError::ParseFormat("Tool"))?;
        let status = self
            .status
            .filter(|v| !v.is_empty())
            .ok_or(BenchError::ParseFormat("Status"))?;

        let file_size = self.file_size.and_then(|raw| {
            let parsed = raw.split_whitespace().next().and_then(|n| n.parse::<u64>().ok());
            if parsed.is_none() {
                tracing::debug!("Ignoring non-numeric file size '{}' for {}", raw, tool);
            }
            parsed
        });

        Ok(Record {
            url: self.url,
            error_message: self.error_message,
            ip: self.ip,
            timestamp: self.timestamp,
            file_size,
            full_command: self.command,
            ..Record::new(tool, Status::from(status))
        })
    }
}

/// Iterator returned by [`LogSectionParser::parse`].
pub struct Records<'a> {
    sections: regex::Split<'static, 'a>,
}

impl Iterator for Records<'_> {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        for section in self.sections.by_ref() {
            if section.trim().is_empty() {
                continue;
            }
            match LogSectionParser::parse_section(section) {
                Ok(record) => return Some(record),
                Err(e) => tracing::debug!("Dropping log section: {}", e),
            }
        }
        None
    }
}
