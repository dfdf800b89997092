use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::core::models::Record;
use crate::parser::sections::{BANNER, Label};

const FRAME: &str = "##########################################";

/// Renders one record as a log section that `LogSectionParser` reads back.
pub fn format_section(record: &Record) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", FRAME);
    let _ = writeln!(out, "# {} #", BANNER);
    let _ = writeln!(out, "{}", FRAME);

    let fields = [
        (Label::Command, record.full_command.clone()),
        (Label::Tool, Some(record.tool.clone())),
        (Label::Url, record.url.clone()),
        (Label::Ip, record.ip.clone()),
        (Label::Timestamp, record.timestamp.clone()),
        (Label::FileSize, record.file_size.map(|s| s.to_string())),
        (Label::Status, Some(record.status.to_string())),
        (Label::ErrorMessage, record.error_message.clone()),
    ];
    for (label, value) in fields {
        if let Some(value) = value {
            // One value per line, the format has no escaping.
            let value = value.replace(['\r', '\n'], " ");
            let _ = writeln!(out, "{} {}", label.prefix(), value);
        }
    }
    out
}

/// Append-only results log shared by every trial in a run.
pub struct ResultsLog {
    path: PathBuf,
    file: File,
}

impl ResultsLog {
    /// Truncates any log left over from a previous run.
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory: {:?}", parent))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
            .with_context(|| format!("Failed to open results log: {:?}", path))?;
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    pub fn append(&mut self, record: &Record) -> Result<()> {
        self.file
            .write_all(format_section(record).as_bytes())
            .and_then(|_| self.file.flush())
            .with_context(|| format!("Failed to append to results log: {:?}", self.path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
