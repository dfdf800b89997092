use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Serialize, Serializer};

use crate::core::errors::BenchError;
use crate::core::models::{Record, Status};

static SCHEME_HOST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([a-z]+://[^/]+)").expect("scheme/host regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Tool,
    Url,
    Status,
    ErrorMessage,
    Ip,
    Timestamp,
    FileSize,
    FullCommand,
}

impl Column {
    /// Canonical column order.
    pub const ORDER: [Column; 8] = [
        Column::Tool,
        Column::Url,
        Column::Status,
        Column::ErrorMessage,
        Column::Ip,
        Column::Timestamp,
        Column::FileSize,
        Column::FullCommand,
    ];

    pub fn header(self) -> &'static str {
        match self {
            Column::Tool => "Tool",
            Column::Url => "URL",
            Column::Status => "Status",
            Column::ErrorMessage => "Error Message",
            Column::Ip => "IP",
            Column::Timestamp => "Timestamp",
            Column::FileSize => "File Size",
            Column::FullCommand => "Full Command",
        }
    }

    pub fn cell(self, record: &Record) -> Option<String> {
        match self {
            Column::Tool => Some(record.tool.clone()),
            Column::Url => record.url.clone(),
            Column::Status => Some(record.status.to_string()),
            Column::ErrorMessage => record.error_message.clone(),
            Column::Ip => record.ip.clone(),
            Column::Timestamp => record.timestamp.clone(),
            Column::FileSize => record.file_size.map(|s| s.to_string()),
            Column::FullCommand => record.full_command.clone(),
        }
    }
}

/// Serialized as its TSV header, so JSON and TSV name columns alike.
impl Serialize for Column {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.header())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub success: usize,
    pub failure: usize,
}

/// Final normalized table: canonical columns, reduced URLs, run order.
#[derive(Debug, Clone, Serialize)]
pub struct ResultTable {
    columns: Vec<Column>,
    records: Vec<Record>,
    summary: Summary,
}

impl ResultTable {
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn summary(&self) -> Summary {
        self.summary
    }

    pub fn rows(&self) -> impl Iterator<Item = Vec<Option<String>>> + '_ {
        self.records
            .iter()
            .map(|r| self.columns.iter().map(|c| c.cell(r)).collect())
    }

    /// Header row, then one tab-separated row per record. Tabs and line
    /// breaks inside values become single spaces.
    pub fn to_tsv(&self) -> String {
        let mut out = String::new();
        let header: Vec<&str> = self.columns.iter().map(|c| c.header()).collect();
        out.push_str(&header.join("\t"));
        out.push('\n');

        for row in self.rows() {
            let cells: Vec<String> = row
                .into_iter()
                .map(|cell| cell.as_deref().map(escape_cell).unwrap_or_default())
                .collect();
            out.push_str(&cells.join("\t"));
            out.push('\n');
        }
        out
    }

    /// Terminal rendering of the first `limit` rows.
    pub fn preview(&self, limit: usize) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_content_arrangement(ContentArrangement::Dynamic);

        // The full command is too wide to be useful on a terminal.
        let columns: Vec<Column> = self
            .columns
            .iter()
            .copied()
            .filter(|c| *c != Column::FullCommand)
            .collect();

        table.set_header(
            columns
                .iter()
                .map(|c| Cell::new(c.header()).add_attribute(Attribute::Bold)),
        );

        for record in self.records.iter().take(limit) {
            table.add_row(columns.iter().map(|c| {
                let text = c.cell(record).unwrap_or_default();
                match (c, &record.status) {
                    (Column::Status, Status::Success) => Cell::new(text).fg(Color::Green),
                    (Column::Status, Status::Failure) => Cell::new(text).fg(Color::Red),
                    _ => Cell::new(text),
                }
            }));
        }

        table.to_string()
    }
}

pub struct TableBuilder;

impl TableBuilder {
    pub fn build(records: Vec<Record>) -> Result<ResultTable, BenchError> {
        if records.is_empty() {
            return Err(BenchError::EmptyResult);
        }

        let columns: Vec<Column> = Column::ORDER
            .into_iter()
            .filter(|c| records.iter().any(|r| c.cell(r).is_some()))
            .collect();

        let records: Vec<Record> = records
            .into_iter()
            .map(|mut r| {
                r.url = r.url.as_deref().and_then(reduce_url);
                r
            })
            .collect();

        let summary = Summary {
            total: records.len(),
            success: records.iter().filter(|r| r.status.is_success()).count(),
            failure: records.iter().filter(|r| r.status == Status::Failure).count(),
        };

        Ok(ResultTable {
            columns,
            records,
            summary,
        })
    }
}

/// `scheme://host[:port]` prefix of `url`, or `None` when it doesn't have that shape.
pub fn reduce_url(url: &str) -> Option<String> {
    SCHEME_HOST
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn escape_cell(value: &str) -> String {
    value.replace(['\t', '\r', '\n'], " ")
}
