use super::models::{Record, Status};

/// Collects records in run order. Owned by the run controller; the only
/// state that outlives a single trial.
#[derive(Debug, Default)]
pub struct Aggregator {
    records: Vec<Record>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: Record) {
        match &record.status {
            Status::Success => tracing::info!("{} {}: success", record.tool, url_or_dash(&record)),
            Status::Failure => tracing::warn!(
                "{} {}: failure ({})",
                record.tool,
                url_or_dash(&record),
                record.error_message.as_deref().unwrap_or("no diagnostic")
            ),
            Status::Other(s) => tracing::info!("{} {}: {}", record.tool, url_or_dash(&record), s),
        }
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

impl Extend<Record> for Aggregator {
    fn extend<T: IntoIterator<Item = Record>>(&mut self, iter: T) {
        for record in iter {
            self.push(record);
        }
    }
}

fn url_or_dash(record: &Record) -> &str {
    record.url.as_deref().unwrap_or("-")
}
