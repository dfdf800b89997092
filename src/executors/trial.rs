use super::command::{ProcessExit, ProcessRunner};
use crate::core::catalog::ToolCatalog;
use crate::core::errors::BenchError;
use crate::core::models::{Target, Trial, TrialOutcome};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Executes single (tool, target) trials against a working directory.
pub struct TrialRunner<'a, R: ProcessRunner> {
    catalog: &'a ToolCatalog,
    process: R,
    workdir: PathBuf,
    timeout: Duration,
}

impl<'a, R: ProcessRunner> TrialRunner<'a, R> {
    pub fn new(
        catalog: &'a ToolCatalog,
        process: R,
        workdir: impl Into<PathBuf>,
        timeout: Duration,
    ) -> Self {
        Self {
            catalog,
            process,
            workdir: workdir.into(),
            timeout,
        }
    }

    /// Only an unregistered tool is an error here; everything that goes
    /// wrong with the process itself ends up in the returned trial.
    pub async fn run(&self, tool: &str, target: &Target) -> Result<Trial, BenchError> {
        let rendered = self.catalog.render(tool, target)?;
        let artifact = self.workdir.join(&rendered.filename);
        remove_stale(&artifact);

        tracing::info!("Trial {} -> {}", tool, target.url);
        tracing::debug!("Command: {}", rendered.command);

        let started_at = chrono::Local::now();
        let result = self
            .process
            .run(&rendered.command, &self.workdir, self.timeout)
            .await;

        let (outcome, output, elapsed) = match result {
            Ok(out) => {
                let outcome = match out.exit {
                    ProcessExit::Code(code) => TrialOutcome::Exited(code),
                    ProcessExit::TimedOut => TrialOutcome::TimedOut,
                };
                (outcome, out.output, out.elapsed)
            }
            Err(e) => {
                tracing::error!("Could not run {}: {}", tool, e);
                let elapsed = (chrono::Local::now() - started_at).to_std().unwrap_or_default();
                (TrialOutcome::NotStarted(e.to_string()), String::new(), elapsed)
            }
        };

        let file_size = artifact_size(&artifact);
        tracing::info!(
            "Trial {} finished: {:?}, {} bytes in {:.2}s",
            tool,
            outcome,
            file_size,
            elapsed.as_secs_f64()
        );

        Ok(Trial {
            tool: tool.to_string(),
            target: target.clone(),
            filename: rendered.filename,
            command: rendered.command,
            started_at,
            output,
            outcome,
            elapsed,
            file_size,
            error_pattern: self.catalog.error_pattern(tool).cloned(),
        })
    }
}

fn remove_stale(path: &Path) {
    if path.exists() {
        tracing::debug!("Removing stale artifact {:?}", path);
        if let Err(e) = std::fs::remove_file(path) {
            tracing::warn!("Failed to remove stale artifact {:?}: {}", path, e);
        }
    }
}

/// Missing artifact is size 0, not an error.
fn artifact_size(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}
