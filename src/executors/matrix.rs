use std::future::Future;

use super::command::ProcessRunner;
use super::trial::TrialRunner;
use crate::core::recorder::ResultRecorder;
use crate::core::state::Aggregator;
use crate::core::targets::TargetSet;
use crate::reporters::results_log::ResultsLog;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixOutcome {
    Completed,
    /// Stopped by `shutdown`; the in-flight trial was dropped.
    Interrupted,
}

/// Runs every tool against every target, one trial at a time, tools outer.
///
/// Per-trial problems never stop the loop; they arrive in `aggregator` as
/// failure records. Dropping the in-flight trial on shutdown kills its process.
pub async fn run_matrix<R, F>(
    trials: &TrialRunner<'_, R>,
    tools: &[String],
    targets: &TargetSet,
    recorder: &ResultRecorder,
    aggregator: &mut Aggregator,
    mut log: Option<&mut ResultsLog>,
    shutdown: F,
) -> MatrixOutcome
where
    R: ProcessRunner,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let total = tools.len() * targets.len();
    let mut done = 0;

    for tool in tools {
        for target in targets.iter() {
            done += 1;
            tracing::info!("[{}/{}] {} {}", done, total, tool, target.name);

            let record = tokio::select! {
                result = trials.run(tool, target) => match result {
                    Ok(trial) => recorder.to_record(trial),
                    Err(e) => {
                        tracing::error!("Skipping {} for {}: {}", tool, target.name, e);
                        recorder.failure_record(tool, target, &e)
                    }
                },
                _ = &mut shutdown => {
                    tracing::warn!(
                        "Interrupted during {} {}, discarding that trial",
                        tool,
                        target.name
                    );
                    return MatrixOutcome::Interrupted;
                }
            };

            if let Some(log) = log.as_deref_mut() {
                if let Err(e) = log.append(&record) {
                    tracing::warn!("{:#}", e);
                }
            }
            aggregator.push(record);
        }
    }

    MatrixOutcome::Completed
}
