use crate::core::errors::BenchError;
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessExit {
    Code(i32),
    TimedOut,
}

#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub exit: ProcessExit,
    /// stdout and stderr interleaved in arrival order.
    pub output: String,
    pub elapsed: Duration,
}

/// Runs one shell command to completion or timeout.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(
        &self,
        command: &str,
        cwd: &Path,
        timeout: Duration,
    ) -> Result<ProcessOutput, BenchError>;
}

/// Spawns commands through `sh -c` on the tokio runtime.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShellRunner;

#[async_trait]
impl ProcessRunner for ShellRunner {
    async fn run(
        &self,
        command: &str,
        cwd: &Path,
        timeout: Duration,
    ) -> Result<ProcessOutput, BenchError> {
        let start = std::time::Instant::now();
        let deadline = Instant::now() + timeout;

        tracing::debug!("Executing: {} in {:?}", command, cwd);

        let mut child = Command::new("sh")
            .arg("-c")
            .arg(command)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| BenchError::ToolInvocation {
                command: command.to_string(),
                reason: e.to_string(),
            })?;

        let (tx, mut rx) = mpsc::unbounded_channel();
        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(forward_lines(stdout, tx.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(forward_lines(stderr, tx.clone()));
        }
        drop(tx);

        let mut lines = Vec::new();
        let sleep = tokio::time::sleep_until(deadline);
        tokio::pin!(sleep);

        let exit = loop {
            tokio::select! {
                Some(line) = rx.recv() => {
                    tracing::debug!("| {}", line);
                    lines.push(line);
                }
                status = child.wait() => {
                    let code = match status {
                        Ok(status) => status.code().unwrap_or(-1),
                        Err(e) => {
                            return Err(BenchError::ToolInvocation {
                                command: command.to_string(),
                                reason: format!("process error: {}", e),
                            });
                        }
                    };
                    // Background children may keep the pipes open; stop at the deadline.
                    let drain = async {
                        while let Some(line) = rx.recv().await {
                            tracing::debug!("| {}", line);
                            lines.push(line);
                        }
                    };
                    let _ = tokio::time::timeout_at(deadline, drain).await;
                    break ProcessExit::Code(code);
                }
                _ = &mut sleep => {
                    tracing::warn!("Command timed out after {:?}: {}", timeout, command);
                    let _ = child.kill().await;
                    break ProcessExit::TimedOut;
                }
            }
        };

        Ok(ProcessOutput {
            exit,
            output: lines.join("\n"),
            elapsed: start.elapsed(),
        })
    }
}

pub(crate) async fn forward_lines<R>(reader: R, tx: mpsc::UnboundedSender<String>)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(['\n', '\r']).to_string();
                if tx.send(line).is_err() {
                    break;
                }
            }
        }
    }
}
