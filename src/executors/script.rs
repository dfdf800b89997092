use super::command::forward_lines;
use anyhow::{Context, Result};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tokio::sync::mpsc;

/// Runs `bash <script> <input>`, echoing its combined output line by line
/// through `on_line` as it arrives. Returns the script's exit code; a
/// non-zero exit is left to the caller to judge.
pub async fn run_batch_script<F>(script: &Path, input: &Path, mut on_line: F) -> Result<i32>
where
    F: FnMut(&str),
{
    if !script.exists() {
        anyhow::bail!("Bash script '{}' not found", script.display());
    }
    if !input.exists() {
        anyhow::bail!("Input file '{}' not found", input.display());
    }

    tracing::info!("Running batch script {:?} with {:?}", script, input);

    let mut child = Command::new("bash")
        .arg(script)
        .arg(input)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("Failed to spawn bash for {:?}", script))?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    if let Some(stdout) = child.stdout.take() {
        tokio::spawn(forward_lines(stdout, tx.clone()));
    }
    if let Some(stderr) = child.stderr.take() {
        tokio::spawn(forward_lines(stderr, tx.clone()));
    }
    drop(tx);

    while let Some(line) = rx.recv().await {
        on_line(&line);
    }

    let status = child
        .wait()
        .await
        .with_context(|| format!("Failed waiting for {:?}", script))?;
    let code = status.code().unwrap_or(-1);

    if code != 0 {
        tracing::warn!("Batch script exited with code {}", code);
    } else {
        tracing::info!("Batch script completed successfully");
    }
    Ok(code)
}
