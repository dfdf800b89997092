use crate::{
    cli::args::Cli,
    config::{ConfigLoader, GlobalConfig},
    core::{
        catalog::ToolCatalog, recorder::ResultRecorder, state::Aggregator, targets::TargetSet,
        models::Record,
    },
    executors::{
        command::ShellRunner,
        matrix::{run_matrix, MatrixOutcome},
        script::run_batch_script,
        toolchain,
        trial::TrialRunner,
    },
    parser::LogSectionParser,
    reporters::{results_log::ResultsLog, table::TableBuilder, writer},
    ui::printer,
    utils::{fs::ensure_dir, logging, net},
};
use anyhow::{Context, Result};
use std::path::Path;
use std::time::Duration;

pub async fn run(cli: Cli) -> Result<()> {
    let start_time = std::time::Instant::now();

    let level = logging::level_from_cli(&cli);
    logging::init(level)?;

    let mut config = ConfigLoader::load_with_custom_path(cli.config.as_deref())?;
    apply_overrides(&mut config, &cli)?;

    let records = if let Some(log) = &cli.from_log {
        records_from_log(log)?
    } else if let (Some(script), Some(input)) = (&cli.script, &cli.input) {
        records_from_script(script, input, &config.run.log_file).await?
    } else {
        run_trials(&cli, &config).await?
    };

    println!("Found {} download attempts", records.len());

    let table = TableBuilder::build(records).context("No data to write")?;
    tracing::debug!("Table columns: {:?}", table.columns());

    writer::write_tsv(&table, &config.run.output)?;
    if let Some(json) = &cli.json {
        writer::write_json(&table, json)?;
    }

    printer::print_summary(&table, &config.run.output);
    tracing::info!("Finished in {:.1}s", start_time.elapsed().as_secs_f64());

    Ok(())
}

fn apply_overrides(config: &mut GlobalConfig, cli: &Cli) -> Result<()> {
    if let Some(secs) = cli.timeout_secs {
        if secs == 0 {
            anyhow::bail!("--timeout-secs must be greater than 0");
        }
        config.run.timeout_ms = secs
            .checked_mul(1000)
            .context("--timeout-secs is too large")?;
    }
    if let Some(workdir) = &cli.workdir {
        config.run.workdir = workdir.clone();
    }
    if let Some(output) = &cli.output {
        config.run.output = output.clone();
    }
    if let Some(log_file) = &cli.log_file {
        config.run.log_file = log_file.clone();
    }
    Ok(())
}

async fn run_trials(cli: &Cli, config: &GlobalConfig) -> Result<Vec<Record>> {
    let catalog = ToolCatalog::new(config.tools.clone(), config.run.filename_suffix.clone())
        .context("Invalid tool configuration")?;
    let targets = match &cli.targets {
        Some(path) => TargetSet::from_tsv(path)?,
        None => TargetSet::new(config.targets.clone()).context("Invalid target configuration")?,
    };

    let tools: Vec<String> = if cli.tools.is_empty() {
        catalog.names().map(String::from).collect()
    } else {
        cli.tools.clone()
    };

    toolchain::warn_missing(&catalog);
    ensure_dir(&config.run.workdir)?;

    let ip = net::outbound_or_loopback(config.run.ip_probe);
    tracing::info!(
        "Running {} tools x {} targets from {}",
        tools.len(),
        targets.len(),
        ip
    );

    let recorder = ResultRecorder::new(ip.to_string());
    let trials = TrialRunner::new(
        &catalog,
        ShellRunner,
        &config.run.workdir,
        Duration::from_millis(config.run.timeout_ms),
    );
    let mut log = ResultsLog::create(&config.run.log_file)?;
    let mut aggregator = Aggregator::new();

    let shutdown = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    let outcome = run_matrix(
        &trials,
        &tools,
        &targets,
        &recorder,
        &mut aggregator,
        Some(&mut log),
        shutdown,
    )
    .await;

    if outcome == MatrixOutcome::Interrupted {
        tracing::warn!(
            "Run interrupted, tabulating {} completed trials",
            aggregator.len()
        );
    }
    tracing::info!("Results log written to {:?}", log.path());

    Ok(aggregator.into_records())
}

async fn records_from_script(script: &Path, input: &Path, log_file: &Path) -> Result<Vec<Record>> {
    println!("Running bash script: {}", script.display());
    println!("Input TSV: {}", input.display());
    printer::print_rule();

    let code = run_batch_script(script, input, printer::print_script_line).await?;

    printer::print_rule();
    if code != 0 {
        println!("\nWarning: Bash script exited with code {}", code);
    }

    records_from_log(log_file)
}

fn records_from_log(path: &Path) -> Result<Vec<Record>> {
    println!("\nParsing log file: {}", path.display());
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read results log: {:?}", path))?;
    Ok(LogSectionParser::parse(&text).collect())
}
