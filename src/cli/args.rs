use clap::{ArgAction, ArgGroup, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "fetchbench", version, about = "Compare download tools across protocols")]
#[command(group(ArgGroup::new("source").args(["from_log", "script"])))]
pub struct Cli {
    /// TOML configuration file (tools, targets, run settings)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Targets file: one `name<TAB>url` per line, replaces configured targets
    #[arg(short = 't', long = "targets")]
    pub targets: Option<PathBuf>,

    /// Only run these tools (repeatable)
    #[arg(long = "tool", value_name = "NAME")]
    pub tools: Vec<String>,

    /// Tabulate an existing results log instead of running trials
    #[arg(long = "from-log", value_name = "LOG")]
    pub from_log: Option<PathBuf>,

    /// Run a batch script (`bash SCRIPT INPUT`) and tabulate the log it writes
    #[arg(long = "script", requires = "input")]
    pub script: Option<PathBuf>,

    /// Input file handed to the batch script
    #[arg(long = "input")]
    pub input: Option<PathBuf>,

    /// Results table (TSV)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Also write the table as JSON
    #[arg(long = "json")]
    pub json: Option<PathBuf>,

    /// Results log written by trials (and read back in script mode)
    #[arg(long = "log-file")]
    pub log_file: Option<PathBuf>,

    /// Per-trial timeout in seconds
    #[arg(long = "timeout-secs")]
    pub timeout_secs: Option<u64>,

    /// Directory downloads are written to
    #[arg(short = 'w', long = "workdir")]
    pub workdir: Option<PathBuf>,

    /// Verbose human output
    #[arg(short = 'v', long = "verbose", action = ArgAction::SetTrue)]
    pub verbose: bool,

    /// Debug logs, including tool output (implies verbose)
    #[arg(short = 'd', long = "debug", action = ArgAction::SetTrue)]
    pub debug: bool,
}
