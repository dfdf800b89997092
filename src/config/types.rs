use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::core::models::{Target, ToolProfile};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default = "default_tools")]
    pub tools: Vec<ToolProfile>,
    #[serde(default)]
    pub targets: Vec<Target>,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            run: RunConfig::default(),
            tools: default_tools(),
            targets: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RunConfig {
    /// Hard limit per trial; the tool is killed when it runs over.
    pub timeout_ms: u64,
    /// Directory the tools run in and download into.
    pub workdir: PathBuf,
    pub filename_suffix: String,
    pub log_file: PathBuf,
    pub output: PathBuf,
    /// Address used to pick the outbound interface; never contacted.
    pub ip_probe: SocketAddr,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 600_000, // 10 minutes
            workdir: PathBuf::from("downloads"),
            filename_suffix: ".download".to_string(),
            log_file: PathBuf::from("results.log"),
            output: PathBuf::from("results.tsv"),
            ip_probe: SocketAddr::from(([8, 8, 8, 8], 1)),
        }
    }
}

pub fn default_tools() -> Vec<ToolProfile> {
    vec![
        ToolProfile::new(
            "wget",
            r#"wget -d --no-passive-ftp --tries=2 --progress=dot:giga -O {filename} "{url}""#,
        )
        .with_error_pattern(r"(ERROR \d+|failed:|No such file|Giving up)"),
        ToolProfile::new("curl", r#"curl -v -L --max-time 300 "{url}" -o "{filename}""#)
            .with_error_pattern(r"^curl: \(\d+\)"),
        ToolProfile::new(
            "lftp",
            r#"lftp -d -e "set net:max-retries 1; set net:persist-retries 0; set dns:max-retries 1; set net:timeout 5; get {url} -o {filename}; bye""#,
        )
        .with_error_pattern(r"(Fatal error|Access failed|get: )"),
    ]
}
