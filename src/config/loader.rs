use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

use super::types::GlobalConfig;

const DEFAULT_CONFIG_PATHS: &[&str] = &["./fetchbench.toml", "./config/fetchbench.toml"];

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration, falling back to built-in defaults.
    ///
    /// An explicitly requested file must exist and parse; default locations
    /// are skipped when missing or broken.
    pub fn load_with_custom_path(custom_path: Option<&Path>) -> Result<GlobalConfig> {
        if let Some(path) = custom_path {
            if !path.exists() {
                anyhow::bail!("Config file does not exist: {:?}", path);
            }
            return Self::load_from_file(path)
                .with_context(|| format!("Failed to load config from custom path: {:?}", path));
        }

        for path in Self::default_paths() {
            if !path.exists() {
                continue;
            }
            match Self::load_from_file(&path) {
                Ok(config) => {
                    tracing::info!("Loaded configuration from: {:?}", path);
                    return Ok(config);
                }
                Err(e) => {
                    tracing::warn!("Failed to load config from {:?}: {:#}", path, e);
                }
            }
        }

        tracing::info!("No configuration file found, using default settings");
        Ok(GlobalConfig::default())
    }

    fn default_paths() -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = DEFAULT_CONFIG_PATHS.iter().map(PathBuf::from).collect();
        if let Some(dirs) = ProjectDirs::from("", "", "fetchbench") {
            paths.push(dirs.config_dir().join("fetchbench.toml"));
        }
        paths
    }

    fn load_from_file(path: &Path) -> Result<GlobalConfig> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: GlobalConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config: {:?}", path))?;

        Self::validate_config(&config)?;
        Ok(config)
    }

    fn validate_config(config: &GlobalConfig) -> Result<()> {
        if config.run.timeout_ms == 0 {
            anyhow::bail!("timeout_ms must be greater than 0");
        }

        if config.run.filename_suffix.is_empty() {
            anyhow::bail!("filename_suffix cannot be empty");
        }

        for tool in &config.tools {
            if tool.name.trim().is_empty() {
                anyhow::bail!("tool name cannot be empty");
            }
            if tool.command.trim().is_empty() {
                anyhow::bail!("tool '{}' command cannot be empty", tool.name);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_custom_config() {
        let temp_file = NamedTempFile::new().unwrap();
        let config_content = r#"
[run]
timeout_ms = 30000
workdir = "/tmp/fb"
filename_suffix = ".gz"

[[tools]]
name = "curl"
command = "curl -sS -L {url} -o {filename}"
error_pattern = '^curl: \(\d+\)'

[[tools]]
name = "wget"
command = "wget -O {filename} {url}"
enabled = false

[[targets]]
name = "https"
url = "https://www.example.org/a.gz"
"#;
        fs::write(&temp_file, config_content).unwrap();

        let config = ConfigLoader::load_with_custom_path(Some(temp_file.path())).unwrap();
        assert_eq!(config.run.timeout_ms, 30000);
        assert_eq!(config.run.workdir, PathBuf::from("/tmp/fb"));
        assert_eq!(config.tools.len(), 2);
        assert_eq!(config.tools[0].error_pattern.as_deref(), Some(r"^curl: \(\d+\)"));
        assert!(!config.tools[1].enabled);
        assert_eq!(config.targets.len(), 1);
    }

    #[test]
    fn test_validation_errors() {
        let temp_file = NamedTempFile::new().unwrap();
        fs::write(&temp_file, "[run]\ntimeout_ms = 0\n").unwrap();

        let result = ConfigLoader::load_with_custom_path(Some(temp_file.path()));
        assert!(result.is_err());
        assert!(format!("{:#}", result.unwrap_err()).contains("timeout_ms must be greater than 0"));
    }

    #[test]
    fn test_missing_custom_path() {
        let missing = Path::new("/nonexistent/fetchbench.toml");
        let result = ConfigLoader::load_with_custom_path(Some(missing));
        assert!(result.is_err());
    }
}
