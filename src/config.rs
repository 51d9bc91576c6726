use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants;
use crate::error::{ExportError, Result};

/// Run configuration. Every field has a default, so an absent or partial
/// TOML file still yields the fixed relative layout.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub output: OutputConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub pull_request_file: String,
    pub repository_file: String,
    pub task_type_file: String,
    pub commit_details_file: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub max_rows_per_file: usize,
    /// Write `run_summary.json` to the output root after all products.
    pub write_manifest: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    pub keywords: Vec<String>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(constants::DEFAULT_DATA_DIR),
            output_dir: PathBuf::from(constants::DEFAULT_OUTPUT_DIR),
            pull_request_file: constants::PULL_REQUEST_FILE.to_string(),
            repository_file: constants::REPOSITORY_FILE.to_string(),
            task_type_file: constants::TASK_TYPE_FILE.to_string(),
            commit_details_file: constants::COMMIT_DETAILS_FILE.to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            max_rows_per_file: constants::DEFAULT_MAX_ROWS_PER_FILE,
            write_manifest: true,
        }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            keywords: constants::default_security_keywords(),
        }
    }
}

impl PathsConfig {
    pub fn pull_request_path(&self) -> PathBuf {
        self.data_dir.join(&self.pull_request_file)
    }

    pub fn repository_path(&self) -> PathBuf {
        self.data_dir.join(&self.repository_file)
    }

    pub fn task_type_path(&self) -> PathBuf {
        self.data_dir.join(&self.task_type_file)
    }

    pub fn commit_details_path(&self) -> PathBuf {
        self.data_dir.join(&self.commit_details_file)
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(config_path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(config_path).map_err(|e| {
            ExportError::Config(format!(
                "Failed to read config file '{}': {}",
                config_path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&config_content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` when given, else the default config file if present, else defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => {
                let default_path = Path::new(constants::DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::load(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.output.max_rows_per_file == 0 {
            return Err(ExportError::Config(
                "output.max_rows_per_file must be greater than zero".to_string(),
            ));
        }
        if let Some(pos) = self.security.keywords.iter().position(|k| k.is_empty()) {
            return Err(ExportError::Config(format!(
                "security.keywords[{}] is empty; an empty keyword matches every record",
                pos
            )));
        }
        Ok(())
    }
}
