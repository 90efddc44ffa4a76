//! Configuration file handling

use std::path::{Path, PathBuf};

use miette::{IntoDiagnostic, Result};
use serde::{Deserialize, Serialize};

use crate::args::OutputFormat;

const CONFIG_FILE: &str = "widecol.toml";

/// Configuration for widecol
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Table metadata file, relative to the working directory
    #[serde(default)]
    pub metadata: Option<String>,

    /// Resolve in auto-commit mode
    #[serde(default = "default_auto_commit")]
    pub auto_commit: bool,

    /// Output format (human, json)
    #[serde(default)]
    pub format: Option<String>,
}

fn default_auto_commit() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            metadata: None,
            auto_commit: default_auto_commit(),
            format: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).into_diagnostic()?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).into_diagnostic()
    }

    /// Try to find and load widecol.toml in current directory or parent directories
    pub fn find_and_load() -> Result<Option<Self>> {
        let mut current_dir = std::env::current_dir().into_diagnostic()?;

        loop {
            let config_path = current_dir.join(CONFIG_FILE);
            if config_path.exists() {
                tracing::debug!(path = %config_path.display(), "loading configuration");
                return Ok(Some(Self::from_file(&config_path)?));
            }

            if !current_dir.pop() {
                break;
            }
        }

        Ok(None)
    }

    /// Merge CLI arguments into configuration
    /// CLI arguments take precedence over config file values
    pub fn merge_with_args(
        mut self,
        metadata: &Option<PathBuf>,
        no_auto_commit: bool,
        format: &Option<OutputFormat>,
    ) -> Self {
        if let Some(path) = metadata {
            self.metadata = Some(path.display().to_string());
        }

        if no_auto_commit {
            self.auto_commit = false;
        }

        if let Some(fmt) = format {
            self.format = Some(format!("{:?}", fmt).to_lowercase());
        }

        self
    }

    pub fn output_format(&self) -> OutputFormat {
        match self.format.as_deref() {
            Some("json") => OutputFormat::Json,
            _ => OutputFormat::Human,
        }
    }
}
