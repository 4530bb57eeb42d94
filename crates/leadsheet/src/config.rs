//! Configuration for the leadsheet binary.
//!
//! Layering, later wins: compiled defaults, then `./leadsheet.toml` (or an
//! explicit `--config` path), then the `LEADSHEET_TRANSCRIBER` environment
//! variable.

use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use pitch_transcribe::CommandTranscriber;

/// Config file checked in the working directory when no path is given.
pub const LOCAL_CONFIG: &str = "leadsheet.toml";

/// Environment variable overriding the transcriber program.
pub const TRANSCRIBER_ENV: &str = "LEADSHEET_TRANSCRIBER";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Settings for the external transcriber invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LeadsheetConfig {
    /// External automatic-music-transcription program to run.
    pub transcriber: String,

    /// Extra arguments appended to the transcriber invocation.
    pub transcriber_args: Vec<String>,
}

impl Default for LeadsheetConfig {
    fn default() -> Self {
        Self {
            transcriber: CommandTranscriber::DEFAULT_PROGRAM.to_string(),
            transcriber_args: Vec::new(),
        }
    }
}

impl LeadsheetConfig {
    /// Load configuration from all sources.
    pub fn load(cli_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match cli_path {
            Some(path) => Self::from_file(path)?,
            None => {
                let local = Path::new(LOCAL_CONFIG);
                if local.exists() {
                    Self::from_file(local)?
                } else {
                    Self::default()
                }
            }
        };

        if let Ok(program) = env::var(TRANSCRIBER_ENV) {
            if !program.is_empty() {
                config.transcriber = program;
            }
        }

        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}
