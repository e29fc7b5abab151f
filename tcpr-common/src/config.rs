//! Configuration loading and artifact directory resolution
//!
//! Bootstrap configuration comes from an optional TOML file. Every field has a
//! built-in default, so a missing file is never fatal; a file that exists but
//! cannot be parsed is.
//!
//! # Artifact directory priority
//!
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`TCPR_ARTIFACTS_DIR`)
//! 3. TOML config file (`artifacts_dir`)
//! 4. OS-dependent compiled default (fallback)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the artifact directory
pub const ARTIFACTS_DIR_ENV: &str = "TCPR_ARTIFACTS_DIR";

/// Environment variable naming the log level
pub const LOG_LEVEL_ENV: &str = "TCPR_LOG_LEVEL";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TomlConfig {
    /// Directory holding the pre-trained artifact files
    pub artifacts_dir: Option<PathBuf>,

    /// Artifact file names inside the artifact directory
    pub artifacts: ArtifactFiles,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Batch ranking defaults
    pub ranking: RankingConfig,

    /// Export defaults
    pub export: ExportConfig,
}

/// File names of the individual artifacts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ArtifactFiles {
    pub text_weighting: String,
    pub scaler: String,
    pub regressor: String,
    pub classifier: String,
    pub corpus: String,
}

impl Default for ArtifactFiles {
    fn default() -> Self {
        Self {
            text_weighting: "tfidf.json".to_string(),
            scaler: "scaler.json".to_string(),
            regressor: "regressor.json".to_string(),
            classifier: "classifier.json".to_string(),
            corpus: "corpus.json".to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Batch ranking defaults
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RankingConfig {
    /// Sort mode applied when none is given on the command line
    pub default_sort: String,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            default_sort: "priority".to_string(),
        }
    }
}

/// Export defaults
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    /// Cases per page in the paginated representation
    pub cases_per_page: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self { cases_per_page: 5 }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from an explicit path
    ///
    /// Unlike [`TomlConfig::load_or_default`], a missing file is an error here
    /// because the caller asked for this file specifically.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded TOML configuration from {}", path.display());
        Ok(config)
    }

    /// Load configuration from the explicit path if given, else from the
    /// platform config locations, else fall back to built-in defaults
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        match default_config_file() {
            Some(path) => Self::load(&path),
            None => {
                warn!("No config file found, using built-in defaults");
                Ok(Self::default())
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.export.cases_per_page == 0 {
            return Err(Error::InvalidInput(
                "export.cases_per_page must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Full paths of every artifact inside `dir`
    pub fn artifact_paths(&self, dir: &Path) -> ArtifactPaths {
        ArtifactPaths {
            text_weighting: dir.join(&self.artifacts.text_weighting),
            scaler: dir.join(&self.artifacts.scaler),
            regressor: dir.join(&self.artifacts.regressor),
            classifier: dir.join(&self.artifacts.classifier),
            corpus: dir.join(&self.artifacts.corpus),
        }
    }
}

/// Resolved artifact file locations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub text_weighting: PathBuf,
    pub scaler: PathBuf,
    pub regressor: PathBuf,
    pub classifier: PathBuf,
    pub corpus: PathBuf,
}

/// Artifact directory resolution following the documented priority order
#[derive(Debug, Clone, Default)]
pub struct ArtifactsDirResolver {
    cli_arg: Option<PathBuf>,
    toml_value: Option<PathBuf>,
}

impl ArtifactsDirResolver {
    pub fn new(cli_arg: Option<PathBuf>, toml_config: &TomlConfig) -> Self {
        Self {
            cli_arg,
            toml_value: toml_config.artifacts_dir.clone(),
        }
    }

    /// Resolve the artifact directory; never fails, the compiled default is
    /// the last resort
    pub fn resolve(&self) -> PathBuf {
        // Priority 1: Command-line argument
        if let Some(path) = &self.cli_arg {
            info!("Artifact directory: {} (from command line)", path.display());
            return path.clone();
        }

        // Priority 2: Environment variable
        if let Ok(path) = std::env::var(ARTIFACTS_DIR_ENV) {
            if !path.trim().is_empty() {
                info!("Artifact directory: {} (from {})", path, ARTIFACTS_DIR_ENV);
                return PathBuf::from(path);
            }
        }

        // Priority 3: TOML config file
        if let Some(path) = &self.toml_value {
            info!("Artifact directory: {} (from config file)", path.display());
            return path.clone();
        }

        // Priority 4: OS-dependent compiled default
        let path = default_artifacts_dir();
        info!("Artifact directory: {} (compiled default)", path.display());
        path
    }
}

/// First existing config file among the platform locations
///
/// Linux tries `~/.config/tcpr/config.toml`, then `/etc/tcpr/config.toml`.
/// Other platforms use the user config directory only.
pub fn default_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("tcpr").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/tcpr/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// OS-dependent default artifact directory
pub fn default_artifacts_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("tcpr").join("artifacts"))
        .unwrap_or_else(|| PathBuf::from("./tcpr_artifacts"))
}

/// Log filter directive: explicit level > config file > default
pub fn resolve_log_level(cli_level: Option<&str>, toml_config: &TomlConfig) -> String {
    cli_level
        .map(str::to_string)
        .filter(|level| !level.trim().is_empty())
        .unwrap_or_else(|| toml_config.logging.level.clone())
}
