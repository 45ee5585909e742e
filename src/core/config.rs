//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! git-prompt has two configuration scopes:
//! - **Global**: user-level settings
//! - **Repo**: repository-level overrides
//!
//! # Precedence
//!
//! Values are resolved in this order (later overrides earlier):
//! 1. Built-in defaults
//! 2. Global config file
//! 3. Repo config file
//! 4. CLI flags (applied by the caller)
//!
//! # Locations
//!
//! Global, searched in order:
//! 1. `$GIT_PROMPT_CONFIG` if set
//! 2. `<config dir>/git-prompt/config.toml` (e.g. `~/.config/git-prompt/`)
//!
//! Repo: `<git dir>/prompt/config.toml`.
//!
//! # File Format
//!
//! ```toml
//! max-traversal = 1000
//! large-repo-size = 5000000
//! color = true
//! ```
//!
//! A prompt must never fail to render because of a bad config file, so
//! unreadable or malformed files are skipped with a warning the caller
//! may surface in debug mode.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use super::divergence::DEFAULT_MAX_TRAVERSAL;

/// Default index-size threshold for large-repository mode, in bytes.
pub const DEFAULT_LARGE_REPO_SIZE: u64 = 5_000_000;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },
}

/// Warnings generated during config loading.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    /// The warning message.
    pub message: String,
    /// The path that triggered the warning.
    pub path: PathBuf,
}

/// On-disk configuration schema. Every field is optional; absent fields
/// fall through to the next precedence level.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConfig {
    /// Per-side commit budget for divergence searches.
    pub max_traversal: Option<usize>,
    /// Index size in bytes above which status checks are skipped.
    pub large_repo_size: Option<u64>,
    /// Whether to emit ANSI colors.
    pub color: Option<bool>,
}

/// Merged configuration for one prompt render.
///
/// Constructed once and passed by reference into each component; no
/// component reads global mutable state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptConfig {
    /// Per-side commit budget for divergence searches.
    pub max_traversal: usize,
    /// Index size in bytes above which status checks are skipped.
    pub large_repo_size: u64,
    /// Whether to emit ANSI colors.
    pub color: bool,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            max_traversal: DEFAULT_MAX_TRAVERSAL,
            large_repo_size: DEFAULT_LARGE_REPO_SIZE,
            color: true,
        }
    }
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The merged configuration.
    pub config: PromptConfig,
    /// Warnings for files that were skipped.
    pub warnings: Vec<ConfigWarning>,
}

impl PromptConfig {
    /// Load configuration from the default locations.
    ///
    /// `git_dir` enables the repo-scope override file when available.
    /// Files that cannot be read or parsed are skipped with a warning;
    /// loading itself never fails.
    pub fn load(git_dir: Option<&Path>) -> ConfigLoadResult {
        let mut config = PromptConfig::default();
        let mut warnings = Vec::new();

        if let Some(path) = global_config_path() {
            config.apply_file(&path, &mut warnings);
        }
        if let Some(git_dir) = git_dir {
            config.apply_file(&git_dir.join("prompt").join("config.toml"), &mut warnings);
        }

        ConfigLoadResult { config, warnings }
    }

    /// Overlay one config file onto this configuration, if it exists.
    fn apply_file(&mut self, path: &Path, warnings: &mut Vec<ConfigWarning>) {
        match read_config_file(path) {
            Ok(Some(file)) => self.apply(&file),
            Ok(None) => {}
            Err(err) => warnings.push(ConfigWarning {
                message: err.to_string(),
                path: path.to_path_buf(),
            }),
        }
    }

    /// Overlay the set fields of `file` onto this configuration.
    pub fn apply(&mut self, file: &FileConfig) {
        if let Some(max_traversal) = file.max_traversal {
            self.max_traversal = max_traversal;
        }
        if let Some(large_repo_size) = file.large_repo_size {
            self.large_repo_size = large_repo_size;
        }
        if let Some(color) = file.color {
            self.color = color;
        }
    }
}

/// Locate the global config file, honoring `$GIT_PROMPT_CONFIG`.
fn global_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("GIT_PROMPT_CONFIG") {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    dirs::config_dir().map(|dir| dir.join("git-prompt").join("config.toml"))
}

/// Read and parse a config file. `Ok(None)` when the file does not exist.
fn read_config_file(path: &Path) -> Result<Option<FileConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    let file = toml::from_str(&contents).map_err(|err| ConfigError::ParseError {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;

    Ok(Some(file))
}
