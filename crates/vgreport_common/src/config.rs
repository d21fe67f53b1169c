//! Report configuration.
//!
//! Config file: `--config FILE`, or `vgreport.toml` in the working directory.
//! Every key is optional; command-line flags override what the file says.
//!
//! ```toml
//! source_dir = "."
//! output_dir = "html"
//! lines_before = 3
//! lines_after = 3
//! json = false
//!
//! [[substitute_path]]
//! from = "/build/ci"
//! to = "/home/dev/project"
//! ```

use crate::correlator::{WindowSize, DEFAULT_CONTEXT_LINES};
use crate::error::{ReportError, Result};
use crate::locator::PathSubstitution;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "vgreport.toml";

/// Default report directory
pub const DEFAULT_OUTPUT_DIR: &str = "html";

fn default_source_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

fn default_context_lines() -> usize {
    DEFAULT_CONTEXT_LINES
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportConfig {
    /// Tracked source root
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,

    /// Where pages are written
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default = "default_context_lines")]
    pub lines_before: usize,

    #[serde(default = "default_context_lines")]
    pub lines_after: usize,

    /// Also write `report.json`
    #[serde(default)]
    pub json: bool,

    #[serde(default)]
    pub substitute_path: Vec<PathSubstitution>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            output_dir: default_output_dir(),
            lines_before: DEFAULT_CONTEXT_LINES,
            lines_after: DEFAULT_CONTEXT_LINES,
            json: false,
            substitute_path: Vec::new(),
        }
    }
}

impl ReportConfig {
    /// Parse TOML text. `origin` is only used in errors.
    pub fn from_toml_str(contents: &str, origin: &Path) -> Result<Self> {
        toml::from_str(contents).map_err(|e| ReportError::Config {
            path: origin.to_path_buf(),
            reason: e.to_string(),
        })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| ReportError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&contents, path)
    }

    /// Load configuration
    ///
    /// Priority:
    /// 1. Explicit path, relative to `cwd` (must exist)
    /// 2. `vgreport.toml` in `cwd`
    /// 3. Defaults
    pub fn load(explicit: Option<&Path>, cwd: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            let path = cwd.join(path);
            debug!("loading config from {}", path.display());
            return Self::from_file(&path);
        }

        let local = cwd.join(DEFAULT_CONFIG_FILE);
        if local.is_file() {
            debug!("loading config from {}", local.display());
            return Self::from_file(&local);
        }

        Ok(Self::default())
    }

    pub fn window_size(&self) -> WindowSize {
        WindowSize {
            before: self.lines_before,
            after: self.lines_after,
        }
    }
}
