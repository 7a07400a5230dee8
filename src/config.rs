use crate::constants::{DEFAULT_GUI_COMMAND, DEFAULT_REMOTE, GIT_PROGRAM};
use crate::session::SessionOptions;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// user settings, read from `<config dir>/git-panel/config.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// git binary to run
    pub git_program: String,

    /// remote offered when the repository has none configured
    pub default_remote: String,

    /// external gui tool, split like a shell command line
    pub gui_command: String,

    /// repository root to open instead of auto-detecting
    pub repository: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            git_program: GIT_PROGRAM.to_string(),
            default_remote: DEFAULT_REMOTE.to_string(),
            gui_command: DEFAULT_GUI_COMMAND.to_string(),
            repository: None,
        }
    }
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("git-panel").join("config.json"))
    }

    /// load an explicit config file, or the default one if it exists
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(Self::default()),
            },
        };

        let text = fs::read_to_string(&path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn session_options(&self) -> Result<SessionOptions> {
        let gui_command = shlex::split(&self.gui_command)
            .filter(|argv| !argv.is_empty())
            .with_context(|| format!("invalid gui_command: {}", self.gui_command))?;

        Ok(SessionOptions {
            default_remote: self.default_remote.clone(),
            gui_command,
        })
    }
}
