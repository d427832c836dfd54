use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::{ulog_debug, Result};

/// Name of the project-level config file looked up in the working directory.
pub const CONFIG_FILE: &str = "unified.toml";

/// User scripts files tried in order when none is configured.
pub const DEFAULT_SCRIPTS_FILES: [&str; 2] = ["package-scripts.json", "package-scripts.toml"];

/// Source/output layout consumed by the generated commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Paths {
    pub src_dir: String,
    pub out_dir: String,
    /// Recognised source extensions, each with its leading dot.
    pub extensions: Vec<String>,
}

impl Default for Paths {
    fn default() -> Self {
        Self {
            src_dir: "src".to_string(),
            out_dir: "dist".to_string(),
            extensions: [".ts", ".tsx", ".js", ".jsx", ".json"]
                .iter()
                .map(|e| e.to_string())
                .collect(),
        }
    }
}

impl Paths {
    /// Extensions the linter understands; data files are skipped.
    pub fn lint_extensions(&self) -> Vec<&str> {
        self.extensions
            .iter()
            .map(String::as_str)
            .filter(|ext| *ext != ".json")
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Set when the generator renders its own package's scripts.
    #[serde(default)]
    pub self_build: bool,
    #[serde(default)]
    pub paths: Paths,
    /// Path of the user scripts file, relative to the config file.
    pub scripts: Option<String>,
}

impl Config {
    pub fn config_path() -> PathBuf {
        PathBuf::from(CONFIG_FILE)
    }

    /// Load a config file, falling back to defaults when it does not exist.
    ///
    /// `UNIFIED_SELF_BUILD=1` forces self-build mode regardless of the file.
    pub fn load_from(path: &Path) -> Result<Self> {
        ulog_debug!("Config::load path={}", path.display());
        let mut config: Self = if path.exists() {
            toml::from_str(&fs::read_to_string(path)?)?
        } else {
            ulog_debug!("Config file not found, using defaults");
            Self::default()
        };
        if env_self_build() {
            config.self_build = true;
        }
        ulog_debug!(
            "Config loaded: self_build={}, src_dir={}, out_dir={}, scripts={:?}",
            config.self_build,
            config.paths.src_dir,
            config.paths.out_dir,
            config.scripts
        );
        Ok(config)
    }

    /// Locate the user scripts file.
    ///
    /// A configured path is returned even if missing so the caller reports it;
    /// otherwise the first existing default file in `base` is used.
    pub fn scripts_path(&self, base: &Path) -> Option<PathBuf> {
        if let Some(path) = &self.scripts {
            return Some(base.join(path));
        }
        DEFAULT_SCRIPTS_FILES
            .iter()
            .map(|name| base.join(name))
            .find(|p| p.exists())
    }
}

fn env_self_build() -> bool {
    std::env::var("UNIFIED_SELF_BUILD")
        .map(|v| v == "1" || v.to_lowercase() == "true")
        .unwrap_or(false)
}
