use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::{ulog_debug, Error, Result};

/// Read a user scripts file, JSON or TOML by extension.
pub fn read_user_scripts(path: &Path) -> Result<Value> {
    ulog_debug!("Reading user scripts from {}", path.display());
    let content = fs::read_to_string(path)?;
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(serde_json::from_str(&content)?),
        Some("toml") => Ok(toml::from_str(&content)?),
        _ => Err(Error::UnsupportedFormat(path.display().to_string())),
    }
}
