use crate::error::{BridgeError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "config.json";
pub const DEFAULT_PORT: u16 = 8080;

/// Backend connection settings. Both keys are required.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BridgeConfig {
    pub chatbot_ui_url: String,
    pub cookie: String,
}

impl BridgeConfig {
    /// Load config from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            BridgeError::config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&content).map_err(|e| match e {
            BridgeError::Json(inner) => BridgeError::config(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                inner
            )),
            other => other,
        })
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }
}
