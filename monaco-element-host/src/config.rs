use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Configuration of one editor element, as its owner would set it.
///
/// `#[serde(default)]` lets a config file name only the fields it cares
/// about; the rest fall back to the element defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementConfig {
    /// Opaque identifier echoed back in value-changed notifications.
    pub name: String,
    pub value: String,
    pub language: String,
    pub theme: String,
    /// Directory holding Monaco's `loader.js`; only read when the frame loads.
    pub lib_path: String,
    pub read_only: bool,
    pub automatic_layout: bool,
    /// Script injected into the frame after the loader.
    pub adapter_src: String,
}

impl Default for ElementConfig {
    fn default() -> Self {
        ElementConfig {
            name: String::new(),
            value: String::new(),
            language: String::from("javascript"),
            theme: String::from("vs-dark"),
            lib_path: String::from("node_modules/monaco-editor/min/vs"),
            read_only: false,
            automatic_layout: true,
            adapter_src: String::from("monaco-element-frame.js"),
        }
    }
}

impl ElementConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// `<config dir>/monaco-element/config.json`, if the platform has one.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("monaco-element").join("config.json"))
}
