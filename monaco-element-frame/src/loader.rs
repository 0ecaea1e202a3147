use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use crate::editor::EditorLibrary;
use crate::headless::TextBufferLibrary;

pub const DEFAULT_LIB_PATH: &str = "node_modules/monaco-editor/min/vs";
pub const EDITOR_MAIN_MODULE: &str = "vs/editor/editor.main";

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("editor loader not found at {0}")]
    LoaderMissing(PathBuf),
    #[error("failed to read editor library: {0}")]
    Io(#[from] std::io::Error),
    #[error("editor construction failed: {0}")]
    Editor(String),
}

/// Resolves the library once loading finishes; dropping it abandons the load.
pub type LoadFuture<L> = Pin<Box<dyn Future<Output = Result<L, LoadError>>>>;

pub trait LibraryLoader {
    type Library: EditorLibrary;

    fn load(&self, config: &LoaderConfig) -> LoadFuture<Self::Library>;
}

/// Where the AMD loader and the editor's modules live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    pub lib_path: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        LoaderConfig {
            lib_path: DEFAULT_LIB_PATH.to_string(),
        }
    }
}

impl LoaderConfig {
    pub fn new(lib_path: impl Into<String>) -> Self {
        LoaderConfig {
            lib_path: lib_path.into(),
        }
    }

    /// `{lib_path}/loader.js`
    pub fn loader_script(&self) -> String {
        format!("{}/loader.js", self.lib_path.trim_end_matches('/'))
    }

    /// Argument for `require.config(...)`.
    pub fn require_config(&self) -> serde_json::Value {
        serde_json::json!({ "paths": { "vs": self.lib_path } })
    }
}

/// Loads from the local filesystem: succeeds iff the loader script exists,
/// then hands out a headless editor library.
#[derive(Debug, Clone, Default)]
pub struct FsLoader {
    library: TextBufferLibrary,
}

impl FsLoader {
    pub fn new(library: TextBufferLibrary) -> Self {
        FsLoader { library }
    }
}

impl LibraryLoader for FsLoader {
    type Library = TextBufferLibrary;

    fn load(&self, config: &LoaderConfig) -> LoadFuture<TextBufferLibrary> {
        let script = PathBuf::from(config.loader_script());
        let require_config = config.require_config();
        let library = self.library.clone();
        Box::pin(async move {
            match tokio::fs::metadata(&script).await {
                Ok(meta) if meta.is_file() => {
                    log::info!("Editor loader found at {:?}", script);
                    log::debug!(
                        "require.config({}) then require([\"{}\"])",
                        require_config,
                        EDITOR_MAIN_MODULE
                    );
                    Ok(library)
                }
                Ok(_) => Err(LoadError::LoaderMissing(script)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    Err(LoadError::LoaderMissing(script))
                }
                Err(e) => Err(LoadError::Io(e)),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loader_script_joins_lib_path() {
        assert_eq!(
            LoaderConfig::default().loader_script(),
            "node_modules/monaco-editor/min/vs/loader.js"
        );
        assert_eq!(
            LoaderConfig::new("/opt/monaco/vs/").loader_script(),
            "/opt/monaco/vs/loader.js"
        );
    }

    #[test]
    fn require_config_points_vs_at_lib_path() {
        let config = LoaderConfig::new("static/vs");
        assert_eq!(
            config.require_config(),
            serde_json::json!({ "paths": { "vs": "static/vs" } })
        );
    }

    #[tokio::test]
    async fn fs_loader_succeeds_when_loader_script_exists() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("loader.js"), "// amd loader").unwrap();
        let config = LoaderConfig::new(dir.path().to_string_lossy());
        let result = FsLoader::default().load(&config).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn fs_loader_reports_missing_loader() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoaderConfig::new(dir.path().join("nope").to_string_lossy());
        match FsLoader::default().load(&config).await {
            Err(LoadError::LoaderMissing(path)) => assert!(path.ends_with("loader.js")),
            other => panic!("expected LoaderMissing, got {:?}", other.err()),
        }
    }
}
