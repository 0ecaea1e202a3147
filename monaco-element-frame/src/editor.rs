use serde::Serialize;

use crate::loader::LoadError;

/// Receives the full model value every time the editor content mutates.
pub type ContentChangeSender = crossbeam_channel::Sender<String>;

pub const DEFAULT_LANGUAGE: &str = "javascript";

// ---------------------------------------------------------------------------
// Options passed across to the editor library
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOptions {
    pub value: String,
    pub language: String,
    pub read_only: bool,
    pub automatic_layout: bool,
    pub scroll_beyond_last_line: bool,
    pub minimap: MinimapOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MinimapOptions {
    pub enabled: bool,
}

impl Default for CreateOptions {
    fn default() -> Self {
        CreateOptions {
            value: String::new(),
            language: DEFAULT_LANGUAGE.to_string(),
            read_only: false,
            automatic_layout: true,
            scroll_beyond_last_line: false,
            minimap: MinimapOptions { enabled: false },
        }
    }
}

/// Partial `updateOptions` call; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub automatic_layout: Option<bool>,
}

// ---------------------------------------------------------------------------
// Collaborator traits
// ---------------------------------------------------------------------------

/// A constructed editor instance and its model.
pub trait CodeEditor {
    fn value(&self) -> String;
    /// Replace the model content. Implementations report the mutation on
    /// their `ContentChangeSender` like any other edit.
    fn set_value(&mut self, value: &str);
    fn set_model_language(&mut self, language: &str);
    fn update_options(&mut self, update: &OptionsUpdate);
}

/// The loaded editor library (Monaco's `monaco.editor` namespace).
pub trait EditorLibrary {
    type Editor: CodeEditor;

    fn create(
        &self,
        container_id: &str,
        options: &CreateOptions,
        changes: ContentChangeSender,
    ) -> Result<Self::Editor, LoadError>;

    /// Themes are global to the library, not per instance.
    fn set_theme(&self, theme: &str);
}
