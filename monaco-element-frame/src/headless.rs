//! In-memory stand-in for Monaco, used when no browser engine is available
//! (the demo session and tests). It behaves like the real model as far as
//! the adapter can observe: every mutation is reported on the change channel.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::editor::{CodeEditor, ContentChangeSender, CreateOptions, EditorLibrary, OptionsUpdate};
use crate::loader::LoadError;

/// Oldest entries are discarded past this many undo steps.
pub const MAX_UNDO_DEPTH: usize = 256;

#[derive(Debug, Default)]
struct LibraryState {
    theme: Option<String>,
    created: Vec<CreateOptions>,
}

/// Cloning shares the library's global state (theme, instance log).
#[derive(Debug, Clone, Default)]
pub struct TextBufferLibrary {
    state: Rc<RefCell<LibraryState>>,
}

impl TextBufferLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn theme(&self) -> Option<String> {
        self.state.borrow().theme.clone()
    }

    /// Options of every editor created so far.
    pub fn created(&self) -> Vec<CreateOptions> {
        self.state.borrow().created.clone()
    }
}

impl EditorLibrary for TextBufferLibrary {
    type Editor = TextBufferEditor;

    fn create(
        &self,
        container_id: &str,
        options: &CreateOptions,
        changes: ContentChangeSender,
    ) -> Result<TextBufferEditor, LoadError> {
        if container_id.is_empty() {
            return Err(LoadError::Editor("missing container element".to_string()));
        }
        self.state.borrow_mut().created.push(options.clone());
        Ok(TextBufferEditor {
            buffer: options.value.clone(),
            history: VecDeque::new(),
            language: options.language.clone(),
            read_only: options.read_only,
            automatic_layout: options.automatic_layout,
            changes,
        })
    }

    fn set_theme(&self, theme: &str) {
        self.state.borrow_mut().theme = Some(theme.to_string());
    }
}

#[derive(Debug)]
pub struct TextBufferEditor {
    buffer: String,
    history: VecDeque<String>,
    language: String,
    read_only: bool,
    automatic_layout: bool,
    changes: ContentChangeSender,
}

impl TextBufferEditor {
    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn read_only(&self) -> bool {
        self.read_only
    }

    pub fn automatic_layout(&self) -> bool {
        self.automatic_layout
    }

    /// Simulate a keystroke at the end of the buffer. Refused when read-only.
    pub fn type_text(&mut self, text: &str) -> bool {
        if self.read_only {
            return false;
        }
        let next = format!("{}{}", self.buffer, text);
        self.replace(next);
        true
    }

    /// Revert the most recent mutation, if any.
    pub fn undo(&mut self) -> bool {
        match self.history.pop_back() {
            Some(previous) => {
                self.buffer = previous;
                self.notify();
                true
            }
            None => false,
        }
    }

    fn replace(&mut self, next: String) {
        let previous = std::mem::replace(&mut self.buffer, next);
        if self.history.len() == MAX_UNDO_DEPTH {
            self.history.pop_front();
        }
        self.history.push_back(previous);
        self.notify();
    }

    fn notify(&self) {
        if self.changes.send(self.buffer.clone()).is_err() {
            log::debug!("Content change dropped, observer is gone");
        }
    }
}

impl CodeEditor for TextBufferEditor {
    fn value(&self) -> String {
        self.buffer.clone()
    }

    fn set_value(&mut self, value: &str) {
        self.replace(value.to_string());
    }

    fn set_model_language(&mut self, language: &str) {
        self.language = language.to_string();
    }

    fn update_options(&mut self, update: &OptionsUpdate) {
        if let Some(read_only) = update.read_only {
            self.read_only = read_only;
        }
        if let Some(automatic_layout) = update.automatic_layout {
            self.automatic_layout = automatic_layout;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editor() -> (TextBufferEditor, crossbeam_channel::Receiver<String>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        let library = TextBufferLibrary::new();
        let editor = library
            .create("container", &CreateOptions::default(), tx)
            .unwrap();
        (editor, rx)
    }

    #[test]
    fn every_mutation_is_reported() {
        let (mut editor, rx) = editor();
        editor.set_value("a");
        editor.type_text("b");
        editor.undo();
        let seen: Vec<String> = rx.try_iter().collect();
        assert_eq!(seen, vec!["a", "ab", "a"]);
    }

    #[test]
    fn read_only_refuses_typing() {
        let (mut editor, rx) = editor();
        editor.update_options(&OptionsUpdate {
            read_only: Some(true),
            automatic_layout: None,
        });
        assert!(!editor.type_text("x"));
        assert!(rx.try_recv().is_err());
        assert!(editor.automatic_layout());
    }

    #[test]
    fn undo_on_fresh_editor_is_a_no_op() {
        let (mut editor, rx) = editor();
        assert!(!editor.undo());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn undo_history_is_bounded() {
        let (mut editor, _rx) = editor();
        for i in 0..MAX_UNDO_DEPTH + 10 {
            editor.set_value(&i.to_string());
        }
        let mut undone = 0;
        while editor.undo() {
            undone += 1;
        }
        assert_eq!(undone, MAX_UNDO_DEPTH);
        // The ten oldest states were discarded.
        assert_eq!(editor.value(), "9");
    }

    #[test]
    fn theme_is_shared_across_clones() {
        let library = TextBufferLibrary::new();
        library.clone().set_theme("hc-black");
        assert_eq!(library.theme().as_deref(), Some("hc-black"));
    }

    #[test]
    fn empty_container_fails_construction() {
        let (tx, _rx) = crossbeam_channel::unbounded();
        let result = TextBufferLibrary::new().create("", &CreateOptions::default(), tx);
        assert!(matches!(result, Err(LoadError::Editor(_))));
    }
}
