use crossbeam_channel::Receiver;

use monaco_element_protocol::channel::{MessageEvent, MessageTarget, OriginFilter};
use monaco_element_protocol::protocol::{self, EditorMessage};

use crate::editor::{CodeEditor, CreateOptions, EditorLibrary, OptionsUpdate};
use crate::loader::{LibraryLoader, LoadError, LoadFuture, LoaderConfig};

/// Id of the element the editor is mounted into.
pub const CONTAINER_ID: &str = "container";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Loading,
    Ready,
    Failed,
}

/// A constructed editor. Every operation that touches the editor lives here,
/// so it can only be reached once loading succeeded.
pub struct ReadyEditor<L: EditorLibrary> {
    library: L,
    editor: L::Editor,
    changes: Receiver<String>,
}

impl<L: EditorLibrary> ReadyEditor<L> {
    fn set_value(&mut self, value: &str) {
        self.editor.set_value(value);
    }

    fn set_language(&mut self, language: &str) {
        self.editor.set_model_language(language);
    }

    fn set_theme(&self, theme: &str) {
        self.library.set_theme(theme);
    }

    fn update_options(&mut self, update: OptionsUpdate) {
        self.editor.update_options(&update);
    }
}

pub enum AdapterState<L: EditorLibrary> {
    Uninitialized,
    Loading,
    Ready(ReadyEditor<L>),
    Failed(LoadError),
}

/// Owns the editor inside the frame and keeps it in sync with the host.
pub struct FrameAdapter<P: MessageTarget, L: EditorLibrary> {
    parent: P,
    parent_filter: OriginFilter,
    loader_config: LoaderConfig,
    /// Last value seen on either side; the echo-suppression reference.
    value: String,
    state: AdapterState<L>,
}

impl<P: MessageTarget, L: EditorLibrary> FrameAdapter<P, L> {
    pub fn new(parent: P, parent_filter: OriginFilter, loader_config: LoaderConfig) -> Self {
        FrameAdapter {
            parent,
            parent_filter,
            loader_config,
            value: String::new(),
            state: AdapterState::Uninitialized,
        }
    }

    pub fn phase(&self) -> Phase {
        match self.state {
            AdapterState::Uninitialized => Phase::Uninitialized,
            AdapterState::Loading => Phase::Loading,
            AdapterState::Ready(_) => Phase::Ready,
            AdapterState::Failed(_) => Phase::Failed,
        }
    }

    pub fn state(&self) -> &AdapterState<L> {
        &self.state
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn library(&self) -> Option<&L> {
        match &self.state {
            AdapterState::Ready(ready) => Some(&ready.library),
            _ => None,
        }
    }

    pub fn editor(&self) -> Option<&L::Editor> {
        match &self.state {
            AdapterState::Ready(ready) => Some(&ready.editor),
            _ => None,
        }
    }

    /// For driving user edits from outside (keyboard input, tests).
    pub fn editor_mut(&mut self) -> Option<&mut L::Editor> {
        match &mut self.state {
            AdapterState::Ready(ready) => Some(&mut ready.editor),
            _ => None,
        }
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Kick off library loading. Only valid once, from `Uninitialized`.
    pub fn begin_loading<Ld>(&mut self, loader: &Ld) -> Option<LoadFuture<L>>
    where
        Ld: LibraryLoader<Library = L>,
    {
        if !matches!(self.state, AdapterState::Uninitialized) {
            log::warn!("Editor loading already started ({:?})", self.phase());
            return None;
        }
        log::info!(
            "Loading editor library from {}",
            self.loader_config.loader_script()
        );
        self.state = AdapterState::Loading;
        Some(loader.load(&self.loader_config))
    }

    /// Complete loading: construct the editor and announce `ready`, or
    /// park in `Failed`. The host is not told about failures.
    pub fn finish_loading(&mut self, result: Result<L, LoadError>) {
        if !matches!(self.state, AdapterState::Loading) {
            log::warn!("Ignoring load completion in state {:?}", self.phase());
            return;
        }

        let library = match result {
            Ok(library) => library,
            Err(e) => {
                log::error!("Editor library failed to load: {}", e);
                self.state = AdapterState::Failed(e);
                return;
            }
        };

        let options = CreateOptions {
            value: self.value.clone(),
            ..CreateOptions::default()
        };
        let (tx, rx) = crossbeam_channel::unbounded();
        match library.create(CONTAINER_ID, &options, tx) {
            Ok(editor) => {
                self.state = AdapterState::Ready(ReadyEditor {
                    library,
                    editor,
                    changes: rx,
                });
                log::info!("Editor ready");
                self.post(&EditorMessage::Ready);
            }
            Err(e) => {
                log::error!("Failed to construct editor: {}", e);
                self.state = AdapterState::Failed(e);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Host → frame
    // -----------------------------------------------------------------------

    /// Entry point for `message` events delivered to the frame window.
    pub fn receive(&mut self, event: &MessageEvent) {
        if let Some(raw) = self.parent_filter.admit(event) {
            self.on_envelope_received(raw);
        }
    }

    pub fn on_envelope_received(&mut self, raw: &str) {
        let msg = match protocol::decode(raw) {
            Ok(msg) => msg,
            Err(e) => {
                log::error!("Failed to parse message from host: {}", e);
                return;
            }
        };

        // Queued user edits must land in the cache before an inbound value
        // is compared against it.
        if matches!(msg, EditorMessage::ValueChanged(_)) {
            self.pump_editor_events();
        }

        let AdapterState::Ready(ready) = &mut self.state else {
            log::debug!(
                "Editor not ready, dropping {} from host",
                msg.event_name()
            );
            return;
        };

        match msg {
            EditorMessage::ValueChanged(value) => {
                if value == self.value {
                    return;
                }
                self.value = value.clone();
                ready.set_value(&value);
                self.post(&EditorMessage::ValueChanged(value));
            }
            EditorMessage::LanguageChanged(language) => ready.set_language(&language),
            EditorMessage::ThemeChanged(theme) => ready.set_theme(&theme),
            EditorMessage::ReadOnlyChanged(read_only) => ready.update_options(OptionsUpdate {
                read_only: Some(read_only),
                ..OptionsUpdate::default()
            }),
            EditorMessage::AutomaticLayoutChanged(automatic_layout) => {
                ready.update_options(OptionsUpdate {
                    automatic_layout: Some(automatic_layout),
                    ..OptionsUpdate::default()
                })
            }
            EditorMessage::Ready => {}
        }
    }

    // -----------------------------------------------------------------------
    // Editor → host
    // -----------------------------------------------------------------------

    /// Drain content changes the editor has reported since the last call.
    pub fn pump_editor_events(&mut self) {
        let pending: Vec<String> = match &self.state {
            AdapterState::Ready(ready) => ready.changes.try_iter().collect(),
            _ => return,
        };
        for value in pending {
            self.on_content_changed(value);
        }
    }

    /// Observer for model content changes.
    pub fn on_content_changed(&mut self, value: String) {
        if value == self.value {
            return;
        }
        self.value = value.clone();
        self.post(&EditorMessage::ValueChanged(value));
    }

    fn post(&self, msg: &EditorMessage) {
        let json = match protocol::encode(msg) {
            Ok(j) => j,
            Err(e) => {
                log::error!("Failed to serialize {}: {}", msg.event_name(), e);
                return;
            }
        };
        self.parent
            .post_message(&json, &self.parent_filter.origin());
    }
}
