use url::Url;

use monaco_element_protocol::channel::{MessageEvent, MessageTarget, OriginFilter};
use monaco_element_protocol::protocol::{self, EditorMessage};

use crate::config::ElementConfig;
use crate::frame_document::render_frame_document;

/// The embedded frame as seen from the host: it can be given a document
/// and be posted to.
pub trait FrameWindow: MessageTarget {
    fn load_document(&self, html: &str);
}

/// Notifications raised towards the element's owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// Content changed inside the editor.
    ValueChanged { value: String, name: String },
    LoadingChanged { loading: bool },
}

/// An owner-side assignment to one of the synchronized fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    Value(String),
    Language(String),
    Theme(String),
    ReadOnly(bool),
    AutomaticLayout(bool),
}

impl From<FieldUpdate> for EditorMessage {
    fn from(update: FieldUpdate) -> Self {
        match update {
            FieldUpdate::Value(v) => EditorMessage::ValueChanged(v),
            FieldUpdate::Language(v) => EditorMessage::LanguageChanged(v),
            FieldUpdate::Theme(v) => EditorMessage::ThemeChanged(v),
            FieldUpdate::ReadOnly(v) => EditorMessage::ReadOnlyChanged(v),
            FieldUpdate::AutomaticLayout(v) => EditorMessage::AutomaticLayoutChanged(v),
        }
    }
}

type Listener = Box<dyn Fn(&HostEvent)>;

/// Host half of the editor element. Owns the configuration snapshot and
/// forwards it into the frame.
pub struct HostProxy<F: FrameWindow> {
    config: ElementConfig,
    loading: bool,
    location: Url,
    origin_filter: OriginFilter,
    frame: Option<F>,
    listening: bool,
    listeners: Vec<Listener>,
}

impl<F: FrameWindow> HostProxy<F> {
    /// `location` is the host document's own URL; only same-origin messages
    /// are accepted and outbound messages target it.
    pub fn new(config: ElementConfig, location: Url) -> Self {
        let origin_filter = OriginFilter::for_location(&location);
        HostProxy {
            config,
            loading: true,
            location,
            origin_filter,
            frame: None,
            listening: false,
            listeners: Vec::new(),
        }
    }

    pub fn add_listener(&mut self, listener: impl Fn(&HostEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn config(&self) -> &ElementConfig {
        &self.config
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn value(&self) -> &str {
        &self.config.value
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn frame(&self) -> Option<&F> {
        self.frame.as_ref()
    }

    pub fn location(&self) -> &Url {
        &self.location
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Take ownership of the frame, give it the bootstrap document and start
    /// listening for its messages.
    pub fn attach_frame(&mut self, frame: F) {
        let html = render_frame_document(&self.config.lib_path, &self.config.adapter_src);
        frame.load_document(&html);
        self.frame = Some(frame);
        self.listening = true;
        log::info!(
            "Editor frame attached for '{}' (lib_path: {})",
            self.config.name,
            self.config.lib_path
        );
    }

    /// Stop listening and release the frame. Loading already in progress
    /// inside the frame is not interrupted.
    pub fn disconnect(&mut self) -> Option<F> {
        self.listening = false;
        self.frame.take()
    }

    // -----------------------------------------------------------------------
    // Owner → frame
    // -----------------------------------------------------------------------

    pub fn set_field(&mut self, update: FieldUpdate) {
        match &update {
            FieldUpdate::Value(v) => {
                if *v == self.config.value {
                    return;
                }
                self.config.value = v.clone();
            }
            FieldUpdate::Language(v) => self.config.language = v.clone(),
            FieldUpdate::Theme(v) => self.config.theme = v.clone(),
            FieldUpdate::ReadOnly(v) => self.config.read_only = *v,
            FieldUpdate::AutomaticLayout(v) => self.config.automatic_layout = *v,
        }
        self.post(&update.into());
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.set_field(FieldUpdate::Value(value.into()));
    }

    pub fn set_language(&mut self, language: impl Into<String>) {
        self.set_field(FieldUpdate::Language(language.into()));
    }

    pub fn set_theme(&mut self, theme: impl Into<String>) {
        self.set_field(FieldUpdate::Theme(theme.into()));
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.set_field(FieldUpdate::ReadOnly(read_only));
    }

    pub fn set_automatic_layout(&mut self, automatic_layout: bool) {
        self.set_field(FieldUpdate::AutomaticLayout(automatic_layout));
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.config.name = name.into();
    }

    /// Only takes effect for frames attached afterwards.
    pub fn set_lib_path(&mut self, lib_path: impl Into<String>) {
        self.config.lib_path = lib_path.into();
        if self.frame.is_some() {
            log::debug!("lib_path changed after the frame was attached; not reloading");
        }
    }

    // -----------------------------------------------------------------------
    // Frame → owner
    // -----------------------------------------------------------------------

    /// Entry point for `message` events delivered to the host window.
    pub fn receive(&mut self, event: &MessageEvent) {
        if !self.listening {
            return;
        }
        if let Some(raw) = self.origin_filter.admit(event) {
            self.on_envelope_received(raw);
        }
    }

    fn on_envelope_received(&mut self, raw: &str) {
        let msg = match protocol::decode(raw) {
            Ok(msg) => msg,
            Err(e) => {
                log::debug!("Ignoring malformed message from frame: {}", e);
                return;
            }
        };

        match msg {
            EditorMessage::Ready => self.on_frame_ready(),
            EditorMessage::ValueChanged(value) => {
                self.config.value = value.clone();
                self.emit(&HostEvent::ValueChanged {
                    value,
                    name: self.config.name.clone(),
                });
            }
            EditorMessage::LanguageChanged(_)
            | EditorMessage::ThemeChanged(_)
            | EditorMessage::ReadOnlyChanged(_)
            | EditorMessage::AutomaticLayoutChanged(_) => {
                log::debug!("Ignoring host-only event {} from frame", msg.event_name());
            }
        }
    }

    /// Handshake: push the whole snapshot, then reveal the editor.
    fn on_frame_ready(&mut self) {
        log::info!("Editor frame ready, sending configuration");
        for msg in self.snapshot_messages() {
            self.post(&msg);
        }
        self.set_loading(false);
    }

    /// The full configuration, in the order the handshake sends it.
    pub fn snapshot_messages(&self) -> [EditorMessage; 5] {
        [
            EditorMessage::ValueChanged(self.config.value.clone()),
            EditorMessage::LanguageChanged(self.config.language.clone()),
            EditorMessage::ThemeChanged(self.config.theme.clone()),
            EditorMessage::ReadOnlyChanged(self.config.read_only),
            EditorMessage::AutomaticLayoutChanged(self.config.automatic_layout),
        ]
    }

    fn set_loading(&mut self, loading: bool) {
        if self.loading == loading {
            return;
        }
        self.loading = loading;
        self.emit(&HostEvent::LoadingChanged { loading });
    }

    fn emit(&self, event: &HostEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }

    fn post(&self, msg: &EditorMessage) {
        let Some(frame) = &self.frame else {
            return;
        };
        let json = match protocol::encode(msg) {
            Ok(j) => j,
            Err(e) => {
                log::error!("Failed to serialize {}: {}", msg.event_name(), e);
                return;
            }
        };
        frame.post_message(&json, self.location.as_str());
    }
}
