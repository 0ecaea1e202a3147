use std::cell::RefCell;
use std::rc::Rc;

use url::Url;

use monaco_element_frame::adapter::{AdapterState, FrameAdapter, Phase};
use monaco_element_frame::headless::TextBufferLibrary;
use monaco_element_frame::loader::{LibraryLoader, LoadError, LoaderConfig};
use monaco_element_host::config::ElementConfig;
use monaco_element_host::proxy::{FrameWindow, HostEvent, HostProxy};
use monaco_element_protocol::{Loopback, LoopbackPort, MessageTarget, OriginFilter, Side};

/// The host's view of a frame living on the loopback bus.
pub struct LoopbackFrame {
    port: LoopbackPort,
    document: RefCell<Option<String>>,
}

impl LoopbackFrame {
    pub fn new(port: LoopbackPort) -> Self {
        LoopbackFrame {
            port,
            document: RefCell::new(None),
        }
    }

    pub fn document(&self) -> Option<String> {
        self.document.borrow().clone()
    }
}

impl MessageTarget for LoopbackFrame {
    fn post_message(&self, data: &str, target_origin: &str) {
        self.port.post_message(data, target_origin);
    }
}

impl FrameWindow for LoopbackFrame {
    fn load_document(&self, html: &str) {
        log::debug!("Frame document loaded ({} bytes)", html.len());
        *self.document.borrow_mut() = Some(html.to_string());
    }
}

/// A host proxy and its editor frame sharing one thread and one bus.
pub struct Session {
    bus: Loopback,
    pub host: HostProxy<LoopbackFrame>,
    pub frame: FrameAdapter<LoopbackPort, TextBufferLibrary>,
    events: Rc<RefCell<Vec<HostEvent>>>,
}

impl Session {
    pub fn new(config: ElementConfig, location: Url) -> Self {
        let bus = Loopback::new();
        // Host and frame share an origin by construction.
        let filter = OriginFilter::for_location(&location);
        let origin = filter.origin();
        let to_frame = bus.port(Side::Frame, &origin, filter.clone());
        let to_host = bus.port(Side::Host, &origin, filter.clone());

        let loader_config = LoaderConfig::new(config.lib_path.clone());
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();

        let mut host = HostProxy::new(config, location);
        host.add_listener(move |e| sink.borrow_mut().push(e.clone()));
        host.attach_frame(LoopbackFrame::new(to_frame));

        let frame = FrameAdapter::new(to_host, filter, loader_config);

        Session {
            bus,
            host,
            frame,
            events,
        }
    }

    /// Run the frame's library load to completion, then settle the bus.
    pub async fn load<Ld>(&mut self, loader: &Ld) -> Phase
    where
        Ld: LibraryLoader<Library = TextBufferLibrary>,
    {
        if let Some(load) = self.frame.begin_loading(loader) {
            let result = load.await;
            self.frame.finish_loading(result);
        }
        self.pump();
        self.frame.phase()
    }

    /// Deliver queued messages and editor change events until both sides
    /// are quiet. Returns the number of messages delivered.
    pub fn pump(&mut self) -> usize {
        let mut delivered = 0;
        loop {
            self.frame.pump_editor_events();
            let Some(delivery) = self.bus.pop() else {
                break;
            };
            delivered += 1;
            match delivery.to {
                Side::Host => self.host.receive(&delivery.event),
                Side::Frame => self.frame.receive(&delivery.event),
            }
        }
        delivered
    }

    /// Simulate the user typing at the end of the editor buffer.
    pub fn type_text(&mut self, text: &str) -> bool {
        let typed = match self.frame.editor_mut() {
            Some(editor) => editor.type_text(text),
            None => false,
        };
        self.pump();
        typed
    }

    /// Take the host events raised since the last call.
    pub fn drain_events(&self) -> Vec<HostEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    pub fn load_error(&self) -> Option<&LoadError> {
        match self.frame.state() {
            AdapterState::Failed(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use monaco_element_frame::editor::CodeEditor;
    use monaco_element_frame::loader::FsLoader;
    use monaco_element_protocol::{encode, EditorMessage, MessageEvent};

    const LOCATION: &str = "http://localhost:8080/index.html";

    fn lib_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("loader.js"), "// amd loader").unwrap();
        dir
    }

    fn session(lib_path: &str) -> Session {
        let config = ElementConfig {
            name: "main-editor".to_string(),
            lib_path: lib_path.to_string(),
            ..ElementConfig::default()
        };
        Session::new(config, Url::parse(LOCATION).unwrap())
    }

    async fn ready_session(dir: &tempfile::TempDir) -> Session {
        let mut session = session(&dir.path().to_string_lossy());
        assert_eq!(session.load(&FsLoader::default()).await, Phase::Ready);
        session.drain_events();
        session
    }

    #[tokio::test]
    async fn handshake_applies_last_written_configuration() {
        let dir = lib_dir();
        let mut session = session(&dir.path().to_string_lossy());

        session.host.set_value("draft");
        session.host.set_value("final");
        session.host.set_language("python");
        session.host.set_language("rust");
        session.host.set_theme("vs");
        session.host.set_theme("hc-black");
        session.host.set_read_only(true);
        session.host.set_automatic_layout(false);
        // Frame is still loading: everything above is dropped on arrival.
        session.pump();
        assert!(session.host.loading());

        assert_eq!(session.load(&FsLoader::default()).await, Phase::Ready);

        let editor = session.frame.editor().unwrap();
        assert_eq!(editor.value(), "final");
        assert_eq!(editor.language(), "rust");
        assert!(editor.read_only());
        assert!(!editor.automatic_layout());
        assert_eq!(
            session.frame.library().unwrap().theme().as_deref(),
            Some("hc-black")
        );
        assert!(!session.host.loading());
        assert!(session.bus.is_empty());
    }

    #[tokio::test]
    async fn duplicate_value_into_frame_notifies_host_once() {
        let dir = lib_dir();
        let mut session = ready_session(&dir).await;
        let raw = encode(&EditorMessage::ValueChanged("twice".into())).unwrap();
        for _ in 0..2 {
            session.frame.receive(&MessageEvent {
                origin: "http://localhost:8080".to_string(),
                data: raw.clone(),
            });
            session.pump();
        }
        let changes: Vec<HostEvent> = session
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, HostEvent::ValueChanged { .. }))
            .collect();
        assert_eq!(
            changes,
            vec![HostEvent::ValueChanged {
                value: "twice".into(),
                name: "main-editor".into()
            }]
        );
    }

    #[tokio::test]
    async fn host_value_round_trip_settles() {
        let dir = lib_dir();
        let mut session = ready_session(&dir).await;
        session.host.set_value("x");
        // host → frame, frame echo → host; nothing after that.
        assert_eq!(session.pump(), 2);
        assert_eq!(session.frame.editor().unwrap().value(), "x");
        assert_eq!(session.frame.value(), "x");
        assert_eq!(session.host.value(), "x");
        assert_eq!(session.pump(), 0);
        assert_eq!(session.drain_events().len(), 1);
    }

    #[tokio::test]
    async fn user_edit_reaches_the_owner() {
        let dir = lib_dir();
        let mut session = ready_session(&dir).await;
        session.host.set_value("x");
        session.pump();
        session.drain_events();

        assert!(session.type_text("y"));
        assert_eq!(
            session.drain_events(),
            vec![HostEvent::ValueChanged {
                value: "xy".into(),
                name: "main-editor".into()
            }]
        );
        assert_eq!(session.host.value(), "xy");
        assert!(session.bus.is_empty());
    }

    #[tokio::test]
    async fn read_only_editor_refuses_user_edits() {
        let dir = lib_dir();
        let mut session = ready_session(&dir).await;
        session.host.set_read_only(true);
        session.pump();
        assert!(!session.type_text("nope"));
        assert!(session.drain_events().is_empty());
    }

    #[tokio::test]
    async fn missing_library_leaves_host_loading() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        let mut session = session(&missing.to_string_lossy());

        assert_eq!(session.load(&FsLoader::default()).await, Phase::Failed);
        assert!(matches!(
            session.load_error(),
            Some(LoadError::LoaderMissing(_))
        ));
        assert!(session.host.loading());
        assert!(session.drain_events().is_empty());

        // Later configuration goes nowhere and nothing panics.
        session.host.set_theme("vs");
        session.pump();
        assert!(session.host.loading());
    }

    #[tokio::test]
    async fn malformed_messages_to_either_peer_change_nothing() {
        let dir = lib_dir();
        let mut session = ready_session(&dir).await;
        let garbage = MessageEvent {
            origin: "http://localhost:8080".to_string(),
            data: "}{ not json".to_string(),
        };
        session.host.receive(&garbage);
        session.frame.receive(&garbage);
        session.pump();
        assert_eq!(session.host.value(), "");
        assert_eq!(session.frame.value(), "");
        assert!(session.drain_events().is_empty());
    }

    #[test]
    fn host_hands_the_frame_its_bootstrap_document() {
        let session = session("/srv/monaco/vs");
        let document = session.host.frame().unwrap().document().unwrap();
        assert!(document.contains("/srv/monaco/vs/loader.js"));
    }
}
