use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Bumped whenever an event name or payload type changes.
pub const PROTOCOL_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Event names (shared verbatim by host and frame)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum EventName {
    Ready,
    ValueChanged,
    LanguageChanged,
    ThemeChanged,
    ReadOnlyChanged,
    AutomaticLayoutChanged,
}

impl EventName {
    pub const ALL: [EventName; 6] = [
        EventName::Ready,
        EventName::ValueChanged,
        EventName::LanguageChanged,
        EventName::ThemeChanged,
        EventName::ReadOnlyChanged,
        EventName::AutomaticLayoutChanged,
    ];

    /// Wire spelling of the event name.
    pub fn as_str(self) -> &'static str {
        match self {
            EventName::Ready => "ready",
            EventName::ValueChanged => "valueChanged",
            EventName::LanguageChanged => "languageChanged",
            EventName::ThemeChanged => "themeChanged",
            EventName::ReadOnlyChanged => "readOnlyChanged",
            EventName::AutomaticLayoutChanged => "automaticLayoutChanged",
        }
    }
}

impl std::fmt::Display for EventName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Envelope: the JSON unit that crosses the frame boundary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Payload {
    Text(String),
    Flag(bool),
}

/// `{"event": ..., "payload": ...}` exactly as it is posted between contexts.
///
/// `payload` is always serialized (as `null` for `ready`) and may be
/// omitted on input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Envelope {
    pub event: EventName,
    #[serde(default)]
    pub payload: Option<Payload>,
}

// ---------------------------------------------------------------------------
// Typed messages (what both peers actually dispatch on)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorMessage {
    /// Frame → host: editor constructed, send me the configuration.
    Ready,
    /// Both directions: full editor content.
    ValueChanged(String),
    LanguageChanged(String),
    ThemeChanged(String),
    ReadOnlyChanged(bool),
    AutomaticLayoutChanged(bool),
}

impl EditorMessage {
    pub fn event_name(&self) -> EventName {
        match self {
            EditorMessage::Ready => EventName::Ready,
            EditorMessage::ValueChanged(_) => EventName::ValueChanged,
            EditorMessage::LanguageChanged(_) => EventName::LanguageChanged,
            EditorMessage::ThemeChanged(_) => EventName::ThemeChanged,
            EditorMessage::ReadOnlyChanged(_) => EventName::ReadOnlyChanged,
            EditorMessage::AutomaticLayoutChanged(_) => EventName::AutomaticLayoutChanged,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("malformed envelope: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unexpected payload for {event}: expected {expected}")]
    UnexpectedPayload {
        event: EventName,
        expected: &'static str,
    },
}

impl From<&EditorMessage> for Envelope {
    fn from(msg: &EditorMessage) -> Self {
        let payload = match msg {
            EditorMessage::Ready => None,
            EditorMessage::ValueChanged(s)
            | EditorMessage::LanguageChanged(s)
            | EditorMessage::ThemeChanged(s) => Some(Payload::Text(s.clone())),
            EditorMessage::ReadOnlyChanged(b) | EditorMessage::AutomaticLayoutChanged(b) => {
                Some(Payload::Flag(*b))
            }
        };
        Envelope {
            event: msg.event_name(),
            payload,
        }
    }
}

impl TryFrom<Envelope> for EditorMessage {
    type Error = DecodeError;

    fn try_from(envelope: Envelope) -> Result<Self, Self::Error> {
        let event = envelope.event;
        let text = |payload: Option<Payload>| match payload {
            Some(Payload::Text(s)) => Ok(s),
            _ => Err(DecodeError::UnexpectedPayload {
                event,
                expected: "string",
            }),
        };
        let flag = |payload: Option<Payload>| match payload {
            Some(Payload::Flag(b)) => Ok(b),
            _ => Err(DecodeError::UnexpectedPayload {
                event,
                expected: "boolean",
            }),
        };

        match event {
            EventName::Ready => Ok(EditorMessage::Ready),
            EventName::ValueChanged => text(envelope.payload).map(EditorMessage::ValueChanged),
            EventName::LanguageChanged => {
                text(envelope.payload).map(EditorMessage::LanguageChanged)
            }
            EventName::ThemeChanged => text(envelope.payload).map(EditorMessage::ThemeChanged),
            EventName::ReadOnlyChanged => flag(envelope.payload).map(EditorMessage::ReadOnlyChanged),
            EventName::AutomaticLayoutChanged => {
                flag(envelope.payload).map(EditorMessage::AutomaticLayoutChanged)
            }
        }
    }
}

/// Serialize a message to the string that is handed to `postMessage`.
pub fn encode(msg: &EditorMessage) -> Result<String, serde_json::Error> {
    serde_json::to_string(&Envelope::from(msg))
}

/// Parse a raw posted string back into a typed message.
pub fn decode(raw: &str) -> Result<EditorMessage, DecodeError> {
    let envelope: Envelope = serde_json::from_str(raw)?;
    EditorMessage::try_from(envelope)
}
