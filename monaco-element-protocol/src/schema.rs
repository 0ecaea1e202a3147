use crate::protocol::{Envelope, PROTOCOL_VERSION};

/// JSON Schema describing the envelope accepted by both peers.
///
/// Out-of-tree peers (e.g. a hand-written frame script) can validate
/// against this instead of copying the event names.
pub fn envelope_schema() -> serde_json::Value {
    let mut schema = schemars::schema_for!(Envelope);
    let metadata = schema.schema.metadata();
    metadata.title = Some(format!("monaco-element envelope v{}", PROTOCOL_VERSION));
    metadata.description =
        Some("Message exchanged between the editor host and its embedded frame".to_string());
    match serde_json::to_value(&schema) {
        Ok(v) => v,
        Err(e) => {
            log::error!("Failed to serialize envelope schema: {}", e);
            serde_json::Value::Null
        }
    }
}
