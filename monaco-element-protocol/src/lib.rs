pub mod channel;
pub mod protocol;
pub mod schema;

pub use channel::{Delivery, Loopback, LoopbackPort, MessageEvent, MessageTarget, OriginFilter, Side};
pub use protocol::{
    decode, encode, DecodeError, EditorMessage, Envelope, EventName, Payload, PROTOCOL_VERSION,
};
pub use schema::envelope_schema;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vocabulary_is_reachable_from_the_crate_root() {
        let envelope = Envelope::from(&EditorMessage::ThemeChanged("vs".into()));
        assert_eq!(envelope.event, EventName::ThemeChanged);
        assert_eq!(envelope.payload, Some(Payload::Text("vs".into())));
        assert_eq!(
            decode(&encode(&EditorMessage::Ready).unwrap()).unwrap(),
            EditorMessage::Ready
        );
        assert_eq!(
            envelope_schema()["title"],
            format!("monaco-element envelope v{}", PROTOCOL_VERSION)
        );
    }
}
