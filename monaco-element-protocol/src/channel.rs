use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use url::{Origin, Url};

/// One inbound delivery, as a `message` event would present it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEvent {
    pub origin: String,
    pub data: String,
}

/// The outbound `postMessage` primitive of a context.
pub trait MessageTarget {
    fn post_message(&self, data: &str, target_origin: &str);
}

// ---------------------------------------------------------------------------
// Origin filtering
// ---------------------------------------------------------------------------

/// Admits only deliveries whose sender shares the owner's origin.
#[derive(Debug, Clone)]
pub struct OriginFilter {
    origin: Origin,
}

impl OriginFilter {
    pub fn for_location(location: &Url) -> Self {
        OriginFilter {
            origin: location.origin(),
        }
    }

    pub fn parse(location: &str) -> Result<Self, url::ParseError> {
        Url::parse(location).map(|u| Self::for_location(&u))
    }

    /// Serialized origin, e.g. `http://localhost:8080`.
    pub fn origin(&self) -> String {
        self.origin.ascii_serialization()
    }

    /// Opaque origins (`file:`, `data:`) never match anything.
    pub fn admits(&self, sender_origin: &str) -> bool {
        if !self.origin.is_tuple() {
            return false;
        }
        match Url::parse(sender_origin) {
            Ok(sender) => sender.origin() == self.origin,
            Err(_) => false,
        }
    }

    /// Precondition of every receive: the payload is only handed out when
    /// the sender is admitted.
    pub fn admit<'a>(&self, event: &'a MessageEvent) -> Option<&'a str> {
        if self.admits(&event.origin) {
            Some(&event.data)
        } else {
            log::trace!("Dropping message from foreign origin {}", event.origin);
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Loopback bus: both contexts on one thread
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Host,
    Frame,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub to: Side,
    pub event: MessageEvent,
}

/// Single-threaded message queue shared by a host and a frame.
#[derive(Debug, Clone, Default)]
pub struct Loopback {
    queue: Rc<RefCell<VecDeque<Delivery>>>,
}

impl Loopback {
    pub fn new() -> Self {
        Self::default()
    }

    /// A port that delivers to `to`, stamping `sender_origin` on every
    /// message. `recipient` is the origin of the receiving context, used to
    /// honour the target origin the sender asks for.
    pub fn port(&self, to: Side, sender_origin: &str, recipient: OriginFilter) -> LoopbackPort {
        LoopbackPort {
            queue: self.queue.clone(),
            to,
            sender_origin: sender_origin.to_string(),
            recipient,
        }
    }

    pub fn pop(&self) -> Option<Delivery> {
        self.queue.borrow_mut().pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct LoopbackPort {
    queue: Rc<RefCell<VecDeque<Delivery>>>,
    to: Side,
    sender_origin: String,
    recipient: OriginFilter,
}

impl MessageTarget for LoopbackPort {
    fn post_message(&self, data: &str, target_origin: &str) {
        if target_origin != "*" && !self.recipient.admits(target_origin) {
            log::debug!(
                "Target origin {} does not match recipient {}, message not delivered",
                target_origin,
                self.recipient.origin()
            );
            return;
        }
        self.queue.borrow_mut().push_back(Delivery {
            to: self.to,
            event: MessageEvent {
                origin: self.sender_origin.clone(),
                data: data.to_string(),
            },
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_origin_is_admitted() {
        let filter = OriginFilter::parse("http://localhost:8080/app/index.html").unwrap();
        assert!(filter.admits("http://localhost:8080"));
        assert!(filter.admits("http://localhost:8080/other/page.html"));
        assert_eq!(filter.origin(), "http://localhost:8080");
    }

    #[test]
    fn default_port_is_normalized() {
        let filter = OriginFilter::parse("https://example.com/editor").unwrap();
        assert!(filter.admits("https://example.com:443"));
    }

    #[test]
    fn foreign_origins_are_rejected() {
        let filter = OriginFilter::parse("http://localhost:8080/app/").unwrap();
        assert!(!filter.admits("http://localhost:9090"));
        assert!(!filter.admits("https://localhost:8080"));
        assert!(!filter.admits("http://localhost:8080.evil.example"));
        assert!(!filter.admits("null"));
        assert!(!filter.admits(""));
    }

    #[test]
    fn opaque_owner_admits_nothing() {
        let filter = OriginFilter::parse("file:///tmp/editor.html").unwrap();
        assert!(!filter.admits("file:///tmp/editor.html"));
    }

    #[test]
    fn admit_returns_data_only_for_matching_origin() {
        let filter = OriginFilter::parse("http://localhost/").unwrap();
        let ok = MessageEvent {
            origin: "http://localhost".into(),
            data: "hello".into(),
        };
        let bad = MessageEvent {
            origin: "http://attacker".into(),
            data: "hello".into(),
        };
        assert_eq!(filter.admit(&ok), Some("hello"));
        assert_eq!(filter.admit(&bad), None);
    }

    #[test]
    fn loopback_delivers_in_order() {
        let bus = Loopback::new();
        let recipient = OriginFilter::parse("http://localhost/").unwrap();
        let port = bus.port(Side::Frame, "http://localhost", recipient);
        port.post_message("one", "http://localhost/index.html");
        port.post_message("two", "*");
        assert_eq!(bus.len(), 2);
        let first = bus.pop().unwrap();
        assert_eq!(first.to, Side::Frame);
        assert_eq!(first.event.data, "one");
        assert_eq!(first.event.origin, "http://localhost");
        assert_eq!(bus.pop().unwrap().event.data, "two");
        assert!(bus.is_empty());
    }

    #[test]
    fn loopback_honours_target_origin() {
        let bus = Loopback::new();
        let recipient = OriginFilter::parse("http://localhost/").unwrap();
        let port = bus.port(Side::Host, "http://localhost", recipient);
        port.post_message("secret", "http://elsewhere.example");
        assert!(bus.is_empty());
    }
}
