//! Host-side half of monaco-element.
//!
//! [`proxy::HostProxy`] presents one editor to its owner, keeps the
//! configuration snapshot, and talks to the editor frame through the shared
//! vocabulary in `monaco_element_protocol`.

pub mod config;
pub mod frame_document;
pub mod proxy;

pub use config::{ConfigError, ElementConfig};
pub use proxy::{FieldUpdate, FrameWindow, HostEvent, HostProxy};
