//! Frame-side half of monaco-element: owns the editor instance, applies
//! configuration sent by the host and reports content edits back.

pub mod adapter;
pub mod editor;
pub mod headless;
pub mod loader;

pub use adapter::{FrameAdapter, Phase};
pub use loader::{FsLoader, LibraryLoader, LoadError, LoaderConfig};
