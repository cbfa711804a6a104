//! Storage module for the diagram store.
//!
//! Provides an in-memory backend and a file-based backend behind the
//! [`DiagramStorage`] trait.

pub mod error;
pub mod file;
pub mod memory;
pub mod traits;

pub use error::StorageError;
pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use traits::{DiagramPatch, DiagramStorage, NewDiagram};
