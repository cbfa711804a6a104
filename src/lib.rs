//! Sketch diagram core.
//!
//! The in-session [`graph`], the [`canvas`] gesture layer, the [`sync`]
//! engine that autosaves the open diagram through the [`client`], and the
//! diagram store API server under [`api`].

pub mod api;
pub mod canvas;
pub mod client;
pub mod config;
pub mod graph;
pub mod sync;

// Re-export api modules at crate root so routes can use crate::services, crate::models
pub use api::middleware;
pub use api::models;
pub use api::routes;
pub use api::services;
pub use api::storage;
