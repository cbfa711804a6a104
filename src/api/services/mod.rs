//! Services module - authentication tokens and diagram business rules.

pub mod diagram_service;
pub mod jwt_service;

pub use diagram_service::{DiagramService, DiagramServiceError};
pub use jwt_service::{Claims, JwtService, SharedJwtService};
