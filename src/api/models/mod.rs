// Models module - contains Diagram, Node, Edge and the response envelope

pub mod diagram;
pub mod edge;
pub mod envelope;
pub mod node;

pub use diagram::{
    CreateDiagramRequest, DeletedDiagram, Diagram, MIN_TITLE_LEN, TitleError,
    UpdateDiagramRequest, normalize_title, validate_new_title,
};
pub use edge::{Edge, EdgeAttrs};
pub use envelope::ApiEnvelope;
pub use node::{Node, NodeData, NodeType, Position};
