//! The intermediate representation consumed by the compiler.
//!
//! The IR is constructed and owned externally (typically deserialized from a
//! persisted model description); the compiler reads it without mutation and
//! produces an independently-owned executable artifact.
pub mod edge;
pub mod graph;
pub mod node;

pub use edge::Edge;
pub use graph::{Graph, Model};
pub use node::{Node, Parameter, ParameterValue, Port};
