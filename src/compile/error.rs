//! Compile-time error taxonomy.
//!
//! These are per-graph synthesis failures: one graph failing to compile
//! leaves its siblings in the same model untouched. Structural problems a
//! whole model must not have are reported earlier, by `validation`.

use crate::expr::ParseError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("cycle detected in graph '{graph_id}'")]
    CyclicGraph { graph_id: String },

    #[error("node '{node_id}' references unknown function '{function}'")]
    UnknownFunction { node_id: String, function: String },

    #[error(
        "node '{node_id}' references '{identifier}', which is not an owned parameter, \
         function result, or input port"
    )]
    UnresolvedReference { node_id: String, identifier: String },

    #[error("node '{node_id}' declares {count} output ports; exactly one is supported")]
    MultipleOutputPortsUnsupported { node_id: String, count: usize },

    #[error("node '{node_id}': expression '{expression}' does not parse: {source}")]
    Expression {
        node_id: String,
        expression: String,
        #[source]
        source: ParseError,
    },
}
