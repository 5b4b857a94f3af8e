//! Defines the error types for the validation module.

/// The specific category of a validation error.
//
// This enum allows for programmatic inspection of errors, which is more
// robust than string matching on the error message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two nodes in the same graph share an id.
    DuplicateNodeId,
    /// An edge names a sender or receiver that does not exist.
    DanglingEdgeEndpoint,
    /// A parameter references a function name absent from the registry.
    UnknownFunction,
    /// A function binding's named arguments do not match the registry entry.
    FunctionArgumentMismatch,
    /// A node declares no output port.
    MissingOutputPort,
}

/// A structured error report from IR validation.
///
/// Validation runs before any synthesis and collects every problem it can
/// find; a non-empty report aborts compilation of the whole model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Graph in which the error was detected.
    pub graph_id: String,
    /// Node involved, when the error is node-local.
    pub node_id: Option<String>,
    /// The category of the error.
    pub kind: ValidationErrorKind,
    /// A human-readable message explaining the error.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.node_id {
            Some(node) => write!(f, "[{}/{}] {}", self.graph_id, node, self.message),
            None => write!(f, "[{}] {}", self.graph_id, self.message),
        }
    }
}
