//! The central validator that checks an IR model before any synthesis runs.

use super::error::{ValidationError, ValidationErrorKind};
use crate::ir::{Graph, Model, Node};
use crate::registry::FunctionRegistry;
use std::collections::{BTreeSet, HashSet};

/// The orchestrator for IR validation.
///
/// Holds references to the model and registry and applies a set of local
/// rules to every graph and node, collecting all errors rather than
/// stopping at the first. Like a linter: compilation only proceeds on a
/// clean report.
pub struct Validator<'a> {
    model: &'a Model,
    registry: &'a FunctionRegistry,
}

impl<'a> Validator<'a> {
    pub fn new(model: &'a Model, registry: &'a FunctionRegistry) -> Self {
        Self { model, registry }
    }

    /// Executes all validation rules against every graph in the model.
    ///
    /// # Returns
    /// - `Ok(())` if no validation errors are found.
    /// - `Err(Vec<ValidationError>)` containing all errors discovered.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        for graph in &self.model.graphs {
            self.validate_graph(graph, &mut errors);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_graph(&self, graph: &Graph, errors: &mut Vec<ValidationError>) {
        // Rule: node ids are unique within a graph.
        let mut seen = HashSet::new();
        for node in &graph.nodes {
            if !seen.insert(node.id.as_str()) {
                errors.push(ValidationError {
                    graph_id: graph.id.clone(),
                    node_id: Some(node.id.clone()),
                    kind: ValidationErrorKind::DuplicateNodeId,
                    message: format!("node id '{}' declared more than once", node.id),
                });
            }
        }

        // Rule: every edge endpoint names an existing node.
        for edge in &graph.edges {
            for endpoint in [&edge.sender, &edge.receiver] {
                if !seen.contains(endpoint.as_str()) {
                    errors.push(ValidationError {
                        graph_id: graph.id.clone(),
                        node_id: None,
                        kind: ValidationErrorKind::DanglingEdgeEndpoint,
                        message: format!(
                            "edge {} -> {} references unknown node '{}'",
                            edge.sender, edge.receiver, endpoint
                        ),
                    });
                }
            }
        }

        for node in &graph.nodes {
            self.validate_node(graph, node, errors);
        }
    }

    fn validate_node(&self, graph: &Graph, node: &Node, errors: &mut Vec<ValidationError>) {
        // Rule: a node must expose an output port. More than one is a
        // compile-time limitation reported by the synthesizer, not here.
        if node.output_ports.is_empty() {
            errors.push(ValidationError {
                graph_id: graph.id.clone(),
                node_id: Some(node.id.clone()),
                kind: ValidationErrorKind::MissingOutputPort,
                message: format!("node '{}' declares no output port", node.id),
            });
        }

        // Rule: function bindings resolve against the registry with exactly
        // the named arguments the registry entry declares.
        for parameter in &node.parameters {
            let Some(function) = &parameter.function else {
                continue;
            };
            let Some(def) = self.registry.lookup(function) else {
                errors.push(ValidationError {
                    graph_id: graph.id.clone(),
                    node_id: Some(node.id.clone()),
                    kind: ValidationErrorKind::UnknownFunction,
                    message: format!(
                        "parameter '{}' references unknown function '{}'",
                        parameter.id, function
                    ),
                });
                continue;
            };
            let bound: BTreeSet<&str> = parameter.args.keys().map(|k| k.as_str()).collect();
            let declared: BTreeSet<&str> = def.arguments.iter().map(|a| a.as_str()).collect();
            if bound != declared {
                errors.push(ValidationError {
                    graph_id: graph.id.clone(),
                    node_id: Some(node.id.clone()),
                    kind: ValidationErrorKind::FunctionArgumentMismatch,
                    message: format!(
                        "parameter '{}' binds '{}' with arguments [{}], expected [{}]",
                        parameter.id,
                        function,
                        bound.iter().cloned().collect::<Vec<_>>().join(", "),
                        declared.iter().cloned().collect::<Vec<_>>().join(", "),
                    ),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Edge, Parameter, Port};

    fn minimal_node(id: &str) -> Node {
        Node {
            id: id.to_string(),
            output_ports: vec![Port {
                id: "out".to_string(),
                value: Some("0".to_string()),
            }],
            ..Default::default()
        }
    }

    fn single_graph_model(graph: Graph) -> Model {
        Model {
            id: "m".to_string(),
            graphs: vec![graph],
        }
    }

    #[test]
    fn clean_model_passes() {
        let graph = Graph {
            id: "g".to_string(),
            nodes: vec![minimal_node("a"), minimal_node("b")],
            edges: vec![Edge::new("a", "b")],
        };
        let model = single_graph_model(graph);
        let registry = FunctionRegistry::standard();
        assert!(Validator::new(&model, &registry).validate().is_ok());
    }

    #[test]
    fn collects_multiple_errors_in_one_pass() {
        let mut dup = minimal_node("a");
        dup.output_ports.clear();
        let graph = Graph {
            id: "g".to_string(),
            nodes: vec![minimal_node("a"), dup],
            edges: vec![Edge::new("a", "ghost")],
        };
        let model = single_graph_model(graph);
        let registry = FunctionRegistry::new();
        let errors = Validator::new(&model, &registry).validate().unwrap_err();
        let kinds: Vec<_> = errors.iter().map(|e| e.kind.clone()).collect();
        assert!(kinds.contains(&ValidationErrorKind::DuplicateNodeId));
        assert!(kinds.contains(&ValidationErrorKind::DanglingEdgeEndpoint));
        assert!(kinds.contains(&ValidationErrorKind::MissingOutputPort));
    }

    #[test]
    fn unknown_function_rejected_before_synthesis() {
        let mut node = minimal_node("a");
        node.parameters.push(Parameter {
            id: "f".to_string(),
            function: Some("no_such_fn".to_string()),
            ..Default::default()
        });
        let model = single_graph_model(Graph {
            id: "g".to_string(),
            nodes: vec![node],
            edges: vec![],
        });
        let registry = FunctionRegistry::standard();
        let errors = Validator::new(&model, &registry).validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::UnknownFunction);
    }

    #[test]
    fn argument_mismatch_rejected() {
        let mut node = minimal_node("a");
        let mut parameter = Parameter {
            id: "f".to_string(),
            function: Some("linear".to_string()),
            ..Default::default()
        };
        parameter.args.insert("variable0".into(), "x".into());
        parameter.args.insert("slope".into(), "2".into());
        // `intercept` missing.
        node.parameters.push(parameter);
        let model = single_graph_model(Graph {
            id: "g".to_string(),
            nodes: vec![node],
            edges: vec![],
        });
        let registry = FunctionRegistry::standard();
        let errors = Validator::new(&model, &registry).validate().unwrap_err();
        assert_eq!(errors[0].kind, ValidationErrorKind::FunctionArgumentMismatch);
    }
}
