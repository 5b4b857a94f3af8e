//! Node module synthesis: one stateful computational unit per node.

use super::error::CompileError;
use super::translate::{self, ResolvedExpr, ScopeTable};
use crate::ir::{Node, ParameterValue};
use crate::registry::FunctionRegistry;

/// One per-step operation derived from a parameter.
#[derive(Debug, Clone, PartialEq)]
enum StepOp {
    /// Stateful direct-value parameter: the slot is replaced each step.
    Assign { slot: usize, expr: ResolvedExpr },
    /// Stateful time-derivative parameter: one forward-Euler increment per
    /// step, implicit unit step size.
    Integrate { slot: usize, expr: ResolvedExpr },
    /// Function-bound parameter: a transient value for this step only.
    Compute { slot: usize, expr: ResolvedExpr },
}

/// The compiled, executable form of a single node.
///
/// Persistent state lives in `state` (one slot per non-function parameter);
/// function results live in `transients` and are recomputed every step. The
/// execution counter advances exactly once per [`NodeUnit::step`] call.
#[derive(Debug, Clone)]
pub struct NodeUnit {
    node_id: String,
    state: Vec<f64>,
    state_layout: Vec<String>,
    transients: Vec<f64>,
    execution_count: u64,
    steps: Vec<StepOp>,
    output: ResolvedExpr,
    input_arity: usize,
}

impl NodeUnit {
    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    /// Number of `step` invocations so far.
    pub fn execution_count(&self) -> u64 {
        self.execution_count
    }

    /// Number of input-port values `step` consumes.
    pub fn input_arity(&self) -> usize {
        self.input_arity
    }

    /// Current state of a non-function parameter, by id.
    pub fn state_of(&self, parameter_id: &str) -> Option<f64> {
        let slot = self.state_layout.iter().position(|id| id == parameter_id)?;
        self.state.get(slot).copied()
    }

    /// Runs one step: consumes one value per input port, updates stateful
    /// parameters and function transients in declaration order, and returns
    /// the output-port value.
    pub fn step(&mut self, inputs: &[f64]) -> f64 {
        self.execution_count += 1;
        for transient in self.transients.iter_mut() {
            *transient = 0.0;
        }
        for op in &self.steps {
            match op {
                StepOp::Assign { slot, expr } => {
                    let value = expr.eval(&self.state, inputs, &self.transients);
                    self.state[*slot] = value;
                }
                StepOp::Integrate { slot, expr } => {
                    let increment = expr.eval(&self.state, inputs, &self.transients);
                    self.state[*slot] += increment;
                }
                StepOp::Compute { slot, expr } => {
                    let value = expr.eval(&self.state, inputs, &self.transients);
                    self.transients[*slot] = value;
                }
            }
        }
        self.output.eval(&self.state, inputs, &self.transients)
    }
}

/// Builds the executable unit for one node.
///
/// Resolution is complete here: any identifier that is not an owned
/// parameter, a function result, or an input port fails compilation rather
/// than producing silently wrong values at run time.
pub fn synthesize(node: &Node, registry: &FunctionRegistry) -> Result<NodeUnit, CompileError> {
    if node.output_ports.len() > 1 {
        return Err(CompileError::MultipleOutputPortsUnsupported {
            node_id: node.id.clone(),
            count: node.output_ports.len(),
        });
    }

    // Slot assignment: non-function parameters get persistent state slots,
    // function bindings get transient slots. Declaration order throughout.
    let mut scope = ScopeTable::default();
    let mut state_layout = Vec::new();
    let mut transient_count = 0usize;
    for parameter in &node.parameters {
        if parameter.is_function() {
            scope.bind_transient(&parameter.id, transient_count);
            transient_count += 1;
        } else {
            scope.bind_state(&parameter.id, state_layout.len());
            state_layout.push(parameter.id.clone());
        }
    }
    for (slot, port) in node.input_ports.iter().enumerate() {
        scope.bind_input(&port.id, slot);
    }

    let mut state = vec![0.0; state_layout.len()];
    let mut steps = Vec::new();

    for parameter in &node.parameters {
        if let Some(function) = &parameter.function {
            let def = registry.lookup(function).ok_or_else(|| {
                CompileError::UnknownFunction {
                    node_id: node.id.clone(),
                    function: function.clone(),
                }
            })?;
            let bound = translate::bind_arguments(&node.id, def, &parameter.args)?;
            let expr = translate::resolve_scope(&node.id, &bound, &scope)?;
            let slot = steps
                .iter()
                .filter(|op| matches!(op, StepOp::Compute { .. }))
                .count();
            steps.push(StepOp::Compute { slot, expr });
            continue;
        }

        let slot = scope
            .state_slot(&parameter.id)
            .expect("state slot bound above");

        if parameter.is_stateful() {
            // A stateful slot starts from its declared seed, or zero while
            // awaiting its first update.
            state[slot] = parameter.default_initial_value.unwrap_or(0.0);
            match (&parameter.value, &parameter.time_derivative) {
                (Some(value), _) => {
                    let expr = resolve_value(&node.id, value, &scope)?;
                    steps.push(StepOp::Assign { slot, expr });
                }
                (None, Some(derivative)) => {
                    let parsed = translate::parse_for_node(&node.id, derivative)?;
                    let expr = translate::resolve_scope(&node.id, &parsed, &scope)?;
                    steps.push(StepOp::Integrate { slot, expr });
                }
                (None, None) => unreachable!("stateful implies value or derivative"),
            }
        } else {
            // Constant: bound once at construction, never recomputed.
            state[slot] = match &parameter.value {
                Some(ParameterValue::Number(n)) => *n,
                Some(ParameterValue::Expression(src)) => {
                    let parsed = translate::parse_for_node(&node.id, src)?;
                    let expr = translate::resolve_scope(&node.id, &parsed, &scope)?;
                    expr.eval(&state, &[], &[])
                }
                None => parameter.default_initial_value.unwrap_or(0.0),
            };
        }
    }

    let output_port = node.output_ports.first();
    let output_source = output_port.and_then(|p| p.value.as_deref()).unwrap_or("");
    let parsed = translate::parse_for_node(&node.id, output_source)?;
    let output = translate::resolve_scope(&node.id, &parsed, &scope)?;

    Ok(NodeUnit {
        node_id: node.id.clone(),
        state,
        state_layout,
        transients: vec![0.0; transient_count],
        execution_count: 0,
        steps,
        output,
        input_arity: node.input_ports.len(),
    })
}

fn resolve_value(
    node_id: &str,
    value: &ParameterValue,
    scope: &ScopeTable,
) -> Result<ResolvedExpr, CompileError> {
    match value {
        ParameterValue::Number(n) => Ok(ResolvedExpr::Number(*n)),
        ParameterValue::Expression(src) => {
            let parsed = translate::parse_for_node(node_id, src)?;
            translate::resolve_scope(node_id, &parsed, scope)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Parameter, Port};
    use std::collections::BTreeMap;

    fn out_port(value: &str) -> Port {
        Port {
            id: "out".to_string(),
            value: Some(value.to_string()),
        }
    }

    fn in_port(id: &str) -> Port {
        Port {
            id: id.to_string(),
            value: None,
        }
    }

    fn constant_param(id: &str, value: f64) -> Parameter {
        Parameter {
            id: id.to_string(),
            value: Some(ParameterValue::Number(value)),
            ..Default::default()
        }
    }

    #[test]
    fn constant_parameter_never_changes() {
        let node = Node {
            id: "n".to_string(),
            output_ports: vec![out_port("gain")],
            parameters: vec![constant_param("gain", 2.5)],
            ..Default::default()
        };
        let mut unit = synthesize(&node, &FunctionRegistry::new()).unwrap();
        for _ in 0..5 {
            assert_eq!(unit.step(&[]), 2.5);
        }
        assert_eq!(unit.state_of("gain"), Some(2.5));
        assert_eq!(unit.execution_count(), 5);
    }

    #[test]
    fn direct_value_state_does_not_accumulate() {
        // The self-reference makes `level` stateful; each step replaces the
        // slot outright instead of adding to it.
        let node = Node {
            id: "n".to_string(),
            input_ports: vec![in_port("in")],
            output_ports: vec![out_port("level")],
            parameters: vec![Parameter {
                id: "level".to_string(),
                value: Some(ParameterValue::Expression("level * 0 + in".to_string())),
                ..Default::default()
            }],
            ..Default::default()
        };
        let mut unit = synthesize(&node, &FunctionRegistry::new()).unwrap();
        assert_eq!(unit.step(&[4.0]), 4.0);
        assert_eq!(unit.step(&[4.0]), 4.0);
        assert_eq!(unit.state_of("level"), Some(4.0));
    }

    #[test]
    fn time_derivative_accumulates_linearly() {
        let node = Node {
            id: "n".to_string(),
            output_ports: vec![out_port("level")],
            parameters: vec![
                constant_param("rate", 3.0),
                Parameter {
                    id: "level".to_string(),
                    time_derivative: Some("rate".to_string()),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let mut unit = synthesize(&node, &FunctionRegistry::new()).unwrap();
        for n in 1..=4 {
            let out = unit.step(&[]);
            assert_eq!(out, 3.0 * n as f64);
        }
    }

    #[test]
    fn default_initial_value_seeds_stateful_state() {
        let node = Node {
            id: "n".to_string(),
            output_ports: vec![out_port("level")],
            parameters: vec![Parameter {
                id: "level".to_string(),
                default_initial_value: Some(10.0),
                time_derivative: Some("1".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        };
        let mut unit = synthesize(&node, &FunctionRegistry::new()).unwrap();
        assert_eq!(unit.state_of("level"), Some(10.0));
        assert_eq!(unit.step(&[]), 11.0);
    }

    #[test]
    fn function_binding_evaluates_template() {
        let mut registry = FunctionRegistry::new();
        registry
            .register("add", "a + b", vec!["a".into(), "b".into()])
            .unwrap();
        let mut args = BTreeMap::new();
        args.insert("a".to_string(), "x".to_string());
        args.insert("b".to_string(), "y".to_string());
        let node = Node {
            id: "n".to_string(),
            output_ports: vec![out_port("sum")],
            parameters: vec![
                constant_param("x", 2.0),
                constant_param("y", 5.0),
                // An unrelated parameter whose id collides with a template
                // placeholder: substring or equal names must not leak in.
                constant_param("a", 99.0),
                Parameter {
                    id: "sum".to_string(),
                    function: Some("add".to_string()),
                    args,
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let mut unit = synthesize(&node, &registry).unwrap();
        assert_eq!(unit.step(&[]), 7.0);
        // Function results are transient, not persisted state.
        assert_eq!(unit.state_of("sum"), None);
    }

    #[test]
    fn unknown_function_is_a_compile_error() {
        let node = Node {
            id: "n".to_string(),
            output_ports: vec![out_port("f")],
            parameters: vec![Parameter {
                id: "f".to_string(),
                function: Some("missing".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        };
        let err = synthesize(&node, &FunctionRegistry::new()).unwrap_err();
        assert_eq!(
            err,
            CompileError::UnknownFunction {
                node_id: "n".into(),
                function: "missing".into(),
            }
        );
    }

    #[test]
    fn unresolved_output_reference_is_a_compile_error() {
        let node = Node {
            id: "n".to_string(),
            output_ports: vec![out_port("ghost")],
            ..Default::default()
        };
        let err = synthesize(&node, &FunctionRegistry::new()).unwrap_err();
        assert_eq!(
            err,
            CompileError::UnresolvedReference {
                node_id: "n".into(),
                identifier: "ghost".into(),
            }
        );
    }

    #[test]
    fn multiple_output_ports_unsupported() {
        let node = Node {
            id: "n".to_string(),
            output_ports: vec![out_port("a"), out_port("b")],
            ..Default::default()
        };
        let err = synthesize(&node, &FunctionRegistry::new()).unwrap_err();
        assert_eq!(
            err,
            CompileError::MultipleOutputPortsUnsupported {
                node_id: "n".into(),
                count: 2,
            }
        );
    }

    #[test]
    fn malformed_expression_is_reported_with_context() {
        let node = Node {
            id: "n".to_string(),
            output_ports: vec![out_port("1 +")],
            ..Default::default()
        };
        let err = synthesize(&node, &FunctionRegistry::new()).unwrap_err();
        assert!(matches!(err, CompileError::Expression { ref node_id, .. } if node_id == "n"));
    }

    #[test]
    fn output_can_read_input_port_directly() {
        let node = Node {
            id: "n".to_string(),
            input_ports: vec![in_port("in")],
            output_ports: vec![out_port("in * 2")],
            ..Default::default()
        };
        let mut unit = synthesize(&node, &FunctionRegistry::new()).unwrap();
        assert_eq!(unit.step(&[3.0]), 6.0);
    }
}
