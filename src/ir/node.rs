//! Defines the `Node`, its ports, and its symbolic parameters.

use crate::expr;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A literal or symbolic parameter value.
///
/// Model descriptions write plain numbers for constants and strings for
/// symbolic update rules, so this deserializes untagged from either form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Number(f64),
    Expression(String),
}

impl ParameterValue {
    /// The numeric literal, if this value is one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ParameterValue::Number(n) => Some(*n),
            ParameterValue::Expression(_) => None,
        }
    }

    pub fn as_expression(&self) -> Option<&str> {
        match self {
            ParameterValue::Number(_) => None,
            ParameterValue::Expression(s) => Some(s),
        }
    }
}

/// A node parameter: a constant, a stateful quantity, or a reference to a
/// registry function with bound arguments.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Parameter {
    pub id: String,

    /// Literal value for a constant, or a direct-assignment update
    /// expression for a stateful parameter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<ParameterValue>,

    /// Seed for a stateful parameter awaiting its first update.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_initial_value: Option<f64>,

    /// Per-step increment expression (forward-Euler, implicit unit step).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_derivative: Option<String>,

    /// Name of a registry function this parameter is bound to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,

    /// Argument expressions keyed by the function's placeholder names.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub args: BTreeMap<String, String>,
}

impl Parameter {
    /// Whether this parameter's value persists and updates across steps.
    ///
    /// A parameter is stateful when it declares a time derivative, or when
    /// its value expression references its own id as a whole identifier
    /// (`count` inside `count + 1` counts; `count` inside `counter` does
    /// not). An unparseable expression is settled later by compilation.
    pub fn is_stateful(&self) -> bool {
        if self.time_derivative.is_some() {
            return true;
        }
        match &self.value {
            Some(ParameterValue::Expression(src)) => expr::parse(src)
                .map(|e| e.references(&self.id))
                .unwrap_or(false),
            _ => false,
        }
    }

    /// Whether this parameter is a registry function binding.
    pub fn is_function(&self) -> bool {
        self.function.is_some()
    }
}

/// A named port. Output ports carry the node's value expression; input
/// ports are pure receive slots.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Port {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// A single computational unit in a graph.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(default)]
    pub input_ports: Vec<Port>,
    #[serde(default)]
    pub output_ports: Vec<Port>,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

impl Node {
    pub fn get_parameter(&self, id: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.id == id)
    }
}
