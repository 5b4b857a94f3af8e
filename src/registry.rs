//! The named-function registry: expression templates for built-in
//! operations, resolved by name at compile time.
//!
//! A registry entry pairs a template expression with the ordered list of
//! placeholder names it accepts. Templates are parsed once at registration,
//! so compilation never re-parses them and a malformed template is rejected
//! before any model touches it.

use crate::expr::{self, Expr, ParseError};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("function '{name}' is already registered")]
    Duplicate { name: String },
    #[error("template for '{name}' does not parse: {source}")]
    InvalidTemplate {
        name: String,
        #[source]
        source: ParseError,
    },
    #[error("template for '{name}' references '{identifier}', which is not a declared argument")]
    UndeclaredIdentifier { name: String, identifier: String },
}

/// A registry entry: the raw template text, its parsed form, and the
/// placeholder names callers must bind.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub expression: String,
    pub arguments: Vec<String>,
    template: Expr,
}

impl FunctionDef {
    /// The parsed template, ready for argument binding.
    pub fn template(&self) -> &Expr {
        &self.template
    }
}

#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, FunctionDef>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-populated with the standard function set.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        let standard: &[(&str, &str, &[&str])] = &[
            (
                "linear",
                "variable0 * slope + intercept",
                &["variable0", "slope", "intercept"],
            ),
            (
                "logistic",
                "1 / (1 + exp(-1 * gain * (variable0 + bias) + offset))",
                &["variable0", "gain", "bias", "offset"],
            ),
            (
                "exponential",
                "scale * exp(rate * variable0 + bias) + offset",
                &["variable0", "scale", "rate", "bias", "offset"],
            ),
            ("sin", "scale * sin(variable0)", &["variable0", "scale"]),
            ("cos", "scale * cos(variable0)", &["variable0", "scale"]),
            ("tanh", "scale * tanh(variable0)", &["variable0", "scale"]),
        ];
        for (name, expression, arguments) in standard {
            let arguments: Vec<String> = arguments.iter().map(|a| a.to_string()).collect();
            registry
                .register(name, expression, arguments)
                .expect("standard function table is well-formed");
        }
        registry
    }

    /// Registers a function template. The template must parse, every
    /// identifier it references must be a declared argument, and the name
    /// must be unused.
    pub fn register(
        &mut self,
        name: &str,
        expression: &str,
        arguments: Vec<String>,
    ) -> Result<(), RegistryError> {
        if self.functions.contains_key(name) {
            return Err(RegistryError::Duplicate {
                name: name.to_string(),
            });
        }
        let template = expr::parse(expression).map_err(|source| RegistryError::InvalidTemplate {
            name: name.to_string(),
            source,
        })?;
        for identifier in template.identifiers() {
            if !arguments.iter().any(|a| a == identifier) {
                return Err(RegistryError::UndeclaredIdentifier {
                    name: name.to_string(),
                    identifier: identifier.to_string(),
                });
            }
        }
        self.functions.insert(
            name.to_string(),
            FunctionDef {
                expression: expression.to_string(),
                arguments,
                template,
            },
        );
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_set_contains_linear() {
        let registry = FunctionRegistry::standard();
        let linear = registry.lookup("linear").expect("linear missing");
        assert_eq!(linear.arguments, vec!["variable0", "slope", "intercept"]);
    }

    #[test]
    fn duplicate_registration_rejected() {
        let mut registry = FunctionRegistry::new();
        registry
            .register("add", "a + b", vec!["a".into(), "b".into()])
            .unwrap();
        let err = registry
            .register("add", "a + b", vec!["a".into(), "b".into()])
            .unwrap_err();
        assert_eq!(err, RegistryError::Duplicate { name: "add".into() });
    }

    #[test]
    fn malformed_template_rejected() {
        let mut registry = FunctionRegistry::new();
        let err = registry
            .register("bad", "a + ", vec!["a".into()])
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidTemplate { .. }));
    }

    #[test]
    fn undeclared_identifier_rejected() {
        let mut registry = FunctionRegistry::new();
        let err = registry
            .register("leaky", "a + hidden", vec!["a".into()])
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::UndeclaredIdentifier {
                name: "leaky".into(),
                identifier: "hidden".into(),
            }
        );
    }
}
