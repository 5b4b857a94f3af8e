//! Expression translation: function-argument binding and lexical scope
//! resolution.
//!
//! Both operations work on the parsed AST, so identifier matching is always
//! whole-token: a parameter named `w` can never corrupt an identifier named
//! `weight`, and no longest-first string ordering is needed.
//!
//! Scope resolution turns a name-based [`Expr`] into a slot-based
//! [`ResolvedExpr`] that evaluates without any name lookup. The scope table
//! is built per node, per compilation; nothing here is process-wide.

use super::error::CompileError;
use crate::expr::{self, BinOp, Expr, MathFn, UnaryOp};
use crate::registry::FunctionDef;
use std::collections::{BTreeMap, HashMap};

/// Where a resolved identifier reads from at step time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotRef {
    /// A persistent state slot owned by the node.
    State(usize),
    /// One of the node's input-port values for the current invocation.
    Input(usize),
    /// A function result computed earlier in the same step.
    Transient(usize),
}

/// An expression with every identifier resolved to a slot.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedExpr {
    Number(f64),
    Slot(SlotRef),
    Unary {
        op: UnaryOp,
        operand: Box<ResolvedExpr>,
    },
    Binary {
        op: BinOp,
        lhs: Box<ResolvedExpr>,
        rhs: Box<ResolvedExpr>,
    },
    Call {
        func: MathFn,
        arg: Box<ResolvedExpr>,
    },
}

impl ResolvedExpr {
    /// Evaluates against the node's current slots. Arithmetic follows IEEE
    /// semantics; all name errors were already rejected at compile time.
    pub fn eval(&self, state: &[f64], inputs: &[f64], transients: &[f64]) -> f64 {
        match self {
            ResolvedExpr::Number(n) => *n,
            ResolvedExpr::Slot(SlotRef::State(i)) => state.get(*i).copied().unwrap_or(0.0),
            ResolvedExpr::Slot(SlotRef::Input(i)) => inputs.get(*i).copied().unwrap_or(0.0),
            ResolvedExpr::Slot(SlotRef::Transient(i)) => {
                transients.get(*i).copied().unwrap_or(0.0)
            }
            ResolvedExpr::Unary { op: UnaryOp::Neg, operand } => {
                -operand.eval(state, inputs, transients)
            }
            ResolvedExpr::Binary { op, lhs, rhs } => {
                let l = lhs.eval(state, inputs, transients);
                let r = rhs.eval(state, inputs, transients);
                match op {
                    BinOp::Add => l + r,
                    BinOp::Sub => l - r,
                    BinOp::Mul => l * r,
                    BinOp::Div => l / r,
                    BinOp::Pow => l.powf(r),
                }
            }
            ResolvedExpr::Call { func, arg } => func.apply(arg.eval(state, inputs, transients)),
        }
    }
}

/// The lexical scope of one node during synthesis.
///
/// Owned parameters shadow function results, which shadow input ports.
#[derive(Debug, Default)]
pub struct ScopeTable {
    state: HashMap<String, usize>,
    transients: HashMap<String, usize>,
    inputs: HashMap<String, usize>,
}

impl ScopeTable {
    pub fn bind_state(&mut self, id: &str, slot: usize) {
        self.state.insert(id.to_string(), slot);
    }

    pub fn bind_transient(&mut self, id: &str, slot: usize) {
        self.transients.insert(id.to_string(), slot);
    }

    pub fn bind_input(&mut self, id: &str, slot: usize) {
        self.inputs.insert(id.to_string(), slot);
    }

    pub fn lookup(&self, name: &str) -> Option<SlotRef> {
        if let Some(&slot) = self.state.get(name) {
            return Some(SlotRef::State(slot));
        }
        if let Some(&slot) = self.transients.get(name) {
            return Some(SlotRef::Transient(slot));
        }
        if let Some(&slot) = self.inputs.get(name) {
            return Some(SlotRef::Input(slot));
        }
        None
    }

    pub fn state_slot(&self, name: &str) -> Option<usize> {
        self.state.get(name).copied()
    }
}

/// Parses `source` in the context of `node_id`, wrapping parse failures.
pub fn parse_for_node(node_id: &str, source: &str) -> Result<Expr, CompileError> {
    expr::parse(source).map_err(|source_err| CompileError::Expression {
        node_id: node_id.to_string(),
        expression: source.to_string(),
        source: source_err,
    })
}

/// Binds a function's named arguments into its registry template.
///
/// Each placeholder identifier in the template is replaced by the parsed
/// argument expression bound to it. The result is fully concrete except for
/// the identifiers the argument expressions themselves carry, which scope
/// resolution settles next.
pub fn bind_arguments(
    node_id: &str,
    def: &FunctionDef,
    args: &BTreeMap<String, String>,
) -> Result<Expr, CompileError> {
    let mut bindings = HashMap::with_capacity(args.len());
    for (placeholder, argument) in args {
        bindings.insert(placeholder.clone(), parse_for_node(node_id, argument)?);
    }
    Ok(def.template().substitute(&bindings))
}

/// Resolves every identifier in `expr` against the node's scope table.
pub fn resolve_scope(
    node_id: &str,
    expr: &Expr,
    scope: &ScopeTable,
) -> Result<ResolvedExpr, CompileError> {
    match expr {
        Expr::Number(n) => Ok(ResolvedExpr::Number(*n)),
        Expr::Ident(name) => match scope.lookup(name) {
            Some(slot) => Ok(ResolvedExpr::Slot(slot)),
            None => Err(CompileError::UnresolvedReference {
                node_id: node_id.to_string(),
                identifier: name.clone(),
            }),
        },
        Expr::Unary { op, operand } => Ok(ResolvedExpr::Unary {
            op: *op,
            operand: Box::new(resolve_scope(node_id, operand, scope)?),
        }),
        Expr::Binary { op, lhs, rhs } => Ok(ResolvedExpr::Binary {
            op: *op,
            lhs: Box::new(resolve_scope(node_id, lhs, scope)?),
            rhs: Box::new(resolve_scope(node_id, rhs, scope)?),
        }),
        Expr::Call { func, arg } => Ok(ResolvedExpr::Call {
            func: *func,
            arg: Box::new(resolve_scope(node_id, arg, scope)?),
        }),
    }
}
