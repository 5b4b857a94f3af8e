//! The expression AST and its structural rewriting operations.

use std::collections::{HashMap, HashSet};

/// Binary arithmetic operators, in the order the parser binds them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
}

/// Built-in math functions callable from expressions.
///
/// These are evaluation primitives, distinct from registry functions: a
/// registry function is a named expression template bound at compile time,
/// while these are the numeric calls a template may itself contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathFn {
    Sin,
    Cos,
    Tan,
    Tanh,
    Exp,
    Ln,
    Sqrt,
    Abs,
}

impl MathFn {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sin" => Some(MathFn::Sin),
            "cos" => Some(MathFn::Cos),
            "tan" => Some(MathFn::Tan),
            "tanh" => Some(MathFn::Tanh),
            "exp" => Some(MathFn::Exp),
            "ln" | "log" => Some(MathFn::Ln),
            "sqrt" => Some(MathFn::Sqrt),
            "abs" => Some(MathFn::Abs),
            _ => None,
        }
    }

    pub fn apply(self, x: f64) -> f64 {
        match self {
            MathFn::Sin => x.sin(),
            MathFn::Cos => x.cos(),
            MathFn::Tan => x.tan(),
            MathFn::Tanh => x.tanh(),
            MathFn::Exp => x.exp(),
            MathFn::Ln => x.ln(),
            MathFn::Sqrt => x.sqrt(),
            MathFn::Abs => x.abs(),
        }
    }
}

/// A parsed expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Ident(String),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Call {
        func: MathFn,
        arg: Box<Expr>,
    },
}

impl Expr {
    /// Collects every identifier referenced by this expression.
    ///
    /// Math function names are not identifiers; `sin(x)` contributes only `x`.
    pub fn identifiers(&self) -> HashSet<&str> {
        let mut out = HashSet::new();
        self.collect_identifiers(&mut out);
        out
    }

    fn collect_identifiers<'a>(&'a self, out: &mut HashSet<&'a str>) {
        match self {
            Expr::Number(_) => {}
            Expr::Ident(name) => {
                out.insert(name.as_str());
            }
            Expr::Unary { operand, .. } => operand.collect_identifiers(out),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.collect_identifiers(out);
                rhs.collect_identifiers(out);
            }
            Expr::Call { arg, .. } => arg.collect_identifiers(out),
        }
    }

    /// Whether the expression references `name` as a whole identifier.
    pub fn references(&self, name: &str) -> bool {
        self.identifiers().contains(name)
    }

    /// Replaces identifiers per `bindings`, leaving unmapped identifiers
    /// untouched. Substitution is structural: only complete identifiers
    /// match, so a binding for `w` never touches `weight`.
    pub fn substitute(&self, bindings: &HashMap<String, Expr>) -> Expr {
        match self {
            Expr::Number(n) => Expr::Number(*n),
            Expr::Ident(name) => match bindings.get(name) {
                Some(replacement) => replacement.clone(),
                None => Expr::Ident(name.clone()),
            },
            Expr::Unary { op, operand } => Expr::Unary {
                op: *op,
                operand: Box::new(operand.substitute(bindings)),
            },
            Expr::Binary { op, lhs, rhs } => Expr::Binary {
                op: *op,
                lhs: Box::new(lhs.substitute(bindings)),
                rhs: Box::new(rhs.substitute(bindings)),
            },
            Expr::Call { func, arg } => Expr::Call {
                func: *func,
                arg: Box::new(arg.substitute(bindings)),
            },
        }
    }
}
