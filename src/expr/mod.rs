//! Symbolic expression support: lexing, parsing, and the AST that the
//! compiler rewrites and evaluates.
//!
//! Expressions arrive as strings inside the IR (parameter values, time
//! derivatives, port values, registry templates). They are parsed exactly
//! once, into an [`Expr`] tree; all later rewriting (argument binding, scope
//! resolution) is structural, which makes whole-token identifier matching a
//! non-issue by construction.

pub mod ast;
pub mod lexer;
pub mod parser;

pub use ast::{BinOp, Expr, MathFn, UnaryOp};
pub use parser::{parse, ParseError};
