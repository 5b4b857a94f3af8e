//! Recursive-descent (Pratt) parser for expression strings.
//!
//! Grammar, loosest to tightest binding:
//!   expr    := term (('+' | '-') term)*
//!   term    := power (('*' | '/') power)*
//!   power   := unary ('^' power)?          (right-associative)
//!   unary   := '-' unary | atom
//!   atom    := NUMBER | IDENT | IDENT '(' expr ')' | '(' expr ')'
//!
//! Calls are restricted to the built-in math set; registry functions are
//! bound by the translator, never called by name inside an expression.

use super::ast::{BinOp, Expr, MathFn, UnaryOp};
use super::lexer::{tokenize, Token};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("unrecognized character at byte {0}")]
    Lex(usize),
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("unexpected token {0:?}")]
    UnexpectedToken(Token),
    #[error("unknown math function '{0}'")]
    UnknownMathFunction(String),
    #[error("expected ')' to close call to '{0}'")]
    UnclosedCall(String),
    #[error("empty expression")]
    Empty,
}

/// Parses an expression string into an [`Expr`].
pub fn parse(source: &str) -> Result<Expr, ParseError> {
    let tokens = tokenize(source).map_err(ParseError::Lex)?;
    if tokens.is_empty() {
        return Err(ParseError::Empty);
    }
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.expr()?;
    match parser.peek() {
        None => Ok(expr),
        Some(tok) => Err(ParseError::UnexpectedToken(tok.clone())),
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn expr(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.term()?;
        while let Some(op) = match self.peek() {
            Some(Token::Plus) => Some(BinOp::Add),
            Some(Token::Minus) => Some(BinOp::Sub),
            _ => None,
        } {
            self.pos += 1;
            let rhs = self.term()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn term(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.power()?;
        while let Some(op) = match self.peek() {
            Some(Token::Star) => Some(BinOp::Mul),
            Some(Token::Slash) => Some(BinOp::Div),
            _ => None,
        } {
            self.pos += 1;
            let rhs = self.power()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn power(&mut self) -> Result<Expr, ParseError> {
        let base = self.unary()?;
        if matches!(self.peek(), Some(Token::Caret)) {
            self.pos += 1;
            // Right-associative: a^b^c parses as a^(b^c).
            let exponent = self.power()?;
            return Ok(Expr::Binary {
                op: BinOp::Pow,
                lhs: Box::new(base),
                rhs: Box::new(exponent),
            });
        }
        Ok(base)
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        if matches!(self.peek(), Some(Token::Minus)) {
            self.pos += 1;
            let operand = self.unary()?;
            return Ok(Expr::Unary {
                op: UnaryOp::Neg,
                operand: Box::new(operand),
            });
        }
        self.atom()
    }

    fn atom(&mut self) -> Result<Expr, ParseError> {
        match self.advance() {
            Some(Token::Number(n)) => Ok(Expr::Number(n)),
            Some(Token::Ident(name)) => {
                if matches!(self.peek(), Some(Token::LParen)) {
                    self.pos += 1;
                    let func = MathFn::from_name(&name)
                        .ok_or_else(|| ParseError::UnknownMathFunction(name.clone()))?;
                    let arg = self.expr()?;
                    match self.advance() {
                        Some(Token::RParen) => Ok(Expr::Call {
                            func,
                            arg: Box::new(arg),
                        }),
                        _ => Err(ParseError::UnclosedCall(name)),
                    }
                } else {
                    Ok(Expr::Ident(name))
                }
            }
            Some(Token::LParen) => {
                let inner = self.expr()?;
                match self.advance() {
                    Some(Token::RParen) => Ok(inner),
                    Some(tok) => Err(ParseError::UnexpectedToken(tok)),
                    None => Err(ParseError::UnexpectedEnd),
                }
            }
            Some(tok) => Err(ParseError::UnexpectedToken(tok)),
            None => Err(ParseError::UnexpectedEnd),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precedence_mul_over_add() {
        let expr = parse("a + b * c").unwrap();
        match expr {
            Expr::Binary { op: BinOp::Add, rhs, .. } => {
                assert!(matches!(*rhs, Expr::Binary { op: BinOp::Mul, .. }));
            }
            other => panic!("expected Add at root, got {:?}", other),
        }
    }

    #[test]
    fn parentheses_override_precedence() {
        let expr = parse("(a + b) * c").unwrap();
        assert!(matches!(expr, Expr::Binary { op: BinOp::Mul, .. }));
    }

    #[test]
    fn power_is_right_associative() {
        let expr = parse("2 ^ 3 ^ 2").unwrap();
        match expr {
            Expr::Binary { op: BinOp::Pow, lhs, rhs } => {
                assert_eq!(*lhs, Expr::Number(2.0));
                assert!(matches!(*rhs, Expr::Binary { op: BinOp::Pow, .. }));
            }
            other => panic!("expected Pow at root, got {:?}", other),
        }
    }

    #[test]
    fn unary_minus() {
        let expr = parse("-x + 1").unwrap();
        assert!(matches!(expr, Expr::Binary { op: BinOp::Add, .. }));
    }

    #[test]
    fn math_call() {
        let expr = parse("tanh(gain * x)").unwrap();
        assert!(matches!(expr, Expr::Call { func: MathFn::Tanh, .. }));
    }

    #[test]
    fn unknown_call_rejected() {
        let err = parse("frobnicate(x)").unwrap_err();
        assert_eq!(err, ParseError::UnknownMathFunction("frobnicate".into()));
    }

    #[test]
    fn trailing_garbage_rejected() {
        assert!(parse("a b").is_err());
    }

    #[test]
    fn empty_expression_rejected() {
        assert_eq!(parse("  ").unwrap_err(), ParseError::Empty);
    }
}
