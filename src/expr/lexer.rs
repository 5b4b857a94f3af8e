//! Lexer for IR expression strings.
//!
//! Uses the `logos` crate for DFA-based lexing. The token set is the small
//! arithmetic language IR expressions are written in: numbers, identifiers,
//! the five binary operators, parentheses, and commas.

use logos::Logos;

/// Token types for the expression language.
///
/// Identifiers carry their text; numeric literals carry the parsed value.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum Token {
    /// Numeric literal (int, float, exponent). Unary minus is handled by the
    /// parser so that `a-2` lexes as three tokens.
    #[regex(r"[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?", parse_number)]
    Number(f64),

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("^")]
    Caret,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(",")]
    Comma,
}

fn parse_number(lex: &mut logos::Lexer<Token>) -> Option<f64> {
    lex.slice().parse().ok()
}

/// Lex an expression string into tokens.
///
/// Returns the byte offset of the first unrecognized character on failure.
pub fn tokenize(source: &str) -> Result<Vec<Token>, usize> {
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer(source);
    while let Some(result) = lexer.next() {
        match result {
            Ok(token) => tokens.push(token),
            Err(()) => return Err(lexer.span().start),
        }
    }
    Ok(tokens)
}
