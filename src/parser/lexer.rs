//! Lexer for snippet headers using logos
//!
//! Only the header (the text before the first `:`) is tokenized; attribute
//! and pattern clauses are free text and are split by the clause parsers.

use logos::Logos;

use crate::error::Span;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r]+")]
pub enum Token {
    /// Uniqueness marker in front of the kind or an endpoint category
    #[token("!")]
    Bang,

    #[token("relation")]
    Relation,

    #[regex(r"-?[0-9]+", |lex| lex.slice().parse::<i32>().ok(), priority = 3)]
    Integer(i32),

    /// Any other run of non-blank text, so `Agent/TCP`, `802.11` and `Foo+`
    /// are all plain words
    #[regex(r"[^ \t\n\r!:][^ \t\n\r:]*", |lex| lex.slice().to_string(), priority = 1)]
    Word(String),

    /// Text the lexer could not match; never produced by logos directly
    Invalid(String),
}

/// Lex a header into tokens with spans
///
/// Unrecognized text is kept as [`Token::Invalid`] so the grammar reports it
/// instead of silently skipping it.
pub fn lex(input: &str) -> impl Iterator<Item = (Token, Span)> + '_ {
    Token::lexer(input).spanned().map(move |(tok, span)| match tok {
        Ok(t) => (t, span),
        Err(_) => (Token::Invalid(input[span.clone()].to_string()), span),
    })
}
