//! Error types for snippet parsing

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

/// Byte range in snippet source text
pub type Span = std::ops::Range<usize>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Parse error at {span:?}: {message}")]
    Syntax {
        span: Span,
        message: String,
        expected: Vec<String>,
    },

    /// One of the `:` / `begin` / `end` section markers is absent
    #[error("missing '{marker}' marker")]
    MissingMarker { marker: &'static str, span: Span },

    #[error("invalid attribute clause at {span:?}: {message}")]
    Attribute { span: Span, message: String },

    #[error("invalid pattern clause at {span:?}: {message}")]
    Pattern { span: Span, message: String },
}

impl ParseError {
    pub(crate) fn attribute(span: Span, message: impl Into<String>) -> Self {
        ParseError::Attribute {
            span,
            message: message.into(),
        }
    }

    pub(crate) fn pattern(span: Span, message: impl Into<String>) -> Self {
        ParseError::Pattern {
            span,
            message: message.into(),
        }
    }

    /// Byte range of the offending text within the snippet block
    pub fn span(&self) -> Span {
        match self {
            ParseError::Syntax { span, .. }
            | ParseError::MissingMarker { span, .. }
            | ParseError::Attribute { span, .. }
            | ParseError::Pattern { span, .. } => span.clone(),
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let span = self.span();
        let (message, label) = match self {
            ParseError::Syntax {
                message, expected, ..
            } => {
                let expected_str = if expected.is_empty() {
                    String::new()
                } else {
                    format!("\nExpected: {}", expected.join(", "))
                };
                (message.clone(), format!("{}{}", message, expected_str))
            }
            ParseError::MissingMarker { marker, .. } => (
                format!("snippet has no '{}' marker", marker),
                format!("expected '{}' here", marker),
            ),
            ParseError::Attribute { message, .. } | ParseError::Pattern { message, .. } => {
                (message.clone(), message.clone())
            }
        };

        let mut buf = Vec::new();
        let written = Report::build(ReportKind::Error, filename, span.start)
            .with_message(&message)
            .with_label(
                Label::new((filename, span))
                    .with_message(label)
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename, Source::from(source)), &mut buf);
        if written.is_err() {
            return self.to_string();
        }
        String::from_utf8_lossy(&buf).into_owned()
    }
}

impl<'a> From<chumsky::error::Rich<'a, crate::parser::lexer::Token>> for ParseError {
    fn from(err: chumsky::error::Rich<'a, crate::parser::lexer::Token>) -> Self {
        use chumsky::error::RichReason;

        let message = match err.reason() {
            RichReason::ExpectedFound { found, .. } => {
                let found_str = match found {
                    Some(tok) => format_token(tok),
                    None => "end of header".to_string(),
                };
                format!("Unexpected {}", found_str)
            }
            RichReason::Custom(msg) => msg.to_string(),
        };

        let expected: Vec<String> = err
            .expected()
            .filter_map(|e| match e {
                chumsky::error::RichPattern::Token(tok) => Some(format_token(tok)),
                chumsky::error::RichPattern::Label(label) => Some(label.to_string()),
                chumsky::error::RichPattern::EndOfInput => Some("':'".to_string()),
                chumsky::error::RichPattern::Identifier(s) => Some(format!("identifier '{}'", s)),
                chumsky::error::RichPattern::Any => Some("any token".to_string()),
                chumsky::error::RichPattern::SomethingElse => None,
            })
            .collect();

        ParseError::Syntax {
            span: err.span().into_range(),
            message,
            expected,
        }
    }
}

/// Format a header token for human-readable error messages
fn format_token(tok: &crate::parser::lexer::Token) -> String {
    use crate::parser::lexer::Token;
    match tok {
        Token::Bang => "'!'".to_string(),
        Token::Relation => "keyword 'relation'".to_string(),
        Token::Integer(n) => format!("integer {}", n),
        Token::Word(s) => format!("name '{}'", s),
        Token::Invalid(s) => format!("invalid text '{}'", s),
    }
}
