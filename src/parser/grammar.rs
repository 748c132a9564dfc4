//! Snippet parser: header grammar using chumsky, clause parsers by hand

use std::borrow::Cow;

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;
use tracing::debug;

use crate::parser::ast::*;
use crate::parser::lexer::Token;
use crate::ParseError;

/// Parsed header fields
#[derive(Debug, Clone, PartialEq)]
struct Header {
    unique: bool,
    name: String,
    kind: SnippetKind,
}

/// Parse one snippet block into a definition
///
/// A block reads `header : attribute clauses begin pattern clauses end`.
/// Every problem found in the block is reported; the block is rejected as a
/// whole when there is at least one.
///
/// ```
/// use snipgen::parser::{parse_snippet, Pattern};
///
/// let snippet = parse_snippet("entity Node node 0 : color=black; begin set #name# [$ns node]; end").unwrap();
/// assert_eq!(snippet.name(), "Node");
/// assert_eq!(snippet.attributes().len(), 1);
/// assert_eq!(snippet.patterns(), &[Pattern::Literal("set #name# [$ns node]".to_string())]);
/// ```
pub fn parse_snippet(block: &str) -> Result<SnippetDefinition, Vec<ParseError>> {
    let sections = split_sections(block).map_err(|e| vec![e])?;

    debug!(header = %block[sections.header.clone()].trim(), "snippet header");
    debug!(attributes = %block[sections.attributes.clone()].trim(), "snippet attributes");
    debug!(patterns = %block[sections.patterns.clone()].trim(), "snippet patterns");

    let mut errors = Vec::new();

    let header = match parse_header(&block[sections.header.clone()]) {
        Ok(header) => Some(header),
        Err(errs) => {
            errors.extend(errs);
            None
        }
    };

    let mut attributes = Vec::new();
    for (clause, span) in clauses(block, sections.attributes.clone()) {
        match parse_attribute(&clause, span) {
            Ok(attribute) => attributes.push(attribute),
            Err(e) => errors.push(e),
        }
    }

    let mut patterns = Vec::new();
    for (clause, span) in clauses(block, sections.patterns.clone()) {
        match parse_pattern(&clause, span) {
            Ok(pattern) => patterns.push(pattern),
            Err(e) => errors.push(e),
        }
    }

    match header {
        Some(header) if errors.is_empty() => Ok(SnippetDefinition::new(
            header.name,
            header.unique,
            header.kind,
            attributes,
            patterns,
        )),
        _ => Err(errors),
    }
}

/// Byte ranges of the three sections of a block
#[derive(Debug, Clone, PartialEq)]
struct Sections {
    header: Span,
    attributes: Span,
    patterns: Span,
}

fn split_sections(block: &str) -> Result<Sections, ParseError> {
    let eob = block.len()..block.len();

    let colon = block.find(':').ok_or(ParseError::MissingMarker {
        marker: ":",
        span: eob.clone(),
    })?;
    let begin = find_word(block, "begin", colon + 1).ok_or(ParseError::MissingMarker {
        marker: "begin",
        span: eob.clone(),
    })?;
    let body_start = begin + "begin".len();
    let end = rfind_word(block, "end", body_start).ok_or(ParseError::MissingMarker {
        marker: "end",
        span: eob,
    })?;

    Ok(Sections {
        header: 0..colon,
        attributes: colon + 1..begin,
        patterns: body_start..end,
    })
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn is_whole_word(text: &str, at: usize, len: usize) -> bool {
    let bytes = text.as_bytes();
    let before = at == 0 || !is_word_byte(bytes[at - 1]);
    let after = at + len >= bytes.len() || !is_word_byte(bytes[at + len]);
    before && after
}

/// First whole-word occurrence of `word` at or after `from`
pub(crate) fn find_word(text: &str, word: &str, from: usize) -> Option<usize> {
    let haystack = text.get(from..)?;
    haystack
        .match_indices(word)
        .map(|(i, _)| from + i)
        .find(|&at| is_whole_word(text, at, word.len()))
}

/// Last whole-word occurrence of `word` at or after `from`
pub(crate) fn rfind_word(text: &str, word: &str, from: usize) -> Option<usize> {
    let haystack = text.get(from..)?;
    haystack
        .rmatch_indices(word)
        .map(|(i, _)| from + i)
        .find(|&at| is_whole_word(text, at, word.len()))
}

/// Split a section on `;`, yielding trimmed non-empty clauses with their spans
///
/// A trailing clause without a closing `;` still counts. A clause continued
/// over several lines is rejoined with the line breaks dropped, so a command
/// split inside `[...]` stays on one output line.
fn clauses(block: &str, section: Span) -> impl Iterator<Item = (Cow<'_, str>, Span)> + '_ {
    let text = &block[section.clone()];
    let mut offset = section.start;
    text.split(';').filter_map(move |raw| {
        let start = offset;
        offset += raw.len() + 1;

        let trimmed = raw.trim_start();
        let lead = raw.len() - trimmed.len();
        let trimmed = trimmed.trim_end();
        if trimmed.is_empty() {
            return None;
        }
        let span = start + lead..start + lead + trimmed.len();
        if trimmed.contains(['\n', '\r']) {
            let joined: String = trimmed.chars().filter(|c| !matches!(c, '\n' | '\r')).collect();
            Some((Cow::Owned(joined), span))
        } else {
            Some((Cow::Borrowed(trimmed), span))
        }
    })
}

/// Parse `name[=default][:options]`
///
/// When `:` comes before `=`, the `=` belongs to the options text.
fn parse_attribute(clause: &str, span: Span) -> Result<AttributeDefinition, ParseError> {
    let eq = clause.find('=');
    let colon = clause.find(':');

    let (name, default, options) = match (eq, colon) {
        (Some(e), Some(c)) if e < c => (
            &clause[..e],
            Some(clause[e + 1..c].trim()),
            Some(&clause[c + 1..]),
        ),
        (Some(e), None) => (&clause[..e], Some(clause[e + 1..].trim()), None),
        (_, Some(c)) => (&clause[..c], None, Some(&clause[c + 1..])),
        (None, None) => (clause, None, None),
    };

    let name = name.trim();
    if name.is_empty() {
        return Err(ParseError::attribute(span, "attribute name is empty"));
    }
    if name.contains(char::is_whitespace) {
        return Err(ParseError::attribute(
            span,
            format!("attribute name '{}' contains whitespace", name),
        ));
    }

    Ok(AttributeDefinition::new(
        name,
        default.map(str::to_string),
        options.map(str::to_string),
    ))
}

/// Parse a literal pattern or `?attribute=value:pattern:alternative`
fn parse_pattern(clause: &str, span: Span) -> Result<Pattern, ParseError> {
    let Some(rest) = clause.strip_prefix('?') else {
        return Ok(Pattern::Literal(clause.to_string()));
    };

    let eq = rest
        .find('=')
        .ok_or_else(|| ParseError::pattern(span.clone(), "conditional pattern has no '='"))?;
    let first = rest[eq + 1..]
        .find(':')
        .map(|i| eq + 1 + i)
        .ok_or_else(|| ParseError::pattern(span.clone(), "conditional pattern has no ':'"))?;
    let second = rest[first + 1..]
        .find(':')
        .map(|i| first + 1 + i)
        .ok_or_else(|| {
            ParseError::pattern(span.clone(), "conditional pattern has no alternative")
        })?;

    let attribute = rest[..eq].trim();
    if attribute.is_empty() {
        return Err(ParseError::pattern(span, "conditional pattern has no attribute"));
    }

    Ok(Pattern::Conditional {
        attribute: attribute.to_string(),
        value: rest[eq + 1..first].trim().to_string(),
        pattern: rest[first + 1..second].to_string(),
        alternative: rest[second + 1..].to_string(),
    })
}

/// Parse the header text (everything before the first `:`)
fn parse_header(input: &str) -> Result<Header, Vec<ParseError>> {
    let len = input.len();

    let token_iter = crate::parser::lexer::lex(input).map(|(tok, span)| (tok, span.into()));

    let token_stream = Stream::from_iter(token_iter)
        // Split (Token, SimpleSpan) into token and span parts
        .map((len..len).into(), |(t, s): (_, _)| (t, s));

    header_parser()
        .parse(token_stream)
        .into_result()
        .map_err(|errs| errs.into_iter().map(|e| e.into()).collect())
}

fn header_parser<'a, I>() -> impl Parser<'a, I, Header, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    // Names and categories are free text; an all-digit one lexes as an integer
    let word = select! {
        Token::Word(s) => s,
        Token::Integer(n) => n.to_string(),
    };

    let integer = select! {
        Token::Integer(n) => n,
    };

    let bang = just(Token::Bang).or_not().map(|b| b.is_some());

    // `[!]category`, the bang making the endpoint base-unique
    let endpoint = bang.clone().then(word.clone());

    let style = integer
        .clone()
        .then(integer.clone())
        .then(integer.clone())
        .then(integer.clone())
        .map(|(((base_style, line_style), line_width), end_style)| LineStyle {
            base_style,
            line_style,
            line_width,
            end_style,
        });

    let relation_fields = endpoint
        .clone()
        .then(endpoint)
        .then(style)
        .map(|(((from_unique, from_base), (to_unique, to_base)), style)| {
            SnippetKind::Relation(RelationInfo {
                from_base,
                to_base,
                from_base_unique: from_unique,
                to_base_unique: to_unique,
                style,
            })
        });

    // Older libraries carry one extra class word before the name
    let relation_body = choice((
        word.clone()
            .ignore_then(word.clone())
            .then(relation_fields.clone())
            .then_ignore(end()),
        word.clone().then(relation_fields).then_ignore(end()),
    ));

    let entity_fields = word
        .clone()
        .then(integer)
        .map(|(base, icon)| SnippetKind::Entity(EntityInfo { base, icon }));

    let entity_body = choice((
        word.clone()
            .ignore_then(word.clone())
            .then(entity_fields.clone())
            .then_ignore(end()),
        word.clone().then(entity_fields).then_ignore(end()),
    ));

    let relation = bang
        .clone()
        .then_ignore(just(Token::Relation))
        .then(relation_body);

    // Any kind word other than `relation` declares an entity
    let entity = bang.then_ignore(word).then(entity_body);

    choice((relation, entity)).map(|(unique, (name, kind))| Header { unique, name, kind })
}
