//! Inline tag substitution

use thiserror::Error;

/// An opening separator with no closing partner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unterminated inline tag opened at byte {position}")]
pub struct UnterminatedTag {
    pub position: usize,
}

/// Replace every `sep tag sep` in `pattern` with `resolve(tag)`
///
/// Literal text is copied unchanged. Fails as a whole when a tag is left
/// open, so callers never see partial output.
pub fn expand<F>(pattern: &str, separator: char, mut resolve: F) -> Result<String, UnterminatedTag>
where
    F: FnMut(&str) -> String,
{
    let width = separator.len_utf8();
    let mut out = String::with_capacity(pattern.len());
    let mut rest = pattern;
    let mut consumed = 0;

    while let Some(open) = rest.find(separator) {
        out.push_str(&rest[..open]);
        let tag_start = open + width;
        let close = rest[tag_start..]
            .find(separator)
            .ok_or(UnterminatedTag {
                position: consumed + open,
            })?;
        out.push_str(&resolve(&rest[tag_start..tag_start + close]));

        let advance = tag_start + close + width;
        consumed += advance;
        rest = &rest[advance..];
    }

    out.push_str(rest);
    Ok(out)
}
