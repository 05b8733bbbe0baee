//! `{{metricId}}` template tokenizer and interpolation (panic-free).
//!
//! Parsing rules:
//! - A placeholder is `{{ident}}`; surrounding whitespace inside the braces is
//!   ignored and `ident` is a non-empty run of ASCII alphanumerics, `_`, `-`
//!   or `.`.
//! - Anything that is not a well-formed placeholder (unterminated `{{`, empty
//!   or malformed identifier) is kept as literal text.
//! - Never index raw bytes; scan with `find` on `&str` only.

use std::borrow::Cow;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// One piece of a tokenized template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    Literal(&'a str),
    Placeholder(&'a str),
}

/// Split `template` into literal and placeholder segments.
///
/// Adjacent literal text is not merged; callers only concatenate.
pub fn tokenize(template: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut rest = template;

    while let Some(start) = rest.find(OPEN) {
        let after_open = &rest[start + OPEN.len()..];
        let Some(end) = after_open.find(CLOSE) else {
            break;
        };

        let inner = &after_open[..end];
        let ident = inner.trim();
        if is_ident(ident) {
            if start > 0 {
                out.push(Segment::Literal(&rest[..start]));
            }
            out.push(Segment::Placeholder(ident));
            rest = &after_open[end + CLOSE.len()..];
        } else {
            // Emit the first brace only so a later `{{` inside this span is rescanned.
            out.push(Segment::Literal(&rest[..start + 1]));
            rest = &rest[start + 1..];
        }
    }

    if !rest.is_empty() {
        out.push(Segment::Literal(rest));
    }
    out
}

/// Placeholder ids referenced by `template`, in order of appearance.
pub fn placeholders(template: &str) -> Vec<&str> {
    tokenize(template)
        .into_iter()
        .filter_map(|s| match s {
            Segment::Placeholder(id) => Some(id),
            Segment::Literal(_) => None,
        })
        .collect()
}

/// Replace every placeholder with `resolve(id)`.
///
/// Templates without placeholders are returned borrowed and unchanged.
pub fn interpolate<'a, F>(template: &'a str, mut resolve: F) -> Cow<'a, str>
where
    F: FnMut(&str) -> String,
{
    let segments = tokenize(template);
    if !segments.iter().any(|s| matches!(s, Segment::Placeholder(_))) {
        return Cow::Borrowed(template);
    }

    let mut out = String::with_capacity(template.len());
    for seg in segments {
        match seg {
            Segment::Literal(text) => out.push_str(text),
            Segment::Placeholder(id) => out.push_str(&resolve(id)),
        }
    }
    Cow::Owned(out)
}

fn is_ident(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}
