//! Leaf recognizers over fragment text and slots.

use crate::parser::{Match, Parser};
use regex::Regex;

/// What [`find`] looks for.
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Matches when the fragment text continues with exactly this string.
    Literal(String),
    /// Matches when the regex matches starting exactly at the cursor.
    Regex(Regex),
}

impl From<&str> for Pattern {
    fn from(value: &str) -> Self {
        Pattern::Literal(value.to_string())
    }
}

impl From<String> for Pattern {
    fn from(value: String) -> Self {
        Pattern::Literal(value)
    }
}

impl From<Regex> for Pattern {
    fn from(value: Regex) -> Self {
        Pattern::Regex(anchored(&value).unwrap_or(value))
    }
}

impl From<&Regex> for Pattern {
    fn from(value: &Regex) -> Self {
        Pattern::Regex(anchored(value).unwrap_or_else(|| value.clone()))
    }
}

/// Pins `regex` to the start of the searched text, so a failed attempt does
/// not scan the rest of the fragment. `\A` ignores multi-line mode.
fn anchored(regex: &Regex) -> Option<Regex> {
    Regex::new(&format!(r"\A(?:{})", regex.as_str())).ok()
}

impl Pattern {
    /// Returns the length of the match at the start of `text`, if any.
    fn match_len(&self, text: &str) -> Option<usize> {
        match self {
            Pattern::Literal(literal) => {
                text.starts_with(literal.as_str()).then_some(literal.len())
            }
            // The leftmost match must begin at the cursor; a match further
            // into the fragment does not count.
            Pattern::Regex(regex) => regex
                .find(text)
                .filter(|found| found.start() == 0)
                .map(|found| found.end()),
        }
    }
}

/// Matches a literal or regex at the cursor, yielding the matched text.
///
/// Matches never extend past the end of the current fragment.
pub fn find<V: 'static>(pattern: impl Into<Pattern>) -> Parser<String, V> {
    let pattern = pattern.into();
    Parser::new(move |ctx, pos| {
        let Some(rest) = ctx.fragments().rest(pos) else {
            return Ok(None);
        };
        Ok(pattern
            .match_len(rest)
            .map(|len| Match::new(rest[..len].to_string(), pos.advance(len))))
    })
}

/// Consumes one slot, yielding its ordinal (the index into the values).
///
/// Only matches with the cursor at the very end of a fragment that has a
/// successor; the end position is the start of that successor.
pub fn next<V: 'static>() -> Parser<usize, V> {
    Parser::new(|ctx, pos| {
        Ok(ctx
            .fragments()
            .is_slot(pos)
            .then(|| Match::new(pos.fragment, pos.next_fragment())))
    })
}

/// Matches at the end of the last fragment, yielding its index. Zero width.
pub fn end<V: 'static>() -> Parser<usize, V> {
    Parser::new(|ctx, pos| {
        Ok(ctx
            .fragments()
            .is_end(pos)
            .then(|| Match::new(pos.fragment, pos)))
    })
}

/// Consumes one slot, yielding a clone of the value occupying it, or `None`
/// when the call supplied fewer values than the template has slots.
///
/// Like any transform, a value picked up here is frozen into the trace when
/// this recognizer sits under a cache-enabled one.
pub fn slot_value<V: Clone + 'static>() -> Parser<Option<V>, V> {
    next().then(|index, values: &[V]| values.get(index).cloned())
}

/// Never matches.
pub fn fail<T: 'static, V: 'static>() -> Parser<T, V> {
    Parser::new(|_, _| Ok(None))
}

/// Always matches without consuming anything.
pub fn empty<V: 'static>() -> Parser<(), V> {
    Parser::new(|_, pos| Ok(Some(Match::new((), pos))))
}
