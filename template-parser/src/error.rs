use crate::context::ErrorWindow;
use template_common::{Fragments, Position};
use thiserror::Error;

/// Fatal parse failure.
///
/// Soft failures (a recognizer simply not matching) are never errors; they
/// travel as `Ok(None)` so that alternation and repetition can backtrack.
/// A `ParseError` aborts the whole parse call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A `required` recognizer did not match.
    #[error("unexpected symbol '{before}***{found}***{after}' in fragment {fragment} at offset {offset}")]
    UnexpectedSymbol {
        fragment: usize,
        offset: usize,
        /// Text preceding the failure point, bounded by the error window.
        before: String,
        /// The character at the failure point; empty at the end of a fragment.
        found: String,
        /// Text following the offending character, bounded by the error window.
        after: String,
    },

    /// A recursive recognizer was invoked after the grammar owning it was dropped.
    #[error("recursive recognizer used after its definition was dropped")]
    Unresolved,
}

impl ParseError {
    /// Builds an `UnexpectedSymbol` error for `pos`, cutting a context window
    /// of characters around it.
    pub fn unexpected_symbol(fragments: &Fragments, pos: Position, window: ErrorWindow) -> Self {
        let text = fragments.get(pos.fragment).unwrap_or("");
        let mut offset = pos.offset.min(text.len());
        while !text.is_char_boundary(offset) {
            offset -= 1;
        }

        let head = &text[..offset];
        let skip = head.chars().count().saturating_sub(window.before);
        let before: String = head.chars().skip(skip).collect();

        let mut tail = text[offset..].chars();
        let found = tail.next().map(String::from).unwrap_or_default();
        let after: String = tail.take(window.after).collect();

        ParseError::UnexpectedSymbol {
            fragment: pos.fragment,
            offset: pos.offset,
            before,
            found,
            after,
        }
    }

    /// Returns the position the error points at, if it has one.
    pub fn position(&self) -> Option<Position> {
        match self {
            ParseError::UnexpectedSymbol {
                fragment, offset, ..
            } => Some(Position::new(*fragment, *offset)),
            ParseError::Unresolved => None,
        }
    }
}
