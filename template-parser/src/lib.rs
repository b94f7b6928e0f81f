//! Parser combinators over fragmented template input.
//!
//! Input is a sequence of static text fragments with one value slot between
//! each neighbouring pair, as produced by a template that interpolates
//! values into markup. Grammars are composed from the primitives in
//! [`primitives`] and the combinators in [`combinators`]; any recognizer can
//! opt into memoization with [`Parser::use_cache`], after which re-parsing
//! the same static template replays the recorded outcomes instead of
//! matching again.

pub mod combinators;
pub mod context;
pub mod error;
mod memo;
pub mod parser;
pub mod primitives;

pub use combinators::{
    any, conditional, defer, optional, recursive, repeat, repeat_delimited, required, sequence,
    Sequence,
};
pub use context::{Checkpoint, ErrorWindow, ParseContext, ParseOptions};
pub use error::ParseError;
pub use memo::TraceKey;
pub use parser::{ExecResult, Match, Parser, ParserId};
pub use primitives::{empty, end, fail, find, next, slot_value, Pattern};
pub use template_common::{Fingerprint, Fragments, Position};
