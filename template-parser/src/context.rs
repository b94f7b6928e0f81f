use crate::memo::MemoSession;
use template_common::Fragments;

/// How much surrounding text a fatal error quotes, in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorWindow {
    /// Characters kept before the failure point.
    pub before: usize,
    /// Characters kept after the offending character.
    pub after: usize,
}

impl ErrorWindow {
    pub fn new(before: usize, after: usize) -> Self {
        Self { before, after }
    }
}

impl Default for ErrorWindow {
    fn default() -> Self {
        Self {
            before: 20,
            after: 4,
        }
    }
}

/// Per-call parse configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Whether cache-enabled recognizers may record and replay traces.
    /// Turning this off leaves previously recorded traces untouched.
    pub cache: bool,
    /// Context quoted by fatal errors.
    pub error_window: ErrorWindow,
}

impl ParseOptions {
    /// Options with memoization bypassed for this call.
    pub fn uncached() -> Self {
        Self::default().with_cache(false)
    }

    pub fn with_cache(mut self, cache: bool) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_error_window(mut self, error_window: ErrorWindow) -> Self {
        self.error_window = error_window;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            cache: true,
            error_window: ErrorWindow::default(),
        }
    }
}

/// A saved value of the memo ordinal counter.
///
/// Cache-enabled recognizers take one when they reserve their ordinal and
/// restore the counter to just past it once they have recorded, which drops
/// whatever their descendants reserved in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Checkpoint {
    ordinal: usize,
}

impl Checkpoint {
    pub(crate) fn new(ordinal: usize) -> Self {
        Self { ordinal }
    }

    /// Returns the ordinal stored in this checkpoint.
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// The checkpoint directly after this one.
    pub(crate) fn next(self) -> Self {
        Self::new(self.ordinal + 1)
    }
}

/// State threaded through every recognizer invocation of one parse call.
///
/// Holds the fragment sequence, the interpolated values and, when the call
/// runs with caching, the memo session owning the ordinal counter. A context
/// built with [`ParseContext::new`] has no memo session, so cache-enabled
/// recognizers behave exactly like their uncached originals.
pub struct ParseContext<'a, V> {
    fragments: &'a Fragments,
    values: &'a [V],
    options: ParseOptions,
    memo: Option<MemoSession>,
}

impl<'a, V> ParseContext<'a, V> {
    /// Creates a context without memoization.
    pub fn new(fragments: &'a Fragments, values: &'a [V]) -> Self {
        Self {
            fragments,
            values,
            options: ParseOptions::default(),
            memo: None,
        }
    }

    /// Replaces the options of this context.
    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    pub(crate) fn with_memo(mut self, memo: Option<MemoSession>) -> Self {
        self.memo = memo;
        self
    }

    pub fn fragments(&self) -> &'a Fragments {
        self.fragments
    }

    pub fn values(&self) -> &'a [V] {
        self.values
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Returns the current memo ordinal, if this parse records or replays.
    pub fn checkpoint(&self) -> Option<Checkpoint> {
        self.memo.as_ref().map(MemoSession::checkpoint)
    }

    pub(crate) fn memo_mut(&mut self) -> Option<&mut MemoSession> {
        self.memo.as_mut()
    }

    /// Ends the call: a matched parse commits its pending trace, anything
    /// else discards it.
    pub(crate) fn finish(self, matched: bool) {
        if let Some(memo) = self.memo {
            memo.finish(matched);
        }
    }
}
