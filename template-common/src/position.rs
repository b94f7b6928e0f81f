/// A cursor over a fragment sequence.
///
/// Positions order lexicographically on `(fragment, offset)`, which is the
/// order in which a parse visits the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    /// Index of the fragment the cursor is in (0-indexed)
    pub fragment: usize,
    /// Byte offset within that fragment
    pub offset: usize,
}

impl Position {
    /// Creates a position with the given coordinates.
    pub fn new(fragment: usize, offset: usize) -> Self {
        Self { fragment, offset }
    }

    /// The position every top-level parse starts from.
    pub fn start() -> Self {
        Self::default()
    }

    /// Returns the position `n` bytes further into the same fragment.
    pub fn advance(self, n: usize) -> Self {
        Self {
            fragment: self.fragment,
            offset: self.offset + n,
        }
    }

    /// Returns the start of the following fragment, i.e. the position just
    /// past the slot that ends the current one.
    pub fn next_fragment(self) -> Self {
        Self {
            fragment: self.fragment + 1,
            offset: 0,
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.fragment, self.offset)
    }
}
