use crate::fingerprint::Fingerprint;
use crate::Position;
use std::ops::Index;
use std::sync::Arc;

/// The static text of one parse input.
///
/// A fragment sequence of length `N` has `N - 1` slots: one between every
/// pair of neighbouring fragments, each standing for one interpolated value.
/// The sequence keeps its text behind an `Arc` so it can be cloned into
/// fingerprints and moved around without copying.
#[derive(Clone, Debug)]
pub struct Fragments {
    parts: Arc<[Arc<str>]>,
    fingerprint: Fingerprint,
}

impl Fragments {
    /// Creates a fragment sequence from any list of strings.
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let parts: Arc<[Arc<str>]> = parts
            .into_iter()
            .map(|part| Arc::<str>::from(part.as_ref()))
            .collect();
        let fingerprint = Fingerprint::of(Arc::clone(&parts));
        Self { parts, fingerprint }
    }

    /// Returns the number of fragments.
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Returns `true` if there are no fragments at all.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Returns the number of slots between fragments.
    pub fn slot_count(&self) -> usize {
        self.parts.len().saturating_sub(1)
    }

    /// Returns the text of fragment `index`.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.parts.get(index).map(|part| &**part)
    }

    /// Iterates over the fragment texts in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.parts.iter().map(|part| &**part)
    }

    /// Returns the remainder of the current fragment from `pos`.
    ///
    /// `None` if the fragment does not exist or the offset is not a char
    /// boundary inside it.
    pub fn rest(&self, pos: Position) -> Option<&str> {
        self.get(pos.fragment)?.get(pos.offset..)
    }

    /// Returns the character at `pos`, if any.
    pub fn char_at(&self, pos: Position) -> Option<char> {
        self.rest(pos)?.chars().next()
    }

    /// Returns `true` if the current fragment has nothing left at `pos`.
    fn exhausted(&self, pos: Position) -> bool {
        self.get(pos.fragment)
            .map_or(true, |part| pos.offset >= part.len())
    }

    /// Returns `true` if the cursor sits in the gap a value occupies: the
    /// current fragment is exhausted and another fragment follows.
    pub fn is_slot(&self, pos: Position) -> bool {
        self.exhausted(pos) && pos.fragment + 1 < self.parts.len()
    }

    /// Returns `true` if the cursor is at the true end of the input: the
    /// current fragment is exhausted and no fragment follows.
    pub fn is_end(&self, pos: Position) -> bool {
        self.exhausted(pos) && pos.fragment + 1 >= self.parts.len()
    }

    /// Returns the identity of this static template.
    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }
}

impl Index<usize> for Fragments {
    type Output = str;

    fn index(&self, index: usize) -> &Self::Output {
        &self.parts[index]
    }
}

impl PartialEq for Fragments {
    fn eq(&self, other: &Self) -> bool {
        self.fingerprint == other.fingerprint
    }
}

impl Eq for Fragments {}

impl From<&str> for Fragments {
    fn from(value: &str) -> Self {
        Self::new([value])
    }
}

impl From<String> for Fragments {
    fn from(value: String) -> Self {
        Self::new([value])
    }
}

impl From<&String> for Fragments {
    fn from(value: &String) -> Self {
        Self::new([value])
    }
}

impl From<Vec<String>> for Fragments {
    fn from(value: Vec<String>) -> Self {
        Self::new(value)
    }
}

impl From<Vec<&str>> for Fragments {
    fn from(value: Vec<&str>) -> Self {
        Self::new(value)
    }
}

impl From<&[&str]> for Fragments {
    fn from(value: &[&str]) -> Self {
        Self::new(value)
    }
}

impl<const N: usize> From<[&str; N]> for Fragments {
    fn from(value: [&str; N]) -> Self {
        Self::new(value)
    }
}

impl From<&Fragments> for Fragments {
    fn from(value: &Fragments) -> Self {
        value.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_string_is_one_fragment() {
        let fragments = Fragments::from("abc");
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments.slot_count(), 0);
        assert_eq!(&fragments[0], "abc");
    }

    #[test]
    fn test_rest_and_char_at() {
        let fragments = Fragments::from(["ab", "c"]);
        assert_eq!(fragments.rest(Position::new(0, 1)), Some("b"));
        assert_eq!(fragments.char_at(Position::new(1, 0)), Some('c'));
        assert_eq!(fragments.char_at(Position::new(0, 2)), None);
        assert_eq!(fragments.rest(Position::new(5, 0)), None);
    }

    #[test]
    fn test_rest_off_char_boundary() {
        let fragments = Fragments::from("é");
        assert_eq!(fragments.rest(Position::new(0, 1)), None);
    }

    #[test]
    fn test_slot_and_end() {
        let fragments = Fragments::from(["ab", "c"]);
        assert!(fragments.is_slot(Position::new(0, 2)));
        assert!(!fragments.is_end(Position::new(0, 2)));
        assert!(!fragments.is_slot(Position::new(0, 1)));
        assert!(!fragments.is_end(Position::new(0, 1)));
        assert!(fragments.is_end(Position::new(1, 1)));
        assert!(!fragments.is_slot(Position::new(1, 1)));
    }

    #[test]
    fn test_empty_fragment_between_slots() {
        let fragments = Fragments::from(["a", "", "b"]);
        assert!(fragments.is_slot(Position::new(1, 0)));
        assert_eq!(fragments.slot_count(), 2);
    }

    #[test]
    fn test_equal_contents_compare_equal() {
        let left = Fragments::from(vec!["<a ", ">"]);
        let right = Fragments::from(vec!["<a ".to_string(), ">".to_string()]);
        assert_eq!(left, right);
        assert_ne!(left, Fragments::from(vec!["<a", " >"]));
    }
}
