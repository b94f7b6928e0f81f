use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Identity of a static template.
///
/// Two fragment sequences share a fingerprint exactly when their fragment
/// texts are equal; interpolated values never take part. The hash is
/// computed once up front, and equality falls back to comparing contents
/// so that a hash collision can never make two templates share cache
/// entries.
#[derive(Clone)]
pub struct Fingerprint {
    hash: u64,
    parts: Arc<[Arc<str>]>,
}

impl Fingerprint {
    pub(crate) fn of(parts: Arc<[Arc<str>]>) -> Self {
        let mut hasher = FxHasher::default();
        parts.len().hash(&mut hasher);
        for part in parts.iter() {
            // Length prefix keeps ["ab", "c"] and ["a", "bc"] apart.
            part.len().hash(&mut hasher);
            hasher.write(part.as_bytes());
        }
        Self {
            hash: hasher.finish(),
            parts,
        }
    }

    /// Returns the precomputed hash.
    pub fn hash_value(&self) -> u64 {
        self.hash
    }
}

impl PartialEq for Fingerprint {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
            && (Arc::ptr_eq(&self.parts, &other.parts) || self.parts == other.parts)
    }
}

impl Eq for Fingerprint {}

impl Hash for Fingerprint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

impl std::fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fingerprint")
            .field("hash", &format_args!("{:016x}", self.hash))
            .field("fragments", &self.parts.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::Fragments;

    #[test]
    fn test_same_fragments_same_fingerprint() {
        let first = Fragments::from(["<div style=", " id=\"a\">", "</div>"]);
        let second = Fragments::from(["<div style=", " id=\"a\">", "</div>"]);
        assert_eq!(first.fingerprint(), second.fingerprint());
        assert_eq!(
            first.fingerprint().hash_value(),
            second.fingerprint().hash_value()
        );
    }

    #[test]
    fn test_split_point_changes_fingerprint() {
        let first = Fragments::from(["ab", "c"]);
        let second = Fragments::from(["a", "bc"]);
        assert_ne!(first.fingerprint(), second.fingerprint());
    }

    #[test]
    fn test_fragment_count_changes_fingerprint() {
        let first = Fragments::from(["a"]);
        let second = Fragments::from(["a", ""]);
        assert_ne!(first.fingerprint(), second.fingerprint());
    }
}
