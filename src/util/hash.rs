//! Hashing utilities for configuration fingerprints.

use sha2::{Digest, Sha256};

/// A hasher for building fingerprints from multiple components.
#[derive(Default)]
pub struct Fingerprint {
    hasher: Sha256,
}

impl Fingerprint {
    pub fn new() -> Self {
        Fingerprint {
            hasher: Sha256::new(),
        }
    }

    /// Add a string component to the fingerprint.
    pub fn update_str(&mut self, s: &str) -> &mut Self {
        self.hasher.update(s.as_bytes());
        self.hasher.update(b"\0"); // Separator
        self
    }

    /// Add multiple strings to the fingerprint.
    pub fn update_strs<'a>(&mut self, items: impl IntoIterator<Item = &'a str>) -> &mut Self {
        for s in items {
            self.update_str(s);
        }
        self
    }

    /// Add a labelled section so adjacent lists cannot run into each other.
    pub fn section(&mut self, name: &str) -> &mut Self {
        self.hasher.update(b"\x1e");
        self.update_str(name)
    }

    /// Finalize and return the fingerprint as a hex string.
    pub fn finish(self) -> String {
        hex::encode(self.hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_fingerprint() {
        assert_eq!(
            Fingerprint::new().finish(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_fingerprint() {
        let fp = |parts: &[&str]| {
            let mut fp = Fingerprint::new();
            fp.update_strs(parts.iter().copied());
            fp.finish()
        };

        assert_eq!(fp(&["hello", "world"]), fp(&["hello", "world"]));
        assert_ne!(fp(&["hello", "world"]), fp(&["hello", "different"]));
        assert_ne!(fp(&["ab", "c"]), fp(&["a", "bc"]));
    }

    #[test]
    fn test_sections_separate_lists() {
        let mut a = Fingerprint::new();
        a.section("requires").update_str("x").section("options");
        let mut b = Fingerprint::new();
        b.section("requires").section("options").update_str("x");
        assert_ne!(a.finish(), b.finish());
    }
}
