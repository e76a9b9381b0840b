use rustc_hash::FxHashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// Deduplicated collection of link-like strings discovered during one run.
///
/// Entries are kept exactly as matched; no case folding, decoding or
/// path canonicalization happens here.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MatchSet {
    entries: FxHashSet<String>,
}

impl MatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: FxHashSet::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// Insert a match, returning `false` if it was already present.
    pub fn insert(&mut self, entry: impl Into<String>) -> bool {
        self.entries.insert(entry.into())
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.entries.contains(entry)
    }

    /// Union `other` into `self`. Merging the same set twice is a no-op.
    pub fn merge(&mut self, other: MatchSet) {
        if self.entries.is_empty() {
            self.entries = other.entries;
        } else {
            self.entries.extend(other.entries);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Entries in lexicographic order, for stable output.
    pub fn sorted(&self) -> Vec<&str> {
        let mut entries: Vec<&str> = self.iter().collect();
        entries.sort_unstable();
        entries
    }
}

impl IntoIterator for MatchSet {
    type Item = String;
    type IntoIter = std::collections::hash_set::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<S: Into<String>> FromIterator<S> for MatchSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<S: Into<String>> Extend<S> for MatchSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.entries.extend(iter.into_iter().map(Into::into));
    }
}

/// Cloneable, synchronized handle onto a [`MatchSet`].
///
/// Concurrent interceptor handlers merge through this handle; the lock is
/// held only for the duration of a single union.
#[derive(Debug, Default, Clone)]
pub struct SharedMatchSet {
    inner: Arc<Mutex<MatchSet>>,
}

impl SharedMatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge(&self, matches: MatchSet) {
        if matches.is_empty() {
            return;
        }
        // A panicking merger cannot leave the set half-updated, so a poisoned
        // lock is still safe to use.
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        guard.merge(matches);
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of the current contents.
    pub fn snapshot(&self) -> MatchSet {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Take the accumulated matches out, leaving the shared set empty.
    pub fn take(&self) -> MatchSet {
        std::mem::take(&mut *self.inner.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

/// Where a payload came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provenance {
    File(PathBuf),
    Url(String),
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::File(path) => write!(f, "{}", path.display()),
            Provenance::Url(url) => write!(f, "{url}"),
        }
    }
}

/// A blob of text to run the extraction rule over, tagged with its origin.
///
/// Payloads are immutable and consumed by value when matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentPayload {
    provenance: Provenance,
    text: String,
}

impl ContentPayload {
    pub fn new(provenance: Provenance, text: String) -> Self {
        Self { provenance, text }
    }

    /// Build a payload from raw bytes; invalid UTF-8 is replaced, not rejected.
    pub fn from_bytes(provenance: Provenance, bytes: &[u8]) -> Self {
        Self::new(provenance, String::from_utf8_lossy(bytes).into_owned())
    }

    pub fn from_file(path: &Path, bytes: &[u8]) -> Self {
        Self::from_bytes(Provenance::File(path.to_path_buf()), bytes)
    }

    pub fn from_url(url: &str, text: String) -> Self {
        Self::new(Provenance::Url(url.to_string()), text)
    }

    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_parts(self) -> (Provenance, String) {
        (self.provenance, self.text)
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;

    #[test]
    fn test_match_set__insert_deduplicates() {
        let mut set = MatchSet::new();

        assert!(set.insert("/api/v1"));
        assert!(!set.insert("/api/v1"));
        assert!(set.insert("/api/v2"));

        assert_eq!(set.len(), 2);
        assert!(set.contains("/api/v1"));
        assert!(!set.contains("/api/v3"));
    }

    #[test]
    fn test_match_set__merge_is_idempotent() {
        let mut base: MatchSet = ["a.js", "b.js"].into_iter().collect();
        let other: MatchSet = ["b.js", "c.js"].into_iter().collect();

        base.merge(other.clone());
        let once = base.clone();
        base.merge(other);

        assert_eq!(base, once);
        assert_eq!(base.len(), 3);
    }

    #[test]
    fn test_match_set__merge_into_empty() {
        let mut base = MatchSet::new();
        base.merge(["x.php"].into_iter().collect());

        assert_eq!(base.sorted(), vec!["x.php"]);
    }

    #[test]
    fn test_match_set__sorted() {
        let set: MatchSet = ["/b", "/a", "https://c.com"].into_iter().collect();
        assert_eq!(set.sorted(), vec!["/a", "/b", "https://c.com"]);
    }

    #[test]
    fn test_shared_match_set__clones_share_state() {
        let shared = SharedMatchSet::new();
        let clone = shared.clone();

        clone.merge(["/one"].into_iter().collect());
        shared.merge(["/one", "/two"].into_iter().collect());

        assert_eq!(shared.len(), 2);
        assert_eq!(clone.snapshot().len(), 2);
    }

    #[test]
    fn test_shared_match_set__concurrent_merges_keep_every_entry() {
        let shared = SharedMatchSet::new();
        let mut handles = vec![];

        for thread in 0..8 {
            let shared = shared.clone();
            handles.push(std::thread::spawn(move || {
                for i in 0..100 {
                    let mut set = MatchSet::new();
                    set.insert(format!("/t{thread}/{i}"));
                    set.insert("/common");
                    shared.merge(set);
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(shared.len(), 8 * 100 + 1);
    }

    #[test]
    fn test_shared_match_set__take_empties() {
        let shared = SharedMatchSet::new();
        shared.merge(["/x"].into_iter().collect());

        let taken = shared.take();

        assert_eq!(taken.len(), 1);
        assert!(shared.is_empty());
    }

    #[test]
    fn test_content_payload__lossy_decoding() {
        let payload = ContentPayload::from_bytes(
            Provenance::Url("https://example.com".to_string()),
            b"\"/ok\" \xff\xfe",
        );

        assert!(payload.text().starts_with("\"/ok\""));
        assert_eq!(payload.provenance().to_string(), "https://example.com");
    }

    #[test]
    fn test_provenance_display() {
        let file = Provenance::File(PathBuf::from("src/app.js"));
        assert_eq!(file.to_string(), "src/app.js");
    }
}
