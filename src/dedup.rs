use std::collections::HashSet;
use std::sync::Mutex;

/// Process-wide set of already-dispatched mints.
///
/// Both ingestion paths (WebSocket and polling) can deliver the same
/// transaction, so admission must be an atomic check-and-insert: exactly
/// one caller observes `true` per distinct mint. Entries are never
/// removed; the set lives for the process lifetime and is not persisted.
#[derive(Debug, Default)]
pub struct SeenMints {
    inner: Mutex<HashSet<String>>,
}

impl SeenMints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `mint` as seen. Returns true exactly once per distinct mint.
    pub fn admit(&self, mint: &str) -> bool {
        // A poisoned lock still holds a consistent set; recover and proceed
        let mut seen = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        seen.insert(mint.to_string())
    }

    /// Number of distinct mints dispatched so far
    pub fn len(&self) -> usize {
        match self.inner.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn admit_is_true_exactly_once() {
        let seen = SeenMints::new();
        assert!(seen.admit("MintA"));
        assert!(!seen.admit("MintA"));
        assert!(seen.admit("MintB"));
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn admit_is_exact_string_match() {
        let seen = SeenMints::new();
        assert!(seen.admit("mint"));
        assert!(seen.admit("Mint"));
    }

    #[test]
    fn concurrent_admit_yields_single_winner() {
        let seen = Arc::new(SeenMints::new());
        let mut handles = Vec::new();
        for _ in 0..16 {
            let seen = Arc::clone(&seen);
            handles.push(std::thread::spawn(move || seen.admit("SameMint")));
        }
        let admitted = handles
            .into_iter()
            .map(|h| h.join().expect("thread panicked"))
            .filter(|admitted| *admitted)
            .count();
        assert_eq!(admitted, 1);
        assert_eq!(seen.len(), 1);
    }
}
