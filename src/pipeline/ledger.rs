//! Running keyword ledger: the order-of-first-appearance keyword list.
//!
//! Grows monotonically as pages are processed and never shrinks. Duplicates
//! are suppressed by exact string equality after the first insertion — not
//! case-insensitively — so "Alpha" and "alpha" are two entries if the
//! collaborator emits both casings. The finalized ledger is the sole input
//! to the index renderer.

use std::collections::HashSet;

/// Accumulates keywords across pages, deduplicated, in first-seen order.
#[derive(Debug, Default)]
pub struct KeywordLedger {
    entries: Vec<String>,
    seen: HashSet<String>,
}

impl KeywordLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one page's keywords in their page order. Exact-string
    /// duplicates of earlier entries are ignored.
    pub fn record(&mut self, keywords: &[String]) {
        for kw in keywords {
            if self.seen.insert(kw.clone()) {
                self.entries.push(kw.clone());
            }
        }
    }

    /// Entries already recorded, for feeding back into extraction prompts
    /// when previously-seen keywords should be excluded.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consume the ledger into the final ordered keyword list.
    pub fn into_keywords(self) -> Vec<String> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kws(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn preserves_first_seen_order_across_pages() {
        let mut ledger = KeywordLedger::new();
        ledger.record(&kws(&["alpha", "beta"]));
        ledger.record(&kws(&["gamma", "alpha", "delta"]));
        assert_eq!(ledger.into_keywords(), kws(&["alpha", "beta", "gamma", "delta"]));
    }

    #[test]
    fn dedup_is_exact_string_not_case_insensitive() {
        let mut ledger = KeywordLedger::new();
        ledger.record(&kws(&["Alpha"]));
        ledger.record(&kws(&["alpha", "Alpha"]));
        assert_eq!(ledger.into_keywords(), kws(&["Alpha", "alpha"]));
    }

    #[test]
    fn length_is_monotonic() {
        let mut ledger = KeywordLedger::new();
        let mut prev = 0;
        for page in [kws(&["a", "b"]), kws(&["b"]), kws(&[]), kws(&["c", "a"])] {
            ledger.record(&page);
            assert!(ledger.len() >= prev);
            prev = ledger.len();
        }
        assert_eq!(ledger.len(), 3);
    }

    #[test]
    fn empty_ledger() {
        let ledger = KeywordLedger::new();
        assert!(ledger.is_empty());
        assert!(ledger.into_keywords().is_empty());
    }
}
