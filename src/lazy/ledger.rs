//! Retry counts keyed by image source.

use dashmap::DashMap;

/// Latest retry count per source.
///
/// Each load task counts its own attempts and records the count here after
/// every failure. Entries are removed when the source loads, exhausts its
/// retries, or its load is abandoned, so the map only holds sources with a
/// load in flight.
#[derive(Debug, Default)]
pub struct RetryLedger {
    retries: DashMap<String, u32>,
}

impl RetryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Retries recorded so far (0 if none).
    pub fn retries(&self, source: &str) -> u32 {
        self.retries.get(source).map(|r| *r).unwrap_or(0)
    }

    pub fn record(&self, source: &str, retries: u32) {
        self.retries.insert(source.to_string(), retries);
    }

    pub fn clear(&self, source: &str) {
        self.retries.remove(source);
    }

    pub fn len(&self) -> usize {
        self.retries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.retries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_clears() {
        let ledger = RetryLedger::new();
        assert_eq!(ledger.retries("a.jpg"), 0);
        ledger.record("a.jpg", 1);
        ledger.record("a.jpg", 2);
        ledger.record("b.jpg", 1);
        assert_eq!(ledger.retries("a.jpg"), 2);
        assert_eq!(ledger.retries("b.jpg"), 1);
        assert_eq!(ledger.len(), 2);

        ledger.clear("a.jpg");
        ledger.clear("b.jpg");
        assert!(ledger.is_empty());
        assert_eq!(ledger.retries("a.jpg"), 0);
    }
}
