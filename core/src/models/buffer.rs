//! Bounded admission buffer.
//!
//! An ordered, capacity-bounded queue of transactions. Removal by source is
//! a stable filter: the relative order of everything left behind is
//! preserved. That property is load-bearing for fairness between sources
//! sharing the buffer and is exercised directly in `tests` below and in
//! the crate's `proptest` suite.

use std::collections::HashSet;

use crate::models::transaction::Transaction;

/// Bounded, FIFO-preserving buffer of pending transactions.
#[derive(Debug, Clone)]
pub struct Buffer {
    capacity: usize,
    queue: Vec<Transaction>,
}

impl Buffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            queue: Vec::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.queue.len() >= self.capacity
    }

    /// Append `txn` if there's room. Returns whether it was admitted.
    pub fn add(&mut self, txn: Transaction) -> bool {
        if self.is_full() {
            return false;
        }
        self.queue.push(txn);
        true
    }

    /// Non-consuming view of the transactions from `source_id`, in queue
    /// order.
    pub fn get_by_source(&self, source_id: &str) -> Vec<&Transaction> {
        self.queue.iter().filter(|t| t.source_id() == source_id).collect()
    }

    /// Remove and return every transaction from `source_id`, preserving
    /// the relative order of both the removed group and the remainder.
    pub fn remove_by_source(&mut self, source_id: &str) -> Vec<Transaction> {
        let mut removed = Vec::new();
        let mut remaining = Vec::with_capacity(self.queue.len());
        for txn in self.queue.drain(..) {
            if txn.source_id() == source_id {
                removed.push(txn);
            } else {
                remaining.push(txn);
            }
        }
        self.queue = remaining;
        removed
    }

    /// The set of distinct source_ids currently present.
    pub fn sources(&self) -> HashSet<&str> {
        self.queue.iter().map(Transaction::source_id).collect()
    }

    /// Non-consuming view of every buffered transaction, in queue order.
    pub fn transactions(&self) -> &[Transaction] {
        &self.queue
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn arb_source() -> impl Strategy<Value = String> {
        prop::sample::select(vec!["a".to_string(), "b".to_string(), "c".to_string()])
    }

    proptest! {
        #[test]
        fn remove_by_source_never_reorders_the_remainder(
            sources in prop::collection::vec(arb_source(), 0..40)
        ) {
            let mut buf = Buffer::new(sources.len().max(1));
            for (i, s) in sources.iter().enumerate() {
                buf.add(Transaction::new(format!("{}_{}", s, i), s.clone(), i as f64, 100.0));
            }

            let before: Vec<String> = buf
                .queue
                .iter()
                .filter(|t| t.source_id() != "a")
                .map(|t| t.id().to_string())
                .collect();

            buf.remove_by_source("a");

            let after: Vec<String> = buf.queue.iter().map(|t| t.id().to_string()).collect();
            prop_assert_eq!(before, after);
            prop_assert!(buf.queue.iter().all(|t| t.source_id() != "a"));
        }
    }
}
