//! Transaction record.
//!
//! Immutable after creation: once a `Source` mints a `Transaction`, nothing
//! in the kernel mutates it. Buffer, Server, pending Events, and the
//! Statistics in-flight maps all hold it (or its id) transiently rather
//! than forming a shared-mutable-state graph.

/// A single transaction flowing through the network.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    id: String,
    source_id: String,
    timestamp: f64,
    amount: f64,
}

impl Transaction {
    /// Construct a transaction. Not public API for callers outside the
    /// crate: only a `Source` mints ids, via `Source::generate`.
    pub(crate) fn new(id: String, source_id: String, timestamp: f64, amount: f64) -> Self {
        Self {
            id,
            source_id,
            timestamp,
            amount,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    /// Virtual time of generation.
    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    /// Carried but not consulted by the kernel.
    pub fn amount(&self) -> f64 {
        self.amount
    }
}
