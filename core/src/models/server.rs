//! Processing server: uniform service time, single in-flight transaction.

use crate::models::transaction::Transaction;
use crate::rng::RngManager;

/// A server with a uniform `[min_time, max_time]` service-time distribution.
///
/// Invariant: `busy()` iff `current()` is `Some`.
#[derive(Debug, Clone)]
pub struct Server {
    id: String,
    min_time: f64,
    max_time: f64,
    current: Option<Transaction>,
}

impl Server {
    /// # Panics
    /// Panics if `min_time > max_time`. This is a construction-time
    /// precondition, not a recoverable runtime outcome.
    pub fn new(id: impl Into<String>, min_time: f64, max_time: f64) -> Self {
        assert!(
            min_time <= max_time,
            "server min_time must not exceed max_time"
        );
        Self {
            id: id.into(),
            min_time,
            max_time,
            current: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn min_time(&self) -> f64 {
        self.min_time
    }

    pub fn max_time(&self) -> f64 {
        self.max_time
    }

    pub fn is_busy(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<&Transaction> {
        self.current.as_ref()
    }

    /// Start servicing `txn` at `start_time`, drawing a service duration
    /// from `uniform(min_time, max_time)`. Returns the scheduled end time.
    ///
    /// # Panics
    /// Panics if the server is already busy — callers (the two
    /// dispatchers) only ever call this after confirming `!is_busy()`.
    pub fn start_service(
        &mut self,
        txn: Transaction,
        start_time: f64,
        rng: &mut RngManager,
    ) -> f64 {
        assert!(!self.is_busy(), "server already busy");
        let duration = rng.uniform(self.min_time, self.max_time);
        self.current = Some(txn);
        start_time + duration
    }

    /// Mark the server free, returning the transaction that was in service.
    ///
    /// # Panics
    /// Panics if the server was not busy.
    pub fn finish_service(&mut self) -> Transaction {
        self.current.take().expect("server was not busy")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "min_time must not exceed max_time")]
    fn rejects_inverted_bounds() {
        Server::new("s1", 2.0, 1.0);
    }

    #[test]
    fn busy_iff_current_present() {
        let mut server = Server::new("s1", 1.0, 1.0);
        assert!(!server.is_busy());
        assert!(server.current().is_none());

        let mut rng = RngManager::new(1);
        let txn = Transaction::new("s1_1".into(), "s1".into(), 0.0, 100.0);
        server.start_service(txn, 0.0, &mut rng);
        assert!(server.is_busy());
        assert!(server.current().is_some());

        server.finish_service();
        assert!(!server.is_busy());
        assert!(server.current().is_none());
    }

    #[test]
    fn service_time_is_within_configured_bounds() {
        let mut server = Server::new("s1", 2.0, 5.0);
        let mut rng = RngManager::new(9);
        let txn = Transaction::new("s1_1".into(), "s1".into(), 10.0, 100.0);
        let end = server.start_service(txn, 10.0, &mut rng);
        let service_time = end - 10.0;
        assert!((2.0..=5.0).contains(&service_time));
    }
}
