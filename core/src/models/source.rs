//! Arrival source (a Poisson transaction stream).

use crate::models::transaction::Transaction;
use crate::rng::RngManager;

/// Default amount minted onto a generated transaction. The kernel never
/// consults it; it exists only because `Transaction.amount` is part of
/// the data model.
const DEFAULT_AMOUNT: f64 = 100.0;

/// A source of arrivals: mutable counter state plus the parameters of its
/// interarrival distribution.
#[derive(Debug, Clone)]
pub struct Source {
    id: String,
    priority: i32,
    lambda: f64,
    generated_count: u64,
}

impl Source {
    /// Construct a source. `priority`: lower value is higher priority.
    /// `lambda`: rate parameter of the interarrival exponential; `lambda
    /// <= 0` disables arrivals from this source (see `RngManager::exponential`).
    pub fn new(id: impl Into<String>, priority: i32, lambda: f64) -> Self {
        Self {
            id: id.into(),
            priority,
            lambda,
            generated_count: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    pub fn generated_count(&self) -> u64 {
        self.generated_count
    }

    /// Mint the next transaction at `current_time`, minting an id of the
    /// form `<source_id>_<n>` with `n >= 1`. Monotone per source.
    pub fn generate(&mut self, current_time: f64) -> Transaction {
        self.generated_count += 1;
        let id = format!("{}_{}", self.id, self.generated_count);
        Transaction::new(id, self.id.clone(), current_time, DEFAULT_AMOUNT)
    }

    /// Draw this source's next interarrival delay.
    pub fn next_interarrival(&self, rng: &mut RngManager) -> f64 {
        rng.exponential(self.lambda)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_monotone_and_scoped_to_source() {
        let mut s = Source::new("s1", 1, 0.5);
        let t1 = s.generate(0.0);
        let t2 = s.generate(1.0);
        assert_eq!(t1.id(), "s1_1");
        assert_eq!(t2.id(), "s1_2");
        assert_eq!(t1.source_id(), "s1");
    }

    #[test]
    fn timestamps_carry_through() {
        let mut s = Source::new("s1", 1, 0.5);
        let t = s.generate(4.5);
        assert_eq!(t.timestamp(), 4.5);
    }

    #[test]
    fn zero_lambda_disables_arrivals() {
        let s = Source::new("s1", 1, 0.0);
        let mut rng = RngManager::new(1);
        assert_eq!(s.next_interarrival(&mut rng), f64::INFINITY);
    }
}
