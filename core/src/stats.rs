//! Statistics aggregator: per-source/per-server counters, sojourn-time
//! samples, and the append-only observational log the auto-run controller
//! and any host watch.
//!
//! This is deliberately a different taxonomy from `events::CalendarEvent`:
//! the calendar schedules three kinds of simulation steps, while an
//! `Observation` records one of the business-meaningful things that
//! happen along the way (arrival, buffer entry, direct service,
//! rejection, service start/end, packet formation).

use std::collections::HashMap;

use crate::models::Transaction;

/// One entry in the append-only observational log.
#[derive(Debug, Clone, PartialEq)]
pub enum Observation {
    Generate {
        time: f64,
        source_id: String,
        tx_id: String,
    },
    BufferEntry {
        time: f64,
        source_id: String,
        tx_id: String,
    },
    ServedDirect {
        time: f64,
        source_id: String,
        tx_id: String,
        server_id: String,
    },
    Rejected {
        time: f64,
        source_id: String,
        tx_id: String,
    },
    ServiceStart {
        time: f64,
        source_id: String,
        tx_id: String,
        server_id: String,
        wait_time: f64,
    },
    ServiceEnd {
        time: f64,
        source_id: String,
        tx_id: String,
        server_id: String,
        service_time: f64,
        system_time: f64,
    },
    PacketFormed {
        time: f64,
        source_id: String,
        packet_size: usize,
    },
}

impl Observation {
    pub fn time(&self) -> f64 {
        match self {
            Observation::Generate { time, .. }
            | Observation::BufferEntry { time, .. }
            | Observation::ServedDirect { time, .. }
            | Observation::Rejected { time, .. }
            | Observation::ServiceStart { time, .. }
            | Observation::ServiceEnd { time, .. }
            | Observation::PacketFormed { time, .. } => *time,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Observation::Generate { .. } => "GENERATE",
            Observation::BufferEntry { .. } => "BUFFER_ENTRY",
            Observation::ServedDirect { .. } => "SERVED_DIRECT",
            Observation::Rejected { .. } => "REJECTED",
            Observation::ServiceStart { .. } => "SERVICE_START",
            Observation::ServiceEnd { .. } => "SERVICE_END",
            Observation::PacketFormed { .. } => "PACKET_FORMED",
        }
    }
}

/// Per-source accumulated counters and sojourn-time samples.
#[derive(Debug, Clone, Default)]
struct SourceStats {
    generated: u64,
    rejected: u64,
    completed: u64,
    total_wait_time: f64,
    total_service_time: f64,
    total_system_time: f64,
    wait_times: Vec<f64>,
    service_times: Vec<f64>,
    system_times: Vec<f64>,
}

/// Per-server accumulated counters.
#[derive(Debug, Clone, Default)]
struct ServerStats {
    busy_time: f64,
    processed: u64,
}

/// Derived, read-only summary of one source's statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceStatistics {
    pub generated: u64,
    pub rejected: u64,
    pub completed: u64,
    pub rejection_rate: f64,
    pub avg_wait_time: f64,
    pub avg_service_time: f64,
    pub avg_system_time: f64,
    pub var_wait_time: f64,
    pub var_service_time: f64,
}

/// Derived, read-only summary of one server's statistics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServerStatistics {
    pub processed: u64,
    pub busy_time: f64,
    pub utilization: f64,
}

/// In-flight bookkeeping for a transaction currently in service.
#[derive(Debug, Clone)]
struct ServiceStart {
    start_time: f64,
    server_id: String,
    source_id: String,
}

/// The statistics collector: scalar counters, per-source/per-server
/// aggregates, in-flight maps, and the observational log.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    total_transactions: u64,
    rejected_transactions: u64,
    source_stats: HashMap<String, SourceStats>,
    server_stats: HashMap<String, ServerStats>,
    buffer_entry_time: HashMap<String, f64>,
    service_starts: HashMap<String, ServiceStart>,
    event_history: Vec<Observation>,
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    fn log(&mut self, obs: Observation) {
        self.event_history.push(obs);
    }

    /// Record that `txn` was generated. Always called before D_in routes it.
    pub fn record_generated(&mut self, txn: &Transaction) {
        self.total_transactions += 1;
        self.source_stats
            .entry(txn.source_id().to_string())
            .or_default()
            .generated += 1;
        self.log(Observation::Generate {
            time: txn.timestamp(),
            source_id: txn.source_id().to_string(),
            tx_id: txn.id().to_string(),
        });
    }

    /// Record a rejection (buffer was full on arrival).
    pub fn record_rejected(&mut self, txn: &Transaction) {
        self.rejected_transactions += 1;
        self.source_stats
            .entry(txn.source_id().to_string())
            .or_default()
            .rejected += 1;
        self.log(Observation::Rejected {
            time: txn.timestamp(),
            source_id: txn.source_id().to_string(),
            tx_id: txn.id().to_string(),
        });
    }

    /// Record that `txn` was appended to the buffer at `time`.
    pub fn record_buffer_entry(&mut self, txn: &Transaction, time: f64) {
        self.buffer_entry_time.insert(txn.id().to_string(), time);
        self.log(Observation::BufferEntry {
            time,
            source_id: txn.source_id().to_string(),
            tx_id: txn.id().to_string(),
        });
    }

    /// Record that `txn` started service on `server_id` at `time`. Wait
    /// time is `time - buffer_entry_time` when the transaction passed
    /// through the buffer, else implicitly 0 and not sampled.
    pub fn record_service_start(&mut self, txn: &Transaction, time: f64, server_id: &str) {
        let wait_time = match self.buffer_entry_time.remove(txn.id()) {
            Some(entry_time) => {
                let wait = time - entry_time;
                let stats = self.source_stats.entry(txn.source_id().to_string()).or_default();
                stats.wait_times.push(wait);
                stats.total_wait_time += wait;
                wait
            }
            None => 0.0,
        };

        self.service_starts.insert(
            txn.id().to_string(),
            ServiceStart {
                start_time: time,
                server_id: server_id.to_string(),
                source_id: txn.source_id().to_string(),
            },
        );

        self.log(Observation::ServiceStart {
            time,
            source_id: txn.source_id().to_string(),
            tx_id: txn.id().to_string(),
            server_id: server_id.to_string(),
            wait_time,
        });
    }

    /// Record a transaction routed directly onto a free server (no buffer
    /// wait at all). Distinct observation from `ServiceStart`, which is
    /// logged immediately after by the dispatcher for the same arrival.
    pub fn record_served_direct(&mut self, txn: &Transaction, server_id: &str) {
        self.log(Observation::ServedDirect {
            time: txn.timestamp(),
            source_id: txn.source_id().to_string(),
            tx_id: txn.id().to_string(),
            server_id: server_id.to_string(),
        });
    }

    /// Record that `txn` finished service at `time`.
    ///
    /// # Panics
    /// Panics if no matching `record_service_start` call preceded this one
    /// — the kernel always pairs PROCESS events with a prior service
    /// start, so a missing entry is a programmer error.
    pub fn record_service_end(&mut self, txn: &Transaction, time: f64) {
        let start = self
            .service_starts
            .remove(txn.id())
            .expect("SERVICE_END with no matching SERVICE_START");

        let service_time = time - start.start_time;
        let system_time = time - txn.timestamp();

        let stats = self.source_stats.entry(start.source_id.clone()).or_default();
        stats.completed += 1;
        stats.service_times.push(service_time);
        stats.total_service_time += service_time;
        stats.system_times.push(system_time);
        stats.total_system_time += system_time;

        let server_stats = self.server_stats.entry(start.server_id.clone()).or_default();
        server_stats.busy_time += service_time;
        server_stats.processed += 1;

        self.log(Observation::ServiceEnd {
            time,
            source_id: start.source_id,
            tx_id: txn.id().to_string(),
            server_id: start.server_id,
            service_time,
            system_time,
        });
    }

    /// Record that a packet of `packet_size` transactions was formed from
    /// `source_id` at `time`.
    pub fn record_packet_formed(&mut self, source_id: &str, packet_size: usize, time: f64) {
        self.log(Observation::PacketFormed {
            time,
            source_id: source_id.to_string(),
            packet_size,
        });
    }

    pub fn total_transactions(&self) -> u64 {
        self.total_transactions
    }

    pub fn rejected_transactions(&self) -> u64 {
        self.rejected_transactions
    }

    /// `rejected / total`, 0 when nothing has been generated yet.
    pub fn rejection_rate(&self) -> f64 {
        if self.total_transactions == 0 {
            0.0
        } else {
            self.rejected_transactions as f64 / self.total_transactions as f64
        }
    }

    /// Derived per-source statistics. A source with no generated
    /// transactions yields all zeros.
    pub fn source_statistics(&self, source_id: &str) -> SourceStatistics {
        let stats = match self.source_stats.get(source_id) {
            Some(s) => s,
            None => {
                return SourceStatistics {
                    generated: 0,
                    rejected: 0,
                    completed: 0,
                    rejection_rate: 0.0,
                    avg_wait_time: 0.0,
                    avg_service_time: 0.0,
                    avg_system_time: 0.0,
                    var_wait_time: 0.0,
                    var_service_time: 0.0,
                }
            }
        };

        if stats.generated == 0 {
            return SourceStatistics {
                generated: 0,
                rejected: 0,
                completed: 0,
                rejection_rate: 0.0,
                avg_wait_time: 0.0,
                avg_service_time: 0.0,
                avg_system_time: 0.0,
                var_wait_time: 0.0,
                var_service_time: 0.0,
            };
        }

        let rejection_rate = stats.rejected as f64 / stats.generated as f64;
        let completed = stats.completed;
        let avg = |total: f64| if completed > 0 { total / completed as f64 } else { 0.0 };

        SourceStatistics {
            generated: stats.generated,
            rejected: stats.rejected,
            completed,
            rejection_rate,
            avg_wait_time: avg(stats.total_wait_time),
            avg_service_time: avg(stats.total_service_time),
            avg_system_time: avg(stats.total_system_time),
            var_wait_time: sample_variance(&stats.wait_times),
            var_service_time: sample_variance(&stats.service_times),
        }
    }

    /// Derived per-server statistics. `total_time` is the virtual time
    /// elapsed so far, used as the utilization denominator.
    pub fn server_statistics(&self, server_id: &str, total_time: f64) -> ServerStatistics {
        let stats = self.server_stats.get(server_id).cloned().unwrap_or_default();
        let utilization = if total_time > 0.0 {
            stats.busy_time / total_time
        } else {
            0.0
        };
        ServerStatistics {
            processed: stats.processed,
            busy_time: stats.busy_time,
            utilization,
        }
    }

    /// The most recent `limit` observations, or all of them if `limit` is
    /// `None`.
    pub fn event_history(&self, limit: Option<usize>) -> &[Observation] {
        match limit {
            Some(n) if n < self.event_history.len() => &self.event_history[self.event_history.len() - n..],
            _ => &self.event_history,
        }
    }
}

/// Sample variance with denominator `n - 1`; 0 when `n <= 1`.
fn sample_variance(values: &[f64]) -> f64 {
    if values.len() <= 1 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let squared_diff: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    squared_diff / (values.len() - 1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn txn(id: &str, source: &str, time: f64) -> Transaction {
        Transaction::new(id.to_string(), source.to_string(), time, 100.0)
    }

    #[test]
    fn rejection_rate_is_zero_with_nothing_generated() {
        let stats = Statistics::new();
        assert_eq!(stats.rejection_rate(), 0.0);
    }

    #[test]
    fn rejection_rate_tracks_rejected_over_total() {
        let mut stats = Statistics::new();
        let a = txn("s_1", "s", 0.0);
        let b = txn("s_2", "s", 1.0);
        stats.record_generated(&a);
        stats.record_generated(&b);
        stats.record_rejected(&b);
        assert_eq!(stats.rejection_rate(), 0.5);
    }

    #[test]
    fn wait_time_is_zero_for_direct_service() {
        let mut stats = Statistics::new();
        let a = txn("s_1", "s", 0.0);
        stats.record_generated(&a);
        stats.record_served_direct(&a, "srv1");
        stats.record_service_start(&a, 0.0, "srv1");
        stats.record_service_end(&a, 1.0);

        let summary = stats.source_statistics("s");
        assert_eq!(summary.avg_wait_time, 0.0);
    }

    #[test]
    fn wait_time_is_positive_after_buffering() {
        let mut stats = Statistics::new();
        let a = txn("s_1", "s", 0.0);
        stats.record_generated(&a);
        stats.record_buffer_entry(&a, 0.0);
        stats.record_service_start(&a, 2.5, "srv1");
        stats.record_service_end(&a, 3.5);

        let summary = stats.source_statistics("s");
        assert_eq!(summary.avg_wait_time, 2.5);
        assert_eq!(summary.avg_service_time, 1.0);
        assert_eq!(summary.avg_system_time, 3.5);
    }

    #[test]
    fn server_utilization_is_zero_with_no_elapsed_time() {
        let stats = Statistics::new();
        assert_eq!(stats.server_statistics("srv1", 0.0).utilization, 0.0);
    }

    #[test]
    #[should_panic(expected = "SERVICE_END with no matching SERVICE_START")]
    fn service_end_without_start_panics() {
        let mut stats = Statistics::new();
        let a = txn("s_1", "s", 0.0);
        stats.record_service_end(&a, 1.0);
    }

    #[test]
    fn event_history_limit_returns_the_tail() {
        let mut stats = Statistics::new();
        for i in 0..5 {
            let t = txn(&format!("s_{i}"), "s", i as f64);
            stats.record_generated(&t);
        }
        assert_eq!(stats.event_history(None).len(), 5);
        assert_eq!(stats.event_history(Some(2)).len(), 2);
    }

    #[test]
    fn sample_variance_is_zero_below_two_samples() {
        assert_eq!(sample_variance(&[]), 0.0);
        assert_eq!(sample_variance(&[1.0]), 0.0);
    }
}
