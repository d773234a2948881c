//! D_out: when a server frees, drain the buffer in source-priority
//! packets rather than one transaction at a time from whichever source
//! happens to be at the head of the queue.
//!
//! A packet is every transaction currently buffered from one source. The
//! dispatcher forms a packet from the highest-priority nonempty source,
//! then feeds it onto free servers one transaction per `Process` event
//! until the packet is exhausted, at which point the next `on_server_free`
//! call forms the next packet.

use std::collections::VecDeque;

use crate::events::{Calendar, CalendarEvent};
use crate::models::{Buffer, Server, Source, Transaction};
use crate::rng::RngManager;
use crate::stats::Statistics;

/// Resolve a source's priority: the configured value if `source_id` is a
/// known source, else parse the numeric suffix of the id (`"s12"` -> 12),
/// else the lowest priority (999) if the id has no such suffix. Buffer
/// contents only ever carry a `source_id` string, so the fallback covers
/// callers that never had access to the configured `Source` table.
fn resolve_priority(source_id: &str, sources: &[Source]) -> i32 {
    if let Some(source) = sources.iter().find(|s| s.id() == source_id) {
        return source.priority();
    }
    source_id
        .get(1..)
        .and_then(|suffix| suffix.parse::<i32>().ok())
        .unwrap_or(999)
}

/// Stateful egress dispatcher: tracks the packet currently being drained,
/// its source, and whether it's active — the `(current_packet,
/// current_packet_source, active)` state triple.
#[derive(Debug, Clone, Default)]
pub struct EgressDispatcher {
    current_packet: VecDeque<Transaction>,
    current_source: Option<String>,
    active: bool,
}

impl EgressDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a packet is mid-drain (non-empty and not yet exhausted).
    pub fn active_packet_processing(&self) -> bool {
        self.active
    }

    /// The source the in-progress packet was formed from, if any.
    pub fn current_packet_source(&self) -> Option<&str> {
        self.current_source.as_deref()
    }

    /// The transactions remaining in the in-progress packet, in drain
    /// order.
    pub fn current_packet(&self) -> Vec<Transaction> {
        self.current_packet.iter().cloned().collect()
    }

    /// Handle `server_id` becoming free at `time`. If there's more work to
    /// give it — from the in-progress packet or a freshly formed one — it
    /// is started and the matching `Process` event is scheduled; returns
    /// whether the server was given work.
    #[allow(clippy::too_many_arguments)]
    pub fn on_server_free(
        &mut self,
        server: &mut Server,
        sources: &[Source],
        buffer: &mut Buffer,
        time: f64,
        calendar: &mut Calendar,
        rng: &mut RngManager,
        stats: &mut Statistics,
    ) -> bool {
        if self.current_packet.is_empty() {
            self.form_next_packet(sources, buffer, time, stats);
        }

        let Some(txn) = self.current_packet.pop_front() else {
            return false;
        };

        stats.record_service_start(&txn, time, server.id());
        let server_id = server.id().to_string();
        let end_time = server.start_service(txn, time, rng);
        calendar.push(end_time, CalendarEvent::Process { server_id });

        if self.current_packet.is_empty() {
            self.current_source = None;
            self.active = false;
        }

        true
    }

    fn form_next_packet(&mut self, sources: &[Source], buffer: &mut Buffer, time: f64, stats: &mut Statistics) {
        let mut candidates: Vec<String> = buffer.sources().into_iter().map(String::from).collect();
        if candidates.is_empty() {
            return;
        }
        candidates.sort_by_key(|id| resolve_priority(id, sources));
        let chosen = candidates[0].clone();

        let members = buffer.remove_by_source(&chosen);
        stats.record_packet_formed(&chosen, members.len(), time);
        self.current_source = Some(chosen);
        self.active = true;
        self.current_packet = members.into();
    }
}
