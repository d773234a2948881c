//! D_in: route a freshly generated transaction onto a free server, into
//! the buffer, or reject it outright.

use crate::events::{Calendar, CalendarEvent};
use crate::models::{Buffer, Server, Transaction};
use crate::rng::RngManager;
use crate::stats::Statistics;

/// Route `txn` at `time`. Scans `servers` in order for the first free one;
/// failing that, tries to append to `buffer`; failing that, the
/// transaction is rejected. Every outcome is recorded in `stats`, and a
/// direct-to-server outcome schedules the matching `Process` event on
/// `calendar`.
pub fn dispatch_admission(
    txn: Transaction,
    time: f64,
    servers: &mut [Server],
    buffer: &mut Buffer,
    calendar: &mut Calendar,
    rng: &mut RngManager,
    stats: &mut Statistics,
) {
    if let Some(server) = servers.iter_mut().find(|s| !s.is_busy()) {
        stats.record_served_direct(&txn, server.id());
        stats.record_service_start(&txn, time, server.id());
        let server_id = server.id().to_string();
        let end_time = server.start_service(txn, time, rng);
        calendar.push(end_time, CalendarEvent::Process { server_id });
        return;
    }

    if buffer.add(txn.clone()) {
        stats.record_buffer_entry(&txn, time);
    } else {
        stats.record_rejected(&txn);
    }
}
