// In-memory latest-report board with last-writer-wins publishing.
use crate::model::SignalReport;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tracing::debug;

/// Issued when an invocation starts; later invocations get larger tickets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

struct Slot {
    ticket: Ticket,
    report: SignalReport,
}

/// Latest signal report per coin.
///
/// Overlapping refreshes may finish out of order. A report is only stored if
/// its ticket is newer than the one already held for the coin, so a slow,
/// superseded fetch cannot overwrite a fresher result. Tickets of failed
/// invocations are never published and supersede nothing.
pub struct SignalBoard {
    next_ticket: AtomicU64,
    slots: Mutex<HashMap<String, Slot>>,
}

impl SignalBoard {
    pub fn new() -> Self {
        Self {
            next_ticket: AtomicU64::new(1),
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn issue(&self) -> Ticket {
        Ticket(self.next_ticket.fetch_add(1, Ordering::Relaxed))
    }

    /// Stores `report` unless a newer invocation already published for the
    /// same coin. Returns whether the report was stored.
    pub async fn publish(&self, ticket: Ticket, report: SignalReport) -> bool {
        let mut slots = self.slots.lock().await;

        if let Some(current) = slots.get(&report.coin_id) {
            if current.ticket > ticket {
                debug!(
                    coin_id = %report.coin_id,
                    stale = ticket.0,
                    current = current.ticket.0,
                    "discarding superseded report"
                );
                return false;
            }
        }

        slots.insert(report.coin_id.clone(), Slot { ticket, report });
        true
    }

    pub async fn latest(&self, coin_id: &str) -> Option<SignalReport> {
        self.slots.lock().await.get(coin_id).map(|slot| slot.report.clone())
    }

    pub async fn len(&self) -> usize {
        self.slots.lock().await.len()
    }
}

impl Default for SignalBoard {
    fn default() -> Self {
        Self::new()
    }
}
