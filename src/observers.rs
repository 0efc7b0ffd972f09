use tracing::{info, warn};

use crate::events::{JournalEntry, LibraryEvent};

/// Trait for library activity observation
pub trait LibraryObserver {
    /// Called after an event has been applied and journaled
    fn on_event(&self, entry: &JournalEntry);
}

/// Logs every event that occurs in the system
#[derive(Debug)]
pub struct ActivityLogger;

impl LibraryObserver for ActivityLogger {
    fn on_event(&self, entry: &JournalEntry) {
        match &entry.event {
            LibraryEvent::BookAdded { isbn, title, copies } => {
                info!(date = %entry.date, %isbn, %title, copies, "book added to catalog");
            }
            LibraryEvent::Borrowed { patron_id, isbn, due_date } => {
                info!(date = %entry.date, patron = %patron_id, %isbn, %due_date, "book borrowed");
            }
            LibraryEvent::Returned { patron_id, isbn, .. } => {
                info!(date = %entry.date, patron = %patron_id, %isbn, "book returned");
            }
        }
    }
}

/// Warns when a book comes back after its due date
#[derive(Debug)]
pub struct OverdueNotifier;

impl LibraryObserver for OverdueNotifier {
    fn on_event(&self, entry: &JournalEntry) {
        if let LibraryEvent::Returned { patron_id, isbn, days_overdue, late_fee } = &entry.event {
            if *days_overdue > 0 {
                warn!(
                    patron = %patron_id,
                    %isbn,
                    days_overdue,
                    fee = %late_fee,
                    "book returned late"
                );
            }
        }
    }
}
