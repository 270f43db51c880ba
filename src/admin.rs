// Admin export surface: shows how many bookings are stored and runs the
// bulk export, reporting the outcome as a user-facing notification.
// Nothing else consumes the result.

use tracing::warn;

use crate::ledger::{BookingLedger, ExportError, LedgerStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

/// A user-facing notification, the toast analog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub severity: Severity,
}

/// Number of stored bookings, for display next to the export control.
pub fn booking_count<S: LedgerStore>(ledger: &BookingLedger<S>) -> usize {
    ledger.list_all().len()
}

/// Run the bulk export and describe what happened.
pub fn export_bookings<S: LedgerStore>(ledger: &BookingLedger<S>) -> Notification {
    let count = booking_count(ledger);
    match ledger.export_all() {
        Ok(path) => Notification {
            title: "Export successful!".into(),
            body: format!("Exported {count} booking(s) to {}.", path.display()),
            severity: Severity::Info,
        },
        Err(ExportError::EmptyLedger) => Notification {
            title: "No bookings to export".into(),
            body: "There are no bookings stored yet.".into(),
            severity: Severity::Error,
        },
        Err(err) => {
            warn!("booking export failed: {err}");
            Notification {
                title: "Export failed".into(),
                body: "There was an error exporting the bookings.".into(),
                severity: Severity::Error,
            }
        }
    }
}
