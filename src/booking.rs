// Booking data model: what the wizard collects and what the ledger persists.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// What is being booked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingKind {
    Tour,
    Property,
}

impl std::fmt::Display for BookingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookingKind::Tour => write!(f, "tour"),
            BookingKind::Property => write!(f, "property"),
        }
    }
}

/// Resolved scheduling of a committed booking: a single date for tours,
/// a check-in/check-out pair for property stays.
///
/// Serialized untagged so the persisted record keeps the flat `date` /
/// `checkIn` / `checkOut` keys of the stored layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Schedule {
    Tour {
        date: NaiveDate,
    },
    #[serde(rename_all = "camelCase")]
    Stay {
        check_in: NaiveDate,
        check_out: NaiveDate,
    },
}

/// Contact details entered in the second wizard step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_requests: Option<String>,
}

impl ContactDetails {
    /// First required field that is empty (whitespace counts as empty),
    /// or `None` when the details are complete. `special_requests` is
    /// optional and never reported.
    pub fn first_missing_field(&self) -> Option<&'static str> {
        let required = [
            ("first name", &self.first_name),
            ("last name", &self.last_name),
            ("email", &self.email),
            ("phone", &self.phone),
        ];
        required
            .into_iter()
            .find(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| name)
    }

    pub fn is_complete(&self) -> bool {
        self.first_missing_field().is_none()
    }
}

/// Transient choice built up during the first wizard step. Tour and stay
/// dates are kept separately; switching kind clears whichever no longer
/// applies.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingSelection {
    pub item_id: Option<u32>,
    pub tour_date: Option<NaiveDate>,
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
    pub party_size: u32,
}

impl Default for BookingSelection {
    fn default() -> Self {
        Self {
            item_id: None,
            tour_date: None,
            check_in: None,
            check_out: None,
            party_size: 2,
        }
    }
}

impl BookingSelection {
    /// The resolved schedule for the given kind, if fully specified.
    pub fn schedule_for(&self, kind: BookingKind) -> Option<Schedule> {
        match kind {
            BookingKind::Tour => self.tour_date.map(|date| Schedule::Tour { date }),
            BookingKind::Property => match (self.check_in, self.check_out) {
                (Some(check_in), Some(check_out)) => Some(Schedule::Stay {
                    check_in,
                    check_out,
                }),
                _ => None,
            },
        }
    }

    /// Drop the chosen item and all scheduling fields, keeping party size.
    pub fn reset_item(&mut self) {
        self.item_id = None;
        self.tour_date = None;
        self.check_in = None;
        self.check_out = None;
    }
}

/// A committed booking. Immutable once constructed; the ledger only ever
/// appends and bulk-clears these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRecord {
    pub kind: BookingKind,
    pub contact: ContactDetails,
    pub selected_item_name: String,
    #[serde(flatten)]
    pub schedule: Schedule,
    pub party_size: u32,
    pub total_price: f64,
    pub created_at: DateTime<Utc>,
}
