// Booking wizard: the three-step flow that turns a catalog selection and
// contact details into one committed BookingRecord.
//
// Steps only ever move one forward or one backward. Validation failures
// are returned to the caller for display and change no state.

use chrono::Utc;
use thiserror::Error;

use crate::booking::{BookingKind, BookingRecord, BookingSelection, ContactDetails};
use crate::catalog::{TourRecord, VillaRecord};
use crate::ledger::{BookingLedger, LedgerStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    SelectingItem,
    EnteringDetails,
    Confirmed,
}

/// Incomplete input at a step transition. Recovered locally: the caller
/// shows the message and the wizard stays where it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("please select a {0}")]
    NothingSelected(BookingKind),

    #[error("unknown {kind} id {id}")]
    UnknownItem { kind: BookingKind, id: u32 },

    #[error("please choose a tour date")]
    MissingTourDate,

    #[error("please choose check-in and check-out dates")]
    MissingStayDates,

    #[error("party size must be at least 1")]
    InvalidPartySize,

    #[error("please fill in your {0}")]
    MissingContactField(&'static str),
}

pub struct BookingWizard {
    step: WizardStep,
    kind: BookingKind,
    selection: BookingSelection,
    contact: ContactDetails,
    tours: Vec<TourRecord>,
    properties: Vec<VillaRecord>,
}

impl BookingWizard {
    pub fn new(tours: Vec<TourRecord>, properties: Vec<VillaRecord>) -> Self {
        Self {
            step: WizardStep::SelectingItem,
            kind: BookingKind::Tour,
            selection: BookingSelection::default(),
            contact: ContactDetails::default(),
            tours,
            properties,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn kind(&self) -> BookingKind {
        self.kind
    }

    pub fn selection(&self) -> &BookingSelection {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut BookingSelection {
        &mut self.selection
    }

    pub fn contact(&self) -> &ContactDetails {
        &self.contact
    }

    pub fn contact_mut(&mut self) -> &mut ContactDetails {
        &mut self.contact
    }

    pub fn tour(&self, id: u32) -> Option<&TourRecord> {
        self.tours.iter().find(|tour| tour.id == id)
    }

    pub fn property(&self, id: u32) -> Option<&VillaRecord> {
        self.properties.iter().find(|villa| villa.id == id)
    }

    /// Move one step forward. From `SelectingItem` this requires a chosen
    /// item of the active kind and a fully specified schedule; from
    /// `EnteringDetails` it requires complete contact details, and on
    /// success commits the booking to the ledger. A no-op once confirmed.
    pub fn advance<S: LedgerStore>(
        &mut self,
        ledger: &BookingLedger<S>,
    ) -> Result<WizardStep, ValidationError> {
        match self.step {
            WizardStep::SelectingItem => {
                self.validate_selection()?;
                self.step = WizardStep::EnteringDetails;
            }
            WizardStep::EnteringDetails => {
                let record = self.build_record()?;
                ledger.append(record);
                self.step = WizardStep::Confirmed;
            }
            WizardStep::Confirmed => {}
        }
        Ok(self.step)
    }

    /// Step back from the details form to the selection. A no-op in every
    /// other step.
    pub fn retreat(&mut self) -> WizardStep {
        if self.step == WizardStep::EnteringDetails {
            self.step = WizardStep::SelectingItem;
        }
        self.step
    }

    /// Begin a fresh booking after confirmation, dropping all transient
    /// selection and contact state. A no-op unless confirmed.
    pub fn restart(&mut self) -> WizardStep {
        if self.step == WizardStep::Confirmed {
            self.selection = BookingSelection::default();
            self.contact = ContactDetails::default();
            self.step = WizardStep::SelectingItem;
        }
        self.step
    }

    /// Change what is being booked. Only honored while selecting; clears
    /// the chosen item and every scheduling field so a stay's date pair
    /// never bleeds into a tour booking or the other way round.
    pub fn switch_kind(&mut self, kind: BookingKind) {
        if self.step == WizardStep::SelectingItem && kind != self.kind {
            self.kind = kind;
            self.selection.reset_item();
        }
    }

    fn validate_selection(&self) -> Result<(), ValidationError> {
        let id = self
            .selection
            .item_id
            .ok_or(ValidationError::NothingSelected(self.kind))?;
        match self.kind {
            BookingKind::Tour => {
                if self.tour(id).is_none() {
                    return Err(ValidationError::UnknownItem {
                        kind: self.kind,
                        id,
                    });
                }
                if self.selection.tour_date.is_none() {
                    return Err(ValidationError::MissingTourDate);
                }
            }
            BookingKind::Property => {
                if self.property(id).is_none() {
                    return Err(ValidationError::UnknownItem {
                        kind: self.kind,
                        id,
                    });
                }
                if self.selection.check_in.is_none() || self.selection.check_out.is_none() {
                    return Err(ValidationError::MissingStayDates);
                }
            }
        }
        if self.selection.party_size == 0 {
            return Err(ValidationError::InvalidPartySize);
        }
        Ok(())
    }

    fn build_record(&self) -> Result<BookingRecord, ValidationError> {
        if let Some(field) = self.contact.first_missing_field() {
            return Err(ValidationError::MissingContactField(field));
        }
        // the selection was checked on the way in, but retreating and
        // editing can invalidate it, so check again before committing
        self.validate_selection()?;

        let id = self
            .selection
            .item_id
            .ok_or(ValidationError::NothingSelected(self.kind))?;
        let (selected_item_name, total_price) = match self.kind {
            BookingKind::Tour => {
                let tour = self.tour(id).ok_or(ValidationError::UnknownItem {
                    kind: self.kind,
                    id,
                })?;
                (
                    tour.title.clone(),
                    tour.price * f64::from(self.selection.party_size),
                )
            }
            BookingKind::Property => {
                let villa = self.property(id).ok_or(ValidationError::UnknownItem {
                    kind: self.kind,
                    id,
                })?;
                // properties are quoted per night; the stay length is not
                // factored into the total
                (villa.name.clone(), villa.price)
            }
        };
        let schedule = self
            .selection
            .schedule_for(self.kind)
            .ok_or(match self.kind {
                BookingKind::Tour => ValidationError::MissingTourDate,
                BookingKind::Property => ValidationError::MissingStayDates,
            })?;

        Ok(BookingRecord {
            kind: self.kind,
            contact: self.contact.clone(),
            selected_item_name,
            schedule,
            party_size: self.selection.party_size,
            total_price,
            created_at: Utc::now(),
        })
    }
}
