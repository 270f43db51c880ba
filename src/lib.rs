// Booking core of the Vikurdistan travel site: the booking wizard, the
// locally persisted booking ledger, and the spreadsheet import/export
// boundary for catalog data and captured bookings.

pub mod admin;
pub mod booking;
pub mod catalog;
pub mod ledger;
pub mod loader;
pub mod sheet;
pub mod wizard;

// Re-export key types for convenience
pub use admin::{booking_count, export_bookings, Notification, Severity};
pub use booking::{BookingKind, BookingRecord, BookingSelection, ContactDetails, Schedule};
pub use catalog::{ExperienceRecord, TourRecord, VillaRecord};
pub use ledger::{
    export_array, BookingLedger, ExportError, JsonFileStore, LedgerConfig, LedgerStatsReport,
    LedgerStore, MemoryStore, StoreError, STORAGE_KEY,
};
pub use loader::{
    load_catalog, load_from_file, load_from_url, Catalog, FileSource, HttpSource, SheetSource,
    SourceLoadError,
};
pub use sheet::{decode_sheet, encode_sheet, write_workbook, SheetError};
pub use wizard::{BookingWizard, ValidationError, WizardStep};
