// Booking ledger: an append-only, locally persisted sequence of committed
// bookings, with bulk export to a workbook.
//
// Persistence goes through the injected LedgerStore so tests can swap the
// file-backed store for an in-memory one. Writes are write-through: the
// append the caller saw succeeds even when the store write fails; the
// failure is logged and counted, never surfaced.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{NaiveDate, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::booking::{BookingKind, BookingRecord, Schedule};
use crate::sheet::{self, SheetError};

/// Fixed key under which the booking sequence is stored.
pub const STORAGE_KEY: &str = "vikurdistan_bookings";

const BOOKINGS_SHEET: &str = "Bookings";
const ALL_BOOKINGS_SHEET: &str = "All Bookings";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored bookings are not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no bookings to export")]
    EmptyLedger,

    #[error(transparent)]
    Sheet(#[from] SheetError),
}

/// Storage seam for the persisted booking sequence.
pub trait LedgerStore: Send + Sync {
    // Full stored sequence; an absent key reads as empty.
    fn read(&self) -> Result<Vec<BookingRecord>, StoreError>;

    // Replace the stored sequence with `records`.
    fn write(&self, records: &[BookingRecord]) -> Result<(), StoreError>;

    // Remove the stored key entirely.
    fn clear(&self) -> Result<(), StoreError>;
}

/// Durable store: one JSON file named after the storage key, the analog of
/// the browser's local storage entry.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{STORAGE_KEY}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LedgerStore for JsonFileStore {
    fn read(&self) -> Result<Vec<BookingRecord>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn write(&self, records: &[BookingRecord]) -> Result<(), StoreError> {
        let raw = serde_json::to_string(records)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

/// In-memory store for tests and demos.
#[derive(Default)]
pub struct MemoryStore {
    // None models an absent storage key
    records: Mutex<Option<Vec<BookingRecord>>>,
}

impl LedgerStore for MemoryStore {
    fn read(&self) -> Result<Vec<BookingRecord>, StoreError> {
        Ok(self.records.lock().clone().unwrap_or_default())
    }

    fn write(&self, records: &[BookingRecord]) -> Result<(), StoreError> {
        *self.records.lock() = Some(records.to_vec());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.records.lock() = None;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct LedgerStats {
    pub appends: AtomicUsize,
    pub exports: AtomicUsize,
    pub read_failures: AtomicUsize,
    pub write_failures: AtomicUsize,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LedgerStatsReport {
    pub appends: usize,
    pub exports: usize,
    pub read_failures: usize,
    pub write_failures: usize,
}

#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Directory that exported workbooks are written into.
    pub export_dir: PathBuf,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            export_dir: PathBuf::from("."),
        }
    }
}

pub struct BookingLedger<S: LedgerStore> {
    store: S,
    config: LedgerConfig,
    stats: LedgerStats,
}

impl<S: LedgerStore> BookingLedger<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, LedgerConfig::default())
    }

    pub fn with_config(store: S, config: LedgerConfig) -> Self {
        Self {
            store,
            config,
            stats: LedgerStats::default(),
        }
    }

    /// Append a committed booking and persist the full updated sequence.
    /// A store write failure is logged and counted but the append still
    /// holds for the caller. Returns the appended sequence length.
    pub fn append(&self, record: BookingRecord) -> usize {
        let mut records = self.read_or_empty();
        records.push(record);
        self.persist(&records);
        self.stats.appends.fetch_add(1, Ordering::SeqCst);
        records.len()
    }

    /// The full persisted sequence, read from the store on every call so
    /// external writers to the same key are observed. A read failure reads
    /// as an empty ledger.
    pub fn list_all(&self) -> Vec<BookingRecord> {
        self.read_or_empty()
    }

    /// Export every persisted booking into `all_bookings_<date>.xlsx`.
    /// Fails when there is nothing to export; never mutates the ledger.
    pub fn export_all(&self) -> Result<PathBuf, ExportError> {
        let records = self.list_all();
        if records.is_empty() {
            return Err(ExportError::EmptyLedger);
        }
        let rows: Vec<BookingRow> = records.iter().map(BookingRow::from).collect();
        let path = self.export_path("all_bookings");
        sheet::write_workbook(&rows, ALL_BOOKINGS_SHEET, &path)?;
        self.stats.exports.fetch_add(1, Ordering::SeqCst);
        Ok(path)
    }

    /// Append one booking and export the appended sequence into
    /// `bookings_<date>.xlsx` in a single step. The workbook write failure
    /// propagates; the persistence write stays best-effort.
    pub fn export_with_append(&self, record: BookingRecord) -> Result<PathBuf, ExportError> {
        let mut records = self.read_or_empty();
        records.push(record);

        let rows: Vec<BookingRow> = records.iter().map(BookingRow::from).collect();
        let path = self.export_path("bookings");
        sheet::write_workbook(&rows, BOOKINGS_SHEET, &path)?;

        self.persist(&records);
        self.stats.appends.fetch_add(1, Ordering::SeqCst);
        self.stats.exports.fetch_add(1, Ordering::SeqCst);
        Ok(path)
    }

    /// Remove the stored key; the next `list_all` returns an empty
    /// sequence.
    pub fn clear_all(&self) {
        if let Err(err) = self.store.clear() {
            self.stats.write_failures.fetch_add(1, Ordering::SeqCst);
            warn!("could not clear stored bookings: {err}");
        }
    }

    pub fn stats(&self) -> LedgerStatsReport {
        LedgerStatsReport {
            appends: self.stats.appends.load(Ordering::SeqCst),
            exports: self.stats.exports.load(Ordering::SeqCst),
            read_failures: self.stats.read_failures.load(Ordering::SeqCst),
            write_failures: self.stats.write_failures.load(Ordering::SeqCst),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn read_or_empty(&self) -> Vec<BookingRecord> {
        match self.store.read() {
            Ok(records) => records,
            Err(err) => {
                self.stats.read_failures.fetch_add(1, Ordering::SeqCst);
                warn!("could not load stored bookings: {err}");
                Vec::new()
            }
        }
    }

    fn persist(&self, records: &[BookingRecord]) {
        if let Err(err) = self.store.write(records) {
            self.stats.write_failures.fetch_add(1, Ordering::SeqCst);
            warn!("could not persist bookings: {err}");
        }
    }

    fn export_path(&self, prefix: &str) -> PathBuf {
        let stamp = Utc::now().format("%Y-%m-%d");
        self.config.export_dir.join(format!("{prefix}_{stamp}.xlsx"))
    }
}

/// Serialize an arbitrary sequence of flat records into one named sheet at
/// `path`. Used for catalog-data reimport workflows; independent of the
/// booking store.
pub fn export_array<T: Serialize>(
    records: &[T],
    path: &Path,
    sheet_name: &str,
) -> Result<(), ExportError> {
    sheet::write_workbook(records, sheet_name, path)?;
    Ok(())
}

// One exported row per booking, flattened to the column layout the site
// has always exported: contact fields at the top level, tour and stay
// date columns side by side.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BookingRow<'a> {
    #[serde(rename = "type")]
    kind: BookingKind,
    first_name: &'a str,
    last_name: &'a str,
    email: &'a str,
    phone: &'a str,
    selected_item_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    check_in: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    check_out: Option<NaiveDate>,
    guests: u32,
    total_price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    special_requests: Option<&'a str>,
    booking_date: String,
}

impl<'a> From<&'a BookingRecord> for BookingRow<'a> {
    fn from(record: &'a BookingRecord) -> Self {
        let (date, check_in, check_out) = match record.schedule {
            Schedule::Tour { date } => (Some(date), None, None),
            Schedule::Stay {
                check_in,
                check_out,
            } => (None, Some(check_in), Some(check_out)),
        };
        Self {
            kind: record.kind,
            first_name: &record.contact.first_name,
            last_name: &record.contact.last_name,
            email: &record.contact.email,
            phone: &record.contact.phone,
            selected_item_name: &record.selected_item_name,
            date,
            check_in,
            check_out,
            guests: record.party_size,
            total_price: record.total_price,
            special_requests: record.contact.special_requests.as_deref(),
            booking_date: record.created_at.to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::ContactDetails;
    use serde::Deserialize;
    use std::sync::atomic::AtomicBool;

    // Store double that fails on demand, to exercise the write-through
    // policy without touching the filesystem.
    #[derive(Default)]
    struct FailingStore {
        inner: MemoryStore,
        fail_reads: AtomicBool,
        fail_writes: AtomicBool,
    }

    impl FailingStore {
        fn broken() -> std::io::Error {
            std::io::Error::new(std::io::ErrorKind::Other, "storage unavailable")
        }
    }

    impl LedgerStore for FailingStore {
        fn read(&self) -> Result<Vec<BookingRecord>, StoreError> {
            if self.fail_reads.load(Ordering::SeqCst) {
                return Err(StoreError::Io(Self::broken()));
            }
            self.inner.read()
        }

        fn write(&self, records: &[BookingRecord]) -> Result<(), StoreError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(StoreError::Io(Self::broken()));
            }
            self.inner.write(records)
        }

        fn clear(&self) -> Result<(), StoreError> {
            self.inner.clear()
        }
    }

    fn record(first_name: &str, created_at: &str) -> BookingRecord {
        BookingRecord {
            kind: BookingKind::Tour,
            contact: ContactDetails {
                first_name: first_name.into(),
                last_name: "Barzani".into(),
                email: "guest@example.com".into(),
                phone: "+964 750 000 0000".into(),
                special_requests: None,
            },
            selected_item_name: "Erbil Heritage Walk".into(),
            schedule: Schedule::Tour {
                date: "2026-09-12".parse().unwrap(),
            },
            party_size: 2,
            total_price: 178.0,
            created_at: created_at.parse().unwrap(),
        }
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct ExportedRow {
        #[serde(rename = "type")]
        kind: String,
        first_name: String,
        selected_item_name: String,
        guests: u32,
        total_price: f64,
    }

    #[test]
    fn append_then_list_preserves_value_and_order() {
        let ledger = BookingLedger::new(MemoryStore::default());
        let a = record("Aram", "2026-08-01T09:00:00Z");
        let b = record("Berivan", "2026-08-01T10:00:00Z");
        let c = record("Chiman", "2026-08-01T11:00:00Z");

        assert_eq!(ledger.append(a.clone()), 1);
        assert_eq!(ledger.append(b.clone()), 2);
        assert_eq!(ledger.append(c.clone()), 3);

        assert_eq!(ledger.list_all(), vec![a, b, c]);
    }

    #[test]
    fn export_all_writes_one_row_per_booking_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = BookingLedger::with_config(
            MemoryStore::default(),
            LedgerConfig {
                export_dir: dir.path().to_path_buf(),
            },
        );
        ledger.append(record("Aram", "2026-08-01T09:00:00Z"));
        ledger.append(record("Berivan", "2026-08-01T10:00:00Z"));
        ledger.append(record("Chiman", "2026-08-01T11:00:00Z"));

        let path = ledger.export_all().unwrap();
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("all_bookings_"));
        assert!(name.ends_with(".xlsx"));

        let bytes = fs::read(&path).unwrap();
        let rows: Vec<ExportedRow> = sheet::decode_sheet(&bytes).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].first_name, "Aram");
        assert_eq!(rows[1].first_name, "Berivan");
        assert_eq!(rows[2].first_name, "Chiman");
        assert_eq!(rows[0].kind, "tour");
        assert_eq!(rows[0].selected_item_name, "Erbil Heritage Walk");
        assert_eq!(rows[0].guests, 2);
        assert_eq!(rows[0].total_price, 178.0);
    }

    #[test]
    fn export_all_on_empty_ledger_fails() {
        let ledger = BookingLedger::new(MemoryStore::default());
        assert!(matches!(ledger.export_all(), Err(ExportError::EmptyLedger)));
    }

    #[test]
    fn clear_all_empties_the_ledger_and_blocks_export() {
        let ledger = BookingLedger::new(MemoryStore::default());
        ledger.append(record("Aram", "2026-08-01T09:00:00Z"));
        assert_eq!(ledger.list_all().len(), 1);

        ledger.clear_all();
        assert!(ledger.list_all().is_empty());
        assert!(matches!(ledger.export_all(), Err(ExportError::EmptyLedger)));
    }

    #[test]
    fn append_survives_a_failing_write() {
        let store = FailingStore::default();
        store.fail_writes.store(true, Ordering::SeqCst);
        let ledger = BookingLedger::new(store);

        // the caller still sees the appended count
        assert_eq!(ledger.append(record("Aram", "2026-08-01T09:00:00Z")), 1);

        // nothing reached the store, and the failure was counted
        assert!(ledger.list_all().is_empty());
        let stats = ledger.stats();
        assert_eq!(stats.appends, 1);
        assert_eq!(stats.write_failures, 1);
    }

    #[test]
    fn read_failure_reads_as_empty() {
        let store = FailingStore::default();
        store.inner.write(&[record("Aram", "2026-08-01T09:00:00Z")]).unwrap();
        store.fail_reads.store(true, Ordering::SeqCst);
        let ledger = BookingLedger::new(store);

        assert!(ledger.list_all().is_empty());
        assert!(ledger.stats().read_failures >= 1);
    }

    #[test]
    fn export_with_append_includes_the_new_booking() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = BookingLedger::with_config(
            MemoryStore::default(),
            LedgerConfig {
                export_dir: dir.path().to_path_buf(),
            },
        );
        ledger.append(record("Aram", "2026-08-01T09:00:00Z"));

        let path = ledger
            .export_with_append(record("Berivan", "2026-08-01T10:00:00Z"))
            .unwrap();
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("bookings_"));

        let bytes = fs::read(&path).unwrap();
        let rows: Vec<ExportedRow> = sheet::decode_sheet(&bytes).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].first_name, "Berivan");

        // and the appended sequence was persisted
        assert_eq!(ledger.list_all().len(), 2);
    }

    #[test]
    fn file_store_persists_across_instances() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        {
            let ledger = BookingLedger::new(JsonFileStore::new(dir.path()));
            ledger.append(record("Aram", "2026-08-01T09:00:00Z"));
            assert!(ledger.store().path().exists());
        }
        let reopened = BookingLedger::new(JsonFileStore::new(dir.path()));
        assert_eq!(reopened.list_all().len(), 1);
        Ok(())
    }

    #[test]
    fn list_all_observes_external_writers_of_the_same_key() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = BookingLedger::new(JsonFileStore::new(dir.path()));
        assert!(ledger.list_all().is_empty());

        // another handle on the same key, as another tab would be
        let other = JsonFileStore::new(dir.path());
        other
            .write(&[record("Aram", "2026-08-01T09:00:00Z")])
            .unwrap();

        assert_eq!(ledger.list_all().len(), 1);
    }

    #[test]
    fn export_array_writes_an_arbitrary_sheet() {
        #[derive(Serialize)]
        struct CatalogRow {
            id: u32,
            title: String,
        }
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tours_reimport.xlsx");
        export_array(
            &[CatalogRow {
                id: 1,
                title: "Erbil Heritage Walk".into(),
            }],
            &path,
            "Tours",
        )
        .unwrap();
        assert!(path.exists());
    }
}
