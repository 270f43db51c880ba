// Tabular codec boundary: flat record sequences to and from one worksheet.
//
// The binary format is delegated to third-party encoders (rust_xlsxwriter
// for writing, calamine for reading); this module only maps between serde
// records and rows. Records must flatten to scalar cells; arrays of scalars
// are joined with ", ", anything deeper is rejected.

use std::io::Cursor;
use std::path::Path;

use calamine::{Data, Reader, Xlsx};
use rust_xlsxwriter::{Workbook, Worksheet};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Number, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SheetError {
    #[error("workbook read error: {0}")]
    Read(#[from] calamine::XlsxError),

    #[error("workbook write error: {0}")]
    Write(#[from] rust_xlsxwriter::XlsxError),

    #[error("workbook has no sheets")]
    NoSheets,

    #[error("sheet has no header row")]
    MissingHeader,

    #[error("row {row}: {source}")]
    Row {
        row: usize,
        source: serde_json::Error,
    },

    #[error("record field {0} does not fit a single cell")]
    NotFlat(String),

    #[error("record is not serializable as a row: {0}")]
    Encode(serde_json::Error),
}

/// Serialize records into an xlsx workbook with one named sheet, returned
/// as bytes.
pub fn encode_sheet<T: Serialize>(records: &[T], sheet_name: &str) -> Result<Vec<u8>, SheetError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name)?;
    write_rows(worksheet, records)?;
    Ok(workbook.save_to_buffer()?)
}

/// Serialize records into an xlsx workbook with one named sheet, written
/// to `path`.
pub fn write_workbook<T: Serialize>(
    records: &[T],
    sheet_name: &str,
    path: &Path,
) -> Result<(), SheetError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name)?;
    write_rows(worksheet, records)?;
    workbook.save(path)?;
    Ok(())
}

/// Deserialize records from the first sheet of an xlsx workbook. The first
/// row is the header; every following non-blank row must satisfy `T`'s
/// schema or the whole decode fails with the offending row number.
pub fn decode_sheet<T: DeserializeOwned>(bytes: &[u8]) -> Result<Vec<T>, SheetError> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;
    let names = workbook.sheet_names().to_owned();
    let first = names.first().ok_or(SheetError::NoSheets)?.clone();
    let range = workbook.worksheet_range(&first)?;

    let mut rows = range.rows();
    let header: Vec<String> = rows
        .next()
        .ok_or(SheetError::MissingHeader)?
        .iter()
        .map(|cell| cell.to_string().trim().to_string())
        .collect();

    let mut records = Vec::new();
    for (idx, row) in rows.enumerate() {
        if row.iter().all(|cell| matches!(cell, Data::Empty)) {
            continue;
        }
        let mut object = Map::new();
        for (name, cell) in header.iter().zip(row) {
            if name.is_empty() {
                continue;
            }
            let value = cell_to_value(cell);
            if value.is_null() {
                // absent cell: leave the key out so presence checks fire
                continue;
            }
            object.insert(name.clone(), value);
        }
        let record = serde_json::from_value(Value::Object(object)).map_err(|source| {
            SheetError::Row {
                // 1-based, counting the header row
                row: idx + 2,
                source,
            }
        })?;
        records.push(record);
    }
    Ok(records)
}

fn write_rows<T: Serialize>(worksheet: &mut Worksheet, records: &[T]) -> Result<(), SheetError> {
    let rows: Vec<Map<String, Value>> = records
        .iter()
        .map(to_row_object)
        .collect::<Result<_, _>>()?;

    // Header = union of keys over all rows, so optional fields present only
    // in later records still get a column.
    let mut headers: Vec<String> = Vec::new();
    for row in &rows {
        for key in row.keys() {
            if !headers.iter().any(|h| h == key) {
                headers.push(key.clone());
            }
        }
    }

    for (col, name) in headers.iter().enumerate() {
        worksheet.write_string(0, col as u16, name.as_str())?;
    }
    for (r, row) in rows.iter().enumerate() {
        let row_idx = (r + 1) as u32;
        for (col, name) in headers.iter().enumerate() {
            let col_idx = col as u16;
            match row.get(name) {
                None | Some(Value::Null) => {}
                Some(Value::String(s)) => {
                    worksheet.write_string(row_idx, col_idx, s)?;
                }
                Some(Value::Number(n)) => {
                    worksheet.write_number(row_idx, col_idx, n.as_f64().unwrap_or(0.0))?;
                }
                Some(Value::Bool(b)) => {
                    worksheet.write_boolean(row_idx, col_idx, *b)?;
                }
                Some(other) => {
                    worksheet.write_string(row_idx, col_idx, &join_array(name, other)?)?;
                }
            }
        }
    }
    Ok(())
}

fn to_row_object<T: Serialize>(record: &T) -> Result<Map<String, Value>, SheetError> {
    match serde_json::to_value(record).map_err(SheetError::Encode)? {
        Value::Object(map) => Ok(map),
        _ => Err(SheetError::NotFlat("<record>".to_string())),
    }
}

// Arrays of scalars collapse into one comma-joined cell; nested structure
// has no cell representation.
fn join_array(field: &str, value: &Value) -> Result<String, SheetError> {
    let Value::Array(items) = value else {
        return Err(SheetError::NotFlat(field.to_string()));
    };
    let mut parts = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::String(s) => parts.push(s.clone()),
            Value::Number(n) => parts.push(n.to_string()),
            Value::Bool(b) => parts.push(b.to_string()),
            _ => return Err(SheetError::NotFlat(field.to_string())),
        }
    }
    Ok(parts.join(", "))
}

fn cell_to_value(cell: &Data) -> Value {
    match cell {
        Data::Empty | Data::Error(_) => Value::Null,
        Data::String(s) => Value::String(s.clone()),
        Data::Bool(b) => Value::Bool(*b),
        Data::Int(i) => Value::Number((*i).into()),
        Data::Float(f) => float_to_value(*f),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(d) if d.time() == chrono::NaiveTime::MIN => Value::String(d.date().to_string()),
            Some(d) => Value::String(d.to_string()),
            None => Value::Null,
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => Value::String(s.clone()),
    }
}

// Spreadsheet numbers come back as floats; integral values must map to
// JSON integers or integer fields in the target schema fail to fill.
fn float_to_value(f: f64) -> Value {
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        Value::Number(Number::from(f as i64))
    } else {
        Number::from_f64(f).map_or(Value::Null, Value::Number)
    }
}
