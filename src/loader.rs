// One-shot acquisition of catalog workbooks: a remote fetch for the
// published sheets and a local read for user-supplied files. No retry and
// no cancellation; a failed fetch or parse rejects the whole load and the
// typed wrappers fall back to an empty list.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use crate::catalog::{ExperienceRecord, TourRecord, VillaRecord};
use crate::sheet::{self, SheetError};

// Fixed per-catalog sheet locations under the site root.
pub const TOURS_SHEET_PATH: &str = "data/tours.xlsx";
pub const VILLAS_SHEET_PATH: &str = "data/villas.xlsx";
pub const EXPERIENCES_SHEET_PATH: &str = "data/experiences.xlsx";

#[derive(Debug, Error)]
pub enum SourceLoadError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse failed: {0}")]
    Sheet(#[from] SheetError),
}

/// Where a workbook comes from.
#[async_trait]
pub trait SheetSource: Send + Sync {
    async fn fetch(&self) -> Result<Bytes, SourceLoadError>;
}

/// A workbook hosted at a URL.
pub struct HttpSource {
    url: String,
}

impl HttpSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait]
impl SheetSource for HttpSource {
    async fn fetch(&self) -> Result<Bytes, SourceLoadError> {
        let response = reqwest::get(&self.url).await?.error_for_status()?;
        Ok(response.bytes().await?)
    }
}

/// A workbook on disk, e.g. one a user handed over for reimport.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl SheetSource for FileSource {
    async fn fetch(&self) -> Result<Bytes, SourceLoadError> {
        let bytes = tokio::fs::read(&self.path).await?;
        Ok(Bytes::from(bytes))
    }
}

/// Fetch a workbook from `source` and decode its first sheet.
pub async fn load_records<T: DeserializeOwned>(
    source: &dyn SheetSource,
) -> Result<Vec<T>, SourceLoadError> {
    let bytes = source.fetch().await?;
    Ok(sheet::decode_sheet(&bytes)?)
}

/// Load typed records from a remote workbook.
pub async fn load_from_url<T: DeserializeOwned>(url: &str) -> Result<Vec<T>, SourceLoadError> {
    load_records(&HttpSource::new(url)).await
}

/// Load typed records from a local workbook file.
pub async fn load_from_file<T: DeserializeOwned>(
    path: impl AsRef<Path>,
) -> Result<Vec<T>, SourceLoadError> {
    load_records(&FileSource::new(path)).await
}

pub async fn load_tours(base_url: &str) -> Vec<TourRecord> {
    fallback_empty(
        "tours",
        load_from_url(&join_url(base_url, TOURS_SHEET_PATH)).await,
    )
}

pub async fn load_villas(base_url: &str) -> Vec<VillaRecord> {
    fallback_empty(
        "villas",
        load_from_url(&join_url(base_url, VILLAS_SHEET_PATH)).await,
    )
}

pub async fn load_experiences(base_url: &str) -> Vec<ExperienceRecord> {
    fallback_empty(
        "experiences",
        load_from_url(&join_url(base_url, EXPERIENCES_SHEET_PATH)).await,
    )
}

/// Everything the site lists, loaded in one go.
#[derive(Debug, Default, Clone)]
pub struct Catalog {
    pub tours: Vec<TourRecord>,
    pub villas: Vec<VillaRecord>,
    pub experiences: Vec<ExperienceRecord>,
}

/// Load all three catalogs concurrently. Each falls back to an empty list
/// on its own, so one broken sheet never blanks the others.
pub async fn load_catalog(base_url: &str) -> Catalog {
    let (tours, villas, experiences) = futures::join!(
        load_tours(base_url),
        load_villas(base_url),
        load_experiences(base_url),
    );
    Catalog {
        tours,
        villas,
        experiences,
    }
}

fn fallback_empty<T>(what: &str, result: Result<Vec<T>, SourceLoadError>) -> Vec<T> {
    match result {
        Ok(records) => {
            debug!("loaded {} {what}", records.len());
            records
        }
        Err(err) => {
            warn!("falling back to an empty {what} list: {err}");
            Vec::new()
        }
    }
}

fn join_url(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path)
}
