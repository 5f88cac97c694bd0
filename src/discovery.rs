//! Input file discovery.
//!
//! Files are recognised by name: `{name}_{YYYYMMDD}.tif` for single-day
//! products and `{name}_{YYYYMMDD}_{YYYYMMDD}.tif` for products covering a
//! period. The discovery collaborator is a trait so hosts with other naming
//! schemes or catalogues can plug their own in.

use chrono::{NaiveDate, NaiveDateTime};
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::Result;

const DATE_FORMAT: &str = "%Y%m%d";

/// One discoverable input artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    pub url: String,
    /// The data type or variable name the file was discovered for.
    pub data_type: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
}

impl FileRef {
    pub fn new(
        url: impl Into<String>,
        data_type: impl Into<String>,
        start_time: NaiveDateTime,
        end_time: NaiveDateTime,
    ) -> Self {
        Self {
            url: url.into(),
            data_type: data_type.into(),
            start_time,
            end_time,
        }
    }
}

pub trait FileDiscovery {
    /// Lists the files under `data_path` that are valid for any of `names`,
    /// ordered by start time.
    fn list_valid_files(&self, data_path: &str, names: &[String]) -> Result<Vec<FileRef>>;

    /// Whether the file at `url` is a valid input for `name`.
    fn is_valid(&self, url: &str, name: &str) -> bool;
}

/// Discovery based on the crate's file naming convention.
///
/// `data_path` is either a directory, searched recursively, or a glob
/// pattern such as `/data/**/*.tif`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NamingConvention;

impl NamingConvention {
    pub fn new() -> Self {
        Self
    }

    /// Parses `path` as a file of `name`, returning its time range.
    pub fn parse(path: &Path, name: &str) -> Option<FileRef> {
        if !is_supported_file_type(path) {
            return None;
        }
        let stem = path.file_stem()?.to_str()?;
        let dates = stem.strip_prefix(name)?.strip_prefix('_')?;

        let (start, end) = match dates.split('_').collect::<Vec<_>>().as_slice() {
            [day] => (parse_day(day)?, parse_day(day)?),
            [start, end] => (parse_day(start)?, parse_day(end)?),
            _ => return None,
        };

        Some(FileRef::new(
            path.to_string_lossy(),
            name,
            start,
            end,
        ))
    }

    fn candidates(data_path: &str) -> Result<Vec<std::path::PathBuf>> {
        if data_path.contains(['*', '?', '[']) {
            let mut files = Vec::new();
            for entry in glob::glob(data_path)? {
                match entry {
                    Ok(path) if path.is_file() => files.push(path),
                    Ok(_) => {}
                    Err(e) => warn!("Skipping unreadable path {}: {}", e.path().display(), e),
                }
            }
            return Ok(files);
        }

        if !Path::new(data_path).exists() {
            warn!("Input path {} does not exist", data_path);
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(data_path).sort_by_file_name() {
            let entry = entry?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }
}

impl FileDiscovery for NamingConvention {
    fn list_valid_files(&self, data_path: &str, names: &[String]) -> Result<Vec<FileRef>> {
        let mut file_refs: Vec<FileRef> = Self::candidates(data_path)?
            .iter()
            .filter_map(|path| names.iter().find_map(|name| Self::parse(path, name)))
            .collect();

        file_refs.sort_by(|a, b| {
            a.start_time
                .cmp(&b.start_time)
                .then_with(|| a.url.cmp(&b.url))
        });

        debug!(
            "Found {} valid files for {:?} in {}",
            file_refs.len(),
            names,
            data_path
        );
        Ok(file_refs)
    }

    fn is_valid(&self, url: &str, name: &str) -> bool {
        Self::parse(Path::new(url), name).is_some()
    }
}

pub fn is_supported_file_type(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("tif") | Some("tiff")
    )
}

fn parse_day(s: &str) -> Option<NaiveDateTime> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .ok()?
        .and_hms_opt(0, 0, 0)
}
