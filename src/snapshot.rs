//! Dated snapshot files in the output folder
//!
//! Each run leaves one workbook named `<prefix><YYYY-MM-DD><ext>`. The newest
//! file by name is the baseline for the next run, so the date format must stay
//! fixed-width ISO for string order to match calendar order.

use calamine::{open_workbook, Data, Reader, Xlsx};
use chrono::NaiveDate;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::error::{Result, TrackerError};
use crate::report::{Report, PRODUCT_LIST_SHEET, SUMMARY_LABELS};
use crate::types::{Catalog, ProductRecord, HEADERS};

pub const SNAPSHOT_PREFIX: &str = "Acro_Products_";
pub const SNAPSHOT_EXTENSION: &str = ".xlsx";
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
    prefix: String,
    extension: String,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            prefix: SNAPSHOT_PREFIX.to_string(),
            extension: SNAPSHOT_EXTENSION.to_string(),
        }
    }

    /// Create the output folder if needed.
    pub fn resolve_output_directory(&self) -> Result<&Path> {
        fs::create_dir_all(&self.dir).map_err(|source| TrackerError::OutputDirectory {
            path: self.dir.clone(),
            source,
        })?;
        Ok(&self.dir)
    }

    /// Snapshot file names, newest first.
    pub fn list_snapshots(&self) -> Result<Vec<String>> {
        let dir_err = |source| TrackerError::OutputDirectory {
            path: self.dir.clone(),
            source,
        };
        let entries = fs::read_dir(&self.dir)
            .map_err(dir_err)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(dir_err)?;

        let mut names: Vec<String> = entries
            .into_iter()
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| self.is_snapshot_name(name))
            .collect();

        names.sort_unstable_by(|a, b| b.cmp(a));
        Ok(names)
    }

    /// Load the catalog from the newest snapshot, if any.
    ///
    /// An unreadable newest snapshot is an error, never treated as absent.
    pub fn load_latest(&self) -> Result<Option<Catalog>> {
        let Some(latest) = self.list_snapshots()?.into_iter().next() else {
            return Ok(None);
        };
        let path = self.dir.join(&latest);
        info!(snapshot = %path.display(), "loading previous snapshot");
        read_snapshot(&path).map(Some)
    }

    pub fn build_output_path(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(format!(
            "{}{}{}",
            self.prefix,
            date.format(DATE_FORMAT),
            self.extension
        ))
    }

    /// Write the report to `path`, replacing any existing file.
    ///
    /// The workbook is encoded in full and written to a temporary file in the
    /// same folder before being renamed into place.
    pub fn save(&self, path: &Path, report: &Report) -> Result<()> {
        let bytes = report.to_xlsx_bytes().map_err(|e| TrackerError::write(path, e))?;

        let parent = path.parent().unwrap_or(self.dir.as_path());
        let mut tmp =
            NamedTempFile::new_in(parent).map_err(|e| TrackerError::write(path, e))?;
        tmp.write_all(&bytes)
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| TrackerError::write(path, e))?;
        tmp.persist(path).map_err(|e| TrackerError::write(path, e.error))?;

        debug!(
            path = %path.display(),
            bytes = bytes.len(),
            products = report.sheet(PRODUCT_LIST_SHEET).map_or(0, |s| s.rows.len()),
            "report written"
        );
        Ok(())
    }

    fn is_snapshot_name(&self, name: &str) -> bool {
        let matched = self.snapshot_date(name).is_some();
        if !matched && name.starts_with(&self.prefix) && name.ends_with(&self.extension) {
            warn!(file = %name, "ignoring file without a valid snapshot date");
        }
        matched
    }

    fn snapshot_date(&self, name: &str) -> Option<NaiveDate> {
        let date = name
            .strip_prefix(&self.prefix)?
            .strip_suffix(&self.extension)?;
        // Fixed width keeps name order equal to date order
        if date.len() != 10 {
            return None;
        }
        NaiveDate::parse_from_str(date, DATE_FORMAT).ok()
    }
}

/// Read the product rows of a snapshot's "Product List" sheet.
pub fn read_snapshot(path: &Path) -> Result<Catalog> {
    let mut workbook: Xlsx<_> =
        open_workbook(path).map_err(|e| TrackerError::decode(path, e))?;
    let range = workbook
        .worksheet_range(PRODUCT_LIST_SHEET)
        .map_err(|e| TrackerError::decode(path, e))?;

    let is_header = |row: &[Data]| {
        row.len() >= HEADERS.len() && HEADERS.iter().zip(row).all(|(h, c)| cell_text(c) == *h)
    };
    let mut rows = range.rows();
    rows.by_ref().find(|row| is_header(*row)).ok_or_else(|| {
        TrackerError::decode(path, format!("no header row in '{}'", PRODUCT_LIST_SHEET))
    })?;

    let mut catalog = Vec::new();
    for row in rows {
        let cells: Vec<String> = row.iter().take(3).map(cell_text).collect();
        if cells.iter().all(|c| c.is_empty()) {
            continue;
        }
        if SUMMARY_LABELS.contains(&cells[0].as_str()) {
            break;
        }
        let field = |i: usize| cells.get(i).cloned().unwrap_or_default();
        catalog.push(ProductRecord::new(field(0), field(1), field(2)));
    }

    debug!(path = %path.display(), products = catalog.len(), "snapshot decoded");
    Ok(catalog)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::diff;
    use crate::error::ErrorKind;
    use crate::report::build_report;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"").unwrap();
    }

    fn catalog() -> Catalog {
        vec![
            ProductRecord::new("MolA", "P1", "NameA"),
            ProductRecord::new("MolB", "12345", "NameB"),
            ProductRecord::new("MolA", "P1", "NameA"),
        ]
    }

    #[test]
    fn test_resolve_output_directory_idempotent() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("Acro_Product_List");
        let store = SnapshotStore::new(&dir);
        store.resolve_output_directory().unwrap();
        assert_eq!(store.resolve_output_directory().unwrap(), dir.as_path());
        assert!(dir.is_dir());
    }

    #[test]
    fn test_list_snapshots_newest_first() {
        let tmp = TempDir::new().unwrap();
        for name in [
            "Acro_Products_2024-01-01.xlsx",
            "Acro_Products_2024-01-15.xlsx",
            "Acro_Products_2023-12-31.xlsx",
            "Acro_Products_backup.xlsx",
            "Acro_Products_2024-02-30.xlsx",
            "Other_2025-01-01.xlsx",
            "Acro_Products_2025-01-01.csv",
            "~$Acro_Products_2025-01-01.xlsx",
        ] {
            touch(tmp.path(), name);
        }
        let store = SnapshotStore::new(tmp.path());
        assert_eq!(
            store.list_snapshots().unwrap(),
            vec![
                "Acro_Products_2024-01-15.xlsx",
                "Acro_Products_2024-01-01.xlsx",
                "Acro_Products_2023-12-31.xlsx",
            ]
        );
    }

    #[test]
    fn test_list_snapshots_unreadable_dir_is_error() {
        let tmp = TempDir::new().unwrap();
        let store = SnapshotStore::new(tmp.path().join("missing"));
        let err = store.list_snapshots().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutputWrite);
        assert!(store.load_latest().is_err());
    }

    #[test]
    fn test_build_output_path() {
        let store = SnapshotStore::new("/data/out");
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(
            store.build_output_path(date),
            PathBuf::from("/data/out/Acro_Products_2024-03-07.xlsx")
        );
    }

    #[test]
    fn test_load_latest_empty_dir() {
        let tmp = TempDir::new().unwrap();
        let store = SnapshotStore::new(tmp.path());
        assert!(store.load_latest().unwrap().is_none());
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let tmp = TempDir::new().unwrap();
        let store = SnapshotStore::new(tmp.path());
        let current = catalog();
        let report = build_report(&current, &diff(&current, None));

        let path = store.build_output_path(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        store.save(&path, &report).unwrap();
        assert!(path.is_file());

        let loaded = store.load_latest().unwrap().unwrap();
        assert_eq!(loaded, current);
    }

    #[test]
    fn test_save_overwrites_same_day() {
        let tmp = TempDir::new().unwrap();
        let store = SnapshotStore::new(tmp.path());
        let path = store.build_output_path(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());

        let first = vec![ProductRecord::new("Old", "P0", "Old name")];
        store.save(&path, &build_report(&first, &diff(&first, None))).unwrap();
        let second = vec![ProductRecord::new("New", "P1", "New name")];
        store.save(&path, &build_report(&second, &diff(&second, None))).unwrap();

        assert_eq!(store.list_snapshots().unwrap().len(), 1);
        assert_eq!(store.load_latest().unwrap().unwrap(), second);
    }

    #[test]
    fn test_load_latest_picks_newest() {
        let tmp = TempDir::new().unwrap();
        let store = SnapshotStore::new(tmp.path());
        let older = vec![ProductRecord::new("A", "1", "a")];
        let newer = vec![ProductRecord::new("B", "2", "b")];
        let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
        store
            .save(&store.build_output_path(day(2)), &build_report(&newer, &diff(&newer, None)))
            .unwrap();
        store
            .save(&store.build_output_path(day(1)), &build_report(&older, &diff(&older, None)))
            .unwrap();
        assert_eq!(store.load_latest().unwrap().unwrap(), newer);
    }

    #[test]
    fn test_corrupt_latest_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let store = SnapshotStore::new(tmp.path());
        let good = vec![ProductRecord::new("A", "1", "a")];
        store
            .save(
                &store.build_output_path(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
                &build_report(&good, &diff(&good, None)),
            )
            .unwrap();
        fs::write(tmp.path().join("Acro_Products_2024-01-02.xlsx"), b"not a workbook").unwrap();

        let err = store.load_latest().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SnapshotDecode);
    }

    #[test]
    fn test_save_into_missing_dir_fails() {
        let tmp = TempDir::new().unwrap();
        let store = SnapshotStore::new(tmp.path().join("missing"));
        let path = store.build_output_path(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        let current = catalog();
        let err = store
            .save(&path, &build_report(&current, &diff(&current, None)))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutputWrite);
        assert!(!path.exists());
    }
}
