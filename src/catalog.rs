//! Dataset catalog over the `<root>/<category>/<year>/<MM>.<ext>` folder convention.
//!
//! The catalog keeps no index: every listing re-scans the filesystem, and
//! every [`DatasetCatalog::load`] decodes the file afresh. [`DatasetCatalog::store`]
//! is the only mutating call and is meant for the dashboard's admin import.

use crate::analyser::io;
use crate::error::{DouaneError, Result, ResultExt as _};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

/// Identifies one loadable period file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub category: String,
    pub year: String,
    pub file_name: String,
}

impl CatalogEntry {
    pub fn new(
        category: impl Into<String>,
        year: impl Into<String>,
        file_name: impl Into<String>,
    ) -> Self {
        Self {
            category: category.into(),
            year: year.into(),
            file_name: file_name.into(),
        }
    }

    /// Month number from a `MM.<ext>` file name, when the stem is one.
    pub fn month(&self) -> Option<u32> {
        let stem = Path::new(&self.file_name).file_stem()?.to_str()?;
        let month: u32 = stem.parse().ok()?;
        (1..=12).contains(&month).then_some(month)
    }

    /// `category/year/file_name`, relative to the data root.
    pub fn relative_path(&self) -> PathBuf {
        [&self.category, &self.year, &self.file_name].iter().collect()
    }
}

/// Filesystem-backed catalog. Cheap to clone; holds no mutable state.
#[derive(Debug, Clone)]
pub struct DatasetCatalog {
    root: PathBuf,
    extension: String,
}

impl DatasetCatalog {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            extension: "xlsx".to_owned(),
        }
    }

    /// Use a different period file extension (with or without the leading dot).
    #[must_use]
    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = extension.trim_start_matches('.').to_owned();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Category directories directly under the data root, sorted.
    ///
    /// # Errors
    ///
    /// `NotFound` if the data root is not a directory.
    pub fn list_categories(&self) -> Result<Vec<String>> {
        if !self.root.is_dir() {
            return Err(DouaneError::NotFound(format!(
                "data root {}",
                self.root.display()
            )));
        }
        let categories = list_dirs(&self.root)?;
        log::debug!(
            "Found {} categories under {}",
            categories.len(),
            self.root.display()
        );
        Ok(categories)
    }

    /// Year directories of a category, sorted ascending.
    ///
    /// # Errors
    ///
    /// `NotFound` if the category does not exist, `InvalidPath` for a bad name.
    pub fn list_years(&self, category: &str) -> Result<Vec<String>> {
        let dir = self.category_dir(category)?;
        if !dir.is_dir() {
            return Err(DouaneError::NotFound(format!("category '{category}'")));
        }
        list_dirs(&dir)
    }

    /// Period files of a year, sorted ascending. Matches on the extension suffix only.
    ///
    /// # Errors
    ///
    /// `NotFound` if the category or year does not exist, `InvalidPath` for a bad name.
    pub fn list_month_files(&self, category: &str, year: &str) -> Result<Vec<String>> {
        let dir = self.year_dir(category, year)?;
        if !dir.is_dir() {
            return Err(DouaneError::NotFound(format!("year '{year}' in '{category}'")));
        }

        let suffix = format!(".{}", self.extension);
        let mut files = Vec::new();
        for entry in fs::read_dir(&dir)
            .with_context(|| format!("Failed to scan {}", dir.display()))?
        {
            let entry = entry?;
            // Follows symlinks, like the directory listings.
            if !entry.path().is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str()
                && name.ends_with(&suffix)
            {
                files.push(name.to_owned());
            }
        }
        files.sort();
        Ok(files)
    }

    /// Every period file in the tree, ordered by category, year, then file name.
    ///
    /// # Errors
    ///
    /// `NotFound` if the data root is missing.
    pub fn entries(&self) -> Result<Vec<CatalogEntry>> {
        let mut entries = Vec::new();
        for category in self.list_categories()? {
            for year in self.list_years(&category)? {
                for file_name in self.list_month_files(&category, &year)? {
                    entries.push(CatalogEntry::new(category.as_str(), year.as_str(), file_name));
                }
            }
        }
        Ok(entries)
    }

    /// Absolute location of a period file. Does not check that it exists.
    ///
    /// # Errors
    ///
    /// `InvalidPath` if any component is empty, `.`/`..`, or contains a separator.
    pub fn entry_path(&self, category: &str, year: &str, file_name: &str) -> Result<PathBuf> {
        Ok(self.year_dir(category, year)?.join(component(file_name)?))
    }

    /// Read one period file fully into memory as a table.
    ///
    /// # Errors
    ///
    /// `Load` if the file is missing, unreadable, or not a valid table.
    pub fn load(&self, category: &str, year: &str, file_name: &str) -> Result<DataFrame> {
        let path = self.entry_path(category, year, file_name)?;
        let df = io::read_table(&path)?;
        log::debug!(
            "Loaded {} ({} rows, {} columns)",
            path.display(),
            df.height(),
            df.width()
        );
        Ok(df)
    }

    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn load_entry(&self, entry: &CatalogEntry) -> Result<DataFrame> {
        self.load(&entry.category, &entry.year, &entry.file_name)
    }

    /// Write raw bytes as a period file, replacing any existing one.
    ///
    /// The year directory must already exist. Bytes go to a temp file in the
    /// same directory first and are renamed into place, so a concurrent
    /// [`Self::load`] sees either the old file or the new one. Contents are not
    /// validated; a bad upload only fails on the next load.
    ///
    /// # Errors
    ///
    /// `NotFound` if the year directory is missing, `Io` if the write fails.
    pub fn store(&self, category: &str, year: &str, file_name: &str, bytes: &[u8]) -> Result<()> {
        let dir = self.year_dir(category, year)?;
        if !dir.is_dir() {
            return Err(DouaneError::NotFound(format!("year '{year}' in '{category}'")));
        }
        let path = dir.join(component(file_name)?);

        #[cfg_attr(not(unix), allow(unused_mut))]
        let mut builder = tempfile::Builder::new();
        // Same mode a plain create would get (0666 minus umask), not tempfile's 0600.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt as _;
            builder.permissions(fs::Permissions::from_mode(0o666));
        }
        let mut tmp = builder
            .tempfile_in(&dir)
            .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
        if let Ok(existing) = fs::metadata(&path) {
            tmp.as_file()
                .set_permissions(existing.permissions())
                .with_context(|| format!("Failed to keep permissions of {}", path.display()))?;
        }
        tmp.write_all(bytes)
            .context("Failed to write uploaded bytes")?;
        tmp.as_file().sync_all().context("Failed to flush uploaded bytes")?;
        tmp.persist(&path)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to move upload to {}", path.display()))?;

        log::info!("Stored {} ({} bytes)", path.display(), bytes.len());
        Ok(())
    }

    fn category_dir(&self, category: &str) -> Result<PathBuf> {
        Ok(self.root.join(component(category)?))
    }

    fn year_dir(&self, category: &str, year: &str) -> Result<PathBuf> {
        Ok(self.category_dir(category)?.join(component(year)?))
    }
}

/// Reject anything that is not a single, plain path component.
fn component(name: &str) -> Result<&str> {
    let bad = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0');
    if bad {
        Err(DouaneError::InvalidPath(format!("'{name}' is not a plain name")))
    } else {
        Ok(name)
    }
}

fn list_dirs(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to scan {}", dir.display()))? {
        let entry = entry?;
        if !entry.path().is_dir() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(raw) => log::warn!("Skipping non UTF-8 directory name {raw:?}"),
        }
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_month() {
        assert_eq!(CatalogEntry::new("Bois", "2021", "03.xlsx").month(), Some(3));
        assert_eq!(CatalogEntry::new("Bois", "2021", "2021_03.xlsx").month(), None);
        assert_eq!(CatalogEntry::new("Bois", "2021", "13.xlsx").month(), None);
    }

    #[test]
    fn test_entry_relative_path() {
        let entry = CatalogEntry::new("Agroalimentaire", "2023", "01.xlsx");
        assert_eq!(
            entry.relative_path(),
            Path::new("Agroalimentaire").join("2023").join("01.xlsx")
        );
    }

    #[test]
    fn test_component_validation() {
        assert!(component("Agroalimentaire").is_ok());
        assert!(component("Matériaux_de_construction").is_ok());
        for bad in ["", ".", "..", "../etc", "a/b", "a\\b"] {
            assert!(
                matches!(component(bad), Err(DouaneError::InvalidPath(_))),
                "'{bad}' should be rejected"
            );
        }
    }

    #[test]
    fn test_extension_normalised() {
        let catalog = DatasetCatalog::new("data").with_extension(".csv");
        assert_eq!(catalog.extension(), "csv");
    }

    #[test]
    fn test_missing_root() {
        let catalog = DatasetCatalog::new("/definitely/not/a/douane/root");
        let err = catalog.list_categories().expect_err("root is missing");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_month_files_suffix_only() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let year = dir.path().join("Textile").join("2022");
        fs::create_dir_all(year.join("archive.xlsx"))?;
        for name in ["02.xlsx", "01.xlsx", "notes.txt", "backup.xlsx.bak", "Q1.xlsx"] {
            fs::write(year.join(name), b"")?;
        }

        let catalog = DatasetCatalog::new(dir.path());
        assert_eq!(
            catalog.list_month_files("Textile", "2022")?,
            vec!["01.xlsx", "02.xlsx", "Q1.xlsx"]
        );
        Ok(())
    }

    #[test]
    fn test_store_requires_year_dir() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        fs::create_dir_all(dir.path().join("Textile"))?;
        let catalog = DatasetCatalog::new(dir.path());

        let err = catalog
            .store("Textile", "2030", "01.xlsx", b"bytes")
            .expect_err("year dir is missing");
        assert!(err.is_not_found());
        assert!(!dir.path().join("Textile").join("2030").exists());
        Ok(())
    }

    #[test]
    fn test_store_overwrites() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let year = dir.path().join("Textile").join("2022");
        fs::create_dir_all(&year)?;
        let catalog = DatasetCatalog::new(dir.path());

        catalog.store("Textile", "2022", "05.xlsx", b"first")?;
        catalog.store("Textile", "2022", "05.xlsx", b"second")?;

        assert_eq!(fs::read(year.join("05.xlsx"))?, b"second");
        // No temp files left behind.
        assert_eq!(fs::read_dir(&year)?.count(), 1);
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_store_keeps_file_mode() -> anyhow::Result<()> {
        use std::os::unix::fs::PermissionsExt as _;

        let dir = tempfile::tempdir()?;
        let year = dir.path().join("Bois").join("2022");
        fs::create_dir_all(&year)?;
        let existing = year.join("01.xlsx");
        fs::write(&existing, b"old")?;
        fs::set_permissions(&existing, fs::Permissions::from_mode(0o640))?;
        let catalog = DatasetCatalog::new(dir.path());

        catalog.store("Bois", "2022", "01.xlsx", b"new")?;
        assert_eq!(fs::read(&existing)?, b"new");
        assert_eq!(fs::metadata(&existing)?.permissions().mode() & 0o777, 0o640);

        // A fresh file gets the mode a plain write would give it.
        let plain = dir.path().join("plain.bin");
        fs::write(&plain, b"")?;
        catalog.store("Bois", "2022", "02.xlsx", b"new")?;
        assert_eq!(
            fs::metadata(year.join("02.xlsx"))?.permissions().mode() & 0o777,
            fs::metadata(&plain)?.permissions().mode() & 0o777
        );
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_month_files_follow_symlinks() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let year = dir.path().join("Bois").join("2022");
        fs::create_dir_all(&year)?;
        fs::write(dir.path().join("real.xlsx"), b"")?;
        std::os::unix::fs::symlink(dir.path().join("real.xlsx"), year.join("03.xlsx"))?;
        std::os::unix::fs::symlink(dir.path().join("gone.xlsx"), year.join("04.xlsx"))?;
        let catalog = DatasetCatalog::new(dir.path());

        assert_eq!(catalog.list_month_files("Bois", "2022")?, vec!["03.xlsx"]);
        Ok(())
    }

    #[test]
    fn test_load_missing_file_is_load_error() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        fs::create_dir_all(dir.path().join("Textile").join("2022"))?;
        let catalog = DatasetCatalog::new(dir.path());

        let err = catalog
            .load("Textile", "2022", "07.xlsx")
            .expect_err("file is missing");
        assert!(matches!(err, DouaneError::Load { .. }));
        Ok(())
    }

    #[test]
    fn test_load_garbage_is_load_error() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let year = dir.path().join("Textile").join("2022");
        fs::create_dir_all(&year)?;
        fs::write(year.join("07.xlsx"), b"this is not a workbook")?;
        let catalog = DatasetCatalog::new(dir.path());

        let err = catalog
            .load("Textile", "2022", "07.xlsx")
            .expect_err("file is not a workbook");
        match err {
            DouaneError::Load { path, .. } => assert!(path.ends_with("07.xlsx")),
            other => panic!("Expected Load error, got {other:?}"),
        }
        Ok(())
    }
}
