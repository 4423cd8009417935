//! Migration files on the local filesystem
//!
//! Files follow the naming convention `<version>_<name>.<direction>.<ext>`,
//! e.g. `003_add_person_vertex.up.gsql`. The directory is re-scanned on every
//! lookup; migration sets are small and assumed static during a run.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::domain::result::{Error, Result};
use crate::domain::{Direction, Version};

/// A migration file discovered in a migration directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationFile {
    pub version: String,
    pub name: String,
    pub direction: Direction,
    pub path: PathBuf,
}

impl MigrationFile {
    /// Parse a file name, returning `None` if it does not follow the convention
    fn from_file_name(dir: &Path, file_name: &str) -> Option<Self> {
        let (version, rest) = file_name.split_once('_')?;
        Version::parse(version).ok()?;

        let mut parts = rest.rsplitn(3, '.');
        let _ext = parts.next().filter(|ext| !ext.is_empty())?;
        let direction = parts.next()?.parse::<Direction>().ok()?;
        let name = parts.next()?;

        Some(Self {
            version: version.to_string(),
            name: name.to_string(),
            direction,
            path: dir.join(file_name),
        })
    }
}

/// A directory of migration files
#[derive(Debug, Clone)]
pub struct MigrationDirectory {
    dir: PathBuf,
}

impl MigrationDirectory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Read the script for `version` in `direction`.
    ///
    /// The first file (by name) starting with `<version>_` and ending with
    /// `.<direction>.<ext>` wins.
    pub fn resolve(&self, version: &str, direction: Direction) -> Result<Vec<u8>> {
        let prefix = format!("{}_", version);

        let found = self
            .sorted_file_names()?
            .into_iter()
            .find(|name| name.starts_with(&prefix) && has_direction_suffix(name, direction));

        match found {
            Some(name) => {
                let path = self.dir.join(&name);
                tracing::debug!(file = %path.display(), "Resolved migration file");
                Ok(fs::read(path)?)
            }
            None => Err(Error::MigrationNotFound {
                version: version.to_string(),
                direction,
            }),
        }
    }

    /// All files in the directory that follow the naming convention,
    /// sorted by file name
    pub fn list(&self) -> Result<Vec<MigrationFile>> {
        Ok(self
            .sorted_file_names()?
            .iter()
            .filter_map(|name| MigrationFile::from_file_name(&self.dir, name))
            .collect())
    }

    fn sorted_file_names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            // Follows symlinks; dangling links are skipped
            if !entry.path().is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

/// Whether `name` ends with `.<direction>.<ext>` for some non-empty extension
fn has_direction_suffix(name: &str, direction: Direction) -> bool {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !ext.is_empty() => stem.ends_with(&format!(".{}", direction)),
        _ => false,
    }
}
