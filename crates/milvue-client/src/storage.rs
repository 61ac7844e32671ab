//! Persistence of retrieved artifacts to a local directory.

use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::MilvueError;

/// Source of file names for persisted artifacts.
pub trait NameGenerator: Send + Sync {
    fn artifact_name(&self) -> String;
}

/// Names artifacts `<uuid v4>.dcm`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidNameGenerator;

impl NameGenerator for UuidNameGenerator {
    fn artifact_name(&self) -> String {
        format!("{}.dcm", uuid::Uuid::new_v4())
    }
}

impl<F> NameGenerator for F
where
    F: Fn() -> String + Send + Sync,
{
    fn artifact_name(&self) -> String {
        self()
    }
}

/// Files written by a single retrieval call.
///
/// Every file is removed when the value is dropped without [`commit`] being
/// called, so a batch that fails half-way leaves nothing behind.
///
/// [`commit`]: PendingFiles::commit
pub(crate) struct PendingFiles<'a> {
    folder: &'a Path,
    names: &'a dyn NameGenerator,
    paths: Vec<PathBuf>,
}

impl<'a> PendingFiles<'a> {
    pub(crate) fn new(folder: &'a Path, names: &'a dyn NameGenerator) -> Result<Self, MilvueError> {
        fs::create_dir_all(folder)?;
        Ok(Self {
            folder,
            names,
            paths: Vec::new(),
        })
    }

    /// Create a new file and fill it. The file is flushed and closed before
    /// this returns, on success and on failure.
    pub(crate) fn write<F>(&mut self, fill: F) -> Result<(), MilvueError>
    where
        F: FnOnce(&mut dyn Write) -> Result<(), MilvueError>,
    {
        let path = self.folder.join(self.names.artifact_name());
        let file = OpenOptions::new().write(true).create_new(true).open(&path)?;
        self.paths.push(path);

        let mut writer = BufWriter::new(file);
        fill(&mut writer)?;
        writer.flush()?;

        Ok(())
    }

    pub(crate) fn commit(mut self) -> Vec<PathBuf> {
        std::mem::take(&mut self.paths)
    }
}

impl Drop for PendingFiles<'_> {
    fn drop(&mut self) {
        for path in &self.paths {
            if let Err(e) = fs::remove_file(path) {
                log::warn!("Failed to remove partial artifact {}: {e}", path.display());
            }
        }
    }
}
