//! Whole-document JSON persistence, one file per collection.
//!
//! Every operation reads the entire document, changes it in memory and
//! writes the entire document back. Nothing coordinates concurrent writers:
//! two overlapping mutations of the same collection race, and the write that
//! finishes last wins (lost update). Collections live in separate files and
//! never interact.

mod document;

pub use document::{Document, DocumentError};

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use uuid::Uuid;

use crate::models::Entity;

/// Handle on the data directory holding the collection documents.
#[derive(Debug, Clone)]
pub struct Store {
    dir: PathBuf,
}

impl Store {
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the backing document for `collection`.
    pub fn path_for(&self, collection: &str) -> PathBuf {
        self.dir.join(format!("{}.json", collection))
    }

    /// Load a collection for display.
    ///
    /// A document that does not exist yet, cannot be read, or does not parse
    /// as this collection is an empty collection. Read failures are logged,
    /// never returned.
    pub fn load<E: Entity>(&self) -> Document<E> {
        match self.try_load() {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!("Treating {} as empty: {:#}", E::COLLECTION, e);
                Document::default()
            }
        }
    }

    /// Load a collection that is about to be rewritten.
    ///
    /// Only a missing document counts as empty. A document that exists but
    /// cannot be read or parsed is an error, so a write never replaces
    /// records it failed to see.
    pub fn try_load<E: Entity>(&self) -> Result<Document<E>> {
        let path = self.path_for(E::COLLECTION);

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("No document at {}, starting empty", path.display());
                return Ok(Document::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()));
            }
        };

        let value = serde_json::from_str(&content)
            .with_context(|| format!("Malformed document {}", path.display()))?;
        Document::from_value(value)
            .with_context(|| format!("Malformed document {}", path.display()))
    }

    /// Replace a collection's document on disk.
    ///
    /// The data directory is created on first use. The document is written to
    /// a sibling temp file and renamed over the target, so readers never see a
    /// half-written file.
    pub fn save<E: Entity>(&self, document: &Document<E>) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create data directory {}", self.dir.display()))?;

        let path = self.path_for(E::COLLECTION);
        let content =
            serde_json::to_string_pretty(document).context("Failed to serialize document")?;

        let temp = self
            .dir
            .join(format!(".{}.{}.tmp", E::COLLECTION, Uuid::new_v4()));
        std::fs::write(&temp, content)
            .with_context(|| format!("Failed to write {}", temp.display()))?;

        if let Err(e) = std::fs::rename(&temp, &path) {
            let _ = std::fs::remove_file(&temp);
            return Err(e).with_context(|| format!("Failed to replace {}", path.display()));
        }

        tracing::debug!(
            "Saved {} {} to {}",
            document.records.len(),
            E::COLLECTION,
            path.display()
        );
        Ok(())
    }
}
