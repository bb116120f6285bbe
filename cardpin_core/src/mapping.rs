//! The persisted key → URI mapping and its JSON file store.

use std::{
    collections::BTreeMap,
    io::Write,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tempfile::NamedTempFile;

use crate::{CardKey, ContentUri, Error, Result};

/// Record of completed pins, keyed by card.
///
/// Serialized as a flat JSON object of string keys to string values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultMapping(BTreeMap<CardKey, ContentUri>);

impl ResultMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, key: &CardKey) -> bool {
        self.0.contains_key(key)
    }

    pub fn get(&self, key: &CardKey) -> Option<&ContentUri> {
        self.0.get(key)
    }

    /// Records a pin result. An existing entry is never replaced; returns
    /// false if `key` was already present.
    pub fn insert(&mut self, key: CardKey, uri: ContentUri) -> bool {
        match self.0.entry(key) {
            std::collections::btree_map::Entry::Occupied(_) => false,
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(uri);
                true
            }
        }
    }

    /// Iterates entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&CardKey, &ContentUri)> {
        self.0.iter()
    }
}

impl FromIterator<(CardKey, ContentUri)> for ResultMapping {
    fn from_iter<T: IntoIterator<Item = (CardKey, ContentUri)>>(iter: T) -> Self {
        let mut mapping = Self::new();
        for (key, uri) in iter {
            mapping.insert(key, uri);
        }
        mapping
    }
}

/// A result mapping stored as a JSON file.
#[derive(Debug, Clone)]
pub struct DictionaryStore {
    path: PathBuf,
}

impl DictionaryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the mapping, starting empty if the file does not exist yet.
    pub fn load(&self) -> Result<ResultMapping> {
        match std::fs::read(&self.path) {
            Ok(bytes) => self.parse(&bytes),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("no dictionary at {}, starting empty", self.path.display());
                Ok(ResultMapping::new())
            }
            Err(err) => Err(Error::io(&self.path, err)),
        }
    }

    /// Loads a mapping that a previous pipeline must already have produced.
    pub fn load_required(&self) -> Result<ResultMapping> {
        let bytes = std::fs::read(&self.path).map_err(|err| Error::io(&self.path, err))?;
        self.parse(&bytes)
    }

    fn parse(&self, bytes: &[u8]) -> Result<ResultMapping> {
        let value: Value =
            serde_json::from_slice(bytes).map_err(|err| Error::parse(&self.path, err))?;
        match value {
            Value::Object(_) => {
                serde_json::from_value(value).map_err(|err| Error::parse(&self.path, err))
            }
            Value::Null => Err(Error::parse(&self.path, "dictionary is null")),
            _ => Err(Error::parse(&self.path, "expected a JSON object")),
        }
    }

    /// Writes the mapping through a temp file in the target directory that
    /// is synced and then renamed over the old dictionary.
    pub fn save(&self, mapping: &ResultMapping) -> Result<()> {
        let json = serde_json::to_vec(mapping).map_err(|err| Error::io(&self.path, err.into()))?;

        let parent_dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent_dir).map_err(|err| Error::io(parent_dir, err))?;

        let mut temp_file =
            NamedTempFile::new_in(parent_dir).map_err(|err| Error::io(parent_dir, err))?;
        if let Err(err) = temp_file.write_all(&json) {
            return Err(Error::io(temp_file.path(), err));
        }
        if let Err(err) = temp_file.as_file().sync_all() {
            return Err(Error::io(temp_file.path(), err));
        }
        temp_file
            .persist(&self.path)
            .map_err(|err| Error::io(&self.path, err.error))?;

        tracing::debug!(
            "saved {} entries to {}",
            mapping.len(),
            self.path.display()
        );
        Ok(())
    }
}
