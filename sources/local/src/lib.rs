use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use cardpin_core::{CardKey, Error, PinLabel, PinPayload, Source, SourceItem, Sourced};
use regex::Regex;
use walkdir::WalkDir;

static KEY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\.").expect("valid key pattern"));

/// Extracts the card key from an image file name.
///
/// The key is the first run of digits directly followed by a `.`, so both
/// `100.jpg` and `card_100.jpg` map to 100. Names without such a run, and
/// runs that are zero or do not fit a `u64`, yield `None`.
pub fn key_from_file_name(name: &str) -> Option<u64> {
    let digits = KEY_PATTERN.captures(name)?.get(1)?.as_str();
    digits.parse::<u64>().ok().filter(|key| *key > 0)
}

/// Enumerates the card images in one folder, ordered by key.
#[derive(Debug, Clone)]
pub struct ImageFolderSource {
    folder: PathBuf,
    label_prefix: String,
}

impl ImageFolderSource {
    /// Creates a source over the images directly inside `folder`.
    ///
    /// # Arguments
    ///
    /// * `folder` - The directory holding the downloaded images. It is not
    ///   searched recursively.
    /// * `label_prefix` - Prefix of the pin labels, `<prefix>_<key>`.
    pub fn new(folder: impl Into<PathBuf>, label_prefix: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            label_prefix: label_prefix.into(),
        }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Lists the folder and returns `(key, path)` pairs, ascending by key.
    ///
    /// Ties (e.g. `100.jpg` next to `100.png`) are ordered by path so that
    /// every run sees the same sequence.
    pub fn discover(&self) -> Result<Vec<(u64, PathBuf)>, Error> {
        log::info!("Discovering images in {:?}", self.folder);

        let mut images = Vec::new();
        for entry in WalkDir::new(&self.folder).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|err| {
                let path = err.path().unwrap_or(&self.folder).to_path_buf();
                Error::io(path, err.into())
            })?;
            // follows symlinks; a dangling link is not a file
            if !entry.path().is_file() {
                continue;
            }

            let Some(key) = entry.file_name().to_str().and_then(key_from_file_name) else {
                log::debug!("Skipping {:?}: no card key in file name", entry.path());
                continue;
            };
            images.push((key, entry.into_path()));
        }

        images.sort();
        log::info!("Discovered {} images.", images.len());
        Ok(images)
    }
}

impl Source for ImageFolderSource {
    fn enumerate(&self) -> cardpin_core::Result<Vec<Sourced>> {
        let items = self
            .discover()?
            .into_iter()
            .map(|(key, path)| {
                let key = CardKey::from(key);
                Ok(SourceItem {
                    label: PinLabel::image(&self.label_prefix, &key),
                    payload: PinPayload::File(path),
                    key,
                })
            })
            .collect();
        Ok(items)
    }
}
