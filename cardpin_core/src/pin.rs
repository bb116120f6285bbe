use std::{fmt, path::Path, path::PathBuf};

use crate::{CardKey, ContentHash, ContentUri, Error, Result, SourceItem};

/// Default prefix for pin labels.
pub const DEFAULT_LABEL_PREFIX: &str = "alpha";

/// Human-readable name attached to a pin on the service side.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PinLabel(String);

impl PinLabel {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// Label for a card image: `<prefix>_<key>`.
    pub fn image(prefix: &str, key: &CardKey) -> Self {
        Self(format!("{prefix}_{key}"))
    }

    /// Label for a card metadata document: `<prefix>_metadata_<key>`.
    pub fn metadata(prefix: &str, key: &CardKey) -> Self {
        Self(format!("{prefix}_metadata_{key}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PinLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What gets uploaded for an item.
#[derive(Clone, Debug, PartialEq)]
pub enum PinPayload {
    /// A local file, streamed from disk.
    File(PathBuf),
    /// A JSON document.
    Json(serde_json::Value),
}

/// Result of a single pin attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PinOutcome {
    Pinned(ContentUri),
    Failed(String),
}

impl PinOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Pinned(_))
    }

    pub fn uri(&self) -> Option<&ContentUri> {
        match self {
            Self::Pinned(uri) => Some(uri),
            Self::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Pinned(_) => None,
            Self::Failed(message) => Some(message),
        }
    }

    pub fn into_result(self) -> Result<ContentUri> {
        match self {
            Self::Pinned(uri) => Ok(uri),
            Self::Failed(message) => Err(Error::Service(message)),
        }
    }
}

/// A content-addressed pinning service.
///
/// Implementations upload one payload per call and report the resulting
/// content hash. They must not retry internally; a failed item is retried
/// by the next run of the pipeline.
#[async_trait::async_trait]
pub trait Pinner: fmt::Debug + Send + Sync {
    /// Uploads the file at `path` and pins it under `label`.
    async fn pin_file(&self, path: &Path, label: &PinLabel) -> anyhow::Result<ContentHash>;

    /// Uploads `document` as JSON and pins it under `label`.
    async fn pin_json(
        &self,
        document: &serde_json::Value,
        label: &PinLabel,
    ) -> anyhow::Result<ContentHash>;

    /// Pins `item`, folding every error into a `PinOutcome::Failed`.
    async fn pin(&self, item: &SourceItem) -> PinOutcome {
        let result = match &item.payload {
            PinPayload::File(path) => self.pin_file(path, &item.label).await,
            PinPayload::Json(document) => self.pin_json(document, &item.label).await,
        };
        match result {
            Ok(hash) => PinOutcome::Pinned(hash.to_uri()),
            Err(err) => PinOutcome::Failed(format!("{err:#}")),
        }
    }
}
